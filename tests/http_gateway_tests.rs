//! HTTP gateway tests against a stub backend
//!
//! An axum router bound to an ephemeral port plays the FitHub backend so
//! the real `reqwest` transport, URL building, headers and multipart
//! uploads are exercised end to end.

use axum::extract::{Multipart, Path};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use fithub::prelude::*;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

const TOKEN: &str = "test-token";

// =============================================================================
// Stub backend
// =============================================================================

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN))
}

async fn list_payments(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid token"})),
        )
            .into_response();
    }
    Json(json!({
        "content": [
            {
                "id": 1,
                "member": {"id": 7, "name": "John Doe", "email": "john@example.com", "phone": "5551234567"},
                "amount": 49.99,
                "type": "MEMBERSHIP",
                "dueDate": "2024-01-15T00:00:00Z",
                "status": "PENDING"
            }
        ],
        "totalElements": 1,
        "totalPages": 1,
        "number": 0,
        "size": 20
    }))
    .into_response()
}

async fn payment_stats() -> Json<Value> {
    Json(json!({
        "totalDue": 49.99,
        "overdue": 0,
        "paid": 0,
        "pending": 49.99,
        "overdueCount": 0,
        "paidCount": 0,
        "pendingCount": 1,
        "dueTrend": "+5%",
        "overdueTrend": "0%",
        "paidTrend": "-2%",
        "pendingTrend": "+5%"
    }))
}

async fn update_status(Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    if id == "404" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Payment not found"})),
        )
            .into_response();
    }
    match body["status"].as_str() {
        Some("pending" | "paid" | "overdue") => StatusCode::NO_CONTENT.into_response(),
        _ => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn send_reminder(Path((_id, channel)): Path<(String, String)>) -> StatusCode {
    match channel.as_str() {
        "email" | "whatsapp" => StatusCode::OK,
        _ => StatusCode::BAD_REQUEST,
    }
}

async fn import_payments(mut multipart: Multipart) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let Ok(bytes) = field.bytes().await else {
            return StatusCode::BAD_REQUEST.into_response();
        };
        return Json(json!({"fileName": file_name, "bytes": bytes.len()})).into_response();
    }
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"message": "Missing file"})),
    )
        .into_response()
}

async fn export_payments(Json(body): Json<Value>) -> Response {
    let csv = format!(
        "format={},fields={}\n",
        body["format"].as_str().unwrap_or("?"),
        body["includeFields"].as_array().map_or(0, Vec::len)
    );
    ([(header::CONTENT_TYPE, "text/csv")], csv).into_response()
}

async fn delete_member(Path(_id): Path<String>) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(3)).await;
    "late"
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/api/payments", get(list_payments))
        .route("/api/payments/stats", get(payment_stats))
        .route("/api/payments/{id}/status", patch(update_status))
        .route("/api/payments/import", post(import_payments))
        .route("/api/payments/export", post(export_payments))
        .route("/api/reminders/{id}/{channel}", post(send_reminder))
        .route("/api/members/{id}", delete(delete_member))
        .route("/api/slow", get(slow));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn config(base_url: String) -> ClientConfig {
    ClientConfig {
        base_url,
        auth_token: Some(TOKEN.to_string()),
        timeout_secs: 1,
        ..ClientConfig::default()
    }
}

async fn client() -> FitHubClient {
    let base_url = spawn_backend().await;
    FitHubClient::builder()
        .with_config(config(base_url))
        .build()
        .unwrap()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_fetch_payments_over_http() {
    let client = client().await;
    let store = client.payments();

    store.fetch_payments().await.unwrap();

    let payments = store.payments();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].id.as_str(), "1");
    assert_eq!(payments[0].status, PaymentStatus::Pending);
    assert_eq!(payments[0].due_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    assert_eq!(payments[0].amount, Decimal::new(4999, 2));
}

#[tokio::test]
async fn test_missing_token_is_rejected_with_server_message() {
    let base_url = spawn_backend().await;
    let client = FitHubClient::builder()
        .with_config(ClientConfig {
            auth_token: None,
            ..config(base_url)
        })
        .build()
        .unwrap();

    let err = client.payments().fetch_payments().await.unwrap_err();

    assert!(matches!(
        err,
        FitHubError::Gateway(GatewayError::Rejected { status: 401, .. })
    ));
    assert_eq!(client.payments().error().as_deref(), Some("Invalid token"));
}

#[tokio::test]
async fn test_stats_over_http() {
    let client = client().await;
    client.payments().fetch_payment_stats().await.unwrap();

    let stats = client.payments().stats();
    assert_eq!(stats.pending_count, 1);
    assert_eq!(stats.paid_trend.direction(), TrendDirection::Down);
}

#[tokio::test]
async fn test_status_update_and_not_found() {
    let client = client().await;
    let api = client.api();

    api.update_payment_status(&EntityId::new("1"), PaymentStatus::Paid)
        .await
        .unwrap();

    let err = api
        .update_payment_status(&EntityId::new("404"), PaymentStatus::Paid)
        .await
        .unwrap_err();
    assert_eq!(err.server_message(), Some("Payment not found"));
}

#[tokio::test]
async fn test_reminder_and_member_delete() {
    let client = client().await;

    client
        .payments()
        .send_reminder(&EntityId::new("1"), ReminderChannel::Whatsapp)
        .await
        .unwrap();
    client.members().delete(&EntityId::new("5")).await.unwrap();
}

#[tokio::test]
async fn test_multipart_upload_reaches_backend() {
    let base_url = spawn_backend().await;
    let gateway = HttpGateway::new(config(base_url)).unwrap();

    let response = gateway
        .send(GatewayRequest::post("/payments/import").file(
            "file",
            "january.csv",
            b"member,amount\nJohn,50\n".to_vec(),
        ))
        .await
        .unwrap();

    assert!(response.is_success());
    let echo: Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(echo, json!({"fileName": "january.csv", "bytes": 22}));
}

#[tokio::test]
async fn test_import_refetches_over_http() {
    let client = client().await;

    client
        .payments()
        .import_payments(ImportFile::new("january.csv", b"member,amount\n".to_vec()))
        .await
        .unwrap();

    assert_eq!(client.payments().payments().len(), 1);
}

#[tokio::test]
async fn test_export_returns_binary_body() {
    let client = client().await;

    let file = client
        .payments()
        .export_payments(&ExportRequest::default().with_format(ExportFormat::Xlsx))
        .await
        .unwrap();

    assert_eq!(file.content, b"format=xlsx,fields=5\n");
    assert!(file.file_name.ends_with(".xlsx"));
}

#[tokio::test]
async fn test_timeout_is_a_network_failure() {
    let base_url = spawn_backend().await;
    let gateway: Arc<dyn Gateway> = Arc::new(HttpGateway::new(config(base_url)).unwrap());

    let err = gateway
        .send(GatewayRequest::get("/slow"))
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Network { .. }));
}

#[tokio::test]
async fn test_unknown_route_is_rejection_not_network() {
    let base_url = spawn_backend().await;
    let api = ApiClient::new(Arc::new(HttpGateway::new(config(base_url)).unwrap()));

    let err = api.get_entity::<Staff>(&EntityId::new("1")).await.unwrap_err();

    assert!(matches!(err, GatewayError::Rejected { status: 404, message: None }));
}
