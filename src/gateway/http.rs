//! `reqwest`-backed gateway

use super::{Gateway, GatewayRequest, GatewayResponse, Method, RequestBody};
use crate::config::ClientConfig;
use crate::core::{FitHubError, GatewayError};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use std::time::Instant;

/// HTTP gateway talking to the FitHub backend
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpGateway {
    pub fn new(config: ClientConfig) -> Result<Self, FitHubError> {
        config
            .validate()
            .map_err(|e| FitHubError::Config(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| FitHubError::Config(format!("invalid auth token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| FitHubError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn send(&self, request: GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        let url = self.config.endpoint(&request.path);
        let route = request.route();
        let started = Instant::now();

        let builder = self.client.request(Self::method(request.method), &url);
        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::File {
                field,
                file_name,
                content,
            } => {
                let part = reqwest::multipart::Part::bytes(content).file_name(file_name);
                builder.multipart(reqwest::multipart::Form::new().part(field, part))
            }
        };

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(route = %route, error = %e, "Request did not complete");
            GatewayError::from(e)
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(GatewayError::from)?.to_vec();

        tracing::debug!(
            route = %route,
            status,
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Gateway response"
        );

        Ok(GatewayResponse { status, body })
    }
}
