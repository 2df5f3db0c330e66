//! Typed error handling for the FitHub client
//!
//! Errors are split by where they originate so callers can offer
//! operation-specific recovery (retry buttons, form hints) instead of
//! matching on strings.
//!
//! # Error Categories
//!
//! - [`GatewayError`]: the request did not complete, the server rejected it,
//!   or the response did not match the expected schema
//! - [`ValidationError`]: a draft failed local validation before any request
//! - [`FitHubError::Config`]: configuration could not be loaded
//! - [`FitHubError::Io`]: an import source or export target could not be
//!   read or written
//!
//! # Example
//!
//! ```rust,ignore
//! match store.update_payment_status(&id, PaymentStatus::Paid).await {
//!     Ok(()) => {}
//!     Err(FitHubError::Gateway(GatewayError::Network { .. })) => offer_retry(),
//!     Err(e) => show(e.user_message("Failed to update payment status")),
//! }
//! ```

use thiserror::Error;

/// The main error type of the crate
#[derive(Debug, Error)]
pub enum FitHubError {
    /// Errors raised by the remote data gateway
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Local validation of a draft failed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A record was expected in a local collection but is absent
    #[error("{entity_type} with id '{id}' not found")]
    NotFound { entity_type: String, id: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local I/O (import source files, export targets)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FitHubError {
    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            FitHubError::Gateway(e) => e.error_code(),
            FitHubError::Validation(_) => "VALIDATION_ERROR",
            FitHubError::NotFound { .. } => "NOT_FOUND",
            FitHubError::Config(_) => "CONFIG_ERROR",
            FitHubError::Io(_) => "IO_ERROR",
        }
    }

    /// Human-readable message for display
    ///
    /// A message supplied by the server always wins. Otherwise gateway
    /// failures collapse to `fallback`, while local failures keep their
    /// own description.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            FitHubError::Gateway(e) => e
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
            FitHubError::Validation(e) => e.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Whether retrying the same operation could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            FitHubError::Gateway(GatewayError::Network { .. }) => true,
            FitHubError::Gateway(GatewayError::Rejected { status, .. }) => *status >= 500,
            _ => false,
        }
    }
}

// =============================================================================
// Gateway Errors
// =============================================================================

/// Errors raised at the HTTP boundary
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The request never produced a response (DNS, connect, timeout, ...)
    #[error("Network failure: {message}")]
    Network { message: String },

    /// The server answered with a non-success status
    #[error("Server rejected request with status {status}{}", fmt_server_message(.message))]
    Rejected { status: u16, message: Option<String> },

    /// The response body did not match the expected schema
    #[error("Malformed {resource} payload: {message}")]
    MalformedPayload { resource: String, message: String },

    /// The request body could not be encoded, so nothing was sent
    #[error("Failed to encode request body: {message}")]
    Encoding { message: String },
}

fn fmt_server_message(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {}", m),
        None => String::new(),
    }
}

impl GatewayError {
    /// Build a rejection from a status and raw body, extracting `message`
    /// from a JSON body when present
    pub fn rejected(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .filter(|m| !m.trim().is_empty());

        GatewayError::Rejected { status, message }
    }

    pub fn malformed(resource: impl Into<String>, err: impl std::fmt::Display) -> Self {
        GatewayError::MalformedPayload {
            resource: resource.into(),
            message: err.to_string(),
        }
    }

    /// The message supplied by the server, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            GatewayError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Network { .. } => "NETWORK_FAILURE",
            GatewayError::Rejected { .. } => "SERVER_REJECTION",
            GatewayError::MalformedPayload { .. } => "MALFORMED_PAYLOAD",
            GatewayError::Encoding { .. } => "ENCODING_FAILURE",
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Network {
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to draft validation
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// Single field validation error
    #[error("Validation failed for field '{field}': {message}")]
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    #[error("Validation failed: {}", .0.join("; "))]
    FieldErrors(Vec<String>),
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{}: {}", field, msg),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        messages.sort();

        if messages.len() == 1 {
            let (field, message) = messages[0]
                .split_once(": ")
                .map(|(f, m)| (f.to_string(), m.to_string()))
                .unwrap_or_default();
            ValidationError::FieldError { field, message }
        } else {
            ValidationError::FieldErrors(messages)
        }
    }
}

impl From<validator::ValidationErrors> for FitHubError {
    fn from(errors: validator::ValidationErrors) -> Self {
        FitHubError::Validation(errors.into())
    }
}

impl From<serde_yaml::Error> for FitHubError {
    fn from(err: serde_yaml::Error) -> Self {
        FitHubError::Config(err.to_string())
    }
}

/// Result type alias using FitHubError
pub type FitHubResult<T> = Result<T, FitHubError>;
