//! Failure taxonomy and classification.
//!
//! Every layer below the public surface works with [`Failure`], the raw
//! outcome of a dispatch attempt. Nothing raw crosses the client boundary:
//! the interceptor runs each failure through [`classify`] and hands the
//! caller an [`ErrorRecord`] with a human-readable message.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

pub(crate) const GENERIC_MESSAGE: &str = "Something went wrong!";
pub(crate) const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Raw failure of a single attempt chain.
#[derive(Debug, Error)]
pub(crate) enum Failure {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected response status: {status}")]
    Status { status: u16, body: String },

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Failure {
    /// Transport failures, timeouts, and 5xx responses are worth another
    /// attempt; everything else is a caller error and short-circuits.
    pub(crate) fn is_retriable(&self) -> bool {
        match self {
            Failure::Transport(_) | Failure::Timeout => true,
            Failure::Status { status, .. } => *status >= 500,
            Failure::Url(_) => false,
        }
    }
}

/// Category of a surfaced failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection-level failure; the request may never have reached the server.
    Transport,
    /// The per-attempt deadline elapsed and the call was canceled.
    Timeout,
    /// HTTP 401.
    Unauthorized,
    /// HTTP 403.
    Forbidden,
    /// HTTP 404.
    NotFound,
    /// HTTP 409.
    Conflict,
    /// HTTP 422; per-field messages may be present in `field_errors`.
    ValidationFailed,
    /// Any HTTP 5xx.
    ServerError,
    /// Credential renewal failed, or a request kept failing with 401 after one
    /// refresh-and-retry. The stored token has been invalidated.
    Auth,
    /// Anything else.
    Unknown,
}

/// Normalized failure handed to callers.
///
/// Constructed once per failed attempt chain and never mutated afterwards.
#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub http_status: Option<u16>,
    pub message: String,
    /// Field name to message, parsed from validation payloads.
    pub field_errors: Option<HashMap<String, String>>,
}

impl ErrorRecord {
    pub(crate) fn auth(http_status: Option<u16>) -> Self {
        Self {
            kind: ErrorKind::Auth,
            http_status,
            message: SESSION_EXPIRED_MESSAGE.to_string(),
            field_errors: None,
        }
    }

    pub(crate) fn unknown(message: String) -> Self {
        Self {
            kind: ErrorKind::Unknown,
            http_status: None,
            message,
            field_errors: None,
        }
    }
}

/* ----------------- error payload wire shape ----------------- */

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireError {
    #[allow(dead_code)]
    #[serde(default)]
    status_code: Option<u16>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<WireMessage>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireMessage {
    One(String),
    Many(Vec<String>),
}

impl WireError {
    /// First available message string: `message`, then `title`, then `error`.
    fn best_message(&self) -> Option<String> {
        match &self.message {
            Some(WireMessage::One(s)) if !s.is_empty() => return Some(s.clone()),
            Some(WireMessage::Many(items)) if !items.is_empty() => {
                return Some(items.join(". "));
            }
            _ => {}
        }
        if let Some(title) = &self.title
            && !title.is_empty()
        {
            return Some(title.clone());
        }
        self.error.clone().filter(|e| !e.is_empty())
    }
}

/// Parse `"<field>: <message>"` entries into a field-to-message mapping.
fn parse_field_errors(items: &[String]) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for item in items {
        if let Some((field, message)) = item.split_once(':') {
            let field = field.trim();
            let message = message.trim();
            if !field.is_empty() && !message.is_empty() {
                out.insert(field.to_string(), message.to_string());
            }
        }
    }
    out
}

/// Map a raw [`Failure`] to an [`ErrorRecord`]. Pure; never fails.
pub(crate) fn classify(failure: &Failure) -> ErrorRecord {
    match failure {
        Failure::Transport(e) => ErrorRecord {
            kind: ErrorKind::Transport,
            http_status: None,
            message: if e.is_connect() {
                "Unable to reach the server. Please check your connection.".to_string()
            } else {
                format!("Request failed: {e}")
            },
            field_errors: None,
        },
        Failure::Timeout => ErrorRecord {
            kind: ErrorKind::Timeout,
            http_status: None,
            message: "The request timed out. Please try again.".to_string(),
            field_errors: None,
        },
        Failure::Status { status, body } => classify_response(*status, body),
        Failure::Url(e) => ErrorRecord::unknown(format!("Invalid request URL: {e}")),
    }
}

/// Map an HTTP error response to an [`ErrorRecord`].
///
/// Known statuses carry a fixed human-readable message; for anything else the
/// payload's message (`message` string or array, `title`, `error`) is used,
/// falling back to a generic default. A `message` array whose entries match
/// `"<field>: <message>"` additionally yields `field_errors`.
pub fn classify_response(status: u16, body: &str) -> ErrorRecord {
    let wire: Option<WireError> = serde_json::from_str(body).ok();

    let kind = match status {
        401 => ErrorKind::Unauthorized,
        403 => ErrorKind::Forbidden,
        404 => ErrorKind::NotFound,
        409 => ErrorKind::Conflict,
        422 => ErrorKind::ValidationFailed,
        s if s >= 500 => ErrorKind::ServerError,
        _ => ErrorKind::Unknown,
    };

    let field_errors = wire.as_ref().and_then(|w| match &w.message {
        Some(WireMessage::Many(items)) => {
            let map = parse_field_errors(items);
            (!map.is_empty()).then_some(map)
        }
        _ => None,
    });

    let message = match kind {
        ErrorKind::Unauthorized => SESSION_EXPIRED_MESSAGE.to_string(),
        ErrorKind::Forbidden => "You do not have permission to perform this action.".to_string(),
        ErrorKind::NotFound => "The requested resource was not found.".to_string(),
        ErrorKind::Conflict => "This operation cannot be completed due to a conflict.".to_string(),
        ErrorKind::ValidationFailed => {
            "Validation failed. Please check your input and try again.".to_string()
        }
        ErrorKind::ServerError => "Server error. Please try again later.".to_string(),
        _ => wire
            .as_ref()
            .and_then(WireError::best_message)
            .unwrap_or_else(|| GENERIC_MESSAGE.to_string()),
    };

    ErrorRecord {
        kind,
        http_status: Some(status),
        message,
        field_errors,
    }
}
