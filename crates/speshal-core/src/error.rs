//! Error types for the Speshalgram client.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Key under which errors that are not tied to a form field are collected.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Coarse classification of failures, shared by errors and raw responses.
///
/// `AuthExpired` is only ever observed inside the authenticated client: a 401
/// on a request that carried an access token. Callers never receive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AuthExpired,
    AuthInvalid,
    Forbidden,
    NotFound,
    Validation,
    Transport,
    Other,
}

impl ErrorKind {
    /// Classifies an HTTP status. Successful statuses have no kind.
    ///
    /// `authenticated` tells whether the request carried a bearer token, which
    /// is what separates a recoverable 401 from a terminal one.
    pub fn from_status(status: StatusCode, authenticated: bool) -> Option<Self> {
        if status.is_success() {
            return None;
        }

        Some(match status {
            StatusCode::UNAUTHORIZED if authenticated => Self::AuthExpired,
            StatusCode::UNAUTHORIZED => Self::AuthInvalid,
            StatusCode::FORBIDDEN => Self::Forbidden,
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::BAD_REQUEST => Self::Validation,
            _ => Self::Other,
        })
    }
}

/// Field-level validation messages returned with a 400 response.
///
/// The API reports them as `{"field": ["message", ...]}`. Single string values
/// and a bare `{"detail": "..."}` are accepted too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a 400 response body. Unparseable bodies become a single
    /// non-field message holding the raw text.
    pub fn from_body(body: &[u8]) -> Self {
        let mut errors = Self::new();

        match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(serde_json::Value::Object(map)) => {
                for (field, value) in map {
                    let field = if field == "detail" {
                        NON_FIELD_ERRORS.to_string()
                    } else {
                        field
                    };
                    match value {
                        serde_json::Value::Array(items) => {
                            for item in items {
                                errors.push(&field, value_to_message(item));
                            }
                        }
                        other => errors.push(&field, value_to_message(other)),
                    }
                }
            }
            Ok(serde_json::Value::Array(items)) => {
                for item in items {
                    errors.push(NON_FIELD_ERRORS, value_to_message(item));
                }
            }
            Ok(other) => errors.push(NON_FIELD_ERRORS, value_to_message(other)),
            Err(_) => {
                let text = String::from_utf8_lossy(body).trim().to_string();
                if !text.is_empty() {
                    errors.push(NON_FIELD_ERRORS, text);
                }
            }
        }

        errors
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Messages for one field, empty when the field is valid.
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First message for a field, convenient for single-line form hints.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.field(field).first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(", "))?;
        }
        Ok(())
    }
}

fn value_to_message(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// A shared error type for the whole client.
#[derive(Error, Debug, Clone)]
pub enum SpeshalError {
    /// 401 that could not be recovered: no session, or the refresh was rejected.
    #[error("Authentication required")]
    AuthInvalid,

    /// 403 for a resource the session may not see (e.g. a closed profile).
    #[error("Access forbidden: {resource}")]
    Forbidden { resource: String },

    /// 404 for a resource that does not exist.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// 400 with field-level messages for the originating form.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Network unreachable, connection reset, timeout. Never retried here.
    #[error("Transport error: {message}")]
    Transport { message: String, timeout: bool },

    /// Any other non-success status.
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Token storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SpeshalError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn forbidden(resource: impl Into<String>) -> Self {
        Self::Forbidden {
            resource: resource.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn transport(message: impl Into<String>, timeout: bool) -> Self {
        Self::Transport {
            message: message.into(),
            timeout,
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Builds the error for a non-success response.
    ///
    /// `resource` names what was requested and only shows up in messages.
    pub fn from_status(status: StatusCode, body: &[u8], resource: impl Into<String>) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::Validation(FieldErrors::from_body(body)),
            StatusCode::UNAUTHORIZED => Self::AuthInvalid,
            StatusCode::FORBIDDEN => Self::forbidden(resource),
            StatusCode::NOT_FOUND => Self::not_found(resource),
            other => Self::UnexpectedStatus {
                status: other.as_u16(),
                body: String::from_utf8_lossy(body).into_owned(),
            },
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthInvalid => ErrorKind::AuthInvalid,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Transport { .. } => ErrorKind::Transport,
            _ => ErrorKind::Other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    pub fn is_auth_invalid(&self) -> bool {
        matches!(self, Self::AuthInvalid)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Field errors carried by a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for SpeshalError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for SpeshalError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SpeshalError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for SpeshalError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, SpeshalError>`.
pub type Result<T> = std::result::Result<T, SpeshalError>;
