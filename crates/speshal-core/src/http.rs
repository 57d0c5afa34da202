//! Request/response values and the transport seam.
//!
//! Everything here is plain data so a request can be rebuilt and sent a
//! second time after a token refresh. The actual network I/O lives behind
//! [`HttpTransport`].

use crate::error::{ErrorKind, Result, SpeshalError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;

/// Body of an outgoing request.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartForm),
}

/// Value of a single multipart field.
#[derive(Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File {
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

impl fmt::Debug for PartValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            PartValue::File {
                file_name,
                mime,
                bytes,
            } => f
                .debug_struct("File")
                .field("file_name", file_name)
                .field("mime", mime)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub value: PartValue,
}

/// Multipart form kept as owned parts.
///
/// Unlike a transport-level form this can be cloned, which the single
/// retry after a refresh relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: PartValue::Text(value.into()),
        });
        self
    }

    /// Adds a file part. The MIME type is guessed from the file name.
    pub fn file(mut self, name: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .to_string();
        self.parts.push(FormPart {
            name: name.into(),
            value: PartValue::File {
                file_name,
                mime,
                bytes,
            },
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn get(&self, name: &str) -> Option<&PartValue> {
        self.parts.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Per-call options for the authenticated client.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: RequestBody,
    /// Caller supplies the complete header set (multipart uploads).
    pub skip_default_headers: bool,
    /// `path` is a server-supplied absolute URL and is used verbatim.
    pub is_absolute_path: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            skip_default_headers: false,
            is_absolute_path: false,
        }
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn patch() -> Self {
        Self::new(Method::PATCH)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    /// Multipart bodies carry their own content type, so default headers are skipped.
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self.skip_default_headers = true;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn absolute(mut self) -> Self {
        self.is_absolute_path = true;
        self
    }
}

/// A fully resolved request, ready for the wire.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl OutgoingRequest {
    /// Bearer token attached to this request, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

/// A buffered HTTP response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Response with a JSON body, mostly for tests and mocks.
    pub fn json_body(status: StatusCode, value: &serde_json::Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Self::new(status, headers, value.to_string().into_bytes())
    }

    pub fn empty(status: StatusCode) -> Self {
        Self::new(status, HeaderMap::new(), Vec::new())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Classification of a non-success response as seen by a caller.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        ErrorKind::from_status(self.status, false)
    }

    /// Passes successful responses through and turns the rest into errors.
    pub fn error_for_status(self, resource: impl Into<String>) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(SpeshalError::from_status(self.status, &self.body, resource))
        }
    }
}

/// The network seam. Implementations perform exactly one exchange per call
/// and never retry.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a request and buffers the whole response.
    ///
    /// # Errors
    ///
    /// Returns `SpeshalError::Transport` when no response was received.
    /// Non-success statuses are not errors at this level.
    async fn send(&self, request: OutgoingRequest) -> Result<ApiResponse>;
}
