//! `HttpTransport` over reqwest.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use speshal_core::config::ClientConfig;
use speshal_core::http::{ApiResponse, HttpTransport, MultipartForm, OutgoingRequest, PartValue, RequestBody};
use speshal_core::{Result, SpeshalError};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SpeshalError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(Duration::from_secs(config.timeout_secs))
    }
}

fn transport_error(err: reqwest::Error) -> SpeshalError {
    SpeshalError::transport(err.to_string(), err.is_timeout())
}

/// Rebuilds a reqwest form. reqwest forms are single-use, so this runs per send.
fn to_reqwest_form(form: &MultipartForm) -> Result<Form> {
    let mut out = Form::new();
    for part in form.parts() {
        out = match &part.value {
            PartValue::Text(text) => out.text(part.name.clone(), text.clone()),
            PartValue::File {
                file_name,
                mime,
                bytes,
            } => {
                let file = Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(mime)
                    .map_err(|e| SpeshalError::config(format!("Invalid MIME type '{}': {}", mime, e)))?;
                out.part(part.name.clone(), file)
            }
        };
    }
    Ok(out)
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<ApiResponse> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(form) => builder.multipart(to_reqwest_form(form)?),
        };

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(transport_error)?;

        Ok(ApiResponse::new(status, headers, body.to_vec()))
    }
}
