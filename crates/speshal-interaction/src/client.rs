//! Authenticated HTTP client with access-token refresh.
//!
//! Every API call goes through [`AuthenticatedClient::request`]:
//!
//! 1. The URL is the configured API host plus `path`, or `path` itself for
//!    server-supplied "next" links.
//! 2. With an access token the request carries `Authorization: Bearer ...`.
//!    Any response other than 401 is returned as is.
//! 3. On 401 the refresh token is exchanged for a new access token and the
//!    original request is sent once more. That response is returned whatever
//!    its status.
//! 4. Without a refresh token, or if the refresh is rejected, the session is
//!    cleared and the original request is sent without credentials.
//!
//! Refreshes are single-flight: concurrent callers that hit a 401 with the
//! same stale token wait for the first one and reuse its result.

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::json;
use speshal_core::http::{ApiResponse, HttpTransport, OutgoingRequest, RequestBody, RequestOptions};
use speshal_core::model::RefreshedToken;
use speshal_core::session::SessionManager;
use speshal_core::{Result, SpeshalError};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const LOGIN_PATH: &str = "/api/token/";
pub const REFRESH_PATH: &str = "/api/token/refresh/";

pub struct AuthenticatedClient {
    transport: Arc<dyn HttpTransport>,
    session: SessionManager,
    api_host: String,
    refresh_lock: Mutex<()>,
}

impl AuthenticatedClient {
    pub fn new(transport: Arc<dyn HttpTransport>, session: SessionManager, api_host: impl Into<String>) -> Self {
        let api_host = api_host.into().trim_end_matches('/').to_string();
        Self {
            transport,
            session,
            api_host,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    /// Sends a request, refreshing the access token at most once.
    ///
    /// Non-success statuses are returned, not raised. The session observer
    /// is re-evaluated before returning, whatever the outcome.
    ///
    /// # Errors
    ///
    /// `Transport` when no response was received, storage errors from the
    /// token store.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<ApiResponse> {
        let url = self.resolve_url(path, options.is_absolute_path);
        let result = self.dispatch(&url, &options).await;
        self.session.check_logged_in().await?;
        result
    }

    fn resolve_url(&self, path: &str, is_absolute_path: bool) -> String {
        if is_absolute_path {
            path.to_string()
        } else {
            format!("{}{}", self.api_host, path)
        }
    }

    async fn dispatch(&self, url: &str, options: &RequestOptions) -> Result<ApiResponse> {
        let session = self.session.current().await?;
        let Some(access) = session.access_token() else {
            return self.send(url, options, None).await;
        };

        let response = self.send(url, options, Some(access)).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::debug!(url = %url, "Access token rejected");
        match self.refresh_access_token(access).await? {
            Some(fresh) => {
                tracing::debug!(url = %url, "Retrying with refreshed access token");
                self.send(url, options, Some(&fresh)).await
            }
            None => self.send(url, options, None).await,
        }
    }

    /// Obtains an access token newer than `stale`, or logs out.
    ///
    /// Returns `None` after a logout.
    async fn refresh_access_token(&self, stale: &str) -> Result<Option<String>> {
        let _guard = self.refresh_lock.lock().await;

        // Whoever held the lock before us may already have settled it.
        let session = self.session.current().await?;
        if let Some(current) = session.access_token() {
            if current != stale {
                tracing::debug!("Reusing access token refreshed by a concurrent request");
                return Ok(Some(current.to_string()));
            }
        }
        let Some(refresh) = session.refresh_token() else {
            tracing::warn!("Access token expired and no refresh token is stored, logging out");
            self.session.clear().await?;
            return Ok(None);
        };

        let options = RequestOptions::post().json(json!({ "refresh": refresh }));
        let url = self.resolve_url(REFRESH_PATH, false);
        let response = self.send(&url, &options, None).await?;

        if response.status() == StatusCode::OK {
            match response.json::<RefreshedToken>() {
                Ok(token) => {
                    self.session
                        .rotate_access_token(&token.access, token.refresh.as_deref())
                        .await?;
                    tracing::info!(rotated = token.refresh.is_some(), "Access token refreshed");
                    return Ok(Some(token.access));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Refresh response carried no access token");
                }
            }
        } else {
            tracing::warn!(status = %response.status(), "Token refresh rejected");
        }

        tracing::warn!("Logging out after failed token refresh");
        self.session.clear().await?;
        Ok(None)
    }

    async fn send(&self, url: &str, options: &RequestOptions, token: Option<&str>) -> Result<ApiResponse> {
        let request = OutgoingRequest {
            method: options.method.clone(),
            url: url.to_string(),
            headers: build_headers(options, token)?,
            body: options.body.clone(),
        };

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            authenticated = token.is_some(),
            multipart = matches!(request.body, RequestBody::Multipart(_)),
            "Sending request"
        );
        let response = self.transport.send(request).await?;
        tracing::debug!(status = %response.status(), "Received response");
        Ok(response)
    }
}

/// Default JSON headers, then caller headers, then the bearer token.
///
/// Any `Authorization` the caller passed is dropped so a stale token never
/// survives into a retry.
fn build_headers(options: &RequestOptions, token: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    if !options.skip_default_headers {
        let json = HeaderValue::from_static("application/json");
        headers.insert(CONTENT_TYPE, json.clone());
        headers.insert(ACCEPT, json);
    }
    for (name, value) in &options.headers {
        headers.insert(name.clone(), value.clone());
    }

    headers.remove(AUTHORIZATION);
    if let Some(token) = token {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| SpeshalError::storage("Stored access token is not a valid header value"))?;
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

impl std::fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("api_host", &self.api_host)
            .finish_non_exhaustive()
    }
}
