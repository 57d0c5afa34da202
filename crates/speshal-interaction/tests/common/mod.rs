#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::StatusCode;
use speshal_core::http::{ApiResponse, HttpTransport, OutgoingRequest};
use speshal_core::session::{Session, SessionManager};
use speshal_core::{Result, SpeshalError};
use speshal_infrastructure::InMemoryTokenStore;
use speshal_interaction::{AuthenticatedClient, SpeshalApi};
use std::sync::{Arc, Mutex};

pub const API_HOST: &str = "http://api.test";

type Handler = dyn Fn(&OutgoingRequest) -> Result<ApiResponse> + Send + Sync;

/// Transport that answers through a closure and records every request.
///
/// Each send yields to the scheduler once so concurrent callers interleave.
pub struct ScriptedTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<OutgoingRequest>>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&OutgoingRequest) -> Result<ApiResponse> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<OutgoingRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count_path(&self, suffix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.url.ends_with(suffix))
            .count()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<ApiResponse> {
        tokio::task::yield_now().await;
        self.requests.lock().unwrap().push(request.clone());
        (self.handler)(&request)
    }
}

pub fn json(status: StatusCode, value: serde_json::Value) -> Result<ApiResponse> {
    Ok(ApiResponse::json_body(status, &value))
}

pub fn status(status: StatusCode) -> Result<ApiResponse> {
    Ok(ApiResponse::empty(status))
}

pub fn transport_failure() -> Result<ApiResponse> {
    Err(SpeshalError::transport("connection reset", false))
}

pub fn is_refresh(request: &OutgoingRequest) -> bool {
    request.url == format!("{}/api/token/refresh/", API_HOST)
}

pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub store: Arc<InMemoryTokenStore>,
    pub client: Arc<AuthenticatedClient>,
}

impl Harness {
    pub async fn new(session: Session, transport: Arc<ScriptedTransport>) -> Self {
        let store = Arc::new(InMemoryTokenStore::with_session(session));
        let manager = SessionManager::load(store.clone()).await.unwrap();
        let client = Arc::new(AuthenticatedClient::new(transport.clone(), manager, API_HOST));
        Self {
            transport,
            store,
            client,
        }
    }

    pub fn api(&self) -> SpeshalApi {
        SpeshalApi::new(self.client.clone())
    }

    pub async fn session(&self) -> Session {
        use speshal_core::session::TokenStore;
        self.store.load().await.unwrap()
    }
}

pub fn short_profile(username: &str) -> serde_json::Value {
    serde_json::json!({
        "username": username,
        "first_name": "",
        "last_name": "",
        "avatar": null
    })
}

pub fn post_json(id: u64, owner: &str, nlikes: u64, liked: bool) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "owner": short_profile(owner),
        "picture": format!("/media/p{}.png", id),
        "description": null,
        "nlikes": nlikes,
        "preview_comments": [],
        "is_liked_by_me": liked
    })
}
