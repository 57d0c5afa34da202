#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use speshal_core::Result;
use speshal_core::http::{ApiResponse, HttpTransport, OutgoingRequest};
use speshal_core::session::{Session, SessionManager};
use speshal_infrastructure::InMemoryTokenStore;
use speshal_interaction::{AuthenticatedClient, SpeshalApi};
use std::sync::{Arc, Mutex};

pub const API_HOST: &str = "http://api.test";

type Handler = dyn Fn(&Method, &str) -> ApiResponse + Send + Sync;

/// Answers by method and URL path (host stripped), recording what was asked.
pub struct FakeServer {
    handler: Box<Handler>,
    requests: Mutex<Vec<OutgoingRequest>>,
}

impl FakeServer {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&Method, &str) -> ApiResponse + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<OutgoingRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.url == format!("{}{}", API_HOST, path))
            .count()
    }
}

#[async_trait]
impl HttpTransport for FakeServer {
    async fn send(&self, request: OutgoingRequest) -> Result<ApiResponse> {
        tokio::task::yield_now().await;
        self.requests.lock().unwrap().push(request.clone());
        let path = request.url.strip_prefix(API_HOST).unwrap_or(&request.url).to_string();
        Ok((self.handler)(&request.method, &path))
    }
}

pub async fn api_for(server: Arc<FakeServer>) -> SpeshalApi {
    let store = Arc::new(InMemoryTokenStore::with_session(Session::new("valid", "r")));
    let manager = SessionManager::load(store).await.unwrap();
    SpeshalApi::new(Arc::new(AuthenticatedClient::new(server, manager, API_HOST)))
}

pub fn ok(value: Value) -> ApiResponse {
    ApiResponse::json_body(StatusCode::OK, &value)
}

pub fn created(value: Value) -> ApiResponse {
    ApiResponse::json_body(StatusCode::CREATED, &value)
}

pub fn bad_request(value: Value) -> ApiResponse {
    ApiResponse::json_body(StatusCode::BAD_REQUEST, &value)
}

pub fn status(status: StatusCode) -> ApiResponse {
    ApiResponse::empty(status)
}

pub fn page(items: Vec<Value>, next: Option<&str>) -> ApiResponse {
    ok(json!({ "results": items, "next": next }))
}

pub fn short_profile(username: &str) -> Value {
    json!({ "username": username, "first_name": "", "last_name": "", "avatar": null })
}

pub fn post_json(id: u64, owner: &str) -> Value {
    json!({
        "id": id,
        "owner": { "username": owner, "first_name": "", "last_name": "", "avatar": "/media/old.png" },
        "picture": format!("/media/p{}.png", id),
        "description": format!("post {}", id),
        "nlikes": 1,
        "preview_comments": [],
        "is_liked_by_me": false
    })
}

pub fn comment_json(id: u64, owner: &str, text: &str) -> Value {
    json!({ "id": id, "owner": short_profile(owner), "text": text })
}

pub fn profile_json(username: &str, is_opened: bool, status: Option<&str>) -> Value {
    json!({
        "username": username,
        "first_name": "",
        "last_name": "",
        "description": "",
        "avatar": "/media/old.png",
        "is_opened": is_opened,
        "nfollowers": 0,
        "nfollows": 0,
        "followed_by_me_status": status
    })
}
