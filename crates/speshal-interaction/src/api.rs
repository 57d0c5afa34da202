//! Typed Speshalgram endpoints.
//!
//! Each method builds one request, sends it through the
//! [`AuthenticatedClient`] and maps non-success statuses onto
//! [`SpeshalError`](speshal_core::SpeshalError).

use crate::client::{AuthenticatedClient, LOGIN_PATH};
use serde::de::DeserializeOwned;
use serde_json::json;
use speshal_core::Result;
use speshal_core::http::{ApiResponse, RequestOptions};
use speshal_core::model::{
    Comment, LikeCount, MyUsername, NewPost, Post, PostId, Profile, ProfilePatch, ShortProfile, TokenPair,
};
use speshal_core::page::{Listing, Page};
use speshal_core::reconcile::LikeAction;
use speshal_core::session::SessionManager;
use std::sync::Arc;
use urlencoding::encode;

#[derive(Debug, Clone)]
pub struct SpeshalApi {
    client: Arc<AuthenticatedClient>,
}

impl SpeshalApi {
    pub fn new(client: Arc<AuthenticatedClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<AuthenticatedClient> {
        &self.client
    }

    pub fn session(&self) -> &SessionManager {
        self.client.session()
    }

    async fn call(&self, path: &str, options: RequestOptions, resource: &str) -> Result<ApiResponse> {
        self.client.request(path, options).await?.error_for_status(resource)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, resource: &str) -> Result<T> {
        self.call(path, RequestOptions::get(), resource).await?.json()
    }

    async fn get_listing<T: DeserializeOwned>(&self, path: &str, resource: &str) -> Result<Page<T>> {
        Ok(self.get_json::<Listing<T>>(path, resource).await?.into())
    }

    // ============================================================================
    // Session
    // ============================================================================

    /// Exchanges credentials for a token pair and stores it.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let options = RequestOptions::post().json(json!({
            "username": username,
            "password": password,
        }));
        let tokens: TokenPair = self.call(LOGIN_PATH, options, "login").await?.json()?;
        self.session().set_tokens(&tokens.access, &tokens.refresh).await?;
        tracing::info!(username = %username, "Logged in");
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        self.session().clear().await
    }

    pub async fn is_logged_in(&self) -> Result<bool> {
        self.session().check_logged_in().await
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        let options = RequestOptions::post().json(json!({
            "username": username,
            "password": password,
        }));
        self.call("/api/users/", options, "registration").await?;
        Ok(())
    }

    // ============================================================================
    // Profiles and relations
    // ============================================================================

    pub async fn fetch_profile(&self, username: &str) -> Result<Profile> {
        self.get_json(&format!("/api/users/{}", encode(username)), &format!("user {}", username))
            .await
    }

    pub async fn fetch_my_username(&self) -> Result<String> {
        let me: MyUsername = self.get_json("/api/users/me/", "current user").await?;
        Ok(me.username)
    }

    pub async fn patch_my_profile(&self, patch: &ProfilePatch) -> Result<Profile> {
        let options = RequestOptions::patch().multipart(patch.to_form());
        self.call("/api/users/me/", options, "current user").await?.json()
    }

    pub async fn search_users(&self, query: &str) -> Result<Page<ShortProfile>> {
        self.get_listing(&format!("/api/users/?search={}", encode(query)), "user search")
            .await
    }

    pub async fn subscribe(&self, username: &str) -> Result<Profile> {
        let path = format!("/api/users/{}/subscribe/", encode(username));
        self.call(&path, RequestOptions::put(), &format!("user {}", username))
            .await?
            .json()
    }

    pub async fn cancel_subscription(&self, username: &str) -> Result<Profile> {
        let path = format!("/api/users/{}/subscribe/", encode(username));
        self.call(&path, RequestOptions::delete(), &format!("user {}", username))
            .await?
            .json()
    }

    pub async fn fetch_pending_profiles(&self) -> Result<Page<ShortProfile>> {
        self.get_listing("/api/users/pending_followers/", "pending followers")
            .await
    }

    /// `NotFound` when `username` has no pending request.
    pub async fn accept_request(&self, username: &str) -> Result<()> {
        let path = format!("/api/users/{}/accept/", encode(username));
        self.call(&path, RequestOptions::put(), &format!("request from {}", username))
            .await?;
        Ok(())
    }

    pub async fn reject_request(&self, username: &str) -> Result<()> {
        let path = format!("/api/users/{}/accept/", encode(username));
        self.call(&path, RequestOptions::delete(), &format!("request from {}", username))
            .await?;
        Ok(())
    }

    pub async fn fetch_followers(&self, username: &str) -> Result<Page<ShortProfile>> {
        let path = format!("/api/users/{}/followers/", encode(username));
        self.get_listing(&path, &format!("followers of {}", username)).await
    }

    pub async fn fetch_followings(&self, username: &str) -> Result<Page<ShortProfile>> {
        let path = format!("/api/users/{}/follows/", encode(username));
        self.get_listing(&path, &format!("followings of {}", username)).await
    }

    // ============================================================================
    // Posts
    // ============================================================================

    /// Posts of one user. A closed profile answers 401 or 403.
    pub async fn fetch_posts(&self, username: &str) -> Result<Page<Post>> {
        let path = format!("/api/posts/?username={}", encode(username));
        self.get_listing(&path, &format!("posts of {}", username)).await
    }

    pub async fn fetch_feed(&self) -> Result<Page<Post>> {
        self.get_listing("/api/posts/feed/", "feed").await
    }

    pub async fn upload_post(&self, post: &NewPost) -> Result<Post> {
        let options = RequestOptions::post().multipart(post.to_form());
        self.call("/api/posts/", options, "post").await?.json()
    }

    pub async fn fetch_post(&self, id: PostId) -> Result<Post> {
        self.get_json(&format!("/api/posts/{}/", id), &format!("post {}", id))
            .await
    }

    // ============================================================================
    // Likes and comments
    // ============================================================================

    pub async fn put_like(&self, id: PostId) -> Result<LikeCount> {
        let path = format!("/api/likes/?post_id={}", id);
        self.call(&path, RequestOptions::put(), &format!("post {}", id))
            .await?
            .json()
    }

    pub async fn delete_like(&self, id: PostId) -> Result<LikeCount> {
        let path = format!("/api/likes/?post_id={}", id);
        self.call(&path, RequestOptions::delete(), &format!("post {}", id))
            .await?
            .json()
    }

    /// Calls whichever of [`put_like`](Self::put_like) and
    /// [`delete_like`](Self::delete_like) `action` names.
    pub async fn toggle_like(&self, action: LikeAction, id: PostId) -> Result<LikeCount> {
        match action {
            LikeAction::Like => self.put_like(id).await,
            LikeAction::Unlike => self.delete_like(id).await,
        }
    }

    pub async fn fetch_likes(&self, id: PostId) -> Result<Page<ShortProfile>> {
        self.get_listing(&format!("/api/likes/?post_id={}", id), &format!("likes of post {}", id))
            .await
    }

    /// Comments, newest first.
    pub async fn fetch_comments(&self, id: PostId) -> Result<Page<Comment>> {
        self.get_listing(
            &format!("/api/comments/?post_id={}", id),
            &format!("comments of post {}", id),
        )
        .await
    }

    /// Validation errors arrive under the `text` field.
    pub async fn post_comment(&self, id: PostId, text: &str) -> Result<Comment> {
        let options = RequestOptions::post().json(json!({ "text": text }));
        self.call(&format!("/api/comments/?post_id={}", id), options, &format!("post {}", id))
            .await?
            .json()
    }

    // ============================================================================
    // Pagination
    // ============================================================================

    /// Follows a server-supplied cursor. `None` is the end of the listing and
    /// issues no request.
    pub async fn fetch_next<T: DeserializeOwned>(&self, cursor: Option<&str>) -> Result<Option<Page<T>>> {
        let Some(cursor) = cursor else {
            return Ok(None);
        };
        let page: Listing<T> = self
            .call(cursor, RequestOptions::get().absolute(), "next page")
            .await?
            .json()?;
        Ok(Some(page.into()))
    }
}
