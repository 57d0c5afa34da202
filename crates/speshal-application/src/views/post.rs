//! A single post with its comment thread.

use super::{LoadError, Slot, ViewStatus};
use crate::pagination::{LoadMore, PagedList, PaginationController};
use crate::scope::{Delivery, ViewScope};
use speshal_core::model::{Comment, Post, PostId};
use speshal_core::reconcile::{LikeAction, MutationReconciler};
use speshal_core::{Result, SpeshalError};
use speshal_interaction::SpeshalApi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentOutcome {
    Added(Comment),
    /// The server refused the text; the message is meant for the input field.
    Rejected(String),
    Discarded,
}

#[derive(Debug)]
pub struct PostView {
    api: SpeshalApi,
    scope: ViewScope,
    id: PostId,
    status: Slot<ViewStatus>,
    post: Slot<Option<Post>>,
    comments: PagedList<Comment>,
}

impl PostView {
    pub fn new(api: SpeshalApi, id: PostId) -> Self {
        let scope = ViewScope::new();
        let comments = PagedList::new(PaginationController::new(api.clone()), scope.clone());
        Self {
            api,
            scope,
            id,
            status: Slot::new(ViewStatus::Loading),
            post: Slot::new(None),
            comments,
        }
    }

    pub fn id(&self) -> PostId {
        self.id
    }

    pub fn status(&self) -> ViewStatus {
        self.status.get()
    }

    pub fn post(&self) -> Option<Post> {
        self.post.get()
    }

    /// Comments, newest first.
    pub fn comments(&self) -> &PagedList<Comment> {
        &self.comments
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    /// Loads the post, then its comments.
    pub async fn load(&self) -> Delivery<ViewStatus> {
        let load = async {
            let post = self.api.fetch_post(self.id).await?;
            let comments = self.api.fetch_comments(self.id).await?;
            Ok::<_, SpeshalError>((post, comments))
        };
        let Delivery::Delivered(result) = self.scope.run(load).await else {
            return Delivery::Discarded;
        };

        let status = match result {
            Ok((post, comments)) => {
                self.post.set(Some(post));
                self.comments.load(comments);
                ViewStatus::Loaded
            }
            Err(e) => {
                tracing::debug!(post = self.id, error = %e, "Post failed to load");
                ViewStatus::Failed(LoadError::from(&e))
            }
        };
        self.status.set(status.clone());
        Delivery::Delivered(status)
    }

    pub async fn load_more_comments(&self) -> Result<LoadMore> {
        self.comments.load_more().await
    }

    /// Posts a comment and shows it on top.
    pub async fn add_comment(&self, text: &str) -> Result<CommentOutcome> {
        let Delivery::Delivered(result) = self.scope.run(self.api.post_comment(self.id, text)).await else {
            return Ok(CommentOutcome::Discarded);
        };

        match result {
            Ok(comment) => {
                self.comments.update(|c| c.prepend(comment.clone()));
                Ok(CommentOutcome::Added(comment))
            }
            Err(SpeshalError::Validation(errors)) => {
                let message = errors
                    .first("text")
                    .or_else(|| errors.iter().flat_map(|(_, m)| m.first()).map(String::as_str).next())
                    .unwrap_or("Comment was rejected")
                    .to_string();
                Ok(CommentOutcome::Rejected(message))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn toggle_like(&self) -> Result<Delivery<Post>> {
        let action = self
            .post()
            .map(|p| LikeAction::for_post(&p))
            .ok_or_else(|| SpeshalError::not_found(format!("post {}", self.id)))?;

        let Delivery::Delivered(count) = self.scope.run(self.api.toggle_like(action, self.id)).await else {
            return Ok(Delivery::Discarded);
        };
        let count = count?;

        let updated = self.post.update(|held| {
            held.as_mut().map(|post| {
                MutationReconciler::apply_like(post, action, count);
                post.clone()
            })
        });
        updated
            .map(Delivery::Delivered)
            .ok_or_else(|| SpeshalError::not_found(format!("post {}", self.id)))
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }
}
