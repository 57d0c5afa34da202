//! Home feed.

use super::{LoadError, Slot, ViewStatus};
use crate::pagination::{LoadMore, PagedList, PaginationController};
use crate::scope::{Delivery, ViewScope};
use speshal_core::model::{Post, PostId};
use speshal_core::reconcile::{LikeAction, MutationReconciler};
use speshal_core::{Result, SpeshalError};
use speshal_interaction::SpeshalApi;

/// Posts of everyone the session follows. Own uploads never show up here.
#[derive(Debug)]
pub struct FeedView {
    api: SpeshalApi,
    scope: ViewScope,
    status: Slot<ViewStatus>,
    posts: PagedList<Post>,
}

impl FeedView {
    pub fn new(api: SpeshalApi) -> Self {
        let scope = ViewScope::new();
        let posts = PagedList::new(PaginationController::new(api.clone()), scope.clone());
        Self {
            api,
            scope,
            status: Slot::new(ViewStatus::Loading),
            posts,
        }
    }

    pub fn status(&self) -> ViewStatus {
        self.status.get()
    }

    pub fn posts(&self) -> &PagedList<Post> {
        &self.posts
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub async fn load(&self) -> Delivery<ViewStatus> {
        let controller = PaginationController::new(self.api.clone());
        let delivery = self
            .scope
            .run(controller.fetch_initial(|| self.api.fetch_feed()))
            .await;

        let Delivery::Delivered(result) = delivery else {
            return Delivery::Discarded;
        };
        let status = match result {
            Ok(page) => {
                self.posts.load(page);
                ViewStatus::Loaded
            }
            Err(e) => {
                tracing::debug!(error = %e, "Feed failed to load");
                ViewStatus::Failed(LoadError::from(&e))
            }
        };
        self.status.set(status.clone());
        Delivery::Delivered(status)
    }

    pub async fn load_more(&self) -> Result<LoadMore> {
        self.posts.load_more().await
    }

    /// Likes or unlikes a held post and writes the result back.
    pub async fn toggle_like(&self, id: PostId) -> Result<Delivery<Post>> {
        toggle_like_in(&self.api, &self.scope, &self.posts, id).await
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }
}

/// Shared by every view that holds a post list.
pub(crate) async fn toggle_like_in(
    api: &SpeshalApi,
    scope: &ViewScope,
    posts: &PagedList<Post>,
    id: PostId,
) -> Result<Delivery<Post>> {
    let action = posts
        .with(|c| c.get(&id).map(LikeAction::for_post))
        .ok_or_else(|| SpeshalError::not_found(format!("post {}", id)))?;

    let Delivery::Delivered(count) = scope.run(api.toggle_like(action, id)).await else {
        return Ok(Delivery::Discarded);
    };
    let count = count?;

    let updated = posts
        .update(|c| MutationReconciler::apply_like_in(c, id, action, count))
        .ok_or_else(|| SpeshalError::not_found(format!("post {}", id)))?;
    Ok(Delivery::Delivered(updated))
}
