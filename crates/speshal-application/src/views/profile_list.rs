//! Scrollable list of short profiles: followers, followings, likers.

use crate::pagination::{LoadMore, PagedList, PaginationController};
use crate::scope::ViewScope;
use speshal_core::Result;
use speshal_core::model::{PostId, ShortProfile};
use speshal_core::page::Page;
use speshal_interaction::SpeshalApi;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileListKind {
    Followers(String),
    Followings(String),
    Likes(PostId),
}

/// A failed page fetch closes the list; it stays closed until reloaded.
#[derive(Debug)]
pub struct ProfileListView {
    api: SpeshalApi,
    scope: ViewScope,
    kind: ProfileListKind,
    profiles: PagedList<ShortProfile>,
    closed: AtomicBool,
}

impl ProfileListView {
    pub fn new(api: SpeshalApi, kind: ProfileListKind) -> Self {
        let scope = ViewScope::new();
        let profiles = PagedList::new(PaginationController::new(api.clone()), scope.clone());
        Self {
            api,
            scope,
            kind,
            profiles,
            closed: AtomicBool::new(false),
        }
    }

    pub fn kind(&self) -> &ProfileListKind {
        &self.kind
    }

    pub fn profiles(&self) -> &PagedList<ShortProfile> {
        &self.profiles
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn fetch_first(&self) -> Result<Page<ShortProfile>> {
        let controller = PaginationController::new(self.api.clone());
        match &self.kind {
            ProfileListKind::Followers(username) => {
                controller.fetch_initial(|| self.api.fetch_followers(username)).await
            }
            ProfileListKind::Followings(username) => {
                controller.fetch_initial(|| self.api.fetch_followings(username)).await
            }
            ProfileListKind::Likes(id) => controller.fetch_initial(|| self.api.fetch_likes(*id)).await,
        }
    }

    pub async fn load(&self) -> Result<()> {
        match self.fetch_first().await {
            Ok(page) => {
                if self.scope.is_active() {
                    self.profiles.load(page);
                    self.closed.store(false, Ordering::SeqCst);
                }
                Ok(())
            }
            Err(e) => {
                self.close();
                Err(e)
            }
        }
    }

    pub async fn load_more(&self) -> Result<LoadMore> {
        if self.is_closed() {
            return Ok(LoadMore::Exhausted);
        }
        self.profiles.load_more().await.inspect_err(|e| {
            tracing::warn!(error = %e, "Closing profile list after failed fetch");
            self.close();
        })
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.profiles.discard();
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }
}
