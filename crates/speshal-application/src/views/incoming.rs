//! Pending follow requests addressed to the session's user.

use super::{LoadError, Slot, ViewStatus};
use crate::pagination::{LoadMore, PagedList, PaginationController};
use crate::scope::{Delivery, ViewScope};
use speshal_core::Result;
use speshal_core::model::ShortProfile;
use speshal_core::reconcile::MutationReconciler;
use speshal_interaction::SpeshalApi;

#[derive(Debug)]
pub struct IncomingRequestsView {
    api: SpeshalApi,
    scope: ViewScope,
    status: Slot<ViewStatus>,
    pending: PagedList<ShortProfile>,
}

impl IncomingRequestsView {
    pub fn new(api: SpeshalApi) -> Self {
        let scope = ViewScope::new();
        let pending = PagedList::new(PaginationController::new(api.clone()), scope.clone());
        Self {
            api,
            scope,
            status: Slot::new(ViewStatus::Loading),
            pending,
        }
    }

    pub fn status(&self) -> ViewStatus {
        self.status.get()
    }

    pub fn pending(&self) -> &PagedList<ShortProfile> {
        &self.pending
    }

    pub async fn load(&self) -> Delivery<ViewStatus> {
        let Delivery::Delivered(result) = self.scope.run(self.api.fetch_pending_profiles()).await else {
            return Delivery::Discarded;
        };
        let status = match result {
            Ok(page) => {
                self.pending.load(page);
                ViewStatus::Loaded
            }
            Err(e) => ViewStatus::Failed(LoadError::from(&e)),
        };
        self.status.set(status.clone());
        Delivery::Delivered(status)
    }

    pub async fn load_more(&self) -> Result<LoadMore> {
        self.pending.load_more().await
    }

    /// Accepts and removes the request. Returns whether an entry was removed.
    pub async fn accept(&self, username: &str) -> Result<Delivery<bool>> {
        let Delivery::Delivered(result) = self.scope.run(self.api.accept_request(username)).await else {
            return Ok(Delivery::Discarded);
        };
        result?;
        Ok(Delivery::Delivered(self.remove(username)))
    }

    pub async fn reject(&self, username: &str) -> Result<Delivery<bool>> {
        let Delivery::Delivered(result) = self.scope.run(self.api.reject_request(username)).await else {
            return Ok(Delivery::Discarded);
        };
        result?;
        Ok(Delivery::Delivered(self.remove(username)))
    }

    fn remove(&self, username: &str) -> bool {
        self.pending
            .update(|pending| MutationReconciler::apply_request_answered(pending, username))
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }
}
