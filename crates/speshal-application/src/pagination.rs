//! Cursor pagination shared by every list screen.

use crate::scope::ViewScope;
use serde::de::DeserializeOwned;
use speshal_core::Result;
use speshal_core::collection::{Collection, CollectionState};
use speshal_core::page::Page;
use speshal_interaction::SpeshalApi;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Fetches pages: the first one through a caller-supplied request, every
/// following one by dereferencing the server's cursor.
#[derive(Debug, Clone)]
pub struct PaginationController {
    api: SpeshalApi,
}

impl PaginationController {
    pub fn new(api: SpeshalApi) -> Self {
        Self { api }
    }

    pub async fn fetch_initial<T, F, Fut>(&self, fetcher: F) -> Result<Page<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Page<T>>>,
    {
        fetcher().await
    }

    /// `None` cursor yields `None` without a request.
    pub async fn fetch_more<T: DeserializeOwned>(&self, cursor: Option<&str>) -> Result<Option<Page<T>>> {
        self.api.fetch_next(cursor).await
    }
}

/// What a call to [`PagedList::load_more`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    Appended(usize),
    /// Terminal cursor, or nothing loaded yet.
    Exhausted,
    /// Another fetch for this list is outstanding; nothing was sent.
    AlreadyInFlight,
    /// The page arrived after the list was reset or its view torn down.
    Discarded,
}

/// A [`Collection`] owned by one view, plus what it needs to grow itself.
#[derive(Debug)]
pub struct PagedList<T> {
    collection: Mutex<Collection<T>>,
    controller: PaginationController,
    scope: ViewScope,
}

impl<T> PagedList<T>
where
    T: DeserializeOwned + Clone,
{
    pub fn new(controller: PaginationController, scope: ViewScope) -> Self {
        Self {
            collection: Mutex::new(Collection::new()),
            controller,
            scope,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Collection<T>> {
        self.collection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the contents with a first page.
    pub fn load(&self, page: Page<T>) {
        self.lock().load(page);
    }

    /// Marks the list "not loaded". A fetch in flight is dropped on arrival.
    pub fn discard(&self) {
        self.lock().discard();
    }

    /// Fetches and appends the next page.
    ///
    /// Re-entrant calls while a fetch is outstanding send nothing.
    ///
    /// # Errors
    ///
    /// Propagates the fetch error and releases the in-flight flag so the
    /// caller may try again.
    pub async fn load_more(&self) -> Result<LoadMore> {
        let ticket = {
            let mut collection = self.lock();
            if !collection.is_loaded() || !collection.has_more() {
                return Ok(LoadMore::Exhausted);
            }
            match collection.begin_fetch() {
                Some(ticket) => ticket,
                None => return Ok(LoadMore::AlreadyInFlight),
            }
        };

        let fetched = self.controller.fetch_more::<T>(Some(ticket.cursor())).await;

        let mut collection = self.lock();
        if !self.scope.is_active() {
            collection.abort_fetch(&ticket);
            tracing::warn!("View torn down, dropping fetched page");
            return Ok(LoadMore::Discarded);
        }
        match fetched {
            Ok(Some(page)) => {
                let count = page.items.len();
                if collection.complete_fetch(ticket, page) {
                    tracing::debug!(count, has_more = collection.has_more(), "Appended page");
                    Ok(LoadMore::Appended(count))
                } else {
                    Ok(LoadMore::Discarded)
                }
            }
            Ok(None) => {
                collection.abort_fetch(&ticket);
                Ok(LoadMore::Exhausted)
            }
            Err(e) => {
                collection.abort_fetch(&ticket);
                Err(e)
            }
        }
    }

    pub fn state(&self) -> CollectionState {
        self.lock().state()
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().is_loaded()
    }

    pub fn is_fetching(&self) -> bool {
        self.lock().is_fetching()
    }

    pub fn has_more(&self) -> bool {
        self.lock().has_more()
    }

    pub fn cursor(&self) -> Option<String> {
        self.lock().cursor().map(str::to_string)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the current items.
    pub fn items(&self) -> Vec<T> {
        self.lock().items().to_vec()
    }

    /// Reads the collection under the lock.
    pub fn with<R>(&self, f: impl FnOnce(&Collection<T>) -> R) -> R {
        f(&self.lock())
    }

    /// Mutates the collection under the lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut Collection<T>) -> R) -> R {
        f(&mut self.lock())
    }
}
