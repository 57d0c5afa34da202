//! Application layer for the Speshalgram client.
//!
//! Screen models that own their collections, drive pagination through the
//! API and fold write results back in with the reconciler.

pub mod pagination;
pub mod scope;
pub mod views;

pub use pagination::{LoadMore, PagedList, PaginationController};
pub use scope::{Delivery, ViewScope};
pub use views::{
    CommentOutcome, FeedView, IncomingRequestsView, LoadError, PostView, ProfileListKind, ProfileListView,
    ProfileView, ViewStatus,
};
