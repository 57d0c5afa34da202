//! One page of a cursor-paginated listing.

use serde::Deserialize;

/// A page as the server sends it: `{"results": [...], "next": url-or-null}`.
///
/// `cursor == None` is the terminal page. A present cursor is an absolute URL
/// and must be passed back untouched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Page<T> {
    #[serde(rename = "results")]
    pub items: Vec<T>,
    #[serde(rename = "next", default)]
    pub cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, cursor: Option<String>) -> Self {
        Self { items, cursor }
    }

    /// A page with no successor.
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }

    pub fn is_last(&self) -> bool {
        self.cursor.is_none()
    }
}

/// Some list endpoints answer with a bare array instead of a page.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Paged(Page<T>),
    Bare(Vec<T>),
}

impl<T> From<Listing<T>> for Page<T> {
    fn from(listing: Listing<T>) -> Self {
        match listing {
            Listing::Paged(page) => page,
            Listing::Bare(items) => Page::last(items),
        }
    }
}
