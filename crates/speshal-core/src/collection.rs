//! Client-held paginated collections.
//!
//! A [`Collection`] accumulates pages in server order and remembers the last
//! cursor. It is owned by exactly one view; other views holding copies of the
//! same entities are updated through the reconciler, never by sharing.

use crate::page::Page;
use std::fmt;

/// Entities that can be matched across collections by a stable key.
pub trait Identified {
    type Key: PartialEq + Clone + fmt::Debug;

    fn identity(&self) -> Self::Key;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionState {
    /// Nothing fetched yet, or contents were discarded.
    NotLoaded,
    Loaded,
}

/// Permission to fetch the next page, handed out by [`Collection::begin_fetch`].
///
/// A ticket from before a `load`/`discard` is stale and its page is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct FetchTicket {
    cursor: String,
    generation: u64,
}

impl FetchTicket {
    pub fn cursor(&self) -> &str {
        &self.cursor
    }
}

#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
    cursor: Option<String>,
    state: CollectionState,
    in_flight: bool,
    generation: u64,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            state: CollectionState::NotLoaded,
            in_flight: false,
            generation: 0,
        }
    }
}

impl<T> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_page(page: Page<T>) -> Self {
        let mut collection = Self::new();
        collection.load(page);
        collection
    }

    /// Replaces the contents with a first page.
    pub fn load(&mut self, page: Page<T>) {
        self.items = page.items;
        self.cursor = page.cursor;
        self.state = CollectionState::Loaded;
        self.in_flight = false;
        self.generation += 1;
    }

    /// Drops all contents and marks the collection as not loaded.
    ///
    /// Any fetch in flight is invalidated.
    pub fn discard(&mut self) {
        self.items.clear();
        self.cursor = None;
        self.state = CollectionState::NotLoaded;
        self.in_flight = false;
        self.generation += 1;
    }

    pub fn state(&self) -> CollectionState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == CollectionState::Loaded
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.cursor.is_some()
    }

    /// Marks a fetch as in flight and returns the cursor to fetch.
    ///
    /// Returns `None` when nothing should be fetched: not loaded, terminal
    /// cursor, or another fetch already outstanding.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        if self.in_flight || !self.is_loaded() {
            return None;
        }
        let cursor = self.cursor.clone()?;
        self.in_flight = true;
        Some(FetchTicket {
            cursor,
            generation: self.generation,
        })
    }

    /// Appends a fetched page. Returns `false` if the ticket went stale and
    /// the page was dropped.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, page: Page<T>) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.in_flight = false;
        self.append_page(page);
        true
    }

    /// Releases the in-flight flag after a failed fetch.
    pub fn abort_fetch(&mut self, ticket: &FetchTicket) {
        if ticket.generation == self.generation {
            self.in_flight = false;
        }
    }

    /// Appends items in server order and takes over the page's cursor.
    pub fn append_page(&mut self, page: Page<T>) {
        self.items.extend(page.items);
        self.cursor = page.cursor;
    }

    /// Inserts at the front, e.g. a freshly created post or comment.
    pub fn prepend(&mut self, item: T) {
        self.items.insert(0, item);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Applies `f` to every item matching `predicate`, returning how many matched.
    pub fn update_where<P, F>(&mut self, mut predicate: P, mut f: F) -> usize
    where
        P: FnMut(&T) -> bool,
        F: FnMut(&mut T),
    {
        let mut touched = 0;
        for item in self.items.iter_mut().filter(|item| predicate(&**item)) {
            f(item);
            touched += 1;
        }
        touched
    }
}

impl<T: Identified> Collection<T> {
    pub fn position(&self, key: &T::Key) -> Option<usize> {
        self.items.iter().position(|item| item.identity() == *key)
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.position(key).map(|i| &self.items[i])
    }

    /// Positional replacement of the item with the same identity.
    pub fn replace(&mut self, item: T) -> bool {
        match self.position(&item.identity()) {
            Some(i) => {
                self.items[i] = item;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &T::Key) -> Option<T> {
        self.position(key).map(|i| self.items.remove(i))
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: u32,
        label: &'static str,
    }

    impl Identified for Item {
        type Key = u32;

        fn identity(&self) -> u32 {
            self.id
        }
    }

    fn item(id: u32, label: &'static str) -> Item {
        Item { id, label }
    }

    #[test]
    fn test_pages_append_in_server_order() {
        let mut collection = Collection::from_page(Page::new(
            vec![item(1, "a"), item(2, "b")],
            Some("http://api/next?c=1".to_string()),
        ));

        let ticket = collection.begin_fetch().unwrap();
        assert_eq!(ticket.cursor(), "http://api/next?c=1");
        assert!(collection.complete_fetch(
            ticket,
            Page::new(vec![item(3, "c"), item(4, "d")], Some("http://api/next?c=2".to_string())),
        ));

        let labels: Vec<_> = collection.iter().map(|i| i.label).collect();
        assert_eq!(labels, vec!["a", "b", "c", "d"]);
        assert_eq!(collection.cursor(), Some("http://api/next?c=2"));
    }

    #[test]
    fn test_no_dedup_across_pages() {
        let mut collection =
            Collection::from_page(Page::new(vec![item(1, "a")], Some("n".to_string())));
        let ticket = collection.begin_fetch().unwrap();
        collection.complete_fetch(ticket, Page::last(vec![item(1, "a")]));

        assert_eq!(collection.len(), 2);
        assert!(!collection.has_more());
    }

    #[test]
    fn test_begin_fetch_is_exclusive() {
        let mut collection =
            Collection::from_page(Page::new(vec![item(1, "a")], Some("n".to_string())));

        let ticket = collection.begin_fetch();
        assert!(ticket.is_some());
        assert!(collection.is_fetching());
        assert!(collection.begin_fetch().is_none());

        collection.abort_fetch(&ticket.unwrap());
        assert!(!collection.is_fetching());
        assert!(collection.begin_fetch().is_some());
    }

    #[test]
    fn test_begin_fetch_at_terminal_or_unloaded() {
        let mut terminal = Collection::from_page(Page::last(vec![item(1, "a")]));
        assert!(terminal.begin_fetch().is_none());

        let mut unloaded: Collection<Item> = Collection::new();
        assert!(unloaded.begin_fetch().is_none());
    }

    #[test]
    fn test_discard_invalidates_in_flight_fetch() {
        let mut collection =
            Collection::from_page(Page::new(vec![item(1, "a")], Some("n".to_string())));
        let ticket = collection.begin_fetch().unwrap();

        collection.discard();
        assert!(!collection.complete_fetch(ticket, Page::last(vec![item(2, "b")])));
        assert!(collection.is_empty());
        assert_eq!(collection.state(), CollectionState::NotLoaded);
    }

    #[test]
    fn test_replace_by_identity_keeps_position() {
        let mut collection =
            Collection::from_page(Page::last(vec![item(1, "a"), item(2, "b"), item(3, "c")]));

        assert!(collection.replace(item(2, "B")));
        assert!(!collection.replace(item(9, "z")));
        assert_eq!(collection.items()[1], item(2, "B"));

        collection.prepend(item(0, "new"));
        assert_eq!(collection.position(&2), Some(2));
        assert_eq!(collection.remove(&0), Some(item(0, "new")));
    }
}
