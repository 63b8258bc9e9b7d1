//! Bookmark Store for LinkSaver.
//!
//! Owns the bookmark collection persisted as one JSON array under
//! [`BOOKMARKS_KEY`]. Every mutation reads the whole array, transforms it
//! and writes the whole array back. New records are prepended, so the stored
//! order is newest first.
//!
//! Listeners registered with [`BookmarkStore::subscribe`] receive the fresh
//! collection after every successful mutation.

use std::sync::{Arc, LockResult, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::clock::{to_iso_string, Clock, SystemClock};
use crate::storage::{LocalStorage, BOOKMARKS_KEY};
use crate::types::bookmark::{Bookmark, NewBookmark, NO_SUMMARY};
use crate::types::errors::BookmarkError;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&[Bookmark]) + Send + Sync>;

/// Trait defining bookmark collection operations.
pub trait BookmarkStoreTrait {
    /// Returns the stored collection, newest first. Never fails: a missing or
    /// undecodable value yields an empty list.
    fn list(&self) -> Vec<Bookmark>;
    /// Builds a full record from the candidate, prepends it and persists.
    fn add(&self, candidate: NewBookmark) -> Result<Bookmark, BookmarkError>;
    /// Removes the record with `id`. Unknown ids are a silent no-op.
    fn delete(&self, id: i64) -> Result<(), BookmarkError>;
}

pub struct BookmarkStore {
    storage: Arc<dyn LocalStorage>,
    clock: Arc<dyn Clock>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_subscription: Mutex<u64>,
}

/// Decodes the raw stored value.
///
/// An absent value is an empty collection; anything that is not a JSON array
/// of bookmark records is `CorruptCollection`.
pub fn decode_collection(raw: Option<&str>) -> Result<Vec<Bookmark>, BookmarkError> {
    match raw {
        None => Ok(Vec::new()),
        Some(s) if s.is_empty() => Ok(Vec::new()),
        Some(s) => serde_json::from_str(s).map_err(|e| BookmarkError::CorruptCollection(e.to_string())),
    }
}

pub fn encode_collection(bookmarks: &[Bookmark]) -> Result<String, BookmarkError> {
    serde_json::to_string(bookmarks).map_err(|e| BookmarkError::SerializationError(e.to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn recover<T>(lock: LockResult<MutexGuard<'_, T>>) -> MutexGuard<'_, T> {
    lock.unwrap_or_else(|poisoned| {
        warn!("bookmark store lock was poisoned, recovering");
        poisoned.into_inner()
    })
}

impl BookmarkStore {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self::with_clock(storage, Arc::new(SystemClock))
    }

    pub fn with_clock(storage: Arc<dyn LocalStorage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            listeners: Mutex::new(Vec::new()),
            next_subscription: Mutex::new(0),
        }
    }

    /// Registers a listener called with the collection after each mutation.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&[Bookmark]) + Send + Sync + 'static,
    {
        let id = {
            let mut next = recover(self.next_subscription.lock());
            *next += 1;
            SubscriptionId(*next)
        };
        self.listeners().push((id, Box::new(listener)));
        id
    }

    /// Returns whether a listener was removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners().len()
    }

    // A listener that panicked mid-notification leaves the list intact.
    fn listeners(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Listener)>> {
        recover(self.listeners.lock())
    }

    /// Reads the collection, propagating decode and storage failures.
    fn read(&self) -> Result<Vec<Bookmark>, BookmarkError> {
        let raw = self.storage.get_item(BOOKMARKS_KEY)?;
        decode_collection(raw.as_deref())
    }

    /// Reads the collection for a mutation. A corrupt value is replaced, like `list`.
    fn read_for_write(&self) -> Result<Vec<Bookmark>, BookmarkError> {
        match self.read() {
            Err(BookmarkError::CorruptCollection(e)) => {
                warn!(error = %e, "discarding corrupt bookmark collection");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    fn write(&self, bookmarks: &[Bookmark]) -> Result<(), BookmarkError> {
        let encoded = encode_collection(bookmarks)?;
        self.storage.set_item(BOOKMARKS_KEY, &encoded)?;
        self.notify(bookmarks);
        Ok(())
    }

    fn notify(&self, bookmarks: &[Bookmark]) {
        for (_, listener) in self.listeners().iter() {
            listener(bookmarks);
        }
    }

    /// Creation time in millis, moved past the newest stored id when the
    /// clock has not advanced far enough to keep ids distinct.
    fn next_id(now_millis: i64, existing: &[Bookmark]) -> Result<i64, BookmarkError> {
        match existing.iter().map(|b| b.id).max() {
            Some(max) if now_millis <= max => {
                max.checked_add(1).ok_or(BookmarkError::IdsExhausted(max))
            }
            _ => Ok(now_millis),
        }
    }
}

impl BookmarkStoreTrait for BookmarkStore {
    fn list(&self) -> Vec<Bookmark> {
        match self.read() {
            Ok(bookmarks) => bookmarks,
            Err(e) => {
                warn!(error = %e, "failed to load bookmarks, treating as empty");
                Vec::new()
            }
        }
    }

    fn add(&self, candidate: NewBookmark) -> Result<Bookmark, BookmarkError> {
        let mut bookmarks = self.read_for_write()?;
        let now = self.clock.now();

        let NewBookmark { url, title, summary } = candidate;
        let bookmark = Bookmark {
            id: Self::next_id(now.timestamp_millis(), &bookmarks)?,
            title: non_empty(title).unwrap_or_else(|| url.clone()),
            summary: non_empty(summary).unwrap_or_else(|| NO_SUMMARY.to_string()),
            created_at: to_iso_string(now),
            url,
        };

        bookmarks.insert(0, bookmark.clone());
        self.write(&bookmarks)?;
        debug!(id = bookmark.id, url = %bookmark.url, "bookmark added");
        Ok(bookmark)
    }

    fn delete(&self, id: i64) -> Result<(), BookmarkError> {
        let mut bookmarks = self.read_for_write()?;
        if let Some(pos) = bookmarks.iter().position(|b| b.id == id) {
            bookmarks.remove(pos);
            debug!(id, "bookmark deleted");
        } else {
            debug!(id, "delete of unknown bookmark ignored");
        }
        self.write(&bookmarks)
    }
}
