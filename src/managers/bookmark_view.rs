//! View/Filter layer for LinkSaver.
//!
//! Keeps an in-memory snapshot of the store plus the derived visible set.
//! The visible set is the snapshot filtered by the active search query and
//! then ordered by the active [`FilterMode`]; search and mode compose.

use std::cmp::Ordering;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use icu_collator::{Collator, CollatorOptions, Strength};
use tracing::warn;

use crate::debounce::Debouncer;
use crate::managers::bookmark_store::{BookmarkStore, BookmarkStoreTrait, SubscriptionId};
use crate::types::bookmark::{Bookmark, FilterMode};

/// Default quiet period before typed search text is applied.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

pub struct BookmarkView {
    snapshot: Vec<Bookmark>,
    query: String,
    mode: FilterMode,
    visible: Vec<Bookmark>,
    typing: Debouncer<String>,
}

impl Default for BookmarkView {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl BookmarkView {
    pub fn new(debounce: Duration) -> Self {
        Self {
            snapshot: Vec::new(),
            query: String::new(),
            mode: FilterMode::All,
            visible: Vec::new(),
            typing: Debouncer::new(debounce),
        }
    }

    /// Loads the store once and keeps the snapshot current through a subscription.
    pub fn attach(store: &BookmarkStore, debounce: Duration) -> (Arc<Mutex<Self>>, SubscriptionId) {
        let mut view = Self::new(debounce);
        view.replace_snapshot(store.list());
        let view = Arc::new(Mutex::new(view));

        let weak = Arc::downgrade(&view);
        let subscription = store.subscribe(move |bookmarks| {
            if let Some(view) = weak.upgrade() {
                match view.lock() {
                    Ok(mut v) => v.replace_snapshot(bookmarks.to_vec()),
                    Err(e) => warn!(error = %e, "bookmark view lock poisoned"),
                }
            }
        });
        (view, subscription)
    }

    /// Swaps in a fresh copy of the collection and reapplies query and mode.
    pub fn replace_snapshot(&mut self, bookmarks: Vec<Bookmark>) {
        self.snapshot = bookmarks;
        self.recompute();
    }

    /// Applies a query immediately, cancelling any pending typed text.
    pub fn set_query(&mut self, query: &str) {
        self.typing.cancel();
        self.query = query.to_string();
        self.recompute();
    }

    pub fn clear_query(&mut self) {
        self.set_query("");
    }

    /// Records typed text; it takes effect on the first `tick` after the quiet period.
    pub fn type_query(&mut self, text: &str, now: Instant) {
        self.typing.push(text.to_string(), now);
    }

    /// Applies pending typed text if due. Returns whether the visible set changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.typing.poll(now) {
            Some(query) => {
                self.query = query;
                self.recompute();
                true
            }
            None => false,
        }
    }

    /// Whether typed text is still waiting out the quiet period.
    pub fn has_pending_query(&self) -> bool {
        self.typing.is_pending()
    }

    pub fn set_debounce(&mut self, debounce: Duration) {
        self.typing.set_delay(debounce);
    }

    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
        self.recompute();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn snapshot(&self) -> &[Bookmark] {
        &self.snapshot
    }

    pub fn visible(&self) -> &[Bookmark] {
        &self.visible
    }

    fn recompute(&mut self) {
        let searched = search(&self.snapshot, &self.query);
        self.visible = apply_mode(searched, self.mode);
    }
}

/// Records whose title, url or summary contain `query`, ignoring case.
/// A blank query returns the whole collection in store order.
pub fn search(bookmarks: &[Bookmark], query: &str) -> Vec<Bookmark> {
    if query.trim().is_empty() {
        return bookmarks.to_vec();
    }
    let needle = query.to_lowercase();
    bookmarks
        .iter()
        .filter(|b| b.matches_lowercase(&needle))
        .cloned()
        .collect()
}

/// Orders a list for the given mode. Sorting is stable.
pub fn apply_mode(mut bookmarks: Vec<Bookmark>, mode: FilterMode) -> Vec<Bookmark> {
    match mode {
        FilterMode::All => {}
        FilterMode::Recent => {
            bookmarks.sort_by(|a, b| created_at_millis(&b.created_at).cmp(&created_at_millis(&a.created_at)))
        }
        FilterMode::Alphabetical => bookmarks.sort_by(|a, b| locale_compare(&a.title, &b.title)),
    }
    bookmarks
}

// Unparseable timestamps sort as oldest.
fn created_at_millis(created_at: &str) -> i64 {
    DateTime::parse_from_rfc3339(created_at)
        .map(|dt| dt.with_timezone(&Utc).timestamp_millis())
        .unwrap_or(i64::MIN)
}

thread_local! {
    // Root-locale collation at tertiary strength: accents and case only
    // break ties, and lowercase sorts first.
    static COLLATOR: Option<Collator> = {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Tertiary);
        Collator::try_new(&Default::default(), options)
            .map_err(|e| warn!(error = ?e, "collation data unavailable, using case folding"))
            .ok()
    };
}

/// Unicode collation order for titles, matching a browser's default
/// `localeCompare`. Strings the collator ranks equal fall back to code
/// point order so sorting stays deterministic.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    COLLATOR
        .with(|collator| match collator {
            Some(collator) => collator.compare(a, b),
            None => fold_compare(a, b),
        })
        .then_with(|| a.cmp(b))
}

fn fold_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| case_rank(a).cmp(case_rank(b)))
}

// Lowercase ranks before anything else at the same position.
fn case_rank(s: &str) -> impl Iterator<Item = bool> + '_ {
    s.chars().map(|c| !c.is_lowercase())
}
