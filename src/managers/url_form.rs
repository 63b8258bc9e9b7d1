//! Add-link flow for LinkSaver.
//!
//! [`UrlForm`] holds the draft URL and its debounced live validity.
//! [`LinkSubmitter`] runs one submission at a time: validate, fetch the
//! summary, derive a title, save.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use reqwest::Url;
use tracing::{debug, info};

use crate::debounce::Debouncer;
use crate::managers::bookmark_store::{BookmarkStore, BookmarkStoreTrait};
use crate::services::summary_service::SummaryFetcher;
use crate::services::title_extractor::extract_title;
use crate::types::bookmark::{Bookmark, NewBookmark};
use crate::types::errors::UrlError;

/// Default quiet period before the draft is validated.
pub const VALIDATION_DEBOUNCE: Duration = Duration::from_millis(500);

/// Syntax check performed before any network call.
pub fn validate_url(input: &str) -> Result<Url, UrlError> {
    if input.is_empty() {
        return Err(UrlError::Empty);
    }
    Url::parse(input).map_err(|e| UrlError::Invalid(e.to_string()))
}

pub struct UrlForm {
    draft: String,
    validity: Option<bool>,
    checker: Debouncer<String>,
}

impl Default for UrlForm {
    fn default() -> Self {
        Self::new(VALIDATION_DEBOUNCE)
    }
}

impl UrlForm {
    pub fn new(debounce: Duration) -> Self {
        Self {
            draft: String::new(),
            validity: None,
            checker: Debouncer::new(debounce),
        }
    }

    /// Records an edit. Clearing the field resets validity at once.
    pub fn edit(&mut self, text: &str, now: Instant) {
        self.draft = text.to_string();
        if text.is_empty() {
            self.checker.cancel();
            self.validity = None;
        } else {
            self.checker.push(text.to_string(), now);
        }
    }

    /// Publishes validity for the latest draft once the quiet period has passed.
    pub fn tick(&mut self, now: Instant) -> Option<bool> {
        if let Some(text) = self.checker.poll(now) {
            self.validity = Some(validate_url(&text).is_ok());
        }
        self.validity
    }

    pub fn set_debounce(&mut self, debounce: Duration) {
        self.checker.set_delay(debounce);
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// `None` until the first check completes, or while the field is empty.
    pub fn validity(&self) -> Option<bool> {
        self.validity
    }

    /// Submit is disabled while a save is running or the draft is known invalid.
    pub fn can_submit(&self, submitter: &LinkSubmitter) -> bool {
        !submitter.is_busy() && self.validity != Some(false)
    }

    /// Submits the draft and clears the form on success.
    pub async fn submit(
        &mut self,
        submitter: &LinkSubmitter,
        store: &BookmarkStore,
        fetcher: &dyn SummaryFetcher,
    ) -> Result<Bookmark, UrlError> {
        let bookmark = submitter.submit(&self.draft, store, fetcher).await?;
        self.draft.clear();
        self.validity = None;
        self.checker.cancel();
        Ok(bookmark)
    }
}

/// Serializes submissions: a second call while one is in flight fails with `Busy`.
#[derive(Debug, Default)]
pub struct LinkSubmitter {
    busy: AtomicBool,
}

// Clears the busy flag on every exit path.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl LinkSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub async fn submit(
        &self,
        input: &str,
        store: &BookmarkStore,
        fetcher: &dyn SummaryFetcher,
    ) -> Result<Bookmark, UrlError> {
        let url = validate_url(input)?;

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(UrlError::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        debug!(url = %url, "fetching summary");
        let summary = fetcher.fetch_summary(input).await;
        let title = extract_title(input);

        let bookmark = store.add(
            NewBookmark::new(input)
                .with_title(title)
                .with_summary(summary),
        )?;
        info!(id = bookmark.id, "link saved");
        Ok(bookmark)
    }
}
