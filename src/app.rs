//! App Core for LinkSaver.
//!
//! Central struct wiring storage, the session gate, the bookmark store, the
//! filtered view, the add-link form and the summary fetcher together.
//!
//! Debounced input is driven by caller-supplied offsets in milliseconds from
//! the moment the app was opened; see [`App::instant_at`].

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::runtime::Runtime;
use tracing::info;

use crate::database::connection::Database;
use crate::managers::bookmark_store::{BookmarkStore, SubscriptionId};
use crate::managers::bookmark_view::BookmarkView;
use crate::managers::session_gate::SessionGate;
use crate::managers::url_form::{LinkSubmitter, UrlForm};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::summary_service::{SummaryFetcher, SummaryService};
use crate::storage::{LocalStorage, SqliteStorage};
use crate::types::bookmark::Bookmark;
use crate::types::errors::UrlError;

/// Central application struct holding all managers and services.
pub struct App {
    pub db: Arc<Database>,
    pub storage: Arc<dyn LocalStorage>,
    pub session_gate: SessionGate,
    pub bookmark_store: BookmarkStore,
    pub view: Arc<Mutex<BookmarkView>>,
    pub submitter: LinkSubmitter,
    pub form: UrlForm,
    pub settings_engine: SettingsEngine,
    summary: Arc<dyn SummaryFetcher>,
    view_subscription: SubscriptionId,
    runtime: Runtime,
    started: Instant,
}

impl App {
    /// Opens the app with settings from the platform config directory.
    pub fn new(db_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Self::open(db_path, SettingsEngine::new(None))
    }

    /// Opens the storage database at `db_path` and loads settings from `settings_engine`.
    pub fn open(
        db_path: &str,
        mut settings_engine: SettingsEngine,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let settings = settings_engine.load()?;

        let db = Arc::new(Database::open(db_path)?);
        let storage: Arc<dyn LocalStorage> = Arc::new(SqliteStorage::new(db.clone()));

        let session_gate = SessionGate::new(storage.clone());
        let bookmark_store = BookmarkStore::new(storage.clone());
        let debounce = Duration::from_millis(settings.search.debounce_ms);
        let (view, view_subscription) = BookmarkView::attach(&bookmark_store, debounce);

        let summary: Arc<dyn SummaryFetcher> = Arc::new(
            SummaryService::new(&settings.summary)
                .map_err(|e| format!("SummaryService init failed: {}", e))?,
        );

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        info!(db = db_path, "linksaver opened");

        Ok(Self {
            db,
            storage,
            session_gate,
            bookmark_store,
            view,
            submitter: LinkSubmitter::new(),
            form: UrlForm::new(debounce),
            settings_engine,
            summary,
            view_subscription,
            runtime,
            started: Instant::now(),
        })
    }

    /// Replaces the summary source.
    pub fn set_summary_fetcher(&mut self, fetcher: Arc<dyn SummaryFetcher>) {
        self.summary = fetcher;
    }

    /// Rebuilds the HTTP summary service from current settings.
    pub fn reload_summary_service(&mut self) -> Result<(), String> {
        let service = SummaryService::new(&self.settings_engine.get_settings().summary)
            .map_err(|e| e.to_string())?;
        self.summary = Arc::new(service);
        Ok(())
    }

    /// Pushes the current `search.debounce_ms` to the view and the form.
    pub fn apply_search_settings(&mut self) -> Result<(), String> {
        let debounce = Duration::from_millis(self.settings_engine.get_settings().search.debounce_ms);
        self.view.lock().map_err(|e| e.to_string())?.set_debounce(debounce);
        self.form.set_debounce(debounce);
        Ok(())
    }

    /// Maps an offset in milliseconds since opening onto the monotonic clock.
    /// `None` means now.
    pub fn instant_at(&self, at_ms: Option<u64>) -> Instant {
        match at_ms {
            Some(ms) => self.started + Duration::from_millis(ms),
            None => Instant::now(),
        }
    }

    /// Saves the form's draft and clears the form on success.
    pub fn submit_form(&mut self) -> Result<Bookmark, UrlError> {
        self.runtime.block_on(self.form.submit(
            &self.submitter,
            &self.bookmark_store,
            self.summary.as_ref(),
        ))
    }

    /// Validates, summarizes and saves a link, blocking until the fetch resolves.
    pub fn add_link(&self, url: &str) -> Result<Bookmark, UrlError> {
        self.runtime.block_on(
            self.submitter
                .submit(url, &self.bookmark_store, self.summary.as_ref()),
        )
    }

    pub fn view_subscription(&self) -> SubscriptionId {
        self.view_subscription
    }

    /// Detaches the view from the store.
    pub fn shutdown(&mut self) {
        self.bookmark_store.unsubscribe(self.view_subscription);
        info!("linksaver closed");
    }
}
