//! Unit tests for the RPC handler, covering every JSON-RPC method dispatched by `handle_method`.
//!
//! Runs against a temporary on-disk database with a canned summary source,
//! so no network access is needed.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use linksaver::app::App;
use linksaver::managers::bookmark_store::BookmarkStoreTrait;
use linksaver::rpc_handler::handle_method;
use linksaver::services::settings_engine::SettingsEngine;
use linksaver::services::summary_service::SummaryFetcher;

struct CannedSummary;

#[async_trait]
impl SummaryFetcher for CannedSummary {
    async fn fetch_summary(&self, url: &str) -> String {
        format!("Summary of {}", url)
    }
}

/// Create a fresh App backed by a temp directory, not yet signed in.
fn setup() -> (Mutex<App>, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let db_path = tmp.path().join("test.db");
    let settings_path = tmp.path().join("settings.json").to_string_lossy().to_string();
    let mut app = App::open(
        db_path.to_str().unwrap(),
        SettingsEngine::new(Some(settings_path)),
    )
    .expect("Failed to init App");
    app.set_summary_fetcher(Arc::new(CannedSummary));
    (Mutex::new(app), tmp)
}

fn signed_in() -> (Mutex<App>, TempDir) {
    let (app, tmp) = setup();
    handle_method(
        &app,
        "auth.login",
        &json!({"email": "demo@test.com", "password": "password123"}),
    )
    .unwrap();
    (app, tmp)
}

fn add(app: &Mutex<App>, url: &str) -> Value {
    handle_method(app, "bookmark.add", &json!({ "url": url })).unwrap()
}

fn visible_titles(res: &Value) -> Vec<String> {
    res["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap().to_string())
        .collect()
}

// ─── Ping / unknown ───

#[test]
fn test_ping() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "ping", &json!({})).unwrap();
    assert_eq!(res, json!({"pong": true}));
}

#[test]
fn test_unknown_method_returns_error() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "nonexistent.method", &json!({}));
    assert!(res.unwrap_err().contains("unknown method"));
}

// ─── Session ───

#[test]
fn test_login_status_logout() {
    let (app, _tmp) = setup();
    assert_eq!(
        handle_method(&app, "auth.status", &json!({})).unwrap(),
        json!({"authenticated": false})
    );

    handle_method(
        &app,
        "auth.login",
        &json!({"email": "demo@test.com", "password": "password123"}),
    )
    .unwrap();
    assert_eq!(
        handle_method(&app, "auth.status", &json!({})).unwrap(),
        json!({"authenticated": true})
    );

    handle_method(&app, "auth.logout", &json!({})).unwrap();
    assert_eq!(
        handle_method(&app, "auth.status", &json!({})).unwrap(),
        json!({"authenticated": false})
    );
}

#[test]
fn test_login_failures_carry_form_messages() {
    let (app, _tmp) = setup();
    let err = handle_method(
        &app,
        "auth.login",
        &json!({"email": "demo@test.com", "password": "bad"}),
    )
    .unwrap_err();
    assert_eq!(err, "Invalid credentials. Try demo@test.com / password123");

    let err = handle_method(&app, "auth.login", &json!({})).unwrap_err();
    assert_eq!(err, "Please enter both email and password");
}

#[test]
fn test_bookmark_methods_require_session() {
    let (app, _tmp) = setup();
    for method in [
        "bookmark.list",
        "bookmark.add",
        "view.visible",
        "view.search",
        "view.type",
        "view.tick",
        "form.edit",
        "form.tick",
        "form.state",
        "form.submit",
    ] {
        let err = handle_method(&app, method, &json!({"url": "https://a.com", "query": ""})).unwrap_err();
        assert_eq!(err, "not signed in", "method {}", method);
    }
}

// ─── Bookmarks ───

#[test]
fn test_bookmark_add_and_list() {
    let (app, _tmp) = signed_in();

    let res = add(&app, "https://example.com/getting-started");
    assert_eq!(res["url"], "https://example.com/getting-started");
    assert_eq!(res["title"], "Getting Started");
    assert_eq!(res["summary"], "Summary of https://example.com/getting-started");
    assert!(res["id"].as_i64().is_some());
    assert!(res["createdAt"].as_str().unwrap().ends_with('Z'));

    add(&app, "https://rust-lang.org");
    let list = handle_method(&app, "bookmark.list", &json!({})).unwrap();
    let arr = list.as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["title"], "rust-lang.org");
}

#[test]
fn test_bookmark_add_rejects_bad_url() {
    let (app, _tmp) = signed_in();
    let err = handle_method(&app, "bookmark.add", &json!({"url": "example"})).unwrap_err();
    assert_eq!(err, "Please enter a valid URL");
    let err = handle_method(&app, "bookmark.add", &json!({})).unwrap_err();
    assert_eq!(err, "Please enter a URL");
    assert!(app.lock().unwrap().bookmark_store.list().is_empty());
}

#[test]
fn test_bookmark_delete() {
    let (app, _tmp) = signed_in();
    let res = add(&app, "https://example.com");
    let id = res["id"].as_i64().unwrap();

    handle_method(&app, "bookmark.delete", &json!({"id": id})).unwrap();
    handle_method(&app, "bookmark.delete", &json!({"id": id})).unwrap();

    let list = handle_method(&app, "bookmark.list", &json!({})).unwrap();
    assert!(list.as_array().unwrap().is_empty());

    let err = handle_method(&app, "bookmark.delete", &json!({})).unwrap_err();
    assert!(err.contains("missing id"));
}

// ─── View ───

#[test]
fn test_view_tracks_mutations_with_search_and_filter() {
    let (app, _tmp) = signed_in();
    add(&app, "https://example.com/zebra-facts");
    add(&app, "https://example.com/apple-pie");
    add(&app, "https://other.org/banana");

    let res = handle_method(&app, "view.search", &json!({"query": "EXAMPLE.COM"})).unwrap();
    assert_eq!(visible_titles(&res), vec!["Apple Pie", "Zebra Facts"]);

    let res = handle_method(&app, "view.filter", &json!({"mode": "alphabetical"})).unwrap();
    assert_eq!(res["mode"], "alphabetical");
    assert_eq!(res["query"], "EXAMPLE.COM");
    assert_eq!(visible_titles(&res), vec!["Apple Pie", "Zebra Facts"]);

    add(&app, "https://example.com/mango");
    let res = handle_method(&app, "view.visible", &json!({})).unwrap();
    assert_eq!(visible_titles(&res), vec!["Apple Pie", "Mango", "Zebra Facts"]);

    let res = handle_method(&app, "view.search", &json!({"query": ""})).unwrap();
    assert_eq!(res["items"].as_array().unwrap().len(), 4);
}

#[test]
fn test_typed_search_waits_for_quiet_period() {
    let (app, _tmp) = signed_in();
    add(&app, "https://example.com/apple-pie");
    add(&app, "https://example.com/banana-bread");

    let res = handle_method(&app, "view.type", &json!({"query": "app", "at_ms": 1_000})).unwrap();
    assert_eq!(res["pending"], true);
    assert_eq!(res["query"], "");
    assert_eq!(res["items"].as_array().unwrap().len(), 2);

    handle_method(&app, "view.type", &json!({"query": "apple", "at_ms": 1_300})).unwrap();
    let res = handle_method(&app, "view.tick", &json!({"at_ms": 1_700})).unwrap();
    assert_eq!(res["changed"], false);
    assert_eq!(res["items"].as_array().unwrap().len(), 2);

    let res = handle_method(&app, "view.tick", &json!({"at_ms": 1_800})).unwrap();
    assert_eq!(res["changed"], true);
    assert_eq!(res["pending"], false);
    assert_eq!(res["query"], "apple");
    assert_eq!(visible_titles(&res), vec!["Apple Pie"]);
}

#[test]
fn test_search_debounce_setting_takes_effect() {
    let (app, _tmp) = signed_in();
    add(&app, "https://example.com/apple-pie");
    add(&app, "https://example.com/banana-bread");
    handle_method(&app, "settings.set", &json!({"key": "search.debounce_ms", "value": 100})).unwrap();

    handle_method(&app, "view.type", &json!({"query": "banana", "at_ms": 0})).unwrap();
    let res = handle_method(&app, "view.tick", &json!({"at_ms": 100})).unwrap();
    assert_eq!(visible_titles(&res), vec!["Banana Bread"]);

    handle_method(&app, "form.edit", &json!({"url": "nope", "at_ms": 200})).unwrap();
    let res = handle_method(&app, "form.tick", &json!({"at_ms": 300})).unwrap();
    assert_eq!(res["validity"], false);
}

#[test]
fn test_form_validity_is_debounced_and_gates_submit() {
    let (app, _tmp) = signed_in();

    let res = handle_method(&app, "form.state", &json!({})).unwrap();
    assert_eq!(res, json!({"draft": "", "validity": null, "can_submit": true}));

    let res = handle_method(&app, "form.edit", &json!({"url": "example", "at_ms": 0})).unwrap();
    assert_eq!(res["draft"], "example");
    assert_eq!(res["validity"], Value::Null);

    let res = handle_method(&app, "form.tick", &json!({"at_ms": 499})).unwrap();
    assert_eq!(res["validity"], Value::Null);
    let res = handle_method(&app, "form.tick", &json!({"at_ms": 500})).unwrap();
    assert_eq!(res["validity"], false);
    assert_eq!(res["can_submit"], false);

    handle_method(&app, "form.edit", &json!({"url": "https://example.com/saved-post", "at_ms": 600})).unwrap();
    let res = handle_method(&app, "form.tick", &json!({"at_ms": 1_100})).unwrap();
    assert_eq!(res["validity"], true);
    assert_eq!(res["can_submit"], true);

    let saved = handle_method(&app, "form.submit", &json!({})).unwrap();
    assert_eq!(saved["title"], "Saved Post");
    assert_eq!(
        handle_method(&app, "form.state", &json!({})).unwrap(),
        json!({"draft": "", "validity": null, "can_submit": true})
    );
    let res = handle_method(&app, "view.visible", &json!({})).unwrap();
    assert_eq!(visible_titles(&res), vec!["Saved Post"]);
}

#[test]
fn test_form_submit_keeps_draft_on_failure() {
    let (app, _tmp) = signed_in();
    handle_method(&app, "form.edit", &json!({"url": "not a url", "at_ms": 0})).unwrap();
    let err = handle_method(&app, "form.submit", &json!({})).unwrap_err();
    assert_eq!(err, "Please enter a valid URL");
    let res = handle_method(&app, "form.state", &json!({})).unwrap();
    assert_eq!(res["draft"], "not a url");
}

#[test]
fn test_view_filter_rejects_unknown_mode() {
    let (app, _tmp) = signed_in();
    let err = handle_method(&app, "view.filter", &json!({"mode": "oldest"})).unwrap_err();
    assert!(err.contains("unknown filter mode"));
}

// ─── Settings ───

#[test]
fn test_settings_get_and_set() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "settings.get", &json!({})).unwrap();
    assert_eq!(res["search"]["debounce_ms"], 500);

    handle_method(
        &app,
        "settings.set",
        &json!({"key": "summary.endpoint", "value": "https://summaries.example/"}),
    )
    .unwrap();
    let res = handle_method(&app, "settings.get", &json!({})).unwrap();
    assert_eq!(res["summary"]["endpoint"], "https://summaries.example/");

    let err = handle_method(&app, "settings.set", &json!({"key": "nope", "value": 1})).unwrap_err();
    assert!(err.contains("not found"));
}

#[test]
fn test_state_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("test.db");
    let settings_path = tmp.path().join("settings.json").to_string_lossy().to_string();

    {
        let mut app = App::open(db_path.to_str().unwrap(), SettingsEngine::new(Some(settings_path.clone()))).unwrap();
        app.set_summary_fetcher(Arc::new(CannedSummary));
        let app = Mutex::new(app);
        handle_method(&app, "auth.login", &json!({"email": "demo@test.com", "password": "password123"})).unwrap();
        add(&app, "https://example.com/persisted");
    }

    let app = Mutex::new(App::open(db_path.to_str().unwrap(), SettingsEngine::new(Some(settings_path))).unwrap());
    assert_eq!(
        handle_method(&app, "auth.status", &json!({})).unwrap(),
        json!({"authenticated": true})
    );
    let res = handle_method(&app, "view.visible", &json!({})).unwrap();
    assert_eq!(visible_titles(&res), vec!["Persisted"]);
}
