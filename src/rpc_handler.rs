//! RPC method handler for the LinkSaver JSON-RPC protocol.
//!
//! Kept separate from `rpc_server.rs` so it can be unit-tested directly.
//! `handle_method` dispatches method calls to the managers held by `App`.

use std::sync::Mutex;

use serde_json::{json, Value};

use crate::app::App;
use crate::managers::bookmark_store::BookmarkStoreTrait;
use crate::managers::session_gate::SessionGateTrait;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::bookmark::FilterMode;

fn require_session(app: &App) -> Result<(), String> {
    if app.session_gate.is_authenticated() {
        Ok(())
    } else {
        Err("not signed in".to_string())
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

fn visible_json(app: &App) -> Result<Value, String> {
    let view = app.view.lock().map_err(|e| e.to_string())?;
    Ok(json!({
        "query": view.query(),
        "mode": view.mode(),
        "pending": view.has_pending_query(),
        "items": to_json(&view.visible())?,
    }))
}

fn form_json(app: &App) -> Value {
    json!({
        "draft": app.form.draft(),
        "validity": app.form.validity(),
        "can_submit": app.form.can_submit(&app.submitter),
    })
}

// Debounced methods take `at_ms`, milliseconds since the app was opened.
fn at_ms(params: &Value) -> Option<u64> {
    params.get("at_ms").and_then(|v| v.as_u64())
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Session ───
        "auth.login" => {
            let email = params.get("email").and_then(|v| v.as_str()).unwrap_or("");
            let password = params.get("password").and_then(|v| v.as_str()).unwrap_or("");
            let a = app.lock().map_err(|e| e.to_string())?;
            a.session_gate.sign_in(email, password).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "auth.logout" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            a.session_gate.logout().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "auth.status" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            Ok(json!({"authenticated": a.session_gate.is_authenticated()}))
        }

        // ─── Bookmarks ───
        "bookmark.add" => {
            let url = params.get("url").and_then(|v| v.as_str()).unwrap_or("");
            let a = app.lock().map_err(|e| e.to_string())?;
            require_session(&a)?;
            let bookmark = a.add_link(url).map_err(|e| e.to_string())?;
            to_json(&bookmark)
        }
        "bookmark.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            require_session(&a)?;
            to_json(&a.bookmark_store.list())
        }
        "bookmark.delete" => {
            let id = params.get("id").and_then(|v| v.as_i64()).ok_or("missing id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            require_session(&a)?;
            a.bookmark_store.delete(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── View ───
        "view.search" => {
            let query = params.get("query").and_then(|v| v.as_str()).unwrap_or("");
            let a = app.lock().map_err(|e| e.to_string())?;
            require_session(&a)?;
            a.view.lock().map_err(|e| e.to_string())?.set_query(query);
            visible_json(&a)
        }
        "view.filter" => {
            let mode: FilterMode = params
                .get("mode")
                .and_then(|v| v.as_str())
                .ok_or("missing mode")?
                .parse()?;
            let a = app.lock().map_err(|e| e.to_string())?;
            require_session(&a)?;
            a.view.lock().map_err(|e| e.to_string())?.set_mode(mode);
            visible_json(&a)
        }
        "view.type" => {
            let query = params.get("query").and_then(|v| v.as_str()).unwrap_or("");
            let a = app.lock().map_err(|e| e.to_string())?;
            require_session(&a)?;
            let now = a.instant_at(at_ms(params));
            a.view.lock().map_err(|e| e.to_string())?.type_query(query, now);
            visible_json(&a)
        }
        "view.tick" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            require_session(&a)?;
            let now = a.instant_at(at_ms(params));
            let changed = a.view.lock().map_err(|e| e.to_string())?.tick(now);
            let mut res = visible_json(&a)?;
            res["changed"] = json!(changed);
            Ok(res)
        }
        "view.visible" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            require_session(&a)?;
            visible_json(&a)
        }

        // ─── Add-link form ───
        "form.edit" => {
            let url = params.get("url").and_then(|v| v.as_str()).unwrap_or("");
            let mut a = app.lock().map_err(|e| e.to_string())?;
            require_session(&a)?;
            let now = a.instant_at(at_ms(params));
            a.form.edit(url, now);
            Ok(form_json(&a))
        }
        "form.tick" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            require_session(&a)?;
            let now = a.instant_at(at_ms(params));
            a.form.tick(now);
            Ok(form_json(&a))
        }
        "form.state" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            require_session(&a)?;
            Ok(form_json(&a))
        }
        "form.submit" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            require_session(&a)?;
            let bookmark = a.submit_form().map_err(|e| e.to_string())?;
            to_json(&bookmark)
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            to_json(a.settings_engine.get_settings())
        }
        "settings.set" => {
            let key = params.get("key").and_then(|v| v.as_str()).ok_or("missing key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.settings_engine.set_value(key, value).map_err(|e| e.to_string())?;
            if key.starts_with("summary.") {
                a.reload_summary_service()?;
            } else if key.starts_with("search.") {
                a.apply_search_settings()?;
            }
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
