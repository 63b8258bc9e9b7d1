//! LinkSaver RPC Server: JSON-RPC over stdin/stdout.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.add", "params":{"url":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! `view.type`, `view.tick`, `form.edit` and `form.tick` accept an optional
//! `at_ms` (milliseconds since startup) so a client can drive the debounce
//! clock itself; without it the server's own clock is used.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Mutex;

use linksaver::app::App;
use linksaver::platform;
use linksaver::rpc_handler::handle_method;
use linksaver::services::logging;
use linksaver::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

use serde_json::{json, Value};
use tracing::{error, info};

fn emit(out: &mut impl Write, frame: &Value) -> io::Result<()> {
    writeln!(out, "{}", frame)?;
    out.flush()
}

fn main() -> ExitCode {
    let mut settings_engine = SettingsEngine::new(None);
    let level = settings_engine
        .load()
        .map(|s| s.logging.level)
        .unwrap_or_else(|_| "info".to_string());
    logging::init(&level);

    let data_dir = platform::get_data_dir();
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        error!(dir = %data_dir.display(), error = %e, "cannot create data directory");
        return ExitCode::FAILURE;
    }
    let db_path = data_dir.join("linksaver.db");

    let app = match App::open(&db_path.to_string_lossy(), settings_engine) {
        Ok(app) => Mutex::new(app),
        Err(e) => {
            error!(error = %e, "failed to initialize LinkSaver");
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if emit(&mut out, &json!({"event":"ready","version":env!("CARGO_PKG_VERSION")})).is_err() {
        return ExitCode::FAILURE;
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(&line) {
            Ok(req) => {
                let id = req.get("id").cloned().unwrap_or(Value::Null);
                let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
                let params = req.get("params").cloned().unwrap_or(json!({}));

                match handle_method(&app, method, &params) {
                    Ok(val) => json!({"id": id, "result": val}),
                    Err(err) => json!({"id": id, "error": err}),
                }
            }
            Err(e) => json!({"id": null, "error": format!("parse error: {}", e)}),
        };

        if emit(&mut out, &response).is_err() {
            break;
        }
    }

    if let Ok(mut app) = app.into_inner() {
        app.shutdown();
    }
    info!("stdin closed, exiting");
    ExitCode::SUCCESS
}
