//! LinkSaver settings.
//!
//! A single `settings.json` holds the summary endpoint and timeout, the
//! search debounce and the default log level. Keys are addressed with dot
//! paths such as `summary.endpoint` or `search.debounce_ms`.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::AppSettings;

pub const SETTINGS_FILE: &str = "settings.json";

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<AppSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &AppSettings;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

pub struct SettingsEngine {
    config_path: String,
    settings: AppSettings,
}

impl SettingsEngine {
    /// `None` places the file in the LinkSaver config directory.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = path_override.unwrap_or_else(|| {
            platform::get_config_dir()
                .join(SETTINGS_FILE)
                .to_string_lossy()
                .into_owned()
        });

        Self {
            config_path,
            settings: AppSettings::default(),
        }
    }
}

/// Walks `tree` along the dot path and swaps in `value` at the last segment.
/// Only keys already present in the tree can be replaced.
fn replace_at_path(tree: &mut Value, key: &str, value: Value) -> Result<(), SettingsError> {
    let not_found = || SettingsError::InvalidKey(format!("Key '{}' not found in settings", key));
    let mut segments = key.split('.').peekable();
    let mut node: &mut Map<String, Value> = tree.as_object_mut().ok_or_else(not_found)?;

    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            let slot = node.get_mut(segment).ok_or_else(not_found)?;
            *slot = value;
            return Ok(());
        }
        node = match node.get_mut(segment) {
            Some(Value::Object(child)) => child,
            Some(_) => {
                return Err(SettingsError::InvalidKey(format!(
                    "'{}' does not name a settings section in '{}'",
                    segment, key
                )))
            }
            None => return Err(not_found()),
        };
    }
    Err(not_found())
}

impl SettingsEngineTrait for SettingsEngine {
    /// Reads the file. A missing file means defaults; unreadable or malformed
    /// content is an error and leaves the current settings untouched.
    fn load(&mut self) -> Result<AppSettings, SettingsError> {
        match fs::read_to_string(&self.config_path) {
            Ok(content) => {
                self.settings = serde_json::from_str(&content).map_err(|e| {
                    SettingsError::SerializationError(format!("{}: {}", self.config_path, e))
                })?;
                debug!(path = %self.config_path, "settings loaded");
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.settings = AppSettings::default();
                debug!(path = %self.config_path, "no settings file, using defaults");
            }
            Err(e) => {
                return Err(SettingsError::IoError(format!("{}: {}", self.config_path, e)));
            }
        }
        Ok(self.settings.clone())
    }

    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| SettingsError::IoError(format!("{}: {}", dir.display(), e)))?;
        }

        let json = serde_json::to_string_pretty(&self.settings)
            .map_err(|e| SettingsError::SerializationError(e.to_string()))?;
        fs::write(path, json).map_err(|e| SettingsError::IoError(format!("{}: {}", self.config_path, e)))
    }

    fn get_settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Replaces one value and persists. The edited tree must still decode as
    /// `AppSettings`, so `search.debounce_ms = "fast"` is rejected and the
    /// stored settings stay as they were.
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        let mut tree = serde_json::to_value(&self.settings)
            .map_err(|e| SettingsError::SerializationError(e.to_string()))?;
        replace_at_path(&mut tree, key, value)?;

        self.settings = serde_json::from_value(tree)
            .map_err(|e| SettingsError::InvalidValue(format!("{}: {}", key, e)))?;
        debug!(key, "setting changed");
        self.save()
    }

    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = AppSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
