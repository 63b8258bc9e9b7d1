use serde::{Deserialize, Serialize};

/// Top-level application settings, persisted as `settings.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppSettings {
    #[serde(default)]
    pub summary: SummarySettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where and how page summaries are fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummarySettings {
    /// Base URL; the encoded target URL is appended to it.
    pub endpoint: String,
    /// Request timeout. `None` leaves the request unbounded.
    pub timeout_secs: Option<u64>,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            endpoint: "https://r.jina.ai/".to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchSettings {
    /// Quiet period before typed input is applied.
    pub debounce_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { debounce_ms: 500 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
