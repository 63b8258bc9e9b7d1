use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Summary text stored when none was supplied with the candidate.
pub const NO_SUMMARY: &str = "No summary available.";

/// A saved link with its derived title and summary.
///
/// Serialized with the field names used by the persisted JSON array,
/// so `created_at` travels as `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub summary: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl Bookmark {
    /// Case-insensitive substring match over title, url and summary.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.url.to_lowercase().contains(needle)
            || self.summary.to_lowercase().contains(needle)
    }
}

/// Input to `BookmarkStore::add`. Empty title or summary count as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBookmark {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl NewBookmark {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            summary: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

/// Sort/filter tab selected in the view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Store order (newest first).
    #[default]
    All,
    /// Newest first by `createdAt`.
    Recent,
    /// By title, locale-style.
    Alphabetical,
}

impl FilterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Recent => "recent",
            FilterMode::Alphabetical => "alphabetical",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(FilterMode::All),
            "recent" => Ok(FilterMode::Recent),
            "alphabetical" => Ok(FilterMode::Alphabetical),
            other => Err(format!("unknown filter mode: {}", other)),
        }
    }
}
