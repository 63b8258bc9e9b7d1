//! Summary acquisition for LinkSaver.
//!
//! Issues one GET to a text-extraction endpoint with the target URL
//! percent-encoded into the path. Never fails: transport errors and
//! non-success statuses degrade to a fixed fallback string.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Client;
use tracing::{debug, warn};

use crate::types::bookmark::NO_SUMMARY;
use crate::types::settings::SummarySettings;

/// Returned when the endpoint is unreachable or answers with an error status.
pub const SUMMARY_UNAVAILABLE: &str = "Summary temporarily unavailable.";

/// Characters left unescaped by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Produces summary text for a URL.
#[async_trait]
pub trait SummaryFetcher: Send + Sync {
    async fn fetch_summary(&self, url: &str) -> String;
}

/// Builds the request URL: `endpoint` followed by the encoded target.
pub fn summary_request_url(endpoint: &str, target: &str) -> String {
    format!("{}{}", endpoint, utf8_percent_encode(target, URI_COMPONENT))
}

/// `SummaryFetcher` backed by `reqwest`.
pub struct SummaryService {
    client: Client,
    endpoint: String,
}

impl SummaryService {
    /// Builds a client from settings. A `None` timeout leaves requests unbounded.
    pub fn new(settings: &SummarySettings) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            endpoint: settings.endpoint.clone(),
        })
    }

    /// Uses a preconfigured client.
    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, url: &str) -> Result<String, String> {
        let request_url = summary_request_url(&self.endpoint, url);
        let response = self
            .client
            .get(&request_url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Failed to get summary: {}", status.as_u16()));
        }
        response.text().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl SummaryFetcher for SummaryService {
    async fn fetch_summary(&self, url: &str) -> String {
        match self.request(url).await {
            Ok(body) if body.is_empty() => NO_SUMMARY.to_string(),
            Ok(body) => {
                debug!(url, bytes = body.len(), "summary fetched");
                body
            }
            Err(e) => {
                warn!(url, error = %e, "error getting summary");
                SUMMARY_UNAVAILABLE.to_string()
            }
        }
    }
}
