//! Service status checker client
//!
//! Fetches a "down for everyone or just me"-style status page for a host and
//! extracts the verdict from the page markup. The verdict phrase is mapped
//! onto a closed state set; phrasings the page has not used before decode to
//! an explicit `Unknown` rather than failing.

use chrono::{DateTime, Utc};
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Serialize;
use thiserror::Error;

use crate::http;

/// Base URL for the status page
const STATUS_BASE_URL: &str = "https://downforeveryoneorjustme.com";

/// Errors that can occur when checking a service's status
#[derive(Debug, Error)]
pub enum StatusError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Status page returned an error response
    #[error("status page error {status}: {message}")]
    Api { status: u16, message: String },

    /// The page markup did not contain the expected verdict element
    #[error("unexpected status page markup: {0}")]
    Markup(String),
}

/// Whether the checked service appears reachable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServiceState {
    /// The page reports the service as reachable
    Up,
    /// The page reports an outage
    Down,
    /// The verdict phrase did not match any known wording
    Unknown,
}

/// Result of a status check for a single host
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    /// Normalized host that was checked
    pub host: String,
    /// Verdict extracted from the page
    pub state: ServiceState,
    /// Raw verdict phrase, when the page carried one
    pub detail: Option<String>,
    /// When this check was performed
    pub checked_at: DateTime<Utc>,
}

/// Client for the status page
#[derive(Debug, Clone)]
pub struct StatusClient {
    http: Client,
    base_url: String,
}

impl StatusClient {
    /// Creates a new StatusClient with a randomized identification header
    pub fn new() -> reqwest::Result<Self> {
        Ok(Self {
            http: http::default_client()?,
            base_url: STATUS_BASE_URL.to_string(),
        })
    }

    /// Creates a new StatusClient with a custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> reqwest::Result<Self> {
        Ok(Self {
            http: http::default_client()?,
            base_url: base_url.into(),
        })
    }

    /// Checks whether a service is up
    ///
    /// # Arguments
    /// * `service` - Host to check; URLs are accepted and normalized (scheme,
    ///   `www.` prefix and any path are stripped)
    ///
    /// # Returns
    /// * `Ok(ServiceStatus)` - The verdict for the host
    /// * `Err(StatusError)` - If the request fails or the markup is unexpected
    pub async fn check(&self, service: &str) -> Result<ServiceStatus, StatusError> {
        let host = normalize_host(service);
        let url = format!("{}/{}", self.base_url, host);
        tracing::debug!("checking status page: {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StatusError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let html = response.text().await?;
        let (state, detail) = parse_status_page(&html)?;

        Ok(ServiceStatus {
            host,
            state,
            detail,
            checked_at: Utc::now(),
        })
    }
}

/// Normalizes a user-supplied service identifier to a bare host
///
/// Strips the scheme and a leading `www.`, drops any path, and lowercases.
/// Equivalent inputs like `https://www.example.com/` and `example.com` all
/// normalize to the same host.
pub fn normalize_host(input: &str) -> String {
    let trimmed = input.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let without_www = without_scheme
        .strip_prefix("www.")
        .unwrap_or(without_scheme);
    let host = without_www.split('/').next().unwrap_or(without_www);
    host.to_ascii_lowercase()
}

/// Extracts the verdict heading from the status page markup
fn parse_status_page(html: &str) -> Result<(ServiceState, Option<String>), StatusError> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse("h1").map_err(|e| StatusError::Markup(e.to_string()))?;

    let heading = document
        .select(&selector)
        .next()
        .ok_or_else(|| StatusError::Markup("verdict heading not found".to_string()))?;

    let text = heading.text().collect::<String>().trim().to_string();
    let state = classify_verdict(&text);
    let detail = if text.is_empty() { None } else { Some(text) };

    Ok((state, detail))
}

/// Maps the verdict phrase onto the closed state set
///
/// The outage phrase is a superset of the reachable phrase, so it is matched
/// first.
fn classify_verdict(text: &str) -> ServiceState {
    let lower = text.to_lowercase();
    if lower.contains("not just you") {
        ServiceState::Down
    } else if lower.contains("just you") {
        ServiceState::Up
    } else {
        ServiceState::Unknown
    }
}
