//! Music link resolver client
//!
//! Resolves a track or album into its listing on every known streaming
//! platform, using an Odesli-style links API. The response is two keyed
//! collections: platform name to link record, and entity id to the canonical
//! entity the links point at.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::http;

/// Base URL for the links API
const SONGLINK_BASE_URL: &str = "https://api.song.link/v1-alpha.1/links";

/// Errors that can occur when resolving song links
#[derive(Debug, Error)]
pub enum SongLinkError {
    /// The query was missing a complete parameter set; no request was made
    #[error("invalid song query: {0}")]
    Validation(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("links API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to decode the response body
    #[error("failed to decode links response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Kind of entity to look up by platform identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    Song,
    Album,
}

impl EntityKind {
    /// Wire value for the `type` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Song => "song",
            EntityKind::Album => "album",
        }
    }
}

/// Parameters for a link resolution
///
/// A query is complete when it carries a direct URL, or the full
/// platform/type/id triple. Anything less fails validation before any
/// network I/O.
#[derive(Debug, Clone, Default)]
pub struct SongQuery {
    /// Direct link to a track or album on any supported platform
    pub url: Option<String>,
    /// Platform name (e.g. `spotify`), used with `kind` and `id`
    pub platform: Option<String>,
    /// Entity kind, used with `platform` and `id`
    pub kind: Option<EntityKind>,
    /// Platform-specific entity id, used with `platform` and `kind`
    pub id: Option<String>,
}

impl SongQuery {
    /// Query by direct URL
    pub fn by_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Query by platform, entity kind and platform-specific id
    pub fn by_identifier(
        platform: impl Into<String>,
        kind: EntityKind,
        id: impl Into<String>,
    ) -> Self {
        Self {
            url: None,
            platform: Some(platform.into()),
            kind: Some(kind),
            id: Some(id.into()),
        }
    }

    /// Builds the request's query pairs, validating completeness first
    ///
    /// A URL wins over a partial triple. The triple's parameter order is
    /// fixed (`platform`, `type`, `id`).
    fn query_pairs(&self) -> Result<Vec<(&'static str, String)>, SongLinkError> {
        if let Some(url) = &self.url {
            return Ok(vec![("url", url.clone())]);
        }

        match (&self.platform, &self.kind, &self.id) {
            (Some(platform), Some(kind), Some(id)) => Ok(vec![
                ("platform", platform.clone()),
                ("type", kind.as_str().to_string()),
                ("id", id.clone()),
            ]),
            _ => Err(SongLinkError::Validation(
                "either a url or a complete platform/type/id triple is required".to_string(),
            )),
        }
    }
}

/// A link to the entity on one platform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformLink {
    /// Web URL for the entity on this platform
    pub url: String,
    /// Key into the response's entity collection
    pub entity_unique_id: String,
    /// Native mobile app URI, if the platform has one
    pub native_app_uri_mobile: Option<String>,
    /// Native desktop app URI, if the platform has one
    pub native_app_uri_desktop: Option<String>,
}

/// Canonical entity record referenced by platform links
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongEntity {
    /// Provider-scoped entity id
    pub id: String,
    /// Entity kind as reported by the API (`song` or `album`)
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub artist_name: Option<String>,
    pub thumbnail_url: Option<String>,
    pub thumbnail_width: Option<u32>,
    pub thumbnail_height: Option<u32>,
    /// Which API this entity record came from
    pub api_provider: Option<String>,
    /// Platforms this entity is known on
    #[serde(default)]
    pub platforms: Vec<String>,
}

/// Resolved links for one track or album
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongLinks {
    /// Entity id the query resolved to
    pub entity_unique_id: String,
    /// Aggregation page URL for sharing
    pub page_url: String,
    /// Country the match was made for, if reported
    pub user_country: Option<String>,
    /// Per-platform links, keyed by platform name
    #[serde(default)]
    pub links_by_platform: HashMap<String, PlatformLink>,
    /// Canonical entities, keyed by entity id
    #[serde(default)]
    pub entities_by_unique_id: HashMap<String, SongEntity>,
}

/// Client for the links API
#[derive(Debug, Clone)]
pub struct SongLinkClient {
    http: Client,
    base_url: String,
}

impl SongLinkClient {
    /// Creates a new SongLinkClient with a randomized identification header
    pub fn new() -> reqwest::Result<Self> {
        Ok(Self {
            http: http::default_client()?,
            base_url: SONGLINK_BASE_URL.to_string(),
        })
    }

    /// Creates a new SongLinkClient with a custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> reqwest::Result<Self> {
        Ok(Self {
            http: http::default_client()?,
            base_url: base_url.into(),
        })
    }

    /// Resolves a query into per-platform links
    ///
    /// # Arguments
    /// * `query` - Either a direct URL or a platform/type/id triple
    ///
    /// # Returns
    /// * `Ok(SongLinks)` - Platform links and the entities they point at
    /// * `Err(SongLinkError::Validation)` - Incomplete query; no request made
    /// * `Err(SongLinkError)` - Request or decode failure
    pub async fn resolve(&self, query: &SongQuery) -> Result<SongLinks, SongLinkError> {
        let pairs = query.query_pairs()?;

        let query_string = pairs
            .iter()
            .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}?{}", self.base_url, query_string);
        tracing::debug!("resolving song links: {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SongLinkError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let text = response.text().await?;
        let links: SongLinks = serde_json::from_str(&text)?;
        Ok(links)
    }
}
