//! Anime/manga metadata client
//!
//! Queries an AniList-style GraphQL endpoint for series metadata. The query
//! document is fixed; one operation resolves by search text, the other by
//! the provider's numeric id. Responses decode into a nested typed record
//! with every nullable field kept explicitly optional.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http;

/// Base URL for the GraphQL endpoint
const ANILIST_BASE_URL: &str = "https://graphql.anilist.co";

/// GraphQL document used for every media lookup
const MEDIA_QUERY: &str = r#"query ($id: Int, $search: String, $type: MediaType) {
  Media(id: $id, search: $search, type: $type) {
    id
    idMal
    title { romaji english native }
    type
    format
    status
    description
    episodes
    chapters
    volumes
    averageScore
    meanScore
    genres
    siteUrl
    isAdult
    coverImage { large color }
    bannerImage
    startDate { year month day }
    endDate { year month day }
  }
}"#;

/// Errors that can occur when querying media metadata
#[derive(Debug, Error)]
pub enum AniListError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint returned an error response
    #[error("metadata API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to decode the response body
    #[error("failed to decode metadata response: {0}")]
    Json(#[from] serde_json::Error),

    /// Response decoded but carried no media record
    #[error("metadata response missing expected data: {0}")]
    Decode(String),
}

/// Which media catalog to search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Anime,
    Manga,
}

impl MediaKind {
    /// Wire value for the GraphQL `MediaType` enum
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Anime => "ANIME",
            MediaKind::Manga => "MANGA",
        }
    }
}

/// Title of a series in its various renderings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

/// Cover art reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverImage {
    pub large: Option<String>,
    /// Dominant cover color as a hex string, when the provider computed one
    pub color: Option<String>,
}

/// A date that may be only partially known
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FuzzyDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

/// Series metadata record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: i64,
    /// Cross-reference id on MyAnimeList, when known
    pub id_mal: Option<i64>,
    pub title: Option<MediaTitle>,
    /// Catalog the record belongs to (`ANIME` or `MANGA`)
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub format: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub episodes: Option<u32>,
    pub chapters: Option<u32>,
    pub volumes: Option<u32>,
    pub average_score: Option<u32>,
    pub mean_score: Option<u32>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub site_url: Option<String>,
    pub is_adult: Option<bool>,
    pub cover_image: Option<CoverImage>,
    pub banner_image: Option<String>,
    pub start_date: Option<FuzzyDate>,
    pub end_date: Option<FuzzyDate>,
}

/// Variables attached to the media query
#[derive(Debug, Serialize)]
struct Variables<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    media_type: Option<&'a str>,
}

/// Request body for the GraphQL POST
#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Variables<'a>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<DataBody>,
}

#[derive(Debug, Deserialize)]
struct DataBody {
    #[serde(rename = "Media")]
    media: Option<Media>,
}

/// Client for the metadata endpoint
#[derive(Debug, Clone)]
pub struct AniListClient {
    http: Client,
    base_url: String,
}

impl AniListClient {
    /// Creates a new AniListClient with a randomized identification header
    pub fn new() -> reqwest::Result<Self> {
        Ok(Self {
            http: http::default_client()?,
            base_url: ANILIST_BASE_URL.to_string(),
        })
    }

    /// Creates a new AniListClient with a custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> reqwest::Result<Self> {
        Ok(Self {
            http: http::default_client()?,
            base_url: base_url.into(),
        })
    }

    /// Searches the catalog for the closest-matching series
    ///
    /// # Arguments
    /// * `search` - Title text to match
    /// * `kind` - Catalog to search
    ///
    /// # Returns
    /// * `Ok(Media)` - The best-matching series record
    /// * `Err(AniListError)` - Request, decode, or no-match failure
    pub async fn search(&self, search: &str, kind: MediaKind) -> Result<Media, AniListError> {
        self.run_query(Variables {
            id: None,
            search: Some(search),
            media_type: Some(kind.as_str()),
        })
        .await
    }

    /// Fetches a series by its provider id
    pub async fn fetch_by_id(&self, id: i64) -> Result<Media, AniListError> {
        self.run_query(Variables {
            id: Some(id),
            search: None,
            media_type: None,
        })
        .await
    }

    /// Posts the media query with the given variables
    async fn run_query(&self, variables: Variables<'_>) -> Result<Media, AniListError> {
        let body = GraphQlRequest {
            query: MEDIA_QUERY,
            variables,
        };
        tracing::debug!("posting media query to {}", self.base_url);

        let response = self.http.post(&self.base_url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AniListError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        decode_response(&text)
    }
}

/// Decodes a GraphQL response body into the media record
fn decode_response(text: &str) -> Result<Media, AniListError> {
    let decoded: GraphQlResponse = serde_json::from_str(text)?;
    decoded
        .data
        .and_then(|data| data.media)
        .ok_or_else(|| AniListError::Decode("no Media in response".to_string()))
}
