//! Pronoun lookup client
//!
//! Looks up the pronouns a user registered for a chat platform account, via a
//! PronounDB-style API. Responses carry a shorthand code which is decoded
//! into a closed set; lookups are cached on disk for seven days keyed by
//! `platform/user_id`.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::{CacheError, CacheManager};
use crate::http;

/// Base URL for the pronoun API
const PRONOUNS_BASE_URL: &str = "https://pronoundb.org";

/// Errors that can occur when looking up pronouns
#[derive(Debug, Error)]
pub enum PronounError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("pronoun API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to decode the response body
    #[error("failed to decode pronoun response: {0}")]
    Json(#[from] serde_json::Error),

    /// Cache read failed
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// A registered pronoun set, decoded from the API's shorthand codes
///
/// The code table is closed; codes this client has not seen before decode to
/// `Unknown` rather than failing, so a provider-side addition degrades
/// gracefully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PronounSet {
    HeHim,
    HeIt,
    HeShe,
    HeThey,
    ItHim,
    ItIts,
    ItShe,
    ItThey,
    SheHe,
    SheHer,
    SheIt,
    SheThey,
    TheyHe,
    TheyIt,
    TheyShe,
    TheyThem,
    Any,
    Other,
    Ask,
    Avoid,
    Unspecified,
    /// Shorthand code not in the known table
    Unknown,
}

impl PronounSet {
    /// Decodes an API shorthand code
    pub fn from_code(code: &str) -> Self {
        match code {
            "hh" => PronounSet::HeHim,
            "hi" => PronounSet::HeIt,
            "hs" => PronounSet::HeShe,
            "ht" => PronounSet::HeThey,
            "ih" => PronounSet::ItHim,
            "ii" => PronounSet::ItIts,
            "is" => PronounSet::ItShe,
            "it" => PronounSet::ItThey,
            "shh" => PronounSet::SheHe,
            "sh" => PronounSet::SheHer,
            "si" => PronounSet::SheIt,
            "st" => PronounSet::SheThey,
            "th" => PronounSet::TheyHe,
            "ti" => PronounSet::TheyIt,
            "ts" => PronounSet::TheyShe,
            "tt" => PronounSet::TheyThem,
            "any" => PronounSet::Any,
            "other" => PronounSet::Other,
            "ask" => PronounSet::Ask,
            "avoid" => PronounSet::Avoid,
            "unspecified" => PronounSet::Unspecified,
            _ => PronounSet::Unknown,
        }
    }

    /// Human-readable form for presentation layers
    pub fn label(&self) -> &'static str {
        match self {
            PronounSet::HeHim => "he/him",
            PronounSet::HeIt => "he/it",
            PronounSet::HeShe => "he/she",
            PronounSet::HeThey => "he/they",
            PronounSet::ItHim => "it/him",
            PronounSet::ItIts => "it/its",
            PronounSet::ItShe => "it/she",
            PronounSet::ItThey => "it/they",
            PronounSet::SheHe => "she/he",
            PronounSet::SheHer => "she/her",
            PronounSet::SheIt => "she/it",
            PronounSet::SheThey => "she/they",
            PronounSet::TheyHe => "they/he",
            PronounSet::TheyIt => "they/it",
            PronounSet::TheyShe => "they/she",
            PronounSet::TheyThem => "they/them",
            PronounSet::Any => "any pronouns",
            PronounSet::Other => "other pronouns",
            PronounSet::Ask => "ask me my pronouns",
            PronounSet::Avoid => "avoid pronouns, use my name",
            PronounSet::Unspecified => "unspecified",
            PronounSet::Unknown => "unrecognized",
        }
    }
}

/// Raw lookup response; this is the payload stored in the cache
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LookupResponse {
    pronouns: String,
}

/// Decoded result of a pronoun lookup
#[derive(Debug, Clone, Serialize)]
pub struct PronounRecord {
    /// The user's registered pronoun set
    pub pronouns: PronounSet,
}

/// Client for the pronoun API
#[derive(Debug, Clone)]
pub struct PronounClient {
    http: Client,
    base_url: String,
    cache: Option<CacheManager>,
}

impl PronounClient {
    /// Creates a new PronounClient with the default cache (7-day TTL)
    pub fn new() -> reqwest::Result<Self> {
        Ok(Self {
            http: http::default_client()?,
            base_url: PRONOUNS_BASE_URL.to_string(),
            cache: CacheManager::for_provider("pronouns"),
        })
    }

    /// Creates a new PronounClient with explicit base URL and cache
    ///
    /// Useful for testing or embedding with a custom cache location.
    pub fn with_config(
        base_url: impl Into<String>,
        cache: Option<CacheManager>,
    ) -> reqwest::Result<Self> {
        Ok(Self {
            http: http::default_client()?,
            base_url: base_url.into(),
            cache,
        })
    }

    /// Cache key for a lookup; the platform becomes a subdirectory
    fn cache_key(platform: &str, user_id: &str) -> String {
        format!("{}/{}", platform, user_id)
    }

    /// Looks up the pronouns registered for a platform account
    ///
    /// # Arguments
    /// * `platform` - Platform name the account lives on (e.g. `discord`)
    /// * `user_id` - Platform-specific account id
    ///
    /// # Returns
    /// * `Ok(PronounRecord)` - The decoded pronoun set
    /// * `Err(PronounError)` - If the request, decode, or cache read fails
    ///
    /// # Behavior
    /// A fresh cache entry is returned without any network I/O. On a miss or
    /// an expired entry the API is queried and the raw response cached.
    pub async fn lookup(&self, platform: &str, user_id: &str) -> Result<PronounRecord, PronounError> {
        let cache_key = Self::cache_key(platform, user_id);

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.read::<LookupResponse>(&cache_key)? {
                tracing::debug!("pronoun lookup served from cache: {}", cache_key);
                return Ok(PronounRecord {
                    pronouns: PronounSet::from_code(&cached.pronouns),
                });
            }
        }

        let url = format!(
            "{}/api/v1/lookup?platform={}&id={}",
            self.base_url,
            urlencoding::encode(platform),
            urlencoding::encode(user_id)
        );
        tracing::debug!("looking up pronouns: {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PronounError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let text = response.text().await?;
        let decoded: LookupResponse = serde_json::from_str(&text)?;

        if let Some(cache) = &self.cache {
            let _ = cache.write(&cache_key, &decoded);
        }

        Ok(PronounRecord {
            pronouns: PronounSet::from_code(&decoded.pronouns),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_code_known_codes() {
        assert_eq!(PronounSet::from_code("hh"), PronounSet::HeHim);
        assert_eq!(PronounSet::from_code("sh"), PronounSet::SheHer);
        assert_eq!(PronounSet::from_code("tt"), PronounSet::TheyThem);
        assert_eq!(PronounSet::from_code("shh"), PronounSet::SheHe);
        assert_eq!(PronounSet::from_code("any"), PronounSet::Any);
        assert_eq!(PronounSet::from_code("unspecified"), PronounSet::Unspecified);
    }

    #[test]
    fn test_from_code_unrecognized_is_unknown() {
        assert_eq!(PronounSet::from_code("zz"), PronounSet::Unknown);
        assert_eq!(PronounSet::from_code(""), PronounSet::Unknown);
    }

    #[test]
    fn test_labels() {
        assert_eq!(PronounSet::HeHim.label(), "he/him");
        assert_eq!(PronounSet::TheyThem.label(), "they/them");
        assert_eq!(PronounSet::Avoid.label(), "avoid pronouns, use my name");
    }

    #[test]
    fn test_cache_key_is_platform_scoped() {
        assert_eq!(PronounClient::cache_key("discord", "1234"), "discord/1234");
    }

    #[test]
    fn test_decode_lookup_response() {
        let decoded: LookupResponse =
            serde_json::from_str(r#"{"pronouns": "st"}"#).expect("Failed to decode response");
        assert_eq!(decoded.pronouns, "st");
        assert_eq!(PronounSet::from_code(&decoded.pronouns), PronounSet::SheThey);
    }

    #[tokio::test]
    async fn test_fresh_cache_entry_serves_without_network() {
        // Unroutable base URL: if the client attempted a request this test
        // would fail with an Http error instead of returning the cached set.
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::with_dir(temp_dir.path().to_path_buf(), 604_800);
        cache
            .write("discord/1234", &LookupResponse { pronouns: "sh".to_string() })
            .expect("Cache write should succeed");

        let client = PronounClient::with_config("http://127.0.0.1:1", Some(cache))
            .expect("Client should build");

        let record = client
            .lookup("discord", "1234")
            .await
            .expect("Cached lookup should succeed");

        assert_eq!(record.pronouns, PronounSet::SheHer);
    }

    #[tokio::test]
    async fn test_expired_cache_entry_falls_through_to_network() {
        // Zero TTL expires the entry immediately, so the client must refetch;
        // with an unroutable base URL that surfaces as an Http error.
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::with_dir(temp_dir.path().to_path_buf(), 0);
        cache
            .write("discord/1234", &LookupResponse { pronouns: "sh".to_string() })
            .expect("Cache write should succeed");

        let client = PronounClient::with_config("http://127.0.0.1:1", Some(cache))
            .expect("Client should build");

        let result = client.lookup("discord", "1234").await;

        assert!(matches!(result, Err(PronounError::Http(_))));
    }
}
