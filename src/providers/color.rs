//! Color metadata client
//!
//! Looks up a hex color against The Color API-style metadata service and
//! decodes the nested multi-space record: every color space carries both the
//! integer channel values and their normalized fractions, plus the nearest
//! named color with a distance metric. Lookups are cached on disk for seven
//! days, keyed by the sorted query parameter string.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::{CacheError, CacheManager};
use crate::http;

/// Base URL for the color metadata API
const COLOR_BASE_URL: &str = "https://www.thecolorapi.com";

/// Errors that can occur when looking up color metadata
#[derive(Debug, Error)]
pub enum ColorError {
    /// The input was not a hex color; no request was made
    #[error("invalid color query: {0}")]
    Validation(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("color API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to decode the response body
    #[error("failed to decode color response: {0}")]
    Json(#[from] serde_json::Error),

    /// Cache read failed
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Hex representation of the color
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HexValue {
    /// `#`-prefixed hex string
    pub value: String,
    /// Hex digits without the prefix
    pub clean: String,
}

/// Normalized RGB fractions (0.0 to 1.0 per channel)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RgbFraction {
    pub r: Option<f64>,
    pub g: Option<f64>,
    pub b: Option<f64>,
}

/// RGB representation with both integer and fraction forms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RgbValue {
    pub fraction: Option<RgbFraction>,
    pub r: Option<u8>,
    pub g: Option<u8>,
    pub b: Option<u8>,
    /// Formatted `rgb(r, g, b)` string
    pub value: Option<String>,
}

impl RgbValue {
    /// Re-derives the clean hex string from the integer channel triple
    ///
    /// Absent when any channel is missing from the record.
    pub fn to_clean_hex(&self) -> Option<String> {
        match (self.r, self.g, self.b) {
            (Some(r), Some(g), Some(b)) => Some(format!("{:02X}{:02X}{:02X}", r, g, b)),
            _ => None,
        }
    }
}

/// Normalized HSL fractions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HslFraction {
    pub h: Option<f64>,
    pub s: Option<f64>,
    pub l: Option<f64>,
}

/// HSL representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HslValue {
    pub fraction: Option<HslFraction>,
    pub h: Option<i32>,
    pub s: Option<i32>,
    pub l: Option<i32>,
    pub value: Option<String>,
}

/// Normalized HSV fractions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HsvFraction {
    pub h: Option<f64>,
    pub s: Option<f64>,
    pub v: Option<f64>,
}

/// HSV representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HsvValue {
    pub fraction: Option<HsvFraction>,
    pub h: Option<i32>,
    pub s: Option<i32>,
    pub v: Option<i32>,
    pub value: Option<String>,
}

/// Normalized CMYK fractions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmykFraction {
    pub c: Option<f64>,
    pub m: Option<f64>,
    pub y: Option<f64>,
    pub k: Option<f64>,
}

/// CMYK representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmykValue {
    pub fraction: Option<CmykFraction>,
    pub c: Option<i32>,
    pub m: Option<i32>,
    pub y: Option<i32>,
    pub k: Option<i32>,
    pub value: Option<String>,
}

/// Normalized XYZ fractions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XyzFraction {
    #[serde(rename = "X")]
    pub x: Option<f64>,
    #[serde(rename = "Y")]
    pub y: Option<f64>,
    #[serde(rename = "Z")]
    pub z: Option<f64>,
}

/// XYZ representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XyzValue {
    pub fraction: Option<XyzFraction>,
    #[serde(rename = "X")]
    pub x: Option<i32>,
    #[serde(rename = "Y")]
    pub y: Option<i32>,
    #[serde(rename = "Z")]
    pub z: Option<i32>,
    pub value: Option<String>,
}

/// Nearest named color match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameMatch {
    /// Name of the closest color
    pub value: Option<String>,
    /// Hex of the named color matched against
    pub closest_named_hex: Option<String>,
    /// Whether the queried color is exactly the named color
    pub exact_match_name: Option<bool>,
    /// Distance between the queried and named colors
    pub distance: Option<i64>,
}

/// Best contrasting text color
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contrast {
    pub value: Option<String>,
}

/// Full color metadata record; this is also the cached payload
///
/// Every color-space group the provider omits stays `None`; numeric fields
/// are never zero-defaulted on absence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorRecord {
    pub hex: HexValue,
    pub rgb: Option<RgbValue>,
    pub hsl: Option<HslValue>,
    pub hsv: Option<HsvValue>,
    pub cmyk: Option<CmykValue>,
    #[serde(rename = "XYZ")]
    pub xyz: Option<XyzValue>,
    pub name: Option<NameMatch>,
    pub contrast: Option<Contrast>,
}

/// Client for the color metadata API
#[derive(Debug, Clone)]
pub struct ColorClient {
    http: Client,
    base_url: String,
    cache: Option<CacheManager>,
}

impl ColorClient {
    /// Creates a new ColorClient with the default cache (7-day TTL)
    pub fn new() -> reqwest::Result<Self> {
        Ok(Self {
            http: http::default_client()?,
            base_url: COLOR_BASE_URL.to_string(),
            cache: CacheManager::for_provider("color"),
        })
    }

    /// Creates a new ColorClient with explicit base URL and cache
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

    /// Derives the cache key from the request parameters
    ///
    /// Pairs are sorted by name before joining, so the key is stable no
    /// matter how the parameter list was assembled.
    fn cache_key(params: &[(&str, String)]) -> String {
        let mut pairs: Vec<String> = params
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        pairs.sort();
        pairs.join("&")
    }

    /// Looks up metadata for a hex color
    ///
    /// # Arguments
    /// * `hex` - Hex color, with or without a `#` prefix (3 or 6 digits)
    ///
    /// # Returns
    /// * `Ok(ColorRecord)` - The decoded metadata record
    /// * `Err(ColorError::Validation)` - Not a hex color; no request made
    /// * `Err(ColorError)` - Request, decode, or cache read failure
    pub async fn lookup_hex(&self, hex: &str) -> Result<ColorRecord, ColorError> {
        let clean = normalize_hex(hex)?;
        let params = vec![("hex", clean), ("format", "json".to_string())];
        let cache_key = Self::cache_key(&params);

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.read::<ColorRecord>(&cache_key)? {
                tracing::debug!("color lookup served from cache: {}", cache_key);
                return Ok(cached);
            }
        }

        let query = params
            .iter()
            .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}/id?{}", self.base_url, query);
        tracing::debug!("looking up color: {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ColorError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let text = response.text().await?;
        let record: ColorRecord = serde_json::from_str(&text)?;

        if let Some(cache) = &self.cache {
            let _ = cache.write(&cache_key, &record);
        }

        Ok(record)
    }
}

/// Normalizes a hex color input to its bare lowercase digits
///
/// Accepts an optional `#` prefix and 3- or 6-digit forms. Anything else is
/// a validation error, raised before any network I/O.
pub fn normalize_hex(input: &str) -> Result<String, ColorError> {
    let stripped = input.trim().trim_start_matches('#');
    let valid_len = stripped.len() == 3 || stripped.len() == 6;
    if !valid_len || !stripped.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorError::Validation(format!(
            "'{}' is not a hex color",
            input
        )));
    }
    Ok(stripped.to_ascii_lowercase())
}
