//! Anime/manga list feed client
//!
//! Fetches a user's public list feed (MyAnimeList-style RSS) and decodes each
//! item into a typed record: cleaned title, canonical URL, watch status,
//! progress pair, and publication time. Items come back in document order,
//! exactly as the feed emitted them.
//!
//! The ad-hoc string formats inside the feed (title suffix, status phrase,
//! `current of total` progress, RFC-2822 dates) each get their own parsing
//! function so the grammar of every field is testable in isolation.

use chrono::{DateTime, FixedOffset};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::http;

/// Base URL for the list feed
const FEED_BASE_URL: &str = "https://myanimelist.net/rss.php";

/// Errors that can occur when fetching or decoding a feed
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Feed endpoint returned an error response
    #[error("feed error {status}: {message}")]
    Api { status: u16, message: String },

    /// XML document could not be read
    #[error("XML parse error: {0}")]
    Xml(String),

    /// A feed item lacked a required element
    #[error("feed item missing element: {0}")]
    MissingElement(&'static str),

    /// A publication date did not match the feed's date format
    #[error("unrecognized date format: {0}")]
    Date(String),

    /// An item link could not be rewritten to canonical form
    #[error("item URL not in canonical form: {0}")]
    Url(String),
}

/// Which of the user's list feeds to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    /// Currently-watching anime list
    AnimeList,
    /// Per-episode watch history
    AnimeHistory,
    /// Currently-reading manga list
    MangaList,
    /// Per-chapter read history
    MangaHistory,
}

impl FeedKind {
    /// Wire value for the feed's `type` query parameter
    pub fn type_code(&self) -> &'static str {
        match self {
            FeedKind::AnimeList => "rw",
            FeedKind::AnimeHistory => "rwe",
            FeedKind::MangaList => "rm",
            FeedKind::MangaHistory => "rrm",
        }
    }

    /// Whether the feed emits one item per episode/chapter event
    ///
    /// History feeds are per-item and their titles are already clean; list
    /// feeds append a trailing score token to titles, which gets stripped.
    pub fn per_item(&self) -> bool {
        matches!(self, FeedKind::AnimeHistory | FeedKind::MangaHistory)
    }
}

/// Where an entry sits in the user's list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WatchStatus {
    Watching,
    Completed,
    OnHold,
    Dropped,
    PlanToWatch,
    Reading,
    PlanToRead,
    /// Status phrase not in the known set
    Unknown,
}

/// Consumption progress: episodes watched or chapters read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Episodes/chapters consumed so far
    pub current: u32,
    /// Total the series runs to; absent while the feed reports it unknown
    pub total: Option<u32>,
}

/// One decoded feed item
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    /// Series title, cleaned of any trailing score token
    pub title: String,
    /// Canonical URL for the series
    pub url: String,
    /// List status for the entry
    pub status: WatchStatus,
    /// Progress pair decoded from the item description
    pub progress: Progress,
    /// Publication time of the feed item
    pub published: DateTime<FixedOffset>,
}

/// Client for a user's list feeds
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: Client,
    base_url: String,
}

impl FeedClient {
    /// Creates a new FeedClient with a randomized identification header
    pub fn new() -> reqwest::Result<Self> {
        Ok(Self {
            http: http::default_client()?,
            base_url: FEED_BASE_URL.to_string(),
        })
    }

    /// Creates a new FeedClient with a custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> reqwest::Result<Self> {
        Ok(Self {
            http: http::default_client()?,
            base_url: base_url.into(),
        })
    }

    /// Fetches and decodes one of a user's list feeds
    ///
    /// # Arguments
    /// * `user` - List owner's username
    /// * `kind` - Which feed to fetch
    ///
    /// # Returns
    /// * `Ok(Vec<FeedItem>)` - Decoded items in document order
    /// * `Err(FeedError)` - Request failure, or the first malformed item
    ///   (a bad item aborts the whole decode; partial feeds are not emitted)
    pub async fn fetch(&self, user: &str, kind: FeedKind) -> Result<Vec<FeedItem>, FeedError> {
        let url = format!(
            "{}?type={}&u={}",
            self.base_url,
            kind.type_code(),
            urlencoding::encode(user)
        );
        tracing::debug!("fetching list feed: {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let bytes = response.bytes().await?;
        let items = parse_feed(&bytes, kind)?;
        tracing::debug!("decoded {} feed items", items.len());
        Ok(items)
    }
}

/// Accumulates one item's raw elements during the XML pass
#[derive(Default)]
struct RawItem {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    pub_date: Option<String>,
}

/// Parses a list feed document into decoded items
///
/// Items are decoded in document order and the order is preserved. The first
/// item that fails to decode aborts the parse.
pub fn parse_feed(xml: &[u8], kind: FeedKind) -> Result<Vec<FeedItem>, FeedError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut buf = Vec::new();

    let mut current_item: Option<RawItem> = None;
    let mut current_element = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                current_element = name.clone();

                if name == "item" {
                    current_item = Some(RawItem::default());
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                if name == "item" {
                    if let Some(raw) = current_item.take() {
                        items.push(decode_item(raw, kind)?);
                    }
                }
                current_element.clear();
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                record_text(&mut current_item, &current_element, text);
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).to_string();
                record_text(&mut current_item, &current_element, text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(FeedError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(items)
}

/// Stores element text on the item currently being built
fn record_text(current_item: &mut Option<RawItem>, element: &str, text: String) {
    if let Some(item) = current_item {
        if text.is_empty() {
            return;
        }
        match element {
            "title" => item.title = Some(text),
            "link" => item.link = Some(text),
            "description" => item.description = Some(text),
            "pubDate" => item.pub_date = Some(text),
            _ => {}
        }
    }
}

/// Decodes one raw item into a typed record
fn decode_item(raw: RawItem, kind: FeedKind) -> Result<FeedItem, FeedError> {
    let raw_title = raw.title.ok_or(FeedError::MissingElement("title"))?;
    let title = if kind.per_item() {
        raw_title
    } else {
        strip_trailing_token(&raw_title)
    };

    let link = raw.link.ok_or(FeedError::MissingElement("link"))?;
    let url = canonical_item_url(&link)?;

    let (status, progress) = parse_activity(raw.description.as_deref().unwrap_or(""));

    let date_str = raw.pub_date.ok_or(FeedError::MissingElement("pubDate"))?;
    let published = parse_pub_date(&date_str)?;

    Ok(FeedItem {
        title,
        url,
        status,
        progress,
        published,
    })
}

/// Drops the trailing ` - <token>` segment of a list-feed title
///
/// Only the last segment goes; a title that itself contains the separator
/// keeps its earlier segments.
pub fn strip_trailing_token(title: &str) -> String {
    match title.rsplit_once(" - ") {
        Some((kept, _)) => kept.to_string(),
        None => title.to_string(),
    }
}

/// Splits an item description into its status phrase and progress field
///
/// Descriptions read like `Watching - 5 of 28 episodes`: the status phrase
/// up to the first separator, then the progress field.
fn parse_activity(description: &str) -> (WatchStatus, Progress) {
    let trimmed = description.trim();
    let status_part = trimmed.split(" - ").next().unwrap_or(trimmed);
    let status = parse_status(status_part);
    let progress = parse_progress(trimmed[status_part.len()..].trim_start());
    (status, progress)
}

/// Matches a status phrase against the known set
///
/// Phrases outside the set decode to `Unknown`, never an error.
pub fn parse_status(phrase: &str) -> WatchStatus {
    match phrase.trim() {
        "Watching" => WatchStatus::Watching,
        "Completed" => WatchStatus::Completed,
        "On-Hold" => WatchStatus::OnHold,
        "Dropped" => WatchStatus::Dropped,
        "Plan to Watch" => WatchStatus::PlanToWatch,
        "Reading" => WatchStatus::Reading,
        "Plan to Read" => WatchStatus::PlanToRead,
        _ => WatchStatus::Unknown,
    }
}

/// Parses a progress field of the form `- <current> of <total> [episodes]`
///
/// Grammar: an optional leading `-`, a count, the literal ` of `, and a
/// total that reads `??` while the series length is unknown. A non-numeric
/// count decodes to 0; a non-numeric total decodes to absent.
pub fn parse_progress(field: &str) -> Progress {
    let body = field.trim().trim_start_matches('-').trim_start();
    match body.split_once(" of ") {
        Some((current_part, total_part)) => Progress {
            current: current_part.trim().parse().unwrap_or(0),
            total: total_part
                .split_whitespace()
                .next()
                .and_then(|t| t.parse().ok()),
        },
        None => Progress {
            current: body
                .split_whitespace()
                .next()
                .and_then(|t| t.parse().ok())
                .unwrap_or(0),
            total: None,
        },
    }
}

/// Parses an item publication date (RFC 2822, the feed's one fixed format)
///
/// A date in any other shape is a fatal decode error for the item, which in
/// turn aborts the whole feed parse.
fn parse_pub_date(raw: &str) -> Result<DateTime<FixedOffset>, FeedError> {
    DateTime::parse_from_rfc2822(raw.trim()).map_err(|_| FeedError::Date(raw.to_string()))
}

/// Rewrites an item link to the canonical `https://<host>/<kind>/<id>` form
///
/// The two path segments (media kind and numeric id) come from the item's
/// own URL; any title slug, query, or fragment after them is dropped.
pub fn canonical_item_url(link: &str) -> Result<String, FeedError> {
    let rest = link
        .strip_prefix("https://")
        .or_else(|| link.strip_prefix("http://"))
        .ok_or_else(|| FeedError::Url(link.to_string()))?;

    let mut segments = rest.split('/').filter(|s| !s.is_empty());
    let host = segments.next().ok_or_else(|| FeedError::Url(link.to_string()))?;
    let kind = segments.next().ok_or_else(|| FeedError::Url(link.to_string()))?;
    let id = segments
        .next()
        .and_then(|s| s.split(['?', '#']).next())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| FeedError::Url(link.to_string()))?;

    Ok(format!("https://{}/{}/{}", host, kind, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<rss version="2.0">
 <channel>
  <title>Rincewind's Anime List</title>
  <link>https://myanimelist.net/animelist/Rincewind</link>
  <description>Latest list updates</description>
  <item>
    <title><![CDATA[Sousou no Frieren - 9]]></title>
    <link>https://myanimelist.net/anime/52991/Sousou_no_Frieren?utm=rss</link>
    <description><![CDATA[Watching - 5 of 28 episodes]]></description>
    <pubDate>Mon, 23 Dec 2024 12:30:00 -0800</pubDate>
  </item>
  <item>
    <title><![CDATA[Cowboy Bebop - 10]]></title>
    <link>https://myanimelist.net/anime/1/Cowboy_Bebop</link>
    <description><![CDATA[Completed - 26 of 26 episodes]]></description>
    <pubDate>Sun, 22 Dec 2024 08:00:00 -0800</pubDate>
  </item>
 </channel>
</rss>"#;

    const UNKNOWN_TOTAL_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<rss version="2.0">
 <channel>
  <title>Rincewind's Manga List</title>
  <item>
    <title><![CDATA[One Piece - 8]]></title>
    <link>https://myanimelist.net/manga/13/One_Piece</link>
    <description><![CDATA[Reading - 5 of ??]]></description>
    <pubDate>Mon, 23 Dec 2024 12:30:00 -0800</pubDate>
  </item>
 </channel>
</rss>"#;

    const ODD_STATUS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<rss version="2.0">
 <channel>
  <item>
    <title><![CDATA[Some Show - 7]]></title>
    <link>https://myanimelist.net/anime/99999/Some_Show</link>
    <description><![CDATA[Rewatching - 3 of 12 episodes]]></description>
    <pubDate>Mon, 23 Dec 2024 12:30:00 -0800</pubDate>
  </item>
 </channel>
</rss>"#;

    const BAD_DATE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<rss version="2.0">
 <channel>
  <item>
    <title><![CDATA[First - 9]]></title>
    <link>https://myanimelist.net/anime/1/First</link>
    <description><![CDATA[Watching - 1 of 12 episodes]]></description>
    <pubDate>Mon, 23 Dec 2024 12:30:00 -0800</pubDate>
  </item>
  <item>
    <title><![CDATA[Second - 9]]></title>
    <link>https://myanimelist.net/anime/2/Second</link>
    <description><![CDATA[Watching - 2 of 12 episodes]]></description>
    <pubDate>not a date at all</pubDate>
  </item>
 </channel>
</rss>"#;

    #[test]
    fn test_parse_list_feed() {
        let items = parse_feed(LIST_FEED.as_bytes(), FeedKind::AnimeList)
            .expect("Failed to parse list feed");

        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.title, "Sousou no Frieren");
        assert_eq!(first.url, "https://myanimelist.net/anime/52991");
        assert_eq!(first.status, WatchStatus::Watching);
        assert_eq!(first.progress, Progress { current: 5, total: Some(28) });
        assert_eq!(
            first.published,
            DateTime::parse_from_rfc2822("Mon, 23 Dec 2024 12:30:00 -0800").unwrap()
        );
    }

    #[test]
    fn test_feed_preserves_document_order() {
        let items = parse_feed(LIST_FEED.as_bytes(), FeedKind::AnimeList)
            .expect("Failed to parse list feed");

        assert_eq!(items[0].title, "Sousou no Frieren");
        assert_eq!(items[1].title, "Cowboy Bebop");
        assert_eq!(items[1].status, WatchStatus::Completed);
    }

    #[test]
    fn test_per_item_kind_keeps_full_title() {
        let items = parse_feed(LIST_FEED.as_bytes(), FeedKind::AnimeHistory)
            .expect("Failed to parse list feed");

        assert_eq!(items[0].title, "Sousou no Frieren - 9");
    }

    #[test]
    fn test_unknown_total_decodes_to_absent() {
        let items = parse_feed(UNKNOWN_TOTAL_FEED.as_bytes(), FeedKind::MangaList)
            .expect("Failed to parse feed");

        assert_eq!(items[0].status, WatchStatus::Reading);
        assert_eq!(items[0].progress, Progress { current: 5, total: None });
    }

    #[test]
    fn test_unmatched_status_decodes_to_unknown() {
        let items = parse_feed(ODD_STATUS_FEED.as_bytes(), FeedKind::AnimeList)
            .expect("Feed with odd status should still parse");

        assert_eq!(items[0].status, WatchStatus::Unknown);
        assert_eq!(items[0].progress, Progress { current: 3, total: Some(12) });
    }

    #[test]
    fn test_bad_date_aborts_whole_parse() {
        let result = parse_feed(BAD_DATE_FEED.as_bytes(), FeedKind::AnimeList);

        assert!(matches!(result, Err(FeedError::Date(_))));
    }

    #[test]
    fn test_strip_trailing_token() {
        assert_eq!(strip_trailing_token("Sousou no Frieren - 9"), "Sousou no Frieren");
        assert_eq!(strip_trailing_token("No token here"), "No token here");
    }

    #[test]
    fn test_strip_trailing_token_drops_only_last_segment() {
        assert_eq!(strip_trailing_token("Re:Zero - Season 2 - 8"), "Re:Zero - Season 2");
    }

    #[test]
    fn test_parse_progress_grammar() {
        assert_eq!(parse_progress("- 5 of ??"), Progress { current: 5, total: None });
        assert_eq!(
            parse_progress("- 12 of 24 episodes"),
            Progress { current: 12, total: Some(24) }
        );
        assert_eq!(parse_progress("- ?? of 24"), Progress { current: 0, total: Some(24) });
        assert_eq!(parse_progress(""), Progress { current: 0, total: None });
    }

    #[test]
    fn test_parse_status_known_and_unknown() {
        assert_eq!(parse_status("Watching"), WatchStatus::Watching);
        assert_eq!(parse_status("Plan to Watch"), WatchStatus::PlanToWatch);
        assert_eq!(parse_status("Plan to Read"), WatchStatus::PlanToRead);
        assert_eq!(parse_status("Rewatching"), WatchStatus::Unknown);
    }

    #[test]
    fn test_canonical_item_url() {
        assert_eq!(
            canonical_item_url("https://myanimelist.net/anime/52991/Sousou_no_Frieren?utm=rss")
                .expect("Should canonicalize"),
            "https://myanimelist.net/anime/52991"
        );
        assert_eq!(
            canonical_item_url("http://myanimelist.net/manga/13/One_Piece")
                .expect("Should canonicalize"),
            "https://myanimelist.net/manga/13"
        );
    }

    #[test]
    fn test_canonical_item_url_rejects_short_paths() {
        assert!(canonical_item_url("https://myanimelist.net/anime").is_err());
        assert!(canonical_item_url("not a url").is_err());
    }

    #[test]
    fn test_feed_kind_codes() {
        assert_eq!(FeedKind::AnimeList.type_code(), "rw");
        assert_eq!(FeedKind::AnimeHistory.type_code(), "rwe");
        assert_eq!(FeedKind::MangaList.type_code(), "rm");
        assert_eq!(FeedKind::MangaHistory.type_code(), "rrm");
        assert!(FeedKind::AnimeHistory.per_item());
        assert!(!FeedKind::AnimeList.per_item());
    }
}
