//! Shared HTTP transport construction for provider clients
//!
//! Every provider client owns one `reqwest::Client` for its lifetime, built
//! here with an identification header and a request timeout. The session is
//! released when the owning client is dropped.

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;

/// Request timeout applied to every provider session, in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Pool of browser identification strings used for outbound requests
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
];

/// Picks a user agent from the pool at random
pub fn random_user_agent() -> &'static str {
    let idx = rand::thread_rng().gen_range(0..USER_AGENTS.len());
    USER_AGENTS[idx]
}

/// Builds a `reqwest::Client` identifying itself with the given user agent
///
/// The client carries the session-wide defaults every provider uses: the
/// identification header and a 30-second request timeout. Falls back to the
/// library default user agent if the given string is not a valid header
/// value.
pub fn client_with_agent(user_agent: &str) -> reqwest::Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(user_agent) {
        headers.insert(USER_AGENT, value);
    }

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
}

/// Builds a `reqwest::Client` with a randomized identification header
pub fn default_client() -> reqwest::Result<reqwest::Client> {
    client_with_agent(random_user_agent())
}
