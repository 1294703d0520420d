//! Fetch layer: polite, header-rotating HTTP against anti-bot sources.
//!
//! Every request carries one of a pool of realistic browser header sets and
//! an optional referer matching the page that "linked" here. Requests in the
//! same session are separated by a randomized human-like delay (wider before
//! the first request). Only network-level failures are retried; a 403/429 or
//! CAPTCHA interstitial propagates immediately so the orchestrator can fail
//! over to the next source.
//!
//! The session is owned by the orchestrator and passed by reference; there
//! is no ambient/static scraper state.

use crate::error::ScrapeError;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, REFERER};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry budget for `Unreachable` failures.
const MAX_RETRIES: u32 = 3;

/// Base backoff between retries; doubles per attempt.
const RETRY_BACKOFF_MS: u64 = 500;

/// Body fragments that mean the source served a bot wall instead of content.
const CAPTCHA_MARKERS: &[&str] = &[
    "captcha",
    "cf-chl",
    "just a moment",
    "attention required",
    "access denied",
    "unusual traffic",
];

/// Rotated browser header sets. Kept small and current-looking; the point is
/// variety between consecutive requests, not perfect fidelity.
const HEADER_POOL: &[&[(&str, &str)]] = &[
    &[
        ("user-agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36"),
        ("accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"),
        ("accept-language", "en-US,en;q=0.9"),
        ("sec-ch-ua", "\"Not/A)Brand\";v=\"8\", \"Chromium\";v=\"126\", \"Google Chrome\";v=\"126\""),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", "\"Windows\""),
        ("upgrade-insecure-requests", "1"),
    ],
    &[
        ("user-agent", "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15"),
        ("accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        ("accept-language", "en-US,en;q=0.9"),
        ("upgrade-insecure-requests", "1"),
    ],
    &[
        ("user-agent", "Mozilla/5.0 (X11; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0"),
        ("accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"),
        ("accept-language", "en-GB,en;q=0.8"),
        ("upgrade-insecure-requests", "1"),
    ],
    &[
        ("user-agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36 Edg/125.0.0.0"),
        ("accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        ("accept-language", "en-US,en;q=0.8"),
        ("sec-ch-ua", "\"Microsoft Edge\";v=\"125\", \"Chromium\";v=\"125\", \"Not.A/Brand\";v=\"24\""),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", "\"Windows\""),
        ("upgrade-insecure-requests", "1"),
    ],
];

#[derive(Clone, Debug)]
pub struct FetchOptions {
    /// Page that plausibly linked to this URL.
    pub referer: Option<String>,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self { referer: None, timeout: Duration::from_secs(20) }
    }
}

#[derive(Clone, Debug)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

/// One logical scraping session. Fetches are strictly sequential; the
/// session tracks only how many requests it has issued, to widen the delay
/// before the first one.
pub struct FetchSession {
    client: Client,
    fast_mode: bool,
    requests_made: u64,
}

impl FetchSession {
    /// `fast_mode` removes the artificial delays (test environments).
    pub fn new(fast_mode: bool) -> Self {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, fast_mode, requests_made: 0 }
    }

    pub async fn fetch(
        &mut self,
        url: &str,
        opts: &FetchOptions,
    ) -> Result<FetchResponse, ScrapeError> {
        self.human_delay().await;
        self.requests_made += 1;

        let mut attempt: u32 = 0;
        loop {
            let headers = build_headers(opts.referer.as_deref());
            let result = self
                .client
                .get(url)
                .headers(headers)
                .timeout(opts.timeout)
                .send()
                .await;

            let err = match result {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if let Some(err) = classify_status(status) {
                        err
                    } else {
                        let body = resp.text().await.map_err(|e| ScrapeError::Unreachable {
                            reason: format!("body read failed: {}", e),
                        })?;
                        if looks_blocked(&body) {
                            debug!(url, "captcha marker in 2xx body");
                            return Err(ScrapeError::Blocked { status });
                        }
                        return Ok(FetchResponse { status, body });
                    }
                }
                Err(e) => ScrapeError::Unreachable { reason: e.to_string() },
            };

            if !err.is_retriable() || attempt >= MAX_RETRIES {
                return Err(err);
            }
            attempt += 1;
            let backoff = if self.fast_mode {
                Duration::from_millis(25)
            } else {
                Duration::from_millis(RETRY_BACKOFF_MS * 2u64.pow(attempt - 1))
            };
            warn!(url, attempt, "fetch failed ({}), retrying in {:?}", err, backoff);
            tokio::time::sleep(backoff).await;
        }
    }

    /// Randomized pause before each request. 1-3 s within a session, 2-5 s
    /// before the session's first request.
    async fn human_delay(&self) {
        if self.fast_mode {
            return;
        }
        let ms = if self.requests_made == 0 {
            rand::thread_rng().gen_range(2_000..5_000)
        } else {
            rand::thread_rng().gen_range(1_000..3_000)
        };
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    pub fn requests_made(&self) -> u64 {
        self.requests_made
    }
}

/// Non-2xx classification. 403/429 are an active refusal; everything else
/// is treated as transient.
fn classify_status(status: u16) -> Option<ScrapeError> {
    match status {
        200..=299 => None,
        403 | 429 => Some(ScrapeError::Blocked { status }),
        _ => Some(ScrapeError::Unreachable { reason: format!("http {}", status) }),
    }
}

/// CAPTCHA/bot-wall detection on a nominally successful body.
fn looks_blocked(body: &str) -> bool {
    let head: String = body.chars().take(4_000).collect::<String>().to_lowercase();
    CAPTCHA_MARKERS.iter().any(|m| head.contains(m))
}

fn build_headers(referer: Option<&str>) -> HeaderMap {
    let set = HEADER_POOL[rand::thread_rng().gen_range(0..HEADER_POOL.len())];
    let mut headers = HeaderMap::new();
    for (name, value) in set {
        if let (Ok(n), Ok(v)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(n, v);
        }
    }
    if let Some(r) = referer {
        if let Ok(v) = HeaderValue::from_str(r) {
            headers.insert(REFERER, v);
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(classify_status(200).is_none());
        assert!(matches!(classify_status(403), Some(ScrapeError::Blocked { status: 403 })));
        assert!(matches!(classify_status(429), Some(ScrapeError::Blocked { status: 429 })));
        assert!(matches!(classify_status(503), Some(ScrapeError::Unreachable { .. })));
    }

    #[test]
    fn captcha_markers_detected_case_insensitively() {
        assert!(looks_blocked("<html><title>Just a Moment...</title></html>"));
        assert!(looks_blocked("please solve this CAPTCHA to continue"));
        assert!(!looks_blocked("<html><table class=\"b-statistics__table-events\"></table>"));
    }

    #[test]
    fn headers_always_carry_a_user_agent() {
        for _ in 0..20 {
            let headers = build_headers(Some("https://example.com/"));
            assert!(headers.contains_key("user-agent"));
            assert!(headers.contains_key("accept-language"));
            assert_eq!(headers.get("referer").unwrap(), "https://example.com/");
        }
    }
}
