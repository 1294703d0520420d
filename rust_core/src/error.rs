//! Typed failure taxonomy for the scraping pipeline.
//!
//! Extractors never surface these: a parse that matches nothing becomes an
//! empty result at the extractor boundary. Fetch-level failures propagate as
//! typed errors so the orchestrator alone decides whether to retry, fail
//! over to the next source, or abort the cycle.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The source actively refused the request (HTTP 403/429 or a CAPTCHA
    /// interstitial). Never retried; triggers immediate failover.
    #[error("source blocked the request (http {status})")]
    Blocked { status: u16 },

    /// Network-level failure: timeout, reset, DNS. Retried with backoff;
    /// exhausting retries escalates to failover.
    #[error("source unreachable: {reason}")]
    Unreachable { reason: String },

    /// A response arrived but none of the extraction strategies matched.
    /// The field is `origin`, not `source`: thiserror reserves that name
    /// for error chaining.
    #[error("unexpected content from {origin}: {tried} strategies tried")]
    UnexpectedContent { origin: &'static str, tried: usize },

    /// An event page was reachable but yielded zero fight-card entries.
    /// The whole event is discarded for the cycle.
    #[error("no fighters extracted for event '{event}'")]
    NoFightersExtracted { event: String },

    /// Every configured source failed for this data need.
    #[error("all sources exhausted while fetching {what}")]
    AllSourcesExhausted { what: &'static str },
}

impl ScrapeError {
    /// Only network-level failures are worth an automatic retry.
    pub fn is_retriable(&self) -> bool {
        matches!(self, ScrapeError::Unreachable { .. })
    }
}
