use cagefeed_core::Source;
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    /// Unset means run against the in-memory sink (dev / dry runs).
    pub database_url: Option<String>,
    /// Maximum events to carry through one cycle.
    pub fetch_limit: usize,
    pub event_strike_threshold: u32,
    pub fight_strike_threshold: u32,
    /// Sources tried in priority order. Empty env value means all.
    pub enabled_sources: Vec<Source>,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    /// Disables human-pacing delays between requests.
    pub fast_mode: bool,
    pub ledger_path: String,
    pub source_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            fetch_limit: env::var("FETCH_LIMIT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            event_strike_threshold: env::var("EVENT_STRIKE_THRESHOLD")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap_or(3),
            fight_strike_threshold: env::var("FIGHT_STRIKE_THRESHOLD")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .unwrap_or(2),
            enabled_sources: parse_sources(
                &env::var("ENABLED_SOURCES").unwrap_or_default(),
            ),
            batch_size: env::var("BATCH_SIZE")
                .unwrap_or_else(|_| "25".to_string())
                .parse()
                .unwrap_or(25),
            batch_delay_ms: env::var("BATCH_DELAY_MS")
                .unwrap_or_else(|_| "250".to_string())
                .parse()
                .unwrap_or(250),
            fast_mode: matches!(
                env::var("FAST_MODE").unwrap_or_default().to_lowercase().as_str(),
                "1" | "true" | "yes"
            ),
            ledger_path: env::var("LEDGER_PATH")
                .unwrap_or_else(|_| "strike_ledger.json".to_string()),
            source_timeout_secs: env::var("SOURCE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .unwrap_or(20),
        }
    }

    pub fn source_enabled(&self, source: Source) -> bool {
        self.enabled_sources.is_empty() || self.enabled_sources.contains(&source)
    }
}

fn parse_sources(raw: &str) -> Vec<Source> {
    raw.split(',')
        .filter_map(|s| Source::from_str_loose(s.trim()))
        .collect()
}
