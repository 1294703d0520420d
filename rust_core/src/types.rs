//! Canonical and intermediate data model for the scraping pipeline.
//!
//! Extractors emit the `Raw*` shapes with explicit `Option` fields; the
//! orchestrator resolves them into the canonical `Event`/`Fight`/`Fighter`
//! records. Identity is deterministic: the same normalized name always
//! produces the same id, so re-scrapes upsert instead of duplicating.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Earliest year a scraped event date is believed. Anything before this is
/// a parse artifact (a stale page, a two-digit year) and gets the fallback.
pub const MIN_PLAUSIBLE_EVENT_YEAR: i32 = 2025;

/// Offset applied when an event date cannot be parsed at all.
pub const FALLBACK_DATE_OFFSET_DAYS: i64 = 30;

/// UFC 139 (2011-11-12): first non-title five-round main event. Non-title
/// main events on or before this date were three rounds.
pub const FIVE_ROUND_MAIN_EVENT_CUTOFF: &str = "2011-11-12";

/// Supported data sources, in default priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    UfcStats,
    UfcCom,
    Espn,
    Tapology,
    Wikipedia,
    Sherdog,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::UfcStats => "ufcstats",
            Source::UfcCom => "ufc.com",
            Source::Espn => "espn",
            Source::Tapology => "tapology",
            Source::Wikipedia => "wikipedia",
            Source::Sherdog => "sherdog",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Source> {
        match s.trim().to_lowercase().as_str() {
            "ufcstats" => Some(Source::UfcStats),
            "ufc" | "ufc.com" | "ufccom" => Some(Source::UfcCom),
            "espn" => Some(Source::Espn),
            "tapology" => Some(Source::Tapology),
            "wikipedia" => Some(Source::Wikipedia),
            "sherdog" => Some(Source::Sherdog),
            _ => None,
        }
    }

    pub fn all() -> &'static [Source] {
        &[
            Source::UfcStats,
            Source::UfcCom,
            Source::Espn,
            Source::Tapology,
            Source::Wikipedia,
            Source::Sherdog,
        ]
    }
}

/// Position of a fight on the card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardPosition {
    Main,
    Preliminary,
    EarlyPreliminary,
}

impl CardPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardPosition::Main => "main",
            CardPosition::Preliminary => "prelim",
            CardPosition::EarlyPreliminary => "early_prelim",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FightStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl FightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FightStatus::Scheduled => "scheduled",
            FightStatus::Completed => "completed",
            FightStatus::Cancelled => "cancelled",
        }
    }
}

/// Whether a fighter's statistics came from a real source or were
/// fabricated by the basic-profile synthesizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Real,
    Synthesized,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Real => "real",
            Provenance::Synthesized => "synthesized",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightClass {
    Flyweight,
    Bantamweight,
    Featherweight,
    Lightweight,
    Welterweight,
    Middleweight,
    LightHeavyweight,
    Heavyweight,
    WomensStrawweight,
    WomensFlyweight,
    WomensBantamweight,
    WomensFeatherweight,
    Catchweight,
    Unknown,
}

impl WeightClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightClass::Flyweight => "flyweight",
            WeightClass::Bantamweight => "bantamweight",
            WeightClass::Featherweight => "featherweight",
            WeightClass::Lightweight => "lightweight",
            WeightClass::Welterweight => "welterweight",
            WeightClass::Middleweight => "middleweight",
            WeightClass::LightHeavyweight => "light_heavyweight",
            WeightClass::Heavyweight => "heavyweight",
            WeightClass::WomensStrawweight => "womens_strawweight",
            WeightClass::WomensFlyweight => "womens_flyweight",
            WeightClass::WomensBantamweight => "womens_bantamweight",
            WeightClass::WomensFeatherweight => "womens_featherweight",
            WeightClass::Catchweight => "catchweight",
            WeightClass::Unknown => "unknown",
        }
    }

    /// Infer a weight class from free text. Women's divisions and compound
    /// names must be checked before the bare men's keywords ("light
    /// heavyweight" contains "heavyweight", "women's flyweight" contains
    /// "flyweight").
    pub fn infer(text: &str) -> WeightClass {
        let t = text.to_lowercase().replace('\u{2019}', "'");
        const PATTERNS: &[(&str, WeightClass)] = &[
            ("women's strawweight", WeightClass::WomensStrawweight),
            ("women's flyweight", WeightClass::WomensFlyweight),
            ("women's bantamweight", WeightClass::WomensBantamweight),
            ("women's featherweight", WeightClass::WomensFeatherweight),
            ("strawweight", WeightClass::WomensStrawweight),
            ("light heavyweight", WeightClass::LightHeavyweight),
            ("catchweight", WeightClass::Catchweight),
            ("catch weight", WeightClass::Catchweight),
            ("flyweight", WeightClass::Flyweight),
            ("bantamweight", WeightClass::Bantamweight),
            ("featherweight", WeightClass::Featherweight),
            ("lightweight", WeightClass::Lightweight),
            ("welterweight", WeightClass::Welterweight),
            ("middleweight", WeightClass::Middleweight),
            ("heavyweight", WeightClass::Heavyweight),
        ];
        for (needle, wc) in PATTERNS {
            if t.contains(needle) {
                return *wc;
            }
        }
        WeightClass::Unknown
    }
}

/// A W-L-D professional record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FightRecord {
    pub wins: u16,
    pub losses: u16,
    pub draws: u16,
}

impl FightRecord {
    /// Parse a record string like "27-1-0" or "15-3". Returns `None` for
    /// anything that does not open with a W-L pair.
    pub fn parse(s: &str) -> Option<FightRecord> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r"(\d+)-(\d+)(?:-(\d+))?").unwrap());
        let caps = re.captures(s.trim())?;
        Some(FightRecord {
            wins: caps.get(1)?.as_str().parse().ok()?,
            losses: caps.get(2)?.as_str().parse().ok()?,
            draws: caps
                .get(3)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0),
        })
    }
}

/// Per-fighter statistics block consumed by the scoring oracle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FightStats {
    pub sig_strikes_landed_per_min: f64,
    pub striking_accuracy_pct: f64,
    pub strikes_absorbed_per_min: f64,
    pub striking_defense_pct: f64,
    pub takedowns_per_15_min: f64,
    pub takedown_accuracy_pct: f64,
    pub takedown_defense_pct: f64,
    pub submissions_per_15_min: f64,
    pub finish_rate_pct: f64,
    pub avg_fight_minutes: f64,
}

// ---------------------------------------------------------------------------
// Raw intermediate shapes (extractor output, discarded after matching)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub name: String,
    pub date_text: Option<String>,
    pub location: Option<String>,
    pub url: Option<String>,
    pub source: Source,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawFight {
    pub fighter1: String,
    pub fighter2: String,
    pub weight_class: WeightClass,
    /// `None` when the source does not label card position; the orchestrator
    /// fills it in by discovery order.
    pub card_position: Option<CardPosition>,
    /// A row carrying a win/loss marker means the bout already happened.
    pub completed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawFighterRef {
    pub name: String,
    pub url: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFighterProfile {
    pub name: String,
    pub nickname: Option<String>,
    pub record: Option<FightRecord>,
    pub weight_class: Option<WeightClass>,
    pub stats: Option<FightStats>,
}

// ---------------------------------------------------------------------------
// Canonical entities
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    pub id: String,
    pub name: String,
    pub nickname: Option<String>,
    pub record: FightRecord,
    pub weight_class: WeightClass,
    pub stats: FightStats,
    pub provenance: Provenance,
    /// `None` for synthesized profiles, which are timeless by construction.
    pub last_scraped: Option<DateTime<Utc>>,
}

impl Fighter {
    pub fn from_profile(profile: &RawFighterProfile, now: DateTime<Utc>) -> Fighter {
        Fighter {
            id: fighter_id(&profile.name),
            name: profile.name.clone(),
            nickname: profile.nickname.clone(),
            record: profile.record.unwrap_or_default(),
            weight_class: profile.weight_class.unwrap_or(WeightClass::Unknown),
            stats: profile.stats.unwrap_or_default(),
            provenance: Provenance::Real,
            last_scraped: Some(now),
        }
    }

    /// Merge `incoming` into `self`. A synthesized profile never overwrites
    /// a record that already holds real statistics.
    pub fn apply(&mut self, incoming: &Fighter) {
        if self.provenance == Provenance::Real && incoming.provenance == Provenance::Synthesized {
            return;
        }
        let id = self.id.clone();
        *self = incoming.clone();
        self.id = id;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fight {
    pub id: String,
    pub event_id: String,
    pub fighter1_id: String,
    pub fighter2_id: String,
    pub weight_class: WeightClass,
    pub scheduled_rounds: u8,
    pub card_position: CardPosition,
    pub status: FightStatus,
}

impl Fight {
    pub fn fight_id(event_id: &str, fighter1_id: &str, fighter2_id: &str) -> String {
        format!("{}-{}-{}", event_id, fighter1_id, fighter2_id)
    }
}

/// Scheduled round count: five for title fights, five for non-title main
/// events after the historical cutoff, three otherwise.
pub fn scheduled_rounds(is_title: bool, is_main_event: bool, event_date: DateTime<Utc>) -> u8 {
    if is_title {
        return 5;
    }
    let cutoff = NaiveDate::parse_from_str(FIVE_ROUND_MAIN_EVENT_CUTOFF, "%Y-%m-%d")
        .unwrap_or_else(|_| NaiveDate::from_ymd_opt(2011, 11, 12).unwrap());
    if is_main_event && event_date.date_naive() > cutoff {
        5
    } else {
        3
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub venue: Option<String>,
    /// Full card in discovery order.
    pub fights: Vec<Fight>,
    pub cancelled: bool,
}

impl Event {
    pub fn main_card(&self) -> Vec<&Fight> {
        self.card_section(CardPosition::Main)
    }

    pub fn prelims(&self) -> Vec<&Fight> {
        self.card_section(CardPosition::Preliminary)
    }

    pub fn early_prelims(&self) -> Vec<&Fight> {
        self.card_section(CardPosition::EarlyPreliminary)
    }

    fn card_section(&self, pos: CardPosition) -> Vec<&Fight> {
        self.fights.iter().filter(|f| f.card_position == pos).collect()
    }
}

/// Fill unlabeled card positions by discovery order: the first `main_n`
/// fights are main card, the next `prelim_n` preliminary, the remainder
/// early-preliminary. Source-labeled positions are left alone.
pub fn assign_card_positions(fights: &mut [RawFight], main_n: usize, prelim_n: usize) {
    let mut unlabeled = 0usize;
    for fight in fights.iter_mut() {
        if fight.card_position.is_some() {
            continue;
        }
        fight.card_position = Some(if unlabeled < main_n {
            CardPosition::Main
        } else if unlabeled < main_n + prelim_n {
            CardPosition::Preliminary
        } else {
            CardPosition::EarlyPreliminary
        });
        unlabeled += 1;
    }
}

// ---------------------------------------------------------------------------
// Identity and date helpers
// ---------------------------------------------------------------------------

/// Lowercase alphanumeric slug, words joined by hyphens.
pub fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_hyphen = true;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            out.push('-');
            last_hyphen = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Stable fighter id derived from the normalized name.
pub fn fighter_id(name: &str) -> String {
    slugify(&crate::matching::normalize_name(name))
}

/// Stable event id. Numbered events collapse to "ufc-<n>" so retitled cards
/// ("UFC 312" vs "UFC 312: Whittaker vs Chimaev") share an id; Fight Nights
/// slug the subtitle; anything else slugs the first five words.
pub fn event_id(name: &str) -> String {
    static NUMBERED: OnceLock<Regex> = OnceLock::new();
    static FIGHT_NIGHT: OnceLock<Regex> = OnceLock::new();
    let numbered = NUMBERED.get_or_init(|| Regex::new(r"(?i)\bUFC\s*#?\s*(\d+)\b").unwrap());
    if let Some(caps) = numbered.captures(name) {
        return format!("ufc-{}", &caps[1]);
    }
    let fight_night =
        FIGHT_NIGHT.get_or_init(|| Regex::new(r"(?i)UFC\s+Fight\s+Night\s*:?\s*(.+)").unwrap());
    if let Some(caps) = fight_night.captures(name) {
        let subtitle: Vec<&str> = caps[1].split_whitespace().take(3).collect();
        return slugify(&format!("ufc-fight-night-{}", subtitle.join(" ")));
    }
    let head: Vec<&str> = name.split_whitespace().take(5).collect();
    slugify(&head.join(" "))
}

/// Parse an event date out of scraped text. Unparseable input or a date
/// before the plausibility cutoff yields "now + fixed offset" so the event
/// still sorts into the future rather than vanishing into 1970.
pub fn parse_event_date(text: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    const FORMATS: &[&str] = &[
        "%B %d, %Y",
        "%b %d, %Y",
        "%b %e, %Y",
        "%Y-%m-%d",
        "%d %B %Y",
        "%m/%d/%Y",
    ];
    let cleaned = text.trim();
    for fmt in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cleaned, fmt) {
            if date.year() >= MIN_PLAUSIBLE_EVENT_YEAR {
                let naive = date.and_hms_opt(0, 0, 0).unwrap_or_default();
                return DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc);
            }
        }
    }
    now + Duration::days(FALLBACK_DATE_OFFSET_DAYS)
}

/// First comma-separated component of a location string, which the sources
/// use for the venue or host city.
pub fn venue_from_location(location: &str) -> Option<String> {
    let first = location.split(',').next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

// ---------------------------------------------------------------------------
// Cycle reporting
// ---------------------------------------------------------------------------

/// Structured summary of one scraping cycle, emitted for the CLI caller.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CycleSummary {
    pub events_processed: usize,
    pub new_events: usize,
    pub updated_events: usize,
    pub missing_events: usize,
    pub cancelled_events: usize,
    pub cancelled_fights: usize,
    pub fighters_enriched: usize,
    pub fighters_synthesized: usize,
    pub errors: Vec<String>,
}
