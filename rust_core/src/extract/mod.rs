//! Source extractors: one per site, all producing the same `Raw*` shapes.
//!
//! The target sites change markup without notice and without versioning, so
//! every extractor runs an ordered cascade of selector strategies and stops
//! at the first that yields a non-empty result. When fight cards only exist
//! as prose ("Fighter A vs. Fighter B" sentences), extraction falls back to
//! regex pattern families of increasing leniency, with every candidate pair
//! filtered through a blocklist of known page-chrome false positives.
//!
//! Extractors never error: no strategy matching means an empty result, and
//! the orchestrator treats that as `UnexpectedContent` for failover.

pub mod espn;
pub mod sherdog;
pub mod tapology;
pub mod ufc;
pub mod ufcstats;
pub mod wikipedia;

use crate::types::{
    CardPosition, RawEvent, RawFight, RawFighterProfile, RawFighterRef, Source, WeightClass,
};
use regex::Regex;
use scraper::ElementRef;
use std::sync::OnceLock;

/// Text window scanned around a matched pair for weight-class keywords.
pub const WEIGHT_CLASS_WINDOW: usize = 250;

/// Site-specific extraction behind a common interface.
pub trait SourceExtractor: Send + Sync {
    fn source(&self) -> Source;

    /// Listing page for upcoming events.
    fn events_url(&self) -> &'static str;

    /// Fighter directory page used for profile enrichment, when the source
    /// has a usable one.
    fn directory_url(&self) -> Option<&'static str> {
        None
    }

    fn extract_events(&self, html: &str) -> Vec<RawEvent>;

    fn extract_fight_card(&self, html: &str) -> Vec<RawFight>;

    fn extract_fighter_directory(&self, html: &str) -> Vec<RawFighterRef> {
        let _ = html;
        Vec::new()
    }

    fn extract_fighter_profile(&self, html: &str) -> Option<RawFighterProfile> {
        let _ = html;
        None
    }
}

/// Every extractor in default priority order.
pub fn all_extractors() -> Vec<Box<dyn SourceExtractor>> {
    vec![
        Box::new(ufcstats::UfcStatsExtractor),
        Box::new(ufc::UfcComExtractor),
        Box::new(espn::EspnExtractor),
        Box::new(tapology::TapologyExtractor),
        Box::new(wikipedia::WikipediaExtractor),
        Box::new(sherdog::SherdogExtractor),
    ]
}

/// Flattened, whitespace-collapsed text of an element.
pub(crate) fn element_text(el: &ElementRef) -> String {
    let joined: String = el.text().collect::<Vec<_>>().join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Prose fallback
// ---------------------------------------------------------------------------

/// Page-chrome phrases that regex pair extraction keeps mistaking for
/// fighter names. Compared whole-word against the lowercased candidate, so
/// both singular and plural chrome forms are listed.
const FALSE_POSITIVE_PHRASES: &[&str] = &[
    "main card",
    "main event",
    "prelim",
    "prelims",
    "fight night",
    "fight card",
    "full card",
    "coverage",
    "espn",
    "ufc",
    "tapology",
    "sherdog",
    "wikipedia",
    "watch",
    "stream",
    "live",
    "odds",
    "result",
    "results",
    "ticket",
    "tickets",
    "highlight",
    "highlights",
    "ranking",
    "schedule",
    "rankings",
    "how to",
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Section-header words the capitalized-pair regex tends to swallow into
/// the left-hand name ("Main Card Jon Jones vs ...").
const CHROME_WORDS: &[&str] = &[
    "main", "card", "event", "night", "fight", "bout", "prelims", "prelim", "early", "the",
];

/// Strip leading section-header words from a captured name.
fn trim_chrome_words(name: &str) -> String {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    let mut i = 0;
    while i < tokens.len() && CHROME_WORDS.contains(&tokens[i].to_lowercase().as_str()) {
        i += 1;
    }
    tokens[i..].join(" ")
}

/// Candidate filter applied to every regex-extracted name.
pub fn is_plausible_fighter_name(name: &str) -> bool {
    static YEAR: OnceLock<Regex> = OnceLock::new();
    let year = YEAR.get_or_init(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());

    let trimmed = name.trim();
    if trimmed.len() < 3 || trimmed.len() > 40 {
        return false;
    }
    if !trimmed.chars().any(|c| c.is_alphabetic()) {
        return false;
    }
    if year.is_match(trimmed) {
        return false;
    }
    // Whole-word comparison: "Charles Oliveira" must not trip on "live",
    // "Maycee Barber" must not trip on "may".
    let padded = format!(" {} ", trimmed.to_lowercase());
    !FALSE_POSITIVE_PHRASES
        .iter()
        .any(|p| padded.contains(&format!(" {} ", p)))
}

/// A fighter pair pulled out of prose, with the byte offset of the match so
/// callers can scan the surrounding window.
#[derive(Clone, Debug)]
pub struct ProsePair {
    pub fighter1: String,
    pub fighter2: String,
    pub offset: usize,
}

fn strict_pair_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"([A-Z][a-z'\-]+(?:\s+[A-Z][A-Za-z'\-]+){1,2})\s+vs\.?\s+([A-Z][a-z'\-]+(?:\s+[A-Z][A-Za-z'\-]+){1,2})",
        )
        .unwrap()
    })
}

fn record_pair_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"([A-Z][A-Za-z'\-]+(?:\s+[A-Z][A-Za-z'\-]+){0,2})\s*\(\d+-\d+(?:-\d+)?\)\s+vs\.?\s+([A-Z][A-Za-z'\-]+(?:\s+[A-Z][A-Za-z'\-]+){0,2})\s*\(\d+-\d+(?:-\d+)?\)",
        )
        .unwrap()
    })
}

fn loose_pair_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)([a-z][a-z .'\-]{2,40}?)\s+vs\.?\s+([a-z][a-z .'\-]{2,40})").unwrap()
    })
}

/// Pull fighter pairs out of unstructured text. Three families of
/// increasing leniency (strict capitalized pair, pair with record
/// parentheticals, loose tokens); the first family that yields at least
/// one accepted pair wins, mirroring the selector-cascade behavior.
pub fn extract_prose_pairs(text: &str) -> Vec<ProsePair> {
    for re in [strict_pair_re(), record_pair_re(), loose_pair_re()] {
        let mut pairs = Vec::new();
        for caps in re.captures_iter(text) {
            let (m1, m2) = match (caps.get(1), caps.get(2)) {
                (Some(m1), Some(m2)) => (m1, m2),
                _ => continue,
            };
            let f1 = trim_chrome_words(m1.as_str());
            let f2 = trim_chrome_words(m2.as_str());
            if is_plausible_fighter_name(&f1) && is_plausible_fighter_name(&f2) {
                // Offset of the name itself, past any trimmed header words,
                // so section markers stay in the "before" window.
                let offset = m1.start() + m1.as_str().len().saturating_sub(f1.len());
                pairs.push(ProsePair { fighter1: f1, fighter2: f2, offset });
            }
        }
        if !pairs.is_empty() {
            return pairs;
        }
    }
    Vec::new()
}

/// Weight class inferred from the text window around a match offset.
pub fn weight_class_near(text: &str, offset: usize, window: usize) -> WeightClass {
    let mut start = offset.saturating_sub(window);
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = usize::min(offset + window, text.len());
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }
    WeightClass::infer(&text[start..end])
}

/// Card position from the nearest section header before the match: the last
/// "Main Card" / "Prelims" / "Early Prelims" marker wins.
pub fn card_position_before(text: &str, offset: usize) -> Option<CardPosition> {
    let mut end = usize::min(offset, text.len());
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    let before = text[..end].to_lowercase();
    let main_idx = before.rfind("main card");
    let prelim_idx = before.rfind("prelim");
    let early_idx = before.rfind("early prelim");

    let prelim_pos = match (prelim_idx, early_idx) {
        // The trailing "prelim" find is part of the "early prelim" marker.
        (Some(p), Some(e)) if p == e + 6 => Some((e, CardPosition::EarlyPreliminary)),
        (Some(p), _) => Some((p, CardPosition::Preliminary)),
        (None, Some(e)) => Some((e, CardPosition::EarlyPreliminary)),
        (None, None) => None,
    };
    match (main_idx, prelim_pos) {
        (Some(m), Some((p, pos))) => Some(if m > p { CardPosition::Main } else { pos }),
        (Some(_), None) => Some(CardPosition::Main),
        (None, Some((_, pos))) => Some(pos),
        (None, None) => None,
    }
}

/// Full prose fallback: pairs plus per-pair weight class and card-section
/// inference. Used by sources whose cards are not reliably tabular.
pub fn fights_from_prose(text: &str) -> Vec<RawFight> {
    extract_prose_pairs(text)
        .into_iter()
        .map(|pair| RawFight {
            weight_class: weight_class_near(text, pair.offset, WEIGHT_CLASS_WINDOW),
            card_position: card_position_before(text, pair.offset),
            fighter1: pair.fighter1,
            fighter2: pair.fighter2,
            completed: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plausible_name_filter_rejects_page_chrome() {
        assert!(is_plausible_fighter_name("Jon Jones"));
        assert!(is_plausible_fighter_name("Sean O'Malley"));
        assert!(!is_plausible_fighter_name("Main Card"));
        assert!(!is_plausible_fighter_name("ESPN"));
        assert!(!is_plausible_fighter_name("Fight Night Coverage"));
        assert!(!is_plausible_fighter_name("November 2026"));
        assert!(!is_plausible_fighter_name("ab"));
    }

    #[test]
    fn chrome_words_inside_real_names_are_not_rejected() {
        // "live" in Oliveira, "may" in Maycee, "card"/"ufc" as substrings.
        assert!(is_plausible_fighter_name("Charles Oliveira"));
        assert!(is_plausible_fighter_name("Maycee Barber"));
        assert!(is_plausible_fighter_name("Ricardo Ramos"));
        assert!(!is_plausible_fighter_name("Prelims"));
    }

    #[test]
    fn real_names_with_chrome_substrings_survive_prose_extraction() {
        let fights = fights_from_prose("Lightweight bout: Charles Oliveira vs Justin Gaethje");
        assert_eq!(fights.len(), 1);
        assert_eq!(fights[0].fighter1, "Charles Oliveira");
        assert_eq!(fights[0].weight_class, WeightClass::Lightweight);
    }

    #[test]
    fn strict_family_wins_over_loose_noise() {
        let text = "Main Card Jon Jones vs Tom Aspinall. Fight Night Coverage vs ESPN.";
        let fights = fights_from_prose(text);
        assert_eq!(fights.len(), 1);
        assert_eq!(fights[0].fighter1, "Jon Jones");
        assert_eq!(fights[0].fighter2, "Tom Aspinall");
        assert_eq!(fights[0].card_position, Some(CardPosition::Main));
    }

    #[test]
    fn decoy_only_text_yields_nothing() {
        let fights = fights_from_prose("Fight Night Coverage vs ESPN");
        assert!(fights.is_empty());
    }

    #[test]
    fn strict_family_is_tried_before_the_record_family() {
        let text = "Jon Jones vs Tom Aspinall, then Alex Pereira (12-3) vs. Magomed Ankalaev (20-1-1)";
        let pairs = extract_prose_pairs(text);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].fighter1, "Jon Jones");
        assert_eq!(pairs[0].fighter2, "Tom Aspinall");
    }

    #[test]
    fn record_family_strips_parenthetical_records() {
        let text = "Alex Pereira (12-3) vs. Magomed Ankalaev (20-1-1) headline the card";
        let pairs = extract_prose_pairs(text);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].fighter1, "Alex Pereira");
        assert_eq!(pairs[0].fighter2, "Magomed Ankalaev");
    }

    #[test]
    fn weight_class_window_picks_up_nearby_division() {
        let text = "Light Heavyweight bout: Alex Pereira vs Jamahal Hill";
        let fights = fights_from_prose(text);
        assert_eq!(fights.len(), 1);
        assert_eq!(fights[0].weight_class, WeightClass::LightHeavyweight);
    }

    #[test]
    fn card_section_markers_resolve_in_order() {
        let text = "Main Card\nA vs B\nPrelims\nC vs D\nEarly Prelims\nE vs F";
        assert_eq!(card_position_before(text, text.find("A vs").unwrap()), Some(CardPosition::Main));
        assert_eq!(
            card_position_before(text, text.find("C vs").unwrap()),
            Some(CardPosition::Preliminary)
        );
        assert_eq!(
            card_position_before(text, text.find("E vs").unwrap()),
            Some(CardPosition::EarlyPreliminary)
        );
        assert_eq!(card_position_before("no markers here", 5), None);
    }
}
