//! Event reconciliation: merge events seen by different sources (or on
//! different polling cycles) into one canonical record per real fight night.
//!
//! Identity is decided by a staged comparison, first stage to confirm wins:
//! 1. exact display-name equality
//! 2. normalized-name equality (promotion prefix and "Fight Night" stripped)
//! 3. date proximity (<= 7 days) AND equal promotion sequence number
//! 4. fight-card fighter overlap >= 2 (main-event overlap is a strong
//!    identity signal even when titles and dates drift)
//!
//! Stage 4 can false-merge a renumbered card (co-main promoted to main
//! between polls); that precision/recall trade-off is accepted.

use crate::types::Event;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

/// Maximum date drift for the promotion-number stage.
const DATE_PROXIMITY_DAYS: i64 = 7;

/// Minimum shared fighters for the overlap stage.
const FIGHTER_OVERLAP_MIN: usize = 2;

/// Result of reconciling a batch of incoming events against the known set.
#[derive(Clone, Debug, Default)]
pub struct ReconcileOutcome {
    /// Incoming events with no existing counterpart.
    pub new: Vec<Event>,
    /// Existing events refreshed with data from an incoming record.
    pub updated: Vec<Event>,
    /// Existing events matched by an incoming record that added nothing.
    pub unchanged: Vec<Event>,
}

/// Strip the promotion prefix and "Fight Night" marker, drop punctuation,
/// collapse whitespace.
pub fn normalize_event_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut cleaned = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        if c.is_alphanumeric() {
            cleaned.push(c);
        } else {
            cleaned.push(' ');
        }
    }
    let without_markers = cleaned.replace("fight night", " ");
    let mut tokens: Vec<&str> = without_markers.split_whitespace().collect();
    while matches!(tokens.first(), Some(&"ufc") | Some(&"pfl") | Some(&"bellator")) {
        tokens.remove(0);
    }
    tokens.join(" ")
}

/// Promotion sequence number, e.g. "UFC 312: Whittaker vs Chimaev" -> 312.
pub fn promotion_number(name: &str) -> Option<u32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:ufc|pfl|bellator)\s*#?\s*(\d{1,4})\b").unwrap()
    });
    re.captures(name)?.get(1)?.as_str().parse().ok()
}

fn fighter_set(event: &Event) -> HashSet<&str> {
    event
        .fights
        .iter()
        .flat_map(|f| [f.fighter1_id.as_str(), f.fighter2_id.as_str()])
        .collect()
}

/// Staged identity comparison described in the module docs.
pub fn same_event(a: &Event, b: &Event) -> bool {
    if a.name == b.name {
        return true;
    }
    if normalize_event_name(&a.name) == normalize_event_name(&b.name) {
        return true;
    }
    if let (Some(na), Some(nb)) = (promotion_number(&a.name), promotion_number(&b.name)) {
        let drift = (a.date - b.date).num_days().abs();
        if na == nb && drift <= DATE_PROXIMITY_DAYS {
            return true;
        }
    }
    let overlap = fighter_set(a).intersection(&fighter_set(b)).count();
    overlap >= FIGHTER_OVERLAP_MIN
}

/// Merge `incoming` into a copy of `existing`: backfill venue and location,
/// adopt the incoming fight card when the existing record has none. Returns
/// `None` when nothing changed.
fn merge_into(existing: &Event, incoming: &Event) -> Option<Event> {
    let mut merged = existing.clone();
    if merged.location.is_none() && incoming.location.is_some() {
        merged.location = incoming.location.clone();
    }
    if merged.venue.is_none() && incoming.venue.is_some() {
        merged.venue = incoming.venue.clone();
    }
    if merged.fights.is_empty() && !incoming.fights.is_empty() {
        merged.fights = incoming
            .fights
            .iter()
            .cloned()
            .map(|mut f| {
                f.event_id = merged.id.clone();
                f
            })
            .collect();
    }
    if merged == *existing {
        None
    } else {
        Some(merged)
    }
}

/// Reconcile a cycle's incoming events against the known set. Idempotent:
/// feeding an already-merged pair back in lands it in `unchanged`.
pub fn reconcile(existing: &[Event], incoming: &[Event]) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();
    for inc in incoming {
        match existing.iter().find(|ex| same_event(ex, inc)) {
            None => outcome.new.push(inc.clone()),
            Some(ex) => match merge_into(ex, inc) {
                Some(merged) => {
                    debug!(event = %ex.name, "event backfilled from incoming record");
                    outcome.updated.push(merged);
                }
                None => outcome.unchanged.push(ex.clone()),
            },
        }
    }
    outcome
}
