//! The scraping cycle, as an explicit state machine.
//!
//! One `run_cycle` call walks Idle -> FetchingEvents -> ExtractingFightCards
//! -> MatchingFighters -> EnrichingFighters -> Reconciling -> StrikeChecking
//! -> Persisting -> Idle. Sources are tried in priority order and the first one yielding a
//! plausible event list wins the whole cycle; events are never fabricated,
//! so a cycle where every source fails produces a zero summary. Fighters
//! are different: a fighter no source covers gets a deterministic
//! synthesized profile rather than a hole in the card.

use crate::config::Config;
use anyhow::Result;
use cagefeed_core::db::{EventFilter, PersistenceSink};
use cagefeed_core::extract::{all_extractors, SourceExtractor};
use cagefeed_core::fetch::{FetchOptions, FetchSession};
use cagefeed_core::ledger::{LedgerFile, LedgerStore, StrikeLedger};
use cagefeed_core::matching::find_best_match;
use cagefeed_core::reconcile::{reconcile, same_event};
use cagefeed_core::synth::synthesize;
use cagefeed_core::{
    assign_card_positions, event_id, fighter_id, parse_event_date, scheduled_rounds,
    venue_from_location, CardPosition, CycleSummary, Event, Fight, FightStatus, Fighter, RawEvent,
    RawFight, ScrapeError,
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Unlabeled cards split 2 main / 4 prelim / rest early by discovery order.
const DEFAULT_MAIN_CARD_FIGHTS: usize = 2;
const DEFAULT_PRELIM_FIGHTS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    FetchingEvents,
    ExtractingFightCards,
    MatchingFighters,
    EnrichingFighters,
    Reconciling,
    StrikeChecking,
    Persisting,
}

impl CycleState {
    fn as_str(&self) -> &'static str {
        match self {
            CycleState::Idle => "idle",
            CycleState::FetchingEvents => "fetching_events",
            CycleState::ExtractingFightCards => "extracting_fight_cards",
            CycleState::MatchingFighters => "matching_fighters",
            CycleState::EnrichingFighters => "enriching_fighters",
            CycleState::Reconciling => "reconciling",
            CycleState::StrikeChecking => "strike_checking",
            CycleState::Persisting => "persisting",
        }
    }
}

pub struct Pipeline {
    config: Config,
    session: FetchSession,
    extractors: Vec<Box<dyn SourceExtractor>>,
    sink: Arc<dyn PersistenceSink>,
    ledger_store: LedgerStore,
    state: CycleState,
}

impl Pipeline {
    pub fn new(config: Config, sink: Arc<dyn PersistenceSink>) -> Self {
        let session = FetchSession::new(config.fast_mode);
        let ledger_store = LedgerStore::new(&config.ledger_path);
        Self {
            config,
            session,
            extractors: all_extractors(),
            sink,
            ledger_store,
            state: CycleState::Idle,
        }
    }

    fn enter(&mut self, next: CycleState) {
        info!(from = self.state.as_str(), to = next.as_str(), "cycle state");
        self.state = next;
    }

    fn fetch_options(&self, referer: Option<&str>) -> FetchOptions {
        FetchOptions {
            referer: referer.map(str::to_string),
            timeout: Duration::from_secs(self.config.source_timeout_secs),
        }
    }

    /// Run one full scraping cycle against the configured sink.
    pub async fn run_cycle(&mut self) -> Result<CycleSummary> {
        let now = Utc::now();
        let mut summary = CycleSummary::default();

        let ledger_file = self.ledger_store.load()?;
        let mut event_ledger =
            StrikeLedger::with_counts(self.config.event_strike_threshold, ledger_file.events);
        let mut fight_ledger =
            StrikeLedger::with_counts(self.config.fight_strike_threshold, ledger_file.fights);

        // One source wins the cycle; the rest are failover.
        self.enter(CycleState::FetchingEvents);
        let chosen = self.fetch_event_listing(&mut summary).await;
        let (source_idx, raw_events) = match chosen {
            Some(found) => found,
            None => {
                let err = ScrapeError::AllSourcesExhausted { what: "events" };
                warn!("{}", err);
                summary.errors.push(err.to_string());
                self.enter(CycleState::Idle);
                return Ok(summary);
            }
        };

        self.enter(CycleState::ExtractingFightCards);
        let mut incoming: Vec<Event> = Vec::new();
        let mut name_pairs: Vec<(String, String)> = Vec::new();
        for raw in raw_events.into_iter().take(self.config.fetch_limit) {
            let card = match self.fetch_fight_card(source_idx, &raw).await {
                Ok(card) => card,
                Err(e) => {
                    summary.errors.push(format!("{}: {}", raw.name, e));
                    continue;
                }
            };
            if card.is_empty() {
                // Zero-fight events are dropped, never fabricated around.
                debug!(event = %raw.name, "no fights extracted, dropping event");
                continue;
            }
            let (event, names) = assemble_event(&raw, card, now);
            name_pairs.extend(names);
            incoming.push(event);
        }
        summary.events_processed = incoming.len();

        // Card names collapse onto shared normalized-name ids: the same
        // fighter spotted on several cards is enriched once.
        self.enter(CycleState::MatchingFighters);
        let mut fighter_names: HashMap<String, String> = HashMap::new();
        for (id, name) in name_pairs {
            fighter_names.entry(id).or_insert(name);
        }

        self.enter(CycleState::EnrichingFighters);
        let fighters = self.enrich_fighters(&fighter_names, now, &mut summary).await;

        self.enter(CycleState::Reconciling);
        let existing = self
            .sink
            .find_events(&EventFilter { include_cancelled: true, after: None })
            .await?;
        let outcome = reconcile(&existing, &incoming);
        summary.new_events = outcome.new.len();
        summary.updated_events = outcome.updated.len();

        self.enter(CycleState::StrikeChecking);
        let matched: HashSet<String> = outcome
            .updated
            .iter()
            .chain(outcome.unchanged.iter())
            .map(|e| e.id.clone())
            .collect();
        let cancelled_events =
            apply_event_strikes(&existing, &matched, now, &mut event_ledger, &mut summary);
        let cancelled_fights =
            apply_fight_strikes(&existing, &incoming, &mut fight_ledger, &mut summary);

        self.enter(CycleState::Persisting);
        let mut ops = 0usize;
        for fighter in fighters.values() {
            self.sink.upsert_fighter(fighter).await?;
            self.batch_pause(&mut ops).await;
        }
        let events_to_persist: Vec<&Event> = outcome
            .new
            .iter()
            .chain(outcome.updated.iter())
            .chain(cancelled_events.iter())
            .collect();
        for event in &events_to_persist {
            self.sink.upsert_event(event).await?;
            self.batch_pause(&mut ops).await;
        }
        for event in &events_to_persist {
            for fight in &event.fights {
                self.sink.upsert_fight(fight).await?;
                self.batch_pause(&mut ops).await;
            }
        }
        for fight in &cancelled_fights {
            self.sink.upsert_fight(fight).await?;
            self.batch_pause(&mut ops).await;
        }

        self.ledger_store.save(&LedgerFile {
            events: event_ledger.counts().clone(),
            fights: fight_ledger.counts().clone(),
        })?;

        self.enter(CycleState::Idle);
        info!(
            events = summary.events_processed,
            new = summary.new_events,
            updated = summary.updated_events,
            enriched = summary.fighters_enriched,
            synthesized = summary.fighters_synthesized,
            "cycle complete"
        );
        Ok(summary)
    }

    /// First enabled source whose listing page yields at least one event.
    async fn fetch_event_listing(
        &mut self,
        summary: &mut CycleSummary,
    ) -> Option<(usize, Vec<RawEvent>)> {
        for idx in 0..self.extractors.len() {
            let source = self.extractors[idx].source();
            if !self.config.source_enabled(source) {
                continue;
            }
            let url = self.extractors[idx].events_url();
            let opts = self.fetch_options(None);
            match self.session.fetch(url, &opts).await {
                Ok(resp) => {
                    let events = self.extractors[idx].extract_events(&resp.body);
                    if events.is_empty() {
                        let err = ScrapeError::UnexpectedContent {
                            origin: source.as_str(),
                            tried: 1,
                        };
                        warn!(source = source.as_str(), "{}", err);
                        summary.errors.push(err.to_string());
                    } else {
                        info!(source = source.as_str(), count = events.len(), "event listing won");
                        return Some((idx, events));
                    }
                }
                Err(e) => {
                    warn!(source = source.as_str(), "listing fetch failed: {}", e);
                    summary.errors.push(format!("{}: {}", source.as_str(), e));
                }
            }
        }
        None
    }

    async fn fetch_fight_card(
        &mut self,
        source_idx: usize,
        raw: &RawEvent,
    ) -> Result<Vec<RawFight>, ScrapeError> {
        let url = match &raw.url {
            Some(url) => url.clone(),
            None => return Ok(Vec::new()),
        };
        let referer = self.extractors[source_idx].events_url();
        let opts = self.fetch_options(Some(referer));
        let resp = self.session.fetch(&url, &opts).await?;
        Ok(self.extractors[source_idx].extract_fight_card(&resp.body))
    }

    /// Enrich every fighter on the cycle's cards, falling back to synthesis.
    /// Sequential on purpose: the fetch session paces requests per host and
    /// the directory pages are fetched at most once each.
    async fn enrich_fighters(
        &mut self,
        fighter_names: &HashMap<String, String>,
        now: DateTime<Utc>,
        summary: &mut CycleSummary,
    ) -> HashMap<String, Fighter> {
        let mut directories: HashMap<usize, Vec<cagefeed_core::RawFighterRef>> = HashMap::new();
        let mut fighters = HashMap::new();

        let mut ids: Vec<&String> = fighter_names.keys().collect();
        ids.sort();
        for id in ids {
            let name = &fighter_names[id];
            match self.enrich_one(name, now, &mut directories).await {
                Some(mut fighter) => {
                    // Keep the card-derived id so fight references stay valid
                    // even when the source spells the name differently.
                    fighter.id = id.clone();
                    summary.fighters_enriched += 1;
                    fighters.insert(id.clone(), fighter);
                }
                None => {
                    let mut fighter = synthesize(name);
                    fighter.id = id.clone();
                    debug!(fighter = %name, "no source profile, synthesizing");
                    summary.fighters_synthesized += 1;
                    fighters.insert(id.clone(), fighter);
                }
            }
        }
        fighters
    }

    async fn enrich_one(
        &mut self,
        name: &str,
        now: DateTime<Utc>,
        directories: &mut HashMap<usize, Vec<cagefeed_core::RawFighterRef>>,
    ) -> Option<Fighter> {
        for idx in 0..self.extractors.len() {
            let source = self.extractors[idx].source();
            if !self.config.source_enabled(source) {
                continue;
            }
            let dir_url = match self.extractors[idx].directory_url() {
                Some(url) => url,
                None => continue,
            };
            if !directories.contains_key(&idx) {
                let opts = self.fetch_options(None);
                let refs = match self.session.fetch(dir_url, &opts).await {
                    Ok(resp) => self.extractors[idx].extract_fighter_directory(&resp.body),
                    Err(e) => {
                        warn!(source = source.as_str(), "directory fetch failed: {}", e);
                        Vec::new()
                    }
                };
                directories.insert(idx, refs);
            }
            let refs = &directories[&idx];
            let candidates: Vec<String> = refs.iter().map(|r| r.name.clone()).collect();
            let matched = match find_best_match(name, &candidates) {
                Some(m) => m.to_string(),
                None => continue,
            };
            let profile_url = refs
                .iter()
                .find(|r| r.name == matched)
                .and_then(|r| r.url.clone());
            let profile_url = match profile_url {
                Some(url) => url,
                None => continue,
            };
            let opts = self.fetch_options(Some(dir_url));
            let resp = match self.session.fetch(&profile_url, &opts).await {
                Ok(resp) => resp,
                Err(e) => {
                    debug!(fighter = name, "profile fetch failed: {}", e);
                    continue;
                }
            };
            if let Some(profile) = self.extractors[idx].extract_fighter_profile(&resp.body) {
                debug!(fighter = name, source = source.as_str(), "profile enriched");
                return Some(Fighter::from_profile(&profile, now));
            }
        }
        None
    }

    async fn batch_pause(&self, ops: &mut usize) {
        *ops += 1;
        if *ops % self.config.batch_size == 0 && !self.config.fast_mode {
            tokio::time::sleep(Duration::from_millis(self.config.batch_delay_ms)).await;
        }
    }
}

/// Turn one raw event and its card into a canonical `Event`, returning the
/// (id, display name) pairs of every fighter on the card for enrichment.
pub fn assemble_event(
    raw: &RawEvent,
    mut card: Vec<RawFight>,
    now: DateTime<Utc>,
) -> (Event, Vec<(String, String)>) {
    let id = event_id(&raw.name);
    let date = parse_event_date(raw.date_text.as_deref().unwrap_or(""), now);
    assign_card_positions(&mut card, DEFAULT_MAIN_CARD_FIGHTS, DEFAULT_PRELIM_FIGHTS);

    let mut fights = Vec::with_capacity(card.len());
    let mut names = Vec::new();
    let mut seen = HashSet::new();
    for (idx, rf) in card.iter().enumerate() {
        let f1 = fighter_id(&rf.fighter1);
        let f2 = fighter_id(&rf.fighter2);
        if f1 == f2 || f1.is_empty() || f2.is_empty() {
            continue;
        }
        let fight_id = Fight::fight_id(&id, &f1, &f2);
        if !seen.insert(fight_id.clone()) {
            continue;
        }
        names.push((f1.clone(), rf.fighter1.clone()));
        names.push((f2.clone(), rf.fighter2.clone()));
        fights.push(Fight {
            id: fight_id,
            event_id: id.clone(),
            fighter1_id: f1,
            fighter2_id: f2,
            weight_class: rf.weight_class,
            scheduled_rounds: scheduled_rounds(false, idx == 0, date),
            card_position: rf.card_position.unwrap_or(CardPosition::Preliminary),
            status: if rf.completed {
                FightStatus::Completed
            } else {
                FightStatus::Scheduled
            },
        });
    }

    let event = Event {
        id,
        name: raw.name.clone(),
        date,
        location: raw.location.clone(),
        venue: raw.location.as_deref().and_then(venue_from_location),
        fights,
        cancelled: false,
    };
    (event, names)
}

/// Strike upcoming events that the winning source stopped listing. An event
/// that reappears resets its count; one that hits the threshold is marked
/// cancelled (along with its card) and removed from the ledger.
pub fn apply_event_strikes(
    existing: &[Event],
    matched: &HashSet<String>,
    now: DateTime<Utc>,
    ledger: &mut StrikeLedger,
    summary: &mut CycleSummary,
) -> Vec<Event> {
    let mut cancelled = Vec::new();
    for event in existing {
        if event.cancelled || event.date < now {
            continue;
        }
        if matched.contains(&event.id) {
            ledger.record_hit(&event.id);
            continue;
        }
        summary.missing_events += 1;
        let strikes = ledger.record_miss(&event.id);
        debug!(event = %event.name, strikes, "event missing from listing");
        if ledger.should_cancel(&event.id) {
            info!(event = %event.name, "strike threshold reached, cancelling event");
            ledger.clear(&event.id);
            let mut gone = event.clone();
            gone.cancelled = true;
            for fight in &mut gone.fights {
                fight.status = FightStatus::Cancelled;
            }
            summary.cancelled_events += 1;
            cancelled.push(gone);
        }
    }
    cancelled
}

/// Strike scheduled fights that dropped off a still-listed card.
pub fn apply_fight_strikes(
    existing: &[Event],
    incoming: &[Event],
    ledger: &mut StrikeLedger,
    summary: &mut CycleSummary,
) -> Vec<Fight> {
    let mut cancelled = Vec::new();
    for ex in existing {
        if ex.cancelled {
            continue;
        }
        let inc = match incoming.iter().find(|i| same_event(ex, i)) {
            Some(inc) if !inc.fights.is_empty() => inc,
            _ => continue,
        };
        for fight in &ex.fights {
            if fight.status != FightStatus::Scheduled {
                continue;
            }
            let still_listed = inc.fights.iter().any(|f| {
                (f.fighter1_id == fight.fighter1_id && f.fighter2_id == fight.fighter2_id)
                    || (f.fighter1_id == fight.fighter2_id && f.fighter2_id == fight.fighter1_id)
            });
            if still_listed {
                ledger.record_hit(&fight.id);
                continue;
            }
            let strikes = ledger.record_miss(&fight.id);
            debug!(fight = %fight.id, strikes, "fight missing from card");
            if ledger.should_cancel(&fight.id) {
                ledger.clear(&fight.id);
                let mut gone = fight.clone();
                gone.status = FightStatus::Cancelled;
                summary.cancelled_fights += 1;
                cancelled.push(gone);
            }
        }
    }
    cancelled
}

#[cfg(test)]
mod tests {
    use super::*;
    use cagefeed_core::ledger::{DEFAULT_EVENT_THRESHOLD, DEFAULT_FIGHT_THRESHOLD};
    use cagefeed_core::{Source, WeightClass};
    use chrono::Duration as ChronoDuration;

    fn raw_event(name: &str) -> RawEvent {
        RawEvent {
            name: name.to_string(),
            date_text: Some("February 8, 2030".to_string()),
            location: Some("Qudos Bank Arena, Sydney, Australia".to_string()),
            url: Some("https://example.com/event".to_string()),
            source: Source::UfcStats,
        }
    }

    fn raw_fight(a: &str, b: &str) -> RawFight {
        RawFight {
            fighter1: a.to_string(),
            fighter2: b.to_string(),
            weight_class: WeightClass::Unknown,
            card_position: None,
            completed: false,
        }
    }

    #[test]
    fn cycle_states_cover_the_documented_walk() {
        let walk = [
            CycleState::Idle,
            CycleState::FetchingEvents,
            CycleState::ExtractingFightCards,
            CycleState::MatchingFighters,
            CycleState::EnrichingFighters,
            CycleState::Reconciling,
            CycleState::StrikeChecking,
            CycleState::Persisting,
        ];
        let labels: Vec<&str> = walk.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "idle",
                "fetching_events",
                "extracting_fight_cards",
                "matching_fighters",
                "enriching_fighters",
                "reconciling",
                "strike_checking",
                "persisting",
            ]
        );
    }

    #[test]
    fn assembled_card_partitions_cover_every_fight() {
        let card = vec![
            raw_fight("A One", "B Two"),
            raw_fight("C Three", "D Four"),
            raw_fight("E Five", "F Six"),
            raw_fight("G Seven", "H Eight"),
            raw_fight("I Nine", "J Ten"),
            raw_fight("K Eleven", "L Twelve"),
            raw_fight("M Thirteen", "N Fourteen"),
        ];
        let (event, names) = assemble_event(&raw_event("UFC 312"), card, Utc::now());
        assert_eq!(event.fights.len(), 7);
        assert_eq!(names.len(), 14);
        assert_eq!(event.main_card().len(), 2);
        assert_eq!(event.prelims().len(), 4);
        assert_eq!(event.early_prelims().len(), 1);
        assert_eq!(
            event.main_card().len() + event.prelims().len() + event.early_prelims().len(),
            event.fights.len()
        );
    }

    #[test]
    fn main_event_gets_five_rounds_rest_get_three() {
        let card = vec![raw_fight("A One", "B Two"), raw_fight("C Three", "D Four")];
        let (event, _) = assemble_event(&raw_event("UFC 312"), card, Utc::now());
        assert_eq!(event.fights[0].scheduled_rounds, 5);
        assert_eq!(event.fights[1].scheduled_rounds, 3);
    }

    #[test]
    fn venue_is_first_location_component() {
        let (event, _) = assemble_event(
            &raw_event("UFC 312"),
            vec![raw_fight("A One", "B Two")],
            Utc::now(),
        );
        assert_eq!(event.venue.as_deref(), Some("Qudos Bank Arena"));
        assert_eq!(event.id, "ufc-312");
    }

    #[test]
    fn self_fight_and_duplicate_rows_are_dropped() {
        let card = vec![
            raw_fight("Jon Jones", "Jon Jones"),
            raw_fight("A One", "B Two"),
            raw_fight("A One", "B Two"),
        ];
        let (event, _) = assemble_event(&raw_event("UFC 312"), card, Utc::now());
        assert_eq!(event.fights.len(), 1);
    }

    #[test]
    fn labeled_positions_survive_assembly() {
        let mut card = vec![raw_fight("A One", "B Two"), raw_fight("C Three", "D Four")];
        card[1].card_position = Some(CardPosition::EarlyPreliminary);
        let (event, _) = assemble_event(&raw_event("UFC 312"), card, Utc::now());
        assert_eq!(event.fights[1].card_position, CardPosition::EarlyPreliminary);
    }

    fn upcoming_event(name: &str) -> Event {
        let (event, _) = assemble_event(
            &raw_event(name),
            vec![raw_fight("A One", "B Two"), raw_fight("C Three", "D Four")],
            Utc::now(),
        );
        event
    }

    #[test]
    fn event_cancelled_after_three_consecutive_misses() {
        let existing = vec![upcoming_event("UFC 312")];
        let matched = HashSet::new();
        let mut ledger = StrikeLedger::new(DEFAULT_EVENT_THRESHOLD);
        let mut summary = CycleSummary::default();

        for _ in 0..2 {
            let cancelled =
                apply_event_strikes(&existing, &matched, Utc::now(), &mut ledger, &mut summary);
            assert!(cancelled.is_empty());
        }
        let cancelled =
            apply_event_strikes(&existing, &matched, Utc::now(), &mut ledger, &mut summary);
        assert_eq!(cancelled.len(), 1);
        assert!(cancelled[0].cancelled);
        assert!(cancelled[0]
            .fights
            .iter()
            .all(|f| f.status == FightStatus::Cancelled));
        assert_eq!(summary.cancelled_events, 1);
        // Ledger entry removed once the cancellation is applied.
        assert!(!ledger.counts().contains_key(&existing[0].id));
    }

    #[test]
    fn reappearing_event_resets_its_strikes() {
        let existing = vec![upcoming_event("UFC 312")];
        let mut ledger = StrikeLedger::new(DEFAULT_EVENT_THRESHOLD);
        let mut summary = CycleSummary::default();

        let empty = HashSet::new();
        apply_event_strikes(&existing, &empty, Utc::now(), &mut ledger, &mut summary);
        apply_event_strikes(&existing, &empty, Utc::now(), &mut ledger, &mut summary);

        let matched: HashSet<String> = [existing[0].id.clone()].into();
        apply_event_strikes(&existing, &matched, Utc::now(), &mut ledger, &mut summary);

        // Two more misses are not enough after the reset.
        apply_event_strikes(&existing, &empty, Utc::now(), &mut ledger, &mut summary);
        let cancelled =
            apply_event_strikes(&existing, &empty, Utc::now(), &mut ledger, &mut summary);
        assert!(cancelled.is_empty());
        assert_eq!(summary.cancelled_events, 0);
    }

    #[test]
    fn past_events_are_never_struck() {
        let mut event = upcoming_event("UFC 100");
        event.date = Utc::now() - ChronoDuration::days(30);
        let mut ledger = StrikeLedger::new(DEFAULT_EVENT_THRESHOLD);
        let mut summary = CycleSummary::default();
        for _ in 0..5 {
            let cancelled = apply_event_strikes(
                std::slice::from_ref(&event),
                &HashSet::new(),
                Utc::now(),
                &mut ledger,
                &mut summary,
            );
            assert!(cancelled.is_empty());
        }
        assert_eq!(summary.missing_events, 0);
    }

    #[test]
    fn dropped_fight_cancelled_after_two_misses() {
        let existing = vec![upcoming_event("UFC 312")];
        // Same event, but the second bout fell off the card.
        let (incoming, _) = assemble_event(
            &raw_event("UFC 312"),
            vec![raw_fight("A One", "B Two")],
            Utc::now(),
        );
        let incoming = vec![incoming];
        let mut ledger = StrikeLedger::new(DEFAULT_FIGHT_THRESHOLD);
        let mut summary = CycleSummary::default();

        let first = apply_fight_strikes(&existing, &incoming, &mut ledger, &mut summary);
        assert!(first.is_empty());
        let second = apply_fight_strikes(&existing, &incoming, &mut ledger, &mut summary);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].status, FightStatus::Cancelled);
        assert_eq!(summary.cancelled_fights, 1);
    }

    #[test]
    fn reversed_corner_order_still_counts_as_listed() {
        let existing = vec![upcoming_event("UFC 312")];
        let (incoming, _) = assemble_event(
            &raw_event("UFC 312"),
            vec![raw_fight("B Two", "A One"), raw_fight("D Four", "C Three")],
            Utc::now(),
        );
        let mut ledger = StrikeLedger::new(DEFAULT_FIGHT_THRESHOLD);
        let mut summary = CycleSummary::default();
        for _ in 0..3 {
            let cancelled =
                apply_fight_strikes(&existing, &[incoming.clone()], &mut ledger, &mut summary);
            assert!(cancelled.is_empty());
        }
        assert_eq!(summary.cancelled_fights, 0);
    }
}
