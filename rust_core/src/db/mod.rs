//! Persistence sink interface.
//!
//! The pipeline never assumes a storage engine: it requires upsert-by-id
//! idempotence and basic filtered reads for reconciliation lookups, nothing
//! more. `PgSink` is the production implementation; `MemorySink` backs tests
//! and sink-less dev runs. Only the orchestrator's persisting state writes
//! here.

pub mod postgres;
pub mod retry;

use crate::types::{Event, Fight, Fighter};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

pub use postgres::PgSink;

#[derive(Clone, Debug, Default)]
pub struct EventFilter {
    pub include_cancelled: bool,
    /// Only events dated on or after this instant.
    pub after: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default)]
pub struct FighterFilter {
    pub name_contains: Option<String>,
}

#[async_trait]
pub trait PersistenceSink: Send + Sync {
    async fn upsert_fighter(&self, fighter: &Fighter) -> Result<()>;
    async fn upsert_event(&self, event: &Event) -> Result<()>;
    async fn upsert_fight(&self, fight: &Fight) -> Result<()>;
    async fn find_events(&self, filter: &EventFilter) -> Result<Vec<Event>>;
    async fn find_fighters(&self, filter: &FighterFilter) -> Result<Vec<Fighter>>;
}

/// In-memory sink with the same merge semantics as the Postgres one.
#[derive(Debug, Default)]
pub struct MemorySink {
    fighters: RwLock<HashMap<String, Fighter>>,
    events: RwLock<HashMap<String, Event>>,
    fights: RwLock<HashMap<String, Fight>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistenceSink for MemorySink {
    async fn upsert_fighter(&self, fighter: &Fighter) -> Result<()> {
        let mut fighters = self.fighters.write().await;
        match fighters.get_mut(&fighter.id) {
            Some(existing) => existing.apply(fighter),
            None => {
                fighters.insert(fighter.id.clone(), fighter.clone());
            }
        }
        Ok(())
    }

    async fn upsert_event(&self, event: &Event) -> Result<()> {
        self.events.write().await.insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn upsert_fight(&self, fight: &Fight) -> Result<()> {
        self.fights.write().await.insert(fight.id.clone(), fight.clone());
        Ok(())
    }

    async fn find_events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let events = self.events.read().await;
        let mut found: Vec<Event> = events
            .values()
            .filter(|e| filter.include_cancelled || !e.cancelled)
            .filter(|e| filter.after.map_or(true, |after| e.date >= after))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(found)
    }

    async fn find_fighters(&self, filter: &FighterFilter) -> Result<Vec<Fighter>> {
        let fighters = self.fighters.read().await;
        let needle = filter.name_contains.as_ref().map(|n| n.to_lowercase());
        let mut found: Vec<Fighter> = fighters
            .values()
            .filter(|f| {
                needle
                    .as_ref()
                    .map_or(true, |n| f.name.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }
}
