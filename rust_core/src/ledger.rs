//! Strike ledger: consecutive-miss counters behind cancellation inference.
//!
//! None of the sources announce cancellations; an event simply stops
//! appearing. Each polling cycle records a miss for every known entity it
//! failed to observe, and a hit (reset) for every one it saw. Crossing the
//! threshold means the entity is inferred cancelled. Counters persist in a
//! small JSON file so a restart does not lose cancellation progress.
//!
//! Increments are at-least-once: a duplicated miss on a retried cycle only
//! cancels slightly earlier, which is acceptable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default miss threshold for events.
pub const DEFAULT_EVENT_THRESHOLD: u32 = 3;
/// Default miss threshold for fights.
pub const DEFAULT_FIGHT_THRESHOLD: u32 = 2;

/// One in-memory ledger: entity id -> consecutive miss count.
#[derive(Clone, Debug)]
pub struct StrikeLedger {
    counts: HashMap<String, u32>,
    threshold: u32,
}

impl StrikeLedger {
    pub fn new(threshold: u32) -> Self {
        Self { counts: HashMap::new(), threshold }
    }

    pub fn with_counts(threshold: u32, counts: HashMap<String, u32>) -> Self {
        Self { counts, threshold }
    }

    /// Record that the entity was absent this cycle. Returns the new count.
    pub fn record_miss(&mut self, entity_id: &str) -> u32 {
        let count = self.counts.entry(entity_id.to_string()).or_insert(0);
        *count += 1;
        debug!(entity_id, count = *count, "strike recorded");
        *count
    }

    /// The entity was observed again: its counter resets to zero.
    pub fn record_hit(&mut self, entity_id: &str) {
        if self.counts.remove(entity_id).is_some() {
            debug!(entity_id, "strike counter reset");
        }
    }

    pub fn should_cancel(&self, entity_id: &str) -> bool {
        self.counts.get(entity_id).copied().unwrap_or(0) >= self.threshold
    }

    /// Remove the entry once the cancellation has been applied, so a
    /// re-appearance later starts counting from zero.
    pub fn clear(&mut self, entity_id: &str) {
        self.counts.remove(entity_id);
    }

    pub fn counts(&self) -> &HashMap<String, u32> {
        &self.counts
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

/// On-disk shape: one file carrying both ledgers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LedgerFile {
    #[serde(default)]
    pub events: HashMap<String, u32>,
    #[serde(default)]
    pub fights: HashMap<String, u32>,
}

/// File-backed store for the two ledgers. Reads at cycle start, writes at
/// cycle end; a missing or empty file means all-zero counts.
#[derive(Clone, Debug)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<LedgerFile> {
        match std::fs::read_to_string(&self.path) {
            Ok(body) if body.trim().is_empty() => Ok(LedgerFile::default()),
            Ok(body) => serde_json::from_str(&body)
                .with_context(|| format!("corrupt ledger file {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(LedgerFile::default()),
            Err(e) => Err(e).with_context(|| format!("reading {}", self.path.display())),
        }
    }

    /// Write-to-temp-then-rename so a crash mid-write cannot corrupt the
    /// previous ledger.
    pub fn save(&self, file: &LedgerFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(file)?;
        std::fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("renaming into {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_misses_cross_the_default_event_threshold() {
        let mut ledger = StrikeLedger::new(DEFAULT_EVENT_THRESHOLD);
        assert_eq!(ledger.record_miss("ufc-312"), 1);
        assert!(!ledger.should_cancel("ufc-312"));
        ledger.record_miss("ufc-312");
        assert!(!ledger.should_cancel("ufc-312"));
        ledger.record_miss("ufc-312");
        assert!(ledger.should_cancel("ufc-312"));
    }

    #[test]
    fn a_hit_resets_the_counter() {
        let mut ledger = StrikeLedger::new(3);
        ledger.record_miss("ufc-312");
        ledger.record_miss("ufc-312");
        ledger.record_hit("ufc-312");
        assert!(!ledger.should_cancel("ufc-312"));
        // Three fresh misses are required again.
        ledger.record_miss("ufc-312");
        ledger.record_miss("ufc-312");
        assert!(!ledger.should_cancel("ufc-312"));
        ledger.record_miss("ufc-312");
        assert!(ledger.should_cancel("ufc-312"));
    }

    #[test]
    fn clearing_applied_cancellations_restarts_from_zero() {
        let mut ledger = StrikeLedger::new(2);
        ledger.record_miss("bout-1");
        ledger.record_miss("bout-1");
        assert!(ledger.should_cancel("bout-1"));
        ledger.clear("bout-1");
        assert!(!ledger.should_cancel("bout-1"));
        assert_eq!(ledger.record_miss("bout-1"), 1);
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("strikes.json"));
        let file = store.load().unwrap();
        assert!(file.events.is_empty());
        assert!(file.fights.is_empty());
    }

    #[test]
    fn save_then_load_round_trips_via_rename() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("strikes.json"));
        let mut file = LedgerFile::default();
        file.events.insert("ufc-312".into(), 2);
        file.fights.insert("ufc-312-a-b".into(), 1);
        store.save(&file).unwrap();
        // No stray temp file left behind.
        assert!(!dir.path().join("strikes.json.tmp").exists());
        let loaded = store.load().unwrap();
        assert_eq!(loaded.events.get("ufc-312"), Some(&2));
        assert_eq!(loaded.fights.get("ufc-312-a-b"), Some(&1));
    }
}
