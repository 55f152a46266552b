//! Guarded store of per-track observation statistics.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use parking_lot::Mutex;
use thiserror::Error;

use crate::store::{ItemStats, ShipPolicy};

/// `mark_as_pushed` was called for a track that was never observed.
///
/// This is a driver logic error: a track cannot be marked as pushed before
/// its first observation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown track id: {id}")]
pub struct UnknownTrackError {
    /// The offending track id.
    pub id: String,
}

/// Result of one atomic observe-and-evaluate step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Snapshot of the stats after this observation was recorded.
    pub stats: ItemStats,
    /// Whether this observation qualified the track for shipping.
    ///
    /// When true, the track was marked as pushed in the same atomic step,
    /// so the snapshot already shows `pushed == true`.
    pub qualified: bool,
}

/// Store of per-track observation statistics.
///
/// The id-to-stats map is the only shared mutable state in the pipeline and
/// is never exposed directly; all access goes through the methods below,
/// each of which holds the internal lock for its full duration. In
/// particular [`observe_and_evaluate`](Self::observe_and_evaluate) runs
/// observe, decision, and mark-as-pushed as one atomic unit, so two
/// concurrent observations of the same id can never both qualify.
///
/// Entries live until the identity tracker confirms a track has been
/// retired (see [`release_retired`](Self::release_retired)); without that
/// signal the store grows without bound over the process lifetime.
#[derive(Debug, Default)]
pub struct ObservationStore {
    stats_by_id: Mutex<HashMap<String, ItemStats>>,
}

impl ObservationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation of `id`.
    ///
    /// A new track starts at frequency 1; an existing track has its
    /// frequency incremented while keeping the label recorded on its first
    /// observation and its pushed flag.
    pub fn observe(&self, id: &str, label: &str) {
        let mut stats_by_id = self.stats_by_id.lock();
        observe_entry(&mut stats_by_id, id, label);
    }

    /// Mark `id` as pushed. Idempotent for known ids.
    pub fn mark_as_pushed(&self, id: &str) -> Result<(), UnknownTrackError> {
        let mut stats_by_id = self.stats_by_id.lock();
        match stats_by_id.get_mut(id) {
            Some(stats) => {
                stats.pushed = true;
                Ok(())
            }
            None => Err(UnknownTrackError { id: id.to_owned() }),
        }
    }

    /// Snapshot of the stats for `id`, if it has ever been observed.
    pub fn get(&self, id: &str) -> Option<ItemStats> {
        self.stats_by_id.lock().get(id).cloned()
    }

    /// Record one observation of `id` and evaluate `policy` against the
    /// updated stats, marking the track as pushed if it qualifies.
    ///
    /// The whole step runs under a single lock acquisition, which is what
    /// guarantees at-most-once qualification per track.
    pub fn observe_and_evaluate(&self, id: &str, label: &str, policy: &ShipPolicy) -> Observation {
        let mut stats_by_id = self.stats_by_id.lock();
        let stats = observe_entry(&mut stats_by_id, id, label);
        let qualified = policy.qualifies(stats);
        if qualified {
            stats.pushed = true;
        }
        Observation {
            stats: stats.clone(),
            qualified,
        }
    }

    /// Drop entries for tracks the identity tracker has retired.
    ///
    /// Returns the number of entries removed. Ids without an entry are
    /// ignored.
    pub fn release_retired<I, S>(&self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stats_by_id = self.stats_by_id.lock();
        let mut released = 0;
        for id in ids {
            if stats_by_id.remove(id.as_ref()).is_some() {
                released += 1;
            }
        }
        released
    }

    /// Number of tracks currently held.
    pub fn len(&self) -> usize {
        self.stats_by_id.lock().len()
    }

    /// Whether the store holds no tracks.
    pub fn is_empty(&self) -> bool {
        self.stats_by_id.lock().is_empty()
    }
}

fn observe_entry<'m>(
    stats_by_id: &'m mut HashMap<String, ItemStats>,
    id: &str,
    label: &str,
) -> &'m mut ItemStats {
    match stats_by_id.entry(id.to_owned()) {
        Entry::Occupied(entry) => {
            // Keep the originally stored label and the pushed flag.
            let stats = entry.into_mut();
            stats.frequency += 1;
            stats
        }
        Entry::Vacant(entry) => entry.insert(ItemStats::first_observation(id, label)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_counts_observations() {
        let store = ObservationStore::new();
        for n in 1..=10u32 {
            store.observe("t1", "squirrel");
            assert_eq!(store.get("t1").unwrap().frequency, n);
        }
    }

    #[test]
    fn test_label_sticks_to_first_observation() {
        let store = ObservationStore::new();
        store.observe("t1", "squirrel");
        store.observe("t1", "cat");
        store.observe("t1", "dog");

        let stats = store.get("t1").unwrap();
        assert_eq!(stats.label, "squirrel");
        assert_eq!(stats.frequency, 3);
    }

    #[test]
    fn test_mark_as_pushed_is_idempotent() {
        let store = ObservationStore::new();
        store.observe("t1", "squirrel");

        store.mark_as_pushed("t1").unwrap();
        store.mark_as_pushed("t1").unwrap();
        assert!(store.get("t1").unwrap().pushed);

        // A pushed track keeps counting but never requalifies.
        let policy = ShipPolicy::new(1, "squirrel");
        let observation = store.observe_and_evaluate("t1", "squirrel", &policy);
        assert!(!observation.qualified);
        assert_eq!(observation.stats.frequency, 2);
    }

    #[test]
    fn test_mark_as_pushed_unknown_id_leaves_store_unchanged() {
        let store = ObservationStore::new();
        store.observe("t1", "squirrel");

        let err = store.mark_as_pushed("t2").unwrap_err();
        assert_eq!(err.id, "t2");
        assert_eq!(store.len(), 1);
        assert!(store.get("t2").is_none());
        assert!(!store.get("t1").unwrap().pushed);
    }

    #[test]
    fn test_observe_and_evaluate_qualifies_exactly_once() {
        let store = ObservationStore::new();
        let policy = ShipPolicy::new(3, "squirrel");

        let mut qualified_at = Vec::new();
        for n in 1..=10u32 {
            let observation = store.observe_and_evaluate("t1", "squirrel", &policy);
            if observation.qualified {
                qualified_at.push(n);
                assert!(observation.stats.pushed);
            }
        }

        assert_eq!(qualified_at, vec![3]);
        let stats = store.get("t1").unwrap();
        assert_eq!(stats.frequency, 10);
        assert!(stats.pushed);
    }

    #[test]
    fn test_observe_and_evaluate_ignores_other_labels() {
        let store = ObservationStore::new();
        let policy = ShipPolicy::new(5, "squirrel");

        for _ in 0..100 {
            let observation = store.observe_and_evaluate("t2", "cat", &policy);
            assert!(!observation.qualified);
        }
        let stats = store.get("t2").unwrap();
        assert_eq!(stats.frequency, 100);
        assert!(!stats.pushed);
    }

    #[test]
    fn test_release_retired_drops_only_named_ids() {
        let store = ObservationStore::new();
        store.observe("t1", "squirrel");
        store.observe("t2", "cat");

        let released = store.release_retired(["t1", "t3"]);
        assert_eq!(released, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("t1").is_none());
        assert!(store.get("t2").is_some());
    }
}
