//! Accumulated block load profile results.
//!
//! The store holds the records of the current request in arrival order.
//! Every `reset` opens a new epoch; writers tagged with an older epoch are
//! refused, which keeps late records of a superseded stream out of the
//! results of the request that replaced it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{Atom, Changes, Subscription};
use crate::domain::profile::ProfileRecord;

/// Immutable view of the accumulated records.
pub type ProfileSnapshot = Arc<Vec<ProfileRecord>>;

/// Generation counter issued by [`ProfileStore::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreEpoch(u64);

impl StoreEpoch {
    /// Raw epoch number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Observable, append-only (per request) sequence of profile records.
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    records: Atom<Vec<ProfileRecord>>,
    epoch: Arc<AtomicU64>,
}

impl ProfileStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the sequence and start a new epoch.
    ///
    /// Observers are notified with the empty sequence.
    pub fn reset(&self) -> StoreEpoch {
        self.reset_with(|_| ())
    }

    /// Like [`ProfileStore::reset`], but runs `f` with the new epoch while
    /// the write is still exclusive, before any observer is notified.
    ///
    /// Concurrent resets run their `f` in epoch order.
    pub fn reset_with<F>(&self, f: F) -> StoreEpoch
    where
        F: FnOnce(StoreEpoch),
    {
        let mut issued = StoreEpoch(0);
        self.records.update(|_| {
            issued = StoreEpoch(self.epoch.fetch_add(1, Ordering::SeqCst) + 1);
            f(issued);
            Vec::new()
        });
        issued
    }

    /// Append a record regardless of epoch.
    pub fn append(&self, record: ProfileRecord) {
        self.records.update(|current| appended(current, record));
    }

    /// Append a record if `epoch` is still current.
    ///
    /// Returns `false`, without touching the sequence, when a later
    /// `reset` has already happened.
    pub fn append_for(&self, epoch: StoreEpoch, record: ProfileRecord) -> bool {
        self.records
            .try_update(|current| {
                (self.current_epoch() == epoch).then(|| appended(current, record))
            })
            .is_some()
    }

    /// Current snapshot.
    #[must_use]
    pub fn get(&self) -> ProfileSnapshot {
        self.records.get()
    }

    /// Number of accumulated records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.get().len()
    }

    /// Whether the sequence is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.get().is_empty()
    }

    /// Epoch of the most recent reset (zero before the first one).
    #[must_use]
    pub fn current_epoch(&self) -> StoreEpoch {
        StoreEpoch(self.epoch.load(Ordering::SeqCst))
    }

    /// Observe the sequence, starting with the current value.
    pub fn subscribe<F>(&self, listener: F) -> Subscription<Vec<ProfileRecord>>
    where
        F: Fn(&ProfileSnapshot) + Send + Sync + 'static,
    {
        self.records.subscribe(listener)
    }

    /// Async stream of snapshots.
    #[must_use]
    pub fn changes(&self) -> Changes<Vec<ProfileRecord>> {
        self.records.changes()
    }
}

fn appended(current: &[ProfileRecord], record: ProfileRecord) -> Vec<ProfileRecord> {
    let mut next = Vec::with_capacity(current.len() + 1);
    next.extend_from_slice(current);
    next.push(record);
    next
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use proptest::prelude::*;

    use super::*;
    use crate::domain::profile::BlockLoadProfile;

    fn record(date_time: &str) -> ProfileRecord {
        ProfileRecord::new(
            "2401:4900:833f:2688:0000:0000:0000:0002".to_string(),
            BlockLoadProfile {
                date_time: date_time.to_string(),
                ..BlockLoadProfile::default()
            },
        )
    }

    fn lengths(store: &ProfileStore) -> (Arc<Mutex<Vec<usize>>>, Subscription<Vec<ProfileRecord>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription = store.subscribe(move |snapshot| sink.lock().push(snapshot.len()));
        (seen, subscription)
    }

    #[test]
    fn starts_empty_at_epoch_zero() {
        let store = ProfileStore::new();
        assert!(store.is_empty());
        assert_eq!(store.current_epoch().get(), 0);
    }

    #[test]
    fn reset_clears_and_notifies_empty_state() {
        let store = ProfileStore::new();
        store.append(record("t1"));
        store.append(record("t2"));
        let (seen, _subscription) = lengths(&store);

        let epoch = store.reset();

        assert_eq!(epoch.get(), 1);
        assert!(store.is_empty());
        assert_eq!(*seen.lock(), vec![2, 0]);
    }

    #[test]
    fn reset_with_runs_before_observers_see_the_reset() {
        let store = ProfileStore::new();
        store.append(record("t1"));

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let _subscription =
            store.subscribe(move |snapshot| sink.lock().push(format!("notify {}", snapshot.len())));

        let hook = Arc::clone(&events);
        let epoch = store.reset_with(|issued| hook.lock().push(format!("hook {}", issued.get())));

        assert_eq!(epoch, store.current_epoch());
        assert_eq!(*events.lock(), vec!["notify 1", "hook 1", "notify 0"]);
    }

    #[test]
    fn append_for_current_epoch_succeeds() {
        let store = ProfileStore::new();
        let epoch = store.reset();

        assert!(store.append_for(epoch, record("t1")));
        assert!(store.append_for(epoch, record("t2")));

        assert_eq!(*store.get(), vec![record("t1"), record("t2")]);
    }

    #[test]
    fn stale_epoch_is_refused_without_notification() {
        let store = ProfileStore::new();
        let old = store.reset();
        assert!(store.append_for(old, record("old-1")));

        let new = store.reset();
        let (seen, _subscription) = lengths(&store);

        assert!(!store.append_for(old, record("old-2")));
        assert!(store.append_for(new, record("new-1")));

        assert_eq!(*store.get(), vec![record("new-1")]);
        assert_eq!(*seen.lock(), vec![0, 1]);
    }

    #[test]
    fn observers_never_see_shrinking_sequence_between_resets() {
        let store = ProfileStore::new();
        let (seen, _subscription) = lengths(&store);

        store.reset();
        for i in 0..5 {
            store.append(record(&format!("t{i}")));
        }

        assert_eq!(*seen.lock(), vec![0, 0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn snapshot_taken_before_append_is_unchanged() {
        let store = ProfileStore::new();
        store.append(record("t1"));
        let before = store.get();

        store.append(record("t2"));

        assert_eq!(before.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn duplicates_are_kept() {
        let store = ProfileStore::new();
        store.append(record("t1"));
        store.append(record("t1"));
        assert_eq!(store.len(), 2);
    }

    proptest! {
        #[test]
        fn reset_then_append_preserves_arrival_order(
            before in prop::collection::vec("[a-z0-9:]{1,12}", 0..8),
            after in prop::collection::vec("[a-z0-9:]{1,12}", 0..32),
        ) {
            let store = ProfileStore::new();
            for stamp in &before {
                store.append(record(stamp));
            }

            let epoch = store.reset();
            for stamp in &after {
                prop_assert!(store.append_for(epoch, record(stamp)));
            }

            let expected: Vec<ProfileRecord> = after.iter().map(|s| record(s)).collect();
            let snapshot = store.get();
            prop_assert_eq!(snapshot.as_ref(), &expected);
        }
    }
}
