//! Local read/unread tracking for server notifications.
//!
//! The whole map lives under one key. Every mutation loads the blob, edits it and
//! writes it back in a single `set`, serialised by a mutex inside the process.
//! Separate processes sharing the same store still race: last writer wins.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::kv::{KeyValueStore, StoreError};
use crate::clock::{Clock, SystemClock};

pub const READ_STATES_KEY: &str = "notification_read_states";

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadState {
    pub is_read: bool,
    pub read_at: DateTime<Utc>,
}

pub type ReadStateMap = BTreeMap<String, ReadState>;

/// Broadcast after every successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadStateEvent {
    Marked { ids: Vec<String>, is_read: bool },
    Pruned { removed: usize },
    Cleared,
}

#[derive(Debug, thiserror::Error)]
pub enum ReadStateError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("read state could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct NotificationReadStore<S> {
    store: S,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<ReadStateEvent>,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> NotificationReadStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: S, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            clock,
            events,
            write_lock: Mutex::new(()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReadStateEvent> {
        self.events.subscribe()
    }

    /// Current map. A missing or unreadable blob reads as empty.
    pub fn snapshot(&self) -> ReadStateMap {
        self.load()
    }

    /// Mark one notification read. An entry that is already read keeps its
    /// original `readAt`, so repeating the call changes nothing.
    pub fn mark_as_read(&self, id: &str) -> Result<(), ReadStateError> {
        self.mark_all_as_read([id])
    }

    pub fn mark_as_unread(&self, id: &str) -> Result<(), ReadStateError> {
        self.update(|states, now| {
            states.insert(
                id.to_string(),
                ReadState {
                    is_read: false,
                    read_at: now,
                },
            );
        })?;
        self.publish(ReadStateEvent::Marked {
            ids: vec![id.to_string()],
            is_read: false,
        });
        Ok(())
    }

    /// Mark every id read with one shared timestamp, in a single write.
    pub fn mark_all_as_read<I, T>(&self, ids: I) -> Result<(), ReadStateError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let ids: Vec<String> = ids.into_iter().map(|id| id.as_ref().to_string()).collect();
        if ids.is_empty() {
            return Ok(());
        }

        self.update(|states, now| {
            for id in &ids {
                match states.get(id) {
                    Some(existing) if existing.is_read => {}
                    _ => {
                        states.insert(
                            id.clone(),
                            ReadState {
                                is_read: true,
                                read_at: now,
                            },
                        );
                    }
                }
            }
        })?;
        self.publish(ReadStateEvent::Marked { ids, is_read: true });
        Ok(())
    }

    pub fn is_read(&self, id: &str) -> bool {
        self.get_read_state(id)
            .map(|state| state.is_read)
            .unwrap_or(false)
    }

    pub fn get_read_state(&self, id: &str) -> Option<ReadState> {
        self.load().get(id).copied()
    }

    /// How many of `ids` are not marked read.
    pub fn unread_count<I, T>(&self, ids: I) -> usize
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let states = self.load();
        ids.into_iter()
            .filter(|id| {
                !states
                    .get(id.as_ref())
                    .map(|state| state.is_read)
                    .unwrap_or(false)
            })
            .count()
    }

    /// Drop entries whose `readAt` is more than `days_to_keep` days old. An entry
    /// exactly `days_to_keep` days old is kept. Returns how many were dropped.
    pub fn clear_old_states(&self, days_to_keep: u32) -> Result<usize, ReadStateError> {
        let window = Duration::days(i64::from(days_to_keep));
        let removed = self.update(|states, now| {
            let before = states.len();
            states.retain(|_, state| now.signed_duration_since(state.read_at) <= window);
            before - states.len()
        })?;

        tracing::info!(removed, days_to_keep, "pruned notification read states");
        self.publish(ReadStateEvent::Pruned { removed });
        Ok(removed)
    }

    pub fn clear_all_states(&self) -> Result<(), ReadStateError> {
        {
            let _guard = self.write_lock.lock().expect("read state mutex poisoned");
            self.store.delete(READ_STATES_KEY)?;
        }
        self.publish(ReadStateEvent::Cleared);
        Ok(())
    }

    fn load(&self) -> ReadStateMap {
        self.read().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "notification read states unavailable");
            ReadStateMap::new()
        })
    }

    /// Stored map. Only a missing or corrupt blob reads as empty; store
    /// failures are returned so a write never replaces state it could not see.
    fn read(&self) -> Result<ReadStateMap, StoreError> {
        let Some(raw) = self.store.get(READ_STATES_KEY)? else {
            return Ok(ReadStateMap::new());
        };

        Ok(serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "discarding unreadable notification read states");
            ReadStateMap::new()
        }))
    }

    fn update<R, F>(&self, mutate: F) -> Result<R, ReadStateError>
    where
        F: FnOnce(&mut ReadStateMap, DateTime<Utc>) -> R,
    {
        let _guard = self.write_lock.lock().expect("read state mutex poisoned");
        let mut states = self.read()?;
        let outcome = mutate(&mut states, self.clock.now());
        let encoded = serde_json::to_string(&states)?;
        self.store.set(READ_STATES_KEY, &encoded)?;
        Ok(outcome)
    }

    fn publish(&self, event: ReadStateEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryKv;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn store_at(instant: DateTime<Utc>) -> (NotificationReadStore<MemoryKv>, MemoryKv, Arc<FixedClock>) {
        let kv = MemoryKv::new();
        let clock = Arc::new(FixedClock::new(instant));
        let store = NotificationReadStore::with_clock(kv.clone(), clock.clone());
        (store, kv, clock)
    }

    #[test]
    fn mark_all_as_read_stamps_one_timestamp() {
        let (store, kv, _) = store_at(now());
        store.mark_all_as_read(["a", "b"]).expect("write succeeds");

        let snapshot = store.snapshot();
        let expected = ReadState {
            is_read: true,
            read_at: now(),
        };
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("a"), Some(&expected));
        assert_eq!(snapshot.get("b"), Some(&expected));

        let raw = kv.get(READ_STATES_KEY).expect("get").expect("blob written");
        let blob: serde_json::Value = serde_json::from_str(&raw).expect("blob is json");
        assert_eq!(blob["a"]["isRead"], serde_json::json!(true));
        assert_eq!(blob["a"]["readAt"], blob["b"]["readAt"]);
    }

    #[test]
    fn mark_as_read_twice_matches_once() {
        let (store, kv, clock) = store_at(now());
        store.mark_as_read("n-1").expect("first write");
        let once = kv.get(READ_STATES_KEY).expect("get");

        clock.advance(Duration::minutes(5));
        store.mark_as_read("n-1").expect("second write");
        let twice = kv.get(READ_STATES_KEY).expect("get");

        assert_eq!(once, twice);
        assert!(store.is_read("n-1"));
    }

    #[test]
    fn unread_round_trip() {
        let (store, _, _) = store_at(now());
        store.mark_as_read("n-1").expect("read");
        store.mark_as_unread("n-1").expect("unread");

        let state = store.get_read_state("n-1").expect("entry kept");
        assert!(!state.is_read);
        assert!(!store.is_read("n-1"));
        assert!(!store.is_read("never-seen"));
        assert_eq!(store.unread_count(["n-1", "n-2"]), 2);

        store.mark_as_read("n-1").expect("read again");
        assert_eq!(store.unread_count(["n-1", "n-2"]), 1);
    }

    #[test]
    fn clear_old_states_keeps_the_exact_boundary() {
        let (store, _, clock) = store_at(now() - Duration::days(30));
        store.mark_as_read("boundary").expect("write");
        clock.set(now() - Duration::days(30) - Duration::seconds(1));
        store.mark_as_read("expired").expect("write");
        clock.set(now() - Duration::days(2));
        store.mark_as_read("recent").expect("write");

        clock.set(now());
        let removed = store.clear_old_states(30).expect("prune");

        assert_eq!(removed, 1);
        assert!(store.get_read_state("boundary").is_some());
        assert!(store.get_read_state("recent").is_some());
        assert!(store.get_read_state("expired").is_none());
    }

    #[test]
    fn corrupt_blob_reads_as_empty_and_is_replaced_on_write() {
        let (store, kv, _) = store_at(now());
        kv.set(READ_STATES_KEY, "{not json").expect("seed corrupt blob");

        assert!(store.snapshot().is_empty());
        store.mark_as_read("n-9").expect("write over corrupt blob");
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn clear_all_states_removes_the_blob() {
        let (store, kv, _) = store_at(now());
        store.mark_all_as_read(["a", "b", "c"]).expect("write");
        store.clear_all_states().expect("clear");
        assert!(kv.get(READ_STATES_KEY).expect("get").is_none());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn observers_hear_about_every_write() {
        let (store, _, _) = store_at(now());
        let mut events = store.subscribe();

        store.mark_all_as_read(["a", "b"]).expect("write");
        store.mark_as_unread("a").expect("write");
        store.clear_old_states(30).expect("prune");
        store.clear_all_states().expect("clear");

        assert_eq!(
            events.try_recv().expect("first event"),
            ReadStateEvent::Marked {
                ids: vec!["a".to_string(), "b".to_string()],
                is_read: true
            }
        );
        assert_eq!(
            events.try_recv().expect("second event"),
            ReadStateEvent::Marked {
                ids: vec!["a".to_string()],
                is_read: false
            }
        );
        assert_eq!(
            events.try_recv().expect("third event"),
            ReadStateEvent::Pruned { removed: 0 }
        );
        assert_eq!(events.try_recv().expect("fourth event"), ReadStateEvent::Cleared);
    }

    #[test]
    fn empty_id_list_is_a_no_op() {
        let (store, kv, _) = store_at(now());
        let mut events = store.subscribe();
        store
            .mark_all_as_read(Vec::<String>::new())
            .expect("nothing to write");
        assert!(kv.get(READ_STATES_KEY).expect("get").is_none());
        assert!(events.try_recv().is_err());
    }

    /// Memory store whose next read or every write can be made to fail.
    #[derive(Default)]
    struct FlakyKv {
        inner: MemoryKv,
        fail_next_get: AtomicBool,
        fail_writes: AtomicBool,
    }

    impl FlakyKv {
        fn refuse(&self, flag: &AtomicBool, what: &str) -> Result<(), StoreError> {
            if flag.load(Ordering::SeqCst) {
                Err(StoreError::Unavailable(format!("{what} refused")))
            } else {
                Ok(())
            }
        }
    }

    impl KeyValueStore for FlakyKv {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            if self.fail_next_get.swap(false, Ordering::SeqCst) {
                return Err(StoreError::Unavailable("read refused".to_string()));
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.refuse(&self.fail_writes, "write")?;
            self.inner.set(key, value)
        }

        fn delete(&self, key: &str) -> Result<(), StoreError> {
            self.refuse(&self.fail_writes, "delete")?;
            self.inner.delete(key)
        }

        fn list(&self) -> Result<Vec<String>, StoreError> {
            self.inner.list()
        }
    }

    fn flaky_store() -> (NotificationReadStore<Arc<FlakyKv>>, Arc<FlakyKv>) {
        let kv = Arc::new(FlakyKv::default());
        let store = NotificationReadStore::with_clock(kv.clone(), Arc::new(FixedClock::new(now())));
        (store, kv)
    }

    #[test]
    fn failed_read_leaves_the_stored_map_untouched() {
        let (store, kv) = flaky_store();
        store.mark_all_as_read(["a", "b", "c"]).expect("write");
        let before = kv.inner.get(READ_STATES_KEY).expect("get");
        let mut events = store.subscribe();

        kv.fail_next_get.store(true, Ordering::SeqCst);
        let err = store.mark_as_read("d").expect_err("read failure surfaces");

        assert!(matches!(err, ReadStateError::Store(StoreError::Unavailable(_))));
        assert_eq!(kv.inner.get(READ_STATES_KEY).expect("get"), before);
        assert!(events.try_recv().is_err());

        store.mark_as_read("d").expect("store recovered");
        let keys: Vec<String> = store.snapshot().into_keys().collect();
        assert_eq!(keys, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn failed_writes_report_errors_without_events() {
        let (store, kv) = flaky_store();
        store.mark_all_as_read(["a", "b"]).expect("write");
        let before = kv.inner.get(READ_STATES_KEY).expect("get");
        let mut events = store.subscribe();

        kv.fail_writes.store(true, Ordering::SeqCst);
        assert!(store.mark_as_unread("a").is_err());
        assert!(store.clear_old_states(0).is_err());
        assert!(store.clear_all_states().is_err());

        assert_eq!(kv.inner.get(READ_STATES_KEY).expect("get"), before);
        assert!(store.is_read("a"));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn failed_read_degrades_queries_to_unread() {
        let (store, kv) = flaky_store();
        store.mark_as_read("a").expect("write");

        kv.fail_next_get.store(true, Ordering::SeqCst);
        assert!(!store.is_read("a"));
        assert!(store.is_read("a"));
    }
}
