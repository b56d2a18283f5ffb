//! Append/update/clear log of attempts.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;

use super::attempt::{Attempt, AttemptOutcome, AttemptState};
use crate::config::STORE_EVENT_CAPACITY;
use crate::error_handling::StoreError;

/// A change notification, sent after the mutation is visible to readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A pending attempt was appended.
    Pushed {
        /// Attempt key
        key: String,
        /// Service id
        service: String,
    },
    /// An attempt settled.
    Updated {
        /// Attempt key
        key: String,
        /// Service id
        service: String,
        /// True for `Succeeded`
        succeeded: bool,
    },
    /// Attempts were removed.
    Cleared {
        /// Service whose attempts were removed, `None` for a full clear
        service: Option<String>,
        /// Number of removed attempts
        removed: usize,
    },
}

/// Insertion-ordered log of attempts keyed by attempt key.
///
/// Entries live in a sequence-numbered `BTreeMap` so iteration is oldest
/// first; `index` maps keys to their sequence number.
pub struct ResultStore {
    entries: BTreeMap<u64, Attempt>,
    index: HashMap<String, u64>,
    next_seq: u64,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(STORE_EVENT_CAPACITY);
        ResultStore {
            entries: BTreeMap::new(),
            index: HashMap::new(),
            next_seq: 0,
            events,
        }
    }

    /// Subscribes to change events.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Appends a pending attempt.
    pub fn push(&mut self, attempt: Attempt) -> Result<(), StoreError> {
        if self.index.contains_key(&attempt.key) {
            return Err(StoreError::DuplicateKey(attempt.key));
        }
        if !attempt.is_pending() {
            return Err(StoreError::NotPending(attempt.key));
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        let event = StoreEvent::Pushed {
            key: attempt.key.clone(),
            service: attempt.service.clone(),
        };
        self.index.insert(attempt.key.clone(), seq);
        self.entries.insert(seq, attempt);
        self.notify(event);
        Ok(())
    }

    /// Settles the attempt with `key`.
    ///
    /// Terminal states are final: a second update is rejected with
    /// `AlreadySettled` and leaves the attempt untouched.
    pub fn update(&mut self, key: &str, outcome: AttemptOutcome) -> Result<(), StoreError> {
        let attempt = self
            .index
            .get(key)
            .and_then(|seq| self.entries.get_mut(seq))
            .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))?;

        if !matches!(attempt.state, AttemptState::Pending) {
            return Err(StoreError::AlreadySettled(key.to_string()));
        }

        let succeeded = outcome.is_success();
        attempt.state = outcome.into();
        let event = StoreEvent::Updated {
            key: attempt.key.clone(),
            service: attempt.service.clone(),
            succeeded,
        };
        self.notify(event);
        Ok(())
    }

    /// Removes every attempt of `service`, or every attempt when `None`.
    ///
    /// Returns the number of removed attempts.
    pub fn clear(&mut self, service: Option<&str>) -> usize {
        let removed = match service {
            Some(service) => {
                let before = self.entries.len();
                self.entries.retain(|_, attempt| attempt.service != service);
                let entries = &self.entries;
                self.index.retain(|_, seq| entries.contains_key(seq));
                before - self.entries.len()
            }
            None => {
                let removed = self.entries.len();
                self.entries.clear();
                self.index.clear();
                removed
            }
        };
        self.notify(StoreEvent::Cleared {
            service: service.map(str::to_string),
            removed,
        });
        removed
    }

    /// Attempts of one service, oldest first.
    pub fn by_service<'a>(&'a self, service: &'a str) -> impl Iterator<Item = &'a Attempt> {
        self.entries.values().filter(move |a| a.service == service)
    }

    /// Every attempt, oldest first.
    pub fn all(&self) -> impl Iterator<Item = &Attempt> {
        self.entries.values()
    }

    /// Attempts grouped by service, groups in order of first appearance.
    pub fn grouped_by_service(&self) -> Vec<(&str, Vec<&Attempt>)> {
        group_by_service(self.entries.values())
    }

    /// Looks an attempt up by key.
    pub fn get(&self, key: &str) -> Option<&Attempt> {
        self.index.get(key).and_then(|seq| self.entries.get(seq))
    }

    /// True if `key` has been pushed and not cleared.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Number of attempts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the store holds no attempts.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of attempts still pending.
    pub fn pending_count(&self) -> usize {
        self.entries.values().filter(|a| a.is_pending()).count()
    }

    fn notify(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Cloneable handle to a `ResultStore` shared between the dispatcher and readers.
///
/// Locks are only taken inside these methods and are never held across an
/// `.await`, so the handle is safe to use from async code.
#[derive(Clone, Default)]
pub struct SharedResultStore {
    inner: Arc<RwLock<ResultStore>>,
}

impl SharedResultStore {
    /// Creates a handle to a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, ResultStore> {
        // A panic while holding the lock cannot leave a half-applied mutation
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ResultStore> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// See [`ResultStore::push`].
    pub fn push(&self, attempt: Attempt) -> Result<(), StoreError> {
        self.write().push(attempt)
    }

    /// See [`ResultStore::update`].
    pub fn update(&self, key: &str, outcome: AttemptOutcome) -> Result<(), StoreError> {
        self.write().update(key, outcome)
    }

    /// See [`ResultStore::clear`].
    pub fn clear(&self, service: Option<&str>) -> usize {
        self.write().clear(service)
    }

    /// Snapshot of one service's attempts, oldest first.
    pub fn by_service(&self, service: &str) -> Vec<Attempt> {
        self.read().by_service(service).cloned().collect()
    }

    /// Snapshot of every attempt, oldest first.
    pub fn all(&self) -> Vec<Attempt> {
        self.read().all().cloned().collect()
    }

    /// Snapshot of one attempt.
    pub fn get(&self, key: &str) -> Option<Attempt> {
        self.read().get(key).cloned()
    }

    /// See [`ResultStore::contains_key`].
    pub fn contains_key(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// See [`ResultStore::len`].
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// See [`ResultStore::is_empty`].
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// See [`ResultStore::pending_count`].
    pub fn pending_count(&self) -> usize {
        self.read().pending_count()
    }

    /// See [`ResultStore::subscribe`].
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.read().subscribe()
    }

}

/// Groups `attempts` by service, groups in order of first appearance and
/// attempts in their given order within a group.
pub fn group_by_service<'a>(
    attempts: impl IntoIterator<Item = &'a Attempt>,
) -> Vec<(&'a str, Vec<&'a Attempt>)> {
    let mut groups: Vec<(&'a str, Vec<&'a Attempt>)> = Vec::new();
    for attempt in attempts {
        match groups.iter_mut().find(|(s, _)| *s == attempt.service) {
            Some((_, list)) => list.push(attempt),
            None => groups.push((attempt.service.as_str(), vec![attempt])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::FailureKind;
    use chrono::{TimeZone, Utc};

    fn pending(service: &str, millis: i64) -> Attempt {
        let at = Utc
            .timestamp_millis_opt(millis)
            .single()
            .expect("valid timestamp");
        Attempt::pending(service, at)
    }

    fn failed() -> AttemptOutcome {
        AttemptOutcome::failed(5, FailureKind::Connect, "connection refused")
    }

    #[test]
    fn test_push_preserves_insertion_order() {
        let mut store = ResultStore::new();
        store.push(pending("zenrows", 3)).expect("push");
        store.push(pending("apify", 1)).expect("push");
        store.push(pending("fetch", 2)).expect("push");

        let keys: Vec<_> = store.all().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["zenrows-3", "apify-1", "fetch-2"]);
    }

    #[test]
    fn test_push_rejects_duplicate_key() {
        let mut store = ResultStore::new();
        store.push(pending("fetch", 1)).expect("push");
        let err = store.push(pending("fetch", 1)).expect_err("duplicate");
        assert_eq!(err, StoreError::DuplicateKey("fetch-1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_push_rejects_settled_attempt() {
        let mut store = ResultStore::new();
        let mut attempt = pending("fetch", 1);
        attempt.state = failed().into();
        assert_eq!(
            store.push(attempt),
            Err(StoreError::NotPending("fetch-1".to_string()))
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_unknown_key() {
        let mut store = ResultStore::new();
        assert_eq!(
            store.update("fetch-1", failed()),
            Err(StoreError::KeyNotFound("fetch-1".to_string()))
        );
    }

    #[test]
    fn test_terminal_state_is_final() {
        let mut store = ResultStore::new();
        store.push(pending("fetch", 1)).expect("push");
        store.update("fetch-1", failed()).expect("first update");

        let second = AttemptOutcome::failed(99, FailureKind::Timeout, "late");
        assert_eq!(
            store.update("fetch-1", second),
            Err(StoreError::AlreadySettled("fetch-1".to_string()))
        );
        let attempt = store.get("fetch-1").expect("attempt exists");
        assert_eq!(attempt.failure_kind(), Some(FailureKind::Connect));
        assert_eq!(attempt.duration_ms(), Some(5));
    }

    #[test]
    fn test_clear_single_service() {
        let mut store = ResultStore::new();
        store.push(pending("fetch", 1)).expect("push");
        store.push(pending("apify", 2)).expect("push");
        store.push(pending("fetch", 3)).expect("push");

        assert_eq!(store.clear(Some("fetch")), 2);
        assert_eq!(store.len(), 1);
        assert!(store.contains_key("apify-2"));
        assert!(!store.contains_key("fetch-1"));
        assert_eq!(store.by_service("fetch").count(), 0);

        // The key is free again after a clear
        store.push(pending("fetch", 1)).expect("push after clear");
    }

    #[test]
    fn test_clear_all() {
        let mut store = ResultStore::new();
        store.push(pending("fetch", 1)).expect("push");
        store.push(pending("apify", 2)).expect("push");
        assert_eq!(store.clear(None), 2);
        assert!(store.is_empty());
        assert!(store.get("apify-2").is_none());
    }

    #[test]
    fn test_by_service_and_grouping() {
        let mut store = ResultStore::new();
        store.push(pending("apify", 1)).expect("push");
        store.push(pending("fetch", 2)).expect("push");
        store.push(pending("apify", 3)).expect("push");

        let apify: Vec<_> = store.by_service("apify").map(|a| a.key.as_str()).collect();
        assert_eq!(apify, vec!["apify-1", "apify-3"]);

        let groups = store.grouped_by_service();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "apify");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "fetch");
    }

    #[test]
    fn test_events_follow_mutations() {
        let mut store = ResultStore::new();
        let mut rx = store.subscribe();
        store.push(pending("fetch", 1)).expect("push");
        store.update("fetch-1", failed()).expect("update");
        store.clear(None);

        assert_eq!(
            rx.try_recv().expect("pushed event"),
            StoreEvent::Pushed {
                key: "fetch-1".to_string(),
                service: "fetch".to_string()
            }
        );
        assert_eq!(
            rx.try_recv().expect("updated event"),
            StoreEvent::Updated {
                key: "fetch-1".to_string(),
                service: "fetch".to_string(),
                succeeded: false
            }
        );
        assert_eq!(
            rx.try_recv().expect("cleared event"),
            StoreEvent::Cleared {
                service: None,
                removed: 1
            }
        );
    }

    #[test]
    fn test_shared_store_reads_reflect_writes() {
        let shared = SharedResultStore::new();
        let reader = shared.clone();
        shared.push(pending("fetch", 1)).expect("push");
        assert_eq!(reader.pending_count(), 1);
        shared.update("fetch-1", failed()).expect("update");
        assert_eq!(reader.pending_count(), 0);
        assert_eq!(reader.by_service("fetch").len(), 1);
    }
}
