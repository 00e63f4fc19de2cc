use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::lifecycle;

/// A single observed lifecycle callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub key: String,
    pub method: String,
}

impl LifecycleEvent {
    pub fn new(key: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}()", self.key, self.method)
    }
}

/// Why [`EventTracker::status`] could not produce a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    /// Nothing has been recorded for this key since the last clear.
    UnknownKey(String),
    /// The last recorded method has no display label.
    UnmappedMethod { key: String, method: String },
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKey(key) => write!(f, "no status recorded for {key}"),
            Self::UnmappedMethod { key, method } => {
                write!(f, "{key} last reported {method}, which has no status label")
            }
        }
    }
}

impl std::error::Error for StatusError {}

/// History and statuses copied out under one lock, so they always agree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerSnapshot {
    /// `key.method()` strings, oldest first.
    pub log: Vec<String>,
    /// `(key, raw method)` pairs in first-seen order.
    pub statuses: Vec<(String, String)>,
    pub evicted: u64,
}

#[derive(Default)]
struct Inner {
    log: VecDeque<LifecycleEvent>,
    statuses: Vec<(String, String)>,
    index: HashMap<String, usize>,
    evicted: u64,
}

/// Ordered history of lifecycle callbacks plus the last status per key.
///
/// All methods take `&self`; state sits behind a mutex so one tracker can be
/// shared through an `Arc` by every component that reports to it. With a
/// capacity the history behaves as a ring buffer. The status index is never
/// evicted, so a key keeps its status even after its events roll off.
pub struct EventTracker {
    inner: Mutex<Inner>,
    capacity: Option<usize>,
}

impl Default for EventTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl EventTracker {
    /// Create a tracker whose history grows without bound.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: None,
        }
    }

    /// Create a tracker keeping at most `capacity` history entries.
    ///
    /// A capacity of zero is treated as one. Storage grows on demand, so a
    /// generous capacity costs nothing until it is used.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: Some(capacity.max(1)),
        }
    }

    // Every mutation leaves `Inner` consistent, so a panic elsewhere while the
    // lock was held does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `key.method()` and make `method` the current status of `key`.
    pub fn record(&self, key: &str, method: &str) {
        let mut inner = self.lock();
        Self::push(&mut inner, self.capacity, LifecycleEvent::new(key, method));
        tracing::debug!(key, method, "lifecycle event recorded");
    }

    /// Record a batch of events in order under a single lock.
    pub fn record_all<'a, I>(&self, events: I)
    where
        I: IntoIterator<Item = &'a LifecycleEvent>,
    {
        let mut inner = self.lock();
        for event in events {
            tracing::debug!(key = %event.key, method = %event.method, "lifecycle event recorded");
            Self::push(&mut inner, self.capacity, event.clone());
        }
    }

    fn push(inner: &mut Inner, capacity: Option<usize>, event: LifecycleEvent) {
        match inner.index.get(&event.key) {
            Some(&i) => inner.statuses[i].1 = event.method.clone(),
            None => {
                inner.index.insert(event.key.clone(), inner.statuses.len());
                inner
                    .statuses
                    .push((event.key.clone(), event.method.clone()));
            }
        }

        if let Some(cap) = capacity {
            if inner.log.len() >= cap {
                inner.log.pop_front();
                inner.evicted += 1;
            }
        }
        inner.log.push_back(event);
    }

    /// Display label for the last callback recorded for `key`.
    pub fn status(&self, key: &str) -> Result<&'static str, StatusError> {
        let method = self
            .raw_status(key)
            .ok_or_else(|| StatusError::UnknownKey(key.to_string()))?;
        lifecycle::status_label(&method).map_err(|_| StatusError::UnmappedMethod {
            key: key.to_string(),
            method,
        })
    }

    /// The last callback name recorded for `key`, as reported.
    pub fn raw_status(&self, key: &str) -> Option<String> {
        let inner = self.lock();
        inner
            .index
            .get(key)
            .map(|&i| inner.statuses[i].1.clone())
    }

    /// History as `key.method()` strings, oldest first.
    pub fn event_log(&self) -> Vec<String> {
        self.lock().log.iter().map(ToString::to_string).collect()
    }

    /// History as events, oldest first.
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.lock().log.iter().cloned().collect()
    }

    /// `(key, raw method)` pairs in the order keys were first seen.
    pub fn statuses(&self) -> Vec<(String, String)> {
        self.lock().statuses.clone()
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        let inner = self.lock();
        TrackerSnapshot {
            log: inner.log.iter().map(ToString::to_string).collect(),
            statuses: inner.statuses.clone(),
            evicted: inner.evicted,
        }
    }

    /// Forget all history and statuses.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.log.clear();
        inner.statuses.clear();
        inner.index.clear();
        inner.evicted = 0;
        tracing::info!("event tracker cleared");
    }

    pub fn len(&self) -> usize {
        self.lock().log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().log.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Number of history entries dropped by the ring buffer since the last clear.
    pub fn evicted(&self) -> u64 {
        self.lock().evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn record_appends_formatted_entry() {
        let t = EventTracker::new();
        t.record("Activity A", "onCreate");
        assert_eq!(t.event_log(), vec!["Activity A.onCreate()"]);
    }

    #[test]
    fn status_reflects_last_method_for_key() {
        let t = EventTracker::new();
        t.record("a", "onCreate");
        t.record("a", "onStart");
        t.record("a", "onResume");
        t.record("a", "onPause");
        assert_eq!(t.status("a"), Ok("paused"));
        t.record("a", "onStop");
        assert_eq!(t.status("a"), Ok("stopped"));
    }

    #[test]
    fn known_transforms() {
        let t = EventTracker::new();
        for (method, label) in [
            ("onCreate", "created"),
            ("onPause", "paused"),
            ("onResume", "resumed"),
            ("onStop", "stopped"),
        ] {
            t.record("x", method);
            assert_eq!(t.status("x"), Ok(label));
        }
    }

    #[test]
    fn unknown_key_is_explicit() {
        let t = EventTracker::new();
        assert_eq!(t.status("nope"), Err(StatusError::UnknownKey("nope".into())));
        assert_eq!(t.raw_status("nope"), None);
    }

    #[test]
    fn unmapped_method_is_explicit() {
        let t = EventTracker::new();
        t.record("a", "onSaveInstanceState");
        assert_eq!(
            t.status("a"),
            Err(StatusError::UnmappedMethod {
                key: "a".into(),
                method: "onSaveInstanceState".into(),
            })
        );
        assert_eq!(t.raw_status("a").as_deref(), Some("onSaveInstanceState"));
    }

    #[test]
    fn keys_do_not_interfere() {
        let t = EventTracker::new();
        t.record("k1", "onResume");
        t.record("k2", "onCreate");
        t.record("k2", "onDestroy");
        assert_eq!(t.status("k1"), Ok("resumed"));
        assert_eq!(t.status("k2"), Ok("destroyed"));
    }

    #[test]
    fn log_length_counts_records_since_clear() {
        let t = EventTracker::new();
        for i in 0..5 {
            t.record(&format!("k{}", i % 2), "onStart");
        }
        assert_eq!(t.event_log().len(), 5);
        t.clear();
        t.record("k0", "onStop");
        t.record("k0", "onDestroy");
        assert_eq!(t.event_log().len(), 2);
    }

    #[test]
    fn clear_empties_everything() {
        let t = EventTracker::new();
        t.record("a", "onCreate");
        t.record("b", "onCreate");
        t.clear();
        assert!(t.event_log().is_empty());
        assert!(t.is_empty());
        assert!(t.statuses().is_empty());
        assert!(matches!(t.status("a"), Err(StatusError::UnknownKey(_))));
        assert!(matches!(t.status("b"), Err(StatusError::UnknownKey(_))));
    }

    #[test]
    fn statuses_keep_first_seen_order() {
        let t = EventTracker::new();
        t.record("b", "onCreate");
        t.record("a", "onCreate");
        t.record("b", "onPause");
        assert_eq!(
            t.statuses(),
            vec![
                ("b".to_string(), "onPause".to_string()),
                ("a".to_string(), "onCreate".to_string()),
            ]
        );
    }

    #[test]
    fn capacity_evicts_oldest_history_only() {
        let t = EventTracker::with_capacity(3);
        t.record("a", "onCreate");
        t.record("b", "onCreate");
        t.record("b", "onStart");
        t.record("b", "onResume");
        t.record("b", "onPause");
        assert_eq!(
            t.event_log(),
            vec!["b.onStart()", "b.onResume()", "b.onPause()"]
        );
        assert_eq!(t.evicted(), 2);
        // "a" rolled off the history but keeps its status.
        assert_eq!(t.status("a"), Ok("created"));
    }

    #[test]
    fn zero_capacity_keeps_one_entry() {
        let t = EventTracker::with_capacity(0);
        assert_eq!(t.capacity(), Some(1));
        t.record("a", "onCreate");
        t.record("a", "onStart");
        assert_eq!(t.event_log(), vec!["a.onStart()"]);
    }

    #[test]
    fn huge_capacity_does_not_allocate_up_front() {
        let t = EventTracker::with_capacity(9_000_000_000_000_000_000);
        assert_eq!(t.capacity(), Some(9_000_000_000_000_000_000));
        t.record("a", "onCreate");
        t.record("a", "onStart");
        assert_eq!(t.len(), 2);
        assert_eq!(t.evicted(), 0);

        let t = EventTracker::with_capacity(usize::MAX);
        t.record("a", "onCreate");
        assert_eq!(t.event_log(), vec!["a.onCreate()"]);
    }

    #[test]
    fn record_all_preserves_order() {
        let t = EventTracker::new();
        let batch = vec![
            LifecycleEvent::new("a", "onPause"),
            LifecycleEvent::new("b", "onCreate"),
            LifecycleEvent::new("a", "onStop"),
        ];
        t.record_all(&batch);
        assert_eq!(t.events(), batch);
        assert_eq!(t.status("a"), Ok("stopped"));
    }

    #[test]
    fn snapshot_copies_log_and_statuses_together() {
        let t = EventTracker::with_capacity(2);
        t.record("a", "onCreate");
        t.record("b", "onCreate");
        t.record("a", "onStart");
        let snap = t.snapshot();
        assert_eq!(snap.log, vec!["b.onCreate()", "a.onStart()"]);
        assert_eq!(
            snap.statuses,
            vec![
                ("a".to_string(), "onStart".to_string()),
                ("b".to_string(), "onCreate".to_string()),
            ]
        );
        assert_eq!(snap.evicted, 1);

        t.clear();
        assert_eq!(t.snapshot(), TrackerSnapshot::default());
    }

    #[test]
    fn snapshots_never_tear_under_concurrent_writers() {
        let t = Arc::new(EventTracker::new());
        let writer = {
            let t = Arc::clone(&t);
            thread::spawn(move || {
                for i in 0..500 {
                    let key = format!("k{}", i % 5);
                    t.record(&key, "onCreate");
                    t.record(&key, "onDestroy");
                    if i % 50 == 0 {
                        t.clear();
                    }
                }
            })
        };
        for _ in 0..200 {
            let snap = t.snapshot();
            // Each key's newest log entry is the status the snapshot reports.
            for (key, method) in &snap.statuses {
                let newest = snap
                    .log
                    .iter()
                    .rev()
                    .find(|line| line.starts_with(&format!("{key}.")));
                assert_eq!(newest, Some(&format!("{key}.{method}()")));
            }
        }
        writer.join().unwrap();
    }

    #[test]
    fn concurrent_records_are_not_lost() {
        let t = Arc::new(EventTracker::new());
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let t = Arc::clone(&t);
                thread::spawn(move || {
                    let key = format!("activity-{}", n);
                    for _ in 0..100 {
                        t.record(&key, "onResume");
                        t.record(&key, "onPause");
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(t.len(), 8 * 200);
        assert_eq!(t.statuses().len(), 8);
        for n in 0..8 {
            assert_eq!(t.status(&format!("activity-{}", n)), Ok("paused"));
        }
    }

    #[test]
    fn status_error_display() {
        assert_eq!(
            StatusError::UnknownKey("a".into()).to_string(),
            "no status recorded for a"
        );
        let err = StatusError::UnmappedMethod {
            key: "a".into(),
            method: "onFoo".into(),
        };
        assert!(err.to_string().contains("onFoo"));
    }
}
