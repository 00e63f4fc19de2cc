use std::time::{Duration, Instant};

use crate::lifecycle;
use crate::tracker::EventTracker;

/// Default delay between a lifecycle change and the redraw of its status.
pub const DEFAULT_REFRESH: Duration = Duration::from_millis(750);

/// One row of the status panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub key: String,
    pub label: String,
}

impl std::fmt::Display for StatusLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.key, self.label)
    }
}

/// What the presenter last read from the tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenterView {
    /// Recorded callbacks, newest first.
    pub methods: Vec<String>,
    /// Current status per key, in the order keys were first seen.
    pub statuses: Vec<StatusLine>,
}

/// Polls an [`EventTracker`] a fixed delay after each change.
///
/// Writers call [`schedule`](StatusPresenter::schedule) when they record
/// something; the render loop calls [`poll`](StatusPresenter::poll) every
/// frame. Refreshes are not synchronized with writes, only delayed.
pub struct StatusPresenter {
    delay: Duration,
    due: Option<Instant>,
    view: PresenterView,
}

impl Default for StatusPresenter {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH)
    }
}

impl StatusPresenter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            due: None,
            view: PresenterView::default(),
        }
    }

    /// Arm a refresh `delay` after `now`. An already armed refresh keeps its deadline.
    pub fn schedule(&mut self, now: Instant) {
        if self.due.is_none() {
            self.due = Some(now + self.delay);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    /// Refresh the view if the armed deadline has passed. Returns `true` on refresh.
    pub fn poll(&mut self, now: Instant, tracker: &EventTracker) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.refresh(tracker);
                true
            }
            _ => false,
        }
    }

    /// Re-read the tracker immediately and disarm any pending refresh.
    pub fn refresh(&mut self, tracker: &EventTracker) {
        self.due = None;

        let snapshot = tracker.snapshot();
        let mut methods = snapshot.log;
        methods.reverse();

        let statuses = snapshot
            .statuses
            .into_iter()
            .map(|(key, raw)| {
                let label = match lifecycle::status_label(&raw) {
                    Ok(label) => label.to_string(),
                    Err(_) => format!("unknown ({})", raw),
                };
                StatusLine { key, label }
            })
            .collect();

        self.view = PresenterView { methods, statuses };
        tracing::trace!(
            methods = self.view.methods.len(),
            statuses = self.view.statuses.len(),
            "presenter refreshed"
        );
    }

    pub fn view(&self) -> &PresenterView {
        &self.view
    }
}
