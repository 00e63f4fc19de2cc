use std::time::Instant;

use crate::tracker::LifecycleEvent;

#[derive(Debug, Clone)]
pub enum Event {
    Tick { now: Instant },
    /// A component reported a lifecycle callback.
    Lifecycle(LifecycleEvent),
    Quit,
}
