use std::collections::VecDeque;

use crate::event::Event;
use crate::tracker::LifecycleEvent;

/// A simple FIFO event queue.
///
/// The app loop uses the bus in a three-phase cycle:
/// 1. **Publish**: input polling, timers and commands push events.
/// 2. **Drain**: all pending events are pulled out in order.
/// 3. **Dispatch**: lifecycle events go to the tracker, the rest to the loop.
pub struct EventBus {
    queue: VecDeque<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Enqueue an event at the back of the queue.
    pub fn publish(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Enqueue a batch of lifecycle callbacks, keeping their order.
    pub fn publish_lifecycle(&mut self, events: Vec<LifecycleEvent>) {
        self.queue.extend(events.into_iter().map(Event::Lifecycle));
    }

    /// Remove and return all pending events, preserving insertion order.
    pub fn drain(&mut self) -> Vec<Event> {
        self.queue.drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
