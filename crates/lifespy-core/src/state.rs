use std::time::Instant;

use crate::stack::ActivityStack;

pub struct AppState {
    pub started_at: Instant,
    pub status_line: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            status_line: "NO ACTIVITY".to_string(),
        }
    }

    /// Point the top bar at whatever is now in front.
    pub fn sync_with(&mut self, stack: &ActivityStack) {
        self.status_line = match stack.top() {
            Some(top) => format!("FRONT: {} ({} on stack)", top, stack.len()),
            None => "NO ACTIVITY".to_string(),
        };
    }
}
