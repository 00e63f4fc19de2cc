use anyhow::{bail, Result};

use crate::lifecycle::LifecycleMethod;
use crate::tracker::LifecycleEvent;

struct Entry {
    name: String,
    translucent: bool,
    stopped: bool,
}

/// A back stack of activities that emits the callbacks each transition causes.
///
/// The top entry is resumed. Entries below it stay paused while they are
/// still visible through translucent entries above them, and are stopped
/// otherwise. Every operation returns the callbacks in delivery order; the
/// caller decides where to record them.
#[derive(Default)]
pub struct ActivityStack {
    entries: Vec<Entry>,
    launched: usize,
}

impl ActivityStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an opaque activity on top of the stack.
    pub fn launch(&mut self, name: &str) -> Result<Vec<LifecycleEvent>> {
        self.push(name, false)
    }

    /// Start a dialog-style activity; the one below is paused but not stopped.
    pub fn launch_translucent(&mut self, name: &str) -> Result<Vec<LifecycleEvent>> {
        self.push(name, true)
    }

    fn push(&mut self, name: &str, translucent: bool) -> Result<Vec<LifecycleEvent>> {
        let name = name.trim();
        if name.is_empty() {
            bail!("activity name must not be empty");
        }
        if self.contains(name) {
            bail!("activity already on the stack: {}", name);
        }

        let mut events = Vec::new();
        let visible_before = self.visible_from_top();
        if let Some(top) = self.entries.last() {
            events.push(event(&top.name, LifecycleMethod::OnPause));
        }

        self.entries.push(Entry {
            name: name.to_string(),
            translucent,
            stopped: false,
        });
        self.launched += 1;
        for method in [
            LifecycleMethod::OnCreate,
            LifecycleMethod::OnStart,
            LifecycleMethod::OnResume,
        ] {
            events.push(event(name, method));
        }

        // Everything that was visible and is now covered gets stopped, top down.
        let visible_after = self.visible_from_top();
        for idx in visible_before {
            if !visible_after.contains(&idx) {
                let entry = &mut self.entries[idx];
                entry.stopped = true;
                events.push(event(&entry.name, LifecycleMethod::OnStop));
            }
        }

        tracing::info!(activity = name, translucent, "activity launched");
        Ok(events)
    }

    /// Finish the top activity, bringing the one below it back to the front.
    pub fn finish(&mut self) -> Result<Vec<LifecycleEvent>> {
        let Some(finished) = self.entries.pop() else {
            bail!("no activity to finish");
        };

        let mut events = vec![event(&finished.name, LifecycleMethod::OnPause)];

        let visible = self.visible_from_top();
        for (n, idx) in visible.into_iter().enumerate() {
            let entry = &mut self.entries[idx];
            if entry.stopped {
                entry.stopped = false;
                events.push(event(&entry.name, LifecycleMethod::OnRestart));
                events.push(event(&entry.name, LifecycleMethod::OnStart));
            }
            if n == 0 {
                events.push(event(&entry.name, LifecycleMethod::OnResume));
            }
        }

        events.push(event(&finished.name, LifecycleMethod::OnStop));
        events.push(event(&finished.name, LifecycleMethod::OnDestroy));

        tracing::info!(activity = %finished.name, "activity finished");
        Ok(events)
    }

    /// Indices of visible entries, top first, down to the first opaque one.
    fn visible_from_top(&self) -> Vec<usize> {
        let mut visible = Vec::new();
        for idx in (0..self.entries.len()).rev() {
            visible.push(idx);
            if !self.entries[idx].translucent {
                break;
            }
        }
        visible
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn top(&self) -> Option<&str> {
        self.entries.last().map(|e| e.name.as_str())
    }

    /// Activity names from the bottom of the stack to the top.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Suggest a name for the next launch: `Activity A`, `Activity B`, ...
    pub fn next_name(&self) -> String {
        let mut n = self.launched;
        loop {
            let name = format!("Activity {}", letters(n));
            if !self.contains(&name) {
                return name;
            }
            n += 1;
        }
    }
}

fn event(name: &str, method: LifecycleMethod) -> LifecycleEvent {
    LifecycleEvent::new(name, method.method_name())
}

/// Bijective base-26: 0 -> A, 25 -> Z, 26 -> AA.
fn letters(mut n: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calls(events: &[LifecycleEvent]) -> Vec<String> {
        events.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn first_launch_creates_starts_resumes() {
        let mut stack = ActivityStack::new();
        let events = stack.launch("A").unwrap();
        assert_eq!(calls(&events), vec!["A.onCreate()", "A.onStart()", "A.onResume()"]);
        assert_eq!(stack.top(), Some("A"));
    }

    #[test]
    fn launch_over_opaque_stops_previous() {
        let mut stack = ActivityStack::new();
        stack.launch("A").unwrap();
        let events = stack.launch("B").unwrap();
        assert_eq!(
            calls(&events),
            vec![
                "A.onPause()",
                "B.onCreate()",
                "B.onStart()",
                "B.onResume()",
                "A.onStop()",
            ]
        );
        assert_eq!(stack.names(), vec!["A", "B"]);
    }

    #[test]
    fn translucent_launch_only_pauses_previous() {
        let mut stack = ActivityStack::new();
        stack.launch("A").unwrap();
        let events = stack.launch_translucent("Dialog").unwrap();
        assert_eq!(
            calls(&events),
            vec![
                "A.onPause()",
                "Dialog.onCreate()",
                "Dialog.onStart()",
                "Dialog.onResume()",
            ]
        );
    }

    #[test]
    fn finish_restarts_stopped_activity() {
        let mut stack = ActivityStack::new();
        stack.launch("A").unwrap();
        stack.launch("B").unwrap();
        let events = stack.finish().unwrap();
        assert_eq!(
            calls(&events),
            vec![
                "B.onPause()",
                "A.onRestart()",
                "A.onStart()",
                "A.onResume()",
                "B.onStop()",
                "B.onDestroy()",
            ]
        );
        assert_eq!(stack.names(), vec!["A"]);
    }

    #[test]
    fn finish_translucent_only_resumes_previous() {
        let mut stack = ActivityStack::new();
        stack.launch("A").unwrap();
        stack.launch_translucent("Dialog").unwrap();
        let events = stack.finish().unwrap();
        assert_eq!(
            calls(&events),
            vec![
                "Dialog.onPause()",
                "A.onResume()",
                "Dialog.onStop()",
                "Dialog.onDestroy()",
            ]
        );
    }

    #[test]
    fn opaque_over_translucent_stops_everything_visible() {
        let mut stack = ActivityStack::new();
        stack.launch("A").unwrap();
        stack.launch_translucent("D").unwrap();
        let events = stack.launch("C").unwrap();
        assert_eq!(
            calls(&events),
            vec![
                "D.onPause()",
                "C.onCreate()",
                "C.onStart()",
                "C.onResume()",
                "D.onStop()",
                "A.onStop()",
            ]
        );

        let events = stack.finish().unwrap();
        assert_eq!(
            calls(&events),
            vec![
                "C.onPause()",
                "D.onRestart()",
                "D.onStart()",
                "D.onResume()",
                "A.onRestart()",
                "A.onStart()",
                "C.onStop()",
                "C.onDestroy()",
            ]
        );
    }

    #[test]
    fn finishing_last_activity_destroys_it() {
        let mut stack = ActivityStack::new();
        stack.launch("A").unwrap();
        let events = stack.finish().unwrap();
        assert_eq!(calls(&events), vec!["A.onPause()", "A.onStop()", "A.onDestroy()"]);
        assert!(stack.is_empty());
    }

    #[test]
    fn finish_on_empty_is_error() {
        let mut stack = ActivityStack::new();
        let err = stack.finish().unwrap_err();
        assert!(err.to_string().contains("no activity"));
    }

    #[test]
    fn duplicate_and_empty_names_rejected() {
        let mut stack = ActivityStack::new();
        stack.launch("A").unwrap();
        assert!(stack.launch("A").unwrap_err().to_string().contains("already"));
        assert!(stack.launch("  ").is_err());
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn next_name_skips_names_in_use() {
        let mut stack = ActivityStack::new();
        assert_eq!(stack.next_name(), "Activity A");
        stack.launch("Activity B").unwrap();
        // One launch so far, so the next suggestion would be B, which is taken.
        assert_eq!(stack.next_name(), "Activity C");
    }

    #[test]
    fn letters_roll_over() {
        assert_eq!(letters(0), "A");
        assert_eq!(letters(25), "Z");
        assert_eq!(letters(26), "AA");
        assert_eq!(letters(27), "AB");
        assert_eq!(letters(701), "ZZ");
        assert_eq!(letters(702), "AAA");
    }
}
