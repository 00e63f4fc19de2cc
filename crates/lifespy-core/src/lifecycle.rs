use std::fmt;
use std::str::FromStr;

/// A lifecycle callback with a known display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleMethod {
    OnCreate,
    OnStart,
    OnRestart,
    OnResume,
    OnPause,
    OnStop,
    OnDestroy,
}

/// Raw callback name to display label, one row per [`LifecycleMethod`].
const TABLE: [(LifecycleMethod, &str, &str); 7] = [
    (LifecycleMethod::OnCreate, "onCreate", "created"),
    (LifecycleMethod::OnStart, "onStart", "started"),
    (LifecycleMethod::OnRestart, "onRestart", "restarted"),
    (LifecycleMethod::OnResume, "onResume", "resumed"),
    (LifecycleMethod::OnPause, "onPause", "paused"),
    (LifecycleMethod::OnStop, "onStop", "stopped"),
    (LifecycleMethod::OnDestroy, "onDestroy", "destroyed"),
];

impl LifecycleMethod {
    pub const ALL: [LifecycleMethod; 7] = [
        LifecycleMethod::OnCreate,
        LifecycleMethod::OnStart,
        LifecycleMethod::OnRestart,
        LifecycleMethod::OnResume,
        LifecycleMethod::OnPause,
        LifecycleMethod::OnStop,
        LifecycleMethod::OnDestroy,
    ];

    fn row(self) -> (LifecycleMethod, &'static str, &'static str) {
        TABLE[self as usize]
    }

    /// Callback name as reported by the component, e.g. `"onPause"`.
    pub fn method_name(self) -> &'static str {
        self.row().1
    }

    /// Past-tense status shown for a component whose last callback was this one.
    pub fn status_label(self) -> &'static str {
        self.row().2
    }
}

impl fmt::Display for LifecycleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

/// Returned when a raw callback name has no entry in the label table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown lifecycle method: {}", self.0)
    }
}

impl std::error::Error for UnknownMethod {}

impl FromStr for LifecycleMethod {
    type Err = UnknownMethod;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        TABLE
            .iter()
            .find(|(_, name, _)| *name == raw)
            .map(|(method, _, _)| *method)
            .ok_or_else(|| UnknownMethod(raw.to_string()))
    }
}

/// Map a raw callback name straight to its display label.
pub fn status_label(raw: &str) -> Result<&'static str, UnknownMethod> {
    raw.parse::<LifecycleMethod>().map(LifecycleMethod::status_label)
}
