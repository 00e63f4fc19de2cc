use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use tracing_appender::rolling;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "lifespy.log";
const SECS_PER_DAY: u64 = 86_400;

/// Log severity level (mirrors tracing levels for UI use).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        // `pad` so width specifiers like `{:5}` apply.
        f.pad(s)
    }
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => LogLevel::Trace,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::ERROR => LogLevel::Error,
        }
    }
}

/// A single line shown in the console overlay.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub target: String,
    pub message: String,
}

/// Shared ring buffer filled by the tracing layer and drained by the console.
pub type LogBuffer = Arc<Mutex<VecDeque<LogEntry>>>;

/// Empty buffer; the console layer bounds it as it pushes.
pub fn new_log_buffer() -> LogBuffer {
    Arc::new(Mutex::new(VecDeque::new()))
}

/// Settings for [`init`], usually filled from the `[logging]` config section.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Filter used when neither `LIFESPY_LOG` nor `RUST_LOG` is set.
    pub default_filter: String,
    /// Directory override; `LIFESPY_LOG_DIR` still wins.
    pub dir: Option<PathBuf>,
    pub retention_days: u64,
    pub console_lines: usize,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
            dir: None,
            retention_days: 7,
            console_lines: 1000,
        }
    }
}

/// Resolve the log directory.
///
/// Precedence: `LIFESPY_LOG_DIR` env var > `configured` > platform data dir.
pub fn log_dir(configured: Option<&Path>) -> PathBuf {
    if let Ok(dir) = std::env::var("LIFESPY_LOG_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(dir) = configured {
        return dir.to_path_buf();
    }
    match dirs::data_dir() {
        Some(data) => data.join("lifespy").join("logs"),
        None => PathBuf::from("logs"),
    }
}

/// Age past which rolled files are deleted. Saturates instead of overflowing.
fn retention(days: u64) -> Duration {
    Duration::from_secs(days.saturating_mul(SECS_PER_DAY))
}

/// Delete rolled log files older than `max_age`. Other files are left alone.
fn cleanup_old_logs(dir: &Path, max_age: Duration) {
    let Some(cutoff) = SystemTime::now().checked_sub(max_age) else {
        return;
    };
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        if !entry.file_name().to_string_lossy().starts_with(LOG_FILE_PREFIX) {
            continue;
        }
        let modified = entry.metadata().and_then(|m| m.modified());
        if matches!(modified, Ok(t) if t < cutoff) {
            let _ = std::fs::remove_file(entry.path());
        }
    }
}

/// Pushes every event into a [`LogBuffer`], dropping the oldest when full.
struct ConsoleLayer {
    buffer: LogBuffer,
    max_lines: usize,
}

impl<S: tracing::Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let entry = LogEntry {
            level: (*event.metadata().level()).into(),
            target: event.metadata().target().to_string(),
            message: visitor.finish(),
        };

        if let Ok(mut buf) = self.buffer.lock() {
            if buf.len() >= self.max_lines {
                buf.pop_front();
            }
            buf.push_back(entry);
        }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message, self.fields.is_empty()) {
            (Some(msg), true) => msg,
            (Some(msg), false) => format!("{} {}", msg, self.fields.join(" ")),
            (None, _) => self.fields.join(" "),
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }
}

/// Install the global subscriber. Returns the buffer the console drains.
///
/// Filter: `LIFESPY_LOG`, then `RUST_LOG`, then `options.default_filter`.
/// Files roll daily in [`log_dir`]; files past retention are removed first.
pub fn init(options: &LogOptions) -> LogBuffer {
    let buffer = new_log_buffer();

    let filter = EnvFilter::try_from_env("LIFESPY_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .or_else(|_| EnvFilter::try_new(&options.default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let dir = log_dir(options.dir.as_deref());
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("warning: failed to create log directory {:?}: {}", dir, e);
    }
    cleanup_old_logs(&dir, retention(options.retention_days));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(rolling::daily(&dir, LOG_FILE_PREFIX))
        .with_ansi(false)
        .with_target(true);

    let console_layer = ConsoleLayer {
        buffer: buffer.clone(),
        max_lines: options.console_lines,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    buffer
}
