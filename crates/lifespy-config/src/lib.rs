//! Configuration types and loaders for lifespy.
//!
//! This crate owns the `lifespy.toml` schema so the app and its libraries
//! share a single source of truth for defaults and validation.

pub mod settings;

pub use settings::{LoggingSettings, PresenterSettings, SessionSettings, Settings, TrackerSettings};
