//! Core of lifespy: lifecycle event tracking and everything around it.
//!
//! The [`tracker::EventTracker`] is the heart of the crate: an ordered history
//! of lifecycle callbacks plus the last status per component. The rest of the
//! crate feeds it ([`stack`], [`bus`], [`command`]) or reads from it
//! ([`presenter`]), and [`logging`] wires up `tracing` for the whole app.

pub mod bus;
pub mod command;
pub mod console;
pub mod event;
pub mod lifecycle;
pub mod logging;
pub mod presenter;
pub mod stack;
pub mod state;
pub mod tracker;

pub use lifecycle::{LifecycleMethod, UnknownMethod};
pub use presenter::{PresenterView, StatusLine, StatusPresenter};
pub use stack::ActivityStack;
pub use tracker::{EventTracker, LifecycleEvent, StatusError, TrackerSnapshot};
