//! Terminal rendering for lifespy.
//!
//! Draws the tracker panels and the console overlay with [`ratatui`]. This
//! crate only reads state; [`lifespy_core`] owns it.

pub mod console;
pub mod layout;
pub mod panels;
