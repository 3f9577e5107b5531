//! Platform abstraction layer
//!
//! Handles browser/native differences for input events. Storage lives with
//! the types it persists (`settings`, `stats`).

pub mod input;

pub use input::{ControlScheme, Controls, Key, KeyFrame};
