//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time/ticks
//! - Input events
//!
//! Storage for settings lives in `settings`.

pub mod input;
pub mod time;

pub use input::{InputMapper, Key};
pub use time::FrameClock;
