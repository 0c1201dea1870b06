//! Platform abstraction layer
//!
//! Everything that differs between a windowed front end, a terminal and a
//! test harness:
//! - Input events, reduced to game commands
//! - Frame pacing

pub mod clock;
pub mod input;

pub use clock::{FrameClock, SleepClock, UnpacedClock};
pub use input::{Command, InputEvent, InputSource, InputState, ScriptedInput};
