//! Fade strategy decision pipeline

pub mod engine;
pub mod flow;
pub mod impact;
pub mod signal;
pub mod sizing;

pub use engine::{Clock, FadeEngine, SystemClock};
pub use signal::{PositionStatus, Signal};
