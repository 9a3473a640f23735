//! Human-readable renderings of converted flowcharts.

pub mod outline;

pub use outline::{Outline, outline};
