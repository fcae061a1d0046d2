//! Analog sampling on the shared converter
//!
//! The accelerometer axes are converted synchronously on the fast tick so
//! both land within one tight window. Battery and depth are started from slow
//! ticks and finish in the converter's completion interrupt.

pub mod axes;
pub mod triggers;

pub use axes::*;
pub use triggers::*;
