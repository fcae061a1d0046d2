//! Fixed-capacity sample storage filled from interrupt context

pub mod sample_buffer;

pub use sample_buffer::*;
