//! Interrupt-driven sampling core for the sonde
//!
//! This crate holds the platform-agnostic part of the firmware: the sample
//! buffers filled by the converter interrupts, the period classifiers behind
//! the pin-change interrupt, midnight detection from the real-time clock, and
//! the coordinator that owns them all.
//!
//! It is `#![no_std]` so it compiles on the device and on desktop hosts (for
//! the simulator and tests). Peripherals are reached only through the traits
//! in [`hal`] and `embedded_hal::digital::InputPin`.

#![no_std]

pub mod clock;
pub mod config;
pub mod core_state;
pub mod hal;
pub mod sampling;
pub mod signals;
pub mod storage;

#[cfg(test)]
mod mock;
