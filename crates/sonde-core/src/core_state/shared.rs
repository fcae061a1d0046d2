//! Interrupt-safe home for the sensor core
//!
//! On the device the core lives in a `static` and every interrupt handler
//! reaches it through [`SharedCore::with`], which runs the handler inside a
//! critical section. The main loop uses the same path to drain buffers and
//! clear flags, so a read never observes a half-written update.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::warn;

use super::{Board, CoreSnapshot, SensorCore};

/// Critical-section guarded slot holding the installed [`SensorCore`]
///
/// ```rust,ignore
/// static CORE: SharedCore<DeviceBoard> = SharedCore::new();
///
/// CORE.install(SensorCore::new(peripherals, config)?);
///
/// // pin-change interrupt
/// CORE.with(|core| core.on_pin_change());
/// ```
pub struct SharedCore<B: Board> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Option<SensorCore<B>>>>,
}

impl<B: Board> SharedCore<B> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Put `core` in place, replacing any previous one
    pub fn install(&self, core: SensorCore<B>) {
        self.inner.lock(|cell| {
            if cell.replace(Some(core)).is_some() {
                warn!("sensor core reinstalled");
            }
        });
    }

    pub fn is_installed(&self) -> bool {
        self.inner.lock(|cell| cell.borrow().is_some())
    }

    /// Run `f` against the core inside a critical section.
    ///
    /// Returns `None` if nothing is installed yet; interrupts that fire during
    /// start-up are dropped this way.
    pub fn with<R>(&self, f: impl FnOnce(&mut SensorCore<B>) -> R) -> Option<R> {
        self.inner.lock(|cell| cell.borrow_mut().as_mut().map(f))
    }

    /// Copy every polled output in one critical section
    pub fn snapshot(&self) -> Option<CoreSnapshot> {
        self.with(|core| core.snapshot())
    }

    /// Read and clear the midnight flag
    pub fn take_midnight(&self) -> bool {
        self.with(|core| core.state_mut().take_midnight())
            .unwrap_or(false)
    }

    /// Remove and return the core
    pub fn take(&self) -> Option<SensorCore<B>> {
        self.inner.lock(|cell| cell.borrow_mut().take())
    }
}

impl<B: Board> Default for SharedCore<B> {
    fn default() -> Self {
        Self::new()
    }
}
