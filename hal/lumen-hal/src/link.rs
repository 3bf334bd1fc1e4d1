//! Link capability trait
//!
//! The complete set of platform services the light-link engine needs:
//! pin-indexed digital and analog I/O, blocking delays and a monotonic
//! millisecond clock.

use crate::gpio::{Level, PinId, PinMode};

/// Hardware capability surface for a software-timed link
///
/// Implementations are injected into the engine at construction. None of
/// the operations can fail from the engine's point of view; adapters over
/// fallible drivers are expected to log and absorb errors.
pub trait LinkHal {
    /// Configure a pin's direction
    ///
    /// Called once per assigned pin when the engine is constructed.
    /// Platforms whose pins are configured by type can leave this as a no-op.
    fn configure_pin(&mut self, pin: PinId, mode: PinMode) {
        let _ = (pin, mode);
    }

    /// Drive an output pin
    ///
    /// Must take effect before the call returns.
    fn write_digital(&mut self, pin: PinId, level: Level);

    /// Read a pin's logic level
    fn read_digital(&mut self, pin: PinId) -> Level;

    /// Read one raw analog sample from a pin
    fn read_analog(&mut self, pin: PinId) -> u16;

    /// Block for at least `ms` milliseconds
    fn sleep_ms(&mut self, ms: u32);

    /// Block for at least `us` microseconds
    fn sleep_us(&mut self, us: u32);

    /// Monotonic millisecond counter
    ///
    /// May wrap; callers compare timestamps with `wrapping_sub`.
    fn now_ms(&self) -> u32;
}

impl<T: LinkHal + ?Sized> LinkHal for &mut T {
    fn configure_pin(&mut self, pin: PinId, mode: PinMode) {
        (**self).configure_pin(pin, mode)
    }

    fn write_digital(&mut self, pin: PinId, level: Level) {
        (**self).write_digital(pin, level)
    }

    fn read_digital(&mut self, pin: PinId) -> Level {
        (**self).read_digital(pin)
    }

    fn read_analog(&mut self, pin: PinId) -> u16 {
        (**self).read_analog(pin)
    }

    fn sleep_ms(&mut self, ms: u32) {
        (**self).sleep_ms(ms)
    }

    fn sleep_us(&mut self, us: u32) {
        (**self).sleep_us(us)
    }

    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}
