//! Analog input and clock abstractions
//!
//! Single-purpose traits that adapters combine into a full
//! [`LinkHal`](crate::LinkHal).

/// ADC channel attached to the receiver
pub trait AnalogInput {
    /// Error type for conversions
    type Error;

    /// Read one raw sample (resolution is platform defined, typically 12-bit)
    fn read(&mut self) -> Result<u16, Self::Error>;
}

/// Free-running millisecond clock
pub trait MonotonicClock {
    /// Milliseconds since an arbitrary epoch, wrapping at `u32::MAX`
    fn now_ms(&self) -> u32;
}

impl<F: Fn() -> u32> MonotonicClock for F {
    fn now_ms(&self) -> u32 {
        self()
    }
}
