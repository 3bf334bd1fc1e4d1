//! Pin identifiers and logic levels

use core::ops::Not;

/// Platform pin number
///
/// Interpretation is left to the [`LinkHal`](crate::LinkHal) implementation
/// (GPIO number, ADC channel, ...).
pub type PinId = u8;

/// Logic level of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0 (emitter off)
    Low,
    /// Logic 1 (emitter on)
    High,
}

impl Level {
    /// Check if this is logic 1
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }

    /// Check if this is logic 0
    pub const fn is_low(self) -> bool {
        matches!(self, Level::Low)
    }

    /// Level of bit `bit` of `byte`
    pub const fn of_bit(byte: u8, bit: u8) -> Self {
        if (byte >> bit) & 0x01 != 0 {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> Self {
        level.is_high()
    }
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Self::Output {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// Direction a pin is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Push-pull output driving the emitter
    Output,
    /// Input sampling the receiver
    Input,
}
