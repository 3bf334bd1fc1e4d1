//! Light-link transmit/receive engine
//!
//! [`Link`] owns a [`LinkHal`] capability, the pin assignments and the
//! [`LinkConfig`]. Every operation blocks through the capability's sleep
//! primitives; the engine never waits for I/O readiness, it waits a fixed
//! duration and then samples.
//!
//! The operations are split across:
//! - [`transmit`]: bit and byte-string output
//! - [`sample`]: oversampled analog reads and threshold calibration
//! - [`receive`]: start-bit search, byte/message decoding, receive loop

pub mod receive;
pub mod sample;
pub mod transmit;

pub use receive::{LoopStats, DEFAULT_START_TIMEOUT_MS};
pub use sample::{
    calibration_threshold, Calibration, DEFAULT_CALIBRATION_DELAY_US,
    DEFAULT_CALIBRATION_SAMPLES, NARROW_RANGE,
};

use lumen_hal::{Level, LinkHal, PinId, PinMode};

use crate::config::{LinkConfig, LinkSettings};
use crate::state::{RxEvent, RxState};

/// Pin assignments; either side may be absent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkPins {
    /// Output pin driving the emitter
    pub tx: Option<PinId>,
    /// Analog input pin sampling the receiver
    pub rx: Option<PinId>,
}

impl LinkPins {
    /// Assign both pins
    pub const fn new(tx: Option<PinId>, rx: Option<PinId>) -> Self {
        Self { tx, rx }
    }

    /// Transmit-only link
    pub const fn tx_only(tx: PinId) -> Self {
        Self::new(Some(tx), None)
    }

    /// Receive-only link
    pub const fn rx_only(rx: PinId) -> Self {
        Self::new(None, Some(rx))
    }

    /// Full-duplex link
    pub const fn both(tx: PinId, rx: PinId) -> Self {
        Self::new(Some(tx), Some(rx))
    }
}

/// Software-timed serial link over a light channel
pub struct Link<H> {
    hal: H,
    pins: LinkPins,
    config: LinkConfig,
    rx_state: RxState,
}

impl<H: LinkHal> Link<H> {
    /// Create a link
    ///
    /// Configures the transmit pin as an output driven low (emitter off)
    /// and the receive pin as an input. A zero `bit_duration_us` falls back
    /// to the default period.
    pub fn new(mut hal: H, pins: LinkPins, bit_duration_us: u32) -> Self {
        if let Some(tx) = pins.tx {
            hal.configure_pin(tx, PinMode::Output);
            hal.write_digital(tx, Level::Low);
        }
        if let Some(rx) = pins.rx {
            hal.configure_pin(rx, PinMode::Input);
        }

        let config = LinkConfig::new(bit_duration_us);
        debug!(
            "link up: tx={} rx={} bit={}us",
            pins.tx,
            pins.rx,
            config.bit_duration_us()
        );

        let link = Self {
            hal,
            pins,
            config,
            rx_state: RxState::Idle,
        };
        link.check_timing();
        link
    }

    /// Create a link and apply a settings snapshot
    pub fn with_settings(hal: H, pins: LinkPins, settings: &LinkSettings) -> Self {
        let mut link = Self::new(hal, pins, settings.bit_duration_us);
        link.apply_settings(settings);
        link
    }

    /// Give back the hardware capability
    pub fn release(self) -> H {
        self.hal
    }

    /// Borrow the hardware capability
    pub fn hal(&self) -> &H {
        &self.hal
    }

    /// Mutably borrow the hardware capability
    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    /// Pin assignments
    pub fn pins(&self) -> LinkPins {
        self.pins
    }

    /// Current configuration
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// State reached by the most recent receive attempt
    pub fn rx_state(&self) -> RxState {
        self.rx_state
    }

    /// Snapshot of the configurable fields
    pub fn settings(&self) -> LinkSettings {
        self.config.settings()
    }

    /// Apply a settings snapshot (invalid fields are rejected or coerced)
    pub fn apply_settings(&mut self, settings: &LinkSettings) {
        self.config.apply(settings);
        self.check_timing();
    }

    /// Set the bit period; zero is ignored
    pub fn set_bit_duration(&mut self, bit_duration_us: u32) {
        if !self.config.set_bit_duration(bit_duration_us) {
            debug!("ignoring zero bit duration");
            return;
        }
        self.check_timing();
    }

    /// Bit period in microseconds
    pub fn bit_duration_us(&self) -> u32 {
        self.config.bit_duration_us()
    }

    /// Set the analog decision threshold
    pub fn set_threshold(&mut self, threshold: u16) {
        self.config.set_threshold(threshold);
    }

    /// Analog decision threshold
    pub fn threshold(&self) -> u16 {
        self.config.threshold()
    }

    /// Set the samples averaged per bit; zero becomes one
    pub fn set_samples_per_bit(&mut self, samples: u32) {
        self.config.set_samples_per_bit(samples);
        self.check_timing();
    }

    /// Samples averaged per bit
    pub fn samples_per_bit(&self) -> u32 {
        self.config.samples_per_bit()
    }

    /// Set the consecutive lows that confirm a start bit; zero becomes one
    pub fn set_start_confirm_samples(&mut self, samples: u32) {
        self.config.set_start_confirm_samples(samples);
        self.check_timing();
    }

    /// Spacing between oversampled reads
    pub fn sample_spacing_us(&self) -> u32 {
        self.config.sample_spacing_us()
    }

    /// Delay between start-bit polls
    pub fn poll_delay_us(&self) -> u32 {
        self.config.poll_delay_us()
    }

    /// Report receive timing that cannot line reads up with bit centres
    ///
    /// Returns false when an oversampled read is as long as a bit.
    pub fn check_timing(&self) -> bool {
        let confirm = self.config.start_confirm_samples();
        let max_confirm = self.config.max_confirm_samples();
        if confirm > max_confirm {
            debug!(
                "start confirmation of {} samples capped at {}",
                confirm, max_confirm
            );
        }

        if self.config.can_align() {
            return true;
        }

        warn!(
            "{} samples span {}us, not shorter than the {}us bit; reads will straddle bits",
            self.config.samples_per_bit(),
            self.config.sampling_window_us(),
            self.config.bit_duration_us()
        );
        false
    }

    /// Block for `duration_us`
    ///
    /// Waits of a millisecond or more are split into a millisecond sleep
    /// plus the microsecond remainder, keeping the microsecond primitive
    /// within the range platforms handle accurately.
    pub(crate) fn wait_us(&mut self, duration_us: u32) {
        if duration_us == 0 {
            return;
        }

        if duration_us >= 1000 {
            let ms = duration_us / 1000;
            let rem = duration_us % 1000;
            self.hal.sleep_ms(ms);
            if rem > 0 {
                self.hal.sleep_us(rem);
            }
        } else {
            self.hal.sleep_us(duration_us);
        }
    }

    fn advance(&mut self, event: RxEvent) {
        self.rx_state = self.rx_state.transition(event);
    }
}
