//! Link configuration and timing derivation
//!
//! Holds the bit duration, decision threshold and oversampling count, and
//! keeps the derived sample spacing and poll delay consistent with them.
//! Every setter that changes a timing input recomputes the derived values
//! before returning.

use super::settings::LinkSettings;

/// Default bit period (1 kHz signalling)
pub const DEFAULT_BIT_DURATION_US: u32 = 1000;

/// Default decision threshold (mid-scale of a 12-bit ADC)
pub const DEFAULT_THRESHOLD: u16 = 2048;

/// Default number of analog samples averaged per bit
pub const DEFAULT_SAMPLES_PER_BIT: u32 = 8;

/// Default run of consecutive low samples that confirms a start bit
pub const DEFAULT_START_CONFIRM_SAMPLES: u32 = 3;

/// Floor for the spacing between oversampled reads
pub const MIN_SAMPLE_SPACING_US: u32 = 5;

/// Floor for the delay between start-bit polls
pub const MIN_POLL_DELAY_US: u32 = 50;

/// Slack added to the per-byte timeout of the receive loop
pub const LOOP_TIMEOUT_SLACK_MS: u32 = 2;

/// Spacing between oversampled reads for a bit period
pub const fn sample_spacing_for(bit_duration_us: u32, samples_per_bit: u32) -> u32 {
    let spacing = bit_duration_us / samples_per_bit.saturating_add(1);
    if spacing < MIN_SAMPLE_SPACING_US {
        MIN_SAMPLE_SPACING_US
    } else {
        spacing
    }
}

/// Delay between start-bit polls for a bit period
pub const fn poll_delay_for(bit_duration_us: u32) -> u32 {
    let delay = bit_duration_us / 4;
    if delay < MIN_POLL_DELAY_US {
        MIN_POLL_DELAY_US
    } else {
        delay
    }
}

/// Live link configuration with derived timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    bit_duration_us: u32,
    threshold: u16,
    samples_per_bit: u32,
    start_confirm_samples: u32,
    sample_spacing_us: u32,
    poll_delay_us: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BIT_DURATION_US)
    }
}

impl LinkConfig {
    /// Create a configuration for the given bit period
    ///
    /// A zero bit period falls back to [`DEFAULT_BIT_DURATION_US`].
    pub fn new(bit_duration_us: u32) -> Self {
        let bit_duration_us = if bit_duration_us == 0 {
            DEFAULT_BIT_DURATION_US
        } else {
            bit_duration_us
        };

        let mut config = Self {
            bit_duration_us,
            threshold: DEFAULT_THRESHOLD,
            samples_per_bit: DEFAULT_SAMPLES_PER_BIT,
            start_confirm_samples: DEFAULT_START_CONFIRM_SAMPLES,
            sample_spacing_us: MIN_SAMPLE_SPACING_US,
            poll_delay_us: MIN_POLL_DELAY_US,
        };
        config.update_timing();
        config
    }

    /// Create a configuration from a settings snapshot
    pub fn from_settings(settings: &LinkSettings) -> Self {
        let mut config = Self::new(settings.bit_duration_us);
        config.apply(settings);
        config
    }

    fn update_timing(&mut self) {
        self.sample_spacing_us = sample_spacing_for(self.bit_duration_us, self.samples_per_bit);
        self.poll_delay_us = poll_delay_for(self.bit_duration_us);
    }

    /// Set the bit period
    ///
    /// Zero is rejected and leaves the configuration unchanged.
    /// Returns true if the new period was applied.
    pub fn set_bit_duration(&mut self, bit_duration_us: u32) -> bool {
        if bit_duration_us == 0 {
            return false;
        }
        self.bit_duration_us = bit_duration_us;
        self.update_timing();
        true
    }

    /// Set the number of analog samples averaged per bit (0 becomes 1)
    pub fn set_samples_per_bit(&mut self, samples: u32) {
        self.samples_per_bit = samples.max(1);
        self.update_timing();
    }

    /// Set the decision threshold
    pub fn set_threshold(&mut self, threshold: u16) {
        self.threshold = threshold;
    }

    /// Set the consecutive low samples that confirm a start bit (0 becomes 1)
    ///
    /// Only applies to start-bit searches with a timeout; a single-shot
    /// poll always decides on one sample.
    pub fn set_start_confirm_samples(&mut self, samples: u32) {
        self.start_confirm_samples = samples.max(1);
    }

    /// Apply every field of a settings snapshot through the setters
    pub fn apply(&mut self, settings: &LinkSettings) {
        self.set_bit_duration(settings.bit_duration_us);
        self.set_samples_per_bit(settings.samples_per_bit);
        self.set_threshold(settings.threshold);
        self.set_start_confirm_samples(settings.start_confirm_samples);
    }

    /// Snapshot of the configurable fields
    pub fn settings(&self) -> LinkSettings {
        LinkSettings {
            bit_duration_us: self.bit_duration_us,
            threshold: self.threshold,
            samples_per_bit: self.samples_per_bit,
            start_confirm_samples: self.start_confirm_samples,
        }
    }

    /// Bit period in microseconds
    pub fn bit_duration_us(&self) -> u32 {
        self.bit_duration_us
    }

    /// Half a bit period in microseconds
    pub fn half_bit_us(&self) -> u32 {
        self.bit_duration_us / 2
    }

    /// Decision threshold
    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Analog samples averaged per bit
    pub fn samples_per_bit(&self) -> u32 {
        self.samples_per_bit
    }

    /// Consecutive low samples that confirm a start bit
    pub fn start_confirm_samples(&self) -> u32 {
        self.start_confirm_samples
    }

    /// Spacing between oversampled reads
    pub fn sample_spacing_us(&self) -> u32 {
        self.sample_spacing_us
    }

    /// Delay between start-bit polls
    pub fn poll_delay_us(&self) -> u32 {
        self.poll_delay_us
    }

    /// Time one oversampled read spans, from first to last conversion
    pub fn sampling_window_us(&self) -> u32 {
        self.samples_per_bit
            .saturating_sub(1)
            .saturating_mul(self.sample_spacing_us)
    }

    /// How far ahead of a bit centre an oversampled read starts
    ///
    /// Centring the read window on the bit centre keeps every conversion
    /// inside the bit.
    pub fn read_lead_us(&self) -> u32 {
        self.sampling_window_us() / 2
    }

    /// Wait between the end of one bit read and the start of the next
    ///
    /// Keeps read starts exactly one bit period apart.
    pub fn bit_wait_us(&self) -> u32 {
        self.bit_duration_us.saturating_sub(self.sampling_window_us())
    }

    /// Longest confirmation run that still ends inside the start bit
    ///
    /// Start-bit polls are single conversions `poll_delay_us` apart; the run
    /// must finish within half a bit of the first low poll.
    pub fn max_confirm_samples(&self) -> u32 {
        1 + self.half_bit_us() / self.poll_delay_us.max(1)
    }

    /// Confirmation run used for a start-bit search with `timeout_ms`
    ///
    /// A single-shot poll (`timeout_ms == 0`) decides on one sample.
    pub fn confirm_samples_for(&self, timeout_ms: u32) -> u32 {
        if timeout_ms == 0 {
            1
        } else {
            self.start_confirm_samples.min(self.max_confirm_samples())
        }
    }

    /// Time from the first confirming poll to the last
    pub fn confirm_lag_us(&self, confirm_samples: u32) -> u32 {
        confirm_samples
            .saturating_sub(1)
            .saturating_mul(self.poll_delay_us)
    }

    /// Wait after start-bit confirmation that lines up the start-bit read
    ///
    /// The target is the start bit's centre less [`read_lead_us`](Self::read_lead_us),
    /// measured from the first low poll. Zero when the confirmation run
    /// already went past it.
    pub fn start_alignment_us(&self, confirm_samples: u32) -> u32 {
        let target = self.half_bit_us().saturating_sub(self.read_lead_us());
        target.saturating_sub(self.confirm_lag_us(confirm_samples))
    }

    /// How far past the start-bit read target a confirmation run ends
    ///
    /// Taken off the wait before the first data bit.
    pub fn start_overshoot_us(&self, confirm_samples: u32) -> u32 {
        let target = self.half_bit_us().saturating_sub(self.read_lead_us());
        self.confirm_lag_us(confirm_samples).saturating_sub(target)
    }

    /// Check if one oversampled read fits inside a bit period
    ///
    /// When it does not, neighbouring bits bleed into every read and
    /// decoding is unreliable.
    pub fn can_align(&self) -> bool {
        self.sampling_window_us() < self.bit_duration_us
    }

    /// Start-bit timeout used by each iteration of the receive loop
    pub fn loop_timeout_ms(&self) -> u32 {
        self.bit_duration_us / 1000 + LOOP_TIMEOUT_SLACK_MS
    }
}
