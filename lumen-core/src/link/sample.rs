//! Analog sampling and threshold calibration

use lumen_hal::{Level, LinkHal};

use super::Link;

/// Spread below which the channel is treated as static during calibration
pub const NARROW_RANGE: u16 = 10;

/// Samples taken by [`Link::auto_calibrate_default`]
pub const DEFAULT_CALIBRATION_SAMPLES: usize = 250;

/// Spacing between calibration samples in microseconds
pub const DEFAULT_CALIBRATION_DELAY_US: u32 = 500;

/// Result of a calibration run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// Lowest sample observed
    pub min: u16,
    /// Highest sample observed
    pub max: u16,
    /// Threshold that was applied
    pub threshold: u16,
}

impl Calibration {
    /// Difference between the highest and lowest sample
    pub fn spread(&self) -> u16 {
        self.max.saturating_sub(self.min)
    }
}

/// Decision threshold for an observed sample range
///
/// A narrow range means nothing was transmitted during calibration, so the
/// floor is used and any rise above ambient decodes high. Otherwise the
/// midpoint.
pub fn calibration_threshold(min: u16, max: u16) -> u16 {
    if max.saturating_sub(min) < NARROW_RANGE {
        min
    } else {
        ((u32::from(min) + u32::from(max)) / 2) as u16
    }
}

impl<H: LinkHal> Link<H> {
    /// Read the receiver, averaging `samples_per_bit` reads
    ///
    /// Returns 0 without a receive pin.
    pub fn sample_analog(&mut self) -> u16 {
        let Some(rx) = self.pins.rx else {
            return 0;
        };

        let samples = self.config.samples_per_bit();
        if samples <= 1 {
            return self.hal.read_analog(rx);
        }

        let mut sum: u64 = 0;
        for i in 0..samples {
            sum += u64::from(self.hal.read_analog(rx));
            if i + 1 < samples {
                self.wait_us(self.config.sample_spacing_us());
            }
        }

        (sum / u64::from(samples)) as u16
    }

    /// Sample the receiver and decide its logic level
    ///
    /// Strictly above the threshold is high.
    pub fn sample_level(&mut self) -> Level {
        let value = self.sample_analog();
        self.decide(value)
    }

    /// Decide the receiver level from a single conversion
    ///
    /// Used to poll for start bits, where an averaged read would smear the
    /// edge over the whole sampling window. Low without a receive pin.
    pub fn sample_level_once(&mut self) -> Level {
        match self.pins.rx {
            Some(rx) => {
                let value = self.hal.read_analog(rx);
                self.decide(value)
            }
            None => Level::Low,
        }
    }

    fn decide(&self, value: u16) -> Level {
        Level::from(value > self.config.threshold())
    }

    /// Derive the threshold from the observed light range
    ///
    /// Takes `sample_count` samples `sample_delay_us` apart and sets the
    /// threshold with [`calibration_threshold`]. Returns `None` (leaving the
    /// threshold untouched) without a receive pin or when `sample_count` is
    /// zero. Re-run whenever ambient light or alignment changes.
    pub fn auto_calibrate(&mut self, sample_count: usize, sample_delay_us: u32) -> Option<Calibration> {
        if self.pins.rx.is_none() || sample_count == 0 {
            return None;
        }

        let mut min = u16::MAX;
        let mut max = 0;

        for i in 0..sample_count {
            let value = self.sample_analog();
            min = min.min(value);
            max = max.max(value);

            if i + 1 < sample_count {
                self.wait_us(sample_delay_us);
            }
        }

        let threshold = calibration_threshold(min, max);
        self.config.set_threshold(threshold);

        info!("calibrated: min={} max={} threshold={}", min, max, threshold);

        Some(Calibration { min, max, threshold })
    }

    /// Calibrate with the default sample count and spacing
    pub fn auto_calibrate_default(&mut self) -> Option<Calibration> {
        self.auto_calibrate(DEFAULT_CALIBRATION_SAMPLES, DEFAULT_CALIBRATION_DELAY_US)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::LinkPins;
    use lumen_hal::sim::SimLink;

    fn rx_link(sim: SimLink, samples_per_bit: u32) -> Link<SimLink> {
        let mut link = Link::new(sim, LinkPins::rx_only(26), 1000);
        link.set_samples_per_bit(samples_per_bit);
        link
    }

    #[test]
    fn test_single_sample_is_raw() {
        let mut link = rx_link(SimLink::with_script(&[1234, 9]), 1);

        assert_eq!(link.sample_analog(), 1234);
        assert_eq!(link.hal().analog_reads(), 1);
        assert_eq!(link.hal().now_us(), 0);
    }

    #[test]
    fn test_oversample_truncated_mean() {
        let mut link = rx_link(SimLink::with_script(&[10, 20, 30, 41]), 4);
        let spacing = link.sample_spacing_us();

        // (10 + 20 + 30 + 41) / 4 = 25.25
        assert_eq!(link.sample_analog(), 25);
        assert_eq!(link.hal().analog_reads(), 4);
        // No wait after the last read
        assert_eq!(link.hal().now_us(), 3 * u64::from(spacing));
    }

    #[test]
    fn test_oversample_does_not_overflow() {
        let mut link = rx_link(SimLink::with_constant(u16::MAX), 8);
        assert_eq!(link.sample_analog(), u16::MAX);
    }

    #[test]
    fn test_sample_without_rx_pin() {
        let mut link = Link::new(SimLink::with_constant(4000), LinkPins::tx_only(2), 1000);

        assert_eq!(link.sample_analog(), 0);
        assert_eq!(link.hal().analog_reads(), 0);
    }

    #[test]
    fn test_sample_level_threshold_is_low() {
        let mut link = rx_link(SimLink::with_script(&[100, 101]), 1);
        link.set_threshold(100);

        assert_eq!(link.sample_level(), Level::Low);
        assert_eq!(link.sample_level(), Level::High);
    }

    #[test]
    fn test_sample_level_once_skips_oversampling() {
        let mut link = rx_link(SimLink::with_script(&[3000, 100]), 8);

        assert_eq!(link.sample_level_once(), Level::High);
        assert_eq!(link.sample_level_once(), Level::Low);
        assert_eq!(link.hal().analog_reads(), 2);
        assert_eq!(link.hal().now_us(), 0);
    }

    #[test]
    fn test_spread_of_inverted_range_saturates() {
        let cal = Calibration {
            min: 600,
            max: 500,
            threshold: 550,
        };
        assert_eq!(cal.spread(), 0);
    }

    #[test]
    fn test_calibration_threshold_boundary() {
        assert_eq!(calibration_threshold(100, 109), 100);
        assert_eq!(calibration_threshold(100, 110), 105);
        assert_eq!(calibration_threshold(u16::MAX - 20, u16::MAX), u16::MAX - 10);
        assert_eq!(calibration_threshold(7, 7), 7);
    }

    #[test]
    fn test_calibrate_narrow_spread_uses_min() {
        let mut link = rx_link(SimLink::with_script(&[500, 509, 503]), 1);
        let cal = link.auto_calibrate(6, 100);

        assert_eq!(
            cal,
            Some(Calibration {
                min: 500,
                max: 509,
                threshold: 500
            })
        );
        assert_eq!(link.threshold(), 500);
    }

    #[test]
    fn test_calibrate_wide_spread_uses_midpoint() {
        let mut link = rx_link(SimLink::with_script(&[500, 510]), 1);
        let cal = link.auto_calibrate(2, 100);

        assert_eq!(cal.map(|c| c.spread()), Some(10));
        assert_eq!(link.threshold(), 505);
    }

    #[test]
    fn test_calibrate_waits_between_samples_only() {
        let mut link = rx_link(SimLink::with_constant(800), 1);
        link.auto_calibrate(5, 300);

        assert_eq!(link.hal().analog_reads(), 5);
        assert_eq!(link.hal().now_us(), 4 * 300);
    }

    #[test]
    fn test_calibrate_idempotent_on_static_channel() {
        let mut link = rx_link(SimLink::with_constant(1800), 8);

        let first = link.auto_calibrate(20, 50);
        let second = link.auto_calibrate(20, 50);

        assert_eq!(first, second);
        assert_eq!(link.threshold(), 1800);
    }

    #[test]
    fn test_calibrate_noop_cases() {
        let mut link = rx_link(SimLink::with_constant(10), 1);
        assert_eq!(link.auto_calibrate(0, 500), None);
        assert_eq!(link.threshold(), 2048);
        assert_eq!(link.hal().analog_reads(), 0);

        let mut link = Link::new(SimLink::with_constant(10), LinkPins::tx_only(2), 1000);
        assert_eq!(link.auto_calibrate_default(), None);
        assert_eq!(link.threshold(), 2048);
    }

    #[test]
    fn test_calibrate_default_timing() {
        let mut link = rx_link(SimLink::with_constant(10), 1);
        link.auto_calibrate_default();

        assert_eq!(link.hal().analog_reads() as usize, DEFAULT_CALIBRATION_SAMPLES);
        assert_eq!(
            link.hal().now_us(),
            (DEFAULT_CALIBRATION_SAMPLES as u64 - 1) * u64::from(DEFAULT_CALIBRATION_DELAY_US)
        );
    }
}
