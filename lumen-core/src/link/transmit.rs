//! Transmit engine
//!
//! Bit-banged output: the emitter is set to each frame level and held for
//! one bit period. Pacing is owned entirely by these calls; N bytes take
//! roughly N × 11 bit periods.

use lumen_hal::{Level, LinkHal};
use lumen_protocol::{frame, IDLE_LEVEL};

use super::Link;

impl<H: LinkHal> Link<H> {
    /// Drive one bit and hold it for a bit period
    ///
    /// No-op without a transmit pin.
    pub fn send_bit(&mut self, level: Level) {
        let Some(tx) = self.pins.tx else {
            return;
        };

        self.hal.write_digital(tx, level);
        self.wait_us(self.config.bit_duration_us());
    }

    /// Send a byte string, one frame per byte
    ///
    /// Each frame is followed by a one-bit gap, and the line is left idle
    /// (high) after the last byte. No-op without a transmit pin.
    pub fn send(&mut self, bytes: &[u8]) {
        if self.pins.tx.is_none() {
            return;
        }

        trace!("tx {} bytes", bytes.len());

        for &byte in bytes {
            for level in frame::encode(byte) {
                self.send_bit(level);
            }

            // Inter-character gap
            self.wait_us(self.config.bit_duration_us());
        }

        self.send_bit(IDLE_LEVEL);
    }

    /// Send UTF-8 text
    pub fn send_str(&mut self, text: &str) {
        self.send(text.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::LinkPins;
    use lumen_hal::sim::SimLink;
    use lumen_protocol::{FRAME_BITS, FRAME_PERIODS};

    fn tx_link(bit_us: u32) -> Link<SimLink> {
        Link::new(SimLink::new(), LinkPins::tx_only(2), bit_us)
    }

    #[test]
    fn test_send_bit_holds_one_period() {
        let mut link = tx_link(1000);
        link.send_bit(Level::High);

        assert_eq!(link.hal().now_us(), 1000);
        assert_eq!(link.hal().output().final_level(), Level::High);
    }

    #[test]
    fn test_send_single_char() {
        let mut link = tx_link(1000);
        let writes_before = link.hal().digital_writes();

        link.send(b"A");
        let sim = link.release();

        // start + 8 data + stop + final idle bit
        assert_eq!(sim.digital_writes() - writes_before, 11);
        // 10 frame bits, 1 gap, 1 idle bit
        assert_eq!(sim.now_us(), 12_000);
        assert_eq!(sim.output().final_level(), Level::High);
    }

    #[test]
    fn test_send_waveform_layout() {
        let mut link = tx_link(1000);
        link.send(&[0x01]);
        let output = link.release();
        let waveform = output.output();

        // Sample the middle of each bit period
        let level = |bit: u64| waveform.level_at(bit * 1000 + 500);

        assert_eq!(level(0), Level::Low); // start
        assert_eq!(level(1), Level::High); // bit 0
        for bit in 2..=8 {
            assert_eq!(level(bit), Level::Low);
        }
        assert_eq!(level(9), Level::High); // stop
        assert_eq!(level(10), Level::High); // gap
        assert_eq!(level(11), Level::High); // idle
    }

    #[test]
    fn test_send_duration_scales_with_length() {
        let mut link = tx_link(500);
        link.send(b"hello");

        let frame_time = (FRAME_PERIODS as u64) * 500;
        assert_eq!(link.hal().now_us(), 5 * frame_time + 500);
        assert_eq!(
            link.hal().digital_writes() as usize,
            1 + 5 * FRAME_BITS + 1
        );
    }

    #[test]
    fn test_send_without_tx_pin_is_noop() {
        let mut link = Link::new(SimLink::new(), LinkPins::rx_only(26), 1000);
        link.send(b"ignored");
        link.send_bit(Level::High);

        assert_eq!(link.hal().digital_writes(), 0);
        assert_eq!(link.hal().now_us(), 0);
    }

    #[test]
    fn test_send_empty_leaves_line_idle() {
        let mut link = tx_link(1000);
        link.send(b"");

        assert_eq!(link.hal().now_us(), 1000);
        assert_eq!(link.hal().output().final_level(), IDLE_LEVEL);
    }
}
