//! Byte frame encoding and decoding.
//!
//! Frame format (one line level per bit period):
//! - START (1 bit): always low
//! - DATA (8 bits): least-significant bit first
//! - STOP (1 bit): always high
//!
//! The transmitter follows every frame with one idle bit period, and
//! leaves the line high once a transmission is complete.

use lumen_hal::Level;

/// Number of data bits per frame
pub const DATA_BITS: usize = 8;

/// Bits in a frame (START + DATA + STOP)
pub const FRAME_BITS: usize = 1 + DATA_BITS + 1;

/// Bit periods a transmitted byte occupies, including the inter-character gap
pub const FRAME_PERIODS: usize = FRAME_BITS + 1;

/// Level of the start bit
pub const START_LEVEL: Level = Level::Low;

/// Level of the stop bit
pub const STOP_LEVEL: Level = Level::High;

/// Level of a line at rest
pub const IDLE_LEVEL: Level = Level::High;

/// Errors that can occur during frame decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Stop bit read low; the frame is out of sync and its data is discarded
    StopBitLow,
}

/// Line levels of one byte frame, in transmission order
#[derive(Debug, Clone)]
pub struct FrameBits {
    byte: u8,
    index: usize,
}

impl FrameBits {
    /// Frame the given byte
    pub fn new(byte: u8) -> Self {
        Self { byte, index: 0 }
    }
}

impl Iterator for FrameBits {
    type Item = Level;

    fn next(&mut self) -> Option<Level> {
        let level = match self.index {
            0 => START_LEVEL,
            i if i <= DATA_BITS => Level::of_bit(self.byte, (i - 1) as u8),
            i if i == FRAME_BITS - 1 => STOP_LEVEL,
            _ => return None,
        };
        self.index += 1;
        Some(level)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = FRAME_BITS.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FrameBits {}

/// Frame a byte into its line levels
pub fn encode(byte: u8) -> FrameBits {
    FrameBits::new(byte)
}

/// State machine for decoding sampled line levels into bytes
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: DecodeState,
    value: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Waiting for a start bit; idle highs are ignored
    WaitingForStart,
    /// Reading data bit N (0 = LSB)
    ReadingData(u8),
    /// All data bits read, waiting for STOP
    WaitingForStop,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Create a new frame decoder
    pub fn new() -> Self {
        Self {
            state: DecodeState::WaitingForStart,
            value: 0,
        }
    }

    /// Reset the decoder state
    pub fn reset(&mut self) {
        self.state = DecodeState::WaitingForStart;
        self.value = 0;
    }

    /// Index of the data bit the next level will fill, if inside the data field
    pub fn data_index(&self) -> Option<u8> {
        match self.state {
            DecodeState::ReadingData(bit) => Some(bit),
            _ => None,
        }
    }

    /// Check if the decoder expects the stop bit next
    pub fn expects_stop(&self) -> bool {
        self.state == DecodeState::WaitingForStop
    }

    /// Feed one sampled level to the decoder
    ///
    /// Returns `Ok(Some(byte))` when a complete valid frame is decoded,
    /// `Ok(None)` when more levels are needed, or `Err` when the stop bit
    /// reads low.
    pub fn feed(&mut self, level: Level) -> Result<Option<u8>, FrameError> {
        match self.state {
            DecodeState::WaitingForStart => {
                if level == START_LEVEL {
                    self.value = 0;
                    self.state = DecodeState::ReadingData(0);
                }
                // Idle line, keep waiting
                Ok(None)
            }
            DecodeState::ReadingData(bit) => {
                if level.is_high() {
                    self.value |= 1 << bit;
                }
                self.state = if usize::from(bit) + 1 == DATA_BITS {
                    DecodeState::WaitingForStop
                } else {
                    DecodeState::ReadingData(bit + 1)
                };
                Ok(None)
            }
            DecodeState::WaitingForStop => {
                let value = self.value;
                self.reset();
                if level == STOP_LEVEL {
                    Ok(Some(value))
                } else {
                    Err(FrameError::StopBitLow)
                }
            }
        }
    }

    /// Feed multiple levels to the decoder
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining levels after a complete frame are not consumed.
    pub fn feed_levels(&mut self, levels: &[Level]) -> Result<Option<u8>, FrameError> {
        for &level in levels {
            if let Some(byte) = self.feed(level)? {
                return Ok(Some(byte));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_layout() {
        let levels: Vec<Level> = encode(0b0000_0101).collect();

        assert_eq!(levels.len(), FRAME_BITS);
        assert_eq!(levels[0], START_LEVEL);
        assert_eq!(levels[1], Level::High); // bit 0
        assert_eq!(levels[2], Level::Low); // bit 1
        assert_eq!(levels[3], Level::High); // bit 2
        assert!(levels[4..9].iter().all(|l| l.is_low()));
        assert_eq!(levels[9], STOP_LEVEL);
    }

    #[test]
    fn test_encode_exact_size() {
        let mut bits = encode(b'A');
        assert_eq!(bits.len(), FRAME_BITS);
        bits.next();
        assert_eq!(bits.len(), FRAME_BITS - 1);
    }

    #[test]
    fn test_decoder_ignores_idle() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.feed(Level::High), Ok(None));
        assert_eq!(decoder.data_index(), None);
        assert_eq!(decoder.feed(Level::Low), Ok(None));
        assert_eq!(decoder.data_index(), Some(0));
    }

    #[test]
    fn test_decoder_expects_stop_after_data() {
        let levels: Vec<Level> = encode(0xC3).collect();
        let mut decoder = FrameDecoder::new();

        for &level in &levels[..FRAME_BITS - 1] {
            assert!(!decoder.expects_stop());
            assert_eq!(decoder.feed(level), Ok(None));
        }
        assert!(decoder.expects_stop());
        assert_eq!(decoder.data_index(), None);

        assert_eq!(decoder.feed(STOP_LEVEL), Ok(Some(0xC3)));
        assert!(!decoder.expects_stop());
    }

    #[test]
    fn test_decoder_rejects_low_stop() {
        let mut levels: Vec<Level> = encode(0x5A).collect();
        levels[FRAME_BITS - 1] = Level::Low;

        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.feed_levels(&levels), Err(FrameError::StopBitLow));

        // Decoder is ready for the next frame after a desync
        let next: Vec<Level> = encode(0x33).collect();
        assert_eq!(decoder.feed_levels(&next), Ok(Some(0x33)));
    }

    #[test]
    fn test_decoder_resync_after_idle() {
        let mut levels = vec![Level::High, Level::High, Level::High];
        levels.extend(encode(b'z'));

        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.feed_levels(&levels), Ok(Some(b'z')));
    }

    #[test]
    fn test_decoder_stops_at_first_frame() {
        let mut levels: Vec<Level> = encode(b'a').collect();
        levels.extend(encode(b'b'));

        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.feed_levels(&levels[..FRAME_BITS]), Ok(Some(b'a')));
        assert_eq!(decoder.feed_levels(&levels[FRAME_BITS..]), Ok(Some(b'b')));
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(byte in any::<u8>()) {
            let levels: Vec<Level> = encode(byte).collect();
            let mut decoder = FrameDecoder::new();
            prop_assert_eq!(decoder.feed_levels(&levels), Ok(Some(byte)));
        }
    }
}
