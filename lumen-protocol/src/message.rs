//! Message assembly
//!
//! A message is a run of decoded bytes ended either by reaching a length
//! limit or by a line-feed, which is kept as part of the message.

use heapless::Vec;

/// Byte that terminates a message (included in the message)
pub const LINE_FEED: u8 = b'\n';

/// Default message capacity in bytes
pub const DEFAULT_MESSAGE_CAPACITY: usize = 64;

/// Outcome of adding a byte to a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Progress {
    /// More bytes may follow
    Continue,
    /// A line-feed ended the message
    Terminated,
    /// The length limit was reached
    Full,
}

impl Progress {
    /// Check if the message is complete
    pub fn is_done(self) -> bool {
        !matches!(self, Progress::Continue)
    }
}

/// Accumulates decoded bytes into a bounded message
#[derive(Debug, Clone)]
pub struct MessageAssembler<const N: usize> {
    buffer: Vec<u8, N>,
    limit: usize,
}

impl<const N: usize> MessageAssembler<N> {
    /// Create an assembler that stops after `max_chars` bytes
    ///
    /// The limit is clamped to the buffer capacity `N`.
    pub fn new(max_chars: usize) -> Self {
        Self {
            buffer: Vec::new(),
            limit: max_chars.min(N),
        }
    }

    /// Effective length limit
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of bytes accumulated
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if nothing has been accumulated
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes accumulated so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Add a decoded byte
    ///
    /// Bytes offered after the limit is reached are dropped and
    /// `Progress::Full` is returned again.
    pub fn push(&mut self, byte: u8) -> Progress {
        if self.buffer.len() >= self.limit {
            return Progress::Full;
        }
        // Cannot fail: limit <= N
        let _ = self.buffer.push(byte);

        if byte == LINE_FEED {
            Progress::Terminated
        } else if self.buffer.len() >= self.limit {
            Progress::Full
        } else {
            Progress::Continue
        }
    }

    /// Clear the accumulated bytes, keeping the limit
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Take the accumulated message
    ///
    /// Returns `None` if no bytes were accumulated.
    pub fn finish(self) -> Option<Vec<u8, N>> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.buffer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_line_feed_terminates_inclusive() {
        let mut assembler = MessageAssembler::<16>::new(16);

        assert_eq!(assembler.push(b'h'), Progress::Continue);
        assert_eq!(assembler.push(b'i'), Progress::Continue);
        assert_eq!(assembler.push(LINE_FEED), Progress::Terminated);
        assert_eq!(assembler.finish().unwrap().as_slice(), b"hi\n");
    }

    #[test]
    fn test_limit_reached() {
        let mut assembler = MessageAssembler::<16>::new(3);

        assert_eq!(assembler.push(b'a'), Progress::Continue);
        assert_eq!(assembler.push(b'b'), Progress::Continue);
        assert_eq!(assembler.push(b'c'), Progress::Full);
        assert_eq!(assembler.push(b'd'), Progress::Full);
        assert_eq!(assembler.as_bytes(), b"abc");
    }

    #[test]
    fn test_limit_clamped_to_capacity() {
        let assembler = MessageAssembler::<4>::new(64);
        assert_eq!(assembler.limit(), 4);
    }

    #[test]
    fn test_line_feed_at_limit_is_terminated() {
        let mut assembler = MessageAssembler::<4>::new(2);
        assembler.push(b'x');
        assert_eq!(assembler.push(LINE_FEED), Progress::Terminated);
    }

    #[test]
    fn test_reset_keeps_limit() {
        let mut assembler = MessageAssembler::<8>::new(3);
        assembler.push(b'a');
        assembler.push(b'b');
        assert_eq!(assembler.push(b'c'), Progress::Full);

        assembler.reset();
        assert!(assembler.is_empty());
        assert_eq!(assembler.limit(), 3);

        assert_eq!(assembler.push(b'x'), Progress::Continue);
        assert_eq!(assembler.as_bytes(), b"x");
    }

    #[test]
    fn test_empty_finish_is_none() {
        let assembler = MessageAssembler::<4>::new(4);
        assert!(assembler.finish().is_none());
    }

    #[test]
    fn test_zero_limit_accepts_nothing() {
        let mut assembler = MessageAssembler::<4>::new(0);
        assert_eq!(assembler.push(b'a'), Progress::Full);
        assert!(assembler.is_empty());
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_limit(
            bytes in proptest::collection::vec(any::<u8>(), 0..40),
            limit in 0usize..40,
        ) {
            let mut assembler = MessageAssembler::<32>::new(limit);
            for byte in bytes {
                if assembler.push(byte).is_done() {
                    break;
                }
            }
            prop_assert!(assembler.len() <= limit.min(32));
            // A line-feed can only appear as the final byte
            if let Some(pos) = assembler.as_bytes().iter().position(|&b| b == LINE_FEED) {
                prop_assert_eq!(pos, assembler.len() - 1);
            }
        }
    }
}
