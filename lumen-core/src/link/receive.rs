//! Receive engine
//!
//! Start-bit search, byte decoding, message assembly and the continuous
//! receive loop. Every wait is a fixed-duration sleep followed by a sample;
//! decoding is done by feeding sampled levels to a [`FrameDecoder`].

use heapless::Vec;
use lumen_hal::{ByteSink, LinkHal};
use lumen_protocol::{FrameDecoder, MessageAssembler, DATA_BITS, DEFAULT_MESSAGE_CAPACITY, START_LEVEL};

use super::Link;
use crate::error::RxError;
use crate::state::RxEvent;
use crate::stop::StopSignal;

/// Default start-bit timeout for message reception
pub const DEFAULT_START_TIMEOUT_MS: u32 = 5000;

/// Summary of a receive loop run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoopStats {
    /// Bytes decoded and forwarded to the sink
    pub bytes: u32,
    /// Attempts that timed out or desynchronized
    pub failures: u32,
    /// Bytes the sink refused
    pub sink_errors: u32,
}

impl<H: LinkHal> Link<H> {
    /// Search for a start bit
    ///
    /// With `timeout_ms == 0` this is a single non-blocking poll decided on
    /// one sample. Otherwise the line is polled every poll delay until a run
    /// of consecutive lows is seen or the timeout elapses. Any high sample
    /// restarts the run. The run is `start_confirm_samples`, shortened when
    /// needed so it ends inside the start bit.
    ///
    /// On success the next oversampled read is lined up on the start bit's
    /// centre, or as close after it as the confirmation run allows.
    pub fn wait_for_start_bit(&mut self, timeout_ms: u32) -> Result<(), RxError> {
        self.find_start_bit(timeout_ms).map(|_| ())
    }

    /// Start-bit search returning how late the alignment landed
    fn find_start_bit(&mut self, timeout_ms: u32) -> Result<u32, RxError> {
        self.advance(RxEvent::SearchStarted);

        if self.pins.rx.is_none() {
            return Err(RxError::NoReceivePin);
        }

        let required = self.config.confirm_samples_for(timeout_ms);
        if timeout_ms > 0 && required < self.config.start_confirm_samples() {
            trace!("start confirmation shortened to {} samples", required);
        }

        let start = self.hal.now_ms();
        let mut run: u32 = 0;

        loop {
            if self.sample_level_once() == START_LEVEL {
                run += 1;
                if run >= required {
                    self.wait_us(self.config.start_alignment_us(required));
                    self.advance(RxEvent::StartConfirmed);
                    return Ok(self.config.start_overshoot_us(required));
                }
            } else {
                run = 0;
            }

            if timeout_ms == 0 {
                return Err(RxError::Timeout);
            }

            if self.hal.now_ms().wrapping_sub(start) >= timeout_ms {
                trace!("no start bit within {}ms", timeout_ms);
                self.advance(RxEvent::TimedOut);
                return Err(RxError::Timeout);
            }

            self.wait_us(self.config.poll_delay_us());
        }
    }

    /// Receive one byte
    ///
    /// Each bit is read with a window centred on the bit centre. A low stop
    /// bit discards the frame; no partial byte is returned.
    pub fn receive_byte(&mut self, timeout_ms: u32) -> Result<u8, RxError> {
        let late_us = self.find_start_bit(timeout_ms)?;

        let bit_us = self.config.bit_duration_us();
        let bit_wait_us = self.config.bit_wait_us();
        self.wait_us(bit_us.saturating_sub(late_us));

        let mut decoder = FrameDecoder::new();
        decoder.feed(START_LEVEL)?;
        self.advance(RxEvent::BitSampled);

        for _ in 0..DATA_BITS {
            let level = self.sample_level();
            decoder.feed(level)?;
            self.advance(RxEvent::BitSampled);
            self.wait_us(bit_wait_us);
        }

        match decoder.feed(self.sample_level()) {
            Ok(Some(byte)) => {
                // Land mid-idle before the next search
                self.wait_us(self.config.half_bit_us());
                self.advance(RxEvent::StopHigh);
                Ok(byte)
            }
            Ok(None) | Err(_) => {
                self.wait_us(bit_us);
                self.advance(RxEvent::StopLow);
                debug!("stop bit low, frame dropped");
                Err(RxError::Desync)
            }
        }
    }

    /// Receive bytes until a line-feed, `max_chars` bytes, or a failure
    ///
    /// The line-feed is kept in the result. A failure after at least one
    /// byte ends the message early and returns what was collected; the
    /// error is returned only if nothing was. `max_chars` is capped at `N`.
    pub fn receive_message<const N: usize>(
        &mut self,
        max_chars: usize,
        timeout_ms: u32,
    ) -> Result<Vec<u8, N>, RxError> {
        if self.pins.rx.is_none() {
            return Err(RxError::NoReceivePin);
        }

        let mut message = MessageAssembler::<N>::new(max_chars);
        if message.limit() == 0 {
            return Err(RxError::ZeroLength);
        }

        loop {
            match self.receive_byte(timeout_ms) {
                Ok(byte) => {
                    if message.push(byte).is_done() {
                        break;
                    }
                }
                Err(e) => {
                    if message.is_empty() {
                        return Err(e);
                    }
                    break;
                }
            }
        }

        message.finish().ok_or(RxError::Timeout)
    }

    /// Receive a line with the default capacity and start timeout
    pub fn receive_line(&mut self) -> Result<Vec<u8, DEFAULT_MESSAGE_CAPACITY>, RxError> {
        self.receive_message(DEFAULT_MESSAGE_CAPACITY, DEFAULT_START_TIMEOUT_MS)
    }

    /// Forward every received byte to `sink` until `stop` is raised
    ///
    /// Each attempt uses a short start timeout derived from the bit period;
    /// a failed attempt sleeps one poll delay before retrying. Sink errors
    /// are counted and the loop carries on. Returns at once without a
    /// receive pin.
    pub fn receive_loop<S: ByteSink>(&mut self, sink: &mut S, stop: &StopSignal) -> LoopStats {
        let mut stats = LoopStats::default();

        if self.pins.rx.is_none() {
            return stats;
        }

        let timeout_ms = self.config.loop_timeout_ms();
        debug!("receive loop started, timeout {}ms", timeout_ms);

        while !stop.is_raised() {
            match self.receive_byte(timeout_ms) {
                Ok(byte) => {
                    if sink.write_byte(byte).is_ok() {
                        stats.bytes += 1;
                    } else {
                        stats.sink_errors += 1;
                        warn!("sink rejected byte {=u8:#x}", byte);
                    }
                }
                Err(_) => {
                    stats.failures += 1;
                    self.wait_us(self.config.poll_delay_us());
                }
            }
        }

        debug!(
            "receive loop stopped: {} bytes, {} failures",
            stats.bytes, stats.failures
        );
        stats
    }
}
