//! Receive errors
//!
//! Every failure is local to one call; none of them stop the link.

use lumen_protocol::FrameError;

/// Errors that can occur while receiving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxError {
    /// No receive pin was assigned
    NoReceivePin,
    /// No start bit within the timeout (or on a single-shot poll)
    Timeout,
    /// Stop bit read low; the frame was discarded
    Desync,
    /// Message requested with a zero length limit
    ZeroLength,
}

impl From<FrameError> for RxError {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::StopBitLow => RxError::Desync,
        }
    }
}

impl core::fmt::Display for RxError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RxError::NoReceivePin => f.write_str("no receive pin configured"),
            RxError::Timeout => f.write_str("no start bit before timeout"),
            RxError::Desync => f.write_str("stop bit read low"),
            RxError::ZeroLength => f.write_str("zero message length"),
        }
    }
}
