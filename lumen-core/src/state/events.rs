//! Events that drive the receive state machine

/// Events produced by the receive engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxEvent {
    /// A new start-bit search began
    SearchStarted,
    /// A run of low samples confirmed a start bit
    StartConfirmed,
    /// No start bit within the timeout
    TimedOut,
    /// One frame bit (start or data) was sampled
    BitSampled,
    /// The stop bit read high
    StopHigh,
    /// The stop bit read low
    StopLow,
}
