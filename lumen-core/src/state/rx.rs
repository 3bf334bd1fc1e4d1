//! Receive state machine
//!
//! ```text
//! Idle ──StartConfirmed──▶ StartDetected ──BitSampled──▶ Data(0) ─ ... ─▶ Data(7)
//!                                                                          │
//!                                                                     BitSampled
//!                                                                          ▼
//!                                     Decoded ◀──StopHigh── StopCheck ──StopLow──▶ Desync
//! ```
//!
//! `SearchStarted` returns any state to `Idle`. Unexpected events leave the
//! state unchanged.

use lumen_protocol::DATA_BITS;

use super::events::RxEvent;

/// Receive states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxState {
    /// Searching for a start bit (or not receiving)
    Idle,
    /// Start bit confirmed, aligning to bit centres
    StartDetected,
    /// Reading data bit N (0 = LSB)
    Data(u8),
    /// All data bits sampled, stop bit next
    StopCheck,
    /// Frame complete with a valid stop bit
    Decoded,
    /// Stop bit read low; frame discarded
    Desync,
}

impl Default for RxState {
    fn default() -> Self {
        RxState::Idle
    }
}

impl RxState {
    /// Check if a frame is in progress
    pub fn in_frame(&self) -> bool {
        matches!(
            self,
            RxState::StartDetected | RxState::Data(_) | RxState::StopCheck
        )
    }

    /// Check if this state ends a frame
    pub fn is_terminal(&self) -> bool {
        matches!(self, RxState::Decoded | RxState::Desync)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: RxEvent) -> Self {
        use RxEvent::*;
        use RxState::*;

        match (self, event) {
            (_, SearchStarted) => Idle,

            (Idle, StartConfirmed) => StartDetected,
            (Idle, TimedOut) => Idle,

            (StartDetected, BitSampled) => Data(0),
            (Data(bit), BitSampled) if usize::from(bit) + 1 < DATA_BITS => Data(bit + 1),
            (Data(_), BitSampled) => StopCheck,

            (StopCheck, StopHigh) => Decoded,
            (StopCheck, StopLow) => Desync,

            // Default: stay in current state
            _ => self,
        }
    }
}
