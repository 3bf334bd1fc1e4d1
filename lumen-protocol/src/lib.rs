//! Lumen Link Protocol
//!
//! Signal-level framing for an asynchronous serial link carried over light.
//! There is no byte-level wire format: every byte travels as a frame of
//! line levels, and messages are runs of frames ended by a length limit or
//! a line-feed.
//!
//! # Byte Frame
//!
//! ```text
//!  idle   ┌─────┬────┬────┬────┬────┬────┬────┬────┬────┬──────┬─────┐ idle
//!  HIGH   │START│ D0 │ D1 │ D2 │ D3 │ D4 │ D5 │ D6 │ D7 │ STOP │ GAP │ HIGH
//!         │ LOW │LSB │    │    │    │    │    │    │MSB │ HIGH │     │
//!         └─────┴────┴────┴────┴────┴────┴────┴────┴────┴──────┴─────┘
//!           one bit period per cell
//! ```
//!
//! A received frame is valid only if the stop bit reads high.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod message;

pub use frame::{
    FrameBits, FrameDecoder, FrameError, DATA_BITS, FRAME_BITS, FRAME_PERIODS, IDLE_LEVEL,
    START_LEVEL, STOP_LEVEL,
};
pub use message::{MessageAssembler, Progress, DEFAULT_MESSAGE_CAPACITY, LINE_FEED};
