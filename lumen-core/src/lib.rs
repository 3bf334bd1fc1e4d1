//! Board-agnostic engine for the Lumen light link
//!
//! This crate contains the protocol and signal-processing logic of a
//! software-timed serial link, independent of any hardware:
//!
//! - Link configuration and timing derivation
//! - Bit-banged transmit with start/data/stop framing
//! - Oversampled analog receive and threshold calibration
//! - Start-bit search, byte and message decoding, continuous receive loop
//! - Receive state machine
//! - Persistable settings (postcard + CRC32)
//!
//! All hardware access goes through [`lumen_hal::LinkHal`].

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod link;
pub mod state;
pub mod stop;

pub use config::{LinkConfig, LinkSettings, SettingsError, StoredSettings};
pub use error::RxError;
pub use link::{Calibration, Link, LinkPins, LoopStats};
pub use state::{RxEvent, RxState};
pub use stop::StopSignal;
