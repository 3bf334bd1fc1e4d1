//! Hardware adapters
//!
//! This crate connects the capability traits defined in lumen-hal to
//! concrete drivers through the `embedded-hal` and `embedded-io` traits:
//!
//! - [`HalLink`]: emitter pin, receiver ADC, delay and clock as a `LinkHal`
//! - [`IoSink`]: any `embedded_io::Write` as a `ByteSink` for the receive loop

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod hal_link;
pub mod sink;

pub use hal_link::{HalLink, NoEmitter, NoReceiver, EMITTER_PIN, RECEIVER_PIN};
pub use sink::IoSink;
