//! Lumen Hardware Abstraction Layer
//!
//! This crate defines the narrow capability surface the light-link engine
//! runs on. Everything timing-sensitive in the engine goes through
//! [`LinkHal`], so the same code drives a real emitter/photodiode pair or
//! the virtual-clock [`sim::SimLink`] used in host tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  lumen-core (transmit/receive engine)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lumen-hal (this crate - traits + sim)  │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ lumen-drivers │       │  sim::SimLink │
//! │ (embedded-hal)│       │ (host tests)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`link::LinkHal`] - Pin-indexed digital/analog I/O, delays, clock
//! - [`analog::AnalogInput`], [`analog::MonotonicClock`] - Building blocks for adapters
//! - [`sink::ByteSink`] - Destination for bytes decoded by the receive loop

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod analog;
pub mod gpio;
pub mod link;
pub mod sim;
pub mod sink;

// Re-export key traits at crate root for convenience
pub use analog::{AnalogInput, MonotonicClock};
pub use gpio::{Level, PinId, PinMode};
pub use link::LinkHal;
pub use sink::{ByteSink, SinkFull};
