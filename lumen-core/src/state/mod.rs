//! Receive state machine
//!
//! Tracks where the engine is inside a frame. The state machine is
//! explicit, finite, and deterministic.

pub mod events;
pub mod rx;

pub use events::RxEvent;
pub use rx::RxState;
