//! Configuration types
//!
//! Live link configuration with derived timing, and the settings snapshot
//! stored as postcard binary data.

pub mod link;
pub mod settings;

pub use link::*;
pub use settings::*;
