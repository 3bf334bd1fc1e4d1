//! Byte sink abstraction
//!
//! Destination for bytes decoded by the continuous receive loop.

use heapless::Vec;

/// Consumer of decoded bytes
pub trait ByteSink {
    /// Error type for write operations
    type Error;

    /// Write a single byte
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Write every byte of `bytes`, stopping at the first error
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    type Error = S::Error;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        (**self).write_byte(byte)
    }
}

/// A fixed-capacity sink ran out of room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SinkFull;

impl<const N: usize> ByteSink for Vec<u8, N> {
    type Error = SinkFull;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.push(byte).map_err(|_| SinkFull)
    }
}
