//! `ByteSink` over `embedded_io::Write`
//!
//! Lets the receive loop forward decoded bytes straight to a UART, USB
//! serial port or any other blocking byte stream.

use embedded_io::Write;
use lumen_hal::ByteSink;

/// Byte sink writing to an `embedded_io` stream
pub struct IoSink<W> {
    writer: W,
    flush_on_newline: bool,
}

impl<W: Write> IoSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            flush_on_newline: false,
        }
    }

    /// Flush the writer after every line-feed
    pub fn flush_on_newline(mut self, enabled: bool) -> Self {
        self.flush_on_newline = enabled;
        self
    }

    /// Borrow the writer
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Give back the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ByteSink for IoSink<W> {
    type Error = W::Error;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.writer.write_all(&[byte])?;
        if self.flush_on_newline && byte == b'\n' {
            self.writer.flush()?;
        }
        Ok(())
    }
}
