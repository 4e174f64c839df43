//! Input capability seam
//!
//! The platform owns the receive hardware; the library polls bytes through
//! [`ByteSource`]. Output goes the other way through `&mut dyn
//! core::fmt::Write`, so neither direction names a peripheral.

/// Terminal bell, written in place of an error message for navigation and
/// edit attempts outside valid bounds.
pub const BELL: u8 = 0x07;

/// A byte-at-a-time input source (keyboard queue, UART receive FIFO).
pub trait ByteSource {
    /// Take the next byte if one is available. Must not block.
    fn poll_byte(&mut self) -> Option<u8>;

    /// Block until a byte arrives. Cooperative poll, no sleep, no timeout.
    fn read_byte(&mut self) -> u8 {
        loop {
            if let Some(byte) = self.poll_byte() {
                return byte;
            }
            core::hint::spin_loop();
        }
    }
}

/// Scripted byte source: yields a fixed byte sequence, then runs dry.
///
/// Used by the host tests to drive the editor and framer with exact
/// keystroke sequences.
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }
}

impl ByteSource for SliceSource<'_> {
    fn poll_byte(&mut self) -> Option<u8> {
        let byte = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }
}
