//! Serial link message framing.
//!
//! Messages on the link are delimited by a repeated 3-byte marker run
//! (`###`) used as both opener and closer. There is no escape mechanism:
//! a literal 3-marker run inside a payload closes that message early, and
//! partial marker runs are consumed by the run counter rather than
//! buffered. Both are documented protocol limits, not defects.
//!
//! The framer runs inside the link RX interrupt context: [`MessageFramer::drain`]
//! consumes every byte the hardware has queued, and each completed message
//! is handed to the sink (and dispatched) before the next byte is examined,
//! so messages always dispatch in arrival order.

use core::fmt::Write;

use crate::io::ByteSource;

/// Message buffer capacity. Payloads keep at most `MESSAGE_CAPACITY - 1`
/// bytes; the rest of an oversized message is dropped.
pub const MESSAGE_CAPACITY: usize = 1024;

/// The frame delimiter byte.
pub const FRAME_MARKER: u8 = b'#';

/// Consecutive markers that open or close a frame.
const MARKER_RUN: u8 = 3;

/// Framing state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum FramerState {
    /// Discarding bytes until a full opener run arrives.
    Seeking,
    /// Accumulating payload bytes until a full closer run arrives.
    Collecting,
}

/// A completed message, borrowed from the framer until the next byte is
/// pushed.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub payload: &'a str,
    /// The payload exceeded the buffer and lost its tail.
    pub truncated: bool,
}

/// Extracts delimited messages from the raw link byte stream.
pub struct MessageFramer {
    buf: [u8; MESSAGE_CAPACITY],
    len: usize,
    markers: u8,
    state: FramerState,
    truncated: bool,
}

impl MessageFramer {
    pub const fn new() -> Self {
        Self {
            buf: [0u8; MESSAGE_CAPACITY],
            len: 0,
            markers: 0,
            state: FramerState::Seeking,
            truncated: false,
        }
    }

    /// Feed one byte; returns the completed message when this byte closes
    /// a frame.
    ///
    /// The marker run counter is NOT reset when the opener completes, so an
    /// unbroken run of more than three markers never closes an empty frame;
    /// only a fresh run after at least one payload byte does.
    pub fn push_byte(&mut self, byte: u8) -> Option<Frame<'_>> {
        match self.state {
            FramerState::Seeking => {
                if byte == FRAME_MARKER {
                    self.markers = self.markers.saturating_add(1);
                    if self.markers == MARKER_RUN {
                        self.state = FramerState::Collecting;
                        self.len = 0;
                        self.truncated = false;
                    }
                } else {
                    self.markers = 0;
                }
                None
            }
            FramerState::Collecting => {
                if byte == FRAME_MARKER {
                    self.markers = self.markers.saturating_add(1);
                    if self.markers == MARKER_RUN {
                        self.state = FramerState::Seeking;
                        self.markers = 0;
                        // Non-UTF-8 payloads dispatch as empty, which the
                        // tokenizer treats as a silent no-op.
                        let payload =
                            core::str::from_utf8(&self.buf[..self.len]).unwrap_or("");
                        return Some(Frame {
                            payload,
                            truncated: self.truncated,
                        });
                    }
                    None
                } else {
                    self.markers = 0;
                    if self.len < MESSAGE_CAPACITY - 1 {
                        self.buf[self.len] = byte;
                        self.len += 1;
                    } else {
                        self.truncated = true;
                    }
                    None
                }
            }
        }
    }

    /// Drain every currently-available byte from the source.
    ///
    /// Called from the RX interrupt handler. Each completed message is
    /// passed to `sink` before the next byte is read, and the hardware
    /// queue is left empty when this returns.
    pub fn drain(&mut self, rx: &mut dyn ByteSource, sink: &mut dyn FnMut(Frame<'_>)) {
        while let Some(byte) = rx.poll_byte() {
            if let Some(frame) = self.push_byte(byte) {
                sink(frame);
            }
        }
    }

    /// True while payload bytes are being accumulated.
    pub fn is_collecting(&self) -> bool {
        self.state == FramerState::Collecting
    }
}

impl Default for MessageFramer {
    fn default() -> Self {
        Self::new()
    }
}

/// Transmit side: wrap a message in opener and closer marker runs.
pub fn encode_frame(out: &mut dyn Write, msg: &str) -> core::fmt::Result {
    out.write_str("###")?;
    out.write_str(msg)?;
    out.write_str("###")
}
