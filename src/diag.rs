//! Diagnostic counters.
//!
//! The firmware's failure policy is truncate-and-continue: oversized
//! messages, full tables, and full rings drop data rather than stall a
//! handler. Each drop is counted here so `stats` can report what the
//! subsystems silently absorbed.

use core::sync::atomic::{AtomicU32, Ordering};

/// Event counters shared between interrupt and foreground context.
///
/// Every field is an independent atomic; there is no cross-field
/// consistency requirement, so plain relaxed increments are enough.
pub struct DiagCounters {
    /// Complete frames dispatched from the serial link.
    pub frames_rx: AtomicU32,
    /// Frames whose payload exceeded the message buffer and was truncated.
    pub frames_truncated: AtomicU32,
    /// Lines submitted at the local console.
    pub lines_submitted: AtomicU32,
    /// Profiler samples recorded (new or repeat address).
    pub samples_recorded: AtomicU32,
    /// Profiler samples dropped because the address table was full.
    pub samples_dropped: AtomicU32,
    /// Keystrokes dropped because the input ring was full.
    pub rx_dropped: AtomicU32,
    /// Log records dropped because the log ring was full.
    pub log_dropped: AtomicU32,
}

impl DiagCounters {
    pub const fn new() -> Self {
        Self {
            frames_rx: AtomicU32::new(0),
            frames_truncated: AtomicU32::new(0),
            lines_submitted: AtomicU32::new(0),
            samples_recorded: AtomicU32::new(0),
            samples_dropped: AtomicU32::new(0),
            rx_dropped: AtomicU32::new(0),
            log_dropped: AtomicU32::new(0),
        }
    }

    #[inline]
    pub fn count(field: &AtomicU32) {
        field.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy of all counters at a point in time.
    pub fn snapshot(&self) -> DiagSnapshot {
        DiagSnapshot {
            frames_rx: self.frames_rx.load(Ordering::Relaxed),
            frames_truncated: self.frames_truncated.load(Ordering::Relaxed),
            lines_submitted: self.lines_submitted.load(Ordering::Relaxed),
            samples_recorded: self.samples_recorded.load(Ordering::Relaxed),
            samples_dropped: self.samples_dropped.load(Ordering::Relaxed),
            rx_dropped: self.rx_dropped.load(Ordering::Relaxed),
            log_dropped: self.log_dropped.load(Ordering::Relaxed),
        }
    }
}

impl Default for DiagCounters {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct DiagSnapshot {
    pub frames_rx: u32,
    pub frames_truncated: u32,
    pub lines_submitted: u32,
    pub samples_recorded: u32,
    pub samples_dropped: u32,
    pub rx_dropped: u32,
    pub log_dropped: u32,
}
