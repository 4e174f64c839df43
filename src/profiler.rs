//! Interrupt-driven sampling profiler.
//!
//! While enabled, a periodic timer interrupt samples the interrupted
//! program counter. [`Profiler::record`] keeps a complete tally of every
//! distinct address seen this session plus an approximate top-K of the
//! hottest ones, and runs in the tick handler: it never blocks and never
//! allocates. The foreground only walks the tables after the tick source
//! has been stopped.
//!
//! Symbolication is an external collaborator behind [`SymbolSource`].

use core::fmt::Write;

/// Distinct addresses tracked per session. When the table fills, known
/// addresses keep counting and novel ones are dropped until the next
/// enable.
pub const SAMPLE_CAPACITY: usize = 2048;

/// Entries in the hottest-address table.
pub const TOP_ENTRIES: usize = 20;

/// One sampled address and how often it has been seen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressCount {
    pub addr: usize,
    pub count: u32,
}

impl AddressCount {
    const ZERO: Self = Self { addr: 0, count: 0 };
}

/// Periodic tick capability the platform timer implements.
///
/// `start` arms the periodic interrupt and its source; `stop` disarms it.
/// The platform's tick handler is responsible for acknowledging the
/// interrupt at the end of every invocation.
pub trait SampleClock {
    fn start(&mut self);
    fn stop(&mut self);
}

/// Address-to-label resolution (external symbol table).
pub trait SymbolSource {
    fn label_for(&self, addr: usize) -> Option<&str>;
}

/// Resolver with no symbol table; every address is unresolved.
pub struct NoSymbols;

impl SymbolSource for NoSymbols {
    fn label_for(&self, _addr: usize) -> Option<&str> {
        None
    }
}

/// Profiling session state: the complete tally and the top-K view.
pub struct Profiler {
    samples: [AddressCount; SAMPLE_CAPACITY],
    /// Live entries in `samples`.
    distinct: usize,
    /// Approximate K highest counts seen so far, sorted descending.
    top: [AddressCount; TOP_ENTRIES],
    enabled: bool,
}

impl Profiler {
    pub const fn new() -> Self {
        Self {
            samples: [AddressCount::ZERO; SAMPLE_CAPACITY],
            distinct: 0,
            top: [AddressCount::ZERO; TOP_ENTRIES],
            enabled: false,
        }
    }

    /// Start a session: both tables cleared, tick source armed.
    ///
    /// Enabling an already-enabled profiler restarts the session.
    pub fn enable(&mut self, clock: &mut dyn SampleClock) {
        self.reset();
        self.enabled = true;
        clock.start();
    }

    /// End the session: tick source disarmed first, so the tables are
    /// stable for the foreground to read afterwards.
    pub fn disable(&mut self, clock: &mut dyn SampleClock) {
        clock.stop();
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Clear both tables.
    pub fn reset(&mut self) {
        self.distinct = 0;
        self.top = [AddressCount::ZERO; TOP_ENTRIES];
    }

    /// Record one sampled program counter. Tick handler path: O(table),
    /// no blocking, no allocation.
    ///
    /// Returns `false` when the sample was dropped because the table is
    /// full of other addresses.
    pub fn record(&mut self, pc: usize) -> bool {
        if !self.enabled {
            return false;
        }

        if let Some(i) = self.samples[..self.distinct]
            .iter()
            .position(|e| e.addr == pc)
        {
            self.samples[i].count += 1;
            let count = self.samples[i].count;
            if count > self.min_top_count() {
                self.update_top(pc, count);
            }
            return true;
        }

        if self.distinct < SAMPLE_CAPACITY {
            self.samples[self.distinct] = AddressCount { addr: pc, count: 1 };
            self.distinct += 1;
            // While fewer than K distinct addresses exist the new one
            // always enters the top table; afterwards it must beat the
            // current minimum.
            if self.distinct <= TOP_ENTRIES || 1 > self.min_top_count() {
                self.update_top(pc, 1);
            }
            return true;
        }

        // Table full: keep updating known addresses, drop novel ones
        false
    }

    /// Distinct addresses recorded this session.
    pub fn distinct(&self) -> usize {
        self.distinct
    }

    /// The top-K table, hottest first.
    pub fn top(&self) -> &[AddressCount] {
        &self.top
    }

    fn min_top_count(&self) -> u32 {
        self.top[TOP_ENTRIES - 1].count
    }

    /// Fold a grown count into the top table: update in place if the
    /// address is present, otherwise displace the current minimum if the
    /// count beats it, then restore descending order. K is small and
    /// fixed, so the O(K^2) pass stays auditable.
    fn update_top(&mut self, addr: usize, count: u32) {
        match self.top.iter().position(|e| e.addr == addr) {
            Some(i) => self.top[i].count = count,
            None => {
                if count > self.top[TOP_ENTRIES - 1].count {
                    self.top[TOP_ENTRIES - 1] = AddressCount { addr, count };
                }
            }
        }

        for i in 0..TOP_ENTRIES - 1 {
            for j in i + 1..TOP_ENTRIES {
                if self.top[i].count < self.top[j].count {
                    self.top.swap(i, j);
                }
            }
        }
    }

    /// Render the session report: rank, count, label, address for every
    /// top-table row, zero rows included. Foreground only, after
    /// `disable`.
    pub fn report(&self, symbols: &dyn SymbolSource, out: &mut dyn Write) {
        let _ = writeln!(out, "  Counts  |  Function    [pc]");
        let _ = writeln!(out, "-----------------------------");
        for (rank, entry) in self.top.iter().enumerate() {
            let label = symbols.label_for(entry.addr).unwrap_or("???");
            let _ = writeln!(
                out,
                "{:2}. {:8} | {} [{:#010x}]",
                rank + 1,
                entry.count,
                label,
                entry.addr
            );
        }
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}
