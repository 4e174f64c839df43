//! # RustSerialConsole
//!
//! Interactive console firmware for a single-core board.
//!
//! ## Architecture
//!
//! Two input paths feed one command dispatcher:
//! - The local keyboard, line-edited by [`console::LineEditor`] in the
//!   foreground loop
//! - The serial link, delimited into messages by [`MessageFramer`] in the
//!   RX interrupt context
//!
//! A periodic timer interrupt drives the [`Profiler`] while it is enabled.
//! Every shared structure has exactly one interrupt-context writer; the
//! foreground reads only after the writer's completion signal (a finished
//! frame, a finished line, a disabled profiler). There are no locks.
//!
//! Interrupt-context code never touches the UART: diagnostics go through
//! the lock-free [`LogRing`] and are drained by the foreground loop.

#![cfg_attr(not(test), no_std)]

pub mod console;
pub mod diag;
pub mod framer;
pub mod io;
pub mod logging;
pub mod profiler;
pub mod ring;

pub use diag::DiagCounters;
pub use framer::MessageFramer;
pub use io::ByteSource;
pub use logging::LogRing;
pub use profiler::{Profiler, SampleClock, SymbolSource};
pub use ring::ByteRing;
