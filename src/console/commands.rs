//! Command table and handlers
//!
//! One dispatch algorithm serves both call sites: the foreground REPL and
//! the link framer (interrupt context). Handlers reached from the link must
//! stay short and non-blocking, because nothing else runs until they
//! return.

use core::fmt::Write;

use super::error::ConsoleError;
use super::parser::tokenize;
use crate::diag::DiagCounters;
use crate::framer::encode_frame;
use crate::profiler::{Profiler, SampleClock, SymbolSource};

/// Everything a handler may touch, owned by the caller and lent for one
/// dispatch.
pub struct CommandContext<'a> {
    pub profiler: &'a mut Profiler,
    pub clock: &'a mut dyn SampleClock,
    pub symbols: &'a dyn SymbolSource,
    /// Transmit side of the serial link.
    pub link: &'a mut dyn Write,
    pub diag: &'a DiagCounters,
}

/// Command descriptor
pub struct CommandDescriptor {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
    pub handler:
        fn(&[&str], &mut CommandContext<'_>, &mut dyn Write) -> Result<(), ConsoleError>,
}

/// All available commands. Names are unique, so first-match lookup is
/// exact-match lookup.
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor {
        name: "help",
        usage: "help [cmd]",
        description: "print command usage and description",
        handler: cmd_help,
    },
    CommandDescriptor {
        name: "echo",
        usage: "echo [args]",
        description: "print arguments",
        handler: cmd_echo,
    },
    CommandDescriptor {
        name: "clear",
        usage: "clear",
        description: "clear screen (if your terminal supports it)",
        handler: cmd_clear,
    },
    CommandDescriptor {
        name: "peek",
        usage: "peek [addr]",
        description: "print contents of memory at address",
        handler: cmd_peek,
    },
    CommandDescriptor {
        name: "poke",
        usage: "poke [addr] [val]",
        description: "store value into memory at address",
        handler: cmd_poke,
    },
    CommandDescriptor {
        name: "profile",
        usage: "profile [on|off]",
        description: "measure execution hot-spots by sampled address",
        handler: cmd_profile,
    },
    CommandDescriptor {
        name: "send",
        usage: "send [args]",
        description: "transmit arguments as framed link messages",
        handler: cmd_send,
    },
    CommandDescriptor {
        name: "stats",
        usage: "stats",
        description: "print subsystem diagnostic counters",
        handler: cmd_stats,
    },
    CommandDescriptor {
        name: "reboot",
        usage: "reboot confirm",
        description: "restart the board",
        handler: cmd_reboot,
    },
];

/// Tokenize a line and invoke the matching handler.
///
/// An empty or all-whitespace line is a silent no-op. An unmatched command
/// name is reported here; every other error is reported by the handler
/// that detected it, so callers only see the result code.
pub fn execute(
    line: &str,
    ctx: &mut CommandContext<'_>,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    let tokens = tokenize(line);
    let Some(&name) = tokens.first() else {
        return Ok(());
    };

    match COMMANDS.iter().find(|c| c.name == name) {
        Some(cmd) => (cmd.handler)(&tokens, ctx, out),
        None => {
            let _ = writeln!(out, "error: no such command '{}'.", name);
            Err(ConsoleError::UnknownCommand)
        }
    }
}

/// All command names, for help and tab completion.
pub fn command_names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|c| c.name)
}

/// Parse a decimal or `0x`-prefixed hex number.
fn parse_num(s: &str) -> Option<u32> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

// --- Command Implementations ---

fn cmd_help(
    args: &[&str],
    _ctx: &mut CommandContext<'_>,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    if args.len() == 1 {
        for c in COMMANDS {
            let _ = writeln!(out, "{}\t- {}", c.name, c.description);
        }
    } else {
        let Some(c) = COMMANDS.iter().find(|c| c.name == args[1]) else {
            let _ = writeln!(out, "error: no such command '{}'.", args[1]);
            return Err(ConsoleError::UnknownCommand);
        };
        let _ = writeln!(out, "{}\t   {}", c.usage, c.description);
    }
    Ok(())
}

fn cmd_echo(
    args: &[&str],
    _ctx: &mut CommandContext<'_>,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    for arg in &args[1..] {
        let _ = write!(out, "{} ", arg);
    }
    let _ = writeln!(out);
    Ok(())
}

fn cmd_clear(
    _args: &[&str],
    _ctx: &mut CommandContext<'_>,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    // Formfeed; terminal emulators treat it as clear-screen
    let _ = write!(out, "\x0c");
    Ok(())
}

fn cmd_peek(
    args: &[&str],
    _ctx: &mut CommandContext<'_>,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    if args.len() != 2 {
        let _ = writeln!(out, "error: peek expects 1 argument [addr]");
        return Err(ConsoleError::BadArgCount);
    }
    let Some(addr) = parse_num(args[1]) else {
        let _ = writeln!(out, "error: peek cannot convert '{}'", args[1]);
        return Err(ConsoleError::InvalidValue);
    };
    if addr % 4 != 0 {
        let _ = writeln!(out, "error: peek address must be 4-byte aligned");
        return Err(ConsoleError::BadAlignment);
    }

    #[cfg(all(not(test), any(target_arch = "xtensa", target_arch = "riscv32")))]
    {
        // SAFETY: peek is an operator-facing raw memory window; the operator
        // owns the consequences of the address, as on any monitor shell.
        let value = unsafe { core::ptr::read_volatile(addr as *const u32) };
        let _ = writeln!(out, "0x{:08x}: {:08x}", addr, value);
    }

    #[cfg(any(test, not(any(target_arch = "xtensa", target_arch = "riscv32"))))]
    {
        let _ = writeln!(out, "0x{:08x}: (host build)", addr);
    }

    Ok(())
}

fn cmd_poke(
    args: &[&str],
    _ctx: &mut CommandContext<'_>,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    if args.len() != 3 {
        let _ = writeln!(out, "error: poke expects 2 arguments [addr] and [val]");
        return Err(ConsoleError::BadArgCount);
    }
    let Some(addr) = parse_num(args[1]) else {
        let _ = writeln!(out, "error: poke cannot convert '{}'", args[1]);
        return Err(ConsoleError::InvalidValue);
    };
    let Some(value) = parse_num(args[2]) else {
        let _ = writeln!(out, "error: poke cannot convert '{}'", args[2]);
        return Err(ConsoleError::InvalidValue);
    };
    if addr % 4 != 0 {
        let _ = writeln!(out, "error: poke address must be 4-byte aligned");
        return Err(ConsoleError::BadAlignment);
    }

    #[cfg(all(not(test), any(target_arch = "xtensa", target_arch = "riscv32")))]
    // SAFETY: same contract as peek; the operator chose the address.
    unsafe {
        core::ptr::write_volatile(addr as *mut u32, value);
    }

    #[cfg(any(test, not(any(target_arch = "xtensa", target_arch = "riscv32"))))]
    {
        let _ = writeln!(out, "0x{:08x} <- {:08x} (host build)", addr, value);
    }

    Ok(())
}

fn cmd_profile(
    args: &[&str],
    ctx: &mut CommandContext<'_>,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    if args.len() != 2 {
        let _ = writeln!(out, "error: profile expects 1 argument [on|off]");
        return Err(ConsoleError::BadArgCount);
    }
    match args[1] {
        "on" => {
            ctx.profiler.enable(ctx.clock);
            let _ = writeln!(out, "Profiling started.");
        }
        "off" => {
            // Tick source is stopped inside disable(); only then is the
            // table safe to walk from here.
            ctx.profiler.disable(ctx.clock);
            ctx.profiler.report(ctx.symbols, out);
            let _ = writeln!(out, "Profiling stopped.");
        }
        other => {
            let _ = writeln!(out, "error: profile cannot convert '{}'", other);
            return Err(ConsoleError::InvalidValue);
        }
    }
    Ok(())
}

fn cmd_send(
    args: &[&str],
    ctx: &mut CommandContext<'_>,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    for arg in &args[1..] {
        let _ = encode_frame(ctx.link, arg);
        let _ = write!(out, "{} ", arg);
    }
    let _ = writeln!(out);
    Ok(())
}

fn cmd_stats(
    _args: &[&str],
    ctx: &mut CommandContext<'_>,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    let snap = ctx.diag.snapshot();
    let _ = writeln!(
        out,
        "link:     {} frames rx, {} truncated",
        snap.frames_rx, snap.frames_truncated
    );
    let _ = writeln!(out, "console:  {} lines submitted", snap.lines_submitted);
    let _ = writeln!(
        out,
        "profiler: {} samples recorded, {} dropped",
        snap.samples_recorded, snap.samples_dropped
    );
    let _ = writeln!(
        out,
        "input:    {} bytes dropped, log: {} records dropped",
        snap.rx_dropped, snap.log_dropped
    );
    Ok(())
}

fn cmd_reboot(
    args: &[&str],
    _ctx: &mut CommandContext<'_>,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    if args.len() != 2 || args[1] != "confirm" {
        let _ = writeln!(out, "error: reboot requires 'confirm'");
        return Err(ConsoleError::RequiresConfirm);
    }

    #[cfg(all(not(test), target_os = "espidf"))]
    unsafe {
        esp_idf_svc::sys::esp_restart();
    }

    Ok(())
}
