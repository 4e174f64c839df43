//! Command handler tests

use rust_serial_console::console::{execute, CommandContext, ConsoleError, COMMANDS};
use rust_serial_console::diag::DiagCounters;
use rust_serial_console::profiler::{NoSymbols, Profiler, SampleClock};

// Test output buffer
struct TestOutput {
    buf: [u8; 4096],
    len: usize,
}

impl TestOutput {
    fn new() -> Self {
        Self {
            buf: [0u8; 4096],
            len: 0,
        }
    }

    fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap()
    }

    fn contains(&self, needle: &str) -> bool {
        self.as_str().contains(needle)
    }
}

impl core::fmt::Write for TestOutput {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let to_copy = bytes.len().min(self.buf.len() - self.len);
        self.buf[self.len..self.len + to_copy].copy_from_slice(&bytes[..to_copy]);
        self.len += to_copy;
        Ok(())
    }
}

#[derive(Default)]
struct TestClock {
    started: u32,
    stopped: u32,
}

impl SampleClock for TestClock {
    fn start(&mut self) {
        self.started += 1;
    }

    fn stop(&mut self) {
        self.stopped += 1;
    }
}

/// Run one dispatch against fresh state, returning the result and the
/// console output.
fn run(line: &str) -> (Result<(), ConsoleError>, TestOutput) {
    let mut profiler = Profiler::new();
    let mut clock = TestClock::default();
    let mut link = TestOutput::new();
    let diag = DiagCounters::new();

    let mut ctx = CommandContext {
        profiler: &mut profiler,
        clock: &mut clock,
        symbols: &NoSymbols,
        link: &mut link,
        diag: &diag,
    };

    let mut out = TestOutput::new();
    let result = execute(line, &mut ctx, &mut out);
    (result, out)
}

#[test]
fn test_command_registry_has_all_commands() {
    let expected = [
        "help", "echo", "clear", "peek", "poke", "profile", "send", "stats", "reboot",
    ];

    for name in expected {
        assert!(
            COMMANDS.iter().any(|c| c.name == name),
            "Command '{}' should be in registry",
            name
        );
    }
}

#[test]
fn test_execute_unknown_command() {
    let (result, out) = run("bogus");
    assert_eq!(result, Err(ConsoleError::UnknownCommand));
    assert!(out.contains("no such command 'bogus'"));
}

#[test]
fn test_execute_empty_line_is_silent_noop() {
    let (result, out) = run("");
    assert!(result.is_ok());
    assert_eq!(out.as_str(), "");

    let (result, out) = run("   \t ");
    assert!(result.is_ok());
    assert_eq!(out.as_str(), "");
}

#[test]
fn test_echo_sees_all_tokens() {
    // "echo hi there" reaches the handler as three tokens
    let (result, out) = run("echo hi there");
    assert!(result.is_ok());
    assert!(out.contains("hi there"));
}

#[test]
fn test_help_lists_all_commands() {
    let (result, out) = run("help");
    assert!(result.is_ok());
    for c in COMMANDS {
        assert!(out.contains(c.name));
    }
}

#[test]
fn test_help_single_command_shows_usage() {
    let (result, out) = run("help peek");
    assert!(result.is_ok());
    assert!(out.contains("peek [addr]"));
}

#[test]
fn test_help_unknown_command() {
    let (result, out) = run("help nothere");
    assert_eq!(result, Err(ConsoleError::UnknownCommand));
    assert!(out.contains("no such command 'nothere'"));
}

#[test]
fn test_peek_argument_validation() {
    let (result, out) = run("peek");
    assert_eq!(result, Err(ConsoleError::BadArgCount));
    assert!(out.contains("peek expects 1 argument"));

    let (result, out) = run("peek bob");
    assert_eq!(result, Err(ConsoleError::InvalidValue));
    assert!(out.contains("cannot convert 'bob'"));

    let (result, out) = run("peek 0x1002");
    assert_eq!(result, Err(ConsoleError::BadAlignment));
    assert!(out.contains("4-byte aligned"));
}

#[test]
fn test_peek_accepts_aligned_hex_and_decimal() {
    let (result, out) = run("peek 0x40000000");
    assert!(result.is_ok());
    assert!(out.contains("0x40000000"));

    let (result, _out) = run("peek 4096");
    assert!(result.is_ok());
}

#[test]
fn test_poke_argument_validation() {
    let (result, out) = run("poke 0x1000");
    assert_eq!(result, Err(ConsoleError::BadArgCount));
    assert!(out.contains("poke expects 2 arguments"));

    let (result, out) = run("poke 0x1000 junk");
    assert_eq!(result, Err(ConsoleError::InvalidValue));
    assert!(out.contains("cannot convert 'junk'"));

    let (result, _out) = run("poke 0x3 1");
    assert_eq!(result, Err(ConsoleError::BadAlignment));
}

#[test]
fn test_profile_argument_validation() {
    let (result, out) = run("profile");
    assert_eq!(result, Err(ConsoleError::BadArgCount));
    assert!(out.contains("profile expects 1 argument"));

    let (result, out) = run("profile sideways");
    assert_eq!(result, Err(ConsoleError::InvalidValue));
    assert!(out.contains("cannot convert 'sideways'"));
}

#[test]
fn test_profile_on_arms_clock_and_resets_session() {
    let mut profiler = Profiler::new();
    let mut clock = TestClock::default();
    let mut link = TestOutput::new();
    let diag = DiagCounters::new();
    let mut out = TestOutput::new();

    {
        let mut ctx = CommandContext {
            profiler: &mut profiler,
            clock: &mut clock,
            symbols: &NoSymbols,
            link: &mut link,
            diag: &diag,
        };
        let result = execute("profile on", &mut ctx, &mut out);
        assert!(result.is_ok());
    }

    assert_eq!(clock.started, 1);
    assert_eq!(clock.stopped, 0);
    assert!(profiler.is_enabled());
    assert!(out.contains("Profiling started."));
}

#[test]
fn test_profile_off_stops_clock_and_reports() {
    let mut profiler = Profiler::new();
    let mut clock = TestClock::default();
    let mut link = TestOutput::new();
    let diag = DiagCounters::new();
    let mut out = TestOutput::new();

    {
        let mut ctx = CommandContext {
            profiler: &mut profiler,
            clock: &mut clock,
            symbols: &NoSymbols,
            link: &mut link,
            diag: &diag,
        };
        execute("profile on", &mut ctx, &mut out).unwrap();
        ctx.profiler.record(0x4200);
        ctx.profiler.record(0x4200);
        execute("profile off", &mut ctx, &mut out).unwrap();
    }

    assert_eq!(clock.stopped, 1);
    assert!(!profiler.is_enabled());
    assert!(out.contains("Counts"));
    assert!(out.contains("0x00004200"));
    assert!(out.contains("Profiling stopped."));
}

#[test]
fn test_send_frames_each_argument() {
    let mut profiler = Profiler::new();
    let mut clock = TestClock::default();
    let mut link = TestOutput::new();
    let diag = DiagCounters::new();
    let mut out = TestOutput::new();

    {
        let mut ctx = CommandContext {
            profiler: &mut profiler,
            clock: &mut clock,
            symbols: &NoSymbols,
            link: &mut link,
            diag: &diag,
        };
        execute("send buy sell", &mut ctx, &mut out).unwrap();
    }

    assert_eq!(link.as_str(), "###buy######sell###");
    assert!(out.contains("buy sell"));
}

#[test]
fn test_stats_reports_counters() {
    let mut profiler = Profiler::new();
    let mut clock = TestClock::default();
    let mut link = TestOutput::new();
    let diag = DiagCounters::new();
    DiagCounters::count(&diag.frames_rx);
    DiagCounters::count(&diag.frames_rx);
    DiagCounters::count(&diag.samples_dropped);

    let mut out = TestOutput::new();
    {
        let mut ctx = CommandContext {
            profiler: &mut profiler,
            clock: &mut clock,
            symbols: &NoSymbols,
            link: &mut link,
            diag: &diag,
        };
        execute("stats", &mut ctx, &mut out).unwrap();
    }

    assert!(out.contains("2 frames rx"));
    assert!(out.contains("1 dropped"));
}

#[test]
fn test_reboot_requires_confirm() {
    let (result, out) = run("reboot");
    assert_eq!(result, Err(ConsoleError::RequiresConfirm));
    assert!(out.contains("requires 'confirm'"));
}

#[test]
fn test_error_codes_are_negative() {
    assert!(ConsoleError::UnknownCommand.code() < 0);
    assert!(ConsoleError::BadArgCount.code() < 0);
    assert_ne!(
        ConsoleError::UnknownCommand.code(),
        ConsoleError::BadArgCount.code()
    );
}
