//! Foreground REPL
//!
//! Prompt, read one edited line, record it, dispatch it, forever. The
//! prompt number is the absolute submission count, and the literal line
//! `history` is handled here rather than in the command table so that it
//! can reach the ring the editor recalls from.

use core::fmt::Write;

use super::commands::{execute, CommandContext};
use super::editor::LineEditor;
use super::history::History;
use crate::diag::DiagCounters;
use crate::io::ByteSource;
use crate::logging::LogRing;

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

/// Console state: editor plus history plus the submission counter the
/// prompt displays.
pub struct Shell {
    editor: LineEditor,
    history: History,
}

impl Shell {
    pub const fn new() -> Self {
        Self {
            editor: LineEditor::new(),
            history: History::new(),
        }
    }

    /// Print welcome banner
    pub fn print_banner(&self, out: &mut dyn Write) {
        let _ = writeln!(out, "\r\n{}", VERSION);
        let _ = writeln!(out, "Type 'help' for commands.\r");
    }

    /// Numbered prompt for the next submission.
    pub fn print_prompt(&self, out: &mut dyn Write) {
        let _ = write!(out, "[{}] > ", self.history.submissions() + 1);
    }

    /// One prompt-read-dispatch cycle.
    ///
    /// Every submitted line lands in history, empty ones included; the
    /// prompt number is exactly the submission count.
    pub fn run_once(
        &mut self,
        src: &mut dyn ByteSource,
        ctx: &mut CommandContext<'_>,
        out: &mut dyn Write,
    ) {
        self.print_prompt(out);
        let line = self.editor.read_line(src, &self.history, out);
        self.history.append(line);
        DiagCounters::count(&ctx.diag.lines_submitted);

        if line == "history" {
            for (seq, entry) in self.history.iter_recent() {
                let _ = writeln!(out, "[{}] {}", seq, entry);
            }
        } else {
            // Errors were already printed where they were detected
            let _ = execute(line, ctx, out);
        }
    }

    /// Run the console forever, draining pending log records before each
    /// prompt.
    pub fn run(
        &mut self,
        src: &mut dyn ByteSource,
        ctx: &mut CommandContext<'_>,
        log: &LogRing,
        out: &mut dyn Write,
    ) -> ! {
        self.print_banner(out);
        loop {
            while let Some(record) = log.drain() {
                let _ = writeln!(out, "[{}] {}: {}", record.seq, record.level.as_str(), record.text());
            }
            self.run_once(src, ctx, out);
        }
    }

    /// The history ring, for platform glue that needs to inspect it.
    pub fn history(&self) -> &History {
        &self.history
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}
