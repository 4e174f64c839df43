//! Line editor
//!
//! Turns the per-keystroke byte stream into one finished line. Every
//! accepted edit is echoed; every rejected one rings the bell and mutates
//! nothing. There is no error channel here, only the bell.
//!
//! Arrow keys arrive as ANSI sequences (`ESC [ A` / `ESC [ B`), decoded by
//! a three-state machine. Mid-line edits repaint the tail of the line with
//! plain backspace/overwrite sequences; no cursor addressing is assumed of
//! the terminal.

use core::fmt::Write;

use super::commands::command_names;
use super::completion::Completer;
use super::history::History;
use super::line_buffer::LineBuffer;
use crate::io::{ByteSource, BELL};

#[derive(Clone, Copy, PartialEq)]
enum EscapeState {
    Normal,
    Escape,  // Got ESC
    Bracket, // Got ESC [
}

/// Keystroke-to-line state machine.
pub struct LineEditor {
    line: LineBuffer,
    /// History recall position; 0 = editing a fresh line.
    recall: usize,
    escape: EscapeState,
    completer: Completer,
}

impl LineEditor {
    pub const fn new() -> Self {
        Self {
            line: LineBuffer::new(),
            recall: 0,
            escape: EscapeState::Normal,
            completer: Completer::new(),
        }
    }

    /// Block until Enter, then return the finished line.
    ///
    /// Cooperative poll with no sleep and no timeout; the returned line is
    /// always shorter than the buffer capacity.
    pub fn read_line<'a>(
        &'a mut self,
        src: &mut dyn ByteSource,
        history: &History,
        out: &mut dyn Write,
    ) -> &'a str {
        self.line.clear();
        self.recall = 0;
        self.escape = EscapeState::Normal;
        self.completer.reset();

        loop {
            let byte = src.read_byte();
            if self.feed(byte, history, out) {
                break;
            }
        }
        self.line.as_str()
    }

    /// Process one input byte. Returns `true` when the line is complete.
    pub fn feed(&mut self, byte: u8, history: &History, out: &mut dyn Write) -> bool {
        match self.escape {
            EscapeState::Normal => self.feed_normal(byte, history, out),
            EscapeState::Escape => {
                self.escape = if byte == b'[' {
                    EscapeState::Bracket
                } else {
                    EscapeState::Normal
                };
                false
            }
            EscapeState::Bracket => {
                self.escape = EscapeState::Normal;
                match byte {
                    b'A' => self.recall_up(history, out),
                    b'B' => self.recall_down(history, out),
                    _ => {}
                }
                false
            }
        }
    }

    fn feed_normal(&mut self, byte: u8, history: &History, out: &mut dyn Write) -> bool {
        match byte {
            // Enter
            b'\r' | b'\n' => {
                let _ = writeln!(out);
                true
            }

            // Backspace
            0x7F | 0x08 => {
                if self.line.backspace() {
                    let _ = write!(out, "\x08");
                    self.repaint_tail(out, true);
                } else {
                    bell(out);
                }
                self.completer.reset();
                false
            }

            // Tab
            b'\t' => {
                self.complete_command(out);
                false
            }

            // Ctrl+A: cursor to line start
            0x01 => {
                for _ in 0..self.line.cursor() {
                    let _ = write!(out, "\x08");
                }
                self.line.move_home();
                false
            }

            // Ctrl+E: cursor to line end
            0x05 => {
                let _ = write!(out, "{}", self.line.tail());
                self.line.move_end();
                false
            }

            // Ctrl+U: clear line
            0x15 => {
                self.erase_display(out);
                self.line.clear();
                false
            }

            // Escape
            0x1B => {
                self.escape = EscapeState::Escape;
                false
            }

            // Printable character
            0x20..=0x7E => {
                if self.line.insert(byte) {
                    let _ = write!(out, "{}", byte as char);
                    self.repaint_tail(out, false);
                } else {
                    bell(out);
                }
                self.completer.reset();
                false
            }

            _ => false,
        }
    }

    fn recall_up(&mut self, history: &History, out: &mut dyn Write) {
        match history.recall(self.recall + 1) {
            Some(text) => {
                self.recall += 1;
                self.replace_line(text, out);
            }
            None => bell(out),
        }
    }

    fn recall_down(&mut self, history: &History, out: &mut dyn Write) {
        if self.recall == 0 {
            bell(out);
            return;
        }
        self.recall -= 1;
        // recall(0) is the blank "not recalling" line
        let text = history.recall(self.recall).unwrap_or("");
        self.replace_line(text, out);
    }

    /// Redraw everything right of the cursor after a mid-line edit, then
    /// park the terminal cursor back where it belongs. `erased` adds one
    /// blanking space for a shrunken line.
    fn repaint_tail(&mut self, out: &mut dyn Write, erased: bool) {
        let tail = self.line.tail();
        let _ = write!(out, "{}", tail);
        let mut cells = tail.len();
        if erased {
            let _ = write!(out, " ");
            cells += 1;
        }
        for _ in 0..cells {
            let _ = write!(out, "\x08");
        }
    }

    /// Blank the whole displayed line, leaving the terminal cursor at
    /// column 0.
    fn erase_display(&mut self, out: &mut dyn Write) {
        let _ = write!(out, "{}", self.line.tail());
        for _ in 0..self.line.len() {
            let _ = write!(out, "\x08 \x08");
        }
    }

    fn replace_line(&mut self, text: &str, out: &mut dyn Write) {
        self.erase_display(out);
        self.line.set(text);
        let _ = write!(out, "{}", text);
    }

    fn complete_command(&mut self, out: &mut dyn Write) {
        // Only the command word completes, and only while typing at its end
        if self.line.cursor() != self.line.len() {
            return;
        }
        let input = self.line.as_str();
        if input.is_empty() || input.contains(' ') {
            return;
        }

        let prefix_len = input.len();
        let Some(completed) = self.completer.complete(input, command_names()) else {
            return;
        };

        for _ in 0..prefix_len {
            self.line.backspace();
            let _ = write!(out, "\x08 \x08");
        }
        for c in completed.bytes() {
            if self.line.insert(c) {
                let _ = write!(out, "{}", c as char);
            }
        }
    }
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}

fn bell(out: &mut dyn Write) {
    let _ = write!(out, "{}", BELL as char);
}
