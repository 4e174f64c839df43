//! Line editor tests
//!
//! Each test scripts an exact keystroke sequence (ending in Enter) and
//! checks the finished line plus what was echoed.

use rust_serial_console::console::{History, LineEditor};
use rust_serial_console::io::SliceSource;

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

    fn bells(&self) -> usize {
        self.buf[..self.len].iter().filter(|&&b| b == 0x07).count()
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

fn read_line(history: &History, keys: &[u8]) -> (String, TestOutput) {
    let mut editor = LineEditor::new();
    let mut src = SliceSource::new(keys);
    let mut out = TestOutput::new();
    let line = editor.read_line(&mut src, history, &mut out).to_string();
    (line, out)
}

#[test]
fn test_plain_typing() {
    let history = History::new();
    let (line, out) = read_line(&history, b"help\n");

    assert_eq!(line, "help");
    assert!(out.as_str().contains("help"));
}

#[test]
fn test_backspace_edits_line() {
    let history = History::new();
    // "abc", Backspace, "d" -> "abd"
    let (line, _out) = read_line(&history, b"abc\x7Fd\n");
    assert_eq!(line, "abd");
}

#[test]
fn test_backspace_byte_variants() {
    let history = History::new();
    let (line, _out) = read_line(&history, b"abc\x08d\n");
    assert_eq!(line, "abd");
}

#[test]
fn test_backspace_on_empty_line_bells() {
    let history = History::new();
    let (line, out) = read_line(&history, b"\x7F\n");

    assert_eq!(line, "");
    assert_eq!(out.bells(), 1);
}

#[test]
fn test_clear_line() {
    let history = History::new();
    let (line, _out) = read_line(&history, b"abc\x15xy\n");
    assert_eq!(line, "xy");
}

#[test]
fn test_clear_line_mid_cursor() {
    let history = History::new();
    // Ctrl+A then Ctrl+U: clearing must work from any cursor position
    let (line, _out) = read_line(&history, b"abc\x01\x15\n");
    assert_eq!(line, "");
}

#[test]
fn test_cursor_home_insert() {
    let history = History::new();
    // Type "bc", Ctrl+A, type "a"
    let (line, _out) = read_line(&history, b"bc\x01a\n");
    assert_eq!(line, "abc");
}

#[test]
fn test_cursor_end_after_home() {
    let history = History::new();
    let (line, _out) = read_line(&history, b"abc\x01\x05d\n");
    assert_eq!(line, "abcd");
}

#[test]
fn test_full_line_insert_bells() {
    let history = History::new();
    let mut keys: Vec<u8> = std::iter::repeat(b'x').take(79).collect();
    keys.push(b'y');
    keys.push(b'\n');

    let (line, out) = read_line(&history, &keys);
    assert_eq!(line.len(), 79);
    assert_eq!(out.bells(), 1);
}

#[test]
fn test_recall_previous_line() {
    let mut history = History::new();
    history.append("first");
    history.append("second");

    // Up arrow recalls the newest submission
    let (line, _out) = read_line(&history, b"\x1B[A\n");
    assert_eq!(line, "second");

    // Up twice reaches the older one
    let (line, _out) = read_line(&history, b"\x1B[A\x1B[A\n");
    assert_eq!(line, "first");
}

#[test]
fn test_recall_past_oldest_bells() {
    let mut history = History::new();
    history.append("only");

    let (line, out) = read_line(&history, b"\x1B[A\x1B[A\n");
    assert_eq!(line, "only");
    assert_eq!(out.bells(), 1);
}

#[test]
fn test_recall_down_past_newest_bells() {
    let mut history = History::new();
    history.append("cmd");

    let (line, out) = read_line(&history, b"\x1B[B\n");
    assert_eq!(line, "");
    assert_eq!(out.bells(), 1);
}

#[test]
fn test_recall_up_then_down_returns_blank() {
    let mut history = History::new();
    history.append("cmd");

    let (line, _out) = read_line(&history, b"\x1B[A\x1B[B\n");
    assert_eq!(line, "");
}

#[test]
fn test_recalled_line_is_editable() {
    let mut history = History::new();
    history.append("profile on");

    // Recall then backspace twice and retype
    let (line, _out) = read_line(&history, b"\x1B[A\x7F\x7Fff\n");
    assert_eq!(line, "profile ff");
}

#[test]
fn test_unknown_escape_sequence_ignored() {
    let history = History::new();
    // ESC [ C (cursor right) is not an edit operation
    let (line, _out) = read_line(&history, b"ab\x1B[Cc\n");
    assert_eq!(line, "abc");
}

#[test]
fn test_tab_completes_unique_command_prefix() {
    let history = History::new();
    let (line, _out) = read_line(&history, b"hel\t\n");
    assert_eq!(line, "help");
}

#[test]
fn test_tab_with_no_match_leaves_line() {
    let history = History::new();
    let (line, _out) = read_line(&history, b"zz\t\n");
    assert_eq!(line, "zz");
}

#[test]
fn test_control_bytes_not_inserted() {
    let history = History::new();
    // A stray control byte is neither printed nor buffered
    let (line, _out) = read_line(&history, b"a\x02b\n");
    assert_eq!(line, "ab");
}
