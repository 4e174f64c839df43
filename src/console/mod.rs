//! Local console: line editing, history, command dispatch.
//!
//! The foreground REPL polls keystrokes, edits one line at a time, and
//! feeds finished lines to the same dispatcher the serial link uses.
//! Zero heap allocation - all static buffers.

pub mod commands;
pub mod completion;
pub mod editor;
pub mod error;
pub mod history;
pub mod line_buffer;
pub mod parser;
pub mod shell;

pub use commands::{command_names, execute, CommandContext, COMMANDS};
pub use completion::Completer;
pub use editor::LineEditor;
pub use error::ConsoleError;
pub use history::History;
pub use line_buffer::LineBuffer;
pub use parser::{tokenize, TokenList};
pub use shell::Shell;
