//! Command line tokenizer
//!
//! Splits on runs of space, tab, and newline. Tokens borrow from the
//! dispatched line and live exactly as long as one `execute` call, so a
//! handler cannot retain them past its return.

use heapless::Vec;

/// Upper bound on tokens per dispatch. Lines with more tokens keep the
/// first `MAX_TOKENS` and silently drop the rest.
pub const MAX_TOKENS: usize = 16;

/// One dispatch call's tokens; `[0]` is the command name.
pub type TokenList<'a> = Vec<&'a str, MAX_TOKENS>;

fn is_token_space(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\n'
}

/// Split a line into whitespace-delimited tokens.
///
/// An empty or all-whitespace line yields zero tokens.
pub fn tokenize(line: &str) -> TokenList<'_> {
    let mut tokens = TokenList::new();
    for token in line.split(is_token_space).filter(|t| !t.is_empty()) {
        if tokens.push(token).is_err() {
            break;
        }
    }
    tokens
}
