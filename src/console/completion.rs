//! Tab completion with cycling

/// Longest command-name prefix the completer tracks.
const PREFIX_MAX: usize = 32;

/// Tab completion state
pub struct Completer {
    prefix: [u8; PREFIX_MAX],
    prefix_len: usize,
    match_idx: usize,
    cycling: bool,
}

impl Completer {
    pub const fn new() -> Self {
        Self {
            prefix: [0u8; PREFIX_MAX],
            prefix_len: 0,
            match_idx: 0,
            cycling: false,
        }
    }

    /// Complete `prefix` against `candidates`, cycling through the matches
    /// on repeated calls with the same prefix.
    pub fn complete<'a, I>(&mut self, prefix: &str, candidates: I) -> Option<&'a str>
    where
        I: Iterator<Item = &'a str>,
    {
        let prefix_bytes = prefix.as_bytes();

        let same_prefix = prefix_bytes.len() == self.prefix_len
            && prefix_bytes == &self.prefix[..self.prefix_len];

        if !same_prefix {
            self.prefix_len = prefix_bytes.len().min(PREFIX_MAX);
            self.prefix[..self.prefix_len].copy_from_slice(&prefix_bytes[..self.prefix_len]);
            self.match_idx = 0;
            self.cycling = false;
        } else if self.cycling {
            self.match_idx += 1;
        }

        let mut matches: [Option<&str>; PREFIX_MAX] = [None; PREFIX_MAX];
        let mut match_count = 0;

        for c in candidates {
            if c.starts_with(prefix) && match_count < PREFIX_MAX {
                matches[match_count] = Some(c);
                match_count += 1;
            }
        }

        if match_count == 0 {
            self.cycling = false;
            return None;
        }

        if self.match_idx >= match_count {
            self.match_idx = 0;
        }

        self.cycling = true;
        matches[self.match_idx]
    }

    /// Reset cycling (call when the user types anything but Tab).
    pub fn reset(&mut self) {
        self.cycling = false;
        self.match_idx = 0;
    }
}

impl Default for Completer {
    fn default() -> Self {
        Self::new()
    }
}
