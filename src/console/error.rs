//! Console error types

/// Command dispatch and handler errors.
///
/// Handlers return these as negative result codes; the text surfaced to
/// the user is printed at the point the error is detected, so callers only
/// inspect the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    /// No table entry matches the command name
    UnknownCommand = 1,
    /// Wrong number of arguments
    BadArgCount = 2,
    /// Argument failed numeric or keyword conversion
    InvalidValue = 3,
    /// Memory address not 4-byte aligned
    BadAlignment = 4,
    /// Dangerous command requires 'confirm'
    RequiresConfirm = 5,
}

impl ConsoleError {
    /// Negative result code (0 = success by convention).
    pub fn code(&self) -> i32 {
        -(*self as i32)
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "unknown command",
            Self::BadArgCount => "wrong argument count",
            Self::InvalidValue => "invalid value",
            Self::BadAlignment => "address must be 4-byte aligned",
            Self::RequiresConfirm => "requires 'confirm'",
        }
    }
}

impl core::fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}
