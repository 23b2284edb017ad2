//! Exit code definitions for the ss33 CLI
//!
//! Codes are stable: scripts branch on them. Existing values must not be
//! renumbered; new kinds get new numbers.

use ss33_core::Error;

/// Exit codes for the ss33 CLI application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,

    /// General/unspecified error, including local filesystem failures
    GeneralError = 1,

    /// User input error: invalid arguments, bad configuration, empty key
    UsageError = 2,

    /// Network, authentication or protocol failure
    TransportError = 3,

    /// Object does not exist
    NotFound = 5,

    /// Only part of the operation took effect: incomplete purge, size mismatch
    PartialFailure = 6,

    /// Operation was interrupted (e.g., Ctrl+C)
    Interrupted = 130,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::TransportError),
            5 => Some(Self::NotFound),
            6 => Some(Self::PartialFailure),
            130 => Some(Self::Interrupted),
            _ => None,
        }
    }

    /// Exit code for a library error
    pub fn from_error(error: &Error) -> Self {
        Self::from_i32(error.exit_code()).unwrap_or(Self::GeneralError)
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid arguments or configuration",
            Self::TransportError => "Transport error",
            Self::NotFound => "Object not found",
            Self::PartialFailure => "Operation only partially completed",
            Self::Interrupted => "Operation interrupted",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}
