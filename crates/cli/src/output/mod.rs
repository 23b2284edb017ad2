//! Output formatting utilities
//!
//! Human-readable or JSON output for every command, with optional color.

mod formatter;

pub use formatter::Formatter;

/// Output configuration derived from CLI flags
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Use JSON output format
    pub json: bool,
    /// Disable colored output
    pub no_color: bool,
    /// Suppress non-error output
    pub quiet: bool,
}
