//! Output formatting for human-readable and JSON modes

mod formatter;

pub use formatter::{Formatter, error_chain};

/// Output settings shared by every command
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit strict JSON on stdout
    pub json: bool,
    /// Disable ANSI colors
    pub no_color: bool,
    /// Suppress non-error output
    pub quiet: bool,
}
