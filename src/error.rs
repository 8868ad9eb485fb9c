//! Crate error types.
//!
//! Parsing a reference never fails loudly on its own; these variants surface
//! when a caller asks for strict handling or when configuration and book
//! tables cannot be loaded.

use thiserror::Error;

/// Crate result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types with enough context to act on
#[derive(Debug, Error)]
pub enum Error {
    /// IO error with path context
    #[error("IO error at {path:?}: {source}")]
    Io {
        /// The underlying IO error.
        source: std::io::Error,
        /// File path where the error occurred, if known.
        path: Option<std::path::PathBuf>,
    },

    /// Configuration error with guidance
    #[error("Configuration error: {message}. {hint}")]
    Config {
        /// Description of the configuration problem.
        message: String,
        /// Actionable guidance for fixing the issue.
        hint: &'static str,
    },

    /// Settings or book table parsing error
    #[error("Parse error in {file:?}: {message}")]
    Parse {
        /// File that failed to parse, if known.
        file: Option<std::path::PathBuf>,
        /// Description of the parse failure.
        message: String,
    },

    /// Detector pattern failed to compile (usually a pathological book table)
    #[error("Reference pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// The chapter/verse part of a reference has no recognizable shape
    #[error("Not a recognizable reference: {input:?}")]
    MalformedLocator {
        /// The text that was being expanded.
        input: String,
    },

    /// A range whose end precedes its start
    #[error("Invalid range {start}-{end} in {input:?}")]
    InvalidRange {
        /// The text that was being expanded.
        input: String,
        /// First value of the range.
        start: u32,
        /// Last value of the range.
        end: u32,
    },

    /// Book token not present in the registry (only raised on request)
    #[error("Unknown book: {0}")]
    UnknownBook(String),
}

impl Error {
    /// Create an IO error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<std::path::PathBuf>>) -> Self {
        Self::Io { source, path: path.into() }
    }

    /// Create a config error with actionable hint
    pub fn config(message: impl Into<String>, hint: &'static str) -> Self {
        Self::Config { message: message.into(), hint }
    }

    /// Create a parse error with file context
    pub fn parse(message: impl Into<String>, file: impl Into<Option<std::path::PathBuf>>) -> Self {
        Self::Parse { file: file.into(), message: message.into() }
    }

    /// Create a malformed-locator error for `input`
    pub fn malformed(input: impl Into<String>) -> Self {
        Self::MalformedLocator { input: input.into() }
    }

    /// Whether this error means "not a reference" rather than an environment failure.
    ///
    /// Lenient callers swallow these and leave the text untouched.
    pub const fn is_reference_error(&self) -> bool {
        matches!(self, Self::MalformedLocator { .. } | Self::InvalidRange { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse { file: None, message: e.to_string() }
    }
}
