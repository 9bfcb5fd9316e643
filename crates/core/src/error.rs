//! Error types for the BPE tokenizer library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the tokenizer library.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Requested vocabulary is smaller than the raw byte alphabet
    #[error("Vocabulary size must be at least 256, got {0}")]
    VocabSizeTooSmall(usize),

    /// The split pattern failed to compile
    #[error("Invalid split pattern: {0}")]
    InvalidPattern(#[from] fancy_regex::Error),

    /// The regex engine failed while splitting text (e.g. backtrack limit)
    #[error("Failed to split text: {0}")]
    Split(String),

    /// An externally supplied rank table is internally inconsistent
    #[error("Corrupt rank table: {0}")]
    CorruptRanks(String),

    /// Text contains a special token while special tokens are disallowed
    #[error("Special token {0:?} found in text")]
    SpecialTokenInText(String),

    /// Unknown token ID
    #[error("Unknown token ID: {0}")]
    UnknownTokenId(u32),

    /// Model file does not carry the expected extension
    #[error("Model file must end with .model: {0}")]
    BadExtension(PathBuf),

    /// Model file version tag mismatch
    #[error("Model file is not a minbpe model (version tag {0:?})")]
    VersionMismatch(String),

    /// Malformed model file content
    #[error("Malformed model file at line {line}: {reason}")]
    Format { line: usize, reason: String },

    /// Operation not supported by this tokenizer variant
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    /// I/O error with file context
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },
}

impl TokenizerError {
    /// Shorthand for a [`TokenizerError::Format`] at a 1-based line number.
    pub fn format(line: usize, reason: impl Into<String>) -> Self {
        Self::Format {
            line,
            reason: reason.into(),
        }
    }

    /// Attach a path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            err,
        }
    }
}

/// Result type alias for tokenizer operations.
pub type Result<T> = std::result::Result<T, TokenizerError>;
