//! Question-bank error types.
//!
//! Bank-load failures are fatal at session start: a session must never begin
//! against a missing or malformed bank, so these errors propagate instead of
//! degrading.

use thiserror::Error;

/// Errors raised while loading a question bank.
#[derive(Debug, Error)]
pub enum BankError {
    /// The bank file could not be read.
    #[error("failed to read question bank {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The bank file is not valid JSON in the expected shape.
    #[error("malformed question bank {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A bucket key is not a level in 0-5.
    #[error("invalid level key '{key}' in question bank")]
    InvalidLevelKey { key: String },

    /// A question declares an authored level different from its bucket.
    #[error("question '{id}' is authored for level {authored} but stored under level {bucket}")]
    LevelMismatch {
        id: String,
        authored: u8,
        bucket: u8,
    },

    /// A question references an option or item index that does not exist.
    #[error("question '{id}' has an out-of-range answer reference")]
    AnswerOutOfRange { id: String },

    /// The bank contains no questions at all.
    #[error("question bank is empty")]
    Empty,
}
