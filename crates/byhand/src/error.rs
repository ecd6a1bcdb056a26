//! Error types for the `byhand` runtime.
//!
//! The runtime has exactly one failure path: indexing a string outside its
//! bounds. Everything else (`hashCode`, `equals`, `toString`, `getClass`,
//! `isInstance`, ...) is total.

use std::fmt;

/// Errors that can occur in the `byhand` runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `charAt` was called with an index outside `[0, length)`.
    IndexOutOfBounds {
        /// The rejected index.
        index: i32,
        /// Text of the string that was indexed.
        text: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IndexOutOfBounds { index, text } => {
                write!(f, "Index {index} out of bounds for string {text}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;
