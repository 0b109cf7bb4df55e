//! Error types for tree hashing.

/// Errors that can occur while computing or parsing a tree hash.
#[derive(Debug, thiserror::Error)]
pub enum TreeHashError {
    /// The input stream failed before end of stream.
    #[error("tree hash: failed to read input stream")]
    Read(#[source] std::io::Error),

    /// A tree hash string is not 64 hex characters.
    #[error("invalid tree hash {0:?}: expected 64 hex characters")]
    InvalidHex(String),
}
