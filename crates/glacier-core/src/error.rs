//! Error types for the Glacier core.

/// Core error type for credential, region, and configuration handling.
#[derive(Debug, thiserror::Error)]
pub enum GlacierError {
    /// Region canonical name is not a lowercase identifier, or is unknown.
    #[error("invalid region: {0} (expected a lowercase name such as us-east-1)")]
    InvalidRegion(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for core operations.
pub type GlacierResult<T> = Result<T, GlacierError>;
