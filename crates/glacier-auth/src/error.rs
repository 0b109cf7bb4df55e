//! Error types for request canonicalization and signing.
//!
//! All failures are represented by [`AuthError`]. Each message names the
//! stage that failed so a caller can log or retry at a higher layer.

/// Errors that can occur while canonicalizing, signing, or verifying a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The raw query string could not be parsed.
    #[error("canonical query string: malformed query {0:?}")]
    MalformedQuery(String),

    /// The request timestamp is neither RFC 1123 nor ISO 8601 basic format.
    #[error("string to sign: malformed timestamp {0:?}")]
    MalformedTimestamp(String),

    /// The request body could not be read to the end.
    #[error("payload hash: failed to read request body")]
    BodyRead(#[source] std::io::Error),

    /// A header value is not visible ASCII and cannot be canonicalized.
    #[error("canonical headers: invalid value for header {0}")]
    InvalidHeaderValue(String),

    /// Neither a `host` header nor a URI authority is available.
    #[error("canonical headers: request has no host")]
    MissingHost,

    /// The `Authorization` header is missing from the request.
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    /// The `Authorization` header could not be parsed.
    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    /// The signing algorithm is not supported (only AWS4-HMAC-SHA256 is supported).
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A required HTTP header is missing.
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// The `Credential` component does not match
    /// `AKID/date/region/service/aws4_request`.
    #[error("Invalid credential format")]
    InvalidCredential,

    /// The access key ID was not found in the credential store.
    #[error("Access key not found: {0}")]
    AccessKeyNotFound(String),

    /// The computed signature does not match the provided signature.
    #[error("Signature does not match")]
    SignatureDoesNotMatch,
}
