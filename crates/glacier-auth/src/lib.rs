//! AWS Signature Version 4 request signing for the Glacier API.
//!
//! This crate turns an in-memory HTTP request description into its canonical
//! form, derives the per-request signing key from a secret key, and produces
//! the final signature. It never sends anything over the network.
//!
//! # Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use glacier_auth::canonical::build_canonical_request;
//! use glacier_auth::sigv4::{build_string_to_sign, credential_scope, derive_signing_key};
//!
//! let canonical = build_canonical_request(
//!     "PUT",
//!     "/-/vaults/examplevault",
//!     "",
//!     &[("x-amz-date", "20120525T002453Z"), ("x-amz-glacier-version", "2012-06-01")],
//!     "glacier.us-east-1.amazonaws.com",
//!     std::io::empty(),
//! )
//! .unwrap();
//!
//! let date = NaiveDate::from_ymd_opt(2012, 5, 25).unwrap();
//! let scope = credential_scope(date, "us-east-1", "glacier");
//! let sts = build_string_to_sign("20120525T002453Z", &scope, canonical.to_string().as_bytes()).unwrap();
//! let key = derive_signing_key("wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY", date, "us-east-1", "glacier");
//! assert_eq!(key.sign(&sts).as_str().len(), 64);
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Canonical request construction
//! - [`credentials`] - Credential provider trait and in-memory implementation
//! - [`error`] - Error types
//! - [`request`] - Signing and verifying `http::Request` values
//! - [`sigv4`] - Signing key derivation, string to sign, and signatures

pub mod canonical;
pub mod credentials;
pub mod error;
pub mod request;
pub mod sigv4;

pub use canonical::{CanonicalRequest, build_canonical_request, hash_payload};
pub use credentials::{CredentialProvider, StaticCredentialProvider};
pub use error::AuthError;
pub use request::{AuthResult, RequestSigner, verify_request};
pub use sigv4::{Signature, SigningKey, derive_signing_key};
