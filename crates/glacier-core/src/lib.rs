//! Core types and configuration shared by the Glacier signing crates.
//!
//! This crate holds the value types that callers hand to the signer
//! ([`Credentials`], [`Region`]), the environment-driven [`GlacierConfig`],
//! and the [`GlacierError`] type used when those values are invalid.

mod config;
mod error;
mod types;

pub use config::{DEFAULT_SERVICE, GlacierConfig};
pub use error::{GlacierError, GlacierResult};
pub use types::{Credentials, Region};
