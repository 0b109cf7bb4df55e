//! Credential lookup for request verification.
//!
//! [`CredentialProvider`] resolves [`Credentials`] from an access key ID.
//! [`StaticCredentialProvider`] keeps a fixed set in memory.

use std::collections::HashMap;

use glacier_core::Credentials;

use crate::error::AuthError;

/// Trait for looking up credentials by access key ID.
///
/// Implementations may back this with a database, configuration file,
/// or any other credential store.
pub trait CredentialProvider: Send + Sync {
    /// Retrieve the credentials for the given access key ID.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AccessKeyNotFound`] if the access key ID is not recognized.
    fn credentials(&self, access_key_id: &str) -> Result<Credentials, AuthError>;
}

/// A simple in-memory credential provider.
///
/// # Examples
///
/// ```
/// use glacier_auth::credentials::{CredentialProvider, StaticCredentialProvider};
/// use glacier_core::Credentials;
///
/// let provider = StaticCredentialProvider::new([Credentials::new("AKIDEXAMPLE", "secret")]);
///
/// let creds = provider.credentials("AKIDEXAMPLE").unwrap();
/// assert_eq!(creds.secret_access_key(), "secret");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialProvider {
    credentials: HashMap<String, Credentials>,
}

impl StaticCredentialProvider {
    /// Create a provider from an iterable of credentials, keyed by access key ID.
    pub fn new(credentials: impl IntoIterator<Item = Credentials>) -> Self {
        Self {
            credentials: credentials
                .into_iter()
                .map(|creds| (creds.access_key_id().to_owned(), creds))
                .collect(),
        }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn credentials(&self, access_key_id: &str) -> Result<Credentials, AuthError> {
        self.credentials
            .get(access_key_id)
            .cloned()
            .ok_or_else(|| AuthError::AccessKeyNotFound(access_key_id.to_owned()))
    }
}
