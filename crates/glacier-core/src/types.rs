//! Credential and region value types handed to the signer.

use std::borrow::Cow;
use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{GlacierError, GlacierResult};

/// An access key ID and its secret access key.
///
/// The secret is wiped from memory when the value is dropped and never shows
/// up in `Debug` output.
///
/// # Examples
///
/// ```
/// use glacier_core::Credentials;
///
/// let creds = Credentials::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY");
/// assert_eq!(creds.access_key_id(), "AKIDEXAMPLE");
/// assert!(!format!("{creds:?}").contains("EXAMPLEKEY"));
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
}

impl Credentials {
    /// Create credentials from an access key ID and secret access key.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    /// The public access key ID.
    #[must_use]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// The secret access key. Callers must not log this value.
    #[must_use]
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// A service region: a human readable label, the canonical name used in the
/// credential scope, and the archive service endpoint host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Region {
    label: Cow<'static, str>,
    name: Cow<'static, str>,
    endpoint: Cow<'static, str>,
}

impl Region {
    /// US East (Northern Virginia).
    pub const US_EAST_1: Self = Self::predefined(
        "US East (Northern Virginia)",
        "us-east-1",
        "glacier.us-east-1.amazonaws.com",
    );

    /// US West (Oregon).
    pub const US_WEST_2: Self = Self::predefined(
        "US West (Oregon)",
        "us-west-2",
        "glacier.us-west-2.amazonaws.com",
    );

    /// EU (Ireland).
    pub const EU_WEST_1: Self =
        Self::predefined("EU (Ireland)", "eu-west-1", "glacier.eu-west-1.amazonaws.com");

    /// Asia Pacific (Tokyo).
    pub const AP_NORTHEAST_1: Self = Self::predefined(
        "Asia Pacific (Tokyo)",
        "ap-northeast-1",
        "glacier.ap-northeast-1.amazonaws.com",
    );

    const KNOWN: [Self; 4] = [
        Self::US_EAST_1,
        Self::US_WEST_2,
        Self::EU_WEST_1,
        Self::AP_NORTHEAST_1,
    ];

    const fn predefined(label: &'static str, name: &'static str, endpoint: &'static str) -> Self {
        Self {
            label: Cow::Borrowed(label),
            name: Cow::Borrowed(name),
            endpoint: Cow::Borrowed(endpoint),
        }
    }

    /// Create a region that is not predefined.
    ///
    /// # Errors
    ///
    /// Returns [`GlacierError::InvalidRegion`] if `name` is empty or contains
    /// anything other than lowercase ASCII letters, digits, and `-`.
    pub fn custom(
        label: impl Into<String>,
        name: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> GlacierResult<Self> {
        let name = name.into();
        let valid = !name.is_empty()
            && name
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        if !valid {
            return Err(GlacierError::InvalidRegion(name));
        }
        Ok(Self {
            label: Cow::Owned(label.into()),
            name: Cow::Owned(name),
            endpoint: Cow::Owned(endpoint.into()),
        })
    }

    /// Look up a predefined region by canonical name.
    ///
    /// # Errors
    ///
    /// Returns [`GlacierError::InvalidRegion`] for names that are not predefined.
    pub fn from_name(name: &str) -> GlacierResult<Self> {
        Self::KNOWN
            .into_iter()
            .find(|region| region.name == name)
            .ok_or_else(|| GlacierError::InvalidRegion(name.to_owned()))
    }

    /// Human readable label, e.g. `US East (Northern Virginia)`.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Canonical name used in the credential scope, e.g. `us-east-1`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Endpoint host of the archive service in this region.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::US_EAST_1
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
