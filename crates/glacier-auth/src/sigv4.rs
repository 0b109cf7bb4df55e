//! AWS Signature Version 4 key derivation and signing.
//!
//! Signing runs in three steps:
//!
//! 1. Build the string to sign from the request timestamp, the credential
//!    scope, and the hash of the canonical request.
//! 2. Derive the signing key from the secret key through an HMAC-SHA256 chain
//!    over the date, region, service, and the `aws4_request` terminator.
//! 3. HMAC the string to sign with the signing key and hex-encode the result.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::AuthError;

/// The signing algorithm identifier.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// The last component of every credential scope.
pub const SCOPE_TERMINATOR: &str = "aws4_request";

/// `YYYYMMDDTHHMMSSZ`, the timestamp form used in the string to sign.
const ISO8601_BASIC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// RFC 1123 without its zone name, for zones RFC 2822 parsing rejects.
const RFC1123_ZONELESS_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

/// `YYYYMMDD`, the date form used in the credential scope.
const DATE_FORMAT: &str = "%Y%m%d";

type HmacSha256 = Hmac<Sha256>;

/// A derived signing key, valid for one (date, region, service) triple.
///
/// The key bytes are wiped on drop and never printed by `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningKey([u8; 32]);

impl SigningKey {
    /// The raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Sign a string to sign with this key.
    #[must_use]
    pub fn sign(&self, string_to_sign: &str) -> Signature {
        compute_signature(self, string_to_sign)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// A lowercase hex HMAC-SHA256 request signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(String);

impl Signature {
    /// The signature as a 64-character lowercase hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the SigV4 signing key using the HMAC-SHA256 chain.
///
/// ```text
/// DateKey              = HMAC-SHA256("AWS4" + secret_key, date)
/// DateRegionKey        = HMAC-SHA256(DateKey, region)
/// DateRegionServiceKey = HMAC-SHA256(DateRegionKey, service)
/// SigningKey           = HMAC-SHA256(DateRegionServiceKey, "aws4_request")
/// ```
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use glacier_auth::sigv4::derive_signing_key;
///
/// let date = NaiveDate::from_ymd_opt(2015, 8, 30).unwrap();
/// let a = derive_signing_key("secret", date, "us-east-1", "glacier");
/// let b = derive_signing_key("secret", date, "us-east-1", "glacier");
/// assert_eq!(a.as_bytes(), b.as_bytes());
/// ```
#[must_use]
pub fn derive_signing_key(
    secret_key: &str,
    date: NaiveDate,
    region: &str,
    service: &str,
) -> SigningKey {
    let initial_key = Zeroizing::new(format!("AWS4{secret_key}"));
    let date_key = Zeroizing::new(hmac_sha256(
        initial_key.as_bytes(),
        date.format(DATE_FORMAT).to_string().as_bytes(),
    ));
    let date_region_key = Zeroizing::new(hmac_sha256(&*date_key, region.as_bytes()));
    let date_region_service_key =
        Zeroizing::new(hmac_sha256(&*date_region_key, service.as_bytes()));
    SigningKey(hmac_sha256(
        &*date_region_service_key,
        SCOPE_TERMINATOR.as_bytes(),
    ))
}

/// Build the credential scope string `date/region/service/aws4_request`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use glacier_auth::sigv4::credential_scope;
///
/// let date = NaiveDate::from_ymd_opt(2012, 5, 25).unwrap();
/// assert_eq!(
///     credential_scope(date, "us-east-1", "glacier"),
///     "20120525/us-east-1/glacier/aws4_request"
/// );
/// ```
#[must_use]
pub fn credential_scope(date: NaiveDate, region: &str, service: &str) -> String {
    format!(
        "{}/{region}/{service}/{SCOPE_TERMINATOR}",
        date.format(DATE_FORMAT)
    )
}

/// Parse a request timestamp into a UTC instant.
///
/// Accepts the RFC 1123 form of the `Date` header
/// (`Sun, 30 Aug 2015 12:36:00 GMT`) and the ISO 8601 basic form of the
/// `x-amz-date` header (`20150830T123600Z`). Numeric offsets and the zone
/// names RFC 2822 defines are converted to UTC; any other alphabetic zone
/// name, such as `UTC`, is read as UTC.
///
/// # Errors
///
/// Returns [`AuthError::MalformedTimestamp`] if no form matches.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, AuthError> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc2822(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    if let Some((datetime, zone)) = value.rsplit_once(' ')
        && !zone.is_empty()
        && zone.bytes().all(|b| b.is_ascii_alphabetic())
    {
        return NaiveDateTime::parse_from_str(datetime, RFC1123_ZONELESS_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|_| AuthError::MalformedTimestamp(value.to_owned()));
    }
    NaiveDateTime::parse_from_str(value, ISO8601_BASIC_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| AuthError::MalformedTimestamp(value.to_owned()))
}

/// Format a UTC instant as `YYYYMMDDTHHMMSSZ`.
#[must_use]
pub fn format_amz_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(ISO8601_BASIC_FORMAT).to_string()
}

/// Build the SigV4 string to sign.
///
/// Format:
/// ```text
/// AWS4-HMAC-SHA256\n
/// <YYYYMMDDTHHMMSSZ>\n
/// <credential_scope>\n
/// <hex(SHA256(canonical_request))>
/// ```
///
/// `timestamp` is parsed with [`parse_timestamp`] and reformatted.
///
/// # Errors
///
/// Returns [`AuthError::MalformedTimestamp`] if `timestamp` cannot be parsed.
///
/// # Examples
///
/// ```
/// use glacier_auth::sigv4::build_string_to_sign;
///
/// let sts = build_string_to_sign(
///     "Fri, 25 May 2012 00:24:53 GMT",
///     "20120525/us-east-1/glacier/aws4_request",
///     b"",
/// )
/// .unwrap();
/// assert!(sts.starts_with("AWS4-HMAC-SHA256\n20120525T002453Z\n"));
/// ```
pub fn build_string_to_sign(
    timestamp: &str,
    credential_scope: &str,
    canonical_request: &[u8],
) -> Result<String, AuthError> {
    let timestamp = format_amz_date(&parse_timestamp(timestamp)?);
    let canonical_request_hash = hex::encode(Sha256::digest(canonical_request));
    Ok(format!(
        "{ALGORITHM}\n{timestamp}\n{credential_scope}\n{canonical_request_hash}"
    ))
}

/// Compute the HMAC-SHA256 signature of `string_to_sign` using `signing_key`.
#[must_use]
pub fn compute_signature(signing_key: &SigningKey, string_to_sign: &str) -> Signature {
    let sig = hmac_sha256(signing_key.as_bytes(), string_to_sign.as_bytes());
    Signature(hex::encode(sig))
}

/// Compute HMAC-SHA256 and return the raw bytes.
fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac =
        <HmacSha256 as KeyInit>::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}
