//! Canonical request construction for AWS Signature Version 4.
//!
//! The canonical request is six newline-separated fields:
//!
//! ```text
//! HTTPRequestMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n
//! SignedHeaders\n
//! HashedPayload
//! ```
//!
//! Every header line in `CanonicalHeaders` ends with `\n`, so the block is
//! followed by an empty line. The layout is a wire contract with the remote
//! service and must match byte for byte.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Read};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, percent_encode};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::AuthError;

/// Bytes that must be percent-encoded: everything except the RFC 3986
/// unreserved characters (`A-Z`, `a-z`, `0-9`, `-`, `_`, `.`, `~`).
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A request serialized into canonical form.
///
/// Use [`build_canonical_request`] to create one. The `Display` output is the
/// exact text that gets hashed into the string to sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    method: String,
    canonical_uri: String,
    canonical_query: String,
    canonical_headers: String,
    signed_headers: Vec<String>,
    payload_hash: String,
}

impl CanonicalRequest {
    /// The HTTP method, as supplied.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The normalized, percent-encoded path.
    #[must_use]
    pub fn canonical_uri(&self) -> &str {
        &self.canonical_uri
    }

    /// The sorted, re-encoded query string.
    #[must_use]
    pub fn canonical_query(&self) -> &str {
        &self.canonical_query
    }

    /// The `name:value\n` header block.
    #[must_use]
    pub fn canonical_headers(&self) -> &str {
        &self.canonical_headers
    }

    /// Sorted lowercase names of every signed header, `host` included.
    #[must_use]
    pub fn signed_headers(&self) -> &[String] {
        &self.signed_headers
    }

    /// The signed header names joined by `;`.
    #[must_use]
    pub fn signed_headers_string(&self) -> String {
        self.signed_headers.join(";")
    }

    /// Lowercase hex SHA-256 of the request body.
    #[must_use]
    pub fn payload_hash(&self) -> &str {
        &self.payload_hash
    }

    /// Lowercase hex SHA-256 of the canonical request text.
    #[must_use]
    pub fn hash(&self) -> String {
        hash_payload(self.to_string().as_bytes())
    }
}

impl fmt::Display for CanonicalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{}\n{}\n{}\n{}\n{}",
            self.method,
            self.canonical_uri,
            self.canonical_query,
            self.canonical_headers,
            self.signed_headers_string(),
            self.payload_hash
        )
    }
}

/// Build the canonical request for an HTTP request description.
///
/// `path` is the decoded URL path as raw bytes, `query` the raw query string, and `headers`
/// a multimap given as name/value pairs (names may repeat). The `host` header
/// is always taken from `host`. The body is read to the end to compute the
/// payload hash.
///
/// # Errors
///
/// Returns [`AuthError::MalformedQuery`] for an unparsable query string and
/// [`AuthError::BodyRead`] if the body cannot be read.
///
/// # Examples
///
/// ```
/// use glacier_auth::canonical::build_canonical_request;
///
/// let canonical = build_canonical_request(
///     "GET",
///     "/",
///     "",
///     &[("X-Amz-Date", "20150830T123600Z")],
///     "example.amazonaws.com",
///     &b""[..],
/// )
/// .unwrap();
/// assert_eq!(
///     canonical.to_string(),
///     "GET\n/\n\nhost:example.amazonaws.com\nx-amz-date:20150830T123600Z\n\n\
///      host;x-amz-date\n\
///      e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
pub fn build_canonical_request(
    method: &str,
    path: impl AsRef<[u8]>,
    query: &str,
    headers: &[(&str, &str)],
    host: &str,
    body: impl Read,
) -> Result<CanonicalRequest, AuthError> {
    let canonical_uri = build_canonical_uri(path);
    let canonical_query = build_canonical_query_string(query)?;
    let (canonical_headers, signed_headers) = build_canonical_headers(headers, host);
    let payload_hash = hash_payload_reader(body)?;

    let canonical = CanonicalRequest {
        method: method.to_owned(),
        canonical_uri,
        canonical_query,
        canonical_headers,
        signed_headers,
        payload_hash,
    };

    debug!(canonical_request = %canonical, "Built canonical request");

    Ok(canonical)
}

/// Build the canonical URI from a decoded path.
///
/// The path is taken as raw bytes, so segments that are not valid UTF-8 are
/// encoded byte for byte.
///
/// `.` and `..` segments are resolved against the root, empty segments are
/// dropped, and each remaining segment is percent-encoded. A trailing slash
/// survives when something other than `/` and `.` precedes it.
///
/// # Examples
///
/// ```
/// use glacier_auth::canonical::build_canonical_uri;
///
/// assert_eq!(build_canonical_uri("/"), "/");
/// assert_eq!(build_canonical_uri("/a/./b/../c"), "/a/c");
/// assert_eq!(build_canonical_uri("/-/vaults/my vault/"), "/-/vaults/my%20vault/");
/// ```
#[must_use]
pub fn build_canonical_uri(path: impl AsRef<[u8]>) -> String {
    let path = path.as_ref();
    let mut segments: Vec<&[u8]> = Vec::new();
    for segment in path.split(|&b| b == b'/') {
        match segment {
            b"" | b"." => {}
            b".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }

    let mut canonical = String::with_capacity(path.len() + 1);
    for segment in &segments {
        canonical.push('/');
        canonical.push_str(&uri_encode(segment));
    }
    if canonical.is_empty() || has_trailing_slash(path) {
        canonical.push('/');
    }
    canonical
}

/// Build the canonical query string from a raw query string.
///
/// Names and values are form-decoded, re-encoded with the unreserved rule,
/// sorted by name and then by value.
///
/// # Errors
///
/// Returns [`AuthError::MalformedQuery`] if a `%` escape is not followed by
/// two hex digits or a pair contains a raw `;`, which is not a separator.
///
/// # Examples
///
/// ```
/// use glacier_auth::canonical::build_canonical_query_string;
///
/// assert_eq!(build_canonical_query_string("").unwrap(), "");
/// assert_eq!(build_canonical_query_string("b=2&a=1&a=0").unwrap(), "a=0&a=1&b=2");
/// assert!(build_canonical_query_string("a=%zz").is_err());
/// ```
pub fn build_canonical_query_string(query: &str) -> Result<String, AuthError> {
    let params = parse_query(query)?;

    let mut pairs = Vec::new();
    for (name, mut values) in params {
        values.sort_unstable();
        let name = uri_encode(&name);
        for value in values {
            pairs.push(format!("{name}={}", uri_encode(&value)));
        }
    }

    Ok(pairs.join("&"))
}

/// Build the canonical headers block and the sorted signed header names.
///
/// Names are trimmed and lowercased; values are kept verbatim. Values of a
/// repeated name are sorted and joined by `,`. Any supplied `host` header is
/// replaced by `host`.
///
/// # Examples
///
/// ```
/// use glacier_auth::canonical::build_canonical_headers;
///
/// let (block, names) = build_canonical_headers(&[("X-Amz-Date", "20150830T123600Z")], "example.com");
/// assert_eq!(block, "host:example.com\nx-amz-date:20150830T123600Z\n");
/// assert_eq!(names, vec!["host", "x-amz-date"]);
/// ```
#[must_use]
pub fn build_canonical_headers(headers: &[(&str, &str)], host: &str) -> (String, Vec<String>) {
    let mut header_map: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for &(name, value) in headers {
        let name = name.trim().to_lowercase();
        if name == "host" {
            continue;
        }
        header_map.entry(name).or_default().push(value);
    }
    header_map.insert("host".to_owned(), vec![host]);

    let mut block = String::new();
    for (name, values) in &mut header_map {
        values.sort_unstable();
        block.push_str(name);
        block.push(':');
        block.push_str(&values.join(","));
        block.push('\n');
    }

    (block, header_map.into_keys().collect())
}

/// Build the signed headers string as a semicolon-separated list of lowercase
/// header names, sorted lexicographically.
///
/// # Examples
///
/// ```
/// use glacier_auth::canonical::build_signed_headers_string;
///
/// assert_eq!(
///     build_signed_headers_string(&["x-amz-date", "host"]),
///     "host;x-amz-date"
/// );
/// ```
#[must_use]
pub fn build_signed_headers_string(signed_headers: &[&str]) -> String {
    let mut sorted: Vec<&str> = signed_headers.to_vec();
    sorted.sort_unstable();
    sorted.join(";")
}

/// Percent-encode bytes, leaving only RFC 3986 unreserved characters as-is.
///
/// Hex digits are uppercase. `/` is encoded too.
///
/// # Examples
///
/// ```
/// use glacier_auth::canonical::uri_encode;
///
/// assert_eq!(uri_encode("a-b_c.d~e"), "a-b_c.d~e");
/// assert_eq!(uri_encode("a/b c"), "a%2Fb%20c");
/// ```
#[must_use]
pub fn uri_encode(input: impl AsRef<[u8]>) -> String {
    percent_encode(input.as_ref(), URI_ENCODE_SET).to_string()
}

/// Compute the SHA-256 hash of the given payload and return it as a hex string.
///
/// # Examples
///
/// ```
/// use glacier_auth::canonical::hash_payload;
///
/// assert_eq!(
///     hash_payload(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

/// Read `body` to the end and return the hex SHA-256 of everything read.
///
/// # Errors
///
/// Returns [`AuthError::BodyRead`] on any read error other than
/// [`io::ErrorKind::Interrupted`], which is retried.
pub fn hash_payload_reader(mut body: impl Read) -> Result<String, AuthError> {
    let mut hasher = PayloadHasher(Sha256::new());
    io::copy(&mut body, &mut hasher).map_err(AuthError::BodyRead)?;
    Ok(hex::encode(hasher.0.finalize()))
}

/// Feeds everything written into a running SHA-256.
struct PayloadHasher(Sha256);

impl io::Write for PayloadHasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Parse a raw query string into decoded name to value-list pairs.
fn parse_query(query: &str) -> Result<BTreeMap<Vec<u8>, Vec<Vec<u8>>>, AuthError> {
    let mut params: BTreeMap<Vec<u8>, Vec<Vec<u8>>> = BTreeMap::new();
    for pair in query.split('&').filter(|s| !s.is_empty()) {
        let malformed = || AuthError::MalformedQuery(query.to_owned());
        if pair.contains(';') {
            return Err(malformed());
        }
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        let name = form_decode(name).ok_or_else(malformed)?;
        let value = form_decode(value).ok_or_else(malformed)?;
        params.entry(name).or_default().push(value);
    }
    Ok(params)
}

/// Decode `application/x-www-form-urlencoded` text: `+` is a space and `%XX`
/// is a byte. Returns `None` for a truncated or non-hex escape.
fn form_decode(input: &str) -> Option<Vec<u8>> {
    let bytes = input.as_bytes();
    let well_formed = bytes
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b'%')
        .all(|(i, _)| {
            bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
        });
    if !well_formed {
        return None;
    }
    Some(percent_decode_str(&input.replace('+', " ")).collect())
}

/// Whether the original path's trailing `/` must be kept after normalization.
///
/// Looks backward from before the final `/` (ignoring the leading byte) for a
/// byte that is neither `/` nor `.`.
fn has_trailing_slash(path: &[u8]) -> bool {
    match path.split_last() {
        Some((b'/', rest)) => rest.iter().skip(1).any(|&b| b != b'/' && b != b'.'),
        _ => false,
    }
}
