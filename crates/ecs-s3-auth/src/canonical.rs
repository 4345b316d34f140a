//! Canonical request construction for AWS Signature Version 4.
//!
//! The canonical form of a request is:
//!
//! ```text
//! HTTPRequestMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n\n
//! SignedHeaders\n
//! HashedPayload
//! ```
//!
//! The same percent-encoding set is used to put labels and query values on the
//! wire, so the URI the server sees is already in canonical form.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use sha2::{Digest, Sha256};

use crate::error::AuthError;

/// Characters that must be percent-encoded in URI path segments and query values.
///
/// Everything except RFC 3986 unreserved characters (A-Z, a-z, 0-9, `-`, `_`,
/// `.`, `~`) is encoded.
pub const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Headers that are never signed: they may be rewritten by proxies or the
/// transport after signing.
const IGNORED_HEADERS: &[&str] = &["authorization", "user-agent", "expect", "x-amzn-trace-id"];

/// A request reduced to the parts that take part in the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    method: String,
    uri: String,
    query: String,
    headers: BTreeMap<String, String>,
    payload_hash: String,
}

impl CanonicalRequest {
    /// Canonicalize a request.
    ///
    /// Every header except the ignored set (`authorization`, `user-agent`,
    /// `expect`, `x-amzn-trace-id`) is signed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidHeaderValue`] if a header value is not visible ASCII.
    pub fn from_parts(
        method: &http::Method,
        uri: &http::Uri,
        headers: &http::HeaderMap,
        payload_hash: &str,
    ) -> Result<Self, AuthError> {
        let mut canonical_headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in headers {
            let name = name.as_str();
            if IGNORED_HEADERS.contains(&name) {
                continue;
            }
            let value = value
                .to_str()
                .map_err(|_| AuthError::InvalidHeaderValue(name.to_owned()))?;
            let trimmed = collapse_whitespace(value.trim());
            canonical_headers
                .entry(name.to_owned())
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(&trimmed);
                })
                .or_insert(trimmed);
        }

        Ok(Self {
            method: method.as_str().to_owned(),
            uri: build_canonical_uri(uri.path()),
            query: build_canonical_query_string(uri.query().unwrap_or("")),
            headers: canonical_headers,
            payload_hash: payload_hash.to_owned(),
        })
    }

    /// The `;`-joined list of signed header names, sorted.
    #[must_use]
    pub fn signed_headers(&self) -> String {
        self.headers
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Render the canonical request string.
    #[must_use]
    pub fn render(&self) -> String {
        let canonical_headers = self
            .headers
            .iter()
            .map(|(name, value)| format!("{name}:{value}"))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{}\n{}\n{}\n{canonical_headers}\n\n{}\n{}",
            self.method,
            self.uri,
            self.query,
            self.signed_headers(),
            self.payload_hash
        )
    }

    /// Hex-encoded SHA-256 of the rendered request.
    #[must_use]
    pub fn hash(&self) -> String {
        hex::encode(Sha256::digest(self.render().as_bytes()))
    }
}

/// Percent-encode a single path segment or query component.
///
/// # Examples
///
/// ```
/// use ecs_s3_auth::canonical::uri_encode;
///
/// assert_eq!(uri_encode("Size>3"), "Size%3E3");
/// assert_eq!(uri_encode("a b/c"), "a%20b%2Fc");
/// ```
#[must_use]
pub fn uri_encode(input: &str) -> String {
    utf8_percent_encode(input, URI_ENCODE_SET).to_string()
}

/// Build the canonical URI by encoding each path segment individually.
///
/// Forward slashes (`/`) are preserved. Empty paths are normalized to `/`.
/// Segments are decoded before encoding, so an already-encoded path maps to itself.
#[must_use]
pub fn build_canonical_uri(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return "/".to_owned();
    }

    path.split('/')
        .map(|segment| uri_encode(&percent_decode_str(segment).decode_utf8_lossy()))
        .collect::<Vec<_>>()
        .join("/")
}

/// Build the canonical query string by sorting parameters.
///
/// Parameters are sorted by key, then by value. Values are kept as they appear
/// on the wire; a valueless key (`?searchmetadata`) renders as `searchmetadata=`.
#[must_use]
pub fn build_canonical_query_string(query: &str) -> String {
    if query.is_empty() {
        return String::new();
    }

    let mut params: Vec<(&str, &str)> = query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|param| param.split_once('=').unwrap_or((param, "")))
        .collect();

    params.sort_unstable();

    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Collapse consecutive whitespace characters in a string to a single space.
fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            result.push(ch);
            prev_was_space = false;
        }
    }
    result
}
