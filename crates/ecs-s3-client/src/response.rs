//! HTTP response to typed output decoding.
//!
//! Each operation output implements [`EcsOutput`]. Header fields are read by
//! `core.RestXmlUnmarshalMeta` through [`EcsOutput::unmarshal_meta`]; the payload
//! is handled by `core.RestXmlUnmarshal` through [`EcsOutput::unmarshal_body`]:
//!
//! - **XML**: the document is decoded into the output
//! - **Stream**: the body is handed to the caller unread (`GetObject`)
//! - **None**: the body is only checked for well-formed XML
//!
//! Header decoding is lenient: a value that does not parse leaves the field unset.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use ecs_s3_model::output::{
    CreateBucketOutput, DeleteBucketMetadataSearchOutput, GetObjectOutput,
    GetSystemMetadataSearchKeysOutput, HeadBucketOutput, HeadObjectOutput,
    ListBucketMetadataSearchOutput, ListBucketQueryOutput, PutBucketIsStaleAllowedOutput,
    PutObjectOutput,
};
use ecs_s3_xml::{check_well_formed, from_xml};
use http::HeaderMap;

use crate::body::ResponseBody;
use crate::error::EcsError;
use crate::request::METADATA_PREFIX;

/// What a success response carries in its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Nothing the output keeps.
    None,
    /// An XML document decoded into the output.
    Xml,
    /// Raw bytes streamed to the caller.
    Stream,
}

/// An operation output decoded from an HTTP response.
pub trait EcsOutput: Default + Send + 'static {
    /// Payload carried by a success response.
    const PAYLOAD: PayloadKind;

    /// Read header-bound fields.
    fn unmarshal_meta(&mut self, _headers: &HeaderMap) {}

    /// Read the payload.
    ///
    /// The default checks that a buffered body is well-formed XML.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::Xml`] if the body is malformed.
    fn unmarshal_body(&mut self, body: ResponseBody) -> Result<(), EcsError> {
        if let Some(data) = body.as_bytes() {
            check_well_formed(data)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helper functions for extracting typed values from response headers
// ---------------------------------------------------------------------------

/// Extract a header value as a string.
pub fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned)
}

/// Extract a header value and parse it into a type implementing `FromStr`.
pub fn header_parse<T: FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

/// Extract a header value and parse it as a boolean.
///
/// Recognizes "true" (case-insensitive) as `true`, everything else as `false`.
pub fn header_bool(headers: &HeaderMap, name: &str) -> Option<bool> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.eq_ignore_ascii_case("true"))
}

/// Extract a header value and parse it as an HTTP date timestamp.
pub fn header_timestamp(headers: &HeaderMap, name: &str) -> Option<DateTime<Utc>> {
    let value = headers.get(name)?.to_str().ok()?;
    parse_http_date(value)
}

/// Parse an HTTP date string into a `DateTime<Utc>`.
///
/// Tries multiple date formats commonly used in HTTP and AWS:
/// - IMF-fixdate (e.g., `Mon, 15 Jan 2024 10:30:00 GMT`)
/// - RFC 2822
/// - ISO 8601 / RFC 3339 (e.g., `2024-01-15T10:30:00Z`)
fn parse_http_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%a, %d %b %Y %H:%M:%S GMT") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    None
}

/// Extract a header value and convert it using `From<&str>` (for enum types).
fn header_enum<T>(headers: &HeaderMap, name: &str) -> Option<T>
where
    T: for<'a> From<&'a str>,
{
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(T::from)
}

/// Collect all `x-amz-meta-*` headers into a metadata `HashMap`.
///
/// The key in the returned map is the portion of the header name after `x-amz-meta-`.
pub fn collect_metadata(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let meta_key = name.as_str().strip_prefix(METADATA_PREFIX)?;
            let meta_value = value.to_str().ok()?;
            Some((meta_key.to_owned(), meta_value.to_owned()))
        })
        .collect()
}

/// Decode a buffered XML body.
fn decode_xml<T: ecs_s3_xml::S3Deserialize>(body: ResponseBody) -> Result<T, EcsError> {
    match body {
        ResponseBody::Buffered(data) => Ok(from_xml(&data)?),
        ResponseBody::Streaming(_) => Err(EcsError::Xml(ecs_s3_xml::XmlError::ParseError(
            "XML payload was not buffered".to_owned(),
        ))),
    }
}

// ---------------------------------------------------------------------------
// Operation outputs
// ---------------------------------------------------------------------------

impl EcsOutput for CreateBucketOutput {
    const PAYLOAD: PayloadKind = PayloadKind::None;

    fn unmarshal_meta(&mut self, headers: &HeaderMap) {
        self.location = header_str(headers, "location");
    }
}

impl EcsOutput for HeadBucketOutput {
    const PAYLOAD: PayloadKind = PayloadKind::None;

    fn unmarshal_meta(&mut self, headers: &HeaderMap) {
        self.retention_period = header_parse(headers, "x-emc-retention-period");
    }
}

impl EcsOutput for PutBucketIsStaleAllowedOutput {
    const PAYLOAD: PayloadKind = PayloadKind::None;
}

impl EcsOutput for DeleteBucketMetadataSearchOutput {
    const PAYLOAD: PayloadKind = PayloadKind::None;
}

impl EcsOutput for ListBucketMetadataSearchOutput {
    const PAYLOAD: PayloadKind = PayloadKind::Xml;

    fn unmarshal_body(&mut self, body: ResponseBody) -> Result<(), EcsError> {
        *self = decode_xml(body)?;
        Ok(())
    }
}

impl EcsOutput for ListBucketQueryOutput {
    const PAYLOAD: PayloadKind = PayloadKind::Xml;

    fn unmarshal_body(&mut self, body: ResponseBody) -> Result<(), EcsError> {
        *self = decode_xml(body)?;
        Ok(())
    }
}

impl EcsOutput for GetSystemMetadataSearchKeysOutput {
    const PAYLOAD: PayloadKind = PayloadKind::Xml;

    fn unmarshal_body(&mut self, body: ResponseBody) -> Result<(), EcsError> {
        *self = decode_xml(body)?;
        Ok(())
    }
}

/// Header fields shared by `GetObject` and `HeadObject`.
macro_rules! unmarshal_object_meta {
    ($out:expr, $headers:expr) => {{
        let out = $out;
        let headers = $headers;
        out.accept_ranges = header_str(headers, "accept-ranges");
        out.cache_control = header_str(headers, "cache-control");
        out.content_disposition = header_str(headers, "content-disposition");
        out.content_encoding = header_str(headers, "content-encoding");
        out.content_language = header_str(headers, "content-language");
        out.content_length = header_parse(headers, "content-length");
        out.content_type = header_str(headers, "content-type");
        out.delete_marker = header_bool(headers, "x-amz-delete-marker");
        out.e_tag = header_str(headers, "etag");
        out.expiration = header_str(headers, "x-amz-expiration");
        out.expires = header_str(headers, "expires");
        out.last_modified = header_timestamp(headers, "last-modified");
        out.metadata = collect_metadata(headers);
        out.missing_meta = header_parse(headers, "x-amz-missing-meta");
        out.parts_count = header_parse(headers, "x-amz-mp-parts-count");
        out.replication_status = header_enum(headers, "x-amz-replication-status");
        out.request_charged = header_enum(headers, "x-amz-request-charged");
        out.restore = header_str(headers, "x-amz-restore");
        out.retention_period = header_parse(headers, "x-emc-retention-period");
        out.retention_policy = header_str(headers, "x-emc-retention-policy");
        out.sse_customer_algorithm =
            header_str(headers, "x-amz-server-side-encryption-customer-algorithm");
        out.sse_customer_key_md5 =
            header_str(headers, "x-amz-server-side-encryption-customer-key-md5");
        out.ssekms_key_id = header_str(headers, "x-amz-server-side-encryption-aws-kms-key-id");
        out.server_side_encryption = header_enum(headers, "x-amz-server-side-encryption");
        out.storage_class = header_enum(headers, "x-amz-storage-class");
        out.version_id = header_str(headers, "x-amz-version-id");
        out.website_redirect_location = header_str(headers, "x-amz-website-redirect-location");
    }};
}

impl EcsOutput for HeadObjectOutput {
    const PAYLOAD: PayloadKind = PayloadKind::None;

    fn unmarshal_meta(&mut self, headers: &HeaderMap) {
        unmarshal_object_meta!(self, headers);
    }
}

impl EcsOutput for GetObjectOutput {
    const PAYLOAD: PayloadKind = PayloadKind::Stream;

    fn unmarshal_meta(&mut self, headers: &HeaderMap) {
        unmarshal_object_meta!(&mut *self, headers);
        self.content_md5_emc = header_str(headers, "x-emc-content-md5");
        self.content_range = header_str(headers, "content-range");
        self.tag_count = header_parse(headers, "x-amz-tagging-count");
    }

    fn unmarshal_body(&mut self, body: ResponseBody) -> Result<(), EcsError> {
        self.body = body.into_stream();
        Ok(())
    }
}

impl EcsOutput for PutObjectOutput {
    const PAYLOAD: PayloadKind = PayloadKind::None;

    fn unmarshal_meta(&mut self, headers: &HeaderMap) {
        self.content_md5_emc = header_str(headers, "x-emc-content-md5");
        self.e_tag = header_str(headers, "etag");
        self.expiration = header_str(headers, "x-amz-expiration");
        self.previous_object_size = header_parse(headers, "x-emc-previous-object-size");
        self.request_charged = header_enum(headers, "x-amz-request-charged");
        self.sse_customer_algorithm =
            header_str(headers, "x-amz-server-side-encryption-customer-algorithm");
        self.sse_customer_key_md5 =
            header_str(headers, "x-amz-server-side-encryption-customer-key-md5");
        self.ssekms_key_id = header_str(headers, "x-amz-server-side-encryption-aws-kms-key-id");
        self.server_side_encryption = header_enum(headers, "x-amz-server-side-encryption");
        self.version_id = header_str(headers, "x-amz-version-id");
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use ecs_s3_model::types::{ServerSideEncryption, StorageClass};
    use http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_str(value).expect("valid value"));
        }
        map
    }

    #[test]
    fn test_should_read_bucket_retention_period() {
        let mut out = HeadBucketOutput::default();
        out.unmarshal_meta(&headers(&[("x-emc-retention-period", "1")]));
        assert_eq!(out.retention_period, Some(1));
    }

    #[test]
    fn test_should_leave_unparsable_header_unset() {
        let mut out = HeadBucketOutput::default();
        out.unmarshal_meta(&headers(&[("x-emc-retention-period", "forever")]));
        assert_eq!(out.retention_period, None);
    }

    #[test]
    fn test_should_read_object_extension_headers() {
        let mut out = HeadObjectOutput::default();
        out.unmarshal_meta(&headers(&[
            ("content-length", "4"),
            ("etag", "\"81dc9bdb52d04dc20036dbd8313ed055\""),
            ("last-modified", "Sun, 06 Nov 1994 08:49:37 GMT"),
            ("x-emc-retention-period", "1"),
            ("x-emc-retention-policy", "p1"),
            ("x-amz-meta-color", "blue"),
            ("x-amz-server-side-encryption", "AES256"),
            ("x-amz-storage-class", "GLACIER_IR"),
        ]));
        assert_eq!(out.content_length, Some(4));
        assert_eq!(out.retention_period, Some(1));
        assert_eq!(out.retention_policy.as_deref(), Some("p1"));
        assert_eq!(out.metadata.get("color").map(String::as_str), Some("blue"));
        assert_eq!(out.server_side_encryption, Some(ServerSideEncryption::Aes256));
        assert_eq!(
            out.storage_class,
            Some(StorageClass::Unknown("GLACIER_IR".to_owned()))
        );
        assert_eq!(
            out.last_modified.map(|t| t.to_rfc3339()),
            Some("1994-11-06T08:49:37+00:00".to_owned())
        );
    }

    #[test]
    fn test_should_read_previous_object_size() {
        let mut out = PutObjectOutput::default();
        out.unmarshal_meta(&headers(&[
            ("x-emc-previous-object-size", "4"),
            ("x-emc-content-md5", "abc"),
        ]));
        assert_eq!(out.previous_object_size, Some(4));
        assert_eq!(out.content_md5_emc.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_should_hand_over_object_stream() {
        let mut out = GetObjectOutput::default();
        out.unmarshal_meta(&headers(&[
            ("x-emc-content-md5", "md5"),
            ("x-emc-retention-period", "1"),
        ]));
        out.unmarshal_body(ResponseBody::from("1234"))
            .expect("stream body");
        assert_eq!(out.content_md5_emc.as_deref(), Some("md5"));
        assert_eq!(out.retention_period, Some(1));
        assert_eq!(out.body.collect().await.expect("collect"), "1234");
    }

    #[test]
    fn test_should_decode_query_result() {
        let xml = br#"<BucketQueryResult>
            <Name>b1</Name>
            <NextMarker>NO MORE PAGES</NextMarker>
            <MaxKeys>100</MaxKeys>
            <ObjectMatches>
                <object><objectName>1</objectName></object>
                <object><objectName>2</objectName></object>
            </ObjectMatches>
        </BucketQueryResult>"#;
        let mut out = ListBucketQueryOutput::default();
        out.unmarshal_body(ResponseBody::Buffered(Bytes::from_static(xml)))
            .expect("decode");
        let names: Vec<_> = out
            .object_matches
            .iter()
            .filter_map(|m| m.object_name.as_deref())
            .collect();
        assert_eq!(names, ["1", "2"]);
        assert!(!out.has_more_pages());
    }

    #[test]
    fn test_should_reject_malformed_body_without_payload() {
        let mut out = CreateBucketOutput::default();
        assert!(out.unmarshal_body(ResponseBody::from("<a><b></a>")).is_err());
        assert!(out.unmarshal_body(ResponseBody::from("")).is_ok());
    }

    #[test]
    fn test_should_parse_http_date_formats() {
        assert!(parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT").is_some());
        assert!(parse_http_date("1994-11-06T08:49:37Z").is_some());
        assert!(parse_http_date("yesterday").is_none());
    }
}
