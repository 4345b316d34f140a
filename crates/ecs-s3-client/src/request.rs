//! Typed input to HTTP request encoding.
//!
//! Each operation input implements [`EcsInput`], declaring where its fields go
//! on the wire through a [`RequestEncoder`]. The `core.RestXmlBuild` handler
//! turns the encoder into an `http::Request<Bytes>`:
//!
//! - URI labels substituted into the operation's path template, percent-encoded
//!   per segment (`{Key+}` keeps its `/` separators)
//! - static subresource keys from the template (`?searchmetadata`) sent with an
//!   empty value, parameters of the same name replacing them
//! - headers, prefix headers and the payload
//!
//! Path-style addressing puts the bucket in the path. Virtual-hosted addressing
//! moves it to the host name when the bucket is a valid DNS label.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use ecs_s3_auth::uri_encode;
use ecs_s3_model::InvalidParams;
use ecs_s3_model::input::{
    CreateBucketInput, DeleteBucketMetadataSearchInput, GetObjectInput,
    GetSystemMetadataSearchKeysInput, HeadBucketInput, HeadObjectInput,
    ListBucketMetadataSearchInput, ListBucketQueryInput, PutBucketIsStaleAllowedInput,
    PutObjectInput,
};
use ecs_s3_xml::to_xml;
use http::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::ClientConfig;
use crate::error::EcsError;

/// Prefix of user metadata headers.
pub const METADATA_PREFIX: &str = "x-amz-meta-";

/// An operation input that can be validated and put on the wire.
///
/// Object-safe so the pipeline can carry any input as `Box<dyn EcsInput>`.
pub trait EcsInput: fmt::Debug + Send + Sync + 'static {
    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns every missing required field at once.
    fn validate(&self) -> Result<(), InvalidParams>;

    /// Write labels, query parameters, headers and payload.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be encoded.
    fn encode(&self, enc: &mut RequestEncoder) -> Result<(), EcsError>;

    /// Access the concrete input, for hooks that inspect or replace it.
    fn as_any(&self) -> &dyn Any;
}

/// Collects the wire parts of a request before it is assembled.
#[derive(Debug)]
pub struct RequestEncoder {
    path_template: String,
    labels: HashMap<String, String>,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
}

impl RequestEncoder {
    /// Start encoding against a path template such as `/{Bucket}?searchmetadata`.
    #[must_use]
    pub fn new(template: &str) -> Self {
        let (path, static_query) = template.split_once('?').unwrap_or((template, ""));
        let query = static_query
            .split('&')
            .filter(|k| !k.is_empty())
            .map(|k| match k.split_once('=') {
                Some((k, v)) => (k.to_owned(), v.to_owned()),
                None => (k.to_owned(), String::new()),
            })
            .collect();
        Self {
            path_template: path.to_owned(),
            labels: HashMap::new(),
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Substitute a URI label.
    pub fn set_label(&mut self, name: &str, value: &str) {
        self.labels.insert(name.to_owned(), value.to_owned());
    }

    /// Set a query parameter, replacing any earlier value of the same name.
    pub fn set_query(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.query.iter_mut().find(|(k, _)| k == name) {
            Some(entry) => entry.1 = value,
            None => self.query.push((name.to_owned(), value)),
        }
    }

    /// Set a query parameter if the value is `Some`.
    pub fn set_optional_query(&mut self, name: &str, value: Option<&str>) {
        if let Some(v) = value {
            self.set_query(name, v);
        }
    }

    /// Set a boolean query parameter if the value is `Some`.
    pub fn set_optional_bool_query(&mut self, name: &str, value: Option<bool>) {
        if let Some(v) = value {
            self.set_query(name, if v { "true" } else { "false" });
        }
    }

    /// Set an integer query parameter if the value is `Some`.
    pub fn set_optional_int_query(&mut self, name: &str, value: Option<i64>) {
        if let Some(v) = value {
            self.set_query(name, v.to_string());
        }
    }

    /// Set an ISO 8601 timestamp query parameter if the value is `Some`.
    pub fn set_optional_timestamp_query(&mut self, name: &str, value: Option<&DateTime<Utc>>) {
        if let Some(v) = value {
            self.set_query(name, v.format("%Y-%m-%dT%H:%M:%SZ").to_string());
        }
    }

    /// Set a header, replacing any earlier value.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidHeader`] if the name or value is not valid HTTP.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), EcsError> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| EcsError::invalid_header(name, e))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| EcsError::invalid_header(name, e))?;
        self.headers.insert(header_name, header_value);
        Ok(())
    }

    /// Set a header if the value is `Some`.
    ///
    /// # Errors
    ///
    /// See [`RequestEncoder::set_header`].
    pub fn set_optional_header(&mut self, name: &str, value: Option<&str>) -> Result<(), EcsError> {
        match value {
            Some(v) => self.set_header(name, v),
            None => Ok(()),
        }
    }

    /// Set a `true`/`false` header if the value is `Some`.
    ///
    /// # Errors
    ///
    /// See [`RequestEncoder::set_header`].
    pub fn set_optional_bool_header(
        &mut self,
        name: &str,
        value: Option<bool>,
    ) -> Result<(), EcsError> {
        self.set_optional_header(name, value.map(|v| if v { "true" } else { "false" }))
    }

    /// Set a decimal integer header if the value is `Some`.
    ///
    /// # Errors
    ///
    /// See [`RequestEncoder::set_header`].
    pub fn set_optional_int_header(
        &mut self,
        name: &str,
        value: Option<i64>,
    ) -> Result<(), EcsError> {
        match value {
            Some(v) => self.set_header(name, &v.to_string()),
            None => Ok(()),
        }
    }

    /// Set a header from a type implementing `Display` (enums) if the value is `Some`.
    ///
    /// # Errors
    ///
    /// See [`RequestEncoder::set_header`].
    pub fn set_optional_display_header<T: fmt::Display>(
        &mut self,
        name: &str,
        value: Option<&T>,
    ) -> Result<(), EcsError> {
        match value {
            Some(v) => self.set_header(name, &v.to_string()),
            None => Ok(()),
        }
    }

    /// Set an IMF-fixdate header (`Sun, 06 Nov 1994 08:49:37 GMT`) if the value is `Some`.
    ///
    /// # Errors
    ///
    /// See [`RequestEncoder::set_header`].
    pub fn set_optional_timestamp_header(
        &mut self,
        name: &str,
        value: Option<&DateTime<Utc>>,
    ) -> Result<(), EcsError> {
        match value {
            Some(v) => self.set_header(name, &v.format("%a, %d %b %Y %H:%M:%S GMT").to_string()),
            None => Ok(()),
        }
    }

    /// Emit one `x-amz-meta-<key>` header per entry.
    ///
    /// # Errors
    ///
    /// See [`RequestEncoder::set_header`].
    pub fn set_metadata_headers(
        &mut self,
        metadata: &HashMap<String, String>,
    ) -> Result<(), EcsError> {
        for (key, value) in metadata {
            self.set_header(&format!("{METADATA_PREFIX}{key}"), value)?;
        }
        Ok(())
    }

    /// Set the payload.
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }

    /// Query parameters in the order they were set.
    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Headers set so far.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Assemble the HTTP request.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidEndpoint`] if the endpoint is not an absolute
    /// URL, or [`EcsError::Http`] if the request cannot be built.
    pub fn into_http_request(
        self,
        method: http::Method,
        config: &ClientConfig,
    ) -> Result<http::Request<Bytes>, EcsError> {
        let endpoint: http::Uri = config
            .endpoint_url
            .parse()
            .map_err(|e| EcsError::InvalidEndpoint(format!("{}: {e}", config.endpoint_url)))?;
        let scheme = endpoint
            .scheme_str()
            .ok_or_else(|| EcsError::InvalidEndpoint(format!("{}: missing scheme", config.endpoint_url)))?;
        let authority = endpoint
            .authority()
            .ok_or_else(|| EcsError::InvalidEndpoint(format!("{}: missing host", config.endpoint_url)))?;

        let mut template = self.path_template.as_str();
        let mut host = authority.as_str().to_owned();
        if !config.force_path_style {
            if let Some(bucket) = self.labels.get("Bucket") {
                if let Some(rest) = template.strip_prefix("/{Bucket}") {
                    if is_virtual_host_compatible(bucket) {
                        host = format!("{bucket}.{host}");
                        template = rest;
                    }
                }
            }
        }

        let mut path = endpoint.path().trim_end_matches('/').to_owned();
        path.push_str(&expand_template(template, &self.labels));
        if path.is_empty() {
            path.push('/');
        }

        let mut uri = format!("{scheme}://{host}{path}");
        let query = render_query(&self.query);
        if !query.is_empty() {
            uri.push('?');
            uri.push_str(&query);
        }

        let mut builder = http::Request::builder().method(method.clone()).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            headers.extend(self.headers);
            if !config.user_agent.is_empty() {
                let user_agent = HeaderValue::from_str(&config.user_agent)
                    .map_err(|e| EcsError::invalid_header("user-agent", e))?;
                headers.insert(http::header::USER_AGENT, user_agent);
            }
            if !self.body.is_empty() || method == http::Method::PUT {
                headers
                    .entry(http::header::CONTENT_LENGTH)
                    .or_insert_with(|| HeaderValue::from(self.body.len()));
            }
        }
        Ok(builder.body(self.body)?)
    }
}

/// Substitute `{Name}` and greedy `{Name+}` labels. Unknown labels expand to nothing.
fn expand_template(template: &str, labels: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let Some(len) = rest[start..].find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let label = &rest[start + 1..start + len];
        match label.strip_suffix('+') {
            Some(name) => {
                if let Some(value) = labels.get(name) {
                    let encoded: Vec<String> = value.split('/').map(uri_encode).collect();
                    out.push_str(&encoded.join("/"));
                }
            }
            None => {
                if let Some(value) = labels.get(label) {
                    out.push_str(&uri_encode(value));
                }
            }
        }
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}

/// Render query parameters sorted by name, every pair as `name=value`.
fn render_query(query: &[(String, String)]) -> String {
    let mut pairs: Vec<&(String, String)> = query.iter().collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", uri_encode(k), uri_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// A bucket can move to the host name if it is a lowercase DNS label.
fn is_virtual_host_compatible(bucket: &str) -> bool {
    (3..=63).contains(&bucket.len())
        && bucket
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        && !bucket.starts_with('-')
        && !bucket.ends_with('-')
}

// ---------------------------------------------------------------------------
// Operation inputs
// ---------------------------------------------------------------------------

impl EcsInput for CreateBucketInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        CreateBucketInput::validate(self)
    }

    fn encode(&self, enc: &mut RequestEncoder) -> Result<(), EcsError> {
        enc.set_label("Bucket", &self.bucket);
        enc.set_optional_display_header("x-amz-acl", self.acl.as_ref())?;
        enc.set_optional_bool_header("x-emc-compliance-enabled", self.compliance_enabled)?;
        enc.set_optional_bool_header(
            "x-emc-file-system-access-enabled",
            self.file_system_access_enabled,
        )?;
        enc.set_optional_header("x-amz-grant-full-control", self.grant_full_control.as_deref())?;
        enc.set_optional_header("x-amz-grant-read", self.grant_read.as_deref())?;
        enc.set_optional_header("x-amz-grant-read-acp", self.grant_read_acp.as_deref())?;
        enc.set_optional_header("x-amz-grant-write", self.grant_write.as_deref())?;
        enc.set_optional_header("x-amz-grant-write-acp", self.grant_write_acp.as_deref())?;
        enc.set_optional_bool_header("x-emc-is-stale-allowed", self.is_stale_allowed)?;
        enc.set_optional_header("x-emc-metadata-search", self.metadata_search.as_deref())?;
        enc.set_optional_header("x-emc-namespace", self.namespace.as_deref())?;
        enc.set_optional_int_header("x-emc-retention-period", self.retention_period)?;
        enc.set_optional_bool_header(
            "x-emc-server-side-encryption-enabled",
            self.server_side_encryption_enabled,
        )?;
        enc.set_optional_header("x-emc-vpool", self.vpool.as_deref())?;
        if let Some(ref configuration) = self.create_bucket_configuration {
            enc.set_body(to_xml("CreateBucketConfiguration", configuration)?);
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl EcsInput for DeleteBucketMetadataSearchInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        DeleteBucketMetadataSearchInput::validate(self)
    }

    fn encode(&self, enc: &mut RequestEncoder) -> Result<(), EcsError> {
        enc.set_label("Bucket", &self.bucket);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl EcsInput for ListBucketMetadataSearchInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        ListBucketMetadataSearchInput::validate(self)
    }

    fn encode(&self, enc: &mut RequestEncoder) -> Result<(), EcsError> {
        enc.set_label("Bucket", &self.bucket);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl EcsInput for ListBucketQueryInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        ListBucketQueryInput::validate(self)
    }

    fn encode(&self, enc: &mut RequestEncoder) -> Result<(), EcsError> {
        enc.set_label("Bucket", &self.bucket);
        enc.set_optional_query("attributes", self.attributes.as_deref());
        enc.set_optional_bool_query("include-older-version", self.include_older_version);
        enc.set_optional_query("marker", self.marker.as_deref());
        enc.set_optional_int_query("max-keys", self.max_keys);
        enc.set_query("query", self.query.as_str());
        enc.set_optional_query("sorted", self.sorted.as_deref());
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl EcsInput for GetSystemMetadataSearchKeysInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        GetSystemMetadataSearchKeysInput::validate(self)
    }

    fn encode(&self, _enc: &mut RequestEncoder) -> Result<(), EcsError> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl EcsInput for PutBucketIsStaleAllowedInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        PutBucketIsStaleAllowedInput::validate(self)
    }

    fn encode(&self, enc: &mut RequestEncoder) -> Result<(), EcsError> {
        enc.set_label("Bucket", &self.bucket);
        enc.set_optional_bool_header("x-emc-is-stale-allowed", self.is_stale_allowed)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl EcsInput for HeadBucketInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        HeadBucketInput::validate(self)
    }

    fn encode(&self, enc: &mut RequestEncoder) -> Result<(), EcsError> {
        enc.set_label("Bucket", &self.bucket);
        enc.set_optional_header(
            "x-amz-expected-bucket-owner",
            self.expected_bucket_owner.as_deref(),
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Headers shared by `GetObject` and `HeadObject`.
macro_rules! encode_object_read {
    ($input:expr, $enc:expr) => {{
        let input = $input;
        let enc = $enc;
        enc.set_label("Bucket", &input.bucket);
        enc.set_label("Key", &input.key);
        enc.set_optional_header("If-Match", input.if_match.as_deref())?;
        enc.set_optional_timestamp_header("If-Modified-Since", input.if_modified_since.as_ref())?;
        enc.set_optional_header("If-None-Match", input.if_none_match.as_deref())?;
        enc.set_optional_timestamp_header(
            "If-Unmodified-Since",
            input.if_unmodified_since.as_ref(),
        )?;
        enc.set_optional_int_query("partNumber", input.part_number);
        enc.set_optional_header("Range", input.range.as_deref())?;
        enc.set_optional_display_header("x-amz-request-payer", input.request_payer.as_ref())?;
        enc.set_optional_header(
            "x-amz-server-side-encryption-customer-algorithm",
            input.sse_customer_algorithm.as_deref(),
        )?;
        enc.set_optional_header(
            "x-amz-server-side-encryption-customer-key",
            input.sse_customer_key.as_deref(),
        )?;
        enc.set_optional_header(
            "x-amz-server-side-encryption-customer-key-MD5",
            input.sse_customer_key_md5.as_deref(),
        )?;
        enc.set_optional_query("versionId", input.version_id.as_deref());
    }};
}

impl EcsInput for HeadObjectInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        HeadObjectInput::validate(self)
    }

    fn encode(&self, enc: &mut RequestEncoder) -> Result<(), EcsError> {
        encode_object_read!(self, enc);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl EcsInput for GetObjectInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        GetObjectInput::validate(self)
    }

    fn encode(&self, enc: &mut RequestEncoder) -> Result<(), EcsError> {
        encode_object_read!(self, &mut *enc);
        enc.set_optional_query(
            "response-cache-control",
            self.response_cache_control.as_deref(),
        );
        enc.set_optional_query(
            "response-content-disposition",
            self.response_content_disposition.as_deref(),
        );
        enc.set_optional_query(
            "response-content-encoding",
            self.response_content_encoding.as_deref(),
        );
        enc.set_optional_query(
            "response-content-language",
            self.response_content_language.as_deref(),
        );
        enc.set_optional_query("response-content-type", self.response_content_type.as_deref());
        enc.set_optional_timestamp_query("response-expires", self.response_expires.as_ref());
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl EcsInput for PutObjectInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        PutObjectInput::validate(self)
    }

    fn encode(&self, enc: &mut RequestEncoder) -> Result<(), EcsError> {
        enc.set_label("Bucket", &self.bucket);
        enc.set_label("Key", &self.key);
        enc.set_optional_display_header("x-amz-acl", self.acl.as_ref())?;
        enc.set_optional_header("Cache-Control", self.cache_control.as_deref())?;
        enc.set_optional_header("Content-Disposition", self.content_disposition.as_deref())?;
        enc.set_optional_header("Content-Encoding", self.content_encoding.as_deref())?;
        enc.set_optional_header("Content-Language", self.content_language.as_deref())?;
        enc.set_optional_int_header("Content-Length", self.content_length)?;
        enc.set_optional_header("Content-Type", self.content_type.as_deref())?;
        enc.set_optional_timestamp_header("Expires", self.expires.as_ref())?;
        enc.set_optional_header("x-amz-grant-full-control", self.grant_full_control.as_deref())?;
        enc.set_optional_header("x-amz-grant-read", self.grant_read.as_deref())?;
        enc.set_optional_header("x-amz-grant-read-acp", self.grant_read_acp.as_deref())?;
        enc.set_optional_header("x-amz-grant-write-acp", self.grant_write_acp.as_deref())?;
        enc.set_optional_header("If-None-Match", self.if_none_match.as_deref())?;
        enc.set_metadata_headers(&self.metadata)?;
        enc.set_optional_header("Range", self.range.as_deref())?;
        enc.set_optional_display_header("x-amz-request-payer", self.request_payer.as_ref())?;
        enc.set_optional_int_header("x-emc-retention-period", self.retention_period)?;
        enc.set_optional_header("x-emc-retention-policy", self.retention_policy.as_deref())?;
        enc.set_optional_header(
            "x-amz-server-side-encryption-customer-algorithm",
            self.sse_customer_algorithm.as_deref(),
        )?;
        enc.set_optional_header(
            "x-amz-server-side-encryption-customer-key",
            self.sse_customer_key.as_deref(),
        )?;
        enc.set_optional_header(
            "x-amz-server-side-encryption-customer-key-MD5",
            self.sse_customer_key_md5.as_deref(),
        )?;
        enc.set_optional_header(
            "x-amz-server-side-encryption-aws-kms-key-id",
            self.ssekms_key_id.as_deref(),
        )?;
        enc.set_optional_display_header(
            "x-amz-server-side-encryption",
            self.server_side_encryption.as_ref(),
        )?;
        enc.set_optional_display_header("x-amz-storage-class", self.storage_class.as_ref())?;
        enc.set_optional_header("x-amz-tagging", self.tagging.as_deref())?;
        enc.set_optional_header(
            "x-amz-website-redirect-location",
            self.website_redirect_location.as_deref(),
        )?;
        if let Some(ref body) = self.body {
            enc.set_body(body.data.clone());
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
