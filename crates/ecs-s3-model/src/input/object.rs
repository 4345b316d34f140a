use std::collections::HashMap;

use crate::error::InvalidParams;
use crate::request::StreamingBlob;
use crate::types::{ObjectCannedACL, RequestPayer, ServerSideEncryption, StorageClass};

/// ECS GetObjectInput.
#[derive(Debug, Clone, Default)]
pub struct GetObjectInput {
    /// HTTP label (URI path).
    pub bucket: String,
    /// HTTP header: `If-Match`.
    pub if_match: Option<String>,
    /// HTTP header: `If-Modified-Since`.
    pub if_modified_since: Option<chrono::DateTime<chrono::Utc>>,
    /// HTTP header: `If-None-Match`.
    pub if_none_match: Option<String>,
    /// HTTP header: `If-Unmodified-Since`.
    pub if_unmodified_since: Option<chrono::DateTime<chrono::Utc>>,
    /// HTTP label (URI path).
    pub key: String,
    /// HTTP query: `partNumber`.
    pub part_number: Option<i64>,
    /// HTTP header: `Range`.
    pub range: Option<String>,
    /// HTTP header: `x-amz-request-payer`.
    pub request_payer: Option<RequestPayer>,
    /// HTTP query: `response-cache-control`.
    pub response_cache_control: Option<String>,
    /// HTTP query: `response-content-disposition`.
    pub response_content_disposition: Option<String>,
    /// HTTP query: `response-content-encoding`.
    pub response_content_encoding: Option<String>,
    /// HTTP query: `response-content-language`.
    pub response_content_language: Option<String>,
    /// HTTP query: `response-content-type`.
    pub response_content_type: Option<String>,
    /// HTTP query: `response-expires`.
    pub response_expires: Option<chrono::DateTime<chrono::Utc>>,
    /// HTTP header: `x-amz-server-side-encryption-customer-algorithm`.
    pub sse_customer_algorithm: Option<String>,
    /// HTTP header: `x-amz-server-side-encryption-customer-key`.
    pub sse_customer_key: Option<String>,
    /// HTTP header: `x-amz-server-side-encryption-customer-key-MD5`.
    pub sse_customer_key_md5: Option<String>,
    /// HTTP query: `versionId`.
    pub version_id: Option<String>,
}

impl GetObjectInput {
    /// Check required fields.
    pub fn validate(&self) -> Result<(), InvalidParams> {
        let mut errs = InvalidParams::new("GetObjectInput");
        errs.require("Bucket", &self.bucket);
        errs.require("Key", &self.key);
        errs.into_result()
    }
}

/// ECS HeadObjectInput.
#[derive(Debug, Clone, Default)]
pub struct HeadObjectInput {
    /// HTTP label (URI path).
    pub bucket: String,
    /// HTTP header: `If-Match`.
    pub if_match: Option<String>,
    /// HTTP header: `If-Modified-Since`.
    pub if_modified_since: Option<chrono::DateTime<chrono::Utc>>,
    /// HTTP header: `If-None-Match`.
    pub if_none_match: Option<String>,
    /// HTTP header: `If-Unmodified-Since`.
    pub if_unmodified_since: Option<chrono::DateTime<chrono::Utc>>,
    /// HTTP label (URI path).
    pub key: String,
    /// HTTP query: `partNumber`.
    pub part_number: Option<i64>,
    /// HTTP header: `Range`.
    pub range: Option<String>,
    /// HTTP header: `x-amz-request-payer`.
    pub request_payer: Option<RequestPayer>,
    /// HTTP header: `x-amz-server-side-encryption-customer-algorithm`.
    pub sse_customer_algorithm: Option<String>,
    /// HTTP header: `x-amz-server-side-encryption-customer-key`.
    pub sse_customer_key: Option<String>,
    /// HTTP header: `x-amz-server-side-encryption-customer-key-MD5`.
    pub sse_customer_key_md5: Option<String>,
    /// HTTP query: `versionId`.
    pub version_id: Option<String>,
}

impl HeadObjectInput {
    /// Check required fields.
    pub fn validate(&self) -> Result<(), InvalidParams> {
        let mut errs = InvalidParams::new("HeadObjectInput");
        errs.require("Bucket", &self.bucket);
        errs.require("Key", &self.key);
        errs.into_result()
    }
}

/// ECS PutObjectInput.
#[derive(Debug, Clone, Default)]
pub struct PutObjectInput {
    /// HTTP header: `x-amz-acl`.
    pub acl: Option<ObjectCannedACL>,
    /// HTTP payload body.
    pub body: Option<StreamingBlob>,
    /// HTTP label (URI path).
    pub bucket: String,
    /// HTTP header: `Cache-Control`.
    pub cache_control: Option<String>,
    /// HTTP header: `Content-Disposition`.
    pub content_disposition: Option<String>,
    /// HTTP header: `Content-Encoding`.
    pub content_encoding: Option<String>,
    /// HTTP header: `Content-Language`.
    pub content_language: Option<String>,
    /// HTTP header: `Content-Length`. Defaults to the body length.
    pub content_length: Option<i64>,
    /// HTTP header: `Content-Type`.
    pub content_type: Option<String>,
    /// HTTP header: `Expires`.
    pub expires: Option<chrono::DateTime<chrono::Utc>>,
    /// HTTP header: `x-amz-grant-full-control`.
    pub grant_full_control: Option<String>,
    /// HTTP header: `x-amz-grant-read`.
    pub grant_read: Option<String>,
    /// HTTP header: `x-amz-grant-read-acp`.
    pub grant_read_acp: Option<String>,
    /// HTTP header: `x-amz-grant-write-acp`.
    pub grant_write_acp: Option<String>,
    /// HTTP header: `If-None-Match`.
    pub if_none_match: Option<String>,
    /// HTTP label (URI path).
    pub key: String,
    /// HTTP prefix headers: `x-amz-meta-`.
    pub metadata: HashMap<String, String>,
    /// HTTP header: `Range`.
    ///
    /// Writes the body at the given offset of an existing object instead of
    /// replacing it. [`PutObjectInput::APPEND_RANGE`] appends.
    pub range: Option<String>,
    /// HTTP header: `x-amz-request-payer`.
    pub request_payer: Option<RequestPayer>,
    /// HTTP header: `x-emc-retention-period` (seconds).
    pub retention_period: Option<i64>,
    /// HTTP header: `x-emc-retention-policy`.
    pub retention_policy: Option<String>,
    /// HTTP header: `x-amz-server-side-encryption-customer-algorithm`.
    pub sse_customer_algorithm: Option<String>,
    /// HTTP header: `x-amz-server-side-encryption-customer-key`.
    pub sse_customer_key: Option<String>,
    /// HTTP header: `x-amz-server-side-encryption-customer-key-MD5`.
    pub sse_customer_key_md5: Option<String>,
    /// HTTP header: `x-amz-server-side-encryption-aws-kms-key-id`.
    pub ssekms_key_id: Option<String>,
    /// HTTP header: `x-amz-server-side-encryption`.
    pub server_side_encryption: Option<ServerSideEncryption>,
    /// HTTP header: `x-amz-storage-class`.
    pub storage_class: Option<StorageClass>,
    /// HTTP header: `x-amz-tagging`.
    pub tagging: Option<String>,
    /// HTTP header: `x-amz-website-redirect-location`.
    pub website_redirect_location: Option<String>,
}

impl PutObjectInput {
    /// `Range` value that appends the body to the end of the object.
    pub const APPEND_RANGE: &'static str = "bytes=-1-";

    /// Check required fields.
    pub fn validate(&self) -> Result<(), InvalidParams> {
        let mut errs = InvalidParams::new("PutObjectInput");
        errs.require("Bucket", &self.bucket);
        errs.require("Key", &self.key);
        errs.into_result()
    }

    /// Length of the body in bytes, zero when there is none.
    #[must_use]
    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, StreamingBlob::len)
    }
}
