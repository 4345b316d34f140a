use crate::error::InvalidParams;
use crate::types::{BucketCannedACL, CreateBucketConfiguration};

/// ECS CreateBucketInput.
#[derive(Debug, Clone, Default)]
pub struct CreateBucketInput {
    /// HTTP header: `x-amz-acl`.
    pub acl: Option<BucketCannedACL>,
    /// HTTP label (URI path).
    pub bucket: String,
    /// HTTP header: `x-emc-compliance-enabled`.
    pub compliance_enabled: Option<bool>,
    /// HTTP payload body.
    pub create_bucket_configuration: Option<CreateBucketConfiguration>,
    /// HTTP header: `x-emc-file-system-access-enabled`.
    pub file_system_access_enabled: Option<bool>,
    /// HTTP header: `x-amz-grant-full-control`.
    pub grant_full_control: Option<String>,
    /// HTTP header: `x-amz-grant-read`.
    pub grant_read: Option<String>,
    /// HTTP header: `x-amz-grant-read-acp`.
    pub grant_read_acp: Option<String>,
    /// HTTP header: `x-amz-grant-write`.
    pub grant_write: Option<String>,
    /// HTTP header: `x-amz-grant-write-acp`.
    pub grant_write_acp: Option<String>,
    /// HTTP header: `x-emc-is-stale-allowed`.
    pub is_stale_allowed: Option<bool>,
    /// HTTP header: `x-emc-metadata-search`.
    ///
    /// Comma-separated key list, user keys suffixed with `;Datatype`, e.g.
    /// `Size,CreateTime,x-amz-meta-STR;String`.
    pub metadata_search: Option<String>,
    /// HTTP header: `x-emc-namespace`.
    pub namespace: Option<String>,
    /// HTTP header: `x-emc-retention-period` (seconds).
    pub retention_period: Option<i64>,
    /// HTTP header: `x-emc-server-side-encryption-enabled`.
    pub server_side_encryption_enabled: Option<bool>,
    /// HTTP header: `x-emc-vpool` (replication group).
    pub vpool: Option<String>,
}

impl CreateBucketInput {
    /// Check required fields.
    pub fn validate(&self) -> Result<(), InvalidParams> {
        let mut errs = InvalidParams::new("CreateBucketInput");
        errs.require("Bucket", &self.bucket);
        errs.into_result()
    }
}

/// ECS HeadBucketInput.
#[derive(Debug, Clone, Default)]
pub struct HeadBucketInput {
    /// HTTP label (URI path).
    pub bucket: String,
    /// HTTP header: `x-amz-expected-bucket-owner`.
    pub expected_bucket_owner: Option<String>,
}

impl HeadBucketInput {
    /// Check required fields.
    pub fn validate(&self) -> Result<(), InvalidParams> {
        let mut errs = InvalidParams::new("HeadBucketInput");
        errs.require("Bucket", &self.bucket);
        errs.into_result()
    }
}

/// ECS PutBucketIsStaleAllowedInput.
#[derive(Debug, Clone, Default)]
pub struct PutBucketIsStaleAllowedInput {
    /// HTTP label (URI path).
    pub bucket: String,
    /// HTTP header: `x-emc-is-stale-allowed`.
    pub is_stale_allowed: Option<bool>,
}

impl PutBucketIsStaleAllowedInput {
    /// Check required fields.
    pub fn validate(&self) -> Result<(), InvalidParams> {
        let mut errs = InvalidParams::new("PutBucketIsStaleAllowedInput");
        errs.require("Bucket", &self.bucket);
        errs.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParamError;

    #[test]
    fn test_should_reject_empty_bucket() {
        let err = CreateBucketInput::default()
            .validate()
            .expect_err("bucket is required");
        assert_eq!(err.context, "CreateBucketInput");
        assert_eq!(err.errors, vec![ParamError::required("Bucket")]);
    }

    #[test]
    fn test_should_accept_bucket_without_optional_headers() {
        let input = PutBucketIsStaleAllowedInput {
            bucket: "b".to_owned(),
            ..Default::default()
        };
        assert!(input.validate().is_ok());
    }
}
