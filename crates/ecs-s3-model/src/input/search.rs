use crate::error::InvalidParams;

/// ECS DeleteBucketMetadataSearchInput.
#[derive(Debug, Clone, Default)]
pub struct DeleteBucketMetadataSearchInput {
    /// HTTP label (URI path).
    pub bucket: String,
}

impl DeleteBucketMetadataSearchInput {
    /// Check required fields.
    pub fn validate(&self) -> Result<(), InvalidParams> {
        let mut errs = InvalidParams::new("DeleteBucketMetadataSearchInput");
        errs.require("Bucket", &self.bucket);
        errs.into_result()
    }
}

/// ECS ListBucketMetadataSearchInput.
#[derive(Debug, Clone, Default)]
pub struct ListBucketMetadataSearchInput {
    /// HTTP label (URI path).
    pub bucket: String,
}

impl ListBucketMetadataSearchInput {
    /// Check required fields.
    pub fn validate(&self) -> Result<(), InvalidParams> {
        let mut errs = InvalidParams::new("ListBucketMetadataSearchInput");
        errs.require("Bucket", &self.bucket);
        errs.into_result()
    }
}

/// ECS ListBucketQueryInput.
#[derive(Debug, Clone, Default)]
pub struct ListBucketQueryInput {
    /// HTTP query: `attributes`. Comma-separated optional attributes to return.
    pub attributes: Option<String>,
    /// HTTP label (URI path).
    pub bucket: String,
    /// HTTP query: `include-older-version`.
    pub include_older_version: Option<bool>,
    /// HTTP query: `marker`.
    pub marker: Option<String>,
    /// HTTP query: `max-keys`.
    pub max_keys: Option<i64>,
    /// HTTP query: `query`, e.g. `Size>3 and x-amz-meta-INT<10`.
    pub query: String,
    /// HTTP query: `sorted`. Key to order matches by.
    pub sorted: Option<String>,
}

impl ListBucketQueryInput {
    /// Check required fields.
    pub fn validate(&self) -> Result<(), InvalidParams> {
        let mut errs = InvalidParams::new("ListBucketQueryInput");
        errs.require("Bucket", &self.bucket);
        errs.require("Query", &self.query);
        errs.into_result()
    }
}

/// ECS GetSystemMetadataSearchKeysInput. Carries no parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetSystemMetadataSearchKeysInput;

impl GetSystemMetadataSearchKeysInput {
    /// Always succeeds.
    #[allow(clippy::unnecessary_wraps)]
    pub fn validate(&self) -> Result<(), InvalidParams> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParamError;

    #[test]
    fn test_should_require_query() {
        let input = ListBucketQueryInput {
            bucket: "b".to_owned(),
            ..Default::default()
        };
        let err = input.validate().expect_err("query is required");
        assert_eq!(err.errors, vec![ParamError::required("Query")]);
    }

    #[test]
    fn test_should_accept_complete_query() {
        let input = ListBucketQueryInput {
            bucket: "b".to_owned(),
            query: "Size>3".to_owned(),
            sorted: Some("Size".to_owned()),
            ..Default::default()
        };
        assert!(input.validate().is_ok());
    }
}
