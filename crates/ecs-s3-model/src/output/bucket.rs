/// ECS CreateBucketOutput.
#[derive(Debug, Clone, Default)]
pub struct CreateBucketOutput {
    /// HTTP header: `Location`.
    pub location: Option<String>,
}

/// ECS HeadBucketOutput.
#[derive(Debug, Clone, Default)]
pub struct HeadBucketOutput {
    /// HTTP header: `x-emc-retention-period` (seconds).
    pub retention_period: Option<i64>,
}

/// ECS PutBucketIsStaleAllowedOutput. The response body is discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct PutBucketIsStaleAllowedOutput;
