//! The operation table: name, HTTP method and path template per operation.

/// All supported ECS S3 extension operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcsOperation {
    /// CreateBucket with the ECS bucket-level headers.
    CreateBucket,
    /// Disable metadata search on a bucket.
    DeleteBucketMetadataSearch,
    /// List a bucket's metadata search configuration.
    ListBucketMetadataSearch,
    /// Run a metadata query against a bucket.
    ListBucketQuery,
    /// List the system-wide indexable keys.
    GetSystemMetadataSearchKeys,
    /// Toggle stale reads for a bucket.
    PutBucketIsStaleAllowed,
    /// HeadBucket surfacing the retention period.
    HeadBucket,
    /// HeadObject surfacing retention headers.
    HeadObject,
    /// GetObject surfacing retention headers.
    GetObject,
    /// PutObject with retention and range (append/overwrite) support.
    PutObject,
}

impl EcsOperation {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::CreateBucket,
        Self::DeleteBucketMetadataSearch,
        Self::ListBucketMetadataSearch,
        Self::ListBucketQuery,
        Self::GetSystemMetadataSearchKeys,
        Self::PutBucketIsStaleAllowed,
        Self::HeadBucket,
        Self::HeadObject,
        Self::GetObject,
        Self::PutObject,
    ];

    /// Returns the operation name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateBucket => "CreateBucket",
            Self::DeleteBucketMetadataSearch => "DeleteBucketMetadataSearch",
            Self::ListBucketMetadataSearch => "ListBucketMetadataSearch",
            Self::ListBucketQuery => "ListBucketQuery",
            Self::GetSystemMetadataSearchKeys => "GetSystemMetadataSearchKeys",
            Self::PutBucketIsStaleAllowed => "PutBucketIsStaleAllowed",
            Self::HeadBucket => "HeadBucket",
            Self::HeadObject => "HeadObject",
            Self::GetObject => "GetObject",
            Self::PutObject => "PutObject",
        }
    }

    /// Parse an operation from its name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    /// The HTTP method for this operation.
    #[must_use]
    pub fn http_method(&self) -> http::Method {
        match self {
            Self::CreateBucket | Self::PutBucketIsStaleAllowed | Self::PutObject => {
                http::Method::PUT
            }
            Self::DeleteBucketMetadataSearch => http::Method::DELETE,
            Self::ListBucketMetadataSearch
            | Self::ListBucketQuery
            | Self::GetSystemMetadataSearchKeys
            | Self::GetObject => http::Method::GET,
            Self::HeadBucket | Self::HeadObject => http::Method::HEAD,
        }
    }

    /// The URI template. `{Name}` is a label, `{Name+}` a greedy label that keeps
    /// `/`, and anything after `?` is a static subresource query.
    #[must_use]
    pub fn http_path(&self) -> &'static str {
        match self {
            Self::CreateBucket | Self::HeadBucket => "/{Bucket}",
            Self::DeleteBucketMetadataSearch | Self::ListBucketMetadataSearch => {
                "/{Bucket}?searchmetadata"
            }
            Self::ListBucketQuery => "/{Bucket}?query",
            Self::GetSystemMetadataSearchKeys => "/?searchmetadata",
            Self::PutBucketIsStaleAllowed => "/{Bucket}?isstaleallowed",
            Self::HeadObject | Self::GetObject | Self::PutObject => "/{Bucket}/{Key+}",
        }
    }
}

impl std::fmt::Display for EcsOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_roundtrip_every_operation_name() {
        for op in EcsOperation::ALL {
            assert_eq!(EcsOperation::from_name(op.as_str()), Some(op));
        }
        assert_eq!(EcsOperation::from_name("DeleteBucket"), None);
    }

    #[test]
    fn test_should_map_metadata_search_operations_to_subresource() {
        assert_eq!(
            EcsOperation::DeleteBucketMetadataSearch.http_method(),
            http::Method::DELETE
        );
        assert_eq!(
            EcsOperation::ListBucketMetadataSearch.http_path(),
            "/{Bucket}?searchmetadata"
        );
        assert_eq!(
            EcsOperation::GetSystemMetadataSearchKeys.http_path(),
            "/?searchmetadata"
        );
    }
}
