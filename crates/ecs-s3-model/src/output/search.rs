use crate::types::{IndexableKey, ObjectMatch, OptionalAttribute};

/// ECS DeleteBucketMetadataSearchOutput. The response body is discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteBucketMetadataSearchOutput;

/// ECS ListBucketMetadataSearchOutput.
#[derive(Debug, Clone, Default)]
pub struct ListBucketMetadataSearchOutput {
    /// XML list `IndexableKeys`, items `Key`.
    pub indexable_keys: Vec<IndexableKey>,
    /// XML element `MetadataSearchEnabled`.
    pub metadata_search_enabled: Option<bool>,
    /// XML list `OptionalAttributes`, items `Attribute`.
    pub optional_attributes: Vec<OptionalAttribute>,
}

/// ECS ListBucketQueryOutput.
#[derive(Debug, Clone, Default)]
pub struct ListBucketQueryOutput {
    /// XML element `MaxKeys`.
    pub max_keys: Option<i64>,
    /// XML element `Name`: the bucket name.
    pub name: Option<String>,
    /// XML element `NextMarker`.
    pub next_marker: Option<String>,
    /// XML list `ObjectMatches`, items `object`. Server order is kept.
    pub object_matches: Vec<ObjectMatch>,
}

impl ListBucketQueryOutput {
    /// `NextMarker` value the server sends on the last page.
    pub const NO_MORE_PAGES: &'static str = "NO MORE PAGES";

    /// The marker to pass to the next request, if another page exists.
    #[must_use]
    pub fn continuation_marker(&self) -> Option<&str> {
        self.next_marker
            .as_deref()
            .filter(|m| !m.is_empty() && *m != Self::NO_MORE_PAGES)
    }

    /// Returns true if the server reported another page.
    #[must_use]
    pub fn has_more_pages(&self) -> bool {
        self.continuation_marker().is_some()
    }
}

/// ECS GetSystemMetadataSearchKeysOutput.
#[derive(Debug, Clone, Default)]
pub struct GetSystemMetadataSearchKeysOutput {
    /// XML list `IndexableKeys`, items `Key`.
    pub indexable_keys: Vec<IndexableKey>,
    /// XML list `OptionalAttributes`, items `Attribute`.
    pub optional_attributes: Vec<OptionalAttribute>,
}
