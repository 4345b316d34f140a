//! Operation outputs.

mod bucket;
mod object;
mod search;

pub use bucket::{CreateBucketOutput, HeadBucketOutput, PutBucketIsStaleAllowedOutput};
pub use object::{GetObjectOutput, HeadObjectOutput, PutObjectOutput};
pub use search::{
    DeleteBucketMetadataSearchOutput, GetSystemMetadataSearchKeysOutput,
    ListBucketMetadataSearchOutput, ListBucketQueryOutput,
};
