//! Operation inputs.

mod bucket;
mod object;
mod search;

pub use bucket::{CreateBucketInput, HeadBucketInput, PutBucketIsStaleAllowedInput};
pub use object::{GetObjectInput, HeadObjectInput, PutObjectInput};
pub use search::{
    DeleteBucketMetadataSearchInput, GetSystemMetadataSearchKeysInput,
    ListBucketMetadataSearchInput, ListBucketQueryInput,
};
