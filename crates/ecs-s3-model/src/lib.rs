//! Data model for the ECS S3 extension operations.
//!
//! Every operation has an input struct and an output struct. Each field documents
//! where it travels on the wire:
//!
//! - `HTTP label (URI path)` - substituted into the operation's path template
//! - `HTTP query: name` - query string parameter
//! - `HTTP header: name` - request or response header
//! - `HTTP prefix headers: x-amz-meta-` - one header per map entry
//! - `HTTP payload body` - XML document or raw bytes
//!
//! Required fields are plain `String`s; an empty string counts as missing and is
//! rejected by the input's `validate` method before anything is sent.
#![allow(clippy::struct_excessive_bools)]

pub mod error;
pub mod input;
pub mod operations;
pub mod output;
pub mod request;
pub mod types;

pub use error::{InvalidParams, ParamError, ServiceError};
pub use operations::EcsOperation;
pub use request::{ByteStream, Credentials, StreamingBlob};
