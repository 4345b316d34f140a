//! XML codec for the ECS S3 extension operations.
//!
//! ECS speaks the S3 RestXml protocol with `noErrorWrapping: true`, plus a few
//! vendor documents for metadata search.
//!
//! # Key components
//!
//! - [`S3Serialize`] trait and [`to_xml`] for request payloads (`CreateBucketConfiguration`)
//! - [`S3Deserialize`] trait and [`from_xml`] for response documents
//!   (`MetadataSearchList`, `BucketQueryResult`)
//! - [`parse_error`] for the flat `<Error>` envelope of failed requests
//! - [`check_well_formed`] for responses whose body carries no data
//!
//! # XML conventions
//!
//! - Namespace: `http://s3.amazonaws.com/doc/2006-03-01/`
//! - Booleans: lowercase `true`/`false`
//! - Query match lists are flattened and keep server order

pub mod deserialize;
pub mod error;
pub mod serialize;

pub use deserialize::{S3Deserialize, check_well_formed, from_xml};
pub use error::{ErrorEnvelope, XmlError, parse_error};
pub use serialize::{S3_NAMESPACE, S3Serialize, to_xml};
