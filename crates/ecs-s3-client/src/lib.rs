//! Client for the Dell EMC ECS extensions to the S3 API.
//!
//! Adds the ECS operations (metadata search, stale-read toggling) and the ECS
//! headers on standard bucket and object operations (retention, append,
//! bucket-level flags) on top of a SigV4-signed RestXml request pipeline.
//!
//! # Usage
//!
//! ```rust,no_run
//! use ecs_s3_auth::StaticCredentialProvider;
//! use ecs_s3_client::{Client, ClientConfig};
//! use ecs_s3_model::input::ListBucketQueryInput;
//!
//! # async fn run() -> Result<(), ecs_s3_client::EcsError> {
//! let config = ClientConfig::builder()
//!     .endpoint_url("http://ecs.example.com:9020".to_owned())
//!     .build();
//! let client = Client::builder(config)
//!     .credentials_provider(StaticCredentialProvider::new("user1", "secret"))
//!     .build();
//!
//! let out = client
//!     .list_bucket_query(ListBucketQueryInput {
//!         bucket: "photos".to_owned(),
//!         query: "x-amz-meta-camera==\"x100\"".to_owned(),
//!         ..Default::default()
//!     })
//!     .await?;
//! for m in &out.object_matches {
//!     println!("{:?}", m.object_name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`client`] - [`Client`], its builder and the per-operation entry points
//! - [`operation`] - [`Request`] handles, request options, sending
//! - [`handlers`] - named handler lists and the protocol handlers
//! - [`customizations`] - ECS hooks (location constraint, `100-continue`, discard body)
//! - [`request`] - field-to-wire encoding of inputs
//! - [`response`] - wire-to-field decoding of outputs
//! - [`transport`] - the HTTP seam, backed by `reqwest`
//! - [`config`] - [`ClientConfig`]
//! - [`error`] - [`EcsError`]

pub mod body;
pub mod client;
pub mod config;
pub mod customizations;
pub mod error;
pub mod handlers;
pub mod operation;
pub mod request;
pub mod response;
pub mod transport;

pub use body::ResponseBody;
pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use error::{EcsError, TransportError};
pub use handlers::{HandlerList, Handlers, RequestContext, RequestHandler, Stage, WireResponse};
pub use operation::{Request, RequestOption, RequestSettings, with_handler, with_header, with_timeout};
pub use request::{EcsInput, RequestEncoder};
pub use response::{EcsOutput, PayloadKind};
pub use transport::{ReqwestTransport, Transport};
