//! The ECS S3 extension client.
//!
//! Each operation is exposed three ways:
//!
//! - `xxx_request(input)` returns a [`Request`] whose handlers can be adjusted
//!   before it is sent,
//! - `xxx(input)` sends it directly,
//! - `xxx_with_context(cancel, input, options)` sends it with a cancellation
//!   token and [`RequestOption`]s.
//!
//! Inputs may be `None`, which sends the zero-value input (and usually fails
//! validation).

use std::fmt;
use std::sync::Arc;

use ecs_s3_auth::{CredentialProvider, EnvironmentCredentialProvider};
use ecs_s3_model::EcsOperation;
use ecs_s3_model::input::{
    CreateBucketInput, DeleteBucketMetadataSearchInput, GetObjectInput,
    GetSystemMetadataSearchKeysInput, HeadBucketInput, HeadObjectInput,
    ListBucketMetadataSearchInput, ListBucketQueryInput, PutBucketIsStaleAllowedInput,
    PutObjectInput,
};
use ecs_s3_model::output::{
    CreateBucketOutput, DeleteBucketMetadataSearchOutput, GetObjectOutput,
    GetSystemMetadataSearchKeysOutput, HeadBucketOutput, HeadObjectOutput,
    ListBucketMetadataSearchOutput, ListBucketQueryOutput, PutBucketIsStaleAllowedOutput,
    PutObjectOutput,
};
use futures::Stream;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::ClientConfig;
use crate::customizations::{discard_response_body, install};
use crate::error::EcsError;
use crate::handlers::{Handlers, RequestHandler, Stage, default_unmarshal_handlers};
use crate::operation::{Request, RequestOption};
use crate::transport::{ReqwestTransport, Transport};

/// State shared by a client and every request it creates.
pub(crate) struct ClientInner {
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) credentials: Option<Arc<dyn CredentialProvider>>,
    pub(crate) handlers: Handlers,
}

/// Client for the ECS S3 extension operations. Cheap to clone.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .field("transport", &self.inner.transport)
            .field("signed", &self.inner.credentials.is_some())
            .field("handlers", &self.inner.handlers)
            .finish()
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    extra_handlers: Vec<(Stage, String, RequestHandler)>,
    customizations: bool,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extra: Vec<&str> = self
            .extra_handlers
            .iter()
            .map(|(_, name, _)| name.as_str())
            .collect();
        f.debug_struct("ClientBuilder")
            .field("config", &self.config)
            .field("transport", &self.transport)
            .field("credentials", &self.credentials)
            .field("extra_handlers", &extra)
            .field("customizations", &self.customizations)
            .finish()
    }
}

impl ClientBuilder {
    /// Use `transport` instead of the default [`ReqwestTransport`].
    #[must_use]
    pub fn transport(mut self, transport: impl Transport) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Sign requests with credentials from `provider`. Without a provider
    /// requests are sent unsigned.
    #[must_use]
    pub fn credentials_provider(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.credentials = Some(Arc::new(provider));
        self
    }

    /// Append a handler to a stage of every request.
    #[must_use]
    pub fn handler(mut self, stage: Stage, name: impl Into<String>, handler: RequestHandler) -> Self {
        self.extra_handlers.push((stage, name.into(), handler));
        self
    }

    /// Leave out the ECS hooks and use the plain protocol handlers.
    #[must_use]
    pub fn without_customizations(mut self) -> Self {
        self.customizations = false;
        self
    }

    /// Build the client.
    #[must_use]
    pub fn build(self) -> Client {
        let mut handlers = Handlers::core();
        if self.customizations {
            install(&mut handlers);
        }
        for (stage, name, handler) in self.extra_handlers {
            handlers.stage_mut(stage).push_back(name, handler);
        }

        info!(
            endpoint = %self.config.endpoint_url,
            region = %self.config.region,
            path_style = self.config.force_path_style,
            signed = self.credentials.is_some(),
            "ECS S3 client created"
        );

        Client {
            inner: Arc::new(ClientInner {
                config: Arc::new(self.config),
                transport: self
                    .transport
                    .unwrap_or_else(|| Arc::new(ReqwestTransport::new())),
                credentials: self.credentials,
                handlers,
            }),
        }
    }
}

/// Generate the three entry points of one operation.
macro_rules! operation {
    (
        $op:ident,
        $name:ident,
        $request:ident,
        $with_context:ident,
        $input:ty => $output:ty
        $(, unmarshal: $customize:path)?
    ) => {
        #[doc = concat!("Create a `", stringify!($op), "` request without sending it.")]
        pub fn $request(&self, input: impl Into<Option<$input>>) -> Request<$output> {
            let input: $input = input.into().unwrap_or_default();
            #[allow(unused_mut)]
            let mut unmarshal = default_unmarshal_handlers::<$output>();
            $($customize(&mut unmarshal);)?
            Request::new(
                Arc::clone(&self.inner),
                EcsOperation::$op,
                Box::new(input),
                unmarshal,
            )
        }

        #[doc = concat!("Send `", stringify!($op), "`.")]
        ///
        /// # Errors
        ///
        /// See [`Request::send`].
        pub async fn $name(&self, input: impl Into<Option<$input>>) -> Result<$output, EcsError> {
            self.$request(input).send().await
        }

        #[doc = concat!("Send `", stringify!($op), "` with a cancellation token and request options.")]
        ///
        /// # Errors
        ///
        /// See [`Request::send`].
        pub async fn $with_context(
            &self,
            cancel: CancellationToken,
            input: impl Into<Option<$input>>,
            options: impl IntoIterator<Item = RequestOption>,
        ) -> Result<$output, EcsError> {
            let mut request = self.$request(input);
            request.set_cancellation(cancel);
            request.apply_options(options);
            request.send().await
        }
    };
}

impl Client {
    /// Start building a client for `config`.
    #[must_use]
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder {
            config,
            transport: None,
            credentials: None,
            extra_handlers: Vec::new(),
            customizations: true,
        }
    }

    /// A client configured from `ECS_*` environment variables, signing with
    /// credentials from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::builder(ClientConfig::from_env())
            .credentials_provider(EnvironmentCredentialProvider::new())
            .build()
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The request-side handlers each new request starts with.
    #[must_use]
    pub fn handlers(&self) -> &Handlers {
        &self.inner.handlers
    }

    operation!(
        CreateBucket,
        create_bucket,
        create_bucket_request,
        create_bucket_with_context,
        CreateBucketInput => CreateBucketOutput
    );

    operation!(
        DeleteBucketMetadataSearch,
        delete_bucket_metadata_search,
        delete_bucket_metadata_search_request,
        delete_bucket_metadata_search_with_context,
        DeleteBucketMetadataSearchInput => DeleteBucketMetadataSearchOutput,
        unmarshal: discard_response_body
    );

    operation!(
        ListBucketMetadataSearch,
        list_bucket_metadata_search,
        list_bucket_metadata_search_request,
        list_bucket_metadata_search_with_context,
        ListBucketMetadataSearchInput => ListBucketMetadataSearchOutput
    );

    operation!(
        ListBucketQuery,
        list_bucket_query,
        list_bucket_query_request,
        list_bucket_query_with_context,
        ListBucketQueryInput => ListBucketQueryOutput
    );

    operation!(
        GetSystemMetadataSearchKeys,
        get_system_metadata_search_keys,
        get_system_metadata_search_keys_request,
        get_system_metadata_search_keys_with_context,
        GetSystemMetadataSearchKeysInput => GetSystemMetadataSearchKeysOutput
    );

    operation!(
        PutBucketIsStaleAllowed,
        put_bucket_is_stale_allowed,
        put_bucket_is_stale_allowed_request,
        put_bucket_is_stale_allowed_with_context,
        PutBucketIsStaleAllowedInput => PutBucketIsStaleAllowedOutput,
        unmarshal: discard_response_body
    );

    operation!(
        HeadBucket,
        head_bucket,
        head_bucket_request,
        head_bucket_with_context,
        HeadBucketInput => HeadBucketOutput
    );

    operation!(
        HeadObject,
        head_object,
        head_object_request,
        head_object_with_context,
        HeadObjectInput => HeadObjectOutput
    );

    operation!(
        GetObject,
        get_object,
        get_object_request,
        get_object_with_context,
        GetObjectInput => GetObjectOutput
    );

    operation!(
        PutObject,
        put_object,
        put_object_request,
        put_object_with_context,
        PutObjectInput => PutObjectOutput
    );

    /// Page through `ListBucketQuery` results.
    ///
    /// Starts at `input.marker` and follows `NextMarker` until the server
    /// reports no more pages or repeats the marker it was given. The first
    /// error ends the stream.
    pub fn list_bucket_query_pages(
        &self,
        input: ListBucketQueryInput,
    ) -> impl Stream<Item = Result<ListBucketQueryOutput, EcsError>> + use<> {
        let client = self.clone();
        futures::stream::unfold(Some(input), move |state| {
            let client = client.clone();
            async move {
                let input = state?;
                match client.list_bucket_query(input.clone()).await {
                    Ok(page) => {
                        let next = page
                            .continuation_marker()
                            .filter(|m| input.marker.as_deref() != Some(*m))
                            .map(|m| ListBucketQueryInput {
                                marker: Some(m.to_owned()),
                                ..input
                            });
                        Some((Ok(page), next))
                    }
                    Err(e) => Some((Err(e), None)),
                }
            }
        })
    }
}
