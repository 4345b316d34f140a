//! Named request handlers organised by pipeline stage.
//!
//! A request runs through four stages:
//!
//! 1. **validate** - check the input (`core.ValidateParameters`)
//! 2. **build** - encode the input into an `http::Request` (`core.RestXmlBuild`)
//! 3. **sign** - add SigV4 headers (`core.SigV4Sign`)
//! 4. **unmarshal** - decode the response into the output
//!    (`core.RestXmlUnmarshalMeta`, `core.RestXmlUnmarshal`)
//!
//! Every stage is a [`HandlerList`] of named entries that can be added, removed
//! or swapped by name. The client owns the base [`Handlers`]; each request gets
//! its own copy, so changing one request never affects another.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use ecs_s3_auth::{CredentialProvider, SigningParams, sign_request};
use ecs_s3_model::EcsOperation;
use http::{HeaderMap, StatusCode};
use tracing::debug;

use crate::body::ResponseBody;
use crate::config::ClientConfig;
use crate::error::EcsError;
use crate::request::{EcsInput, RequestEncoder};
use crate::response::EcsOutput;

/// Name of the required-field check.
pub const VALIDATE_PARAMETERS: &str = "core.ValidateParameters";
/// Name of the REST/XML request encoder.
pub const REST_XML_BUILD: &str = "core.RestXmlBuild";
/// Name of the SigV4 signer.
pub const SIGV4_SIGN: &str = "core.SigV4Sign";
/// Name of the response header decoder.
pub const REST_XML_UNMARSHAL_META: &str = "core.RestXmlUnmarshalMeta";
/// Name of the response payload decoder.
pub const REST_XML_UNMARSHAL: &str = "core.RestXmlUnmarshal";
/// Name of the handler that drops the response body unread.
pub const DISCARD_BODY: &str = "core.DiscardBody";

/// Service name in the SigV4 credential scope.
const SIGNING_SERVICE: &str = "s3";

/// A handler of the validate, build or sign stage.
pub type RequestHandler = Arc<dyn Fn(&mut RequestContext) -> Result<(), EcsError> + Send + Sync>;

/// A handler of the unmarshal stage for output type `O`.
pub type UnmarshalHandler<O> =
    Arc<dyn Fn(&mut O, &mut WireResponse) -> Result<(), EcsError> + Send + Sync>;

/// State shared by the validate, build and sign handlers of one request.
#[derive(Debug)]
pub struct RequestContext {
    /// The operation being sent.
    pub operation: EcsOperation,
    /// Client configuration.
    pub config: Arc<ClientConfig>,
    /// Credential source; `None` sends the request unsigned.
    pub credentials: Option<Arc<dyn CredentialProvider>>,
    /// The operation input. Hooks that change parameters replace it.
    pub params: Box<dyn EcsInput>,
    /// The encoded request, set by the build stage.
    pub http_request: Option<http::Request<Bytes>>,
}

/// A success response as seen by the unmarshal handlers.
#[derive(Debug)]
pub struct WireResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body, buffered unless the output streams its payload.
    pub body: ResponseBody,
}

/// A handler with the name it is registered under.
#[derive(Clone)]
struct NamedHandler<H> {
    name: String,
    handler: H,
}

/// An ordered list of named handlers.
#[derive(Clone)]
pub struct HandlerList<H> {
    list: Vec<NamedHandler<H>>,
}

impl<H> Default for HandlerList<H> {
    fn default() -> Self {
        Self { list: Vec::new() }
    }
}

impl<H> fmt::Debug for HandlerList<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl<H> HandlerList<H> {
    /// An empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler.
    pub fn push_back(&mut self, name: impl Into<String>, handler: H) {
        self.list.push(NamedHandler {
            name: name.into(),
            handler,
        });
    }

    /// Prepend a handler.
    pub fn push_front(&mut self, name: impl Into<String>, handler: H) {
        self.list.insert(
            0,
            NamedHandler {
                name: name.into(),
                handler,
            },
        );
    }

    /// Remove every handler registered under `name`. Returns true if any was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.list.len();
        self.list.retain(|h| h.name != name);
        self.list.len() != before
    }

    /// Replace every handler registered under `name`, keeping its position.
    /// Returns true if any was replaced.
    pub fn swap(&mut self, name: &str, handler: H) -> bool
    where
        H: Clone,
    {
        let mut swapped = false;
        for entry in self.list.iter_mut().filter(|h| h.name == name) {
            entry.handler = handler.clone();
            swapped = true;
        }
        swapped
    }

    /// Returns true if a handler is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.list.iter().any(|h| h.name == name)
    }

    /// Number of handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns true if the list has no handlers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Remove all handlers.
    pub fn clear(&mut self) {
        self.list.clear();
    }

    /// Handler names in run order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.list.iter().map(|h| h.name.as_str()).collect()
    }
}

impl HandlerList<RequestHandler> {
    /// Run every handler in order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first handler error.
    pub fn run(&self, ctx: &mut RequestContext) -> Result<(), EcsError> {
        for entry in &self.list {
            (entry.handler)(ctx)?;
        }
        Ok(())
    }
}

impl<O> HandlerList<UnmarshalHandler<O>> {
    /// Run every handler in order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first handler error.
    pub fn run(&self, output: &mut O, response: &mut WireResponse) -> Result<(), EcsError> {
        for entry in &self.list {
            (entry.handler)(output, response)?;
        }
        Ok(())
    }
}

/// A pipeline stage that runs before the request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Input checks and input rewrites.
    Validate,
    /// Request encoding and request header changes.
    Build,
    /// Request signing and changes to unsigned headers.
    Sign,
}

/// The request-side handler lists.
#[derive(Debug, Clone, Default)]
pub struct Handlers {
    /// Validate stage.
    pub validate: HandlerList<RequestHandler>,
    /// Build stage.
    pub build: HandlerList<RequestHandler>,
    /// Sign stage.
    pub sign: HandlerList<RequestHandler>,
}

impl Handlers {
    /// The protocol handlers without any ECS customization.
    #[must_use]
    pub fn core() -> Self {
        let mut handlers = Self::default();
        handlers
            .validate
            .push_back(VALIDATE_PARAMETERS, Arc::new(validate_parameters));
        handlers
            .build
            .push_back(REST_XML_BUILD, Arc::new(rest_xml_build));
        handlers.sign.push_back(SIGV4_SIGN, Arc::new(sigv4_sign));
        handlers
    }

    /// The handler list of a stage.
    pub fn stage_mut(&mut self, stage: Stage) -> &mut HandlerList<RequestHandler> {
        match stage {
            Stage::Validate => &mut self.validate,
            Stage::Build => &mut self.build,
            Stage::Sign => &mut self.sign,
        }
    }

    /// Run validate, build and sign in order.
    ///
    /// # Errors
    ///
    /// Returns the first handler error.
    pub fn run(&self, ctx: &mut RequestContext) -> Result<(), EcsError> {
        self.validate.run(ctx)?;
        self.build.run(ctx)?;
        self.sign.run(ctx)
    }
}

/// The default unmarshal stage for output type `O`.
#[must_use]
pub fn default_unmarshal_handlers<O: EcsOutput>() -> HandlerList<UnmarshalHandler<O>> {
    let mut list: HandlerList<UnmarshalHandler<O>> = HandlerList::new();
    list.push_back(
        REST_XML_UNMARSHAL_META,
        Arc::new(rest_xml_unmarshal_meta::<O>),
    );
    list.push_back(REST_XML_UNMARSHAL, Arc::new(rest_xml_unmarshal::<O>));
    list
}

// ---------------------------------------------------------------------------
// Core handlers
// ---------------------------------------------------------------------------

/// `core.ValidateParameters`: reject inputs with missing required fields.
///
/// # Errors
///
/// Returns [`EcsError::InvalidParams`].
pub fn validate_parameters(ctx: &mut RequestContext) -> Result<(), EcsError> {
    ctx.params.validate()?;
    Ok(())
}

/// `core.RestXmlBuild`: encode the input into an HTTP request.
///
/// # Errors
///
/// Returns an error if a value cannot be encoded or the endpoint is invalid.
pub fn rest_xml_build(ctx: &mut RequestContext) -> Result<(), EcsError> {
    let mut enc = RequestEncoder::new(ctx.operation.http_path());
    ctx.params.encode(&mut enc)?;
    let request = enc.into_http_request(ctx.operation.http_method(), &ctx.config)?;
    debug!(
        operation = %ctx.operation,
        method = %request.method(),
        uri = %request.uri(),
        body_len = request.body().len(),
        "Built request"
    );
    ctx.http_request = Some(request);
    Ok(())
}

/// `core.SigV4Sign`: sign the request with the resolved credentials.
///
/// Without a credential provider the request is sent unsigned.
///
/// # Errors
///
/// Returns [`EcsError::Auth`] if credentials cannot be resolved or the request
/// cannot be signed.
pub fn sigv4_sign(ctx: &mut RequestContext) -> Result<(), EcsError> {
    let Some(ref provider) = ctx.credentials else {
        debug!(operation = %ctx.operation, "No credentials, sending anonymous request");
        return Ok(());
    };
    let credentials = provider.provide_credentials()?;
    let request = ctx
        .http_request
        .as_mut()
        .ok_or(EcsError::NotBuilt(ctx.operation))?;
    let payload = request.body().clone();
    let params = SigningParams {
        region: &ctx.config.region,
        service: SIGNING_SERVICE,
        time: Utc::now(),
    };
    sign_request(request, &payload, &credentials, &params)?;
    Ok(())
}

/// `core.RestXmlUnmarshalMeta`: decode header-bound output fields.
///
/// # Errors
///
/// Never fails; header decoding is lenient.
pub fn rest_xml_unmarshal_meta<O: EcsOutput>(
    output: &mut O,
    response: &mut WireResponse,
) -> Result<(), EcsError> {
    output.unmarshal_meta(&response.headers);
    Ok(())
}

/// `core.RestXmlUnmarshal`: decode the payload.
///
/// # Errors
///
/// Returns [`EcsError::Xml`] if the payload is malformed.
pub fn rest_xml_unmarshal<O: EcsOutput>(
    output: &mut O,
    response: &mut WireResponse,
) -> Result<(), EcsError> {
    output.unmarshal_body(std::mem::take(&mut response.body))
}

/// `core.DiscardBody`: drop the body without looking at it.
///
/// # Errors
///
/// Never fails.
pub fn discard_body<O>(_output: &mut O, response: &mut WireResponse) -> Result<(), EcsError> {
    response.body = ResponseBody::empty();
    Ok(())
}
