//! ECS-specific request hooks.
//!
//! | Stage | Handler | Applies to |
//! |-------|---------|------------|
//! | validate (front) | `ecs.PopulateLocationConstraint` | `CreateBucket` |
//! | sign (front) | `ecs.Add100Continue` | every `PUT` |
//! | unmarshal | `core.DiscardBody` instead of `core.RestXmlUnmarshal` | `DeleteBucketMetadataSearch`, `PutBucketIsStaleAllowed` |

use std::sync::Arc;

use ecs_s3_model::EcsOperation;
use ecs_s3_model::input::CreateBucketInput;
use ecs_s3_model::types::CreateBucketConfiguration;
use http::HeaderValue;
use tracing::debug;

use crate::config::DEFAULT_REGION;
use crate::error::EcsError;
use crate::handlers::{
    DISCARD_BODY, HandlerList, Handlers, REST_XML_UNMARSHAL, RequestContext, UnmarshalHandler,
    discard_body,
};

/// Name of the location-constraint hook.
pub const POPULATE_LOCATION_CONSTRAINT: &str = "ecs.PopulateLocationConstraint";
/// Name of the `Expect: 100-continue` hook.
pub const ADD_100_CONTINUE: &str = "ecs.Add100Continue";

/// Bodies at or above this size ask the server to confirm before the upload.
pub const CONTINUE_THRESHOLD: usize = 2 * 1024 * 1024;

/// Register the ECS hooks on the request-side stages.
pub fn install(handlers: &mut Handlers) {
    handlers.validate.push_front(
        POPULATE_LOCATION_CONSTRAINT,
        Arc::new(populate_location_constraint),
    );
    handlers
        .sign
        .push_front(ADD_100_CONTINUE, Arc::new(add_100_continue));
}

/// `ecs.PopulateLocationConstraint`: create buckets in the configured region.
///
/// For `CreateBucket` under a region other than `us-east-1`, an input without a
/// `CreateBucketConfiguration` is replaced by a copy whose configuration names
/// the region. An explicit configuration is left alone, as is an empty region.
///
/// # Errors
///
/// Never fails.
pub fn populate_location_constraint(ctx: &mut RequestContext) -> Result<(), EcsError> {
    if ctx.operation != EcsOperation::CreateBucket {
        return Ok(());
    }
    let region = ctx.config.region.as_str();
    if region.is_empty() || region == DEFAULT_REGION {
        return Ok(());
    }
    let Some(input) = ctx.params.as_any().downcast_ref::<CreateBucketInput>() else {
        return Ok(());
    };
    if input.create_bucket_configuration.is_some() {
        return Ok(());
    }

    let mut input = input.clone();
    input.create_bucket_configuration = Some(CreateBucketConfiguration {
        location_constraint: Some(region.to_owned()),
    });
    debug!(bucket = %input.bucket, region, "Populated location constraint");
    ctx.params = Box::new(input);
    Ok(())
}

/// `ecs.Add100Continue`: send `Expect: 100-continue` with large uploads.
///
/// Only `PUT` requests with a body of at least [`CONTINUE_THRESHOLD`] bytes get
/// the header, unless `disable_100_continue` is configured. The header is not
/// signed.
///
/// # Errors
///
/// Returns [`EcsError::NotBuilt`] if no request was built.
pub fn add_100_continue(ctx: &mut RequestContext) -> Result<(), EcsError> {
    if ctx.config.disable_100_continue {
        return Ok(());
    }
    let request = ctx
        .http_request
        .as_mut()
        .ok_or(EcsError::NotBuilt(ctx.operation))?;
    if request.method() != http::Method::PUT || request.body().len() < CONTINUE_THRESHOLD {
        return Ok(());
    }
    request
        .headers_mut()
        .insert(http::header::EXPECT, HeaderValue::from_static("100-continue"));
    Ok(())
}

/// Replace payload decoding with [`discard_body`], for operations whose
/// response body carries nothing.
pub fn discard_response_body<O: 'static>(unmarshal: &mut HandlerList<UnmarshalHandler<O>>) {
    unmarshal.remove(REST_XML_UNMARSHAL);
    unmarshal.push_back(DISCARD_BODY, Arc::new(discard_body::<O>));
}
