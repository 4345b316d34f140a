//! A request handle bound to its output type.
//!
//! [`Request`] is what the `*_request` client methods return. Its handler lists
//! are a private copy of the client's, so they can be adjusted before
//! [`Request::send`] without touching the client or other requests.
//!
//! Sending runs validate, build and sign, then hands the request to the
//! transport and reads any buffered body, both raced against the cancellation
//! token and the timeout. Non-success statuses map to [`ServiceError`];
//! success responses go through the unmarshal stage.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use ecs_s3_model::{EcsOperation, ServiceError};
use ecs_s3_xml::parse_error;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::body::ResponseBody;
use crate::client::ClientInner;
use crate::error::{EcsError, TransportError};
use crate::handlers::{
    HandlerList, Handlers, RequestContext, RequestHandler, Stage, UnmarshalHandler, WireResponse,
};
use crate::request::EcsInput;
use crate::response::{EcsOutput, PayloadKind};

/// Per-request settings that [`RequestOption`]s may change.
#[derive(Debug, Clone, Default)]
pub struct RequestSettings {
    /// Request-side handler lists.
    pub handlers: Handlers,
    /// Limit on the send and the buffered body read.
    pub timeout: Option<Duration>,
    /// Token that aborts the send when cancelled.
    pub cancel: Option<CancellationToken>,
}

/// A change applied to a request before it is sent.
pub type RequestOption = Box<dyn FnOnce(&mut RequestSettings) + Send>;

/// Add a header after the request is built. It is signed like any other header.
#[must_use]
pub fn with_header(name: HeaderName, value: HeaderValue) -> RequestOption {
    Box::new(move |settings: &mut RequestSettings| {
        let handler: RequestHandler = Arc::new(move |ctx: &mut RequestContext| {
            let request = ctx
                .http_request
                .as_mut()
                .ok_or(EcsError::NotBuilt(ctx.operation))?;
            request.headers_mut().insert(name.clone(), value.clone());
            Ok(())
        });
        settings.handlers.build.push_back("option.WithHeader", handler);
    })
}

/// Limit the send and the buffered body read to `timeout`.
#[must_use]
pub fn with_timeout(timeout: Duration) -> RequestOption {
    Box::new(move |settings: &mut RequestSettings| settings.timeout = Some(timeout))
}

/// Append a handler to a stage.
#[must_use]
pub fn with_handler(stage: Stage, name: impl Into<String>, handler: RequestHandler) -> RequestOption {
    let name = name.into();
    Box::new(move |settings: &mut RequestSettings| {
        settings.handlers.stage_mut(stage).push_back(name, handler);
    })
}

/// An operation request ready to be adjusted and sent.
pub struct Request<O: EcsOutput> {
    inner: Arc<ClientInner>,
    operation: EcsOperation,
    params: Box<dyn EcsInput>,
    settings: RequestSettings,
    unmarshal: HandlerList<UnmarshalHandler<O>>,
}

impl<O: EcsOutput> fmt::Debug for Request<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("operation", &self.operation)
            .field("params", &self.params)
            .field("settings", &self.settings)
            .field("unmarshal", &self.unmarshal)
            .finish_non_exhaustive()
    }
}

impl<O: EcsOutput> Request<O> {
    pub(crate) fn new(
        inner: Arc<ClientInner>,
        operation: EcsOperation,
        params: Box<dyn EcsInput>,
        unmarshal: HandlerList<UnmarshalHandler<O>>,
    ) -> Self {
        let settings = RequestSettings {
            handlers: inner.handlers.clone(),
            timeout: inner.config.request_timeout(),
            cancel: None,
        };
        Self {
            inner,
            operation,
            params,
            settings,
            unmarshal,
        }
    }

    /// The operation this request sends.
    #[must_use]
    pub fn operation(&self) -> EcsOperation {
        self.operation
    }

    /// The request-side handler lists of this request.
    pub fn handlers_mut(&mut self) -> &mut Handlers {
        &mut self.settings.handlers
    }

    /// The unmarshal handler list of this request.
    pub fn unmarshal_handlers_mut(&mut self) -> &mut HandlerList<UnmarshalHandler<O>> {
        &mut self.unmarshal
    }

    /// Abort the send when `token` is cancelled.
    pub fn set_cancellation(&mut self, token: CancellationToken) {
        self.settings.cancel = Some(token);
    }

    /// Limit the send and the buffered body read to `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = Some(timeout);
        self
    }

    /// Apply request options in order.
    pub fn apply_options(&mut self, options: impl IntoIterator<Item = RequestOption>) {
        for option in options {
            option(&mut self.settings);
        }
    }

    /// Send the request and decode the response.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidParams`] before anything is sent
    /// - [`EcsError::Auth`], [`EcsError::Transport`], [`EcsError::Cancelled`],
    ///   [`EcsError::Timeout`] for failures to get a response
    /// - [`EcsError::Service`] for a non-success status
    /// - [`EcsError::Xml`] for a malformed success body
    pub async fn send(self) -> Result<O, EcsError> {
        let Self {
            inner,
            operation,
            params,
            settings,
            unmarshal,
        } = self;

        let mut ctx = RequestContext {
            operation,
            config: Arc::clone(&inner.config),
            credentials: inner.credentials.clone(),
            params,
            http_request: None,
        };
        settings.handlers.run(&mut ctx)?;
        let request = ctx.http_request.take().ok_or(EcsError::NotBuilt(operation))?;

        debug!(
            operation = %operation,
            method = %request.method(),
            uri = %request.uri(),
            "Sending request"
        );
        let exchange = async {
            let response = inner.transport.send(request).await?;
            let (parts, body) = response.into_parts();
            debug!(operation = %operation, status = parts.status.as_u16(), "Received response");
            let body = match O::PAYLOAD {
                PayloadKind::Stream if parts.status.is_success() => body,
                _ => ResponseBody::Buffered(body.collect().await.map_err(TransportError::from)?),
            };
            Ok::<_, EcsError>((parts, body))
        };
        let (parts, body) = dispatch(exchange, settings.timeout, settings.cancel).await?;

        if !parts.status.is_success() {
            let data = body.as_bytes().cloned().unwrap_or_default();
            let err = service_error(parts.status, &parts.headers, &data);
            warn!(
                operation = %operation,
                status = parts.status.as_u16(),
                code = %err.code,
                request_id = ?err.request_id,
                "Service error"
            );
            return Err(EcsError::Service(err));
        }

        let mut wire = WireResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        };
        let mut output = O::default();
        unmarshal.run(&mut output, &mut wire)?;
        Ok(output)
    }
}

/// Await the exchange, giving up on cancellation or timeout.
///
/// The exchange covers the send and the read of any buffered body.
async fn dispatch<F, T>(
    exchange: F,
    timeout: Option<Duration>,
    cancel: Option<CancellationToken>,
) -> Result<T, EcsError>
where
    F: Future<Output = Result<T, EcsError>>,
{
    let timed = async move {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| EcsError::Timeout(limit))?,
            None => exchange.await,
        }
    };

    match cancel {
        Some(token) => tokio::select! {
            () = token.cancelled() => Err(EcsError::Cancelled),
            result = timed => result,
        },
        None => timed.await,
    }
}

/// Decode the error envelope of a failed request.
///
/// Bodies without a usable envelope (HEAD responses, proxies) fall back to a
/// code derived from the status.
fn service_error(status: StatusCode, headers: &HeaderMap, body: &Bytes) -> ServiceError {
    let header_request_id = headers
        .get("x-amz-request-id")
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);

    let mut err = match parse_error(body) {
        Ok(envelope) => match envelope.code {
            Some(code) if !code.is_empty() => {
                let mut err = ServiceError::new(code, status)
                    .with_message(envelope.message.unwrap_or_default());
                err.resource = envelope.resource;
                err.request_id = envelope.request_id;
                err
            }
            _ => ServiceError::from_status(status),
        },
        Err(_) => ServiceError::from_status(status),
    };
    if err.request_id.is_none() {
        err.request_id = header_request_id;
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportResponse;

    #[test]
    fn test_should_decode_error_envelope() {
        let body = Bytes::from_static(
            b"<Error><Code>NoSuchBucket</Code><Message>gone</Message>\
              <Resource>/b1</Resource><RequestId>r1</RequestId></Error>",
        );
        let err = service_error(StatusCode::NOT_FOUND, &HeaderMap::new(), &body);
        assert!(err.is("NoSuchBucket"));
        assert_eq!(err.message, "gone");
        assert_eq!(err.resource.as_deref(), Some("/b1"));
        assert_eq!(err.request_id.as_deref(), Some("r1"));
        assert_eq!(err.status_code, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_should_fall_back_to_status_for_empty_body() {
        let mut headers = HeaderMap::new();
        headers.insert("x-amz-request-id", HeaderValue::from_static("hdr-id"));
        let err = service_error(StatusCode::FORBIDDEN, &headers, &Bytes::new());
        assert!(err.is("Forbidden"));
        assert_eq!(err.request_id.as_deref(), Some("hdr-id"));
    }

    #[test]
    fn test_should_fall_back_to_status_for_non_xml_body() {
        let body = Bytes::from_static(b"<html>bad gateway");
        let err = service_error(StatusCode::BAD_GATEWAY, &HeaderMap::new(), &body);
        assert_eq!(err.code, "BadGateway");
    }

    #[tokio::test]
    async fn test_should_time_out_pending_send() {
        let pending = std::future::pending::<Result<TransportResponse, EcsError>>();
        let result = dispatch(pending, Some(Duration::from_millis(10)), None).await;
        assert!(matches!(result, Err(EcsError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_should_abort_on_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let pending = std::future::pending::<Result<TransportResponse, EcsError>>();
        let result = dispatch(pending, None, Some(token)).await;
        assert!(matches!(result, Err(EcsError::Cancelled)));
    }

    #[tokio::test]
    async fn test_should_pass_through_completed_send() {
        let ready = async { Ok::<_, EcsError>(http::Response::new(ResponseBody::from("ok"))) };
        let response = dispatch(ready, Some(Duration::from_secs(5)), Some(CancellationToken::new()))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
