//! Validation and service error shapes.

use std::fmt;

/// A single parameter validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// A required field was absent or empty.
    Required {
        /// The wire name of the field (e.g. `Bucket`).
        field: String,
    },
}

impl ParamError {
    /// Create a missing-required-field error.
    #[must_use]
    pub fn required(field: impl Into<String>) -> Self {
        Self::Required {
            field: field.into(),
        }
    }

    /// The wire name of the offending field.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Required { field } => field,
        }
    }
}

/// The set of validation failures for one input struct.
///
/// Raised before any request is built, so no network I/O or credential
/// resolution happens for an invalid input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidParams {
    /// The input type name, e.g. `ListBucketQueryInput`.
    pub context: String,
    /// The individual failures, in field declaration order.
    pub errors: Vec<ParamError>,
}

impl InvalidParams {
    /// Start collecting failures for the given input type.
    #[must_use]
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            errors: Vec::new(),
        }
    }

    /// Record a failure.
    pub fn add(&mut self, error: ParamError) {
        self.errors.push(error);
    }

    /// Record a `Required` failure when `value` is empty.
    pub fn require(&mut self, field: &str, value: &str) {
        if value.is_empty() {
            self.add(ParamError::required(field));
        }
    }

    /// Number of recorded failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convert into `Ok(())` when empty, or `Err(self)` otherwise.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for InvalidParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InvalidParameter: {} validation error(s) found.",
            self.errors.len()
        )?;
        for error in &self.errors {
            match error {
                ParamError::Required { field } => {
                    write!(f, "\n- missing required field, {}.{field}.", self.context)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for InvalidParams {}

/// An error response returned by the storage service.
///
/// Decoded from the flat `<Error>` XML envelope. HEAD responses carry no body,
/// so for those only the status is known and the code is the status reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// The error code, e.g. `NoSuchBucket`.
    pub code: String,
    /// A human-readable message.
    pub message: String,
    /// The resource that caused the error.
    pub resource: Option<String>,
    /// The server-assigned request ID.
    pub request_id: Option<String>,
    /// The HTTP status code of the response.
    pub status_code: http::StatusCode,
}

impl ServiceError {
    /// Create a new error from a code and status.
    #[must_use]
    pub fn new(code: impl Into<String>, status_code: http::StatusCode) -> Self {
        Self {
            code: code.into(),
            message: String::new(),
            resource: None,
            request_id: None,
            status_code,
        }
    }

    /// Build an error from a bare status, for responses without an envelope.
    #[must_use]
    pub fn from_status(status_code: http::StatusCode) -> Self {
        let code = match status_code {
            http::StatusCode::NOT_FOUND => "NotFound".to_owned(),
            http::StatusCode::FORBIDDEN => "Forbidden".to_owned(),
            http::StatusCode::BAD_REQUEST => "BadRequest".to_owned(),
            other => other
                .canonical_reason()
                .map_or_else(|| other.as_str().to_owned(), |r| r.replace(' ', "")),
        };
        Self::new(code, status_code)
    }

    /// Set the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the resource.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Set the request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Returns true if this error carries the given code.
    #[must_use]
    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        write!(f, " (status code: {}", self.status_code.as_u16())?;
        if let Some(ref id) = self.request_id {
            write!(f, ", request id: {id}")?;
        }
        f.write_str(")")
    }
}

impl std::error::Error for ServiceError {}
