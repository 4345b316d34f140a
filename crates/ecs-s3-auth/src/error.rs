//! Error types for request signing.

/// Errors that can occur while resolving credentials or signing a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No credentials could be resolved from the provider.
    #[error("Credentials not loaded: {0}")]
    CredentialsNotLoaded(String),

    /// A header value contains characters that cannot be signed.
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(String),

    /// The request URI has no authority and no `Host` header was set.
    #[error("Missing host for signing")]
    MissingHost,
}
