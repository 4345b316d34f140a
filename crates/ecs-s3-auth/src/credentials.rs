//! Credential provider trait and implementations.
//!
//! This module defines the [`CredentialProvider`] trait for resolving the keys a
//! request is signed with, along with a [`StaticCredentialProvider`] for fixed keys
//! and an [`EnvironmentCredentialProvider`] that reads them from the process
//! environment on every call.

use std::fmt;
use std::sync::Arc;

use ecs_s3_model::Credentials;

use crate::error::AuthError;

/// Trait for resolving the credentials a request is signed with.
///
/// Implementations are called once per request, so they may rotate keys.
pub trait CredentialProvider: Send + Sync + fmt::Debug {
    /// Resolve the current credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::CredentialsNotLoaded`] if no credentials are available.
    fn provide_credentials(&self) -> Result<Credentials, AuthError>;
}

/// A credential provider that always returns the same keys.
///
/// # Examples
///
/// ```
/// use ecs_s3_auth::credentials::{CredentialProvider, StaticCredentialProvider};
///
/// let provider = StaticCredentialProvider::new("user1", "s3cr3t");
/// let creds = provider.provide_credentials().unwrap();
/// assert_eq!(creds.access_key_id, "user1");
/// ```
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credentials: Credentials,
}

impl StaticCredentialProvider {
    /// Create a provider for long-term keys.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(access_key_id, secret_access_key),
        }
    }

    /// Attach a session token to the returned credentials.
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.credentials.session_token = Some(token.into());
        self
    }
}

impl From<Credentials> for StaticCredentialProvider {
    fn from(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn provide_credentials(&self) -> Result<Credentials, AuthError> {
        if self.credentials.access_key_id.is_empty() {
            return Err(AuthError::CredentialsNotLoaded(
                "access key id is empty".to_owned(),
            ));
        }
        Ok(self.credentials.clone())
    }
}

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads credentials from environment variables.
///
/// | Value | Variables, first non-empty wins |
/// |-------|----------------------------------|
/// | access key | `ECS_ACCESS_KEY_ID`, `AWS_ACCESS_KEY_ID` |
/// | secret key | `ECS_SECRET_ACCESS_KEY`, `AWS_SECRET_ACCESS_KEY` |
/// | session token | `AWS_SESSION_TOKEN` |
#[derive(Clone)]
pub struct EnvironmentCredentialProvider {
    lookup: EnvLookup,
}

impl EnvironmentCredentialProvider {
    /// Create a provider backed by the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_lookup(Arc::new(|name| std::env::var(name).ok()))
    }

    /// Create a provider backed by a custom variable lookup.
    #[must_use]
    pub fn with_lookup(lookup: EnvLookup) -> Self {
        Self { lookup }
    }

    fn first_of(&self, names: &[&str]) -> Option<String> {
        names
            .iter()
            .filter_map(|name| (self.lookup)(name))
            .find(|value| !value.is_empty())
    }
}

impl Default for EnvironmentCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EnvironmentCredentialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentCredentialProvider")
            .finish_non_exhaustive()
    }
}

impl CredentialProvider for EnvironmentCredentialProvider {
    fn provide_credentials(&self) -> Result<Credentials, AuthError> {
        let access_key_id = self
            .first_of(&["ECS_ACCESS_KEY_ID", "AWS_ACCESS_KEY_ID"])
            .ok_or_else(|| AuthError::CredentialsNotLoaded("access key id not set".to_owned()))?;
        let secret_access_key = self
            .first_of(&["ECS_SECRET_ACCESS_KEY", "AWS_SECRET_ACCESS_KEY"])
            .ok_or_else(|| {
                AuthError::CredentialsNotLoaded("secret access key not set".to_owned())
            })?;

        let mut credentials = Credentials::new(access_key_id, secret_access_key);
        credentials.session_token = self.first_of(&["AWS_SESSION_TOKEN"]);
        Ok(credentials)
    }
}
