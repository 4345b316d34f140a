//! Client configuration.
//!
//! Provides [`ClientConfig`] for pointing the client at an ECS endpoint.
//! Values can be loaded from environment variables via [`ClientConfig::from_env`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// The region ECS treats as the default; buckets created there carry no
/// location constraint.
pub const DEFAULT_REGION: &str = "us-east-1";

const DEFAULT_ENDPOINT_URL: &str = "http://localhost:9020";

/// ECS client configuration.
///
/// # Examples
///
/// ```
/// use ecs_s3_client::config::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .endpoint_url("https://ecs.example.com:9021".to_owned())
///     .region("eu-west-1".to_owned())
///     .build();
/// assert!(config.force_path_style);
/// assert!(!config.disable_100_continue);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Base URL of the ECS S3 endpoint. A path component is kept as a prefix.
    #[builder(default = String::from(DEFAULT_ENDPOINT_URL))]
    pub endpoint_url: String,

    /// Signing region. A region other than `us-east-1` is also sent as the
    /// location constraint of new buckets.
    #[builder(default = String::from(DEFAULT_REGION))]
    pub region: String,

    /// Put the bucket in the path (`host/bucket/key`) instead of the host name
    /// (`bucket.host/key`).
    #[builder(default = true)]
    pub force_path_style: bool,

    /// Never send `Expect: 100-continue`, even for large uploads.
    #[builder(default = false)]
    pub disable_100_continue: bool,

    /// Default timeout applied to every send, in seconds.
    #[builder(default, setter(strip_option))]
    pub request_timeout_secs: Option<u64>,

    /// Value of the `User-Agent` header.
    #[builder(default = default_user_agent())]
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint_url: String::from(DEFAULT_ENDPOINT_URL),
            region: String::from(DEFAULT_REGION),
            force_path_style: true,
            disable_100_continue: false,
            request_timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables (falling back to defaults):
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `ECS_ENDPOINT_URL` | `http://localhost:9020` |
    /// | `ECS_REGION`, then `AWS_REGION` | `us-east-1` |
    /// | `ECS_FORCE_PATH_STYLE` | `true` |
    /// | `ECS_DISABLE_100_CONTINUE` | `false` |
    /// | `ECS_REQUEST_TIMEOUT_SECS` | unset |
    ///
    /// # Examples
    ///
    /// ```
    /// use ecs_s3_client::config::ClientConfig;
    ///
    /// let config = ClientConfig::from_env();
    /// assert!(!config.endpoint_url.is_empty());
    /// ```
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("ECS_ENDPOINT_URL") {
            config.endpoint_url = v;
        }
        if let Some(v) = lookup("ECS_REGION").or_else(|| lookup("AWS_REGION")) {
            config.region = v;
        }
        if let Some(v) = lookup("ECS_FORCE_PATH_STYLE") {
            config.force_path_style = parse_bool(&v);
        }
        if let Some(v) = lookup("ECS_DISABLE_100_CONTINUE") {
            config.disable_100_continue = parse_bool(&v);
        }
        if let Some(v) = lookup("ECS_REQUEST_TIMEOUT_SECS") {
            if let Ok(n) = v.parse::<u64>() {
                config.request_timeout_secs = Some(n);
            }
        }

        config
    }

    /// The default per-request timeout, if one is configured.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn default_user_agent() -> String {
    format!("ecs-s3-client/{}", env!("CARGO_PKG_VERSION"))
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_should_create_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint_url, "http://localhost:9020");
        assert_eq!(config.region, "us-east-1");
        assert!(config.force_path_style);
        assert!(!config.disable_100_continue);
        assert!(config.request_timeout().is_none());
        assert!(config.user_agent.starts_with("ecs-s3-client/"));
    }

    #[test]
    fn test_should_match_builder_defaults() {
        assert_eq!(ClientConfig::builder().build(), ClientConfig::default());
    }

    #[test]
    fn test_should_read_variables() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("ECS_ENDPOINT_URL", "https://ecs:9021"),
            ("AWS_REGION", "eu-west-1"),
            ("ECS_FORCE_PATH_STYLE", "false"),
            ("ECS_DISABLE_100_CONTINUE", "1"),
            ("ECS_REQUEST_TIMEOUT_SECS", "30"),
        ]));
        assert_eq!(config.endpoint_url, "https://ecs:9021");
        assert_eq!(config.region, "eu-west-1");
        assert!(!config.force_path_style);
        assert!(config.disable_100_continue);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_should_prefer_ecs_region() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("ECS_REGION", "standalone"),
            ("AWS_REGION", "eu-west-1"),
        ]));
        assert_eq!(config.region, "standalone");
    }

    #[test]
    fn test_should_ignore_unparsable_timeout() {
        let config = ClientConfig::from_lookup(lookup(&[("ECS_REQUEST_TIMEOUT_SECS", "soon")]));
        assert!(config.request_timeout_secs.is_none());
    }

    #[test]
    fn test_should_deserialize_camel_case_with_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"endpointUrl":"http://ecs:9020","disable100Continue":true}"#)
                .expect("valid config");
        assert_eq!(config.endpoint_url, "http://ecs:9020");
        assert!(config.disable_100_continue);
        assert_eq!(config.region, "us-east-1");
    }

    #[test]
    fn test_should_parse_bool_values() {
        assert!(parse_bool("true"));
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("yes"));
    }
}
