//! Integration tests for the ECS S3 extension client.
//!
//! These tests require a reachable ECS endpoint and an object user.
//! They are marked `#[ignore]` so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! ECS_ENDPOINT_URL=http://ecs:9020 ECS_ACCESS_KEY_ID=user1 ECS_SECRET_ACCESS_KEY=... \
//!     cargo test -p ecs-s3-integration -- --ignored
//! ```

use std::sync::Once;

use aws_credential_types::Credentials;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use ecs_s3_auth::{CredentialProvider, EnvironmentCredentialProvider};
use ecs_s3_client::{Client, ClientConfig};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Create an ECS client configured from the environment.
#[must_use]
pub fn ecs_client() -> Client {
    init_tracing();
    Client::from_env()
}

/// Create a standard S3 client for the same endpoint, used for cleanup.
#[must_use]
pub fn s3_client() -> aws_sdk_s3::Client {
    init_tracing();

    let config = ClientConfig::from_env();
    let creds = EnvironmentCredentialProvider::new()
        .provide_credentials()
        .unwrap_or_else(|e| panic!("ECS credentials missing: {e}"));
    let creds = Credentials::new(
        creds.access_key_id,
        creds.secret_access_key,
        creds.session_token,
        None,
        "ecs-integration-test",
    );

    let s3_config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(config.region))
        .credentials_provider(creds)
        .endpoint_url(config.endpoint_url)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}

/// Generate a unique bucket name for a test.
#[must_use]
pub fn test_bucket_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// Delete all objects in a bucket, then delete the bucket.
pub async fn cleanup_bucket(client: &aws_sdk_s3::Client, bucket: &str) {
    let mut continuation_token = None;
    loop {
        let mut req = client.list_objects_v2().bucket(bucket);
        if let Some(token) = continuation_token.take() {
            req = req.continuation_token(token);
        }
        let Ok(resp) = req.send().await else {
            return; // Bucket may not exist.
        };

        for obj in resp.contents() {
            if let Some(key) = obj.key() {
                let _ = client.delete_object().bucket(bucket).key(key).send().await;
            }
        }

        if resp.is_truncated() == Some(true) {
            continuation_token = resp.next_continuation_token().map(ToOwned::to_owned);
        } else {
            break;
        }
    }

    let _ = client.delete_bucket().bucket(bucket).send().await;
}

mod test_bucket;
mod test_object;
mod test_search;
