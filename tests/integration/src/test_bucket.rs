//! Bucket extension integration tests.

#[cfg(test)]
mod tests {
    use ecs_s3_model::input::{CreateBucketInput, HeadBucketInput, PutBucketIsStaleAllowedInput};

    use crate::{cleanup_bucket, ecs_client, s3_client, test_bucket_name};

    #[tokio::test]
    #[ignore = "requires running ECS endpoint"]
    async fn test_should_create_bucket_with_extensions() -> anyhow::Result<()> {
        let client = ecs_client();
        let bucket = test_bucket_name("retention");

        client
            .create_bucket(CreateBucketInput {
                bucket: bucket.clone(),
                compliance_enabled: Some(true),
                file_system_access_enabled: Some(true),
                is_stale_allowed: Some(true),
                retention_period: Some(1),
                server_side_encryption_enabled: Some(true),
                ..Default::default()
            })
            .await?;

        let head = client
            .head_bucket(HeadBucketInput {
                bucket: bucket.clone(),
                ..Default::default()
            })
            .await?;
        assert_eq!(head.retention_period, Some(1));

        client
            .put_bucket_is_stale_allowed(PutBucketIsStaleAllowedInput {
                bucket: bucket.clone(),
                is_stale_allowed: Some(true),
            })
            .await?;

        cleanup_bucket(&s3_client(), &bucket).await;
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires running ECS endpoint"]
    async fn test_should_toggle_stale_reads() -> anyhow::Result<()> {
        let client = ecs_client();
        let bucket = test_bucket_name("stale");

        client
            .create_bucket(CreateBucketInput {
                bucket: bucket.clone(),
                is_stale_allowed: Some(false),
                ..Default::default()
            })
            .await?;

        for allowed in [true, false] {
            client
                .put_bucket_is_stale_allowed(PutBucketIsStaleAllowedInput {
                    bucket: bucket.clone(),
                    is_stale_allowed: Some(allowed),
                })
                .await?;
        }

        cleanup_bucket(&s3_client(), &bucket).await;
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires running ECS endpoint"]
    async fn test_should_fail_head_of_missing_bucket() {
        let client = ecs_client();
        let err = client
            .head_bucket(HeadBucketInput {
                bucket: test_bucket_name("missing"),
                ..Default::default()
            })
            .await
            .expect_err("bucket does not exist");
        assert!(err.is_service_code("NotFound"), "unexpected error: {err}");
    }
}
