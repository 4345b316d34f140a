//! Object retention and append integration tests.

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use ecs_s3_model::StreamingBlob;
    use ecs_s3_model::input::{CreateBucketInput, GetObjectInput, HeadObjectInput, PutObjectInput};

    use crate::{cleanup_bucket, ecs_client, s3_client, test_bucket_name};

    #[tokio::test]
    #[ignore = "requires running ECS endpoint"]
    async fn test_should_append_to_object() -> anyhow::Result<()> {
        let client = ecs_client();
        let bucket = test_bucket_name("append");
        client
            .create_bucket(CreateBucketInput {
                bucket: bucket.clone(),
                ..Default::default()
            })
            .await?;

        client
            .put_object(PutObjectInput {
                bucket: bucket.clone(),
                key: "log.txt".to_owned(),
                body: Some(StreamingBlob::from("hello")),
                ..Default::default()
            })
            .await?;

        let appended = client
            .put_object(PutObjectInput {
                bucket: bucket.clone(),
                key: "log.txt".to_owned(),
                body: Some(StreamingBlob::from(", ecs")),
                range: Some(PutObjectInput::APPEND_RANGE.to_owned()),
                ..Default::default()
            })
            .await?;
        assert_eq!(appended.previous_object_size, Some(5));

        let get = client
            .get_object(GetObjectInput {
                bucket: bucket.clone(),
                key: "log.txt".to_owned(),
                ..Default::default()
            })
            .await?;
        let data = get.body.collect().await?;
        assert_eq!(data, Bytes::from_static(b"hello, ecs"));

        cleanup_bucket(&s3_client(), &bucket).await;
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires running ECS endpoint"]
    async fn test_should_overwrite_range_in_place() -> anyhow::Result<()> {
        let client = ecs_client();
        let bucket = test_bucket_name("range");
        client
            .create_bucket(CreateBucketInput {
                bucket: bucket.clone(),
                ..Default::default()
            })
            .await?;

        client
            .put_object(PutObjectInput {
                bucket: bucket.clone(),
                key: "data".to_owned(),
                body: Some(StreamingBlob::from("0123456789")),
                ..Default::default()
            })
            .await?;
        client
            .put_object(PutObjectInput {
                bucket: bucket.clone(),
                key: "data".to_owned(),
                body: Some(StreamingBlob::from("ab")),
                range: Some("bytes=2-3".to_owned()),
                ..Default::default()
            })
            .await?;

        let get = client
            .get_object(GetObjectInput {
                bucket: bucket.clone(),
                key: "data".to_owned(),
                ..Default::default()
            })
            .await?;
        assert_eq!(get.body.collect().await?, Bytes::from_static(b"01ab456789"));

        cleanup_bucket(&s3_client(), &bucket).await;
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires running ECS endpoint"]
    async fn test_should_append_after_retention_expires() -> anyhow::Result<()> {
        let client = ecs_client();
        let bucket = test_bucket_name("objret");
        client
            .create_bucket(CreateBucketInput {
                bucket: bucket.clone(),
                ..Default::default()
            })
            .await?;

        client
            .put_object(PutObjectInput {
                bucket: bucket.clone(),
                key: "kept".to_owned(),
                body: Some(StreamingBlob::from("1234")),
                retention_period: Some(1),
                ..Default::default()
            })
            .await?;

        let head = client
            .head_object(HeadObjectInput {
                bucket: bucket.clone(),
                key: "kept".to_owned(),
                ..Default::default()
            })
            .await?;
        assert_eq!(head.retention_period, Some(1));
        assert_eq!(head.content_length, Some(4));

        let get = client
            .get_object(GetObjectInput {
                bucket: bucket.clone(),
                key: "kept".to_owned(),
                ..Default::default()
            })
            .await?;
        assert_eq!(get.retention_period, Some(1));
        drop(get);

        tokio::time::sleep(std::time::Duration::from_secs(2)).await;

        let appended = client
            .put_object(PutObjectInput {
                bucket: bucket.clone(),
                key: "kept".to_owned(),
                body: Some(StreamingBlob::from("567")),
                range: Some(PutObjectInput::APPEND_RANGE.to_owned()),
                ..Default::default()
            })
            .await?;
        assert_eq!(appended.previous_object_size, Some(4));

        cleanup_bucket(&s3_client(), &bucket).await;
        Ok(())
    }
}
