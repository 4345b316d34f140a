//! Metadata search integration tests.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use ecs_s3_model::StreamingBlob;
    use ecs_s3_model::input::{
        CreateBucketInput, DeleteBucketMetadataSearchInput, ListBucketMetadataSearchInput,
        ListBucketQueryInput, PutObjectInput,
    };
    use futures::TryStreamExt;

    use crate::{cleanup_bucket, ecs_client, s3_client, test_bucket_name};

    #[tokio::test]
    #[ignore = "requires running ECS endpoint"]
    async fn test_should_list_system_metadata_keys() -> anyhow::Result<()> {
        let client = ecs_client();
        let out = client.get_system_metadata_search_keys(None).await?;
        assert!(!out.indexable_keys.is_empty());
        assert!(
            out.indexable_keys
                .iter()
                .any(|k| k.name.as_deref() == Some("Size"))
        );
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires running ECS endpoint"]
    async fn test_should_query_indexed_metadata() -> anyhow::Result<()> {
        let client = ecs_client();
        let bucket = test_bucket_name("search");

        client
            .create_bucket(CreateBucketInput {
                bucket: bucket.clone(),
                metadata_search: Some(
                    "Size,CreateTime,LastModified,x-amz-meta-STR;String,x-amz-meta-INT;Integer"
                        .to_owned(),
                ),
                ..Default::default()
            })
            .await?;

        let search = client
            .list_bucket_metadata_search(ListBucketMetadataSearchInput {
                bucket: bucket.clone(),
            })
            .await?;
        assert_eq!(search.metadata_search_enabled, Some(true));
        assert_eq!(search.indexable_keys.len(), 5);

        for (key, size, int) in [("a", 3, "1"), ("b", 4, "5"), ("c", 5, "20")] {
            client
                .put_object(PutObjectInput {
                    bucket: bucket.clone(),
                    key: key.to_owned(),
                    body: Some(StreamingBlob::from(vec![b'x'; size])),
                    metadata: HashMap::from([
                        ("STR".to_owned(), format!("v-{key}")),
                        ("INT".to_owned(), int.to_owned()),
                    ]),
                    ..Default::default()
                })
                .await?;
        }

        let sorted = client
            .list_bucket_query(ListBucketQueryInput {
                bucket: bucket.clone(),
                query: "Size>3".to_owned(),
                sorted: Some("Size".to_owned()),
                ..Default::default()
            })
            .await?;
        let names: Vec<&str> = sorted
            .object_matches
            .iter()
            .filter_map(|m| m.object_name.as_deref())
            .collect();
        assert_eq!(names, ["b", "c"]);

        let pages: Vec<_> = client
            .list_bucket_query_pages(ListBucketQueryInput {
                bucket: bucket.clone(),
                query: "Size>3 and x-amz-meta-INT<10".to_owned(),
                max_keys: Some(1),
                ..Default::default()
            })
            .try_collect()
            .await?;
        let names: Vec<String> = pages
            .iter()
            .flat_map(|p| &p.object_matches)
            .filter_map(|m| m.object_name.clone())
            .collect();
        assert_eq!(names, ["b"]);

        client
            .delete_bucket_metadata_search(DeleteBucketMetadataSearchInput {
                bucket: bucket.clone(),
            })
            .await?;

        cleanup_bucket(&s3_client(), &bucket).await;
        Ok(())
    }
}
