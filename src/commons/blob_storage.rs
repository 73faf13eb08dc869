use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region},
    presigning::PresigningConfig,
    primitives::ByteStream,
    Client,
};
use std::time::Duration;

const VIEW_URL_TTL: Duration = Duration::from_secs(3600);

pub fn receipt_key(user_email: &str, file_name: &str) -> String {
    format!("receipts/{}/{}", user_email, file_name)
}

#[async_trait]
pub trait BlobStorage: Send + Sync {
    // Returns a URL under which the uploaded object can be viewed
    async fn upload(
        &self,
        object_key: &str,
        content: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<String>;

    async fn view_url(&self, object_key: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct MinioStorage {
    client: Client,
    bucket_name: String,
}

impl MinioStorage {
    pub async fn new(
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
        bucket_name: &str,
    ) -> Result<Self> {
        let endpoint = endpoint.trim_end_matches('/');

        let config = aws_sdk_s3::config::Builder::new()
            .endpoint_url(endpoint)
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new(access_key, secret_key, None, None, "minio"))
            .force_path_style(true)
            .behavior_version_latest()
            .build();

        let client = Client::from_conf(config);

        match client.list_buckets().send().await {
            Ok(_) => log::info!("Blob storage connection successful"),
            Err(e) => log::warn!("Blob storage connection test failed: {:?}", e),
        }

        Ok(Self {
            client,
            bucket_name: bucket_name.to_string(),
        })
    }
}

#[async_trait]
impl BlobStorage for MinioStorage {
    async fn upload(
        &self,
        object_key: &str,
        content: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<String> {
        let mut put_object = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(object_key)
            .body(ByteStream::from(content));

        if let Some(ct) = content_type {
            put_object = put_object.content_type(ct);
        }

        put_object.send().await?;

        self.view_url(object_key).await
    }

    async fn view_url(&self, object_key: &str) -> Result<String> {
        let presigned_config = PresigningConfig::builder()
            .expires_in(VIEW_URL_TTL)
            .build()?;

        let presigned_request = self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(object_key)
            .presigned(presigned_config)
            .await?;

        let url = presigned_request.uri().to_string();
        log::info!("Generated view URL for {}", object_key);

        Ok(url)
    }
}
