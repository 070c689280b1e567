use crate::{
    domain::MediaUploader,
    errors::UploadError,
    models::ImageUpload,
};
use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};
use tracing;
use uuid::Uuid;

/// Publishes wish images as objects in an S3 bucket whose objects are
/// publicly readable under `public_base_url`.
#[derive(Debug, Clone)]
pub struct S3MediaUploader {
    client: S3Client,
    bucket_name: String,
    public_base_url: String,
}

impl S3MediaUploader {
    pub fn new(client: S3Client, bucket_name: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket_name,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Key for a new object: `<folder>/<uuid>.<ext>`, extension taken from the
    /// client's file name when it has one.
    fn object_key(folder: &str, file_name: Option<&str>) -> String {
        let extension = file_name
            .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()))
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "bin".to_string());
        format!("{}/{}.{}", folder, Uuid::new_v4(), extension)
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

#[async_trait]
impl MediaUploader for S3MediaUploader {
    /// Uploads data to S3 using PutObject. Sets Content-Type.
    async fn upload(&self, folder: &str, image: ImageUpload) -> Result<String, UploadError> {
        let key = Self::object_key(folder, image.file_name.as_deref());

        // Guess content type from the key if the client did not send one
        let content_type = image
            .content_type
            .or_else(|| mime_guess::from_path(&key).first_raw().map(|s| s.to_string()))
            .unwrap_or_else(|| "application/octet-stream".to_string());
        tracing::debug!(s3_key = %key, bucket = %self.bucket_name, %content_type, "S3: Uploading file");

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .body(ByteStream::from(image.data))
            .content_type(content_type)
            .send()
            .await
            .context(format!("S3: Failed to upload object with key '{}'", key))?;

        let url = self.public_url(&key);
        tracing::debug!(s3_key = %key, bucket = %self.bucket_name, %url, "S3: Upload successful");
        Ok(url)
    }
}
