//! Signed uploads to the Cloudinary image API.

use crate::{domain::MediaUploader, errors::UploadError, models::ImageUpload};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::time::{SystemTime, UNIX_EPOCH};

pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";

/// Credentials for a Cloudinary account.
#[derive(Clone)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for CloudinaryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Clone)]
pub struct CloudinaryUploader {
    http: reqwest::Client,
    api_base: String,
    credentials: CloudinaryCredentials,
}

impl CloudinaryUploader {
    pub fn new(http: reqwest::Client, api_base: String, credentials: CloudinaryCredentials) -> Self {
        tracing::info!(cloud_name = %credentials.cloud_name, %api_base, "Initializing CloudinaryUploader");
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn upload_url(&self) -> String {
        format!("{}/v1_1/{}/image/upload", self.api_base, self.credentials.cloud_name)
    }
}

/// Signs request parameters the way the upload API expects: parameters sorted
/// by name, joined as `k=v` pairs with `&`, the secret appended, SHA-1 hex.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn unix_timestamp() -> Result<u64, UploadError> {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock is before the Unix epoch")?;
    Ok(since_epoch.as_secs())
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload(&self, folder: &str, image: ImageUpload) -> Result<String, UploadError> {
        let timestamp = unix_timestamp()?.to_string();
        let signature = sign_params(
            &[("folder", folder), ("timestamp", timestamp.as_str())],
            &self.credentials.api_secret,
        );

        let size = image.data.len();
        let mut file = Part::bytes(image.data)
            .file_name(image.file_name.unwrap_or_else(|| "upload".to_string()));
        if let Some(content_type) = image.content_type.as_deref() {
            file = file
                .mime_str(content_type)
                .context(format!("Invalid image content type '{}'", content_type))?;
        }

        let form = Form::new()
            .part("file", file)
            .text("api_key", self.credentials.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("signature", signature);

        tracing::debug!(%folder, bytes = size, "Cloudinary: Uploading image");
        let response = self
            .http
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .context("Cloudinary: Upload request failed")?;

        let status = response.status();
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(format!("status {}: {}", status, e)))?;

        if !status.is_success() {
            let reason = body
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| format!("status {}", status));
            tracing::warn!(%status, %reason, "Cloudinary: Upload rejected");
            return Err(UploadError::Rejected(reason));
        }

        let url = body
            .secure_url
            .ok_or_else(|| UploadError::InvalidResponse("missing secure_url".to_string()))?;
        tracing::info!(%url, "Cloudinary: Upload successful");
        Ok(url)
    }
}
