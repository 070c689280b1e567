use crate::{
    aws_clients::{create_s3_client, create_sdk_config},
    cloudinary::CloudinaryUploader,
    config::{Config, MediaConfig},
    domain::{MediaUploader, WishRepository},
    repositories::{DatabaseKind, MySqlWishRepository, PgWishRepository},
    storage::S3MediaUploader,
    AppState,
};
use anyhow::Context;
use std::sync::Arc;
use tracing;

/// Builds the wish repository for the configured backend.
pub fn build_repository(config: &Config) -> anyhow::Result<Arc<dyn WishRepository>> {
    let repo: Arc<dyn WishRepository> = match config.database_kind {
        DatabaseKind::Postgres => Arc::new(PgWishRepository::connect_lazy(
            &config.database_url,
            config.database_max_connections,
        )?),
        DatabaseKind::MySql => Arc::new(MySqlWishRepository::connect_lazy(
            &config.database_url,
            config.database_max_connections,
        )?),
    };
    tracing::info!(backend = ?config.database_kind, "Startup: Record store configured");
    Ok(repo)
}

/// Builds the media uploader for the configured host.
pub async fn build_media_uploader(config: &Config) -> anyhow::Result<Arc<dyn MediaUploader>> {
    let uploader: Arc<dyn MediaUploader> = match &config.media {
        MediaConfig::Cloudinary { api_base, credentials } => {
            let http = reqwest::Client::builder()
                .build()
                .context("Startup: Failed to build HTTP client")?;
            Arc::new(CloudinaryUploader::new(http, api_base.clone(), credentials.clone()))
        }
        MediaConfig::S3(settings) => {
            tracing::info!(bucket = %settings.bucket_name, "Startup: Using S3 media bucket");
            let sdk_config = create_sdk_config(settings).await;
            let client = create_s3_client(&sdk_config, settings.endpoint_url.is_some());
            Arc::new(S3MediaUploader::new(
                client,
                settings.bucket_name.clone(),
                settings.public_base_url.clone(),
            ))
        }
    };
    Ok(uploader)
}

/// Pings the record store once. An unreachable database is logged, not
/// fatal; the result only reports whether the ping succeeded.
pub async fn check_store(wishes: &dyn WishRepository) -> bool {
    match wishes.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = ?e, "Startup: Database connection failed");
            false
        }
    }
}

/// Initializes both collaborators and checks the database is reachable.
pub async fn init_state(config: &Config) -> anyhow::Result<AppState> {
    tracing::info!("Startup: Initializing collaborators...");
    let wishes = build_repository(config)?;
    check_store(wishes.as_ref()).await;
    let media = build_media_uploader(config).await?;
    tracing::info!("Startup: Initialization complete.");
    Ok(AppState::new(wishes, media))
}
