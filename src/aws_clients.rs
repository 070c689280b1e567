use crate::config::S3Settings;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::Client as S3Client;
use tracing;

// Creates the base AWS SDK configuration for the media bucket.
// Uses the default credential provider chain (which reads env vars, profiles, etc.).
pub async fn create_sdk_config(settings: &S3Settings) -> SdkConfig {
    let region = Region::new(settings.region.clone());
    tracing::info!(sdk_region = %settings.region, "Setting SDK region");

    let mut config_loader = aws_config::defaults(BehaviorVersion::latest()).region(region);

    if let Some(endpoint_url) = &settings.endpoint_url {
        tracing::info!("Using endpoint override: {}", endpoint_url);
        config_loader = config_loader.endpoint_url(endpoint_url);
    } else {
        tracing::info!("Using default AWS endpoints and credential resolution.");
    }

    config_loader.load().await
}

// Creates an S3 client from a shared SdkConfig.
// Path-style addressing keeps LocalStack and other S3-compatible hosts working.
pub fn create_s3_client(sdk_config: &SdkConfig, force_path_style: bool) -> S3Client {
    let s3_config = aws_sdk_s3::config::Builder::from(sdk_config)
        .force_path_style(force_path_style)
        .build();
    S3Client::from_conf(s3_config)
}
