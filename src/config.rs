use crate::cloudinary::{CloudinaryCredentials, DEFAULT_API_BASE};
use crate::repositories::DatabaseKind;
use std::{env, net::SocketAddr, str::FromStr};
use thiserror::Error;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:4001";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:3001";
const DEFAULT_AWS_REGION: &str = "us-east-1";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid environment variable format for {0}: {1}")]
    InvalidVar(String, String),
}

/// Bucket settings used when images go to S3 instead of Cloudinary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct S3Settings {
    pub bucket_name: String,
    pub region: String,
    // Optional endpoint for LocalStack
    pub endpoint_url: Option<String>,
    pub public_base_url: String,
}

#[derive(Clone, Debug)]
pub enum MediaConfig {
    Cloudinary {
        api_base: String,
        credentials: CloudinaryCredentials,
    },
    S3(S3Settings),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub database_kind: DatabaseKind,
    pub database_max_connections: u32,
    pub allowed_origins: Vec<String>,
    /// Request body cap; unset means uploads are not size limited.
    pub max_upload_bytes: Option<usize>,
    pub media: MediaConfig,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignores errors, relies on env vars otherwise)
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| var(key).ok_or_else(|| ConfigError::MissingVar(key.into()));

        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = SocketAddr::from_str(&bind_address_str)
            .map_err(|e| ConfigError::InvalidVar("BIND_ADDRESS".into(), e.to_string()))?;

        let database_url = required("DATABASE_URL")?;
        let database_kind = DatabaseKind::from_url(&database_url).ok_or_else(|| {
            ConfigError::InvalidVar(
                "DATABASE_URL".into(),
                "expected a postgres:// or mysql:// URL".into(),
            )
        })?;

        let database_max_connections =
            parse_or("DATABASE_MAX_CONNECTIONS", var("DATABASE_MAX_CONNECTIONS"), DEFAULT_MAX_CONNECTIONS)?;
        if database_max_connections == 0 {
            return Err(ConfigError::InvalidVar(
                "DATABASE_MAX_CONNECTIONS".into(),
                "must be at least 1".into(),
            ));
        }
        let max_upload_bytes = var("MAX_UPLOAD_BYTES")
            .map(|raw| parse_or("MAX_UPLOAD_BYTES", Some(raw), 0usize))
            .transpose()?;

        let allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let media = match var("MEDIA_BUCKET_NAME") {
            Some(bucket_name) => {
                let region = var("AWS_DEFAULT_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.to_string());
                let endpoint_url = var("AWS_ENDPOINT_URL");
                let public_base_url = var("MEDIA_PUBLIC_BASE_URL").unwrap_or_else(|| match &endpoint_url {
                    Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket_name),
                    None => format!("https://{}.s3.{}.amazonaws.com", bucket_name, region),
                });
                MediaConfig::S3(S3Settings {
                    bucket_name,
                    region,
                    endpoint_url,
                    public_base_url,
                })
            }
            None => MediaConfig::Cloudinary {
                api_base: var("CLOUDINARY_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
                credentials: CloudinaryCredentials {
                    cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
                    api_key: required("CLOUDINARY_API_KEY")?,
                    api_secret: required("CLOUDINARY_API_SECRET")?,
                },
            },
        };

        Ok(Config {
            bind_address,
            database_url,
            database_kind,
            database_max_connections,
            allowed_origins,
            max_upload_bytes,
            media,
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidVar(key.into(), e.to_string())),
        None => Ok(default),
    }
}
