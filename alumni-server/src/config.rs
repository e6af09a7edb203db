//! Server configuration
//!
//! Every value comes from the environment (a `.env` file is loaded first by
//! `main`). Only `DATABASE_URL` is mandatory; the image host credentials become
//! mandatory when `IMAGE_STRATEGY=cloudinary`.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | DATABASE_URL | (required) | sqlx SQLite URL |
//! | HTTP_PORT | 3000 | listen port |
//! | ENVIRONMENT | development | development, staging or production |
//! | IMAGE_STRATEGY | inline | `inline` or `cloudinary` |
//! | MAX_IMAGE_BYTES | 5242880 | upload ceiling |
//! | REQUEST_TIMEOUT_SECS | 30 | whole-request timeout |
//! | UPLOAD_TIMEOUT_SECS | 20 | image host timeout |
//! | DB_MAX_CONNECTIONS | 5 | pool size |
//! | CLOUDINARY_CLOUD_NAME / _API_KEY / _API_SECRET | | image host account |
//! | CLOUDINARY_FOLDER | alumni_members | upload folder |
//! | CLOUDINARY_API_BASE | https://api.cloudinary.com/v1_1 | image host API |

use std::fmt;
use std::str::FromStr;

/// Default upload ceiling (5MB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an unsupported value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// How uploaded photos are turned into the stored `image` string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStrategy {
    /// `data:<mime>;base64,<payload>` stored in the record
    Inline,
    /// Upload to Cloudinary, store the returned secure URL
    Cloudinary,
}

impl FromStr for ImageStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" | "" => Ok(Self::Inline),
            "cloudinary" => Ok(Self::Cloudinary),
            _ => Err(ConfigError::Invalid {
                name: "IMAGE_STRATEGY",
                value: s.to_string(),
            }),
        }
    }
}

/// Cloudinary account used by the remote upload strategy
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
    pub api_base: String,
}

impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("folder", &self.folder)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Registration server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Photo handling strategy
    pub image_strategy: ImageStrategy,
    /// Largest accepted photo, in bytes
    pub max_image_bytes: usize,
    /// Whole-request timeout (seconds)
    pub request_timeout_secs: u64,
    /// Image host request timeout (seconds)
    pub upload_timeout_secs: u64,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// Present when `image_strategy` is Cloudinary
    pub cloudinary: Option<CloudinaryConfig>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let image_strategy = match var("IMAGE_STRATEGY") {
            Some(v) => v.parse()?,
            None => ImageStrategy::Inline,
        };

        let cloudinary = match image_strategy {
            ImageStrategy::Inline => None,
            ImageStrategy::Cloudinary => Some(CloudinaryConfig {
                cloud_name: var("CLOUDINARY_CLOUD_NAME")
                    .ok_or(ConfigError::Missing("CLOUDINARY_CLOUD_NAME"))?,
                api_key: var("CLOUDINARY_API_KEY")
                    .ok_or(ConfigError::Missing("CLOUDINARY_API_KEY"))?,
                api_secret: var("CLOUDINARY_API_SECRET")
                    .ok_or(ConfigError::Missing("CLOUDINARY_API_SECRET"))?,
                folder: var("CLOUDINARY_FOLDER").unwrap_or_else(|| "alumni_members".into()),
                api_base: var("CLOUDINARY_API_BASE")
                    .unwrap_or_else(|| "https://api.cloudinary.com/v1_1".into()),
            }),
        };

        Ok(Self {
            database_url,
            http_port: var("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            image_strategy,
            max_image_bytes: var("MAX_IMAGE_BYTES")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_MAX_IMAGE_BYTES),
            request_timeout_secs: var("REQUEST_TIMEOUT_SECS")
                .and_then(|p| p.parse().ok())
                .unwrap_or(30),
            upload_timeout_secs: var("UPLOAD_TIMEOUT_SECS")
                .and_then(|p| p.parse().ok())
                .unwrap_or(20),
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .and_then(|p| p.parse().ok())
                .unwrap_or(5),
            cloudinary,
        })
    }

    /// Whether this is a production deployment
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
