//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Upload storage configuration.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Cache revalidation configuration.
    pub revalidation: RevalidationConfig,
    /// Nomination and voting limits.
    #[serde(default)]
    pub voting: VotingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Upload storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Directory uploaded files are written to.
    #[serde(default = "default_upload_dir")]
    pub dir: PathBuf,
    /// Base URL uploaded files are served from.
    #[serde(default = "default_upload_base_url")]
    pub base_url: String,
    /// Hard ceiling for a single upload, in bytes.
    #[serde(default = "default_max_upload_size")]
    pub max_size_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            base_url: default_upload_base_url(),
            max_size_bytes: default_max_upload_size(),
        }
    }
}

/// Cache revalidation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RevalidationConfig {
    /// Shared secret the revalidation endpoint checks.
    pub secret: String,
}

/// Nomination and voting limits.
#[derive(Debug, Clone, Deserialize)]
pub struct VotingConfig {
    /// Distinct games a user may nominate in one category.
    #[serde(default = "default_max_nominations")]
    pub max_nominations_per_category: u64,
    /// Games a user may propose per calendar year.
    #[serde(default = "default_max_proposals")]
    pub max_proposals_per_year: u64,
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            max_nominations_per_category: default_max_nominations(),
            max_proposals_per_year: default_max_proposals(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_upload_base_url() -> String {
    "/uploads".to_string()
}

const fn default_max_upload_size() -> u64 {
    5 * 1024 * 1024
}

const fn default_max_nominations() -> u64 {
    5
}

const fn default_max_proposals() -> u64 {
    5
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `GOTY_ENV`)
    /// 4. Environment variables with `GOTY__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("GOTY_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("GOTY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("GOTY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_optional_sections() {
        let config: Config = config::Config::builder()
            .set_override("server.url", "http://localhost:3000")
            .unwrap()
            .set_override("database.url", "postgres://localhost/goty")
            .unwrap()
            .set_override("revalidation.secret", "s3cret")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upload.max_size_bytes, 5 * 1024 * 1024);
        assert_eq!(config.voting.max_nominations_per_category, 5);
        assert_eq!(config.voting.max_proposals_per_year, 5);
        assert_eq!(config.revalidation.secret, "s3cret");
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        let result = config::Config::builder()
            .set_override("server.url", "http://localhost:3000")
            .unwrap()
            .set_override("database.url", "postgres://localhost/goty")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<Config>();

        assert!(result.is_err());
    }
}
