//! Configuration management for Folio server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

/// A parent page of a book's content root
#[derive(Debug, Deserialize, Clone)]
pub struct ParentSource {
    #[serde(default)]
    pub domain: String,
    pub book: String,
    pub page: String,
    pub short_title: Option<String>,
}

/// Where to find one book and how to serve it
#[derive(Debug, Deserialize, Clone)]
pub struct BookSource {
    /// Book name, beginning with a slash
    pub name: String,
    /// Working copy with the page sources; `~/` expands to the home directory
    pub work_directory: String,
    #[serde(default)]
    pub allow_robots: bool,
    /// JSON object of the book's properties
    pub properties: PathBuf,
    #[serde(default)]
    pub parents: Vec<ParentSource>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LibraryConfig {
    #[serde(default)]
    pub books: Vec<BookSource>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub library: LibraryConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix FOLIO_)
            .add_source(
                Environment::with_prefix("FOLIO")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

