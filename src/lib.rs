//! Redirect Mapper: maps URLs from a retired site onto a replacement site
//!
//! This crate fetches lightweight content signals for both URL sets, asks an
//! inference service to pair old URLs with new ones in bounded batches, and
//! aggregates the answers into a redirect table.

pub mod config;
pub mod crawler;
pub mod matching;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Redirect Mapper operations
#[derive(Debug, Error)]
pub enum MapperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// Every variant is fatal to a run and is raised before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Environment variable {name} is not set")]
    MissingSecret { name: String },

    #[error("Input file not found: {path}")]
    MissingInput { path: String },

    #[error("Input file contains no URLs: {path}")]
    EmptyInput { path: String },
}

/// Result type alias for Redirect Mapper operations
pub type Result<T> = std::result::Result<T, MapperError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use matching::MatchRecord;
pub use pipeline::{Pipeline, RunInputs, RunReport};
pub use state::{ContentSignal, Credentials, FetchStatus, RunState};
