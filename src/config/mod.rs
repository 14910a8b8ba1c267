//! Configuration module for Redirect Mapper
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and resolving the secrets they reference from the environment.
//!
//! # Example
//!
//! ```no_run
//! use redirect_mapper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mapper.toml")).unwrap();
//! println!("Matching with model: {}", config.inference.model);
//! ```

mod parser;
mod secrets;
mod types;
mod validation;

// Re-export types
pub use types::{
    AuthConfig, Config, CrawlerConfig, InferenceConfig, InputConfig, OutputConfig,
};

// Re-export parser functions
pub use parser::{compute_run_fingerprint, load_config, load_config_with_text, parse_config};
pub use validation::validate;
pub use secrets::{
    resolve_api_key, resolve_api_key_with, resolve_credentials, resolve_credentials_with,
};
