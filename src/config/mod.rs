//! Configuration module for Hapy
//!
//! This module holds the immutable connection parameters a client is built
//! from, and loads them from a TOML profile file.
//!
//! # Example
//!
//! ```no_run
//! use hapy::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("h3.toml")).unwrap();
//! println!("Engine at: {}", config.engine.url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ClientConfig, Config, Credentials, EngineConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
