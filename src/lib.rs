//! Hapy: a client for the Heritrix3 engine API
//!
//! This crate wraps the REST/XML management interface of a Heritrix3 crawler:
//! creating, building, launching, pausing, checkpointing and tearing down crawl
//! jobs, reading engine and job status, and running scripts against a job.

pub mod client;
pub mod config;
pub mod scripts;
pub mod xml;

use thiserror::Error;

/// Main error type for Hapy operations
#[derive(Debug, Error)]
pub enum HapyError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("XML decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Transport error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Digest authentication failed for {url}: {message}")]
    Auth { url: String, message: String },

    #[error("Field '{0}' is absent from the response")]
    MissingField(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Script template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// The engine answered with a status code other than the one the operation expects
#[derive(Debug, Clone, Error)]
#[error(
    "ApiError: request(url={url}, method={method}, data={}), response(code={status}, text={response_body})",
    .body.as_deref().unwrap_or("None")
)]
pub struct ApiError {
    pub method: String,
    pub url: String,
    pub body: Option<String>,
    pub status: u16,
    pub response_body: String,
}

/// XML decoding errors
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed XML: {0}")]
    Malformed(#[from] quick_xml::Error),

    #[error("Document has no root element")]
    NoRoot,

    #[error("Element <{0}> is never closed")]
    Unclosed(String),

    #[error("Unexpected content after root element <{0}>")]
    TrailingContent(String),

    #[error("Text outside of the root element")]
    StrayText,
}

/// Configuration-specific errors
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
}

/// Result type alias for Hapy operations
pub type Result<T> = std::result::Result<T, HapyError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use client::{EngineInfo, Hapy, JobInfo, JobSummary, ScriptOutput};
pub use config::{ClientConfig, Credentials};
pub use xml::{decode_document, Mapping, Value};
