//! Heritrix3 engine client
//!
//! [`Hapy`] turns typed operations into requests against
//! `{base_url}/engine[/job/{name}[...]]` and decodes the XML answers.
//! The base URL is always the server root; `/engine` is appended here.

mod jobs;
mod model;
mod queries;
mod transport;

pub use model::{job_entries, EngineInfo, JobInfo, JobSummary, ScriptOutput};
pub use transport::{build_http_client, Payload, Transport};

use crate::config::ClientConfig;
use crate::xml::{decode_document, Value};
use crate::{ConfigError, HapyError, Result};
use reqwest::{Method, StatusCode};
use url::Url;

/// Client for one Heritrix3 engine
///
/// The connection parameters are fixed at construction. Calls hold no state
/// between them, so a client can be cloned and shared freely.
///
/// # Example
///
/// ```no_run
/// use hapy::{ClientConfig, Hapy};
///
/// # async fn run() -> hapy::Result<()> {
/// let config = ClientConfig::parse("https://localhost:8443")?
///     .with_credentials("admin", "admin")
///     .insecure(true);
/// let hapy = Hapy::new(config)?;
///
/// hapy.create_job("weekly").await?;
/// hapy.build_job("weekly").await?;
/// hapy.launch_job("weekly").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Hapy {
    config: ClientConfig,
    engine_url: Url,
    transport: Transport,
}

impl Hapy {
    /// Creates a client for the engine under `config.base_url`
    ///
    /// # Returns
    ///
    /// * `Ok(Hapy)` - Client ready to use; nothing has been sent yet
    /// * `Err(HapyError)` - The base URL is not an http(s) URL, or the HTTP client could not be built
    pub fn new(config: ClientConfig) -> Result<Self> {
        let engine_url = engine_url(&config.base_url)?;
        let transport = Transport::new(&config)?;

        Ok(Self {
            config,
            engine_url,
            transport,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `{base_url}/engine`
    pub fn engine_url(&self) -> &Url {
        &self.engine_url
    }

    /// `{base_url}/engine/job/{name}` followed by `extra` path segments
    pub fn job_url(&self, name: &str, extra: &[&str]) -> Url {
        let mut url = self.engine_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push("job").push(name).extend(extra);
        }
        url
    }

    /// Resolves a URL reported by the engine (absolute or engine-relative)
    fn resolve(&self, reported: &str) -> Result<Url> {
        Ok(self.engine_url.join(reported)?)
    }

    async fn get(&self, url: Url) -> Result<Vec<u8>> {
        self.transport
            .call(Method::GET, url, Payload::Empty, StatusCode::OK)
            .await
    }

    async fn get_document(&self, url: Url) -> Result<Value> {
        let body = self.get(url).await?;
        Ok(decode_document(&body)?)
    }

    /// POSTs form fields and expects the engine's `303 See Other`
    async fn post_action(&self, url: Url, fields: &[(&str, &str)]) -> Result<()> {
        self.transport
            .call(
                Method::POST,
                url,
                Payload::form(fields.iter().copied()),
                StatusCode::SEE_OTHER,
            )
            .await?;
        Ok(())
    }
}

/// Appends `/engine` to the server root
fn engine_url(base_url: &Url) -> Result<Url> {
    if base_url.scheme() != "http" && base_url.scheme() != "https" {
        return Err(HapyError::Config(ConfigError::InvalidUrl(format!(
            "'{}' must use the http or https scheme",
            base_url
        ))));
    }

    let mut url = base_url.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| ConfigError::InvalidUrl(format!("'{}' cannot be a base URL", base_url)))?
        .pop_if_empty()
        .push("engine");
    Ok(url)
}
