use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Profile file structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub engine: EngineConfig,
}

/// Connection settings for one Heritrix3 engine
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Server root, e.g. `https://localhost:8443` (`/engine` is appended by the client)
    pub url: String,

    /// Digest authentication user
    #[serde(default)]
    pub username: Option<String>,

    /// Digest authentication password
    #[serde(default)]
    pub password: Option<String>,

    /// Skip TLS certificate validation
    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[serde(rename = "timeout-secs", default)]
    pub timeout_secs: Option<u64>,
}

/// HTTP Digest credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Connection parameters fixed at client construction
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub credentials: Option<Credentials>,
    pub insecure: bool,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Creates a configuration for the engine served under `base_url`
    ///
    /// Certificates are verified and no timeout is applied until the
    /// corresponding builder methods say otherwise.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            credentials: None,
            insecure: false,
            timeout: None,
        }
    }

    /// Parses `base_url` and creates a configuration for it
    pub fn parse(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(base_url)?))
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Config {
    /// Converts the validated profile into client connection parameters
    pub fn client_config(&self) -> Result<ClientConfig, crate::ConfigError> {
        let url = Url::parse(&self.engine.url)
            .map_err(|e| crate::ConfigError::InvalidUrl(format!("{}: {}", self.engine.url, e)))?;

        let mut client = ClientConfig::new(url).insecure(self.engine.insecure);
        if let (Some(user), Some(pass)) = (&self.engine.username, &self.engine.password) {
            client = client.with_credentials(user.clone(), pass.clone());
        }
        if let Some(secs) = self.engine.timeout_secs {
            client = client.timeout(Duration::from_secs(secs));
        }
        Ok(client)
    }
}
