//! HTTP transport for engine calls
//!
//! Every engine operation is a single request followed by a status check:
//! - `Accept: application/xml` on every request
//! - redirects are never followed, so `303 See Other` stays observable
//! - a `401` with a Digest challenge is answered once when credentials are set
//! - any status other than the expected one becomes an [`ApiError`]
//!
//! There is no retry. Network failures surface as [`HapyError::Transport`].

use crate::config::{ClientConfig, Credentials};
use crate::{ApiError, HapyError, Result};
use digest_auth::{AuthContext, HttpMethod};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use reqwest::{redirect::Policy, Client, Method, Response, StatusCode};
use url::Url;

const ACCEPT_XML: &str = "application/xml";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Body of an outgoing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// No body (GET)
    Empty,

    /// Already-encoded form fields (POST)
    Form(String),

    /// Raw document (PUT)
    Document(Vec<u8>),
}

impl Payload {
    /// Encodes form fields in the given order
    pub fn form<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        serializer.extend_pairs(fields);
        Self::Form(serializer.finish())
    }

    fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Empty => None,
            Self::Form(body) => Some(body.as_bytes()),
            Self::Document(body) => Some(body),
        }
    }

    /// Request body as reported in an [`ApiError`]
    fn describe(&self) -> Option<String> {
        self.bytes()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Builds the HTTP client used for all engine calls
///
/// # Arguments
///
/// * `config` - Connection parameters; only TLS and timeout settings are read here
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ClientConfig) -> std::result::Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(concat!("hapy/", env!("CARGO_PKG_VERSION")))
        .redirect(Policy::none())
        .danger_accept_invalid_certs(config.insecure);

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    builder.build()
}

/// Sends requests and checks their status codes
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    credentials: Option<Credentials>,
}

impl Transport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = build_http_client(config).map_err(|source| HapyError::Transport {
            url: config.base_url.to_string(),
            source,
        })?;

        Ok(Self {
            client,
            credentials: config.credentials.clone(),
        })
    }

    /// Performs one engine call and returns the response body
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP verb
    /// * `url` - Absolute request URL
    /// * `payload` - Request body
    /// * `expected` - The only status code treated as success
    pub async fn call(
        &self,
        method: Method,
        url: Url,
        payload: Payload,
        expected: StatusCode,
    ) -> Result<Vec<u8>> {
        tracing::debug!(%method, %url, "Sending engine request");

        let mut response = self.send(&method, &url, &payload, None).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            if let Some(credentials) = &self.credentials {
                if let Some(authorization) =
                    answer_challenge(&response, credentials, &method, &url, &payload)?
                {
                    response = self
                        .send(&method, &url, &payload, Some(authorization))
                        .await?;
                }
            }
        }

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| HapyError::Transport {
                url: url.to_string(),
                source,
            })?;

        if status != expected {
            return Err(ApiError {
                method: method.to_string(),
                url: url.to_string(),
                body: payload.describe(),
                status: status.as_u16(),
                response_body: String::from_utf8_lossy(&body).into_owned(),
            }
            .into());
        }

        Ok(body.to_vec())
    }

    async fn send(
        &self,
        method: &Method,
        url: &Url,
        payload: &Payload,
        authorization: Option<String>,
    ) -> Result<Response> {
        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(ACCEPT, ACCEPT_XML);

        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }

        request = match payload {
            Payload::Empty => request,
            Payload::Form(body) => request
                .header(CONTENT_TYPE, FORM_URLENCODED)
                .body(body.clone()),
            Payload::Document(body) => request.body(body.clone()),
        };

        request.send().await.map_err(|source| HapyError::Transport {
            url: url.to_string(),
            source,
        })
    }
}

/// Computes the `Authorization` header for a Digest challenge
///
/// Returns `Ok(None)` when the response carries no Digest challenge, in
/// which case the 401 is reported like any other unexpected status.
fn answer_challenge(
    response: &Response,
    credentials: &Credentials,
    method: &Method,
    url: &Url,
    payload: &Payload,
) -> Result<Option<String>> {
    let Some(header) = response.headers().get(WWW_AUTHENTICATE) else {
        return Ok(None);
    };
    let header = header.to_str().map_err(|e| auth_error(url, e))?;
    if !header.trim_start().to_ascii_lowercase().starts_with("digest") {
        return Ok(None);
    }

    let mut prompt = digest_auth::parse(header).map_err(|e| auth_error(url, e))?;

    let uri = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };
    let context = AuthContext::new_with_method(
        credentials.username.as_str(),
        credentials.password.as_str(),
        uri.as_str(),
        payload.bytes(),
        HttpMethod::from(method.as_str()),
    );

    let answer = prompt.respond(&context).map_err(|e| auth_error(url, e))?;
    tracing::debug!(%url, user = %credentials.username, "Answering digest challenge");
    Ok(Some(answer.to_header_string()))
}

fn auth_error(url: &Url, error: impl std::fmt::Display) -> HapyError {
    HapyError::Auth {
        url: url.to_string(),
        message: error.to_string(),
    }
}
