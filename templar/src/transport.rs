//! Fetching template source over HTTP.
//!
//! The cache only needs one thing from the network: the body of a `GET` request
//! as text. [`Transport`] is that seam; [`HttpTransport`] implements it with `reqwest`.
use crate::config::{get_config, Http};

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Error, Debug)]
pub enum Error {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GET {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("\"{0}\" is a relative url and no base url is configured")]
    RelativeUrl(String),
}

/// Fetches the body of a URL as text.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<String, Error>;
}

/// HTTP transport.
///
/// Relative URLs, e.g. `views/header.html`, are resolved against the base URL,
/// the same way a browser resolves them against the page.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Option<Url>,
}

impl HttpTransport {
    /// Create transport using the global configuration.
    pub fn new() -> Result<Self, Error> {
        Self::from_config(&get_config().http)
    }

    pub fn from_config(http: &Http) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(http.user_agent.as_str())
            .timeout(http.timeout)
            .build()?;

        Ok(Self::with_client(client, http.base_url.clone()))
    }

    pub fn with_client(client: Client, base_url: Option<Url>) -> Self {
        Self { client, base_url }
    }

    /// Turn a registry URL into an absolute URL.
    pub fn resolve(&self, url: &str) -> Result<Url, Error> {
        match Url::parse(url) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match self.base_url {
                Some(ref base) => Ok(base.join(url)?),
                None => Err(Error::RelativeUrl(url.to_string())),
            },
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, Error> {
        let url = self.resolve(url)?;
        debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
