//! HTTP client wrapper
//!
//! There is no retry loop here: transport failures are surfaced
//! to the caller, who decides whether to try again.

use crate::options::FetchOptions;
use distsign_config::NetworkConfig;
use distsign_errors::{Error, FetchError};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    /// Longest wait for the next read; the whole transfer is bounded only
    /// by [`FetchOptions`]
    pub read_timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self::from(&NetworkConfig::default())
    }
}

impl From<&NetworkConfig> for NetConfig {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            read_timeout: config.timeout(),
            connect_timeout: config.connect_timeout(),
            pool_idle_timeout: config.pool_idle_timeout(),
            pool_max_idle_per_host: 4,
            user_agent: config.user_agent.clone(),
        }
    }
}

/// HTTP client shared by every fetch; cheap to clone
#[derive(Debug, Clone)]
pub struct NetClient {
    client: Client,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: &NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .read_timeout(config.read_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(&NetConfig::default())
    }

    /// Execute a GET request and require a success status.
    ///
    /// The request is bounded by the deadline and cancellation token in
    /// `options`; the body is not read.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the request fails, the
    /// deadline passes, the fetch is cancelled, or the server answers with
    /// a non-success status.
    pub async fn get(&self, url: &str, options: &FetchOptions) -> Result<Response, Error> {
        let parsed = parse_url(url)?;
        debug!(url, "GET");

        let response = options
            .run(url, self.client.get(parsed).send())
            .await?
            .map_err(|e| request_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                message: status.to_string(),
            }
            .into());
        }

        Ok(response)
    }
}

/// Parse a URL and check for supported protocols
///
/// # Errors
///
/// Returns an error if the string is not a valid absolute http(s) URL.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(FetchError::InvalidUrl(format!("{url}: unsupported scheme {scheme}")).into()),
    }
}

/// Map a reqwest failure onto the fetch taxonomy
pub(crate) fn request_error(url: &str, error: &reqwest::Error) -> Error {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
        .into()
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
        .into()
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
        .into()
    }
}
