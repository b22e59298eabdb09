//! Fetching raw asset bytes from a locator.
//!
//! [`Fetcher`] is the seam between the worker pool and the outside world. The
//! pool only needs "bytes or an error" per locator; tests substitute their own
//! implementations to inject delays and failures.

use crate::config::FetchConfig;
use crate::error::{Error, FetchError, Result};
use crate::retry::fetch_with_retry;
use std::path::PathBuf;
use url::Url;

/// Retrieves the bytes behind a locator
///
/// Implementations must tolerate being abandoned: the pool drops the returned
/// future when it shuts down mid-fetch.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the full payload for `locator`
    async fn fetch(&self, locator: &str) -> std::result::Result<Vec<u8>, FetchError>;
}

/// Where a locator points
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Source {
    File(PathBuf),
    Http(Url),
}

/// Classify a locator as a local file or a remote URL
pub(crate) fn resolve(locator: &str) -> std::result::Result<Source, FetchError> {
    match Url::parse(locator) {
        Ok(url) => match url.scheme() {
            "file" => url
                .to_file_path()
                .map(Source::File)
                .map_err(|_| FetchError::InvalidLocator(locator.to_string())),
            "http" | "https" => Ok(Source::Http(url)),
            // `C:\textures\a.png` parses with scheme "c"
            scheme if scheme.len() == 1 => Ok(Source::File(PathBuf::from(locator))),
            scheme => Err(FetchError::UnsupportedScheme(scheme.to_string())),
        },
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(Source::File(PathBuf::from(locator))),
        Err(e) => Err(FetchError::InvalidLocator(format!("{locator}: {e}"))),
    }
}

/// Production [`Fetcher`] for `file://` URIs, bare paths and `http(s)://` URLs
pub struct DefaultFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl DefaultFetcher {
    /// Build a fetcher with a shared HTTP client
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be constructed.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to build HTTP client: {e}"),
                key: Some("fetch".to_string()),
            })?;
        Ok(Self { client, config })
    }

    async fn fetch_file(
        &self,
        locator: &str,
        path: PathBuf,
    ) -> std::result::Result<Vec<u8>, FetchError> {
        tokio::fs::read(&path).await.map_err(|source| FetchError::Io {
            locator: locator.to_string(),
            source,
        })
    }

    async fn fetch_http(
        &self,
        locator: &str,
        url: Url,
    ) -> std::result::Result<Vec<u8>, FetchError> {
        fetch_with_retry(&self.config.retry, || {
            let url = url.clone();
            async move {
                let response = self.client.get(url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status {
                        locator: locator.to_string(),
                        status: status.as_u16(),
                    });
                }
                Ok(response.bytes().await?.to_vec())
            }
        })
        .await
    }
}

#[async_trait::async_trait]
impl Fetcher for DefaultFetcher {
    async fn fetch(&self, locator: &str) -> std::result::Result<Vec<u8>, FetchError> {
        match resolve(locator)? {
            Source::File(path) => self.fetch_file(locator, path).await,
            Source::Http(url) => self.fetch_http(locator, url).await,
        }
    }
}
