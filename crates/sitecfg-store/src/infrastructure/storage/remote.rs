//! Remote source for the published `site-config.json`.
//!
//! `http`/`https` locations are fetched with `reqwest`.  Every request carries
//! `Cache-Control: no-store`, `Pragma: no-cache` and a `_ts` query parameter
//! so a file that was just rewritten is not served from a cache; the save
//! verification depends on this.
//!
//! `file://` locations have no network transport: [`RemoteSource::fetch`]
//! answers `None` and the orchestrator falls back to
//! [`RemoteSource::fetch_fallback`], which reads the file on a blocking
//! thread.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::application::backends::RemoteSource;

/// Internal failure reasons; collapsed to `None` at the port.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server answered {0}")]
    Status(StatusCode),

    #[error("{0} is not a local file path")]
    NotAFilePath(Url),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("blocking read task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("file is empty")]
    Empty,
}

/// [`RemoteSource`] for `http(s)://` and `file://` locations.
pub struct HttpRemoteSource {
    url: Url,
    client: Client,
}

impl HttpRemoteSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RemoteError::Client)?;
        Ok(Self { url, client })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The location with a fresh `_ts` parameter appended.
    fn cache_busted_url(&self) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut()
            .append_pair("_ts", &Utc::now().timestamp_millis().to_string());
        url
    }

    async fn try_fetch(&self) -> Result<String, RemoteError> {
        let response = self
            .client
            .get(self.cache_busted_url())
            .header(CACHE_CONTROL, "no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status));
        }
        Ok(response.text().await?)
    }

    async fn try_read_local(&self) -> Result<String, RemoteError> {
        let path = self
            .url
            .to_file_path()
            .map_err(|()| RemoteError::NotAFilePath(self.url.clone()))?;
        let body = tokio::task::spawn_blocking(move || {
            std::fs::read_to_string(&path).map_err(|source| RemoteError::Io { path, source })
        })
        .await??;
        if body.trim().is_empty() {
            return Err(RemoteError::Empty);
        }
        Ok(body)
    }
}

#[async_trait]
impl RemoteSource for HttpRemoteSource {
    fn location(&self) -> String {
        self.url.to_string()
    }

    async fn fetch(&self) -> Option<String> {
        if self.is_local_context() {
            return None;
        }
        match self.try_fetch().await {
            Ok(body) => {
                debug!("fetched {} bytes from {}", body.len(), self.url);
                Some(body)
            }
            Err(e) => {
                warn!("could not fetch {}: {e}", self.url);
                None
            }
        }
    }

    fn is_local_context(&self) -> bool {
        self.url.scheme() == "file"
    }

    async fn fetch_fallback(&self) -> Option<String> {
        match self.try_read_local().await {
            Ok(body) => Some(body),
            Err(e) => {
                debug!("fallback read of {} failed: {e}", self.url);
                None
            }
        }
    }
}
