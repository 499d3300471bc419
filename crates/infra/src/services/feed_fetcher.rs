use crate::shared::lock;
use std::{collections::HashMap, sync::Mutex, time::Duration};
use thiserror::Error;
use tracing::debug;
use ward_calendar_domain::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Feed download did not finish within {0:?}")]
    Timeout(Duration),
    #[error("Feed responded with status code: {0}")]
    Status(u16),
    #[error("Unable to reach feed: {0}")]
    Network(String),
}

/// Downloads the raw ICS text published at a feed url
#[async_trait::async_trait]
pub trait IFeedFetcher: Send + Sync {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<String, FetchError>;
}

pub struct HttpFeedFetcher {
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFeedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IFeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<String, FetchError> {
        let to_fetch_error = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout(timeout)
            } else {
                FetchError::Network(e.to_string())
            }
        };

        let res = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(to_fetch_error)?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = res.text().await.map_err(to_fetch_error)?;
        debug!("Fetched {} bytes from feed: {}", body.len(), url);
        Ok(body)
    }
}

/// Serves preconfigured feed bodies. Urls that were never configured
/// respond with status 404.
pub struct StaticFeedFetcher {
    feeds: Mutex<HashMap<String, Result<String, FetchError>>>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl StaticFeedFetcher {
    pub fn new() -> Self {
        Self {
            feeds: Mutex::new(HashMap::new()),
            fetches: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_feed(&self, url: &Url, body: impl Into<String>) {
        lock(&self.feeds).insert(url.to_string(), Ok(body.into()));
    }

    pub fn set_failure(&self, url: &Url, error: FetchError) {
        lock(&self.feeds).insert(url.to_string(), Err(error));
    }

    pub fn fetch_count(&self, url: &Url) -> usize {
        lock(&self.fetches)
            .get(url.as_str())
            .copied()
            .unwrap_or_default()
    }
}

impl Default for StaticFeedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IFeedFetcher for StaticFeedFetcher {
    async fn fetch(&self, url: &Url, _timeout: Duration) -> Result<String, FetchError> {
        *lock(&self.fetches).entry(url.to_string()).or_default() += 1;
        lock(&self.feeds)
            .get(url.as_str())
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_fetcher_serves_configured_feeds() {
        let fetcher = StaticFeedFetcher::new();
        let ok = Url::parse("https://calendar.example.org/ward.ics").unwrap();
        let broken = Url::parse("https://calendar.example.org/broken.ics").unwrap();
        let unknown = Url::parse("https://calendar.example.org/unknown.ics").unwrap();
        fetcher.set_feed(&ok, "BEGIN:VCALENDAR\nEND:VCALENDAR");
        fetcher.set_failure(&broken, FetchError::Network("connection reset".into()));

        let timeout = Duration::from_secs(1);
        assert!(fetcher.fetch(&ok, timeout).await.is_ok());
        assert_eq!(
            fetcher.fetch(&broken, timeout).await,
            Err(FetchError::Network("connection reset".into()))
        );
        assert_eq!(
            fetcher.fetch(&unknown, timeout).await,
            Err(FetchError::Status(404))
        );
        assert_eq!(fetcher.fetch_count(&ok), 1);
    }
}
