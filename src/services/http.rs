use async_trait::async_trait;
use reqwest::{Client, Proxy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;

use crate::config::HttpSettings;

/// Errors that can occur when fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid proxy {proxy}: {source}")]
    InvalidProxy {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Fetches page bodies as text
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

/// HTTP client that rotates requests across a list of proxies
///
/// One `reqwest::Client` is built per proxy; with no proxies configured a
/// single direct client is used.
pub struct ProxiedClient {
    clients: Vec<Client>,
    next: AtomicUsize,
}

impl ProxiedClient {
    pub fn new(settings: &HttpSettings) -> Result<Self, FetchError> {
        let timeout = Duration::from_secs(settings.timeout_secs);

        let clients = if settings.proxies.is_empty() {
            vec![Client::builder()
                .timeout(timeout)
                .user_agent(settings.user_agent.as_str())
                .build()?]
        } else {
            settings
                .proxies
                .iter()
                .map(|proxy| {
                    let invalid = |source| FetchError::InvalidProxy {
                        proxy: proxy.clone(),
                        source,
                    };
                    Client::builder()
                        .proxy(Proxy::all(proxy.as_str()).map_err(invalid)?)
                        .timeout(timeout)
                        .user_agent(settings.user_agent.as_str())
                        .build()
                        .map_err(invalid)
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        tracing::info!("HTTP client initialized with {} route(s)", clients.len());

        Ok(Self {
            clients,
            next: AtomicUsize::new(0),
        })
    }

    /// Number of distinct routes (proxies, or 1 for direct)
    pub fn routes(&self) -> usize {
        self.clients.len()
    }

    fn next_client(&self) -> &Client {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.clients.len();
        &self.clients[idx]
    }
}

#[async_trait]
impl PageFetcher for ProxiedClient {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.next_client().get(url).send().await?;
        let status = response.status();

        tracing::debug!("GET {} -> {}", url, status);

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
