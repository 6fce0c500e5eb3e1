use async_trait::async_trait;
use fantoccini::error::{CmdError, NewSessionError};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::map::Map as JsonMap;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::Span;

use super::retry::RetryPolicy;
use crate::config::LookupSettings;
use crate::core::{parse_city_lookup_page, unique_city, ParseError};

const ZIP_FIELD_ID: &str = "tZip";
const SUBMIT_ID: &str = "cities-by-zip-code";
const RESULTS_CSS: &str = ".recommended-cities";
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Errors that can occur during a ZIP lookup
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("WebDriver command failed: {0}")]
    Browser(#[from] CmdError),

    #[error("Could not start browser session: {0}")]
    Session(#[from] NewSessionError),

    #[error("Timed out after {0:?} waiting for lookup results")]
    Timeout(Duration),

    #[error("Lookup page malformed: {0}")]
    MissingElement(#[from] ParseError),
}

/// Resolves a ZIP code to candidate "City DIST" strings
#[async_trait]
pub trait CityResolver: Send + Sync {
    async fn resolve(&self, zip: &str) -> Result<Vec<String>, LookupError>;
}

/// ZIP-to-city resolver driving the USPS lookup form through WebDriver
pub struct UspsLookup {
    webdriver_url: String,
    lookup_url: String,
    wait_timeout: Duration,
    headless: bool,
    retry: RetryPolicy,
    span: Span,
}

impl UspsLookup {
    pub fn new(settings: &LookupSettings, span: Span) -> Self {
        Self {
            webdriver_url: settings.webdriver_url.clone(),
            lookup_url: settings.lookup_url.clone(),
            wait_timeout: settings.wait_timeout(),
            headless: settings.headless,
            retry: RetryPolicy::new(settings.retry_attempts, settings.retry_delay()),
            span,
        }
    }

    fn capabilities(&self) -> JsonMap<String, serde_json::Value> {
        let mut args = vec!["--no-sandbox", "--disable-gpu", "--disable-dev-shm-usage"];
        if self.headless {
            args.push("--headless=new");
        }

        let mut caps = JsonMap::new();
        caps.insert("browserName".to_string(), serde_json::json!("chrome"));
        caps.insert(
            "goog:chromeOptions".to_string(),
            serde_json::json!({ "args": args }),
        );
        caps
    }

    async fn connect(&self) -> Result<Client, LookupError> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());
        Ok(builder.connect(&self.webdriver_url).await?)
    }

    /// One attempt with its own browser session; the session is always closed.
    async fn attempt(&self, zip: &str) -> Result<Vec<String>, LookupError> {
        let client = self.connect().await?;
        let result = self.lookup_in(&client, zip).await;

        if let Err(e) = client.close().await {
            tracing::warn!(parent: &self.span, "Failed to close WebDriver session cleanly: {}", e);
        }

        result
    }

    async fn lookup_in(&self, client: &Client, zip: &str) -> Result<Vec<String>, LookupError> {
        client.goto(&self.lookup_url).await?;

        let field = client.find(Locator::Id(ZIP_FIELD_ID)).await?;
        field.send_keys(zip).await?;
        client.find(Locator::Id(SUBMIT_ID)).await?.click().await?;

        self.wait_for_results(client).await?;

        let source = client.source().await?;
        let cities = parse_city_lookup_page(&source)?;
        Ok(unique_city(&cities))
    }

    /// Poll until the results region is present and displayed.
    ///
    /// Only "no such element" is treated as not-yet-rendered; any other
    /// WebDriver error ends the wait.
    async fn wait_for_results(&self, client: &Client) -> Result<(), LookupError> {
        let deadline = Instant::now() + self.wait_timeout;

        loop {
            match client.find(Locator::Css(RESULTS_CSS)).await {
                Ok(el) => {
                    if el.is_displayed().await? {
                        return Ok(());
                    }
                }
                Err(e) if e.is_no_such_element() => {}
                Err(e) => return Err(e.into()),
            }

            if Instant::now() >= deadline {
                return Err(LookupError::Timeout(self.wait_timeout));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl CityResolver for UspsLookup {
    async fn resolve(&self, zip: &str) -> Result<Vec<String>, LookupError> {
        tracing::info!(parent: &self.span, "Fetching cities for zipcode {}", zip);

        let label = format!("ZIP lookup {}", zip);
        let cities = self
            .retry
            .run(&label, &self.span, || self.attempt(zip))
            .await?;

        tracing::info!(parent: &self.span, "Found cities: {:?}", cities);
        Ok(cities)
    }
}
