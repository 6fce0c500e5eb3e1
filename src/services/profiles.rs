use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::Span;

use super::http::{FetchError, PageFetcher};
use crate::config::ProfileSettings;
use crate::core::{
    detail_links, extract_emails_from_detail, fallback_url, is_allowed_email, parse_cards,
    search_url, ParseError,
};
use crate::models::Identity;

/// Errors that can occur while extracting emails from profile pages
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Profile fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Profile page malformed: {0}")]
    MissingElement(#[from] ParseError),
}

/// Finds verified email addresses for an identity
#[async_trait]
pub trait EmailFinder: Send + Sync {
    async fn find_emails(&self, identity: &Identity) -> Result<Vec<String>, ExtractError>;
}

/// Email extractor for the people-search site
///
/// Stateless between calls: every lookup builds its own URLs and parses
/// fresh pages.
pub struct ProfileEmailExtractor {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
    allowed_domains: Vec<String>,
    span: Span,
}

impl ProfileEmailExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, settings: &ProfileSettings, span: Span) -> Self {
        Self {
            fetcher,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            allowed_domains: settings.allowed_domains.clone(),
            span,
        }
    }

    /// Fetch the city-scoped listing, falling back to the name-only listing
    async fn fetch_listing(&self, identity: &Identity) -> Result<String, ExtractError> {
        let url = search_url(&self.base_url, identity);
        tracing::info!(parent: &self.span, "Querying url: {}", url);

        match self.fetcher.get_text(&url).await {
            Ok(body) => Ok(body),
            Err(e) => {
                let fallback = fallback_url(&self.base_url, identity);
                tracing::info!(
                    parent: &self.span,
                    "Could not fetch {} ({}). Trying name-only search {}; results may include other people",
                    url,
                    e,
                    fallback
                );
                Ok(self.fetcher.get_text(&fallback).await?)
            }
        }
    }

    /// Emails on one detail page, filtered to the allowed domains
    pub async fn extract_email(&self, url: &str) -> Result<Vec<String>, ExtractError> {
        tracing::info!(parent: &self.span, "Extracting email from url: {}", url);

        let body = self.fetcher.get_text(url).await?;
        let emails = extract_emails_from_detail(&body)?;

        Ok(emails
            .into_iter()
            .filter(|email| is_allowed_email(email, &self.allowed_domains))
            .collect())
    }
}

#[async_trait]
impl EmailFinder for ProfileEmailExtractor {
    async fn find_emails(&self, identity: &Identity) -> Result<Vec<String>, ExtractError> {
        let listing = self.fetch_listing(identity).await?;

        let cards = parse_cards(&listing);
        tracing::info!(parent: &self.span, "Verifying {} cards", cards.len());

        let links = detail_links(&cards, identity);
        if !links.is_empty() {
            tracing::info!(parent: &self.span, "Verified {} card(s), extracting emails", links.len());
        }

        let mut emails = Vec::new();
        for href in links {
            let url = format!("{}{}", self.base_url, href);
            emails.extend(self.extract_email(&url).await?);
        }

        tracing::info!(parent: &self.span, "Got emails: {:?}", emails);
        Ok(emails)
    }
}
