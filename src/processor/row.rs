use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::Span;
use validator::Validate;

use crate::core::{merge_tables, split_city_district};
use crate::models::{CityDistrict, Identity, InputRecord, OutputRow, ResultTable};
use crate::services::{store, CityResolver, EmailFinder, ExtractError, LookupError, StoreError};

/// Why a record could not be enriched
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("City lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("Email extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// A failed record together with the last city that had been split for it
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RecordFailure {
    pub last_city: Option<CityDistrict>,
    #[source]
    pub error: ProcessError,
}

/// Enriches one input record at a time and persists the result table
pub struct RowProcessor {
    resolver: Arc<dyn CityResolver>,
    finder: Arc<dyn EmailFinder>,
    span: Span,
}

impl RowProcessor {
    pub fn new(resolver: Arc<dyn CityResolver>, finder: Arc<dyn EmailFinder>, span: Span) -> Self {
        Self {
            resolver,
            finder,
            span,
        }
    }

    /// One SUCCESS row per resolved city, or the failure that stopped the record
    pub async fn enrich(&self, record: &InputRecord) -> Result<Vec<OutputRow>, RecordFailure> {
        record.validate().map_err(|e| RecordFailure {
            last_city: None,
            error: ProcessError::InvalidRecord(e.to_string()),
        })?;

        let cities = self.resolver.resolve(&record.zip).await.map_err(|e| RecordFailure {
            last_city: None,
            error: e.into(),
        })?;

        let mut rows = Vec::with_capacity(cities.len());
        for combined in &cities {
            let city = split_city_district(combined);
            let identity = Identity::new(record, &city);

            match self.finder.find_emails(&identity).await {
                Ok(emails) => rows.push(OutputRow::success(record, &city, emails)),
                Err(e) => {
                    return Err(RecordFailure {
                        last_city: Some(city),
                        error: e.into(),
                    })
                }
            }
        }

        Ok(rows)
    }

    /// Rows for one record; any failure collapses to a single ERROR row
    pub async fn build_rows(&self, record: &InputRecord) -> Vec<OutputRow> {
        tracing::info!(
            parent: &self.span,
            "Scraping for: {} {}, {} {}",
            record.first_name,
            record.last_name,
            record.street,
            record.zip
        );

        match self.enrich(record).await {
            Ok(rows) => rows,
            Err(failure) => {
                tracing::error!(parent: &self.span, "Record {} {} failed: {}", record.first_name, record.last_name, failure);
                vec![OutputRow::error(record, failure.last_city.as_ref())]
            }
        }
    }

    /// Append rows to the table at `path` and rewrite it in full
    pub fn persist(&self, rows: &[OutputRow], path: &Path) -> Result<ResultTable, StoreError> {
        let existing = match store::load_existing(path)? {
            Some(existing) => existing,
            None => {
                store::ensure_exists(path)?;
                Vec::new()
            }
        };

        let merged = merge_tables(existing, rows);
        store::save(path, &merged)?;

        tracing::info!(parent: &self.span, "Saved {} rows to {}", merged.len(), path.display());
        Ok(ResultTable::new(merged))
    }

    /// Enrich one record and persist it to `path`
    pub async fn process(&self, record: &InputRecord, path: &Path) -> Result<ResultTable, StoreError> {
        let rows = self.build_rows(record).await;
        self.persist(&rows, path)
    }
}
