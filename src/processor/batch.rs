use std::path::Path;
use std::sync::Arc;
use tracing::Span;

use super::row::RowProcessor;
use crate::models::InputRecord;
use crate::services::StoreError;

/// Totals for one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub records: usize,
    pub success_rows: usize,
    pub error_rows: usize,
}

/// Runs every input record through a RowProcessor, one at a time
pub struct BatchRunner {
    processor: Arc<RowProcessor>,
    span: Span,
}

impl BatchRunner {
    pub fn new(processor: Arc<RowProcessor>, span: Span) -> Self {
        Self { processor, span }
    }

    /// Process records in order. Record failures become ERROR rows; only a
    /// failure to write the output file stops the batch.
    pub async fn run(&self, records: &[InputRecord], output: &Path) -> Result<BatchSummary, StoreError> {
        let total = records.len();
        let mut summary = BatchSummary::default();

        for (i, record) in records.iter().enumerate() {
            tracing::info!(parent: &self.span, "[{}/{}] {} {}", i + 1, total, record.first_name, record.last_name);

            let rows = self.processor.build_rows(record).await;
            let successes = rows.iter().filter(|r| r.is_success()).count();
            summary.success_rows += successes;
            summary.error_rows += rows.len() - successes;
            summary.records += 1;

            self.processor.persist(&rows, output)?;
        }

        tracing::info!(
            parent: &self.span,
            "Batch finished: {} records, {} success rows, {} error rows",
            summary.records,
            summary.success_rows,
            summary.error_rows
        );
        Ok(summary)
    }

    /// Load records from `input` and run them
    pub async fn run_file(&self, input: &Path, output: &Path) -> Result<BatchSummary, StoreError> {
        let records = crate::services::store::load_input(input)?;
        tracing::info!(parent: &self.span, "Loaded {} records from {}", records.len(), input.display());
        self.run(&records, output).await
    }
}
