use serde::{Deserialize, Serialize};
use crate::models::records::OutputRow;

/// Response for the enrich endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichResponse {
    pub rows: Vec<OutputRow>,
    #[serde(rename = "totalRows")]
    pub total_rows: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
