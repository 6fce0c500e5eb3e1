use serde::{Deserialize, Serialize};

use super::records::InputRecord;

/// City name plus the district abbreviation that trails it in lookup results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityDistrict {
    pub city: String,
    pub dist: String,
}

impl CityDistrict {
    pub fn new(city: impl Into<String>, dist: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            dist: dist.into(),
        }
    }
}

/// The person a profile search is run for, bound to one candidate city
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub city: String,
    pub dist: String,
    pub zip: String,
}

impl Identity {
    pub fn new(record: &InputRecord, city: &CityDistrict) -> Self {
        Self {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            street: record.street.clone(),
            city: city.city.clone(),
            dist: city.dist.clone(),
            zip: record.zip.clone(),
        }
    }

    /// First whitespace token of the first name
    pub fn first_token(&self) -> &str {
        self.first_name.split_whitespace().next().unwrap_or("")
    }

    /// Last whitespace token of the last name
    pub fn last_token(&self) -> &str {
        self.last_name.split_whitespace().next_back().unwrap_or("")
    }
}

/// Outcome of one output row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowStatus {
    Success,
    Error,
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Success => "SUCCESS",
            RowStatus::Error => "ERROR",
        }
    }
}
