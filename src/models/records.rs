use serde::{Deserialize, Serialize};
use validator::Validate;

use super::domain::{CityDistrict, RowStatus};

/// Column order of the persisted result table
pub const COLUMNS: [&str; 8] = [
    "FIRST_NAME",
    "LAST_NAME",
    "STREET",
    "CITY",
    "DIST",
    "ZIP",
    "EMAIL",
    "STATUS",
];

/// One person to enrich, as read from the input sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct InputRecord {
    #[validate(length(min = 1))]
    #[serde(rename = "FIRST_NAME", alias = "first_name", alias = "firstName")]
    pub first_name: String,
    #[validate(length(min = 1))]
    #[serde(rename = "LAST_NAME", alias = "last_name", alias = "lastName")]
    pub last_name: String,
    #[serde(rename = "STREET", alias = "street", default)]
    pub street: String,
    #[validate(length(min = 1))]
    #[serde(rename = "ZIP", alias = "zip")]
    pub zip: String,
}

impl InputRecord {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        street: impl Into<String>,
        zip: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            street: street.into(),
            zip: zip.into(),
        }
    }
}

/// Result of one (record, city) attempt before email expansion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRow {
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub city: String,
    pub dist: String,
    pub zip: String,
    pub emails: Vec<String>,
    pub status: RowStatus,
}

impl OutputRow {
    pub fn success(record: &InputRecord, city: &CityDistrict, emails: Vec<String>) -> Self {
        Self {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            street: record.street.clone(),
            city: city.city.clone(),
            dist: city.dist.clone(),
            zip: record.zip.clone(),
            emails,
            status: RowStatus::Success,
        }
    }

    /// Error row; city/dist are blank unless a city had been split before the failure
    pub fn error(record: &InputRecord, last_city: Option<&CityDistrict>) -> Self {
        let (city, dist) = match last_city {
            Some(c) => (c.city.clone(), c.dist.clone()),
            None => (String::new(), String::new()),
        };

        Self {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            street: record.street.clone(),
            city,
            dist,
            zip: record.zip.clone(),
            emails: Vec::new(),
            status: RowStatus::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RowStatus::Success
    }
}

/// One persisted row: a single email per line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(rename = "FIRST_NAME")]
    pub first_name: String,
    #[serde(rename = "LAST_NAME")]
    pub last_name: String,
    #[serde(rename = "STREET")]
    pub street: String,
    #[serde(rename = "CITY")]
    pub city: String,
    #[serde(rename = "DIST")]
    pub dist: String,
    #[serde(rename = "ZIP")]
    pub zip: String,
    #[serde(rename = "EMAIL")]
    pub email: String,
    #[serde(rename = "STATUS")]
    pub status: String,
}

impl TableRow {
    /// Identity columns used for duplicate detection
    pub fn identity_key(&self) -> [&str; 6] {
        [
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.street.as_str(),
            self.city.as_str(),
            self.dist.as_str(),
            self.zip.as_str(),
        ]
    }

    pub fn clear_identity(&mut self) {
        self.first_name.clear();
        self.last_name.clear();
        self.street.clear();
        self.city.clear();
        self.dist.clear();
        self.zip.clear();
    }

    /// Build from positional fields; missing trailing fields are empty
    pub fn from_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut it = fields.into_iter().map(str::to_string);
        let mut next = || it.next().unwrap_or_default();
        Self {
            first_name: next(),
            last_name: next(),
            street: next(),
            city: next(),
            dist: next(),
            zip: next(),
            email: next(),
            status: next(),
        }
    }

    pub fn to_fields(&self) -> [&str; 8] {
        [
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.street.as_str(),
            self.city.as_str(),
            self.dist.as_str(),
            self.zip.as_str(),
            self.email.as_str(),
            self.status.as_str(),
        ]
    }
}

/// The accumulated, persisted result set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTable {
    pub rows: Vec<TableRow>,
}

impl ResultTable {
    pub fn new(rows: Vec<TableRow>) -> Self {
        Self { rows }
    }
}
