use serde::{Deserialize, Serialize};
use validator::Validate;

use super::records::InputRecord;

/// Request to enrich a single contact
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EnrichRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "first_name", rename = "firstName")]
    pub first_name: String,
    #[validate(length(min = 1))]
    #[serde(alias = "last_name", rename = "lastName")]
    pub last_name: String,
    #[serde(default)]
    pub street: String,
    #[validate(length(min = 1))]
    pub zip: String,
}

impl From<EnrichRequest> for InputRecord {
    fn from(req: EnrichRequest) -> Self {
        InputRecord::new(req.first_name, req.last_name, req.street, req.zip)
    }
}
