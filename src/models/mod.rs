// Model exports
pub mod domain;
pub mod records;
pub mod requests;
pub mod responses;

pub use domain::{CityDistrict, Identity, RowStatus};
pub use records::{InputRecord, OutputRow, ResultTable, TableRow, COLUMNS};
pub use requests::EnrichRequest;
pub use responses::{EnrichResponse, ErrorResponse, HealthResponse};
