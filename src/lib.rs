//! Contact Enrich - ZIP to city lookup, people-search profile matching and
//! email extraction for contact lists.
//!
//! Each input record (name, street, ZIP) is resolved to candidate cities,
//! every city is searched on the people-search site, and verified profile
//! emails are appended to a flat CSV result table.

pub mod config;
pub mod core;
pub mod models;
pub mod processor;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{split_city_district, unique_city};
pub use models::{CityDistrict, Identity, InputRecord, OutputRow, ResultTable, TableRow};
pub use processor::{BatchRunner, BatchSummary, RowProcessor};
pub use services::{CityResolver, EmailFinder, ProfileEmailExtractor, ProxiedClient, UspsLookup};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let city = split_city_district("New York NY");
        assert_eq!(city, CityDistrict::new("New York", "NY"));
        assert_eq!(unique_city(&["New York NY".to_string()]).len(), 1);
    }
}
