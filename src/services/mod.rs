// Service exports
pub mod http;
pub mod lookup;
pub mod profiles;
pub mod retry;
pub mod store;

pub use http::{FetchError, PageFetcher, ProxiedClient};
pub use lookup::{CityResolver, LookupError, UspsLookup};
pub use profiles::{EmailFinder, ExtractError, ProfileEmailExtractor};
pub use retry::RetryPolicy;
pub use store::StoreError;
