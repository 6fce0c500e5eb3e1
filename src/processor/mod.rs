// Record processing exports
pub mod batch;
pub mod row;

pub use batch::{BatchRunner, BatchSummary};
pub use row::{ProcessError, RecordFailure, RowProcessor};
