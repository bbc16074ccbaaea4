//! Calculator core: operation table, query evaluation and response body.
//!
//! Nothing in here knows about HTTP.

pub mod query;
pub mod response;
pub mod table;

pub use query::Query;
pub use response::CalcResponse;
pub use table::OperationTable;
