//! Request handler module
//!
//! Routes requests to the calculator endpoint and turns every calculation
//! outcome into a JSON response.

pub mod calculate;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
