//! HTTP protocol layer module
//!
//! Response builders and form-body decoding, independent of the calculator.

pub mod form;
pub mod response;

// Re-export commonly used types
pub use form::{body_argument, is_form_content_type};
pub use response::{build_404_response, build_405_response, build_json_response};
