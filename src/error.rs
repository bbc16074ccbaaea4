//! Request failure taxonomy
//!
//! Every reason a calculation request can fail to produce a number. All
//! variants are reported to the client the same way (`{"result": null}`);
//! the variant only shows up in the debug log.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RequestFailure {
    #[error("request body could not be read: {message}")]
    BodyUnreadable { message: String },

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("missing 'query' form parameter")]
    MissingQuery,

    #[error("query is not valid JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("query has the wrong shape: {0}")]
    InvalidQuery(#[source] serde_json::Error),

    #[error("operand list is empty")]
    EmptyOperands,

    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("division by zero at operand {index}")]
    DivisionByZero { index: usize },

    #[error("'{op}' produced a non-finite value")]
    NonFinite { op: &'static str },
}

pub type Result<T> = std::result::Result<T, RequestFailure>;

impl From<serde_json::Error> for RequestFailure {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        match err.classify() {
            Category::Syntax | Category::Eof => Self::MalformedJson(err),
            Category::Data | Category::Io => Self::InvalidQuery(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_is_malformed() {
        let err = serde_json::from_str::<serde_json::Value>("hola").unwrap_err();
        assert!(matches!(
            RequestFailure::from(err),
            RequestFailure::MalformedJson(_)
        ));
    }

    #[test]
    fn test_eof_is_malformed() {
        let err = serde_json::from_str::<serde_json::Value>("").unwrap_err();
        assert!(matches!(
            RequestFailure::from(err),
            RequestFailure::MalformedJson(_)
        ));
    }

    #[test]
    fn test_data_error_is_invalid_query() {
        let err = serde_json::from_str::<Vec<f64>>(r#"{"op":"+"}"#).unwrap_err();
        assert!(matches!(
            RequestFailure::from(err),
            RequestFailure::InvalidQuery(_)
        ));
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            RequestFailure::UnknownOperator("^".to_string()).to_string(),
            "unknown operator '^'"
        );
        assert_eq!(
            RequestFailure::DivisionByZero { index: 2 }.to_string(),
            "division by zero at operand 2"
        );
    }
}
