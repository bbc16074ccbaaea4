//! Calculation response body

use serde::{Serialize, Serializer};

use crate::error::Result;

/// Largest magnitude at which every integer is exactly representable in f64
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// `{"result": <number>|null}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalcResponse {
    #[serde(serialize_with = "serialize_result")]
    pub result: Option<f64>,
}

impl CalcResponse {
    pub const NULL: Self = Self { result: None };

    pub const fn value(value: f64) -> Self {
        Self {
            result: Some(value),
        }
    }

    pub fn to_json(self) -> String {
        serde_json::to_string(&self).unwrap_or_else(|_| r#"{"result":null}"#.to_string())
    }

    /// The `result` value alone, as written in the body (`6`, `0.5`, `null`)
    pub fn result_json(self) -> String {
        serde_json::to_value(self).map_or_else(
            |_| "null".to_string(),
            |body| body["result"].to_string(),
        )
    }
}

impl From<&Result<f64>> for CalcResponse {
    fn from(outcome: &Result<f64>) -> Self {
        outcome.as_ref().map_or(Self::NULL, |&value| Self::value(value))
    }
}

/// Integral values go out as JSON integers (`6`, not `6.0`)
#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_result<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match *value {
        Some(v) if is_exact_integer(v) => {
            #[allow(clippy::cast_possible_truncation)]
            let int = v as i64;
            serializer.serialize_i64(int)
        }
        Some(v) if v.is_finite() => serializer.serialize_f64(v),
        _ => serializer.serialize_none(),
    }
}

fn is_exact_integer(v: f64) -> bool {
    v.is_finite() && v.fract() == 0.0 && v.abs() <= MAX_EXACT_INTEGER
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequestFailure;

    #[test]
    fn test_integral_result() {
        assert_eq!(CalcResponse::value(6.0).to_json(), r#"{"result":6}"#);
        assert_eq!(CalcResponse::value(-4.0).to_json(), r#"{"result":-4}"#);
    }

    #[test]
    fn test_fractional_result() {
        assert_eq!(CalcResponse::value(0.5).to_json(), r#"{"result":0.5}"#);
    }

    #[test]
    fn test_large_values_stay_float() {
        let json = CalcResponse::value(1e300).to_json();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed["result"].is_f64());
    }

    #[test]
    fn test_null_result() {
        assert_eq!(CalcResponse::NULL.to_json(), r#"{"result":null}"#);
        assert_eq!(CalcResponse::value(f64::NAN).to_json(), r#"{"result":null}"#);
    }

    #[test]
    fn test_result_json() {
        assert_eq!(CalcResponse::value(-4.0).result_json(), "-4");
        assert_eq!(CalcResponse::value(0.25).result_json(), "0.25");
        assert_eq!(CalcResponse::NULL.result_json(), "null");
    }

    #[test]
    fn test_from_outcome() {
        let ok: Result<f64> = Ok(2.0);
        let err: Result<f64> = Err(RequestFailure::EmptyOperands);
        assert_eq!(CalcResponse::from(&ok), CalcResponse::value(2.0));
        assert_eq!(CalcResponse::from(&err), CalcResponse::NULL);
    }
}
