//! Query parsing and evaluation
//!
//! A query is the JSON document carried in the `query` form field:
//! `{"op": "+", "ops": [1, 2, 3]}`. Unknown keys are ignored.

use serde::Deserialize;
use serde_json::Value;

use super::table::OperationTable;
use crate::error::{RequestFailure, Result};

/// Parsed calculation request
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Query {
    /// Operator symbol
    pub op: String,
    /// Operands, in order
    pub ops: Vec<f64>,
}

impl Query {
    /// Parse a raw JSON query string.
    ///
    /// Syntax errors map to `MalformedJson`; a well-formed document with the
    /// wrong shape (not an object, missing keys, non-numeric operands) maps
    /// to `InvalidQuery`.
    pub fn parse(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        // Struct deserialization would also accept `["+", [1, 2]]`
        if !value.is_object() {
            return Err(RequestFailure::InvalidQuery(serde::de::Error::custom(
                "query must be a JSON object",
            )));
        }
        Ok(Self::deserialize(value)?)
    }

    /// Reduce the operands with the operator looked up in `table`
    pub fn evaluate(&self, table: &OperationTable) -> Result<f64> {
        if self.ops.is_empty() {
            return Err(RequestFailure::EmptyOperands);
        }
        table.apply(&self.op, &self.ops)
    }
}
