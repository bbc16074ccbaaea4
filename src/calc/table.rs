//! Operation table
//!
//! Maps each operator symbol to a reduction over an ordered, non-empty list
//! of operands. Built once at startup and shared read-only.

use std::collections::HashMap;
use std::fmt;

use crate::error::{RequestFailure, Result};

/// A reduction folds an ordered, non-empty operand list into one number.
pub type Reduction = fn(&[f64]) -> Result<f64>;

/// Read-only lookup from operator symbol to reduction
#[derive(Clone)]
pub struct OperationTable {
    reductions: HashMap<&'static str, Reduction>,
}

impl OperationTable {
    /// The four supported operators: `+`, `-`, `*`, `/`
    pub fn standard() -> Self {
        let mut reductions: HashMap<&'static str, Reduction> = HashMap::with_capacity(4);
        reductions.insert("+", sum);
        reductions.insert("-", subtract);
        reductions.insert("*", multiply);
        reductions.insert("/", divide);
        Self { reductions }
    }

    /// Look up `symbol` and reduce `operands` with it.
    ///
    /// Rejects empty operand lists before the lookup, and non-finite results
    /// after it.
    pub fn apply(&self, symbol: &str, operands: &[f64]) -> Result<f64> {
        if operands.is_empty() {
            return Err(RequestFailure::EmptyOperands);
        }

        let (&op, &reduce) = self
            .reductions
            .get_key_value(symbol)
            .ok_or_else(|| RequestFailure::UnknownOperator(symbol.to_string()))?;

        let value = reduce(operands)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(RequestFailure::NonFinite { op })
        }
    }

    /// Registered symbols, sorted
    pub fn symbols(&self) -> Vec<&'static str> {
        let mut symbols: Vec<_> = self.reductions.keys().copied().collect();
        symbols.sort_unstable();
        symbols
    }
}

impl fmt::Debug for OperationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationTable")
            .field("symbols", &self.symbols())
            .finish()
    }
}

#[allow(clippy::unnecessary_wraps)]
fn sum(operands: &[f64]) -> Result<f64> {
    Ok(operands.iter().sum())
}

/// `a0 - (a1 + ... + an)`
#[allow(clippy::unnecessary_wraps)]
fn subtract(operands: &[f64]) -> Result<f64> {
    let (first, rest) = split_first(operands)?;
    Ok(first - rest.iter().sum::<f64>())
}

#[allow(clippy::unnecessary_wraps)]
fn multiply(operands: &[f64]) -> Result<f64> {
    Ok(operands.iter().product())
}

/// Left fold: `((a0 / a1) / a2) / ... / an`
fn divide(operands: &[f64]) -> Result<f64> {
    let (first, rest) = split_first(operands)?;
    rest.iter()
        .enumerate()
        .try_fold(first, |acc, (i, &divisor)| {
            if divisor == 0.0 {
                Err(RequestFailure::DivisionByZero { index: i + 1 })
            } else {
                Ok(acc / divisor)
            }
        })
}

fn split_first(operands: &[f64]) -> Result<(f64, &[f64])> {
    operands
        .split_first()
        .map(|(first, rest)| (*first, rest))
        .ok_or(RequestFailure::EmptyOperands)
}
