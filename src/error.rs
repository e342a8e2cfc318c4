//! Error types for deal evaluation

use thiserror::Error;

/// Errors raised while building or loading evaluation inputs
///
/// Numerical non-convergence is not an error: IRR, MoM and payback are
/// reported as `None` instead.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("invalid tract: {0}")]
    InvalidTract(String),

    #[error("invalid deal input `{field}`: {reason}")]
    InvalidDeal { field: &'static str, reason: String },

    #[error("analysis horizon is empty ({years} years)")]
    EmptyHorizon { years: u32 },

    #[error("invalid {commodity} price bounds: floor {floor} is above cap {cap}")]
    InvalidPriceBounds {
        commodity: &'static str,
        floor: f64,
        cap: f64,
    },

    #[error("unknown price scenario: {0}")]
    UnknownScenario(String),

    #[error("unknown type curve: {0}")]
    UnknownTypeCurve(String),

    #[error("malformed deck layout: {0}")]
    DeckLayout(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EvalError {
    pub(crate) fn invalid_deal(field: &'static str, reason: impl Into<String>) -> Self {
        EvalError::InvalidDeal {
            field,
            reason: reason.into(),
        }
    }
}
