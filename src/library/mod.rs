//! CSV adapters for price-scenario decks and type-curve libraries
//!
//! Ragged source rows never abort a load. Each dropped row is recorded as a
//! [`SkippedRow`] next to the parsed value and logged at `warn` level.

mod cache;
mod price_deck;
mod type_curve;

use std::fmt;

use serde::Serialize;

pub use cache::DeckCache;
pub use price_deck::{load_price_deck, load_price_deck_from_reader, PriceDeck, PriceScenario};
pub use type_curve::{
    load_type_curves, load_type_curves_from_reader, TypeCurve, TypeCurveLibrary,
    DEFAULT_BENCH, DEFAULT_LATERAL_LENGTH_FT,
};

/// A source row dropped during parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-indexed line (or entry) number in the source
    pub line: usize,
    pub reason: String,
}

impl SkippedRow {
    pub fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SkippedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

/// Line number of a csv record, falling back to the record index
fn record_line(record: &csv::StringRecord, index: usize) -> usize {
    record
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(index + 2)
}
