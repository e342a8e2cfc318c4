//! Mineral Eval - monthly cash-flow engine for oil & gas mineral and royalty interests
//!
//! This library provides:
//! - Deal inputs with tract-level NRI and reference defaults
//! - Arps decline curves and EUR inversion
//! - Monthly cash-flow projection (ramp, capex phasing, shrink, NGL, taxes)
//! - NPV, IRR, multiple on money and payback metrics
//! - Price deck adaptation with caps, floors and year-4-flat pricing
//! - CSV loaders for price scenarios and type-curve libraries

pub mod error;
pub mod deal;
pub mod decline;
pub mod pricing;
pub mod library;
pub mod projection;
pub mod evaluation;
pub mod scenario;

// Re-export commonly used types
pub use error::EvalError;
pub use deal::{DealInputs, DeclineType, Tract};
pub use pricing::{build_monthly_price_deck, ForwardCurve, MonthlyPriceDeck, PricePolicy};
pub use library::{DeckCache, PriceDeck, PriceScenario, SkippedRow, TypeCurve, TypeCurveLibrary};
pub use projection::{CashFlowGenerator, CashflowRow, ProjectionResult};
pub use evaluation::{EvaluationSummary, MineralEvaluation};
pub use scenario::ScenarioRunner;
