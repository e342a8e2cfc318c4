//! Monthly cash-flow projection and return metrics

mod state;
mod engine;
mod cashflows;
mod irr;
mod metrics;

pub use state::GeneratorState;
pub use engine::{CashFlowGenerator, ProductionProfile};
pub use cashflows::{CashflowRow, ProjectionResult, ProjectionTotals};
pub use irr::{
    calculate_irr, npv_at_rate, IRR_HIGH_RATE, IRR_LOW_RATE, IRR_MAX_ITERATIONS,
    IRR_PROBE_RATES, IRR_TOLERANCE,
};
pub use metrics::{multiple_on_money, npv_by_rate, payback_month};
