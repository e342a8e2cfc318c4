//! Deal input model: tracts, ownership and all evaluation assumptions

mod data;
pub mod loader;

pub use data::{default_discount_rates, DealInputs, DeclineType, Tract, MAX_ANALYSIS_YEARS};
pub use loader::{load_deal, load_deal_from_reader};
