//! Load deal inputs from JSON deal files

use super::DealInputs;
use crate::error::EvalError;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load, validate and finalize a deal from a JSON file
pub fn load_deal<P: AsRef<Path>>(path: P) -> Result<DealInputs, EvalError> {
    let file = File::open(path.as_ref())?;
    log::info!("Loading deal from {}", path.as_ref().display());
    load_deal_from_reader(BufReader::new(file))
}

/// Load a deal from any reader (e.g., string buffer, network stream)
pub fn load_deal_from_reader<R: std::io::Read>(reader: R) -> Result<DealInputs, EvalError> {
    let deal: DealInputs = serde_json::from_reader(reader)?;
    let deal = deal.finalize()?;
    log::debug!(
        "Deal '{}' loaded: {} tracts, total NRI {:.6}, {} gas months",
        deal.deal_name,
        deal.tracts.len(),
        deal.total_nri(),
        deal.monthly_gross_gas_volumes.len()
    );
    Ok(deal)
}
