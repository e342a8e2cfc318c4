//! Cash-flow output structures for a deal projection

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One month of the projection
///
/// Volumes are in type-curve units (MMcf gas, MBbl oil); NGL barrels follow
/// from the per-million yield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowRow {
    // Timing
    /// 0-indexed month of the analysis
    pub month: u32,
    /// 0-indexed analysis year
    pub year: u32,
    pub period_date: NaiveDate,

    // Prices applied this month
    pub gas_price: f64,
    pub oil_price: f64,
    pub ngl_price: f64,

    // Gross volumes (after production risk)
    pub gross_gas: f64,
    pub gross_oil: f64,
    pub shrunk_gas: f64,
    pub gross_ngl: f64,

    // Net to interest
    pub net_gas: f64,
    pub net_oil: f64,
    pub net_ngl: f64,

    // Revenue
    pub gas_revenue: f64,
    pub oil_revenue: f64,
    pub ngl_revenue: f64,
    pub total_revenue: f64,

    // Operating costs
    pub fixed_opex: f64,
    pub variable_opex: f64,
    pub total_opex: f64,

    // Taxes
    pub severance_tax: f64,
    pub ad_valorem_tax: f64,
    pub total_tax: f64,

    pub gpt_cost: f64,
    pub capex: f64,

    // Ownership economics
    pub acquisition_cost: f64,
    pub ga_fees: f64,
    pub monthly_ga: f64,

    pub net_cash_flow: f64,
}

impl CashflowRow {
    /// Create an all-zero row for a month
    pub fn new(month: u32, period_date: NaiveDate) -> Self {
        Self {
            month,
            year: month / 12,
            period_date,
            gas_price: 0.0,
            oil_price: 0.0,
            ngl_price: 0.0,
            gross_gas: 0.0,
            gross_oil: 0.0,
            shrunk_gas: 0.0,
            gross_ngl: 0.0,
            net_gas: 0.0,
            net_oil: 0.0,
            net_ngl: 0.0,
            gas_revenue: 0.0,
            oil_revenue: 0.0,
            ngl_revenue: 0.0,
            total_revenue: 0.0,
            fixed_opex: 0.0,
            variable_opex: 0.0,
            total_opex: 0.0,
            severance_tax: 0.0,
            ad_valorem_tax: 0.0,
            total_tax: 0.0,
            gpt_cost: 0.0,
            capex: 0.0,
            acquisition_cost: 0.0,
            ga_fees: 0.0,
            monthly_ga: 0.0,
            net_cash_flow: 0.0,
        }
    }
}

/// Complete monthly projection for one deal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub deal_name: String,

    /// Monthly rows in month order
    pub cashflows: Vec<CashflowRow>,

    /// Months priced from flat deal prices because the deck had no entry
    pub price_deck_gaps: u32,
}

impl ProjectionResult {
    pub fn new(deal_name: &str) -> Self {
        Self {
            deal_name: deal_name.to_string(),
            cashflows: Vec::new(),
            price_deck_gaps: 0,
        }
    }

    pub fn add_row(&mut self, row: CashflowRow) {
        self.cashflows.push(row);
    }

    /// Net cash flow per month, ready for the metrics
    pub fn net_cash_flows(&self) -> Vec<f64> {
        self.cashflows.iter().map(|r| r.net_cash_flow).collect()
    }

    /// Totals over the horizon
    pub fn totals(&self) -> ProjectionTotals {
        let sum = |f: fn(&CashflowRow) -> f64| self.cashflows.iter().map(f).sum::<f64>();

        ProjectionTotals {
            months: self.cashflows.len() as u32,
            gross_gas: sum(|r| r.gross_gas),
            gross_oil: sum(|r| r.gross_oil),
            total_revenue: sum(|r| r.total_revenue),
            total_opex: sum(|r| r.total_opex),
            total_tax: sum(|r| r.total_tax),
            total_gpt: sum(|r| r.gpt_cost),
            total_capex: sum(|r| r.capex),
            total_acquisition: sum(|r| r.acquisition_cost + r.ga_fees),
            cumulative_cash_flow: sum(|r| r.net_cash_flow),
        }
    }
}

/// Horizon totals for a projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionTotals {
    pub months: u32,
    pub gross_gas: f64,
    pub gross_oil: f64,
    pub total_revenue: f64,
    pub total_opex: f64,
    pub total_tax: f64,
    pub total_gpt: f64,
    pub total_capex: f64,
    /// Acquisition cost plus upfront G&A fees
    pub total_acquisition: f64,
    pub cumulative_cash_flow: f64,
}
