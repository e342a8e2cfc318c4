//! Month-to-month state carried by the cash-flow generator

use chrono::{Months, NaiveDate};

use crate::deal::DealInputs;

/// Generator state at the start of a month
#[derive(Debug, Clone)]
pub struct GeneratorState {
    /// Current month (0-indexed)
    pub month: u32,

    /// Calendar month being priced
    pub period_date: NaiveDate,

    /// Total drilling & completion capex for the lateral
    pub total_capex: f64,

    /// Capex disbursed so far
    pub cumulative_capex: f64,

    /// Months priced at flat deal prices because the deck had a gap
    pub price_deck_gaps: u32,
}

impl GeneratorState {
    /// Initialize state at the first month of the analysis
    pub fn from_inputs(inputs: &DealInputs) -> Self {
        Self {
            month: 0,
            period_date: inputs.base_date,
            total_capex: inputs.total_capex(),
            cumulative_capex: 0.0,
            price_deck_gaps: 0,
        }
    }

    /// Advance to next month
    pub fn advance_month(&mut self, inputs: &DealInputs) {
        self.month += 1;
        self.period_date = inputs
            .base_date
            .checked_add_months(Months::new(self.month))
            .unwrap_or(self.period_date);
    }

    /// Months since drilling started, None before the undeveloped delay
    pub fn months_since_start(&self, inputs: &DealInputs) -> Option<u32> {
        self.month.checked_sub(inputs.undeveloped_delay_months)
    }

    /// Capex disbursed this month, updating the running total
    ///
    /// Total capex is spread evenly over the spud-to-sales window that opens
    /// at the undeveloped delay; the last increment never exceeds what remains.
    pub fn take_capex(&mut self, inputs: &DealInputs) -> f64 {
        let window = inputs.spud_to_sales_months;
        if window == 0 || self.total_capex <= 0.0 {
            return 0.0;
        }

        let start = inputs.undeveloped_delay_months;
        if self.month < start || self.month >= start + window {
            return 0.0;
        }

        let remaining = self.total_capex - self.cumulative_capex;
        if remaining <= 0.0 {
            return 0.0;
        }

        let increment = (self.total_capex / window as f64).min(remaining);
        self.cumulative_capex += increment;
        increment
    }
}
