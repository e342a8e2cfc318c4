//! Monthly cash-flow generator for a single deal

use std::borrow::Cow;

use crate::deal::DealInputs;
use crate::decline::DeclineSpec;
use crate::error::EvalError;
use crate::pricing::MonthlyPriceDeck;
use super::cashflows::{CashflowRow, ProjectionResult};
use super::state::GeneratorState;

/// Rate units per volume unit (Mcf/d to MMcf, bbl/d to MBbl)
const RATE_TO_VOLUME: f64 = 1000.0;

/// NGL yield is quoted per million units of shrunk gas
const NGL_YIELD_SCALE: f64 = 1_000_000.0;

/// Gross monthly volumes the generator steps through
#[derive(Debug, Clone)]
pub struct ProductionProfile<'a> {
    pub gas: Cow<'a, [f64]>,
    pub oil: Cow<'a, [f64]>,
}

impl ProductionProfile<'_> {
    fn is_empty(&self) -> bool {
        self.gas.is_empty() && self.oil.is_empty()
    }

    fn len(&self) -> usize {
        self.gas.len().max(self.oil.len())
    }
}

/// Prices applied in one month
#[derive(Debug, Clone, Copy)]
struct MonthPrices {
    gas: f64,
    oil: f64,
    ngl: f64,
}

/// Steps a deal month by month over its analysis horizon
pub struct CashFlowGenerator<'a> {
    inputs: &'a DealInputs,
    price_deck: Option<&'a MonthlyPriceDeck>,
}

impl<'a> CashFlowGenerator<'a> {
    /// Generator priced at the flat deal prices
    pub fn new(inputs: &'a DealInputs) -> Self {
        Self {
            inputs,
            price_deck: None,
        }
    }

    /// Price each calendar month from `deck`, falling back to flat prices
    pub fn with_price_deck(mut self, deck: &'a MonthlyPriceDeck) -> Self {
        self.price_deck = Some(deck);
        self
    }

    /// Run the projection
    ///
    /// Inputs are validated first, so an out-of-range deal never produces rows.
    pub fn generate(&self) -> Result<ProjectionResult, EvalError> {
        let inputs = self.inputs;
        inputs.validate()?;
        let horizon = inputs.horizon_months();

        let profile = self.production_profile();
        let total_nri = inputs.total_nri();
        log::debug!(
            "Projecting '{}': {} months, NRI {:.6}, capex {:.4}, {} gas / {} oil profile months",
            inputs.deal_name,
            horizon,
            total_nri,
            inputs.total_capex(),
            profile.gas.len(),
            profile.oil.len()
        );

        let mut result = ProjectionResult::new(&inputs.deal_name);
        let mut state = GeneratorState::from_inputs(inputs);

        for _ in 0..horizon {
            let row = self.calculate_month(&profile, total_nri, &mut state);
            result.add_row(row);
            state.advance_month(inputs);
        }

        result.price_deck_gaps = state.price_deck_gaps;
        if self.price_deck.is_some() && state.price_deck_gaps > 0 {
            log::warn!(
                "Price deck missing {} of {} months for '{}', flat prices used",
                state.price_deck_gaps,
                horizon,
                inputs.deal_name
            );
        }

        Ok(result)
    }

    /// Explicit volume series, or the decline-model fallback when enabled
    pub fn production_profile(&self) -> ProductionProfile<'a> {
        let inputs = self.inputs;
        let profile = ProductionProfile {
            gas: Cow::Borrowed(inputs.monthly_gross_gas_volumes.as_slice()),
            oil: Cow::Borrowed(inputs.monthly_gross_oil_volumes.as_slice()),
        };
        if !profile.is_empty() || !inputs.use_decline_fallback {
            return profile;
        }

        let spec = DeclineSpec {
            kind: inputs.decline_curve_type,
            initial_decline: inputs.initial_decline_rate,
            b_factor: inputs.hyperbolic_exponent,
            terminal_decline: inputs.terminal_decline_rate,
        };
        let life = inputs.analysis_years;
        let months = inputs.horizon_months();

        let mut gas_rate = inputs.initial_gas_rate_mcf_per_day;
        if gas_rate <= 0.0 && inputs.gas_eur_mmcf > 0.0 {
            gas_rate = spec.initial_daily_rate(inputs.gas_eur_mmcf * RATE_TO_VOLUME, life);
        }
        let mut oil_rate = inputs.initial_oil_rate_bbl_per_day;
        if oil_rate <= 0.0 && inputs.oil_eur_mbbl > 0.0 {
            oil_rate = spec.initial_daily_rate(inputs.oil_eur_mbbl * RATE_TO_VOLUME, life);
        }

        log::debug!(
            "Synthesising {} months from {:?} decline: gas {:.1} Mcf/d, oil {:.1} bbl/d",
            months,
            spec.kind,
            gas_rate,
            oil_rate
        );

        let synthesise = |rate: f64| -> Vec<f64> {
            if rate <= 0.0 {
                return Vec::new();
            }
            spec.monthly_volumes(rate, months)
                .into_iter()
                .map(|v| v / RATE_TO_VOLUME)
                .collect()
        };

        ProductionProfile {
            gas: Cow::Owned(synthesise(gas_rate)),
            oil: Cow::Owned(synthesise(oil_rate)),
        }
    }

    /// Calculate cash flows for a single month
    fn calculate_month(
        &self,
        profile: &ProductionProfile<'_>,
        total_nri: f64,
        state: &mut GeneratorState,
    ) -> CashflowRow {
        let inputs = self.inputs;
        let mut row = CashflowRow::new(state.month, state.period_date);

        // One-time and recurring ownership costs
        if state.month == 0 {
            row.acquisition_cost = inputs.acquisition_cost;
            row.ga_fees = inputs.upfront_ga_fees;
        }
        row.monthly_ga = inputs.annual_ga / 12.0;

        let monthly_capex = state.take_capex(inputs);

        // Gross production, derated
        let (gross_gas, gross_oil, producing) = self.gross_production(profile, state);
        row.gross_gas = gross_gas * inputs.production_risk;
        row.gross_oil = gross_oil * inputs.production_risk;
        row.shrunk_gas = row.gross_gas * inputs.gas_shrink_factor;
        row.gross_ngl = row.shrunk_gas * inputs.ngl_yield_bbls_per_mmcf / NGL_YIELD_SCALE;

        row.net_gas = row.gross_gas * total_nri;
        row.net_oil = row.gross_oil * total_nri;
        row.net_ngl = row.gross_ngl * total_nri;

        // Revenue
        let prices = self.prices_for(state);
        row.gas_price = prices.gas;
        row.oil_price = prices.oil;
        row.ngl_price = prices.ngl;

        row.gas_revenue =
            row.net_gas * (prices.gas + inputs.gas_differential_per_mcf) * inputs.btu_adjustment;
        row.oil_revenue = row.net_oil * (prices.oil + inputs.oil_differential_per_bbl);
        row.ngl_revenue = row.net_ngl * prices.ngl;
        row.total_revenue = row.gas_revenue + row.oil_revenue + row.ngl_revenue;

        // Operating costs fall to the operator on a royalty basis
        if inputs.cost_bearing {
            row.fixed_opex = if producing { inputs.fixed_opex_per_month } else { 0.0 };
            row.variable_opex = row.net_oil * inputs.variable_opex_oil_per_bbl
                + row.net_gas * inputs.variable_opex_gas_per_mcf;
            row.total_opex = row.fixed_opex + row.variable_opex;
        }

        if inputs.is_cost_bearing_lease {
            row.gpt_cost = row.shrunk_gas * inputs.gas_processing_per_mcf;
        }

        // Taxes apply on both bases
        row.severance_tax = row.net_oil * prices.oil * inputs.severance_tax_oil_pct
            + row.net_gas * prices.gas * inputs.severance_tax_gas_pct
            + row.net_ngl * prices.ngl * inputs.severance_tax_ngl_pct;
        row.ad_valorem_tax = row.total_revenue * inputs.ad_valorem_tax_pct;
        row.total_tax = row.severance_tax + row.ad_valorem_tax;

        if inputs.cost_bearing {
            row.capex = monthly_capex;
        }

        row.net_cash_flow = row.total_revenue
            - row.total_opex
            - row.gpt_cost
            - row.total_tax
            - row.capex
            - row.acquisition_cost
            - row.ga_fees
            - row.monthly_ga;

        row
    }

    /// Gross (gas, oil) before derating, and whether the well is producing
    ///
    /// Zero before the undeveloped delay. During the ramp, gas climbs
    /// linearly toward the first profile month and oil is zero; afterwards
    /// the profile is read from its start until exhausted.
    fn gross_production(
        &self,
        profile: &ProductionProfile<'_>,
        state: &GeneratorState,
    ) -> (f64, f64, bool) {
        let Some(since_start) = state.months_since_start(self.inputs) else {
            return (0.0, 0.0, false);
        };
        if profile.is_empty() {
            return (0.0, 0.0, false);
        }

        let ramp = self.inputs.ramp_duration_months();
        if since_start < ramp {
            let peak_gas = profile.gas.first().copied().unwrap_or(0.0);
            let gas = peak_gas * (since_start + 1) as f64 / ramp as f64;
            return (gas, 0.0, true);
        }

        let index = (since_start - ramp) as usize;
        let gas = profile.gas.get(index).copied().unwrap_or(0.0);
        let oil = profile.oil.get(index).copied().unwrap_or(0.0);
        (gas, oil, index < profile.len())
    }

    /// Deck prices for the calendar month, or the flat deal prices
    fn prices_for(&self, state: &mut GeneratorState) -> MonthPrices {
        let inputs = self.inputs;
        let flat = MonthPrices {
            gas: inputs.gas_price_per_mcf,
            oil: inputs.oil_price_per_bbl,
            ngl: inputs.ngl_price_for_oil(inputs.oil_price_per_bbl),
        };

        let Some(deck) = self.price_deck else {
            return flat;
        };
        match deck.price_on(state.period_date) {
            Some(price) => MonthPrices {
                gas: price.gas,
                oil: price.oil,
                ngl: inputs.ngl_price_for_oil(price.oil),
            },
            None => {
                state.price_deck_gaps += 1;
                flat
            }
        }
    }
}
