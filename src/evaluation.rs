//! Single-deal evaluation: projection plus return metrics

use serde::Serialize;

use crate::deal::DealInputs;
use crate::error::EvalError;
use crate::pricing::MonthlyPriceDeck;
use crate::projection::{
    calculate_irr, multiple_on_money, npv_by_rate, payback_month, CashFlowGenerator, CashflowRow,
    ProjectionResult,
};

/// NPV at one discount rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateNpv {
    pub rate: f64,
    pub npv: f64,
}

/// The monthly projection of one deal and the metrics derived from it
#[derive(Debug, Clone)]
pub struct MineralEvaluation {
    inputs: DealInputs,
    projection: ProjectionResult,
    npv_by_rate: Vec<RateNpv>,
    irr: Option<f64>,
    mom: Option<f64>,
    payback_month: Option<u32>,
}

impl MineralEvaluation {
    /// Evaluate at the flat deal prices
    ///
    /// The inputs are finalized here, so a deal built in code evaluates the
    /// same as one loaded from a file.
    pub fn evaluate(inputs: DealInputs) -> Result<Self, EvalError> {
        let inputs = inputs.finalize()?;
        let projection = CashFlowGenerator::new(&inputs).generate()?;
        Ok(Self::from_projection(inputs, projection))
    }

    /// Evaluate with calendar-month prices from `deck`
    pub fn evaluate_with_deck(
        inputs: DealInputs,
        deck: &MonthlyPriceDeck,
    ) -> Result<Self, EvalError> {
        let inputs = inputs.finalize()?;
        let projection = CashFlowGenerator::new(&inputs)
            .with_price_deck(deck)
            .generate()?;
        Ok(Self::from_projection(inputs, projection))
    }

    fn from_projection(inputs: DealInputs, projection: ProjectionResult) -> Self {
        let cashflows = projection.net_cash_flows();

        let npv_by_rate = npv_by_rate(&cashflows, &inputs.discount_rates)
            .into_iter()
            .map(|(rate, npv)| RateNpv { rate, npv })
            .collect();
        let irr = calculate_irr(&cashflows);
        let mom = multiple_on_money(&cashflows);
        let payback = payback_month(&cashflows);

        log::info!(
            "Evaluated '{}': IRR {:?}, MoM {:?}, payback month {:?}",
            inputs.deal_name,
            irr,
            mom,
            payback
        );

        Self {
            inputs,
            projection,
            npv_by_rate,
            irr,
            mom,
            payback_month: payback,
        }
    }

    pub fn inputs(&self) -> &DealInputs {
        &self.inputs
    }

    /// Monthly rows in month order
    pub fn cash_flows(&self) -> &[CashflowRow] {
        &self.projection.cashflows
    }

    pub fn projection(&self) -> &ProjectionResult {
        &self.projection
    }

    /// NPV per configured rate, in configured order
    pub fn npv_by_rate(&self) -> &[RateNpv] {
        &self.npv_by_rate
    }

    /// NPV at a configured rate
    pub fn npv_at(&self, rate: f64) -> Option<f64> {
        self.npv_by_rate
            .iter()
            .find(|entry| entry.rate == rate)
            .map(|entry| entry.npv)
    }

    pub fn irr(&self) -> Option<f64> {
        self.irr
    }

    pub fn mom(&self) -> Option<f64> {
        self.mom
    }

    pub fn payback_month(&self) -> Option<u32> {
        self.payback_month
    }

    pub fn summary(&self) -> EvaluationSummary {
        let totals = self.projection.totals();
        EvaluationSummary {
            deal_name: self.inputs.deal_name.clone(),
            irr: self.irr,
            mom: self.mom,
            payback_month: self.payback_month,
            npv_by_rate: self.npv_by_rate.clone(),
            acquisition_cost: self.inputs.acquisition_cost,
            total_capex: totals.total_capex,
            total_revenue: totals.total_revenue,
            total_opex: totals.total_opex,
            total_tax: totals.total_tax,
            total_gpt: totals.total_gpt,
            cumulative_cash_flow: totals.cumulative_cash_flow,
            total_investment: self.inputs.acquisition_cost + totals.total_capex,
            total_nri: self.inputs.total_nri(),
            horizon_months: totals.months,
        }
    }
}

/// Headline results of one evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSummary {
    pub deal_name: String,
    pub irr: Option<f64>,
    pub mom: Option<f64>,
    pub payback_month: Option<u32>,
    pub npv_by_rate: Vec<RateNpv>,
    pub acquisition_cost: f64,
    pub total_capex: f64,
    pub total_revenue: f64,
    pub total_opex: f64,
    pub total_tax: f64,
    pub total_gpt: f64,
    pub cumulative_cash_flow: f64,
    /// Acquisition cost plus capex
    pub total_investment: f64,
    pub total_nri: f64,
    pub horizon_months: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::Tract;
    use crate::projection::npv_at_rate;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use chrono::NaiveDate;

    /// 600-month hyperbolic gas curve scaled to 12,060 MMcf
    fn synthetic_type_curve() -> Vec<f64> {
        let (di, b) = (0.9, 1.1);
        let raw: Vec<f64> = (0..600)
            .map(|m| {
                let t = (m as f64 + 0.5) / 12.0;
                (1.0 + b * di * t).powf(-1.0 / b)
            })
            .collect();
        let scale = 12_060.0 / raw.iter().sum::<f64>();
        raw.into_iter().map(|v| v * scale).collect()
    }

    fn declemente_deal() -> DealInputs {
        let mut deal = DealInputs::new("Declemente", "Appalachia", "APPA_113");
        deal.tracts = vec![Tract::new(18.0, 0.20, 234.2, Some("Declemente Unit".into())).unwrap()];
        deal.monthly_gross_gas_volumes = synthetic_type_curve();
        deal.gas_price_per_mcf = 3.68;
        deal.gas_shrink_factor = 0.85;
        deal.ngl_yield_bbls_per_mmcf = 60.0;
        deal.severance_tax_gas_pct = 0.007;
        deal.severance_tax_oil_pct = 0.002;
        deal.ad_valorem_tax_pct = 0.01;
        deal.acquisition_cost = 0.2375;
        deal.upfront_ga_fees = 0.0047;
        deal.undeveloped_delay_months = 36;
        deal.undeveloped_timing_years = 1.0;
        deal.spud_to_sales_months = 3;
        deal.base_date = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
        deal.finalize().unwrap()
    }

    #[test]
    fn test_synthetic_curve_eur() {
        let curve = synthetic_type_curve();
        assert_eq!(curve.len(), 600);
        assert_relative_eq!(curve.iter().sum::<f64>(), 12_060.0, max_relative = 1e-9);
    }

    #[test]
    fn test_declemente_end_to_end() {
        let eval = MineralEvaluation::evaluate(declemente_deal()).unwrap();
        let summary = eval.summary();

        assert_relative_eq!(summary.total_nri, 0.015372, epsilon = 1e-6);
        assert_eq!(summary.horizon_months, 600);

        let irr = eval.irr().expect("IRR should be defined");
        let cashflows = eval.projection().net_cash_flows();
        assert_abs_diff_eq!(npv_at_rate(&cashflows, irr), 0.0, epsilon = 1e-6);

        assert!(eval.mom().unwrap() > 1.0);
        let payback = eval.payback_month().unwrap();
        assert!(payback >= 36);
        assert!(summary.total_revenue > summary.total_tax);
        assert!(summary.total_tax < 0.1 * summary.total_revenue);
    }

    #[test]
    fn test_npv_rates_follow_configuration() {
        let eval = MineralEvaluation::evaluate(declemente_deal()).unwrap();
        let rates: Vec<f64> = eval.npv_by_rate().iter().map(|e| e.rate).collect();
        assert_eq!(rates, crate::deal::default_discount_rates());

        // NPV at 0% is the undiscounted sum
        let cumulative = eval.summary().cumulative_cash_flow;
        assert_relative_eq!(eval.npv_at(0.0).unwrap(), cumulative, max_relative = 1e-9);

        // Higher rates discount a back-loaded profile harder
        let npvs: Vec<f64> = eval.npv_by_rate().iter().map(|e| e.npv).collect();
        assert!(npvs.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_zero_inputs_leave_metrics_undefined() {
        let mut deal = declemente_deal();
        deal.monthly_gross_gas_volumes.clear();
        deal.gas_price_per_mcf = 0.0;
        deal.oil_price_per_bbl = 0.0;
        deal.ngl_price_per_bbl = 0.0;
        let eval = MineralEvaluation::evaluate(deal).unwrap();

        assert_relative_eq!(eval.cash_flows()[0].net_cash_flow, -(0.2375 + 0.0047));
        assert!(eval.cash_flows()[1..].iter().all(|r| r.net_cash_flow == 0.0));
        assert!(eval.irr().is_none());
        assert!(eval.mom().is_none());
        assert!(eval.payback_month().is_none());
    }

    fn flat_gas_deal() -> DealInputs {
        let mut deal = DealInputs::new("Unfinalized", "Appalachia", "APPA_113");
        deal.tracts = vec![Tract::new(18.0, 0.20, 234.2, None).unwrap()];
        deal.monthly_gross_gas_volumes = vec![300.0; 120];
        deal.analysis_years = 20;
        deal.base_date = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
        deal
    }

    #[test]
    fn test_unfinalized_deal_matches_finalized() {
        let raw = MineralEvaluation::evaluate(flat_gas_deal()).unwrap();
        let finalized = MineralEvaluation::evaluate(flat_gas_deal().finalize().unwrap()).unwrap();

        assert!(raw.inputs().ngl_price_derived());
        let raw_ngl: f64 = raw.cash_flows().iter().map(|r| r.ngl_revenue).sum();
        let finalized_ngl: f64 = finalized.cash_flows().iter().map(|r| r.ngl_revenue).sum();
        assert!(raw_ngl > 0.0);
        assert_relative_eq!(raw_ngl, finalized_ngl, max_relative = 1e-12);
        assert_eq!(raw.summary(), finalized.summary());
    }

    #[test]
    fn test_unfinalized_invalid_deal_rejected() {
        let mut deal = flat_gas_deal();
        deal.monthly_gross_gas_volumes = vec![-500.0; 12];
        assert!(matches!(
            MineralEvaluation::evaluate(deal),
            Err(EvalError::InvalidDeal { field: "monthly_gross_gas_volumes", .. })
        ));

        let mut deal = flat_gas_deal();
        deal.gas_shrink_factor = 7.0;
        assert!(matches!(
            MineralEvaluation::evaluate(deal),
            Err(EvalError::InvalidDeal { field: "gas_shrink_factor", .. })
        ));
    }

    #[test]
    fn test_summary_totals() {
        let mut deal = declemente_deal();
        deal.cost_bearing = true;
        deal.is_cost_bearing_lease = true;
        let eval = MineralEvaluation::evaluate(deal).unwrap();
        let summary = eval.summary();

        assert_relative_eq!(summary.total_capex, eval.inputs().total_capex(), max_relative = 1e-12);
        assert_relative_eq!(
            summary.total_investment,
            0.2375 + eval.inputs().total_capex(),
            max_relative = 1e-12
        );
        assert!(summary.total_gpt > 0.0);
        assert!(summary.total_opex > 0.0);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["deal_name"], "Declemente");
        assert_eq!(json["npv_by_rate"].as_array().unwrap().len(), 10);
    }
}
