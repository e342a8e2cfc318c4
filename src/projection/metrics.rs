//! Return metrics over a monthly net cash-flow series

use super::irr::npv_at_rate;

/// NPV at each rate, in the order given
pub fn npv_by_rate(cashflows: &[f64], rates: &[f64]) -> Vec<(f64, f64)> {
    rates
        .iter()
        .map(|&rate| (rate, npv_at_rate(cashflows, rate)))
        .collect()
}

/// Multiple on money: positive inflows over absolute outflows
///
/// None unless the series both puts capital at risk and returns some.
pub fn multiple_on_money(cashflows: &[f64]) -> Option<f64> {
    let inflow: f64 = cashflows.iter().filter(|&&cf| cf > 0.0).sum();
    let outflow: f64 = cashflows.iter().filter(|&&cf| cf < 0.0).sum::<f64>().abs();

    if outflow > 0.0 && inflow > 0.0 {
        Some(inflow / outflow)
    } else {
        None
    }
}

/// First month whose cumulative net cash flow is non-negative
pub fn payback_month(cashflows: &[f64]) -> Option<u32> {
    let mut cumulative = 0.0;
    for (month, &cf) in cashflows.iter().enumerate() {
        cumulative += cf;
        if cumulative >= 0.0 {
            return Some(month as u32);
        }
    }
    None
}
