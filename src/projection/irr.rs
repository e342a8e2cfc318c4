//! Discounting and Internal Rate of Return for monthly cash flows
//!
//! Rates are annual. Month `m` is discounted by `(1 + r)^(-m/12)`.

/// Lower edge of the initial IRR bracket
pub const IRR_LOW_RATE: f64 = 0.0;

/// Upper edge of the initial IRR bracket (1000%)
pub const IRR_HIGH_RATE: f64 = 10.0;

/// Rates probed when NPV is still positive at the upper edge
pub const IRR_PROBE_RATES: [f64; 4] = [50.0, 100.0, 500.0, 1000.0];

pub const IRR_MAX_ITERATIONS: usize = 200;
pub const IRR_TOLERANCE: f64 = 1e-6;

/// Net present value of monthly cash flows at an annual rate
pub fn npv_at_rate(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(m, &cf)| cf * (1.0 + rate).powf(-(m as f64) / 12.0))
        .sum()
}

/// Annual IRR of monthly cash flows by bisection
///
/// The bracket starts at [0%, 1000%]. When NPV is positive at both edges
/// the upper edge is pushed out through [`IRR_PROBE_RATES`]; a bracket that
/// never changes sign, or a series with no sign change at all, has no IRR.
/// The result is the midpoint of the final bracket.
pub fn calculate_irr(cashflows: &[f64]) -> Option<f64> {
    let has_positive = cashflows.iter().any(|&cf| cf > 0.0);
    let has_negative = cashflows.iter().any(|&cf| cf < 0.0);
    if !has_positive || !has_negative {
        return None;
    }

    let mut low = IRR_LOW_RATE;
    let mut high = IRR_HIGH_RATE;

    let npv_low = npv_at_rate(cashflows, low);
    let npv_high = npv_at_rate(cashflows, high);
    if !npv_low.is_finite() || !npv_high.is_finite() {
        return None;
    }
    if npv_low.abs() < IRR_TOLERANCE {
        return Some(low);
    }

    if npv_low * npv_high > 0.0 {
        if npv_low < 0.0 {
            log::warn!("IRR undefined: NPV is negative across the bracket");
            return None;
        }
        match IRR_PROBE_RATES
            .iter()
            .copied()
            .find(|&rate| npv_at_rate(cashflows, rate) < 0.0)
        {
            Some(rate) => high = rate,
            None => {
                log::warn!("IRR undefined: NPV stays positive up to {}", IRR_PROBE_RATES[3]);
                return None;
            }
        }
    }

    let low_is_negative = npv_low < 0.0;
    for _ in 0..IRR_MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv_at_rate(cashflows, mid);
        if !npv_mid.is_finite() {
            return None;
        }
        if npv_mid.abs() < IRR_TOLERANCE {
            break;
        }

        if (npv_mid < 0.0) == low_is_negative {
            low = mid;
        } else {
            high = mid;
        }
    }

    Some((low + high) / 2.0)
}
