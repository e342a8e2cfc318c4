//! Price policy: per-commodity caps/floors and year-4-flat perpetuity

use serde::{Deserialize, Serialize};

use crate::error::EvalError;

/// First and last month (1-indexed) of the fourth year averaged by year-4-flat
pub const YEAR4_FIRST_MONTH: usize = 37;
pub const YEAR4_LAST_MONTH: usize = 48;

/// How raw forward prices are adjusted before valuation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PricePolicy {
    #[serde(default)]
    pub cap_gas: Option<f64>,
    #[serde(default)]
    pub floor_gas: Option<f64>,
    #[serde(default)]
    pub cap_oil: Option<f64>,
    #[serde(default)]
    pub floor_oil: Option<f64>,
    /// Hold the month 37-48 average flat for every month after 48
    #[serde(default)]
    pub year4_flat: bool,
}

impl PricePolicy {
    /// Apply caps and floors to both commodities
    pub fn with_bounds(gas: (f64, f64), oil: (f64, f64)) -> Self {
        Self {
            floor_gas: Some(gas.0),
            cap_gas: Some(gas.1),
            floor_oil: Some(oil.0),
            cap_oil: Some(oil.1),
            year4_flat: false,
        }
    }

    /// Reject a floor above its cap
    pub fn validate(&self) -> Result<(), EvalError> {
        check_bounds("gas", self.floor_gas, self.cap_gas)?;
        check_bounds("oil", self.floor_oil, self.cap_oil)
    }

    pub fn clamp_gas(&self, price: f64) -> f64 {
        clamp(price, self.floor_gas, self.cap_gas)
    }

    pub fn clamp_oil(&self, price: f64) -> f64 {
        clamp(price, self.floor_oil, self.cap_oil)
    }

    /// Whether any clamp or the year-4 policy is active
    pub fn is_active(&self) -> bool {
        self.year4_flat
            || self.cap_gas.is_some()
            || self.floor_gas.is_some()
            || self.cap_oil.is_some()
            || self.floor_oil.is_some()
    }
}

fn check_bounds(commodity: &'static str, floor: Option<f64>, cap: Option<f64>) -> Result<(), EvalError> {
    if let (Some(floor), Some(cap)) = (floor, cap) {
        if floor > cap {
            return Err(EvalError::InvalidPriceBounds { commodity, floor, cap });
        }
    }
    Ok(())
}

/// Cap first, then floor
fn clamp(price: f64, floor: Option<f64>, cap: Option<f64>) -> f64 {
    let mut price = price;
    if let Some(cap) = cap {
        price = price.min(cap);
    }
    if let Some(floor) = floor {
        price = price.max(floor);
    }
    price
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_into_bounds() {
        let policy = PricePolicy::with_bounds((2.0, 6.0), (40.0, 90.0));
        for raw in [-5.0, 0.0, 1.99, 2.0, 3.5, 6.0, 6.01, 100.0] {
            let p = policy.clamp_gas(raw);
            assert!((2.0..=6.0).contains(&p), "gas {} clamped to {}", raw, p);
        }
        assert_eq!(policy.clamp_oil(120.0), 90.0);
        assert_eq!(policy.clamp_oil(10.0), 40.0);
        assert_eq!(policy.clamp_oil(61.0), 61.0);
    }

    #[test]
    fn test_one_sided_bounds() {
        let policy = PricePolicy {
            cap_gas: Some(5.0),
            ..Default::default()
        };
        assert_eq!(policy.clamp_gas(7.0), 5.0);
        assert_eq!(policy.clamp_gas(0.5), 0.5);
        assert_eq!(policy.clamp_oil(500.0), 500.0);
        assert!(policy.is_active());
        assert!(!PricePolicy::default().is_active());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let policy = PricePolicy::with_bounds((6.0, 2.0), (40.0, 90.0));
        assert!(matches!(
            policy.validate(),
            Err(EvalError::InvalidPriceBounds { commodity: "gas", .. })
        ));
        assert!(PricePolicy::with_bounds((2.0, 6.0), (40.0, 90.0)).validate().is_ok());
    }
}
