//! Month-indexed price deck built from forward curves or price scenarios

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::policy::{PricePolicy, YEAR4_FIRST_MONTH, YEAR4_LAST_MONTH};
use crate::error::EvalError;
use crate::library::SkippedRow;

/// Calendar month key (year, month 1-12)
pub type MonthKey = (i32, u32);

/// Parse a `YYYY-MM` (or `YYYY-MM-DD`) key into a calendar month
pub fn parse_month_key(key: &str) -> Option<MonthKey> {
    let key = key.trim();
    let date = if key.len() == 7 {
        NaiveDate::parse_from_str(&format!("{}-01", key), "%Y-%m-%d").ok()?
    } else {
        NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()?
    };
    Some((date.year(), date.month()))
}

/// Raw forward curves keyed by `YYYY-MM` date strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForwardCurve {
    /// Henry Hub gas price by month
    pub gas: BTreeMap<String, f64>,
    /// WTI oil price by month
    pub oil: BTreeMap<String, f64>,
}

impl ForwardCurve {
    /// Build from (date key, gas price, oil price) triples
    pub fn from_monthly<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (S, f64, f64)>,
        S: Into<String>,
    {
        let mut curve = Self::default();
        for (key, gas, oil) in rows {
            let key = key.into();
            curve.gas.insert(key.clone(), gas);
            curve.oil.insert(key, oil);
        }
        curve
    }

    pub fn is_empty(&self) -> bool {
        self.gas.is_empty() && self.oil.is_empty()
    }
}

/// Gas and oil prices for one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPrice {
    pub gas: f64,
    pub oil: f64,
}

/// Policy-adjusted (gas, oil) prices by calendar month
#[derive(Debug, Clone, Default)]
pub struct MonthlyPriceDeck {
    prices: BTreeMap<MonthKey, MonthlyPrice>,
    skipped: Vec<SkippedRow>,
}

impl MonthlyPriceDeck {
    /// Price for a calendar month
    pub fn get(&self, year: i32, month: u32) -> Option<MonthlyPrice> {
        self.prices.get(&(year, month)).copied()
    }

    /// Price for the calendar month containing `date`
    pub fn price_on(&self, date: NaiveDate) -> Option<MonthlyPrice> {
        self.get(date.year(), date.month())
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Months in calendar order
    pub fn iter(&self) -> impl Iterator<Item = (&MonthKey, &MonthlyPrice)> {
        self.prices.iter()
    }

    /// Entries dropped while building the deck
    pub fn skipped(&self) -> &[SkippedRow] {
        &self.skipped
    }
}

/// Build the monthly deck consumed by the cash-flow generator
///
/// Gas and oil are joined on their month key; malformed keys and months
/// priced for only one commodity are dropped and reported in
/// [`MonthlyPriceDeck::skipped`]. With `year4_flat`, every month after the
/// 48th is replaced by the raw month 37-48 average; caps and floors apply
/// afterwards.
pub fn build_monthly_price_deck(
    curve: &ForwardCurve,
    policy: &PricePolicy,
) -> Result<MonthlyPriceDeck, EvalError> {
    policy.validate()?;

    let mut skipped = Vec::new();
    let mut raw: BTreeMap<MonthKey, MonthlyPrice> = BTreeMap::new();

    for (index, (key, &gas)) in curve.gas.iter().enumerate() {
        let Some(month_key) = parse_month_key(key) else {
            skipped.push(SkippedRow::new(index + 1, format!("malformed date key '{}'", key)));
            continue;
        };
        let Some(&oil) = curve.oil.get(key) else {
            skipped.push(SkippedRow::new(index + 1, format!("no oil price for '{}'", key)));
            continue;
        };
        if !gas.is_finite() || !oil.is_finite() {
            skipped.push(SkippedRow::new(index + 1, format!("non-finite price for '{}'", key)));
            continue;
        }
        if raw.contains_key(&month_key) {
            skipped.push(SkippedRow::new(index + 1, format!("duplicate month for '{}'", key)));
            continue;
        }
        raw.insert(month_key, MonthlyPrice { gas, oil });
    }

    for (index, key) in curve.oil.keys().enumerate() {
        if !curve.gas.contains_key(key) {
            skipped.push(SkippedRow::new(index + 1, format!("no gas price for '{}'", key)));
        }
    }

    for row in &skipped {
        log::warn!("Price deck entry dropped: {}", row);
    }

    let year4_average = if policy.year4_flat {
        year4_average(raw.values())
    } else {
        None
    };

    let prices = raw
        .into_iter()
        .enumerate()
        .map(|(index, (key, price))| {
            let month_number = index + 1;
            let price = match year4_average {
                Some(flat) if month_number > YEAR4_LAST_MONTH => flat,
                _ => price,
            };
            let adjusted = MonthlyPrice {
                gas: policy.clamp_gas(price.gas),
                oil: policy.clamp_oil(price.oil),
            };
            (key, adjusted)
        })
        .collect::<BTreeMap<_, _>>();

    log::debug!(
        "Built price deck: {} months, {} entries dropped, year-4 flat {:?}",
        prices.len(),
        skipped.len(),
        year4_average
    );

    Ok(MonthlyPriceDeck { prices, skipped })
}

/// Average raw gas and oil over months 37-48 of the deck
fn year4_average<'a>(prices: impl Iterator<Item = &'a MonthlyPrice>) -> Option<MonthlyPrice> {
    let window: Vec<&MonthlyPrice> = prices
        .skip(YEAR4_FIRST_MONTH - 1)
        .take(YEAR4_LAST_MONTH - YEAR4_FIRST_MONTH + 1)
        .collect();

    if window.is_empty() {
        return None;
    }

    let n = window.len() as f64;
    Some(MonthlyPrice {
        gas: window.iter().map(|p| p.gas).sum::<f64>() / n,
        oil: window.iter().map(|p| p.oil).sum::<f64>() / n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn month_key(index: usize) -> String {
        let year = 2026 + (index / 12) as i32;
        let month = (index % 12) + 1;
        format!("{:04}-{:02}", year, month)
    }

    fn rising_curve(months: usize) -> ForwardCurve {
        ForwardCurve::from_monthly(
            (0..months).map(|i| (month_key(i), 2.0 + i as f64 * 0.05, 50.0 + i as f64)),
        )
    }

    #[test]
    fn test_parse_month_key() {
        assert_eq!(parse_month_key("2026-02"), Some((2026, 2)));
        assert_eq!(parse_month_key("2026-02-28"), Some((2026, 2)));
        assert_eq!(parse_month_key("2026-13"), None);
        assert_eq!(parse_month_key("Feb 2026"), None);
        assert_eq!(parse_month_key(""), None);
    }

    #[test]
    fn test_raw_deck_passes_prices_through() {
        let curve = rising_curve(24);
        let deck = build_monthly_price_deck(&curve, &PricePolicy::default()).unwrap();

        assert_eq!(deck.len(), 24);
        let first = deck.get(2026, 1).unwrap();
        assert_relative_eq!(first.gas, 2.0);
        assert_relative_eq!(first.oil, 50.0);
        let last = deck.get(2027, 12).unwrap();
        assert_relative_eq!(last.oil, 73.0);
        assert!(deck.skipped().is_empty());
    }

    #[test]
    fn test_malformed_keys_skipped() {
        let mut curve = rising_curve(3);
        curve.gas.insert("not-a-date".into(), 3.0);
        curve.oil.insert("not-a-date".into(), 60.0);
        curve.oil.insert("2030-01".into(), 60.0);

        let deck = build_monthly_price_deck(&curve, &PricePolicy::default()).unwrap();

        assert_eq!(deck.len(), 3);
        assert_eq!(deck.skipped().len(), 2);
        assert!(deck.skipped().iter().any(|r| r.reason.contains("malformed")));
        assert!(deck.skipped().iter().any(|r| r.reason.contains("no gas price")));
    }

    #[test]
    fn test_year4_flat_holds_average() {
        let curve = rising_curve(120);
        let policy = PricePolicy {
            year4_flat: true,
            ..Default::default()
        };
        let deck = build_monthly_price_deck(&curve, &policy).unwrap();

        // Raw months 37-48 are indices 36..48
        let expected_gas: f64 = (36..48).map(|i| 2.0 + i as f64 * 0.05).sum::<f64>() / 12.0;
        let expected_oil: f64 = (36..48).map(|i| 50.0 + i as f64).sum::<f64>() / 12.0;

        let prices: Vec<MonthlyPrice> = deck.iter().map(|(_, p)| *p).collect();
        for (i, price) in prices.iter().enumerate() {
            if i >= 48 {
                assert_relative_eq!(price.gas, expected_gas, max_relative = 1e-12);
                assert_relative_eq!(price.oil, expected_oil, max_relative = 1e-12);
            } else {
                assert_relative_eq!(price.oil, 50.0 + i as f64, max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn test_year4_flat_short_deck_is_noop() {
        let curve = rising_curve(30);
        let policy = PricePolicy {
            year4_flat: true,
            ..Default::default()
        };
        let deck = build_monthly_price_deck(&curve, &policy).unwrap();
        assert_relative_eq!(deck.get(2028, 6).unwrap().oil, 79.0);
    }

    #[test]
    fn test_year4_average_uses_pre_clamp_prices() {
        let curve = rising_curve(60);
        let policy = PricePolicy {
            cap_oil: Some(70.0),
            year4_flat: true,
            ..Default::default()
        };
        let deck = build_monthly_price_deck(&curve, &policy).unwrap();

        // Raw year-4 oil averages 91.5, so flat months clamp to the cap
        let prices: Vec<MonthlyPrice> = deck.iter().map(|(_, p)| *p).collect();
        assert_eq!(prices[50].oil, 70.0);
        assert!(prices.iter().all(|p| p.oil <= 70.0));
    }

    #[test]
    fn test_caps_and_floors_bound_every_month() {
        let curve = ForwardCurve::from_monthly(
            (0..48).map(|i| (month_key(i), (i as f64 - 10.0) * 0.5, 20.0 + i as f64 * 3.0)),
        );
        let policy = PricePolicy::with_bounds((2.0, 6.0), (40.0, 90.0));
        let deck = build_monthly_price_deck(&curve, &policy).unwrap();

        for (_, price) in deck.iter() {
            assert!((2.0..=6.0).contains(&price.gas));
            assert!((40.0..=90.0).contains(&price.oil));
        }
    }

    #[test]
    fn test_invalid_policy_is_error() {
        let policy = PricePolicy::with_bounds((2.0, 6.0), (90.0, 40.0));
        assert!(build_monthly_price_deck(&rising_curve(3), &policy).is_err());
    }
}
