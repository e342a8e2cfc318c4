//! Price-scenario deck loader
//!
//! Layout: a `date` column plus one column per scenario price level headed
//! `Gas <price>` or `Oil <price>`. Every gas column is crossed with every oil
//! column, giving scenarios named like `Gas_3.0_Oil_60`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;

use super::{record_line, SkippedRow};
use crate::error::EvalError;
use crate::pricing::{parse_month_key, ForwardCurve};

/// One gas/oil price pairing with its monthly series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceScenario {
    pub name: String,
    /// Scenario gas price level ($/MMBtu)
    pub gas_price_base: f64,
    /// Scenario oil price level ($/bbl)
    pub oil_price_base: f64,
    /// `YYYY-MM` keys in source order
    pub monthly_dates: Vec<String>,
    pub monthly_gas_prices: Vec<f64>,
    pub monthly_oil_prices: Vec<f64>,
}

impl PriceScenario {
    pub fn months(&self) -> usize {
        self.monthly_dates.len()
    }

    /// Month-keyed curves for the price deck adapter
    pub fn forward_curve(&self) -> ForwardCurve {
        ForwardCurve::from_monthly(
            self.monthly_dates
                .iter()
                .zip(&self.monthly_gas_prices)
                .zip(&self.monthly_oil_prices)
                .map(|((date, &gas), &oil)| (date.clone(), gas, oil)),
        )
    }
}

/// All scenarios parsed from one deck
#[derive(Debug, Clone, Default)]
pub struct PriceDeck {
    scenarios: BTreeMap<String, PriceScenario>,
    skipped: Vec<SkippedRow>,
}

impl PriceDeck {
    /// Scenario names in sorted order
    pub fn scenario_names(&self) -> Vec<&str> {
        self.scenarios.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Option<&PriceScenario> {
        self.scenarios.get(name)
    }

    /// Look up a scenario, failing with [`EvalError::UnknownScenario`]
    pub fn scenario(&self, name: &str) -> Result<&PriceScenario, EvalError> {
        self.get(name)
            .ok_or_else(|| EvalError::UnknownScenario(name.to_string()))
    }

    pub fn scenarios(&self) -> impl Iterator<Item = &PriceScenario> {
        self.scenarios.values()
    }

    /// Distinct gas price levels, ascending
    pub fn gas_price_levels(&self) -> Vec<f64> {
        distinct_sorted(self.scenarios.values().map(|s| s.gas_price_base))
    }

    /// Distinct oil price levels, ascending
    pub fn oil_price_levels(&self) -> Vec<f64> {
        distinct_sorted(self.scenarios.values().map(|s| s.oil_price_base))
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn skipped(&self) -> &[SkippedRow] {
        &self.skipped
    }
}

fn distinct_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.collect();
    out.sort_by(|a, b| a.total_cmp(b));
    out.dedup();
    out
}

/// CSV line holding the column headers
const HEADER_LINE: usize = 1;

/// Load a price deck from a CSV file
pub fn load_price_deck(path: &Path) -> Result<PriceDeck, EvalError> {
    log::info!("Parsing price deck from {}", path.display());
    let file = File::open(path)?;
    load_price_deck_from_reader(file)
}

/// Load a price deck from any CSV source
pub fn load_price_deck_from_reader<R: Read>(reader: R) -> Result<PriceDeck, EvalError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let date_col = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("date"))
        .ok_or_else(|| EvalError::DeckLayout("price deck has no `date` column".into()))?;

    let gas_cols = price_columns(&headers, "gas");
    let oil_cols = price_columns(&headers, "oil");
    if gas_cols.is_empty() || oil_cols.is_empty() {
        return Err(EvalError::DeckLayout(format!(
            "price deck needs gas and oil columns, found {} gas and {} oil",
            gas_cols.len(),
            oil_cols.len()
        )));
    }

    let mut skipped = Vec::new();
    let mut dates = Vec::new();
    let mut gas_series: Vec<Vec<f64>> = vec![Vec::new(); gas_cols.len()];
    let mut oil_series: Vec<Vec<f64>> = vec![Vec::new(); oil_cols.len()];

    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let line = record_line(&record, index);

        let raw_date = record.get(date_col).unwrap_or("");
        let Some((year, month)) = parse_month_key(raw_date) else {
            skipped.push(SkippedRow::new(line, format!("unparseable date '{}'", raw_date)));
            continue;
        };

        let gas = read_prices(&record, &gas_cols);
        let oil = read_prices(&record, &oil_cols);
        let (gas, oil) = match (gas, oil) {
            (Ok(gas), Ok(oil)) => (gas, oil),
            (Err(cell), _) | (_, Err(cell)) => {
                skipped.push(SkippedRow::new(line, format!("non-numeric price '{}'", cell)));
                continue;
            }
        };

        dates.push(format!("{:04}-{:02}", year, month));
        for (series, price) in gas_series.iter_mut().zip(gas) {
            series.push(price);
        }
        for (series, price) in oil_series.iter_mut().zip(oil) {
            series.push(price);
        }
    }

    for row in &skipped {
        log::warn!("Price deck row dropped: {}", row);
    }

    let mut scenarios = BTreeMap::new();
    for (gas_idx, &(_, gas_level)) in gas_cols.iter().enumerate() {
        for (oil_idx, &(_, oil_level)) in oil_cols.iter().enumerate() {
            let name = format!("Gas_{:.1}_Oil_{:.0}", gas_level, oil_level);
            if scenarios.contains_key(&name) {
                let reason = format!(
                    "columns Gas {} / Oil {} repeat scenario {}, first kept",
                    gas_level, oil_level, name
                );
                log::warn!("Price deck column dropped: {}", reason);
                skipped.push(SkippedRow::new(HEADER_LINE, reason));
                continue;
            }
            scenarios.insert(
                name.clone(),
                PriceScenario {
                    name,
                    gas_price_base: gas_level,
                    oil_price_base: oil_level,
                    monthly_dates: dates.clone(),
                    monthly_gas_prices: gas_series[gas_idx].clone(),
                    monthly_oil_prices: oil_series[oil_idx].clone(),
                },
            );
        }
    }

    log::info!(
        "Parsed {} price scenarios over {} months ({} rows dropped)",
        scenarios.len(),
        dates.len(),
        skipped.len()
    );

    Ok(PriceDeck { scenarios, skipped })
}

/// (column index, price level) for headers like `Gas 3.25`
fn price_columns(headers: &csv::StringRecord, commodity: &str) -> Vec<(usize, f64)> {
    headers
        .iter()
        .enumerate()
        .filter_map(|(idx, header)| {
            let mut parts = header.split_whitespace();
            let label = parts.next()?;
            if !label.eq_ignore_ascii_case(commodity) {
                return None;
            }
            let level: f64 = parts.next()?.trim_start_matches('$').parse().ok()?;
            level.is_finite().then_some((idx, level))
        })
        .collect()
}

fn read_prices<'r>(record: &'r csv::StringRecord, cols: &[(usize, f64)]) -> Result<Vec<f64>, &'r str> {
    cols.iter()
        .map(|&(idx, _)| {
            let cell = record.get(idx).unwrap_or("");
            match cell.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(cell),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DECK: &str = "\
date,NYMEX,Gas 3.0,Gas 3.5,Oil 60,Oil 70
2026-02-01,3.10,3.00,3.50,60.0,70.0
2026-03-01,3.20,3.05,3.55,60.5,70.5
bad-date,3.30,3.10,3.60,61.0,71.0
2026-04-01,3.40,n/a,3.65,61.5,71.5
2026-05-01,3.50,3.15,3.70,62.0,72.0
";

    #[test]
    fn test_scenarios_are_cross_product() {
        let deck = load_price_deck_from_reader(DECK.as_bytes()).unwrap();

        assert_eq!(
            deck.scenario_names(),
            vec!["Gas_3.0_Oil_60", "Gas_3.0_Oil_70", "Gas_3.5_Oil_60", "Gas_3.5_Oil_70"]
        );
        assert_eq!(deck.gas_price_levels(), vec![3.0, 3.5]);
        assert_eq!(deck.oil_price_levels(), vec![60.0, 70.0]);
    }

    #[test]
    fn test_bad_rows_dropped_with_diagnostics() {
        let deck = load_price_deck_from_reader(DECK.as_bytes()).unwrap();
        let scenario = deck.scenario("Gas_3.5_Oil_70").unwrap();

        assert_eq!(scenario.monthly_dates, vec!["2026-02", "2026-03", "2026-05"]);
        assert_relative_eq!(scenario.monthly_gas_prices[2], 3.70);
        assert_relative_eq!(scenario.monthly_oil_prices[1], 70.5);

        assert_eq!(deck.skipped().len(), 2);
        assert_eq!(deck.skipped()[0].line, 4);
        assert!(deck.skipped()[0].reason.contains("date"));
        assert!(deck.skipped()[1].reason.contains("n/a"));
    }

    #[test]
    fn test_colliding_scenario_names_keep_first_column() {
        let csv = "date,Gas 3.0,Gas 3.04,Oil 60\n2026-02-01,3.00,3.04,60.0\n";
        let deck = load_price_deck_from_reader(csv.as_bytes()).unwrap();

        assert_eq!(deck.scenario_names(), vec!["Gas_3.0_Oil_60"]);
        let scenario = deck.scenario("Gas_3.0_Oil_60").unwrap();
        assert_eq!(scenario.gas_price_base, 3.0);
        assert_relative_eq!(scenario.monthly_gas_prices[0], 3.00);

        assert_eq!(deck.skipped().len(), 1);
        assert_eq!(deck.skipped()[0].line, 1);
        assert!(deck.skipped()[0].reason.contains("Gas_3.0_Oil_60"));
    }

    #[test]
    fn test_unknown_scenario() {
        let deck = load_price_deck_from_reader(DECK.as_bytes()).unwrap();
        assert!(deck.get("Gas_9.0_Oil_10").is_none());
        assert!(matches!(
            deck.scenario("Gas_9.0_Oil_10"),
            Err(EvalError::UnknownScenario(_))
        ));
    }

    #[test]
    fn test_missing_commodity_columns_is_layout_error() {
        let csv = "date,Gas 3.0\n2026-02-01,3.0\n";
        assert!(matches!(
            load_price_deck_from_reader(csv.as_bytes()),
            Err(EvalError::DeckLayout(_))
        ));

        let csv = "month,Gas 3.0,Oil 60\n2026-02-01,3.0,60\n";
        assert!(matches!(
            load_price_deck_from_reader(csv.as_bytes()),
            Err(EvalError::DeckLayout(_))
        ));
    }

    #[test]
    fn test_forward_curve_conversion() {
        let deck = load_price_deck_from_reader(DECK.as_bytes()).unwrap();
        let curve = deck.scenario("Gas_3.0_Oil_60").unwrap().forward_curve();

        assert_eq!(curve.gas.len(), 3);
        assert_relative_eq!(curve.gas["2026-03"], 3.05);
        assert_relative_eq!(curve.oil["2026-05"], 62.0);
    }
}
