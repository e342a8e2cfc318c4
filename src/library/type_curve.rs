//! Type-curve library loader
//!
//! Layout: header `month,<curve>,<curve>,...`; optional metadata rows keyed
//! `eur`, `lateral_length_ft` and `bench` in the first column; then one row
//! per production month with gross gas volumes (MMcf).

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;

use super::{record_line, SkippedRow};
use crate::error::EvalError;

pub const DEFAULT_LATERAL_LENGTH_FT: f64 = 10_000.0;
pub const DEFAULT_BENCH: &str = "Unknown";

/// A named monthly production profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeCurve {
    pub name: String,
    /// EUR in MMcf
    pub eur: f64,
    pub lateral_length_ft: f64,
    pub bench: String,
    /// Gross gas volume per month (MMcf), month 1 first
    pub monthly_volumes: Vec<f64>,
}

impl TypeCurve {
    pub fn months(&self) -> usize {
        self.monthly_volumes.len()
    }

    /// Sum of the monthly volumes
    pub fn cumulative_volume(&self) -> f64 {
        self.monthly_volumes.iter().sum()
    }
}

/// Type curves keyed by name
#[derive(Debug, Clone, Default)]
pub struct TypeCurveLibrary {
    curves: BTreeMap<String, TypeCurve>,
    skipped: Vec<SkippedRow>,
}

impl TypeCurveLibrary {
    pub fn names(&self) -> Vec<&str> {
        self.curves.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Option<&TypeCurve> {
        self.curves.get(name)
    }

    /// Look up a curve, failing with [`EvalError::UnknownTypeCurve`]
    pub fn curve(&self, name: &str) -> Result<&TypeCurve, EvalError> {
        self.get(name)
            .ok_or_else(|| EvalError::UnknownTypeCurve(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn skipped(&self) -> &[SkippedRow] {
        &self.skipped
    }
}

/// Load a type-curve library from a CSV file
pub fn load_type_curves(path: &Path) -> Result<TypeCurveLibrary, EvalError> {
    log::info!("Parsing type curve library from {}", path.display());
    let file = File::open(path)?;
    load_type_curves_from_reader(file)
}

/// Load a type-curve library from any CSV source
pub fn load_type_curves_from_reader<R: Read>(reader: R) -> Result<TypeCurveLibrary, EvalError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    match headers.get(0) {
        Some(first) if first.eq_ignore_ascii_case("month") => {}
        _ => {
            return Err(EvalError::DeckLayout(
                "type curve library must start with a `month` column".into(),
            ))
        }
    }
    let names: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
    if names.is_empty() {
        return Err(EvalError::DeckLayout("type curve library has no curve columns".into()));
    }

    let mut skipped = Vec::new();
    let mut eur: Vec<Option<f64>> = vec![None; names.len()];
    let mut lateral: Vec<Option<f64>> = vec![None; names.len()];
    let mut bench: Vec<Option<String>> = vec![None; names.len()];
    let mut months: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    let curve_count = names.len();

    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let line = record_line(&record, index);
        let record = &record;
        let key = record.get(0).unwrap_or("");
        let cells = || (0..curve_count).map(move |i| record.get(i + 1).unwrap_or(""));

        match key.to_ascii_lowercase().as_str() {
            "eur" | "lateral_length_ft" => {
                let target = if key.eq_ignore_ascii_case("eur") {
                    &mut eur
                } else {
                    &mut lateral
                };
                match parse_row(cells()) {
                    Ok(values) => {
                        let filled = values.into_iter().zip(cells());
                        for (slot, (value, cell)) in target.iter_mut().zip(filled) {
                            if !cell.is_empty() {
                                *slot = Some(value);
                            }
                        }
                    }
                    Err(cell) => {
                        skipped.push(SkippedRow::new(line, format!("non-numeric {} '{}'", key, cell)))
                    }
                }
            }
            "bench" => {
                for (slot, cell) in bench.iter_mut().zip(cells()) {
                    if !cell.is_empty() {
                        *slot = Some(cell.to_string());
                    }
                }
            }
            _ => {
                let Ok(month) = key.parse::<u32>() else {
                    skipped.push(SkippedRow::new(line, format!("unparseable month '{}'", key)));
                    continue;
                };
                match parse_row(cells()) {
                    Ok(values) => {
                        if months.insert(month, values).is_some() {
                            log::warn!("Type curve month {} repeated at line {}, keeping last", month, line);
                        }
                    }
                    Err(cell) => skipped.push(SkippedRow::new(
                        line,
                        format!("non-numeric volume '{}' in month {}", cell, month),
                    )),
                }
            }
        }
    }

    for row in &skipped {
        log::warn!("Type curve row dropped: {}", row);
    }

    let mut curves = BTreeMap::new();
    for (i, name) in names.into_iter().enumerate() {
        let monthly_volumes: Vec<f64> = months.values().map(|row| row[i]).collect();
        let curve = TypeCurve {
            eur: eur[i].unwrap_or_else(|| monthly_volumes.iter().sum()),
            lateral_length_ft: lateral[i].unwrap_or(DEFAULT_LATERAL_LENGTH_FT),
            bench: bench[i].take().unwrap_or_else(|| DEFAULT_BENCH.to_string()),
            name: name.clone(),
            monthly_volumes,
        };
        curves.insert(name, curve);
    }

    log::info!(
        "Parsed {} type curves over {} months ({} rows dropped)",
        curves.len(),
        months.len(),
        skipped.len()
    );

    Ok(TypeCurveLibrary { curves, skipped })
}

/// Parse every cell; empty cells read as zero
fn parse_row<'a>(cells: impl Iterator<Item = &'a str>) -> Result<Vec<f64>, &'a str> {
    cells
        .map(|cell| {
            if cell.is_empty() {
                return Ok(0.0);
            }
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

    const LIBRARY: &str = "\
month,APPA_113,APPA_114
eur,12060,
bench,Point Pleasant,
1,100.0,80.0
2,90.0,
3,81.0,70.0
x,1.0,1.0
4,abc,60.0
";

    #[test]
    fn test_curves_and_metadata() {
        let lib = load_type_curves_from_reader(LIBRARY.as_bytes()).unwrap();
        assert_eq!(lib.names(), vec!["APPA_113", "APPA_114"]);

        let a = lib.curve("APPA_113").unwrap();
        assert_eq!(a.monthly_volumes, vec![100.0, 90.0, 81.0]);
        assert_relative_eq!(a.eur, 12_060.0);
        assert_eq!(a.bench, "Point Pleasant");
        assert_relative_eq!(a.lateral_length_ft, DEFAULT_LATERAL_LENGTH_FT);
    }

    #[test]
    fn test_missing_metadata_defaults() {
        let lib = load_type_curves_from_reader(LIBRARY.as_bytes()).unwrap();
        let b = lib.curve("APPA_114").unwrap();

        // Empty cell reads as zero
        assert_eq!(b.monthly_volumes, vec![80.0, 0.0, 70.0]);
        assert_relative_eq!(b.eur, 150.0);
        assert_eq!(b.bench, DEFAULT_BENCH);
    }

    #[test]
    fn test_bad_rows_dropped_with_diagnostics() {
        let lib = load_type_curves_from_reader(LIBRARY.as_bytes()).unwrap();
        let skipped = lib.skipped();

        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].line, 7);
        assert!(skipped[0].reason.contains("month"));
        assert!(skipped[1].reason.contains("abc"));
    }

    #[test]
    fn test_layout_errors() {
        assert!(matches!(
            load_type_curves_from_reader("date,A\n1,2\n".as_bytes()),
            Err(EvalError::DeckLayout(_))
        ));
        assert!(matches!(
            load_type_curves_from_reader("month\n1\n".as_bytes()),
            Err(EvalError::DeckLayout(_))
        ));

        let lib = load_type_curves_from_reader(LIBRARY.as_bytes()).unwrap();
        assert!(matches!(lib.curve("NOPE"), Err(EvalError::UnknownTypeCurve(_))));
    }
}
