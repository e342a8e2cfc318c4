//! Deal input structures: tracts, ownership, production, prices, costs and timing

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EvalError;

/// Decline model used when production is synthesised from an initial rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeclineType {
    #[default]
    Exponential,
    Hyperbolic,
    Harmonic,
}

/// Raw tract fields as they appear in a deal file, validated into [`Tract`]
#[derive(Debug, Clone, Deserialize)]
struct TractSpec {
    mineral_acres: f64,
    royalty_rate: f64,
    drilling_unit_gross_acres: f64,
    #[serde(default)]
    unit_name: Option<String>,
}

/// A single tract of mineral acres inside a drilling unit
///
/// Immutable once created: NRI is always `acres * royalty / unit acres`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TractSpec")]
pub struct Tract {
    mineral_acres: f64,
    royalty_rate: f64,
    drilling_unit_gross_acres: f64,
    unit_name: Option<String>,
}

impl Tract {
    /// Create a tract, rejecting a non-positive drilling unit size
    pub fn new(
        mineral_acres: f64,
        royalty_rate: f64,
        drilling_unit_gross_acres: f64,
        unit_name: Option<String>,
    ) -> Result<Self, EvalError> {
        if !(drilling_unit_gross_acres > 0.0) || !drilling_unit_gross_acres.is_finite() {
            return Err(EvalError::InvalidTract(format!(
                "drilling unit gross acres must be positive, got {}",
                drilling_unit_gross_acres
            )));
        }
        if !(mineral_acres >= 0.0) || !mineral_acres.is_finite() {
            return Err(EvalError::InvalidTract(format!(
                "mineral acres must be non-negative, got {}",
                mineral_acres
            )));
        }
        if !(0.0..=1.0).contains(&royalty_rate) {
            return Err(EvalError::InvalidTract(format!(
                "royalty rate must be within [0, 1], got {}",
                royalty_rate
            )));
        }

        Ok(Self {
            mineral_acres,
            royalty_rate,
            drilling_unit_gross_acres,
            unit_name,
        })
    }

    pub fn mineral_acres(&self) -> f64 {
        self.mineral_acres
    }

    pub fn royalty_rate(&self) -> f64 {
        self.royalty_rate
    }

    pub fn drilling_unit_gross_acres(&self) -> f64 {
        self.drilling_unit_gross_acres
    }

    pub fn unit_name(&self) -> Option<&str> {
        self.unit_name.as_deref()
    }

    /// Net revenue interest: (acres × royalty) / unit gross acres
    pub fn nri(&self) -> f64 {
        (self.mineral_acres * self.royalty_rate) / self.drilling_unit_gross_acres
    }
}

impl TryFrom<TractSpec> for Tract {
    type Error = EvalError;

    fn try_from(spec: TractSpec) -> Result<Self, Self::Error> {
        Tract::new(
            spec.mineral_acres,
            spec.royalty_rate,
            spec.drilling_unit_gross_acres,
            spec.unit_name,
        )
    }
}

/// Longest analysis horizon a deal may request
pub const MAX_ANALYSIS_YEARS: u32 = 200;

fn default_gross_locations() -> f64 { 1.0 }
fn default_lateral_length() -> f64 { 10_000.0 }
fn default_gas_eur() -> f64 { 12_060.0 }
fn default_initial_decline() -> f64 { 0.5 }
fn default_b_factor() -> f64 { 0.5 }
fn default_terminal_decline() -> f64 { 0.05 }
fn default_shrink() -> f64 { 0.85 }
fn default_ngl_yield() -> f64 { 60.0 }
fn default_oil_price() -> f64 { 61.0 }
fn default_gas_price() -> f64 { 3.68 }
fn default_gas_differential() -> f64 { -0.06 }
fn default_ngl_pct_wti() -> f64 { 0.33 }
fn default_one() -> f64 { 1.0 }
fn default_fixed_opex() -> f64 { 2_500.0 }
fn default_variable_gas_opex() -> f64 { 0.15 }
fn default_gpt() -> f64 { 1.79 }
fn default_capex_per_ft() -> f64 { 7_000.0 }
fn default_spud_to_sales() -> u32 { 3 }
fn default_undeveloped_delay() -> u32 { 36 }
fn default_development_pace() -> u32 { 4 }
fn default_severance_oil() -> f64 { 0.002 }
fn default_severance_gas() -> f64 { 0.007 }
fn default_ad_valorem() -> f64 { 0.01 }
fn default_analysis_years() -> u32 { 50 }
fn default_base_date() -> NaiveDate { chrono::Local::now().date_naive() }

/// Default discount rates for NPV reporting (0% through 30%)
pub fn default_discount_rates() -> Vec<f64> {
    vec![0.0, 0.05, 0.075, 0.10, 0.125, 0.15, 0.175, 0.20, 0.25, 0.30]
}

/// All assumptions for one deal evaluation
///
/// Deserialized from a deal file with per-field defaults, then passed
/// through [`DealInputs::finalize`] which validates the fields and derives
/// the NGL price. Treated as immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealInputs {
    // Identity
    pub deal_name: String,
    #[serde(default)]
    pub basin: String,
    #[serde(default)]
    pub type_curve_id: String,

    // Ownership
    #[serde(default)]
    pub tracts: Vec<Tract>,
    #[serde(default)]
    pub participation_wi: f64,
    #[serde(default)]
    pub participation_nri: f64,

    // Well & land
    #[serde(default = "default_gross_locations")]
    pub gross_locations: f64,
    #[serde(default = "default_lateral_length")]
    pub lateral_length_ft: f64,

    // Production: explicit monthly volumes take precedence
    #[serde(default)]
    pub oil_eur_mbbl: f64,
    #[serde(default = "default_gas_eur")]
    pub gas_eur_mmcf: f64,
    /// Gross gas per month (MMcf)
    #[serde(default)]
    pub monthly_gross_gas_volumes: Vec<f64>,
    /// Gross oil per month (MBbl)
    #[serde(default)]
    pub monthly_gross_oil_volumes: Vec<f64>,

    // Production: initial rate + decline
    #[serde(default)]
    pub initial_oil_rate_bbl_per_day: f64,
    #[serde(default)]
    pub initial_gas_rate_mcf_per_day: f64,
    #[serde(default)]
    pub decline_curve_type: DeclineType,
    #[serde(default = "default_initial_decline")]
    pub initial_decline_rate: f64,
    #[serde(default = "default_b_factor")]
    pub hyperbolic_exponent: f64,
    #[serde(default = "default_terminal_decline")]
    pub terminal_decline_rate: f64,
    /// Synthesise volumes from the decline parameters when no series is supplied
    #[serde(default)]
    pub use_decline_fallback: bool,

    // Commercial
    #[serde(default = "default_shrink")]
    pub gas_shrink_factor: f64,
    /// NGL barrels per million units of shrunk gas
    #[serde(default = "default_ngl_yield")]
    pub ngl_yield_bbls_per_mmcf: f64,
    #[serde(default = "default_oil_price")]
    pub oil_price_per_bbl: f64,
    #[serde(default = "default_gas_price")]
    pub gas_price_per_mcf: f64,
    /// 0.0 means "derive from oil price" (see [`DealInputs::derive_ngl_price`])
    #[serde(default)]
    pub ngl_price_per_bbl: f64,
    #[serde(default)]
    pub oil_differential_per_bbl: f64,
    #[serde(default = "default_gas_differential")]
    pub gas_differential_per_mcf: f64,
    #[serde(default = "default_ngl_pct_wti")]
    pub ngl_differential_pct_wti: f64,
    #[serde(default = "default_one")]
    pub btu_adjustment: f64,

    // Operating costs
    #[serde(default = "default_fixed_opex")]
    pub fixed_opex_per_month: f64,
    #[serde(default)]
    pub variable_opex_oil_per_bbl: f64,
    #[serde(default = "default_variable_gas_opex")]
    pub variable_opex_gas_per_mcf: f64,

    // Gas processing & transportation
    #[serde(default = "default_gpt")]
    pub gas_processing_per_mcf: f64,
    #[serde(default)]
    pub is_cost_bearing_lease: bool,

    // Capex
    /// Drilling & completion capex per lateral foot (total = per_ft * ft / 1000)
    #[serde(default = "default_capex_per_ft")]
    pub drilling_completion_capex: f64,
    #[serde(default = "default_spud_to_sales")]
    pub spud_to_sales_months: u32,

    // Development timing
    #[serde(default = "default_undeveloped_delay")]
    pub undeveloped_delay_months: u32,
    /// Ramp length in years (ramp months = trunc(years * 12))
    #[serde(default = "default_one")]
    pub undeveloped_timing_years: f64,
    /// Years to develop the unit; informational for single-well capex phasing
    #[serde(default = "default_development_pace")]
    pub development_pace_years: u32,

    /// Production risk multiplier applied to gross volumes
    #[serde(default = "default_one")]
    pub production_risk: f64,

    /// true: interest pays capex and opex; false: royalty basis
    #[serde(default)]
    pub cost_bearing: bool,

    // Ownership economics
    #[serde(default)]
    pub acquisition_cost: f64,
    #[serde(default)]
    pub upfront_ga_fees: f64,
    #[serde(default)]
    pub annual_ga: f64,

    // Taxes
    #[serde(default = "default_severance_oil")]
    pub severance_tax_oil_pct: f64,
    #[serde(default = "default_severance_gas")]
    pub severance_tax_gas_pct: f64,
    #[serde(default)]
    pub severance_tax_ngl_pct: f64,
    #[serde(default = "default_ad_valorem")]
    pub ad_valorem_tax_pct: f64,

    // Analysis
    #[serde(default = "default_analysis_years")]
    pub analysis_years: u32,
    #[serde(default = "default_discount_rates")]
    pub discount_rates: Vec<f64>,
    #[serde(default = "default_base_date")]
    pub base_date: NaiveDate,

    /// Set by the NGL derivation step when the NGL price tracks oil
    #[serde(skip)]
    ngl_price_derived: bool,
}

impl DealInputs {
    /// Create a deal with reference defaults and no tracts
    pub fn new(deal_name: &str, basin: &str, type_curve_id: &str) -> Self {
        Self {
            deal_name: deal_name.to_string(),
            basin: basin.to_string(),
            type_curve_id: type_curve_id.to_string(),
            tracts: Vec::new(),
            participation_wi: 0.0,
            participation_nri: 0.0,
            gross_locations: default_gross_locations(),
            lateral_length_ft: default_lateral_length(),
            oil_eur_mbbl: 0.0,
            gas_eur_mmcf: default_gas_eur(),
            monthly_gross_gas_volumes: Vec::new(),
            monthly_gross_oil_volumes: Vec::new(),
            initial_oil_rate_bbl_per_day: 0.0,
            initial_gas_rate_mcf_per_day: 0.0,
            decline_curve_type: DeclineType::Exponential,
            initial_decline_rate: default_initial_decline(),
            hyperbolic_exponent: default_b_factor(),
            terminal_decline_rate: default_terminal_decline(),
            use_decline_fallback: false,
            gas_shrink_factor: default_shrink(),
            ngl_yield_bbls_per_mmcf: default_ngl_yield(),
            oil_price_per_bbl: default_oil_price(),
            gas_price_per_mcf: default_gas_price(),
            ngl_price_per_bbl: 0.0,
            oil_differential_per_bbl: 0.0,
            gas_differential_per_mcf: default_gas_differential(),
            ngl_differential_pct_wti: default_ngl_pct_wti(),
            btu_adjustment: 1.0,
            fixed_opex_per_month: default_fixed_opex(),
            variable_opex_oil_per_bbl: 0.0,
            variable_opex_gas_per_mcf: default_variable_gas_opex(),
            gas_processing_per_mcf: default_gpt(),
            is_cost_bearing_lease: false,
            drilling_completion_capex: default_capex_per_ft(),
            spud_to_sales_months: default_spud_to_sales(),
            undeveloped_delay_months: default_undeveloped_delay(),
            undeveloped_timing_years: 1.0,
            development_pace_years: default_development_pace(),
            production_risk: 1.0,
            cost_bearing: false,
            acquisition_cost: 0.0,
            upfront_ga_fees: 0.0,
            annual_ga: 0.0,
            severance_tax_oil_pct: default_severance_oil(),
            severance_tax_gas_pct: default_severance_gas(),
            severance_tax_ngl_pct: 0.0,
            ad_valorem_tax_pct: default_ad_valorem(),
            analysis_years: default_analysis_years(),
            discount_rates: default_discount_rates(),
            base_date: default_base_date(),
            ngl_price_derived: false,
        }
    }

    /// Total NRI across all tracts plus participation NRI
    pub fn total_nri(&self) -> f64 {
        let tract_nri: f64 = self.tracts.iter().map(Tract::nri).sum();
        tract_nri + self.participation_nri
    }

    /// Number of monthly periods in the analysis horizon
    pub fn horizon_months(&self) -> u32 {
        self.analysis_years.saturating_mul(12)
    }

    /// Total drilling & completion capex for the lateral
    pub fn total_capex(&self) -> f64 {
        self.drilling_completion_capex * self.lateral_length_ft / 1000.0
    }

    /// Months of linear ramp after drilling starts
    pub fn ramp_duration_months(&self) -> u32 {
        (self.undeveloped_timing_years * 12.0).trunc().max(0.0) as u32
    }

    /// Whether the NGL price was derived from the oil price
    pub fn ngl_price_derived(&self) -> bool {
        self.ngl_price_derived
    }

    /// NGL price for a given oil price
    ///
    /// A derived NGL price tracks oil; an explicit one stays fixed. A zero
    /// price that has not been through [`DealInputs::derive_ngl_price`] is
    /// treated as derived.
    pub fn ngl_price_for_oil(&self, oil_price: f64) -> f64 {
        if self.ngl_price_derived || self.ngl_price_per_bbl == 0.0 {
            oil_price * self.ngl_differential_pct_wti
        } else {
            self.ngl_price_per_bbl
        }
    }

    /// Derive the NGL price from WTI when it was left at zero
    pub fn derive_ngl_price(&mut self) {
        if self.ngl_price_per_bbl == 0.0 {
            self.ngl_price_per_bbl = self.oil_price_per_bbl * self.ngl_differential_pct_wti;
            self.ngl_price_derived = true;
        }
    }

    /// Validate all fields, failing fast on the first bad one
    pub fn validate(&self) -> Result<(), EvalError> {
        if self.deal_name.trim().is_empty() {
            return Err(EvalError::invalid_deal("deal_name", "must not be empty"));
        }
        if self.analysis_years == 0 {
            return Err(EvalError::EmptyHorizon { years: self.analysis_years });
        }
        if self.analysis_years > MAX_ANALYSIS_YEARS {
            return Err(EvalError::invalid_deal(
                "analysis_years",
                format!("must be at most {}, got {}", MAX_ANALYSIS_YEARS, self.analysis_years),
            ));
        }

        check_fraction("participation_nri", self.participation_nri)?;
        check_fraction("participation_wi", self.participation_wi)?;
        check_fraction("gas_shrink_factor", self.gas_shrink_factor)?;
        check_fraction("severance_tax_oil_pct", self.severance_tax_oil_pct)?;
        check_fraction("severance_tax_gas_pct", self.severance_tax_gas_pct)?;
        check_fraction("severance_tax_ngl_pct", self.severance_tax_ngl_pct)?;
        check_fraction("ad_valorem_tax_pct", self.ad_valorem_tax_pct)?;

        check_non_negative("lateral_length_ft", self.lateral_length_ft)?;
        check_non_negative("drilling_completion_capex", self.drilling_completion_capex)?;
        check_non_negative("ngl_yield_bbls_per_mmcf", self.ngl_yield_bbls_per_mmcf)?;
        check_non_negative("production_risk", self.production_risk)?;
        check_non_negative("undeveloped_timing_years", self.undeveloped_timing_years)?;
        check_non_negative("btu_adjustment", self.btu_adjustment)?;
        check_non_negative("ngl_price_per_bbl", self.ngl_price_per_bbl)?;
        check_non_negative("acquisition_cost", self.acquisition_cost)?;
        check_non_negative("upfront_ga_fees", self.upfront_ga_fees)?;
        check_non_negative("annual_ga", self.annual_ga)?;
        check_non_negative("hyperbolic_exponent", self.hyperbolic_exponent)?;

        check_finite("oil_price_per_bbl", self.oil_price_per_bbl)?;
        check_finite("gas_price_per_mcf", self.gas_price_per_mcf)?;
        check_finite("oil_differential_per_bbl", self.oil_differential_per_bbl)?;
        check_finite("gas_differential_per_mcf", self.gas_differential_per_mcf)?;

        if let Some(bad) = self
            .monthly_gross_gas_volumes
            .iter()
            .find(|v| !(v.is_finite() && **v >= 0.0))
        {
            return Err(EvalError::invalid_deal(
                "monthly_gross_gas_volumes",
                format!("volumes must be finite and non-negative, found {}", bad),
            ));
        }
        if let Some(bad) = self
            .monthly_gross_oil_volumes
            .iter()
            .find(|v| !(v.is_finite() && **v >= 0.0))
        {
            return Err(EvalError::invalid_deal(
                "monthly_gross_oil_volumes",
                format!("volumes must be finite and non-negative, found {}", bad),
            ));
        }
        if let Some(bad) = self.discount_rates.iter().find(|r| !(r.is_finite() && **r > -1.0)) {
            return Err(EvalError::invalid_deal(
                "discount_rates",
                format!("rates must be finite and above -100%, found {}", bad),
            ));
        }

        Ok(())
    }

    /// Validate, then run the derivation step
    pub fn finalize(mut self) -> Result<Self, EvalError> {
        self.validate()?;
        self.derive_ngl_price();
        Ok(self)
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), EvalError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EvalError::invalid_deal(field, format!("must be finite, got {}", value)))
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), EvalError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EvalError::invalid_deal(field, format!("must be non-negative, got {}", value)))
    }
}

fn check_fraction(field: &'static str, value: f64) -> Result<(), EvalError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EvalError::invalid_deal(field, format!("must be within [0, 1], got {}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tract_nri() {
        let tract = Tract::new(18.0, 0.20, 234.2, Some("Stephens County Unit 1".into())).unwrap();
        assert_relative_eq!(tract.nri(), 18.0 * 0.20 / 234.2, max_relative = 1e-12);
        assert_relative_eq!(tract.nri(), 0.015372, epsilon = 1e-6);
        assert_eq!(tract.unit_name(), Some("Stephens County Unit 1"));
    }

    #[test]
    fn test_tract_rejects_zero_unit_acres() {
        assert!(matches!(Tract::new(10.0, 0.2, 0.0, None), Err(EvalError::InvalidTract(_))));
        assert!(Tract::new(10.0, 0.2, -5.0, None).is_err());
        assert!(Tract::new(10.0, 1.5, 100.0, None).is_err());
    }

    #[test]
    fn test_total_nri_is_order_independent() {
        let mut deal = DealInputs::new("Test", "Appalachia", "APPA_113");
        let a = Tract::new(18.0, 0.20, 234.2, None).unwrap();
        let b = Tract::new(40.0, 0.125, 640.0, None).unwrap();
        deal.participation_nri = 0.01;

        deal.tracts = vec![a.clone(), b.clone()];
        let forward = deal.total_nri();
        deal.tracts = vec![b.clone(), a.clone()];
        let reversed = deal.total_nri();

        assert_relative_eq!(forward, reversed, max_relative = 1e-15);
        assert_relative_eq!(forward, a.nri() + b.nri() + 0.01, max_relative = 1e-15);
    }

    #[test]
    fn test_total_nri_tracks_tract_changes() {
        let mut deal = DealInputs::new("Test", "Appalachia", "APPA_113");
        assert_eq!(deal.total_nri(), 0.0);
        deal.tracts.push(Tract::new(18.0, 0.20, 234.2, None).unwrap());
        let one = deal.total_nri();
        deal.tracts.push(Tract::new(18.0, 0.20, 234.2, None).unwrap());
        assert_relative_eq!(deal.total_nri(), 2.0 * one, max_relative = 1e-15);
    }

    #[test]
    fn test_ngl_price_derivation() {
        let deal = DealInputs::new("Test", "Appalachia", "APPA_113").finalize().unwrap();
        assert!(deal.ngl_price_derived());
        assert_relative_eq!(deal.ngl_price_per_bbl, 61.0 * 0.33, max_relative = 1e-12);
        assert_relative_eq!(deal.ngl_price_for_oil(80.0), 80.0 * 0.33, max_relative = 1e-12);

        let mut explicit = DealInputs::new("Test", "Appalachia", "APPA_113");
        explicit.ngl_price_per_bbl = 25.0;
        let explicit = explicit.finalize().unwrap();
        assert!(!explicit.ngl_price_derived());
        assert_eq!(explicit.ngl_price_for_oil(80.0), 25.0);
    }

    #[test]
    fn test_validation_fails_fast() {
        let mut deal = DealInputs::new("Test", "Appalachia", "APPA_113");
        deal.analysis_years = 0;
        assert!(matches!(deal.validate(), Err(EvalError::EmptyHorizon { years: 0 })));

        let mut deal = DealInputs::new("Test", "Appalachia", "APPA_113");
        deal.monthly_gross_gas_volumes = vec![1.0, f64::NAN];
        assert!(matches!(
            deal.validate(),
            Err(EvalError::InvalidDeal { field: "monthly_gross_gas_volumes", .. })
        ));

        let mut deal = DealInputs::new("Test", "Appalachia", "APPA_113");
        deal.ad_valorem_tax_pct = 1.5;
        assert!(deal.validate().is_err());
    }

    #[test]
    fn test_oversized_horizon_rejected() {
        let mut deal = DealInputs::new("Test", "Appalachia", "APPA_113");
        deal.analysis_years = u32::MAX;
        assert_eq!(deal.horizon_months(), u32::MAX);
        assert!(matches!(
            deal.validate(),
            Err(EvalError::InvalidDeal { field: "analysis_years", .. })
        ));

        deal.analysis_years = MAX_ANALYSIS_YEARS;
        assert!(deal.validate().is_ok());
    }

    #[test]
    fn test_unfinalized_zero_ngl_price_tracks_oil() {
        let deal = DealInputs::new("Test", "Appalachia", "APPA_113");
        assert!(!deal.ngl_price_derived());
        assert_relative_eq!(deal.ngl_price_for_oil(61.0), 61.0 * 0.33, max_relative = 1e-12);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let once = DealInputs::new("Test", "Appalachia", "APPA_113").finalize().unwrap();
        let twice = once.clone().finalize().unwrap();
        assert_eq!(twice.ngl_price_per_bbl, once.ngl_price_per_bbl);
        assert!(twice.ngl_price_derived());
    }

    #[test]
    fn test_derived_quantities() {
        let deal = DealInputs::new("Test", "Appalachia", "APPA_113");
        assert_eq!(deal.horizon_months(), 600);
        assert_eq!(deal.ramp_duration_months(), 12);
        assert_relative_eq!(deal.total_capex(), 70_000.0);
    }
}
