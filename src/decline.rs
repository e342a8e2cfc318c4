//! Arps decline-curve model
//!
//! Rates are per day, time is in years and decline rates are nominal annual.
//! Used to synthesise a monthly production profile when a deal carries an
//! initial rate instead of a type-curve volume series.

use crate::deal::DeclineType;

/// Days per year used for daily integration
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Average days per month used when converting daily rates to monthly volumes
pub const DAYS_PER_MONTH: f64 = DAYS_PER_YEAR / 12.0;

const EUR_MAX_ITERATIONS: usize = 20;
const EUR_RELATIVE_TOLERANCE: f64 = 0.001;

/// Exponential decline: q(t) = q0 * exp(-Di * t)
pub fn exponential_decline(q0: f64, di: f64, t: f64) -> f64 {
    q0 * (-di * t).exp()
}

/// Hyperbolic decline: q(t) = q0 * (1 + b*Di*t)^(-1/b)
///
/// A b-factor of zero is the exponential limit.
pub fn hyperbolic_decline(q0: f64, di: f64, b: f64, t: f64) -> f64 {
    if b == 0.0 {
        return exponential_decline(q0, di, t);
    }
    q0 * (1.0 + b * di * t).powf(-1.0 / b)
}

/// Harmonic decline: q(t) = q0 / (1 + Di*t)
pub fn harmonic_decline(q0: f64, di: f64, t: f64) -> f64 {
    q0 / (1.0 + di * t)
}

/// Rate at time t for the given decline type
pub fn rate_at(kind: DeclineType, q0: f64, di: f64, b: f64, t: f64) -> f64 {
    match kind {
        DeclineType::Exponential => exponential_decline(q0, di, t),
        DeclineType::Hyperbolic => hyperbolic_decline(q0, di, b, t),
        DeclineType::Harmonic => harmonic_decline(q0, di, t),
    }
}

/// Recover the initial rate that yields `eur` over `well_life_years`
///
/// Exponential decline uses the closed form `q0 = EUR * Di / (1 - exp(-Di*T))`
/// (a rate per year), falling back to a flat daily rate when `Di <= 0` or the
/// factor underflows. Hyperbolic and harmonic decline rescale a flat daily
/// guess against a daily simulation until the cumulative volume is within
/// 0.1% of the target. [`DeclineSpec::initial_daily_rate`] normalises all
/// branches to a daily rate.
pub fn eur_to_initial_rate(
    eur: f64,
    di: f64,
    kind: DeclineType,
    well_life_years: u32,
    b: f64,
) -> f64 {
    let life_days = well_life_years as f64 * DAYS_PER_YEAR;
    if life_days <= 0.0 {
        return 0.0;
    }
    let flat_rate = eur / life_days;

    match kind {
        DeclineType::Exponential => {
            if di > 0.0 {
                let factor = 1.0 - (-di * well_life_years as f64).exp();
                if factor > 0.0 {
                    return eur * di / factor;
                }
            }
            flat_rate
        }
        DeclineType::Hyperbolic | DeclineType::Harmonic => {
            let days = well_life_years as usize * DAYS_PER_YEAR as usize;
            let mut q0 = flat_rate;

            for iteration in 0..EUR_MAX_ITERATIONS {
                let cumulative: f64 = (0..days)
                    .map(|day| rate_at(kind, q0, di, b, day as f64 / DAYS_PER_YEAR))
                    .sum();

                if cumulative <= 0.0 {
                    break;
                }

                let ratio = eur / cumulative;
                q0 *= ratio;
                if (ratio - 1.0).abs() < EUR_RELATIVE_TOLERANCE {
                    log::debug!("EUR inversion converged after {} iterations", iteration + 1);
                    break;
                }
            }

            q0
        }
    }
}

/// A decline specification with an optional terminal (modified hyperbolic) switch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeclineSpec {
    pub kind: DeclineType,
    /// Nominal annual initial decline
    pub initial_decline: f64,
    /// Arps b-factor (hyperbolic only)
    pub b_factor: f64,
    /// Nominal annual decline at which the curve turns exponential
    pub terminal_decline: f64,
}

impl DeclineSpec {
    /// Time in years at which the instantaneous decline reaches terminal
    ///
    /// None for exponential curves or when the terminal rate is not below
    /// the initial decline.
    pub fn switch_time(&self) -> Option<f64> {
        let di = self.initial_decline;
        let dt = self.terminal_decline;
        if dt <= 0.0 || di <= 0.0 || dt >= di {
            return None;
        }

        let b = match self.kind {
            DeclineType::Exponential => return None,
            DeclineType::Hyperbolic => self.b_factor,
            DeclineType::Harmonic => 1.0,
        };
        if b <= 0.0 {
            return None;
        }

        // D(t) = Di / (1 + b*Di*t)
        Some((di / dt - 1.0) / (b * di))
    }

    /// Daily rate at time t (years) including the terminal switch
    pub fn rate(&self, q0: f64, t: f64) -> f64 {
        let di = self.initial_decline;
        match self.switch_time() {
            Some(t_switch) if t > t_switch => {
                let q_switch = rate_at(self.kind, q0, di, self.b_factor, t_switch);
                exponential_decline(q_switch, self.terminal_decline, t - t_switch)
            }
            _ => rate_at(self.kind, q0, di, self.b_factor, t),
        }
    }

    /// Initial daily rate that recovers `eur` over the well life
    ///
    /// Ignores the terminal switch, like [`eur_to_initial_rate`].
    pub fn initial_daily_rate(&self, eur: f64, well_life_years: u32) -> f64 {
        let di = self.initial_decline;
        match self.kind {
            DeclineType::Exponential if di > 0.0 => {
                let factor = 1.0 - (-di * well_life_years as f64).exp();
                if factor > 0.0 {
                    eur * di / factor / DAYS_PER_YEAR
                } else {
                    eur_to_initial_rate(eur, di, self.kind, well_life_years, self.b_factor)
                }
            }
            _ => eur_to_initial_rate(eur, di, self.kind, well_life_years, self.b_factor),
        }
    }

    /// Monthly volumes (rate units × days) for `months` months
    ///
    /// Each month is valued at its mid-point rate over an average month.
    pub fn monthly_volumes(&self, q0: f64, months: u32) -> Vec<f64> {
        (0..months)
            .map(|m| {
                let t = (m as f64 + 0.5) / 12.0;
                self.rate(q0, t) * DAYS_PER_MONTH
            })
            .collect()
    }
}
