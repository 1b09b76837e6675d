//! Harmonic-oscillator thermodynamics over vibrational frequency columns.
//!
//! All results are molar, in J/mol, with frequencies converted to Hz first.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::PhysicalConstants;
use crate::error::{DomainError, SimtabError};

// ---------------------------------------------------------------------------
// Temperature grid
// ---------------------------------------------------------------------------

/// Upper bound on the number of grid points.
pub const MAX_GRID_POINTS: usize = 1_000_000;

/// Inclusive `start..=stop` grid with a fixed step, in K.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureGrid {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl TemperatureGrid {
    pub fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    /// Grid points. Each is `start + i * step`, so no drift accumulates.
    pub fn points(&self) -> Result<Vec<f64>, SimtabError> {
        let Self { start, stop, step } = *self;
        if !(start.is_finite() && stop.is_finite() && step.is_finite()) {
            return Err(SimtabError::Config(format!("temperature grid {self} is not finite")));
        }
        if step <= 0.0 {
            return Err(SimtabError::Config(format!("temperature grid step must be positive, got {step}")));
        }
        if stop < start {
            return Err(SimtabError::Config(format!("temperature grid stop {stop} is below start {start}")));
        }
        // Tolerate stop landing a hair off a multiple of step.
        let count = ((stop - start) / step + 1e-9).floor() + 1.0;
        if !count.is_finite() || count > MAX_GRID_POINTS as f64 {
            return Err(SimtabError::Config(format!(
                "temperature grid {self} has more than {MAX_GRID_POINTS} points"
            )));
        }
        let n = count as usize;
        Ok((0..n).map(|i| start + i as f64 * step).collect())
    }
}

impl std::fmt::Display for TemperatureGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.start, self.stop, self.step)
    }
}

/// `start:stop:step`, e.g. `0:1000:50`.
impl FromStr for TemperatureGrid {
    type Err = SimtabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        let bad = || SimtabError::Config(format!("bad temperature grid '{s}', expected start:stop:step"));
        let [start, stop, step] = parts.as_slice() else {
            return Err(bad());
        };
        let num = |v: &str| v.parse::<f64>().map_err(|_| bad());
        Ok(Self::new(num(*start)?, num(*stop)?, num(*step)?))
    }
}

// ---------------------------------------------------------------------------
// Closed-form reductions
// ---------------------------------------------------------------------------

/// Zero-point energy `Σν · N_A · h · ½` from a frequency sum in Hz.
pub fn zero_point_energy(frequency_sum_hz: f64, constants: &PhysicalConstants) -> f64 {
    frequency_sum_hz * constants.avogadro * constants.planck * 0.5
}

fn check_temperature(quantity: &str, column: usize, temperature: f64) -> Result<(), DomainError> {
    if temperature.is_finite() && temperature > 0.0 {
        Ok(())
    } else {
        Err(DomainError::new(quantity, column, "temperature must be positive").at_temperature(temperature))
    }
}

fn finite(quantity: &str, column: usize, temperature: f64, value: f64) -> Result<f64, DomainError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::new(quantity, column, "result is not finite").at_temperature(temperature))
    }
}

/// Helmholtz vibrational free energy of the quantum harmonic oscillator:
///
/// `F(T) = ZPE + N_A k_B T Σ ln(1 − exp(−hν / k_B T))`
pub fn helmholtz(
    frequencies_hz: &[f64],
    zpe: f64,
    temperature: f64,
    constants: &PhysicalConstants,
    column: usize,
) -> Result<f64, DomainError> {
    const NAME: &str = "helmholtz";
    check_temperature(NAME, column, temperature)?;

    let kt = constants.boltzmann * temperature;
    let mut log_sum = 0.0;
    for &nu in frequencies_hz {
        if nu <= 0.0 {
            return Err(DomainError::new(NAME, column, format!("non-positive frequency {nu:e} Hz"))
                .at_temperature(temperature));
        }
        let x = constants.planck * nu / kt;
        // ln(1 - e^-x) without cancellation for small x
        log_sum += (-(-x).exp_m1()).ln();
    }
    finite(
        NAME,
        column,
        temperature,
        zpe + constants.avogadro * kt * log_sum,
    )
}

/// Classical (high-temperature) limit of the vibrational free energy:
///
/// `F(T) = N_A k_B T Σ ln(hν / k_B T)`, evaluated from `Σ ln ν` and the mode count.
pub fn helmholtz_classical(
    mode_count: usize,
    sum_ln_hz: f64,
    min_frequency_hz: f64,
    temperature: f64,
    constants: &PhysicalConstants,
    column: usize,
) -> Result<f64, DomainError> {
    const NAME: &str = "helmholtz-classical";
    check_temperature(NAME, column, temperature)?;
    if min_frequency_hz <= 0.0 {
        return Err(DomainError::new(
            NAME,
            column,
            format!("log of non-positive frequency {min_frequency_hz:e} Hz"),
        )
        .at_temperature(temperature));
    }

    let kt = constants.boltzmann * temperature;
    let log_sum = sum_ln_hz + mode_count as f64 * (constants.planck / kt).ln();
    finite(NAME, column, temperature, constants.avogadro * kt * log_sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn grid_is_inclusive() {
        let pts = TemperatureGrid::new(0.0, 100.0, 25.0).points().unwrap();
        assert_eq!(pts, vec![0.0, 25.0, 50.0, 75.0, 100.0]);

        let pts = TemperatureGrid::new(0.0, 1.0, 0.1).points().unwrap();
        assert_eq!(pts.len(), 11);
        assert_relative_eq!(pts[10], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn grid_rejects_bad_steps() {
        assert!(TemperatureGrid::new(0.0, 100.0, 0.0).points().is_err());
        assert!(TemperatureGrid::new(0.0, 100.0, -5.0).points().is_err());
        assert!(TemperatureGrid::new(100.0, 0.0, 5.0).points().is_err());
        assert!("10:20".parse::<TemperatureGrid>().is_err());
        assert_eq!(
            "10:300:10".parse::<TemperatureGrid>().unwrap(),
            TemperatureGrid::new(10.0, 300.0, 10.0)
        );
    }

    #[test]
    fn grid_rejects_too_many_points() {
        assert!(TemperatureGrid::new(0.0, 1e20, 1e-20).points().is_err());
        assert!(TemperatureGrid::new(0.0, 1e12, 1.0).points().is_err());
        let pts = TemperatureGrid::new(1.0, MAX_GRID_POINTS as f64, 1.0).points().unwrap();
        assert_eq!(pts.len(), MAX_GRID_POINTS);
    }

    #[test]
    fn zero_temperature_is_domain_error() {
        let c = PhysicalConstants::default();
        let err = helmholtz(&[1.0e13], 0.0, 0.0, &c, 2).unwrap_err();
        assert_eq!(err.column, 2);
        assert_eq!(err.temperature, Some(0.0));

        assert!(helmholtz_classical(1, 30.0, 1.0e13, 0.0, &c, 2).is_err());
    }

    #[test]
    fn negative_frequency_is_domain_error() {
        let c = PhysicalConstants::default();
        let err = helmholtz(&[1.0e13, -2.0e12], 0.0, 300.0, &c, 4).unwrap_err();
        assert!(err.reason.contains("non-positive frequency"));
        assert!(helmholtz_classical(2, 30.0, -2.0e12, 300.0, &c, 4).is_err());
    }

    #[test]
    fn low_temperature_limit_is_zpe() {
        let c = PhysicalConstants::default();
        let freqs = [3.0e13, 5.0e13];
        let zpe = zero_point_energy(freqs.iter().sum(), &c);
        let f = helmholtz(&freqs, zpe, 1.0, &c, 1).unwrap();
        assert_relative_eq!(f, zpe, max_relative = 1e-12);
    }

    #[test]
    fn high_temperature_approaches_classical_limit() {
        let c = PhysicalConstants::default();
        let freqs = [1.0e11, 2.0e11];
        let zpe = zero_point_energy(freqs.iter().sum(), &c);
        let sum_ln: f64 = freqs.iter().map(|f| f.ln()).sum();
        let t = 5000.0;
        let quantum = helmholtz(&freqs, zpe, t, &c, 1).unwrap();
        let classical = helmholtz_classical(2, sum_ln, 1.0e11, t, &c, 1).unwrap();
        assert_relative_eq!(quantum, classical, max_relative = 1e-3);
    }
}
