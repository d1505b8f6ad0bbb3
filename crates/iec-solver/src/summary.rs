use std::f64::consts::PI;

use iec_core::IecError;
use serde::{Deserialize, Serialize};

use crate::state::EquilibriumState;

/// Scalar summary statistics of one equilibrium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSummary {
    /// `L / k` for the strongest non-DC Fourier mode of the deflection.
    pub dominant_wavelength: f64,
    /// `max |θ|`, rad.
    pub angular_amplitude: f64,
    /// Largest distance of a node from its undeformed position, m.
    pub max_node_displacement: f64,
    pub tip_deflection: f64,
    pub kappa_min: f64,
    pub kappa_max: f64,
}

pub fn summarize(state: &EquilibriumState) -> Result<StateSummary, IecError> {
    let s = state.s();
    let (kappa_min, kappa_max) = state
        .kappa()
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &k| {
            (lo.min(k), hi.max(k))
        });
    let max_node_displacement = s
        .iter()
        .zip(state.x().iter().zip(state.y()))
        .map(|(si, (xi, yi))| ((xi - si).powi(2) + yi.powi(2)).sqrt())
        .fold(0.0, f64::max);
    Ok(StateSummary {
        dominant_wavelength: dominant_wavelength(s, state.y()),
        angular_amplitude: state.theta().iter().fold(0.0, |acc, t| acc.max(t.abs())),
        max_node_displacement,
        tip_deflection: state.y()[state.len() - 1],
        kappa_min,
        kappa_max,
    })
}

/// Dominant wavelength of `values` over the span of `s`.
///
/// The profile is resampled onto a uniform grid of the same size, its mean is
/// removed, and the strongest bin `k ≥ 1` of a direct DFT gives `span / k`.
/// A flat profile reports the span itself.
pub fn dominant_wavelength(s: &[f64], values: &[f64]) -> f64 {
    let n = s.len();
    let span = s[n - 1] - s[0];
    let uniform: Vec<f64> = (0..n)
        .map(|i| {
            let t = s[0] + span * i as f64 / (n - 1) as f64;
            linear(s, values, t)
        })
        .collect();
    let mean = uniform.iter().sum::<f64>() / n as f64;
    let centred: Vec<f64> = uniform.iter().map(|v| v - mean).collect();

    let mut best = (1usize, 0.0f64);
    for k in 1..=n / 2 {
        let (mut re, mut im) = (0.0, 0.0);
        for (j, v) in centred.iter().enumerate() {
            let phase = 2.0 * PI * (k * j) as f64 / n as f64;
            re += v * phase.cos();
            im -= v * phase.sin();
        }
        let power = re * re + im * im;
        if power > best.1 {
            best = (k, power);
        }
    }
    span / best.0 as f64
}

fn linear(s: &[f64], values: &[f64], t: f64) -> f64 {
    let k = crate::interp::locate(s, t);
    let u = ((t - s[k]) / (s[k + 1] - s[k])).clamp(0.0, 1.0);
    values[k] + u * (values[k + 1] - values[k])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_injected_mode() {
        let n = 128;
        let s: Vec<f64> = (0..n).map(|i| i as f64 / (n - 1) as f64 * 2.0).collect();
        let values: Vec<f64> = s
            .iter()
            .map(|x| (2.0 * PI * 4.0 * x / 2.0).sin() + 0.1 * (2.0 * PI * x / 2.0).sin())
            .collect();
        let wavelength = dominant_wavelength(&s, &values);
        assert!((wavelength - 0.5).abs() < 1e-12);
    }

    #[test]
    fn flat_profile_reports_span() {
        let s: Vec<f64> = (0..10).map(|i| i as f64 / 10.0).collect();
        assert_eq!(dominant_wavelength(&s, &[3.0; 10]), 0.9);
    }
}
