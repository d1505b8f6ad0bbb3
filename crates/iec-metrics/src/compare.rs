use iec_core::{ensure_finite, ensure_same_len, IecError};
use iec_field::InformationField;
use iec_solver::summary::dominant_wavelength;
use iec_solver::EquilibriumState;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::countercurvature::countercurvature_metric;
use crate::energy::{
    centerline_energy_difference, curvature_energy_difference, metric_deviation, node_drift,
    same_grid,
};
use crate::geodesic::{geodesic_deviation, GeodesicDeviation};

/// Weight `g_eff(s)` used by [`compare`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MetricWeight {
    #[default]
    Uniform,
    /// Countercurvature metric of the second state's information field.
    Countercurvature { beta1: f64, beta2: f64 },
    Custom { values: Vec<f64> },
}

impl MetricWeight {
    /// Resolves the weight on the grid of `reference`.
    pub fn resolve(&self, reference: &EquilibriumState) -> Result<Vec<f64>, IecError> {
        match self {
            MetricWeight::Uniform => Ok(vec![1.0; reference.len()]),
            MetricWeight::Countercurvature { beta1, beta2 } => {
                let field = InformationField::from_samples(
                    reference.grid(),
                    reference.information().to_vec(),
                    Some(reference.information_gradient().to_vec()),
                )?;
                countercurvature_metric(&field, *beta1, *beta2)
            }
            MetricWeight::Custom { values } => {
                ensure_same_len("custom metric weight", reference.len(), values.len())?;
                ensure_finite("custom metric weight", values)?;
                Ok(values.clone())
            }
        }
    }
}

/// Scalar diagnostics of `b` relative to `a`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMetrics {
    pub geodesic: GeodesicDeviation,
    /// Bending energy of `b` minus that of `a`, J.
    pub curvature_energy_difference: f64,
    pub centerline_energy_difference: f64,
    pub metric_deviation: f64,
    pub max_node_drift_mm: f64,
    pub mean_node_drift_mm: f64,
    pub wavelength_a: f64,
    pub wavelength_b: f64,
    pub amplitude_a: f64,
    pub amplitude_b: f64,
}

impl ComparisonMetrics {
    /// `(λ_b − λ_a) / λ_a`.
    pub fn wavelength_change(&self) -> f64 {
        (self.wavelength_b - self.wavelength_a) / self.wavelength_a
    }

    /// `(A_b − A_a) / A_a`, or 0 when both amplitudes vanish.
    pub fn amplitude_change(&self) -> f64 {
        if self.amplitude_a == 0.0 {
            if self.amplitude_b == 0.0 {
                return 0.0;
            }
            return f64::INFINITY;
        }
        (self.amplitude_b - self.amplitude_a) / self.amplitude_a
    }
}

fn amplitude(state: &EquilibriumState) -> f64 {
    state.theta().iter().fold(0.0, |acc, t| acc.max(t.abs()))
}

/// Compares two equilibria defined on the same grid.
pub fn compare(
    a: &EquilibriumState,
    b: &EquilibriumState,
    weight: &MetricWeight,
) -> Result<ComparisonMetrics, IecError> {
    same_grid(a, b)?;
    let g_eff = weight.resolve(b)?;
    let geodesic = geodesic_deviation(a.s(), a.kappa(), b.kappa(), &g_eff)?;
    let drift = node_drift(a, b)?;
    let metrics = ComparisonMetrics {
        geodesic,
        curvature_energy_difference: curvature_energy_difference(a, b)?,
        centerline_energy_difference: centerline_energy_difference(a, b)?,
        metric_deviation: metric_deviation(a.s(), &g_eff)?,
        max_node_drift_mm: drift.max * 1e3,
        mean_node_drift_mm: drift.mean * 1e3,
        wavelength_a: dominant_wavelength(a.s(), a.y()),
        wavelength_b: dominant_wavelength(b.s(), b.y()),
        amplitude_a: amplitude(a),
        amplitude_b: amplitude(b),
    };
    debug!(
        d_geo = metrics.geodesic.d_geo,
        d_geo_norm = metrics.geodesic.d_geo_norm,
        drift_mm = metrics.max_node_drift_mm,
        "compared equilibria"
    );
    Ok(metrics)
}
