use iec_core::{check_monotone, ensure_finite, ensure_same_len, ErrorInfo, IecError};
use iec_field::trapezoid;
use serde::{Deserialize, Serialize};

/// Regulariser in the denominator of the normalised deviation. Small on
/// purpose: `d_geo_norm` diverges as the reference energy collapses.
pub const GEODESIC_EPS: f64 = 1e-12;

/// Weighted distance between two curvature profiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodesicDeviation {
    /// `∫ g (κ_b − κ_a)² ds`.
    pub d_squared: f64,
    /// `√max(D², 0)`.
    pub d_geo: f64,
    /// `D / (√E_ref + ε)`.
    pub d_geo_norm: f64,
    /// `E_ref = ∫ g κ_a² ds`.
    pub reference_energy: f64,
}

pub fn geodesic_deviation(
    s: &[f64],
    kappa_a: &[f64],
    kappa_b: &[f64],
    g_eff: &[f64],
) -> Result<GeodesicDeviation, IecError> {
    check_monotone(s)?;
    ensure_same_len("kappa_a", s.len(), kappa_a.len())?;
    ensure_same_len("kappa_b", s.len(), kappa_b.len())?;
    ensure_same_len("metric weight", s.len(), g_eff.len())?;
    ensure_finite("kappa_a", kappa_a)?;
    ensure_finite("kappa_b", kappa_b)?;
    ensure_finite("metric weight", g_eff)?;
    if let Some(index) = g_eff.iter().position(|g| *g < 0.0) {
        return Err(IecError::ParameterRange(
            ErrorInfo::new("negative-weight", "metric weight must be non-negative")
                .with_context("index", index)
                .with_context("value", g_eff[index]),
        ));
    }

    let weighted_diff: Vec<f64> = (0..s.len())
        .map(|i| g_eff[i] * (kappa_b[i] - kappa_a[i]).powi(2))
        .collect();
    let weighted_ref: Vec<f64> = (0..s.len()).map(|i| g_eff[i] * kappa_a[i].powi(2)).collect();
    let d_squared = trapezoid(s, &weighted_diff)?;
    let reference_energy = trapezoid(s, &weighted_ref)?;
    let d_geo = d_squared.max(0.0).sqrt();
    Ok(GeodesicDeviation {
        d_squared,
        d_geo,
        d_geo_norm: d_geo / (reference_energy.max(0.0).sqrt() + GEODESIC_EPS),
        reference_energy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_offset_has_closed_form() {
        let s: Vec<f64> = (0..=10).map(|i| i as f64 / 10.0).collect();
        let a = vec![1.0; 11];
        let b = vec![1.5; 11];
        let g = vec![4.0; 11];
        let dev = geodesic_deviation(&s, &a, &b, &g).unwrap();
        assert!((dev.d_squared - 1.0).abs() < 1e-12);
        assert!((dev.reference_energy - 4.0).abs() < 1e-12);
        assert!((dev.d_geo_norm - 0.5).abs() < 1e-9);
    }

    #[test]
    fn vanishing_reference_diverges() {
        let s = [0.0, 0.5, 1.0];
        let dev = geodesic_deviation(&s, &[0.0; 3], &[1e-3; 3], &[1.0; 3]).unwrap();
        assert!(dev.d_geo_norm > 1e8);
    }

    #[test]
    fn negative_weight_is_rejected() {
        let s = [0.0, 0.5, 1.0];
        let err = geodesic_deviation(&s, &[0.0; 3], &[0.0; 3], &[1.0, -1.0, 1.0]).unwrap_err();
        assert!(matches!(err, IecError::ParameterRange(_)));
    }
}
