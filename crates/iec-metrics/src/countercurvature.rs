use iec_core::{ensure_finite, IecError};
use iec_field::{trapezoid, InformationField};

// Below this range the field is treated as constant.
const FLAT_EPS: f64 = 1e-14;

/// Conformal factor `g_eff(s) = exp(2φ(s))` with
/// `φ = β₁·Î_centred + β₂·(dI/ds)/max|dI/ds|`.
///
/// `Î` is the field normalised to `[0, 1]` and centred on its arc-length
/// mean. A constant field contributes no `β₁` term and a zero gradient no
/// `β₂` term, so the metric degenerates to 1.
pub fn countercurvature_metric(
    field: &InformationField,
    beta1: f64,
    beta2: f64,
) -> Result<Vec<f64>, IecError> {
    let phi = potential(field, beta1, beta2)?;
    let metric: Vec<f64> = phi.iter().map(|p| (2.0 * p).exp()).collect();
    ensure_finite("countercurvature metric", &metric)?;
    Ok(metric)
}

/// The potential `φ(s)` behind [`countercurvature_metric`].
///
/// The centring mean is the trapezoid arc-length mean `∫ Î ds / L`, not the
/// plain average of the nodal values, so `∫ β₁ (Î − mean) ds = 0` on any
/// grid, non-uniform ones included.
pub fn potential(field: &InformationField, beta1: f64, beta2: f64) -> Result<Vec<f64>, IecError> {
    let s = field.s();
    let (lo, hi) = field.value_range();
    let range = hi - lo;
    let normalised: Vec<f64> = if range > FLAT_EPS * (1.0 + hi.abs()) {
        field.values().iter().map(|v| (v - lo) / range).collect()
    } else {
        vec![0.0; field.len()]
    };
    let mean = trapezoid(s, &normalised)? / (s[s.len() - 1] - s[0]);
    let peak = field.max_abs_gradient();
    let phi = normalised
        .iter()
        .zip(field.gradient())
        .map(|(n, g)| {
            let grad = if peak > 0.0 { g / peak } else { 0.0 };
            beta1 * (n - mean) + beta2 * grad
        })
        .collect();
    Ok(phi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use iec_core::Grid;

    #[test]
    fn constant_field_gives_unit_metric() {
        let grid = Grid::uniform(1.0, 11).unwrap();
        let field = InformationField::from_fn(&grid, |_| 4.0).unwrap();
        let g = countercurvature_metric(&field, 1.0, 1.0).unwrap();
        assert!(g.iter().all(|v| (*v - 1.0).abs() < 1e-15));
    }

    #[test]
    fn linear_field_is_centred() {
        let grid = Grid::uniform(1.0, 11).unwrap();
        let field = InformationField::from_fn(&grid, |s| 2.0 * s).unwrap();
        let phi = potential(&field, 1.0, 0.0).unwrap();
        assert!((phi[0] + 0.5).abs() < 1e-12);
        assert!((phi[10] - 0.5).abs() < 1e-12);
        let g = countercurvature_metric(&field, 1.0, 0.0).unwrap();
        assert!((g[10] - 1f64.exp()).abs() < 1e-12);
    }

    #[test]
    fn centring_uses_the_arc_length_mean() {
        let grid = Grid::new(vec![0.0, 0.1, 0.2, 1.0]).unwrap();
        let field = InformationField::from_fn(&grid, |s| s * s).unwrap();
        let phi = potential(&field, 1.0, 0.0).unwrap();
        assert!(trapezoid(grid.as_slice(), &phi).unwrap().abs() < 1e-12);
        // The nodal average would be 0.2625.
        assert!((phi[0] + 0.419).abs() < 1e-12);
    }

    #[test]
    fn gradient_term_is_peak_normalised() {
        let grid = Grid::uniform(1.0, 11).unwrap();
        let field = InformationField::from_fn(&grid, |s| 3.0 * s).unwrap();
        let phi = potential(&field, 0.0, 0.25).unwrap();
        assert!(phi.iter().all(|p| (p - 0.25).abs() < 1e-12));
    }
}
