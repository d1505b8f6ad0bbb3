use iec_core::{Grid, IecError};
use iec_field::InformationField;
use iec_metrics::{countercurvature_metric, geodesic_deviation};
use proptest::prelude::*;

fn profile(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-5.0f64..5.0, len)
}

proptest! {
    #[test]
    fn deviation_from_itself_vanishes(kappa in profile(24), weight in prop::collection::vec(0.0f64..4.0, 24)) {
        let s: Vec<f64> = (0..24).map(|i| i as f64 / 23.0).collect();
        let dev = geodesic_deviation(&s, &kappa, &kappa, &weight).unwrap();
        prop_assert_eq!(dev.d_squared, 0.0);
        prop_assert_eq!(dev.d_geo, 0.0);
        prop_assert_eq!(dev.d_geo_norm, 0.0);
    }

    #[test]
    fn deviation_scales_linearly(
        kappa in profile(16),
        delta in profile(16),
        eps in -2.0f64..2.0,
    ) {
        let s: Vec<f64> = (0..16).map(|i| 0.4 * i as f64 / 15.0).collect();
        let g = vec![1.5; 16];
        let perturbed: Vec<f64> = kappa.iter().zip(&delta).map(|(k, d)| k + eps * d).collect();
        let unit: Vec<f64> = kappa.iter().zip(&delta).map(|(k, d)| k + d).collect();
        let scaled = geodesic_deviation(&s, &kappa, &perturbed, &g).unwrap();
        let base = geodesic_deviation(&s, &kappa, &unit, &g).unwrap();
        prop_assert!((scaled.d_geo - eps.abs() * base.d_geo).abs() <= 1e-9 * (1.0 + base.d_geo));
    }

    #[test]
    fn countercurvature_metric_is_positive(
        amplitude in 0.1f64..3.0,
        beta1 in -1.0f64..1.0,
        beta2 in -1.0f64..1.0,
    ) {
        let grid = Grid::uniform(0.4, 60).unwrap();
        let field = InformationField::from_fn(&grid, |s| amplitude * (10.0 * s).sin()).unwrap();
        let g = countercurvature_metric(&field, beta1, beta2).unwrap();
        prop_assert!(g.iter().all(|v| *v > 0.0 && v.is_finite()));
        // |φ| ≤ |β₁| + |β₂| bounds the metric.
        let bound = (2.0 * (beta1.abs() + beta2.abs())).exp();
        prop_assert!(g.iter().all(|v| *v <= bound * (1.0 + 1e-12) && *v >= (1.0 - 1e-12) / bound));
    }
}

#[test]
fn mismatched_profiles_are_rejected() {
    let s = [0.0, 0.5, 1.0];
    let err = geodesic_deviation(&s, &[0.0; 3], &[0.0; 2], &[1.0; 3]).unwrap_err();
    assert!(matches!(err, IecError::ShapeMismatch(_)));
}
