use iec_core::{FieldShape, Grid, Parameters, SupportType};
use iec_solver::analytical::cantilever;
use iec_solver::{governing_residual, solve};
use proptest::prelude::*;

proptest! {
    // κ is linear under a pure tip load, so the trapezoid form is exact.
    #[test]
    fn tip_loaded_oracle_has_no_defect(
        p in -50.0f64..50.0,
        ei in 0.5f64..20.0,
        n in 4usize..300,
    ) {
        prop_assume!(p.abs() > 1e-3);
        let grid = Grid::uniform(0.4, n).unwrap();
        let profile = cantilever(&grid, p, 0.0, ei);
        let r = governing_residual(&grid, &profile.theta, &profile.kappa).unwrap();
        prop_assert!(r < 1e-9, "residual {}", r);
    }

    #[test]
    fn residual_ignores_overall_scale(
        q in 0.1f64..50.0,
        scale in 1e-3f64..1e3,
        n in 4usize..200,
    ) {
        let grid = Grid::uniform(0.4, n).unwrap();
        let profile = cantilever(&grid, 0.0, q, 1.0);
        let theta: Vec<f64> = profile.theta.iter().map(|t| t * scale).collect();
        let kappa: Vec<f64> = profile.kappa.iter().map(|k| k * scale).collect();
        let base = governing_residual(&grid, &profile.theta, &profile.kappa).unwrap();
        let scaled = governing_residual(&grid, &theta, &kappa).unwrap();
        prop_assert!((base - scaled).abs() <= 1e-9 * (1.0 + base));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn step_coupled_rods_pass_validation(
        chi_kappa in 0.0f64..=0.1,
        chi_f in -1.0f64..=1.0,
        chi_e in -0.5f64..=0.5,
        center in 0.05f64..0.35,
        pinned in any::<bool>(),
    ) {
        let params = Parameters::builder()
            .n_nodes(120)
            .chi_kappa(chi_kappa)
            .chi_f(chi_f)
            .chi_e(chi_e)
            .field_shape(FieldShape::Step { amplitude: 1.0, center })
            .build()
            .unwrap();
        let support = if pinned {
            SupportType::PinnedPinned
        } else {
            SupportType::Cantilever
        };
        let state = solve(&params, support);
        prop_assert!(state.is_ok(), "{:?}", state.err());
    }
}
