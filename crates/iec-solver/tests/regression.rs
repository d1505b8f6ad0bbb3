use iec_core::{IecError, LoadSpec, Parameters, SupportType};
use iec_solver::analytical::DEFAULT_REGRESSION_TOLERANCE;
use iec_solver::{regression_check, AnalyticalSolver, SolverOptions};

fn uncoupled(loads: LoadSpec) -> Parameters {
    Parameters::builder().loads(loads).build().unwrap()
}

#[test]
fn cantilever_tip_load_matches_closed_form() {
    let params = uncoupled(LoadSpec::default());
    let report = regression_check(
        &params,
        SupportType::Cantilever,
        &SolverOptions::default(),
        DEFAULT_REGRESSION_TOLERANCE,
    )
    .unwrap();
    assert!(report.theta_l2 < 1e-3, "{report:?}");
    assert!(report.kappa_linf < 1e-3, "{report:?}");
}

#[test]
fn cantilever_combined_load_matches_closed_form() {
    let params = uncoupled(LoadSpec {
        tip_load: 0.5,
        distributed_load: 4.0,
        ..LoadSpec::default()
    });
    let report = regression_check(
        &params,
        SupportType::Cantilever,
        &SolverOptions::default(),
        DEFAULT_REGRESSION_TOLERANCE,
    )
    .unwrap();
    assert!(report.worst() < DEFAULT_REGRESSION_TOLERANCE);
}

#[test]
fn pinned_uniform_load_matches_closed_form() {
    let params = uncoupled(LoadSpec {
        tip_load: 0.0,
        distributed_load: 5.0,
        ..LoadSpec::default()
    });
    let report = regression_check(
        &params,
        SupportType::PinnedPinned,
        &SolverOptions::default(),
        DEFAULT_REGRESSION_TOLERANCE,
    )
    .unwrap();
    assert!(report.worst() < DEFAULT_REGRESSION_TOLERANCE, "{report:?}");
}

#[test]
fn pinned_midspan_point_load_matches_closed_form() {
    let params = uncoupled(LoadSpec {
        tip_load: 2.0,
        distributed_load: 1.0,
        ..LoadSpec::default()
    });
    let report = regression_check(
        &params,
        SupportType::PinnedPinned,
        &SolverOptions::default(),
        DEFAULT_REGRESSION_TOLERANCE,
    )
    .unwrap();
    assert!(report.worst() < DEFAULT_REGRESSION_TOLERANCE, "{report:?}");
}

#[test]
fn oracle_refuses_any_nonzero_coupling() {
    for params in [
        Parameters::builder().chi_kappa(0.01).build().unwrap(),
        Parameters::builder().chi_e(-0.1).build().unwrap(),
        Parameters::builder().chi_c(0.1).build().unwrap(),
        Parameters::builder().chi_f(0.2).build().unwrap(),
    ] {
        let err = regression_check(
            &params,
            SupportType::Cantilever,
            &SolverOptions::default(),
            DEFAULT_REGRESSION_TOLERANCE,
        )
        .unwrap_err();
        assert!(matches!(err, IecError::AnalyticalPrecondition(_)));
        assert!(AnalyticalSolver::solve(&params, SupportType::PinnedPinned).is_err());
    }
}
