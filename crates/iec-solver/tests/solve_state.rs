use iec_core::{FieldShape, Grid, IecError, Parameters, SupportType};
use iec_coupling::BaselineCurvature;
use iec_field::InformationField;
use iec_solver::{
    solve, solve_problem, summarize, EquilibriumProblem, EquilibriumState, SolverOptions,
    SOLVER_NAME,
};

fn default_params() -> Parameters {
    Parameters::builder().build().unwrap()
}

#[test]
fn passive_cantilever_state_is_consistent() {
    let params = default_params();
    let state = solve(&params, SupportType::Cantilever).unwrap();
    assert_eq!(state.len(), params.n_nodes());
    assert_eq!(state.theta().len(), state.x().len());
    assert_eq!(state.theta()[0], 0.0);
    let report = state.validation();
    assert!(report.bc_residual < 1e-8);
    assert!(report.governing_residual < 0.05);
    assert!(!report.energy_warning, "{report:?}");
    assert!(report.energy_relative_error < 0.05, "{report:?}");

    let ei = params.bending_stiffness();
    let l = params.length();
    let tip = state.theta()[state.len() - 1];
    assert!((tip - l * l / (2.0 * ei)).abs() / tip < 1e-3);

    assert_eq!(state.provenance().solver, SOLVER_NAME);
    assert_eq!(state.provenance().params_hash, params.content_hash().unwrap());
    assert_eq!(state.params(), &params);
}

#[test]
fn stiffness_bias_raises_amplitude() {
    let base = Parameters::builder()
        .field_shape(FieldShape::Constant { amplitude: 1.0 })
        .build()
        .unwrap();
    let soft = base.to_builder().chi_e(-0.25).build().unwrap();
    let a = summarize(&solve(&base, SupportType::Cantilever).unwrap()).unwrap();
    let b = summarize(&solve(&soft, SupportType::Cantilever).unwrap()).unwrap();
    let ratio = b.angular_amplitude / a.angular_amplitude;
    assert!((ratio - 4.0 / 3.0).abs() < 1e-3, "ratio {ratio}");
}

#[test]
fn active_moment_bends_an_unloaded_rod() {
    let params = Parameters::builder()
        .tip_load(0.0)
        .chi_f(0.5)
        .field_shape(FieldShape::Linear {
            offset: 0.0,
            gradient: 1.0,
        })
        .build()
        .unwrap();
    let state = solve(&params, SupportType::Cantilever).unwrap();
    // m ≡ 0 without load, so κ = −M/EI with M = χ_f · L_scale.
    let expected = -0.5 * params.length_scale() / params.bending_stiffness();
    for k in state.kappa() {
        assert!((k - expected).abs() < 1e-9);
    }
}

#[test]
fn step_field_passes_validation() {
    let params = Parameters::builder()
        .n_nodes(150)
        .chi_kappa(0.04)
        .field_shape(FieldShape::Step {
            amplitude: 1.0,
            center: 0.2,
        })
        .build()
        .unwrap();
    let state = solve(&params, SupportType::Cantilever).unwrap();
    assert!(state.validation().governing_residual < 0.5);
    let jump = state.theta()[state.len() - 1] - state.theta()[0];
    assert!(jump > 0.016);
}

fn strongly_coupled_step() -> Parameters {
    Parameters::builder()
        .length(0.4)
        .n_nodes(150)
        .chi_kappa(0.1)
        .chi_f(1.0)
        .chi_e(-0.5)
        .field_shape(FieldShape::Step {
            amplitude: 1.0,
            center: 0.2,
        })
        .build()
        .unwrap()
}

#[test]
fn strongly_coupled_step_solves_for_both_supports() {
    let params = strongly_coupled_step();
    for support in [SupportType::Cantilever, SupportType::PinnedPinned] {
        let state = solve(&params, support).unwrap();
        let residual = state.validation().governing_residual;
        assert!(residual < 0.25, "{support:?}: residual {residual}");
    }
}

#[test]
fn coarsest_pinned_grids_pass_validation() {
    for n in [4, 5] {
        let params = Parameters::builder().n_nodes(n).build().unwrap();
        let state = solve(&params, SupportType::PinnedPinned).unwrap();
        assert_eq!(state.len(), n);
        let residual = state.validation().governing_residual;
        assert!(residual < 0.25, "n = {n}: residual {residual}");
    }
}

#[test]
fn largest_valid_grid_fits_the_default_budget() {
    let params = Parameters::builder()
        .n_nodes(iec_core::bounds::MAX_NODES)
        .build()
        .unwrap();
    let state = solve(&params, SupportType::Cantilever).unwrap();
    assert_eq!(state.len(), iec_core::bounds::MAX_NODES);
}

#[test]
fn energy_mismatch_warns_without_failing() {
    let params = default_params();
    let opts = SolverOptions {
        energy_warn_threshold: 1e-9,
        ..SolverOptions::default()
    };
    let problem = EquilibriumProblem::new(params, SupportType::Cantilever).unwrap();
    let state = solve_problem(&problem, &opts).unwrap();
    let report = state.validation();
    assert!(report.energy_warning, "{report:?}");
    assert!(report.energy_relative_error > 1e-9);
}

#[test]
fn pinned_rod_returns_to_zero_angle() {
    let params = Parameters::builder()
        .chi_kappa(0.02)
        .field_shape(FieldShape::Gaussian {
            amplitude: 1.0,
            center: 0.1,
            width: 0.03,
        })
        .build()
        .unwrap();
    let state = solve(&params, SupportType::PinnedPinned).unwrap();
    assert!(state.theta()[0].abs() < 1e-4);
    assert!(state.theta()[state.len() - 1].abs() < 1e-4);
}

#[test]
fn external_field_and_baseline_are_honoured() {
    let params = Parameters::builder().chi_kappa(0.05).build().unwrap();
    let grid = Grid::uniform(params.length(), 61).unwrap();
    let field = InformationField::from_fn_with_derivative(&grid, |s| s * s, |s| 2.0 * s).unwrap();
    let problem = EquilibriumProblem::new(params, SupportType::Cantilever)
        .unwrap()
        .with_field(field)
        .unwrap()
        .with_baseline(BaselineCurvature::Sagittal {
            lordosis: 0.5,
            kyphosis: 0.8,
        });
    let state = solve_problem(&problem, &SolverOptions::default()).unwrap();
    assert_eq!(state.len(), 61);
    assert!(state.kappa_target().iter().any(|k| *k < 0.0));
}

#[test]
fn oversized_grid_is_a_convergence_error() {
    let params = Parameters::builder().n_nodes(400).build().unwrap();
    let opts = SolverOptions {
        max_nodes: 200,
        ..SolverOptions::default()
    };
    let problem = EquilibriumProblem::new(params, SupportType::Cantilever).unwrap();
    let err = solve_problem(&problem, &opts).unwrap_err();
    assert!(matches!(err, IecError::Convergence(_)));
    assert_eq!(err.info().code, "mesh-budget");
}

#[test]
fn unreachable_tolerance_exhausts_the_mesh_budget() {
    let params = Parameters::builder()
        .distributed_load(50.0)
        .chi_kappa(0.05)
        .field_shape(FieldShape::Gaussian {
            amplitude: 1.0,
            center: 0.2,
            width: 0.01,
        })
        .build()
        .unwrap();
    let opts = SolverOptions {
        tolerance: 1e-13,
        max_nodes: 150,
        ..SolverOptions::default()
    };
    let problem = EquilibriumProblem::new(params, SupportType::Cantilever).unwrap();
    let err = solve_problem(&problem, &opts).unwrap_err();
    assert!(matches!(err, IecError::Convergence(_)), "{err}");
}

#[test]
fn state_round_trips_and_rejects_tampering() {
    let state = solve(&default_params(), SupportType::Cantilever).unwrap();
    let text = serde_json::to_string(&state).unwrap();
    let back: EquilibriumState = serde_json::from_str(&text).unwrap();
    assert_eq!(back, state);

    let mut value: serde_json::Value = serde_json::from_str(&text).unwrap();
    value["arrays"]["theta"].as_array_mut().unwrap().pop();
    assert!(serde_json::from_value::<EquilibriumState>(value).is_err());
}
