use chrono::Utc;
use iec_core::{
    build_revision, ensure_finite, Grid, IecError, Parameters, SchemaVersion, SolverProvenance,
    SupportType,
};
use iec_coupling::apply_coupling;
use iec_field::cumulative_trapezoid;
use tracing::debug;

use crate::bvp::{collocate, initial_mesh, Coefficients};
use crate::problem::{EquilibriumProblem, SolverOptions};
use crate::state::{EquilibriumState, StateArrays};
use crate::validation::{validate, ValidationInputs};

/// Identifier recorded in the provenance of collocation solves.
pub const SOLVER_NAME: &str = "iec-collocation";

/// Solves the rod equilibrium for `params` with default options and the
/// information field sampled from the parameters.
pub fn solve(params: &Parameters, support: SupportType) -> Result<EquilibriumState, IecError> {
    let problem = EquilibriumProblem::new(params.clone(), support)?;
    solve_problem(&problem, &SolverOptions::default())
}

/// Solves a fully specified problem. Either returns a validated state or
/// fails; no approximate state is ever surfaced.
pub fn solve_problem(
    problem: &EquilibriumProblem,
    opts: &SolverOptions,
) -> Result<EquilibriumState, IecError> {
    opts.validate()?;
    let params = problem.params();
    let support = problem.support();
    let bias = apply_coupling(problem.field(), params, problem.baseline())?;
    let loads = problem.load_case();
    let coeffs = Coefficients::new(&bias, params.second_moment(), loads)?;
    let mesh = initial_mesh(&bias.s, &loads.breakpoints());
    let solution = collocate(&coeffs, support, mesh, opts)?;

    let (theta, moment) = solution.resample(&bias.s);
    ensure_finite("theta", &theta)?;
    ensure_finite("moment", &moment)?;
    let kappa: Vec<f64> = (0..bias.len())
        .map(|i| {
            bias.target_curvature[i]
                + (moment[i] - bias.active_moment[i]) / (bias.stiffness[i] * params.second_moment())
        })
        .collect();
    let (x, y) = centerline(&bias.s, &theta)?;

    let inputs = ValidationInputs {
        grid: &bias.s,
        theta: &theta,
        moment: &moment,
        kappa: &kappa,
        kappa_target: &bias.target_curvature,
        stiffness: &bias.stiffness,
        active_moment: &bias.active_moment,
        deflection: &y,
        second_moment: params.second_moment(),
        governing_defect: solution.governing_defect(&coeffs),
    };
    let mut report = validate(support, &inputs, &loads, opts)?;
    report.mesh_nodes = solution.mesh.len();
    report.newton_iterations = solution.newton_iterations;
    report.max_collocation_residual = solution.max_residual;
    debug!(
        %support,
        mesh_nodes = report.mesh_nodes,
        newton_iterations = report.newton_iterations,
        governing_residual = report.governing_residual,
        "equilibrium converged"
    );

    let arrays = StateArrays {
        information: bias.field.values().to_vec(),
        information_gradient: bias.field.gradient().to_vec(),
        s: bias.s,
        theta,
        kappa,
        kappa_target: bias.target_curvature,
        moment,
        stiffness: bias.stiffness,
        damping: bias.damping,
        active_moment: bias.active_moment,
        x,
        y,
    };
    EquilibriumState::new(support, arrays, report, provenance(params, SOLVER_NAME)?)
}

/// Integrates `x' = cos θ`, `y' = sin θ` from the origin.
pub fn centerline(grid: &Grid, theta: &[f64]) -> Result<(Vec<f64>, Vec<f64>), IecError> {
    let cos: Vec<f64> = theta.iter().map(|t| t.cos()).collect();
    let sin: Vec<f64> = theta.iter().map(|t| t.sin()).collect();
    Ok((
        cumulative_trapezoid(grid.as_slice(), &cos)?,
        cumulative_trapezoid(grid.as_slice(), &sin)?,
    ))
}

pub(crate) fn provenance(params: &Parameters, solver: &str) -> Result<SolverProvenance, IecError> {
    Ok(SolverProvenance {
        schema_version: SchemaVersion::default(),
        solver: solver.to_string(),
        created_at: Utc::now().to_rfc3339(),
        revision: build_revision(),
        params_hash: params.content_hash()?,
        params: params.clone(),
    })
}
