//! Closed-form Euler–Bernoulli solutions, used only as a regression oracle
//! for uncoupled rods.

use iec_core::{ErrorInfo, Grid, IecError, Parameters, SupportType};
use serde::{Deserialize, Serialize};

use crate::loads::LoadCase;
use crate::problem::{EquilibriumProblem, SolverOptions};
use crate::solve::solve_problem;

const NORM_EPS: f64 = 1e-15;

/// Exact small-deflection profile on a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticalProfile {
    pub s: Grid,
    pub theta: Vec<f64>,
    pub kappa: Vec<f64>,
    pub deflection: Vec<f64>,
}

/// Clamped–free rod under tip load `p` and uniform load `q`.
pub fn cantilever(grid: &Grid, p: f64, q: f64, ei: f64) -> AnalyticalProfile {
    let l = grid.end();
    let mut theta = Vec::with_capacity(grid.len());
    let mut kappa = Vec::with_capacity(grid.len());
    let mut deflection = Vec::with_capacity(grid.len());
    for &s in grid.as_slice() {
        let r = l - s;
        kappa.push((p * r + 0.5 * q * r * r) / ei);
        theta.push((p * (l * s - 0.5 * s * s) + q * (l.powi(3) - r.powi(3)) / 6.0) / ei);
        deflection.push(
            (p * s * s * (3.0 * l - s) / 6.0
                + q * s * s * (6.0 * l * l - 4.0 * l * s + s * s) / 24.0)
                / ei,
        );
    }
    AnalyticalProfile {
        s: grid.clone(),
        theta,
        kappa,
        deflection,
    }
}

/// Rod with both end rotations held at zero under uniform load `q` and a
/// midspan point load `p`. The end moment `m0` is what keeps θ(L) = 0.
pub fn pinned_uniform(grid: &Grid, q: f64, p: f64, ei: f64) -> AnalyticalProfile {
    let l = grid.end();
    let half = 0.5 * l;
    let m0 = q * l * l / 12.0 + p * l / 8.0;
    let mut theta = Vec::with_capacity(grid.len());
    let mut kappa = Vec::with_capacity(grid.len());
    let mut deflection = Vec::with_capacity(grid.len());
    for &s in grid.as_slice() {
        let (tent, tent_1, tent_2) = if s <= half {
            (0.5 * s, 0.25 * s * s, s.powi(3) / 12.0)
        } else {
            (
                0.5 * (l - s),
                0.5 * (l * s - 0.5 * s * s) - l * l / 8.0,
                0.5 * (0.5 * l * s * s - s.powi(3) / 6.0) - l * l * s / 8.0 + l.powi(3) / 48.0,
            )
        };
        kappa.push((m0 - 0.5 * q * s * (l - s) - p * tent) / ei);
        theta.push((m0 * s - q * (0.25 * l * s * s - s.powi(3) / 6.0) - p * tent_1) / ei);
        deflection.push(
            (0.5 * m0 * s * s - q * (l * s.powi(3) / 12.0 - s.powi(4) / 24.0) - p * tent_2) / ei,
        );
    }
    AnalyticalProfile {
        s: grid.clone(),
        theta,
        kappa,
        deflection,
    }
}

/// Closed-form solver restricted to uncoupled parameter sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticalSolver;

impl AnalyticalSolver {
    pub fn solve(params: &Parameters, support: SupportType) -> Result<AnalyticalProfile, IecError> {
        ensure_uncoupled(params)?;
        let grid = params.grid()?;
        let loads = LoadCase::from_params(params, support);
        let ei = params.bending_stiffness();
        Ok(match support {
            SupportType::Cantilever => {
                cantilever(&grid, loads.point_load, loads.distributed_load, ei)
            }
            SupportType::PinnedPinned => {
                pinned_uniform(&grid, loads.distributed_load, loads.point_load, ei)
            }
        })
    }
}

fn ensure_uncoupled(params: &Parameters) -> Result<(), IecError> {
    if params.couplings_are_zero() && !params.loads().has_environment_coupling() {
        return Ok(());
    }
    Err(IecError::AnalyticalPrecondition(
        ErrorInfo::new(
            "non-zero-coupling",
            "closed-form oracle requires all coupling coefficients to be zero",
        )
        .with_context("chi_kappa", params.chi_kappa())
        .with_context("chi_e", params.chi_e())
        .with_context("chi_c", params.chi_c())
        .with_context("chi_f", params.chi_f()),
    ))
}

/// Relative errors of the collocation solve against the closed form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionReport {
    pub theta_l2: f64,
    pub theta_linf: f64,
    pub kappa_l2: f64,
    pub kappa_linf: f64,
    pub tolerance: f64,
}

impl RegressionReport {
    pub fn worst(&self) -> f64 {
        self.theta_l2
            .max(self.theta_linf)
            .max(self.kappa_l2)
            .max(self.kappa_linf)
    }
}

/// Default relative tolerance of [`regression_check`].
pub const DEFAULT_REGRESSION_TOLERANCE: f64 = 0.02;

/// Solves `params` numerically and compares θ and κ with the closed form.
/// Fails with [`IecError::AnalyticalPrecondition`] for coupled parameters
/// and with [`IecError::Validation`] when any error exceeds `tolerance`.
pub fn regression_check(
    params: &Parameters,
    support: SupportType,
    opts: &SolverOptions,
    tolerance: f64,
) -> Result<RegressionReport, IecError> {
    let exact = AnalyticalSolver::solve(params, support)?;
    let problem = EquilibriumProblem::new(params.clone(), support)?;
    let state = solve_problem(&problem, opts)?;

    let (theta_l2, theta_linf) = relative_errors(state.theta(), &exact.theta);
    let (kappa_l2, kappa_linf) = relative_errors(state.kappa(), &exact.kappa);
    let report = RegressionReport {
        theta_l2,
        theta_linf,
        kappa_l2,
        kappa_linf,
        tolerance,
    };
    if report.worst() > tolerance {
        return Err(IecError::Validation(
            ErrorInfo::new("regression", "collocation solve departs from the closed form")
                .with_context("support", support)
                .with_context("theta_l2", theta_l2)
                .with_context("theta_linf", theta_linf)
                .with_context("kappa_l2", kappa_l2)
                .with_context("kappa_linf", kappa_linf)
                .with_context("tolerance", tolerance),
        ));
    }
    Ok(report)
}

/// `(‖a − b‖₂ / ‖b‖₂, ‖a − b‖∞ / ‖b‖∞)` over the nodes.
fn relative_errors(numeric: &[f64], exact: &[f64]) -> (f64, f64) {
    let mut diff_sq = 0.0;
    let mut ref_sq = 0.0;
    let mut diff_max: f64 = 0.0;
    let mut ref_max: f64 = 0.0;
    for (a, b) in numeric.iter().zip(exact) {
        diff_sq += (a - b) * (a - b);
        ref_sq += b * b;
        diff_max = diff_max.max((a - b).abs());
        ref_max = ref_max.max(b.abs());
    }
    (
        diff_sq.sqrt() / (ref_sq.sqrt() + NORM_EPS),
        diff_max / (ref_max + NORM_EPS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cantilever_tip_matches_textbook() {
        let grid = Grid::uniform(2.0, 21).unwrap();
        let profile = cantilever(&grid, 3.0, 0.0, 5.0);
        let tip = profile.deflection[20];
        assert!((tip - 3.0 * 8.0 / (3.0 * 5.0)).abs() < 1e-12);
        assert!((profile.theta[20] - 3.0 * 4.0 / (2.0 * 5.0)).abs() < 1e-12);
        assert!(profile.kappa[20].abs() < 1e-12);
    }

    #[test]
    fn uniform_cantilever_tip_matches_textbook() {
        let grid = Grid::uniform(1.0, 11).unwrap();
        let profile = cantilever(&grid, 0.0, 8.0, 2.0);
        assert!((profile.deflection[10] - 8.0 / (8.0 * 2.0)).abs() < 1e-12);
        assert!((profile.theta[10] - 8.0 / (6.0 * 2.0)).abs() < 1e-12);
    }

    #[test]
    fn pinned_profile_returns_to_zero_rotation() {
        let grid = Grid::uniform(1.0, 41).unwrap();
        let profile = pinned_uniform(&grid, 2.0, 3.0, 1.5);
        assert!(profile.theta[0].abs() < 1e-15);
        assert!(profile.theta[40].abs() < 1e-12);
        assert!(profile.deflection[40].abs() < 1e-12);
        let centre = profile.kappa[20] * 1.5;
        assert!((centre + (2.0 / 24.0 + 3.0 / 8.0)).abs() < 1e-12);
        let half: f64 = profile.deflection[20];
        assert!(half > 0.0);
    }

    #[test]
    fn coupled_parameters_are_refused() {
        let params = Parameters::builder().chi_e(0.1).build().unwrap();
        let err = AnalyticalSolver::solve(&params, SupportType::Cantilever).unwrap_err();
        assert!(matches!(err, IecError::AnalyticalPrecondition(_)));
    }
}
