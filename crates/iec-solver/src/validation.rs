//! Post-convergence gates: boundary residual and governing residual are hard,
//! the energy balance is a soft signal.

use iec_core::{ensure_same_len, ErrorInfo, Grid, IecError, SupportType};
use iec_field::trapezoid;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::loads::LoadCase;
use crate::problem::SolverOptions;

const NORM_EPS: f64 = 1e-12;

fn validation_error(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message.to_string())
}

/// Outcome of the three validation checks plus solver diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub bc_residual: f64,
    /// ‖dθ/ds − κ‖₂ / (‖κ‖₂ + ε) of the collocated solution, evaluated off
    /// the collocation points.
    pub governing_residual: f64,
    /// Elastic energy ½∫EI(κ − κ̄)².
    pub elastic_energy: f64,
    /// External work minus active work.
    pub external_work: f64,
    pub energy_relative_error: f64,
    /// Set when the energy discrepancy exceeded the warning threshold.
    pub energy_warning: bool,
    pub mesh_nodes: usize,
    pub newton_iterations: usize,
    pub max_collocation_residual: f64,
}

/// Nodal arrays the checks read.
pub(crate) struct ValidationInputs<'a> {
    pub grid: &'a Grid,
    pub theta: &'a [f64],
    pub moment: &'a [f64],
    pub kappa: &'a [f64],
    pub kappa_target: &'a [f64],
    pub stiffness: &'a [f64],
    pub active_moment: &'a [f64],
    pub deflection: &'a [f64],
    pub second_moment: f64,
    /// Midpoint defect measured on the collocation mesh.
    pub governing_defect: f64,
}

/// |θ(0)| with |m(L)| (cantilever) or |θ(L)| (pinned–pinned).
pub fn bc_residual(support: SupportType, theta: &[f64], moment: &[f64]) -> f64 {
    let n = theta.len();
    let far = match support {
        SupportType::Cantilever => moment[n - 1],
        SupportType::PinnedPinned => theta[n - 1],
    };
    theta[0].abs().max(far.abs())
}

/// Relative L2 mismatch between the angle increments and the curvature on
/// an arbitrary grid, in the trapezoidal form
/// `(θ[i+1] − θ[i]) / h − ½(κ[i] + κ[i+1])` per interval.
///
/// Consistent with trapezoidal integration, so a jump in κ between two nodes
/// is not smeared across its neighbours.
pub fn governing_residual(grid: &Grid, theta: &[f64], kappa: &[f64]) -> Result<f64, IecError> {
    let s = grid.as_slice();
    ensure_same_len("theta", s.len(), theta.len())?;
    ensure_same_len("kappa", s.len(), kappa.len())?;
    let defect: f64 = s
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let h = pair[1] - pair[0];
            let r = (theta[i + 1] - theta[i]) / h - 0.5 * (kappa[i] + kappa[i + 1]);
            h * r * r
        })
        .sum();
    let norm: Vec<f64> = kappa.iter().map(|k| k * k).collect();
    Ok(defect.sqrt() / (trapezoid(s, &norm)?.sqrt() + NORM_EPS))
}

/// `(U, W)` for the energy balance. Deflections of a pinned rod are taken
/// relative to the chord through its ends.
pub(crate) fn energy_balance(
    inputs: &ValidationInputs<'_>,
    loads: &LoadCase,
) -> Result<(f64, f64), IecError> {
    let s = inputs.grid.as_slice();
    let n = s.len();
    let elastic: Vec<f64> = inputs
        .kappa
        .iter()
        .zip(inputs.kappa_target)
        .map(|(k, kb)| k - kb)
        .collect();
    let density: Vec<f64> = elastic
        .iter()
        .zip(inputs.stiffness)
        .map(|(de, e)| e * inputs.second_moment * de * de)
        .collect();
    let u = 0.5 * trapezoid(s, &density)?;

    let w: Vec<f64> = match loads.support {
        SupportType::Cantilever => inputs.deflection.to_vec(),
        SupportType::PinnedPinned => {
            let (y0, yl) = (inputs.deflection[0], inputs.deflection[n - 1]);
            let span = s[n - 1] - s[0];
            s.iter()
                .zip(inputs.deflection)
                .map(|(si, yi)| yi - (y0 + (yl - y0) * (si - s[0]) / span))
                .collect()
        }
    };
    let w_point = linear_at(s, &w, loads.point_load_position());
    let distributed: Vec<f64> = w.iter().map(|wi| loads.distributed_load * wi).collect();
    let active: Vec<f64> = inputs
        .active_moment
        .iter()
        .zip(&elastic)
        .map(|(m, de)| m * de)
        .collect();
    let work = 0.5 * (loads.point_load * w_point + trapezoid(s, &distributed)?)
        - 0.5 * trapezoid(s, &active)?;
    Ok((u, work))
}

fn linear_at(s: &[f64], values: &[f64], t: f64) -> f64 {
    let k = crate::interp::locate(s, t);
    let u = ((t - s[k]) / (s[k + 1] - s[k])).clamp(0.0, 1.0);
    values[k] + u * (values[k + 1] - values[k])
}

/// Runs all three checks. Hard failures return [`IecError::Validation`].
pub(crate) fn validate(
    support: SupportType,
    inputs: &ValidationInputs<'_>,
    loads: &LoadCase,
    opts: &SolverOptions,
) -> Result<ValidationReport, IecError> {
    let bc = bc_residual(support, inputs.theta, inputs.moment);
    if !(bc < opts.bc_tolerance) {
        return Err(IecError::Validation(
            validation_error("bc-residual", "boundary conditions not satisfied")
                .with_context("support", support)
                .with_context("residual", bc)
                .with_context("tolerance", opts.bc_tolerance),
        ));
    }

    let governing = inputs.governing_defect;
    if !(governing < opts.residual_bound) {
        return Err(IecError::Validation(
            validation_error("governing-residual", "dθ/ds departs from the algebraic curvature")
                .with_context("residual", governing)
                .with_context("bound", opts.residual_bound),
        ));
    }

    let (u, w) = energy_balance(inputs, loads)?;
    let scale = u.abs().max(w.abs());
    let relative = if scale > NORM_EPS { (u - w).abs() / scale } else { 0.0 };
    let energy_warning = relative > opts.energy_warn_threshold;
    if energy_warning {
        warn!(
            elastic_energy = u,
            external_work = w,
            relative_error = relative,
            threshold = opts.energy_warn_threshold,
            "energy balance discrepancy above warning threshold"
        );
    }

    Ok(ValidationReport {
        bc_residual: bc,
        governing_residual: governing,
        elastic_energy: u,
        external_work: w,
        energy_relative_error: relative,
        energy_warning,
        mesh_nodes: 0,
        newton_iterations: 0,
        max_collocation_residual: 0.0,
    })
}
