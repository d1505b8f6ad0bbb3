//! Trapezoidal collocation with Newton iteration and residual-driven mesh
//! bisection for the two-point problem in `y = (θ, m)`.

use iec_core::{ErrorInfo, Grid, IecError, SupportType};
use iec_coupling::MechanicalBiasFields;
use nalgebra::{Matrix2, Vector2};
use tracing::debug;

use crate::interp::{hermite, locate, Pchip};
use crate::loads::{LoadCase, Side};
use crate::problem::SolverOptions;

const MAX_REFINEMENT_PASSES: usize = 48;
const DEFECT_EPS: f64 = 1e-12;

fn convergence_error(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message.to_string())
}

/// Spatially varying coefficients of the governing system.
pub(crate) struct Coefficients {
    target: Pchip,
    stiffness: Pchip,
    active: Pchip,
    second_moment: f64,
    loads: LoadCase,
}

impl Coefficients {
    pub(crate) fn new(
        bias: &MechanicalBiasFields,
        second_moment: f64,
        loads: LoadCase,
    ) -> Result<Self, IecError> {
        Ok(Self {
            target: Pchip::new(&bias.s, &bias.target_curvature)?,
            stiffness: Pchip::new(&bias.s, &bias.stiffness)?,
            active: Pchip::new(&bias.s, &bias.active_moment)?,
            second_moment,
            loads,
        })
    }

    fn rigidity(&self, s: f64) -> f64 {
        self.stiffness.eval(s) * self.second_moment
    }

    /// `f(s, y) = (κ̄ + (m − M)/(E I), −V cos θ)`.
    fn rhs(&self, s: f64, y: &Vector2<f64>, side: Side) -> Vector2<f64> {
        let kappa = self.target.eval(s) + (y[1] - self.active.eval(s)) / self.rigidity(s);
        Vector2::new(kappa, -self.loads.shear(s, side) * y[0].cos())
    }

    fn jacobian(&self, s: f64, y: &Vector2<f64>, side: Side) -> Matrix2<f64> {
        Matrix2::new(
            0.0,
            1.0 / self.rigidity(s),
            self.loads.shear(s, side) * y[0].sin(),
            0.0,
        )
    }
}

/// Converged nodal solution on the final adaptive mesh.
pub(crate) struct Collocation {
    pub(crate) mesh: Vec<f64>,
    pub(crate) y: Vec<Vector2<f64>>,
    /// `f` at the start (right limit) and end (left limit) of each interval.
    slopes: Vec<(Vector2<f64>, Vector2<f64>)>,
    pub(crate) newton_iterations: usize,
    pub(crate) max_residual: f64,
}

impl Collocation {
    /// Cubic Hermite evaluation of the solution at `t`.
    pub(crate) fn sample(&self, t: f64) -> Vector2<f64> {
        let k = locate(&self.mesh, t);
        let h = self.mesh[k + 1] - self.mesh[k];
        let u = ((t - self.mesh[k]) / h).clamp(0.0, 1.0);
        let (f0, f1) = &self.slopes[k];
        let (y0, y1) = (&self.y[k], &self.y[k + 1]);
        Vector2::new(
            hermite(u, h, y0[0], y1[0], f0[0], f1[0]),
            hermite(u, h, y0[1], y1[1], f0[1], f1[1]),
        )
    }

    /// Relative L2 defect `‖dθ/ds − κ‖ / (‖κ‖ + ε)` of the Hermite
    /// interpolant, sampled at the midpoint of every mesh interval where the
    /// collocation equations are not imposed. Norms use Simpson weights.
    pub(crate) fn governing_defect(&self, coeffs: &Coefficients) -> f64 {
        let (mut defect, mut norm) = (0.0, 0.0);
        for (i, (f0, f1)) in self.slopes.iter().enumerate() {
            let h = self.mesh[i + 1] - self.mesh[i];
            let (du, fm) = midpoint(coeffs, &self.mesh, &self.y, &self.slopes, i);
            defect += h * (du[0] - fm[0]).powi(2);
            norm += h * (f0[0].powi(2) + 4.0 * fm[0].powi(2) + f1[0].powi(2)) / 6.0;
        }
        defect.sqrt() / (norm.sqrt() + DEFECT_EPS)
    }

    /// Resamples onto `grid`, returning `(θ, m)`.
    pub(crate) fn resample(&self, grid: &Grid) -> (Vec<f64>, Vec<f64>) {
        grid.as_slice()
            .iter()
            .map(|&t| {
                let y = self.sample(t);
                (y[0], y[1])
            })
            .unzip()
    }
}

/// Merges `breakpoints` into the grid so that load discontinuities sit on
/// mesh nodes.
pub(crate) fn initial_mesh(grid: &Grid, breakpoints: &[f64]) -> Vec<f64> {
    let mut mesh = grid.as_slice().to_vec();
    let tol = 1e-12 * grid.length();
    for &b in breakpoints {
        let k = locate(&mesh, b);
        if (mesh[k] - b).abs() > tol && (mesh[k + 1] - b).abs() > tol {
            mesh.insert(k + 1, b);
        }
    }
    mesh
}

pub(crate) fn collocate(
    coeffs: &Coefficients,
    support: SupportType,
    mut mesh: Vec<f64>,
    opts: &SolverOptions,
) -> Result<Collocation, IecError> {
    if mesh.len() > opts.max_nodes {
        return Err(IecError::Convergence(
            convergence_error("mesh-budget", "initial mesh already exceeds max_nodes")
                .with_context("nodes", mesh.len())
                .with_context("max_nodes", opts.max_nodes)
                .with_hint("raise SolverOptions::max_nodes or reduce n_nodes"),
        ));
    }
    let mut y: Vec<Vector2<f64>> = vec![Vector2::zeros(); mesh.len()];
    let mut newton_total = 0;

    for pass in 0..MAX_REFINEMENT_PASSES {
        newton_total += newton(coeffs, support, &mesh, &mut y, opts)?;
        let slopes = interval_slopes(coeffs, &mesh, &y);
        let residuals = midpoint_residuals(coeffs, &mesh, &y, &slopes);
        let max_residual = residuals.iter().cloned().fold(0.0, f64::max);
        let flagged: Vec<usize> = residuals
            .iter()
            .enumerate()
            .filter(|(_, r)| **r > opts.tolerance)
            .map(|(idx, _)| idx)
            .collect();
        debug!(
            pass,
            nodes = mesh.len(),
            max_residual,
            flagged = flagged.len(),
            newton_iterations = newton_total,
            "collocation pass"
        );

        if flagged.is_empty() {
            return Ok(Collocation {
                mesh,
                y,
                slopes,
                newton_iterations: newton_total,
                max_residual,
            });
        }
        if mesh.len() + flagged.len() > opts.max_nodes {
            return Err(IecError::Convergence(
                convergence_error(
                    "max-nodes-exceeded",
                    "collocation residual above tolerance at the mesh budget",
                )
                .with_context("nodes", mesh.len())
                .with_context("max_nodes", opts.max_nodes)
                .with_context("max_residual", max_residual)
                .with_context("tolerance", opts.tolerance),
            ));
        }
        (mesh, y) = bisect(&mesh, &y, &slopes, &flagged);
    }

    Err(IecError::Convergence(
        convergence_error("refinement-budget", "mesh refinement passes exhausted")
            .with_context("passes", MAX_REFINEMENT_PASSES)
            .with_context("nodes", mesh.len()),
    ))
}

fn interval_slopes(
    coeffs: &Coefficients,
    mesh: &[f64],
    y: &[Vector2<f64>],
) -> Vec<(Vector2<f64>, Vector2<f64>)> {
    (0..mesh.len() - 1)
        .map(|i| {
            (
                coeffs.rhs(mesh[i], &y[i], Side::Above),
                coeffs.rhs(mesh[i + 1], &y[i + 1], Side::Below),
            )
        })
        .collect()
}

/// Hermite derivative `u'(mid)` and `f(mid, u(mid))` on interval `i`.
fn midpoint(
    coeffs: &Coefficients,
    mesh: &[f64],
    y: &[Vector2<f64>],
    slopes: &[(Vector2<f64>, Vector2<f64>)],
    i: usize,
) -> (Vector2<f64>, Vector2<f64>) {
    let (f0, f1) = &slopes[i];
    let h = mesh[i + 1] - mesh[i];
    let mid = mesh[i] + 0.5 * h;
    let u = (y[i] + y[i + 1]) * 0.5 + (f0 - f1) * (h / 8.0);
    let du = (y[i + 1] - y[i]) * (1.5 / h) - (f0 + f1) * 0.25;
    (du, coeffs.rhs(mid, &u, Side::Above))
}

/// Scaled residual `|u'(mid) − f(mid, u(mid))| / (1 + |f|)` of the cubic
/// Hermite interpolant, maximised over both components.
fn midpoint_residuals(
    coeffs: &Coefficients,
    mesh: &[f64],
    y: &[Vector2<f64>],
    slopes: &[(Vector2<f64>, Vector2<f64>)],
) -> Vec<f64> {
    (0..slopes.len())
        .map(|i| {
            let (du, fm) = midpoint(coeffs, mesh, y, slopes, i);
            let r = du - fm;
            (r[0].abs() / (1.0 + fm[0].abs())).max(r[1].abs() / (1.0 + fm[1].abs()))
        })
        .collect()
}

fn bisect(
    mesh: &[f64],
    y: &[Vector2<f64>],
    slopes: &[(Vector2<f64>, Vector2<f64>)],
    flagged: &[usize],
) -> (Vec<f64>, Vec<Vector2<f64>>) {
    let mut new_mesh = Vec::with_capacity(mesh.len() + flagged.len());
    let mut new_y = Vec::with_capacity(mesh.len() + flagged.len());
    let mut next = flagged.iter().peekable();
    for i in 0..mesh.len() {
        new_mesh.push(mesh[i]);
        new_y.push(y[i]);
        if next.peek() == Some(&&i) {
            next.next();
            let h = mesh[i + 1] - mesh[i];
            let (f0, f1) = &slopes[i];
            new_mesh.push(mesh[i] + 0.5 * h);
            new_y.push((y[i] + y[i + 1]) * 0.5 + (f0 - f1) * (h / 8.0));
        }
    }
    (new_mesh, new_y)
}

/// Boundary residual `g(y_0, y_N)` and its Jacobians.
fn boundary(
    support: SupportType,
    first: &Vector2<f64>,
    last: &Vector2<f64>,
) -> (Vector2<f64>, Matrix2<f64>, Matrix2<f64>) {
    let g0 = Matrix2::new(1.0, 0.0, 0.0, 0.0);
    match support {
        SupportType::Cantilever => (
            Vector2::new(first[0], last[1]),
            g0,
            Matrix2::new(0.0, 0.0, 0.0, 1.0),
        ),
        SupportType::PinnedPinned => (
            Vector2::new(first[0], last[0]),
            g0,
            Matrix2::new(0.0, 0.0, 1.0, 0.0),
        ),
    }
}

/// Newton iteration on the trapezoidal collocation equations
/// `y_{i+1} − y_i − h/2 (f_i + f_{i+1}) = 0`. The block-bidiagonal Jacobian
/// is condensed onto `Δy_0` by forward recursion
/// `Δy_{i+1} = P_{i+1} Δy_0 + q_{i+1}` and closed by the boundary rows.
fn newton(
    coeffs: &Coefficients,
    support: SupportType,
    mesh: &[f64],
    y: &mut [Vector2<f64>],
    opts: &SolverOptions,
) -> Result<usize, IecError> {
    let n = mesh.len();
    let identity = Matrix2::<f64>::identity();
    let mut props: Vec<(Matrix2<f64>, Vector2<f64>)> = Vec::with_capacity(n);

    for iteration in 1..=opts.max_newton_iterations {
        props.clear();
        props.push((identity, Vector2::zeros()));
        for i in 0..n - 1 {
            let h = mesh[i + 1] - mesh[i];
            let f0 = coeffs.rhs(mesh[i], &y[i], Side::Above);
            let f1 = coeffs.rhs(mesh[i + 1], &y[i + 1], Side::Below);
            let r = y[i + 1] - y[i] - (f0 + f1) * (0.5 * h);
            let a = -identity - coeffs.jacobian(mesh[i], &y[i], Side::Above) * (0.5 * h);
            let b = identity - coeffs.jacobian(mesh[i + 1], &y[i + 1], Side::Below) * (0.5 * h);
            let b_inv = b.try_inverse().ok_or_else(|| {
                IecError::NumericalFailure(
                    ErrorInfo::new("singular-block", "collocation block is singular")
                        .with_context("interval", i)
                        .with_context("s", mesh[i]),
                )
            })?;
            let (p, q) = &props[i];
            let next_p = -(b_inv * a) * p;
            let next_q = b_inv * (-r - a * q);
            props.push((next_p, next_q));
        }

        let (g, g0, gn) = boundary(support, &y[0], &y[n - 1]);
        let (p_last, q_last) = &props[n - 1];
        let system = g0 + gn * p_last;
        let delta0 = system
            .try_inverse()
            .map(|inv| inv * (-g - gn * q_last))
            .ok_or_else(|| {
                IecError::NumericalFailure(ErrorInfo::new(
                    "singular-boundary",
                    "boundary system is singular",
                ))
            })?;

        let mut step: f64 = 0.0;
        for (yi, (p, q)) in y.iter_mut().zip(&props) {
            let dy = p * delta0 + q;
            *yi += dy;
            step = step
                .max(dy[0].abs() / (1.0 + yi[0].abs()))
                .max(dy[1].abs() / (1.0 + yi[1].abs()));
        }
        if !step.is_finite() || y.iter().any(|yi| !(yi[0].is_finite() && yi[1].is_finite())) {
            return Err(IecError::NumericalFailure(
                ErrorInfo::new("newton-diverged", "Newton update produced non-finite values")
                    .with_context("iteration", iteration)
                    .with_context("nodes", n),
            ));
        }
        if step < opts.newton_tolerance {
            return Ok(iteration);
        }
    }

    Err(IecError::Convergence(
        convergence_error("newton-stalled", "Newton iteration did not converge")
            .with_context("iterations", opts.max_newton_iterations)
            .with_context("nodes", n),
    ))
}
