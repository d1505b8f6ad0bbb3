//! Equilibrium solver for the IEC rod model.
//!
//! The rod state `y = (θ, m)` obeys
//!
//! ```text
//! θ' = κ̄(s) + (m − M_active(s)) / (E(s) I)
//! m' = −V(s) cos θ
//! ```
//!
//! with `θ(0) = 0` plus `m(L) = 0` (cantilever) or `θ(L) = 0`
//! (pinned–pinned). [`solve`] and [`solve_problem`] run adaptive trapezoidal
//! collocation, resample onto the parameter grid and apply the validation
//! gates before returning an [`EquilibriumState`]. The [`analytical`] module
//! holds the closed-form oracle used for regression.

pub mod analytical;
mod bvp;
pub mod export;
mod interp;
mod loads;
mod problem;
mod solve;
mod state;
pub mod summary;
mod validation;

pub use analytical::{regression_check, AnalyticalProfile, AnalyticalSolver, RegressionReport};
pub use loads::LoadCase;
pub use problem::{EquilibriumProblem, SolverOptions};
pub use solve::{centerline, solve, solve_problem, SOLVER_NAME};
pub use state::{EquilibriumState, StateArrays};
pub use summary::{summarize, StateSummary};
pub use validation::{bc_residual, governing_residual, ValidationReport};
