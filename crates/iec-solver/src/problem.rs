use iec_core::{bounds, ErrorInfo, IecError, Parameters, SupportType};
use iec_coupling::BaselineCurvature;
use iec_field::InformationField;
use serde::{Deserialize, Serialize};

use crate::loads::LoadCase;

/// Tuning knobs for the collocation solver and its validation gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Scaled midpoint collocation residual every interval must meet.
    #[serde(default = "SolverOptions::default_tolerance")]
    pub tolerance: f64,
    /// Mesh size beyond which refinement gives up. The default admits the
    /// largest valid grid with room for refinement.
    #[serde(default = "SolverOptions::default_max_nodes")]
    pub max_nodes: usize,
    #[serde(default = "SolverOptions::default_max_newton_iterations")]
    pub max_newton_iterations: usize,
    /// Scaled Newton step below which an iteration is accepted.
    #[serde(default = "SolverOptions::default_newton_tolerance")]
    pub newton_tolerance: f64,
    /// Hard gate on the boundary-condition residual.
    #[serde(default = "SolverOptions::default_bc_tolerance")]
    pub bc_tolerance: f64,
    /// Hard gate on the relative L2 defect `dθ/ds − κ` of the collocated
    /// solution between collocation points.
    #[serde(default = "SolverOptions::default_residual_bound")]
    pub residual_bound: f64,
    /// Relative energy-balance discrepancy above which a warning is raised.
    /// Empirical; the external-work estimate is itself approximate.
    #[serde(default = "SolverOptions::default_energy_warn_threshold")]
    pub energy_warn_threshold: f64,
}

impl SolverOptions {
    const fn default_tolerance() -> f64 {
        1e-3
    }

    const fn default_max_nodes() -> usize {
        2 * bounds::MAX_NODES + 10_000
    }

    const fn default_max_newton_iterations() -> usize {
        25
    }

    const fn default_newton_tolerance() -> f64 {
        1e-9
    }

    const fn default_bc_tolerance() -> f64 {
        1e-4
    }

    const fn default_residual_bound() -> f64 {
        0.5
    }

    const fn default_energy_warn_threshold() -> f64 {
        0.8
    }

    pub(crate) fn validate(&self) -> Result<(), IecError> {
        let positive = [
            ("tolerance", self.tolerance),
            ("newton_tolerance", self.newton_tolerance),
            ("bc_tolerance", self.bc_tolerance),
            ("residual_bound", self.residual_bound),
            ("energy_warn_threshold", self.energy_warn_threshold),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(options_error(name, value.to_string()));
            }
        }
        if self.max_nodes < 2 {
            return Err(options_error("max_nodes", self.max_nodes.to_string()));
        }
        if self.max_newton_iterations == 0 {
            return Err(options_error("max_newton_iterations", "0".to_string()));
        }
        Ok(())
    }
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            tolerance: Self::default_tolerance(),
            max_nodes: Self::default_max_nodes(),
            max_newton_iterations: Self::default_max_newton_iterations(),
            newton_tolerance: Self::default_newton_tolerance(),
            bc_tolerance: Self::default_bc_tolerance(),
            residual_bound: Self::default_residual_bound(),
            energy_warn_threshold: Self::default_energy_warn_threshold(),
        }
    }
}

fn options_error(name: &str, value: String) -> IecError {
    IecError::ParameterRange(
        ErrorInfo::new("invalid-solver-option", format!("solver option {name} is invalid"))
            .with_context("name", name)
            .with_context("value", value),
    )
}

/// Everything one solve consumes: parameters, support, information field and
/// baseline curvature. The field defaults to the shape sampled from the
/// parameters; upstream collaborators may substitute their own.
#[derive(Debug, Clone, PartialEq)]
pub struct EquilibriumProblem {
    params: Parameters,
    support: SupportType,
    field: InformationField,
    baseline: BaselineCurvature,
}

impl EquilibriumProblem {
    pub fn new(params: Parameters, support: SupportType) -> Result<Self, IecError> {
        let field = InformationField::from_params(&params)?;
        Ok(Self {
            params,
            support,
            field,
            baseline: BaselineCurvature::Zero,
        })
    }

    /// Replaces the sampled field with an external one spanning `[0, L]`.
    pub fn with_field(mut self, field: InformationField) -> Result<Self, IecError> {
        let length = self.params.length();
        let grid = field.grid();
        let tol = 1e-9 * length;
        if grid.start().abs() > tol || (grid.end() - length).abs() > tol {
            return Err(IecError::ShapeMismatch(
                ErrorInfo::new("grid-span", "field grid must span [0, length]")
                    .with_context("start", grid.start())
                    .with_context("end", grid.end())
                    .with_context("length", length),
            ));
        }
        self.field = field;
        Ok(self)
    }

    pub fn with_baseline(mut self, baseline: BaselineCurvature) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn support(&self) -> SupportType {
        self.support
    }

    pub fn field(&self) -> &InformationField {
        &self.field
    }

    pub fn baseline(&self) -> &BaselineCurvature {
        &self.baseline
    }

    pub fn load_case(&self) -> LoadCase {
        LoadCase::from_params(&self.params, self.support)
    }
}
