use iec_core::{
    ensure_finite, ensure_same_len, Grid, IecError, Parameters, SolverProvenance, SupportType,
};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationReport;

/// Nodal arrays of an equilibrium, all co-registered on `s`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateArrays {
    pub s: Grid,
    /// Tangent angle θ(s), rad.
    pub theta: Vec<f64>,
    /// Realised curvature κ(s), 1/m.
    pub kappa: Vec<f64>,
    /// Target curvature κ̄(s), 1/m.
    pub kappa_target: Vec<f64>,
    /// Internal bending moment m(s), N·m.
    pub moment: Vec<f64>,
    pub stiffness: Vec<f64>,
    pub damping: Vec<f64>,
    pub active_moment: Vec<f64>,
    pub information: Vec<f64>,
    pub information_gradient: Vec<f64>,
    /// Centerline reconstruction.
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl StateArrays {
    fn check(&self) -> Result<(), IecError> {
        let n = self.s.len();
        for (what, values) in [
            ("theta", &self.theta),
            ("kappa", &self.kappa),
            ("kappa_target", &self.kappa_target),
            ("moment", &self.moment),
            ("stiffness", &self.stiffness),
            ("damping", &self.damping),
            ("active_moment", &self.active_moment),
            ("information", &self.information),
            ("information_gradient", &self.information_gradient),
            ("x", &self.x),
            ("y", &self.y),
        ] {
            ensure_same_len(what, n, values.len())?;
            ensure_finite(what, values)?;
        }
        Ok(())
    }
}

/// Validated, immutable solver output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StateRecord")]
pub struct EquilibriumState {
    support: SupportType,
    arrays: StateArrays,
    validation: ValidationReport,
    provenance: SolverProvenance,
}

#[derive(Deserialize)]
struct StateRecord {
    support: SupportType,
    arrays: StateArrays,
    validation: ValidationReport,
    provenance: SolverProvenance,
}

impl TryFrom<StateRecord> for EquilibriumState {
    type Error = IecError;

    fn try_from(record: StateRecord) -> Result<Self, Self::Error> {
        EquilibriumState::new(
            record.support,
            record.arrays,
            record.validation,
            record.provenance,
        )
    }
}

impl EquilibriumState {
    /// Checks equal lengths and finiteness of every array.
    pub fn new(
        support: SupportType,
        arrays: StateArrays,
        validation: ValidationReport,
        provenance: SolverProvenance,
    ) -> Result<Self, IecError> {
        arrays.check()?;
        Ok(Self {
            support,
            arrays,
            validation,
            provenance,
        })
    }

    pub fn support(&self) -> SupportType {
        self.support
    }

    pub fn arrays(&self) -> &StateArrays {
        &self.arrays
    }

    pub fn grid(&self) -> &Grid {
        &self.arrays.s
    }

    pub fn s(&self) -> &[f64] {
        self.arrays.s.as_slice()
    }

    pub fn theta(&self) -> &[f64] {
        &self.arrays.theta
    }

    pub fn kappa(&self) -> &[f64] {
        &self.arrays.kappa
    }

    pub fn kappa_target(&self) -> &[f64] {
        &self.arrays.kappa_target
    }

    pub fn moment(&self) -> &[f64] {
        &self.arrays.moment
    }

    pub fn stiffness(&self) -> &[f64] {
        &self.arrays.stiffness
    }

    pub fn damping(&self) -> &[f64] {
        &self.arrays.damping
    }

    pub fn active_moment(&self) -> &[f64] {
        &self.arrays.active_moment
    }

    pub fn information(&self) -> &[f64] {
        &self.arrays.information
    }

    pub fn information_gradient(&self) -> &[f64] {
        &self.arrays.information_gradient
    }

    pub fn x(&self) -> &[f64] {
        &self.arrays.x
    }

    pub fn y(&self) -> &[f64] {
        &self.arrays.y
    }

    pub fn validation(&self) -> &ValidationReport {
        &self.validation
    }

    pub fn provenance(&self) -> &SolverProvenance {
        &self.provenance
    }

    /// Parameters the state was solved from.
    pub fn params(&self) -> &Parameters {
        &self.provenance.params
    }

    pub fn len(&self) -> usize {
        self.arrays.s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.s.is_empty()
    }
}
