use iec_core::{
    ensure_finite, ensure_same_len, ErrorInfo, Grid, IecError, Parameters, StiffnessModel,
};
use iec_field::InformationField;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::baseline::BaselineCurvature;
use crate::environment::augment_with_environment;

/// Effective material fields after the stiffness and damping coupling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StiffnessFields {
    /// Effective Young's modulus E(s), Pa.
    pub stiffness: Vec<f64>,
    /// Effective damping C(s).
    pub damping: Vec<f64>,
    /// Nodes where either field hit its clamp.
    pub clamped_nodes: usize,
}

/// All bias fields for one solve, co-registered on the field grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanicalBiasFields {
    pub s: Grid,
    pub target_curvature: Vec<f64>,
    pub stiffness: Vec<f64>,
    pub damping: Vec<f64>,
    pub active_moment: Vec<f64>,
    /// Information field the biases were derived from, including any
    /// environmental components.
    pub field: InformationField,
}

impl MechanicalBiasFields {
    /// Assembles a bias record after checking lengths and finiteness.
    pub fn new(
        field: InformationField,
        target_curvature: Vec<f64>,
        stiffness: Vec<f64>,
        damping: Vec<f64>,
        active_moment: Vec<f64>,
    ) -> Result<Self, IecError> {
        let n = field.len();
        for (what, values) in [
            ("target curvature", &target_curvature),
            ("stiffness", &stiffness),
            ("damping", &damping),
            ("active moment", &active_moment),
        ] {
            ensure_same_len(what, n, values.len())?;
            ensure_finite(what, values)?;
        }
        if let Some(index) = stiffness.iter().position(|e| *e <= 0.0) {
            return Err(IecError::NumericalFailure(
                ErrorInfo::new("non-positive-stiffness", "effective stiffness must stay positive")
                    .with_context("index", index)
                    .with_context("value", stiffness[index]),
            ));
        }
        Ok(Self {
            s: field.grid().clone(),
            target_curvature,
            stiffness,
            damping,
            active_moment,
            field,
        })
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.s.len()
    }

    /// Always false for a constructed record.
    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }
}

/// κ̄(s) = κ̄_baseline(s) + χ_κ · dI/ds · L_scale.
pub fn curvature_bias(
    field: &InformationField,
    params: &Parameters,
    baseline: &BaselineCurvature,
) -> Result<Vec<f64>, IecError> {
    let base = baseline.evaluate(field.grid())?;
    let gain = params.chi_kappa() * params.length_scale();
    Ok(base
        .iter()
        .zip(field.gradient())
        .map(|(k0, di)| k0 + gain * di)
        .collect())
}

/// Effective stiffness and damping, clamped to the configured multiples of
/// the baselines.
pub fn stiffness_bias(
    field: &InformationField,
    params: &Parameters,
) -> Result<StiffnessFields, IecError> {
    let e0 = params.youngs_modulus();
    let c0 = params.damping();
    let (lo, hi) = params.stiffness_clamp();
    let mut clamped_nodes = 0;
    let mut stiffness = Vec::with_capacity(field.len());
    let mut damping = Vec::with_capacity(field.len());

    for &info in field.values() {
        let raw_e = match params.stiffness_model() {
            StiffnessModel::Linear => e0 * (1.0 + params.chi_e() * info),
            StiffnessModel::Exponential => e0 * (params.chi_e() * info).exp(),
        };
        let e = raw_e.clamp(lo * e0, hi * e0);
        let raw_c = c0 * (1.0 + params.chi_c() * info);
        let c = raw_c.clamp(lo * c0, hi * c0).max(0.0);
        if e != raw_e || c != raw_c {
            clamped_nodes += 1;
        }
        stiffness.push(e);
        damping.push(c);
    }
    ensure_finite("stiffness", &stiffness)?;
    ensure_finite("damping", &damping)?;
    Ok(StiffnessFields {
        stiffness,
        damping,
        clamped_nodes,
    })
}

/// M(s) = χ_f · dI/ds · L_scale, in N·m.
pub fn active_moment(field: &InformationField, params: &Parameters) -> Vec<f64> {
    let gain = params.chi_f() * params.length_scale();
    field.gradient().iter().map(|di| gain * di).collect()
}

/// Runs the environment augmentation and all three mappings.
pub fn apply_coupling(
    field: &InformationField,
    params: &Parameters,
    baseline: &BaselineCurvature,
) -> Result<MechanicalBiasFields, IecError> {
    let field = augment_with_environment(field, params)?;
    let target = curvature_bias(&field, params, baseline)?;
    let material = stiffness_bias(&field, params)?;
    let moment = active_moment(&field, params);
    debug!(
        nodes = field.len(),
        clamped = material.clamped_nodes,
        environment = params.loads().has_environment_coupling(),
        "coupling applied"
    );
    MechanicalBiasFields::new(field, target, material.stiffness, material.damping, moment)
}
