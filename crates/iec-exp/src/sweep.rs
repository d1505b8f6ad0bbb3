use std::io::Write;

use iec_core::{stable_hash_string, ErrorInfo, IecError, Parameters, ParametersBuilder, SupportType};
use iec_metrics::{compare, MetricWeight};
use iec_solver::{solve_problem, summarize, EquilibriumProblem, EquilibriumState, SolverOptions};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Parameter varied by a [`sweep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepAxis {
    ChiKappa,
    ChiE,
    ChiC,
    ChiF,
    TipLoad,
    Gravity,
}

impl SweepAxis {
    pub fn name(self) -> &'static str {
        match self {
            SweepAxis::ChiKappa => "chi_kappa",
            SweepAxis::ChiE => "chi_e",
            SweepAxis::ChiC => "chi_c",
            SweepAxis::ChiF => "chi_f",
            SweepAxis::TipLoad => "tip_load",
            SweepAxis::Gravity => "gravity",
        }
    }

    pub fn apply(self, builder: ParametersBuilder, value: f64) -> ParametersBuilder {
        match self {
            SweepAxis::ChiKappa => builder.chi_kappa(value),
            SweepAxis::ChiE => builder.chi_e(value),
            SweepAxis::ChiC => builder.chi_c(value),
            SweepAxis::ChiF => builder.chi_f(value),
            SweepAxis::TipLoad => builder.tip_load(value),
            SweepAxis::Gravity => builder.gravity(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSpec {
    pub axis: SweepAxis,
    /// Swept values; the first one is the reference point.
    pub values: Vec<f64>,
    #[serde(default)]
    pub weight: MetricWeight,
}

/// Diagnostics of one sweep point relative to the reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub value: f64,
    pub params_hash: String,
    pub wavelength: f64,
    pub amplitude: f64,
    pub tip_deflection: f64,
    pub max_node_drift_mm: f64,
    pub d_geo: f64,
    pub d_geo_norm: f64,
    pub energy_warning: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub axis: SweepAxis,
    pub support: SupportType,
    pub spec_hash: String,
    pub points: Vec<SweepPoint>,
}

impl SweepReport {
    pub fn reference(&self) -> &SweepPoint {
        &self.points[0]
    }

    /// Writes one CSV row per point.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), IecError> {
        let mut wtr = csv::Writer::from_writer(writer);
        for point in &self.points {
            wtr.serialize(point).map_err(export_error)?;
        }
        wtr.flush().map_err(export_error)
    }
}

fn export_error(err: impl ToString) -> IecError {
    IecError::Serde(ErrorInfo::new("iec_exp.export", err.to_string()))
}

pub(crate) fn solve_with(
    params: Parameters,
    support: SupportType,
    opts: &SolverOptions,
) -> Result<EquilibriumState, IecError> {
    let problem = EquilibriumProblem::new(params, support)?;
    solve_problem(&problem, opts)
}

/// Re-solves `base` for every value in `spec` and compares each equilibrium
/// with the first one.
pub fn sweep(
    base: &Parameters,
    spec: &SweepSpec,
    support: SupportType,
    opts: &SolverOptions,
) -> Result<SweepReport, IecError> {
    if spec.values.is_empty() {
        return Err(IecError::ParameterRange(
            ErrorInfo::new("empty-sweep", "a sweep needs at least one value")
                .with_context("axis", spec.axis.name()),
        ));
    }
    let spec_hash = stable_hash_string(&(base.to_spec(), spec, support))?;
    let mut reference: Option<EquilibriumState> = None;
    let mut points = Vec::with_capacity(spec.values.len());
    for &value in &spec.values {
        let params = spec.axis.apply(base.to_builder(), value).build()?;
        let params_hash = params.content_hash()?;
        let state = solve_with(params, support, opts)?;
        let summary = summarize(&state)?;
        let metrics = compare(reference.as_ref().unwrap_or(&state), &state, &spec.weight)?;
        info!(
            axis = spec.axis.name(),
            value,
            wavelength = summary.dominant_wavelength,
            drift_mm = metrics.max_node_drift_mm,
            d_geo = metrics.geodesic.d_geo,
            "sweep point solved"
        );
        points.push(SweepPoint {
            value,
            params_hash,
            wavelength: summary.dominant_wavelength,
            amplitude: summary.angular_amplitude,
            tip_deflection: summary.tip_deflection,
            max_node_drift_mm: metrics.max_node_drift_mm,
            d_geo: metrics.geodesic.d_geo,
            d_geo_norm: metrics.geodesic.d_geo_norm,
            energy_warning: state.validation().energy_warning,
        });
        if reference.is_none() {
            reference = Some(state);
        }
    }
    Ok(SweepReport {
        axis: spec.axis,
        support,
        spec_hash,
        points,
    })
}
