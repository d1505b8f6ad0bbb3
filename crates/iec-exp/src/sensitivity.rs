use iec_core::{ErrorInfo, IecError, Parameters, RngHandle, SupportType};
use iec_metrics::{compare, ComparisonMetrics, MetricWeight};
use iec_solver::SolverOptions;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::sweep::solve_with;

/// Closed interval a coupling coefficient is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CouplingRange {
    pub min: f64,
    pub max: f64,
}

impl CouplingRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn check(&self, name: &str) -> Result<(), IecError> {
        if self.min.is_finite() && self.max.is_finite() && self.min <= self.max {
            return Ok(());
        }
        Err(IecError::ParameterRange(
            ErrorInfo::new("invalid-range", format!("{name} range must satisfy min <= max"))
                .with_context("min", self.min)
                .with_context("max", self.max),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivitySpec {
    pub samples: usize,
    #[serde(default)]
    pub chi_kappa: CouplingRange,
    #[serde(default)]
    pub chi_e: CouplingRange,
    #[serde(default)]
    pub chi_c: CouplingRange,
    #[serde(default)]
    pub chi_f: CouplingRange,
    #[serde(default)]
    pub weight: MetricWeight,
}

impl SensitivitySpec {
    fn validate(&self) -> Result<(), IecError> {
        if self.samples == 0 {
            return Err(IecError::ParameterRange(ErrorInfo::new(
                "empty-study",
                "a sensitivity study needs at least one sample",
            )));
        }
        self.chi_kappa.check("chi_kappa")?;
        self.chi_e.check("chi_e")?;
        self.chi_c.check("chi_c")?;
        self.chi_f.check("chi_f")?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivitySample {
    pub chi_kappa: f64,
    pub chi_e: f64,
    pub chi_c: f64,
    pub chi_f: f64,
    pub metrics: ComparisonMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub seed: u64,
    pub samples: Vec<SensitivitySample>,
    pub mean_d_geo_norm: f64,
    pub std_d_geo_norm: f64,
}

/// Samples coupling vectors uniformly inside `spec` and compares each
/// coupled equilibrium with the passive one. Sample `i` draws from substream
/// `i` of `base.seed()`, so a study is reproducible from its parameters and
/// growing `samples` leaves the earlier draws unchanged.
pub fn sensitivity(
    base: &Parameters,
    spec: &SensitivitySpec,
    support: SupportType,
    opts: &SolverOptions,
) -> Result<SensitivityReport, IecError> {
    spec.validate()?;
    let passive_params = base
        .to_builder()
        .chi_kappa(0.0)
        .chi_e(0.0)
        .chi_c(0.0)
        .chi_f(0.0)
        .build()?;
    let passive = solve_with(passive_params, support, opts)?;

    let mut samples = Vec::with_capacity(spec.samples);
    for index in 0..spec.samples {
        let mut rng = RngHandle::substream(base.seed(), index as u64);
        let chi_kappa = rng.uniform(spec.chi_kappa.min, spec.chi_kappa.max);
        let chi_e = rng.uniform(spec.chi_e.min, spec.chi_e.max);
        let chi_c = rng.uniform(spec.chi_c.min, spec.chi_c.max);
        let chi_f = rng.uniform(spec.chi_f.min, spec.chi_f.max);
        let params = base
            .to_builder()
            .chi_kappa(chi_kappa)
            .chi_e(chi_e)
            .chi_c(chi_c)
            .chi_f(chi_f)
            .build()?;
        let coupled = solve_with(params, support, opts)?;
        let metrics = compare(&passive, &coupled, &spec.weight)?;
        info!(index, chi_kappa, chi_e, chi_f, d_geo_norm = metrics.geodesic.d_geo_norm, "sensitivity sample");
        samples.push(SensitivitySample {
            chi_kappa,
            chi_e,
            chi_c,
            chi_f,
            metrics,
        });
    }

    let n = samples.len() as f64;
    let mean = samples.iter().map(|s| s.metrics.geodesic.d_geo_norm).sum::<f64>() / n;
    let variance = samples
        .iter()
        .map(|s| (s.metrics.geodesic.d_geo_norm - mean).powi(2))
        .sum::<f64>()
        / n;
    Ok(SensitivityReport {
        seed: base.seed(),
        samples,
        mean_d_geo_norm: mean,
        std_d_geo_norm: variance.sqrt(),
    })
}
