use iec_core::{
    ensure_finite, ensure_same_len, ErrorInfo, FieldShape, Grid, IecError, Parameters, RngHandle,
};
use serde::{Deserialize, Serialize};

use crate::gradient::gradient;

/// Scalar information field `I(s)` and its derivative on a [`Grid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FieldRecord", into = "FieldRecord")]
pub struct InformationField {
    grid: Grid,
    values: Vec<f64>,
    gradient: Vec<f64>,
}

#[derive(Serialize, Deserialize)]
struct FieldRecord {
    s: Grid,
    values: Vec<f64>,
    gradient: Vec<f64>,
}

impl TryFrom<FieldRecord> for InformationField {
    type Error = IecError;

    fn try_from(record: FieldRecord) -> Result<Self, Self::Error> {
        InformationField::from_samples(&record.s, record.values, Some(record.gradient))
    }
}

impl From<InformationField> for FieldRecord {
    fn from(field: InformationField) -> Self {
        FieldRecord {
            s: field.grid,
            values: field.values,
            gradient: field.gradient,
        }
    }
}

impl InformationField {
    /// Samples an analytic shape and differentiates it numerically.
    pub fn sample(grid: &Grid, shape: &FieldShape) -> Result<Self, IecError> {
        let values: Vec<f64> = grid.as_slice().iter().map(|&s| shape.value_at(s)).collect();
        Self::from_samples(grid, values, None)
    }

    /// Samples the shape carried by `params` on its own grid.
    pub fn from_params(params: &Parameters) -> Result<Self, IecError> {
        Self::sample(&params.grid()?, params.field_shape())
    }

    /// Wraps externally supplied samples. The derivative is computed by finite
    /// differences unless `gradient` is provided.
    pub fn from_samples(
        grid: &Grid,
        values: Vec<f64>,
        gradient_values: Option<Vec<f64>>,
    ) -> Result<Self, IecError> {
        ensure_same_len("information values", grid.len(), values.len())?;
        ensure_finite("information values", &values)?;
        let gradient_values = match gradient_values {
            Some(supplied) => {
                ensure_same_len("information gradient", grid.len(), supplied.len())?;
                supplied
            }
            None => gradient(grid.as_slice(), &values)?,
        };
        ensure_finite("information gradient", &gradient_values)?;
        Ok(Self {
            grid: grid.clone(),
            values,
            gradient: gradient_values,
        })
    }

    /// Samples a callable with a finite-difference derivative.
    pub fn from_fn(grid: &Grid, f: impl Fn(f64) -> f64) -> Result<Self, IecError> {
        let values = grid.as_slice().iter().map(|&s| f(s)).collect();
        Self::from_samples(grid, values, None)
    }

    /// Samples a callable together with its exact derivative.
    pub fn from_fn_with_derivative(
        grid: &Grid,
        f: impl Fn(f64) -> f64,
        df: impl Fn(f64) -> f64,
    ) -> Result<Self, IecError> {
        let values = grid.as_slice().iter().map(|&s| f(s)).collect();
        let derivative = grid.as_slice().iter().map(|&s| df(s)).collect();
        Self::from_samples(grid, values, Some(derivative))
    }

    /// Identically zero field.
    pub fn zeros(grid: &Grid) -> Self {
        Self {
            grid: grid.clone(),
            values: vec![0.0; grid.len()],
            gradient: vec![0.0; grid.len()],
        }
    }

    /// Arc-length grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Arc-length coordinates.
    pub fn s(&self) -> &[f64] {
        self.grid.as_slice()
    }

    /// `I(s)` samples.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `dI/ds` samples.
    pub fn gradient(&self) -> &[f64] {
        &self.gradient
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed field.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Pointwise sum with a field on the same grid.
    pub fn superpose(&self, other: &InformationField) -> Result<Self, IecError> {
        if !self.grid.matches(&other.grid, 1e-12) {
            return Err(IecError::ShapeMismatch(
                ErrorInfo::new("grid-mismatch", "fields must share a grid to be superposed")
                    .with_context("left", self.len())
                    .with_context("right", other.len()),
            ));
        }
        Ok(Self {
            grid: self.grid.clone(),
            values: add(&self.values, &other.values),
            gradient: add(&self.gradient, &other.gradient),
        })
    }

    /// Field multiplied by a constant.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            grid: self.grid.clone(),
            values: self.values.iter().map(|v| v * factor).collect(),
            gradient: self.gradient.iter().map(|v| v * factor).collect(),
        }
    }

    /// Adds uniform noise in `[-amplitude, amplitude]` to every sample and
    /// re-differentiates. The caller owns the RNG state.
    pub fn perturbed(&self, amplitude: f64, rng: &mut RngHandle) -> Result<Self, IecError> {
        let values = self
            .values
            .iter()
            .map(|v| v + rng.uniform(-amplitude, amplitude))
            .collect();
        Self::from_samples(&self.grid, values, None)
    }

    /// `(min, max)` of `I(s)`.
    pub fn value_range(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// `max |dI/ds|`.
    pub fn max_abs_gradient(&self) -> f64 {
        self.gradient.iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }
}

fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b.iter()).map(|(x, y)| x + y).collect()
}
