//! Arc-length grids.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, IecError};

fn grid_error(info: ErrorInfo) -> IecError {
    IecError::Grid(info)
}

/// Strictly increasing arc-length coordinates `s`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Grid {
    s: Vec<f64>,
}

impl Grid {
    /// Validates and wraps the provided coordinates.
    pub fn new(s: Vec<f64>) -> Result<Self, IecError> {
        check_monotone(&s)?;
        Ok(Self { s })
    }

    /// Uniform grid of `n_nodes` points spanning `[0, length]`.
    pub fn uniform(length: f64, n_nodes: usize) -> Result<Self, IecError> {
        if !length.is_finite() || length <= 0.0 {
            return Err(grid_error(
                ErrorInfo::new("non-positive-length", "grid length must be positive")
                    .with_context("length", length),
            ));
        }
        if n_nodes < 2 {
            return Err(grid_error(
                ErrorInfo::new("too-few-nodes", "a grid needs at least two nodes")
                    .with_context("n_nodes", n_nodes),
            ));
        }
        let step = length / (n_nodes - 1) as f64;
        let mut s: Vec<f64> = (0..n_nodes).map(|idx| idx as f64 * step).collect();
        // Pin the last node so the span is exact.
        s[n_nodes - 1] = length;
        Self::new(s)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.s.len()
    }

    /// Always false: a valid grid holds at least two nodes.
    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    /// Total span `s_last - s_first`.
    pub fn length(&self) -> f64 {
        self.s[self.s.len() - 1] - self.s[0]
    }

    /// First coordinate.
    pub fn start(&self) -> f64 {
        self.s[0]
    }

    /// Last coordinate.
    pub fn end(&self) -> f64 {
        self.s[self.s.len() - 1]
    }

    /// Mean node spacing.
    pub fn spacing(&self) -> f64 {
        self.length() / (self.s.len() - 1) as f64
    }

    /// True when every interval matches the mean spacing to a relative `1e-9`.
    pub fn is_uniform(&self) -> bool {
        let h = self.spacing();
        self.s
            .windows(2)
            .all(|pair| ((pair[1] - pair[0]) - h).abs() <= 1e-9 * h.max(f64::MIN_POSITIVE))
    }

    /// Borrowed coordinates.
    pub fn as_slice(&self) -> &[f64] {
        &self.s
    }

    /// Whether two grids describe the same nodes within `tol`.
    pub fn matches(&self, other: &Grid, tol: f64) -> bool {
        self.len() == other.len()
            && self
                .s
                .iter()
                .zip(other.s.iter())
                .all(|(a, b)| (a - b).abs() <= tol)
    }
}

impl TryFrom<Vec<f64>> for Grid {
    type Error = IecError;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        Grid::new(value)
    }
}

impl From<Grid> for Vec<f64> {
    fn from(grid: Grid) -> Self {
        grid.s
    }
}

/// Checks that `s` has at least two finite, strictly increasing entries.
pub fn check_monotone(s: &[f64]) -> Result<(), IecError> {
    if s.len() < 2 {
        return Err(grid_error(
            ErrorInfo::new("too-few-nodes", "a grid needs at least two nodes")
                .with_context("n_nodes", s.len()),
        ));
    }
    if let Some(index) = s.iter().position(|value| !value.is_finite()) {
        return Err(grid_error(
            ErrorInfo::new("non-finite", "grid coordinates must be finite")
                .with_context("index", index),
        ));
    }
    if let Some(index) = s.windows(2).position(|pair| pair[1] <= pair[0]) {
        return Err(grid_error(
            ErrorInfo::new(
                "not-increasing",
                "grid coordinates must be strictly increasing",
            )
            .with_context("index", index + 1)
            .with_context("previous", s[index])
            .with_context("value", s[index + 1]),
        ));
    }
    Ok(())
}
