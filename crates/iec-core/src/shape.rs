//! Field-shape and constitutive-model selectors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, IecError};

fn mode_error(kind: &str, selector: &str, known: &[&str]) -> IecError {
    IecError::UnrecognizedMode(
        ErrorInfo::new("unknown-selector", format!("unrecognized {kind} selector"))
            .with_context("selector", selector)
            .with_hint(format!("expected one of: {}", known.join(", "))),
    )
}

/// Analytic information-field shape, one variant per family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum FieldShape {
    /// `I(s) = amplitude`.
    Constant {
        /// Uniform field value.
        amplitude: f64,
    },
    /// `I(s) = offset + gradient * s`.
    Linear {
        /// Value at `s = 0`.
        offset: f64,
        /// Slope per unit arc length.
        gradient: f64,
    },
    /// `I(s) = amplitude * exp(-(s - center)^2 / (2 width^2))`.
    Gaussian {
        /// Peak value.
        amplitude: f64,
        /// Arc-length position of the peak.
        center: f64,
        /// Standard deviation in arc length.
        width: f64,
    },
    /// `I(s) = amplitude * H(s - center)` with `H(0) = 1`.
    Step {
        /// Height of the step.
        amplitude: f64,
        /// Arc-length position of the jump.
        center: f64,
    },
}

/// Loose shape arguments as they arrive from configuration text.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ShapeArgs {
    /// Amplitude for constant, gaussian and step shapes.
    #[serde(default)]
    pub amplitude: Option<f64>,
    /// Offset for the linear shape.
    #[serde(default)]
    pub offset: Option<f64>,
    /// Slope for the linear shape.
    #[serde(default)]
    pub gradient: Option<f64>,
    /// Centre for gaussian and step shapes. Defaults to mid-span.
    #[serde(default)]
    pub center: Option<f64>,
    /// Width for the gaussian shape. Defaults to a tenth of the span.
    #[serde(default)]
    pub width: Option<f64>,
}

impl FieldShape {
    /// Selector names accepted by [`FieldShape::from_selector`].
    pub const SELECTORS: [&'static str; 4] = ["constant", "linear", "gaussian", "step"];

    /// Resolves a string selector into a shape for a rod of `length`.
    pub fn from_selector(selector: &str, args: &ShapeArgs, length: f64) -> Result<Self, IecError> {
        let amplitude = args.amplitude.unwrap_or(1.0);
        let center = args.center.unwrap_or(0.5 * length);
        match selector.trim().to_ascii_lowercase().as_str() {
            "constant" => Ok(FieldShape::Constant { amplitude }),
            "linear" => Ok(FieldShape::Linear {
                offset: args.offset.unwrap_or(0.0),
                gradient: args.gradient.unwrap_or(1.0),
            }),
            "gaussian" => Ok(FieldShape::Gaussian {
                amplitude,
                center,
                width: args.width.unwrap_or(0.1 * length),
            }),
            "step" | "heaviside" => Ok(FieldShape::Step { amplitude, center }),
            other => Err(mode_error("field shape", other, &Self::SELECTORS)),
        }
    }

    /// Selector name of the variant.
    pub fn selector(&self) -> &'static str {
        match self {
            FieldShape::Constant { .. } => "constant",
            FieldShape::Linear { .. } => "linear",
            FieldShape::Gaussian { .. } => "gaussian",
            FieldShape::Step { .. } => "step",
        }
    }

    /// Loose arguments that reproduce this shape through [`FieldShape::from_selector`].
    pub fn to_args(&self) -> ShapeArgs {
        match *self {
            FieldShape::Constant { amplitude } => ShapeArgs {
                amplitude: Some(amplitude),
                ..ShapeArgs::default()
            },
            FieldShape::Linear { offset, gradient } => ShapeArgs {
                offset: Some(offset),
                gradient: Some(gradient),
                ..ShapeArgs::default()
            },
            FieldShape::Gaussian {
                amplitude,
                center,
                width,
            } => ShapeArgs {
                amplitude: Some(amplitude),
                center: Some(center),
                width: Some(width),
                ..ShapeArgs::default()
            },
            FieldShape::Step { amplitude, center } => ShapeArgs {
                amplitude: Some(amplitude),
                center: Some(center),
                ..ShapeArgs::default()
            },
        }
    }

    /// Evaluates the shape at arc length `s`.
    pub fn value_at(&self, s: f64) -> f64 {
        match *self {
            FieldShape::Constant { amplitude } => amplitude,
            FieldShape::Linear { offset, gradient } => offset + gradient * s,
            FieldShape::Gaussian {
                amplitude,
                center,
                width,
            } => {
                let z = (s - center) / width;
                amplitude * (-0.5 * z * z).exp()
            }
            FieldShape::Step { amplitude, center } => {
                if s >= center {
                    amplitude
                } else {
                    0.0
                }
            }
        }
    }
}

impl Default for FieldShape {
    fn default() -> Self {
        FieldShape::Constant { amplitude: 0.0 }
    }
}

/// Constitutive law mapping the field into effective stiffness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StiffnessModel {
    /// `E = E0 * (1 + chi_E * I)`.
    #[default]
    Linear,
    /// `E = E0 * exp(chi_E * I)`, strictly positive.
    Exponential,
}

impl StiffnessModel {
    const SELECTORS: [&'static str; 2] = ["linear", "exponential"];
}

impl FromStr for StiffnessModel {
    type Err = IecError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(StiffnessModel::Linear),
            "exponential" | "exp" => Ok(StiffnessModel::Exponential),
            other => Err(mode_error("stiffness model", other, &Self::SELECTORS)),
        }
    }
}

impl fmt::Display for StiffnessModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StiffnessModel::Linear => f.write_str("linear"),
            StiffnessModel::Exponential => f.write_str("exponential"),
        }
    }
}

/// Support condition applied to the rod ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SupportType {
    /// Clamped base, free tip: `theta(0) = 0`.
    #[default]
    Cantilever,
    /// Angle held at both ends: `theta(0) = theta(L) = 0`.
    PinnedPinned,
}

impl SupportType {
    const SELECTORS: [&'static str; 2] = ["cantilever", "pinned-pinned"];
}

impl FromStr for SupportType {
    type Err = IecError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cantilever" | "clamped-free" => Ok(SupportType::Cantilever),
            "pinned-pinned" | "pinned_pinned" | "pinned" => Ok(SupportType::PinnedPinned),
            other => Err(mode_error("support type", other, &Self::SELECTORS)),
        }
    }
}

impl fmt::Display for SupportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupportType::Cantilever => f.write_str("cantilever"),
            SupportType::PinnedPinned => f.write_str("pinned-pinned"),
        }
    }
}
