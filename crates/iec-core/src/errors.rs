//! Structured error types shared across IEC crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`IecError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (parameter names, lengths, residuals, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the IEC engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum IecError {
    /// A bounded parameter was outside its declared range at construction.
    #[error("parameter range error: {0}")]
    ParameterRange(ErrorInfo),
    /// Co-registered arrays disagree in length.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(ErrorInfo),
    /// A string selector did not name a known mode.
    #[error("unrecognized mode: {0}")]
    UnrecognizedMode(ErrorInfo),
    /// The boundary-value iteration exhausted its budget.
    #[error("convergence error: {0}")]
    Convergence(ErrorInfo),
    /// A converged solution failed a hard validation gate.
    #[error("validation error: {0}")]
    Validation(ErrorInfo),
    /// NaN or infinite values were detected.
    #[error("numerical failure: {0}")]
    NumericalFailure(ErrorInfo),
    /// The closed-form oracle was invoked with non-zero couplings.
    #[error("analytical precondition error: {0}")]
    AnalyticalPrecondition(ErrorInfo),
    /// Arc-length arrays that are too short, non-finite or not increasing.
    #[error("grid error: {0}")]
    Grid(ErrorInfo),
    /// Serialization, configuration parsing and export errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl IecError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            IecError::ParameterRange(info)
            | IecError::ShapeMismatch(info)
            | IecError::UnrecognizedMode(info)
            | IecError::Convergence(info)
            | IecError::Validation(info)
            | IecError::NumericalFailure(info)
            | IecError::AnalyticalPrecondition(info)
            | IecError::Grid(info)
            | IecError::Serde(info) => info,
        }
    }

    /// Short family label, matching the serialized `family` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            IecError::ParameterRange(_) => "ParameterRange",
            IecError::ShapeMismatch(_) => "ShapeMismatch",
            IecError::UnrecognizedMode(_) => "UnrecognizedMode",
            IecError::Convergence(_) => "Convergence",
            IecError::Validation(_) => "Validation",
            IecError::NumericalFailure(_) => "NumericalFailure",
            IecError::AnalyticalPrecondition(_) => "AnalyticalPrecondition",
            IecError::Grid(_) => "Grid",
            IecError::Serde(_) => "Serde",
        }
    }
}

/// Fails with [`IecError::ShapeMismatch`] unless `actual == expected`.
pub fn ensure_same_len(what: &str, expected: usize, actual: usize) -> Result<(), IecError> {
    if expected == actual {
        return Ok(());
    }
    Err(IecError::ShapeMismatch(
        ErrorInfo::new("length-mismatch", format!("{what} does not match the grid length"))
            .with_context("expected", expected)
            .with_context("actual", actual),
    ))
}

/// Fails with [`IecError::NumericalFailure`] at the first non-finite entry.
pub fn ensure_finite(what: &str, values: &[f64]) -> Result<(), IecError> {
    match values.iter().position(|value| !value.is_finite()) {
        None => Ok(()),
        Some(index) => Err(IecError::NumericalFailure(
            ErrorInfo::new("non-finite", format!("{what} contains NaN or infinite values"))
                .with_context("index", index)
                .with_context("value", values[index]),
        )),
    }
}
