//! Information field generation for the IEC engine.
//!
//! A field is sampled from one of the analytic [`iec_core::FieldShape`]
//! variants, from a callable, or from external arrays. Derivatives come from a
//! second-order central difference unless an exact derivative is supplied.

mod field;
mod gradient;

pub use field::InformationField;
pub use gradient::{cumulative_trapezoid, gradient, trapezoid};
