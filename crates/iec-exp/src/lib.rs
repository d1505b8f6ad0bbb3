//! Experiment drivers over the IEC engine.
//!
//! A [`sweep`] re-solves the rod for each value of one parameter and compares
//! every point against the first. A [`sensitivity`] study samples coupling
//! vectors from an explicit seeded RNG and compares each sample with the
//! passive equilibrium.

pub mod sensitivity;
pub mod sweep;

pub use sensitivity::{sensitivity, CouplingRange, SensitivityReport, SensitivitySample, SensitivitySpec};
pub use sweep::{sweep, SweepAxis, SweepPoint, SweepReport, SweepSpec};
