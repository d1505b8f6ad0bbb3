#![deny(missing_docs)]
#![doc = "Core error, grid, parameter and provenance types for the information-elasticity coupling (IEC) engine."]

pub mod errors;
pub mod grid;
pub mod hash;
pub mod params;
pub mod provenance;
pub mod rng;
pub mod serde;
mod shape;

pub use errors::{ensure_finite, ensure_same_len, ErrorInfo, IecError};
pub use grid::{check_monotone, Grid};
pub use hash::stable_hash_string;
pub use params::{bounds, FieldSpec, LoadSpec, ParamBound, ParameterSpec, Parameters, ParametersBuilder};
pub use provenance::{build_revision, SchemaVersion, SolverProvenance};
pub use rng::{derive_substream_seed, RngHandle};
pub use shape::{FieldShape, ShapeArgs, StiffnessModel, SupportType};
