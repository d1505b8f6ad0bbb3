//! Coupling engine: maps an information field into mechanical bias terms.
//!
//! Three independent mappings are exposed, each a pure function of the field
//! and the parameters: target curvature, effective stiffness/damping and
//! active moment. [`apply_coupling`] runs all of them after the optional
//! gravity and buoyancy augmentation.

mod baseline;
mod environment;
mod mapping;

pub use baseline::BaselineCurvature;
pub use environment::{augment_with_environment, buoyancy_information, gravity_information};
pub use mapping::{
    active_moment, apply_coupling, curvature_bias, stiffness_bias, MechanicalBiasFields,
    StiffnessFields,
};
