//! Comparison metrics and the eigenvalue stability test for IEC equilibria.
//!
//! [`compare`] measures how far an information-coupled equilibrium departs
//! from a reference one, optionally weighting the curvature difference by the
//! countercurvature metric `g_eff = exp(2φ)`. [`stability_analysis`] flags
//! symmetry-breaking instabilities of the linearised coupled operator.

pub mod compare;
pub mod countercurvature;
pub mod energy;
pub mod geodesic;
pub mod stability;

pub use compare::{compare, ComparisonMetrics, MetricWeight};
pub use countercurvature::countercurvature_metric;
pub use energy::{
    bending_energy, centerline_energy_difference, curvature_energy_difference, metric_deviation,
    node_drift, shape_preservation_index, NodeDrift, SHAPE_INDEX_CAP,
};
pub use geodesic::{geodesic_deviation, GeodesicDeviation, GEODESIC_EPS};
pub use stability::{
    assemble_operator, critical_potential, gravity_parameter, stability_analysis,
    BoundaryInjection, BoundaryKind, Clamped, Pinned, StabilityOptions, StabilityReport,
    MAX_EIGEN_NODES,
};
