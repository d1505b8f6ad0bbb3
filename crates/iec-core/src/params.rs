//! Validated, immutable model parameters.
//!
//! [`Parameters`] can only be obtained through [`ParametersBuilder::build`] or
//! [`Parameters::from_spec`]. Both run every bound in [`bounds`] and fail with
//! [`IecError::ParameterRange`] instead of clamping. The loose, serde-friendly
//! [`ParameterSpec`] is the configuration surface: every field has a default,
//! so partial YAML or JSON documents load.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, IecError};
use crate::grid::Grid;
use crate::hash::stable_hash_string;
use crate::serde::{from_json_str, from_yaml_str};
use crate::shape::{FieldShape, ShapeArgs, StiffnessModel};

/// Declared numeric range of a bounded parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamBound {
    /// Parameter name reported in errors.
    pub name: &'static str,
    /// Lower limit.
    pub min: f64,
    /// Upper limit (inclusive).
    pub max: f64,
    /// Whether `min` itself is excluded.
    pub min_exclusive: bool,
}

impl ParamBound {
    const fn closed(name: &'static str, min: f64, max: f64) -> Self {
        Self {
            name,
            min,
            max,
            min_exclusive: false,
        }
    }

    const fn positive(name: &'static str, max: f64) -> Self {
        Self {
            name,
            min: 0.0,
            max,
            min_exclusive: true,
        }
    }

    /// Returns `value` unchanged when it lies inside the range.
    pub fn check(&self, value: f64) -> Result<f64, IecError> {
        let above_min = if self.min_exclusive {
            value > self.min
        } else {
            value >= self.min
        };
        if value.is_finite() && above_min && value <= self.max {
            return Ok(value);
        }
        let open = if self.min_exclusive { "(" } else { "[" };
        Err(IecError::ParameterRange(
            ErrorInfo::new(
                "out-of-range",
                format!("{} lies outside its declared range", self.name),
            )
            .with_context("name", self.name)
            .with_context("value", value)
            .with_context("min", self.min)
            .with_context("max", self.max)
            .with_hint(format!("declared range is {open}{}, {}]", self.min, self.max)),
        ))
    }
}

/// Declared ranges for every bounded scalar.
pub mod bounds {
    use super::ParamBound;

    /// Curvature-bias coupling χ_κ.
    pub const CHI_KAPPA: ParamBound = ParamBound::closed("chi_kappa", 0.0, 0.1);
    /// Stiffness-bias coupling χ_E.
    pub const CHI_E: ParamBound = ParamBound::closed("chi_e", -0.5, 0.5);
    /// Damping-bias coupling χ_C.
    pub const CHI_C: ParamBound = ParamBound::closed("chi_c", -0.5, 0.5);
    /// Active-moment coupling χ_f in N·m.
    pub const CHI_F: ParamBound = ParamBound::closed("chi_f", -1.0, 1.0);
    /// Baseline Young's modulus E₀ in Pa.
    pub const YOUNGS_MODULUS: ParamBound = ParamBound::closed("youngs_modulus", 1e3, 1e12);
    /// Baseline damping C₀.
    pub const DAMPING: ParamBound = ParamBound::closed("damping", 0.0, 1e9);
    /// Tissue density in kg/m³.
    pub const DENSITY: ParamBound = ParamBound::closed("density", 1.0, 2e4);
    /// Cross-sectional area in m².
    pub const AREA: ParamBound = ParamBound::positive("area", 1.0);
    /// Second moment of area in m⁴.
    pub const SECOND_MOMENT: ParamBound = ParamBound::positive("second_moment", 1.0);
    /// Rod length in m.
    pub const LENGTH: ParamBound = ParamBound::positive("length", 100.0);
    /// Length scale multiplying the field gradient.
    pub const LENGTH_SCALE: ParamBound = ParamBound::positive("length_scale", 100.0);
    /// Tip (or midspan) point load in N.
    pub const TIP_LOAD: ParamBound = ParamBound::closed("tip_load", -1e6, 1e6);
    /// Distributed load in N/m.
    pub const DISTRIBUTED_LOAD: ParamBound = ParamBound::closed("distributed_load", -1e6, 1e6);
    /// Gravitational acceleration in m/s².
    pub const GRAVITY: ParamBound = ParamBound::closed("gravity", 0.0, 100.0);
    /// Surrounding fluid density in kg/m³.
    pub const FLUID_DENSITY: ParamBound = ParamBound::closed("fluid_density", 0.0, 2e4);
    /// Immersion depth of the rod base in m.
    pub const IMMERSION_DEPTH: ParamBound = ParamBound::closed("immersion_depth", 0.0, 1e4);
    /// Weight of the gravity-derived information component.
    pub const GRAVITY_INFO_WEIGHT: ParamBound =
        ParamBound::closed("gravity_info_weight", -10.0, 10.0);
    /// Weight of the buoyancy-derived information component.
    pub const BUOYANCY_INFO_WEIGHT: ParamBound =
        ParamBound::closed("buoyancy_info_weight", -10.0, 10.0);
    /// Pressure normalising the environmental information components, in Pa.
    pub const REFERENCE_PRESSURE: ParamBound = ParamBound::positive("reference_pressure", 1e9);
    /// Lower stiffness clamp multiple.
    pub const CLAMP_MIN: ParamBound = ParamBound::positive("stiffness_clamp_min", 1.0);
    /// Upper stiffness clamp multiple.
    pub const CLAMP_MAX: ParamBound = ParamBound::closed("stiffness_clamp_max", 1.0, 1e3);
    /// Smallest accepted node count.
    pub const MIN_NODES: usize = 4;
    /// Largest accepted node count.
    pub const MAX_NODES: usize = 20_000;
}

/// External load and environment description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadSpec {
    /// Point load at the tip (cantilever) or midspan (pinned-pinned), N.
    #[serde(default = "default_tip_load")]
    pub tip_load: f64,
    /// Uniform distributed load, N/m.
    #[serde(default)]
    pub distributed_load: f64,
    /// Adds the buoyancy-corrected self weight `(rho - rho_f) A g` to the distributed load.
    #[serde(default)]
    pub self_weight: bool,
    /// Gravitational acceleration, m/s².
    #[serde(default = "default_gravity")]
    pub gravity: f64,
    /// Density of the surrounding fluid, kg/m³.
    #[serde(default)]
    pub fluid_density: f64,
    /// Depth of the rod base below the fluid surface, m.
    #[serde(default)]
    pub immersion_depth: f64,
    /// Weight of the gravity-derived information component (0 disables it).
    #[serde(default)]
    pub gravity_info_weight: f64,
    /// Weight of the buoyancy-derived information component (0 disables it).
    #[serde(default)]
    pub buoyancy_info_weight: f64,
    /// Pressure normalising the environmental components, Pa.
    #[serde(default = "default_reference_pressure")]
    pub reference_pressure: f64,
}

fn default_tip_load() -> f64 {
    1.0
}

fn default_gravity() -> f64 {
    9.81
}

fn default_reference_pressure() -> f64 {
    1.0e4
}

impl Default for LoadSpec {
    fn default() -> Self {
        Self {
            tip_load: default_tip_load(),
            distributed_load: 0.0,
            self_weight: false,
            gravity: default_gravity(),
            fluid_density: 0.0,
            immersion_depth: 0.0,
            gravity_info_weight: 0.0,
            buoyancy_info_weight: 0.0,
            reference_pressure: default_reference_pressure(),
        }
    }
}

impl LoadSpec {
    fn validate(&self) -> Result<(), IecError> {
        bounds::TIP_LOAD.check(self.tip_load)?;
        bounds::DISTRIBUTED_LOAD.check(self.distributed_load)?;
        bounds::GRAVITY.check(self.gravity)?;
        bounds::FLUID_DENSITY.check(self.fluid_density)?;
        bounds::IMMERSION_DEPTH.check(self.immersion_depth)?;
        bounds::GRAVITY_INFO_WEIGHT.check(self.gravity_info_weight)?;
        bounds::BUOYANCY_INFO_WEIGHT.check(self.buoyancy_info_weight)?;
        bounds::REFERENCE_PRESSURE.check(self.reference_pressure)?;
        Ok(())
    }

    /// Whether either environmental information component is active.
    pub fn has_environment_coupling(&self) -> bool {
        self.gravity_info_weight != 0.0 || self.buoyancy_info_weight != 0.0
    }
}

/// Information-field section of a [`ParameterSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Shape selector: `constant`, `linear`, `gaussian` or `step`.
    #[serde(default = "default_field_mode")]
    pub mode: String,
    /// Shape arguments; missing entries take shape-specific defaults.
    #[serde(flatten)]
    pub args: ShapeArgs,
}

fn default_field_mode() -> String {
    "constant".to_string()
}

impl Default for FieldSpec {
    fn default() -> Self {
        Self {
            mode: default_field_mode(),
            args: ShapeArgs {
                amplitude: Some(0.0),
                ..ShapeArgs::default()
            },
        }
    }
}

/// Loose configuration record converted into [`Parameters`] by validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Curvature-bias coupling χ_κ.
    #[serde(default)]
    pub chi_kappa: f64,
    /// Stiffness-bias coupling χ_E.
    #[serde(default)]
    pub chi_e: f64,
    /// Damping-bias coupling χ_C.
    #[serde(default)]
    pub chi_c: f64,
    /// Active-moment coupling χ_f.
    #[serde(default)]
    pub chi_f: f64,
    /// Baseline Young's modulus E₀.
    #[serde(default = "default_youngs_modulus")]
    pub youngs_modulus: f64,
    /// Baseline damping C₀.
    #[serde(default = "default_damping")]
    pub damping: f64,
    /// Tissue density ρ.
    #[serde(default = "default_density")]
    pub density: f64,
    /// Cross-sectional area A.
    #[serde(default = "default_area")]
    pub area: f64,
    /// Second moment of area I.
    #[serde(default = "default_second_moment")]
    pub second_moment: f64,
    /// Rod length L.
    #[serde(default = "default_length")]
    pub length: f64,
    /// Number of grid nodes.
    #[serde(default = "default_n_nodes")]
    pub n_nodes: usize,
    /// Length scale multiplying dI/ds; defaults to `length`.
    #[serde(default)]
    pub length_scale: Option<f64>,
    /// Constitutive model selector: `linear` or `exponential`.
    #[serde(default = "default_stiffness_model")]
    pub stiffness_model: String,
    /// `[min, max]` multiples of the baseline applied to effective stiffness and damping.
    #[serde(default = "default_stiffness_clamp")]
    pub stiffness_clamp: [f64; 2],
    /// Information field description.
    #[serde(default)]
    pub field: FieldSpec,
    /// Loads and environment.
    #[serde(default)]
    pub loads: LoadSpec,
    /// Master seed for stochastic studies.
    #[serde(default)]
    pub seed: u64,
}

fn default_youngs_modulus() -> f64 {
    1.0e9
}

fn default_damping() -> f64 {
    10.0
}

fn default_density() -> f64 {
    1100.0
}

fn default_area() -> f64 {
    std::f64::consts::PI * 1.0e-4
}

fn default_second_moment() -> f64 {
    std::f64::consts::PI * 1.0e-8 / 4.0
}

fn default_length() -> f64 {
    0.4
}

fn default_n_nodes() -> usize {
    100
}

fn default_stiffness_model() -> String {
    "linear".to_string()
}

fn default_stiffness_clamp() -> [f64; 2] {
    [0.1, 10.0]
}

impl Default for ParameterSpec {
    fn default() -> Self {
        Self {
            chi_kappa: 0.0,
            chi_e: 0.0,
            chi_c: 0.0,
            chi_f: 0.0,
            youngs_modulus: default_youngs_modulus(),
            damping: default_damping(),
            density: default_density(),
            area: default_area(),
            second_moment: default_second_moment(),
            length: default_length(),
            n_nodes: default_n_nodes(),
            length_scale: None,
            stiffness_model: default_stiffness_model(),
            stiffness_clamp: default_stiffness_clamp(),
            field: FieldSpec::default(),
            loads: LoadSpec::default(),
            seed: 0,
        }
    }
}

impl ParameterSpec {
    /// Parses a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, IecError> {
        from_yaml_str(text)
    }

    /// Parses a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self, IecError> {
        from_json_str(text)
    }
}

/// Immutable, range-validated parameter record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParameterSpec", into = "ParameterSpec")]
pub struct Parameters {
    chi_kappa: f64,
    chi_e: f64,
    chi_c: f64,
    chi_f: f64,
    youngs_modulus: f64,
    damping: f64,
    density: f64,
    area: f64,
    second_moment: f64,
    length: f64,
    n_nodes: usize,
    length_scale: f64,
    length_scale_explicit: bool,
    stiffness_model: StiffnessModel,
    stiffness_clamp: (f64, f64),
    field_shape: FieldShape,
    loads: LoadSpec,
    seed: u64,
}

impl Parameters {
    /// Starts a builder pre-filled with the documented defaults.
    pub fn builder() -> ParametersBuilder {
        ParametersBuilder::default()
    }

    /// Validates a loose configuration record.
    pub fn from_spec(spec: ParameterSpec) -> Result<Self, IecError> {
        let shape = FieldShape::from_selector(&spec.field.mode, &spec.field.args, spec.length)?;
        let model: StiffnessModel = spec.stiffness_model.parse()?;
        ParametersBuilder {
            chi_kappa: spec.chi_kappa,
            chi_e: spec.chi_e,
            chi_c: spec.chi_c,
            chi_f: spec.chi_f,
            youngs_modulus: spec.youngs_modulus,
            damping: spec.damping,
            density: spec.density,
            area: spec.area,
            second_moment: spec.second_moment,
            length: spec.length,
            n_nodes: spec.n_nodes,
            length_scale: spec.length_scale,
            stiffness_model: model,
            stiffness_clamp: (spec.stiffness_clamp[0], spec.stiffness_clamp[1]),
            field_shape: shape,
            loads: spec.loads,
            seed: spec.seed,
        }
        .build()
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, IecError> {
        Self::from_spec(ParameterSpec::from_yaml_str(text)?)
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self, IecError> {
        Self::from_spec(ParameterSpec::from_json_str(text)?)
    }

    /// Loose record that round-trips through [`Parameters::from_spec`].
    pub fn to_spec(&self) -> ParameterSpec {
        ParameterSpec {
            chi_kappa: self.chi_kappa,
            chi_e: self.chi_e,
            chi_c: self.chi_c,
            chi_f: self.chi_f,
            youngs_modulus: self.youngs_modulus,
            damping: self.damping,
            density: self.density,
            area: self.area,
            second_moment: self.second_moment,
            length: self.length,
            n_nodes: self.n_nodes,
            length_scale: self.length_scale_explicit.then_some(self.length_scale),
            stiffness_model: self.stiffness_model.to_string(),
            stiffness_clamp: [self.stiffness_clamp.0, self.stiffness_clamp.1],
            field: FieldSpec {
                mode: self.field_shape.selector().to_string(),
                args: self.field_shape.to_args(),
            },
            loads: self.loads,
            seed: self.seed,
        }
    }

    /// Builder seeded with these values, for deriving variants.
    pub fn to_builder(&self) -> ParametersBuilder {
        ParametersBuilder {
            chi_kappa: self.chi_kappa,
            chi_e: self.chi_e,
            chi_c: self.chi_c,
            chi_f: self.chi_f,
            youngs_modulus: self.youngs_modulus,
            damping: self.damping,
            density: self.density,
            area: self.area,
            second_moment: self.second_moment,
            length: self.length,
            n_nodes: self.n_nodes,
            length_scale: self.length_scale_explicit.then_some(self.length_scale),
            stiffness_model: self.stiffness_model,
            stiffness_clamp: self.stiffness_clamp,
            field_shape: self.field_shape,
            loads: self.loads,
            seed: self.seed,
        }
    }

    /// Stable SHA-256 of the canonical configuration record.
    pub fn content_hash(&self) -> Result<String, IecError> {
        stable_hash_string(&self.to_spec())
    }

    /// Uniform arc-length grid over `[0, length]` with `n_nodes` points.
    pub fn grid(&self) -> Result<Grid, IecError> {
        Grid::uniform(self.length, self.n_nodes)
    }

    /// True when all four coupling coefficients are exactly zero.
    pub fn couplings_are_zero(&self) -> bool {
        self.chi_kappa == 0.0 && self.chi_e == 0.0 && self.chi_c == 0.0 && self.chi_f == 0.0
    }

    /// Curvature-bias coupling χ_κ.
    pub fn chi_kappa(&self) -> f64 {
        self.chi_kappa
    }

    /// Stiffness-bias coupling χ_E.
    pub fn chi_e(&self) -> f64 {
        self.chi_e
    }

    /// Damping-bias coupling χ_C.
    pub fn chi_c(&self) -> f64 {
        self.chi_c
    }

    /// Active-moment coupling χ_f.
    pub fn chi_f(&self) -> f64 {
        self.chi_f
    }

    /// Baseline Young's modulus E₀.
    pub fn youngs_modulus(&self) -> f64 {
        self.youngs_modulus
    }

    /// Baseline damping C₀.
    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Tissue density ρ.
    pub fn density(&self) -> f64 {
        self.density
    }

    /// Cross-sectional area A.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Second moment of area I.
    pub fn second_moment(&self) -> f64 {
        self.second_moment
    }

    /// Baseline bending stiffness E₀·I.
    pub fn bending_stiffness(&self) -> f64 {
        self.youngs_modulus * self.second_moment
    }

    /// Rod length L.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Number of grid nodes.
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Length scale multiplying dI/ds in the curvature and moment couplings.
    pub fn length_scale(&self) -> f64 {
        self.length_scale
    }

    /// Constitutive model for the stiffness coupling.
    pub fn stiffness_model(&self) -> StiffnessModel {
        self.stiffness_model
    }

    /// `(min, max)` multiples of the baseline for effective stiffness and damping.
    pub fn stiffness_clamp(&self) -> (f64, f64) {
        self.stiffness_clamp
    }

    /// Analytic information-field shape.
    pub fn field_shape(&self) -> &FieldShape {
        &self.field_shape
    }

    /// Loads and environment.
    pub fn loads(&self) -> &LoadSpec {
        &self.loads
    }

    /// Master seed for stochastic studies.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl TryFrom<ParameterSpec> for Parameters {
    type Error = IecError;

    fn try_from(spec: ParameterSpec) -> Result<Self, Self::Error> {
        Parameters::from_spec(spec)
    }
}

impl From<Parameters> for ParameterSpec {
    fn from(params: Parameters) -> Self {
        params.to_spec()
    }
}

/// Validated builder for [`Parameters`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParametersBuilder {
    chi_kappa: f64,
    chi_e: f64,
    chi_c: f64,
    chi_f: f64,
    youngs_modulus: f64,
    damping: f64,
    density: f64,
    area: f64,
    second_moment: f64,
    length: f64,
    n_nodes: usize,
    length_scale: Option<f64>,
    stiffness_model: StiffnessModel,
    stiffness_clamp: (f64, f64),
    field_shape: FieldShape,
    loads: LoadSpec,
    seed: u64,
}

impl Default for ParametersBuilder {
    fn default() -> Self {
        let spec = ParameterSpec::default();
        Self {
            chi_kappa: spec.chi_kappa,
            chi_e: spec.chi_e,
            chi_c: spec.chi_c,
            chi_f: spec.chi_f,
            youngs_modulus: spec.youngs_modulus,
            damping: spec.damping,
            density: spec.density,
            area: spec.area,
            second_moment: spec.second_moment,
            length: spec.length,
            n_nodes: spec.n_nodes,
            length_scale: None,
            stiffness_model: StiffnessModel::Linear,
            stiffness_clamp: (spec.stiffness_clamp[0], spec.stiffness_clamp[1]),
            field_shape: FieldShape::default(),
            loads: spec.loads,
            seed: spec.seed,
        }
    }
}

macro_rules! setter {
    ($(#[$doc:meta])* $name:ident: $ty:ty) => {
        $(#[$doc])*
        pub fn $name(mut self, value: $ty) -> Self {
            self.$name = value;
            self
        }
    };
}

impl ParametersBuilder {
    setter!(
        /// Sets χ_κ.
        chi_kappa: f64
    );
    setter!(
        /// Sets χ_E.
        chi_e: f64
    );
    setter!(
        /// Sets χ_C.
        chi_c: f64
    );
    setter!(
        /// Sets χ_f.
        chi_f: f64
    );
    setter!(
        /// Sets E₀.
        youngs_modulus: f64
    );
    setter!(
        /// Sets C₀.
        damping: f64
    );
    setter!(
        /// Sets ρ.
        density: f64
    );
    setter!(
        /// Sets A.
        area: f64
    );
    setter!(
        /// Sets I.
        second_moment: f64
    );
    setter!(
        /// Sets L.
        length: f64
    );
    setter!(
        /// Sets the node count.
        n_nodes: usize
    );
    setter!(
        /// Sets the constitutive model.
        stiffness_model: StiffnessModel
    );
    setter!(
        /// Sets the information-field shape.
        field_shape: FieldShape
    );
    setter!(
        /// Replaces the load description.
        loads: LoadSpec
    );
    setter!(
        /// Sets the master seed.
        seed: u64
    );

    /// Sets an explicit length scale instead of following `length`.
    pub fn length_scale(mut self, value: f64) -> Self {
        self.length_scale = Some(value);
        self
    }

    /// Sets the `[min, max]` stiffness clamp multiples.
    pub fn stiffness_clamp(mut self, min: f64, max: f64) -> Self {
        self.stiffness_clamp = (min, max);
        self
    }

    /// Sets the point load.
    pub fn tip_load(mut self, value: f64) -> Self {
        self.loads.tip_load = value;
        self
    }

    /// Sets the distributed load.
    pub fn distributed_load(mut self, value: f64) -> Self {
        self.loads.distributed_load = value;
        self
    }

    /// Sets gravitational acceleration.
    pub fn gravity(mut self, value: f64) -> Self {
        self.loads.gravity = value;
        self
    }

    /// Checks every bound and produces the immutable record.
    pub fn build(self) -> Result<Parameters, IecError> {
        let chi_kappa = bounds::CHI_KAPPA.check(self.chi_kappa)?;
        let chi_e = bounds::CHI_E.check(self.chi_e)?;
        let chi_c = bounds::CHI_C.check(self.chi_c)?;
        let chi_f = bounds::CHI_F.check(self.chi_f)?;
        let youngs_modulus = bounds::YOUNGS_MODULUS.check(self.youngs_modulus)?;
        let damping = bounds::DAMPING.check(self.damping)?;
        let density = bounds::DENSITY.check(self.density)?;
        let area = bounds::AREA.check(self.area)?;
        let second_moment = bounds::SECOND_MOMENT.check(self.second_moment)?;
        let length = bounds::LENGTH.check(self.length)?;
        check_node_count(self.n_nodes)?;
        let length_scale = match self.length_scale {
            Some(value) => bounds::LENGTH_SCALE.check(value)?,
            None => length,
        };
        let clamp_min = bounds::CLAMP_MIN.check(self.stiffness_clamp.0)?;
        let clamp_max = bounds::CLAMP_MAX.check(self.stiffness_clamp.1)?;
        check_shape(&self.field_shape, length)?;
        self.loads.validate()?;

        Ok(Parameters {
            chi_kappa,
            chi_e,
            chi_c,
            chi_f,
            youngs_modulus,
            damping,
            density,
            area,
            second_moment,
            length,
            n_nodes: self.n_nodes,
            length_scale,
            length_scale_explicit: self.length_scale.is_some(),
            stiffness_model: self.stiffness_model,
            stiffness_clamp: (clamp_min, clamp_max),
            field_shape: self.field_shape,
            loads: self.loads,
            seed: self.seed,
        })
    }
}

fn check_node_count(n_nodes: usize) -> Result<(), IecError> {
    if (bounds::MIN_NODES..=bounds::MAX_NODES).contains(&n_nodes) {
        return Ok(());
    }
    Err(IecError::ParameterRange(
        ErrorInfo::new("out-of-range", "n_nodes lies outside its declared range")
            .with_context("name", "n_nodes")
            .with_context("value", n_nodes)
            .with_context("min", bounds::MIN_NODES)
            .with_context("max", bounds::MAX_NODES),
    ))
}

fn check_shape(shape: &FieldShape, length: f64) -> Result<(), IecError> {
    let finite = |name: &'static str, value: f64| {
        ParamBound::closed(name, f64::MIN, f64::MAX).check(value)
    };
    match *shape {
        FieldShape::Constant { amplitude } => {
            finite("field.amplitude", amplitude)?;
        }
        FieldShape::Linear { offset, gradient } => {
            finite("field.offset", offset)?;
            finite("field.gradient", gradient)?;
        }
        FieldShape::Gaussian {
            amplitude,
            center,
            width,
        } => {
            finite("field.amplitude", amplitude)?;
            ParamBound::closed("field.center", 0.0, length).check(center)?;
            ParamBound::positive("field.width", length).check(width)?;
        }
        FieldShape::Step { amplitude, center } => {
            finite("field.amplitude", amplitude)?;
            ParamBound::closed("field.center", 0.0, length).check(center)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let params = Parameters::builder().build().unwrap();
        assert_eq!(params.n_nodes(), 100);
        assert_eq!(params.length_scale(), params.length());
        assert!(params.couplings_are_zero());
        assert!((params.bending_stiffness() - 7.853981633974483).abs() < 1e-9);
    }

    #[test]
    fn chi_kappa_outside_range_is_rejected() {
        let err = Parameters::builder().chi_kappa(0.5).build().unwrap_err();
        let IecError::ParameterRange(info) = err else {
            panic!("expected a range error");
        };
        assert_eq!(info.context["name"], "chi_kappa");
        assert_eq!(info.context["max"], "0.1");
    }

    #[test]
    fn non_positive_length_is_rejected() {
        assert!(matches!(
            Parameters::builder().length(0.0).build(),
            Err(IecError::ParameterRange(_))
        ));
        assert!(matches!(
            Parameters::builder().youngs_modulus(-1.0).build(),
            Err(IecError::ParameterRange(_))
        ));
    }

    #[test]
    fn too_few_nodes_is_rejected() {
        let err = Parameters::builder().n_nodes(3).build().unwrap_err();
        assert_eq!(err.info().context["name"], "n_nodes");
    }

    #[test]
    fn gaussian_center_must_lie_on_rod() {
        let err = Parameters::builder()
            .field_shape(FieldShape::Gaussian {
                amplitude: 1.0,
                center: 0.9,
                width: 0.05,
            })
            .build()
            .unwrap_err();
        assert_eq!(err.info().context["name"], "field.center");
    }

    #[test]
    fn spec_round_trips_through_parameters() {
        let params = Parameters::builder()
            .chi_kappa(0.04)
            .field_shape(FieldShape::Step {
                amplitude: 1.0,
                center: 0.2,
            })
            .build()
            .unwrap();
        let restored = Parameters::from_spec(params.to_spec()).unwrap();
        assert_eq!(restored, params);
    }

    #[test]
    fn grid_matches_geometry() {
        let params = Parameters::builder().n_nodes(11).length(1.0).build().unwrap();
        let grid = params.grid().unwrap();
        assert_eq!(grid.len(), 11);
        assert!((grid.spacing() - 0.1).abs() < 1e-12);
    }
}
