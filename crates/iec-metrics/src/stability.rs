//! Linear stability surrogate for the coupled rod.
//!
//! The operator acts on the interior nodes of the normalised coordinate
//! `ξ = s / L`:
//!
//! ```text
//! K = D2 · diag(E/E₀) · D2 + B + γ_g I − p · diag((L dI/ds)²)
//! ```
//!
//! where `D2` is the three-point second difference with zero end values, `B`
//! the boundary injection and `γ_g = ρ A g L³ / (E₀ I)`. The generalized
//! problem `K v = λ M v` with a lumped diagonal mass is reduced to a standard
//! symmetric one through `M^{-1/2}`. A negative smallest eigenvalue flags a
//! symmetry-breaking instability.

use iec_core::{ensure_finite, ensure_same_len, ErrorInfo, IecError, Parameters};
use iec_coupling::stiffness_bias;
use iec_field::InformationField;
use nalgebra::{DMatrix, SymmetricEigen};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Largest grid accepted by [`stability_analysis`]. The dense eigensolve is
/// O(n³) in time and O(n²) in memory.
pub const MAX_EIGEN_NODES: usize = 4000;

const MIN_EIGEN_NODES: usize = 5;
const BISECTION_STEPS: usize = 60;

/// Boundary contribution added to the assembled fourth-difference operator.
pub trait BoundaryInjection {
    fn kind(&self) -> BoundaryKind;

    /// Adds the boundary rows for interior stiffness ratios `e` on spacing `h`.
    fn inject(&self, operator: &mut DMatrix<f64>, e: &[f64], h: f64);
}

/// Zero deflection and slope. The ghost node mirrors the first interior one,
/// which adds `2 e / h⁴` to both corner entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clamped;

impl BoundaryInjection for Clamped {
    fn kind(&self) -> BoundaryKind {
        BoundaryKind::Clamped
    }

    fn inject(&self, operator: &mut DMatrix<f64>, e: &[f64], h: f64) {
        let m = e.len();
        let h4 = h.powi(4);
        operator[(0, 0)] += 2.0 * e[0] / h4;
        operator[(m - 1, m - 1)] += 2.0 * e[m - 1] / h4;
    }
}

/// Zero deflection and moment, already encoded by the zero end values of `D2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pinned;

impl BoundaryInjection for Pinned {
    fn kind(&self) -> BoundaryKind {
        BoundaryKind::Pinned
    }

    fn inject(&self, _operator: &mut DMatrix<f64>, _e: &[f64], _h: f64) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryKind {
    #[default]
    Clamped,
    Pinned,
}

impl BoundaryKind {
    pub fn injection(self) -> &'static dyn BoundaryInjection {
        match self {
            BoundaryKind::Clamped => &Clamped,
            BoundaryKind::Pinned => &Pinned,
        }
    }
}

/// Options controlling the eigenvalue stability test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityOptions {
    /// Information potential `p` weighting the destabilising term.
    #[serde(default)]
    pub info_potential: f64,
    /// Number of leading eigenpairs to report.
    #[serde(default = "StabilityOptions::default_n_modes")]
    pub n_modes: usize,
    #[serde(default)]
    pub boundary: BoundaryKind,
    /// `ρA(s) / ρA₀` on every grid node; uniform when absent.
    #[serde(default)]
    pub mass_profile: Option<Vec<f64>>,
}

impl StabilityOptions {
    const fn default_n_modes() -> usize {
        6
    }

    pub fn with_potential(mut self, info_potential: f64) -> Self {
        self.info_potential = info_potential;
        self
    }

    fn validate(&self) -> Result<(), IecError> {
        if !self.info_potential.is_finite() || self.info_potential < 0.0 {
            return Err(IecError::ParameterRange(
                ErrorInfo::new(
                    "invalid-potential",
                    "information potential must be finite and non-negative",
                )
                .with_context("info_potential", self.info_potential),
            ));
        }
        if self.n_modes == 0 {
            return Err(IecError::ParameterRange(ErrorInfo::new(
                "invalid-modes",
                "at least one mode must be requested",
            )));
        }
        Ok(())
    }
}

impl Default for StabilityOptions {
    fn default() -> Self {
        Self {
            info_potential: 0.0,
            n_modes: Self::default_n_modes(),
            boundary: BoundaryKind::default(),
            mass_profile: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityReport {
    /// Leading eigenvalues, ascending.
    pub eigenvalues: Vec<f64>,
    /// Mode shapes on the full grid, zero at both ends.
    pub eigenvectors: Vec<Vec<f64>>,
    pub min_eigenvalue: f64,
    pub unstable: bool,
    pub gravity_parameter: f64,
    pub info_potential: f64,
    pub boundary: BoundaryKind,
}

/// Non-dimensional gravity parameter `γ_g = ρ A g L³ / (E₀ I)`.
pub fn gravity_parameter(params: &Parameters) -> f64 {
    let l = params.length();
    params.density() * params.area() * params.loads().gravity * l.powi(3)
        / (params.youngs_modulus() * params.second_moment())
}

fn check_grid(field: &InformationField) -> Result<(), IecError> {
    let n = field.len();
    if n > MAX_EIGEN_NODES {
        return Err(IecError::ParameterRange(
            ErrorInfo::new("eigen-size", "grid too large for the dense eigensolve")
                .with_context("nodes", n)
                .with_context("max", MAX_EIGEN_NODES)
                .with_hint("coarsen the grid before the stability test"),
        ));
    }
    if n < MIN_EIGEN_NODES {
        return Err(IecError::ParameterRange(
            ErrorInfo::new("eigen-size", "grid too small for the stability operator")
                .with_context("nodes", n)
                .with_context("min", MIN_EIGEN_NODES),
        ));
    }
    if !field.grid().is_uniform() {
        return Err(IecError::Grid(ErrorInfo::new(
            "non-uniform",
            "the stability operator requires a uniform grid",
        )));
    }
    Ok(())
}

/// Assembles `K` over the interior nodes of the field's grid.
pub fn assemble_operator(
    field: &InformationField,
    params: &Parameters,
    opts: &StabilityOptions,
) -> Result<DMatrix<f64>, IecError> {
    check_grid(field)?;
    opts.validate()?;
    let n = field.len();
    let m = n - 2;
    let h = 1.0 / (n - 1) as f64;
    let h2 = h * h;

    let e0 = params.youngs_modulus();
    let fields = stiffness_bias(field, params)?;
    let ratio: Vec<f64> = fields.stiffness[1..n - 1].iter().map(|e| e / e0).collect();

    let mut d2 = DMatrix::<f64>::zeros(m, m);
    for i in 0..m {
        d2[(i, i)] = -2.0 / h2;
        if i > 0 {
            d2[(i, i - 1)] = 1.0 / h2;
        }
        if i + 1 < m {
            d2[(i, i + 1)] = 1.0 / h2;
        }
    }
    let mut weighted = d2.clone();
    for (j, r) in ratio.iter().enumerate() {
        weighted.column_mut(j).scale_mut(*r);
    }
    let mut operator = &weighted * &d2;
    opts.boundary.injection().inject(&mut operator, &ratio, h);

    let gamma = gravity_parameter(params);
    let l = params.length();
    for i in 0..m {
        let drive = l * field.gradient()[i + 1];
        operator[(i, i)] += gamma - opts.info_potential * drive * drive;
    }
    // Symmetrise against round-off in the triple product.
    let operator = 0.5 * (&operator + operator.transpose());
    ensure_finite("stability operator", operator.as_slice())?;
    Ok(operator)
}

fn interior_mass(n: usize, opts: &StabilityOptions) -> Result<Vec<f64>, IecError> {
    match &opts.mass_profile {
        None => Ok(vec![1.0; n - 2]),
        Some(profile) => {
            ensure_same_len("mass profile", n, profile.len())?;
            ensure_finite("mass profile", profile)?;
            if let Some(index) = profile.iter().position(|w| *w <= 0.0) {
                return Err(IecError::ParameterRange(
                    ErrorInfo::new("invalid-mass", "mass profile must be positive")
                        .with_context("index", index),
                ));
            }
            Ok(profile[1..n - 1].to_vec())
        }
    }
}

/// Solves `K v = λ M v` and reports the leading modes.
pub fn stability_analysis(
    field: &InformationField,
    params: &Parameters,
    opts: &StabilityOptions,
) -> Result<StabilityReport, IecError> {
    let operator = assemble_operator(field, params, opts)?;
    let n = field.len();
    let m = n - 2;
    let inv_sqrt: Vec<f64> = interior_mass(n, opts)?.iter().map(|w| 1.0 / w.sqrt()).collect();

    let mut reduced = operator;
    for i in 0..m {
        for j in 0..m {
            reduced[(i, j)] *= inv_sqrt[i] * inv_sqrt[j];
        }
    }
    debug!(size = m, potential = opts.info_potential, "stability eigensolve");
    let eigen = SymmetricEigen::new(reduced);

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|a, b| {
        eigen.eigenvalues[*a]
            .partial_cmp(&eigen.eigenvalues[*b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order.truncate(opts.n_modes.min(m));

    let eigenvalues: Vec<f64> = order.iter().map(|&k| eigen.eigenvalues[k]).collect();
    ensure_finite("eigenvalues", &eigenvalues)?;
    let eigenvectors = order
        .iter()
        .map(|&k| {
            let mut mode = vec![0.0; n];
            for i in 0..m {
                mode[i + 1] = eigen.eigenvectors[(i, k)] * inv_sqrt[i];
            }
            mode
        })
        .collect();
    let min_eigenvalue = eigenvalues[0];
    Ok(StabilityReport {
        eigenvalues,
        eigenvectors,
        min_eigenvalue,
        unstable: min_eigenvalue < 0.0,
        gravity_parameter: gravity_parameter(params),
        info_potential: opts.info_potential,
        boundary: opts.boundary,
    })
}

/// Bisects the potential in `[0, upper]` at which the smallest eigenvalue
/// crosses zero. Returns `None` when the operator is already unstable at zero
/// potential or still stable at `upper`.
pub fn critical_potential(
    field: &InformationField,
    params: &Parameters,
    opts: &StabilityOptions,
    upper: f64,
) -> Result<Option<f64>, IecError> {
    let min_at = |p: f64| -> Result<f64, IecError> {
        Ok(stability_analysis(field, params, &opts.clone().with_potential(p))?.min_eigenvalue)
    };
    if min_at(0.0)? < 0.0 || min_at(upper)? >= 0.0 {
        return Ok(None);
    }
    let (mut lo, mut hi) = (0.0, upper);
    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        if min_at(mid)? < 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
        if hi - lo <= 1e-9 * upper {
            break;
        }
    }
    Ok(Some(0.5 * (lo + hi)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use iec_core::Grid;

    fn flat(n: usize) -> (InformationField, Parameters) {
        let params = Parameters::builder().n_nodes(n).build().unwrap();
        let field = InformationField::zeros(&Grid::uniform(params.length(), n).unwrap());
        (field, params)
    }

    #[test]
    fn pinned_operator_matches_sine_mode() {
        let (field, params) = flat(201);
        let opts = StabilityOptions {
            boundary: BoundaryKind::Pinned,
            ..StabilityOptions::default()
        };
        let report = stability_analysis(&field, &params, &opts).unwrap();
        let expected = std::f64::consts::PI.powi(4) + report.gravity_parameter;
        assert!((report.min_eigenvalue - expected).abs() / expected < 1e-3);
        assert!(!report.unstable);
        assert_eq!(report.boundary.injection().kind(), BoundaryKind::Pinned);
    }

    #[test]
    fn clamped_is_stiffer_than_pinned() {
        let (field, params) = flat(101);
        let clamped = stability_analysis(&field, &params, &StabilityOptions::default()).unwrap();
        let pinned = stability_analysis(
            &field,
            &params,
            &StabilityOptions {
                boundary: BoundaryKind::Pinned,
                ..StabilityOptions::default()
            },
        )
        .unwrap();
        assert!(clamped.min_eigenvalue > 4.0 * pinned.min_eigenvalue);
        assert_eq!(clamped.eigenvalues.len(), 6);
        assert!(clamped.eigenvalues.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(clamped.eigenvectors[0].len(), 101);
        assert_eq!(clamped.eigenvectors[0][0], 0.0);
    }

    #[test]
    fn operator_is_symmetric() {
        let params = Parameters::builder().n_nodes(40).chi_e(0.3).build().unwrap();
        let grid = params.grid().unwrap();
        let field = InformationField::from_fn(&grid, |s| (8.0 * s).sin()).unwrap();
        let k = assemble_operator(&field, &params, &StabilityOptions::default().with_potential(2.0))
            .unwrap();
        assert_eq!(k.nrows(), 38);
        assert!((&k - k.transpose()).amax() < 1e-9 * k.amax());
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let (field, params) = flat(MAX_EIGEN_NODES + 1);
        let err = stability_analysis(&field, &params, &StabilityOptions::default()).unwrap_err();
        assert!(matches!(err, IecError::ParameterRange(_)));
    }

    #[test]
    fn negative_potential_is_rejected() {
        let (field, params) = flat(20);
        let opts = StabilityOptions::default().with_potential(-1.0);
        assert!(matches!(
            assemble_operator(&field, &params, &opts),
            Err(IecError::ParameterRange(_))
        ));
    }
}
