use iec_core::{ensure_finite, ensure_same_len, Grid, IecError};
use serde::{Deserialize, Serialize};

/// Rest curvature present before any information coupling.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum BaselineCurvature {
    /// Straight rod.
    #[default]
    Zero,
    /// Externally supplied curvature samples, one per grid node (1/m).
    Profile {
        /// Curvature samples.
        values: Vec<f64>,
    },
    /// Sagittal spine template: lumbar and cervical lordosis around a
    /// thoracic kyphosis, each a Gaussian lobe in ξ = s/L.
    Sagittal {
        /// Peak lordotic curvature magnitude (1/m), applied with negative sign.
        lordosis: f64,
        /// Peak kyphotic curvature (1/m).
        kyphosis: f64,
    },
}

// (centre, width) of each lobe in normalised arc length.
const LUMBAR: (f64, f64) = (0.2, 0.08);
const THORACIC: (f64, f64) = (0.55, 0.12);
const CERVICAL: (f64, f64) = (0.85, 0.07);

impl BaselineCurvature {
    /// Wraps an external curvature profile.
    pub fn profile(values: Vec<f64>) -> Self {
        BaselineCurvature::Profile { values }
    }

    /// Evaluates the baseline on `grid`.
    pub fn evaluate(&self, grid: &Grid) -> Result<Vec<f64>, IecError> {
        match self {
            BaselineCurvature::Zero => Ok(vec![0.0; grid.len()]),
            BaselineCurvature::Profile { values } => {
                ensure_same_len("baseline curvature", grid.len(), values.len())?;
                ensure_finite("baseline curvature", values)?;
                Ok(values.clone())
            }
            BaselineCurvature::Sagittal { lordosis, kyphosis } => {
                let start = grid.start();
                let span = grid.length();
                Ok(grid
                    .as_slice()
                    .iter()
                    .map(|&s| {
                        let xi = (s - start) / span;
                        -lordosis * lobe(xi, LUMBAR) + kyphosis * lobe(xi, THORACIC)
                            - lordosis * lobe(xi, CERVICAL)
                    })
                    .collect())
            }
        }
    }
}

fn lobe(xi: f64, (center, width): (f64, f64)) -> f64 {
    let z = (xi - center) / width;
    (-0.5 * z * z).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sagittal_template_alternates_sign() {
        let grid = Grid::uniform(0.4, 101).unwrap();
        let kappa = BaselineCurvature::Sagittal {
            lordosis: 2.0,
            kyphosis: 3.0,
        }
        .evaluate(&grid)
        .unwrap();
        assert!(kappa[20] < -1.9);
        assert!(kappa[55] > 2.9);
        assert!(kappa[85] < -1.5);
    }

    #[test]
    fn profile_length_is_checked() {
        let grid = Grid::uniform(1.0, 5).unwrap();
        let err = BaselineCurvature::profile(vec![0.0; 4])
            .evaluate(&grid)
            .unwrap_err();
        assert!(matches!(err, IecError::ShapeMismatch(_)));
    }
}
