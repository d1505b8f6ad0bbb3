use iec_core::{ensure_same_len, ErrorInfo, IecError};
use iec_field::trapezoid;
use iec_solver::EquilibriumState;
use serde::{Deserialize, Serialize};

/// Upper bound reported by [`shape_preservation_index`] when the coupled
/// state reproduces the initial shape exactly.
pub const SHAPE_INDEX_CAP: f64 = 1e6;

// Deviations below this are treated as zero.
const DEVIATION_FLOOR: f64 = 1e-12;

pub(crate) fn same_grid(a: &EquilibriumState, b: &EquilibriumState) -> Result<(), IecError> {
    ensure_same_len("state nodes", a.len(), b.len())?;
    if !a.grid().matches(b.grid(), 1e-12 * a.grid().length()) {
        return Err(IecError::ShapeMismatch(
            ErrorInfo::new("grid-mismatch", "states are defined on different grids")
                .with_context("length_a", a.grid().length())
                .with_context("length_b", b.grid().length()),
        ));
    }
    Ok(())
}

/// Bending energy `½ ∫ E(s) I κ² ds` of one state.
pub fn bending_energy(state: &EquilibriumState) -> Result<f64, IecError> {
    let second_moment = state.params().second_moment();
    let density: Vec<f64> = state
        .kappa()
        .iter()
        .zip(state.stiffness())
        .map(|(k, e)| 0.5 * e * second_moment * k * k)
        .collect();
    trapezoid(state.s(), &density)
}

/// `U_b − U_a` for the bending energies of two states on the same grid.
pub fn curvature_energy_difference(
    a: &EquilibriumState,
    b: &EquilibriumState,
) -> Result<f64, IecError> {
    same_grid(a, b)?;
    Ok(bending_energy(b)? - bending_energy(a)?)
}

/// `∫ |r_b(s) − r_a(s)|² ds` over the reconstructed centerlines.
pub fn centerline_energy_difference(
    a: &EquilibriumState,
    b: &EquilibriumState,
) -> Result<f64, IecError> {
    same_grid(a, b)?;
    let squared: Vec<f64> = (0..a.len())
        .map(|i| (b.x()[i] - a.x()[i]).powi(2) + (b.y()[i] - a.y()[i]).powi(2))
        .collect();
    trapezoid(a.s(), &squared)
}

/// L2 norm of `g_eff − 1`.
pub fn metric_deviation(s: &[f64], g_eff: &[f64]) -> Result<f64, IecError> {
    ensure_same_len("metric weight", s.len(), g_eff.len())?;
    let squared: Vec<f64> = g_eff.iter().map(|g| (g - 1.0).powi(2)).collect();
    Ok(trapezoid(s, &squared)?.max(0.0).sqrt())
}

/// Per-node Euclidean displacement between two centerlines, m.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeDrift {
    pub max: f64,
    pub mean: f64,
}

pub fn node_drift(a: &EquilibriumState, b: &EquilibriumState) -> Result<NodeDrift, IecError> {
    same_grid(a, b)?;
    let distances: Vec<f64> = (0..a.len())
        .map(|i| (b.x()[i] - a.x()[i]).hypot(b.y()[i] - a.y()[i]))
        .collect();
    Ok(NodeDrift {
        max: distances.iter().fold(0.0, |acc, d| acc.max(*d)),
        mean: distances.iter().sum::<f64>() / distances.len() as f64,
    })
}

fn curvature_deviation(reference: &EquilibriumState, other: &EquilibriumState) -> Result<f64, IecError> {
    let squared: Vec<f64> = reference
        .kappa()
        .iter()
        .zip(other.kappa())
        .map(|(r, o)| (o - r).powi(2))
        .collect();
    Ok(trapezoid(reference.s(), &squared)?.max(0.0).sqrt())
}

/// Ratio of the passive to the coupled curvature deviation from `initial`.
///
/// Values above 1 mean the coupling kept the shape closer to `initial` than
/// the passive response did. Both deviations vanishing gives exactly 1; a
/// vanishing coupled deviation alone saturates at [`SHAPE_INDEX_CAP`].
pub fn shape_preservation_index(
    initial: &EquilibriumState,
    passive: &EquilibriumState,
    coupled: &EquilibriumState,
) -> Result<f64, IecError> {
    same_grid(initial, passive)?;
    same_grid(initial, coupled)?;
    let passive_dev = curvature_deviation(initial, passive)?;
    let coupled_dev = curvature_deviation(initial, coupled)?;
    if passive_dev < DEVIATION_FLOOR && coupled_dev < DEVIATION_FLOOR {
        return Ok(1.0);
    }
    if coupled_dev < DEVIATION_FLOOR {
        return Ok(SHAPE_INDEX_CAP);
    }
    Ok((passive_dev / coupled_dev).min(SHAPE_INDEX_CAP))
}
