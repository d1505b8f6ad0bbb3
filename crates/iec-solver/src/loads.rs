use iec_core::{Parameters, SupportType};
use serde::{Deserialize, Serialize};

/// One-sided limit selector for shear resultants with a jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    /// Limit approached from smaller `s`.
    Below,
    /// Limit approached from larger `s`.
    Above,
}

/// Resolved external loading for one solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadCase {
    pub support: SupportType,
    /// Point load, N. Acts at the tip for a cantilever and at midspan for a
    /// pinned–pinned rod.
    pub point_load: f64,
    /// Total uniform load including buoyancy-corrected self weight, N/m.
    pub distributed_load: f64,
    pub length: f64,
}

impl LoadCase {
    /// Resolves the load description in `params` for `support`.
    pub fn from_params(params: &Parameters, support: SupportType) -> Self {
        let loads = params.loads();
        let mut q = loads.distributed_load;
        if loads.self_weight {
            q += (params.density() - loads.fluid_density) * params.area() * loads.gravity;
        }
        Self {
            support,
            point_load: loads.tip_load,
            distributed_load: q,
            length: params.length(),
        }
    }

    /// Arc length at which the point load acts.
    pub fn point_load_position(&self) -> f64 {
        match self.support {
            SupportType::Cantilever => self.length,
            SupportType::PinnedPinned => 0.5 * self.length,
        }
    }

    /// Interior positions where the shear resultant jumps. Collocation meshes
    /// must carry a node at each of them.
    pub fn breakpoints(&self) -> Vec<f64> {
        match self.support {
            SupportType::PinnedPinned if self.point_load != 0.0 => vec![0.5 * self.length],
            _ => Vec::new(),
        }
    }

    /// Shear resultant entering `m' = -V cos θ`.
    pub(crate) fn shear(&self, s: f64, side: Side) -> f64 {
        let (p, q, l) = (self.point_load, self.distributed_load, self.length);
        match self.support {
            SupportType::Cantilever => p + q * (l - s),
            SupportType::PinnedPinned => {
                let mid = 0.5 * l;
                let past_load = match side {
                    Side::Below => s > mid,
                    Side::Above => s >= mid,
                };
                // Net transverse force outboard of s, including the far reaction.
                let reaction = 0.5 * q * l + 0.5 * p;
                let carried = if past_load { p } else { 0.0 };
                reaction - q * s - carried
            }
        }
    }

    /// Shear at an interior point away from any breakpoint.
    pub fn shear_at(&self, s: f64) -> f64 {
        self.shear(s, Side::Above)
    }
}
