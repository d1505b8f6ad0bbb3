//! Monotone piecewise-cubic Hermite interpolation of nodal fields.

use iec_core::{ensure_same_len, Grid, IecError};

/// PCHIP interpolant (Fritsch–Carlson slopes with the weighted harmonic mean
/// for non-uniform spacing). Preserves monotonicity of the samples and never
/// overshoots a step, which keeps interpolated stiffness positive.
#[derive(Debug, Clone)]
pub(crate) struct Pchip {
    x: Vec<f64>,
    y: Vec<f64>,
    d: Vec<f64>,
}

impl Pchip {
    pub(crate) fn new(grid: &Grid, y: &[f64]) -> Result<Self, IecError> {
        ensure_same_len("interpolated samples", grid.len(), y.len())?;
        let x = grid.as_slice().to_vec();
        let n = x.len();
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let delta: Vec<f64> = (0..n - 1).map(|k| (y[k + 1] - y[k]) / h[k]).collect();
        let mut d = vec![0.0; n];

        if n == 2 {
            d[0] = delta[0];
            d[1] = delta[0];
        } else {
            for k in 1..n - 1 {
                let (a, b) = (delta[k - 1], delta[k]);
                if a == 0.0 || b == 0.0 || a.signum() != b.signum() {
                    continue;
                }
                let w1 = 2.0 * h[k] + h[k - 1];
                let w2 = h[k] + 2.0 * h[k - 1];
                d[k] = (w1 + w2) / (w1 / a + w2 / b);
            }
            d[0] = end_slope(h[0], h[1], delta[0], delta[1]);
            d[n - 1] = end_slope(h[n - 2], h[n - 3], delta[n - 2], delta[n - 3]);
        }
        Ok(Self {
            x,
            y: y.to_vec(),
            d,
        })
    }

    pub(crate) fn eval(&self, t: f64) -> f64 {
        let k = locate(&self.x, t);
        let h = self.x[k + 1] - self.x[k];
        let u = ((t - self.x[k]) / h).clamp(0.0, 1.0);
        hermite(u, h, self.y[k], self.y[k + 1], self.d[k], self.d[k + 1])
    }
}

// Three-point end condition, limited so the end slope keeps the data's shape.
fn end_slope(h0: f64, h1: f64, del0: f64, del1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * del0 - h0 * del1) / (h0 + h1);
    if d.signum() != del0.signum() {
        0.0
    } else if del0.signum() != del1.signum() && d.abs() > 3.0 * del0.abs() {
        3.0 * del0
    } else {
        d
    }
}

/// Index `k` of the interval `[x[k], x[k+1]]` containing `t`, clamped to the
/// first and last intervals.
pub(crate) fn locate(x: &[f64], t: f64) -> usize {
    let last = x.len() - 2;
    match x.binary_search_by(|v| v.total_cmp(&t)) {
        Ok(idx) => idx.min(last),
        Err(idx) => idx.saturating_sub(1).min(last),
    }
}

/// Cubic Hermite value on one interval at local coordinate `u ∈ [0, 1]`.
pub(crate) fn hermite(u: f64, h: f64, y0: f64, y1: f64, d0: f64, d1: f64) -> f64 {
    let u2 = u * u;
    let u3 = u2 * u;
    let h00 = 2.0 * u3 - 3.0 * u2 + 1.0;
    let h10 = u3 - 2.0 * u2 + u;
    let h01 = -2.0 * u3 + 3.0 * u2;
    let h11 = u3 - u2;
    h00 * y0 + h10 * h * d0 + h01 * y1 + h11 * h * d1
}
