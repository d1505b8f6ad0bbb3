use iec_core::{check_monotone, ensure_same_len, IecError};

/// Derivative of `values` with respect to `s`.
///
/// Interior nodes use the three-point second-order central difference, which
/// stays second order on non-uniform spacing and is exact for linear data.
/// The two end nodes use first-order forward/backward differences.
pub fn gradient(s: &[f64], values: &[f64]) -> Result<Vec<f64>, IecError> {
    check_monotone(s)?;
    ensure_same_len("values", s.len(), values.len())?;
    let n = s.len();
    let mut out = vec![0.0; n];
    out[0] = (values[1] - values[0]) / (s[1] - s[0]);
    out[n - 1] = (values[n - 1] - values[n - 2]) / (s[n - 1] - s[n - 2]);
    for i in 1..n - 1 {
        let hl = s[i] - s[i - 1];
        let hr = s[i + 1] - s[i];
        out[i] = (hl * hl * values[i + 1] - hr * hr * values[i - 1]
            + (hr * hr - hl * hl) * values[i])
            / (hl * hr * (hl + hr));
    }
    Ok(out)
}

/// Cumulative trapezoidal integral of `values`, starting at zero.
pub fn cumulative_trapezoid(s: &[f64], values: &[f64]) -> Result<Vec<f64>, IecError> {
    ensure_same_len("values", s.len(), values.len())?;
    let mut out = Vec::with_capacity(s.len());
    let mut acc = 0.0;
    out.push(acc);
    for i in 1..s.len() {
        acc += 0.5 * (values[i] + values[i - 1]) * (s[i] - s[i - 1]);
        out.push(acc);
    }
    Ok(out)
}

/// Trapezoidal integral of `values` over `s`.
pub fn trapezoid(s: &[f64], values: &[f64]) -> Result<f64, IecError> {
    ensure_same_len("values", s.len(), values.len())?;
    Ok(s.windows(2)
        .zip(values.windows(2))
        .map(|(ds, v)| 0.5 * (v[0] + v[1]) * (ds[1] - ds[0]))
        .sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadratic_interior_is_exact_on_uniform_grid() {
        let s: Vec<f64> = (0..11).map(|i| i as f64 * 0.1).collect();
        let values: Vec<f64> = s.iter().map(|x| x * x).collect();
        let grad = gradient(&s, &values).unwrap();
        for i in 1..10 {
            assert!((grad[i] - 2.0 * s[i]).abs() < 1e-12, "node {i}: {}", grad[i]);
        }
    }

    #[test]
    fn quadratic_interior_is_exact_on_stretched_grid() {
        let s = vec![0.0, 0.1, 0.15, 0.4, 0.45, 1.0];
        let values: Vec<f64> = s.iter().map(|x| 3.0 * x * x - x).collect();
        let grad = gradient(&s, &values).unwrap();
        for i in 1..5 {
            assert!((grad[i] - (6.0 * s[i] - 1.0)).abs() < 1e-10);
        }
    }

    #[test]
    fn two_nodes_use_one_sided_differences() {
        let grad = gradient(&[0.0, 2.0], &[1.0, 5.0]).unwrap();
        assert_eq!(grad, vec![2.0, 2.0]);
    }

    #[test]
    fn trapezoid_integrates_linear_exactly() {
        let s = vec![0.0, 0.3, 0.5, 1.0];
        let values: Vec<f64> = s.iter().map(|x| 2.0 * x + 1.0).collect();
        assert!((trapezoid(&s, &values).unwrap() - 2.0).abs() < 1e-12);
        let cumulative = cumulative_trapezoid(&s, &values).unwrap();
        assert!((cumulative[3] - 2.0).abs() < 1e-12);
        assert_eq!(cumulative[0], 0.0);
    }

    #[test]
    fn mismatched_lengths_fail() {
        assert!(matches!(
            gradient(&[0.0, 1.0, 2.0], &[0.0, 1.0]),
            Err(IecError::ShapeMismatch(_))
        ));
    }
}
