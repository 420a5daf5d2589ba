//! Evaluation grids for theoretical frequency curves.

use crate::error::FreqError;

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
pub fn lin_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, FreqError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(FreqError::domain(
            "range",
            max - min,
            format!("invalid grid range [{min}, {max}] (must be finite with max > min)"),
        ));
    }
    if steps < 2 {
        return Err(FreqError::domain("steps", steps as f64, "grid needs at least 2 points"));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push(min + step * i as f64);
    }
    // Pin the right end so it never overshoots through rounding.
    out[steps - 1] = max;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lin_space_includes_endpoints() {
        let v = lin_space(1.0, 99.0, 1000).unwrap();
        assert_eq!(v.len(), 1000);
        assert!((v[0] - 1.0).abs() < 1e-12);
        assert_eq!(v[999], 99.0);
        assert!(v.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn lin_space_rejects_bad_input() {
        assert!(lin_space(5.0, 5.0, 10).is_err());
        assert!(lin_space(1.0, 2.0, 1).is_err());
        assert!(lin_space(f64::NAN, 2.0, 10).is_err());
    }
}
