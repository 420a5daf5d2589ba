//! Standardized Pearson Type III distribution (mean 0, variance 1, skew `Cs`).
//!
//! For `Cs != 0` the variable is a shifted, scaled gamma:
//!
//! ```text
//! X = sign(Cs) · (G - k) · θ,    G ~ Gamma(k, 1),    k = 4 / Cs²,    θ = |Cs| / 2
//! ```
//!
//! so the support is bounded on one side at `-2 / Cs`.
//!
//! Numerical notes:
//! - Below `NORMAL_TRANSITION` the gamma shape explodes; the standard normal is
//!   used instead (the limit of the family as `Cs → 0`).
//! - Below `CUBE_ROOT_TRANSITION` (gamma shape above 1e6) the statrs incomplete
//!   gamma loses digits. There the Wilson–Hilferty cube-root transform is used
//!   for both directions; its error at those shapes is O(k^-1.5).
//! - Otherwise statrs supplies the gamma CDF/PDF. The gamma quantile starts from
//!   the Wilson–Hilferty approximation and is polished by Newton steps kept
//!   inside a bisection bracket. statrs' own `Gamma::inverse_cdf` is not used: it
//!   is a short fixed bisection and too coarse for a round trip at 1e-6.

use statrs::distribution::{Continuous, ContinuousCDF, Gamma, Normal};
use statrs::function::erf::erfc_inv;
use statrs::function::gamma::ln_gamma;

use crate::error::FreqError;

/// `|Cs|` below which the distribution is treated as standard normal.
pub const NORMAL_TRANSITION: f64 = 1.6e-5;

/// `|Cs|` below which the cube-root transform replaces the gamma (shape `4/Cs² > 1e6`).
pub const CUBE_ROOT_TRANSITION: f64 = 2e-3;

const MAX_NEWTON_ITERS: usize = 200;
const REL_TOL: f64 = 1e-14;

/// Standardized Pearson III with a given skew.
#[derive(Debug, Clone)]
pub struct StdPearson3 {
    skew: f64,
    kind: Kind,
}

#[derive(Debug, Clone)]
enum Kind {
    Normal(Normal),
    /// `X = (2/Cs) · ((1 + Cs·z/6 - Cs²/36)³ - 1)` with `z` standard normal.
    CubeRoot(Normal),
    Gamma {
        dist: Gamma,
        shape: f64,
        scale: f64,
        sign: f64,
    },
}

impl StdPearson3 {
    pub fn new(skew: f64) -> Result<Self, FreqError> {
        if !skew.is_finite() {
            return Err(FreqError::domain("cs", skew, "skew must be finite"));
        }

        let kind = if skew.abs() < NORMAL_TRANSITION {
            Kind::Normal(Normal::new(0.0, 1.0).map_err(distribution_error)?)
        } else if skew.abs() < CUBE_ROOT_TRANSITION {
            Kind::CubeRoot(Normal::new(0.0, 1.0).map_err(distribution_error)?)
        } else {
            let shape = 4.0 / (skew * skew);
            let dist = Gamma::new(shape, 1.0).map_err(distribution_error)?;
            Kind::Gamma {
                dist,
                shape,
                scale: skew.abs() / 2.0,
                sign: skew.signum(),
            }
        };

        Ok(Self { skew, kind })
    }

    /// The finite end of the support (`-2 / Cs`), if any.
    ///
    /// It is a lower bound for positive skew and an upper bound for negative skew.
    pub fn support_bound(&self) -> Option<f64> {
        match &self.kind {
            Kind::Normal(_) => None,
            Kind::CubeRoot(_) => Some(-2.0 / self.skew),
            Kind::Gamma { shape, scale, sign, .. } => Some(-sign * shape * scale),
        }
    }

    /// Whether `x` lies strictly inside the support.
    pub fn contains(&self, x: f64) -> bool {
        if !x.is_finite() {
            return false;
        }
        match self.support_bound() {
            None => true,
            Some(bound) if self.skew > 0.0 => x > bound,
            Some(bound) => x < bound,
        }
    }

    pub fn cdf(&self, x: f64) -> f64 {
        match &self.kind {
            Kind::Normal(normal) => normal.cdf(x),
            Kind::CubeRoot(normal) => {
                if !self.contains(x) {
                    return if self.skew > 0.0 { 0.0 } else { 1.0 };
                }
                let cs = self.skew;
                // (1 + Cs·x/2)^(1/3) - 1 without cancellation.
                let w = ((cs * x / 2.0).ln_1p() / 3.0).exp_m1();
                normal.cdf((w + cs * cs / 36.0) * 6.0 / cs)
            }
            Kind::Gamma {
                dist,
                shape,
                scale,
                sign,
            } => {
                let g = shape + sign * x / scale;
                if *sign > 0.0 {
                    dist.cdf(g)
                } else {
                    1.0 - dist.cdf(g)
                }
            }
        }
    }

    /// Quantile function. `q` is a non-exceedance probability in `(0, 1)`.
    pub fn inverse_cdf(&self, q: f64) -> f64 {
        match &self.kind {
            Kind::Normal(normal) => normal.inverse_cdf(q),
            Kind::CubeRoot(normal) => {
                let cs = self.skew;
                let t = cs * normal.inverse_cdf(q) / 6.0 - cs * cs / 36.0;
                // (1 + t)³ - 1 expanded.
                2.0 / cs * t * (3.0 + t * (3.0 + t))
            }
            Kind::Gamma {
                dist,
                shape,
                scale,
                sign,
            } => {
                let gq = if *sign > 0.0 { q } else { 1.0 - q };
                let g = gamma_quantile(dist, *shape, gq);
                sign * (g - shape) * scale
            }
        }
    }
}

fn distribution_error(err: impl std::fmt::Display) -> FreqError {
    FreqError::Distribution {
        message: err.to_string(),
    }
}

/// Quantile of `Gamma(shape, 1)` at `q`.
fn gamma_quantile(dist: &Gamma, shape: f64, q: f64) -> f64 {
    if q <= 0.0 {
        return 0.0;
    }
    if q >= 1.0 {
        return f64::INFINITY;
    }

    let mut x = initial_guess(shape, q);

    let mut lo = 0.0_f64;
    let mut hi = x.max(1.0);
    let mut doublings = 0;
    while dist.cdf(hi) < q && doublings < 1100 {
        lo = hi;
        hi *= 2.0;
        doublings += 1;
    }
    if !(x > lo && x < hi) {
        x = 0.5 * (lo + hi);
    }

    for _ in 0..MAX_NEWTON_ITERS {
        let f = dist.cdf(x) - q;
        if f == 0.0 {
            return x;
        }
        if f < 0.0 {
            lo = x;
        } else {
            hi = x;
        }

        let d = dist.pdf(x);
        let mut next = if d > 0.0 && d.is_finite() {
            x - f / d
        } else {
            f64::NAN
        };
        // Newton left the bracket (or the density vanished): bisect instead.
        if !(next > lo && next < hi) {
            next = 0.5 * (lo + hi);
        }

        if (next - x).abs() <= REL_TOL * x.abs().max(f64::MIN_POSITIVE) {
            return next;
        }
        if hi - lo <= REL_TOL * hi {
            return 0.5 * (lo + hi);
        }
        x = next;
    }

    x
}

/// Wilson–Hilferty start, falling back to the lower-tail power law
/// `F(x) ≈ x^k / Γ(k + 1)` when the cube goes non-positive.
fn initial_guess(shape: f64, q: f64) -> f64 {
    let z = -std::f64::consts::SQRT_2 * erfc_inv(2.0 * q);
    let c = 1.0 / (9.0 * shape);
    let wh = shape * (1.0 - c + z * c.sqrt()).powi(3);
    if wh.is_finite() && wh > 0.0 {
        return wh;
    }
    ((q.ln() + ln_gamma(shape + 1.0)) / shape).exp()
}
