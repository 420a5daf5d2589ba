//! Synthetic annual-peak samples drawn from a Pearson III distribution.
//!
//! Draws follow the same construction as the standardized distribution in
//! `math::pearson3`: `x = EX · (1 + Cv · sign(Cs) · (G - k) · θ)` with
//! `G ~ Gamma(k, 1)`, falling back to a normal draw for near-zero skew.
//! Non-positive flows are rejected and redrawn.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Gamma, Normal};

use crate::data::Sample;
use crate::domain::DistParams;
use crate::error::FreqError;
use crate::math::NORMAL_TRANSITION;

/// Maximum draws per requested observation before giving up.
const MAX_DRAWS_PER_VALUE: usize = 1000;

pub fn generate_sample(n: usize, params: &DistParams, seed: u64) -> Result<Sample, FreqError> {
    if n == 0 {
        return Err(FreqError::domain("n", 0.0, "synthetic sample size must be > 0"));
    }
    if !(params.is_finite() && params.ex > 0.0 && params.cv > 0.0) {
        return Err(FreqError::domain(
            "cv",
            params.cv,
            "synthetic parameters must be finite with EX > 0 and Cv > 0",
        ));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let draw = StdDraw::new(params.cs)?;

    let mut values = Vec::with_capacity(n);
    let mut attempts = 0usize;
    while values.len() < n {
        attempts += 1;
        if attempts > n * MAX_DRAWS_PER_VALUE {
            return Err(FreqError::domain(
                "cv",
                params.cv,
                "parameters put almost all probability mass at non-positive flows",
            ));
        }
        let x = params.ex * (1.0 + params.cv * draw.sample(&mut rng));
        if x > 0.0 && x.is_finite() {
            values.push(x);
        }
    }

    Sample::new(values)
}

/// Standardized Pearson III sampler.
enum StdDraw {
    Normal(Normal<f64>),
    Gamma { dist: Gamma<f64>, shape: f64, scale: f64, sign: f64 },
}

impl StdDraw {
    fn new(skew: f64) -> Result<Self, FreqError> {
        if skew.abs() < NORMAL_TRANSITION {
            let normal = Normal::new(0.0, 1.0).map_err(|e| FreqError::Distribution {
                message: e.to_string(),
            })?;
            return Ok(StdDraw::Normal(normal));
        }
        let shape = 4.0 / (skew * skew);
        let dist = Gamma::new(shape, 1.0).map_err(|e| FreqError::Distribution {
            message: e.to_string(),
        })?;
        Ok(StdDraw::Gamma {
            dist,
            shape,
            scale: skew.abs() / 2.0,
            sign: skew.signum(),
        })
    }

    fn sample(&self, rng: &mut StdRng) -> f64 {
        match self {
            StdDraw::Normal(normal) => normal.sample(rng),
            StdDraw::Gamma { dist, shape, scale, sign } => sign * (dist.sample(rng) - shape) * scale,
        }
    }
}
