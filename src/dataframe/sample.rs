use super::DataFrame;
use crate::error::{PlyError, Result};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// How many rows to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleSize {
    N(usize),
    /// Fraction of the row count, rounded to the nearest row.
    Frac(f64),
}

/// Where sampling weights come from.
#[derive(Debug, Clone, PartialEq)]
pub enum Weights {
    Column(String),
    Values(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleSpec {
    pub size: SampleSize,
    pub replace: bool,
    pub weights: Option<Weights>,
    pub seed: Option<u64>,
}

impl SampleSpec {
    pub fn n(n: usize) -> Self {
        SampleSpec {
            size: SampleSize::N(n),
            replace: false,
            weights: None,
            seed: None,
        }
    }

    pub fn frac(frac: f64) -> Self {
        SampleSpec {
            size: SampleSize::Frac(frac),
            ..SampleSpec::n(0)
        }
    }

    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    pub fn weights(mut self, weights: Weights) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl DataFrame {
    /// Sample rows randomly. Rows come back in draw order.
    pub fn sample(&self, spec: &SampleSpec) -> Result<DataFrame> {
        let population = self.len();
        let amount = match spec.size {
            SampleSize::N(n) => n,
            SampleSize::Frac(f) if f.is_finite() && f >= 0.0 => (f * population as f64).round() as usize,
            SampleSize::Frac(f) => {
                return Err(PlyError::config(format!(
                    "sample fraction must be a non-negative number, got {}",
                    f
                )))
            }
        };
        if !spec.replace && amount > population {
            return Err(PlyError::value(format!(
                "cannot take a sample of {} from {} rows without replacement",
                amount, population
            )));
        }

        let weights = match &spec.weights {
            None => None,
            Some(Weights::Values(w)) => Some(w.clone()),
            Some(Weights::Column(name)) => Some(self.column(name)?.to_f64()?),
        };

        let mut rng: Box<dyn RngCore> = match spec.seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(rand::rng()),
        };

        let positions = match weights {
            None => draw_uniform(&mut rng, population, amount, spec.replace),
            Some(w) => {
                if w.len() != population {
                    return Err(PlyError::value(format!(
                        "weights have length {}, DataFrame has {} rows",
                        w.len(),
                        population
                    )));
                }
                if w.iter().any(|x| !x.is_finite() || *x < 0.0) {
                    return Err(PlyError::value("weights must be finite and non-negative"));
                }
                draw_weighted(&mut rng, &w, amount, spec.replace)?
            }
        };

        Ok(self.gather(&positions))
    }
}

fn draw_uniform<R: Rng + ?Sized>(rng: &mut R, population: usize, amount: usize, replace: bool) -> Vec<usize> {
    if population == 0 {
        return Vec::new();
    }
    if replace {
        (0..amount).map(|_| rng.random_range(0..population)).collect()
    } else {
        rand::seq::index::sample(rng, population, amount).into_vec()
    }
}

fn draw_weighted<R: Rng + ?Sized>(
    rng: &mut R,
    weights: &[f64],
    amount: usize,
    replace: bool,
) -> Result<Vec<usize>> {
    if amount == 0 {
        return Ok(Vec::new());
    }
    if replace {
        let dist = WeightedIndex::new(weights)
            .map_err(|e| PlyError::value(format!("invalid weights: {}", e)))?;
        return Ok((0..amount).map(|_| dist.sample(rng)).collect());
    }

    let nonzero = weights.iter().filter(|w| **w > 0.0).count();
    if nonzero < amount {
        return Err(PlyError::value(format!(
            "fewer non-zero weights ({}) than rows requested ({})",
            nonzero, amount
        )));
    }
    rand::seq::index::sample_weighted(rng, weights.len(), |i| weights[i], amount)
        .map(|idx| idx.into_vec())
        .map_err(|e| PlyError::value(format!("invalid weights: {}", e)))
}
