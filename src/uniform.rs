// Uniform distribution on [min, max]

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::distribution::{TabularUnivariateDistribution, UnivariateDistribution};
use crate::error::{GridError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformDistribution {
    pub min: f64,
    pub max: f64,
    /// Value returned by `evaluate` inside the bounds
    pub value: f64,
}

impl UniformDistribution {
    pub fn new(min: f64, max: f64, value: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(GridError::InvalidDistribution(format!(
                "uniform bounds must be finite with min < max, got [{}, {}]",
                min, max
            )));
        }
        if !(value > 0.0) || !value.is_finite() {
            return Err(GridError::InvalidDistribution(format!(
                "uniform value must be positive, got {}",
                value
            )));
        }
        Ok(UniformDistribution { min, max, value })
    }
}

impl UnivariateDistribution for UniformDistribution {
    fn evaluate(&self, y: f64) -> f64 {
        if y < self.min || y > self.max {
            0.0
        } else {
            self.value
        }
    }

    fn evaluate_pdf(&self, y: f64) -> f64 {
        if y < self.min || y > self.max {
            0.0
        } else {
            1.0 / (self.max - self.min)
        }
    }

    fn evaluate_cdf(&self, y: f64) -> f64 {
        if y <= self.min {
            0.0
        } else if y >= self.max {
            1.0
        } else {
            (y - self.min) / (self.max - self.min)
        }
    }

    fn lower_bound(&self) -> f64 {
        self.min
    }

    fn upper_bound(&self) -> f64 {
        self.max
    }

    fn sample_and_record_bin_index<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, usize) {
        (self.sample_with_random_number(rng.gen::<f64>()), 0)
    }
}

impl TabularUnivariateDistribution for UniformDistribution {
    fn sample_with_random_number(&self, random_number: f64) -> f64 {
        self.min + random_number * (self.max - self.min)
    }
}
