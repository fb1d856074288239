// Discrete distribution concentrated on a single point

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::distribution::{TabularUnivariateDistribution, UnivariateDistribution};
use crate::error::{GridError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaDistribution {
    pub location: f64,
    pub multiplier: f64,
}

impl DeltaDistribution {
    pub fn new(location: f64, multiplier: f64) -> Result<Self> {
        if !location.is_finite() || !multiplier.is_finite() || multiplier == 0.0 {
            return Err(GridError::InvalidDistribution(format!(
                "delta needs a finite location and a non-zero multiplier, got ({}, {})",
                location, multiplier
            )));
        }
        Ok(DeltaDistribution { location, multiplier })
    }
}

impl UnivariateDistribution for DeltaDistribution {
    fn evaluate(&self, y: f64) -> f64 {
        if y == self.location {
            self.multiplier
        } else {
            0.0
        }
    }

    fn evaluate_pdf(&self, y: f64) -> f64 {
        if y == self.location {
            1.0
        } else {
            0.0
        }
    }

    fn evaluate_cdf(&self, y: f64) -> f64 {
        if y < self.location {
            0.0
        } else {
            1.0
        }
    }

    fn lower_bound(&self) -> f64 {
        self.location
    }

    fn upper_bound(&self) -> f64 {
        self.location
    }

    fn sample_and_record_bin_index<R: Rng + ?Sized>(&self, _rng: &mut R) -> (f64, usize) {
        (self.location, 0)
    }
}

impl TabularUnivariateDistribution for DeltaDistribution {
    fn sample_with_random_number(&self, _random_number: f64) -> f64 {
        self.location
    }

    fn sample_with_random_number_in_subrange(&self, _random_number: f64, _max_y: f64) -> f64 {
        self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta() {
        let dist = DeltaDistribution::new(2.0, 3.0).unwrap();
        assert_eq!(dist.evaluate(2.0), 3.0);
        assert_eq!(dist.evaluate(2.5), 0.0);
        assert_eq!(dist.evaluate_cdf(1.9), 0.0);
        assert_eq!(dist.evaluate_cdf(2.0), 1.0);
        assert_eq!(dist.sample_with_random_number(0.7), 2.0);
        assert_eq!(dist.lower_bound(), dist.upper_bound());
        assert!(DeltaDistribution::new(f64::NAN, 1.0).is_err());
    }
}
