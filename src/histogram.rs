// Piecewise-constant distribution

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::distribution::{TabularUnivariateDistribution, UnivariateDistribution};
use crate::error::{GridError, Result};
use crate::utilities::{find_lower_bin_index, is_strictly_ascending};

/// Histogram with `bin_boundaries.len() - 1` bins, bin `i` holding `values[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HistogramData", into = "HistogramData")]
pub struct HistogramDistribution {
    bin_boundaries: Vec<f64>,
    values: Vec<f64>,
    // Unnormalized cumulative integral at each boundary
    cdf: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramData {
    pub bin_boundaries: Vec<f64>,
    pub values: Vec<f64>,
}

impl TryFrom<HistogramData> for HistogramDistribution {
    type Error = GridError;

    fn try_from(data: HistogramData) -> Result<Self> {
        HistogramDistribution::new(data.bin_boundaries, data.values)
    }
}

impl From<HistogramDistribution> for HistogramData {
    fn from(dist: HistogramDistribution) -> Self {
        HistogramData { bin_boundaries: dist.bin_boundaries, values: dist.values }
    }
}

impl HistogramDistribution {
    pub fn new(bin_boundaries: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        if bin_boundaries.len() < 2 || values.len() + 1 != bin_boundaries.len() {
            return Err(GridError::InvalidDistribution(format!(
                "histogram needs n + 1 boundaries for n values, got {} boundaries and {} values",
                bin_boundaries.len(),
                values.len()
            )));
        }
        if !is_strictly_ascending(&bin_boundaries) || bin_boundaries.iter().any(|b| !b.is_finite()) {
            return Err(GridError::InvalidDistribution(
                "histogram boundaries must be finite and strictly increasing".to_string(),
            ));
        }
        if values.iter().any(|&v| !(v >= 0.0) || !v.is_finite()) {
            return Err(GridError::InvalidDistribution(
                "histogram values must be finite and non-negative".to_string(),
            ));
        }

        let mut cdf = Vec::with_capacity(bin_boundaries.len());
        cdf.push(0.0);
        for (i, value) in values.iter().enumerate() {
            let width = bin_boundaries[i + 1] - bin_boundaries[i];
            cdf.push(cdf[i] + value * width);
        }

        if !(cdf[cdf.len() - 1] > 0.0) {
            return Err(GridError::InvalidDistribution(
                "histogram integrates to zero".to_string(),
            ));
        }

        Ok(HistogramDistribution { bin_boundaries, values, cdf })
    }

    pub fn bin_boundaries(&self) -> &[f64] {
        &self.bin_boundaries
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    fn norm(&self) -> f64 {
        self.cdf[self.cdf.len() - 1]
    }

    fn is_outside(&self, y: f64) -> bool {
        y < self.lower_bound() || y > self.upper_bound()
    }

    fn sample_bin(&self, random_number: f64) -> (f64, usize) {
        let target = random_number * self.norm();
        // Skips empty bins: their cumulative value equals the next one
        let bin = find_lower_bin_index(&self.cdf, target);
        let value = self.values[bin];
        if value == 0.0 {
            return (self.bin_boundaries[bin + 1], bin);
        }
        let y = self.bin_boundaries[bin] + (target - self.cdf[bin]) / value;
        (y.min(self.bin_boundaries[bin + 1]), bin)
    }
}

impl UnivariateDistribution for HistogramDistribution {
    fn evaluate(&self, y: f64) -> f64 {
        if self.is_outside(y) {
            return 0.0;
        }
        self.values[find_lower_bin_index(&self.bin_boundaries, y)]
    }

    fn evaluate_pdf(&self, y: f64) -> f64 {
        self.evaluate(y) / self.norm()
    }

    fn evaluate_cdf(&self, y: f64) -> f64 {
        if y <= self.lower_bound() {
            return 0.0;
        }
        if y >= self.upper_bound() {
            return 1.0;
        }
        let bin = find_lower_bin_index(&self.bin_boundaries, y);
        let partial = self.values[bin] * (y - self.bin_boundaries[bin]);
        (self.cdf[bin] + partial) / self.norm()
    }

    fn lower_bound(&self) -> f64 {
        self.bin_boundaries[0]
    }

    fn upper_bound(&self) -> f64 {
        self.bin_boundaries[self.bin_boundaries.len() - 1]
    }

    fn sample_and_record_bin_index<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, usize) {
        self.sample_bin(rng.gen::<f64>())
    }
}

impl TabularUnivariateDistribution for HistogramDistribution {
    fn sample_with_random_number(&self, random_number: f64) -> f64 {
        self.sample_bin(random_number).0
    }
}
