// Univariate distributions stored on the grid points of a bivariate grid

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::delta::DeltaDistribution;
use crate::histogram::HistogramDistribution;
use crate::interpolation::{LinLin, LinLog, LogLin, LogLog};
use crate::tabular::TabularDistribution;
use crate::uniform::UniformDistribution;

/// A distribution over the secondary variable.
pub trait UnivariateDistribution {
    /// Evaluate the (unnormalized) distribution
    fn evaluate(&self, y: f64) -> f64;

    /// Evaluate the normalized probability density
    fn evaluate_pdf(&self, y: f64) -> f64;

    /// Evaluate the cumulative distribution, always in [0, 1]
    fn evaluate_cdf(&self, y: f64) -> f64;

    fn lower_bound(&self) -> f64;

    fn upper_bound(&self) -> f64;

    /// Draw a sample, reporting the index of the internal bin that was used
    fn sample_and_record_bin_index<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, usize);

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.sample_and_record_bin_index(rng).0
    }
}

/// Distributions with an explicit quantile function.
///
/// Every grid policy requires this capability; correlated sampling and the
/// CDF inversion used by correlated evaluation call
/// [`TabularUnivariateDistribution::sample_with_random_number`] directly, so
/// a distribution without it cannot be placed on a grid at all.
pub trait TabularUnivariateDistribution: UnivariateDistribution {
    /// Inverse CDF, deterministic for a given `random_number` in [0, 1)
    fn sample_with_random_number(&self, random_number: f64) -> f64;

    /// Inverse CDF restricted to `[lower_bound, max_y]`
    fn sample_with_random_number_in_subrange(&self, random_number: f64, max_y: f64) -> f64 {
        debug_assert!(max_y >= self.lower_bound());
        let max_y = max_y.min(self.upper_bound());
        self.sample_with_random_number(random_number * self.evaluate_cdf(max_y))
    }

    fn sample_in_subrange<R: Rng + ?Sized>(&self, rng: &mut R, max_y: f64) -> f64 {
        self.sample_with_random_number_in_subrange(rng.gen::<f64>(), max_y)
    }
}

/// Any of the supported secondary distributions, for grids that mix types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SecondaryDistribution {
    #[serde(rename = "Uniform")]
    Uniform(UniformDistribution),
    #[serde(rename = "Delta")]
    Delta(DeltaDistribution),
    #[serde(rename = "Histogram")]
    Histogram(HistogramDistribution),
    #[serde(rename = "LinLin")]
    LinLin(TabularDistribution<LinLin>),
    #[serde(rename = "LogLog")]
    LogLog(TabularDistribution<LogLog>),
    #[serde(rename = "LinLog")]
    LinLog(TabularDistribution<LinLog>),
    #[serde(rename = "LogLin")]
    LogLin(TabularDistribution<LogLin>),
}

macro_rules! dispatch {
    ($self:ident, $dist:ident => $body:expr) => {
        match $self {
            SecondaryDistribution::Uniform($dist) => $body,
            SecondaryDistribution::Delta($dist) => $body,
            SecondaryDistribution::Histogram($dist) => $body,
            SecondaryDistribution::LinLin($dist) => $body,
            SecondaryDistribution::LogLog($dist) => $body,
            SecondaryDistribution::LinLog($dist) => $body,
            SecondaryDistribution::LogLin($dist) => $body,
        }
    };
}

impl UnivariateDistribution for SecondaryDistribution {
    fn evaluate(&self, y: f64) -> f64 {
        dispatch!(self, d => d.evaluate(y))
    }

    fn evaluate_pdf(&self, y: f64) -> f64 {
        dispatch!(self, d => d.evaluate_pdf(y))
    }

    fn evaluate_cdf(&self, y: f64) -> f64 {
        dispatch!(self, d => d.evaluate_cdf(y))
    }

    fn lower_bound(&self) -> f64 {
        dispatch!(self, d => d.lower_bound())
    }

    fn upper_bound(&self) -> f64 {
        dispatch!(self, d => d.upper_bound())
    }

    fn sample_and_record_bin_index<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, usize) {
        dispatch!(self, d => d.sample_and_record_bin_index(rng))
    }
}

impl TabularUnivariateDistribution for SecondaryDistribution {
    fn sample_with_random_number(&self, random_number: f64) -> f64 {
        dispatch!(self, d => d.sample_with_random_number(random_number))
    }

    fn sample_with_random_number_in_subrange(&self, random_number: f64, max_y: f64) -> f64 {
        dispatch!(self, d => d.sample_with_random_number_in_subrange(random_number, max_y))
    }
}

impl From<UniformDistribution> for SecondaryDistribution {
    fn from(dist: UniformDistribution) -> Self {
        SecondaryDistribution::Uniform(dist)
    }
}

impl From<DeltaDistribution> for SecondaryDistribution {
    fn from(dist: DeltaDistribution) -> Self {
        SecondaryDistribution::Delta(dist)
    }
}

impl From<HistogramDistribution> for SecondaryDistribution {
    fn from(dist: HistogramDistribution) -> Self {
        SecondaryDistribution::Histogram(dist)
    }
}

impl From<TabularDistribution<LinLin>> for SecondaryDistribution {
    fn from(dist: TabularDistribution<LinLin>) -> Self {
        SecondaryDistribution::LinLin(dist)
    }
}

impl From<TabularDistribution<LogLog>> for SecondaryDistribution {
    fn from(dist: TabularDistribution<LogLog>) -> Self {
        SecondaryDistribution::LogLog(dist)
    }
}

impl From<TabularDistribution<LinLog>> for SecondaryDistribution {
    fn from(dist: TabularDistribution<LinLog>) -> Self {
        SecondaryDistribution::LinLog(dist)
    }
}

impl From<TabularDistribution<LogLin>> for SecondaryDistribution {
    fn from(dist: TabularDistribution<LogLin>) -> Self {
        SecondaryDistribution::LogLin(dist)
    }
}
