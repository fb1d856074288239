// Tabulated distributions interpolated with a one-dimensional law

use std::fmt;
use std::marker::PhantomData;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::distribution::{TabularUnivariateDistribution, UnivariateDistribution};
use crate::error::{GridError, Result};
use crate::interpolation::{InterpolationLaw, LinLin, LinLog, LogLin, LogLog, Processing};
use crate::utilities::{bisect_monotone, find_lower_bin_index, is_strictly_ascending};

// Below this the exponent of a power or exponential law is treated as degenerate
const DEGENERATE_EXPONENT: f64 = 1e-12;

/// A law whose interpolant can be integrated within a single bin.
pub trait TabularLaw: InterpolationLaw {
    /// Integral of the interpolant through (x_0, y_0), (x_1, y_1) from `x_0` to `x`
    fn partial_integral(x_0: f64, x_1: f64, y_0: f64, y_1: f64, x: f64) -> f64;

    /// Point in [x_0, x_1] where the partial integral reaches `area`
    fn invert_partial_integral(x_0: f64, x_1: f64, y_0: f64, y_1: f64, area: f64) -> f64 {
        bisect_monotone(|x| Self::partial_integral(x_0, x_1, y_0, y_1, x), area, x_0, x_1)
    }
}

impl TabularLaw for LinLin {
    fn partial_integral(x_0: f64, x_1: f64, y_0: f64, y_1: f64, x: f64) -> f64 {
        let slope = (y_1 - y_0) / (x_1 - x_0);
        let dx = x - x_0;
        dx * (y_0 + 0.5 * slope * dx)
    }

    fn invert_partial_integral(x_0: f64, x_1: f64, y_0: f64, y_1: f64, area: f64) -> f64 {
        let slope = (y_1 - y_0) / (x_1 - x_0);
        let discriminant = (y_0 * y_0 + 2.0 * slope * area).max(0.0);
        let denominator = y_0 + discriminant.sqrt();
        if denominator <= 0.0 {
            return x_0;
        }
        (x_0 + 2.0 * area / denominator).clamp(x_0, x_1)
    }
}

impl TabularLaw for LogLog {
    fn partial_integral(x_0: f64, x_1: f64, y_0: f64, y_1: f64, x: f64) -> f64 {
        let exponent = (y_1 / y_0).ln() / (x_1 / x_0).ln() + 1.0;
        let ratio = x / x_0;
        if exponent.abs() < DEGENERATE_EXPONENT {
            y_0 * x_0 * ratio.ln()
        } else {
            y_0 * x_0 * (ratio.powf(exponent) - 1.0) / exponent
        }
    }

    fn invert_partial_integral(x_0: f64, x_1: f64, y_0: f64, y_1: f64, area: f64) -> f64 {
        let exponent = (y_1 / y_0).ln() / (x_1 / x_0).ln() + 1.0;
        let scaled_area = area / (y_0 * x_0);
        let x = if exponent.abs() < DEGENERATE_EXPONENT {
            x_0 * scaled_area.exp()
        } else {
            x_0 * (1.0 + scaled_area * exponent).powf(1.0 / exponent)
        };
        x.clamp(x_0, x_1)
    }
}

impl TabularLaw for LogLin {
    fn partial_integral(x_0: f64, x_1: f64, y_0: f64, y_1: f64, x: f64) -> f64 {
        let rate = (y_1 / y_0).ln() / (x_1 - x_0);
        let dx = x - x_0;
        if (rate * (x_1 - x_0)).abs() < DEGENERATE_EXPONENT {
            y_0 * dx
        } else {
            y_0 * (rate * dx).exp_m1() / rate
        }
    }

    fn invert_partial_integral(x_0: f64, x_1: f64, y_0: f64, y_1: f64, area: f64) -> f64 {
        let rate = (y_1 / y_0).ln() / (x_1 - x_0);
        let x = if (rate * (x_1 - x_0)).abs() < DEGENERATE_EXPONENT {
            x_0 + area / y_0
        } else {
            x_0 + (rate * area / y_0).ln_1p() / rate
        };
        x.clamp(x_0, x_1)
    }
}

impl TabularLaw for LinLog {
    fn partial_integral(x_0: f64, x_1: f64, y_0: f64, y_1: f64, x: f64) -> f64 {
        let slope = (y_1 - y_0) / (x_1 / x_0).ln();
        let dx = x - x_0;
        y_0 * dx + slope * (x * (x / x_0).ln() - dx)
    }
}

/// Serialized form of a [`TabularDistribution`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabularData {
    pub independent_values: Vec<f64>,
    pub dependent_values: Vec<f64>,
}

/// Distribution tabulated at `independent_values` and interpolated with `L`.
#[derive(Serialize, Deserialize)]
#[serde(
    try_from = "TabularData",
    into = "TabularData",
    bound = "L: TabularLaw"
)]
pub struct TabularDistribution<L> {
    independent_values: Vec<f64>,
    dependent_values: Vec<f64>,
    // Unnormalized cumulative integral at each tabulated point
    cdf: Vec<f64>,
    law: PhantomData<L>,
}

impl<L: TabularLaw> TabularDistribution<L> {
    /// Build a tabulated distribution and its cumulative integral
    ///
    /// # Arguments
    ///
    /// * `independent_values` - Strictly increasing tabulated points
    /// * `dependent_values` - Non-negative values at each point (positive for log laws)
    pub fn new(independent_values: Vec<f64>, dependent_values: Vec<f64>) -> Result<Self> {
        if independent_values.len() < 2 || independent_values.len() != dependent_values.len() {
            return Err(GridError::InvalidDistribution(format!(
                "tabular distribution needs matching tables of at least 2 points, got {} and {}",
                independent_values.len(),
                dependent_values.len()
            )));
        }
        if !is_strictly_ascending(&independent_values)
            || !independent_values.iter().all(|&x| L::is_indep_var_in_valid_range(x))
        {
            return Err(GridError::InvalidDistribution(format!(
                "{} independent values must be strictly increasing and valid for the law",
                L::name()
            )));
        }
        let valid_dep = |y: f64| {
            y.is_finite() && if <L::Dep as Processing>::IS_LOG { y > 0.0 } else { y >= 0.0 }
        };
        if !dependent_values.iter().all(|&y| valid_dep(y)) {
            return Err(GridError::InvalidDistribution(format!(
                "{} dependent values must be finite and {}",
                L::name(),
                if <L::Dep as Processing>::IS_LOG { "positive" } else { "non-negative" }
            )));
        }

        let mut cdf = Vec::with_capacity(independent_values.len());
        cdf.push(0.0);
        for i in 0..independent_values.len() - 1 {
            let (x_0, x_1) = (independent_values[i], independent_values[i + 1]);
            let area =
                L::partial_integral(x_0, x_1, dependent_values[i], dependent_values[i + 1], x_1);
            cdf.push(cdf[i] + area);
        }

        if !(cdf[cdf.len() - 1] > 0.0) || !cdf[cdf.len() - 1].is_finite() {
            return Err(GridError::InvalidDistribution(
                "tabular distribution must have a finite, positive integral".to_string(),
            ));
        }

        Ok(TabularDistribution {
            independent_values,
            dependent_values,
            cdf,
            law: PhantomData,
        })
    }

    pub fn independent_values(&self) -> &[f64] {
        &self.independent_values
    }

    pub fn dependent_values(&self) -> &[f64] {
        &self.dependent_values
    }

    fn norm(&self) -> f64 {
        self.cdf[self.cdf.len() - 1]
    }

    fn bin_points(&self, bin: usize) -> (f64, f64, f64, f64) {
        (
            self.independent_values[bin],
            self.independent_values[bin + 1],
            self.dependent_values[bin],
            self.dependent_values[bin + 1],
        )
    }

    fn sample_bin(&self, random_number: f64) -> (f64, usize) {
        let target = random_number * self.norm();
        let bin = find_lower_bin_index(&self.cdf, target);
        let (x_0, x_1, y_0, y_1) = self.bin_points(bin);
        let area = (target - self.cdf[bin]).max(0.0);
        (L::invert_partial_integral(x_0, x_1, y_0, y_1, area), bin)
    }
}

impl<L: TabularLaw> UnivariateDistribution for TabularDistribution<L> {
    fn evaluate(&self, y: f64) -> f64 {
        if y < self.lower_bound() || y > self.upper_bound() {
            return 0.0;
        }
        let bin = find_lower_bin_index(&self.independent_values, y);
        let (x_0, x_1, y_0, y_1) = self.bin_points(bin);
        if y == x_0 {
            y_0
        } else if y == x_1 {
            y_1
        } else {
            L::interpolate(x_0, x_1, y, y_0, y_1)
        }
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
        let bin = find_lower_bin_index(&self.independent_values, y);
        let (x_0, x_1, y_0, y_1) = self.bin_points(bin);
        let partial = L::partial_integral(x_0, x_1, y_0, y_1, y);
        ((self.cdf[bin] + partial) / self.norm()).clamp(0.0, 1.0)
    }

    fn lower_bound(&self) -> f64 {
        self.independent_values[0]
    }

    fn upper_bound(&self) -> f64 {
        self.independent_values[self.independent_values.len() - 1]
    }

    fn sample_and_record_bin_index<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, usize) {
        self.sample_bin(rng.gen::<f64>())
    }
}

impl<L: TabularLaw> TabularUnivariateDistribution for TabularDistribution<L> {
    fn sample_with_random_number(&self, random_number: f64) -> f64 {
        self.sample_bin(random_number).0
    }
}

impl<L: TabularLaw> TryFrom<TabularData> for TabularDistribution<L> {
    type Error = GridError;

    fn try_from(data: TabularData) -> Result<Self> {
        TabularDistribution::new(data.independent_values, data.dependent_values)
    }
}

impl<L> From<TabularDistribution<L>> for TabularData {
    fn from(dist: TabularDistribution<L>) -> Self {
        TabularData {
            independent_values: dist.independent_values,
            dependent_values: dist.dependent_values,
        }
    }
}

impl<L> Clone for TabularDistribution<L> {
    fn clone(&self) -> Self {
        TabularDistribution {
            independent_values: self.independent_values.clone(),
            dependent_values: self.dependent_values.clone(),
            cdf: self.cdf.clone(),
            law: PhantomData,
        }
    }
}

impl<L> PartialEq for TabularDistribution<L> {
    fn eq(&self, other: &Self) -> bool {
        self.independent_values == other.independent_values
            && self.dependent_values == other.dependent_values
    }
}

impl<L: InterpolationLaw> fmt::Debug for TabularDistribution<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabularDistribution")
            .field("law", &L::name())
            .field("independent_values", &self.independent_values)
            .field("dependent_values", &self.dependent_values)
            .finish()
    }
}
