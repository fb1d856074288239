// Inversion of interpolated CDFs for the correlated grid policies
//
// Correlated policies define the intermediate distribution through its
// quantile function: the sample at CDF value c interpolates the quantiles
// of both bin boundary distributions at c. Evaluating such a distribution
// at y therefore requires the CDF value whose interpolated quantile is y.
// The functions here find it by bisection on a CDF bracket.

use crate::config::Tolerances;
use crate::distribution::TabularUnivariateDistribution;
use crate::error::{GridError, Result};
use crate::interpolation::InterpolationLaw;
use crate::two_d_interpolation::TwoDInterpolationLaw;

/// An interval of CDF values, `lower <= upper`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CdfBracket {
    pub lower: f64,
    pub upper: f64,
}

impl CdfBracket {
    /// Order two CDF values into a bracket
    pub fn from_cdfs(cdf_0: f64, cdf_1: f64) -> Self {
        if cdf_0 <= cdf_1 {
            CdfBracket {
                lower: cdf_0,
                upper: cdf_1,
            }
        } else {
            CdfBracket {
                lower: cdf_1,
                upper: cdf_0,
            }
        }
    }

    #[inline]
    fn midpoint(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }
}

/// A converged CDF value with the matching secondary values on the lower
/// and upper bin boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CdfEstimate {
    pub cdf: f64,
    pub lower_y: f64,
    pub upper_y: f64,
}

/// The interpolated value at a trial CDF value
#[derive(Debug, Clone, Copy)]
struct Trial {
    value: f64,
    lower_y: f64,
    upper_y: f64,
}

/// Bisect `bracket` until the trial value matches `target`.
///
/// The error is relative to `target`, or absolute when `target` is zero.
/// At least one trial is always made.
fn bisect<F>(target: f64, mut bracket: CdfBracket, tolerances: &Tolerances, mut trial: F) -> Result<CdfEstimate>
where
    F: FnMut(f64) -> Trial,
{
    let (norm, tolerance) = if target == 0.0 {
        (1.0, tolerances.error_tol)
    } else {
        (target, tolerances.rel_error_tol)
    };

    let mut iterations = 0u32;

    loop {
        let cdf = bracket.midpoint();
        let estimate = trial(cdf);
        let found = CdfEstimate {
            cdf,
            lower_y: estimate.lower_y,
            upper_y: estimate.upper_y,
        };

        if estimate.value == target {
            return Ok(found);
        }

        iterations += 1;

        let rel_error = ((target - estimate.value) / norm).abs();
        if rel_error <= tolerance {
            return Ok(found);
        }

        if estimate.value < target {
            bracket.lower = cdf;
        } else {
            bracket.upper = cdf;
        }

        if iterations > tolerances.max_iterations {
            let error = (target - estimate.value).abs();

            if error < tolerances.error_tol {
                log::debug!(
                    "accepting CDF estimate {} after {} iterations: error = {}",
                    cdf,
                    iterations,
                    error
                );
                return Ok(found);
            }

            log::error!(
                "CDF inversion did not converge after {} iterations: target = {}, estimate = {}",
                tolerances.max_iterations,
                target,
                estimate.value
            );
            return Err(GridError::ConvergenceFailure {
                max_iterations: tolerances.max_iterations,
                rel_error,
                tolerance: tolerances.rel_error_tol,
                error,
                lower_cdf: bracket.lower,
                upper_cdf: bracket.upper,
                lower_y: estimate.lower_y,
                upper_y: estimate.upper_y,
            });
        }
    }
}

/// Widen `bracket` until the values at its ends enclose `target`.
///
/// The lower end shrinks by `shrink` until it reaches zero, the upper end
/// grows by `grow` until it reaches one.
fn expand_bracket<F>(target: f64, mut bracket: CdfBracket, shrink: f64, grow: f64, mut value_at: F) -> CdfBracket
where
    F: FnMut(f64) -> f64,
{
    let initial = bracket;
    let mut lower_value = value_at(bracket.lower);
    let mut upper_value = value_at(bracket.upper);

    while lower_value > target {
        bracket.upper = bracket.lower;
        bracket.lower *= shrink;

        if bracket.lower == 0.0 {
            break;
        }
        lower_value = value_at(bracket.lower);
    }

    while upper_value < target {
        bracket.lower = bracket.upper;
        bracket.upper = if bracket.upper > 0.0 { bracket.upper * grow } else { 1.0 };

        if bracket.upper >= 1.0 {
            bracket.upper = 1.0;
            break;
        }
        upper_value = value_at(bracket.upper);
    }

    if bracket != initial {
        log::debug!(
            "expanded CDF bracket from [{}, {}] to [{}, {}]",
            initial.lower,
            initial.upper,
            bracket.lower,
            bracket.upper
        );
    }

    bracket
}

fn correlated_trial<L, D>(cdf: f64, beta: f64, lower: &D, upper: &D) -> Trial
where
    L: TwoDInterpolationLaw,
    D: TabularUnivariateDistribution,
{
    let lower_y = lower.sample_with_random_number(cdf);
    let upper_y = upper.sample_with_random_number(cdf);

    let value = if lower_y == upper_y {
        lower_y
    } else {
        L::YX::interpolate_beta(beta, lower_y, upper_y)
    };

    Trial {
        value,
        lower_y,
        upper_y,
    }
}

/// Unit-base lengths of the two bin boundary distributions
#[derive(Debug, Clone, Copy)]
pub struct BoundaryLengths {
    pub lower: f64,
    pub upper: f64,
}

fn unit_base_correlated_trial<L, D>(cdf: f64, beta: f64, lower: &D, upper: &D, lengths: BoundaryLengths) -> Trial
where
    L: TwoDInterpolationLaw,
    D: TabularUnivariateDistribution,
{
    let lower_y = lower.sample_with_random_number(cdf);
    let upper_y = upper.sample_with_random_number(cdf);

    let eta = |y: f64, dist: &D, length: f64| {
        if length > 0.0 {
            L::ZY::calculate_unit_base_indep_var(y, dist.lower_bound(), length)
        } else {
            0.0
        }
    };
    let eta_0 = eta(lower_y, lower, lengths.lower);
    let eta_1 = eta(upper_y, upper, lengths.upper);

    let value = if eta_0 == eta_1 {
        eta_0
    } else {
        L::YX::interpolate_beta(beta, eta_0, eta_1)
    };

    Trial {
        value,
        lower_y,
        upper_y,
    }
}

/// Estimate the correlated CDF at `y`.
///
/// The bracket is the pair of boundary CDFs at `y` itself; no widening is
/// applied. `beta` is the position of x in the primary bin.
pub fn estimate_correlated_cdf<L, D>(
    y: f64,
    beta: f64,
    lower: &D,
    upper: &D,
    tolerances: &Tolerances,
) -> Result<CdfEstimate>
where
    L: TwoDInterpolationLaw,
    D: TabularUnivariateDistribution,
{
    let bracket = CdfBracket::from_cdfs(lower.evaluate_cdf(y), upper.evaluate_cdf(y));

    bisect(y, bracket, tolerances, |cdf| correlated_trial::<L, D>(cdf, beta, lower, upper))
}

/// Find the secondary values on both bin boundaries that correlate with
/// `y` at the intermediate primary value.
pub fn calculate_correlated_secondary_values<L, D>(
    y: f64,
    beta: f64,
    lower: &D,
    upper: &D,
    tolerances: &Tolerances,
) -> Result<(f64, f64)>
where
    L: TwoDInterpolationLaw,
    D: TabularUnivariateDistribution,
{
    let bracket = CdfBracket::from_cdfs(lower.evaluate_cdf(y), upper.evaluate_cdf(y));
    let bracket = expand_bracket(y, bracket, 0.9, 1.1, |cdf| {
        correlated_trial::<L, D>(cdf, beta, lower, upper).value
    });

    let estimate = bisect(y, bracket, tolerances, |cdf| {
        correlated_trial::<L, D>(cdf, beta, lower, upper)
    })?;

    Ok((estimate.lower_y, estimate.upper_y))
}

/// Estimate the unit-base correlated CDF at the unit-base value `eta`.
///
/// `lower_y` and `upper_y` are the boundary secondary values at `eta`; the
/// bracket is the pair of boundary CDFs there.
#[allow(clippy::too_many_arguments)]
pub fn estimate_unit_base_correlated_cdf<L, D>(
    eta: f64,
    lower_y: f64,
    upper_y: f64,
    beta: f64,
    lower: &D,
    upper: &D,
    lengths: BoundaryLengths,
    tolerances: &Tolerances,
) -> Result<CdfEstimate>
where
    L: TwoDInterpolationLaw,
    D: TabularUnivariateDistribution,
{
    let bracket = CdfBracket::from_cdfs(lower.evaluate_cdf(lower_y), upper.evaluate_cdf(upper_y));

    bisect(eta, bracket, tolerances, |cdf| {
        unit_base_correlated_trial::<L, D>(cdf, beta, lower, upper, lengths)
    })
}

/// Find the boundary secondary values that correlate with the unit-base
/// value `eta` at the intermediate primary value.
#[allow(clippy::too_many_arguments)]
pub fn calculate_unit_base_correlated_secondary_values<L, D>(
    eta: f64,
    lower_y: f64,
    upper_y: f64,
    beta: f64,
    lower: &D,
    upper: &D,
    lengths: BoundaryLengths,
    tolerances: &Tolerances,
) -> Result<(f64, f64)>
where
    L: TwoDInterpolationLaw,
    D: TabularUnivariateDistribution,
{
    let bracket = CdfBracket::from_cdfs(lower.evaluate_cdf(lower_y), upper.evaluate_cdf(upper_y));
    let bracket = expand_bracket(eta, bracket, 0.99, 1.01, |cdf| {
        unit_base_correlated_trial::<L, D>(cdf, beta, lower, upper, lengths).value
    });

    let estimate = bisect(eta, bracket, tolerances, |cdf| {
        unit_base_correlated_trial::<L, D>(cdf, beta, lower, upper, lengths)
    })?;

    Ok((estimate.lower_y, estimate.upper_y))
}
