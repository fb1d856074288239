// Correlated grid policy
//
// The intermediate distribution at x is defined by interpolating the
// quantiles of the bin boundary distributions at a shared CDF value.
// Sampling uses one random number on both boundaries; evaluation inverts
// the interpolated quantile function to find the correlated boundary values.

use std::marker::PhantomData;

use rand::Rng;

use crate::cdf_inversion::{calculate_correlated_secondary_values, estimate_correlated_cdf};
use crate::config::Tolerances;
use crate::distribution::TabularUnivariateDistribution;
use crate::error::Result;
use crate::grid::GridEntry;
use crate::grid_policy::{
    interpolated_lower_bound, interpolated_upper_bound, BinSide, DetailedSample, SecondaryLimits,
    TwoDGridPolicy,
};
use crate::interpolation::{
    calculate_fuzzy_lower_bound, calculate_fuzzy_upper_bound, InterpolationLaw, Lin, Processing,
};
use crate::two_d_interpolation::TwoDInterpolationLaw;

/// Correlated policy over the interpolation law `L`.
pub struct Correlated<L>(PhantomData<L>);

/// Density at `y` from the densities at the correlated boundary values.
///
/// The interpolated quantile is y(c) = blend(y_0(c), y_1(c), beta) with the
/// y processing `P`, so the boundary densities combine harmonically after
/// weighting by the Jacobian of `P`.
fn correlated_pdf<P: Processing>(
    y: f64,
    lower_y: f64,
    upper_y: f64,
    lower_eval: f64,
    upper_eval: f64,
    beta: f64,
) -> f64 {
    if P::IS_LOG {
        let lower_product = lower_eval * P::log_argument(lower_y);
        let upper_product = upper_eval * P::log_argument(upper_y);

        lower_product * upper_product / (Lin::blend(upper_product, lower_product, beta) * P::log_argument(y))
    } else {
        lower_eval * upper_eval / Lin::blend(upper_eval, lower_eval, beta)
    }
}

impl<L> Correlated<L>
where
    L: TwoDInterpolationLaw,
{
    fn sample_correlated<D, R, F>(
        mut sample: F,
        x: f64,
        lower: &GridEntry<D>,
        upper: &GridEntry<D>,
        rng: &mut R,
    ) -> DetailedSample
    where
        D: TabularUnivariateDistribution,
        R: Rng + ?Sized,
        F: FnMut(&D, &mut R) -> f64,
    {
        let (sample, bin) = if x == upper.x {
            (sample(upper.distribution(), rng), BinSide::Upper)
        } else if x == lower.x {
            (sample(lower.distribution(), rng), BinSide::Lower)
        } else {
            let lower_sample = sample(lower.distribution(), rng);
            let upper_sample = sample(upper.distribution(), rng);

            let sample = if lower_sample == upper_sample {
                lower_sample
            } else {
                L::YX::interpolate(lower.x, upper.x, x, lower_sample, upper_sample)
            };
            (sample, BinSide::Lower)
        };

        DetailedSample {
            sample,
            bin,
            raw_sample: sample,
        }
    }

    fn pdf_at_correlated_values<D, E>(
        y: f64,
        lower_y: f64,
        upper_y: f64,
        beta: f64,
        evaluate: &E,
        lower: &D,
        upper: &D,
    ) -> f64
    where
        D: TabularUnivariateDistribution,
        E: Fn(&D, f64) -> f64,
    {
        let lower_eval = evaluate(lower, lower_y);
        let upper_eval = evaluate(upper, upper_y);

        if lower_eval == upper_eval {
            lower_eval
        } else {
            correlated_pdf::<<L::YX as InterpolationLaw>::Dep>(y, lower_y, upper_y, lower_eval, upper_eval, beta)
        }
    }
}

impl<L> TwoDGridPolicy for Correlated<L>
where
    L: TwoDInterpolationLaw,
{
    type Law = L;

    const NAME: &'static str = "Correlated";
    const CORRELATED_SAMPLING: bool = true;

    fn calculate_lower_bound<D: TabularUnivariateDistribution>(
        x: f64,
        lower: &GridEntry<D>,
        upper: &GridEntry<D>,
    ) -> f64 {
        interpolated_lower_bound::<L, D>(x, lower, upper)
    }

    fn calculate_upper_bound<D: TabularUnivariateDistribution>(
        x: f64,
        lower: &GridEntry<D>,
        upper: &GridEntry<D>,
    ) -> f64 {
        interpolated_upper_bound::<L, D>(x, lower, upper)
    }

    fn evaluate_pdf<D, E>(
        x: f64,
        y: f64,
        _limits: &SecondaryLimits<'_>,
        evaluate: E,
        lower: &GridEntry<D>,
        upper: &GridEntry<D>,
        tolerances: &Tolerances,
    ) -> Result<f64>
    where
        D: TabularUnivariateDistribution,
        E: Fn(&D, f64) -> f64,
    {
        if x == lower.x {
            return Ok(evaluate(lower.distribution(), y));
        }
        if x == upper.x {
            return Ok(evaluate(upper.distribution(), y));
        }

        let (dist_0, dist_1) = (lower.distribution(), upper.distribution());
        let beta = L::first_indep_fraction(lower.x, upper.x, x);

        let min = L::YX::interpolate_beta(beta, dist_0.lower_bound(), dist_1.lower_bound());
        let max = L::YX::interpolate_beta(beta, dist_0.upper_bound(), dist_1.upper_bound());

        let tol = tolerances.fuzzy_boundary_tol;
        if y < calculate_fuzzy_lower_bound(min, tol) || y > calculate_fuzzy_upper_bound(max, tol) {
            return Ok(0.0);
        }

        let (lower_y, upper_y) = if y <= min {
            (dist_0.lower_bound(), dist_1.lower_bound())
        } else if y >= max {
            (dist_0.upper_bound(), dist_1.upper_bound())
        } else {
            calculate_correlated_secondary_values::<L, D>(y, beta, dist_0, dist_1, tolerances)?
        };

        Ok(Self::pdf_at_correlated_values(
            y, lower_y, upper_y, beta, &evaluate, dist_0, dist_1,
        ))
    }

    fn evaluate_pdf_cos<D, E>(
        x: f64,
        y: f64,
        limits: &SecondaryLimits<'_>,
        evaluate: E,
        lower: &GridEntry<D>,
        upper: &GridEntry<D>,
        tolerances: &Tolerances,
    ) -> Result<f64>
    where
        D: TabularUnivariateDistribution,
        E: Fn(&D, f64) -> f64,
    {
        if x == lower.x {
            return Ok(evaluate(lower.distribution(), y));
        }
        if x == upper.x {
            return Ok(evaluate(upper.distribution(), y));
        }

        let min = limits.lower(x);
        let max = limits.upper(x);

        if y < min || y > max {
            return Ok(0.0);
        }

        let (dist_0, dist_1) = (lower.distribution(), upper.distribution());
        let beta = L::first_indep_fraction(lower.x, upper.x, x);

        let (lower_y, upper_y) = if y == min {
            (min, min)
        } else if y == max {
            (max, max)
        } else {
            calculate_correlated_secondary_values::<L, D>(y, beta, dist_0, dist_1, tolerances)?
        };

        Ok(Self::pdf_at_correlated_values(
            y, lower_y, upper_y, beta, &evaluate, dist_0, dist_1,
        ))
    }

    fn evaluate_cdf<D, E>(
        x: f64,
        y: f64,
        _limits: &SecondaryLimits<'_>,
        evaluate: E,
        lower: &GridEntry<D>,
        upper: &GridEntry<D>,
        tolerances: &Tolerances,
    ) -> Result<f64>
    where
        D: TabularUnivariateDistribution,
        E: Fn(&D, f64) -> f64,
    {
        if x == lower.x {
            return Ok(evaluate(lower.distribution(), y));
        }
        if x == upper.x {
            return Ok(evaluate(upper.distribution(), y));
        }

        let (dist_0, dist_1) = (lower.distribution(), upper.distribution());
        let beta = L::first_indep_fraction(lower.x, upper.x, x);

        let min = L::YX::interpolate_beta(beta, dist_0.lower_bound(), dist_1.lower_bound());
        let max = L::YX::interpolate_beta(beta, dist_0.upper_bound(), dist_1.upper_bound());

        if y <= min {
            Ok(0.0)
        } else if y >= max {
            Ok(1.0)
        } else {
            Ok(estimate_correlated_cdf::<L, D>(y, beta, dist_0, dist_1, tolerances)?.cdf)
        }
    }

    fn evaluate_cdf_cos<D, E>(
        x: f64,
        y: f64,
        limits: &SecondaryLimits<'_>,
        evaluate: E,
        lower: &GridEntry<D>,
        upper: &GridEntry<D>,
        tolerances: &Tolerances,
    ) -> Result<f64>
    where
        D: TabularUnivariateDistribution,
        E: Fn(&D, f64) -> f64,
    {
        if x == lower.x {
            return Ok(evaluate(lower.distribution(), y));
        }
        if x == upper.x {
            return Ok(evaluate(upper.distribution(), y));
        }

        if y <= limits.lower(x) {
            return Ok(0.0);
        }
        if y >= limits.upper(x) {
            return Ok(1.0);
        }

        let beta = L::first_indep_fraction(lower.x, upper.x, x);
        Ok(estimate_correlated_cdf::<L, D>(y, beta, lower.distribution(), upper.distribution(), tolerances)?.cdf)
    }

    fn sample_detailed<D, R, F>(
        sample: F,
        _limits: &SecondaryLimits<'_>,
        x: f64,
        lower: &GridEntry<D>,
        upper: &GridEntry<D>,
        rng: &mut R,
    ) -> DetailedSample
    where
        D: TabularUnivariateDistribution,
        R: Rng + ?Sized,
        F: FnMut(&D, &mut R) -> f64,
    {
        Self::sample_correlated(sample, x, lower, upper, rng)
    }

    fn sample_cos_detailed<D, R, F>(
        sample: F,
        x: f64,
        lower: &GridEntry<D>,
        upper: &GridEntry<D>,
        rng: &mut R,
    ) -> DetailedSample
    where
        D: TabularUnivariateDistribution,
        R: Rng + ?Sized,
        F: FnMut(&D, &mut R) -> f64,
    {
        Self::sample_correlated(sample, x, lower, upper, rng)
    }

    fn sample_in_subrange<D, R, F>(
        mut sample: F,
        _limits: &SecondaryLimits<'_>,
        x: f64,
        lower: &GridEntry<D>,
        upper: &GridEntry<D>,
        subrange_max: f64,
        rng: &mut R,
    ) -> f64
    where
        D: TabularUnivariateDistribution,
        R: Rng + ?Sized,
        F: FnMut(&D, f64, &mut R) -> f64,
    {
        let cap = |dist: &D| subrange_max.min(dist.upper_bound()).max(dist.lower_bound());
        let (dist_0, dist_1) = (lower.distribution(), upper.distribution());

        if x == upper.x {
            return sample(dist_1, cap(dist_1), rng);
        }
        if x == lower.x {
            return sample(dist_0, cap(dist_0), rng);
        }

        let lower_sample = sample(dist_0, cap(dist_0), rng);
        let upper_sample = sample(dist_1, cap(dist_1), rng);

        if lower_sample == upper_sample {
            lower_sample
        } else {
            L::YX::interpolate(lower.x, upper.x, x, lower_sample, upper_sample)
        }
    }
}
