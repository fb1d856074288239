// Direct grid policy
//
// Combines the bin boundary distributions without any rescaling of the
// secondary variable: values are interpolated at the same y on both
// boundaries and samples come straight from one boundary distribution.

use std::marker::PhantomData;

use rand::Rng;

use crate::config::Tolerances;
use crate::distribution::TabularUnivariateDistribution;
use crate::error::Result;
use crate::grid::GridEntry;
use crate::grid_policy::{
    interpolate_across_bin, sample_bin_boundary, DetailedSample, SecondaryLimits, TwoDGridPolicy,
};
use crate::two_d_interpolation::TwoDInterpolationLaw;

/// Direct policy over the interpolation law `L`.
pub struct Direct<L>(PhantomData<L>);

impl<L> Direct<L>
where
    L: TwoDInterpolationLaw,
{
    fn evaluate_between<D, E>(x: f64, y: f64, evaluate: E, lower: &GridEntry<D>, upper: &GridEntry<D>) -> f64
    where
        D: TabularUnivariateDistribution,
        E: Fn(&D, f64) -> f64,
    {
        if x == lower.x {
            return evaluate(lower.distribution(), y);
        }
        if x == upper.x {
            return evaluate(upper.distribution(), y);
        }

        let z_0 = evaluate(lower.distribution(), y);
        let z_1 = evaluate(upper.distribution(), y);

        interpolate_across_bin::<L>(lower.x, upper.x, x, z_0, z_1)
    }
}

impl<L> TwoDGridPolicy for Direct<L>
where
    L: TwoDInterpolationLaw,
{
    type Law = L;

    const NAME: &'static str = "Direct";
    const CORRELATED_SAMPLING: bool = false;

    fn calculate_lower_bound<D: TabularUnivariateDistribution>(
        x: f64,
        lower: &GridEntry<D>,
        upper: &GridEntry<D>,
    ) -> f64 {
        if x == lower.x {
            lower.distribution().lower_bound()
        } else if x == upper.x {
            upper.distribution().lower_bound()
        } else {
            lower
                .distribution()
                .lower_bound()
                .min(upper.distribution().lower_bound())
        }
    }

    fn calculate_upper_bound<D: TabularUnivariateDistribution>(
        x: f64,
        lower: &GridEntry<D>,
        upper: &GridEntry<D>,
    ) -> f64 {
        if x == lower.x {
            lower.distribution().upper_bound()
        } else if x == upper.x {
            upper.distribution().upper_bound()
        } else {
            lower
                .distribution()
                .upper_bound()
                .max(upper.distribution().upper_bound())
        }
    }

    fn evaluate_pdf<D, E>(
        x: f64,
        y: f64,
        _limits: &SecondaryLimits<'_>,
        evaluate: E,
        lower: &GridEntry<D>,
        upper: &GridEntry<D>,
        _tolerances: &Tolerances,
    ) -> Result<f64>
    where
        D: TabularUnivariateDistribution,
        E: Fn(&D, f64) -> f64,
    {
        Ok(Self::evaluate_between(x, y, evaluate, lower, upper))
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
        Self::evaluate_pdf(x, y, limits, evaluate, lower, upper, tolerances)
    }

    fn evaluate_cdf<D, E>(
        x: f64,
        y: f64,
        _limits: &SecondaryLimits<'_>,
        evaluate: E,
        lower: &GridEntry<D>,
        upper: &GridEntry<D>,
        _tolerances: &Tolerances,
    ) -> Result<f64>
    where
        D: TabularUnivariateDistribution,
        E: Fn(&D, f64) -> f64,
    {
        Ok(Self::evaluate_between(x, y, evaluate, lower, upper))
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
        Self::evaluate_cdf(x, y, limits, evaluate, lower, upper, tolerances)
    }

    fn sample_detailed<D, R, F>(
        mut sample: F,
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
        let bin = sample_bin_boundary::<L, R>(x, lower.x, upper.x, rng);
        let raw_sample = sample(bin.select(lower, upper).distribution(), rng);

        DetailedSample {
            sample: raw_sample,
            bin,
            raw_sample,
        }
    }

    fn sample_cos_detailed<D, R, F>(
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
        let bin = sample_bin_boundary::<L, R>(x, lower.x, upper.x, rng);
        let raw_sample = sample(bin.select(lower, upper).distribution(), rng);

        DetailedSample {
            sample: raw_sample,
            bin,
            raw_sample,
        }
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
        let bin = sample_bin_boundary::<L, R>(x, lower.x, upper.x, rng);
        let dist = bin.select(lower, upper).distribution();

        sample(dist, subrange_max.min(dist.upper_bound()), rng)
    }
}
