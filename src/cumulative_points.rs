// Cumulative points grid policy
//
// Unit-base treatment where the eta mapping is always linear in y,
// regardless of the y processing of the interpolation law. Secondary
// bounds are still interpolated with the y-x law.

use std::marker::PhantomData;

use rand::Rng;

use crate::config::Tolerances;
use crate::direct::Direct;
use crate::distribution::TabularUnivariateDistribution;
use crate::error::Result;
use crate::grid::GridEntry;
use crate::grid_policy::{
    interpolated_lower_bound, interpolated_upper_bound, DetailedSample, SecondaryLimits, TwoDGridPolicy,
};
use crate::interpolation::LinLin;
use crate::two_d_interpolation::TwoDInterpolationLaw;
use crate::unit_base;

/// Cumulative points policy over the interpolation law `L`.
pub struct CumulativePoints<L>(PhantomData<L>);

impl<L> TwoDGridPolicy for CumulativePoints<L>
where
    L: TwoDInterpolationLaw,
{
    type Law = L;

    const NAME: &'static str = "Cumulative Points";
    const CORRELATED_SAMPLING: bool = false;

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
        Ok(unit_base::evaluate_pdf::<L, LinLin, D, E>(
            x, y, limits, evaluate, lower, upper, tolerances,
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
        Direct::<L>::evaluate_pdf_cos(x, y, limits, evaluate, lower, upper, tolerances)
    }

    fn evaluate_cdf<D, E>(
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
        Ok(unit_base::evaluate_cdf::<L, LinLin, D, E>(
            x, y, limits, evaluate, lower, upper, tolerances,
        ))
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
        Direct::<L>::evaluate_cdf_cos(x, y, limits, evaluate, lower, upper, tolerances)
    }

    fn sample_detailed<D, R, F>(
        sample: F,
        limits: &SecondaryLimits<'_>,
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
        unit_base::sample_detailed::<L, LinLin, D, R, F>(sample, limits, x, lower, upper, rng)
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
        Direct::<L>::sample_cos_detailed(sample, x, lower, upper, rng)
    }

    fn sample_in_subrange<D, R, F>(
        sample: F,
        limits: &SecondaryLimits<'_>,
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
        unit_base::sample_in_subrange::<L, LinLin, D, R, F>(
            sample,
            limits,
            x,
            lower,
            upper,
            subrange_max,
            rng,
        )
    }
}
