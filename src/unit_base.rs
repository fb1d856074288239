// Unit-base grid policy
//
// The secondary variable on each bin boundary is mapped onto [0, 1]
// ("eta") relative to that boundary's own range. Evaluation and sampling
// happen at a common eta and are then mapped back onto the intermediate
// secondary range at x. The rescale law `S` decides how y maps to eta:
// the unit-base policy uses the z-y law of the 2-D law, the cumulative
// points policy always rescales linearly.

use std::marker::PhantomData;

use rand::Rng;

use crate::config::Tolerances;
use crate::direct::Direct;
use crate::distribution::TabularUnivariateDistribution;
use crate::error::Result;
use crate::grid::GridEntry;
use crate::grid_policy::{
    interpolate_across_bin, interpolated_lower_bound, interpolated_upper_bound, sample_bin_boundary,
    DetailedSample, SecondaryLimits, TwoDGridPolicy,
};
use crate::interpolation::{calculate_fuzzy_lower_bound, calculate_fuzzy_upper_bound, InterpolationLaw};
use crate::two_d_interpolation::TwoDInterpolationLaw;

/// Unit-base policy over the interpolation law `L`.
pub struct UnitBase<L>(PhantomData<L>);

/// Eta of `y` on [min, max]; values at or beyond either end snap onto it
pub(crate) fn unit_base_eta<S: InterpolationLaw>(y: f64, min: f64, max: f64, length: f64) -> f64 {
    if y > min && y < max {
        S::calculate_unit_base_indep_var(y, min, length)
    } else if y <= min {
        0.0
    } else {
        1.0
    }
}

/// Eta of a sample on a distribution of the given processed length.
/// A zero length range only holds eta = 0.
#[inline]
fn sample_eta<S: InterpolationLaw>(raw_sample: f64, min: f64, length: f64) -> f64 {
    if length > 0.0 {
        S::calculate_unit_base_indep_var(raw_sample, min, length)
    } else {
        0.0
    }
}

/// Evaluate on a single grid entry after mapping `y` from the intermediate
/// range [min, max] onto the entry's own range.
///
/// Returns `None` when `y` lies outside the fuzzy intermediate range.
pub(crate) fn evaluate_on_entry<S, D, E>(
    y: f64,
    min: f64,
    max: f64,
    evaluate: &E,
    entry: &GridEntry<D>,
    fuzzy_boundary_tol: f64,
) -> Option<f64>
where
    S: InterpolationLaw,
    D: TabularUnivariateDistribution,
    E: Fn(&D, f64) -> f64,
{
    if y < calculate_fuzzy_lower_bound(min, fuzzy_boundary_tol)
        || y > calculate_fuzzy_upper_bound(max, fuzzy_boundary_tol)
    {
        return None;
    }

    let eta = unit_base_eta::<S>(y, min, max, S::calculate_unit_base_grid_length(min, max));

    let dist = entry.distribution();
    let length = S::calculate_unit_base_grid_length(dist.lower_bound(), dist.upper_bound());
    let norm_y = S::calculate_indep_var(eta, dist.lower_bound(), length).min(dist.upper_bound());

    Some(evaluate(dist, norm_y))
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn evaluate_pdf<L, S, D, E>(
    x: f64,
    y: f64,
    limits: &SecondaryLimits<'_>,
    evaluate: E,
    lower: &GridEntry<D>,
    upper: &GridEntry<D>,
    tolerances: &Tolerances,
) -> f64
where
    L: TwoDInterpolationLaw,
    S: InterpolationLaw,
    D: TabularUnivariateDistribution,
    E: Fn(&D, f64) -> f64,
{
    let min = limits.lower(x);
    let max = limits.upper(x);
    let tol = tolerances.fuzzy_boundary_tol;

    if x == lower.x || x == upper.x {
        let entry = if x == lower.x { lower } else { upper };
        return evaluate_on_entry::<S, D, E>(y, min, max, &evaluate, entry, tol).unwrap_or(0.0);
    }

    if y < calculate_fuzzy_lower_bound(min, tol) || y > calculate_fuzzy_upper_bound(max, tol) {
        return 0.0;
    }

    let length = S::calculate_unit_base_grid_length(min, max);
    if length <= 0.0 {
        return 0.0;
    }
    let eta = unit_base_eta::<S>(y, min, max, length);

    let (dist_0, dist_1) = (lower.distribution(), upper.distribution());
    let length_0 = S::calculate_unit_base_grid_length(dist_0.lower_bound(), dist_0.upper_bound());
    let length_1 = S::calculate_unit_base_grid_length(dist_1.lower_bound(), dist_1.upper_bound());

    let y_0 = S::calculate_indep_var_with_tol(eta, dist_0.lower_bound(), length_0, tol)
        .min(dist_0.upper_bound());
    let y_1 = S::calculate_indep_var_with_tol(eta, dist_1.lower_bound(), length_1, tol)
        .min(dist_1.upper_bound());

    // Densities in eta space
    let z_0 = evaluate(dist_0, y_0) * length_0;
    let z_1 = evaluate(dist_1, y_1) * length_1;

    interpolate_across_bin::<L>(lower.x, upper.x, x, z_0, z_1) / length
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn evaluate_cdf<L, S, D, E>(
    x: f64,
    y: f64,
    limits: &SecondaryLimits<'_>,
    evaluate: E,
    lower: &GridEntry<D>,
    upper: &GridEntry<D>,
    tolerances: &Tolerances,
) -> f64
where
    L: TwoDInterpolationLaw,
    S: InterpolationLaw,
    D: TabularUnivariateDistribution,
    E: Fn(&D, f64) -> f64,
{
    let min = limits.lower(x);
    let max = limits.upper(x);
    let tol = tolerances.fuzzy_boundary_tol;
    let fuzzy_min = calculate_fuzzy_lower_bound(min, tol);
    let fuzzy_max = calculate_fuzzy_upper_bound(max, tol);

    if y < fuzzy_min {
        return 0.0;
    }
    if y > fuzzy_max {
        return 1.0;
    }

    if x == lower.x || x == upper.x {
        let entry = if x == lower.x { lower } else { upper };
        return evaluate_on_entry::<S, D, E>(y, min, max, &evaluate, entry, tol).unwrap_or(0.0);
    }

    let length = S::calculate_unit_base_grid_length(min, max);
    let eta = unit_base_eta::<S>(y, min, max, length);

    let (dist_0, dist_1) = (lower.distribution(), upper.distribution());
    let length_0 = S::calculate_unit_base_grid_length(dist_0.lower_bound(), dist_0.upper_bound());
    let length_1 = S::calculate_unit_base_grid_length(dist_1.lower_bound(), dist_1.upper_bound());

    let y_0 = S::calculate_indep_var_with_tol(eta, dist_0.lower_bound(), length_0, tol)
        .min(dist_0.upper_bound());
    let y_1 = S::calculate_indep_var_with_tol(eta, dist_1.lower_bound(), length_1, tol)
        .min(dist_1.upper_bound());

    let cdf_0 = evaluate(dist_0, y_0);
    let cdf_1 = evaluate(dist_1, y_1);

    if cdf_0 == cdf_1 {
        cdf_0
    } else {
        interpolate_across_bin::<L>(lower.x, upper.x, x, cdf_0, cdf_1)
    }
}

/// Map a raw sample from a bin boundary onto the intermediate range at x
fn rescale_sample<S, D>(raw_sample: f64, entry: &GridEntry<D>, min: f64, max: f64) -> f64
where
    S: InterpolationLaw,
    D: TabularUnivariateDistribution,
{
    let dist = entry.distribution();
    let entry_length = S::calculate_unit_base_grid_length(dist.lower_bound(), dist.upper_bound());
    let eta = sample_eta::<S>(raw_sample, dist.lower_bound(), entry_length);

    S::calculate_indep_var(eta, min, S::calculate_unit_base_grid_length(min, max))
}

pub(crate) fn sample_detailed<L, S, D, R, F>(
    mut sample: F,
    limits: &SecondaryLimits<'_>,
    x: f64,
    lower: &GridEntry<D>,
    upper: &GridEntry<D>,
    rng: &mut R,
) -> DetailedSample
where
    L: TwoDInterpolationLaw,
    S: InterpolationLaw,
    D: TabularUnivariateDistribution,
    R: Rng + ?Sized,
    F: FnMut(&D, &mut R) -> f64,
{
    let bin = sample_bin_boundary::<L, R>(x, lower.x, upper.x, rng);
    let entry = bin.select(lower, upper);
    let raw_sample = sample(entry.distribution(), rng);

    DetailedSample {
        sample: rescale_sample::<S, D>(raw_sample, entry, limits.lower(x), limits.upper(x)),
        bin,
        raw_sample,
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn sample_in_subrange<L, S, D, R, F>(
    mut sample: F,
    limits: &SecondaryLimits<'_>,
    x: f64,
    lower: &GridEntry<D>,
    upper: &GridEntry<D>,
    subrange_max: f64,
    rng: &mut R,
) -> f64
where
    L: TwoDInterpolationLaw,
    S: InterpolationLaw,
    D: TabularUnivariateDistribution,
    R: Rng + ?Sized,
    F: FnMut(&D, f64, &mut R) -> f64,
{
    let bin = sample_bin_boundary::<L, R>(x, lower.x, upper.x, rng);
    let entry = bin.select(lower, upper);
    let dist = entry.distribution();

    let min = limits.lower(x);
    let max = limits.upper(x);

    // Cap on the boundary distribution matching subrange_max at x
    let cap = if subrange_max < max {
        let eta = S::calculate_unit_base_indep_var(
            subrange_max,
            min,
            S::calculate_unit_base_grid_length(min, max),
        );
        let entry_length = S::calculate_unit_base_grid_length(dist.lower_bound(), dist.upper_bound());
        S::calculate_indep_var(eta, dist.lower_bound(), entry_length).min(dist.upper_bound())
    } else {
        dist.upper_bound()
    };

    let raw_sample = sample(dist, cap, rng);

    rescale_sample::<S, D>(raw_sample, entry, min, max)
}

impl<L> TwoDGridPolicy for UnitBase<L>
where
    L: TwoDInterpolationLaw,
{
    type Law = L;

    const NAME: &'static str = "Unit-base";
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
        Ok(evaluate_pdf::<L, L::ZY, D, E>(x, y, limits, evaluate, lower, upper, tolerances))
    }

    // The cosine range is shared by every grid point
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
        Ok(evaluate_cdf::<L, L::ZY, D, E>(x, y, limits, evaluate, lower, upper, tolerances))
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
        sample_detailed::<L, L::ZY, D, R, F>(sample, limits, x, lower, upper, rng)
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
        sample_in_subrange::<L, L::ZY, D, R, F>(sample, limits, x, lower, upper, subrange_max, rng)
    }
}
