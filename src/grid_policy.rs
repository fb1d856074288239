// Two-dimensional grid policies
//
// A grid policy combines the distributions on two adjacent grid entries
// into a distribution at an intermediate primary value. Every policy is a
// stateless marker type; all operations are associated functions that take
// the bin boundaries, the primary value and the tolerances explicitly.

use rand::Rng;

use crate::config::Tolerances;
use crate::distribution::TabularUnivariateDistribution;
use crate::error::Result;
use crate::grid::GridEntry;
use crate::interpolation::{InterpolationLaw, LinLin};
use crate::two_d_interpolation::TwoDInterpolationLaw;

/// Which bin boundary a sample was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinSide {
    Lower,
    Upper,
}

impl BinSide {
    #[inline]
    pub fn select<'a, T>(self, lower: &'a T, upper: &'a T) -> &'a T {
        match self {
            BinSide::Lower => lower,
            BinSide::Upper => upper,
        }
    }
}

/// A sample together with its bin provenance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetailedSample {
    pub sample: f64,
    /// The bin boundary used for the sample
    pub bin: BinSide,
    /// The sample before any unit-base rescaling
    pub raw_sample: f64,
}

/// Secondary-variable limits as a function of the primary value.
///
/// Policies only query these at the primary value they were given.
#[derive(Clone, Copy)]
pub struct SecondaryLimits<'a> {
    lower: &'a dyn Fn(f64) -> f64,
    upper: &'a dyn Fn(f64) -> f64,
}

impl<'a> SecondaryLimits<'a> {
    pub fn new(lower: &'a dyn Fn(f64) -> f64, upper: &'a dyn Fn(f64) -> f64) -> Self {
        SecondaryLimits { lower, upper }
    }

    #[inline]
    pub fn lower(&self, x: f64) -> f64 {
        (self.lower)(x)
    }

    #[inline]
    pub fn upper(&self, x: f64) -> f64 {
        (self.upper)(x)
    }
}

/// Select a bin boundary with probability of the upper boundary equal to the
/// position of `x` between the boundaries in processed primary space.
pub fn sample_bin_boundary<L, R>(x: f64, lower_x: f64, upper_x: f64, rng: &mut R) -> BinSide
where
    L: TwoDInterpolationLaw,
    R: Rng + ?Sized,
{
    let interpolation_fraction = L::first_indep_fraction(lower_x, upper_x, x);

    if rng.gen::<f64>() < interpolation_fraction {
        BinSide::Upper
    } else {
        BinSide::Lower
    }
}

/// Combine values from both bin boundaries across the primary bin.
///
/// The z-x law is used when both values share a sign, otherwise the values
/// are combined linearly (a log law cannot interpolate through zero).
#[inline]
pub(crate) fn interpolate_across_bin<L: TwoDInterpolationLaw>(
    x_0: f64,
    x_1: f64,
    x: f64,
    z_0: f64,
    z_1: f64,
) -> f64 {
    if z_0 * z_1 > 0.0 {
        L::ZX::interpolate(x_0, x_1, x, z_0, z_1)
    } else {
        LinLin::interpolate(x_0, x_1, x, z_0, z_1)
    }
}

/// Lower secondary bound interpolated with the y-x law
pub(crate) fn interpolated_lower_bound<L, D>(x: f64, lower: &GridEntry<D>, upper: &GridEntry<D>) -> f64
where
    L: TwoDInterpolationLaw,
    D: TabularUnivariateDistribution,
{
    if x == lower.x {
        lower.distribution().lower_bound()
    } else if x == upper.x {
        upper.distribution().lower_bound()
    } else {
        L::calculate_intermediate_grid_limit(
            lower.x,
            upper.x,
            x,
            lower.distribution().lower_bound(),
            upper.distribution().lower_bound(),
        )
    }
}

/// Upper secondary bound interpolated with the y-x law
pub(crate) fn interpolated_upper_bound<L, D>(x: f64, lower: &GridEntry<D>, upper: &GridEntry<D>) -> f64
where
    L: TwoDInterpolationLaw,
    D: TabularUnivariateDistribution,
{
    if x == lower.x {
        lower.distribution().upper_bound()
    } else if x == upper.x {
        upper.distribution().upper_bound()
    } else {
        L::calculate_intermediate_grid_limit(
            lower.x,
            upper.x,
            x,
            lower.distribution().upper_bound(),
            upper.distribution().upper_bound(),
        )
    }
}

/// A grid policy parameterized by a two-dimensional interpolation law.
///
/// Every operation assumes `lower.x <= x <= upper.x`. Evaluation methods are
/// passed in so the same combination rule serves raw values, densities and
/// cumulative values alike.
pub trait TwoDGridPolicy: 'static {
    type Law: TwoDInterpolationLaw;

    const NAME: &'static str;

    /// True when sampling functors must reuse one random number on both
    /// bin boundaries (they should wrap `sample_with_random_number`)
    const CORRELATED_SAMPLING: bool;

    fn name() -> &'static str {
        Self::NAME
    }

    fn calculate_lower_bound<D: TabularUnivariateDistribution>(
        x: f64,
        lower: &GridEntry<D>,
        upper: &GridEntry<D>,
    ) -> f64;

    fn calculate_upper_bound<D: TabularUnivariateDistribution>(
        x: f64,
        lower: &GridEntry<D>,
        upper: &GridEntry<D>,
    ) -> f64;

    #[allow(clippy::too_many_arguments)]
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
        E: Fn(&D, f64) -> f64;

    /// As [`TwoDGridPolicy::evaluate_pdf`] for a cosine secondary variable
    #[allow(clippy::too_many_arguments)]
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
        E: Fn(&D, f64) -> f64;

    #[allow(clippy::too_many_arguments)]
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
        E: Fn(&D, f64) -> f64;

    #[allow(clippy::too_many_arguments)]
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
        E: Fn(&D, f64) -> f64;

    /// Draw a sample and report the bin used and the raw sample
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
        F: FnMut(&D, &mut R) -> f64;

    /// Draw a cosine sample; the cosine range needs no rescaling
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
        F: FnMut(&D, &mut R) -> f64;

    /// Draw a sample no larger than `subrange_max`. The functor receives the
    /// distribution and the cap to apply on it.
    #[allow(clippy::too_many_arguments)]
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
        F: FnMut(&D, f64, &mut R) -> f64;

    fn sample<D, R, F>(
        sample: F,
        limits: &SecondaryLimits<'_>,
        x: f64,
        lower: &GridEntry<D>,
        upper: &GridEntry<D>,
        rng: &mut R,
    ) -> f64
    where
        D: TabularUnivariateDistribution,
        R: Rng + ?Sized,
        F: FnMut(&D, &mut R) -> f64,
    {
        Self::sample_detailed(sample, limits, x, lower, upper, rng).sample
    }

    fn sample_cos<D, R, F>(
        sample: F,
        x: f64,
        lower: &GridEntry<D>,
        upper: &GridEntry<D>,
        rng: &mut R,
    ) -> f64
    where
        D: TabularUnivariateDistribution,
        R: Rng + ?Sized,
        F: FnMut(&D, &mut R) -> f64,
    {
        Self::sample_cos_detailed(sample, x, lower, upper, rng).sample
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::distribution::SecondaryDistribution;
    use crate::grid::GridEntry;
    use crate::interpolation::LinLin;
    use crate::tabular::TabularDistribution;
    use crate::uniform::UniformDistribution;

    /// Uniform on [0, 10] at x = 0, a tent on [2.5, 7.5] at x = 1 and a
    /// weaker uniform on [0, 10] at x = 2
    pub(crate) fn entries() -> Vec<GridEntry<SecondaryDistribution>> {
        vec![
            GridEntry::new(0.0, UniformDistribution::new(0.0, 10.0, 1.0).unwrap().into()),
            GridEntry::new(
                1.0,
                TabularDistribution::<LinLin>::new(vec![2.5, 5.0, 7.5], vec![0.1, 1.0, 0.5])
                    .unwrap()
                    .into(),
            ),
            GridEntry::new(2.0, UniformDistribution::new(0.0, 10.0, 0.1).unwrap().into()),
        ]
    }
}
