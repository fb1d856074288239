// Interpolated bivariate distribution
//
// Owns a bivariate grid and binds it to one grid policy. Locates the bin
// boundaries for the primary value, builds the secondary limit functors and
// hands the work to the policy. Primary values outside the grid are handled
// here, never by the policies.

use std::marker::PhantomData;

use rand::Rng;

use crate::config::{Config, Tolerances};
use crate::distribution::TabularUnivariateDistribution;
use crate::error::Result;
use crate::grid::{BinBoundaries, BivariateGrid, GridEntry};
use crate::grid_policy::{BinSide, DetailedSample, SecondaryLimits, TwoDGridPolicy};
use crate::two_d_interpolation::TwoDInterpolationLaw;

/// A sample with the index of the grid entry it was drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledOutcome {
    pub sample: f64,
    pub grid_index: usize,
    /// The sample before unit-base rescaling
    pub raw_sample: f64,
}

#[derive(Debug, Clone, Copy)]
enum Evaluation {
    Pdf,
    PdfCos,
    Cdf,
    CdfCos,
}

/// A bivariate distribution interpolated between grid points with the
/// policy `P`.
///
/// ```ignore
/// let dist = InterpolatedBivariateDistribution::<UnitBase<LinLinLin>, _>::new(grid);
/// let pdf = dist.evaluate_secondary_conditional_pdf(0.5, 5.0)?;
/// let y = dist.sample_secondary_conditional(0.5, &mut rng);
/// ```
pub struct InterpolatedBivariateDistribution<P, D> {
    grid: BivariateGrid<D>,
    tolerances: Tolerances,
    extend_beyond_primary_limits: bool,
    policy: PhantomData<P>,
}

impl<P, D> Clone for InterpolatedBivariateDistribution<P, D> {
    fn clone(&self) -> Self {
        InterpolatedBivariateDistribution {
            grid: self.grid.clone(),
            tolerances: self.tolerances,
            extend_beyond_primary_limits: self.extend_beyond_primary_limits,
            policy: PhantomData,
        }
    }
}

impl<P, D> InterpolatedBivariateDistribution<P, D>
where
    P: TwoDGridPolicy,
    D: TabularUnivariateDistribution,
{
    /// Build with a snapshot of the global configuration
    pub fn new(grid: BivariateGrid<D>) -> Self {
        let config = Config::global();
        Self::with_config(grid, &config)
    }

    pub fn with_config(grid: BivariateGrid<D>, config: &Config) -> Self {
        InterpolatedBivariateDistribution {
            grid,
            tolerances: config.tolerances,
            extend_beyond_primary_limits: config.extend_beyond_primary_limits,
            policy: PhantomData,
        }
    }

    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    /// Evaluate with the nearest grid distribution outside the primary grid
    pub fn extend_beyond_primary_limits(mut self, extend: bool) -> Self {
        self.extend_beyond_primary_limits = extend;
        self
    }

    pub fn grid(&self) -> &BivariateGrid<D> {
        &self.grid
    }

    pub fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    pub fn is_extended_beyond_primary_limits(&self) -> bool {
        self.extend_beyond_primary_limits
    }

    pub fn policy_name(&self) -> &'static str {
        P::name()
    }

    pub fn interpolation_law_name(&self) -> String {
        <P::Law as TwoDInterpolationLaw>::name()
    }

    pub fn lower_bound_of_primary(&self) -> f64 {
        self.grid.primary_grid_min()
    }

    pub fn upper_bound_of_primary(&self) -> f64 {
        self.grid.primary_grid_max()
    }

    /// Grid entry used for a primary value outside the grid, with its index
    fn nearest_entry(&self, x: f64) -> (&GridEntry<D>, usize) {
        if x < self.grid.primary_grid_min() {
            (self.grid.first(), 0)
        } else {
            (self.grid.last(), self.grid.len() - 1)
        }
    }

    /// The entry to evaluate outside the grid, or `None` when the value
    /// there is zero
    fn extended_entry(&self, x: f64) -> Option<&GridEntry<D>> {
        if self.extend_beyond_primary_limits {
            Some(self.nearest_entry(x).0)
        } else {
            log::warn!(
                "primary value {} is outside the grid [{}, {}]",
                x,
                self.grid.primary_grid_min(),
                self.grid.primary_grid_max()
            );
            None
        }
    }

    pub fn lower_bound_of_secondary(&self, x: f64) -> f64 {
        match self.grid.find_bin_boundaries(x) {
            Some(bins) => P::calculate_lower_bound(x, bins.lower, bins.upper),
            None => self
                .extended_entry(x)
                .map_or(0.0, |entry| entry.distribution().lower_bound()),
        }
    }

    pub fn upper_bound_of_secondary(&self, x: f64) -> f64 {
        match self.grid.find_bin_boundaries(x) {
            Some(bins) => P::calculate_upper_bound(x, bins.lower, bins.upper),
            None => self
                .extended_entry(x)
                .map_or(0.0, |entry| entry.distribution().upper_bound()),
        }
    }

    fn evaluate_with<E>(&self, x: f64, y: f64, method: Evaluation, evaluate: E) -> Result<f64>
    where
        E: Fn(&D, f64) -> f64,
    {
        let bins = match self.grid.find_bin_boundaries(x) {
            Some(bins) => bins,
            None => {
                return Ok(self
                    .extended_entry(x)
                    .map_or(0.0, |entry| evaluate(entry.distribution(), y)))
            }
        };

        let BinBoundaries { lower, upper, .. } = bins;
        let lower_limit = |x: f64| P::calculate_lower_bound(x, lower, upper);
        let upper_limit = |x: f64| P::calculate_upper_bound(x, lower, upper);
        let limits = SecondaryLimits::new(&lower_limit, &upper_limit);
        let tolerances = &self.tolerances;

        match method {
            Evaluation::Pdf => P::evaluate_pdf(x, y, &limits, evaluate, lower, upper, tolerances),
            Evaluation::PdfCos => P::evaluate_pdf_cos(x, y, &limits, evaluate, lower, upper, tolerances),
            Evaluation::Cdf => P::evaluate_cdf(x, y, &limits, evaluate, lower, upper, tolerances),
            Evaluation::CdfCos => P::evaluate_cdf_cos(x, y, &limits, evaluate, lower, upper, tolerances),
        }
    }

    /// Evaluate the raw (unnormalized) distribution
    pub fn evaluate(&self, x: f64, y: f64) -> Result<f64> {
        self.evaluate_with(x, y, Evaluation::Pdf, |dist, y| dist.evaluate(y))
    }

    pub fn evaluate_cos(&self, x: f64, y: f64) -> Result<f64> {
        self.evaluate_with(x, y, Evaluation::PdfCos, |dist, y| dist.evaluate(y))
    }

    pub fn evaluate_secondary_conditional_pdf(&self, x: f64, y: f64) -> Result<f64> {
        self.evaluate_with(x, y, Evaluation::Pdf, |dist, y| dist.evaluate_pdf(y))
    }

    pub fn evaluate_secondary_conditional_pdf_cos(&self, x: f64, y: f64) -> Result<f64> {
        self.evaluate_with(x, y, Evaluation::PdfCos, |dist, y| dist.evaluate_pdf(y))
    }

    pub fn evaluate_secondary_conditional_cdf(&self, x: f64, y: f64) -> Result<f64> {
        self.evaluate_with(x, y, Evaluation::Cdf, |dist, y| dist.evaluate_cdf(y))
    }

    pub fn evaluate_secondary_conditional_cdf_cos(&self, x: f64, y: f64) -> Result<f64> {
        self.evaluate_with(x, y, Evaluation::CdfCos, |dist, y| dist.evaluate_cdf(y))
    }

    fn sample_with<R>(&self, x: f64, cos: bool, rng: &mut R) -> SampledOutcome
    where
        R: Rng + ?Sized,
    {
        let bins = match self.grid.find_bin_boundaries(x) {
            Some(bins) => bins,
            None => {
                let (entry, grid_index) = self.nearest_entry(x);
                let sample = entry.distribution().sample(rng);
                return SampledOutcome {
                    sample,
                    grid_index,
                    raw_sample: sample,
                };
            }
        };

        let BinBoundaries { index, lower, upper } = bins;
        let lower_limit = |x: f64| P::calculate_lower_bound(x, lower, upper);
        let upper_limit = |x: f64| P::calculate_upper_bound(x, lower, upper);
        let limits = SecondaryLimits::new(&lower_limit, &upper_limit);

        let detailed: DetailedSample = if P::CORRELATED_SAMPLING {
            let random_number: f64 = rng.gen();
            let sample = |dist: &D, _: &mut R| dist.sample_with_random_number(random_number);

            if cos {
                P::sample_cos_detailed(sample, x, lower, upper, rng)
            } else {
                P::sample_detailed(sample, &limits, x, lower, upper, rng)
            }
        } else {
            let sample = |dist: &D, rng: &mut R| dist.sample(rng);

            if cos {
                P::sample_cos_detailed(sample, x, lower, upper, rng)
            } else {
                P::sample_detailed(sample, &limits, x, lower, upper, rng)
            }
        };

        SampledOutcome {
            sample: detailed.sample,
            grid_index: match detailed.bin {
                BinSide::Lower => index,
                BinSide::Upper => index + 1,
            },
            raw_sample: detailed.raw_sample,
        }
    }

    pub fn sample_secondary_conditional<R: Rng + ?Sized>(&self, x: f64, rng: &mut R) -> f64 {
        self.sample_with(x, false, rng).sample
    }

    pub fn sample_secondary_conditional_cos<R: Rng + ?Sized>(&self, x: f64, rng: &mut R) -> f64 {
        self.sample_with(x, true, rng).sample
    }

    /// Sample and report the grid entry that was used
    pub fn sample_secondary_conditional_and_record_bin_indices<R: Rng + ?Sized>(
        &self,
        x: f64,
        rng: &mut R,
    ) -> SampledOutcome {
        self.sample_with(x, false, rng)
    }

    /// Sample no higher than `max_y`
    pub fn sample_secondary_conditional_in_subrange<R: Rng + ?Sized>(&self, x: f64, max_y: f64, rng: &mut R) -> f64 {
        let bins = match self.grid.find_bin_boundaries(x) {
            Some(bins) => bins,
            None => return self.nearest_entry(x).0.distribution().sample_in_subrange(rng, max_y),
        };

        let BinBoundaries { lower, upper, .. } = bins;
        let lower_limit = |x: f64| P::calculate_lower_bound(x, lower, upper);
        let upper_limit = |x: f64| P::calculate_upper_bound(x, lower, upper);
        let limits = SecondaryLimits::new(&lower_limit, &upper_limit);

        if P::CORRELATED_SAMPLING {
            let random_number: f64 = rng.gen();
            let sample = |dist: &D, max: f64, _: &mut R| dist.sample_with_random_number_in_subrange(random_number, max);
            P::sample_in_subrange(sample, &limits, x, lower, upper, max_y, rng)
        } else {
            let sample = |dist: &D, max: f64, rng: &mut R| dist.sample_in_subrange(rng, max);
            P::sample_in_subrange(sample, &limits, x, lower, upper, max_y, rng)
        }
    }
}
