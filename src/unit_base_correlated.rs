// Unit-base correlated grid policy
//
// Correlated sampling in unit-base space: the quantiles of the bin boundary
// distributions at a shared CDF value are mapped onto [0, 1], interpolated
// across the primary bin and mapped back onto the intermediate secondary
// range at x.

use std::marker::PhantomData;

use rand::Rng;

use crate::cdf_inversion::{
    calculate_unit_base_correlated_secondary_values, estimate_unit_base_correlated_cdf, BoundaryLengths,
};
use crate::config::Tolerances;
use crate::correlated::Correlated;
use crate::distribution::TabularUnivariateDistribution;
use crate::error::Result;
use crate::grid::GridEntry;
use crate::grid_policy::{
    interpolated_lower_bound, interpolated_upper_bound, BinSide, DetailedSample, SecondaryLimits,
    TwoDGridPolicy,
};
use crate::interpolation::{calculate_fuzzy_lower_bound, calculate_fuzzy_upper_bound, InterpolationLaw, Lin, Processing};
use crate::two_d_interpolation::TwoDInterpolationLaw;
use crate::unit_base::evaluate_on_entry;

/// Unit-base correlated policy over the interpolation law `L`.
pub struct UnitBaseCorrelated<L>(PhantomData<L>);

/// Correlated density expressed through the unit-base lengths.
///
/// With linear y processing (or at eta = 0) the eta densities are
/// `f_i * L_i`; with log processing the length up to the correlated value
/// replaces the full length.
#[allow(clippy::too_many_arguments)]
fn unit_base_correlated_pdf<P: Processing>(
    y: f64,
    min: f64,
    length: f64,
    lower: (f64, f64, f64, f64),
    upper: (f64, f64, f64, f64),
    eta: f64,
    beta: f64,
) -> f64 {
    // (y_i, lower bound, length, evaluation) per boundary
    let (lower_y, lower_min, lower_length, lower_eval) = lower;
    let (upper_y, upper_min, upper_length, upper_eval) = upper;

    if !P::IS_LOG || eta == 0.0 {
        let lower_product = lower_eval * lower_length;
        let upper_product = upper_eval * upper_length;

        lower_product * upper_product / Lin::blend(upper_product, lower_product, beta) / length
    } else {
        let lower_product = lower_eval * (P::process(lower_y) - P::process(lower_min));
        let upper_product = upper_eval * (P::process(upper_y) - P::process(upper_min));

        lower_product * upper_product
            / Lin::blend(upper_product, lower_product, beta)
            / (P::process(y) - P::process(min))
    }
}

impl<L> UnitBaseCorrelated<L>
where
    L: TwoDInterpolationLaw,
{
    fn lengths<D: TabularUnivariateDistribution>(lower: &D, upper: &D) -> BoundaryLengths {
        BoundaryLengths {
            lower: L::ZY::calculate_unit_base_grid_length(lower.lower_bound(), lower.upper_bound()),
            upper: L::ZY::calculate_unit_base_grid_length(upper.lower_bound(), upper.upper_bound()),
        }
    }

    fn sample_eta(sample: f64, min: f64, length: f64) -> f64 {
        if length > 0.0 {
            L::ZY::calculate_unit_base_indep_var(sample, min, length)
        } else {
            0.0
        }
    }

    fn interpolate_eta(x_0: f64, x_1: f64, x: f64, eta_0: f64, eta_1: f64) -> f64 {
        if eta_0 == eta_1 {
            eta_0
        } else {
            L::YX::interpolate(x_0, x_1, x, eta_0, eta_1)
        }
    }

    fn exact_entry<'a, D>(x: f64, lower: &'a GridEntry<D>, upper: &'a GridEntry<D>) -> Option<&'a GridEntry<D>> {
        if x == lower.x {
            Some(lower)
        } else if x == upper.x {
            Some(upper)
        } else {
            None
        }
    }
}

impl<L> TwoDGridPolicy for UnitBaseCorrelated<L>
where
    L: TwoDInterpolationLaw,
{
    type Law = L;

    const NAME: &'static str = "Unit-base Correlated";
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
        let min = limits.lower(x);
        let max = limits.upper(x);
        let tol = tolerances.fuzzy_boundary_tol;

        if let Some(entry) = Self::exact_entry(x, lower, upper) {
            return Ok(evaluate_on_entry::<L::ZY, D, E>(y, min, max, &evaluate, entry, tol).unwrap_or(0.0));
        }

        if y < calculate_fuzzy_lower_bound(min, tol) || y > calculate_fuzzy_upper_bound(max, tol) {
            return Ok(0.0);
        }
        // Values inside the fuzzy margin evaluate at the nearest limit
        let y = y.max(min).min(max);

        let length = L::ZY::calculate_unit_base_grid_length(min, max);
        if length <= 0.0 {
            return Ok(0.0);
        }

        let (dist_0, dist_1) = (lower.distribution(), upper.distribution());
        let lengths = Self::lengths(dist_0, dist_1);
        let beta = L::first_indep_fraction(lower.x, upper.x, x);

        let (lower_y, upper_y, eta) = if y == min {
            (dist_0.lower_bound(), dist_1.lower_bound(), 0.0)
        } else if y == max {
            (dist_0.upper_bound(), dist_1.upper_bound(), 1.0)
        } else {
            let eta = L::ZY::calculate_unit_base_indep_var_with_tol(y, min, length, tol);
            let y_0 = L::ZY::calculate_indep_var_with_tol(eta, dist_0.lower_bound(), lengths.lower, tol);
            let y_1 = L::ZY::calculate_indep_var_with_tol(eta, dist_1.lower_bound(), lengths.upper, tol);

            let (lower_y, upper_y) = calculate_unit_base_correlated_secondary_values::<L, D>(
                eta, y_0, y_1, beta, dist_0, dist_1, lengths, tolerances,
            )?;
            (lower_y, upper_y, eta)
        };

        let lower_eval = evaluate(dist_0, lower_y);
        let upper_eval = evaluate(dist_1, upper_y);

        if lower_eval == upper_eval {
            return Ok(lower_eval);
        }

        Ok(unit_base_correlated_pdf::<<L::ZY as InterpolationLaw>::Indep>(
            y,
            min,
            length,
            (lower_y, dist_0.lower_bound(), lengths.lower, lower_eval),
            (upper_y, dist_1.lower_bound(), lengths.upper, upper_eval),
            eta,
            beta,
        ))
    }

    // Cosine ranges are shared by every grid point
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
        Correlated::<L>::evaluate_pdf_cos(x, y, limits, evaluate, lower, upper, tolerances)
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
        let min = limits.lower(x);
        let max = limits.upper(x);

        if let Some(entry) = Self::exact_entry(x, lower, upper) {
            let tol = tolerances.fuzzy_boundary_tol;
            if y > calculate_fuzzy_upper_bound(max, tol) {
                return Ok(1.0);
            }
            if y < calculate_fuzzy_lower_bound(min, tol) {
                return Ok(0.0);
            }
            return Ok(evaluate_on_entry::<L::ZY, D, E>(y, min, max, &evaluate, entry, tol).unwrap_or(0.0));
        }

        if y <= min {
            return Ok(0.0);
        }
        if y >= max {
            return Ok(1.0);
        }

        let (dist_0, dist_1) = (lower.distribution(), upper.distribution());
        let lengths = Self::lengths(dist_0, dist_1);
        let beta = L::first_indep_fraction(lower.x, upper.x, x);

        let eta = L::ZY::calculate_unit_base_indep_var(y, min, L::ZY::calculate_unit_base_grid_length(min, max));
        let y_0 = L::ZY::calculate_indep_var(eta, dist_0.lower_bound(), lengths.lower);
        let y_1 = L::ZY::calculate_indep_var(eta, dist_1.lower_bound(), lengths.upper);

        let estimate =
            estimate_unit_base_correlated_cdf::<L, D>(eta, y_0, y_1, beta, dist_0, dist_1, lengths, tolerances)?;

        Ok(estimate.cdf)
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
        Correlated::<L>::evaluate_cdf_cos(x, y, limits, evaluate, lower, upper, tolerances)
    }

    fn sample_detailed<D, R, F>(
        mut sample: F,
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
        let (sample, bin) = if x == upper.x {
            (sample(upper.distribution(), rng), BinSide::Upper)
        } else if x == lower.x {
            (sample(lower.distribution(), rng), BinSide::Lower)
        } else {
            let min = limits.lower(x);
            let max = limits.upper(x);

            if min == max {
                (min, BinSide::Lower)
            } else {
                let (dist_0, dist_1) = (lower.distribution(), upper.distribution());
                let lengths = Self::lengths(dist_0, dist_1);

                let eta_0 = Self::sample_eta(sample(dist_0, rng), dist_0.lower_bound(), lengths.lower);
                let eta_1 = Self::sample_eta(sample(dist_1, rng), dist_1.lower_bound(), lengths.upper);
                let eta = Self::interpolate_eta(lower.x, upper.x, x, eta_0, eta_1);

                let length = L::ZY::calculate_unit_base_grid_length(min, max);
                (L::ZY::calculate_indep_var(eta, min, length), BinSide::Lower)
            }
        };

        DetailedSample {
            sample,
            bin,
            raw_sample: sample,
        }
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
        Correlated::<L>::sample_cos_detailed(sample, x, lower, upper, rng)
    }

    fn sample_in_subrange<D, R, F>(
        mut sample: F,
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
        let cap = |dist: &D| subrange_max.min(dist.upper_bound()).max(dist.lower_bound());

        if let Some(entry) = Self::exact_entry(x, lower, upper) {
            let dist = entry.distribution();
            return sample(dist, cap(dist), rng);
        }

        let min = limits.lower(x);
        let max = subrange_max.min(limits.upper(x)).max(min);
        if min == max {
            return min;
        }

        let (dist_0, dist_1) = (lower.distribution(), upper.distribution());
        let (cap_0, cap_1) = (cap(dist_0), cap(dist_1));

        let length_0 = L::ZY::calculate_unit_base_grid_length(dist_0.lower_bound(), cap_0);
        let length_1 = L::ZY::calculate_unit_base_grid_length(dist_1.lower_bound(), cap_1);

        let eta_0 = Self::sample_eta(sample(dist_0, cap_0, rng), dist_0.lower_bound(), length_0);
        let eta_1 = Self::sample_eta(sample(dist_1, cap_1, rng), dist_1.lower_bound(), length_1);
        let eta = Self::interpolate_eta(lower.x, upper.x, x, eta_0, eta_1);

        L::ZY::calculate_indep_var(eta, min, L::ZY::calculate_unit_base_grid_length(min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{SecondaryDistribution, UnivariateDistribution};
    use crate::fake_rng::FakeRng;
    use crate::grid_policy::fixtures;
    use crate::interpolation::{LinLin, LinLogCos};
    use crate::tabular::TabularDistribution;
    use crate::two_d_interpolation::{LinLinLin, LinLogCosLin, LinLogLin};
    use crate::uniform::UniformDistribution;
    use approx::assert_relative_eq;

    type Policy = UnitBaseCorrelated<LinLinLin>;

    fn eval(d: &SecondaryDistribution, y: f64) -> f64 {
        d.evaluate(y)
    }

    fn cdf(d: &SecondaryDistribution, y: f64) -> f64 {
        d.evaluate_cdf(y)
    }

    fn with_limits<T>(
        e: &[GridEntry<SecondaryDistribution>],
        f: impl FnOnce(&SecondaryLimits<'_>) -> T,
    ) -> T {
        let lo = |x: f64| Policy::calculate_lower_bound(x, &e[0], &e[1]);
        let hi = |x: f64| Policy::calculate_upper_bound(x, &e[0], &e[1]);
        f(&SecondaryLimits::new(&lo, &hi))
    }

    #[test]
    fn test_name() {
        assert_eq!(Policy::name(), "Unit-base Correlated");
        assert!(Policy::CORRELATED_SAMPLING);
    }

    #[test]
    fn test_evaluate_at_intermediate_limits() {
        let e = fixtures::entries();
        let tol = Tolerances::default();
        with_limits(&e[0..2], |limits| {
            // y = min pairs the lower bounds: 10 * 0.5 / (5 + 5 * 0.5) / 7.5
            let z = Policy::evaluate_pdf(0.5, 1.25, limits, eval, &e[0], &e[1], &tol).unwrap();
            assert_relative_eq!(z, 10.0 * 0.5 / 5.25 / 7.5, max_relative = 1e-12);

            let z = Policy::evaluate_pdf(0.5, 8.75, limits, eval, &e[0], &e[1], &tol).unwrap();
            assert_relative_eq!(z, 10.0 * 2.5 / 6.25 / 7.5, max_relative = 1e-12);

            assert_eq!(Policy::evaluate_pdf(0.5, 1.2, limits, eval, &e[0], &e[1], &tol).unwrap(), 0.0);
            assert_eq!(Policy::evaluate_pdf(0.5, 9.0, limits, eval, &e[0], &e[1], &tol).unwrap(), 0.0);
        });
    }

    #[test]
    fn test_evaluate_within_fuzzy_margin_of_limits() {
        let e = fixtures::entries();
        let tol = Tolerances::default();
        with_limits(&e[0..2], |limits| {
            let at_min = Policy::evaluate_pdf(0.5, 1.25, limits, eval, &e[0], &e[1], &tol).unwrap();
            let z = Policy::evaluate_pdf(0.5, 1.25 * (1.0 - 5e-4), limits, eval, &e[0], &e[1], &tol).unwrap();
            assert_eq!(z, at_min);

            let at_max = Policy::evaluate_pdf(0.5, 8.75, limits, eval, &e[0], &e[1], &tol).unwrap();
            let z = Policy::evaluate_pdf(0.5, 8.75 * (1.0 + 5e-4), limits, eval, &e[0], &e[1], &tol).unwrap();
            assert_eq!(z, at_max);
        });
    }

    #[test]
    fn test_evaluate_on_grid_points() {
        let e = fixtures::entries();
        let tol = Tolerances::default();
        with_limits(&e[0..2], |limits| {
            let z = Policy::evaluate_pdf(1.0, 5.0, limits, eval, &e[0], &e[1], &tol).unwrap();
            assert_relative_eq!(z, 1.0, max_relative = 1e-12);
            let c = Policy::evaluate_cdf(0.0, 5.0, limits, cdf, &e[0], &e[1], &tol).unwrap();
            assert_relative_eq!(c, 0.5, max_relative = 1e-12);
            assert_eq!(Policy::evaluate_cdf(1.0, 8.0, limits, cdf, &e[0], &e[1], &tol).unwrap(), 1.0);
            assert_eq!(Policy::evaluate_cdf(1.0, 2.0, limits, cdf, &e[0], &e[1], &tol).unwrap(), 0.0);
        });
    }

    #[test]
    fn test_uniform_boundaries_give_uniform_intermediate() {
        let e: Vec<GridEntry<SecondaryDistribution>> = vec![
            GridEntry::new(0.0, UniformDistribution::new(0.0, 10.0, 1.0).unwrap().into()),
            GridEntry::new(1.0, UniformDistribution::new(2.0, 4.0, 1.0).unwrap().into()),
        ];
        let tol = Tolerances::default();
        let pdf = |d: &SecondaryDistribution, y: f64| d.evaluate_pdf(y);
        with_limits(&e, |limits| {
            // Intermediate range at x = 0.5 is [1, 7]
            let z = Policy::evaluate_pdf(0.5, 3.0, limits, pdf, &e[0], &e[1], &tol).unwrap();
            assert_relative_eq!(z, 1.0 / 6.0, max_relative = 1e-6);

            let c = Policy::evaluate_cdf(0.5, 2.5, limits, cdf, &e[0], &e[1], &tol).unwrap();
            assert_relative_eq!(c, 0.25, max_relative = 1e-6);
        });
    }

    #[test]
    fn test_sample_interpolates_eta() {
        let e: Vec<GridEntry<SecondaryDistribution>> = vec![
            GridEntry::new(0.0, UniformDistribution::new(0.0, 10.0, 1.0).unwrap().into()),
            GridEntry::new(1.0, UniformDistribution::new(2.0, 4.0, 1.0).unwrap().into()),
        ];
        with_limits(&e, |limits| {
            let mut rng = FakeRng::new(vec![0.0]);
            let sample = |d: &SecondaryDistribution, _: &mut FakeRng| d.sample_with_random_number(0.25);

            let s = Policy::sample_detailed(sample, limits, 0.5, &e[0], &e[1], &mut rng);
            assert_relative_eq!(s.sample, 2.5, max_relative = 1e-12);
            assert_eq!(s.bin, BinSide::Lower);

            let s = Policy::sample_detailed(sample, limits, 1.0, &e[0], &e[1], &mut rng);
            assert_relative_eq!(s.sample, 2.5, max_relative = 1e-12);
            assert_eq!(s.bin, BinSide::Upper);

            let s = Policy::sample(sample, limits, 0.0, &e[0], &e[1], &mut rng);
            assert_relative_eq!(s, 2.5, max_relative = 1e-12);
        });
    }

    #[test]
    fn test_sample_in_subrange() {
        let e: Vec<GridEntry<SecondaryDistribution>> = vec![
            GridEntry::new(0.0, UniformDistribution::new(0.0, 10.0, 1.0).unwrap().into()),
            GridEntry::new(1.0, UniformDistribution::new(2.0, 4.0, 1.0).unwrap().into()),
        ];
        with_limits(&e, |limits| {
            let mut rng = FakeRng::new(vec![0.0]);
            let sample = |d: &SecondaryDistribution, max: f64, _: &mut FakeRng| {
                d.sample_with_random_number_in_subrange(0.5, max)
            };

            // Caps: 3 on [0, 10] and 3 on [2, 4]; both etas are 0.5 of the capped range
            let s = Policy::sample_in_subrange(sample, limits, 0.5, &e[0], &e[1], 3.0, &mut rng);
            assert_relative_eq!(s, 2.0, max_relative = 1e-12);

            let s = Policy::sample_in_subrange(sample, limits, 1.0, &e[0], &e[1], 3.0, &mut rng);
            assert_relative_eq!(s, 2.5, max_relative = 1e-12);
        });
    }

    #[test]
    fn test_log_y_evaluation_is_positive() {
        let e: Vec<GridEntry<SecondaryDistribution>> = vec![
            GridEntry::new(0.0, UniformDistribution::new(1.0, 10.0, 1.0).unwrap().into()),
            GridEntry::new(1.0, UniformDistribution::new(10.0, 100.0, 1.0).unwrap().into()),
        ];
        let lo = |x: f64| UnitBaseCorrelated::<LinLogLin>::calculate_lower_bound(x, &e[0], &e[1]);
        let hi = |x: f64| UnitBaseCorrelated::<LinLogLin>::calculate_upper_bound(x, &e[0], &e[1]);
        let limits = SecondaryLimits::new(&lo, &hi);
        let tol = Tolerances::default();
        let pdf = |d: &SecondaryDistribution, y: f64| d.evaluate_pdf(y);

        let z = UnitBaseCorrelated::<LinLogLin>::evaluate_pdf(0.5, 20.0, &limits, pdf, &e[0], &e[1], &tol).unwrap();
        assert!(z > 0.0 && z.is_finite());
    }

    #[test]
    fn test_log_cos_y_evaluation_and_sampling() {
        type CosPolicy = UnitBaseCorrelated<LinLogCosLin>;
        let e: Vec<GridEntry<SecondaryDistribution>> = vec![
            GridEntry::new(
                1.0,
                TabularDistribution::<LinLin>::new(vec![-1.0, 0.0, 0.9], vec![0.2, 1.0, 0.5])
                    .unwrap()
                    .into(),
            ),
            GridEntry::new(2.0, UniformDistribution::new(-1.0, 0.9, 1.0).unwrap().into()),
        ];
        let lo = |x: f64| CosPolicy::calculate_lower_bound(x, &e[0], &e[1]);
        let hi = |x: f64| CosPolicy::calculate_upper_bound(x, &e[0], &e[1]);
        let limits = SecondaryLimits::new(&lo, &hi);
        let tol = Tolerances::default();
        let pdf = |d: &SecondaryDistribution, y: f64| d.evaluate_pdf(y);

        let mut last_cdf = 0.0;
        for y in [-0.5, 0.0, 0.5] {
            let z = CosPolicy::evaluate_pdf(1.5, y, &limits, pdf, &e[0], &e[1], &tol).unwrap();
            assert!(z > 0.0 && z.is_finite(), "pdf({}) = {}", y, z);

            let c = CosPolicy::evaluate_cdf(1.5, y, &limits, cdf, &e[0], &e[1], &tol).unwrap();
            assert!(c > last_cdf && c < 1.0, "cdf({}) = {}", y, c);
            last_cdf = c;
        }

        // Half way up both boundary ranges in eta
        let mut rng = FakeRng::new(vec![0.0]);
        let half = |d: &SecondaryDistribution, _: &mut FakeRng| {
            let length = LinLogCos::calculate_unit_base_grid_length(d.lower_bound(), d.upper_bound());
            LinLogCos::calculate_indep_var(0.5, d.lower_bound(), length)
        };
        let s = CosPolicy::sample(half, &limits, 1.5, &e[0], &e[1], &mut rng);
        let length = LinLogCos::calculate_unit_base_grid_length(lo(1.5), hi(1.5));
        assert_relative_eq!(s, LinLogCos::calculate_indep_var(0.5, lo(1.5), length), max_relative = 1e-12);
        assert!(s > -1.0 && s < 0.9);
    }
}
