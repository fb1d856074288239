// Integration tests for evaluating each grid policy through InterpolatedBivariateDistribution

use approx::assert_relative_eq;
use bivariate_grid::{
    BivariateGrid, Config, Correlated, CumulativePoints, Direct, GridError, InterpolatedBivariateDistribution, LinLin,
    LinLinLin, LinLogCosLin, LinLogLin, SecondaryDistribution, TabularDistribution, Tolerances, TwoDGridPolicy,
    UniformDistribution, UnitBase, UnitBaseCorrelated,
};

/// Uniform on [0, 10] at x = 0 and uniform on [2, 4] at x = 1
fn uniform_grid() -> BivariateGrid<SecondaryDistribution> {
    BivariateGrid::from_distributions(vec![
        (0.0, UniformDistribution::new(0.0, 10.0, 1.0).unwrap().into()),
        (1.0, UniformDistribution::new(2.0, 4.0, 1.0).unwrap().into()),
    ])
    .unwrap()
}

fn tent_grid() -> BivariateGrid<SecondaryDistribution> {
    BivariateGrid::from_distributions(vec![
        (0.0, UniformDistribution::new(0.0, 10.0, 1.0).unwrap().into()),
        (
            1.0,
            TabularDistribution::<LinLin>::new(vec![2.5, 5.0, 7.5], vec![0.1, 1.0, 0.5])
                .unwrap()
                .into(),
        ),
        (2.0, UniformDistribution::new(0.0, 10.0, 0.1).unwrap().into()),
    ])
    .unwrap()
}

/// Two cosine distributions on [-1, 0.9] with different shapes
fn cosine_grid() -> BivariateGrid<SecondaryDistribution> {
    BivariateGrid::from_distributions(vec![
        (
            1.0,
            TabularDistribution::<LinLin>::new(vec![-1.0, 0.0, 0.9], vec![0.2, 1.0, 0.5])
                .unwrap()
                .into(),
        ),
        (2.0, UniformDistribution::new(-1.0, 0.9, 1.0).unwrap().into()),
    ])
    .unwrap()
}

/// Sweep y across the secondary range at x and check the CDF stays in
/// [0, 1] without decreasing
fn assert_cdf_is_monotone<P: TwoDGridPolicy>(grid: BivariateGrid<SecondaryDistribution>, x: f64) {
    let dist = InterpolatedBivariateDistribution::<P, _>::with_config(grid, &Config::new());
    let (lo, hi) = (dist.lower_bound_of_secondary(x), dist.upper_bound_of_secondary(x));

    let n = 200;
    let mut last = 0.0;
    for i in 0..=n {
        let y = lo + (hi - lo) * i as f64 / n as f64;
        let cdf = dist.evaluate_secondary_conditional_cdf(x, y).unwrap();
        assert!((0.0..=1.0).contains(&cdf), "{} cdf({}, {}) = {}", P::NAME, x, y, cdf);
        assert!(cdf >= last - 1e-9, "{} cdf decreases at ({}, {}): {} < {}", P::NAME, x, y, cdf, last);
        last = cdf;
    }
    assert!(last > 1.0 - 1e-9, "{} cdf ends at {}", P::NAME, last);
}

#[test]
fn test_cdf_is_monotone_for_every_policy() {
    for x in [0.25, 0.5, 1.5] {
        assert_cdf_is_monotone::<Direct<LinLinLin>>(tent_grid(), x);
        assert_cdf_is_monotone::<UnitBase<LinLinLin>>(tent_grid(), x);
        assert_cdf_is_monotone::<CumulativePoints<LinLinLin>>(tent_grid(), x);
        assert_cdf_is_monotone::<Correlated<LinLinLin>>(tent_grid(), x);
        assert_cdf_is_monotone::<UnitBaseCorrelated<LinLinLin>>(tent_grid(), x);
    }

    for x in [1.25, 1.5, 1.75] {
        assert_cdf_is_monotone::<Direct<LinLogCosLin>>(cosine_grid(), x);
        assert_cdf_is_monotone::<UnitBase<LinLogCosLin>>(cosine_grid(), x);
        assert_cdf_is_monotone::<Correlated<LinLogCosLin>>(cosine_grid(), x);
        assert_cdf_is_monotone::<UnitBaseCorrelated<LinLogCosLin>>(cosine_grid(), x);
    }
}

#[test]
fn test_unit_base_policies_with_cosine_secondary() {
    let unit_base =
        InterpolatedBivariateDistribution::<UnitBase<LinLogCosLin>, _>::with_config(cosine_grid(), &Config::new());
    let unit_base_correlated =
        InterpolatedBivariateDistribution::<UnitBaseCorrelated<LinLogCosLin>, _>::with_config(cosine_grid(), &Config::new());
    let correlated =
        InterpolatedBivariateDistribution::<Correlated<LinLogCosLin>, _>::with_config(cosine_grid(), &Config::new());

    for y in [-0.5, 0.0, 0.5] {
        let reference = correlated.evaluate_secondary_conditional_pdf(1.5, y).unwrap();
        assert!(reference > 0.0);

        let pdf = unit_base.evaluate_secondary_conditional_pdf(1.5, y).unwrap();
        assert!(pdf > 0.0 && pdf.is_finite(), "unit-base pdf({}) = {}", y, pdf);
        let pdf = unit_base_correlated.evaluate_secondary_conditional_pdf(1.5, y).unwrap();
        assert!(pdf > 0.0 && pdf.is_finite(), "unit-base correlated pdf({}) = {}", y, pdf);

        let cdf = unit_base_correlated.evaluate_secondary_conditional_cdf(1.5, y).unwrap();
        assert!(cdf > 0.0 && cdf < 1.0, "unit-base correlated cdf({}) = {}", y, cdf);
    }

    // Identical ranges leave the unit-base pdf a blend of the boundary pdfs
    let expected = 0.5 * (0.75 / 1.275 + 1.0 / 1.9);
    assert_relative_eq!(unit_base.evaluate_secondary_conditional_pdf(1.5, 0.45).unwrap(), expected, max_relative = 1e-9);
}

#[test]
fn test_unit_base_intermediate_grid() {
    let dist = InterpolatedBivariateDistribution::<UnitBase<LinLinLin>, _>::with_config(uniform_grid(), &Config::new());

    assert_eq!(dist.lower_bound_of_secondary(0.5), 1.0);
    assert_eq!(dist.upper_bound_of_secondary(0.5), 7.0);

    // Both boundaries are flat in eta, so the intermediate pdf is flat over [1, 7]
    for y in [1.5, 3.0, 6.5] {
        let pdf = dist.evaluate_secondary_conditional_pdf(0.5, y).unwrap();
        assert_relative_eq!(pdf, 1.0 / 6.0, max_relative = 1e-12);
    }
    assert_relative_eq!(dist.evaluate_secondary_conditional_cdf(0.5, 2.5).unwrap(), 0.25, max_relative = 1e-12);
    assert_eq!(dist.evaluate_secondary_conditional_cdf(0.5, 0.5).unwrap(), 0.0);
    assert_eq!(dist.evaluate_secondary_conditional_cdf(0.5, 7.5).unwrap(), 1.0);
}

#[test]
fn test_unit_base_matches_boundaries_on_grid_points() {
    let dist = InterpolatedBivariateDistribution::<UnitBase<LinLinLin>, _>::with_config(uniform_grid(), &Config::new());

    assert_relative_eq!(dist.evaluate_secondary_conditional_pdf(0.0, 5.0).unwrap(), 0.1, max_relative = 1e-12);
    assert_relative_eq!(dist.evaluate_secondary_conditional_pdf(1.0, 3.0).unwrap(), 0.5, max_relative = 1e-12);
    assert_eq!(dist.evaluate_secondary_conditional_pdf(1.0, 5.0).unwrap(), 0.0);
}

#[test]
fn test_direct_interpolates_values_at_fixed_y() {
    let dist = InterpolatedBivariateDistribution::<Direct<LinLinLin>, _>::with_config(uniform_grid(), &Config::new());

    assert_eq!(dist.lower_bound_of_secondary(0.5), 0.0);
    assert_eq!(dist.upper_bound_of_secondary(0.5), 10.0);
    assert_relative_eq!(dist.evaluate_secondary_conditional_pdf(0.5, 3.0).unwrap(), 0.3, max_relative = 1e-12);
    assert_relative_eq!(dist.evaluate_secondary_conditional_cdf(0.5, 3.0).unwrap(), 0.4, max_relative = 1e-12);
    assert_relative_eq!(dist.evaluate_secondary_conditional_pdf(0.5, 8.0).unwrap(), 0.05, max_relative = 1e-12);
}

#[test]
fn test_correlated_evaluation() {
    let dist = InterpolatedBivariateDistribution::<Correlated<LinLinLin>, _>::with_config(uniform_grid(), &Config::new());

    assert_relative_eq!(dist.evaluate_secondary_conditional_pdf(0.5, 3.0).unwrap(), 1.0 / 6.0, max_relative = 1e-6);
    assert_relative_eq!(dist.evaluate_secondary_conditional_cdf(0.5, 2.5).unwrap(), 0.25, max_relative = 1e-6);

    let dist = InterpolatedBivariateDistribution::<Correlated<LinLinLin>, _>::with_config(tent_grid(), &Config::new());
    assert_relative_eq!(dist.evaluate(0.5, 1.25).unwrap(), 2.0 / 11.0, max_relative = 1e-12);
    assert_relative_eq!(dist.evaluate(0.5, 5.0).unwrap(), 9.8048179459037177e-01, max_relative = 1e-6);
    assert_relative_eq!(dist.evaluate(1.5, 5.0).unwrap(), 1.8116248070721774e-01, max_relative = 1e-6);
    assert_relative_eq!(
        dist.evaluate_secondary_conditional_cdf(0.5, 4.615384615384615).unwrap(),
        0.4230769230769231,
        max_relative = 1e-6
    );

    let dist = dist.with_tolerances(Tolerances::new(1e-3, 1e-15, 1e-15, 500));
    assert_relative_eq!(
        dist.evaluate_secondary_conditional_cdf(0.5, 4.615384615384615).unwrap(),
        0.4230769230769231,
        max_relative = 1e-12
    );
}

#[test]
fn test_unit_base_correlated_evaluation() {
    let dist =
        InterpolatedBivariateDistribution::<UnitBaseCorrelated<LinLinLin>, _>::with_config(uniform_grid(), &Config::new());

    assert_eq!(dist.policy_name(), "Unit-base Correlated");
    assert_relative_eq!(dist.evaluate_secondary_conditional_pdf(0.5, 3.0).unwrap(), 1.0 / 6.0, max_relative = 1e-6);
    assert_relative_eq!(dist.evaluate_secondary_conditional_cdf(0.5, 2.5).unwrap(), 0.25, max_relative = 1e-6);
    assert_eq!(dist.evaluate_secondary_conditional_pdf(0.5, 0.5).unwrap(), 0.0);
}

#[test]
fn test_cumulative_points_with_log_secondary() {
    let grid = BivariateGrid::from_distributions(vec![
        (0.0, SecondaryDistribution::from(UniformDistribution::new(1.0, 4.0, 1.0).unwrap())),
        (1.0, SecondaryDistribution::from(UniformDistribution::new(4.0, 16.0, 1.0).unwrap())),
    ])
    .unwrap();
    let dist = InterpolatedBivariateDistribution::<CumulativePoints<LinLogLin>, _>::with_config(grid, &Config::new());

    assert_eq!(dist.policy_name(), "Cumulative Points");
    assert_eq!(dist.interpolation_law_name(), "LinLogLin");
    assert_relative_eq!(dist.lower_bound_of_secondary(0.5), 2.0, max_relative = 1e-12);
    assert_relative_eq!(dist.upper_bound_of_secondary(0.5), 8.0, max_relative = 1e-12);
    assert_relative_eq!(dist.evaluate_secondary_conditional_pdf(0.5, 5.0).unwrap(), 1.0 / 6.0, max_relative = 1e-12);
    assert_relative_eq!(dist.evaluate_secondary_conditional_cdf(0.5, 5.0).unwrap(), 0.5, max_relative = 1e-12);
}

#[test]
fn test_strict_tolerances_report_convergence_failure() {
    let tolerances = Tolerances::new(1e-3, 0.0, 0.0, 0);
    let dist = InterpolatedBivariateDistribution::<Correlated<LinLinLin>, _>::with_config(tent_grid(), &Config::new())
        .with_tolerances(tolerances);

    match dist.evaluate(0.5, 5.0) {
        Err(GridError::ConvergenceFailure { max_iterations, .. }) => assert_eq!(max_iterations, 0),
        other => panic!("expected a convergence failure, got {:?}", other),
    }

    // Values at the grid points never need the solver
    assert_relative_eq!(dist.evaluate(1.0, 5.0).unwrap(), 1.0, max_relative = 1e-12);
}

#[test]
fn test_outside_primary_grid() {
    let dist = InterpolatedBivariateDistribution::<UnitBase<LinLinLin>, _>::with_config(uniform_grid(), &Config::new());
    assert_eq!(dist.evaluate_secondary_conditional_pdf(-0.5, 5.0).unwrap(), 0.0);
    assert_eq!(dist.evaluate_secondary_conditional_pdf(1.5, 3.0).unwrap(), 0.0);

    let dist = dist.extend_beyond_primary_limits(true);
    assert!(dist.is_extended_beyond_primary_limits());
    assert_relative_eq!(dist.evaluate_secondary_conditional_pdf(-0.5, 5.0).unwrap(), 0.1, max_relative = 1e-12);
    assert_relative_eq!(dist.evaluate_secondary_conditional_pdf(1.5, 3.0).unwrap(), 0.5, max_relative = 1e-12);
    assert_relative_eq!(dist.evaluate_secondary_conditional_cdf(1.5, 3.0).unwrap(), 0.5, max_relative = 1e-12);
}

#[test]
fn test_mixed_grid_from_json() {
    let json = r#"[
        [0.0, {"type": "Uniform", "min": 0.0, "max": 10.0, "value": 1.0}],
        [1.0, {"type": "LinLin", "independent_values": [2.5, 5.0, 7.5], "dependent_values": [0.1, 1.0, 0.5]}]
    ]"#;
    let points: Vec<(f64, SecondaryDistribution)> = serde_json::from_str(json).unwrap();
    assert!(matches!(points[1].1, SecondaryDistribution::LinLin(_)));

    let grid = BivariateGrid::from_distributions(points).unwrap();
    let dist = InterpolatedBivariateDistribution::<UnitBase<LinLinLin>, _>::with_config(grid, &Config::new());

    assert_eq!(dist.lower_bound_of_secondary(0.5), 1.25);
    assert_eq!(dist.upper_bound_of_secondary(0.5), 8.75);
    assert_relative_eq!(dist.evaluate(0.5, 1.25).unwrap(), 0.7, max_relative = 1e-12);
}
