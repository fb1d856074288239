// Import the modules and re-export the types for Rust usage
mod bivariate;
mod cdf_inversion;
mod config;
mod correlated;
mod cumulative_points;
mod delta;
mod direct;
mod distribution;
mod error;
mod fake_rng;
mod fast_rng;
mod grid;
mod grid_policy;
mod histogram;
mod interpolation;
mod tabular;
mod two_d_interpolation;
mod uniform;
mod unit_base;
mod unit_base_correlated;
mod utilities;

pub use bivariate::{InterpolatedBivariateDistribution, SampledOutcome};
pub use cdf_inversion::{
    calculate_correlated_secondary_values, calculate_unit_base_correlated_secondary_values,
    estimate_correlated_cdf, estimate_unit_base_correlated_cdf, BoundaryLengths, CdfBracket, CdfEstimate,
};
pub use config::{Config, Tolerances, CONFIG};
pub use correlated::Correlated;
pub use cumulative_points::CumulativePoints;
pub use delta::DeltaDistribution;
pub use direct::Direct;
pub use distribution::{SecondaryDistribution, TabularUnivariateDistribution, UnivariateDistribution};
pub use error::{GridError, Result};
pub use fake_rng::FakeRng;
pub use fast_rng::{FastRng, STREAM_STRIDE};
pub use grid::{BinBoundaries, BivariateGrid, GridEntry};
pub use grid_policy::{sample_bin_boundary, BinSide, DetailedSample, SecondaryLimits, TwoDGridPolicy};
pub use histogram::{HistogramData, HistogramDistribution};
pub use interpolation::{
    calculate_fuzzy_lower_bound, calculate_fuzzy_upper_bound, Interp, InterpolationLaw, Lin, LinLin, LinLog,
    LinLogCos, LinNudgedLogCos, Log, LogCos, LogCosLin, LogCosLog, LogLin, LogLog, LogLogCos, LogNudgedLogCos,
    NudgedLogCos, NudgedLogCosLin, NudgedLogCosLog, Processing, COSINE_NUDGE_FACTOR,
};
pub use tabular::{TabularData, TabularDistribution, TabularLaw};
pub use two_d_interpolation::{
    LinLinLin, LinLinLog, LinLogCosLin, LinLogCosLog, LinLogLin, LinLogLog, LinNudgedLogCosLin,
    LinNudgedLogCosLog, LogLinLin, LogLinLog, LogLogCosLin, LogLogCosLog, LogLogLin, LogLogLog,
    LogNudgedLogCosLin, LogNudgedLogCosLog, TwoDInterp, TwoDInterpolationLaw,
};
pub use uniform::UniformDistribution;
pub use unit_base::UnitBase;
pub use unit_base_correlated::UnitBaseCorrelated;
pub use utilities::{bisect_monotone, find_lower_bin_index, is_strictly_ascending};
