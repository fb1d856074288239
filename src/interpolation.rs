// One-dimensional interpolation laws
//
// A law is a pair of variable processings: how the dependent variable and
// the independent variable are transformed before linear interpolation.
// `LinLog` interpolates a linear dependent variable against the log of the
// independent variable, `LogLin` the reverse, and so on.

use std::marker::PhantomData;

/// Offset added to the delta cosine by the nudged cosine processing.
pub const COSINE_NUDGE_FACTOR: f64 = 1e-10;

/// Transformation applied to one variable of an interpolation law.
pub trait Processing: 'static {
    /// Short name used to compose law names (e.g. "Lin", "LogCos")
    const NAME: &'static str;
    /// True when the processed value is a logarithm
    const IS_LOG: bool;
    /// False when `process` reverses the order of its inputs
    const INCREASING: bool = true;

    fn process(value: f64) -> f64;
    fn recover(processed: f64) -> f64;
    fn is_in_valid_range(value: f64) -> bool;

    /// The quantity whose logarithm `process` takes (identity for `Lin`).
    fn log_argument(value: f64) -> f64;

    /// Position of `value` between `lo` and `hi` in processed space
    fn fraction(lo: f64, hi: f64, value: f64) -> f64 {
        (Self::process(value) - Self::process(lo)) / (Self::process(hi) - Self::process(lo))
    }

    /// Interpolate between two values at a processed-space fraction
    fn blend(value_0: f64, value_1: f64, fraction: f64) -> f64 {
        let p0 = Self::process(value_0);
        Self::recover(p0 + (Self::process(value_1) - p0) * fraction)
    }
}

/// Identity processing
pub struct Lin;
/// Natural log processing
pub struct Log;
/// Log of the delta cosine, ln(1 - mu)
pub struct LogCos;
/// Log of the nudged delta cosine, ln(1 - mu + 1e-10)
pub struct NudgedLogCos;

impl Processing for Lin {
    const NAME: &'static str = "Lin";
    const IS_LOG: bool = false;

    #[inline]
    fn process(value: f64) -> f64 {
        value
    }

    #[inline]
    fn recover(processed: f64) -> f64 {
        processed
    }

    #[inline]
    fn is_in_valid_range(value: f64) -> bool {
        value.is_finite()
    }

    #[inline]
    fn log_argument(value: f64) -> f64 {
        value
    }

    #[inline]
    fn fraction(lo: f64, hi: f64, value: f64) -> f64 {
        (value - lo) / (hi - lo)
    }

    #[inline]
    fn blend(value_0: f64, value_1: f64, fraction: f64) -> f64 {
        value_0 + (value_1 - value_0) * fraction
    }
}

impl Processing for Log {
    const NAME: &'static str = "Log";
    const IS_LOG: bool = true;

    #[inline]
    fn process(value: f64) -> f64 {
        value.ln()
    }

    #[inline]
    fn recover(processed: f64) -> f64 {
        processed.exp()
    }

    #[inline]
    fn is_in_valid_range(value: f64) -> bool {
        value > 0.0 && value.is_finite()
    }

    #[inline]
    fn log_argument(value: f64) -> f64 {
        value
    }

    #[inline]
    fn fraction(lo: f64, hi: f64, value: f64) -> f64 {
        (value / lo).ln() / (hi / lo).ln()
    }

    #[inline]
    fn blend(value_0: f64, value_1: f64, fraction: f64) -> f64 {
        value_0 * (value_1 / value_0).powf(fraction)
    }
}

impl Processing for LogCos {
    const NAME: &'static str = "LogCos";
    const IS_LOG: bool = true;
    const INCREASING: bool = false;

    #[inline]
    fn process(value: f64) -> f64 {
        (1.0 - value).ln()
    }

    #[inline]
    fn recover(processed: f64) -> f64 {
        1.0 - processed.exp()
    }

    #[inline]
    fn is_in_valid_range(value: f64) -> bool {
        (-1.0..1.0).contains(&value)
    }

    #[inline]
    fn log_argument(value: f64) -> f64 {
        1.0 - value
    }
}

impl Processing for NudgedLogCos {
    const NAME: &'static str = "NudgedLogCos";
    const IS_LOG: bool = true;
    const INCREASING: bool = false;

    #[inline]
    fn process(value: f64) -> f64 {
        ((1.0 - value) + COSINE_NUDGE_FACTOR).ln()
    }

    #[inline]
    fn recover(processed: f64) -> f64 {
        (COSINE_NUDGE_FACTOR - processed.exp()) + 1.0
    }

    #[inline]
    fn is_in_valid_range(value: f64) -> bool {
        (-1.0..=1.0).contains(&value)
    }

    #[inline]
    fn log_argument(value: f64) -> f64 {
        (1.0 - value) + COSINE_NUDGE_FACTOR
    }
}

/// A one-dimensional interpolation law.
///
/// Every operation is an associated function: laws are selected by type and
/// carry no state.
pub trait InterpolationLaw: 'static {
    /// Processing of the dependent variable
    type Dep: Processing;
    /// Processing of the independent variable
    type Indep: Processing;

    fn name() -> String {
        format!("{}{}", <Self::Dep as Processing>::NAME, <Self::Indep as Processing>::NAME)
    }

    #[inline]
    fn process_indep_var(indep: f64) -> f64 {
        Self::Indep::process(indep)
    }

    #[inline]
    fn is_indep_var_in_valid_range(indep: f64) -> bool {
        Self::Indep::is_in_valid_range(indep)
    }

    /// Interpolate between (indep_0, dep_0) and (indep_1, dep_1) at `indep`
    #[inline]
    fn interpolate(indep_0: f64, indep_1: f64, indep: f64, dep_0: f64, dep_1: f64) -> f64 {
        debug_assert!(indep_0 < indep_1);
        debug_assert!(indep >= indep_0 && indep <= indep_1);
        Self::Dep::blend(dep_0, dep_1, Self::Indep::fraction(indep_0, indep_1, indep))
    }

    /// Interpolate using a precomputed independent variable ratio
    #[inline]
    fn interpolate_beta(beta: f64, dep_0: f64, dep_1: f64) -> f64 {
        Self::Dep::blend(dep_0, dep_1, beta)
    }

    /// Sign that makes processed differences grow with the independent variable
    #[inline]
    fn indep_orientation() -> f64 {
        if Self::Indep::INCREASING {
            1.0
        } else {
            -1.0
        }
    }

    /// Length of a grid in processed independent space. Never negative,
    /// including for the decreasing cosine processings.
    #[inline]
    fn calculate_unit_base_grid_length(lower: f64, upper: f64) -> f64 {
        debug_assert!(lower <= upper);
        Self::indep_orientation() * (Self::Indep::process(upper) - Self::Indep::process(lower))
    }

    /// Map `indep` onto [0, 1] relative to a grid starting at `grid_min`
    #[inline]
    fn calculate_unit_base_indep_var(indep: f64, grid_min: f64, grid_length: f64) -> f64 {
        Self::indep_orientation() * (Self::Indep::process(indep) - Self::Indep::process(grid_min)) / grid_length
    }

    /// As [`InterpolationLaw::calculate_unit_base_indep_var`], snapping values
    /// within `tol` outside [0, 1] onto the nearest end
    fn calculate_unit_base_indep_var_with_tol(
        indep: f64,
        grid_min: f64,
        grid_length: f64,
        tol: f64,
    ) -> f64 {
        let eta = Self::calculate_unit_base_indep_var(indep, grid_min, grid_length);

        if eta > 1.0 && eta <= 1.0 + tol {
            1.0
        } else if eta < 0.0 && eta >= -tol {
            0.0
        } else {
            eta
        }
    }

    /// Inverse of the unit-base mapping
    #[inline]
    fn calculate_indep_var(eta: f64, grid_min: f64, grid_length: f64) -> f64 {
        Self::Indep::recover(Self::Indep::process(grid_min) + Self::indep_orientation() * grid_length * eta)
    }

    /// As [`InterpolationLaw::calculate_indep_var`], snapping values that
    /// round just below the grid minimum back onto it
    fn calculate_indep_var_with_tol(eta: f64, grid_min: f64, grid_length: f64, tol: f64) -> f64 {
        let indep = Self::calculate_indep_var(eta, grid_min, grid_length);

        if indep < grid_min && indep >= calculate_fuzzy_lower_bound(grid_min, tol) {
            grid_min
        } else {
            indep
        }
    }
}

/// Widen a lower bound by a relative tolerance
#[inline]
pub fn calculate_fuzzy_lower_bound(value: f64, tol: f64) -> f64 {
    if value < 0.0 {
        value * (1.0 + tol)
    } else {
        value * (1.0 - tol)
    }
}

/// Widen an upper bound by a relative tolerance
#[inline]
pub fn calculate_fuzzy_upper_bound(value: f64, tol: f64) -> f64 {
    if value > 0.0 {
        value * (1.0 + tol)
    } else {
        value * (1.0 - tol)
    }
}

/// Law marker: dependent processing `D`, independent processing `I`.
pub struct Interp<D, I>(PhantomData<(D, I)>);

impl<D: Processing, I: Processing> InterpolationLaw for Interp<D, I> {
    type Dep = D;
    type Indep = I;
}

pub type LinLin = Interp<Lin, Lin>;
pub type LinLog = Interp<Lin, Log>;
pub type LogLin = Interp<Log, Lin>;
pub type LogLog = Interp<Log, Log>;
pub type LinLogCos = Interp<Lin, LogCos>;
pub type LinNudgedLogCos = Interp<Lin, NudgedLogCos>;
pub type LogLogCos = Interp<Log, LogCos>;
pub type LogNudgedLogCos = Interp<Log, NudgedLogCos>;
pub type LogCosLin = Interp<LogCos, Lin>;
pub type NudgedLogCosLin = Interp<NudgedLogCos, Lin>;
pub type LogCosLog = Interp<LogCos, Log>;
pub type NudgedLogCosLog = Interp<NudgedLogCos, Log>;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_names() {
        assert_eq!(LinLin::name(), "LinLin");
        assert_eq!(LogLin::name(), "LogLin");
        assert_eq!(LinLogCos::name(), "LinLogCos");
        assert_eq!(NudgedLogCosLog::name(), "NudgedLogCosLog");
    }

    #[test]
    fn test_lin_lin_interpolate() {
        assert_eq!(LinLin::interpolate(0.0, 1.0, 0.5, 0.0, 2.5), 1.25);
        assert_eq!(LinLin::interpolate(0.0, 1.0, 0.0, 3.0, 4.0), 3.0);
        assert_eq!(LinLin::interpolate_beta(0.25, 0.0, 4.0), 1.0);
    }

    #[test]
    fn test_log_log_interpolate() {
        // y = x^2
        let y = LogLog::interpolate(1.0, 10.0, 3.0, 1.0, 100.0);
        assert_relative_eq!(y, 9.0, max_relative = 1e-12);
    }

    #[test]
    fn test_lin_log_interpolate() {
        let y = LinLog::interpolate(1.0, 100.0, 10.0, 0.0, 2.0);
        assert_relative_eq!(y, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_log_lin_interpolate() {
        let y = LogLin::interpolate(0.0, 2.0, 1.0, 1.0, 4.0);
        assert_relative_eq!(y, 2.0, max_relative = 1e-12);
        assert_relative_eq!(LogLin::interpolate_beta(0.5, 1.0, 4.0), 2.0, max_relative = 1e-12);
    }

    #[test]
    fn test_unit_base_lin() {
        let length = LinLin::calculate_unit_base_grid_length(2.5, 7.5);
        assert_eq!(length, 5.0);
        assert_eq!(LinLin::calculate_unit_base_indep_var(5.0, 2.5, length), 0.5);
        assert_eq!(LinLin::calculate_indep_var(0.5, 2.5, length), 5.0);
    }

    #[test]
    fn test_unit_base_log_round_trip() {
        let length = LinLog::calculate_unit_base_grid_length(1e-3, 20.0);
        let eta = LinLog::calculate_unit_base_indep_var(0.5, 1e-3, length);
        assert!(eta > 0.0 && eta < 1.0);
        assert_relative_eq!(LinLog::calculate_indep_var(eta, 1e-3, length), 0.5, max_relative = 1e-12);
    }

    #[test]
    fn test_unit_base_with_tol_snaps_to_ends() {
        let length = 10.0;
        assert_eq!(LinLin::calculate_unit_base_indep_var_with_tol(10.005, 0.0, length, 1e-3), 1.0);
        assert_eq!(LinLin::calculate_unit_base_indep_var_with_tol(-0.005, 0.0, length, 1e-3), 0.0);
        assert!(LinLin::calculate_unit_base_indep_var_with_tol(10.5, 0.0, length, 1e-3) > 1.0);
    }

    #[test]
    fn test_indep_var_with_tol_snaps_to_min() {
        let indep = LinLin::calculate_indep_var_with_tol(-1e-6, 1.0, 2.0, 1e-3);
        assert_eq!(indep, 1.0);
    }

    #[test]
    fn test_fuzzy_bounds() {
        assert_relative_eq!(calculate_fuzzy_lower_bound(10.0, 0.1), 9.0);
        assert_relative_eq!(calculate_fuzzy_lower_bound(-10.0, 0.1), -11.0);
        assert_relative_eq!(calculate_fuzzy_upper_bound(10.0, 0.1), 11.0);
        assert_relative_eq!(calculate_fuzzy_upper_bound(-10.0, 0.1), -9.0);
        assert_eq!(calculate_fuzzy_lower_bound(0.0, 0.1), 0.0);
    }

    #[test]
    fn test_log_cos_processing_round_trip() {
        let processed = LogCos::process(0.25);
        assert_relative_eq!(processed, 0.75f64.ln());
        assert_relative_eq!(LogCos::recover(processed), 0.25, max_relative = 1e-14);
        assert!(!LogCos::is_in_valid_range(1.0));
        assert!(NudgedLogCos::is_in_valid_range(1.0));
        assert!(NudgedLogCos::process(1.0).is_finite());
    }

    #[test]
    fn test_log_cos_unit_base_is_positive() {
        let length = LinLogCos::calculate_unit_base_grid_length(-1.0, 0.9);
        assert_relative_eq!(length, 20.0f64.ln(), max_relative = 1e-14);
        assert_eq!(LinLogCos::calculate_unit_base_indep_var(-1.0, -1.0, length), 0.0);
        let eta = LinLogCos::calculate_unit_base_indep_var(0.0, -1.0, length);
        assert!(eta > 0.0 && eta < 1.0);
        assert_relative_eq!(LinLogCos::calculate_indep_var(eta, -1.0, length), 0.0, epsilon = 1e-14);
        assert_relative_eq!(LinLogCos::calculate_unit_base_indep_var(0.9, -1.0, length), 1.0);
        assert_relative_eq!(LinLogCos::calculate_indep_var(1.0, -1.0, length), 0.9, max_relative = 1e-14);
    }

    #[test]
    fn test_nudged_log_cos_unit_base_is_positive() {
        let length = LinNudgedLogCos::calculate_unit_base_grid_length(-1.0, 1.0);
        assert!(length > 0.0);
        let eta = LinNudgedLogCos::calculate_unit_base_indep_var_with_tol(0.5, -1.0, length, 1e-7);
        assert!(eta > 0.0 && eta < 1.0);
        assert_relative_eq!(LinNudgedLogCos::calculate_indep_var(eta, -1.0, length), 0.5, max_relative = 1e-12);
        assert_relative_eq!(LinNudgedLogCos::calculate_unit_base_indep_var(1.0, -1.0, length), 1.0);
    }
}
