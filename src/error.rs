// Error type shared by grid construction, configuration and CDF inversion

/// Errors produced while building grids or evaluating them.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Returned when the CDF inversion loop exhausts its iteration budget and
    /// the residual is still above the absolute error tolerance.
    #[error(
        "max number of iterations ({max_iterations}) hit before convergence ({tolerance}): \
         relative error = {rel_error}, error = {error}, \
         (cdf_0, cdf_1) = ({lower_cdf}, {upper_cdf}), (y_0, y_1) = ({lower_y}, {upper_y})"
    )]
    ConvergenceFailure {
        /// The iteration limit that was reached.
        max_iterations: u32,
        /// The relative error of the last estimate.
        rel_error: f64,
        /// The relative error tolerance that was requested.
        tolerance: f64,
        /// The absolute error of the last estimate.
        error: f64,
        /// Lower end of the final CDF bracket.
        lower_cdf: f64,
        /// Upper end of the final CDF bracket.
        upper_cdf: f64,
        /// Secondary value on the lower bin boundary for the last estimate.
        lower_y: f64,
        /// Secondary value on the upper bin boundary for the last estimate.
        upper_y: f64,
    },

    /// Returned when a grid has fewer than the two entries needed to interpolate.
    #[error("a bivariate grid needs at least 2 entries, got {len}")]
    TooFewGridPoints {
        /// Number of entries supplied.
        len: usize,
    },

    /// Returned when the primary grid is not strictly increasing.
    #[error("primary grid must be strictly increasing: x[{index}] = {current} follows {previous}")]
    UnsortedGrid {
        /// Index of the offending entry.
        index: usize,
        /// The previous primary value.
        previous: f64,
        /// The offending primary value.
        current: f64,
    },

    /// Returned when a primary grid value is NaN or infinite.
    #[error("invalid primary grid value: {value}")]
    InvalidPrimaryValue {
        /// The offending value.
        value: f64,
    },

    /// Returned when univariate distribution data is malformed.
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, GridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convergence_failure_message_reports_state() {
        let err = GridError::ConvergenceFailure {
            max_iterations: 500,
            rel_error: 1e-3,
            tolerance: 1e-7,
            error: 1e-2,
            lower_cdf: 0.25,
            upper_cdf: 0.5,
            lower_y: 1.0,
            upper_y: 2.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("max number of iterations (500)"));
        assert!(msg.contains("(cdf_0, cdf_1) = (0.25, 0.5)"));
        assert!(msg.contains("(y_0, y_1) = (1, 2)"));
    }

    #[test]
    fn test_too_few_grid_points_message() {
        let err = GridError::TooFewGridPoints { len: 1 };
        assert_eq!(err.to_string(), "a bivariate grid needs at least 2 entries, got 1");
    }

    #[test]
    fn test_config_error_from_serde() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: GridError = parse.unwrap_err().into();
        assert!(matches!(err, GridError::Config(_)));
    }
}
