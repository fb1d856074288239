// Global configuration for grid evaluation and sampling
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;

use crate::error::Result;

// Process-wide default configuration
pub static CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| Mutex::new(Config::new()));

/// Numerical tolerances used by the grid policies.
///
/// `fuzzy_boundary_tol` widens the secondary bounds so values marginally
/// outside them are treated as boundary values. The remaining fields control
/// the bisection used to invert interpolated CDFs: iteration stops once the
/// relative error drops below `rel_error_tol`, and after `max_iterations` the
/// estimate is accepted only if the absolute error is below `error_tol`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    pub fuzzy_boundary_tol: f64,
    pub rel_error_tol: f64,
    pub error_tol: f64,
    pub max_iterations: u32,
}

impl Tolerances {
    pub const DEFAULT_FUZZY_BOUNDARY_TOL: f64 = 1e-3;
    pub const DEFAULT_REL_ERROR_TOL: f64 = 1e-7;
    pub const DEFAULT_ERROR_TOL: f64 = 1e-15;
    pub const DEFAULT_MAX_ITERATIONS: u32 = 500;

    pub fn new(fuzzy_boundary_tol: f64, rel_error_tol: f64, error_tol: f64, max_iterations: u32) -> Self {
        debug_assert!(fuzzy_boundary_tol >= 0.0);
        debug_assert!(rel_error_tol >= 0.0);
        debug_assert!(error_tol >= 0.0);
        Tolerances {
            fuzzy_boundary_tol,
            rel_error_tol,
            error_tol,
            max_iterations,
        }
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Tolerances::new(
            Self::DEFAULT_FUZZY_BOUNDARY_TOL,
            Self::DEFAULT_REL_ERROR_TOL,
            Self::DEFAULT_ERROR_TOL,
            Self::DEFAULT_MAX_ITERATIONS,
        )
    }
}

/// Configuration container for bivariate distributions.
///
/// A single global instance is exposed via the `CONFIG` static (a
/// `Lazy<Mutex<Config>>`). Code should obtain a guard with [`Config::global`]
/// rather than locking the mutex directly. Grid policies never consult the
/// global; only [`crate::InterpolatedBivariateDistribution::new`] snapshots it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tolerances handed to every policy evaluation.
    pub tolerances: Tolerances,
    /// Evaluate with the nearest boundary distribution when the primary value
    /// falls outside the grid instead of returning zero.
    pub extend_beyond_primary_limits: bool,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Config {
            tolerances: Tolerances::default(),
            extend_beyond_primary_limits: false,
        }
    }

    /// Parse a configuration from a JSON string. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replace the tolerances
    pub fn set_tolerances(&mut self, tolerances: Tolerances) {
        self.tolerances = tolerances;
    }

    /// Restore the defaults
    pub fn clear(&mut self) {
        *self = Config::new();
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl Config {
    /// Get the global configuration instance
    pub fn global() -> std::sync::MutexGuard<'static, Self> {
        CONFIG
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
