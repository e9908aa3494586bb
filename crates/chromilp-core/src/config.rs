//! Solver configuration types.

use crate::solver::SolverError;

/// Configuration options for solver behavior.
///
/// Every option is optional; `None` leaves the backend default in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverConfig {
    /// Wall-clock budget in seconds. `None` runs until optimality or
    /// infeasibility is proven.
    pub time_limit: Option<f64>,
    /// Relative MIP gap tolerance.
    pub mip_gap: Option<f64>,
    /// Enable/disable presolve.
    pub presolve: Option<bool>,
    /// Number of threads to use.
    pub threads: Option<u32>,
    /// Random seed for the backend's search.
    pub random_seed: Option<u32>,
    /// Stream solver output to the console.
    pub log_to_console: Option<bool>,
}

impl SolverConfig {
    /// Create a new configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Set or clear the time limit.
    pub fn with_optional_time_limit(mut self, seconds: Option<f64>) -> Self {
        self.time_limit = seconds;
        self
    }

    /// Set the relative MIP gap tolerance.
    pub fn with_mip_gap(mut self, gap: f64) -> Self {
        self.mip_gap = Some(gap);
        self
    }

    /// Enable or disable presolve.
    pub fn with_presolve(mut self, enabled: bool) -> Self {
        self.presolve = Some(enabled);
        self
    }

    /// Set the number of threads.
    pub fn with_threads(mut self, count: u32) -> Self {
        self.threads = Some(count);
        self
    }

    /// Set the random seed.
    pub fn with_random_seed(mut self, seed: u32) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Enable or disable console logging.
    pub fn with_log_to_console(mut self, enabled: bool) -> Self {
        self.log_to_console = Some(enabled);
        self
    }

    /// Check if this configuration is completely empty (all defaults).
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reject option values no backend can honor.
    pub fn validate(&self) -> Result<(), SolverError> {
        if let Some(limit) = self.time_limit {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(SolverError::InvalidConfig(format!(
                    "time limit must be a positive number of seconds (got {limit})"
                )));
            }
        }
        if let Some(gap) = self.mip_gap {
            if !(0.0..=1.0).contains(&gap) {
                return Err(SolverError::InvalidConfig(format!(
                    "mip gap must lie in [0, 1] (got {gap})"
                )));
            }
        }
        if self.threads == Some(0) {
            return Err(SolverError::InvalidConfig(
                "thread count must be at least 1".to_string(),
            ));
        }
        // Integer options are passed to the backend as 32-bit signed values.
        for (name, value) in [("thread count", self.threads), ("random seed", self.random_seed)] {
            if let Some(value) = value {
                if i32::try_from(value).is_err() {
                    return Err(SolverError::InvalidConfig(format!(
                        "{name} must not exceed {} (got {value})",
                        i32::MAX
                    )));
                }
            }
        }
        Ok(())
    }
}
