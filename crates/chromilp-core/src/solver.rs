//! Solver trait and common types for solver backends.
//!
//! This module defines the abstract interface that solver backends (HiGHS,
//! test fixtures, ...) implement, along with solver-agnostic solution and
//! error types.

use crate::config::SolverConfig;
use crate::model::Model;
use std::collections::BTreeMap;

/// Termination status reported by a solver backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverStatus {
    /// Optimal solution found.
    Optimal,
    /// Problem is infeasible.
    Infeasible,
    /// Problem is unbounded.
    Unbounded,
    /// Solver reached time limit (may have feasible solution).
    TimeLimit,
    /// Solver reached iteration or node limit (may have feasible solution).
    IterationLimit,
    /// Status is unknown or solver did not complete.
    Unknown,
}

impl SolverStatus {
    /// Check if the status indicates an optimal solution.
    pub fn is_optimal(self) -> bool {
        matches!(self, SolverStatus::Optimal)
    }

    /// Check if the status stops on a budget rather than a proof.
    pub fn is_limit(self) -> bool {
        matches!(self, SolverStatus::TimeLimit | SolverStatus::IterationLimit)
    }

    /// Check if the status indicates infeasibility.
    pub fn is_infeasible(self) -> bool {
        matches!(self, SolverStatus::Infeasible)
    }

    /// Get a human-readable string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            SolverStatus::Optimal => "optimal",
            SolverStatus::Infeasible => "infeasible",
            SolverStatus::Unbounded => "unbounded",
            SolverStatus::TimeLimit => "time_limit",
            SolverStatus::IterationLimit => "iteration_limit",
            SolverStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error type for solver operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Model has no variables.
    EmptyModel,
    /// No objective function set.
    NoObjective,
    /// Invalid variable ID.
    InvalidVariableId(u32),
    /// Configuration rejected before solving.
    InvalidConfig(String),
    /// Solver is not available (e.g., library not installed).
    SolverNotAvailable(String),
    /// Solver-specific error not covered by other variants.
    SolverSpecific(String),
}

impl SolverError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::EmptyModel => "SOLVER_EMPTY_MODEL",
            SolverError::NoObjective => "SOLVER_NO_OBJECTIVE",
            SolverError::InvalidVariableId(_) => "SOLVER_INVALID_VARIABLE_ID",
            SolverError::InvalidConfig(_) => "SOLVER_INVALID_CONFIG",
            SolverError::SolverNotAvailable(_) => "SOLVER_NOT_AVAILABLE",
            SolverError::SolverSpecific(_) => "SOLVER_SPECIFIC",
        }
    }
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::EmptyModel => write!(f, "[{}] Model has no variables", self.code()),
            SolverError::NoObjective => write!(f, "[{}] Model has no objective", self.code()),
            SolverError::InvalidVariableId(id) => {
                write!(f, "[{}] Variable ID {} does not exist", self.code(), id)
            }
            SolverError::InvalidConfig(msg) => {
                write!(f, "[{}] Invalid solver configuration: {}", self.code(), msg)
            }
            SolverError::SolverNotAvailable(msg) => {
                write!(f, "[{}] Solver not available: {}", self.code(), msg)
            }
            SolverError::SolverSpecific(msg) => {
                write!(f, "[{}] Solver error: {}", self.code(), msg)
            }
        }
    }
}

impl std::error::Error for SolverError {}

/// Solver-agnostic result of one solve call.
///
/// `primal_values` is indexed by `VariableId::index()` and only meaningful
/// when `has_incumbent` is true.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Termination status.
    pub status: SolverStatus,
    /// Whether a feasible incumbent exists.
    pub has_incumbent: bool,
    /// Primal values of variables indexed by their internal position.
    pub primal_values: Vec<f64>,
    /// Objective value of the incumbent, if any.
    pub objective_value: Option<f64>,
    /// Best proven bound on the objective, if the backend reports one.
    pub best_bound: Option<f64>,
    /// Solve time in seconds as reported by the backend.
    pub solve_time_seconds: f64,
    /// Backend-specific metadata (e.g., node counts, relative gaps).
    pub metadata: BTreeMap<String, f64>,
}

impl Solution {
    /// A solution with a status and nothing else.
    pub fn without_incumbent(status: SolverStatus) -> Self {
        Self {
            status,
            has_incumbent: false,
            primal_values: Vec::new(),
            objective_value: None,
            best_bound: None,
            solve_time_seconds: 0.0,
            metadata: BTreeMap::new(),
        }
    }

    /// Get the primal value at the given index.
    pub fn get_primal(&self, index: usize) -> Option<f64> {
        if !self.has_incumbent {
            return None;
        }
        self.primal_values.get(index).copied()
    }

    /// Check if the solution is optimal.
    pub fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }

    /// Check if the solution is infeasible.
    pub fn is_infeasible(&self) -> bool {
        self.status.is_infeasible()
    }

    /// Get a human-readable status string.
    pub fn status_string(&self) -> &'static str {
        self.status.as_str()
    }
}

/// Trait that all solver backends must implement.
pub trait Solver {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Solve the given model under `config` and return a solver-agnostic
    /// solution.
    ///
    /// Infeasibility and exhausted budgets are reported through
    /// [`Solution::status`]; `Err` is reserved for faults.
    fn solve(&mut self, model: &Model, config: &SolverConfig) -> Result<Solution, SolverError>;
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn solver_status_predicates() {
        assert!(SolverStatus::Optimal.is_optimal());
        assert!(!SolverStatus::TimeLimit.is_optimal());
        assert!(SolverStatus::TimeLimit.is_limit());
        assert!(SolverStatus::IterationLimit.is_limit());
        assert!(!SolverStatus::Optimal.is_limit());
        assert!(SolverStatus::Infeasible.is_infeasible());
        assert!(!SolverStatus::Unknown.is_infeasible());
    }

    #[test]
    fn solver_status_as_str() {
        assert_eq!(SolverStatus::Optimal.as_str(), "optimal");
        assert_eq!(SolverStatus::Infeasible.as_str(), "infeasible");
        assert_eq!(SolverStatus::Unbounded.as_str(), "unbounded");
        assert_eq!(SolverStatus::TimeLimit.as_str(), "time_limit");
        assert_eq!(SolverStatus::IterationLimit.as_str(), "iteration_limit");
        assert_eq!(SolverStatus::Unknown.as_str(), "unknown");
        assert_eq!(format!("{}", SolverStatus::Optimal), "optimal");
    }

    #[test]
    fn solver_error_display() {
        assert_eq!(SolverError::EmptyModel.code(), "SOLVER_EMPTY_MODEL");
        assert!(SolverError::EmptyModel.to_string().contains("no variables"));
        assert!(SolverError::NoObjective.to_string().contains("no objective"));
        assert!(SolverError::InvalidVariableId(42).to_string().contains("42"));
        assert!(
            SolverError::SolverNotAvailable("HiGHS".to_string())
                .to_string()
                .contains("HiGHS")
        );
        assert!(
            SolverError::SolverSpecific("oops".to_string())
                .to_string()
                .starts_with("[SOLVER_SPECIFIC]")
        );
    }

    #[test]
    fn solution_without_incumbent_hides_primals() {
        let mut solution = Solution::without_incumbent(SolverStatus::TimeLimit);
        solution.primal_values = vec![1.0];
        assert_eq!(solution.get_primal(0), None);
        assert!(!solution.is_optimal());
        assert_eq!(solution.status_string(), "time_limit");

        solution.has_incumbent = true;
        assert_eq!(solution.get_primal(0), Some(1.0));
        assert_eq!(solution.get_primal(1), None);
    }
}
