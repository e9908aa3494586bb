//! Status conversions between HiGHS and the core solve interface.

use crate::ffi::HighsStatus;
use chromilp_core::SolverStatus;

/// Map a HiGHS status onto the core status.
///
/// `UnboundedOrInfeasible` can only mean infeasible when every column has
/// finite bounds, so `bounded` decides how that status is read.
pub(crate) fn highs_to_core_status(status: HighsStatus, bounded: bool) -> SolverStatus {
    match status {
        HighsStatus::Optimal => SolverStatus::Optimal,
        HighsStatus::Infeasible => SolverStatus::Infeasible,
        HighsStatus::Unbounded => SolverStatus::Unbounded,
        HighsStatus::UnboundedOrInfeasible if bounded => SolverStatus::Infeasible,
        HighsStatus::UnboundedOrInfeasible => SolverStatus::Unknown,
        HighsStatus::ReachedTimeLimit => SolverStatus::TimeLimit,
        HighsStatus::ReachedIterationLimit => SolverStatus::IterationLimit,
        HighsStatus::Unknown => SolverStatus::Unknown,
    }
}

pub(crate) fn highs_status_string(status: HighsStatus) -> &'static str {
    match status {
        HighsStatus::Optimal => "optimal",
        HighsStatus::Infeasible => "infeasible",
        HighsStatus::Unbounded => "unbounded",
        HighsStatus::UnboundedOrInfeasible => "unbounded_or_infeasible",
        HighsStatus::ReachedTimeLimit => "time_limit",
        HighsStatus::ReachedIterationLimit => "iteration_limit",
        HighsStatus::Unknown => "unknown",
    }
}

/// Statuses after which HiGHS may hold an incumbent worth reading.
pub(crate) fn highs_may_have_solution(status: HighsStatus) -> bool {
    matches!(
        status,
        HighsStatus::Optimal | HighsStatus::ReachedTimeLimit | HighsStatus::ReachedIterationLimit
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highs_to_core_mapping() {
        assert_eq!(
            highs_to_core_status(HighsStatus::Optimal, true),
            SolverStatus::Optimal
        );
        assert_eq!(
            highs_to_core_status(HighsStatus::ReachedTimeLimit, true),
            SolverStatus::TimeLimit
        );
        assert_eq!(
            highs_to_core_status(HighsStatus::ReachedIterationLimit, true),
            SolverStatus::IterationLimit
        );
        assert_eq!(
            highs_to_core_status(HighsStatus::Infeasible, false),
            SolverStatus::Infeasible
        );
    }

    #[test]
    fn test_unbounded_or_infeasible_depends_on_bounds() {
        assert_eq!(
            highs_to_core_status(HighsStatus::UnboundedOrInfeasible, true),
            SolverStatus::Infeasible
        );
        assert_eq!(
            highs_to_core_status(HighsStatus::UnboundedOrInfeasible, false),
            SolverStatus::Unknown
        );
    }

    #[test]
    fn test_status_helpers() {
        assert!(highs_may_have_solution(HighsStatus::Optimal));
        assert!(highs_may_have_solution(HighsStatus::ReachedTimeLimit));
        assert!(!highs_may_have_solution(HighsStatus::Infeasible));
        assert!(!highs_may_have_solution(HighsStatus::UnboundedOrInfeasible));
        assert_eq!(
            highs_status_string(HighsStatus::UnboundedOrInfeasible),
            "unbounded_or_infeasible"
        );
        assert_eq!(highs_status_string(HighsStatus::Unknown), "unknown");
    }
}
