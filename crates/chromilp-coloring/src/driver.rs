//! Solve driver: runs a [`Solver`] on a coloring model and classifies the
//! outcome.

use crate::error::ColoringError;
use crate::formulation::ColoringModel;
use chromilp_core::{Solution, Solver, SolverConfig, SolverStatus};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Outcome of solving one coloring model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColoringStatus {
    /// Proven minimum number of colors.
    Optimal,
    /// Budget exhausted with an incumbent but no proof.
    FeasibleSuboptimal,
    /// No proper coloring exists within the palette and lists.
    Infeasible,
    /// Budget exhausted before any coloring was found.
    TimeLimitNoIncumbent,
}

impl ColoringStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ColoringStatus::Optimal => "optimal",
            ColoringStatus::FeasibleSuboptimal => "feasible-suboptimal",
            ColoringStatus::Infeasible => "infeasible",
            ColoringStatus::TimeLimitNoIncumbent => "time-limit-no-incumbent",
        }
    }

    /// Whether results with this status carry a coloring.
    pub fn has_incumbent(self) -> bool {
        matches!(
            self,
            ColoringStatus::Optimal | ColoringStatus::FeasibleSuboptimal
        )
    }
}

impl std::fmt::Display for ColoringStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified result of one solve call.
///
/// `objective_value` and `assignment` are present iff the status carries an
/// incumbent. `assignment` is indexed by `VariableId::index()`.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    pub status: ColoringStatus,
    pub objective_value: Option<f64>,
    pub best_bound: Option<f64>,
    pub assignment: Option<Vec<f64>>,
    pub elapsed: Duration,
    pub gap_percent: Option<f64>,
}

impl SolveResult {
    fn without_incumbent(status: ColoringStatus, best_bound: Option<f64>, elapsed: Duration) -> Self {
        Self {
            status,
            objective_value: None,
            best_bound,
            assignment: None,
            elapsed,
            gap_percent: None,
        }
    }

    pub fn has_incumbent(&self) -> bool {
        self.status.has_incumbent()
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Relative gap in percent between an objective and its lower bound.
///
/// Zero when both are zero. A zero bound under a positive objective yields
/// `inf`. Numerical noise that would push the gap below zero is clamped.
pub fn gap_percent(objective: f64, bound: f64) -> f64 {
    if objective == 0.0 && bound == 0.0 {
        return 0.0;
    }
    let gap = 100.0 * (objective - bound) / bound;
    if gap < 0.0 { 0.0 } else { gap }
}

/// Solve `coloring` under `config`; `config.time_limit` is the wall-clock
/// budget.
///
/// Solver errors and statuses that are neither a result nor a budget stop
/// become [`ColoringError::SolverFault`].
pub fn solve<S>(
    solver: &mut S,
    coloring: &ColoringModel,
    config: &SolverConfig,
) -> Result<SolveResult, ColoringError>
where
    S: Solver + ?Sized,
{
    let model = coloring.model();
    debug!(
        component = "driver",
        operation = "solve",
        status = "start",
        solver = solver.name(),
        variables = model.num_variables(),
        constraints = model.num_constraints(),
        time_limit = ?config.time_limit,
        "Solving coloring model"
    );

    let started = Instant::now();
    if model.num_variables() == 0 {
        // Nothing to decide: either no vertices, or vertices and no colors.
        let result = trivial_result(coloring, started.elapsed());
        debug!(
            component = "driver",
            operation = "solve",
            status = "success",
            result = result.status.as_str(),
            "Model has no variables; solved without the backend"
        );
        return Ok(result);
    }

    let solution = solver.solve(model, config).map_err(|err| {
        warn!(
            component = "driver",
            operation = "solve",
            status = "error",
            solver = solver.name(),
            error = %err,
            "Solver raised an error"
        );
        ColoringError::SolverFault(err.to_string())
    })?;
    let elapsed = started.elapsed();
    let result = classify(solution, elapsed)?;

    debug!(
        component = "driver",
        operation = "solve",
        status = "success",
        result = result.status.as_str(),
        objective = ?result.objective_value,
        bound = ?result.best_bound,
        gap_percent = ?result.gap_percent,
        duration_ms = elapsed.as_secs_f64() * 1000.0,
        "Coloring model solved"
    );
    Ok(result)
}

/// [`solve`] with only a time budget configured.
pub fn solve_with_time_limit<S>(
    solver: &mut S,
    coloring: &ColoringModel,
    time_limit_seconds: Option<f64>,
) -> Result<SolveResult, ColoringError>
where
    S: Solver + ?Sized,
{
    let config = SolverConfig::new().with_optional_time_limit(time_limit_seconds);
    solve(solver, coloring, &config)
}

fn trivial_result(coloring: &ColoringModel, elapsed: Duration) -> SolveResult {
    if coloring.vertices().is_empty() {
        SolveResult {
            status: ColoringStatus::Optimal,
            objective_value: Some(0.0),
            best_bound: Some(0.0),
            assignment: Some(Vec::new()),
            elapsed,
            gap_percent: Some(0.0),
        }
    } else {
        SolveResult::without_incumbent(ColoringStatus::Infeasible, None, elapsed)
    }
}

/// Slack when rounding a fractional bound up to the next color count.
const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// Whether `bound` leaves no color count below `objective`.
///
/// The objective is a count of colors, so a bound above `objective - 1`
/// proves the incumbent optimal even when the raw gap is not zero.
fn bound_proves_optimal(objective: f64, bound: f64) -> bool {
    bound > objective - 1.0 + INTEGRALITY_TOLERANCE
}

fn fault(status: SolverStatus, detail: &str) -> ColoringError {
    warn!(
        component = "driver",
        operation = "classify",
        status = "error",
        solver_status = status.as_str(),
        detail,
        "Unclassifiable solver outcome"
    );
    ColoringError::SolverFault(format!("solver returned {status} {detail}"))
}

fn classify(solution: Solution, elapsed: Duration) -> Result<SolveResult, ColoringError> {
    let status = solution.status;
    let best_bound = solution.best_bound;

    if !solution.has_incumbent {
        return match status {
            SolverStatus::Infeasible => Ok(SolveResult::without_incumbent(
                ColoringStatus::Infeasible,
                best_bound,
                elapsed,
            )),
            SolverStatus::TimeLimit => Ok(SolveResult::without_incumbent(
                ColoringStatus::TimeLimitNoIncumbent,
                best_bound,
                elapsed,
            )),
            other => Err(fault(other, "without a feasible solution")),
        };
    }

    let Some(objective) = solution.objective_value else {
        return Err(fault(status, "with an incumbent but no objective value"));
    };

    let (status, gap) = match status {
        SolverStatus::Optimal | SolverStatus::TimeLimit | SolverStatus::IterationLimit => {
            match best_bound {
                // A closed gap is a proof even if the budget ran out.
                Some(bound) if bound_proves_optimal(objective, bound) => {
                    (ColoringStatus::Optimal, Some(0.0))
                }
                Some(bound) => {
                    if status.is_optimal() {
                        debug!(
                            component = "driver",
                            operation = "classify",
                            status = "success",
                            objective,
                            bound,
                            "Solver stopped within its gap tolerance; optimality not proven"
                        );
                    }
                    (
                        ColoringStatus::FeasibleSuboptimal,
                        Some(gap_percent(objective, bound)),
                    )
                }
                None if status.is_optimal() => (ColoringStatus::Optimal, Some(0.0)),
                None => (ColoringStatus::FeasibleSuboptimal, None),
            }
        }
        other => return Err(fault(other, "with an incumbent")),
    };

    Ok(SolveResult {
        status,
        objective_value: Some(objective),
        best_bound: best_bound.or(if status == ColoringStatus::Optimal {
            Some(objective)
        } else {
            None
        }),
        assignment: Some(solution.primal_values),
        elapsed,
        gap_percent: gap,
    })
}
