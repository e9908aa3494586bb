//! HiGHS solver implementation.

use crate::ffi::{HighsModel, HighsModelError, HighsOption, HighsStatus, ObjectiveSense};
use crate::status::{highs_may_have_solution, highs_status_string, highs_to_core_status};
use chromilp_core::{Model, Sense, Solution, Solver, SolverConfig, SolverError};
use chromilp_expr::{ConstraintId, VariableId};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, trace, warn};

type ConstraintEntries = BTreeMap<ConstraintId, (Vec<usize>, Vec<f64>)>;

fn highs_model_error_to_solver_error(err: HighsModelError) -> SolverError {
    SolverError::SolverSpecific(err.to_string())
}

/// [`Solver`] backed by the HiGHS MIP solver.
///
/// The backend is stateless between solves; every call rebuilds the HiGHS
/// problem from the given model.
#[derive(Debug, Default, Clone, Copy)]
pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for HighsSolver {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn solve(&mut self, model: &Model, config: &SolverConfig) -> Result<Solution, SolverError> {
        solve_model(model, config)
    }
}

/// Validate that a model is ready for solving.
fn validate_model(model: &Model) -> Result<(), SolverError> {
    if model.num_variables() == 0 {
        return Err(SolverError::EmptyModel);
    }
    Ok(())
}

fn collect_objective_coefficients(
    model: &Model,
) -> Result<(Sense, BTreeMap<VariableId, f64>), SolverError> {
    let objective = model.objective();
    let Some(sense) = objective.sense else {
        return Err(SolverError::NoObjective);
    };

    let mut objective_coeffs: BTreeMap<VariableId, f64> = BTreeMap::new();
    for (var_id, coeff) in &objective.terms {
        model
            .get_variable(*var_id)
            .map_err(|_| SolverError::InvalidVariableId(var_id.inner()))?;
        *objective_coeffs.entry(*var_id).or_insert(0.0) += *coeff;
    }

    Ok((sense, objective_coeffs))
}

fn int_option(name: &str, value: u32) -> Result<HighsOption, SolverError> {
    i32::try_from(value).map(HighsOption::Int).map_err(|_| {
        SolverError::InvalidConfig(format!("{name} out of range for HiGHS (got {value})"))
    })
}

fn apply_solver_config(highs_model: &mut HighsModel, config: &SolverConfig) -> Result<(), SolverError> {
    highs_model.set_log_to_console(config.log_to_console.unwrap_or(false));

    if let Some(limit) = config.time_limit {
        highs_model.set_option("time_limit", HighsOption::Float(limit));
    }
    if let Some(gap) = config.mip_gap {
        highs_model.set_option("mip_rel_gap", HighsOption::Float(gap));
    }
    if let Some(presolve) = config.presolve {
        let presolve_str = if presolve { "on" } else { "off" };
        highs_model.set_option("presolve", HighsOption::Str(presolve_str.to_string()));
    }
    if let Some(threads) = config.threads {
        highs_model.set_option("threads", int_option("threads", threads)?);
    }
    if let Some(seed) = config.random_seed {
        highs_model.set_option("random_seed", int_option("random_seed", seed)?);
    }
    Ok(())
}

fn add_variables_to_highs(
    model: &Model,
    highs_model: &mut HighsModel,
    objective_coeffs: &BTreeMap<VariableId, f64>,
) -> BTreeMap<VariableId, usize> {
    let mut var_id_to_col = BTreeMap::new();

    for (var_id, var) in model.variables() {
        let obj_coeff = objective_coeffs.get(&var_id).copied().unwrap_or(0.0);
        let col_idx = if var.is_integer {
            highs_model.add_integer_col(var.bounds.lower, var.bounds.upper, obj_coeff)
        } else {
            highs_model.add_col(var.bounds.lower, var.bounds.upper, obj_coeff)
        };
        var_id_to_col.insert(var_id, col_idx);

        trace!(
            component = "solver",
            operation = "add_variable",
            status = "success",
            var_id = var_id.inner(),
            col_idx,
            lower = var.bounds.lower,
            upper = var.bounds.upper,
            obj_coeff,
            is_integer = var.is_integer,
            "Added variable to HiGHS"
        );
    }

    debug!(
        component = "solver",
        operation = "add_variables",
        status = "success",
        num_vars = model.num_variables(),
        "Added all variables to HiGHS"
    );

    var_id_to_col
}

fn build_constraint_entries(
    model: &Model,
    var_id_to_col: &BTreeMap<VariableId, usize>,
) -> ConstraintEntries {
    let matrix_build_started = Instant::now();
    let mut constraint_entries: ConstraintEntries = BTreeMap::new();

    for (var_id, column) in model.columns() {
        let Some(&col_idx) = var_id_to_col.get(&var_id) else {
            warn!(
                component = "solver",
                operation = "build_rows",
                status = "warn",
                var_id = var_id.inner(),
                "Variable missing HiGHS column index; skipping coefficients"
            );
            continue;
        };

        for (constraint_id, coeff) in column {
            let entry = constraint_entries
                .entry(*constraint_id)
                .or_insert_with(|| (Vec::new(), Vec::new()));
            entry.0.push(col_idx);
            entry.1.push(*coeff);
        }
    }

    debug!(
        component = "solver",
        operation = "build_rows",
        status = "success",
        num_constraints = constraint_entries.len(),
        duration_ms = matrix_build_started.elapsed().as_secs_f64() * 1000.0,
        "Built constraint matrix"
    );

    constraint_entries
}

fn add_constraints_to_highs(
    model: &Model,
    highs_model: &mut HighsModel,
    constraint_entries: &mut ConstraintEntries,
) -> Result<(), SolverError> {
    for (constraint_id, constraint) in model.constraints() {
        // A constraint with no coefficients is still added so that its
        // bounds take part in feasibility.
        let (col_indices, coefficients) = constraint_entries
            .remove(&constraint_id)
            .unwrap_or_default();

        highs_model
            .add_row(
                constraint.bounds.lower,
                constraint.bounds.upper,
                &col_indices,
                &coefficients,
            )
            .map_err(highs_model_error_to_solver_error)?;

        trace!(
            component = "solver",
            operation = "add_constraint",
            status = "success",
            constraint_id = constraint_id.inner(),
            lower = constraint.bounds.lower,
            upper = constraint.bounds.upper,
            num_coeffs = col_indices.len(),
            "Added constraint to HiGHS"
        );
    }

    debug!(
        component = "solver",
        operation = "add_constraints",
        status = "success",
        num_constraints = model.num_constraints(),
        "Added all constraints to HiGHS"
    );

    Ok(())
}

fn all_columns_bounded(model: &Model) -> bool {
    model
        .variables()
        .all(|(_, var)| var.bounds.lower.is_finite() && var.bounds.upper.is_finite())
}

fn solve_model(model: &Model, config: &SolverConfig) -> Result<Solution, SolverError> {
    validate_model(model)?;
    config.validate()?;

    let solver_version = crate::ffi::highs_version().unwrap_or_else(|| "unknown".to_string());
    let solve_started = Instant::now();

    debug!(
        component = "solver",
        operation = "solve",
        status = "success",
        solver = "highs",
        solver_version = %solver_version,
        variables = model.num_variables() as u64,
        constraints = model.num_constraints() as u64,
        nnz = model.num_coefficients() as u64,
        time_limit = ?config.time_limit,
        "Starting solve process"
    );

    let (sense, objective_coeffs) = collect_objective_coefficients(model)?;

    let mut highs_model = HighsModel::new();
    apply_solver_config(&mut highs_model, config)?;
    highs_model.set_objective_sense(match sense {
        Sense::Minimize => ObjectiveSense::Minimize,
        Sense::Maximize => ObjectiveSense::Maximize,
    });

    let var_id_to_col = add_variables_to_highs(model, &mut highs_model, &objective_coeffs);
    let mut constraint_entries = build_constraint_entries(model, &var_id_to_col);
    add_constraints_to_highs(model, &mut highs_model, &mut constraint_entries)?;

    let highs_status = highs_model
        .solve()
        .map_err(highs_model_error_to_solver_error)?;
    let solve_time_seconds = solve_started.elapsed().as_secs_f64();
    let status = highs_to_core_status(highs_status, all_columns_bounded(model));

    let has_incumbent = highs_may_have_solution(highs_status)
        && (highs_status == HighsStatus::Optimal || highs_model.has_primal_solution());
    let best_bound = highs_model.mip_dual_bound();
    let mip_gap = highs_model.mip_gap();
    let simplex_iterations = highs_model.simplex_iteration_count();

    debug!(
        component = "solver",
        operation = "solve",
        status = "success",
        solver = "highs",
        solver_version = %solver_version,
        solver_status = highs_status_string(highs_status),
        has_incumbent,
        best_bound = ?best_bound,
        optimality_gap = mip_gap,
        simplex_iterations,
        duration_ms = solve_time_seconds * 1000.0,
        "HiGHS solve completed"
    );

    if !has_incumbent {
        if !status.is_infeasible() {
            warn!(
                component = "solver",
                operation = "solve",
                status = "warn",
                solver = "highs",
                solver_status = highs_status_string(highs_status),
                duration_ms = solve_time_seconds * 1000.0,
                "Solver stopped without a feasible solution"
            );
        }
        let mut solution = Solution::without_incumbent(status);
        solution.best_bound = best_bound;
        solution.solve_time_seconds = solve_time_seconds;
        return Ok(solution);
    }

    if highs_status != HighsStatus::Optimal {
        warn!(
            component = "solver",
            operation = "solve",
            status = "warn",
            solver = "highs",
            solver_status = highs_status_string(highs_status),
            optimality_gap = mip_gap,
            duration_ms = solve_time_seconds * 1000.0,
            "Solver hit limit but returning best solution found"
        );
    }

    let col_values = highs_model
        .col_values()
        .map_err(highs_model_error_to_solver_error)?;
    let objective_value = highs_model
        .objective_value()
        .map_err(highs_model_error_to_solver_error)?;

    // Columns were added in variable order, so col_idx == VariableId::index().
    let mut primal_values = vec![0.0; model.num_variables()];
    for (var_id, col_idx) in &var_id_to_col {
        if let (Some(slot), Some(value)) =
            (primal_values.get_mut(var_id.index()), col_values.get(*col_idx))
        {
            *slot = *value;
        }
    }

    let mut metadata = BTreeMap::new();
    metadata.insert("mip_gap".to_string(), mip_gap);
    metadata.insert("simplex_iterations".to_string(), simplex_iterations as f64);

    debug!(
        component = "solver",
        operation = "extract_solution",
        status = "success",
        objective_value,
        num_primal_values = primal_values.len(),
        "Solution extracted"
    );

    Ok(Solution {
        status,
        has_incumbent,
        primal_values,
        objective_value: Some(objective_value),
        best_bound,
        solve_time_seconds,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromilp_core::{Bounds, Variable};

    #[test]
    fn test_solve_rejects_empty_model() {
        let model = Model::new();
        let result = HighsSolver::new().solve(&model, &SolverConfig::new());
        assert!(matches!(result, Err(SolverError::EmptyModel)));
    }

    #[test]
    fn test_solve_requires_objective() {
        let mut model = Model::new();
        model.add_variable(Variable::binary()).unwrap();
        let result = HighsSolver::new().solve(&model, &SolverConfig::new());
        assert!(matches!(result, Err(SolverError::NoObjective)));
    }

    #[test]
    fn test_solve_rejects_invalid_config() {
        let mut model = Model::new();
        let x = model.add_variable(Variable::binary()).unwrap();
        model.minimize(chromilp_expr::Expr::var(x)).unwrap();
        let config = SolverConfig::new().with_time_limit(-1.0);
        let result = HighsSolver::new().solve(&model, &config);
        assert!(matches!(result, Err(SolverError::InvalidConfig(_))));
    }

    #[test]
    fn test_int_option_range() {
        assert!(matches!(int_option("threads", 8), Ok(HighsOption::Int(8))));
        assert!(matches!(
            int_option("threads", u32::MAX),
            Err(SolverError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_solve_rejects_thread_count_beyond_i32() {
        let mut model = Model::new();
        let x = model.add_variable(Variable::binary()).unwrap();
        model.minimize(chromilp_expr::Expr::var(x)).unwrap();
        let config = SolverConfig::new().with_threads(3_000_000_000);
        let result = HighsSolver::new().solve(&model, &config);
        assert!(matches!(result, Err(SolverError::InvalidConfig(_))));
    }

    #[test]
    fn test_all_columns_bounded() {
        let mut model = Model::new();
        model.add_variable(Variable::binary()).unwrap();
        assert!(all_columns_bounded(&model));
        model
            .add_variable(Variable::continuous(Bounds::at_least(0.0)))
            .unwrap();
        assert!(!all_columns_bounded(&model));
    }

    #[test]
    fn test_backend_name() {
        assert_eq!(HighsSolver::new().name(), "highs");
    }
}
