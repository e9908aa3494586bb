//! Chromilp core: a column-first ILP model and the solver-agnostic solve
//! interface that backends implement.

pub mod config;
pub mod model;
pub mod solver;
pub mod types;

pub use config::SolverConfig;
pub use model::{Model, ModelError};
pub use solver::{Solution, Solver, SolverError, SolverStatus};
pub use types::{Bounds, Constraint, Objective, Sense, Variable};
