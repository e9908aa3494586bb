//! HiGHS backend for `chromilp-core` models.
//!
//! The model's column-first storage is transposed into HiGHS rows once per
//! solve; the HiGHS problem is consumed by the solve and never reused.

pub mod ffi;
pub mod solver;
mod status;

pub use ffi::{HighsModel, HighsModelError, HighsOption, HighsStatus, ObjectiveSense, highs_version};
pub use solver::HighsSolver;
