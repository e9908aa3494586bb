//! Exact graph coloring and list coloring as binary integer programs.
//!
//! The pipeline is parse → build → solve → extract → report:
//!
//! - [`parse`] reads plain/DIMACS-style and list-coloring instance files
//!   into a [`Graph`], a [`ColorPalette`] and an optional
//!   [`ListColoringConstraint`].
//! - [`formulation::build`] emits the `assign[v,c]` / `used[c]` model.
//! - [`driver::solve`] runs any [`chromilp_core::Solver`] and classifies the
//!   outcome.
//! - [`extract::extract`] decodes the incumbent into a [`ReportRecord`],
//!   which the [`report`] sinks persist.
//! - [`batch`] strings the stages together over a manifest of instances.

pub mod batch;
pub mod driver;
pub mod error;
pub mod extract;
pub mod formulation;
pub mod graph;
pub mod parse;
pub mod report;

pub use batch::{BatchSummary, RunConfig, read_manifest, run_batch, run_instances, solve_instance};
pub use driver::{ColoringStatus, SolveResult, gap_percent, solve, solve_with_time_limit};
pub use error::{ColoringError, ParseError, ParseErrorKind};
pub use extract::{Coloring, RecordStatus, ReportRecord, decode, extract};
pub use formulation::{ColoringModel, FormulationOptions, build};
pub use graph::{Color, ColorPalette, Graph, ListColoringConstraint, VertexId};
pub use parse::{Dialect, Instance, ListPaletteConvention, ParseOptions, parse_file, parse_str};
pub use report::{CsvReporter, JsonLinesReporter, Reporter, TextReporter};
