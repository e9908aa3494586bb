//! Sequential batch runs over a manifest of instance files.

use crate::driver;
use crate::error::ColoringError;
use crate::extract::{self, RecordStatus, ReportRecord};
use crate::formulation::{self, FormulationOptions};
use crate::parse::{self, ParseOptions};
use crate::report::Reporter;
use chromilp_core::{Solver, SolverConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

/// Everything that shapes one run: how to read, model and solve instances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunConfig {
    pub parse: ParseOptions,
    pub formulation: FormulationOptions,
    pub solver: SolverConfig,
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parse(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }

    pub fn with_formulation(mut self, formulation: FormulationOptions) -> Self {
        self.formulation = formulation;
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }
}

/// Outcome counts of a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub attempted: usize,
    pub optimal: usize,
    pub feasible_suboptimal: usize,
    pub infeasible: usize,
    pub time_limit_no_incumbent: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn record(&mut self, status: RecordStatus) {
        self.attempted += 1;
        match status {
            RecordStatus::Optimal => self.optimal += 1,
            RecordStatus::FeasibleSuboptimal => self.feasible_suboptimal += 1,
            RecordStatus::Infeasible => self.infeasible += 1,
            RecordStatus::TimeLimitNoIncumbent => self.time_limit_no_incumbent += 1,
            RecordStatus::Failed => self.failed += 1,
        }
    }
}

/// Read a manifest: one instance path per line, blank lines and `#`
/// comments skipped, relative paths resolved against the manifest's
/// directory.
pub fn read_manifest(path: impl AsRef<Path>) -> Result<Vec<PathBuf>, ColoringError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|err| ColoringError::Manifest {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));

    let entries: Vec<PathBuf> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            let entry = Path::new(line);
            if entry.is_absolute() {
                entry.to_path_buf()
            } else {
                base.join(entry)
            }
        })
        .collect();

    debug!(
        component = "batch",
        operation = "read_manifest",
        status = "success",
        path = %path.display(),
        instances = entries.len(),
        "Read manifest"
    );
    Ok(entries)
}

/// Name an instance is reported under: its file name.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

/// Parse, build, solve and extract one instance file.
pub fn solve_instance<S>(
    solver: &mut S,
    path: &Path,
    config: &RunConfig,
) -> Result<ReportRecord, ColoringError>
where
    S: Solver + ?Sized,
{
    let name = display_name(path);
    let instance = parse::parse_file(path, &config.parse)?;
    let coloring_model = formulation::build(
        &instance.graph,
        &instance.palette,
        instance.list.as_ref(),
        &config.formulation,
    )?;
    let result = driver::solve(solver, &coloring_model, &config.solver)?;
    extract::extract(&name, &coloring_model, &result)
}

/// Run every instance in order, reporting each record to all `reporters`.
///
/// An instance that fails is reported with status `failed` and the run
/// continues; only a reporter failure aborts.
pub fn run_instances<S>(
    solver: &mut S,
    instances: &[PathBuf],
    config: &RunConfig,
    reporters: &mut [Box<dyn Reporter>],
) -> Result<BatchSummary, ColoringError>
where
    S: Solver + ?Sized,
{
    let started = Instant::now();
    let mut summary = BatchSummary::default();

    for (idx, path) in instances.iter().enumerate() {
        let name = display_name(path);
        let record = match solve_instance(solver, path, config) {
            Ok(record) => record,
            Err(err) => {
                error!(
                    component = "batch",
                    operation = "solve_instance",
                    status = "error",
                    file = %path.display(),
                    code = err.code(),
                    error = %err,
                    "Instance failed"
                );
                ReportRecord::failed(name, &err)
            }
        };

        for reporter in reporters.iter_mut() {
            reporter.report(&record)?;
        }
        summary.record(record.status);

        info!(
            component = "batch",
            operation = "solve_instance",
            status = "success",
            index = idx + 1,
            total = instances.len(),
            file = %record.file_name,
            result = record.status.as_str(),
            colors = ?record.total_colors_used,
            "Instance done"
        );
    }

    info!(
        component = "batch",
        operation = "run",
        status = "success",
        attempted = summary.attempted,
        optimal = summary.optimal,
        feasible_suboptimal = summary.feasible_suboptimal,
        infeasible = summary.infeasible,
        time_limit_no_incumbent = summary.time_limit_no_incumbent,
        failed = summary.failed,
        duration_ms = started.elapsed().as_secs_f64() * 1000.0,
        "Batch finished"
    );
    Ok(summary)
}

/// Read `manifest` fully, then run its instances.
pub fn run_batch<S>(
    solver: &mut S,
    manifest: impl AsRef<Path>,
    config: &RunConfig,
    reporters: &mut [Box<dyn Reporter>],
) -> Result<BatchSummary, ColoringError>
where
    S: Solver + ?Sized,
{
    let instances = read_manifest(manifest)?;
    run_instances(solver, &instances, config, reporters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_manifest_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("list.txt");
        std::fs::write(&manifest, "# instances\na.col\n\n  sub/b.col  \n/abs/c.col\n").unwrap();

        let entries = read_manifest(&manifest).unwrap();
        assert_eq!(
            entries,
            vec![
                dir.path().join("a.col"),
                dir.path().join("sub/b.col"),
                PathBuf::from("/abs/c.col"),
            ]
        );
    }

    #[test]
    fn test_missing_manifest() {
        let err = read_manifest("/nonexistent/chromilp/manifest.txt").unwrap_err();
        assert_eq!(err.code(), "MANIFEST_UNREADABLE");
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = BatchSummary::default();
        summary.record(RecordStatus::Optimal);
        summary.record(RecordStatus::Failed);
        summary.record(RecordStatus::Optimal);
        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.optimal, 2);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("dir/queen5_5.col")), "queen5_5.col");
    }
}
