use chromilp_coloring::{
    BatchSummary, CsvReporter, JsonLinesReporter, Reporter, RunConfig, TextReporter, run_batch,
};
use chromilp_core::{Model, Solution, Solver, SolverConfig, SolverError, SolverStatus};
use chromilp_highs::HighsSolver;
use std::path::Path;

/// Backend that always stops on the time budget before finding anything.
struct NoIncumbent;

impl Solver for NoIncumbent {
    fn name(&self) -> &'static str {
        "no-incumbent"
    }

    fn solve(&mut self, _model: &Model, _config: &SolverConfig) -> Result<Solution, SolverError> {
        Ok(Solution::without_incumbent(SolverStatus::TimeLimit))
    }
}

/// Backend that faults on its first call and delegates to HiGHS afterwards.
struct FaultOnce {
    faulted: bool,
    inner: HighsSolver,
}

impl Solver for FaultOnce {
    fn name(&self) -> &'static str {
        "fault-once"
    }

    fn solve(&mut self, model: &Model, config: &SolverConfig) -> Result<Solution, SolverError> {
        if !self.faulted {
            self.faulted = true;
            return Err(SolverError::SolverSpecific("injected fault".to_string()));
        }
        self.inner.solve(model, config)
    }
}

fn write(dir: &Path, name: &str, text: &str) {
    std::fs::write(dir.join(name), text).unwrap();
}

fn read_csv(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|row| row.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[test]
fn batch_continues_past_failures() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "square.col", "p edge 4 4\ne 1 2\ne 2 3\ne 3 4\ne 4 1\n");
    write(dir.path(), "broken.col", "p edge 3 1\ne 1 x\n");
    write(dir.path(), "lists.txt", "n=3\ne 0 1\n1:\n");
    write(
        dir.path(),
        "manifest.txt",
        "# run\nsquare.col\nbroken.col\nmissing.col\n\nlists.txt\n",
    );

    let csv_path = dir.path().join("report.csv");
    let jsonl_path = dir.path().join("report.jsonl");
    let mut reporters: Vec<Box<dyn Reporter>> = vec![
        Box::new(CsvReporter::new(&csv_path)),
        Box::new(JsonLinesReporter::new(&jsonl_path)),
        Box::new(TextReporter::new(dir.path().join("text"))),
    ];

    let summary = run_batch(
        &mut HighsSolver::new(),
        dir.path().join("manifest.txt"),
        &RunConfig::new(),
        &mut reporters,
    )
    .unwrap();

    assert_eq!(
        summary,
        BatchSummary {
            attempted: 4,
            optimal: 1,
            infeasible: 1,
            failed: 2,
            ..BatchSummary::default()
        }
    );

    let rows = read_csv(&csv_path);
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0][0], "File Name");
    assert_eq!(rows[1][0], "square.col");
    assert_eq!(rows[1][1], "optimal");
    assert_eq!(rows[1][3], "2");
    assert_eq!(rows[2][1], "failed");
    assert_eq!(rows[3][0], "missing.col");
    assert_eq!(rows[3][1], "failed");
    assert_eq!(rows[4][1], "infeasible");

    let jsonl = std::fs::read_to_string(&jsonl_path).unwrap();
    let broken: serde_json::Value = serde_json::from_str(jsonl.lines().nth(1).unwrap()).unwrap();
    assert!(
        broken["error"]
            .as_str()
            .unwrap()
            .starts_with("[PARSE_INVALID_NUMBER] line 2")
    );

    assert!(dir.path().join("text").join("square_output.txt").exists());
    assert!(dir.path().join("text").join("lists_output.txt").exists());
}

#[test]
fn batch_appends_to_existing_report() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "one.col", "p edge 1 0\n");
    write(dir.path(), "manifest.txt", "one.col\n");
    let csv_path = dir.path().join("report.csv");

    for _ in 0..2 {
        let mut reporters: Vec<Box<dyn Reporter>> = vec![Box::new(CsvReporter::new(&csv_path))];
        run_batch(
            &mut HighsSolver::new(),
            dir.path().join("manifest.txt"),
            &RunConfig::new(),
            &mut reporters,
        )
        .unwrap();
    }

    let rows = read_csv(&csv_path);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows.iter().filter(|row| row[0] == "File Name").count(), 1);
}

#[test]
fn batch_reports_time_limit_without_incumbent() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "tri.col", "p edge 3 3\ne 1 2\ne 2 3\ne 1 3\n");
    write(dir.path(), "manifest.txt", "tri.col\n");
    let csv_path = dir.path().join("report.csv");
    let mut reporters: Vec<Box<dyn Reporter>> = vec![Box::new(CsvReporter::new(&csv_path))];

    let config = RunConfig::new().with_solver(SolverConfig::new().with_time_limit(0.5));
    let summary = run_batch(
        &mut NoIncumbent,
        dir.path().join("manifest.txt"),
        &config,
        &mut reporters,
    )
    .unwrap();

    assert_eq!(summary.time_limit_no_incumbent, 1);
    let rows = read_csv(&csv_path);
    assert_eq!(rows[1][1], "time-limit-no-incumbent");
    assert!(rows[1][2..].iter().all(String::is_empty));
}

#[test]
fn solver_fault_marks_only_that_instance() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.col", "p edge 2 1\ne 1 2\n");
    write(dir.path(), "b.col", "p edge 2 1\ne 1 2\n");
    write(dir.path(), "manifest.txt", "a.col\nb.col\n");
    let jsonl_path = dir.path().join("report.jsonl");
    let mut reporters: Vec<Box<dyn Reporter>> = vec![Box::new(JsonLinesReporter::new(&jsonl_path))];

    let mut solver = FaultOnce {
        faulted: false,
        inner: HighsSolver::new(),
    };
    let summary = run_batch(
        &mut solver,
        dir.path().join("manifest.txt"),
        &RunConfig::new(),
        &mut reporters,
    )
    .unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.optimal, 1);
    let text = std::fs::read_to_string(&jsonl_path).unwrap();
    let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
    assert_eq!(first["status"], "failed");
    assert!(first["error"].as_str().unwrap().contains("injected fault"));
}

#[test]
fn unwritable_report_aborts_batch() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "one.col", "p edge 1 0\n");
    write(dir.path(), "manifest.txt", "one.col\n");
    let mut reporters: Vec<Box<dyn Reporter>> = vec![Box::new(CsvReporter::new(
        dir.path().join("no-such-dir").join("report.csv"),
    ))];

    let err = run_batch(
        &mut HighsSolver::new(),
        dir.path().join("manifest.txt"),
        &RunConfig::new(),
        &mut reporters,
    )
    .unwrap_err();
    assert_eq!(err.code(), "REPORT_WRITE_FAILED");
}
