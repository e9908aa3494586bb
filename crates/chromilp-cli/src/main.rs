mod logging;

use chromilp_coloring::{
    BatchSummary, CsvReporter, Dialect, FormulationOptions, JsonLinesReporter,
    ListPaletteConvention, ParseOptions, ReportRecord, Reporter, RunConfig, TextReporter,
    run_batch, solve_instance,
};
use chromilp_core::SolverConfig;
use chromilp_highs::{HighsSolver, highs_version};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "chromilp",
    author,
    version,
    about = "Exact graph coloring and list coloring via binary integer programming"
)]
struct Cli {
    /// Log filter directive (overrides CHROMILP_TRACE), e.g. `debug` or `chromilp_coloring=trace`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve a single instance file
    Solve(SolveArgs),
    /// Solve every instance listed in a manifest and append results to a report
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct InstanceArgs {
    /// Instance dialect
    #[arg(long, value_enum, default_value = "auto")]
    dialect: DialectArg,

    /// Palette numbering for list-coloring instances
    #[arg(long, value_enum, default_value = "one-based")]
    list_palette: ListPaletteArg,

    /// Vertex appended to plain instances without a `p` line
    #[arg(long)]
    declared_vertices: Option<u32>,

    /// Leading lines to skip unconditionally
    #[arg(long, default_value_t = 0)]
    header_lines: usize,

    /// Require used colors to form a prefix of the palette (plain coloring only)
    #[arg(long)]
    symmetry_breaking: bool,

    /// Wall-clock budget per instance, in seconds
    #[arg(long, env = "CHROMILP_TIME_LIMIT")]
    time_limit: Option<f64>,

    /// Relative MIP gap at which the solver may stop
    #[arg(long)]
    mip_gap: Option<f64>,

    /// Solver thread count
    #[arg(long)]
    threads: Option<u32>,

    /// Stream the solver's own log to the console
    #[arg(long)]
    solver_log: bool,
}

#[derive(Parser, Debug)]
struct SolveArgs {
    /// Instance file
    instance: PathBuf,

    #[command(flatten)]
    options: InstanceArgs,

    /// Directory for a `<stem>_output.txt` summary
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Manifest listing one instance file per line
    manifest: PathBuf,

    /// CSV report, appended to
    #[arg(long)]
    report: PathBuf,

    /// JSON-lines report, appended to
    #[arg(long)]
    jsonl: Option<PathBuf>,

    /// Directory for per-instance `<stem>_output.txt` summaries
    #[arg(long)]
    text_dir: Option<PathBuf>,

    #[command(flatten)]
    options: InstanceArgs,

    /// Output format for the final summary
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum DialectArg {
    Auto,
    Dimacs,
    List,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Auto => Dialect::Auto,
            DialectArg::Dimacs => Dialect::Dimacs,
            DialectArg::List => Dialect::List,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum ListPaletteArg {
    OneBased,
    ZeroBased,
}

impl From<ListPaletteArg> for ListPaletteConvention {
    fn from(arg: ListPaletteArg) -> Self {
        match arg {
            ListPaletteArg::OneBased => ListPaletteConvention::OneBased,
            ListPaletteArg::ZeroBased => ListPaletteConvention::ZeroBased,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref())?;
    debug!(
        component = "cli",
        operation = "start",
        status = "success",
        highs_version = %highs_version().unwrap_or_else(|| "unknown".to_string()),
        "chromilp starting"
    );
    match cli.command {
        Command::Solve(args) => solve_command(args),
        Command::Batch(args) => batch_command(args),
    }
}

fn run_config(args: &InstanceArgs) -> Result<RunConfig, Box<dyn std::error::Error>> {
    let mut parse = ParseOptions::new()
        .with_dialect(args.dialect.into())
        .with_list_palette(args.list_palette.into())
        .with_header_lines(args.header_lines);
    if let Some(vertex) = args.declared_vertices {
        parse = parse.with_declared_vertices(vertex);
    }

    let mut solver = SolverConfig::new()
        .with_optional_time_limit(args.time_limit)
        .with_log_to_console(args.solver_log);
    if let Some(gap) = args.mip_gap {
        solver = solver.with_mip_gap(gap);
    }
    if let Some(threads) = args.threads {
        solver = solver.with_threads(threads);
    }
    solver.validate()?;

    Ok(RunConfig::new()
        .with_parse(parse)
        .with_formulation(FormulationOptions::new().with_symmetry_breaking(args.symmetry_breaking))
        .with_solver(solver))
}

fn solve_command(args: SolveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = run_config(&args.options)?;
    let record = solve_instance(&mut HighsSolver::new(), &args.instance, &config)?;

    if let Some(dir) = args.output_dir {
        TextReporter::new(dir).report(&record)?;
    }
    match args.format {
        OutputFormat::Table => print_record_table(&record),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
    }
    Ok(())
}

fn batch_command(args: BatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = run_config(&args.options)?;

    let mut reporters: Vec<Box<dyn Reporter>> = vec![Box::new(CsvReporter::new(&args.report))];
    if let Some(path) = args.jsonl {
        reporters.push(Box::new(JsonLinesReporter::new(path)));
    }
    if let Some(dir) = args.text_dir {
        reporters.push(Box::new(TextReporter::new(dir)));
    }

    let summary = run_batch(&mut HighsSolver::new(), &args.manifest, &config, &mut reporters)?;
    match args.format {
        OutputFormat::Table => print_summary_table(&summary),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    println!("report: {}", args.report.display());
    Ok(())
}

fn format_option_f64(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |value| format!("{value:.precision$}"))
}

fn print_record_table(record: &ReportRecord) {
    println!(
        "{:<24} {:<24} {:>7} {:>10} {:>10} {:>8}",
        "file", "status", "colors", "objective", "time_s", "gap_%"
    );
    println!(
        "{:<24} {:<24} {:>7} {:>10} {:>10} {:>8}",
        record.file_name,
        record.status.as_str(),
        record
            .total_colors_used
            .map_or_else(|| "-".to_string(), |count| count.to_string()),
        format_option_f64(record.objective_value, 1),
        format_option_f64(record.time_taken_seconds, 3),
        format_option_f64(record.gap_percent, 2),
    );
    if let Some(classes) = record.vertex_color_display() {
        println!("coloring: {classes}");
    }
    if let Some(error) = &record.error {
        println!("error: {error}");
    }
}

fn print_summary_table(summary: &BatchSummary) {
    println!(
        "{:>9} {:>8} {:>11} {:>11} {:>13} {:>7}",
        "attempted", "optimal", "suboptimal", "infeasible", "no_incumbent", "failed"
    );
    println!(
        "{:>9} {:>8} {:>11} {:>11} {:>13} {:>7}",
        summary.attempted,
        summary.optimal,
        summary.feasible_suboptimal,
        summary.infeasible,
        summary.time_limit_no_incumbent,
        summary.failed,
    );
}
