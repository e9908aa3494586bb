//! Durable report sinks.
//!
//! Every sink opens its target per record, writes, flushes and closes it,
//! so results written before a crash survive.

use crate::error::ColoringError;
use crate::extract::ReportRecord;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// CSV header, in column order.
pub const CSV_HEADER: [&str; 8] = [
    "File Name",
    "Status",
    "Colors Used",
    "Total Colors Used",
    "Vertex Color",
    "Objective Value",
    "Time Taken",
    "Gap Percentage",
];

/// A destination for report records.
pub trait Reporter {
    /// Persist one record.
    fn report(&mut self, record: &ReportRecord) -> Result<(), ColoringError>;

    /// Short sink name for logs.
    fn name(&self) -> &'static str;
}

fn report_error(path: &Path, message: impl std::fmt::Display) -> ColoringError {
    ColoringError::Report {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

fn open_append(path: &Path) -> Result<File, ColoringError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| report_error(path, err))
}

fn format_float(value: Option<f64>) -> String {
    value.map_or_else(String::new, |value| value.to_string())
}

/// Appends one CSV row per record; writes the header only into an empty
/// file.
#[derive(Debug, Clone)]
pub struct CsvReporter {
    path: PathBuf,
}

impl CsvReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The CSV fields for `record`; inapplicable fields are empty.
    pub fn row(record: &ReportRecord) -> [String; 8] {
        [
            record.file_name.clone(),
            record.status.as_str().to_string(),
            record.colors_used_display().unwrap_or_default(),
            record
                .total_colors_used
                .map_or_else(String::new, |count| count.to_string()),
            record.vertex_color_display().unwrap_or_default(),
            format_float(record.objective_value),
            format_float(record.time_taken_seconds),
            format_float(record.gap_percent),
        ]
    }
}

impl Reporter for CsvReporter {
    fn report(&mut self, record: &ReportRecord) -> Result<(), ColoringError> {
        let file = open_append(&self.path)?;
        let is_empty = file
            .metadata()
            .map_err(|err| report_error(&self.path, err))?
            .len()
            == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_empty {
            writer
                .write_record(CSV_HEADER)
                .map_err(|err| report_error(&self.path, err))?;
        }
        writer
            .write_record(Self::row(record))
            .map_err(|err| report_error(&self.path, err))?;
        writer.flush().map_err(|err| report_error(&self.path, err))?;

        debug!(
            component = "report",
            operation = "write_csv",
            status = "success",
            path = %self.path.display(),
            file = %record.file_name,
            header_written = is_empty,
            "Appended CSV record"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}

/// Appends one JSON object per line.
#[derive(Debug, Clone)]
pub struct JsonLinesReporter {
    path: PathBuf,
}

impl JsonLinesReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Reporter for JsonLinesReporter {
    fn report(&mut self, record: &ReportRecord) -> Result<(), ColoringError> {
        let line = serde_json::to_string(record).map_err(|err| report_error(&self.path, err))?;
        let mut file = open_append(&self.path)?;
        writeln!(file, "{line}").map_err(|err| report_error(&self.path, err))?;
        file.flush().map_err(|err| report_error(&self.path, err))?;

        debug!(
            component = "report",
            operation = "write_jsonl",
            status = "success",
            path = %self.path.display(),
            file = %record.file_name,
            "Appended JSON record"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "jsonl"
    }
}

/// Writes one `<stem>_output.txt` summary per instance into a directory.
///
/// Instances sharing a stem within one run get `<stem>_output_2.txt`,
/// `<stem>_output_3.txt`, ... instead of overwriting each other.
#[derive(Debug, Clone)]
pub struct TextReporter {
    dir: PathBuf,
    seen: BTreeMap<String, usize>,
}

impl TextReporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            seen: BTreeMap::new(),
        }
    }

    fn stem(file_name: &str) -> String {
        Path::new(file_name)
            .file_stem()
            .map_or_else(|| file_name.to_string(), |stem| stem.to_string_lossy().into_owned())
    }

    /// Summary path for the first instance with this file name's stem.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(format!("{}_output.txt", Self::stem(file_name)))
    }

    /// Path for the next summary of `file_name` in this run.
    fn next_output_path(&mut self, file_name: &str) -> PathBuf {
        let stem = Self::stem(file_name);
        let count = self.seen.entry(stem.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            self.dir.join(format!("{stem}_output.txt"))
        } else {
            self.dir.join(format!("{stem}_output_{count}.txt"))
        }
    }

    /// The summary text for `record`.
    pub fn render(record: &ReportRecord) -> String {
        let mut lines = vec![
            format!("File Name: {}", record.file_name),
            format!("Status: {}", record.status),
        ];
        if let Some(colors) = record.colors_used_display() {
            lines.push(format!("Colors Used: {colors}"));
        }
        if let Some(total) = record.total_colors_used {
            lines.push(format!("Total Colors Used: {total}"));
        }
        if let Some(classes) = record.vertex_color_display() {
            lines.push(format!("Vertex Color: {classes}"));
        }
        if let Some(objective) = record.objective_value {
            lines.push(format!("Objective Value: {objective}"));
        }
        if let Some(seconds) = record.time_taken_seconds {
            lines.push(format!("Time Taken: {seconds:.3} seconds"));
        }
        if let Some(gap) = record.gap_percent {
            lines.push(format!("Gap Percentage: {gap}"));
        }
        if let Some(error) = &record.error {
            lines.push(format!("Error: {error}"));
        }
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}

impl Reporter for TextReporter {
    fn report(&mut self, record: &ReportRecord) -> Result<(), ColoringError> {
        std::fs::create_dir_all(&self.dir).map_err(|err| report_error(&self.dir, err))?;
        let path = self.next_output_path(&record.file_name);
        std::fs::write(&path, Self::render(record)).map_err(|err| report_error(&path, err))?;

        debug!(
            component = "report",
            operation = "write_text",
            status = "success",
            path = %path.display(),
            "Wrote text summary"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "text"
    }
}
