//! Error types for the coloring pipeline.

use crate::graph::VertexId;
use chromilp_core::ModelError;
use std::fmt;
use std::path::PathBuf;

/// What went wrong while reading an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A token that should be an integer is not.
    InvalidNumber,
    /// A record has the wrong number or shape of fields.
    MalformedRecord,
    /// A record needs a size declaration that has not been seen.
    MissingDeclaration,
    /// A second size declaration.
    DuplicateDeclaration,
    /// A size declaration after edge records.
    LateDeclaration,
    /// A vertex outside the declared range.
    VertexOutOfRange,
    /// A permitted color outside the palette.
    ColorOutsidePalette,
    /// A vertex given two permitted-color lists.
    DuplicateList,
}

impl ParseErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ParseErrorKind::InvalidNumber => "PARSE_INVALID_NUMBER",
            ParseErrorKind::MalformedRecord => "PARSE_MALFORMED_RECORD",
            ParseErrorKind::MissingDeclaration => "PARSE_MISSING_DECLARATION",
            ParseErrorKind::DuplicateDeclaration => "PARSE_DUPLICATE_DECLARATION",
            ParseErrorKind::LateDeclaration => "PARSE_LATE_DECLARATION",
            ParseErrorKind::VertexOutOfRange => "PARSE_VERTEX_OUT_OF_RANGE",
            ParseErrorKind::ColorOutsidePalette => "PARSE_COLOR_OUTSIDE_PALETTE",
            ParseErrorKind::DuplicateList => "PARSE_DUPLICATE_LIST",
        }
    }
}

/// A malformed or incomplete instance, located by line where possible.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// 1-based line number in the source text.
    pub line: Option<usize>,
    /// The offending line, trimmed.
    pub content: String,
    pub message: String,
}

impl ParseError {
    pub(crate) fn at(
        kind: ParseErrorKind,
        line: usize,
        content: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            line: Some(line),
            content: content.trim().to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn whole_file(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            line: None,
            content: String::new(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(
                f,
                "[{}] line {}: {} ({:?})",
                self.code(),
                line,
                self.message,
                self.content
            ),
            None => write!(f, "[{}] {}", self.code(), self.message),
        }
    }
}

impl std::error::Error for ParseError {}

/// Errors produced anywhere between reading an instance and writing its
/// report record.
#[derive(Debug)]
pub enum ColoringError {
    /// Instance text could not be parsed.
    Parse(ParseError),
    /// Reading an instance file failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A graph, palette or list constraint violates its invariants.
    InvalidInstance(String),
    /// The ILP model rejected an operation.
    Model(ModelError),
    /// The solver raised an error or returned a status that is neither a
    /// result nor a budget stop.
    SolverFault(String),
    /// A decoded vertex holds zero or several colors.
    InconsistentAssignment { vertex: VertexId, colors: usize },
    /// A report sink could not be written.
    Report { path: PathBuf, message: String },
    /// The batch manifest could not be read.
    Manifest { path: PathBuf, message: String },
}

impl ColoringError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ColoringError::Parse(err) => err.code(),
            ColoringError::Io { .. } => "IO_ERROR",
            ColoringError::InvalidInstance(_) => "INSTANCE_INVALID",
            ColoringError::Model(err) => err.code(),
            ColoringError::SolverFault(_) => "SOLVER_FAULT",
            ColoringError::InconsistentAssignment { .. } => "EXTRACT_INCONSISTENT_ASSIGNMENT",
            ColoringError::Report { .. } => "REPORT_WRITE_FAILED",
            ColoringError::Manifest { .. } => "MANIFEST_UNREADABLE",
        }
    }
}

impl fmt::Display for ColoringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColoringError::Parse(err) => write!(f, "{err}"),
            ColoringError::Io { path, source } => {
                write!(f, "[{}] {}: {}", self.code(), path.display(), source)
            }
            ColoringError::InvalidInstance(msg) => write!(f, "[{}] {}", self.code(), msg),
            ColoringError::Model(err) => write!(f, "{err}"),
            ColoringError::SolverFault(msg) => write!(f, "[{}] {}", self.code(), msg),
            ColoringError::InconsistentAssignment { vertex, colors } => write!(
                f,
                "[{}] vertex {} decoded with {} colors (expected exactly 1)",
                self.code(),
                vertex,
                colors
            ),
            ColoringError::Report { path, message } => {
                write!(f, "[{}] {}: {}", self.code(), path.display(), message)
            }
            ColoringError::Manifest { path, message } => {
                write!(f, "[{}] {}: {}", self.code(), path.display(), message)
            }
        }
    }
}

impl std::error::Error for ColoringError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ColoringError::Parse(err) => Some(err),
            ColoringError::Io { source, .. } => Some(source),
            ColoringError::Model(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for ColoringError {
    fn from(err: ParseError) -> Self {
        ColoringError::Parse(err)
    }
}

impl From<ModelError> for ColoringError {
    fn from(err: ModelError) -> Self {
        ColoringError::Model(err)
    }
}
