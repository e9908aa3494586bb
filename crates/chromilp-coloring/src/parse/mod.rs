//! Instance parsers.
//!
//! Two dialects are understood: the plain/DIMACS-style `p`/`e` format and
//! the list-coloring format introduced by an `n=<k>` line. Both are read
//! line by line and keyed on the record marker; fields are whitespace
//! tokens, never fixed offsets (except the 4-digit `e` form, which is
//! recognized explicitly).

mod dimacs;
mod list;

use crate::error::{ColoringError, ParseError, ParseErrorKind};
use crate::graph::{ColorPalette, Graph, ListColoringConstraint, VertexId};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Which instance dialect to read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    /// List dialect if any line starts with `n=`, plain otherwise.
    #[default]
    Auto,
    /// `p`/`e` records.
    Dimacs,
    /// `n=`, `e` and `vertex: colors` records.
    List,
}

/// Palette numbering for the list dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListPaletteConvention {
    /// Colors `1..=k-1` for `n=k`.
    #[default]
    OneBased,
    /// Colors `0..=k-1` for `n=k`.
    ZeroBased,
}

/// Options controlling how an instance is read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub dialect: Dialect,
    pub list_palette: ListPaletteConvention,
    /// Leading lines to skip unconditionally.
    pub header_lines: usize,
    /// Vertex appended to auto-detected plain instances (those without a
    /// `p` line), even when no edge mentions it.
    pub declared_vertices: Option<VertexId>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_list_palette(mut self, convention: ListPaletteConvention) -> Self {
        self.list_palette = convention;
        self
    }

    pub fn with_header_lines(mut self, lines: usize) -> Self {
        self.header_lines = lines;
        self
    }

    pub fn with_declared_vertices(mut self, vertex: VertexId) -> Self {
        self.declared_vertices = Some(vertex);
        self
    }
}

/// A parsed instance: the graph, its palette and the optional lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub graph: Graph,
    pub palette: ColorPalette,
    pub list: Option<ListColoringConstraint>,
}

/// Pick the dialect for `text` when [`Dialect::Auto`] is requested.
pub fn detect_dialect(text: &str) -> Dialect {
    if text.lines().any(|line| line.trim_start().starts_with("n=")) {
        Dialect::List
    } else {
        Dialect::Dimacs
    }
}

/// Parse instance text.
pub fn parse_str(text: &str, options: &ParseOptions) -> Result<Instance, ColoringError> {
    let dialect = match options.dialect {
        Dialect::Auto => detect_dialect(text),
        forced => forced,
    };
    // Line numbers stay 1-based positions in the original text.
    let lines = text
        .lines()
        .enumerate()
        .skip(options.header_lines)
        .map(|(idx, line)| (idx + 1, line));

    let instance = match dialect {
        Dialect::List => list::parse(lines, options)?,
        Dialect::Dimacs | Dialect::Auto => dimacs::parse(lines, options)?,
    };

    debug!(
        component = "parser",
        operation = "parse",
        status = "success",
        dialect = ?dialect,
        vertices = instance.graph.num_vertices(),
        edges = instance.graph.num_edges(),
        colors = instance.palette.len(),
        lists = instance.list.as_ref().map_or(0, ListColoringConstraint::len),
        "Parsed instance"
    );
    Ok(instance)
}

/// Read and parse an instance file.
pub fn parse_file(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Instance, ColoringError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ColoringError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&text, options)
}

/// Parse one numeric token, naming the line on failure.
pub(crate) fn parse_number<T: FromStr>(
    token: &str,
    line_no: usize,
    line: &str,
    what: &str,
) -> Result<T, ParseError> {
    token.trim().parse().map_err(|_| {
        ParseError::at(
            ParseErrorKind::InvalidNumber,
            line_no,
            line,
            format!("{what} {token:?} is not a non-negative integer"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_dialect() {
        assert_eq!(detect_dialect("n=3\ne 0 1\n"), Dialect::List);
        assert_eq!(detect_dialect("c hi\n  n=3\n"), Dialect::List);
        assert_eq!(detect_dialect("p edge 3 1\ne 1 2\n"), Dialect::Dimacs);
        assert_eq!(detect_dialect(""), Dialect::Dimacs);
    }

    #[test]
    fn test_forced_dialect_overrides_detection() {
        let options = ParseOptions::new().with_dialect(Dialect::Dimacs);
        // `n=` is an unknown marker to the plain reader.
        let instance = parse_str("n=3\ne 1 2\n", &options).unwrap();
        assert!(instance.list.is_none());
        assert_eq!(instance.graph.num_edges(), 1);
    }

    #[test]
    fn test_header_lines_keep_original_line_numbers() {
        let options = ParseOptions::new().with_header_lines(2);
        let err = parse_str("garbage\nmore garbage\ne 1 x\n", &options).unwrap_err();
        match err {
            ColoringError::Parse(parse) => {
                assert_eq!(parse.kind, ParseErrorKind::InvalidNumber);
                assert_eq!(parse.line, Some(3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = "p edge 4 4\ne 1 2\ne 2 3\ne 3 4\ne 4 1\n";
        let options = ParseOptions::new();
        assert_eq!(
            parse_str(text, &options).unwrap(),
            parse_str(text, &options).unwrap()
        );
        let list_text = "n=3\ne 0 1\n0: 1\t2\n";
        assert_eq!(
            parse_str(list_text, &options).unwrap(),
            parse_str(list_text, &options).unwrap()
        );
    }

    #[test]
    fn test_parse_file_reports_missing_path() {
        let err = parse_file("/nonexistent/chromilp/graph.col", &ParseOptions::new()).unwrap_err();
        assert_eq!(err.code(), "IO_ERROR");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number::<u32>("12", 1, "e 12 3", "endpoint").unwrap(), 12);
        let err = parse_number::<u32>("-1", 4, "e -1 3", "endpoint").unwrap_err();
        assert_eq!(err.line, Some(4));
        assert_eq!(err.kind, ParseErrorKind::InvalidNumber);
    }
}
