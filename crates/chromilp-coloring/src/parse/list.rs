//! List-coloring reader: an `n=<k>` declaration, `e u v` edges and
//! `vertex: c1<TAB>c2...` permitted-color lines.

use super::{Instance, ListPaletteConvention, ParseOptions, parse_number};
use crate::error::{ColoringError, ParseError, ParseErrorKind};
use crate::graph::{Color, ColorPalette, Graph, ListColoringConstraint, VertexId};
use tracing::{trace, warn};

struct Declaration {
    count: VertexId,
    palette: ColorPalette,
}

impl Declaration {
    fn vertex(&self, token: &str, line_no: usize, line: &str) -> Result<VertexId, ParseError> {
        let vertex: VertexId = parse_number(token, line_no, line, "vertex")?;
        if vertex >= self.count {
            return Err(ParseError::at(
                ParseErrorKind::VertexOutOfRange,
                line_no,
                line,
                format!("vertex {vertex} outside 0..{}", self.count),
            ));
        }
        Ok(vertex)
    }
}

fn palette_for(count: VertexId, convention: ListPaletteConvention) -> ColorPalette {
    let Some(last) = count.checked_sub(1) else {
        return ColorPalette::default();
    };
    match convention {
        ListPaletteConvention::OneBased => ColorPalette::range(1, last),
        ListPaletteConvention::ZeroBased => ColorPalette::range(0, last),
    }
}

fn require<'d>(
    declaration: &'d Option<Declaration>,
    line_no: usize,
    line: &str,
) -> Result<&'d Declaration, ParseError> {
    declaration.as_ref().ok_or_else(|| {
        ParseError::at(
            ParseErrorKind::MissingDeclaration,
            line_no,
            line,
            "record before the `n=` declaration",
        )
    })
}

pub(super) fn parse<'a, I>(lines: I, options: &ParseOptions) -> Result<Instance, ColoringError>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut declaration: Option<Declaration> = None;
    let mut edges: Vec<(VertexId, VertexId)> = Vec::new();
    let mut list = ListColoringConstraint::new();

    for (line_no, raw) in lines {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('c') {
            continue;
        }

        if let Some(count) = line.strip_prefix("n=") {
            if declaration.is_some() {
                return Err(ParseError::at(
                    ParseErrorKind::DuplicateDeclaration,
                    line_no,
                    line,
                    "second `n=` declaration",
                )
                .into());
            }
            let count: VertexId = parse_number(count, line_no, line, "vertex count")?;
            declaration = Some(Declaration {
                count,
                palette: palette_for(count, options.list_palette),
            });
        } else if let Some((lhs, rhs)) = line.split_once(':') {
            let decl = require(&declaration, line_no, line)?;
            let vertex = decl.vertex(lhs, line_no, line)?;
            let mut colors: Vec<Color> = Vec::new();
            for token in rhs.split_whitespace() {
                let color: Color = parse_number(token, line_no, line, "color")?;
                if !decl.palette.contains(color) {
                    return Err(ParseError::at(
                        ParseErrorKind::ColorOutsidePalette,
                        line_no,
                        line,
                        format!("color {color} is not in the palette"),
                    )
                    .into());
                }
                colors.push(color);
            }
            if !list.permit(vertex, colors) {
                return Err(ParseError::at(
                    ParseErrorKind::DuplicateList,
                    line_no,
                    line,
                    format!("vertex {vertex} already has a color list"),
                )
                .into());
            }
        } else if line.split_whitespace().next() == Some("e") {
            let decl = require(&declaration, line_no, line)?;
            let fields: Vec<&str> = line.split_whitespace().skip(1).collect();
            let [u, v] = fields.as_slice() else {
                return Err(ParseError::at(
                    ParseErrorKind::MalformedRecord,
                    line_no,
                    line,
                    "expected `e <u> <v>`",
                )
                .into());
            };
            let u = decl.vertex(u, line_no, line)?;
            let v = decl.vertex(v, line_no, line)?;
            if u == v {
                warn!(
                    component = "parser",
                    operation = "parse_edge",
                    status = "warn",
                    line = line_no,
                    vertex = u,
                    "Dropping self-loop"
                );
                continue;
            }
            edges.push((u, v));
        } else {
            trace!(
                component = "parser",
                operation = "parse_line",
                status = "skipped",
                line = line_no,
                "Ignoring unknown record"
            );
        }
    }

    let Some(Declaration { count, palette }) = declaration else {
        return Err(ParseError::whole_file(
            ParseErrorKind::MissingDeclaration,
            "list-coloring instance has no `n=` declaration",
        )
        .into());
    };

    let graph = Graph::from_edges(0..count, edges)?;
    Ok(Instance {
        graph,
        palette,
        list: Some(list),
    })
}
