//! Plain/DIMACS-style reader: `c` comments, one optional `p` line, `e`
//! records.

use super::{Instance, ParseOptions, parse_number};
use crate::error::{ColoringError, ParseError, ParseErrorKind};
use crate::graph::{ColorPalette, Graph, VertexId};
use tracing::{trace, warn};

pub(super) fn parse<'a, I>(lines: I, options: &ParseOptions) -> Result<Instance, ColoringError>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut declared: Option<VertexId> = None;
    let mut observed: Vec<VertexId> = Vec::new();
    let mut edges: Vec<(VertexId, VertexId)> = Vec::new();
    let mut seen_edge = false;

    for (line_no, raw) in lines {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('c') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("p") => {
                if seen_edge {
                    return Err(ParseError::at(
                        ParseErrorKind::LateDeclaration,
                        line_no,
                        line,
                        "problem line after edge records",
                    )
                    .into());
                }
                if declared.is_some() {
                    return Err(ParseError::at(
                        ParseErrorKind::DuplicateDeclaration,
                        line_no,
                        line,
                        "second problem line",
                    )
                    .into());
                }
                let fields: Vec<&str> = tokens.collect();
                if !(2..=3).contains(&fields.len()) {
                    return Err(ParseError::at(
                        ParseErrorKind::MalformedRecord,
                        line_no,
                        line,
                        "expected `p <kind> <vertices> [<edges>]`",
                    )
                    .into());
                }
                let count: VertexId = parse_number(fields[1], line_no, line, "vertex count")?;
                if let Some(edge_count) = fields.get(2) {
                    parse_number::<usize>(edge_count, line_no, line, "edge count")?;
                }
                declared = Some(count);
            }
            Some("e") => {
                seen_edge = true;
                let fields: Vec<&str> = tokens.collect();
                let (u, v) = edge_endpoints(&fields, line_no, line)?;
                if let Some(count) = declared {
                    for endpoint in [u, v] {
                        if endpoint == 0 || endpoint > count {
                            return Err(ParseError::at(
                                ParseErrorKind::VertexOutOfRange,
                                line_no,
                                line,
                                format!("vertex {endpoint} outside 1..={count}"),
                            )
                            .into());
                        }
                    }
                } else {
                    observed.extend([u, v]);
                }
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
            }
            Some(marker) => {
                trace!(
                    component = "parser",
                    operation = "parse_line",
                    status = "skipped",
                    line = line_no,
                    marker,
                    "Ignoring unknown record"
                );
            }
            None => {}
        }
    }

    let (vertices, palette) = match declared {
        Some(count) => ((1..=count).collect::<Vec<_>>(), ColorPalette::range(1, count)),
        None => {
            if let Some(extra) = options.declared_vertices {
                observed.push(extra);
            }
            let max = observed.iter().copied().max().unwrap_or(0);
            (observed, ColorPalette::range(1, max))
        }
    };

    let graph = Graph::from_edges(vertices, edges)?;
    Ok(Instance {
        graph,
        palette,
        list: None,
    })
}

/// Endpoints from `e u v` or the fixed-width `e uuvv` form.
fn edge_endpoints(
    fields: &[&str],
    line_no: usize,
    line: &str,
) -> Result<(VertexId, VertexId), ParseError> {
    match fields {
        [u, v] => Ok((
            parse_number(u, line_no, line, "endpoint")?,
            parse_number(v, line_no, line, "endpoint")?,
        )),
        [packed] if packed.len() == 4 && packed.bytes().all(|b| b.is_ascii_digit()) => {
            let (u, v) = packed.split_at(2);
            Ok((
                parse_number(u, line_no, line, "endpoint")?,
                parse_number(v, line_no, line, "endpoint")?,
            ))
        }
        [_] => Err(ParseError::at(
            ParseErrorKind::InvalidNumber,
            line_no,
            line,
            "single edge field must be four digits",
        )),
        _ => Err(ParseError::at(
            ParseErrorKind::MalformedRecord,
            line_no,
            line,
            "expected `e <u> <v>`",
        )),
    }
}
