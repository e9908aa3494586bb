//! Decoding solver incumbents into colorings and report records.

use crate::driver::{ColoringStatus, SolveResult};
use crate::error::ColoringError;
use crate::formulation::ColoringModel;
use crate::graph::{Color, Graph, ListColoringConstraint, VertexId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Binary variables at or above this value count as set.
const ROUNDING_THRESHOLD: f64 = 0.5;

/// A vertex → color assignment and the colors it uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coloring {
    assignment: BTreeMap<VertexId, Color>,
    colors_used: Vec<Color>,
}

impl Coloring {
    pub fn color_of(&self, vertex: VertexId) -> Option<Color> {
        self.assignment.get(&vertex).copied()
    }

    pub fn assignment(&self) -> &BTreeMap<VertexId, Color> {
        &self.assignment
    }

    /// Colors whose `used` variable is set, in palette order.
    pub fn colors_used(&self) -> &[Color] {
        &self.colors_used
    }

    pub fn num_colors_used(&self) -> usize {
        self.colors_used.len()
    }

    /// Color classes: each color with its vertices in ascending order.
    pub fn by_color(&self) -> BTreeMap<Color, Vec<VertexId>> {
        let mut classes: BTreeMap<Color, Vec<VertexId>> = BTreeMap::new();
        for (vertex, color) in &self.assignment {
            classes.entry(*color).or_default().push(*vertex);
        }
        classes
    }

    /// No edge joins two vertices of the same color.
    pub fn is_proper(&self, graph: &Graph) -> bool {
        graph
            .edges()
            .all(|(u, v)| match (self.color_of(u), self.color_of(v)) {
                (Some(cu), Some(cv)) => cu != cv,
                _ => false,
            })
    }

    /// Every listed vertex got one of its permitted colors.
    pub fn respects(&self, list: &ListColoringConstraint) -> bool {
        self.assignment
            .iter()
            .all(|(vertex, color)| list.allows(*vertex, *color))
    }
}

/// Read a coloring out of primal values indexed by `VariableId::index()`.
///
/// A vertex with zero or several set `assign` variables is an
/// [`ColoringError::InconsistentAssignment`].
pub fn decode(coloring_model: &ColoringModel, values: &[f64]) -> Result<Coloring, ColoringError> {
    let is_set = |index: usize| values.get(index).is_some_and(|value| *value >= ROUNDING_THRESHOLD);

    let mut assignment = BTreeMap::new();
    for vertex in coloring_model.vertices() {
        let chosen: Vec<Color> = coloring_model
            .candidates(*vertex)
            .iter()
            .filter(|(_, var)| is_set(var.index()))
            .map(|(color, _)| *color)
            .collect();
        match chosen.as_slice() {
            [color] => {
                assignment.insert(*vertex, *color);
            }
            _ => {
                return Err(ColoringError::InconsistentAssignment {
                    vertex: *vertex,
                    colors: chosen.len(),
                });
            }
        }
    }

    let colors_used = coloring_model
        .used_vars()
        .iter()
        .filter(|(_, var)| is_set(var.index()))
        .map(|(color, _)| *color)
        .collect();

    Ok(Coloring {
        assignment,
        colors_used,
    })
}

/// Status column of a report record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordStatus {
    Optimal,
    FeasibleSuboptimal,
    Infeasible,
    TimeLimitNoIncumbent,
    /// The instance could not be parsed, solved or decoded.
    Failed,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Optimal => ColoringStatus::Optimal.as_str(),
            RecordStatus::FeasibleSuboptimal => ColoringStatus::FeasibleSuboptimal.as_str(),
            RecordStatus::Infeasible => ColoringStatus::Infeasible.as_str(),
            RecordStatus::TimeLimitNoIncumbent => ColoringStatus::TimeLimitNoIncumbent.as_str(),
            RecordStatus::Failed => "failed",
        }
    }
}

impl From<ColoringStatus> for RecordStatus {
    fn from(status: ColoringStatus) -> Self {
        match status {
            ColoringStatus::Optimal => RecordStatus::Optimal,
            ColoringStatus::FeasibleSuboptimal => RecordStatus::FeasibleSuboptimal,
            ColoringStatus::Infeasible => RecordStatus::Infeasible,
            ColoringStatus::TimeLimitNoIncumbent => RecordStatus::TimeLimitNoIncumbent,
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the run report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRecord {
    pub file_name: String,
    pub status: RecordStatus,
    pub colors_used: Option<Vec<Color>>,
    pub total_colors_used: Option<usize>,
    pub vertex_color: Option<BTreeMap<VertexId, Color>>,
    pub objective_value: Option<f64>,
    pub time_taken_seconds: Option<f64>,
    pub gap_percent: Option<f64>,
    pub error: Option<String>,
}

impl ReportRecord {
    /// A record carrying only the file name and status.
    pub fn bare(file_name: impl Into<String>, status: RecordStatus) -> Self {
        Self {
            file_name: file_name.into(),
            status,
            colors_used: None,
            total_colors_used: None,
            vertex_color: None,
            objective_value: None,
            time_taken_seconds: None,
            gap_percent: None,
            error: None,
        }
    }

    /// A record for an instance that failed before producing a result.
    pub fn failed(file_name: impl Into<String>, error: &ColoringError) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::bare(file_name, RecordStatus::Failed)
        }
    }

    /// Color classes rendered as `{1: [1, 3], 2: [2, 4]}`.
    pub fn vertex_color_display(&self) -> Option<String> {
        let assignment = self.vertex_color.as_ref()?;
        let mut classes: BTreeMap<Color, Vec<VertexId>> = BTreeMap::new();
        for (vertex, color) in assignment {
            classes.entry(*color).or_default().push(*vertex);
        }
        let items: Vec<String> = classes
            .iter()
            .map(|(color, vertices)| format!("{color}: {}", list_display(vertices)))
            .collect();
        Some(format!("{{{}}}", items.join(", ")))
    }

    /// Colors used rendered as `[1, 2]`.
    pub fn colors_used_display(&self) -> Option<String> {
        self.colors_used.as_deref().map(list_display)
    }
}

fn list_display(values: &[u32]) -> String {
    let items: Vec<String> = values.iter().map(u32::to_string).collect();
    format!("[{}]", items.join(", "))
}

/// Turn a solve result into a report record for `file_name`.
pub fn extract(
    file_name: &str,
    coloring_model: &ColoringModel,
    result: &SolveResult,
) -> Result<ReportRecord, ColoringError> {
    if !result.has_incumbent() {
        debug!(
            component = "extract",
            operation = "extract",
            status = "success",
            file = file_name,
            result = result.status.as_str(),
            "No incumbent to decode"
        );
        return Ok(ReportRecord::bare(file_name, result.status.into()));
    }

    let values = result.assignment.as_deref().ok_or_else(|| {
        ColoringError::SolverFault(format!(
            "{} result has no variable assignment",
            result.status
        ))
    })?;
    let coloring = decode(coloring_model, values)?;

    if let Some(objective) = result.objective_value {
        if (objective - coloring.num_colors_used() as f64).abs() > ROUNDING_THRESHOLD {
            warn!(
                component = "extract",
                operation = "extract",
                status = "warn",
                file = file_name,
                objective,
                colors_used = coloring.num_colors_used(),
                "Objective disagrees with decoded color count"
            );
        }
    }

    debug!(
        component = "extract",
        operation = "extract",
        status = "success",
        file = file_name,
        result = result.status.as_str(),
        colors_used = coloring.num_colors_used(),
        "Decoded coloring"
    );

    Ok(ReportRecord {
        file_name: file_name.to_string(),
        status: result.status.into(),
        total_colors_used: Some(coloring.num_colors_used()),
        colors_used: Some(coloring.colors_used),
        vertex_color: Some(coloring.assignment),
        objective_value: result.objective_value,
        time_taken_seconds: Some(result.elapsed_seconds()),
        gap_percent: result.gap_percent,
        error: None,
    })
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::formulation::{FormulationOptions, build};
    use crate::graph::ColorPalette;
    use std::time::Duration;

    fn path_model() -> (Graph, ColoringModel) {
        let graph = Graph::from_edges([1, 2, 3], [(1, 2), (2, 3)]).unwrap();
        let model = build(&graph, &ColorPalette::range(1, 3), None, &FormulationOptions::new())
            .unwrap();
        (graph, model)
    }

    /// Primal values colouring `1 -> 1, 2 -> 2, 3 -> 1`.
    fn alternating(model: &ColoringModel) -> Vec<f64> {
        let mut values = vec![0.0; model.model().num_variables()];
        for (vertex, color) in [(1, 1), (2, 2), (3, 1)] {
            values[model.assign_var(vertex, color).unwrap().index()] = 1.0;
        }
        for color in [1, 2] {
            values[model.used_var(color).unwrap().index()] = 0.999_999;
        }
        values
    }

    fn result(status: ColoringStatus, assignment: Option<Vec<f64>>) -> SolveResult {
        SolveResult {
            status,
            objective_value: assignment.as_ref().map(|_| 2.0),
            best_bound: Some(2.0),
            assignment,
            elapsed: Duration::from_millis(1500),
            gap_percent: Some(0.0),
        }
    }

    #[test]
    fn test_decode_alternating() {
        let (graph, model) = path_model();
        let coloring = decode(&model, &alternating(&model)).unwrap();
        assert_eq!(coloring.color_of(1), Some(1));
        assert_eq!(coloring.color_of(2), Some(2));
        assert_eq!(coloring.colors_used(), &[1, 2]);
        assert!(coloring.is_proper(&graph));
        assert_eq!(coloring.by_color()[&1], vec![1, 3]);
    }

    #[test]
    fn test_decode_rejects_double_and_missing_colors() {
        let (_, model) = path_model();
        let mut values = alternating(&model);
        values[model.assign_var(2, 3).unwrap().index()] = 0.7;
        assert!(matches!(
            decode(&model, &values),
            Err(ColoringError::InconsistentAssignment { vertex: 2, colors: 2 })
        ));

        let mut values = alternating(&model);
        values[model.assign_var(3, 1).unwrap().index()] = 0.2;
        assert!(matches!(
            decode(&model, &values),
            Err(ColoringError::InconsistentAssignment { vertex: 3, colors: 0 })
        ));
    }

    #[test]
    fn test_improper_coloring_detected() {
        let (graph, model) = path_model();
        let mut values = alternating(&model);
        values[model.assign_var(2, 2).unwrap().index()] = 0.0;
        values[model.assign_var(2, 1).unwrap().index()] = 1.0;
        let coloring = decode(&model, &values).unwrap();
        assert!(!coloring.is_proper(&graph));
    }

    #[test]
    fn test_respects_lists() {
        let (_, model) = path_model();
        let coloring = decode(&model, &alternating(&model)).unwrap();
        let mut list = ListColoringConstraint::new();
        list.permit(2, [2, 3]);
        assert!(coloring.respects(&list));
        let mut strict = ListColoringConstraint::new();
        strict.permit(1, [3]);
        assert!(!coloring.respects(&strict));
    }

    #[test]
    fn test_extract_full_record() {
        let (_, model) = path_model();
        let solved = result(ColoringStatus::Optimal, Some(alternating(&model)));
        let record = extract("path.col", &model, &solved).unwrap();
        assert_eq!(record.status, RecordStatus::Optimal);
        assert_eq!(record.total_colors_used, Some(2));
        assert_eq!(record.objective_value, Some(2.0));
        assert_eq!(record.time_taken_seconds, Some(1.5));
        assert_eq!(record.colors_used_display().as_deref(), Some("[1, 2]"));
        assert_eq!(
            record.vertex_color_display().as_deref(),
            Some("{1: [1, 3], 2: [2]}")
        );
    }

    #[test]
    fn test_extract_bare_record() {
        let (_, model) = path_model();
        let record = extract(
            "path.col",
            &model,
            &result(ColoringStatus::TimeLimitNoIncumbent, None),
        )
        .unwrap();
        assert_eq!(record, ReportRecord::bare("path.col", RecordStatus::TimeLimitNoIncumbent));
        assert!(record.vertex_color_display().is_none());
    }

    #[test]
    fn test_vertex_color_display_groups_by_color() {
        let mut record = ReportRecord::bare("g.col", RecordStatus::Optimal);
        record.vertex_color = Some(BTreeMap::from([(4, 2), (1, 1), (3, 1), (2, 2), (5, 3)]));
        assert_eq!(
            record.vertex_color_display().as_deref(),
            Some("{1: [1, 3], 2: [2, 4], 3: [5]}")
        );
        record.vertex_color = Some(BTreeMap::new());
        assert_eq!(record.vertex_color_display().as_deref(), Some("{}"));
    }

    #[test]
    fn test_failed_record() {
        let err = ColoringError::SolverFault("boom".to_string());
        let record = ReportRecord::failed("bad.col", &err);
        assert_eq!(record.status, RecordStatus::Failed);
        assert_eq!(record.error.as_deref(), Some("[SOLVER_FAULT] boom"));
        assert_eq!(record.status.to_string(), "failed");
    }
}
