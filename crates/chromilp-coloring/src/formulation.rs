//! Binary ILP formulation of (list) graph coloring.
//!
//! Variables: `assign[v,c]` for each vertex and each of its candidate
//! colors, `used[c]` for each palette color. Rows:
//!
//! - `assign[v]`: each vertex takes exactly one candidate color.
//! - `conflict[u,v,c]`: adjacent vertices never share `c`, and sharing
//!   anything at all forces `used[c]`.
//! - `link[v,c]`: an isolated vertex may only take a used color.
//! - `order[c]` (optional): used colors form a prefix of the palette.
//!
//! Objective: minimize the number of used colors.

use crate::error::ColoringError;
use crate::graph::{Color, ColorPalette, Graph, ListColoringConstraint, VertexId};
use chromilp_core::{Bounds, Model, Variable};
use chromilp_expr::{Expr, VariableId};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// Options for [`build`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormulationOptions {
    /// Add `used[c_i] >= used[c_{i+1}]` rows. Only applied without list
    /// constraints.
    pub symmetry_breaking: bool,
}

impl FormulationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symmetry_breaking(mut self, enabled: bool) -> Self {
        self.symmetry_breaking = enabled;
        self
    }
}

/// A coloring model together with the meaning of each of its variables.
#[derive(Debug, Clone)]
pub struct ColoringModel {
    model: Model,
    vertices: Vec<VertexId>,
    used: Vec<(Color, VariableId)>,
    candidates: BTreeMap<VertexId, Vec<(Color, VariableId)>>,
}

impl ColoringModel {
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Vertices in graph order.
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// `used[c]` variables in palette order.
    pub fn used_vars(&self) -> &[(Color, VariableId)] {
        &self.used
    }

    /// `assign[v,c]` variables of `vertex` in palette order.
    pub fn candidates(&self, vertex: VertexId) -> &[(Color, VariableId)] {
        self.candidates.get(&vertex).map_or(&[][..], Vec::as_slice)
    }

    pub fn assign_var(&self, vertex: VertexId, color: Color) -> Option<VariableId> {
        self.candidates(vertex)
            .iter()
            .find(|(candidate, _)| *candidate == color)
            .map(|(_, var)| *var)
    }

    pub fn used_var(&self, color: Color) -> Option<VariableId> {
        self.used
            .iter()
            .find(|(candidate, _)| *candidate == color)
            .map(|(_, var)| *var)
    }

    /// Whether some vertex has no candidate color, which makes the model
    /// infeasible by construction.
    pub fn has_uncolorable_vertex(&self) -> bool {
        self.vertices
            .iter()
            .any(|vertex| self.candidates(*vertex).is_empty())
    }

    pub fn into_model(self) -> Model {
        self.model
    }
}

/// Build the coloring model for `graph` over `palette`.
///
/// With `list`, each vertex's candidates are its permitted colors (in
/// palette order); vertices without a list take the whole palette.
pub fn build(
    graph: &Graph,
    palette: &ColorPalette,
    list: Option<&ListColoringConstraint>,
    options: &FormulationOptions,
) -> Result<ColoringModel, ColoringError> {
    if let Some(list) = list {
        list.validate(graph, palette)?;
    }

    let mut model = Model::new();

    let mut used = Vec::with_capacity(palette.len());
    for color in palette.colors() {
        let var = model.add_variable(Variable::binary())?;
        model.set_variable_name(var, format!("used[{color}]"))?;
        used.push((*color, var));
    }

    let mut candidates: BTreeMap<VertexId, Vec<(Color, VariableId)>> = BTreeMap::new();
    for vertex in graph.vertices() {
        let mut vars = Vec::new();
        for color in palette.colors() {
            if list.is_some_and(|list| !list.allows(*vertex, *color)) {
                continue;
            }
            let var = model.add_variable(Variable::binary())?;
            model.set_variable_name(var, format!("assign[{vertex},{color}]"))?;
            vars.push((*color, var));
        }
        if vars.is_empty() {
            warn!(
                component = "formulation",
                operation = "build",
                status = "warn",
                vertex = *vertex,
                "Vertex has no candidate color; model is infeasible"
            );
        }
        candidates.insert(*vertex, vars);
    }

    // assign[v]: sum_c assign[v,c] == 1. An empty row stays, so a vertex
    // without candidates makes the model infeasible.
    for vertex in graph.vertices() {
        let vars = candidates.get(vertex).map_or(&[][..], Vec::as_slice);
        let expr = Expr::sum(vars.iter().map(|(_, var)| *var));
        let row = model.add_expr_constraint(expr, Bounds::fixed(1.0))?;
        model.set_constraint_name(row, format!("assign[{vertex}]"))?;
    }

    let lookup = |vertex: VertexId, color: Color| -> Option<VariableId> {
        candidates
            .get(&vertex)?
            .iter()
            .find(|(candidate, _)| *candidate == color)
            .map(|(_, var)| *var)
    };

    // conflict[u,v,c]: assign[u,c] + assign[v,c] - used[c] <= 0
    let mut conflict_rows = 0usize;
    for (u, v) in graph.edges() {
        for (color, used_var) in &used {
            let terms: Vec<VariableId> = [lookup(u, *color), lookup(v, *color)]
                .into_iter()
                .flatten()
                .collect();
            if terms.is_empty() {
                continue;
            }
            let expr = Expr::sum(terms).with_term(*used_var, -1.0);
            let row = model.add_expr_constraint(expr, Bounds::at_most(0.0))?;
            model.set_constraint_name(row, format!("conflict[{u},{v},{color}]"))?;
            conflict_rows += 1;
            trace!(
                component = "formulation",
                operation = "add_conflict",
                status = "success",
                u,
                v,
                color = *color,
                "Added conflict row"
            );
        }
    }

    // link[v,c]: assign[v,c] - used[c] <= 0 where no edge does the linking.
    let mut link_rows = 0usize;
    for vertex in graph.vertices().iter().filter(|v| graph.is_isolated(**v)) {
        for (color, assign_var) in candidates.get(vertex).map_or(&[][..], Vec::as_slice) {
            let Some(used_var) = used
                .iter()
                .find(|(candidate, _)| candidate == color)
                .map(|(_, var)| *var)
            else {
                continue;
            };
            let expr = Expr::var(*assign_var).with_term(used_var, -1.0);
            let row = model.add_expr_constraint(expr, Bounds::at_most(0.0))?;
            model.set_constraint_name(row, format!("link[{vertex},{color}]"))?;
            link_rows += 1;
        }
    }

    let mut order_rows = 0usize;
    if options.symmetry_breaking {
        if list.is_some() {
            warn!(
                component = "formulation",
                operation = "build",
                status = "warn",
                "Symmetry breaking ignored for list-constrained instance"
            );
        } else {
            // order[c]: used[c_i] - used[c_{i+1}] >= 0
            for pair in used.windows(2) {
                let [(color, first), (_, second)] = pair else {
                    continue;
                };
                let expr = Expr::var(*first).with_term(*second, -1.0);
                let row = model.add_expr_constraint(expr, Bounds::at_least(0.0))?;
                model.set_constraint_name(row, format!("order[{color}]"))?;
                order_rows += 1;
            }
        }
    }

    model.minimize(Expr::sum(used.iter().map(|(_, var)| *var)))?;

    debug!(
        component = "formulation",
        operation = "build",
        status = "success",
        vertices = graph.num_vertices(),
        edges = graph.num_edges(),
        colors = palette.len(),
        variables = model.num_variables(),
        constraints = model.num_constraints(),
        conflict_rows,
        link_rows,
        order_rows,
        list_constrained = list.is_some(),
        "Built coloring model"
    );

    Ok(ColoringModel {
        model,
        vertices: graph.vertices().to_vec(),
        used,
        candidates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (Graph, ColorPalette) {
        let graph = Graph::from_edges([1, 2, 3], [(1, 2), (2, 3), (1, 3)]).unwrap();
        (graph, ColorPalette::range(1, 3))
    }

    #[test]
    fn test_variable_counts() {
        let (graph, palette) = triangle();
        let coloring = build(&graph, &palette, None, &FormulationOptions::new()).unwrap();
        let model = coloring.model();
        // 3 used + 3 * 3 assign
        assert_eq!(model.num_variables(), 12);
        // 3 assign rows + 3 edges * 3 colors
        assert_eq!(model.num_constraints(), 12);
        assert!(model.variables().all(|(_, var)| var.is_binary()));
        assert_eq!(coloring.used_vars().len(), 3);
        assert_eq!(coloring.candidates(2).len(), 3);
        assert!(!coloring.has_uncolorable_vertex());
    }

    #[test]
    fn test_names() {
        let (graph, palette) = triangle();
        let coloring = build(&graph, &palette, None, &FormulationOptions::new()).unwrap();
        let model = coloring.model();
        assert_eq!(
            model.variable_by_name("used[2]"),
            coloring.used_var(2)
        );
        assert_eq!(
            model.variable_by_name("assign[3,1]"),
            coloring.assign_var(3, 1)
        );
        assert!(model.variable_by_name("assign[4,1]").is_none());
    }

    #[test]
    fn test_conflict_row_shape() {
        let graph = Graph::from_edges([1, 2], [(2, 1)]).unwrap();
        let palette = ColorPalette::range(1, 1);
        let coloring = build(&graph, &palette, None, &FormulationOptions::new()).unwrap();
        let model = coloring.model();
        let rows = model.rows();
        // assign[1], assign[2], conflict[1,2,1]
        assert_eq!(rows.len(), 3);
        let conflict = &rows[2];
        let used = coloring.used_var(1).unwrap();
        let a1 = coloring.assign_var(1, 1).unwrap();
        let a2 = coloring.assign_var(2, 1).unwrap();
        assert!(conflict.contains(&(a1, 1.0)));
        assert!(conflict.contains(&(a2, 1.0)));
        assert!(conflict.contains(&(used, -1.0)));
    }

    #[test]
    fn test_isolated_vertices_get_link_rows() {
        let graph = Graph::from_edges([7], []).unwrap();
        let palette = ColorPalette::range(1, 2);
        let coloring = build(&graph, &palette, None, &FormulationOptions::new()).unwrap();
        // assign[7] + link[7,1] + link[7,2]
        assert_eq!(coloring.model().num_constraints(), 3);
    }

    #[test]
    fn test_list_restricts_candidates() {
        let graph = Graph::from_edges([0, 1], [(0, 1)]).unwrap();
        let palette = ColorPalette::range(1, 3);
        let mut list = ListColoringConstraint::new();
        list.permit(0, [3]);
        list.permit(1, []);
        let coloring = build(&graph, &palette, Some(&list), &FormulationOptions::new()).unwrap();

        assert_eq!(coloring.candidates(0).len(), 1);
        assert!(coloring.assign_var(0, 3).is_some());
        assert!(coloring.assign_var(0, 1).is_none());
        assert!(coloring.candidates(1).is_empty());
        assert!(coloring.has_uncolorable_vertex());

        // The empty assignment row for vertex 1 is kept.
        let rows = coloring.model().rows();
        assert!(rows.iter().any(Vec::is_empty));
        // Only color 3 has a candidate on the edge.
        let conflict_rows = rows.len() - 2;
        assert_eq!(conflict_rows, 1);
    }

    #[test]
    fn test_list_outside_palette_is_rejected() {
        let graph = Graph::from_edges([0], []).unwrap();
        let palette = ColorPalette::range(1, 2);
        let mut list = ListColoringConstraint::new();
        list.permit(0, [9]);
        let err = build(&graph, &palette, Some(&list), &FormulationOptions::new()).unwrap_err();
        assert_eq!(err.code(), "INSTANCE_INVALID");
    }

    #[test]
    fn test_symmetry_breaking_rows() {
        let (graph, palette) = triangle();
        let options = FormulationOptions::new().with_symmetry_breaking(true);
        let coloring = build(&graph, &palette, None, &options).unwrap();
        assert_eq!(coloring.model().num_constraints(), 14);
        assert!(coloring.model().constraint_by_name("order[1]").is_some());
        assert!(coloring.model().constraint_by_name("order[3]").is_none());

        let list = ListColoringConstraint::new();
        let coloring = build(&graph, &palette, Some(&list), &options).unwrap();
        assert_eq!(coloring.model().num_constraints(), 12);
    }

    #[test]
    fn test_objective_counts_used_colors() {
        let (graph, palette) = triangle();
        let coloring = build(&graph, &palette, None, &FormulationOptions::new()).unwrap();
        let objective = coloring.model().objective();
        assert_eq!(objective.sense, Some(chromilp_core::Sense::Minimize));
        assert_eq!(objective.terms.len(), 3);
        for (var, coeff) in &objective.terms {
            assert!(coloring.used_vars().iter().any(|(_, used)| used == var));
            assert_eq!(*coeff, 1.0);
        }
    }
}
