//! Undirected graphs, color palettes and list-coloring constraints.

use crate::error::ColoringError;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Vertex identifier as written in instance files.
pub type VertexId = u32;
/// Color label as written in instance files.
pub type Color = u32;

/// Simple undirected graph.
///
/// Edges are stored as `(min, max)` and mirrored into a per-vertex adjacency
/// set, so adjacency queries ignore orientation. Vertex order is the order of
/// first appearance and only matters for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    vertices: Vec<VertexId>,
    positions: HashMap<VertexId, usize>,
    edges: BTreeSet<(VertexId, VertexId)>,
    adjacency: BTreeMap<VertexId, BTreeSet<VertexId>>,
}

impl Graph {
    /// Build a graph from vertices and edges.
    ///
    /// Duplicate vertices and duplicate or reversed edges collapse. Every
    /// endpoint must be listed in `vertices`, and self-loops are rejected.
    pub fn from_edges<V, E>(vertices: V, edges: E) -> Result<Self, ColoringError>
    where
        V: IntoIterator<Item = VertexId>,
        E: IntoIterator<Item = (VertexId, VertexId)>,
    {
        let mut graph = Graph::default();
        for vertex in vertices {
            if !graph.positions.contains_key(&vertex) {
                graph.positions.insert(vertex, graph.vertices.len());
                graph.vertices.push(vertex);
                graph.adjacency.insert(vertex, BTreeSet::new());
            }
        }
        for (u, v) in edges {
            if u == v {
                return Err(ColoringError::InvalidInstance(format!(
                    "self-loop on vertex {u}"
                )));
            }
            for endpoint in [u, v] {
                if !graph.positions.contains_key(&endpoint) {
                    return Err(ColoringError::InvalidInstance(format!(
                        "edge ({u}, {v}) references unknown vertex {endpoint}"
                    )));
                }
            }
            graph.edges.insert((u.min(v), u.max(v)));
            graph.adjacency.entry(u).or_default().insert(v);
            graph.adjacency.entry(v).or_default().insert(u);
        }
        Ok(graph)
    }

    /// Vertices in order of first appearance.
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Normalized `(min, max)` edges in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.edges.iter().copied()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_vertex(&self, vertex: VertexId) -> bool {
        self.positions.contains_key(&vertex)
    }

    pub fn are_adjacent(&self, u: VertexId, v: VertexId) -> bool {
        self.edges.contains(&(u.min(v), u.max(v)))
    }

    /// Neighbors of `vertex` in ascending order; empty for unknown vertices.
    pub fn neighbors(&self, vertex: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.adjacency
            .get(&vertex)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn degree(&self, vertex: VertexId) -> usize {
        self.adjacency.get(&vertex).map_or(0, BTreeSet::len)
    }

    pub fn is_isolated(&self, vertex: VertexId) -> bool {
        self.degree(vertex) == 0
    }
}

/// Ordered list of distinct color labels.
///
/// Its length is the upper bound on the chromatic number the model may use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorPalette {
    colors: Vec<Color>,
}

impl ColorPalette {
    pub fn new(colors: Vec<Color>) -> Result<Self, ColoringError> {
        let mut seen = BTreeSet::new();
        for color in &colors {
            if !seen.insert(*color) {
                return Err(ColoringError::InvalidInstance(format!(
                    "color {color} appears twice in the palette"
                )));
            }
        }
        Ok(Self { colors })
    }

    /// Palette `first..=last`; empty when `last < first`.
    pub fn range(first: Color, last: Color) -> Self {
        Self {
            colors: (first..=last).collect(),
        }
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn contains(&self, color: Color) -> bool {
        self.colors.contains(&color)
    }
}

/// Per-vertex permitted colors for list coloring.
///
/// Vertices without an entry may take any palette color.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListColoringConstraint {
    permitted: BTreeMap<VertexId, BTreeSet<Color>>,
}

impl ListColoringConstraint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the permitted colors of `vertex`.
    ///
    /// Returns `false` and leaves the constraint untouched if `vertex`
    /// already has a list.
    pub fn permit<I>(&mut self, vertex: VertexId, colors: I) -> bool
    where
        I: IntoIterator<Item = Color>,
    {
        if self.permitted.contains_key(&vertex) {
            return false;
        }
        self.permitted.insert(vertex, colors.into_iter().collect());
        true
    }

    /// Permitted colors of `vertex`, or `None` if it is unconstrained.
    pub fn permitted(&self, vertex: VertexId) -> Option<&BTreeSet<Color>> {
        self.permitted.get(&vertex)
    }

    pub fn allows(&self, vertex: VertexId, color: Color) -> bool {
        self.permitted
            .get(&vertex)
            .is_none_or(|colors| colors.contains(&color))
    }

    pub fn iter(&self) -> impl Iterator<Item = (VertexId, &BTreeSet<Color>)> {
        self.permitted.iter().map(|(vertex, colors)| (*vertex, colors))
    }

    pub fn len(&self) -> usize {
        self.permitted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permitted.is_empty()
    }

    /// Check that every listed vertex is in `graph` and every listed color
    /// is in `palette`.
    pub fn validate(&self, graph: &Graph, palette: &ColorPalette) -> Result<(), ColoringError> {
        for (vertex, colors) in &self.permitted {
            if !graph.contains_vertex(*vertex) {
                return Err(ColoringError::InvalidInstance(format!(
                    "color list given for unknown vertex {vertex}"
                )));
            }
            if let Some(color) = colors.iter().find(|color| !palette.contains(**color)) {
                return Err(ColoringError::InvalidInstance(format!(
                    "vertex {vertex} permits color {color} outside the palette"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Graph {
        Graph::from_edges([1, 2, 3, 4], [(1, 2), (2, 3), (3, 4), (4, 1)]).unwrap()
    }

    #[test]
    fn test_edges_are_normalized_and_deduplicated() {
        let graph = Graph::from_edges([1, 2, 3], [(2, 1), (1, 2), (3, 2)]).unwrap();
        assert_eq!(graph.edges().collect::<Vec<_>>(), vec![(1, 2), (2, 3)]);
        assert_eq!(graph.num_edges(), 2);
        assert!(graph.are_adjacent(2, 1));
        assert!(graph.are_adjacent(1, 2));
        assert!(!graph.are_adjacent(1, 3));
    }

    #[test]
    fn test_vertices_keep_first_appearance_order() {
        let graph = Graph::from_edges([5, 2, 5, 9], []).unwrap();
        assert_eq!(graph.vertices(), &[5, 2, 9]);
        assert!(graph.contains_vertex(9));
        assert!(!graph.contains_vertex(1));
    }

    #[test]
    fn test_adjacency_and_degree() {
        let graph = square();
        assert_eq!(graph.neighbors(1).collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(graph.degree(3), 2);
        assert!(!graph.is_isolated(3));
        assert_eq!(graph.neighbors(42).count(), 0);
        assert!(graph.is_isolated(42));
    }

    #[test]
    fn test_rejects_unknown_endpoint_and_self_loop() {
        assert!(matches!(
            Graph::from_edges([1, 2], [(1, 3)]),
            Err(ColoringError::InvalidInstance(_))
        ));
        assert!(matches!(
            Graph::from_edges([1], [(1, 1)]),
            Err(ColoringError::InvalidInstance(_))
        ));
    }

    #[test]
    fn test_palette_rejects_duplicates() {
        assert!(ColorPalette::new(vec![1, 2, 1]).is_err());
        let palette = ColorPalette::new(vec![3, 1, 2]).unwrap();
        assert_eq!(palette.colors(), &[3, 1, 2]);
        assert!(palette.contains(1));
    }

    #[test]
    fn test_palette_range() {
        assert_eq!(ColorPalette::range(1, 3).colors(), &[1, 2, 3]);
        assert_eq!(ColorPalette::range(0, 2).colors(), &[0, 1, 2]);
        assert!(ColorPalette::range(1, 0).is_empty());
    }

    #[test]
    fn test_list_constraint_permits_once() {
        let mut list = ListColoringConstraint::new();
        assert!(list.permit(0, [2, 1, 2]));
        assert!(!list.permit(0, [3]));
        assert_eq!(
            list.permitted(0).unwrap().iter().copied().collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert!(list.allows(0, 1));
        assert!(!list.allows(0, 3));
        assert!(list.allows(7, 3));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_list_constraint_validation() {
        let graph = Graph::from_edges([0, 1], [(0, 1)]).unwrap();
        let palette = ColorPalette::range(1, 2);

        let mut ok = ListColoringConstraint::new();
        ok.permit(0, [1]);
        ok.permit(1, []);
        assert!(ok.validate(&graph, &palette).is_ok());

        let mut bad_color = ListColoringConstraint::new();
        bad_color.permit(0, [5]);
        assert!(bad_color.validate(&graph, &palette).is_err());

        let mut bad_vertex = ListColoringConstraint::new();
        bad_vertex.permit(9, [1]);
        assert!(bad_vertex.validate(&graph, &palette).is_err());
    }
}
