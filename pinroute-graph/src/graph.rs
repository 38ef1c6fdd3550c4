//! Directed neighbor graph over a borrowed location list

use std::collections::HashMap;
use std::fmt;

use crate::geo::distance_between;
use crate::model::Location;

/// Directed edge to another location, weighted by great-circle distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    target: usize,
    distance_km: f64,
}

impl Edge {
    /// Edge from `locations[from]` to `locations[to]`, weight recomputed from coordinates
    pub(crate) fn between(locations: &[Location], from: usize, to: usize) -> Self {
        Self {
            target: to,
            distance_km: distance_between(&locations[from], &locations[to]),
        }
    }

    /// Index of the destination location
    pub fn target(&self) -> usize {
        self.target
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }
}

/// Adjacency lists keyed by location position
///
/// Every location handed to the graph is a node, possibly without edges. The
/// graph is directed and not necessarily symmetric.
#[derive(Debug, Clone)]
pub struct Graph<'a> {
    locations: &'a [Location],
    adjacency: Vec<Vec<Edge>>,
    node_map: HashMap<&'a str, usize>,
}

impl<'a> Graph<'a> {
    /// Graph with every location registered and no edges
    pub fn new(locations: &'a [Location]) -> Self {
        let node_map = locations
            .iter()
            .enumerate()
            .map(|(idx, loc)| (loc.id(), idx))
            .collect();

        Self {
            locations,
            adjacency: vec![Vec::new(); locations.len()],
            node_map,
        }
    }

    /// Assemble a graph from per-location edge lists
    ///
    /// This is the single-threaded merge step after parallel neighbor search:
    /// `neighbor_lists[i]` becomes the outbound edges of `locations[i]`.
    pub(crate) fn from_neighbor_lists(locations: &'a [Location], neighbor_lists: Vec<Vec<Edge>>) -> Self {
        debug_assert_eq!(locations.len(), neighbor_lists.len());

        let mut graph = Self::new(locations);
        for (from, edges) in neighbor_lists.into_iter().enumerate() {
            graph.adjacency[from].extend(edges);
        }
        graph
    }

    /// Add a directed edge; the weight is the great-circle distance between the endpoints
    pub fn add_edge(&mut self, from: usize, to: usize) {
        let edge = Edge::between(self.locations, from, to);
        self.adjacency[from].push(edge);
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.node_map.get(id).copied()
    }

    pub fn location(&self, index: usize) -> &'a Location {
        &self.locations[index]
    }

    pub fn locations(&self) -> &'a [Location] {
        self.locations
    }

    /// Outbound edges of the node at `index`
    pub fn edges(&self, index: usize) -> &[Edge] {
        &self.adjacency[index]
    }

    /// Outbound edges of the node with `id`, if it exists
    pub fn edges_of(&self, id: &str) -> Option<&[Edge]> {
        self.index_of(id).map(|idx| self.edges(idx))
    }

    /// The edge from `from` to `to`, if the builder created one
    pub fn edge_between(&self, from: &str, to: &str) -> Option<&Edge> {
        let to = self.index_of(to)?;
        self.edges_of(from)?.iter().find(|edge| edge.target == to)
    }
}

impl fmt::Display for Graph<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Graph:")?;
        for (from, edges) in self.adjacency.iter().enumerate() {
            write!(f, "{} ->", self.locations[from].id())?;
            for (i, edge) in edges.iter().enumerate() {
                let sep = if i == 0 { " " } else { ", " };
                write!(
                    f,
                    "{sep}{}({:.3} km)",
                    self.locations[edge.target].id(),
                    edge.distance_km
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::haversine_distance;

    fn sample() -> Vec<Location> {
        vec![
            Location::new("a", 0.0, 0.0),
            Location::new("b", 0.0, 1.0),
            Location::new("c", 1.0, 0.0),
        ]
    }

    #[test]
    fn test_every_location_is_a_node() {
        let locations = sample();
        let graph = Graph::new(&locations);
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edge_count(), 0);
        for loc in &locations {
            assert!(graph.contains(loc.id()));
            assert_eq!(graph.edges_of(loc.id()), Some(&[][..]));
        }
        assert!(!graph.contains("missing"));
        assert_eq!(graph.edges_of("missing"), None);
    }

    #[test]
    fn test_edge_weight_is_recomputed_haversine() {
        let locations = sample();
        let mut graph = Graph::new(&locations);
        graph.add_edge(0, 1);

        let edge = graph.edge_between("a", "b").unwrap();
        assert_eq!(edge.target(), 1);
        assert_eq!(edge.distance_km(), haversine_distance(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_graph_is_directed() {
        let locations = sample();
        let mut graph = Graph::new(&locations);
        graph.add_edge(0, 2);

        assert!(graph.edge_between("a", "c").is_some());
        assert!(graph.edge_between("c", "a").is_none());
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_merge_from_neighbor_lists() {
        let locations = sample();
        let lists = vec![
            vec![Edge::between(&locations, 0, 1)],
            vec![],
            vec![Edge::between(&locations, 2, 0), Edge::between(&locations, 2, 1)],
        ];
        let graph = Graph::from_neighbor_lists(&locations, lists);
        assert_eq!(graph.edges(0).len(), 1);
        assert_eq!(graph.edges(1).len(), 0);
        assert_eq!(graph.edges(2).len(), 2);
    }

    #[test]
    fn test_display_lists_edges() {
        let locations = sample();
        let mut graph = Graph::new(&locations);
        graph.add_edge(0, 1);
        graph.add_edge(0, 2);

        let text = graph.to_string();
        assert!(text.starts_with("Graph:\n"));
        assert!(text.contains("a -> b(111.195 km), c(111.195 km)"));
        assert!(text.contains("b ->\n"));
    }
}
