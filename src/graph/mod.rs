//! Precedence Graph
//!
//! Directed prerequisite relation over item indices. Input graphs are expected to be
//! acyclic, but cycles are accepted: items on a cycle can only be selected together.

use petgraph::{algo::is_cyclic_directed, graph::DiGraph};

mod edge;
mod error;

pub use edge::PrecedenceEdge;
pub use error::GraphError;

/// Validated set of precedence edges over `item_count` items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecedenceGraph {
    item_count: usize,
    edges: Vec<PrecedenceEdge>,
}

impl PrecedenceGraph {
    /// Build a graph over `item_count` items, checking every edge endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidEdgeIndex`] for the first edge with an endpoint
    /// outside `[0, item_count)`.
    pub fn new(item_count: usize, edges: Vec<PrecedenceEdge>) -> Result<Self, GraphError> {
        validate_edges(item_count, &edges)?;

        Ok(Self { item_count, edges })
    }

    /// Number of items the graph ranges over
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Edges in input order
    pub fn edges(&self) -> &[PrecedenceEdge] {
        &self.edges
    }

    /// Number of edges
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no edges
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Whether any chain of prerequisites leads back to where it started.
    ///
    /// Self-loops count as cycles.
    pub fn has_cycle(&self) -> bool {
        let mut graph = DiGraph::<(), ()>::with_capacity(self.item_count, self.edges.len());
        let nodes: Vec<_> = (0..self.item_count).map(|_| graph.add_node(())).collect();

        for edge in &self.edges {
            if let (Some(&dependent), Some(&prerequisite)) =
                (nodes.get(edge.dependent), nodes.get(edge.prerequisite))
            {
                graph.add_edge(dependent, prerequisite, ());
            }
        }

        is_cyclic_directed(&graph)
    }
}

/// Confirm every edge endpoint lies in `[0, item_count)`.
///
/// # Errors
///
/// Returns [`GraphError::InvalidEdgeIndex`] naming the first offending edge.
pub fn validate_edges(item_count: usize, edges: &[PrecedenceEdge]) -> Result<(), GraphError> {
    match edges
        .iter()
        .find(|edge| edge.dependent >= item_count || edge.prerequisite >= item_count)
    {
        Some(&edge) => Err(GraphError::out_of_range(edge, item_count)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn edges(pairs: &[(usize, usize)]) -> Vec<PrecedenceEdge> {
        pairs.iter().copied().map(PrecedenceEdge::from).collect()
    }

    #[test]
    fn accepts_edges_within_range() -> TestResult {
        let graph = PrecedenceGraph::new(3, edges(&[(0, 1), (1, 2)]))?;

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.item_count(), 3);
        assert_eq!(graph.edges().first(), Some(&PrecedenceEdge::new(0, 1)));

        Ok(())
    }

    #[test]
    fn rejects_dependent_out_of_range() {
        let result = PrecedenceGraph::new(2, edges(&[(2, 0)]));

        assert_eq!(
            result,
            Err(GraphError::InvalidEdgeIndex {
                dependent: 2,
                prerequisite: 0,
                item_count: 2,
            })
        );
    }

    #[test]
    fn rejects_prerequisite_out_of_range() {
        let result = PrecedenceGraph::new(2, edges(&[(0, 1), (1, 5)]));

        assert_eq!(
            result,
            Err(GraphError::InvalidEdgeIndex {
                dependent: 1,
                prerequisite: 5,
                item_count: 2,
            })
        );
    }

    #[test]
    fn any_edge_is_invalid_without_items() {
        assert!(PrecedenceGraph::new(0, edges(&[(0, 0)])).is_err());
        assert!(PrecedenceGraph::new(0, Vec::new()).is_ok());
    }

    #[test]
    fn error_message_names_edge_and_range() {
        let Err(err) = PrecedenceGraph::new(2, edges(&[(0, 2)])) else {
            unreachable!("edge (0, 2) is out of range for two items");
        };

        let message = err.to_string();

        assert!(message.contains("(0, 2)"));
        assert!(message.contains("[0, 2)"));
    }

    #[test]
    fn detects_cycles() -> TestResult {
        assert!(!PrecedenceGraph::new(3, edges(&[(0, 1), (1, 2), (0, 2)]))?.has_cycle());
        assert!(PrecedenceGraph::new(3, edges(&[(0, 1), (1, 2), (2, 0)]))?.has_cycle());
        assert!(PrecedenceGraph::new(1, edges(&[(0, 0)]))?.has_cycle());

        Ok(())
    }
}
