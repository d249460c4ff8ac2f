//! Graph errors

use thiserror::Error;

use crate::graph::PrecedenceEdge;

/// Errors that can occur when validating a precedence graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// An edge references an item outside `[0, item_count)`.
    ///
    /// Indices are signed so that negative indices read from untyped input can be reported too.
    #[error(
        "invalid edge index: edge ({dependent}, {prerequisite}) references an item outside the valid range [0, {item_count})"
    )]
    InvalidEdgeIndex {
        /// Index of the dependent item
        dependent: i64,

        /// Index of the prerequisite item
        prerequisite: i64,

        /// Number of items, the exclusive upper bound for indices
        item_count: usize,
    },
}

impl GraphError {
    /// Error for a signed edge that has an endpoint outside `[0, item_count)`.
    pub fn invalid_edge(dependent: i64, prerequisite: i64, item_count: usize) -> Self {
        Self::InvalidEdgeIndex {
            dependent,
            prerequisite,
            item_count,
        }
    }

    /// Error for an edge that has an endpoint outside `[0, item_count)`.
    pub fn out_of_range(edge: PrecedenceEdge, item_count: usize) -> Self {
        Self::invalid_edge(
            i64::try_from(edge.dependent).unwrap_or(i64::MAX),
            i64::try_from(edge.prerequisite).unwrap_or(i64::MAX),
            item_count,
        )
    }
}
