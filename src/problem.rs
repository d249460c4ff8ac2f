//! Knapsack Problem
//!
//! Validated input for a precedence-constrained knapsack solve. Every check here
//! runs before any solver interaction.

use thiserror::Error;

use crate::{
    graph::{GraphError, PrecedenceEdge, PrecedenceGraph},
    items::Item,
};

/// Errors raised while validating problem input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProblemError {
    /// `profit` and `weight` have different lengths.
    #[error(
        "weight and profit vectors must be the same length. weight: size={weight} profit: size={profit}"
    )]
    LengthMismatch {
        /// Length of the profit vector
        profit: usize,

        /// Length of the weight vector
        weight: usize,
    },

    /// An edge references an item that does not exist.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Capacity is negative or NaN.
    #[error("capacity must be a non-negative number, got {0}")]
    InvalidCapacity(f64),

    /// A profit or weight cannot be loaded as a solver coefficient.
    #[error("{field} of item {index} is not finite")]
    NonFiniteCoefficient {
        /// Item index
        index: usize,

        /// Either `"profit"` or `"weight"`
        field: &'static str,
    },
}

/// Items, precedence graph and capacity of one knapsack instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    items: Vec<Item>,
    graph: PrecedenceGraph,
    capacity: f64,
}

impl Problem {
    /// Validate and bundle the problem input.
    ///
    /// # Errors
    ///
    /// - [`ProblemError::LengthMismatch`] if `profit` and `weight` differ in length
    /// - [`ProblemError::Graph`] if an edge endpoint is outside `[0, n)`
    /// - [`ProblemError::InvalidCapacity`] if `capacity` is negative or NaN
    /// - [`ProblemError::NonFiniteCoefficient`] if a profit or weight is NaN or infinite
    pub fn new(
        profit: &[f64],
        weight: &[f64],
        edges: &[(usize, usize)],
        capacity: f64,
    ) -> Result<Self, ProblemError> {
        check_lengths(profit, weight)?;

        let edges = edges.iter().copied().map(PrecedenceEdge::from).collect();
        let graph = PrecedenceGraph::new(profit.len(), edges)?;

        // An infinite capacity is a valid "no budget" instance; only NaN and negatives are rejected.
        if capacity.is_nan() || capacity < 0.0 {
            return Err(ProblemError::InvalidCapacity(capacity));
        }

        let items = profit
            .iter()
            .zip(weight)
            .enumerate()
            .map(|(index, (&profit, &weight))| {
                if !profit.is_finite() {
                    return Err(ProblemError::NonFiniteCoefficient {
                        index,
                        field: "profit",
                    });
                }

                if !weight.is_finite() {
                    return Err(ProblemError::NonFiniteCoefficient {
                        index,
                        field: "weight",
                    });
                }

                Ok(Item::new(profit, weight))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            items,
            graph,
            capacity,
        })
    }

    /// Items in index order
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Item at `index`, if any
    pub fn item(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the problem has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Precedence graph over the items
    pub fn graph(&self) -> &PrecedenceGraph {
        &self.graph
    }

    /// Maximum total weight of the selection
    pub fn capacity(&self) -> f64 {
        self.capacity
    }
}

/// Confirm `profit` and `weight` describe the same number of items.
///
/// # Errors
///
/// Returns [`ProblemError::LengthMismatch`] with both lengths otherwise.
pub fn check_lengths(profit: &[f64], weight: &[f64]) -> Result<(), ProblemError> {
    if profit.len() == weight.len() {
        Ok(())
    } else {
        Err(ProblemError::LengthMismatch {
            profit: profit.len(),
            weight: weight.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn builds_items_from_parallel_vectors() -> TestResult {
        let problem = Problem::new(&[10.0, 5.0], &[1.0, 2.0], &[(0, 1)], 3.0)?;

        assert_eq!(problem.len(), 2);
        assert_eq!(problem.item(1), Some(&Item::new(5.0, 2.0)));
        assert_eq!(problem.graph().len(), 1);

        Ok(())
    }

    #[test]
    fn length_mismatch_reports_both_lengths() {
        let result = Problem::new(&[1.0, 2.0, 3.0], &[1.0, 2.0], &[], 1.0);

        assert_eq!(
            result,
            Err(ProblemError::LengthMismatch {
                profit: 3,
                weight: 2
            })
        );

        let message = ProblemError::LengthMismatch {
            profit: 3,
            weight: 2,
        }
        .to_string();

        assert!(message.contains("weight: size=2"));
        assert!(message.contains("profit: size=3"));
    }

    #[test]
    fn length_mismatch_is_reported_before_edge_errors() {
        let result = Problem::new(&[1.0], &[1.0, 2.0], &[(9, 9)], 1.0);

        assert!(matches!(result, Err(ProblemError::LengthMismatch { .. })));
    }

    #[test]
    fn invalid_edge_is_wrapped() {
        let result = Problem::new(&[1.0, 2.0], &[1.0, 1.0], &[(0, 2)], 1.0);

        assert!(matches!(
            result,
            Err(ProblemError::Graph(GraphError::InvalidEdgeIndex { .. }))
        ));
    }

    #[test]
    fn rejects_negative_and_nan_capacity() {
        assert!(matches!(
            Problem::new(&[1.0], &[1.0], &[], -1.0),
            Err(ProblemError::InvalidCapacity(_))
        ));
        assert!(matches!(
            Problem::new(&[1.0], &[1.0], &[], f64::NAN),
            Err(ProblemError::InvalidCapacity(_))
        ));
        assert!(Problem::new(&[1.0], &[1.0], &[], f64::INFINITY).is_ok());
    }

    #[test]
    fn rejects_non_finite_coefficients() {
        let result = Problem::new(&[1.0, f64::NAN], &[1.0, 1.0], &[], 1.0);

        assert_eq!(
            result,
            Err(ProblemError::NonFiniteCoefficient {
                index: 1,
                field: "profit"
            })
        );

        let result = Problem::new(&[1.0], &[f64::INFINITY], &[], 1.0);

        assert_eq!(
            result,
            Err(ProblemError::NonFiniteCoefficient {
                index: 0,
                field: "weight"
            })
        );
    }
}
