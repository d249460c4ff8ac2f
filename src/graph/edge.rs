//! Precedence edges

use std::fmt;

use serde::{Deserialize, Serialize};

/// A precedence relation: `dependent` may only be selected when `prerequisite` is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct PrecedenceEdge {
    /// Index of the item that requires the prerequisite
    pub dependent: usize,

    /// Index of the item that must be selected first
    pub prerequisite: usize,
}

impl PrecedenceEdge {
    /// Creates an edge meaning `dependent` requires `prerequisite`.
    pub fn new(dependent: usize, prerequisite: usize) -> Self {
        Self {
            dependent,
            prerequisite,
        }
    }

    /// Whether the edge is violated by a 0/1 selection.
    ///
    /// Out-of-range indices read as unselected.
    pub fn is_violated_by(&self, selection: &[bool]) -> bool {
        let dependent = selection.get(self.dependent).copied().unwrap_or(false);
        let prerequisite = selection.get(self.prerequisite).copied().unwrap_or(false);

        dependent && !prerequisite
    }
}

impl From<(usize, usize)> for PrecedenceEdge {
    fn from((dependent, prerequisite): (usize, usize)) -> Self {
        Self::new(dependent, prerequisite)
    }
}

impl From<PrecedenceEdge> for (usize, usize) {
    fn from(edge: PrecedenceEdge) -> Self {
        (edge.dependent, edge.prerequisite)
    }
}

impl fmt::Display for PrecedenceEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.dependent, self.prerequisite)
    }
}
