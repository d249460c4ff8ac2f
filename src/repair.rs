//! Precedence Repair
//!
//! Clears every selected item whose prerequisite is not selected, scanning all edges
//! until a scan clears nothing. Each scan other than the last deselects at least one
//! item, and the unselected prerequisite behind the first deselection is never cleared,
//! so at most `n - 1` items are cleared. Together with the confirming scan that makes at
//! most `n` scans for `n >= 1`, cyclic edge sets included.

use tracing::trace;

use crate::graph::PrecedenceEdge;

/// What a repair pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Full scans over the edge list, including the final one that changed nothing
    pub scans: usize,

    /// Items deselected across all scans
    pub deselected: usize,
}

impl RepairReport {
    /// Whether the selection was already precedence-feasible.
    pub fn was_noop(&self) -> bool {
        self.deselected == 0
    }
}

/// Repair `selection` in place until no edge is violated.
pub fn repair(selection: &mut [bool], edges: &[PrecedenceEdge]) -> RepairReport {
    let mut report = RepairReport::default();

    loop {
        let mut reset = 0_usize;

        for edge in edges {
            let prerequisite = selection.get(edge.prerequisite).copied().unwrap_or(false);

            if let Some(dependent) = selection.get_mut(edge.dependent)
                && *dependent
                && !prerequisite
            {
                *dependent = false;
                reset += 1;
            }
        }

        report.scans += 1;
        report.deselected += reset;

        trace!(scan = report.scans, deselected = reset, "repair scan");

        if reset == 0 {
            return report;
        }
    }
}

/// Edges violated by `selection`, in edge order.
pub fn violations<'a>(
    selection: &'a [bool],
    edges: &'a [PrecedenceEdge],
) -> impl Iterator<Item = &'a PrecedenceEdge> + 'a {
    edges.iter().filter(|edge| edge.is_violated_by(selection))
}
