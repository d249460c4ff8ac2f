//! Model Builder
//!
//! Sparse linear formulation of a [`Problem`]:
//!
//! - maximise `Σ profit_i · x_i`
//! - one row per edge `(d, p)`: `x_p - x_d ∈ [0, +∞)`
//! - one capacity row: `Σ weight_i · x_i ∈ [0, capacity]`
//! - `x_i ∈ [0, 1]`, integer unless the model is a relaxation
//!
//! For 0/1 assignments the rows are exact: a vector satisfies them if and only if it is
//! precedence-feasible and within budget.

use smallvec::{SmallVec, smallvec};

use crate::{graph::PrecedenceEdge, items::Item, problem::Problem};

/// Sparse row entries, `(column, coefficient)`. Precedence rows have exactly two.
pub type RowEntries = SmallVec<[(usize, f64); 2]>;

/// Whether columns are integer-constrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Integrality {
    /// Every column is integer; the solve is exact.
    Integer,

    /// Columns are continuous; the solve is the LP relaxation.
    #[default]
    Relaxed,
}

impl Integrality {
    /// Pick the integrality for the `lp_relax` flag of the functional interface.
    pub fn from_lp_relax(lp_relax: bool) -> Self {
        if lp_relax {
            Self::Relaxed
        } else {
            Self::Integer
        }
    }
}

/// Inclusive bounds of a column or row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Lower bound, possibly `-∞`
    pub lower: f64,

    /// Upper bound, possibly `+∞`
    pub upper: f64,
}

impl Bounds {
    /// Bounds of a selection variable, `[0, 1]`.
    pub const UNIT: Self = Self {
        lower: 0.0,
        upper: 1.0,
    };

    /// Whether `value` lies inside the bounds, allowing `tolerance` on either side.
    pub fn contains(&self, value: f64, tolerance: f64) -> bool {
        value >= self.lower - tolerance && value <= self.upper + tolerance
    }
}

/// What a row encodes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowKind {
    /// `x_prerequisite - x_dependent ≥ 0`
    Precedence(PrecedenceEdge),

    /// `Σ weight_i · x_i ≤ capacity`
    Capacity,
}

/// One sparse constraint row with its bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    kind: RowKind,
    entries: RowEntries,
    bounds: Bounds,
}

impl Row {
    /// What the row encodes
    pub fn kind(&self) -> RowKind {
        self.kind
    }

    /// Non-zero `(column, coefficient)` entries
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Row bounds
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Row activity `Σ a_j · x_j` for a primal vector.
    ///
    /// Columns missing from `x` contribute zero.
    pub fn activity(&self, x: &[f64]) -> f64 {
        self.entries
            .iter()
            .map(|&(col, coeff)| coeff * x.get(col).copied().unwrap_or(0.0))
            .sum()
    }
}

/// Linear formulation of a precedence-constrained knapsack; the objective is always
/// maximised.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    objective: Vec<f64>,
    column_bounds: Vec<Bounds>,
    integrality: Integrality,
    rows: Vec<Row>,
}

impl Model {
    /// Build the formulation for `problem`.
    pub fn build(problem: &Problem, integrality: Integrality) -> Self {
        let edges = problem.graph().edges();

        let objective: Vec<f64> = problem.items().iter().map(Item::profit).collect();

        let mut rows = Vec::with_capacity(edges.len() + 1);

        rows.extend(edges.iter().map(|&edge| precedence_row(edge)));

        // Zero weights stay out of the sparse row; they do not change its activity.
        let capacity_entries: RowEntries = problem
            .items()
            .iter()
            .enumerate()
            .filter(|(_, item)| item.weight() != 0.0)
            .map(|(col, item)| (col, item.weight()))
            .collect();

        rows.push(Row {
            kind: RowKind::Capacity,
            entries: capacity_entries,
            bounds: Bounds {
                lower: 0.0,
                upper: problem.capacity(),
            },
        });

        Self {
            column_bounds: vec![Bounds::UNIT; objective.len()],
            objective,
            integrality,
            rows,
        }
    }

    /// Objective coefficient per column
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    /// Bounds per column
    pub fn column_bounds(&self) -> &[Bounds] {
        &self.column_bounds
    }

    /// Whether the columns are integer-constrained
    pub fn integrality(&self) -> Integrality {
        self.integrality
    }

    /// Whether column `col` must take an integer value
    pub fn is_integer(&self, col: usize) -> bool {
        col < self.column_count() && self.integrality == Integrality::Integer
    }

    /// Constraint rows: precedence rows in edge order, then the capacity row.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of columns (items)
    pub fn column_count(&self) -> usize {
        self.objective.len()
    }

    /// Number of rows (edges + 1)
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of stored non-zero matrix entries
    pub fn non_zeros(&self) -> usize {
        self.rows.iter().map(|row| row.entries.len()).sum()
    }

    /// Objective value of a primal vector
    pub fn objective_value(&self, x: &[f64]) -> f64 {
        self.objective
            .iter()
            .zip(x)
            .map(|(coeff, value)| coeff * value)
            .sum()
    }

    /// Whether `x` satisfies every row and column bound within `tolerance`.
    pub fn is_satisfied_by(&self, x: &[f64], tolerance: f64) -> bool {
        x.len() == self.column_count()
            && self
                .column_bounds
                .iter()
                .zip(x)
                .all(|(bounds, &value)| bounds.contains(value, tolerance))
            && self
                .rows
                .iter()
                .all(|row| row.bounds.contains(row.activity(x), tolerance))
    }
}

fn precedence_row(edge: PrecedenceEdge) -> Row {
    // A self-loop cancels out to an empty row, which is trivially satisfied.
    let entries: RowEntries = if edge.dependent == edge.prerequisite {
        SmallVec::new()
    } else {
        smallvec![(edge.prerequisite, 1.0), (edge.dependent, -1.0)]
    };

    Row {
        kind: RowKind::Precedence(edge),
        entries,
        bounds: Bounds {
            lower: 0.0,
            upper: f64::INFINITY,
        },
    }
}
