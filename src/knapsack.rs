//! Precedence-Constrained Knapsack
//!
//! Validation → model → delegated solve → rounding → repair → result. One call builds
//! one model and performs one solve; nothing is shared between calls.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{Span, debug, warn};

use crate::{
    graph::GraphError,
    model::{Integrality, Model},
    problem::{Problem, ProblemError},
    repair::repair,
    rounding::round,
    solvers::{Backend, SolveStatus, SolverControls, SolverError, milp::MilpBackend},
};

/// Relative tolerance on the capacity when checking a returned selection.
pub const CAPACITY_TOLERANCE: f64 = 1e-9;

/// Knapsack Errors
#[derive(Debug, Error)]
pub enum KnapsackError {
    /// Input validation failed; raised before any solver interaction.
    #[error(transparent)]
    Problem(#[from] ProblemError),

    /// The delegated solve failed or produced no solution.
    #[error(transparent)]
    Solver(#[from] SolverError),
}

impl KnapsackError {
    /// Whether the profit and weight vectors had different lengths
    pub fn is_length_mismatch(&self) -> bool {
        matches!(self, Self::Problem(ProblemError::LengthMismatch { .. }))
    }

    /// Whether an edge referenced an item outside `[0, n)`
    pub fn is_invalid_edge_index(&self) -> bool {
        matches!(
            self,
            Self::Problem(ProblemError::Graph(GraphError::InvalidEdgeIndex { .. }))
        )
    }

    /// Whether the solver returned no primal vector
    pub fn is_no_solution(&self) -> bool {
        matches!(self, Self::Solver(SolverError::NoSolutionFound { .. }))
    }
}

/// When to run precedence repair on the rounded selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairPolicy {
    /// After every solve. A no-op whenever the selection is already feasible.
    #[default]
    Always,

    /// Only after an LP relaxation solve, trusting the exact solver's incumbent.
    RelaxationOnly,
}

impl RepairPolicy {
    /// Whether repair runs for a solve in the given mode
    pub fn applies(self, lp_relax: bool) -> bool {
        match self {
            Self::Always => true,
            Self::RelaxationOnly => lp_relax,
        }
    }
}

/// Solve options mirroring the functional interface.
///
/// Non-positive `max_seconds` and `num_threads` mean "no limit" and "solver default".
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolveOptions {
    /// Wall-clock budget in seconds
    pub max_seconds: f64,

    /// Thread hint for the solver
    pub num_threads: i32,

    /// Solver log verbosity
    pub log_level: i32,

    /// Relative gap at which an exact solve may stop early
    pub allowable_fraction_gap: f64,

    /// Solve the LP relaxation and round, instead of the exact integer program
    pub lp_relax: bool,

    /// When to run precedence repair
    pub repair: RepairPolicy,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            max_seconds: 0.0,
            num_threads: 0,
            log_level: 0,
            allowable_fraction_gap: 0.0,
            lp_relax: true,
            repair: RepairPolicy::default(),
        }
    }
}

impl SolveOptions {
    /// Set the wall-clock budget in seconds
    #[must_use]
    pub fn with_max_seconds(mut self, max_seconds: f64) -> Self {
        self.max_seconds = max_seconds;
        self
    }

    /// Set the solver thread hint
    #[must_use]
    pub fn with_num_threads(mut self, num_threads: i32) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// Set the solver log verbosity
    #[must_use]
    pub fn with_log_level(mut self, log_level: i32) -> Self {
        self.log_level = log_level;
        self
    }

    /// Set the allowable relative optimality gap
    #[must_use]
    pub fn with_allowable_fraction_gap(mut self, gap: f64) -> Self {
        self.allowable_fraction_gap = gap;
        self
    }

    /// Choose between the LP relaxation and the exact integer program
    #[must_use]
    pub fn with_lp_relax(mut self, lp_relax: bool) -> Self {
        self.lp_relax = lp_relax;
        self
    }

    /// Set the repair policy
    #[must_use]
    pub fn with_repair(mut self, repair: RepairPolicy) -> Self {
        self.repair = repair;
        self
    }

    /// Normalise the pass-through controls for a model with `column_count` columns.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::InvalidControl`] if the gap is negative or not finite.
    pub fn controls(&self, column_count: usize) -> Result<SolverControls, SolverError> {
        let gap = self.allowable_fraction_gap;

        if !gap.is_finite() || gap < 0.0 {
            return Err(SolverError::InvalidControl {
                name: "allowable_fraction_gap",
                value: gap,
            });
        }

        let time_limit = (self.max_seconds > 0.0)
            .then(|| Duration::try_from_secs_f64(self.max_seconds).ok())
            .flatten();

        Ok(SolverControls {
            time_limit,
            threads: u32::try_from(self.num_threads).ok().filter(|&t| t > 0),
            log_level: u32::try_from(self.log_level).unwrap_or(0),
            // The gap only lets branch-and-bound stop early; a relaxation has nothing to stop.
            allowable_fraction_gap: (!self.lp_relax && gap > 0.0).then_some(gap),
            hot_start: vec![0.0; column_count],
        })
    }
}

/// Final 0/1 selection paired with the solver status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnapsackSolution {
    selection: Vec<bool>,
    status: SolveStatus,
}

impl KnapsackSolution {
    /// Assemble a result; the status is carried without interpretation.
    pub fn new(selection: Vec<bool>, status: SolveStatus) -> Self {
        Self { selection, status }
    }

    /// Selection flag per item
    pub fn selection(&self) -> &[bool] {
        &self.selection
    }

    /// Selection as 0/1 integers
    pub fn to_binary(&self) -> Vec<u8> {
        self.selection.iter().map(|&selected| u8::from(selected)).collect()
    }

    /// Solver status
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// Solver status as its integer code
    pub fn status_code(&self) -> i32 {
        self.status.code()
    }

    /// Indices of selected items in ascending order
    pub fn selected_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.selection
            .iter()
            .enumerate()
            .filter_map(|(idx, &selected)| selected.then_some(idx))
    }

    /// Total profit of the selected items
    pub fn total_profit(&self, problem: &Problem) -> f64 {
        self.selected_indices()
            .filter_map(|idx| problem.item(idx))
            .map(crate::items::Item::profit)
            .sum()
    }

    /// Total weight of the selected items
    pub fn total_weight(&self, problem: &Problem) -> f64 {
        self.selected_indices()
            .filter_map(|idx| problem.item(idx))
            .map(crate::items::Item::weight)
            .sum()
    }

    /// Whether the selection is a valid answer for `problem`: no precedence edge is
    /// violated and the total weight stays within capacity.
    pub fn is_feasible(&self, problem: &Problem) -> bool {
        let capacity = problem.capacity();
        let slack = CAPACITY_TOLERANCE * capacity.abs().max(1.0);

        self.selection.len() == problem.len()
            && self.total_weight(problem) <= capacity + slack
            && !problem
                .graph()
                .edges()
                .iter()
                .any(|edge| edge.is_violated_by(&self.selection))
    }
}

/// Precedence-constrained knapsack solver over a [`Backend`].
#[derive(Debug, Default, Clone)]
pub struct KnapsackSolver<B = MilpBackend> {
    backend: B,
}

impl KnapsackSolver<MilpBackend> {
    /// Solver using the compile-time selected `good_lp` backend
    pub fn new() -> Self {
        Self::with_backend(MilpBackend)
    }
}

impl<B: Backend> KnapsackSolver<B> {
    /// Solver delegating to `backend`
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    /// The backend solves are delegated to
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Solve `problem`.
    ///
    /// Non-optimal status codes that still carry a primal vector (time limit, node
    /// limit, ...) are returned normally; the caller decides whether they are good enough.
    ///
    /// # Errors
    ///
    /// - [`SolverError::InvalidControl`] for an unusable gap
    /// - [`SolverError::NoSolutionFound`] if the backend returns no primal vector
    /// - any other [`SolverError`] raised by the backend
    #[tracing::instrument(
        name = "knapsack.solve",
        skip_all,
        fields(
            backend = self.backend.name(),
            items = problem.len(),
            edges = problem.graph().len(),
            lp_relax = options.lp_relax,
            status = tracing::field::Empty,
        )
    )]
    pub fn solve(
        &self,
        problem: &Problem,
        options: &SolveOptions,
    ) -> Result<KnapsackSolution, KnapsackError> {
        let controls = options.controls(problem.len())?;

        // Nothing to choose from: no constraint can be violated.
        if problem.is_empty() {
            Span::current().record("status", SolveStatus::Optimal.code());

            return Ok(KnapsackSolution::new(Vec::new(), SolveStatus::Optimal));
        }

        if problem.graph().has_cycle() {
            warn!("precedence graph contains a cycle; items on it can only be selected together");
        }

        let model = Model::build(problem, Integrality::from_lp_relax(options.lp_relax));

        let raw = self.backend.solve(&model, &controls)?;
        let status = raw.status;

        Span::current().record("status", status.code());

        let values = raw.into_values(model.column_count())?;

        let mut selection = round(&values, problem);

        if options.repair.applies(options.lp_relax) {
            let report = repair(&mut selection, problem.graph().edges());

            debug!(
                scans = report.scans,
                deselected = report.deselected,
                "precedence repair"
            );
        }

        Ok(KnapsackSolution::new(selection, status))
    }
}

/// Solve a precedence-constrained knapsack in one call.
///
/// `edges` are `(dependent, prerequisite)` pairs: `dependent` can only be selected
/// together with `prerequisite`.
///
/// # Errors
///
/// - [`ProblemError::LengthMismatch`] if `profit` and `weight` differ in length
/// - [`GraphError::InvalidEdgeIndex`] (wrapped) for an edge outside `[0, n)`
/// - [`SolverError::NoSolutionFound`] if the solver returns no primal vector
///
/// # Example
///
/// ```rust
/// use precedence_knapsack::knapsack::{SolveOptions, solve};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Item 0 requires item 1, and only one of them fits.
/// let options = SolveOptions::default().with_lp_relax(false);
/// let solution = solve(&[10.0, 5.0], &[1.0, 1.0], &[(0, 1)], 1.0, &options)?;
///
/// assert_eq!(solution.to_binary(), vec![0, 1]);
/// assert_eq!(solution.status_code(), 0);
/// # Ok(())
/// # }
/// ```
pub fn solve(
    profit: &[f64],
    weight: &[f64],
    edges: &[(usize, usize)],
    max_weight: f64,
    options: &SolveOptions,
) -> Result<KnapsackSolution, KnapsackError> {
    let problem = Problem::new(profit, weight, edges, max_weight)?;

    KnapsackSolver::new().solve(&problem, options)
}
