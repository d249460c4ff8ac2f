//! Precedence Knapsack prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    fixtures::{FixtureError, Instance},
    graph::{GraphError, PrecedenceEdge, PrecedenceGraph},
    items::Item,
    knapsack::{
        KnapsackError, KnapsackSolution, KnapsackSolver, RepairPolicy, SolveOptions, solve,
    },
    model::{Integrality, Model},
    problem::{Problem, ProblemError},
    repair::RepairReport,
    solvers::{Backend, RawSolution, SolveStatus, SolverControls, SolverError, milp::MilpBackend},
};
