//! Precedence Knapsack
//!
//! Precedence-constrained 0/1 knapsack solving on top of a MILP/LP backend. Each item has a
//! profit and a weight, edges say which items require which, and the selection must fit a
//! single capacity. Exact solves hand the integer program to the backend; relaxed solves
//! round the LP optimum and repair any broken prerequisites afterwards.

pub mod fixtures;
pub mod graph;
pub mod items;
pub mod knapsack;
pub mod model;
pub mod prelude;
pub mod problem;
pub mod repair;
pub mod rounding;
pub mod solvers;
