//! Solver Adapter
//!
//! The MILP/LP engine is an external collaborator behind the [`Backend`] trait. The
//! adapter hands it a [`Model`] plus [`SolverControls`] and gets back a [`RawSolution`]:
//! an optional primal vector and a [`SolveStatus`].

use std::{fmt, time::Duration};

use good_lp::ResolutionError;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::model::Model;

pub mod milp;

/// Solver Errors
#[derive(Debug, Error)]
pub enum SolverError {
    /// The solver produced no primal vector.
    ///
    /// The status code alone does not prove absence or presence of a solution, so it
    /// is reported alongside.
    #[error("No solution found by ILP solver! Status Code: {}", status.code())]
    NoSolutionFound {
        /// Status reported by the solver
        status: SolveStatus,
    },

    /// A status code outside the known enumeration.
    #[error("unknown solver status code: {0}")]
    UnknownStatusCode(i32),

    /// The primal vector does not have one value per column (this is a bug in the backend).
    #[error("solver returned {actual} values for {expected} columns")]
    SolutionLength {
        /// Number of model columns
        expected: usize,

        /// Number of values returned
        actual: usize,
    },

    /// A solver control has an unusable value.
    #[error("invalid solver control {name}: {value}")]
    InvalidControl {
        /// Control name
        name: &'static str,

        /// Rejected value
        value: f64,
    },

    /// Wrapped solver resolution error
    #[error(transparent)]
    ResolutionError(#[from] ResolutionError),
}

/// Outcome of the delegated solve, using the CBC secondary status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// Search completed with an optimal solution
    Optimal = 0,

    /// Linear relaxation not feasible (or worse than cutoff)
    RelaxationInfeasible = 1,

    /// Stopped on the allowable gap
    StoppedOnGap = 2,

    /// Stopped on the node limit
    StoppedOnNodes = 3,

    /// Stopped on the time limit
    StoppedOnTime = 4,

    /// Stopped on a user event
    StoppedOnUserEvent = 5,

    /// Stopped on the solution-count limit
    StoppedOnSolutions = 6,

    /// Linear relaxation unbounded
    RelaxationUnbounded = 7,

    /// Stopped on the iteration limit
    StoppedOnIterations = 8,
}

impl SolveStatus {
    /// Every status in code order
    pub const ALL: [Self; 9] = [
        Self::Optimal,
        Self::RelaxationInfeasible,
        Self::StoppedOnGap,
        Self::StoppedOnNodes,
        Self::StoppedOnTime,
        Self::StoppedOnUserEvent,
        Self::StoppedOnSolutions,
        Self::RelaxationUnbounded,
        Self::StoppedOnIterations,
    ];

    /// Integer code used for interop
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Whether the search completed
    pub fn is_optimal(self) -> bool {
        self == Self::Optimal
    }

    /// Whether the search was cut short by a limit or event, leaving an incumbent
    /// that may not be optimal.
    pub fn stopped_early(self) -> bool {
        matches!(
            self,
            Self::StoppedOnGap
                | Self::StoppedOnNodes
                | Self::StoppedOnTime
                | Self::StoppedOnUserEvent
                | Self::StoppedOnSolutions
                | Self::StoppedOnIterations
        )
    }
}

impl TryFrom<i32> for SolveStatus {
    type Error = SolverError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
            .ok_or(SolverError::UnknownStatusCode(code))
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Optimal => "optimal",
            Self::RelaxationInfeasible => "relaxation infeasible",
            Self::StoppedOnGap => "stopped on gap",
            Self::StoppedOnNodes => "stopped on node limit",
            Self::StoppedOnTime => "stopped on time",
            Self::StoppedOnUserEvent => "stopped on user event",
            Self::StoppedOnSolutions => "stopped on solution-count limit",
            Self::RelaxationUnbounded => "relaxation unbounded",
            Self::StoppedOnIterations => "stopped on iteration limit",
        };

        write!(f, "{label} ({})", self.code())
    }
}

impl Serialize for SolveStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.code())
    }
}

/// Controls forwarded opaquely to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverControls {
    /// Wall-clock budget; `None` is unbounded
    pub time_limit: Option<Duration>,

    /// Thread hint; `None` leaves the solver default
    pub threads: Option<u32>,

    /// Backend log verbosity, `0` is silent
    pub log_level: u32,

    /// Relative optimality gap at which an exact solve may stop; `None` solves to optimality
    pub allowable_fraction_gap: Option<f64>,

    /// Initial guess, one value per column
    pub hot_start: Vec<f64>,
}

impl SolverControls {
    /// Controls with no limits, silent logging and an all-zero hot start for
    /// `column_count` columns.
    pub fn unbounded(column_count: usize) -> Self {
        Self {
            time_limit: None,
            threads: None,
            log_level: 0,
            allowable_fraction_gap: None,
            hot_start: vec![0.0; column_count],
        }
    }
}

/// Primal values and status returned by a backend; consumed immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSolution {
    /// One value per column, or `None` when the solver produced no primal vector
    pub values: Option<Vec<f64>>,

    /// Status reported by the solver
    pub status: SolveStatus,
}

impl RawSolution {
    /// Take the primal vector, checking it has one value per model column.
    ///
    /// # Errors
    ///
    /// - [`SolverError::NoSolutionFound`] when there is no primal vector, whatever the status
    /// - [`SolverError::SolutionLength`] when the vector length differs from `columns`
    pub fn into_values(self, columns: usize) -> Result<Vec<f64>, SolverError> {
        let values = self.values.ok_or(SolverError::NoSolutionFound {
            status: self.status,
        })?;

        if values.len() != columns {
            return Err(SolverError::SolutionLength {
                expected: columns,
                actual: values.len(),
            });
        }

        Ok(values)
    }
}

/// External MILP/LP solve capability.
///
/// Implementations must build a fresh solver instance per call so no configuration
/// leaks between solves.
pub trait Backend {
    /// Short backend name for diagnostics
    fn name(&self) -> &'static str;

    /// Maximise `model` under `controls`.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the backend fails for a reason other than an
    /// infeasible or unbounded model; those are reported through [`RawSolution::status`]
    /// with no primal vector.
    fn solve(&self, model: &Model, controls: &SolverControls) -> Result<RawSolution, SolverError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn status_codes_round_trip_through_i32() -> TestResult {
        for (code, status) in (0..).zip(SolveStatus::ALL) {
            assert_eq!(status.code(), code);
            assert_eq!(SolveStatus::try_from(code)?, status);
        }

        Ok(())
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert!(matches!(
            SolveStatus::try_from(9),
            Err(SolverError::UnknownStatusCode(9))
        ));
        assert!(matches!(
            SolveStatus::try_from(-1),
            Err(SolverError::UnknownStatusCode(-1))
        ));
    }

    #[test]
    fn early_stops_exclude_optimal_and_infeasible() {
        assert!(SolveStatus::StoppedOnTime.stopped_early());
        assert!(SolveStatus::StoppedOnGap.stopped_early());
        assert!(!SolveStatus::Optimal.stopped_early());
        assert!(!SolveStatus::RelaxationInfeasible.stopped_early());
        assert!(!SolveStatus::RelaxationUnbounded.stopped_early());
        assert!(SolveStatus::Optimal.is_optimal());
    }

    #[test]
    fn display_includes_code() {
        assert_eq!(SolveStatus::StoppedOnTime.to_string(), "stopped on time (4)");
    }

    #[test]
    fn missing_primal_vector_is_no_solution_even_when_optimal() {
        let raw = RawSolution {
            values: None,
            status: SolveStatus::Optimal,
        };

        let err = raw.into_values(2).err();

        assert!(matches!(
            err,
            Some(SolverError::NoSolutionFound {
                status: SolveStatus::Optimal
            })
        ));
        assert_eq!(
            err.map(|e| e.to_string()).as_deref(),
            Some("No solution found by ILP solver! Status Code: 0")
        );
    }

    #[test]
    fn wrong_length_primal_vector_is_rejected() {
        let raw = RawSolution {
            values: Some(vec![1.0]),
            status: SolveStatus::Optimal,
        };

        assert!(matches!(
            raw.into_values(2),
            Err(SolverError::SolutionLength {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn unbounded_controls_zero_hot_start() {
        let controls = SolverControls::unbounded(3);

        assert_eq!(controls.hot_start.len(), 3);
        assert!(controls.hot_start.iter().all(|v| *v == 0.0));
        assert_eq!(controls.time_limit, None);
    }
}
