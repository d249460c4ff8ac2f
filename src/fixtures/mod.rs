//! Fixtures
//!
//! Knapsack instances stored as YAML:
//!
//! ```yaml
//! profit: [10, 5]
//! weight: [1, 1]
//! edges: [[0, 1]]
//! max_weight: 1
//! options:
//!   lp_relax: false
//! expected:
//!   solution: [0, 1]
//!   status: 0
//! ```
//!
//! `edges` are `[dependent, prerequisite]` pairs. `options` and `expected` are optional.
//! Edge indices are read as signed integers so that a negative index is reported as an
//! invalid edge rather than a parse error.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::{
    graph::GraphError,
    knapsack::{KnapsackSolution, SolveOptions},
    problem::{Problem, ProblemError, check_lengths},
};

/// Directory the bundled instance sets live in
pub const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures");

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// The instance does not describe a valid problem
    #[error("Invalid instance: {0}")]
    Problem(#[from] ProblemError),
}

/// Known answer stored alongside an instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expected {
    /// 0/1 selection per item
    pub solution: Vec<u8>,

    /// Solver status code
    pub status: i32,
}

impl Expected {
    /// Whether `solution` matches this answer exactly
    pub fn matches(&self, solution: &KnapsackSolution) -> bool {
        self.solution == solution.to_binary() && self.status == solution.status_code()
    }
}

/// One knapsack instance as read from YAML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Instance {
    /// Profit per item
    pub profit: Vec<f64>,

    /// Weight per item
    pub weight: Vec<f64>,

    /// `(dependent, prerequisite)` pairs
    #[serde(default)]
    pub edges: Vec<(i64, i64)>,

    /// Capacity
    pub max_weight: f64,

    /// Solve options; anything omitted keeps its default
    #[serde(default)]
    pub options: SolveOptions,

    /// Known answer, if recorded
    #[serde(default)]
    pub expected: Option<Expected>,
}

impl Instance {
    /// Parse an instance from a YAML string
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or has unknown fields.
    pub fn from_yaml_str(contents: &str) -> Result<Self, FixtureError> {
        Ok(serde_norway::from_str(contents)?)
    }

    /// Load an instance from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Load a bundled instance by name, e.g. `"scenario_b"`
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture file cannot be read or parsed.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_path(Self::path_for(name))
    }

    /// Path of the bundled instance called `name`
    pub fn path_for(name: &str) -> PathBuf {
        Path::new(FIXTURES_DIR).join(format!("{name}.yml"))
    }

    /// Validate the instance into a [`Problem`]
    ///
    /// # Errors
    ///
    /// Returns an error if the vectors differ in length, an edge is out of range, or the
    /// capacity or a coefficient is unusable.
    pub fn problem(&self) -> Result<Problem, FixtureError> {
        check_lengths(&self.profit, &self.weight)?;

        let item_count = self.profit.len();
        let edges = self
            .edges
            .iter()
            .map(|&(dependent, prerequisite)| {
                match (usize::try_from(dependent), usize::try_from(prerequisite)) {
                    (Ok(dependent), Ok(prerequisite)) => Ok((dependent, prerequisite)),
                    _ => Err(GraphError::invalid_edge(dependent, prerequisite, item_count)),
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(ProblemError::from)?;

        Ok(Problem::new(
            &self.profit,
            &self.weight,
            &edges,
            self.max_weight,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::knapsack::RepairPolicy;

    use super::*;

    #[test]
    fn parses_minimal_instance_with_defaults() -> TestResult {
        let instance = Instance::from_yaml_str("profit: [1, 2]\nweight: [3, 4]\nmax_weight: 5\n")?;

        assert_eq!(instance.profit, vec![1.0, 2.0]);
        assert!(instance.edges.is_empty());
        assert_eq!(instance.options, SolveOptions::default());
        assert_eq!(instance.expected, None);

        Ok(())
    }

    #[test]
    fn parses_edges_options_and_expected_answer() -> TestResult {
        let instance = Instance::from_yaml_str(
            "profit: [10, 5]
weight: [1, 1]
edges: [[0, 1]]
max_weight: 1
options:
  lp_relax: false
  repair: relaxation_only
expected:
  solution: [0, 1]
  status: 0
",
        )?;

        assert_eq!(instance.edges, vec![(0, 1)]);
        assert!(!instance.options.lp_relax);
        assert_eq!(instance.options.repair, RepairPolicy::RelaxationOnly);
        assert_eq!(
            instance.expected,
            Some(Expected {
                solution: vec![0, 1],
                status: 0
            })
        );

        Ok(())
    }

    #[test]
    fn rejects_unknown_fields() {
        let result = Instance::from_yaml_str("profit: []\nweight: []\nmax_weight: 0\ncapacity: 1\n");

        assert!(matches!(result, Err(FixtureError::Yaml(_))));
    }

    #[test]
    fn invalid_instance_surfaces_problem_error() -> TestResult {
        let instance = Instance::from_yaml_str("profit: [1]\nweight: [1, 2]\nmax_weight: 1\n")?;

        assert!(matches!(
            instance.problem(),
            Err(FixtureError::Problem(ProblemError::LengthMismatch { .. }))
        ));

        Ok(())
    }

    #[test]
    fn negative_edge_index_is_an_invalid_edge() -> TestResult {
        let instance =
            Instance::from_yaml_str("profit: [1, 1]\nweight: [1, 1]\nedges: [[0, -1]]\nmax_weight: 1\n")?;

        assert!(matches!(
            instance.problem(),
            Err(FixtureError::Problem(ProblemError::Graph(
                GraphError::InvalidEdgeIndex {
                    dependent: 0,
                    prerequisite: -1,
                    item_count: 2
                }
            )))
        ));

        Ok(())
    }

    #[test]
    fn length_mismatch_wins_over_negative_edge() -> TestResult {
        let instance =
            Instance::from_yaml_str("profit: [1]\nweight: [1, 1]\nedges: [[-3, 0]]\nmax_weight: 1\n")?;

        assert!(matches!(
            instance.problem(),
            Err(FixtureError::Problem(ProblemError::LengthMismatch { .. }))
        ));

        Ok(())
    }

    #[test]
    fn bundled_set_loads_by_name() -> TestResult {
        let instance = Instance::from_set("scenario_b")?;

        assert_eq!(instance.problem()?.graph().len(), 1);

        Ok(())
    }

    #[test]
    fn missing_set_is_an_io_error() {
        assert!(matches!(
            Instance::from_set("does_not_exist"),
            Err(FixtureError::Io(_))
        ));
    }
}
