//! MILP Backend
//!
//! [`Backend`] over `good_lp`. The concrete engine is chosen at compile time: CBC with
//! `solver-cbc`, otherwise HiGHS with `solver-highs`, otherwise the bundled microlp.

use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, variable,
};
use tracing::debug;

#[cfg(feature = "solver-cbc")]
use good_lp::solvers::coin_cbc::coin_cbc as default_solver;
#[cfg(all(not(feature = "solver-cbc"), feature = "solver-highs"))]
use good_lp::solvers::highs::highs as default_solver;
#[cfg(all(
    not(feature = "solver-cbc"),
    not(feature = "solver-highs"),
    feature = "solver-microlp"
))]
use good_lp::solvers::microlp::microlp as default_solver;

use crate::{
    model::{Model, Row},
    solvers::{Backend, RawSolution, SolveStatus, SolverControls, SolverError},
};

#[cfg(feature = "solver-cbc")]
const BACKEND_NAME: &str = "cbc";
#[cfg(all(not(feature = "solver-cbc"), feature = "solver-highs"))]
const BACKEND_NAME: &str = "highs";
#[cfg(all(
    not(feature = "solver-cbc"),
    not(feature = "solver-highs"),
    feature = "solver-microlp"
))]
const BACKEND_NAME: &str = "microlp";

/// Backend solving models through `good_lp`.
///
/// Stateless: every call builds and drops its own solver problem, so one value can be
/// shared across threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct MilpBackend;

impl Backend for MilpBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn solve(&self, model: &Model, controls: &SolverControls) -> Result<RawSolution, SolverError> {
        debug!(
            backend = BACKEND_NAME,
            columns = model.column_count(),
            rows = model.row_count(),
            non_zeros = model.non_zeros(),
            time_limit = ?controls.time_limit,
            threads = ?controls.threads,
            gap = ?controls.allowable_fraction_gap,
            "solving model"
        );

        let mut vars = ProblemVariables::new();

        let columns: Vec<Variable> = model
            .column_bounds()
            .iter()
            .enumerate()
            .map(|(col, bounds)| {
                let definition = variable().min(bounds.lower).max(bounds.upper);

                vars.add(if model.is_integer(col) {
                    definition.integer()
                } else {
                    definition
                })
            })
            .collect();

        let objective = objective_expression(model, &columns);

        let mut problem = configure(
            vars.maximise(objective).using(default_solver),
            controls,
            &columns,
        );

        for row in model.rows() {
            let bounds = row.bounds();

            let Some(expr) = row_expression(row, &columns) else {
                // An empty row has activity 0 whatever the columns are.
                if bounds.contains(0.0, 0.0) {
                    continue;
                }

                return Ok(RawSolution {
                    values: None,
                    status: SolveStatus::RelaxationInfeasible,
                });
            };

            if bounds.lower.is_finite() {
                problem = problem.with(expr.clone().geq(bounds.lower));
            }

            if bounds.upper.is_finite() {
                problem = problem.with(expr.leq(bounds.upper));
            }
        }

        match problem.solve() {
            Ok(solution) => {
                let status = SolveStatus::try_from(status_code(&solution))?;
                let values = columns.iter().map(|&var| solution.value(var)).collect();

                Ok(RawSolution {
                    values: Some(values),
                    status,
                })
            }
            Err(ResolutionError::Infeasible) => Ok(RawSolution {
                values: None,
                status: SolveStatus::RelaxationInfeasible,
            }),
            Err(ResolutionError::Unbounded) => Ok(RawSolution {
                values: None,
                status: SolveStatus::RelaxationUnbounded,
            }),
            Err(err) => Err(err.into()),
        }
    }
}

fn objective_expression(model: &Model, columns: &[Variable]) -> Expression {
    let mut objective = Expression::default();

    for (&var, &coeff) in columns.iter().zip(model.objective()) {
        objective.add_mul(coeff, var);
    }

    objective
}

/// Build the row's linear expression, or `None` if the row has no entries.
fn row_expression(row: &Row, columns: &[Variable]) -> Option<Expression> {
    let mut expr = Expression::default();
    let mut terms = 0_usize;

    for &(col, coeff) in row.entries() {
        if let Some(&var) = columns.get(col) {
            expr.add_mul(coeff, var);
            terms += 1;
        }
    }

    (terms > 0).then_some(expr)
}

/// Hot start paired with its columns; columns without a value are left out.
#[cfg(any(feature = "solver-cbc", feature = "solver-highs"))]
fn initial_solution(columns: &[Variable], controls: &SolverControls) -> Vec<(Variable, f64)> {
    columns
        .iter()
        .copied()
        .zip(controls.hot_start.iter().copied())
        .collect()
}

#[cfg(feature = "solver-cbc")]
fn configure(
    mut problem: good_lp::solvers::coin_cbc::CoinCbcProblem,
    controls: &SolverControls,
    columns: &[Variable],
) -> good_lp::solvers::coin_cbc::CoinCbcProblem {
    use good_lp::WithInitialSolution;

    problem.set_parameter("log", &controls.log_level.to_string());

    if let Some(limit) = controls.time_limit {
        problem.set_parameter("seconds", &limit.as_secs_f64().to_string());
    }

    if let Some(threads) = controls.threads {
        problem.set_parameter("threads", &threads.to_string());
    }

    if let Some(gap) = controls.allowable_fraction_gap {
        problem.set_parameter("ratioGap", &gap.to_string());
    }

    problem.with_initial_solution(initial_solution(columns, controls))
}

#[cfg(all(not(feature = "solver-cbc"), feature = "solver-highs"))]
fn configure(
    problem: good_lp::solvers::highs::HighsProblem,
    controls: &SolverControls,
    columns: &[Variable],
) -> good_lp::solvers::highs::HighsProblem {
    use good_lp::WithInitialSolution;

    let mut problem = problem.set_option("output_flag", controls.log_level > 0);

    if let Some(limit) = controls.time_limit {
        problem = problem.set_option("time_limit", limit.as_secs_f64());
    }

    if let Some(threads) = controls.threads.and_then(|threads| i32::try_from(threads).ok()) {
        problem = problem.set_option("threads", threads);
    }

    if let Some(gap) = controls.allowable_fraction_gap {
        problem = problem.set_option("mip_rel_gap", gap);
    }

    problem.with_initial_solution(initial_solution(columns, controls))
}

#[cfg(all(
    not(feature = "solver-cbc"),
    not(feature = "solver-highs"),
    feature = "solver-microlp"
))]
fn configure<P>(problem: P, controls: &SolverControls, _columns: &[Variable]) -> P {
    use tracing::warn;

    // microlp runs to completion on a single thread with no log output.
    if controls.time_limit.is_some() {
        warn!("microlp backend has no time limit; ignoring it");
    }

    if controls.threads.is_some() {
        warn!("microlp backend is single-threaded; ignoring thread count");
    }

    if controls.allowable_fraction_gap.is_some() {
        warn!("microlp backend has no gap tolerance; solving to optimality");
    }

    debug!(
        log_level = controls.log_level,
        "microlp backend has no solver log or hot start"
    );

    problem
}

/// Status code of a successful solve.
#[cfg(feature = "solver-cbc")]
fn status_code(solution: &good_lp::solvers::coin_cbc::CoinCbcSolution) -> i32 {
    solution.model().secondary_status() as i32
}

/// Status code of a successful solve.
#[cfg(all(not(feature = "solver-cbc"), feature = "solver-highs"))]
fn status_code(solution: &impl Solution) -> i32 {
    use good_lp::SolutionStatus;

    let status = match solution.status() {
        SolutionStatus::Optimal => SolveStatus::Optimal,
        SolutionStatus::TimeLimit => SolveStatus::StoppedOnTime,
        SolutionStatus::GapLimit => SolveStatus::StoppedOnGap,
    };

    status.code()
}

/// Status code of a successful solve; microlp has no limits, so it is always optimal.
#[cfg(all(
    not(feature = "solver-cbc"),
    not(feature = "solver-highs"),
    feature = "solver-microlp"
))]
fn status_code<S: Solution>(_solution: &S) -> i32 {
    SolveStatus::Optimal.code()
}
