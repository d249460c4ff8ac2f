//! Precedence Knapsack CLI
//!
//! Reads a YAML instance, solves it and writes the selection and solver status as YAML.

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Registry,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use precedence_knapsack::{fixtures::Instance, knapsack::KnapsackSolver, solvers::SolveStatus};

use crate::cli::{Cli, LogFormat, LoggingConfig};

mod cli;

/// Result written to stdout.
#[derive(Debug, Serialize)]
struct Output {
    solution: Vec<u8>,
    status: SolveStatus,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_subscriber(&cli.logging)?;

    let instance = Instance::from_path(&cli.instance)
        .with_context(|| format!("failed to load {}", cli.instance.display()))?;

    let problem = instance.problem()?;
    let options = cli.apply(instance.options.clone());
    let solver = KnapsackSolver::new();

    info!(
        instance = %cli.instance.display(),
        items = problem.len(),
        edges = problem.graph().len(),
        lp_relax = options.lp_relax,
        "solving"
    );

    let solution = solver.solve(&problem, &options)?;

    info!(
        status = %solution.status(),
        profit = solution.total_profit(&problem),
        weight = solution.total_weight(&problem),
        "solved"
    );

    if let Some(expected) = &instance.expected
        && !expected.matches(&solution)
    {
        warn!(
            expected = ?expected.solution,
            actual = ?solution.to_binary(),
            "solution differs from the recorded answer"
        );
    }

    let output = serde_norway::to_string(&Output {
        solution: solution.to_binary(),
        status: solution.status(),
    })?;

    #[expect(clippy::print_stdout, reason = "the solution is the program's output")]
    {
        print!("{output}");
    }

    Ok(())
}

fn init_subscriber(config: &LoggingConfig) -> anyhow::Result<()> {
    match config.log_format {
        LogFormat::Compact => init_with_layer(
            config,
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(true),
        ),
        LogFormat::Json => init_with_layer(
            config,
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true),
        ),
    }
}

fn init_with_layer<L>(config: &LoggingConfig, fmt_layer: L) -> anyhow::Result<()>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()?;

    Ok(())
}
