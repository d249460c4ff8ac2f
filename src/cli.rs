//! Command line configuration

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};

use precedence_knapsack::knapsack::{RepairPolicy, SolveOptions};

/// Log output format.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// When to run precedence repair.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RepairArg {
    /// After every solve.
    Always,

    /// Only after an LP relaxation solve.
    RelaxationOnly,
}

impl From<RepairArg> for RepairPolicy {
    fn from(arg: RepairArg) -> Self {
        match arg {
            RepairArg::Always => Self::Always,
            RepairArg::RelaxationOnly => Self::RelaxationOnly,
        }
    }
}

/// Precedence-constrained knapsack solver
#[derive(Debug, Parser)]
#[command(name = "pckp", about = "Solve a precedence-constrained knapsack instance", long_about = None)]
pub struct Cli {
    /// YAML instance file
    pub instance: PathBuf,

    /// Solve the LP relaxation and round the result
    #[arg(long, conflicts_with = "exact")]
    pub lp_relax: bool,

    /// Solve the exact integer program
    #[arg(long)]
    pub exact: bool,

    /// Wall-clock budget in seconds (0 for no limit)
    #[arg(long, env = "PCKP_MAX_SECONDS")]
    pub max_seconds: Option<f64>,

    /// Solver thread hint (0 for the solver default)
    #[arg(long, env = "PCKP_THREADS")]
    pub threads: Option<i32>,

    /// Relative optimality gap at which an exact solve may stop
    #[arg(long, env = "PCKP_GAP")]
    pub gap: Option<f64>,

    /// Solver log verbosity (0 is silent)
    #[arg(long)]
    pub solver_log_level: Option<i32>,

    /// When to run precedence repair
    #[arg(long, value_enum)]
    pub repair: Option<RepairArg>,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl Cli {
    /// Layer the flags given on the command line over the instance's own options.
    pub fn apply(&self, mut options: SolveOptions) -> SolveOptions {
        if self.lp_relax {
            options.lp_relax = true;
        }

        if self.exact {
            options.lp_relax = false;
        }

        if let Some(max_seconds) = self.max_seconds {
            options.max_seconds = max_seconds;
        }

        if let Some(threads) = self.threads {
            options.num_threads = threads;
        }

        if let Some(gap) = self.gap {
            options.allowable_fraction_gap = gap;
        }

        if let Some(log_level) = self.solver_log_level {
            options.log_level = log_level;
        }

        if let Some(repair) = self.repair {
            options.repair = repair.into();
        }

        options
    }
}
