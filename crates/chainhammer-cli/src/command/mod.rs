use std::path::PathBuf;

use chainhammer_estimator::{Trajectory, TrajectoryOptions, symmetry::Symmetry};
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

use self::{
    counts::CountsArg, generator::GeneratorArg, holding_times::HoldingTimesArg,
    perron_frobenius::PerronFrobeniusArg,
};
use crate::{logging, util};

mod counts;
mod generator;
mod holding_times;
mod perron_frobenius;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log level used when `RUST_LOG` is not set
    #[arg(long, global = true, default_value_t = LevelFilter::WARN)]
    log_level: LevelFilter,

    /// What to estimate
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Count one-step transitions
    Counts(#[clap(flatten)] CountsArg),
    /// Collect per-state holding times
    HoldingTimes(#[clap(flatten)] HoldingTimesArg),
    /// Estimate the discrete-time transition matrix
    PerronFrobenius(#[clap(flatten)] PerronFrobeniusArg),
    /// Estimate the continuous-time generator matrix
    Generator(#[clap(flatten)] GeneratorArg),
}

/// Input and output options shared by every subcommand.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrajectoryArg {
    /// Path to the trajectory JSON file
    pub trajectory: PathBuf,

    /// Time step between samples (overrides the file)
    #[arg(long)]
    pub dt: Option<f64>,

    /// Number of states (overrides the file; defaults to 1 + the largest label)
    #[arg(long)]
    pub num_states: Option<usize>,

    /// Output file path (defaults to stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl TrajectoryArg {
    pub(crate) fn load(&self) -> anyhow::Result<Trajectory> {
        let overrides = TrajectoryOptions {
            num_states: self.num_states,
            dt: self.dt,
        };
        util::read_trajectory_file(&self.trajectory, &overrides)
    }
}

/// Symmetries to pool over.
#[derive(Debug, Clone, Default, clap::Args)]
pub(crate) struct SymmetryArg {
    /// Label symmetry to pool over: `identity`, `reflect`, `shift:K` or
    /// `perm:I,J,...` (repeatable)
    #[arg(long = "symmetry", value_name = "SYMMETRY")]
    pub symmetries: Vec<Symmetry>,
}

impl SymmetryArg {
    pub(crate) fn describe(&self) -> Vec<String> {
        self.symmetries
            .iter()
            .map(|symmetry| match symmetry {
                Symmetry::Identity => "identity".to_owned(),
                Symmetry::Reflection => "reflect".to_owned(),
                Symmetry::Shift(k) => format!("shift:{k}"),
                Symmetry::Permutation(table) => {
                    let table = table.iter().map(usize::to_string).collect::<Vec<_>>();
                    format!("perm:{}", table.join(","))
                }
            })
            .collect()
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    logging::init(args.log_level);
    match args.mode {
        Mode::Counts(arg) => counts::run(&arg)?,
        Mode::HoldingTimes(arg) => holding_times::run(&arg)?,
        Mode::PerronFrobenius(arg) => perron_frobenius::run(&arg)?,
        Mode::Generator(arg) => generator::run(&arg)?,
    }
    Ok(())
}
