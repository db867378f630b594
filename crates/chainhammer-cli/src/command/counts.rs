use chainhammer_estimator::{CountMatrix, count::count_matrix};
use serde::Serialize;

use super::TrajectoryArg;
use crate::{schema::TrajectorySummary, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CountsArg {
    #[clap(flatten)]
    pub input: TrajectoryArg,
}

#[derive(Debug, Serialize)]
struct CountsReport {
    trajectory: TrajectorySummary,
    total_transitions: u64,
    counts: CountMatrix,
}

pub(crate) fn run(arg: &CountsArg) -> anyhow::Result<()> {
    let trajectory = arg.input.load()?;
    let counts = count_matrix(&trajectory);
    let report = CountsReport {
        trajectory: TrajectorySummary::from(&trajectory),
        total_transitions: counts.total(),
        counts,
    };
    Output::save_json(&report, arg.input.output.as_deref())
}
