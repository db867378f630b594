use anyhow::Context as _;
use chainhammer_estimator::count::holding_times;
use chainhammer_stats::histogram::{Histogram, HistogramOptions, Normalization};

use super::TrajectoryArg;
use crate::{
    schema::{HoldingTimesReport, StateHoldingTimes, TrajectorySummary},
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct HoldingTimesArg {
    #[clap(flatten)]
    pub input: TrajectoryArg,

    /// Attach a histogram with this many bins to every visited state
    #[arg(long)]
    pub bins: Option<usize>,

    /// Report raw counts per bin instead of probabilities
    #[arg(long, requires = "bins")]
    pub count: bool,

    /// Lower edge of the histogram range (requires --range-max)
    #[arg(long, requires_all = ["bins", "range_max"])]
    pub range_min: Option<f64>,

    /// Upper edge of the histogram range (requires --range-min)
    #[arg(long, requires_all = ["bins", "range_min"])]
    pub range_max: Option<f64>,
}

impl HoldingTimesArg {
    fn histogram_options(&self) -> Option<HistogramOptions> {
        let bins = self.bins?;
        Some(HistogramOptions {
            bins: Some(bins),
            normalization: if self.count {
                Normalization::Count
            } else {
                Normalization::Uniform
            },
            range: self.range_min.zip(self.range_max),
        })
    }
}

pub(crate) fn run(arg: &HoldingTimesArg) -> anyhow::Result<()> {
    let trajectory = arg.input.load()?;
    let holding = holding_times(&trajectory);
    let histogram_options = arg.histogram_options();

    let mut states = Vec::with_capacity(trajectory.num_states());
    for state in 0..trajectory.num_states() {
        let mut entry = StateHoldingTimes::new(&holding, state);
        if entry.durations.is_empty() {
            tracing::debug!(state, "state never visited");
        } else if let Some(options) = &histogram_options {
            let histogram = Histogram::new(&entry.durations, options)
                .with_context(|| format!("Failed to build histogram for state {state}"))?;
            entry.histogram = Some(histogram);
        }
        states.push(entry);
    }

    let report = HoldingTimesReport {
        trajectory: TrajectorySummary::from(&trajectory),
        states,
    };
    Output::save_json(&report, arg.input.output.as_deref())
}
