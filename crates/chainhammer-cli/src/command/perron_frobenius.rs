use chainhammer_estimator::symmetry::{SymmetryGroup, symmetric_perron_frobenius};

use super::{SymmetryArg, TrajectoryArg};
use crate::{
    schema::{MatrixReport, TrajectorySummary},
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PerronFrobeniusArg {
    #[clap(flatten)]
    pub input: TrajectoryArg,
    #[clap(flatten)]
    pub symmetry: SymmetryArg,
}

pub(crate) fn run(arg: &PerronFrobeniusArg) -> anyhow::Result<()> {
    let trajectory = arg.input.load()?;
    let group = SymmetryGroup::new(arg.symmetry.symmetries.clone());
    // an empty group pools over the identity alone, which is the plain estimator
    let matrix = symmetric_perron_frobenius(&trajectory, &group)?;

    let degenerate_states = (0..matrix.num_states())
        .filter(|&state| matrix.is_degenerate(state))
        .collect::<Vec<_>>();
    if !degenerate_states.is_empty() {
        tracing::warn!(
            ?degenerate_states,
            "states never observed leaving have all-zero rows"
        );
    }

    let report = MatrixReport {
        trajectory: TrajectorySummary::from(&trajectory),
        symmetries: arg.symmetry.describe(),
        degenerate_states,
        matrix,
    };
    Output::save_json(&report, arg.input.output.as_deref())
}
