use chainhammer_estimator::symmetry::{SymmetryGroup, symmetric_generator};

use super::{SymmetryArg, TrajectoryArg};
use crate::{
    schema::{MatrixReport, TrajectorySummary},
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GeneratorArg {
    #[clap(flatten)]
    pub input: TrajectoryArg,
    #[clap(flatten)]
    pub symmetry: SymmetryArg,
}

pub(crate) fn run(arg: &GeneratorArg) -> anyhow::Result<()> {
    let trajectory = arg.input.load()?;
    let group = SymmetryGroup::new(arg.symmetry.symmetries.clone());
    let matrix = symmetric_generator(&trajectory, &group)?;

    let degenerate_states = (0..matrix.num_states())
        .filter(|&state| matrix.is_degenerate(state))
        .collect::<Vec<_>>();
    if !degenerate_states.is_empty() {
        tracing::warn!(
            ?degenerate_states,
            "states that never leave have all-zero rows"
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
