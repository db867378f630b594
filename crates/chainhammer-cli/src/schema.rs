//! JSON documents read and written by the command-line front end.

use chainhammer_estimator::{HoldingTimes, Trajectory, TrajectoryOptions};
use chainhammer_stats::{descriptive::DescriptiveStats, histogram::Histogram};
use serde::{Deserialize, Serialize};

/// An observed trajectory on disk.
///
/// ```json
/// { "states": [0, 0, 1, 0], "dt": 0.5, "num_states": 3 }
/// ```
///
/// `dt` defaults to 1 and `num_states` to one plus the largest label.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrajectoryFile {
    pub states: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_states: Option<usize>,
}

impl TrajectoryFile {
    /// Validates the file into a [`Trajectory`], letting `overrides` win over
    /// the values stored in the file.
    pub fn into_trajectory(
        self,
        overrides: &TrajectoryOptions,
    ) -> Result<Trajectory, chainhammer_estimator::TrajectoryError> {
        let options = TrajectoryOptions {
            num_states: overrides.num_states.or(self.num_states),
            dt: overrides.dt.or(self.dt),
        };
        Trajectory::with_options(self.states, &options)
    }
}

/// Header shared by every report.
#[derive(Debug, Clone, Serialize)]
pub struct TrajectorySummary {
    pub samples: usize,
    pub num_states: usize,
    pub dt: f64,
    pub duration: f64,
}

impl From<&Trajectory> for TrajectorySummary {
    fn from(trajectory: &Trajectory) -> Self {
        Self {
            samples: trajectory.len(),
            num_states: trajectory.num_states(),
            dt: trajectory.dt(),
            duration: trajectory.duration(),
        }
    }
}

/// An estimated matrix together with the trajectory it came from.
#[derive(Debug, Clone, Serialize)]
pub struct MatrixReport<M> {
    pub trajectory: TrajectorySummary,
    /// Symmetries pooled over, in their textual form. Empty when unpooled.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub symmetries: Vec<String>,
    /// States whose row is all zero.
    pub degenerate_states: Vec<usize>,
    pub matrix: M,
}

/// Holding-time distribution of one state.
#[derive(Debug, Clone, Serialize)]
pub struct StateHoldingTimes {
    pub state: usize,
    pub durations: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<DescriptiveStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram: Option<Histogram>,
}

impl StateHoldingTimes {
    pub fn new(holding_times: &HoldingTimes, state: usize) -> Self {
        Self {
            state,
            durations: holding_times.durations(state),
            summary: holding_times.summary(state),
            histogram: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HoldingTimesReport {
    pub trajectory: TrajectorySummary,
    pub states: Vec<StateHoldingTimes>,
}
