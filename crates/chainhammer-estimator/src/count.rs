//! Single-pass aggregation of transition counts and holding times.
//!
//! Every higher-level estimator starts from a [`TransitionStatistics`]:
//!
//! ```text
//! Trajectory ──aggregate──▶ TransitionStatistics
//!                            ├─ CountMatrix   [source][destination] → one-step transitions
//!                            └─ HoldingTimes  state → run lengths × dt
//! ```
//!
//! Statistics from several trajectories over the same state space and time
//! step can be pooled with [`TransitionStatistics::merge`] before
//! normalization, which is how the symmetry reducer gathers evidence.

use chainhammer_stats::descriptive::DescriptiveStats;
use serde::{Serialize, Serializer};

use crate::{StateMatrix, Trajectory};

/// Observed one-step transition counts, indexed `[source][destination]`.
///
/// Self-transitions (a run continuing) are counted on the diagonal. The grand
/// total equals the number of adjacent sample pairs aggregated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CountMatrix {
    counts: StateMatrix<u64>,
}

impl CountMatrix {
    fn zeros(num_states: usize) -> Self {
        Self {
            counts: StateMatrix::zeros(num_states),
        }
    }

    #[must_use]
    pub fn num_states(&self) -> usize {
        self.counts.num_states()
    }

    /// Number of observed `source → destination` transitions.
    #[must_use]
    pub fn get(&self, source: usize, destination: usize) -> u64 {
        self.counts[(source, destination)]
    }

    #[must_use]
    pub fn row(&self, source: usize) -> &[u64] {
        self.counts.row(source)
    }

    /// Number of transitions leaving `source`, self-transitions included.
    #[must_use]
    pub fn row_total(&self, source: usize) -> u64 {
        self.row(source).iter().sum()
    }

    /// Number of transitions from `source` to a different state.
    #[must_use]
    pub fn off_diagonal_total(&self, source: usize) -> u64 {
        self.row_total(source) - self.get(source, source)
    }

    /// Grand total over all entries.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.rows().flatten().sum()
    }

    #[must_use]
    pub fn as_matrix(&self) -> &StateMatrix<u64> {
        &self.counts
    }

    fn record(&mut self, source: usize, destination: usize) {
        self.counts[(source, destination)] += 1;
    }

    fn add(&mut self, other: &Self) {
        for source in 0..self.num_states() {
            let row = self.counts.row_mut(source);
            for (count, extra) in row.iter_mut().zip(other.row(source)) {
                *count += extra;
            }
        }
    }
}

/// Per-state durations of every maximal run, in observation order.
///
/// Runs are kept as sample counts together with the shared time step, so
/// pooled totals are exact regardless of the order in which statistics were
/// merged. Serializes as one sequence of durations per state.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingTimes {
    run_lengths: Vec<Vec<usize>>,
    dt: f64,
}

impl HoldingTimes {
    fn empty(num_states: usize, dt: f64) -> Self {
        Self {
            run_lengths: vec![vec![]; num_states],
            dt,
        }
    }

    #[must_use]
    pub fn num_states(&self) -> usize {
        self.run_lengths.len()
    }

    /// Time step the runs were sampled with.
    #[must_use]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Run lengths of `state`, measured in samples.
    #[must_use]
    pub fn run_lengths(&self, state: usize) -> &[usize] {
        &self.run_lengths[state]
    }

    /// Holding-time durations of `state`, one per run.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainhammer_estimator::{Trajectory, count::holding_times};
    ///
    /// let trajectory = Trajectory::new(vec![1, 1, 0, 1], 2, 0.5).unwrap();
    /// let holding = holding_times(&trajectory);
    /// assert_eq!(holding.durations(1), vec![1.0, 0.5]);
    /// assert_eq!(holding.durations(0), vec![0.5]);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn durations(&self, state: usize) -> Vec<f64> {
        self.run_lengths[state]
            .iter()
            .map(|&length| length as f64 * self.dt)
            .collect()
    }

    /// Number of maximal runs (visits) of `state`.
    #[must_use]
    pub fn num_runs(&self, state: usize) -> usize {
        self.run_lengths[state].len()
    }

    /// Number of runs over all states.
    #[must_use]
    pub fn total_runs(&self) -> usize {
        self.run_lengths.iter().map(Vec::len).sum()
    }

    /// Total time spent in `state`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn total(&self, state: usize) -> f64 {
        self.run_lengths[state].iter().sum::<usize>() as f64 * self.dt
    }

    /// Mean holding time of `state`, or `None` if it was never visited.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean(&self, state: usize) -> Option<f64> {
        match self.num_runs(state) {
            0 => None,
            runs => Some(self.total(state) / runs as f64),
        }
    }

    /// Descriptive statistics of the durations of `state`, or `None` if it
    /// was never visited.
    #[must_use]
    pub fn summary(&self, state: usize) -> Option<DescriptiveStats> {
        DescriptiveStats::new(self.durations(state))
    }

    fn push(&mut self, state: usize, length: usize) {
        self.run_lengths[state].push(length);
    }

    fn extend(&mut self, other: &Self) {
        for (lengths, extra) in self.run_lengths.iter_mut().zip(&other.run_lengths) {
            lengths.extend_from_slice(extra);
        }
    }
}

impl Serialize for HoldingTimes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq((0..self.num_states()).map(|state| self.durations(state)))
    }
}

/// Transition counts and holding times gathered from one or more trajectories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionStatistics {
    counts: CountMatrix,
    holding_times: HoldingTimes,
}

impl TransitionStatistics {
    /// Scans `trajectory` once, counting every adjacent pair and closing a
    /// holding-time run whenever the label changes.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainhammer_estimator::{Trajectory, TransitionStatistics};
    ///
    /// let trajectory = Trajectory::from_states(vec![0, 0, 1, 0, 1, 1, 1, 0]).unwrap();
    /// let stats = TransitionStatistics::aggregate(&trajectory);
    /// assert_eq!(stats.counts().row(0), &[1, 2]);
    /// assert_eq!(stats.counts().row(1), &[2, 2]);
    /// assert_eq!(stats.holding_times().durations(0), vec![2.0, 1.0, 1.0]);
    /// assert_eq!(stats.holding_times().durations(1), vec![1.0, 3.0]);
    /// ```
    #[must_use]
    pub fn aggregate(trajectory: &Trajectory) -> Self {
        let mut stats = Self {
            counts: CountMatrix::zeros(trajectory.num_states()),
            holding_times: HoldingTimes::empty(trajectory.num_states(), trajectory.dt()),
        };

        let mut run_length = 1;
        for (source, destination) in trajectory.transitions() {
            stats.counts.record(source, destination);
            if source == destination {
                run_length += 1;
            } else {
                stats.holding_times.push(source, run_length);
                run_length = 1;
            }
        }
        if let Some(&last) = trajectory.states().last() {
            stats.holding_times.push(last, run_length);
        }

        tracing::trace!(
            samples = trajectory.len(),
            num_states = trajectory.num_states(),
            runs = stats.holding_times.total_runs(),
            "aggregated trajectory"
        );
        stats
    }

    /// Pools `other` into `self`: counts are summed element-wise and holding
    /// times are appended per state.
    ///
    /// # Panics
    ///
    /// Panics if the two statistics differ in state-space size or time step.
    pub fn merge(&mut self, other: &Self) {
        assert_eq!(
            self.num_states(),
            other.num_states(),
            "cannot merge statistics over different state spaces"
        );
        assert!(
            self.holding_times.dt.to_bits() == other.holding_times.dt.to_bits(),
            "cannot merge statistics sampled with different time steps"
        );
        self.counts.add(&other.counts);
        self.holding_times.extend(&other.holding_times);
    }

    #[must_use]
    pub fn num_states(&self) -> usize {
        self.counts.num_states()
    }

    #[must_use]
    pub fn counts(&self) -> &CountMatrix {
        &self.counts
    }

    #[must_use]
    pub fn holding_times(&self) -> &HoldingTimes {
        &self.holding_times
    }

    #[must_use]
    pub fn into_parts(self) -> (CountMatrix, HoldingTimes) {
        (self.counts, self.holding_times)
    }
}

/// Counts the one-step transitions of `trajectory`.
#[must_use]
pub fn count_matrix(trajectory: &Trajectory) -> CountMatrix {
    TransitionStatistics::aggregate(trajectory).counts
}

/// Collects the holding times of every state in `trajectory`.
#[must_use]
pub fn holding_times(trajectory: &Trajectory) -> HoldingTimes {
    TransitionStatistics::aggregate(trajectory).holding_times
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::random_trajectory;

    #[test]
    fn test_reference_trajectory() {
        let trajectory = Trajectory::new(vec![0, 0, 1, 0, 1, 1, 1, 0], 2, 1.0).unwrap();
        let stats = TransitionStatistics::aggregate(&trajectory);

        assert_eq!(stats.counts().get(0, 0), 1);
        assert_eq!(stats.counts().get(0, 1), 2);
        assert_eq!(stats.counts().get(1, 0), 2);
        assert_eq!(stats.counts().get(1, 1), 2);
        assert_eq!(stats.counts().total(), 7);

        assert_eq!(stats.holding_times().run_lengths(0), &[2, 1, 1]);
        assert_eq!(stats.holding_times().run_lengths(1), &[1, 3]);
    }

    #[test]
    fn test_single_sample() {
        let trajectory = Trajectory::new(vec![1], 3, 0.25).unwrap();
        let stats = TransitionStatistics::aggregate(&trajectory);

        assert_eq!(stats.counts().total(), 0);
        assert_eq!(stats.holding_times().durations(1), vec![0.25]);
        assert_eq!(stats.holding_times().num_runs(0), 0);
        assert_eq!(stats.holding_times().num_runs(2), 0);
    }

    #[test]
    fn test_single_state_run() {
        let trajectory = Trajectory::new(vec![2, 2, 2], 3, 1.0).unwrap();
        let counts = count_matrix(&trajectory);
        assert_eq!(counts.get(2, 2), 2);
        assert_eq!(counts.total(), 2);
        assert_eq!(counts.row(0), &[0, 0, 0]);
        assert_eq!(counts.row(1), &[0, 0, 0]);

        let holding = holding_times(&trajectory);
        assert_eq!(holding.durations(2), vec![3.0]);
        assert!(holding.durations(0).is_empty());
        assert_eq!(holding.mean(0), None);
    }

    #[test]
    fn test_holding_time_summaries() {
        let trajectory = Trajectory::new(vec![0, 0, 1, 0, 1, 1, 1, 0], 2, 0.5).unwrap();
        let holding = holding_times(&trajectory);

        assert_eq!(holding.total(0), 2.0);
        assert_eq!(holding.mean(1), Some(1.0));
        let summary = holding.summary(0).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.max, 1.0);
        assert_eq!(summary.min, 0.5);
        assert!(holding.summary(0).is_some());
    }

    #[test]
    fn test_off_diagonal_total_excludes_self_transitions() {
        let counts = count_matrix(&Trajectory::from_states(vec![0, 0, 0, 1, 0]).unwrap());
        assert_eq!(counts.row_total(0), 3);
        assert_eq!(counts.off_diagonal_total(0), 1);
    }

    #[test]
    fn test_totals_match_trajectory_length() {
        for seed in 0..20 {
            let trajectory = random_trajectory(seed, 200, 5, 0.1);
            let stats = TransitionStatistics::aggregate(&trajectory);
            let len = trajectory.len();

            assert_eq!(stats.counts().total(), (len - 1) as u64);
            assert_eq!(stats.holding_times().total_runs(), trajectory.runs().count());
            let elapsed = (0..5).map(|s| stats.holding_times().total(s)).sum::<f64>();
            assert!((elapsed - trajectory.duration()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_merge_sums_counts_and_appends_runs() {
        let a = Trajectory::new(vec![0, 1, 1], 2, 1.0).unwrap();
        let b = Trajectory::new(vec![1, 0, 0, 0], 2, 1.0).unwrap();
        let mut pooled = TransitionStatistics::aggregate(&a);
        pooled.merge(&TransitionStatistics::aggregate(&b));

        assert_eq!(pooled.counts().row(0), &[2, 1]);
        assert_eq!(pooled.counts().row(1), &[1, 1]);
        assert_eq!(pooled.holding_times().run_lengths(0), &[1, 3]);
        assert_eq!(pooled.holding_times().run_lengths(1), &[2, 1]);
    }

    #[test]
    #[should_panic(expected = "different time steps")]
    fn test_merge_rejects_different_time_steps() {
        let a = Trajectory::new(vec![0, 1], 2, 1.0).unwrap();
        let b = Trajectory::new(vec![0, 1], 2, 2.0).unwrap();
        let mut pooled = TransitionStatistics::aggregate(&a);
        pooled.merge(&TransitionStatistics::aggregate(&b));
    }

    #[test]
    fn test_serialization() {
        let trajectory = Trajectory::new(vec![0, 0, 1], 2, 0.5).unwrap();
        let json = serde_json::to_value(TransitionStatistics::aggregate(&trajectory)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "counts": [[1, 1], [0, 0]],
                "holding_times": [[1.0], [0.5]],
            })
        );
    }
}
