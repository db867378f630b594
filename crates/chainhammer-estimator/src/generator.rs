use serde::Serialize;

use crate::{StateMatrix, Trajectory, TransitionStatistics};

/// Empirical continuous-time transition rates, indexed `[source][destination]`.
///
/// Off-diagonal entries are non-negative rates and the diagonal holds the
/// negated exit rate, so every row sums to zero. A state that never leaves
/// (or is never visited) keeps an all-zero row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GeneratorMatrix {
    rates: StateMatrix<f64>,
}

impl GeneratorMatrix {
    /// Converts counts and holding times into rates.
    ///
    /// For a visited state `i`, `Q[i][j] = C[i][j] / (mean_hold_i × visits_i)`
    /// for `j ≠ i`. The denominator is the total time spent in `i`. The
    /// diagonal is the negated sum of the off-diagonal entries of the row.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainhammer_estimator::{GeneratorMatrix, Trajectory, TransitionStatistics};
    ///
    /// let trajectory = Trajectory::new(vec![0, 0, 1, 1, 1, 0], 2, 0.5).unwrap();
    /// let stats = TransitionStatistics::aggregate(&trajectory);
    /// let generator = GeneratorMatrix::from_statistics(&stats);
    /// // state 0: one departure over 1.5 time units
    /// assert!((generator.get(0, 1) - 1.0 / 1.5).abs() < 1e-12);
    /// assert!((generator.exit_rate(1) - 1.0 / 1.5).abs() < 1e-12);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_statistics(stats: &TransitionStatistics) -> Self {
        let counts = stats.counts();
        let holding_times = stats.holding_times();
        let mut rates = StateMatrix::zeros(stats.num_states());

        for source in 0..stats.num_states() {
            if holding_times.num_runs(source) == 0 {
                tracing::trace!(source, "state never visited; leaving row zero");
                continue;
            }
            let time_in_state = holding_times.total(source);
            let row = rates.row_mut(source);
            for (destination, &count) in counts.row(source).iter().enumerate() {
                if destination != source {
                    row[destination] = count as f64 / time_in_state;
                }
            }
            let exit_rate = row
                .iter()
                .enumerate()
                .filter(|(destination, _)| *destination != source)
                .map(|(_, rate)| rate)
                .sum::<f64>();
            row[source] = if exit_rate > 0.0 { -exit_rate } else { 0.0 };
        }

        Self { rates }
    }

    #[must_use]
    pub fn from_trajectory(trajectory: &Trajectory) -> Self {
        Self::from_statistics(&TransitionStatistics::aggregate(trajectory))
    }

    #[must_use]
    pub fn num_states(&self) -> usize {
        self.rates.num_states()
    }

    /// Rate of jumping from `source` to `destination`, or the negated exit
    /// rate on the diagonal.
    #[must_use]
    pub fn get(&self, source: usize, destination: usize) -> f64 {
        self.rates[(source, destination)]
    }

    #[must_use]
    pub fn row(&self, source: usize) -> &[f64] {
        self.rates.row(source)
    }

    #[must_use]
    pub fn row_sum(&self, source: usize) -> f64 {
        self.row(source).iter().sum()
    }

    /// Total rate of leaving `source`.
    #[must_use]
    pub fn exit_rate(&self, source: usize) -> f64 {
        -self.get(source, source)
    }

    /// Whether the row of `source` is all zero.
    #[must_use]
    pub fn is_degenerate(&self, source: usize) -> bool {
        self.row(source).iter().all(|&q| q == 0.0)
    }

    #[must_use]
    pub fn as_matrix(&self) -> &StateMatrix<f64> {
        &self.rates
    }
}

/// Estimates the generator matrix of `trajectory`.
#[must_use]
pub fn generator(trajectory: &Trajectory) -> GeneratorMatrix {
    GeneratorMatrix::from_trajectory(trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::random_trajectory;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_reference_trajectory() {
        let trajectory = Trajectory::new(vec![0, 0, 1, 0, 1, 1, 1, 0], 2, 1.0).unwrap();
        let generator = generator(&trajectory);

        // state 0: 2 departures over 4 time units; state 1: 2 departures over 4
        assert!((generator.get(0, 1) - 0.5).abs() < TOLERANCE);
        assert!((generator.get(0, 0) + 0.5).abs() < TOLERANCE);
        assert!((generator.get(1, 0) - 0.5).abs() < TOLERANCE);
        assert!((generator.get(1, 1) + 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn test_rates_scale_with_time_step() {
        let states = vec![0, 0, 1, 0, 1, 1, 1, 0];
        let slow = generator(&Trajectory::new(states.clone(), 2, 1.0).unwrap());
        let fast = generator(&Trajectory::new(states, 2, 0.1).unwrap());
        for source in 0..2 {
            for destination in 0..2 {
                let expected = slow.get(source, destination) * 10.0;
                assert!((fast.get(source, destination) - expected).abs() < TOLERANCE);
            }
        }
    }

    #[test]
    fn test_unvisited_states_have_zero_rows() {
        let trajectory = Trajectory::new(vec![2, 2, 2], 3, 1.0).unwrap();
        let generator = generator(&trajectory);

        assert_eq!(generator.row(0), &[0.0, 0.0, 0.0]);
        assert_eq!(generator.row(1), &[0.0, 0.0, 0.0]);
        // visited but never left
        assert_eq!(generator.row(2), &[0.0, 0.0, 0.0]);
        assert!(generator.is_degenerate(1));
        assert_eq!(generator.exit_rate(2), 0.0);
    }

    #[test]
    fn test_terminal_visit_counts_toward_holding_time() {
        // state 1 is visited once at the end and never left
        let trajectory = Trajectory::from_states(vec![0, 0, 0, 1]).unwrap();
        let generator = generator(&trajectory);

        assert!((generator.get(0, 1) - 1.0 / 3.0).abs() < TOLERANCE);
        assert!(generator.is_degenerate(1));
    }

    #[test]
    fn test_rows_sum_to_zero_with_sign_constraints() {
        for seed in 0..20 {
            let trajectory = random_trajectory(seed, 300, 5, 0.2);
            let stats = TransitionStatistics::aggregate(&trajectory);
            let generator = GeneratorMatrix::from_statistics(&stats);

            for source in 0..generator.num_states() {
                if stats.holding_times().num_runs(source) == 0 {
                    assert!(generator.is_degenerate(source));
                    continue;
                }
                assert!(generator.row_sum(source).abs() < TOLERANCE);
                assert!(generator.get(source, source) <= 0.0);
                for destination in (0..generator.num_states()).filter(|&d| d != source) {
                    assert!(generator.get(source, destination) >= 0.0);
                }
            }
        }
    }
}
