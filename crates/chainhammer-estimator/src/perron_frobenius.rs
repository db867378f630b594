use serde::Serialize;

use crate::{CountMatrix, StateMatrix, Trajectory, TransitionStatistics};

/// Empirical one-step transition probabilities, indexed `[source][destination]`.
///
/// Each row of a state observed as a transition source sums to 1. A state
/// never observed as a source (unvisited, or only seen as the final sample)
/// keeps an all-zero row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PerronFrobeniusMatrix {
    probabilities: StateMatrix<f64>,
}

impl PerronFrobeniusMatrix {
    /// Normalizes every row of `counts` by its total.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainhammer_estimator::{PerronFrobeniusMatrix, Trajectory, count::count_matrix};
    ///
    /// let trajectory = Trajectory::from_states(vec![0, 1, 1, 0, 2]).unwrap();
    /// let matrix = PerronFrobeniusMatrix::from_counts(&count_matrix(&trajectory));
    /// assert_eq!(matrix.row(0), &[0.0, 0.5, 0.5]);
    /// assert!(matrix.is_degenerate(2));
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_counts(counts: &CountMatrix) -> Self {
        let mut probabilities = StateMatrix::zeros(counts.num_states());
        for source in 0..counts.num_states() {
            let total = counts.row_total(source);
            if total == 0 {
                tracing::trace!(source, "no outgoing transitions; leaving row zero");
                continue;
            }
            let total = total as f64;
            let row = probabilities.row_mut(source);
            for (probability, &count) in row.iter_mut().zip(counts.row(source)) {
                *probability = count as f64 / total;
            }
        }
        Self { probabilities }
    }

    #[must_use]
    pub fn from_statistics(stats: &TransitionStatistics) -> Self {
        Self::from_counts(stats.counts())
    }

    #[must_use]
    pub fn from_trajectory(trajectory: &Trajectory) -> Self {
        Self::from_statistics(&TransitionStatistics::aggregate(trajectory))
    }

    #[must_use]
    pub fn num_states(&self) -> usize {
        self.probabilities.num_states()
    }

    /// Probability of moving from `source` to `destination` in one step.
    #[must_use]
    pub fn get(&self, source: usize, destination: usize) -> f64 {
        self.probabilities[(source, destination)]
    }

    #[must_use]
    pub fn row(&self, source: usize) -> &[f64] {
        self.probabilities.row(source)
    }

    #[must_use]
    pub fn row_sum(&self, source: usize) -> f64 {
        self.row(source).iter().sum()
    }

    /// Whether `source` was never observed leaving, i.e. its row is all zero.
    #[must_use]
    pub fn is_degenerate(&self, source: usize) -> bool {
        self.row(source).iter().all(|&p| p == 0.0)
    }

    #[must_use]
    pub fn as_matrix(&self) -> &StateMatrix<f64> {
        &self.probabilities
    }
}

/// Estimates the Perron-Frobenius matrix of `trajectory`.
#[must_use]
pub fn perron_frobenius(trajectory: &Trajectory) -> PerronFrobeniusMatrix {
    PerronFrobeniusMatrix::from_trajectory(trajectory)
}
