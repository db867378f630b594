use crate::{TrajectoryError, symmetry::Permutation};

/// Largest supported state space.
///
/// Estimators allocate dense `num_states × num_states` matrices.
pub const MAX_STATES: usize = 1 << 12;

/// Optional overrides for [`Trajectory::with_options`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrajectoryOptions {
    /// Size of the state space. Defaults to one plus the largest observed label.
    pub num_states: Option<usize>,
    /// Physical time between consecutive samples. Defaults to 1.
    pub dt: Option<f64>,
}

/// An observed sequence of state labels sampled at a fixed time step.
///
/// Every label lies in `[0, num_states)`, the sequence holds at least one
/// sample and `dt` is positive and finite. These invariants are checked once
/// at construction, so every estimator that accepts a `Trajectory` is total.
///
/// # Examples
///
/// ```
/// use chainhammer_estimator::Trajectory;
///
/// let trajectory = Trajectory::new(vec![0, 0, 2, 1], 3, 0.1).unwrap();
/// assert_eq!(trajectory.len(), 4);
/// assert_eq!(trajectory.num_states(), 3);
///
/// assert!(Trajectory::new(vec![0, 3], 3, 0.1).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    states: Vec<usize>,
    num_states: usize,
    dt: f64,
}

/// A maximal run of identical consecutive labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    /// The state occupied during the run.
    pub state: usize,
    /// Index of the first sample of the run.
    pub start: usize,
    /// Number of samples in the run (at least 1).
    pub length: usize,
}

impl Trajectory {
    /// Creates a trajectory with an explicit state-space size and time step.
    pub fn new(states: Vec<usize>, num_states: usize, dt: f64) -> Result<Self, TrajectoryError> {
        if states.is_empty() {
            return Err(TrajectoryError::Empty);
        }
        if num_states == 0 {
            return Err(TrajectoryError::NoStates);
        }
        if num_states > MAX_STATES {
            return Err(TrajectoryError::TooManyStates {
                num_states,
                max: MAX_STATES,
            });
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(TrajectoryError::InvalidTimeStep { dt });
        }
        if let Some((index, &label)) = states
            .iter()
            .enumerate()
            .find(|(_, label)| **label >= num_states)
        {
            return Err(TrajectoryError::LabelOutOfRange {
                index,
                label,
                num_states,
            });
        }
        Ok(Self {
            states,
            num_states,
            dt,
        })
    }

    /// Creates a trajectory with `dt = 1` and the state-space size inferred
    /// from the largest label.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainhammer_estimator::Trajectory;
    ///
    /// let trajectory = Trajectory::from_states(vec![1, 4, 4]).unwrap();
    /// assert_eq!(trajectory.num_states(), 5);
    /// assert_eq!(trajectory.dt(), 1.0);
    /// ```
    pub fn from_states(states: Vec<usize>) -> Result<Self, TrajectoryError> {
        Self::with_options(states, &TrajectoryOptions::default())
    }

    /// Creates a trajectory, filling in unset options with their defaults.
    pub fn with_options(
        states: Vec<usize>,
        options: &TrajectoryOptions,
    ) -> Result<Self, TrajectoryError> {
        let num_states = match options.num_states {
            Some(num_states) => num_states,
            None => states
                .iter()
                .max()
                .ok_or(TrajectoryError::Empty)?
                .saturating_add(1),
        };
        Self::new(states, num_states, options.dt.unwrap_or(1.0))
    }

    #[must_use]
    pub fn states(&self) -> &[usize] {
        &self.states
    }

    #[must_use]
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    #[must_use]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always `false`; a trajectory holds at least one sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Total observed time, `len × dt`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.states.len() as f64 * self.dt
    }

    /// Iterates over adjacent `(source, destination)` pairs.
    pub fn transitions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.states.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// Iterates over the maximal runs of identical consecutive labels.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainhammer_estimator::Trajectory;
    ///
    /// let trajectory = Trajectory::from_states(vec![0, 0, 1, 0]).unwrap();
    /// let lengths: Vec<_> = trajectory.runs().map(|run| (run.state, run.length)).collect();
    /// assert_eq!(lengths, vec![(0, 2), (1, 1), (0, 1)]);
    /// ```
    pub fn runs(&self) -> impl Iterator<Item = Run> + '_ {
        self.states
            .chunk_by(|a, b| a == b)
            .scan(0, |start, chunk| {
                let run = Run {
                    state: chunk[0],
                    start: *start,
                    length: chunk.len(),
                };
                *start += chunk.len();
                Some(run)
            })
    }

    /// Applies `permutation` to every sample, keeping length and `dt`.
    pub(crate) fn relabeled(&self, permutation: &Permutation) -> Self {
        debug_assert_eq!(permutation.num_states(), self.num_states);
        Self {
            states: self
                .states
                .iter()
                .map(|&state| permutation.apply(state))
                .collect(),
            num_states: self.num_states,
            dt: self.dt,
        }
    }
}
