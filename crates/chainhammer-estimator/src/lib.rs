//! Empirical estimators for finite-state Markov chains.
//!
//! Given an observed [`Trajectory`] of integer state labels sampled every
//! `dt`, this crate estimates:
//!
//! - raw one-step transition counts and per-state holding times
//!   ([`count::TransitionStatistics`]),
//! - the discrete-time transition matrix ([`PerronFrobeniusMatrix`]),
//! - the continuous-time rate matrix ([`GeneratorMatrix`]),
//! - symmetry-pooled variants of both ([`symmetry`]).
//!
//! # Matrix convention
//!
//! Every matrix is indexed `[source][destination]`: row `i` holds the
//! outgoing statistics of state `i`. Non-degenerate rows of a
//! Perron-Frobenius matrix sum to 1 and rows of a generator matrix sum to 0.
//!
//! # Degenerate states
//!
//! A state that is never observed as the source of a transition gets an
//! all-zero row in both the Perron-Frobenius and the generator matrix. This
//! is a deliberate policy rather than an error.
//!
//! # Examples
//!
//! ```
//! use chainhammer_estimator::{Trajectory, perron_frobenius::perron_frobenius};
//!
//! let trajectory = Trajectory::from_states(vec![0, 0, 1, 0, 1, 1, 1, 0]).unwrap();
//! let matrix = perron_frobenius(&trajectory);
//! assert!((matrix.get(0, 1) - 2.0 / 3.0).abs() < 1e-12);
//! assert!((matrix.get(1, 0) - 0.5).abs() < 1e-12);
//! ```
//!
//! Pooling over a label symmetry:
//!
//! ```
//! use chainhammer_estimator::{
//!     Trajectory,
//!     symmetry::{Symmetry, SymmetryGroup, symmetric_generator},
//! };
//!
//! let trajectory = Trajectory::new(vec![0, 0, 1, 2, 2, 2, 1], 3, 0.5).unwrap();
//! let group = SymmetryGroup::new(vec![Symmetry::Reflection]);
//! let generator = symmetric_generator(&trajectory, &group).unwrap();
//! assert!(generator.row_sum(1).abs() < 1e-12);
//! ```

use self::symmetry::{Estimate, EstimatorKind, SymmetryError, SymmetryGroup};

pub use self::{
    count::{CountMatrix, HoldingTimes, TransitionStatistics},
    generator::GeneratorMatrix,
    matrix::StateMatrix,
    perron_frobenius::PerronFrobeniusMatrix,
    trajectory::{Trajectory, TrajectoryOptions},
};

pub mod count;
pub mod generator;
pub mod matrix;
pub mod perron_frobenius;
pub mod symmetry;
pub mod trajectory;

#[cfg(test)]
mod test_util;

/// A trajectory that cannot be estimated from.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum TrajectoryError {
    #[display("trajectory must contain at least one sample")]
    Empty,
    #[display("number of states must be positive")]
    NoStates,
    #[display("state space of {num_states} states exceeds the limit of {max}")]
    TooManyStates { num_states: usize, max: usize },
    #[display("time step must be a positive finite number, got {dt}")]
    InvalidTimeStep { dt: f64 },
    #[display("sample {index} has label {label}, outside [0, {num_states})")]
    LabelOutOfRange {
        index: usize,
        label: usize,
        num_states: usize,
    },
}

/// Any failure of the one-shot [`estimate`] entry point.
#[derive(
    Debug,
    Clone,
    PartialEq,
    derive_more::Display,
    derive_more::Error,
    derive_more::From,
    derive_more::IsVariant,
)]
pub enum EstimateError {
    #[display("malformed trajectory")]
    Trajectory(#[error(source)] TrajectoryError),
    #[display("symmetry mismatch")]
    Symmetry(#[error(source)] SymmetryError),
}

/// Validates `states`, pools over `group` and normalizes with `kind`.
///
/// # Examples
///
/// ```
/// use chainhammer_estimator::{
///     EstimateError, TrajectoryOptions, estimate,
///     symmetry::{EstimatorKind, Symmetry, SymmetryGroup},
/// };
///
/// let options = TrajectoryOptions::default();
/// let group = SymmetryGroup::empty();
/// let matrix = estimate(vec![0, 1, 1], &options, &group, EstimatorKind::PerronFrobenius);
/// assert!(matrix.unwrap().is_perron_frobenius());
///
/// let group = SymmetryGroup::new(vec![Symmetry::Permutation(vec![0, 1, 2])]);
/// let err = estimate(vec![0, 1], &options, &group, EstimatorKind::Generator).unwrap_err();
/// assert!(err.is_symmetry());
/// ```
pub fn estimate(
    states: Vec<usize>,
    options: &TrajectoryOptions,
    group: &SymmetryGroup,
    kind: EstimatorKind,
) -> Result<Estimate, EstimateError> {
    let trajectory = Trajectory::with_options(states, options)?;
    Ok(symmetry::symmetric_estimate(&trajectory, group, kind)?)
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_estimate_reports_malformed_trajectory() {
        let err = estimate(
            vec![],
            &TrajectoryOptions::default(),
            &SymmetryGroup::empty(),
            EstimatorKind::Generator,
        )
        .unwrap_err();
        assert_eq!(err, EstimateError::Trajectory(TrajectoryError::Empty));
        assert_eq!(err.to_string(), "malformed trajectory");
        assert_eq!(
            err.source().map(ToString::to_string).as_deref(),
            Some("trajectory must contain at least one sample")
        );
    }

    #[test]
    fn test_estimate_matches_two_step_call() {
        let options = TrajectoryOptions {
            num_states: Some(3),
            dt: Some(0.5),
        };
        let group = SymmetryGroup::new(vec![symmetry::Symmetry::Reflection]);
        let states = vec![0, 0, 1, 2, 2, 1];
        let trajectory = Trajectory::with_options(states.clone(), &options).unwrap();

        let one_shot = estimate(states, &options, &group, EstimatorKind::Generator).unwrap();
        let two_step = symmetry::symmetric_generator(&trajectory, &group).unwrap();
        assert_eq!(one_shot, Estimate::Generator(two_step));
    }
}
