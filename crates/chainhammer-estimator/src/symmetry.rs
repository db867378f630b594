//! Symmetry-pooled estimation.
//!
//! When the dynamics are known to be invariant under a relabeling of the
//! states, every observed transition `i → j` is also evidence for
//! `σ(i) → σ(j)`. The reducer relabels the trajectory once per symmetry
//! element, aggregates each copy independently and pools the raw counts and
//! holding times before normalizing once:
//!
//! ```text
//!              ┌─ σ₀ = id ─▶ aggregate ─┐
//! Trajectory ──┼─ σ₁ ──────▶ aggregate ─┼─▶ merge ─▶ Perron-Frobenius | Generator
//!              └─ σ₂ ──────▶ aggregate ─┘
//! ```
//!
//! Pooling before normalization keeps the pooled estimate equal to the
//! maximum-likelihood estimate over the combined evidence; averaging already
//! normalized matrices would not.
//!
//! The identity is always part of the pooled set; it is added when the
//! caller does not supply it. An empty group therefore reproduces the
//! unpooled estimators exactly.

use std::{panic, str::FromStr, thread};

use serde::Serialize;

use crate::{GeneratorMatrix, PerronFrobeniusMatrix, Trajectory, TransitionStatistics};

/// A relabeling of the state space.
///
/// Symmetries are a closed set of shapes so that each can be resolved to a
/// permutation table and validated before any aggregation work starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symmetry {
    /// Leaves every label unchanged.
    Identity,
    /// An explicit image table: state `s` maps to `table[s]`.
    Permutation(Vec<usize>),
    /// Maps `s` to `n - 1 - s`.
    Reflection,
    /// Maps `s` to `(s + k) mod n`.
    Shift(usize),
}

/// Why a symmetry cannot act on a given state space.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SymmetryMismatch {
    #[display("maps {len} labels but the state space has {num_states}")]
    LengthMismatch { len: usize, num_states: usize },
    #[display("maps state {state} to {image}, outside [0, {num_states})")]
    ImageOutOfRange {
        state: usize,
        image: usize,
        num_states: usize,
    },
    #[display("is not a bijection: states {first} and {second} both map to {image}")]
    NotBijective {
        first: usize,
        second: usize,
        image: usize,
    },
}

/// A symmetry of a group that does not fit the trajectory's state space.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("symmetry #{index} {mismatch}")]
pub struct SymmetryError {
    /// Position of the offending symmetry in the group.
    pub index: usize,
    pub mismatch: SymmetryMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid symmetry `{input}`: expected `identity`, `reflect`, `shift:K` or `perm:I,J,...`")]
pub struct ParseSymmetryError {
    input: String,
}

impl FromStr for Symmetry {
    type Err = ParseSymmetryError;

    /// Parses `identity`, `reflect`, `shift:K` or `perm:I,J,...`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainhammer_estimator::symmetry::Symmetry;
    ///
    /// assert_eq!("reflect".parse(), Ok(Symmetry::Reflection));
    /// assert_eq!("shift:2".parse(), Ok(Symmetry::Shift(2)));
    /// assert_eq!("perm:1,0,2".parse(), Ok(Symmetry::Permutation(vec![1, 0, 2])));
    /// assert!("rotate".parse::<Symmetry>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSymmetryError {
            input: s.to_owned(),
        };
        let s = s.trim();
        match s.split_once(':') {
            None if s == "identity" => Ok(Self::Identity),
            None if s == "reflect" => Ok(Self::Reflection),
            Some(("shift", k)) => k.trim().parse().map(Self::Shift).map_err(|_| err()),
            Some(("perm", table)) => table
                .split(',')
                .map(|image| image.trim().parse())
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Permutation)
                .map_err(|_| err()),
            _ => Err(err()),
        }
    }
}

impl Symmetry {
    /// Resolves this symmetry to a validated permutation of `[0, num_states)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainhammer_estimator::symmetry::Symmetry;
    ///
    /// let reflection = Symmetry::Reflection.resolve(4).unwrap();
    /// assert_eq!(reflection.apply(0), 3);
    /// assert!(Symmetry::Permutation(vec![0, 0]).resolve(2).is_err());
    /// ```
    pub fn resolve(&self, num_states: usize) -> Result<Permutation, SymmetryMismatch> {
        match self {
            Self::Identity => Ok(Permutation::identity(num_states)),
            Self::Permutation(table) => {
                if table.len() != num_states {
                    return Err(SymmetryMismatch::LengthMismatch {
                        len: table.len(),
                        num_states,
                    });
                }
                Permutation::new(table.clone())
            }
            Self::Reflection => Permutation::new((0..num_states).rev().collect()),
            Self::Shift(k) => {
                let k = k.checked_rem(num_states).unwrap_or(0);
                Permutation::new((0..num_states).map(|s| (s + k) % num_states).collect())
            }
        }
    }
}

/// A validated bijection of `[0, n)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    images: Vec<usize>,
}

impl Permutation {
    /// Validates that `images` is a bijection of `[0, images.len())`.
    pub fn new(images: Vec<usize>) -> Result<Self, SymmetryMismatch> {
        let num_states = images.len();
        let mut preimage = vec![None; num_states];
        for (state, &image) in images.iter().enumerate() {
            let slot = preimage
                .get_mut(image)
                .ok_or(SymmetryMismatch::ImageOutOfRange {
                    state,
                    image,
                    num_states,
                })?;
            if let Some(first) = *slot {
                return Err(SymmetryMismatch::NotBijective {
                    first,
                    second: state,
                    image,
                });
            }
            *slot = Some(state);
        }
        Ok(Self { images })
    }

    #[must_use]
    pub fn identity(num_states: usize) -> Self {
        Self {
            images: (0..num_states).collect(),
        }
    }

    /// Image of `state`.
    #[must_use]
    pub fn apply(&self, state: usize) -> usize {
        self.images[state]
    }

    #[must_use]
    pub fn num_states(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.images.iter().enumerate().all(|(s, &image)| s == image)
    }

    #[must_use]
    pub fn images(&self) -> &[usize] {
        &self.images
    }
}

/// The symmetries a trajectory is pooled over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymmetryGroup {
    elements: Vec<Symmetry>,
}

impl SymmetryGroup {
    #[must_use]
    pub fn new(elements: Vec<Symmetry>) -> Self {
        Self { elements }
    }

    /// A group with no supplied elements; pooling over it is a no-op.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn elements(&self) -> &[Symmetry] {
        &self.elements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Resolves every element against `num_states`, prepending the identity
    /// unless one of the elements already is the identity.
    pub fn resolve(&self, num_states: usize) -> Result<Vec<Permutation>, SymmetryError> {
        let mut permutations = self
            .elements
            .iter()
            .enumerate()
            .map(|(index, symmetry)| {
                symmetry
                    .resolve(num_states)
                    .map_err(|mismatch| SymmetryError { index, mismatch })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if !permutations.iter().any(Permutation::is_identity) {
            permutations.insert(0, Permutation::identity(num_states));
        }
        Ok(permutations)
    }
}

impl FromIterator<Symmetry> for SymmetryGroup {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Symmetry>,
    {
        Self::new(iter.into_iter().collect())
    }
}

/// Which estimator the pooled statistics feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimatorKind {
    PerronFrobenius,
    Generator,
}

/// The output of [`symmetric_estimate`].
#[derive(Debug, Clone, PartialEq, Serialize, derive_more::IsVariant)]
#[serde(untagged)]
pub enum Estimate {
    PerronFrobenius(PerronFrobeniusMatrix),
    Generator(GeneratorMatrix),
}

/// Aggregates every relabeled copy of `trajectory` and pools the results.
///
/// All symmetries are validated before any aggregation starts. Each copy is
/// aggregated on its own scoped thread; results are merged in group order.
pub fn pooled_statistics(
    trajectory: &Trajectory,
    group: &SymmetryGroup,
) -> Result<TransitionStatistics, SymmetryError> {
    let permutations = group.resolve(trajectory.num_states())?;
    tracing::debug!(
        supplied = group.len(),
        pooled = permutations.len(),
        samples = trajectory.len(),
        "pooling transition statistics over symmetries"
    );

    let per_symmetry = thread::scope(|s| {
        let handles = permutations
            .iter()
            .map(|permutation| {
                s.spawn(move || {
                    TransitionStatistics::aggregate(&trajectory.relabeled(permutation))
                })
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|payload| panic::resume_unwind(payload))
            })
            .collect::<Vec<_>>()
    });

    let mut per_symmetry = per_symmetry.into_iter();
    let mut pooled = per_symmetry
        .next()
        .expect("resolved group always contains the identity");
    for stats in per_symmetry {
        pooled.merge(&stats);
    }
    Ok(pooled)
}

/// Perron-Frobenius matrix of the symmetry-pooled statistics.
///
/// # Examples
///
/// ```
/// use chainhammer_estimator::{
///     Trajectory,
///     symmetry::{Symmetry, SymmetryGroup, symmetric_perron_frobenius},
/// };
///
/// // 0 → 1 observed, swap symmetry supplies 1 → 0
/// let trajectory = Trajectory::from_states(vec![0, 1]).unwrap();
/// let group = SymmetryGroup::new(vec![Symmetry::Permutation(vec![1, 0])]);
/// let matrix = symmetric_perron_frobenius(&trajectory, &group).unwrap();
/// assert_eq!(matrix.row(0), &[0.0, 1.0]);
/// assert_eq!(matrix.row(1), &[1.0, 0.0]);
/// ```
pub fn symmetric_perron_frobenius(
    trajectory: &Trajectory,
    group: &SymmetryGroup,
) -> Result<PerronFrobeniusMatrix, SymmetryError> {
    let pooled = pooled_statistics(trajectory, group)?;
    Ok(PerronFrobeniusMatrix::from_statistics(&pooled))
}

/// Generator matrix of the symmetry-pooled statistics.
pub fn symmetric_generator(
    trajectory: &Trajectory,
    group: &SymmetryGroup,
) -> Result<GeneratorMatrix, SymmetryError> {
    let pooled = pooled_statistics(trajectory, group)?;
    Ok(GeneratorMatrix::from_statistics(&pooled))
}

/// Pools over `group` and normalizes with the estimator selected by `kind`.
pub fn symmetric_estimate(
    trajectory: &Trajectory,
    group: &SymmetryGroup,
    kind: EstimatorKind,
) -> Result<Estimate, SymmetryError> {
    let pooled = pooled_statistics(trajectory, group)?;
    Ok(match kind {
        EstimatorKind::PerronFrobenius => {
            Estimate::PerronFrobenius(PerronFrobeniusMatrix::from_statistics(&pooled))
        }
        EstimatorKind::Generator => Estimate::Generator(GeneratorMatrix::from_statistics(&pooled)),
    })
}
