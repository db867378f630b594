use std::ops::{Index, IndexMut};

use serde::{Serialize, Serializer};

/// A dense `num_states × num_states` matrix indexed `[source][destination]`.
///
/// Entries are stored row-major. Serializes as a sequence of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct StateMatrix<T> {
    num_states: usize,
    entries: Vec<T>,
}

impl<T> StateMatrix<T>
where
    T: Copy + Default,
{
    pub(crate) fn zeros(num_states: usize) -> Self {
        assert!(num_states > 0, "state space must not be empty");
        Self {
            num_states,
            entries: vec![T::default(); num_states * num_states],
        }
    }
}

impl<T> StateMatrix<T> {
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Outgoing entries of `source`.
    #[must_use]
    pub fn row(&self, source: usize) -> &[T] {
        let start = source * self.num_states;
        &self.entries[start..start + self.num_states]
    }

    pub(crate) fn row_mut(&mut self, source: usize) -> &mut [T] {
        let start = source * self.num_states;
        &mut self.entries[start..start + self.num_states]
    }

    /// Iterates over rows in source order.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.entries.chunks_exact(self.num_states)
    }

    /// Copies the matrix into nested row vectors.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<T>>
    where
        T: Clone,
    {
        self.rows().map(<[T]>::to_vec).collect()
    }
}

impl<T> Index<(usize, usize)> for StateMatrix<T> {
    type Output = T;

    fn index(&self, (source, destination): (usize, usize)) -> &T {
        &self.row(source)[destination]
    }
}

impl<T> IndexMut<(usize, usize)> for StateMatrix<T> {
    fn index_mut(&mut self, (source, destination): (usize, usize)) -> &mut T {
        &mut self.row_mut(source)[destination]
    }
}

impl<T> Serialize for StateMatrix<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.rows())
    }
}
