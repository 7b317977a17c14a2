use std::fmt::Debug;

use crate::data_structures::frontier::Frontier;

/// A frontier backed by a vector kept in descending order.
///
/// Insertion finds its spot with a binary search but still shifts the tail,
/// popping the minimum is just popping the back. It behaves better than a heap
/// when the frontier stays tiny, like on narrow corridors.
#[derive(Clone, Debug)]
pub struct SortedFrontier<T>
where
    T: Ord + Debug,
{
    vector: Vec<T>,
}

impl<T> SortedFrontier<T>
where
    T: Ord + Debug,
{
    pub fn new() -> Self {
        Self { vector: vec![] }
    }
}

impl<T> Frontier<T> for SortedFrontier<T>
where
    T: Ord + Debug,
{
    fn push(&mut self, t: T) {
        // Descending, so everything greater than `t` stays in front of it.
        let i = self.vector.partition_point(|x| *x > t);
        self.vector.insert(i, t);
        debug_assert!(self.vector.is_sorted_by(|a, b| a >= b));
    }

    fn pop(&mut self) -> Option<T> {
        self.vector.pop()
    }

    fn len(&self) -> usize {
        self.vector.len()
    }

    fn clear(&mut self) {
        self.vector.clear();
    }
}

impl<T> Default for SortedFrontier<T>
where
    T: Ord + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
