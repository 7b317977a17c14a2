use std::fmt::Debug;

/// A min-priority queue of nodes waiting to be expanded.
///
/// Implementations only need to agree on `pop` returning the minimum element
/// under `Ord`. Elements are expected to be unique under `Ord`, so the pop
/// order is fully determined.
pub trait Frontier<T: Ord>: Default + Debug {
    fn push(&mut self, t: T);
    fn pop(&mut self) -> Option<T>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);
}
