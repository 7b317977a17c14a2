use std::fmt::Debug;

use crate::data_structures::frontier::Frontier;

/// Default number of children per heap node.
///
/// 8 nodes of `FrontierNode<GridState>` roughly span a couple of cache lines,
/// so finding the best child stays cheap while the tree gets much shallower.
pub const DEFAULT_ARITY: usize = 8usize;

// A heap is a tree-like structure where every subtree's root has a better
// score than all the other nodes in the subtree. It lives in an array
// traversed in a non-linear way.
//
// With arity A = 2 the indices look like,
//
// ```text
//                           0
//              1                         2
//       3            4            5             6
//   7      8      9     10    11     12     13     14
// 15 16  17 18  19 20  21 22 23 24  25
// ```
//
//   - Up:          (i-1) / A
//   - First child: (A*i) + 1
//   - Last child:  A*(i+1)

#[inline(always)]
#[must_use]
fn up<const A: usize>(i: usize) -> usize {
    (i - 1) / A
}
#[inline(always)]
#[must_use]
fn first_child<const A: usize>(i: usize) -> usize {
    (A * i) + 1
}
#[inline(always)]
#[must_use]
fn last_child<const A: usize>(i: usize) -> usize {
    A * (i + 1)
}

/// Index of the smallest element. Ties keep the leftmost one.
#[inline(always)]
#[must_use]
fn min_index<T: Ord>(xs: &[T]) -> usize {
    debug_assert!(!xs.is_empty());
    let mut min_i = 0usize;
    for (i, x) in xs.iter().enumerate().skip(1) {
        if *x < xs[min_i] {
            min_i = i;
        }
    }
    min_i
}

/// An array-backed min-heap where every node has up to `A` children.
///
/// ```
/// use maze_search::data_structures::d_ary_heap::DAryHeap;
/// use maze_search::data_structures::frontier::Frontier;
///
/// let mut heap = DAryHeap::<u8>::default();
/// for x in [5u8, 1, 4, 2, 3] {
///     heap.push(x);
/// }
/// assert_eq!(heap.pop(), Some(1));
/// assert_eq!(heap.pop(), Some(2));
/// assert_eq!(heap.len(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct DAryHeap<T, const A: usize = DEFAULT_ARITY>
where
    T: Ord + Debug,
{
    heap: Vec<T>,
}

impl<T, const A: usize> DAryHeap<T, A>
where
    T: Ord + Debug,
{
    pub fn new() -> Self {
        debug_assert!(A >= 2, "A heap needs at least 2 children per node");
        Self { heap: vec![] }
    }

    #[inline(always)]
    #[cfg(not(feature = "verify"))]
    pub(crate) fn verify_heap(&self) {
        // All good... (hopefully)
    }

    #[inline(always)]
    #[cfg(feature = "verify")]
    pub(crate) fn verify_heap(&self) {
        // Every node goes after its parent node, if any.
        for i in 1..self.heap.len() {
            let p = up::<A>(i);
            debug_assert!(
                self.heap[p] <= self.heap[i],
                "Node[{p}]={:?} !<= child [{i}]={:?}. Out of heap of len={}",
                self.heap[p],
                self.heap[i],
                self.heap.len(),
            );
        }
    }

    // Implementation details

    /// Pops the top node from a Heap with at least 2 elements.
    ///
    /// Sinks a hole from the root all the way to the last level by promoting
    /// the best child each time. Then the last element fills the hole and
    /// sifts up, which is usually short as it came from the bottom already.
    fn pop_non_trivial(&mut self) -> Option<T> {
        debug_assert!(self.heap.len() >= 2, "Trivial heaps just pop");

        let len = self.heap.len();
        let last = len - 1;

        let mut hole = 0;
        loop {
            let child = first_child::<A>(hole);
            if child >= len {
                break;
            }
            debug_assert_eq!(child + A, last_child::<A>(hole) + 1);
            let end = std::cmp::min(child + A, len);
            let best = child + min_index(&self.heap[child..end]);

            // The old top travels down with the hole
            self.heap.swap(hole, best);
            hole = best;
        }

        debug_assert!(hole <= last, "The hole={hole} is past last={last}");
        if hole != last {
            self.heap.swap(hole, last);
            let top = self.heap.pop();
            self.sift_up(hole);
            top
        } else {
            self.heap.pop()
        }
    }

    /// Raises a node
    /// Returns it's new index
    #[inline(always)]
    fn sift_up(&mut self, index: usize) -> usize {
        debug_assert!(index < self.heap.len(), "Index out of bounds...");

        let mut pos = index;
        while pos > 0 {
            let parent = up::<A>(pos);
            if self.heap[parent] <= self.heap[pos] {
                break;
            }
            self.heap.swap(parent, pos);
            pos = parent;
        }
        pos
    }
}

impl<T, const A: usize> Frontier<T> for DAryHeap<T, A>
where
    T: Ord + Debug,
{
    fn push(&mut self, t: T) {
        self.verify_heap();
        let heap_index = self.heap.len(); // Future heap_index

        self.heap.push(t);
        self.sift_up(heap_index);

        self.verify_heap();
    }

    fn pop(&mut self) -> Option<T> {
        self.verify_heap();

        let top = if self.heap.len() <= 1 {
            self.heap.pop()
        } else {
            self.pop_non_trivial()
        };

        self.verify_heap();
        top
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn clear(&mut self) {
        self.heap.clear();
    }
}

impl<T, const A: usize> Default for DAryHeap<T, A>
where
    T: Ord + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::Rng;
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    #[test]
    fn heap_works() {
        let mut heap = DAryHeap::<String>::new();

        let n = "aoeu".to_string();
        heap.push(n.clone());
        assert_eq!(heap.len(), 1);
        assert_eq!(heap.pop(), Some(n));
        assert_eq!(heap.pop(), None);
        assert!(heap.is_empty());
    }

    #[test]
    fn heap_sorts() {
        let mut heap = DAryHeap::<&str, 2>::new();

        for name in ["c", "e", "f", "a", "d", "b"] {
            heap.push(name);
        }
        assert_eq!(heap.pop(), Some("a"));
        assert_eq!(heap.pop(), Some("b"));
        assert_eq!(heap.pop(), Some("c"));
        assert_eq!(heap.pop(), Some("d"));
        assert_eq!(heap.pop(), Some("e"));
        assert_eq!(heap.pop(), Some("f"));
        assert_eq!(heap.pop(), None);
    }

    #[test]
    fn heap_matches_sorting() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        for arity_run in 0..3 {
            let xs: Vec<u32> = (0..500).map(|_| rng.random_range(0..100)).collect();
            let mut expected = xs.clone();
            expected.sort();

            let popped: Vec<u32> = match arity_run {
                0 => drain(DAryHeap::<u32, 2>::new(), &xs),
                1 => drain(DAryHeap::<u32, 3>::new(), &xs),
                _ => drain(DAryHeap::<u32>::new(), &xs),
            };
            assert_eq!(popped, expected);
        }
    }

    #[test]
    fn interleaved_pushes_and_pops() {
        let mut heap = DAryHeap::<u32>::new();
        heap.push(10);
        heap.push(3);
        assert_eq!(heap.pop(), Some(3));
        heap.push(7);
        heap.push(1);
        assert_eq!(heap.pop(), Some(1));
        assert_eq!(heap.pop(), Some(7));
        heap.clear();
        assert!(heap.is_empty());
    }

    fn drain<F: Frontier<u32>>(mut f: F, xs: &[u32]) -> Vec<u32> {
        for x in xs {
            f.push(*x);
        }
        let mut out = vec![];
        while let Some(x) = f.pop() {
            out.push(x);
        }
        out
    }
}
