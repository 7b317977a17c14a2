use std::cmp::Ordering;
use std::fmt::Debug;

use nonmax::NonMaxUsize;
use ordered_float::OrderedFloat;

use crate::space::Action;
use crate::space::Cost;
use crate::space::Path;
use crate::space::State;

/// The strategy-specific ranking key of a node. Lower is expanded first.
pub type Value = OrderedFloat<f64>;

/// A reference to a `SearchNode<St, A, C>` within its `SearchTree`.
///
/// `NonMaxUsize` lets `Option<(SearchTreeIndex, A)>` use the niche instead of
/// a separate discriminant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchTreeIndex {
    index: NonMaxUsize,
}

impl SearchTreeIndex {
    #[inline(always)]
    fn new(index: usize) -> Self {
        Self {
            index: NonMaxUsize::new(index).expect("search trees can't hold usize::MAX nodes"),
        }
    }

    #[inline(always)]
    pub fn get(&self) -> usize {
        self.index.get()
    }
}

#[derive(Clone, Debug)]
pub struct SearchNode<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    pub(crate) id: u64,
    pub(crate) depth: usize,
    pub(crate) cost: C,
    pub(crate) state: St,
    pub(crate) parent: Option<(SearchTreeIndex, A)>,
    pub(crate) heuristic: C,
    pub(crate) value: Value,
}

impl<St, A, C> SearchNode<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    pub fn new_root(id: u64, state: St, heuristic: C, value: Value) -> Self {
        Self {
            id,
            depth: 0,
            cost: C::zero(),
            state,
            parent: None,
            heuristic,
            value,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new_from_parent(
        id: u64,
        depth: usize,
        cost: C,
        state: St,
        parent: (SearchTreeIndex, A),
        heuristic: C,
        value: Value,
    ) -> Self {
        Self {
            id,
            depth,
            cost,
            state,
            parent: Some(parent),
            heuristic,
            value,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
    pub fn depth(&self) -> usize {
        self.depth
    }
    pub fn cost(&self) -> C {
        self.cost
    }
    pub fn state(&self) -> &St {
        &self.state
    }
    pub fn heuristic(&self) -> C {
        self.heuristic
    }
    pub fn value(&self) -> Value {
        self.value
    }
    pub fn parent(&self) -> Option<SearchTreeIndex> {
        self.parent.map(|(p, _a)| p)
    }
    /// The action that reached this node from its parent.
    pub fn action(&self) -> Option<A> {
        self.parent.map(|(_p, a)| a)
    }
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Nodes are interchangeable for the closed set when they hold the same
    /// state, regardless of how they were reached.
    ///
    /// This is NOT the frontier order, see `FrontierNode`.
    #[inline(always)]
    pub fn same_state(&self, other: &Self) -> bool {
        self.state == other.state
    }

    #[inline(always)]
    pub(crate) fn frontier_node(&self, index: SearchTreeIndex) -> FrontierNode<St> {
        FrontierNode {
            value: self.value,
            state: self.state,
            id: self.id,
            index,
        }
    }
}

/// The frontier's view of a `SearchNode`.
///
/// Frontier nodes are totally ordered by `(value, state, id)`. Grid states
/// order by `(row, col)`, which makes this `(value, row, col, id)`. Ids are
/// unique, so distinct nodes never compare equal.
#[derive(Copy, Clone, Debug)]
pub struct FrontierNode<St: State> {
    pub value: Value,
    pub state: St,
    pub id: u64,
    /// The index of this node in the Search Tree
    pub index: SearchTreeIndex,
}

impl<St: State> FrontierNode<St> {
    #[inline(always)]
    pub fn compare_for_frontier(&self, other: &Self) -> Ordering {
        self.value
            .cmp(&other.value)
            .then_with(|| self.state.cmp(&other.state))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl<St: State> PartialEq for FrontierNode<St> {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.compare_for_frontier(other) == Ordering::Equal
    }
}
impl<St: State> Eq for FrontierNode<St> {}

impl<St: State> PartialOrd for FrontierNode<St> {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<St: State> Ord for FrontierNode<St> {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_for_frontier(other)
    }
}

/// All the nodes generated by a search pass.
///
/// Nodes point to their parents through indices, so the whole tree is dropped
/// at once with its owner.
#[derive(Clone)]
pub struct SearchTree<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    nodes: Vec<SearchNode<St, A, C>>,
}

impl<St, A, C> SearchTree<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    #[inline(always)]
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    #[inline(always)]
    pub fn push(&mut self, node: SearchNode<St, A, C>) -> SearchTreeIndex {
        let index = SearchTreeIndex::new(self.nodes.len());
        debug_assert!(
            node.parent().is_none_or(|p| p < index),
            "Parents must be pushed before their children"
        );
        self.nodes.push(node);
        index
    }

    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The indices from `node_index` up to its root.
    pub fn ancestry(&self, node_index: SearchTreeIndex) -> Ancestry<'_, St, A, C> {
        Ancestry {
            tree: self,
            next: Some(node_index),
        }
    }

    #[must_use]
    pub fn path(&self, node_index: SearchTreeIndex) -> Path<St, A, C> {
        let e = &self[node_index];
        let mut path = Path::<St, A, C>::new_from_start(*e.state());
        path.cost = e.cost;

        let mut index = node_index;
        while let Some((parent_index, a)) = self[index].parent {
            debug_assert!(index != parent_index);
            path.prepend(*self[parent_index].state(), a);
            index = parent_index;
        }

        debug_assert!(path.seems_valid());
        path
    }
}

impl<St, A, C> Default for SearchTree<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<St, A, C> std::ops::Index<SearchTreeIndex> for SearchTree<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    type Output = SearchNode<St, A, C>;

    #[inline(always)]
    fn index(&self, index: SearchTreeIndex) -> &Self::Output {
        &self.nodes[index.get()]
    }
}

impl<St, A, C> std::fmt::Debug for SearchTree<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "SearchTree{{({} nodes)}}", self.len())
    }
}

pub struct Ancestry<'t, St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    tree: &'t SearchTree<St, A, C>,
    next: Option<SearchTreeIndex>,
}

impl<St, A, C> Iterator for Ancestry<'_, St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    type Item = SearchTreeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree[current].parent();
        Some(current)
    }
}
