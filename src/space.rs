use std::fmt::Debug;
use std::hash::Hash;

use num_traits::SaturatingAdd;
use num_traits::ToPrimitive;
use num_traits::sign::Unsigned;
use smallvec::SmallVec;

pub trait Action: Copy + Clone + Debug + std::fmt::Display + PartialEq + Eq {}

/// A searchable state.
///
/// States are totally ordered so the frontier can break ties between equally
/// valued nodes deterministically.
pub trait State: Copy + Clone + Debug + std::fmt::Display + PartialEq + Eq + Hash + Ord {}

pub trait Cost:
    Copy
    + Clone
    + Debug
    + std::fmt::Display
    + PartialEq
    + Eq
    + PartialOrd
    + Ord
    + SaturatingAdd
    + Unsigned
    + ToPrimitive
    + num_traits::bounds::UpperBounded
    + std::ops::Add
    + std::ops::AddAssign
{
    fn valid(&self) -> bool {
        *self != Self::max_value()
    }

    /// Lossy view used when mixing costs with depths and heuristics.
    fn as_f64(&self) -> f64 {
        self.to_f64().unwrap_or(f64::INFINITY)
    }
}

/// A single expansion result, `(action, next_state, step_cost)`.
pub type Successor<St, A, C> = (A, St, C);
/// Expansion results of a single state.
///
/// Grids never have more than 4 successors, so these rarely spill to the heap.
pub type Successors<St, A, C> = SmallVec<[Successor<St, A, C>; 4]>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path<S, A, C>
where
    S: State,
    A: Action,
    C: Cost,
{
    pub start: Option<S>,
    pub end: Option<S>,
    pub cost: C,
    pub actions: Vec<A>,
}

impl<S, A, C> Path<S, A, C>
where
    S: State,
    A: Action,
    C: Cost,
{
    #[inline(always)]
    pub fn new_from_start(start: S) -> Self {
        Self {
            start: Some(start),
            end: Some(start),
            cost: C::zero(),
            actions: vec![],
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Runs sanity checks
    #[inline(always)]
    pub fn seems_valid(&self) -> bool {
        self.start.is_some() == self.end.is_some() && self.cost.valid()
    }

    /// Prepends a step that reached the current start from `previous`.
    ///
    /// Paths are rebuilt walking parent links, so they naturally grow
    /// backwards.
    #[inline(always)]
    pub fn prepend(&mut self, previous: S, a: A) {
        self.actions.insert(0, a);
        self.start = Some(previous);
    }

    #[inline(always)]
    pub fn empty() -> Self {
        Self {
            start: None,
            actions: vec![],
            end: None,
            cost: C::zero(),
        }
    }
}

impl<S, A, C> std::fmt::Display for Path<S, A, C>
where
    S: State,
    A: Action,
    C: Cost,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        debug_assert!(self.start.is_none() == self.end.is_none());

        match (self.start, self.end) {
            (Some(start), Some(end)) => {
                write!(f, "Path({}, {start}:", self.cost)?;
                for a in &self.actions {
                    write!(f, "{a}")?;
                }
                write!(f, ":{end})")
            }
            (None, None) => write!(f, "Path()"),
            _ => unreachable!("Path::start and Path::end should both be Some or None"),
        }
    }
}

pub trait Space<St, A, C>: Clone + std::fmt::Debug
where
    St: State,
    A: Action,
    C: Cost,
{
    /// Follows an action, if it's available from the given state.
    fn apply(&self, s: &St, a: &A) -> Option<St>;

    /// The cost of following `a` from `s`.
    fn cost(&self, _s: &St, _a: &A) -> C {
        C::one()
    }

    /// Expands a State.
    ///
    /// Must be idempotent, the search relies on it to accumulate depth and
    /// cost consistently.
    fn successors(&self, s: &St) -> Successors<St, A, C>;

    /// Verify is a State is valid.
    fn valid(&self, s: &St) -> bool;

    fn valid_path(&self, p: &Path<St, A, C>) -> bool {
        if let Some(start) = p.start {
            // Verify path
            let mut state: St = start;
            let mut cost: C = C::zero();
            for a in &p.actions {
                let c = self.cost(&state, a);
                match self.apply(&state, a) {
                    Some(new_state) => state = new_state,
                    None => return false,
                }
                cost = cost.saturating_add(&c);
            }
            match p.end {
                Some(end) => end == state && cost == p.cost,
                None => false,
            }
        } else {
            // Empty paths are fine
            *p == Path::<St, A, C>::empty()
        }
    }

    fn size(&self) -> Option<usize> {
        None
    }
}
