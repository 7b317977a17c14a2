use crate::space::Action;
use crate::space::Cost;
use crate::space::Space;
use crate::space::State;

/// A single-start, single-objective search problem.
pub trait Problem<Sp, St, A, C>: std::fmt::Debug
where
    Sp: Space<St, A, C>,
    St: State,
    A: Action,
    C: Cost,
{
    fn space(&self) -> &Sp;
    fn initial(&self) -> &St;
    fn objective(&self) -> &St;

    /// Exact equality against the objective.
    fn is_goal(&self, s: &St) -> bool {
        s == self.objective()
    }
}

/// An estimate of the remaining cost towards an objective.
///
/// It's only used to rank nodes, so it only affects strategies that look at
/// it (greedy and A*).
pub trait ObjectiveHeuristic<Sp, St, A, C>: std::fmt::Debug
where
    Sp: Space<St, A, C>,
    St: State,
    A: Action,
    C: Cost,
{
    fn h(s: &St, objective: &St) -> C;
}

/// Placeholder heuristic that estimates every state the same.
///
/// As it's constant it doesn't change the relative order of nodes.
#[derive(Debug)]
pub struct ConstantHeuristic;

impl<Sp, St, A, C> ObjectiveHeuristic<Sp, St, A, C> for ConstantHeuristic
where
    Sp: Space<St, A, C>,
    St: State,
    A: Action,
    C: Cost,
{
    #[inline(always)]
    fn h(_s: &St, _objective: &St) -> C {
        C::one()
    }
}
