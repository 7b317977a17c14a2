use std::fmt::Debug;
use std::marker::PhantomData;

use rustc_hash::FxHashSet;

use crate::algorithms::strategy::Strategy;
use crate::data_structures::d_ary_heap::DAryHeap;
use crate::data_structures::frontier::Frontier;
use crate::problem::ObjectiveHeuristic;
use crate::problem::Problem;
use crate::search::FrontierNode;
use crate::search::SearchNode;
use crate::search::SearchTree;
use crate::search::SearchTreeIndex;
use crate::space::Action;
use crate::space::Cost;
use crate::space::Path;
use crate::space::Space;
use crate::space::State;

/// Hard cap on the depth of any node.
pub const DEPTH_LIMIT: usize = 1_000_000;

/// Counters accumulated over every pass of a `TreeSearch`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Bounded passes run, only iterative deepening runs more than one.
    pub passes: usize,
    /// Nodes added to the search tree, roots included.
    pub generated: usize,
    /// Nodes whose successors were generated.
    pub expanded: usize,
    /// Frontier entries dropped because their state was already closed.
    pub discarded: usize,
    /// Expansions cut short by a depth limit.
    pub pruned: usize,
    pub max_frontier: usize,
}

impl std::fmt::Display for SearchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use thousands::Separable;

        write!(
            f,
            "passes: {}, generated: {}, expanded: {}, discarded: {}, pruned: {}, max frontier: {}",
            self.passes.separate_with_commas(),
            self.generated.separate_with_commas(),
            self.expanded.separate_with_commas(),
            self.discarded.separate_with_commas(),
            self.pruned.separate_with_commas(),
            self.max_frontier.separate_with_commas(),
        )
    }
}

/// A goal node along with the search tree that reached it.
#[derive(Clone, Debug)]
pub struct Solution<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    tree: SearchTree<St, A, C>,
    goal: SearchTreeIndex,
}

impl<St, A, C> Solution<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    /// The goal node.
    pub fn node(&self) -> &SearchNode<St, A, C> {
        &self.tree[self.goal]
    }

    /// Nodes from the root down to the goal.
    pub fn nodes(&self) -> Vec<&SearchNode<St, A, C>> {
        let mut nodes: Vec<_> = self.tree.ancestry(self.goal).map(|i| &self.tree[i]).collect();
        nodes.reverse();
        nodes
    }

    pub fn path(&self) -> Path<St, A, C> {
        self.tree.path(self.goal)
    }

    pub fn depth(&self) -> usize {
        self.node().depth()
    }

    pub fn cost(&self) -> C {
        self.node().cost()
    }
}

impl<St, A, C> std::fmt::Display for Solution<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    /// `[id][cost,state,parent_id,action,depth,heuristic,value]` per node.
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for n in self.nodes() {
            let (parent, action) = match n.parent {
                Some((p, a)) => (self.tree[p].id().to_string(), a.to_string()),
                None => ("-".to_string(), "-".to_string()),
            };
            writeln!(
                f,
                "[{}][{},{},{parent},{action},{},{},{}]",
                n.id(),
                n.cost(),
                n.state(),
                n.depth(),
                n.heuristic(),
                n.value()
            )?;
        }
        Ok(())
    }
}

/// Tree search whose expansion order is picked by a `Strategy`.
///
/// Every pass starts from a fresh frontier and closed set. Nodes get ids
/// from a counter owned by the search, so ids keep increasing across the
/// passes of iterative deepening.
pub struct TreeSearch<H, P, Sp, St, A, C, F = DAryHeap<FrontierNode<St>>>
where
    H: ObjectiveHeuristic<Sp, St, A, C>,
    P: Problem<Sp, St, A, C>,
    Sp: Space<St, A, C>,
    St: State,
    A: Action,
    C: Cost,
    F: Frontier<FrontierNode<St>>,
{
    problem: P,
    strategy: Strategy,
    depth_limit: usize,
    next_id: u64,
    stats: SearchStats,

    _phantom_heuristic: PhantomData<H>,
    _phantom_space: PhantomData<Sp>,
    _phantom_state: PhantomData<St>,
    _phantom_action: PhantomData<A>,
    _phantom_cost: PhantomData<C>,
    _phantom_frontier: PhantomData<F>,
}

impl<H, P, Sp, St, A, C, F> TreeSearch<H, P, Sp, St, A, C, F>
where
    H: ObjectiveHeuristic<Sp, St, A, C>,
    P: Problem<Sp, St, A, C>,
    Sp: Space<St, A, C>,
    St: State,
    A: Action,
    C: Cost,
    F: Frontier<FrontierNode<St>>,
{
    #[must_use]
    pub fn new(problem: P, strategy: Strategy) -> Self {
        Self {
            problem,
            strategy,
            depth_limit: DEPTH_LIMIT,
            next_id: 0,
            stats: SearchStats::default(),

            _phantom_heuristic: PhantomData,
            _phantom_space: PhantomData,
            _phantom_state: PhantomData,
            _phantom_action: PhantomData,
            _phantom_cost: PhantomData,
            _phantom_frontier: PhantomData,
        }
    }

    /// Replaces the hard depth cap, `DEPTH_LIMIT` by default.
    #[must_use]
    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }
    pub fn depth_limit(&self) -> usize {
        self.depth_limit
    }
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    #[inline(always)]
    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Finds a node holding the objective, or `None` once the reachable space
    /// within the depth cap is exhausted.
    ///
    /// Depth-first runs iterative deepening, a bounded pass for every limit
    /// `0, 1, 2, ...` up to the depth cap. Other strategies run a single pass.
    pub fn solve(&mut self) -> Option<Solution<St, A, C>> {
        log::debug!(
            "Solving {} -> {} with {}",
            self.problem.initial(),
            self.problem.objective(),
            self.strategy
        );
        if !self.strategy.is_iterative() {
            return self.solve_bounded(None);
        }

        for limit in 0..=self.depth_limit {
            let pruned = self.stats.pruned;
            if let Some(solution) = self.solve_bounded(Some(limit)) {
                return Some(solution);
            }
            if self.stats.pruned == pruned {
                // Nothing was cut, deeper passes would explore the same nodes
                log::debug!("Pass with limit {limit} explored every reachable state");
                return None;
            }
        }
        None
    }

    /// Runs a single pass where no node is deeper than `limit` (if any) or
    /// the depth cap.
    pub fn solve_bounded(&mut self, limit: Option<usize>) -> Option<Solution<St, A, C>> {
        let max_depth = limit.map_or(self.depth_limit, |l| l.min(self.depth_limit));
        let strategy = self.strategy;
        let objective = *self.problem.objective();
        let initial = *self.problem.initial();

        self.stats.passes += 1;
        let mut tree = SearchTree::<St, A, C>::new();
        let mut frontier = F::default();
        let mut closed = FxHashSet::<St>::default();

        let h = H::h(&initial, &objective);
        let root_id = self.next_id();
        let root = tree.push(SearchNode::new_root(
            root_id,
            initial,
            h,
            strategy.value(0, 0.0, h.as_f64()),
        ));
        frontier.push(tree[root].frontier_node(root));
        self.stats.generated += 1;
        self.stats.max_frontier = self.stats.max_frontier.max(frontier.len());

        while let Some(FrontierNode { index, .. }) = frontier.pop() {
            let node = &tree[index];
            let (state, depth, cost) = (*node.state(), node.depth(), node.cost());

            if !closed.insert(state) {
                self.stats.discarded += 1;
                continue;
            }
            if self.problem.is_goal(&state) {
                log::debug!(
                    "Pass {} found {state} at depth {depth} ({})",
                    self.stats.passes,
                    self.stats
                );
                return Some(Solution { tree, goal: index });
            }

            log::trace!("Expanding {state} (depth {depth}, cost {cost})");
            self.stats.expanded += 1;
            let next_depth = depth + 1;
            let successors = self.problem.space().successors(&state);
            for (a, s, c) in successors {
                // All successors share the same depth, so the rest would be cut too
                if next_depth > max_depth {
                    self.stats.pruned += 1;
                    break;
                }
                let next_cost = cost.saturating_add(&c);
                let h = H::h(&s, &objective);
                let value = strategy.value(next_depth, next_cost.as_f64(), h.as_f64());
                let id = self.next_id();
                let child = tree.push(SearchNode::new_from_parent(
                    id,
                    next_depth,
                    next_cost,
                    s,
                    (index, a),
                    h,
                    value,
                ));
                frontier.push(tree[child].frontier_node(child));
                self.stats.generated += 1;
            }
            self.stats.max_frontier = self.stats.max_frontier.max(frontier.len());
        }

        log::debug!(
            "Pass {} (limit {limit:?}) ran out of nodes ({})",
            self.stats.passes,
            self.stats
        );
        None
    }

    pub fn write_stats<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
        use size::Size;
        use std::mem::size_of;
        use thousands::Separable;

        writeln!(out, "TreeSearch Stats ({}):", self.strategy)?;
        writeln!(out, "  - Passes:    {}", self.stats.passes.separate_with_commas())?;
        let s = size_of::<SearchNode<St, A, C>>();
        let l = self.stats.generated;
        writeln!(
            out,
            "  - Generated: {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        writeln!(out, "  - Expanded:  {}", self.stats.expanded.separate_with_commas())?;
        writeln!(out, "  - Discarded: {}", self.stats.discarded.separate_with_commas())?;
        writeln!(out, "  - Pruned:    {}", self.stats.pruned.separate_with_commas())?;
        let s = size_of::<FrontierNode<St>>();
        let l = self.stats.max_frontier;
        writeln!(
            out,
            "  - |Frontier|*: {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        Ok(())
    }
}

impl<H, P, Sp, St, A, C, F> Debug for TreeSearch<H, P, Sp, St, A, C, F>
where
    H: ObjectiveHeuristic<Sp, St, A, C>,
    P: Problem<Sp, St, A, C>,
    Sp: Space<St, A, C>,
    St: State,
    A: Action,
    C: Cost,
    F: Frontier<FrontierNode<St>>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeSearch")
            .field("problem", &self.problem)
            .field("strategy", &self.strategy)
            .field("depth_limit", &self.depth_limit)
            .field("next_id", &self.next_id)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    use crate::data_structures::sorted_frontier::SortedFrontier;
    use crate::problem::ConstantHeuristic;
    use crate::problems::grid::Direction;
    use crate::problems::grid::Grid;
    use crate::problems::grid::GridCost;
    use crate::problems::grid::GridManhattanDistance;
    use crate::problems::grid::GridProblem;
    use crate::problems::grid::GridState;

    type Search<H> = TreeSearch<H, GridProblem, Grid, GridState, Direction, GridCost>;

    fn open_grid(rows: usize, cols: usize) -> Grid {
        let mut grid = Grid::new(rows, cols);
        for row in 0..rows {
            for col in 0..cols {
                let s = GridState::new_from_usize(row, col).unwrap();
                if col + 1 < cols {
                    grid.open_wall(&s, Direction::East).unwrap();
                }
                if row + 1 < rows {
                    grid.open_wall(&s, Direction::South).unwrap();
                }
            }
        }
        grid
    }

    /// 2x2 with the wall between (1,0) and (1,1) closed.
    fn two_by_two() -> GridProblem {
        let mut grid = Grid::new(2, 2);
        let origin = GridState::new(0, 0);
        grid.open_wall(&origin, Direction::East).unwrap();
        grid.open_wall(&origin, Direction::South).unwrap();
        grid.open_wall(&GridState::new(0, 1), Direction::South).unwrap();
        assert!(grid.is_spanning_tree());
        GridProblem::new(grid, origin, GridState::new(1, 1))
    }

    #[test]
    fn breadth_first_walks_the_tree() {
        let problem = two_by_two();
        let grid = problem.grid().clone();
        let mut search = Search::<ConstantHeuristic>::new(problem, Strategy::BreadthFirst);
        let solution = search.solve().unwrap();

        assert_eq!(solution.depth(), 2);
        assert_eq!(solution.cost(), 2);
        assert_eq!(*solution.node().state(), GridState::new(1, 1));

        let path = solution.path();
        assert_eq!(path.actions, vec![Direction::East, Direction::South]);
        assert!(grid.valid_path(&path));

        let nodes = solution.nodes();
        assert_eq!(nodes.len(), 3);
        assert!(nodes[0].is_root());
        assert_eq!(
            nodes.iter().map(|n| n.depth()).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        for pair in nodes.windows(2) {
            assert!(pair[0].id() < pair[1].id());
        }
    }

    #[test]
    fn every_strategy_solves_the_tree() {
        for strategy in Strategy::ALL {
            let mut search = Search::<GridManhattanDistance>::new(two_by_two(), strategy);
            let solution = search.solve().unwrap();
            assert_eq!(solution.depth(), 2, "{strategy}");
            assert_eq!(
                solution.path().actions,
                vec![Direction::East, Direction::South],
                "{strategy}"
            );
        }
    }

    #[test]
    fn starting_on_the_goal_expands_nothing() {
        for strategy in Strategy::ALL {
            let problem = GridProblem::new(open_grid(3, 3), GridState::new(1, 1), GridState::new(1, 1));
            let mut search = Search::<GridManhattanDistance>::new(problem, strategy);
            let solution = search.solve().unwrap();
            assert_eq!(solution.depth(), 0);
            assert_eq!(solution.cost(), 0);
            assert!(solution.node().is_root());
            assert_eq!(search.stats().expanded, 0);
            assert_eq!(search.stats().generated, 1);
        }
    }

    #[test]
    fn unreachable_objectives_have_no_solution() {
        for strategy in Strategy::ALL {
            let problem = GridProblem::new(Grid::new(1, 1), GridState::new(0, 0), GridState::new(5, 5));
            let mut search = Search::<ConstantHeuristic>::new(problem, strategy);
            assert!(search.solve().is_none(), "{strategy}");
            assert_eq!(search.stats().expanded, 1);
        }
    }

    #[test]
    fn objectives_at_the_far_corner_have_no_solution() {
        let far = GridState::new(u32::MAX, u32::MAX);
        for strategy in Strategy::ALL {
            let problem = GridProblem::new(Grid::new(1, 1), GridState::new(0, 0), far);
            let mut search = Search::<GridManhattanDistance>::new(problem, strategy);
            assert!(search.solve().is_none(), "{strategy}");
        }
    }

    #[test]
    fn closed_states_are_expanded_once() {
        let problem = GridProblem::new(open_grid(3, 3), GridState::new(0, 0), GridState::new(9, 9));
        for strategy in [Strategy::BreadthFirst, Strategy::UniformCost, Strategy::AStar] {
            let mut search = Search::<GridManhattanDistance>::new(problem.clone(), strategy);
            assert!(search.solve().is_none());

            let stats = search.stats();
            assert_eq!(stats.expanded, 9, "{strategy}");
            // Cycles reach states many times
            assert!(stats.generated > 9, "{strategy}");
            assert_eq!(stats.generated, stats.expanded + stats.discarded, "{strategy}");
        }
    }

    #[test]
    fn optimal_strategies_find_shortest_paths() {
        let grid = open_grid(3, 3);
        let problem = GridProblem::new(grid.clone(), GridState::new(0, 0), GridState::new(2, 2));
        for strategy in [Strategy::BreadthFirst, Strategy::UniformCost, Strategy::AStar] {
            let mut search = Search::<GridManhattanDistance>::new(problem.clone(), strategy);
            let solution = search.solve().unwrap();
            assert_eq!(solution.depth(), 4, "{strategy}");
            assert_eq!(solution.cost(), 4, "{strategy}");
            assert!(grid.valid_path(&solution.path()), "{strategy}");
        }

        // Any solution is fine for the rest
        for strategy in [Strategy::DepthFirst, Strategy::Greedy] {
            let mut search = Search::<GridManhattanDistance>::new(problem.clone(), strategy);
            let solution = search.solve().unwrap();
            assert!(solution.depth() >= 4, "{strategy}");
            assert!(grid.valid_path(&solution.path()), "{strategy}");
        }
    }

    #[test]
    fn uniform_cost_avoids_expensive_cells() {
        let mut grid = open_grid(3, 3);
        grid.set_traversal_cost(&GridState::new(1, 1), 10).unwrap();
        grid.set_traversal_cost(&GridState::new(0, 1), 10).unwrap();
        let problem = GridProblem::new(grid.clone(), GridState::new(0, 0), GridState::new(2, 2));

        let mut search = Search::<GridManhattanDistance>::new(problem, Strategy::UniformCost);
        let solution = search.solve().unwrap();
        assert_eq!(solution.cost(), 4);
        assert_eq!(
            solution.path().actions,
            vec![Direction::South, Direction::South, Direction::East, Direction::East]
        );
        assert!(grid.valid_path(&solution.path()));
    }

    #[test]
    fn iterative_deepening_grows_the_limit() {
        let problem = GridProblem::new(open_grid(1, 5), GridState::new(0, 0), GridState::new(0, 4));
        let mut search = Search::<ConstantHeuristic>::new(problem, Strategy::DepthFirst);
        let solution = search.solve().unwrap();
        assert_eq!(solution.depth(), 4);
        assert_eq!(search.stats().passes, 5);
        // Ids keep increasing across passes
        assert!(solution.nodes()[0].id() > 0);
    }

    #[test]
    fn depth_limit_bounds_every_pass() {
        let problem = GridProblem::new(open_grid(1, 5), GridState::new(0, 0), GridState::new(0, 4));
        for strategy in Strategy::ALL {
            let mut search =
                Search::<ConstantHeuristic>::new(problem.clone(), strategy).with_depth_limit(3);
            assert!(search.solve().is_none(), "{strategy}");
            assert!(search.stats().pruned > 0, "{strategy}");
        }
    }

    #[test]
    fn frontiers_agree() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let grid = Grid::wilson(8, 8, &mut rng);
        let problem = GridProblem::new(grid, GridState::new(0, 0), GridState::new(7, 7));
        for strategy in Strategy::ALL {
            let mut heap = Search::<GridManhattanDistance>::new(problem.clone(), strategy);
            let mut sorted = TreeSearch::<
                GridManhattanDistance,
                GridProblem,
                Grid,
                GridState,
                Direction,
                GridCost,
                SortedFrontier<FrontierNode<GridState>>,
            >::new(problem.clone(), strategy);

            let a = heap.solve().unwrap();
            let b = sorted.solve().unwrap();
            assert_eq!(a.path(), b.path(), "{strategy}");
            assert_eq!(a.to_string(), b.to_string(), "{strategy}");
            assert_eq!(heap.stats(), sorted.stats(), "{strategy}");
        }
    }

    #[test]
    fn solutions_list_their_nodes() {
        let mut search = Search::<ConstantHeuristic>::new(two_by_two(), Strategy::BreadthFirst);
        let solution = search.solve().unwrap();
        let lines: Vec<String> = solution.to_string().lines().map(String::from).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "[0][0,(0,0),-,-,0,1,0]");
        assert!(lines[1].starts_with("[1][1,(0,1),0,E,1,1,1]"), "{}", lines[1]);
        assert!(lines[2].ends_with(",S,2,1,2]"), "{}", lines[2]);
    }
}
