//! Uniform spanning trees through loop-erased random walks (Wilson's
//! algorithm).
//!
//! Every spanning tree of the grid graph is equally likely, which is a
//! property of the walk itself. The bookkeeping below can't change the
//! choices made (which cell starts a walk, which neighbour comes next), only
//! how fast they are found.

use rand::Rng;
use rand::seq::IndexedRandom;
use rustc_hash::FxHashMap;

use crate::problems::grid::Direction;
use crate::problems::grid::Grid;
use crate::problems::grid::GridState;

/// Cells not in the tree yet and not used as a walk start.
///
/// A vector supporting uniform sampling plus an index table for O(1)
/// removal of arbitrary cells.
struct FreeCells {
    cells: Vec<GridState>,
    /// Position of every cell in `cells`, by row-major offset.
    position: Vec<Option<usize>>,
    cols: usize,
}

impl FreeCells {
    fn new(rows: usize, cols: usize) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        let mut position = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                position.push(Some(cells.len()));
                cells.push(GridState::new(row as u32, col as u32));
            }
        }
        Self {
            cells,
            position,
            cols,
        }
    }

    fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn offset(&self, s: &GridState) -> usize {
        (s.row as usize) * self.cols + (s.col as usize)
    }

    fn swap_remove_at(&mut self, i: usize) -> GridState {
        let removed = self.cells.swap_remove(i);
        let removed_offset = self.offset(&removed);
        self.position[removed_offset] = None;
        if let Some(moved) = self.cells.get(i) {
            let moved_offset = self.offset(moved);
            self.position[moved_offset] = Some(i);
        }
        removed
    }

    fn remove_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> GridState {
        debug_assert!(!self.is_empty());
        let i = rng.random_range(0..self.cells.len());
        self.swap_remove_at(i)
    }

    fn remove(&mut self, s: &GridState) {
        if let Some(i) = self.position[self.offset(s)] {
            self.swap_remove_at(i);
        }
    }
}

/// A random walk that forgets the loops it closes.
#[derive(Default)]
struct LoopErasedWalk {
    path: Vec<GridState>,
    /// Position of every cell in `path`.
    index: FxHashMap<GridState, usize>,
}

impl LoopErasedWalk {
    fn clear(&mut self) {
        self.path.clear();
        self.index.clear();
    }

    /// Appends `s`, erasing the loop if `s` was already in the path.
    fn visit(&mut self, s: GridState) {
        if let Some(&first) = self.index.get(&s) {
            for erased in self.path.drain(first..) {
                self.index.remove(&erased);
            }
        }
        self.index.insert(s, self.path.len());
        self.path.push(s);
    }
}

impl Grid {
    /// Generates a maze with a uniformly random spanning tree of the grid.
    ///
    /// Grids without cells are returned as they are.
    ///
    /// ```
    /// use rand_chacha::ChaCha8Rng;
    /// use rand_chacha::rand_core::SeedableRng;
    ///
    /// use maze_search::problems::grid::Grid;
    ///
    /// let mut rng = ChaCha8Rng::seed_from_u64(0);
    /// let grid = Grid::wilson(4, 5, &mut rng);
    /// assert!(grid.is_spanning_tree());
    /// assert_eq!(grid.edge_count(), 4 * 5 - 1);
    /// ```
    pub fn wilson<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Grid {
        let mut grid = Grid::new(rows, cols);
        if grid.is_empty() {
            log::debug!("Skipping generation of a {rows}x{cols} grid");
            return grid;
        }

        let mut visited = vec![false; rows * cols];
        let offset = |s: &GridState| (s.row as usize) * cols + (s.col as usize);
        let mut free = FreeCells::new(rows, cols);

        // Seed the tree
        visited[rng.random_range(0..rows * cols)] = true;

        let mut walk = LoopErasedWalk::default();
        let mut walks = 0usize;
        let mut steps = 0usize;
        while !free.is_empty() {
            walk.clear();
            let mut current = free.remove_random(rng);

            // Walk till we hit the tree
            loop {
                walk.visit(current);
                if visited[offset(&current)] {
                    break;
                }
                let neighbours: smallvec::SmallVec<[GridState; 4]> =
                    grid.neighbours(&current).map(|(_d, n)| n).collect();
                current = match neighbours.choose(rng) {
                    Some(n) => *n,
                    // 1x1 grids are seeded already, nothing else lacks neighbours
                    None => break,
                };
                steps += 1;
            }

            // Graft the loop-erased path onto the tree
            for pair in walk.path.windows(2) {
                let (from, to) = (pair[0], pair[1]);
                visited[offset(&from)] = true;
                free.remove(&to);

                // Walks only step between neighbours
                let Some(d) = Direction::between(&from, &to) else {
                    unreachable!("{from} and {to} are not neighbours");
                };
                let opened = grid.open_wall(&from, d);
                debug_assert_eq!(opened, Ok(to));
            }
            walks += 1;
        }

        log::debug!(
            "Generated a {rows}x{cols} maze with {walks} walks and {steps} random steps"
        );
        debug_assert!(grid.is_spanning_tree());
        grid
    }

    /// Like `Grid::wilson`, using the thread-local random generator.
    pub fn generate(rows: usize, cols: usize) -> Grid {
        Grid::wilson(rows, cols, &mut rand::rng())
    }
}
