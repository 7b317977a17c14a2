//! Rectangular mazes where walls separate neighbouring cells.
//!
//! A cell may only be left through one of its open walls, and walls are
//! shared, so an open wall is open from both of its sides.

use std::collections::VecDeque;

use derive_more::Display;
use thiserror::Error;

use crate::problem::ObjectiveHeuristic;
use crate::space::Action;
use crate::space::Cost;
use crate::space::Space;
use crate::space::State;
use crate::space::Successors;

pub mod json;
pub mod problem;
pub mod render;
pub mod wilson;

pub use problem::GridProblem;

pub type Coord = u32;
pub type GridCost = u32;
impl Cost for GridCost {}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[display("({row},{col})")]
pub struct GridState {
    pub row: Coord,
    pub col: Coord,
}
impl State for GridState {}

impl GridState {
    pub const fn new(row: Coord, col: Coord) -> Self {
        Self { row, col }
    }
    pub fn new_from_usize(row: usize, col: usize) -> Option<Self> {
        Some(Self {
            row: Coord::try_from(row).ok()?,
            col: Coord::try_from(col).ok()?,
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridStateParseError {
    #[error("Expected a '(row,col)' pair, found '{0}'")]
    NotAPair(String),
    #[error("Invalid coordinate '{coord}' in '{input}'")]
    InvalidCoord { input: String, coord: String },
}

impl std::str::FromStr for GridState {
    type Err = GridStateParseError;

    /// Parses `(r,c)`, `[r, c]` and bare `r,c` pairs.
    ///
    /// ```
    /// use maze_search::problems::grid::GridState;
    ///
    /// assert_eq!("(3,4)".parse(), Ok(GridState::new(3, 4)));
    /// assert_eq!("[3, 4]".parse(), Ok(GridState::new(3, 4)));
    /// assert_eq!(" 3,4 ".parse(), Ok(GridState::new(3, 4)));
    /// assert!("(3,4,5)".parse::<GridState>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('(')
            .and_then(|t| t.strip_suffix(')'))
            .or_else(|| trimmed.strip_prefix('[').and_then(|t| t.strip_suffix(']')))
            .unwrap_or(trimmed);

        let mut parts = inner.split(',');
        let (Some(row), Some(col), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(GridStateParseError::NotAPair(s.to_string()));
        };

        let parse = |coord: &str| {
            coord
                .trim()
                .parse::<Coord>()
                .map_err(|_| GridStateParseError::InvalidCoord {
                    input: s.to_string(),
                    coord: coord.trim().to_string(),
                })
        };
        Ok(GridState::new(parse(row)?, parse(col)?))
    }
}

/// Moves between neighbouring cells, in their canonical order.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    #[display("N")]
    North = 0, // row--
    #[display("E")]
    East = 1, // col++
    #[display("S")]
    South = 2, // row++
    #[display("O")]
    West = 3, // col--
}
impl Action for Direction {}

impl Direction {
    pub const COUNT: usize = 4;
    pub const ALL: [Direction; Direction::COUNT] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline(always)]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// `(drow, dcol)` step vector.
    #[rustfmt::skip]
    #[inline(always)]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (-1,  0),
            Direction::East  => ( 0,  1),
            Direction::South => ( 1,  0),
            Direction::West  => ( 0, -1),
        }
    }

    pub fn from_delta(delta: (i32, i32)) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.delta() == delta)
    }

    /// The direction that moves from `a` to the adjacent `b`, if they are
    /// adjacent.
    pub fn between(a: &GridState, b: &GridState) -> Option<Direction> {
        let dr = i64::from(b.row) - i64::from(a.row);
        let dc = i64::from(b.col) - i64::from(a.col);
        Direction::from_delta((i32::try_from(dr).ok()?, i32::try_from(dc).ok()?))
    }

    /// Persisted label.
    pub fn label(self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::East => "E",
            Direction::South => "S",
            Direction::West => "O",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub(crate) position: GridState,
    pub(crate) open: [bool; Direction::COUNT],
    pub(crate) traversal_cost: GridCost,
}

impl Cell {
    pub fn new(position: GridState) -> Self {
        Self {
            position,
            open: [false; Direction::COUNT],
            traversal_cost: 0,
        }
    }

    pub fn position(&self) -> GridState {
        self.position
    }
    pub fn open(&self) -> &[bool; Direction::COUNT] {
        &self.open
    }
    #[inline(always)]
    pub fn is_open(&self, d: Direction) -> bool {
        self.open[d.index()]
    }
    pub fn traversal_cost(&self) -> GridCost {
        self.traversal_cost
    }

    /// Leaving a cell costs at least 1, even when it's free to cross.
    #[inline(always)]
    pub fn step_cost(&self) -> GridCost {
        self.traversal_cost.saturating_add(1)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("{state} is outside the {rows}x{cols} grid")]
    OutOfBounds {
        state: GridState,
        rows: usize,
        cols: usize,
    },
    #[error("{state} can't open its {direction} wall, it's on the boundary")]
    Boundary {
        state: GridState,
        direction: Direction,
    },
}

#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    /// Row-major cells
    cells: Vec<Cell>,
}

impl Grid {
    /// A grid where every wall is closed.
    pub fn new(rows: usize, cols: usize) -> Self {
        if rows == 0 || cols == 0 {
            return Self {
                rows,
                cols,
                cells: vec![],
            };
        }
        debug_assert!(GridState::new_from_usize(rows - 1, cols - 1).is_some());

        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(Cell::new(GridState::new(row as Coord, col as Coord)));
            }
        }
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn cols(&self) -> usize {
        self.cols
    }
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
    /// Whether the grid has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline(always)]
    pub fn contains(&self, s: &GridState) -> bool {
        (s.row as usize) < self.rows && (s.col as usize) < self.cols
    }

    #[inline(always)]
    fn offset(&self, s: &GridState) -> Option<usize> {
        self.contains(s)
            .then_some((s.row as usize) * self.cols + (s.col as usize))
    }

    pub fn cell(&self, s: &GridState) -> Option<&Cell> {
        self.offset(s).map(|i| &self.cells[i])
    }

    fn cell_mut(&mut self, s: &GridState) -> Result<&mut Cell, GridError> {
        let (rows, cols) = self.dimensions();
        match self.offset(s) {
            Some(i) => Ok(&mut self.cells[i]),
            None => Err(GridError::OutOfBounds {
                state: *s,
                rows,
                cols,
            }),
        }
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// The in-bounds cell next to `s`, ignoring walls.
    #[inline(always)]
    pub fn neighbour(&self, s: &GridState, d: Direction) -> Option<GridState> {
        let (dr, dc) = d.delta();
        let row = s.row.checked_add_signed(dr)?;
        let col = s.col.checked_add_signed(dc)?;
        let n = GridState::new(row, col);
        self.contains(&n).then_some(n)
    }

    /// In-bounds neighbours of `s`, ignoring walls.
    pub fn neighbours(&self, s: &GridState) -> impl Iterator<Item = (Direction, GridState)> {
        Direction::ALL
            .into_iter()
            .filter_map(|d| self.neighbour(s, d).map(|n| (d, n)))
    }

    /// Opens the wall between `s` and its neighbour towards `d`, on both sides.
    ///
    /// Returns the neighbour.
    pub fn open_wall(&mut self, s: &GridState, d: Direction) -> Result<GridState, GridError> {
        let n = match self.neighbour(s, d) {
            Some(n) => n,
            None => {
                // Distinguish a bad state from a boundary wall
                self.cell_mut(s)?;
                return Err(GridError::Boundary {
                    state: *s,
                    direction: d,
                });
            }
        };
        self.cell_mut(s)?.open[d.index()] = true;
        self.cell_mut(&n)?.open[d.opposite().index()] = true;
        Ok(n)
    }

    pub fn set_traversal_cost(&mut self, s: &GridState, cost: GridCost) -> Result<(), GridError> {
        self.cell_mut(s)?.traversal_cost = cost;
        Ok(())
    }

    /// Number of open walls, counting each shared wall once.
    pub fn edge_count(&self) -> usize {
        self.cells
            .iter()
            .map(|c| c.is_open(Direction::East) as usize + c.is_open(Direction::South) as usize)
            .sum()
    }

    /// Whether every open flag is matched by its neighbour, and none opens
    /// onto the outside.
    pub fn walls_are_symmetric(&self) -> bool {
        self.cells.iter().all(|c| {
            Direction::ALL.into_iter().all(|d| {
                match self.neighbour(&c.position, d) {
                    Some(n) => self.cell(&n).is_some_and(|nc| nc.is_open(d.opposite()) == c.is_open(d)),
                    None => !c.is_open(d),
                }
            })
        })
    }

    /// Cells reachable from `start` through open walls.
    pub fn reachable_from(&self, start: &GridState) -> usize {
        let Some(start_offset) = self.offset(start) else {
            return 0;
        };
        let mut seen = vec![false; self.cells.len()];
        seen[start_offset] = true;
        let mut reached = 1usize;
        let mut queue = VecDeque::from([*start]);

        while let Some(s) = queue.pop_front() {
            for (_d, n, _c) in self.successors(&s) {
                if let Some(i) = self.offset(&n) {
                    if !seen[i] {
                        seen[i] = true;
                        reached += 1;
                        queue.push_back(n);
                    }
                }
            }
        }
        reached
    }

    pub fn is_connected(&self) -> bool {
        match self.cells.first() {
            Some(first) => self.reachable_from(&first.position) == self.cells.len(),
            None => true,
        }
    }

    /// Connected with exactly `|cells| - 1` edges, which rules out cycles.
    pub fn is_spanning_tree(&self) -> bool {
        if self.cells.is_empty() {
            return self.edge_count() == 0;
        }
        self.walls_are_symmetric()
            && self.edge_count() == self.cells.len() - 1
            && self.is_connected()
    }
}

impl Space<GridState, Direction, GridCost> for Grid {
    #[inline(always)]
    fn apply(&self, s: &GridState, d: &Direction) -> Option<GridState> {
        if self.cell(s)?.is_open(*d) {
            self.neighbour(s, *d)
        } else {
            None
        }
    }

    #[inline(always)]
    fn cost(&self, s: &GridState, _d: &Direction) -> GridCost {
        self.cell(s).map(Cell::step_cost).unwrap_or(GridCost::MAX)
    }

    /// Follows every open wall, in `Direction::ALL` order.
    fn successors(&self, s: &GridState) -> Successors<GridState, Direction, GridCost> {
        let mut v = Successors::new();
        let Some(cell) = self.cell(s) else {
            return v;
        };
        let c = cell.step_cost();
        for d in Direction::ALL {
            if cell.is_open(d) {
                if let Some(n) = self.neighbour(s, d) {
                    v.push((d, n, c));
                }
            }
        }
        v
    }

    #[inline(always)]
    fn valid(&self, s: &GridState) -> bool {
        self.contains(s)
    }

    fn size(&self) -> Option<usize> {
        Some(self.cells.len())
    }
}

impl std::fmt::Display for Grid {
    /// Draws walls with ASCII art.
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "Grid({}x{}):", self.rows, self.cols)?;
        if self.cells.is_empty() {
            return Ok(());
        }

        for row in self.cells.chunks(self.cols) {
            for cell in row {
                let top = if cell.is_open(Direction::North) { "   " } else { "---" };
                write!(f, "+{top}")?;
            }
            writeln!(f, "+")?;
            for cell in row {
                let left = if cell.is_open(Direction::West) { ' ' } else { '|' };
                write!(f, "{left}   ")?;
            }
            writeln!(f, "|")?;
        }
        for _ in 0..self.cols {
            write!(f, "+---")?;
        }
        writeln!(f, "+")
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Grid{:?}", self.dimensions())
    }
}

/// Steps needed ignoring walls.
///
/// Admissible as every step costs at least 1.
#[derive(Debug)]
pub struct GridManhattanDistance;

impl ObjectiveHeuristic<Grid, GridState, Direction, GridCost> for GridManhattanDistance {
    #[inline(always)]
    fn h(a: &GridState, b: &GridState) -> GridCost {
        a.row.abs_diff(b.row).saturating_add(a.col.abs_diff(b.col))
    }
}
