//! JSON persistence of mazes.
//!
//! ```json
//! {
//!   "rows": 1, "cols": 2, "max_n": 4,
//!   "mov": [[-1, 0], [0, 1], [1, 0], [0, -1]],
//!   "id_mov": ["N", "E", "S", "O"],
//!   "cells": {
//!     "(0,0)": {"value": 0, "neighbors": [false, true, false, false]},
//!     "(0,1)": {"value": 0, "neighbors": [false, false, false, true]}
//!   }
//! }
//! ```
//!
//! Loading never regenerates anything, but it refuses documents that would
//! break the wall symmetry successors rely on.

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::problems::grid::Cell;
use crate::problems::grid::Direction;
use crate::problems::grid::Grid;
use crate::problems::grid::GridCost;
use crate::problems::grid::GridState;
use crate::problems::grid::GridStateParseError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellDocument {
    pub value: GridCost,
    pub neighbors: Vec<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeDocument {
    pub rows: usize,
    pub cols: usize,
    pub max_n: usize,
    pub mov: Vec<[i32; 2]>,
    pub id_mov: Vec<String>,
    pub cells: BTreeMap<String, CellDocument>,
}

#[derive(Debug, Error)]
pub enum MazeLoadError {
    #[error("I/O error when loading '{p}': {e}")]
    IOError { p: PathBuf, e: std::io::Error },
    #[error("Invalid maze JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Expected {expected} moves per cell, the maze declares {found}")]
    MoveCount { expected: usize, found: usize },
    #[error("Direction table mismatch: expected {expected:?}, found {found:?}")]
    DirectionTable { expected: String, found: String },
    #[error("Invalid cell key '{key}': {e}")]
    InvalidKey { key: String, e: GridStateParseError },
    #[error("Cell '{key}' is outside the {rows}x{cols} maze")]
    CellOutOfBounds { key: String, rows: usize, cols: usize },
    #[error("Cell {state} is defined more than once ('{key}')")]
    DuplicateCell { key: String, state: GridState },
    #[error("A {rows}x{cols} maze can't be made of {cells} cells")]
    Dimensions { rows: usize, cols: usize, cells: usize },
    #[error("Cell '{key}' has {found} neighbour flags, expected {expected}")]
    NeighbourCount {
        key: String,
        expected: usize,
        found: usize,
    },
    #[error("Cell {state} opens its {direction} wall onto the boundary")]
    OpenBoundary {
        state: GridState,
        direction: Direction,
    },
    #[error("Wall {direction} of {state} is open on one side only")]
    AsymmetricWall {
        state: GridState,
        direction: Direction,
    },
}

fn canonical_moves() -> Vec<[i32; 2]> {
    Direction::ALL
        .into_iter()
        .map(|d| {
            let (dr, dc) = d.delta();
            [dr, dc]
        })
        .collect()
}

fn canonical_labels() -> Vec<String> {
    Direction::ALL
        .into_iter()
        .map(|d| d.label().to_string())
        .collect()
}

/// Persisted key of a cell.
pub fn cell_key(s: &GridState) -> String {
    format!("({},{})", s.row, s.col)
}

impl From<&Grid> for MazeDocument {
    fn from(grid: &Grid) -> Self {
        let cells = grid
            .cells()
            .map(|c| {
                (
                    cell_key(&c.position()),
                    CellDocument {
                        value: c.traversal_cost(),
                        neighbors: c.open().to_vec(),
                    },
                )
            })
            .collect();

        MazeDocument {
            rows: grid.rows(),
            cols: grid.cols(),
            max_n: Direction::COUNT,
            mov: canonical_moves(),
            id_mov: canonical_labels(),
            cells,
        }
    }
}

impl TryFrom<MazeDocument> for Grid {
    type Error = MazeLoadError;

    fn try_from(doc: MazeDocument) -> Result<Self, Self::Error> {
        if doc.max_n != Direction::COUNT {
            return Err(MazeLoadError::MoveCount {
                expected: Direction::COUNT,
                found: doc.max_n,
            });
        }
        if doc.mov != canonical_moves() {
            return Err(MazeLoadError::DirectionTable {
                expected: format!("{:?}", canonical_moves()),
                found: format!("{:?}", doc.mov),
            });
        }
        if doc.id_mov != canonical_labels() {
            return Err(MazeLoadError::DirectionTable {
                expected: format!("{:?}", canonical_labels()),
                found: format!("{:?}", doc.id_mov),
            });
        }

        let mut cells = Vec::with_capacity(doc.cells.len());
        for (key, cell_doc) in doc.cells {
            let state: GridState = key.parse().map_err(|e| MazeLoadError::InvalidKey {
                key: key.clone(),
                e,
            })?;
            let open: [bool; Direction::COUNT] = cell_doc.neighbors.as_slice().try_into().map_err(
                |_| MazeLoadError::NeighbourCount {
                    key: key.clone(),
                    expected: Direction::COUNT,
                    found: cell_doc.neighbors.len(),
                },
            )?;
            cells.push((
                key,
                Cell {
                    position: state,
                    open,
                    traversal_cost: cell_doc.value,
                },
            ));
        }

        Grid::from_cells(doc.rows, doc.cols, cells)
    }
}

impl Grid {
    /// Rebuilds a grid from keyed cells, checking it's complete and that its
    /// walls are consistent.
    ///
    /// The dimensions must fit `Coord` and account for exactly the given
    /// cells, so nothing is allocated past what the caller already holds.
    pub fn from_cells(
        rows: usize,
        cols: usize,
        cells: Vec<(String, Cell)>,
    ) -> Result<Grid, MazeLoadError> {
        let fits =
            rows == 0 || cols == 0 || GridState::new_from_usize(rows - 1, cols - 1).is_some();
        if !fits || rows.checked_mul(cols) != Some(cells.len()) {
            return Err(MazeLoadError::Dimensions {
                rows,
                cols,
                cells: cells.len(),
            });
        }

        let mut grid = Grid::new(rows, cols);
        let mut seen = vec![false; cells.len()];

        // As many cells as slots, no duplicates and none outside covers them all
        for (key, cell) in cells {
            let state = cell.position;
            let Some(offset) = grid.offset(&state) else {
                return Err(MazeLoadError::CellOutOfBounds { key, rows, cols });
            };
            if seen[offset] {
                return Err(MazeLoadError::DuplicateCell { key, state });
            }
            seen[offset] = true;
            grid.cells[offset] = cell;
        }
        debug_assert!(seen.iter().all(|s| *s));

        for cell in grid.cells() {
            for d in Direction::ALL {
                if !cell.is_open(d) {
                    continue;
                }
                let state = cell.position;
                match grid.neighbour(&state, d).and_then(|n| grid.cell(&n)) {
                    None => return Err(MazeLoadError::OpenBoundary { state, direction: d }),
                    Some(n) if !n.is_open(d.opposite()) => {
                        return Err(MazeLoadError::AsymmetricWall { state, direction: d });
                    }
                    Some(_) => {}
                }
            }
        }
        debug_assert!(grid.walls_are_symmetric());

        log::debug!(
            "Loaded a {rows}x{cols} maze with {} open walls",
            grid.edge_count()
        );
        Ok(grid)
    }

    pub fn to_json(&self) -> Result<String, MazeLoadError> {
        Ok(serde_json::to_string_pretty(&MazeDocument::from(self))?)
    }

    pub fn from_json(s: &str) -> Result<Grid, MazeLoadError> {
        let doc: MazeDocument = serde_json::from_str(s)?;
        Grid::try_from(doc)
    }

    pub fn save_json(&self, p: &Path) -> Result<(), MazeLoadError> {
        std::fs::write(p, self.to_json()?).map_err(|e| MazeLoadError::IOError {
            p: p.to_path_buf(),
            e,
        })
    }

    pub fn load_json(p: &Path) -> Result<Grid, MazeLoadError> {
        let s = std::fs::read_to_string(p).map_err(|e| MazeLoadError::IOError {
            p: p.to_path_buf(),
            e,
        })?;
        Grid::from_json(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    const TINY: &str = indoc! {r#"
        {
          "rows": 1, "cols": 2, "max_n": 4,
          "mov": [[-1, 0], [0, 1], [1, 0], [0, -1]],
          "id_mov": ["N", "E", "S", "O"],
          "cells": {
            "(0,0)": {"value": 0, "neighbors": [false, true, false, false]},
            "(0, 1)": {"value": 3, "neighbors": [false, false, false, true]}
          }
        }
    "#};

    fn tiny_with(from: &str, to: &str) -> String {
        TINY.replace(from, to)
    }

    #[test]
    fn loads_a_tiny_maze() {
        let grid = Grid::from_json(TINY).unwrap();
        assert_eq!(grid.dimensions(), (1, 2));
        assert!(grid.is_spanning_tree());
        assert_eq!(grid.cell(&GridState::new(0, 1)).unwrap().traversal_cost(), 3);
    }

    #[test]
    fn round_trips() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut grid = Grid::wilson(6, 4, &mut rng);
        grid.set_traversal_cost(&GridState::new(2, 3), 7).unwrap();

        let json = grid.to_json().unwrap();
        let loaded = Grid::from_json(&json).unwrap();
        assert_eq!(loaded, grid);
        assert_eq!(loaded.to_json().unwrap(), json);
    }

    #[test]
    fn round_trips_through_files() {
        let grid = Grid::wilson(3, 3, &mut ChaCha8Rng::seed_from_u64(1));
        let p = std::env::temp_dir().join(format!("maze-search-{}-round-trip.json", std::process::id()));
        grid.save_json(&p).unwrap();
        assert!(std::fs::metadata(&p).unwrap().len() > 0);
        let loaded = Grid::load_json(&p).unwrap();
        std::fs::remove_file(&p).unwrap();
        assert_eq!(loaded, grid);
    }

    #[test]
    fn empty_grids_round_trip() {
        let grid = Grid::new(0, 0);
        assert_eq!(Grid::from_json(&grid.to_json().unwrap()).unwrap(), grid);
    }

    #[test]
    fn rejects_missing_cells() {
        let json = tiny_with(r#""rows": 1, "cols": 2"#, r#""rows": 2, "cols": 2"#);
        assert!(matches!(
            Grid::from_json(&json),
            Err(MazeLoadError::Dimensions { rows: 2, cols: 2, cells: 2 })
        ));
    }

    #[test]
    fn rejects_dimensions_before_allocating() {
        // Rows past `Coord`
        let json = indoc! {r#"
            {
              "rows": 4294967297, "cols": 1, "max_n": 4,
              "mov": [[-1, 0], [0, 1], [1, 0], [0, -1]],
              "id_mov": ["N", "E", "S", "O"],
              "cells": {}
            }
        "#};
        assert!(matches!(
            Grid::from_json(json),
            Err(MazeLoadError::Dimensions { rows: 4294967297, cols: 1, cells: 0 })
        ));

        // Far more cells than listed
        let json = tiny_with(r#""rows": 1, "cols": 2"#, r#""rows": 100000, "cols": 100000"#);
        assert!(matches!(
            Grid::from_json(&json),
            Err(MazeLoadError::Dimensions { cells: 2, .. })
        ));

        // The product overflows
        let json = tiny_with(
            r#""rows": 1, "cols": 2"#,
            &format!(r#""rows": {}, "cols": {}"#, usize::MAX, usize::MAX),
        );
        assert!(matches!(
            Grid::from_json(&json),
            Err(MazeLoadError::Dimensions { .. })
        ));

        // Empty rows can't hold cells either
        let json = tiny_with(r#""rows": 1, "cols": 2"#, r#""rows": 0, "cols": 2"#);
        assert!(matches!(
            Grid::from_json(&json),
            Err(MazeLoadError::Dimensions { rows: 0, cols: 2, cells: 2 })
        ));
    }

    #[test]
    fn rejects_duplicate_cells() {
        let json = tiny_with(r#""(0, 1)""#, r#""(0,0 )""#);
        assert!(matches!(
            Grid::from_json(&json),
            Err(MazeLoadError::DuplicateCell { .. })
        ));
    }

    #[test]
    fn rejects_cells_out_of_bounds() {
        let json = tiny_with(r#""(0, 1)""#, r#""(0,2)""#);
        match Grid::from_json(&json) {
            Err(MazeLoadError::CellOutOfBounds { key, .. }) => assert_eq!(key, "(0,2)"),
            r => panic!("Unexpected {r:?}"),
        }
    }

    #[test]
    fn rejects_bad_keys() {
        let json = tiny_with(r#""(0, 1)""#, r#""(0;1)""#);
        match Grid::from_json(&json) {
            Err(MazeLoadError::InvalidKey { key, .. }) => assert_eq!(key, "(0;1)"),
            r => panic!("Unexpected {r:?}"),
        }
    }

    #[test]
    fn rejects_asymmetric_walls() {
        let json = tiny_with(
            r#""neighbors": [false, false, false, true]"#,
            r#""neighbors": [false, false, false, false]"#,
        );
        match Grid::from_json(&json) {
            Err(MazeLoadError::AsymmetricWall { state, direction }) => {
                assert_eq!(state, GridState::new(0, 0));
                assert_eq!(direction, Direction::East);
            }
            r => panic!("Unexpected {r:?}"),
        }
    }

    #[test]
    fn rejects_walls_open_to_the_outside() {
        let json = tiny_with(
            r#""neighbors": [false, true, false, false]"#,
            r#""neighbors": [true, true, false, false]"#,
        );
        match Grid::from_json(&json) {
            Err(MazeLoadError::OpenBoundary { state, direction }) => {
                assert_eq!(state, GridState::new(0, 0));
                assert_eq!(direction, Direction::North);
            }
            r => panic!("Unexpected {r:?}"),
        }
    }

    #[test]
    fn rejects_other_direction_tables() {
        let json = tiny_with(r#""S", "O""#, r#""S", "W""#);
        assert!(matches!(
            Grid::from_json(&json),
            Err(MazeLoadError::DirectionTable { .. })
        ));
        let json = tiny_with("[0, -1]]", "[0, 1]]");
        assert!(matches!(
            Grid::from_json(&json),
            Err(MazeLoadError::DirectionTable { .. })
        ));
        let json = tiny_with(r#""max_n": 4"#, r#""max_n": 8"#);
        assert!(matches!(
            Grid::from_json(&json),
            Err(MazeLoadError::MoveCount { expected: 4, found: 8 })
        ));
    }

    #[test]
    fn rejects_short_neighbour_lists() {
        let json = tiny_with(
            r#""neighbors": [false, true, false, false]"#,
            r#""neighbors": [false, true]"#,
        );
        assert!(matches!(
            Grid::from_json(&json),
            Err(MazeLoadError::NeighbourCount { found: 2, .. })
        ));
    }

    #[test]
    fn rejects_broken_json() {
        assert!(matches!(Grid::from_json("{"), Err(MazeLoadError::Json(_))));
        assert!(matches!(
            Grid::load_json(Path::new("/nonexistent/maze.json")),
            Err(MazeLoadError::IOError { .. })
        ));
    }
}
