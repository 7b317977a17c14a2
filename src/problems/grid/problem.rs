use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

use crate::problem::Problem;
use crate::problems::grid::Direction;
use crate::problems::grid::Grid;
use crate::problems::grid::GridCost;
use crate::problems::grid::GridState;
use crate::problems::grid::json::MazeLoadError;

/// Getting from one cell of a maze to another.
#[derive(Clone, Debug)]
pub struct GridProblem {
    grid: Grid,
    initial: GridState,
    objective: GridState,
}

impl GridProblem {
    pub fn new(grid: Grid, initial: GridState, objective: GridState) -> Self {
        Self {
            grid,
            initial,
            objective,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Loads a problem file.
    ///
    /// ```json
    /// {"INITIAL": [0, 0], "objective": [9, 9], "maze": "maze.json"}
    /// ```
    ///
    /// Keys are case-insensitive, and `objetive` is accepted for `objective`.
    /// The maze path is relative to the problem file.
    pub fn load(p: &Path) -> Result<GridProblem, ProblemLoadError> {
        let s = std::fs::read_to_string(p).map_err(|e| ProblemLoadError::IOError {
            p: p.to_path_buf(),
            e,
        })?;
        let doc = ProblemDocument::parse(&s)?;
        let maze_path = p.parent().unwrap_or(Path::new("")).join(&doc.maze);
        let grid = Grid::load_json(&maze_path)?;

        log::debug!(
            "Loaded problem {p:?}: {} -> {} on {maze_path:?}",
            doc.initial,
            doc.objective
        );
        Ok(GridProblem::new(grid, doc.initial, doc.objective))
    }
}

impl Problem<Grid, GridState, Direction, GridCost> for GridProblem {
    fn space(&self) -> &Grid {
        &self.grid
    }
    fn initial(&self) -> &GridState {
        &self.initial
    }
    fn objective(&self) -> &GridState {
        &self.objective
    }
}

impl std::fmt::Display for GridProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (rows, cols) = self.grid.dimensions();
        write!(
            f,
            "GridProblem({rows}x{cols}) ({} -> {})",
            self.initial, self.objective
        )
    }
}

#[derive(Debug, Error)]
pub enum ProblemLoadError {
    #[error("I/O error when loading '{p}': {e}")]
    IOError { p: PathBuf, e: std::io::Error },
    #[error("Invalid problem JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("The problem must be a JSON object")]
    NotAnObject,
    #[error("Missing '{0}' key")]
    MissingKey(&'static str),
    #[error("Invalid '{key}' state: {value}")]
    InvalidState { key: String, value: String },
    #[error("Invalid maze path in '{key}': {value}")]
    InvalidMazePath { key: String, value: String },
    #[error("Invalid maze: {0}")]
    Maze(#[from] MazeLoadError),
}

/// The parsed contents of a problem file, before loading its maze.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProblemDocument {
    pub initial: GridState,
    pub objective: GridState,
    pub maze: PathBuf,
}

impl ProblemDocument {
    pub fn parse(s: &str) -> Result<ProblemDocument, ProblemLoadError> {
        let value: serde_json::Value = serde_json::from_str(s)?;
        let serde_json::Value::Object(map) = value else {
            return Err(ProblemLoadError::NotAnObject);
        };

        let mut initial = None;
        let mut objective = None;
        let mut maze = None;
        for (key, value) in &map {
            match key.to_lowercase().as_str() {
                "initial" => initial = Some(parse_state(key, value)?),
                "objective" | "objetive" => objective = Some(parse_state(key, value)?),
                "maze" => {
                    let Some(path) = value.as_str() else {
                        return Err(ProblemLoadError::InvalidMazePath {
                            key: key.clone(),
                            value: value.to_string(),
                        });
                    };
                    maze = Some(PathBuf::from(path));
                }
                _ => log::debug!("Ignoring unknown problem key '{key}'"),
            }
        }

        Ok(ProblemDocument {
            initial: initial.ok_or(ProblemLoadError::MissingKey("initial"))?,
            objective: objective.ok_or(ProblemLoadError::MissingKey("objective"))?,
            maze: maze.ok_or(ProblemLoadError::MissingKey("maze"))?,
        })
    }
}

/// States are `[row, col]` arrays, or `"(row,col)"` strings.
fn parse_state(key: &str, value: &serde_json::Value) -> Result<GridState, ProblemLoadError> {
    let invalid = || ProblemLoadError::InvalidState {
        key: key.to_string(),
        value: value.to_string(),
    };

    match value {
        serde_json::Value::Array(coords) => match coords.as_slice() {
            [row, col] => {
                let row = row.as_u64().and_then(|r| u32::try_from(r).ok());
                let col = col.as_u64().and_then(|c| u32::try_from(c).ok());
                match (row, col) {
                    (Some(row), Some(col)) => Ok(GridState::new(row, col)),
                    _ => Err(invalid()),
                }
            }
            _ => Err(invalid()),
        },
        serde_json::Value::String(s) => s.parse().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}
