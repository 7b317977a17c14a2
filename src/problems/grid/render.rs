use std::path::Path;
use std::path::PathBuf;

use image::GrayImage;
use image::Luma;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::problems::grid::Cell;
use crate::problems::grid::Direction;
use crate::problems::grid::Grid;
use crate::problems::grid::GridState;

/// Pixels per cell, `(height, width)`.
pub const CELL_RESOLUTION: (u32, u32) = (16, 16);

const WALL: Luma<u8> = Luma([u8::MIN]);
const FLOOR: Luma<u8> = Luma([u8::MAX]);
const HIGHLIGHT: Luma<u8> = Luma([160u8]);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Can't render a {rows}x{cols} maze")]
    EmptyGrid { rows: usize, cols: usize },
    #[error("Maze too large to render ({rows}x{cols})")]
    TooLarge { rows: usize, cols: usize },
    #[error("Image error when saving '{p}': {e}")]
    ImageError { p: PathBuf, e: image::ImageError },
}

fn draw_cell(img: &mut GrayImage, cell: &Cell, highlighted: bool) {
    let (h, w) = CELL_RESOLUTION;
    let top = cell.position().row * h;
    let left = cell.position().col * w;

    let floor = if highlighted { HIGHLIGHT } else { FLOOR };
    for y in 0..h {
        for x in 0..w {
            img.put_pixel(left + x, top + y, floor);
        }
    }

    // Corners are always walls
    for (y, x) in [(0, 0), (0, w - 1), (h - 1, 0), (h - 1, w - 1)] {
        img.put_pixel(left + x, top + y, WALL);
    }

    for d in Direction::ALL {
        if cell.is_open(d) {
            continue;
        }
        match d {
            Direction::North | Direction::South => {
                let y = if d == Direction::North { 0 } else { h - 1 };
                for x in 0..w {
                    img.put_pixel(left + x, top + y, WALL);
                }
            }
            Direction::East | Direction::West => {
                let x = if d == Direction::West { 0 } else { w - 1 };
                for y in 0..h {
                    img.put_pixel(left + x, top + y, WALL);
                }
            }
        }
    }
}

impl Grid {
    /// Draws the maze, shading the `highlight`ed cells.
    pub fn to_image(&self, highlight: &[GridState]) -> Result<GrayImage, RenderError> {
        let (rows, cols) = self.dimensions();
        if self.is_empty() {
            return Err(RenderError::EmptyGrid { rows, cols });
        }
        let (h, w) = CELL_RESOLUTION;
        let (Some(height), Some(width)) = (
            u32::try_from(rows).ok().and_then(|r| r.checked_mul(h)),
            u32::try_from(cols).ok().and_then(|c| c.checked_mul(w)),
        ) else {
            return Err(RenderError::TooLarge { rows, cols });
        };

        let highlight: FxHashSet<GridState> = highlight.iter().copied().collect();
        let mut img = GrayImage::new(width, height);
        for cell in self.cells() {
            draw_cell(&mut img, cell, highlight.contains(&cell.position()));
        }
        Ok(img)
    }

    /// Saves the maze as an image, its format is picked from the extension.
    pub fn save_image(&self, p: &Path, highlight: &[GridState]) -> Result<(), RenderError> {
        let img = self.to_image(highlight)?;
        img.save(p).map_err(|e| RenderError::ImageError {
            p: p.to_path_buf(),
            e,
        })?;
        log::debug!("Saved {}x{} image to {p:?}", img.width(), img.height());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_walls_and_openings() {
        let mut grid = Grid::new(1, 2);
        grid.open_wall(&GridState::new(0, 0), Direction::East).unwrap();
        let img = grid.to_image(&[GridState::new(0, 1)]).unwrap();
        assert_eq!(img.dimensions(), (32, 16));

        // Corners
        assert_eq!(*img.get_pixel(0, 0), WALL);
        assert_eq!(*img.get_pixel(15, 15), WALL);
        // Closed north and west walls
        assert_eq!(*img.get_pixel(5, 0), WALL);
        assert_eq!(*img.get_pixel(0, 5), WALL);
        // The open wall between both cells
        assert_eq!(*img.get_pixel(15, 5), FLOOR);
        assert_eq!(*img.get_pixel(16, 5), HIGHLIGHT);
        // Interiors
        assert_eq!(*img.get_pixel(5, 5), FLOOR);
        assert_eq!(*img.get_pixel(20, 5), HIGHLIGHT);
        // Closed east wall of the last cell
        assert_eq!(*img.get_pixel(31, 5), WALL);
    }

    #[test]
    fn empty_grids_cant_be_drawn() {
        assert!(matches!(
            Grid::new(0, 3).to_image(&[]),
            Err(RenderError::EmptyGrid { rows: 0, cols: 3 })
        ));
    }
}
