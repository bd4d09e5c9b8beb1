use error_chain::bail;

use crate::cells::Cell;
use crate::errors::*;
use crate::units::{ColumnIndex, Height, RowIndex, Width};

/// Validated maze dimensions: both odd and at least 3 so every carved node has a wall ring
/// around it and the border can hold the exit gap.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MazeDimensions {
    width: Width,
    height: Height,
}

impl MazeDimensions {
    pub fn new(width: Width, height: Height) -> Result<MazeDimensions> {
        let Width(w) = width;
        let Height(h) = height;
        if w < 3 || h < 3 || w % 2 == 0 || h % 2 == 0 {
            bail!(ErrorKind::InvalidDimensions(w, h));
        }
        Ok(MazeDimensions {
            width: width,
            height: height,
        })
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width.0
    }

    #[inline(always)]
    pub fn height(&self) -> usize {
        self.height.0
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.width.0 * self.height.0
    }

    /// Is the cell inside the unpadded maze (border included)?
    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.row >= 0 && cell.col >= 0 && (cell.row as usize) < self.height.0 &&
        (cell.col as usize) < self.width.0
    }

    /// Inside the maze and not on the outer wall ring.
    #[inline]
    pub fn is_interior(&self, cell: Cell) -> bool {
        cell.row > 0 && cell.col > 0 && (cell.row as usize) < self.height.0 - 1 &&
        (cell.col as usize) < self.width.0 - 1
    }

    /// Nodes are the cells a passage may end on: odd row and odd column.
    #[inline]
    pub fn is_node(&self, cell: Cell) -> bool {
        self.is_interior(cell) && cell.row % 2 == 1 && cell.col % 2 == 1
    }

    /// Row-major index of a cell inside the maze, used for bitset membership.
    #[inline]
    pub fn cell_to_index(&self, cell: Cell) -> Option<usize> {
        if self.contains(cell) {
            Some(cell.row as usize * self.width.0 + cell.col as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn index_to_cell(&self, index: usize) -> Cell {
        Cell::from_row_column_indices(ColumnIndex((index % self.width.0) as isize),
                                      RowIndex((index / self.width.0) as isize))
    }

    /// Node counts along each axis: (columns, rows).
    pub fn node_counts(&self) -> (usize, usize) {
        ((self.width.0 - 1) / 2, (self.height.0 - 1) / 2)
    }

    /// The gap in the top border wall.
    pub fn exit_gap(&self) -> Cell {
        Cell::new(self.height.0 as isize - 1, self.width.0 as isize - 2)
    }

    /// The exterior cell beyond the exit gap, just outside the maze.
    pub fn exit_landing(&self) -> Cell {
        Cell::new(self.height.0 as isize, self.width.0 as isize - 2)
    }

    /// Where a player begins: the bottom left node.
    pub fn player_start(&self) -> Cell {
        Cell::new(1, 1)
    }

    /// Every node in row-major order from the bottom row.
    pub fn iter_nodes(&self) -> impl Iterator<Item = Cell> {
        let (columns, rows) = self.node_counts();
        (0..rows).flat_map(move |r| {
            (0..columns).map(move |c| Cell::new(1 + 2 * r as isize, 1 + 2 * c as isize))
        })
    }
}
