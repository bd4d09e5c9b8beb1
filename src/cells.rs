use smallvec::SmallVec;

use crate::units::{ColumnIndex, RowIndex};

/// A logical position in the unpadded maze.
///
/// Row 0 is the bottom row and column 0 the leftmost column. Positions are signed so that
/// stepping past an edge produces a cell that `MazeDimensions::contains` rejects rather than
/// an arithmetic underflow.
///
/// The derived ordering is row-major from the bottom row, the same order as block indices.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct Cell {
    pub row: isize,
    pub col: isize,
}

impl Cell {
    pub fn new(row: isize, col: isize) -> Cell {
        Cell { row: row, col: col }
    }

    pub fn from_row_column_indices(col_index: ColumnIndex, row_index: RowIndex) -> Cell {
        Cell::new(row_index.0, col_index.0)
    }

    /// The cell `steps` cells away in the given direction.
    #[inline]
    pub fn step(self, direction: Direction, steps: isize) -> Cell {
        let (row_delta, col_delta) = direction.offset();
        Cell::new(self.row + row_delta * steps, self.col + col_delta * steps)
    }

    #[inline]
    pub fn offset(self, row_delta: isize, col_delta: isize) -> Cell {
        Cell::new(self.row + row_delta, self.col + col_delta)
    }
}

pub type DirectionSmallVec = SmallVec<[Direction; 4]>;

/// The four axis directions, in the fixed query order up, right, down, left.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    /// (row, column) delta of one step. Up increases the row.
    #[inline]
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (-1, 0),
            Direction::Left => (0, -1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Position in `Direction::ALL`.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }
}
