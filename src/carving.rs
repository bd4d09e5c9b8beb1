use bit_set::BitSet;
use error_chain::bail;

use crate::cells::Cell;
use crate::errors::*;
use crate::grid_dimensions::MazeDimensions;

/// Counters reported by a generator run.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct GenerationStats {
    /// Frontier picks that found no uncarved direction (growing tree).
    pub stale_picks: usize,
    /// Steps taken by all random walks, loops included (Wilson).
    pub walk_steps: usize,
}

/// Working state private to one generation call: which cells are carved, and in what order.
#[derive(Debug)]
pub struct Carving {
    dimensions: MazeDimensions,
    carved: BitSet,
    order: Vec<Cell>,
}

impl Carving {
    pub fn new(dimensions: MazeDimensions) -> Carving {
        Carving {
            dimensions: dimensions,
            carved: BitSet::with_capacity(dimensions.size()),
            order: Vec::with_capacity(dimensions.size() / 2),
        }
    }

    #[inline]
    pub fn dimensions(&self) -> &MazeDimensions {
        &self.dimensions
    }

    #[inline]
    pub fn is_carved(&self, cell: Cell) -> bool {
        self.dimensions
            .cell_to_index(cell)
            .map_or(false, |index| self.carved.contains(index))
    }

    /// Mark a cell open. Carving twice, or outside the maze, is a generator defect.
    pub fn carve(&mut self, cell: Cell) -> Result<()> {
        let index = match self.dimensions.cell_to_index(cell) {
            Some(index) => index,
            None => {
                bail!(ErrorKind::GenerationInvariant(format!("carving {:?} outside the maze", cell)));
            }
        };
        if !self.carved.insert(index) {
            bail!(ErrorKind::GenerationInvariant(format!("{:?} carved twice", cell)));
        }
        self.order.push(cell);
        Ok(())
    }

    /// Both cells of a two cell step are in the maze and still uncarved.
    pub fn is_passage_open(&self, passage: &[Cell; 2]) -> bool {
        passage
            .iter()
            .all(|&cell| self.dimensions.contains(cell) && !self.is_carved(cell))
    }

    #[inline]
    pub fn carved_count(&self) -> usize {
        self.order.len()
    }

    pub fn finish(self, stats: GenerationStats) -> CarvedCells {
        CarvedCells {
            dimensions: self.dimensions,
            cells: self.order,
            stats: stats,
        }
    }
}

/// The cells a generator opened, in carve order. Entry and exit markers are not included.
#[derive(Debug, Clone)]
pub struct CarvedCells {
    dimensions: MazeDimensions,
    cells: Vec<Cell>,
    stats: GenerationStats,
}

impl CarvedCells {
    #[inline]
    pub fn dimensions(&self) -> &MazeDimensions {
        &self.dimensions
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn stats(&self) -> GenerationStats {
        self.stats
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
