use std::fmt;

use error_chain::bail;

use crate::cells::{Cell, Direction};
use crate::errors::*;
use crate::grid_dimensions::MazeDimensions;

/// Default distance, in drawing units, that the coordinate frame extends past the maze edge.
pub const DEFAULT_OVERSCAN: f64 = 600.0;

/// Most cells a padded frame may hold. Keeps every index product well inside `i64`.
pub const MAX_FRAME_BLOCKS: f64 = (1u64 << 48) as f64;

/// Linear identifier of a cell within the padded coordinate frame.
///
/// The frame centre is index 0. Ascending order is row-major starting from the bottom row.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct BlockIndex(pub i64);

impl fmt::Display for BlockIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bijection between drawing coordinates and block indices for one maze size.
///
/// The frame is wider and taller than the maze by `margin` cells on every side, so points a
/// little outside the maze (where an escaped player walks) still resolve to an index.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CoordinateIndex {
    dimensions: MazeDimensions,
    block_size: f64,
    margin: usize,
    padded_width: i64,
    padded_height: i64,
    half: i64,
}

impl CoordinateIndex {
    pub fn new(dimensions: MazeDimensions, block_size: f64, overscan: f64) -> Result<CoordinateIndex> {
        if !block_size.is_finite() || block_size <= 0.0 {
            bail!(ErrorKind::InvalidBlockSize(block_size));
        }
        if !overscan.is_finite() || overscan < 0.0 {
            bail!(ErrorKind::InvalidOverscan(overscan));
        }

        // Two spare cells beyond the overscan so the exterior exit marker is always in frame.
        let margin = (overscan / (2.0 * block_size)).floor() + 2.0;
        let padded_width = dimensions.width() as f64 + 2.0 * margin;
        let padded_height = dimensions.height() as f64 + 2.0 * margin;
        if !(padded_width * padded_height <= MAX_FRAME_BLOCKS) {
            bail!(ErrorKind::FrameTooLarge(block_size, overscan));
        }
        let (margin, padded_width, padded_height) =
            (margin as usize, padded_width as i64, padded_height as i64);

        Ok(CoordinateIndex {
            dimensions: dimensions,
            block_size: block_size,
            margin: margin,
            padded_width: padded_width,
            padded_height: padded_height,
            half: (padded_width * padded_height - 1) / 2,
        })
    }

    #[inline]
    pub fn dimensions(&self) -> &MazeDimensions {
        &self.dimensions
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.dimensions.width()
    }

    #[inline]
    pub fn block_size(&self) -> f64 {
        self.block_size
    }

    #[inline]
    pub fn margin(&self) -> usize {
        self.margin
    }

    /// (width, height) of the padded frame in cells.
    #[inline]
    pub fn padded_size(&self) -> (usize, usize) {
        (self.padded_width as usize, self.padded_height as usize)
    }

    /// Smallest and largest representable indices.
    #[inline]
    pub fn index_range(&self) -> (BlockIndex, BlockIndex) {
        (BlockIndex(-self.half), BlockIndex(self.half))
    }

    /// The index of the cell enclosing `(x, y)`, or `None` beyond the padded frame.
    pub fn coord_to_block(&self, x: f64, y: f64) -> Option<BlockIndex> {
        let column = self.frame_offset(x, self.padded_width)?;
        let row = self.frame_offset(y, self.padded_height)?;
        Some(self.padded_to_block(column, row))
    }

    /// The centre of the cell with the given index, or `None` for indices out of range.
    pub fn block_to_coord(&self, index: BlockIndex) -> Option<(f64, f64)> {
        let (column, row) = self.block_to_padded(index)?;
        let x = (column - (self.padded_width - 1) / 2) as f64 * self.block_size;
        let y = (row - (self.padded_height - 1) / 2) as f64 * self.block_size;
        Some((x, y))
    }

    /// True when there is no index, or its cell lies outside the unpadded maze.
    ///
    /// The maze border is not out: only the cells beyond it are.
    pub fn is_out(&self, index: Option<BlockIndex>) -> bool {
        match index.and_then(|i| self.block_to_cell(i)) {
            Some(cell) => !self.dimensions.contains(cell),
            None => true,
        }
    }

    /// The index of a maze cell. Cells within `margin` of the maze are representable too.
    pub fn cell_to_block(&self, cell: Cell) -> Option<BlockIndex> {
        let column = cell.col + self.margin as isize;
        let row = cell.row + self.margin as isize;
        if column < 0 || row < 0 || column as i64 >= self.padded_width ||
           row as i64 >= self.padded_height {
            return None;
        }
        Some(self.padded_to_block(column as i64, row as i64))
    }

    /// The maze cell for an index. Exterior frame cells come back with negative or
    /// too-large rows and columns.
    pub fn block_to_cell(&self, index: BlockIndex) -> Option<Cell> {
        self.block_to_padded(index).map(|(column, row)| {
            Cell::new(row as isize - self.margin as isize,
                      column as isize - self.margin as isize)
        })
    }

    /// The centre coordinate of a maze cell.
    pub fn cell_to_coord(&self, cell: Cell) -> Option<(f64, f64)> {
        self.cell_to_block(cell).and_then(|index| self.block_to_coord(index))
    }

    /// The adjacent index in a direction, or `None` past the frame edge.
    pub fn neighbour(&self, index: BlockIndex, direction: Direction) -> Option<BlockIndex> {
        let (column, row) = self.block_to_padded(index)?;
        let (row_delta, col_delta) = direction.offset();
        let (column, row) = (column + col_delta as i64, row + row_delta as i64);
        if column < 0 || row < 0 || column >= self.padded_width || row >= self.padded_height {
            None
        } else {
            Some(self.padded_to_block(column, row))
        }
    }

    fn frame_offset(&self, value: f64, cells: i64) -> Option<i64> {
        let extent = cells as f64 * self.block_size;
        let shifted = value + extent / 2.0;
        // Written so that NaN also lands outside.
        if !(shifted >= 0.0 && shifted < extent) {
            return None;
        }
        let offset = (shifted / self.block_size).floor() as i64;
        Some(offset.min(cells - 1))
    }

    #[inline]
    fn padded_to_block(&self, column: i64, row: i64) -> BlockIndex {
        BlockIndex(column + row * self.padded_width - self.half)
    }

    #[inline]
    fn block_to_padded(&self, index: BlockIndex) -> Option<(i64, i64)> {
        let BlockIndex(raw) = index;
        if raw < -self.half || raw > self.half {
            return None;
        }
        let shifted = raw + self.half;
        Some((shifted % self.padded_width, shifted / self.padded_width))
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::{quickcheck, TestResult};

    use super::*;
    use crate::units::{Height, Width};

    fn index(w: usize, h: usize, block_size: f64) -> CoordinateIndex {
        let dims = MazeDimensions::new(Width(w), Height(h)).unwrap();
        CoordinateIndex::new(dims, block_size, DEFAULT_OVERSCAN).unwrap()
    }

    #[test]
    fn margin_follows_overscan_and_block_size() {
        assert_eq!(index(101, 101, 40.0).margin(), 9);
        assert_eq!(index(101, 101, 40.0).padded_size(), (119, 119));
        assert_eq!(index(25, 25, 50.0).margin(), 8);
        assert_eq!(index(75, 75, 6.0).margin(), 52);
        let dims = MazeDimensions::new(Width(5), Height(5)).unwrap();
        assert_eq!(CoordinateIndex::new(dims, 10.0, 0.0).unwrap().margin(), 2);
    }

    #[test]
    fn square_frame_range_matches_half_the_cell_count() {
        let ci = index(5, 5, 40.0);
        let (w, _) = ci.padded_size();
        let half = (w * w / 2) as i64;
        assert_eq!(ci.index_range(), (BlockIndex(-half), BlockIndex(half)));
        assert!(ci.block_to_coord(BlockIndex(half)).is_some());
        assert!(ci.block_to_coord(BlockIndex(-half)).is_some());
        assert_eq!(ci.block_to_coord(BlockIndex(half + 1)), None);
        assert_eq!(ci.block_to_coord(BlockIndex(-half - 1)), None);
    }

    #[test]
    fn origin_is_block_zero() {
        let ci = index(5, 7, 40.0);
        assert_eq!(ci.coord_to_block(0.0, 0.0), Some(BlockIndex(0)));
        assert_eq!(ci.block_to_coord(BlockIndex(0)), Some((0.0, 0.0)));
        assert_eq!(ci.block_to_cell(BlockIndex(0)), Some(Cell::new(3, 2)));
    }

    #[test]
    fn points_inside_a_cell_resolve_to_it() {
        let ci = index(5, 5, 40.0);
        let centre = ci.coord_to_block(40.0, -80.0).unwrap();
        assert_eq!(ci.coord_to_block(59.9, -99.9), Some(centre));
        assert_eq!(ci.coord_to_block(20.0, -60.1), Some(centre));
        assert_ne!(ci.coord_to_block(60.0, -80.0), Some(centre));
    }

    #[test]
    fn outside_the_frame_is_none() {
        let ci = index(5, 5, 40.0);
        let (w, h) = ci.padded_size();
        let x_edge = w as f64 * 40.0 / 2.0;
        let y_edge = h as f64 * 40.0 / 2.0;
        assert_eq!(ci.coord_to_block(x_edge, 0.0), None);
        assert_eq!(ci.coord_to_block(0.0, y_edge), None);
        assert!(ci.coord_to_block(x_edge - 0.5, y_edge - 0.5).is_some());
        assert!(ci.coord_to_block(-x_edge, -y_edge).is_some());
        assert_eq!(ci.coord_to_block(-x_edge - 0.01, 0.0), None);
        assert_eq!(ci.coord_to_block(::std::f64::NAN, 0.0), None);
        assert_eq!(ci.coord_to_block(0.0, ::std::f64::INFINITY), None);
    }

    #[test]
    fn is_out_only_beyond_the_border() {
        let ci = index(5, 5, 40.0);
        assert!(ci.is_out(None));
        assert!(!ci.is_out(ci.cell_to_block(Cell::new(0, 0))));
        assert!(!ci.is_out(ci.cell_to_block(Cell::new(4, 4))));
        assert!(!ci.is_out(ci.cell_to_block(Cell::new(2, 2))));
        assert!(ci.is_out(ci.cell_to_block(Cell::new(5, 3))));
        assert!(ci.is_out(ci.cell_to_block(Cell::new(2, -1))));
        // Same answer through drawing coordinates: the maze spans [-100, 100].
        assert!(!ci.is_out(ci.coord_to_block(-80.0, 80.0)));
        assert!(ci.is_out(ci.coord_to_block(-120.0, 80.0)));
    }

    #[test]
    fn cell_blocks_increase_row_major() {
        let ci = index(5, 5, 40.0);
        let a = ci.cell_to_block(Cell::new(0, 4)).unwrap();
        let b = ci.cell_to_block(Cell::new(1, 0)).unwrap();
        let c = ci.cell_to_block(Cell::new(1, 1)).unwrap();
        assert!(a < b && b < c);
        assert_eq!(c.0 - b.0, 1);
    }

    #[test]
    fn cells_beyond_the_margin_are_unrepresentable() {
        let ci = index(5, 5, 40.0);
        let m = ci.margin() as isize;
        assert!(ci.cell_to_block(Cell::new(-m, -m)).is_some());
        assert_eq!(ci.cell_to_block(Cell::new(-m - 1, 0)), None);
        assert_eq!(ci.cell_to_block(Cell::new(0, 5 + m)), None);
    }

    #[test]
    fn neighbours_step_one_cell() {
        let ci = index(5, 5, 40.0);
        let centre = ci.cell_to_block(Cell::new(2, 2)).unwrap();
        let up = ci.neighbour(centre, Direction::Up).unwrap();
        assert_eq!(ci.block_to_coord(up), Some((0.0, 40.0)));
        let left = ci.neighbour(centre, Direction::Left).unwrap();
        assert_eq!(ci.block_to_coord(left), Some((-40.0, 0.0)));

        let (low, high) = ci.index_range();
        assert_eq!(ci.neighbour(low, Direction::Down), None);
        assert_eq!(ci.neighbour(low, Direction::Left), None);
        assert_eq!(ci.neighbour(high, Direction::Up), None);
        assert_eq!(ci.neighbour(high, Direction::Right), None);
    }

    #[test]
    fn rejects_bad_block_sizes() {
        let dims = MazeDimensions::new(Width(5), Height(5)).unwrap();
        for &size in &[0.0, -1.0, ::std::f64::NAN, ::std::f64::INFINITY] {
            let err = CoordinateIndex::new(dims, size, DEFAULT_OVERSCAN).unwrap_err();
            match *err.kind() {
                ErrorKind::InvalidBlockSize(_) => {}
                ref other => panic!("unexpected error kind {:?}", other),
            }
        }
        let err = CoordinateIndex::new(dims, 10.0, -1.0).unwrap_err();
        match *err.kind() {
            ErrorKind::InvalidOverscan(_) => {}
            ref other => panic!("unexpected error kind {:?}", other),
        }
    }

    #[test]
    fn tiny_block_sizes_are_rejected_not_overflowed() {
        let dims = MazeDimensions::new(Width(5), Height(5)).unwrap();
        for &(size, overscan) in &[(1e-300, DEFAULT_OVERSCAN),
                                   (1e-7, DEFAULT_OVERSCAN),
                                   (1.0, 1e300),
                                   (::std::f64::MIN_POSITIVE, DEFAULT_OVERSCAN)] {
            let err = CoordinateIndex::new(dims, size, overscan).unwrap_err();
            match *err.kind() {
                ErrorKind::FrameTooLarge(s, o) => assert_eq!((s, o), (size, overscan)),
                ref other => panic!("unexpected error kind {:?}", other),
            }
        }
        // Small but still addressable.
        let ci = CoordinateIndex::new(dims, 0.01, DEFAULT_OVERSCAN).unwrap();
        assert_eq!(ci.margin(), 30_002);
        assert_eq!(ci.coord_to_block(0.0, 0.0), Some(BlockIndex(0)));
    }

    #[test]
    fn every_block_round_trips() {
        let ci = index(7, 5, 12.5);
        let (low, high) = ci.index_range();
        for raw in low.0..=high.0 {
            let block = BlockIndex(raw);
            let (x, y) = ci.block_to_coord(block).unwrap();
            assert_eq!(ci.coord_to_block(x, y), Some(block));
            let cell = ci.block_to_cell(block).unwrap();
            assert_eq!(ci.cell_to_block(cell), Some(block));
        }
    }

    #[test]
    fn quickcheck_coordinate_round_trip() {
        fn prop(half_w: u8, half_h: u8, size_pick: u8, column: u16, row: u16) -> TestResult {
            let sizes = [1.0, 6.0, 12.5, 40.0, 50.0, 0.75];
            let w = 3 + 2 * (half_w % 40) as usize;
            let h = 3 + 2 * (half_h % 40) as usize;
            let block_size = sizes[size_pick as usize % sizes.len()];
            let dims = MazeDimensions::new(Width(w), Height(h)).unwrap();
            let ci = CoordinateIndex::new(dims, block_size, DEFAULT_OVERSCAN).unwrap();
            let (pw, ph) = ci.padded_size();
            if pw * ph > 2_000_000 {
                return TestResult::discard();
            }

            let cell = Cell::new((row as usize % ph) as isize - ci.margin() as isize,
                                 (column as usize % pw) as isize - ci.margin() as isize);
            let (x, y) = ci.cell_to_coord(cell).unwrap();
            let block = ci.coord_to_block(x, y).unwrap();
            TestResult::from_bool(ci.block_to_coord(block) == Some((x, y)) &&
                                  ci.block_to_cell(block) == Some(cell))
        }
        quickcheck(prop as fn(u8, u8, u8, u16, u16) -> TestResult);
    }
}
