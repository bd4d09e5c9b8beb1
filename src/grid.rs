use std::fmt;

use error_chain::bail;
use log::debug;
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use rand::Rng;

use crate::carving::CarvedCells;
use crate::cells::{Cell, Direction, DirectionSmallVec};
use crate::config::MazeConfig;
use crate::coordinates::{BlockIndex, CoordinateIndex};
use crate::errors::*;
use crate::grid_dimensions::MazeDimensions;
use crate::utils::{fnv_hashmap, fnv_hashset, FnvHashSet};

/// A generated maze: open blocks, decorative barriers and the queries a player layer needs.
///
/// The open set is fixed once built. Barriers may be added later but never change which
/// blocks are open.
#[derive(Debug, Clone)]
pub struct MazeGraph {
    index: CoordinateIndex,
    empty_blocks: Vec<BlockIndex>,
    open: FnvHashSet<BlockIndex>,
    barriers: Vec<BlockIndex>,
    barrier_set: FnvHashSet<BlockIndex>,
    start: BlockIndex,
}

impl MazeGraph {
    /// Generate a maze for `config` with an injected random source.
    pub fn generate<R: Rng + ?Sized>(config: &MazeConfig, rng: &mut R) -> Result<MazeGraph> {
        let index = config.coordinate_index()?;
        let carved = config.algorithm.generate(index.dimensions(), rng)?;
        MazeGraph::from_carved(index, &carved)
    }

    /// Assemble the open set from generator output, adding the exit gap and the exterior
    /// landing beyond it.
    pub fn from_carved(index: CoordinateIndex, carved: &CarvedCells) -> Result<MazeGraph> {
        let dimensions = *index.dimensions();
        if *carved.dimensions() != dimensions {
            let detail = format!("cells carved for a {}x{} maze, index built for {}x{}",
                                 carved.dimensions().width(),
                                 carved.dimensions().height(),
                                 dimensions.width(),
                                 dimensions.height());
            bail!(ErrorKind::GenerationInvariant(detail));
        }

        let markers = [dimensions.exit_gap(), dimensions.exit_landing()];
        let mut open = fnv_hashset(carved.len() + markers.len());
        let mut empty_blocks = Vec::with_capacity(carved.len() + markers.len());
        for &cell in carved.cells().iter().chain(markers.iter()) {
            let block = block_of(&index, cell)?;
            if !open.insert(block) {
                let detail = format!("{:?} (block {}) opened twice", cell, block);
                bail!(ErrorKind::GenerationInvariant(detail));
            }
            empty_blocks.push(block);
        }
        empty_blocks.sort();

        let start = block_of(&index, dimensions.player_start())?;
        debug!("assembled {}x{} maze with {} open blocks",
               dimensions.width(),
               dimensions.height(),
               empty_blocks.len());

        Ok(MazeGraph {
            index: index,
            empty_blocks: empty_blocks,
            open: open,
            barriers: Vec::new(),
            barrier_set: fnv_hashset(0),
            start: start,
        })
    }

    #[inline]
    pub fn coordinates(&self) -> &CoordinateIndex {
        &self.index
    }

    #[inline]
    pub fn dimensions(&self) -> &MazeDimensions {
        self.index.dimensions()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.index.width()
    }

    #[inline]
    pub fn block_size(&self) -> f64 {
        self.index.block_size()
    }

    /// Every open block in ascending order, markers included. The last one is the exit.
    #[inline]
    pub fn empty_blocks(&self) -> &[BlockIndex] {
        &self.empty_blocks
    }

    /// Barriers in the order they were added.
    #[inline]
    pub fn barriers(&self) -> &[BlockIndex] {
        &self.barriers
    }

    #[inline]
    pub fn coord_to_block(&self, x: f64, y: f64) -> Option<BlockIndex> {
        self.index.coord_to_block(x, y)
    }

    #[inline]
    pub fn block_to_coord(&self, index: BlockIndex) -> Option<(f64, f64)> {
        self.index.block_to_coord(index)
    }

    #[inline]
    pub fn is_out(&self, index: Option<BlockIndex>) -> bool {
        self.index.is_out(index)
    }

    #[inline]
    pub fn is_open(&self, index: BlockIndex) -> bool {
        self.open.contains(&index)
    }

    #[inline]
    pub fn is_barrier(&self, index: BlockIndex) -> bool {
        self.barrier_set.contains(&index)
    }

    /// The four neighbours in the order up, right, down, left. `None` past the frame edge.
    pub fn neighbors_of(&self, index: BlockIndex) -> [Option<BlockIndex>; 4] {
        let mut neighbours = [None; 4];
        for &direction in Direction::ALL.iter() {
            neighbours[direction.index()] = self.index.neighbour(index, direction);
        }
        neighbours
    }

    /// Open blocks can be walked on, and so can anything outside the maze that is not
    /// barred. That is what lets a player leave through the exit gap.
    pub fn can_pass(&self, index: Option<BlockIndex>) -> bool {
        match index {
            Some(block) if self.is_open(block) => true,
            Some(block) => self.is_out(index) && !self.is_barrier(block),
            None => true,
        }
    }

    /// Both blocks of a two block step are inside the maze and still closed.
    pub fn check_passage(&self, passage: &[Option<BlockIndex>; 2]) -> bool {
        passage.iter().all(|&block| match block {
            Some(b) => !self.is_out(block) && !self.is_open(b),
            None => false,
        })
    }

    pub fn legal_moves(&self, at: BlockIndex) -> DirectionSmallVec {
        let neighbours = self.neighbors_of(at);
        Direction::ALL
            .iter()
            .cloned()
            .filter(|direction| {
                let next = neighbours[direction.index()];
                next.is_some() && self.can_pass(next)
            })
            .collect()
    }

    /// Where one step from `at` lands, or `None` if the step is blocked.
    pub fn step(&self, at: BlockIndex, direction: Direction) -> Option<BlockIndex> {
        self.index.neighbour(at, direction).filter(|&next| self.can_pass(Some(next)))
    }

    /// Standing outside the maze means the player got out.
    #[inline]
    pub fn has_escaped(&self, at: BlockIndex) -> bool {
        self.is_out(Some(at))
    }

    /// Record a decorative barrier. Nothing is validated; repeats are ignored.
    pub fn add_barrier(&mut self, index: BlockIndex) {
        if self.barrier_set.insert(index) {
            self.barriers.push(index);
        }
    }

    pub fn with_barriers<I: IntoIterator<Item = BlockIndex>>(mut self, barriers: I) -> MazeGraph {
        for barrier in barriers {
            self.add_barrier(barrier);
        }
        self
    }

    #[inline]
    pub fn start_block(&self) -> BlockIndex {
        self.start
    }

    /// The exterior landing beyond the exit gap: the largest open block.
    #[inline]
    pub fn exit_block(&self) -> BlockIndex {
        self.empty_blocks[self.empty_blocks.len() - 1]
    }

    pub fn start_coord(&self) -> Option<(f64, f64)> {
        self.block_to_coord(self.start_block())
    }

    pub fn exit_coord(&self) -> Option<(f64, f64)> {
        self.block_to_coord(self.exit_block())
    }

    /// Open blocks as graph nodes, with an edge between each pair of adjacent open blocks.
    pub fn passage_graph(&self) -> UnGraph<BlockIndex, ()> {
        let nodes = self.empty_blocks.len();
        let mut graph = UnGraph::with_capacity(nodes, nodes);
        let mut node_of = fnv_hashmap::<BlockIndex, NodeIndex>(nodes);
        for &block in &self.empty_blocks {
            node_of.insert(block, graph.add_node(block));
        }

        // Looking up and right from every block finds each adjacent pair once.
        for &block in &self.empty_blocks {
            for &direction in &[Direction::Up, Direction::Right] {
                let linked = self.index
                    .neighbour(block, direction)
                    .and_then(|next| node_of.get(&next));
                if let (Some(&a), Some(&b)) = (node_of.get(&block), linked) {
                    let _ = graph.add_edge(a, b, ());
                }
            }
        }
        graph
    }

    /// Connected with no cycles: a spanning tree over the open blocks.
    pub fn is_perfect(&self) -> bool {
        let graph = self.passage_graph();
        graph.node_count() > 0 && connected_components(&graph) == 1 &&
        graph.edge_count() + 1 == graph.node_count()
    }
}

fn block_of(index: &CoordinateIndex, cell: Cell) -> Result<BlockIndex> {
    if let Some(block) = index.cell_to_block(cell) {
        return Ok(block);
    }
    bail!(ErrorKind::GenerationInvariant(format!("{:?} has no block index", cell)));
}

/// Text picture of the maze, top row first. `#` wall, `S` start, `E` exit, `x` barrier.
impl fmt::Display for MazeGraph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let dimensions = self.dimensions();
        let (width, height) = (dimensions.width() as isize, dimensions.height() as isize);

        // One row above the maze so the exterior exit landing shows.
        for row in (0..height + 1).rev() {
            let mut line = String::with_capacity(width as usize);
            for col in 0..width {
                let block = self.index.cell_to_block(Cell::new(row, col));
                let glyph = match block {
                    Some(b) if b == self.start => 'S',
                    Some(b) if b == self.exit_block() => 'E',
                    Some(b) if self.is_barrier(b) => 'x',
                    Some(b) if self.is_open(b) => ' ',
                    _ if row == height => ' ',
                    _ => '#',
                };
                line.push(glyph);
            }
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
