use error_chain::bail;
use itertools::iproduct;
use log::{debug, trace};
use rand::Rng;
use serde_derive::Deserialize;
use smallvec::SmallVec;

use crate::carving::{CarvedCells, Carving, GenerationStats};
use crate::cells::{Cell, Direction};
use crate::errors::*;
use crate::grid_dimensions::MazeDimensions;
use crate::utils::{fnv_hashmap, Bag, FnvHashMap};

/// Something that carves a perfect maze into an empty grid.
///
/// Implementations carve only interior cells; nodes (odd row and column) become the tree's
/// vertices and the single wall cell between two joined nodes becomes the edge.
/// All randomness comes from `rng`, so a seeded source reproduces a maze exactly.
pub trait MazeGenerator {
    fn name(&self) -> &'static str;

    fn generate<R: Rng + ?Sized>(&self, dimensions: &MazeDimensions, rng: &mut R) -> Result<CarvedCells>;
}

/// Choice of generator for one maze.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    GrowingTree,
    Wilson,
}

impl Default for Algorithm {
    fn default() -> Algorithm {
        Algorithm::GrowingTree
    }
}

impl Algorithm {
    pub fn generate<R: Rng + ?Sized>(&self, dimensions: &MazeDimensions, rng: &mut R) -> Result<CarvedCells> {
        match *self {
            Algorithm::GrowingTree => GrowingTree.generate(dimensions, rng),
            Algorithm::Wilson => Wilson.generate(dimensions, rng),
        }
    }

    pub fn name(&self) -> &'static str {
        match *self {
            Algorithm::GrowingTree => GrowingTree.name(),
            Algorithm::Wilson => Wilson.name(),
        }
    }
}

type PassageSmallVec = SmallVec<[[Cell; 2]; 4]>;

/// Randomised growing tree.
///
/// Keeps a frontier of carved nodes that still have an uncarved neighbour node two steps away.
/// Each iteration picks a frontier node uniformly, carves through the wall to a uniformly chosen
/// uncarved neighbour and adds that neighbour to the frontier. After every carve the 3x3 block of
/// nodes around the new node is pruned of frontier entries with nothing left to carve, so a pick
/// never comes up empty.
#[derive(Debug, Copy, Clone, Default)]
pub struct GrowingTree;

impl MazeGenerator for GrowingTree {
    fn name(&self) -> &'static str {
        "growing tree"
    }

    fn generate<R: Rng + ?Sized>(&self, dimensions: &MazeDimensions, rng: &mut R) -> Result<CarvedCells> {
        let (columns, rows) = dimensions.node_counts();
        let mut carving = Carving::new(*dimensions);
        let mut frontier = Bag::with_capacity(columns * rows);
        let mut stats = GenerationStats::default();

        let start_col = 1 + 2 * rng.gen_range(0..columns) as isize;
        let start_row = 1 + 2 * rng.gen_range(0..rows) as isize;
        let start = Cell::new(start_row, start_col);
        carving.carve(start)?;
        frontier.insert(start);
        prune_frontier(&carving, &mut frontier, start);

        while let Some(cell) = frontier.choose(rng) {
            let passages = open_passages(&carving, cell);
            if passages.is_empty() {
                trace!("frontier cell {:?} has nothing left to carve", cell);
                stats.stale_picks += 1;
                frontier.remove(&cell);
                continue;
            }

            let [wall, landing] = passages[rng.gen_range(0..passages.len())];
            carving.carve(wall)?;
            carving.carve(landing)?;
            frontier.insert(landing);
            prune_frontier(&carving, &mut frontier, landing);
        }

        check_complete(self.name(), &carving)?;
        debug!("{} carved {} cells in a {}x{} maze ({} stale picks)",
               self.name(),
               carving.carved_count(),
               dimensions.width(),
               dimensions.height(),
               stats.stale_picks);
        Ok(carving.finish(stats))
    }
}

/// The uncarved two cell steps (wall then landing) from a node, in direction order.
fn open_passages(carving: &Carving, cell: Cell) -> PassageSmallVec {
    Direction::ALL
        .iter()
        .map(|&direction| [cell.step(direction, 1), cell.step(direction, 2)])
        .filter(|passage| carving.is_passage_open(passage))
        .collect()
}

fn prune_frontier(carving: &Carving, frontier: &mut Bag<Cell>, around: Cell) {
    for (&col_delta, &row_delta) in iproduct!(&[-2, 0, 2], &[-2, 0, 2]) {
        let near = around.offset(row_delta, col_delta);
        if frontier.contains(&near) && open_passages(carving, near).is_empty() {
            frontier.remove(&near);
        }
    }
}

/// Wilson's algorithm: a uniform spanning tree from loop-erased random walks.
///
/// Runs on the interior of the maze, whose cells with both local coordinates even are the nodes.
/// A walk starts at a random node outside the tree and wanders until it hits the tree,
/// remembering only the last direction taken out of each node. Replaying those directions from
/// the start follows the walk with its loops erased, and that path joins the tree.
/// Every spanning tree of the node lattice is equally likely.
#[derive(Debug, Copy, Clone, Default)]
pub struct Wilson;

impl MazeGenerator for Wilson {
    fn name(&self) -> &'static str {
        "wilson"
    }

    fn generate<R: Rng + ?Sized>(&self, dimensions: &MazeDimensions, rng: &mut R) -> Result<CarvedCells> {
        let lattice = Lattice::new(dimensions);
        let mut carving = Carving::new(*dimensions);
        let mut stats = GenerationStats::default();
        let mut path: FnvHashMap<Cell, Direction> = fnv_hashmap(dimensions.size() / 4);

        let mut unvisited = Bag::with_capacity(dimensions.size() / 4);
        for node in lattice.nodes() {
            unvisited.insert(node);
        }

        // Visited nodes are exactly the carved nodes.
        let first = match unvisited.choose(rng) {
            Some(node) => node,
            None => {
                bail!(ErrorKind::GenerationInvariant("no nodes to visit".to_string()));
            }
        };
        unvisited.remove(&first);
        carving.carve(lattice.to_maze(first))?;

        while let Some(start) = unvisited.choose(rng) {
            let mut current = start;
            loop {
                let direction = lattice.random_direction(current, rng)?;
                path.insert(current, direction);
                current = current.step(direction, 2);
                stats.walk_steps += 1;
                if carving.is_carved(lattice.to_maze(current)) {
                    break;
                }
            }
            trace!("walk from {:?} joined the tree at {:?}", start, current);

            current = start;
            loop {
                unvisited.remove(&current);
                carving.carve(lattice.to_maze(current))?;
                let direction = match path.get(&current) {
                    Some(&direction) => direction,
                    None => {
                        let detail = format!("walk from {:?} left no direction at {:?}", start, current);
                        bail!(ErrorKind::GenerationInvariant(detail));
                    }
                };
                carving.carve(lattice.to_maze(current.step(direction, 1)))?;
                current = current.step(direction, 2);
                if carving.is_carved(lattice.to_maze(current)) {
                    break;
                }
            }
            path.clear();
        }

        check_complete(self.name(), &carving)?;
        debug!("{} carved {} cells in a {}x{} maze ({} walk steps)",
               self.name(),
               carving.carved_count(),
               dimensions.width(),
               dimensions.height(),
               stats.walk_steps);
        Ok(carving.finish(stats))
    }
}

/// The maze interior seen as its own grid: local (0, 0) is maze cell (1, 1).
#[derive(Debug, Copy, Clone)]
struct Lattice {
    rows: isize,
    columns: isize,
}

impl Lattice {
    fn new(dimensions: &MazeDimensions) -> Lattice {
        Lattice {
            rows: dimensions.height() as isize - 2,
            columns: dimensions.width() as isize - 2,
        }
    }

    fn contains(&self, cell: Cell) -> bool {
        cell.row >= 0 && cell.col >= 0 && cell.row < self.rows && cell.col < self.columns
    }

    fn to_maze(&self, cell: Cell) -> Cell {
        cell.offset(1, 1)
    }

    fn nodes(&self) -> Vec<Cell> {
        iproduct!((0..self.rows).step_by(2), (0..self.columns).step_by(2))
            .map(|(row, col)| Cell::new(row, col))
            .collect()
    }

    /// Uniform over the directions that stay on the lattice; invalid rolls are re-rolled.
    fn random_direction<R: Rng + ?Sized>(&self, from: Cell, rng: &mut R) -> Result<Direction> {
        if !Direction::ALL.iter().any(|&d| self.contains(from.step(d, 2))) {
            let detail = format!("random walk stuck at {:?}: no direction stays in the maze", from);
            bail!(ErrorKind::GenerationInvariant(detail));
        }
        loop {
            let direction = Direction::ALL[rng.gen_range(0..4)];
            if self.contains(from.step(direction, 2)) {
                return Ok(direction);
            }
        }
    }
}

/// A finished tree over N nodes has N nodes and N - 1 walls carved.
fn check_complete(name: &str, carving: &Carving) -> Result<()> {
    let (columns, rows) = carving.dimensions().node_counts();
    let nodes = columns * rows;
    let expected = 2 * nodes - 1;
    if carving.carved_count() != expected {
        let detail = format!("{} finished with {} cells carved, expected {}",
                             name,
                             carving.carved_count(),
                             expected);
        bail!(ErrorKind::GenerationInvariant(detail));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use quickcheck::{quickcheck, TestResult};
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    use super::*;
    use crate::coordinates::{CoordinateIndex, DEFAULT_OVERSCAN};
    use crate::grid::MazeGraph;
    use crate::units::{Height, Width};
    use crate::utils::FnvHashSet;

    fn dims(w: usize, h: usize) -> MazeDimensions {
        MazeDimensions::new(Width(w), Height(h)).unwrap()
    }

    fn carve_with<G: MazeGenerator>(generator: G, w: usize, h: usize, seed: u64) -> CarvedCells {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        generator.generate(&dims(w, h), &mut rng).expect("generation failed")
    }

    fn as_maze(carved: &CarvedCells) -> MazeGraph {
        let index = CoordinateIndex::new(*carved.dimensions(), 10.0, DEFAULT_OVERSCAN).unwrap();
        MazeGraph::from_carved(index, carved).unwrap()
    }

    fn assert_perfect(carved: &CarvedCells) {
        let d = carved.dimensions();
        let unique = carved.cells().iter().cloned().collect::<FnvHashSet<_>>();
        assert_eq!(unique.len(), carved.len(), "a cell was carved twice");
        assert!(carved.cells().iter().all(|&c| d.is_interior(c)));
        for node in d.iter_nodes() {
            assert!(unique.contains(&node), "node {:?} left uncarved", node);
        }
        assert!(as_maze(carved).is_perfect());
    }

    #[test]
    fn growing_tree_single_node() {
        let carved = carve_with(GrowingTree, 3, 3, 1);
        assert_eq!(carved.cells(), &[Cell::new(1, 1)]);
        assert_eq!(carved.stats().stale_picks, 0);
    }

    #[test]
    fn wilson_single_node() {
        let carved = carve_with(Wilson, 3, 3, 1);
        assert_eq!(carved.cells(), &[Cell::new(1, 1)]);
        assert_eq!(carved.stats().walk_steps, 0);
    }

    #[test]
    fn corridor_mazes() {
        // A single row or column of nodes has exactly one spanning tree.
        for &(w, h) in &[(9, 3), (3, 9)] {
            for carved in vec![carve_with(GrowingTree, w, h, 3), carve_with(Wilson, w, h, 3)] {
                let d = dims(w, h);
                let expected = (1..(w.max(h) as isize - 1))
                    .map(|i| if w > h { Cell::new(1, i) } else { Cell::new(i, 1) })
                    .collect::<Vec<_>>();
                assert_eq!(carved.cells().iter().cloned().sorted().collect::<Vec<_>>(), expected);
                assert!(carved.cells().iter().all(|&c| d.is_interior(c)));
            }
        }
    }

    #[test]
    fn growing_tree_spans_the_grid() {
        for &(w, h, seed) in &[(5, 5, 1), (11, 7, 2), (21, 21, 3), (7, 31, 4), (51, 51, 5)] {
            assert_perfect(&carve_with(GrowingTree, w, h, seed));
        }
    }

    #[test]
    fn wilson_spans_the_grid() {
        for &(w, h, seed) in &[(5, 5, 1), (11, 7, 2), (21, 21, 3), (7, 31, 4), (51, 51, 5)] {
            assert_perfect(&carve_with(Wilson, w, h, seed));
        }
    }

    #[test]
    fn pruning_leaves_no_stale_frontier_cells() {
        for seed in 0..20 {
            let carved = carve_with(GrowingTree, 25, 19, seed);
            assert_eq!(carved.stats().stale_picks, 0);
        }
    }

    #[test]
    fn carve_order_steps_from_carved_cells() {
        // Every wall is carved right after being reachable: its predecessor node is open.
        let carved = carve_with(GrowingTree, 15, 15, 9);
        let mut open = FnvHashSet::default();
        let cells = carved.cells();
        open.insert(cells[0]);
        for pair in cells[1..].chunks(2) {
            let (wall, landing) = (pair[0], pair[1]);
            let source = Cell::new(2 * wall.row - landing.row, 2 * wall.col - landing.col);
            assert!(open.contains(&source), "{:?} carved from closed {:?}", landing, source);
            assert!(!open.contains(&wall) && !open.contains(&landing));
            open.insert(wall);
            open.insert(landing);
        }
    }

    #[test]
    fn unfinished_carving_is_an_invariant_failure() {
        let mut carving = Carving::new(dims(5, 5));
        carving.carve(Cell::new(1, 1)).unwrap();
        match *check_complete("partial", &carving).unwrap_err().kind() {
            ErrorKind::GenerationInvariant(ref detail) => {
                assert!(detail.contains("1 cells carved, expected 7"), "{}", detail)
            }
            ref other => panic!("unexpected error kind {:?}", other),
        }
    }

    #[test]
    fn same_seed_same_maze() {
        for &(w, h) in &[(5, 5), (17, 9), (31, 31)] {
            let a = carve_with(GrowingTree, w, h, 1234);
            let b = carve_with(GrowingTree, w, h, 1234);
            assert_eq!(a.cells(), b.cells());

            let a = carve_with(Wilson, w, h, 1234);
            let b = carve_with(Wilson, w, h, 1234);
            assert_eq!(a.cells(), b.cells());
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = carve_with(Wilson, 31, 31, 1);
        let b = carve_with(Wilson, 31, 31, 2);
        assert_ne!(a.cells().iter().sorted().collect::<Vec<_>>(),
                   b.cells().iter().sorted().collect::<Vec<_>>());
    }

    #[test]
    fn algorithm_dispatch() {
        let d = dims(9, 9);
        let mut rng = XorShiftRng::seed_from_u64(5);
        let via_enum = Algorithm::Wilson.generate(&d, &mut rng).unwrap();
        let direct = carve_with(Wilson, 9, 9, 5);
        assert_eq!(via_enum.cells(), direct.cells());
        assert_eq!(Algorithm::default(), Algorithm::GrowingTree);
        assert_eq!(Algorithm::GrowingTree.name(), "growing tree");
    }

    #[test]
    fn growing_tree_golden_5x5_seed_42() {
        let carved = carve_with(GrowingTree, 5, 5, 42);
        assert_eq!(carved.cells(), GOLDEN_5X5_SEED_42);
    }

    // Carve order of the 5x5 growing tree maze for seed 42.
    const GOLDEN_5X5_SEED_42: &[Cell] = &[Cell { row: 3, col: 1 },
                                          Cell { row: 3, col: 2 },
                                          Cell { row: 3, col: 3 },
                                          Cell { row: 2, col: 1 },
                                          Cell { row: 1, col: 1 },
                                          Cell { row: 1, col: 2 },
                                          Cell { row: 1, col: 3 }];

    #[test]
    fn wilson_is_uniform_over_3x3_node_trees() {
        // The 3x3 node lattice has 192 spanning trees.
        const TREES: usize = 192;
        const SAMPLES_PER_TREE: usize = 50;
        let d = dims(7, 7);
        let mut rng = XorShiftRng::seed_from_u64(2017);
        let mut counts: FnvHashMap<Vec<Cell>, usize> = fnv_hashmap(TREES);

        for _ in 0..TREES * SAMPLES_PER_TREE {
            let carved = Wilson.generate(&d, &mut rng).unwrap();
            let walls = carved.cells()
                .iter()
                .filter(|c| (c.row + c.col) % 2 == 1)
                .cloned()
                .sorted()
                .collect::<Vec<_>>();
            assert_eq!(walls.len(), 8);
            *counts.entry(walls).or_insert(0) += 1;
        }

        assert_eq!(counts.len(), TREES);
        let expected = SAMPLES_PER_TREE as f64;
        let chi_square: f64 = counts.values()
            .map(|&observed| {
                let diff = observed as f64 - expected;
                diff * diff / expected
            })
            .sum();
        // 191 degrees of freedom: mean 191, standard deviation about 19.5.
        assert!(chi_square < 300.0, "chi-square {} too large", chi_square);
    }

    #[test]
    fn quickcheck_generated_mazes_are_perfect() {
        fn prop(half_w: u8, half_h: u8, seed: u64, wilson: bool) -> TestResult {
            let w = 3 + 2 * (half_w % 12) as usize;
            let h = 3 + 2 * (half_h % 12) as usize;
            let carved = if wilson {
                carve_with(Wilson, w, h, seed)
            } else {
                carve_with(GrowingTree, w, h, seed)
            };
            let unique = carved.cells().iter().cloned().collect::<FnvHashSet<_>>();
            TestResult::from_bool(unique.len() == carved.len() && as_maze(&carved).is_perfect())
        }
        quickcheck(prop as fn(u8, u8, u64, bool) -> TestResult);
    }
}
