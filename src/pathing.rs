use smallvec::SmallVec;

use crate::coordinates::BlockIndex;
use crate::grid::MazeGraph;
use crate::utils;
use crate::utils::FnvHashMap;

pub type BlockSmallVec = SmallVec<[BlockIndex; 8]>;

/// Step counts from a start block to every open block reachable from it.
#[derive(Debug, Clone)]
pub struct Distances {
    start: BlockIndex,
    distances: FnvHashMap<BlockIndex, u32>,
    max_distance: u32,
}

impl Distances {
    /// Flood fill outwards from `start`. `None` if `start` is not an open block.
    pub fn new(maze: &MazeGraph, start: BlockIndex) -> Option<Distances> {
        if !maze.is_open(start) {
            return None;
        }

        let mut max = 0;
        let mut distances = utils::fnv_hashmap(maze.empty_blocks().len());
        distances.insert(start, 0);

        // Unweighted steps: the first time a block is reached is by a shortest route, so the
        // distances map doubles as the visited set.
        let mut frontier = vec![start];
        while !frontier.is_empty() {
            let mut new_frontier = vec![];
            for block in &frontier {
                let distance_to_block = distances[block];
                if distance_to_block > max {
                    max = distance_to_block;
                }

                for link in open_links(maze, *block) {
                    if !distances.contains_key(&link) {
                        distances.insert(link, distance_to_block + 1);
                        new_frontier.push(link);
                    }
                }
            }
            frontier = new_frontier;
        }

        Some(Distances {
            start: start,
            distances: distances,
            max_distance: max,
        })
    }

    #[inline(always)]
    pub fn start(&self) -> BlockIndex {
        self.start
    }

    #[inline(always)]
    pub fn max(&self) -> u32 {
        self.max_distance
    }

    #[inline(always)]
    pub fn distance_from_start_to(&self, block: BlockIndex) -> Option<u32> {
        self.distances.get(&block).cloned()
    }

    #[inline]
    pub fn reachable_count(&self) -> usize {
        self.distances.len()
    }

    /// Blocks at the maximum distance, in ascending order.
    pub fn furthest_points(&self) -> BlockSmallVec {
        let furthest_distance = self.max();
        let mut furthest = self.distances
            .iter()
            .filter(|&(_, &distance)| distance == furthest_distance)
            .map(|(&block, _)| block)
            .collect::<BlockSmallVec>();
        furthest.sort();
        furthest
    }
}

/// Open neighbours of an open block, in direction order.
fn open_links(maze: &MazeGraph, block: BlockIndex) -> BlockSmallVec {
    maze.neighbors_of(block)
        .iter()
        .filter_map(|&neighbour| neighbour)
        .filter(|&neighbour| maze.is_open(neighbour))
        .collect()
}

/// Route from the start of `distances_from_start` to `end_point`, both ends included.
/// `None` when the end is unreachable or the distances belong to another maze.
pub fn shortest_path(maze: &MazeGraph,
                     distances_from_start: &Distances,
                     end_point: BlockIndex)
                     -> Option<Vec<BlockIndex>> {
    let mut current_distance = distances_from_start.distance_from_start_to(end_point)?;
    let start = distances_from_start.start();
    let mut path = vec![end_point];
    let mut current = end_point;

    while current != start {
        let closest_to_start = open_links(maze, current)
            .iter()
            .filter_map(|&link| distances_from_start.distance_from_start_to(link).map(|d| (link, d)))
            .min_by_key(|&(_, distance)| distance);

        match closest_to_start {
            Some((closer, closer_distance)) if closer_distance < current_distance => {
                current = closer;
                current_distance = closer_distance;
                path.push(current);
            }
            // No step gets any closer: the distances do not describe this maze.
            _ => return None,
        }
    }

    path.reverse();
    Some(path)
}

/// The route a player takes from the start block out through the exit.
pub fn solve(maze: &MazeGraph) -> Option<Vec<BlockIndex>> {
    let distances = Distances::new(maze, maze.start_block())?;
    shortest_path(maze, &distances, maze.exit_block())
}

/// Longest route between two open blocks. Exact only for perfect mazes.
pub fn longest_path(maze: &MazeGraph) -> Option<Vec<BlockIndex>> {
    let arbitrary_start = *maze.empty_blocks().first()?;
    let first_distances = Distances::new(maze, arbitrary_start)?;

    // The far end of a longest path is furthest from any starting point.
    let long_path_start = first_distances.furthest_points()[0];
    let distances_from_start = Distances::new(maze, long_path_start)?;
    let end_point = distances_from_start.furthest_points()[0];

    shortest_path(maze, &distances_from_start, end_point)
}
