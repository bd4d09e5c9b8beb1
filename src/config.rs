use std::str::FromStr;

use error_chain::bail;
use log::info;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use serde_derive::Deserialize;

use crate::coordinates::{CoordinateIndex, DEFAULT_OVERSCAN};
use crate::errors::*;
use crate::generators::Algorithm;
use crate::grid::MazeGraph;
use crate::grid_dimensions::MazeDimensions;
use crate::units::{Height, Width};

pub const DEFAULT_BLOCK_SIZE: f64 = 50.0;

/// Everything needed to build one maze. Missing fields take their default values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    pub width: usize,
    pub height: usize,
    pub block_size: f64,
    pub overscan: f64,
    pub algorithm: Algorithm,
    /// Fixed seed for a reproducible maze; `None` draws one from the operating system.
    pub seed: Option<u64>,
}

impl Default for MazeConfig {
    fn default() -> MazeConfig {
        MazeConfig::from_difficulty(Difficulty::Medium)
    }
}

impl MazeConfig {
    pub fn from_difficulty(difficulty: Difficulty) -> MazeConfig {
        let size = difficulty.size();
        MazeConfig {
            width: size,
            height: size,
            block_size: DEFAULT_BLOCK_SIZE,
            overscan: DEFAULT_OVERSCAN,
            algorithm: Algorithm::default(),
            seed: None,
        }
    }

    pub fn dimensions(&self) -> Result<MazeDimensions> {
        MazeDimensions::new(Width(self.width), Height(self.height))
    }

    pub fn coordinate_index(&self) -> Result<CoordinateIndex> {
        CoordinateIndex::new(self.dimensions()?, self.block_size, self.overscan)
    }

    /// Generate with a `XorShiftRng` seeded from `seed`, or from entropy when unset.
    pub fn build_maze(&self) -> Result<MazeGraph> {
        let mut rng = match self.seed {
            Some(seed) => XorShiftRng::seed_from_u64(seed),
            None => XorShiftRng::from_entropy(),
        };
        info!("building a {}x{} {} maze (seed {:?})",
              self.width,
              self.height,
              self.algorithm.name(),
              self.seed);
        MazeGraph::generate(self, &mut rng)
    }
}

/// The three square maze sizes offered to a player.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Hard,
    Medium,
    Easy,
}

impl Difficulty {
    /// Cells along each side.
    pub fn size(self) -> usize {
        match self {
            Difficulty::Hard => 101,
            Difficulty::Medium => 51,
            Difficulty::Easy => 25,
        }
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Difficulty> {
        match s.to_lowercase().as_str() {
            "hard" | "1" => Ok(Difficulty::Hard),
            "medium" | "2" => Ok(Difficulty::Medium),
            "easy" | "3" => Ok(Difficulty::Easy),
            _ => {
                bail!(ErrorKind::UnknownDifficulty(s.to_string()));
            }
        }
    }
}
