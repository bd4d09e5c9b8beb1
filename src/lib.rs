//! **blockmaze** generates perfect block mazes and answers the movement and boundary queries
//! a player layer needs to walk them.
//!
//! A maze is a grid of odd width and height whose open cells form a spanning tree, with one gap
//! in the top wall. Cells map to signed block indices in a padded coordinate frame centred on
//! the maze, so points just outside the maze still resolve to an index.

pub mod carving;
pub mod cells;
pub mod config;
pub mod coordinates;
pub mod errors;
pub mod generators;
pub mod grid;
pub mod grid_dimensions;
pub mod pathing;
pub mod units;
pub mod utils;
