use blockmaze::{
    config::{Difficulty, MazeConfig},
    coordinates::BlockIndex,
    generators::Algorithm,
    grid::MazeGraph,
    pathing,
};
use docopt::Docopt;
use error_chain::bail;
use itertools::Itertools;
use log::info;
use petgraph::visit::EdgeRef;
use serde_derive::Deserialize;
use std::{
    fs::File,
    io,
    io::prelude::*,
};

const USAGE: &str = "Block Maze

Usage:
    blockmaze_driver -h | --help
    blockmaze_driver [growing-tree | wilson] [--difficulty=<d> | --width=<w> --height=<h>] [--block-size=<s>] [--seed=<n>] [--show-blocks] [--show-path] [--show-maze] [--text-out=<path>] [--save-edges=<path>]

Options:
    -h --help              Show this screen.
    --difficulty=<d>       easy (25x25), medium (51x51) or hard (101x101). Medium if no size is given.
    --width=<w>            Maze width in cells, odd and at least 3.
    --height=<h>           Maze height in cells, odd and at least 3.
    --block-size=<s>       Drawing size of one cell [default: 50].
    --seed=<n>             Seed the random source for a reproducible maze.
    --show-blocks          Print every open block index in ascending order.
    --show-path            Print the blocks on the route from the start out through the exit.
    --show-maze            Print the maze as text, top row first.
    --text-out=<path>      Write the text drawing of the maze to a file.
    --save-edges=<path>    Serialize the passages to a text file: each line is a pair of numbers. Line 1: n(#vertices) m(#edges). Line 2+ edge between vertices. Uses 1-based vertex indices.
";
#[derive(Debug, Deserialize)]
struct DriverArgs {
    cmd_growing_tree: bool,
    cmd_wilson: bool,
    flag_difficulty: Option<String>,
    flag_width: Option<usize>,
    flag_height: Option<usize>,
    flag_block_size: f64,
    flag_seed: Option<u64>,
    flag_show_blocks: bool,
    flag_show_path: bool,
    flag_show_maze: bool,
    flag_text_out: String,
    flag_save_edges: String,
}

// Driver errors wrap the library's own chain plus the foreign failures only the driver sees.
mod errors {
    use error_chain::*;
    error_chain! {

        links {
            Maze(::blockmaze::errors::Error, ::blockmaze::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: DriverArgs = match Docopt::new(USAGE).and_then(|d| d.deserialize()) {
        Ok(args) => args,
        Err(e) if e.fatal() => {
            bail!(e);
        }
        Err(e) => e.exit(),
    };

    let config = maze_config(&args)?;
    let maze = config.build_maze()?;
    let solution = pathing::solve(&maze).ok_or("The maze has no route from the start to the exit.")?;

    print_summary(&config, &maze, &solution);

    if args.flag_show_blocks {
        println!("open blocks:");
        for line in &maze.empty_blocks().iter().chunks(16) {
            println!("  {}", line.map(BlockIndex::to_string).join(" "));
        }
    }

    if args.flag_show_path {
        println!("route: {}", solution.iter().map(BlockIndex::to_string).join(" -> "));
    }

    if args.flag_show_maze {
        print!("{}", maze);
    }

    if !args.flag_text_out.is_empty() {
        write_text_to_file(&maze.to_string(), &args.flag_text_out)
            .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
        info!("wrote maze drawing to {}", args.flag_text_out);
    }

    if !args.flag_save_edges.is_empty() {
        save_maze_graph(&maze, &args.flag_save_edges)?;
        info!("wrote passage graph to {}", args.flag_save_edges);
    }

    Ok(())
}

fn maze_config(args: &DriverArgs) -> Result<MazeConfig> {
    let mut config = match args.flag_difficulty {
        Some(ref name) => MazeConfig::from_difficulty(name.parse::<Difficulty>()?),
        None => MazeConfig::default(),
    };

    if let (Some(width), Some(height)) = (args.flag_width, args.flag_height) {
        config.width = width;
        config.height = height;
    }
    config.block_size = args.flag_block_size;
    config.seed = args.flag_seed;
    config.algorithm = if args.cmd_wilson {
        Algorithm::Wilson
    } else if args.cmd_growing_tree {
        Algorithm::GrowingTree
    } else {
        Algorithm::default()
    };
    Ok(config)
}

fn print_summary(config: &MazeConfig, maze: &MazeGraph, solution: &[BlockIndex]) {
    println!("algorithm: {}", config.algorithm.name());
    println!("size: {}x{}", config.width, config.height);
    println!("block size: {}", maze.block_size());
    println!("open blocks: {}", maze.empty_blocks().len());
    println!("start block: {} at {}", maze.start_block(), describe_coord(maze.start_coord()));
    println!("exit block: {} at {}", maze.exit_block(), describe_coord(maze.exit_coord()));
    println!("route length: {} blocks", solution.len());
    println!("perfect: {}", maze.is_perfect());
}

fn describe_coord(coord: Option<(f64, f64)>) -> String {
    match coord {
        Some((x, y)) => format!("({}, {})", x, y),
        None => String::from("(off the board)"),
    }
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}

fn save_maze_graph(maze: &MazeGraph, file_path: &str) -> Result<()> {
    let graph = maze.passage_graph();

    let mut graph_data = String::new();
    graph_data.push_str(graph.node_count().to_string().as_ref());
    graph_data.push(' ');
    graph_data.push_str(graph.edge_count().to_string().as_ref());
    graph_data.push('\n');

    for edge in graph.edge_references() {
        let src_as_1_based_index = edge.source().index() + 1;
        let dst_as_1_based_index = edge.target().index() + 1;

        graph_data.push_str(src_as_1_based_index.to_string().as_ref());
        graph_data.push(' ');
        graph_data.push_str(dst_as_1_based_index.to_string().as_ref());
        graph_data.push('\n');
    }

    write_text_to_file(&graph_data, file_path)
        .chain_err(|| format!("Failed to write maze graph to text file {}", file_path))?;

    Ok(())
}
