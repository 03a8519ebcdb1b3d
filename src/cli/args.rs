//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::Direction;

/// Mind-map core playground: build the demo map, navigate, collapse and move nodes
#[derive(Parser, Debug)]
#[command(name = "mindflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath, env = "MINDFLOW_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the demo map with positions and sides
    Demo,

    /// Find the node reached from LABEL by an arrow key
    Navigate {
        /// Label of the starting node
        label: String,
        /// Arrow direction
        #[arg(value_enum)]
        direction: DirectionArg,
    },

    /// Toggle collapse of LABEL and print what stays visible
    Collapse {
        /// Label of the node to collapse or expand
        label: String,
    },

    /// Drag LABEL onto ONTO and print the resulting map
    Move {
        /// Label of the node to move
        label: String,
        /// Label of the new parent
        onto: String,
    },

    /// Show the effective settings as TOML
    Settings,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionArg {
    Up,
    Down,
    Left,
    Right,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Up => Direction::Up,
            DirectionArg::Down => Direction::Down,
            DirectionArg::Left => Direction::Left,
            DirectionArg::Right => Direction::Right,
        }
    }
}
