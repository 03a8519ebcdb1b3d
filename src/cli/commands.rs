//! Command dispatch for the demo CLI

use kurbo::Point;
use tracing::{debug, instrument};

use crate::application::{create_demo_mindmap, ApplicationError, DropResult, MindMap};
use crate::cli::args::{Cli, Commands, DirectionArg};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output::{self, TreeConvert};
use crate::config::Settings;
use crate::domain::{Direction, NodeId};

/// Load the layered settings, then run the parsed command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    execute_with_settings(cli, settings)
}

/// Run the parsed command with already resolved settings; `cli.config` is ignored.
pub fn execute_with_settings(cli: &Cli, settings: Settings) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Demo) | None => cmd_demo(settings),
        Some(Commands::Navigate { label, direction }) => cmd_navigate(settings, label, *direction),
        Some(Commands::Collapse { label }) => cmd_collapse(settings, label),
        Some(Commands::Move { label, onto }) => cmd_move(settings, label, onto),
        Some(Commands::Settings) => cmd_settings(&settings),
    }
}

fn lookup(map: &MindMap, label: &str) -> CliResult<NodeId> {
    map.find_by_label(label)
        .ok_or_else(|| ApplicationError::NodeNotFound(label.to_string()).into())
}

#[instrument(skip(settings))]
fn cmd_demo(settings: Settings) -> CliResult<()> {
    let map = create_demo_mindmap(settings)?;
    output::header(&format!("{} nodes, depth {}", map.len(), map.depth()));
    output::info(&map.to_tree_string());
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_navigate(settings: Settings, label: &str, direction: DirectionArg) -> CliResult<()> {
    let map = create_demo_mindmap(settings)?;
    let from = lookup(&map, label)?;
    let direction = Direction::from(direction);
    match map.find_closest(from, direction) {
        Some(target) => {
            let target_label = map.label(target).unwrap_or_default();
            debug!("navigate: {} -> {}", from, target);
            output::action(&format!("{direction:?}"), &format!("{label} -> {target_label}"));
        }
        None => output::warning(&format!("nothing {direction:?} of {label}")),
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_collapse(settings: Settings, label: &str) -> CliResult<()> {
    let mut map = create_demo_mindmap(settings)?;
    let node = lookup(&map, label)?;
    if map.toggle_collapse(node)? {
        let state = if map.node(node).is_some_and(|n| n.collapsed()) {
            "collapsed"
        } else {
            "expanded"
        };
        output::action(state, label);
    } else {
        output::warning(&format!("{label} has no children, nothing to collapse"));
    }
    output::info(&map.to_tree_string());
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_move(settings: Settings, label: &str, onto: &str) -> CliResult<()> {
    let mut map = create_demo_mindmap(settings)?;
    let node = lookup(&map, label)?;
    let target = lookup(&map, onto)?;
    if !map.can_reparent(target, node) {
        return Err(CliError::InvalidArgs(format!("{label} cannot be moved onto {onto}")));
    }

    // simulate the pointer: pick the node up, carry it over the target, drop it
    let from = map.position(node).unwrap_or(Point::ZERO);
    let to = map.position(target).unwrap_or(Point::ZERO);
    map.start_drag(node)?;
    map.drag_by(to.x - from.x, to.y - from.y)?;
    match map.end_drag(to)? {
        DropResult::Reparented { flipped, .. } => {
            let note = if flipped { " (mirrored to the other side)" } else { "" };
            output::action("moved", &format!("{label} under {onto}{note}"));
        }
        DropResult::SnappedBack | DropResult::Ignored => {
            output::warning(&format!("{label} snapped back"));
        }
    }
    output::info(&map.to_tree_string());
    Ok(())
}

fn cmd_settings(settings: &Settings) -> CliResult<()> {
    output::info(&settings.to_toml()?);
    Ok(())
}
