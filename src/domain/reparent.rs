//! Drag-and-drop reparenting: target validation, the atomic move with side
//! correction, and drop-target hit testing.

use kurbo::{Point, Rect, Size};
use tracing::{debug, instrument};

use crate::config::{LayoutSettings, NavigationSettings};
use crate::domain::arena::MapArena;
use crate::domain::entities::{NodeId, Side};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::layout::LayoutEngine;
use crate::domain::visibility::visible_nodes;

/// What a successful [`reparent`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReparentOutcome {
    pub old_parent: NodeId,
    /// The subtree was mirrored onto the other side.
    pub flipped: bool,
}

/// Whether `candidate` may become the new parent of `dragged`.
pub fn can_reparent(arena: &MapArena, candidate: NodeId, dragged: NodeId) -> bool {
    if candidate == dragged || !arena.contains(candidate) || !arena.contains(dragged) {
        return false;
    }
    let dragged_parent = arena.parent(dragged);
    if dragged_parent == Some(candidate) {
        return false;
    }
    let root = Some(arena.root());
    if dragged_parent == root && arena.parent(candidate) == root {
        // top-level branches can always be nested under each other
        return true;
    }
    !arena.is_in_subtree(candidate, dragged)
}

/// Move `dragged` (with its subtree) under `new_parent`.
///
/// If the node ends up on the other side of its new parent than it was on
/// relative to the old one, the subtree is mirrored about the new parent's x.
/// Both the old and the new sibling groups are re-laid out. A target that
/// [`can_reparent`] rejects, the current parent included, is a
/// `CycleDetected` error and nothing changes.
#[instrument(level = "debug", skip(arena, layout))]
pub fn reparent(
    arena: &mut MapArena,
    layout: &LayoutEngine,
    dragged: NodeId,
    new_parent: NodeId,
) -> DomainResult<ReparentOutcome> {
    arena.node(dragged)?;
    let target_x = arena.position(new_parent)?.x;
    if !can_reparent(arena, new_parent, dragged) {
        return Err(DomainError::CycleDetected {
            node: dragged,
            target: new_parent,
        });
    }

    let old_side = LayoutEngine::side_of(arena, dragged).unwrap_or(Side::Right);
    let new_side = LayoutEngine::side_of(arena, new_parent).unwrap_or(Side::Right);

    let old_parent = arena.relink(dragged, new_parent)?;
    let flipped = old_side != new_side;
    if flipped {
        debug!("reparent: {} flips {} -> {}", dragged, old_side, new_side);
        LayoutEngine::flip_subtree(arena, dragged, target_x)?;
    }

    layout.reposition_siblings(arena, old_parent)?;
    layout.reposition_siblings(arena, new_parent)?;
    Ok(ReparentOutcome { old_parent, flipped })
}

/// Visible nodes that would accept `dragged` as a child.
pub fn drop_targets(arena: &MapArena, dragged: NodeId) -> Vec<NodeId> {
    visible_nodes(arena)
        .into_iter()
        .filter(|&candidate| can_reparent(arena, candidate, dragged))
        .collect()
}

/// Drop target under `point`: the valid target whose (tolerance-inflated) box
/// contains the point, closest centre first.
pub fn find_drop_target(
    arena: &MapArena,
    layout: &LayoutSettings,
    navigation: &NavigationSettings,
    dragged: NodeId,
    point: Point,
) -> Option<NodeId> {
    let size = Size::new(layout.node_width, layout.min_node_height);
    let tolerance = navigation.drop_tolerance;

    let mut best: Option<(NodeId, f64)> = None;
    for candidate in drop_targets(arena, dragged) {
        let Some(node) = arena.get(candidate) else { continue };
        let bounds = Rect::from_center_size(node.position, size).inflate(tolerance, tolerance);
        if !bounds.contains(point) {
            continue;
        }
        let distance = node.position.distance(point);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(id, _)| id)
}
