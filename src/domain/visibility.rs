//! Collapse visibility: a node is hidden iff some strict ancestor is collapsed.
//!
//! Computed on demand from the current collapse flags, never cached.

use std::collections::BTreeMap;

use kurbo::Point;

use crate::domain::arena::MapArena;
use crate::domain::entities::NodeId;

/// Whether `node` is shown. Unknown nodes are not visible.
pub fn is_visible(arena: &MapArena, node: NodeId) -> bool {
    arena.contains(node)
        && !arena
            .ancestors(node)
            .any(|a| arena.get(a).is_some_and(|n| n.collapsed))
}

/// The connector from `child` to its parent follows the child's visibility.
pub fn is_edge_visible(arena: &MapArena, child: NodeId) -> bool {
    arena.parent(child).is_some() && is_visible(arena, child)
}

/// Visible nodes in pre-order; collapsed subtrees are skipped without descending.
pub fn visible_nodes(arena: &MapArena) -> Vec<NodeId> {
    let mut out = Vec::with_capacity(arena.len());
    let mut stack = vec![arena.root()];
    while let Some(id) = stack.pop() {
        let Some(node) = arena.get(id) else { continue };
        out.push(id);
        if !node.collapsed {
            stack.extend(node.children.iter().rev());
        }
    }
    out
}

pub fn visible_positions(arena: &MapArena) -> BTreeMap<NodeId, Point> {
    visible_nodes(arena)
        .into_iter()
        .filter_map(|id| arena.get(id).map(|n| (id, n.position)))
        .collect()
}

/// `(parent, child)` pairs whose connector should be drawn.
pub fn visible_edges(arena: &MapArena) -> Vec<(NodeId, NodeId)> {
    visible_nodes(arena)
        .into_iter()
        .filter_map(|id| arena.parent(id).map(|p| (p, id)))
        .collect()
}
