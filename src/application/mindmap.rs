//! Mind-map session: the tree store that callers mutate and query.
//!
//! Every mutating call validates first, then updates the tree, re-runs the
//! layout for the affected sibling groups and finally publishes an event.

use std::collections::BTreeMap;

use kurbo::Point;
use tracing::{debug, info, instrument};

use crate::config::Settings;
use crate::domain::layout::LayoutEngine;
use crate::domain::navigation::Navigator;
use crate::domain::reparent::{self, ReparentOutcome};
use crate::domain::visibility;
use crate::domain::{
    Direction, DomainError, DomainResult, EventBus, EventKind, MapArena, MapEvent, Node, NodeId,
    Outcome, Side, SubscriptionId, VerticalStep,
};

/// Node being dragged and where it started.
#[derive(Debug, Clone, Copy)]
struct DragState {
    node: NodeId,
    origin: Point,
}

/// How a drag ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropResult {
    Reparented { new_parent: NodeId, flipped: bool },
    /// No valid target under the pointer; the node went back to its slot.
    SnappedBack,
    /// No drag was in progress.
    Ignored,
}

/// One editing session of a mind map.
#[derive(Debug)]
pub struct MindMap {
    arena: MapArena,
    layout: LayoutEngine,
    settings: Settings,
    events: EventBus,
    drag: Option<DragState>,
}

impl MindMap {
    pub fn new(root_label: impl Into<String>) -> Self {
        Self::with_settings(Settings::default(), root_label)
    }

    pub fn with_settings(settings: Settings, root_label: impl Into<String>) -> Self {
        let root_position = Point::new(settings.layout.root_x, settings.layout.root_y);
        let arena = MapArena::new(root_label, root_position);
        info!("new map: root {} at {:?}", arena.root(), root_position);
        Self {
            arena,
            layout: LayoutEngine::new(settings.layout.clone()),
            settings,
            events: EventBus::new(),
            drag: None,
        }
    }

    // ------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------

    pub fn arena(&self) -> &MapArena {
        &self.arena
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn root(&self) -> NodeId {
        self.arena.root()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Never true: a map always has its root.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.arena.get(id).map(Node::label)
    }

    pub fn position(&self, id: NodeId) -> Option<Point> {
        self.arena.get(id).map(Node::position)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.parent(id)
    }

    pub fn get_children(&self, id: NodeId) -> &[NodeId] {
        self.arena.children(id)
    }

    /// Side relative to the parent; `None` for the root.
    pub fn side(&self, id: NodeId) -> Option<Side> {
        LayoutEngine::side_of(&self.arena, id)
    }

    /// First node (pre-order) whose label equals `label`.
    pub fn find_by_label(&self, label: &str) -> Option<NodeId> {
        self.arena
            .iter()
            .find(|(_, node)| node.label() == label)
            .map(|(id, _)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.arena.iter()
    }

    pub fn depth(&self) -> usize {
        self.arena.depth()
    }

    pub fn subtree_space(&self, id: NodeId) -> f64 {
        self.layout.subtree_space(&self.arena, id)
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        visibility::is_visible(&self.arena, id)
    }

    pub fn is_edge_visible(&self, child: NodeId) -> bool {
        visibility::is_edge_visible(&self.arena, child)
    }

    pub fn get_visible_positions(&self) -> BTreeMap<NodeId, Point> {
        visibility::visible_positions(&self.arena)
    }

    pub fn visible_edges(&self) -> Vec<(NodeId, NodeId)> {
        visibility::visible_edges(&self.arena)
    }

    // ------------------------------------------------------------
    // Events
    // ------------------------------------------------------------

    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&MapEvent) + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(kind, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // ------------------------------------------------------------
    // Tree mutation
    // ------------------------------------------------------------

    /// Append a new child to `parent`, place it and re-lay out its siblings.
    #[instrument(level = "debug", skip(self, label))]
    pub fn create_child(&mut self, parent: NodeId, label: impl Into<String>) -> DomainResult<NodeId> {
        let position = self.layout.place_new_child(&self.arena, parent)?;
        self.insert_placed(parent, label.into(), position)
    }

    /// Like [`MindMap::create_child`], with an explicit side for root children.
    ///
    /// Below the root the side is still inherited from `parent`.
    #[instrument(level = "debug", skip(self, label))]
    pub fn create_child_on_side(
        &mut self,
        parent: NodeId,
        label: impl Into<String>,
        side: Side,
    ) -> DomainResult<NodeId> {
        let position = match self.side(parent) {
            Some(inherited) => self.layout.place_new_child_on_side(&self.arena, parent, inherited)?,
            None => self.layout.place_new_child_on_side(&self.arena, parent, side)?,
        };
        self.insert_placed(parent, label.into(), position)
    }

    /// Add a node next to `node`, under the same parent.
    pub fn add_sibling(&mut self, node: NodeId, label: impl Into<String>) -> DomainResult<NodeId> {
        let parent = self
            .arena
            .node(node)?
            .parent()
            .ok_or(DomainError::RootHasNoSiblings)?;
        self.create_child(parent, label)
    }

    fn insert_placed(&mut self, parent: NodeId, label: String, position: Point) -> DomainResult<NodeId> {
        let id = self.arena.insert_child(parent, label, position)?;
        self.settle(parent)?;
        debug!("create_child: {} under {}", id, parent);
        self.events.publish(&MapEvent::NodeCreated { node: id, parent });
        Ok(id)
    }

    /// Replace the label; text that trims to nothing is rejected and the old label kept.
    pub fn set_label(&mut self, node: NodeId, text: impl Into<String>) -> DomainResult<()> {
        let text = text.into();
        if !self.arena.contains(node) {
            return Err(DomainError::InvalidParent(node));
        }
        if text.trim().is_empty() {
            return Err(DomainError::EmptyLabel(node));
        }
        self.arena.node_mut(node)?.label = text.clone();
        self.events.publish(&MapEvent::LabelChanged { node, text });
        Ok(())
    }

    /// Remove `node` and its subtree (descendants first). Returns the removed ids.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_subtree(&mut self, node: NodeId) -> DomainResult<Vec<NodeId>> {
        let parent = self
            .arena
            .node(node)?
            .parent()
            .ok_or(DomainError::CannotDeleteRoot)?;
        if self.drag.is_some_and(|d| self.arena.is_in_subtree(d.node, node)) {
            self.drag = None;
        }
        let removed = self.arena.remove_subtree(node)?;
        self.settle(parent)?;
        debug!("delete_subtree: {} nodes removed", removed.len());
        self.events.publish(&MapEvent::NodeDeleted {
            node,
            parent,
            removed: removed.clone(),
        });
        Ok(removed)
    }

    /// Swap `node` with its neighbour in stacking order.
    ///
    /// The two subtrees trade vertical bands; the first sibling cannot move up,
    /// the last cannot move down, and the root has no siblings at all.
    #[instrument(level = "debug", skip(self))]
    pub fn reorder_sibling(&mut self, node: NodeId, step: VerticalStep) -> DomainResult<Outcome> {
        let Some(parent) = self.arena.node(node)?.parent() else {
            return Ok(Outcome::NoOp);
        };
        let siblings = self.arena.children(parent);
        let Some(i) = siblings.iter().position(|&c| c == node) else {
            return Err(DomainError::InvalidParent(node));
        };
        let j = match step {
            VerticalStep::Up if i > 0 => i - 1,
            VerticalStep::Down if i + 1 < siblings.len() => i + 1,
            _ => return Ok(Outcome::NoOp),
        };
        let other = siblings[j];

        let y_node = self.arena.position(node)?.y;
        let y_other = self.arena.position(other)?.y;
        self.arena.swap_children(parent, i, j)?;
        LayoutEngine::move_subtree(&mut self.arena, node, 0.0, y_other - y_node)?;
        LayoutEngine::move_subtree(&mut self.arena, other, 0.0, y_node - y_other)?;
        self.settle(parent)?;

        self.events.publish(&MapEvent::SiblingsReordered { parent });
        Ok(Outcome::Applied)
    }

    /// Flip the collapse flag. Returns `false` (and changes nothing) for a leaf.
    ///
    /// Positions are never touched; only visibility of descendants changes.
    pub fn toggle_collapse(&mut self, node: NodeId) -> DomainResult<bool> {
        let n = self.arena.node_mut(node)?;
        if n.children.is_empty() {
            debug!("toggle_collapse: {} is a leaf, ignoring", node);
            return Ok(false);
        }
        n.collapsed = !n.collapsed;
        let collapsed = n.collapsed;
        self.events.publish(&MapEvent::CollapseToggled { node, collapsed });
        Ok(true)
    }

    /// Re-run the sibling layout for `parent` only.
    pub fn relayout(&mut self, parent: NodeId) -> DomainResult<()> {
        self.layout.reposition_siblings(&mut self.arena, parent)
    }

    /// Re-lay out `from` and every ancestor group above it, bottom-up.
    ///
    /// A group whose subtree grew or shrank changes its parent's band sizes,
    /// so the whole chain up to the root has to be redone.
    fn settle(&mut self, from: NodeId) -> DomainResult<()> {
        let chain: Vec<NodeId> = std::iter::once(from)
            .chain(self.arena.ancestors(from))
            .collect();
        for parent in chain {
            self.layout.reposition_siblings(&mut self.arena, parent)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------

    pub fn find_closest(&self, from: NodeId, direction: Direction) -> Option<NodeId> {
        Navigator::new(&self.arena, &self.settings.navigation).find_closest(from, direction)
    }

    // ------------------------------------------------------------
    // Reparenting
    // ------------------------------------------------------------

    pub fn can_reparent(&self, candidate: NodeId, dragged: NodeId) -> bool {
        reparent::can_reparent(&self.arena, candidate, dragged)
    }

    /// Move `dragged` under `new_parent`; rejected moves leave the map untouched.
    pub fn reparent(&mut self, dragged: NodeId, new_parent: NodeId) -> DomainResult<ReparentOutcome> {
        let outcome = reparent::reparent(&mut self.arena, &self.layout, dragged, new_parent)?;
        self.settle(outcome.old_parent)?;
        self.settle(new_parent)?;
        self.events.publish(&MapEvent::NodeReparented {
            node: dragged,
            old_parent: outcome.old_parent,
            new_parent,
        });
        Ok(outcome)
    }

    pub fn drop_targets(&self, dragged: NodeId) -> Vec<NodeId> {
        reparent::drop_targets(&self.arena, dragged)
    }

    pub fn find_drop_target(&self, dragged: NodeId, point: Point) -> Option<NodeId> {
        reparent::find_drop_target(
            &self.arena,
            &self.settings.layout,
            &self.settings.navigation,
            dragged,
            point,
        )
    }

    /// Begin dragging `node`. The root cannot be dragged.
    pub fn start_drag(&mut self, node: NodeId) -> DomainResult<Outcome> {
        let n = self.arena.node(node)?;
        if n.is_root() {
            return Ok(Outcome::NoOp);
        }
        self.drag = Some(DragState {
            node,
            origin: n.position(),
        });
        Ok(Outcome::Applied)
    }

    /// Move the dragged subtree rigidly by `(dx, dy)`.
    pub fn drag_by(&mut self, dx: f64, dy: f64) -> DomainResult<Outcome> {
        let Some(drag) = self.drag else {
            return Ok(Outcome::NoOp);
        };
        LayoutEngine::move_subtree(&mut self.arena, drag.node, dx, dy)?;
        Ok(Outcome::Applied)
    }

    /// Finish the drag at `drop_point`.
    ///
    /// Over a valid target the node is reparented and lands beside its new
    /// parent at the drop height; otherwise it returns to where it started.
    #[instrument(level = "debug", skip(self))]
    pub fn end_drag(&mut self, drop_point: Point) -> DomainResult<DropResult> {
        let Some(drag) = self.drag.take() else {
            return Ok(DropResult::Ignored);
        };
        let target = self.find_drop_target(drag.node, drop_point);

        let current = self.arena.position(drag.node)?;
        LayoutEngine::move_subtree(
            &mut self.arena,
            drag.node,
            drag.origin.x - current.x,
            drag.origin.y - current.y,
        )?;

        let Some(new_parent) = target else {
            if let Some(parent) = self.arena.parent(drag.node) {
                self.settle(parent)?;
            }
            return Ok(DropResult::SnappedBack);
        };

        let ReparentOutcome { flipped, .. } = self.reparent(drag.node, new_parent)?;

        let side = self.side(new_parent).unwrap_or(Side::Right);
        let anchor = self.arena.position(new_parent)?;
        let landed = self.arena.position(drag.node)?;
        let target_x = anchor.x + side.sign() * self.settings.layout.horizontal_offset;
        LayoutEngine::move_subtree(
            &mut self.arena,
            drag.node,
            target_x - landed.x,
            drop_point.y - landed.y,
        )?;
        self.settle(new_parent)?;

        Ok(DropResult::Reparented { new_parent, flipped })
    }
}
