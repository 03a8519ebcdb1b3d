//! Layout engine: vertical space allocation, sibling repositioning and
//! placement of new children.
//!
//! Only vertical coordinates are re-laid out; horizontal coordinates are set
//! once at placement (or mirrored by a reparent) and otherwise preserved, so a
//! node's side never changes behind the caller's back.

use itertools::Itertools;
use kurbo::Point;
use tracing::{debug, instrument, trace};

use crate::config::LayoutSettings;
use crate::domain::arena::MapArena;
use crate::domain::entities::{NodeId, Side};
use crate::domain::error::DomainResult;

/// Geometry engine for one map.
///
/// Owns the root side alternation state, so independent maps never share it.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    settings: LayoutSettings,
    next_root_side: Side,
}

impl LayoutEngine {
    pub fn new(settings: LayoutSettings) -> Self {
        Self {
            settings,
            next_root_side: Side::Right,
        }
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Side the next root child will be placed on.
    pub fn next_root_side(&self) -> Side {
        self.next_root_side
    }

    /// Side of `node` relative to its parent; `None` for the root.
    pub fn side_of(arena: &MapArena, node: NodeId) -> Option<Side> {
        let n = arena.get(node)?;
        let parent = arena.get(n.parent?)?;
        Some(Side::of(n.position.x, parent.position.x))
    }

    /// Minimum vertical extent the subtree rooted at `node` needs.
    pub fn subtree_space(&self, arena: &MapArena, node: NodeId) -> f64 {
        let leaf = self.settings.leaf_space();
        let children = arena.children(node);
        if children.is_empty() {
            return leaf;
        }
        let sum: f64 = children
            .iter()
            .map(|&child| self.subtree_space(arena, child))
            .sum();
        leaf.max(sum)
    }

    /// Stack the children of `parent` in contiguous bands centred on the parent's y.
    ///
    /// Children keep their relative vertical order (ties keep list order), and
    /// the sorted order is written back into the children list.
    #[instrument(level = "debug", skip(self, arena))]
    pub fn reposition_siblings(&self, arena: &mut MapArena, parent: NodeId) -> DomainResult<()> {
        let parent_y = arena.position(parent)?.y;
        let children = arena.children(parent).to_vec();
        if children.is_empty() {
            return Ok(());
        }

        let mut ordered = Vec::with_capacity(children.len());
        for child in children {
            ordered.push((child, arena.position(child)?.y));
        }
        let ordered: Vec<NodeId> = ordered
            .into_iter()
            .sorted_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
            .collect();

        let spaces: Vec<f64> = ordered
            .iter()
            .map(|&child| self.subtree_space(arena, child))
            .collect();
        let total: f64 = spaces.iter().sum();

        let mut band_top = parent_y - total / 2.0;
        for (&child, &space) in ordered.iter().zip(&spaces) {
            let target_y = band_top + space / 2.0;
            let dy = target_y - arena.position(child)?.y;
            if dy.abs() > self.settings.reposition_epsilon {
                trace!("reposition: {} by dy={:.1}", child, dy);
                Self::move_subtree(arena, child, 0.0, dy)?;
            }
            band_top += space;
        }

        arena.set_children(parent, ordered)
    }

    /// Rigidly translate `node` and all its descendants.
    pub fn move_subtree(arena: &mut MapArena, node: NodeId, dx: f64, dy: f64) -> DomainResult<()> {
        let ids: Vec<NodeId> = arena.iter_subtree(node).map(|(id, _)| id).collect();
        for id in ids {
            let p = arena.position(id)?;
            arena.set_position(id, Point::new(p.x + dx, p.y + dy))?;
        }
        Ok(())
    }

    /// Mirror `node` and all its descendants horizontally about `axis_x`.
    pub fn flip_subtree(arena: &mut MapArena, node: NodeId, axis_x: f64) -> DomainResult<()> {
        let ids: Vec<NodeId> = arena.iter_subtree(node).map(|(id, _)| id).collect();
        for id in ids {
            let p = arena.position(id)?;
            arena.set_position(id, Point::new(axis_x - (p.x - axis_x), p.y))?;
        }
        Ok(())
    }

    /// Position for a new child of `parent`.
    ///
    /// Root children alternate sides starting on the right; deeper children
    /// inherit their parent's side so a branch never crosses the midline.
    #[instrument(level = "debug", skip(self, arena))]
    pub fn place_new_child(&mut self, arena: &MapArena, parent: NodeId) -> DomainResult<Point> {
        let side = match Self::side_of(arena, parent) {
            Some(side) => side,
            None => {
                arena.node(parent)?;
                let side = self.next_root_side;
                self.next_root_side = side.opposite();
                side
            }
        };
        self.position_on_side(arena, parent, side)
    }

    /// Position for a new child of `parent` on an explicit side.
    ///
    /// For root children the alternation continues from `side`.
    pub fn place_new_child_on_side(
        &mut self,
        arena: &MapArena,
        parent: NodeId,
        side: Side,
    ) -> DomainResult<Point> {
        if arena.node(parent)?.is_root() {
            self.next_root_side = side.opposite();
        }
        self.position_on_side(arena, parent, side)
    }

    fn position_on_side(&self, arena: &MapArena, parent: NodeId, side: Side) -> DomainResult<Point> {
        let parent_node = arena.node(parent)?;
        let x = parent_node.position.x + side.sign() * self.settings.horizontal_offset;
        let y = match parent_node.children.last() {
            Some(&last) => arena.position(last)?.y + self.settings.sibling_gap,
            None => parent_node.position.y,
        };
        debug!("place: child of {} on {} at ({:.1}, {:.1})", parent, side, x, y);
        Ok(Point::new(x, y))
    }
}
