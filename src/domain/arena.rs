use generational_arena::Arena;
use kurbo::Point;
use tracing::{debug, instrument};

use crate::domain::entities::{Node, NodeId};
use crate::domain::error::{DomainError, DomainResult};

/// Arena-based tree store for one mind map.
///
/// Uses a generational arena for memory-safe node references and O(1) lookups.
/// The root is created with the arena and can never be removed; every other node
/// is attached to a live parent at insertion, so there are no detached nodes.
#[derive(Debug, Clone)]
pub struct MapArena {
    /// Arena storage for all tree nodes
    arena: Arena<Node>,
    /// Index of the root node
    root: NodeId,
}

impl MapArena {
    pub fn new(root_label: impl Into<String>, root_position: Point) -> Self {
        let mut arena = Arena::new();
        let root = NodeId(arena.insert(Node::new(root_label.into(), root_position, None)));
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Never true: the root always exists.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.index())
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id.index())
    }

    /// Like [`MapArena::get`], but a missing node is an `InvalidParent` error.
    pub fn node(&self, id: NodeId) -> DomainResult<&Node> {
        self.get(id).ok_or(DomainError::InvalidParent(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> DomainResult<&mut Node> {
        self.arena
            .get_mut(id.index())
            .ok_or(DomainError::InvalidParent(id))
    }

    pub fn position(&self, id: NodeId) -> DomainResult<Point> {
        Ok(self.node(id)?.position)
    }

    pub(crate) fn set_position(&mut self, id: NodeId, position: Point) -> DomainResult<()> {
        self.node_mut(id)?.position = position;
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    #[instrument(level = "trace", skip(self, label))]
    pub(crate) fn insert_child(
        &mut self,
        parent: NodeId,
        label: String,
        position: Point,
    ) -> DomainResult<NodeId> {
        if !self.contains(parent) {
            return Err(DomainError::InvalidParent(parent));
        }
        let id = NodeId(self.arena.insert(Node::new(label, position, Some(parent))));
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Move `node` under `new_parent`, appending it to the new children list.
    ///
    /// Both sides of the link are updated in one step. Returns the old parent.
    #[instrument(level = "debug", skip(self))]
    pub(crate) fn relink(&mut self, node: NodeId, new_parent: NodeId) -> DomainResult<NodeId> {
        if !self.contains(new_parent) {
            return Err(DomainError::InvalidParent(new_parent));
        }
        let old_parent = self.node(node)?.parent.ok_or(DomainError::CycleDetected {
            node,
            target: new_parent,
        })?;
        if self.is_in_subtree(new_parent, node) {
            return Err(DomainError::CycleDetected {
                node,
                target: new_parent,
            });
        }

        let old = self.node_mut(old_parent)?;
        old.children.retain(|&c| c != node);
        if old.children.is_empty() {
            old.collapsed = false;
        }
        self.node_mut(new_parent)?.children.push(node);
        self.node_mut(node)?.parent = Some(new_parent);
        debug!("relink: {} from {} to {}", node, old_parent, new_parent);
        Ok(old_parent)
    }

    /// Remove `node` and its whole subtree, children before parents.
    ///
    /// Returns the removed ids in removal (post-) order.
    #[instrument(level = "debug", skip(self))]
    pub(crate) fn remove_subtree(&mut self, node: NodeId) -> DomainResult<Vec<NodeId>> {
        let parent = self
            .node(node)?
            .parent
            .ok_or(DomainError::CannotDeleteRoot)?;

        let doomed: Vec<NodeId> = self.iter_postorder(node).map(|(id, _)| id).collect();
        for &id in &doomed {
            self.arena.remove(id.index());
        }

        let parent = self.node_mut(parent)?;
        parent.children.retain(|&c| c != node);
        if parent.children.is_empty() {
            parent.collapsed = false;
        }
        Ok(doomed)
    }

    pub(crate) fn swap_children(&mut self, parent: NodeId, a: usize, b: usize) -> DomainResult<()> {
        self.node_mut(parent)?.children.swap(a, b);
        Ok(())
    }

    pub(crate) fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) -> DomainResult<()> {
        self.node_mut(parent)?.children = children;
        Ok(())
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            arena: self,
            next: self.parent(id),
        }
    }

    /// Whether `candidate` is `subtree_root` or one of its descendants.
    pub fn is_in_subtree(&self, candidate: NodeId, subtree_root: NodeId) -> bool {
        candidate == subtree_root || self.ancestors(candidate).any(|a| a == subtree_root)
    }

    /// Pre-order traversal of the whole map, children left to right.
    pub fn iter(&self) -> PreOrderIterator<'_> {
        self.iter_subtree(self.root)
    }

    pub fn iter_subtree(&self, start: NodeId) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self, start)
    }

    pub fn iter_postorder(&self, start: NodeId) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, start)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.calculate_depth(self.root)
    }

    fn calculate_depth(&self, node_idx: NodeId) -> usize {
        1 + self
            .children(node_idx)
            .iter()
            .map(|&child| self.calculate_depth(child))
            .max()
            .unwrap_or(0)
    }
}

/// Walks the parent chain upwards.
#[derive(Debug)]
pub struct Ancestors<'a> {
    arena: &'a MapArena,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.arena.parent(current);
        Some(current)
    }
}

#[derive(Debug)]
pub struct PreOrderIterator<'a> {
    arena: &'a MapArena,
    stack: Vec<NodeId>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(arena: &'a MapArena, start: NodeId) -> Self {
        let mut stack = Vec::new();
        if arena.contains(start) {
            stack.push(start);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.arena.get(current) {
                // Push children in reverse order for top-to-bottom traversal
                self.stack.extend(node.children.iter().rev());
                return Some((current, node));
            }
        }
        None
    }
}

#[derive(Debug)]
pub struct PostOrderIterator<'a> {
    arena: &'a MapArena,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a MapArena, start: NodeId) -> Self {
        let mut stack = Vec::new();
        if arena.contains(start) {
            stack.push((start, false));
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get(current) {
                if visited {
                    return Some((current, node));
                }
                self.stack.push((current, true));
                for &child in node.children.iter().rev() {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}
