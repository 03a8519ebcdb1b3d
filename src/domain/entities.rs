//! Domain entities: node identity, node data, and the small vocabulary types
//! (sides, directions, outcomes) shared by the engines.

use std::fmt;

use generational_arena::Index;
use kurbo::Point;

/// Stable identifier of a node for its whole lifetime.
///
/// Wraps a generational arena index, so an id of a deleted node never aliases
/// a node created later in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) Index);

impl NodeId {
    pub(crate) fn index(self) -> Index {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "n{}g{}", slot, generation)
    }
}

/// Tree node in the mind map.
///
/// Links are only mutated by the store (`MapArena`), which keeps
/// `parent`/`children` mutually consistent.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) label: String,
    pub(crate) position: Point,
    pub(crate) collapsed: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(label: String, position: Point, parent: Option<NodeId>) -> Self {
        Self {
            label,
            position,
            collapsed: false,
            parent,
            children: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    /// Parent link, `None` only for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in stacking order (top to bottom).
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Horizontal side of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Infer the side of a child at `x` relative to a parent at `parent_x`.
    pub fn of(x: f64, parent_x: f64) -> Self {
        if x < parent_x {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Sign applied to horizontal offsets on this side.
    pub fn sign(self) -> f64 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Cardinal direction for spatial navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// Whether `other` lies strictly on this side of `origin`.
    pub fn admits(self, origin: Point, other: Point) -> bool {
        match self {
            Direction::Up => other.y < origin.y,
            Direction::Down => other.y > origin.y,
            Direction::Left => other.x < origin.x,
            Direction::Right => other.x > origin.x,
        }
    }
}

/// Step for sibling reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalStep {
    Up,
    Down,
}

/// Result of an operation that may legitimately do nothing at a structural boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    NoOp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_is_left_only_when_strictly_left_of_parent() {
        assert_eq!(Side::of(10.0, 20.0), Side::Left);
        assert_eq!(Side::of(20.0, 20.0), Side::Right);
        assert_eq!(Side::of(30.0, 20.0), Side::Right);
    }

    #[test]
    fn direction_admits_strictly() {
        let origin = Point::new(0.0, 0.0);
        assert!(Direction::Up.admits(origin, Point::new(5.0, -1.0)));
        assert!(!Direction::Up.admits(origin, Point::new(5.0, 0.0)));
        assert!(Direction::Left.admits(origin, Point::new(-1.0, 50.0)));
        assert!(!Direction::Right.admits(origin, Point::new(0.0, 50.0)));
    }
}
