//! Directional navigation between visible nodes.
//!
//! Candidates strictly on the requested side are scored (lower is better) by
//! alignment and distance. Horizontal moves favour the direct parent and direct
//! children, so arrow keys tend to follow the hierarchy when it is nearby.

use kurbo::Point;
use tracing::{instrument, trace};

use crate::config::NavigationSettings;
use crate::domain::arena::MapArena;
use crate::domain::entities::{Direction, NodeId};
use crate::domain::visibility::visible_nodes;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    id: NodeId,
    dx: f64,
    dy: f64,
    dist: f64,
    structural: bool,
}

/// Thresholds in effect for one navigation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub vertical: f64,
    pub horizontal: f64,
}

#[derive(Debug)]
pub struct Navigator<'a> {
    arena: &'a MapArena,
    settings: &'a NavigationSettings,
}

impl<'a> Navigator<'a> {
    pub fn new(arena: &'a MapArena, settings: &'a NavigationSettings) -> Self {
        Self { arena, settings }
    }

    /// Best node to move to from `from` in `direction`, if any.
    ///
    /// There is no wraparound: an empty side yields `None`. Ties go to the
    /// candidate met first in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn find_closest(&self, from: NodeId, direction: Direction) -> Option<NodeId> {
        let origin = self.arena.get(from)?.position;
        let pool = self.candidates(from, origin, direction);
        if pool.is_empty() {
            return None;
        }
        let thresholds = self.thresholds(&pool);
        trace!("find_closest: pool={} thresholds={:?}", pool.len(), thresholds);

        let mut best: Option<(NodeId, f64)> = None;
        for c in &pool {
            let Some(score) = self.score(c, direction, thresholds) else {
                continue;
            };
            trace!("find_closest: {} score={:.4}", c.id, score);
            if best.map_or(true, |(_, s)| score < s) {
                best = Some((c.id, score));
            }
        }
        best.map(|(id, _)| id)
    }

    fn candidates(&self, from: NodeId, origin: Point, direction: Direction) -> Vec<Candidate> {
        let parent = self.arena.parent(from);
        visible_nodes(self.arena)
            .into_iter()
            .filter(|&id| id != from)
            .filter_map(|id| {
                let pos = self.arena.get(id)?.position;
                if !direction.admits(origin, pos) {
                    return None;
                }
                let dx = (pos.x - origin.x).abs();
                let dy = (pos.y - origin.y).abs();
                Some(Candidate {
                    id,
                    dx,
                    dy,
                    dist: dx.hypot(dy),
                    structural: parent == Some(id) || self.arena.parent(id) == Some(from),
                })
            })
            .collect()
    }

    fn thresholds(&self, pool: &[Candidate]) -> Thresholds {
        let s = self.settings;
        let closest = pool.iter().map(|c| c.dist).fold(f64::INFINITY, f64::min);
        let mut horizontal = (closest * s.horizontal_threshold_scale).min(s.horizontal_threshold_cap);

        let mut by_distance: Vec<&Candidate> = pool.iter().collect();
        by_distance.sort_by(|a, b| a.dist.total_cmp(&b.dist));
        if by_distance.iter().take(3).any(|c| c.structural) {
            horizontal = horizontal.max(s.structural_threshold_floor);
        }

        let mut vertical = s.vertical_threshold;
        if pool.len() <= s.sparse_pool_size {
            vertical = vertical.max(s.sparse_vertical_threshold);
            horizontal = horizontal.max(s.sparse_horizontal_threshold);
        }
        Thresholds { vertical, horizontal }
    }

    fn score(&self, c: &Candidate, direction: Direction, t: Thresholds) -> Option<f64> {
        let norm = self.settings.distance_norm;
        if direction.is_vertical() {
            if c.dx >= t.vertical {
                return None;
            }
            Some(0.6 * (c.dx / t.vertical) + 0.4 * (c.dist / norm))
        } else {
            if c.dy >= t.horizontal {
                return None;
            }
            let score = 0.5 * (c.dy / (c.dx + 1.0)) + 0.5 * (c.dist / norm);
            Some(if c.structural {
                score * self.settings.structural_bonus
            } else {
                score
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// n at (150, 0) with child c slightly below to its right, and an
    /// unrelated node u further right but almost level with n.
    fn fixture() -> (MapArena, NodeId, NodeId, NodeId) {
        let mut arena = MapArena::new("root", Point::ZERO);
        let root = arena.root();
        let n = arena.insert_child(root, "n".into(), Point::new(150.0, 0.0)).unwrap();
        let c = arena.insert_child(n, "c".into(), Point::new(300.0, 40.0)).unwrap();
        let other = arena.insert_child(root, "o".into(), Point::new(150.0, 200.0)).unwrap();
        let u = arena.insert_child(other, "u".into(), Point::new(450.0, 10.0)).unwrap();
        (arena, n, c, u)
    }

    #[test]
    fn test_right_prefers_own_child_over_better_aligned_stranger() {
        let (arena, n, c, _) = fixture();
        let settings = NavigationSettings::default();
        assert_eq!(Navigator::new(&arena, &settings).find_closest(n, Direction::Right), Some(c));
    }

    #[test]
    fn test_without_bonus_alignment_wins() {
        let (arena, n, _, u) = fixture();
        let settings = NavigationSettings {
            structural_bonus: 1.0,
            ..NavigationSettings::default()
        };
        assert_eq!(Navigator::new(&arena, &settings).find_closest(n, Direction::Right), Some(u));
    }

    #[test]
    fn test_no_wraparound() {
        let (arena, _, _, u) = fixture();
        let settings = NavigationSettings::default();
        assert_eq!(Navigator::new(&arena, &settings).find_closest(u, Direction::Right), None);
    }

    #[test]
    fn test_collapsed_children_are_not_candidates() {
        let (mut arena, n, _, u) = fixture();
        arena.node_mut(n).unwrap().collapsed = true;
        let settings = NavigationSettings::default();
        assert_eq!(Navigator::new(&arena, &settings).find_closest(n, Direction::Right), Some(u));
    }

    #[test]
    fn test_down_picks_nearest_aligned() {
        let mut arena = MapArena::new("root", Point::ZERO);
        let root = arena.root();
        let a = arena.insert_child(root, "a".into(), Point::new(150.0, -50.0)).unwrap();
        let b = arena.insert_child(root, "b".into(), Point::new(150.0, 50.0)).unwrap();
        arena.insert_child(root, "c".into(), Point::new(150.0, 100.0)).unwrap();
        let settings = NavigationSettings::default();
        let nav = Navigator::new(&arena, &settings);

        assert_eq!(nav.find_closest(a, Direction::Down), Some(b));
        assert_eq!(nav.find_closest(a, Direction::Up), None);
    }

    #[test]
    fn test_sparse_pool_widens_vertical_threshold() {
        let mut arena = MapArena::new("root", Point::ZERO);
        let root = arena.root();
        let t = arena.insert_child(root, "t".into(), Point::new(120.0, 100.0)).unwrap();
        let settings = NavigationSettings::default();

        // alone below the root, dx 120 is inside the sparse 150
        assert_eq!(Navigator::new(&arena, &settings).find_closest(root, Direction::Down), Some(t));

        arena.insert_child(root, "p".into(), Point::new(200.0, 300.0)).unwrap();
        arena.insert_child(root, "q".into(), Point::new(-250.0, 300.0)).unwrap();

        // three candidates: back to 100, and nobody is aligned enough
        assert_eq!(Navigator::new(&arena, &settings).find_closest(root, Direction::Down), None);
    }

    #[test]
    fn test_vertical_threshold_is_exclusive() {
        let mut arena = MapArena::new("root", Point::ZERO);
        let root = arena.root();
        arena.insert_child(root, "edge".into(), Point::new(100.0, 50.0)).unwrap();
        let inside = arena.insert_child(root, "inside".into(), Point::new(99.0, 200.0)).unwrap();
        arena.insert_child(root, "far".into(), Point::new(-300.0, 60.0)).unwrap();
        let settings = NavigationSettings::default();

        assert_eq!(
            Navigator::new(&arena, &settings).find_closest(root, Direction::Down),
            Some(inside)
        );
    }

    /// `from` at the origin with one node at (100, 450): 461 away, so the
    /// scaled horizontal threshold is capped at 400.
    fn steep_target(structural: bool) -> (MapArena, NodeId, NodeId) {
        let mut arena = MapArena::new("root", Point::ZERO);
        let root = arena.root();
        let parent = if structural {
            root
        } else {
            arena.insert_child(root, "g".into(), Point::new(-100.0, 0.0)).unwrap()
        };
        let target = arena.insert_child(parent, "t".into(), Point::new(100.0, 450.0)).unwrap();
        (arena, root, target)
    }

    #[test]
    fn test_structural_floor_reaches_steep_child() {
        let (arena, root, child) = steep_target(true);
        let settings = NavigationSettings::default();
        let nav = Navigator::new(&arena, &settings);

        assert_eq!(nav.find_closest(root, Direction::Right), Some(child));
    }

    #[test]
    fn test_steep_stranger_is_out_of_horizontal_range() {
        let (arena, root, _) = steep_target(false);
        let settings = NavigationSettings::default();

        assert_eq!(Navigator::new(&arena, &settings).find_closest(root, Direction::Right), None);
    }

    #[test]
    fn test_steep_child_unreachable_without_floor() {
        let (arena, root, _) = steep_target(true);
        let settings = NavigationSettings {
            structural_threshold_floor: 0.0,
            ..NavigationSettings::default()
        };

        assert_eq!(Navigator::new(&arena, &settings).find_closest(root, Direction::Right), None);
    }

    #[test]
    fn test_thresholds_adapt_to_pool() {
        let (arena, root, child) = steep_target(true);
        let settings = NavigationSettings::default();
        let nav = Navigator::new(&arena, &settings);
        let origin = arena.get(root).unwrap().position;
        let pool = nav.candidates(root, origin, Direction::Right);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].id, child);

        assert_eq!(
            nav.thresholds(&pool),
            Thresholds {
                vertical: 150.0,
                horizontal: 500.0
            }
        );
    }

    #[test]
    fn test_equal_scores_go_to_first_in_preorder() {
        let settings = NavigationSettings::default();
        for left_first in [true, false] {
            let mut arena = MapArena::new("root", Point::ZERO);
            let root = arena.root();
            let (first, second) = if left_first { (-50.0, 50.0) } else { (50.0, -50.0) };
            let a = arena.insert_child(root, "a".into(), Point::new(first, 100.0)).unwrap();
            arena.insert_child(root, "b".into(), Point::new(second, 100.0)).unwrap();

            assert_eq!(
                Navigator::new(&arena, &settings).find_closest(root, Direction::Down),
                Some(a)
            );
        }
    }

    #[test]
    fn test_unknown_node_yields_none() {
        let (mut arena, n, c, _) = fixture();
        arena.remove_subtree(c).unwrap();
        let settings = NavigationSettings::default();
        assert_eq!(Navigator::new(&arena, &settings).find_closest(c, Direction::Left), None);
        assert!(Navigator::new(&arena, &settings).find_closest(n, Direction::Left).is_some());
    }
}
