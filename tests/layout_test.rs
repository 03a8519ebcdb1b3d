//! Integration tests for placement, subtree space allocation, sibling bands
//! and collapse visibility.

use kurbo::Point;
use rstest::{fixture, rstest};

use mindflow::application::create_demo_mindmap;
use mindflow::config::{LayoutSettings, Settings};
use mindflow::domain::{NodeId, Side, VerticalStep};
use mindflow::util::testing;
use mindflow::MindMap;

const EPS: f64 = 1e-9;

#[fixture]
fn demo() -> MindMap {
    testing::init_test_setup();
    create_demo_mindmap(Settings::default()).expect("demo map")
}

fn id(map: &MindMap, label: &str) -> NodeId {
    map.find_by_label(label)
        .unwrap_or_else(|| panic!("no node labelled {label}"))
}

fn pos(map: &MindMap, node: NodeId) -> Point {
    map.position(node).expect("node exists")
}

/// Every sibling group is stacked in list order, bands do not overlap and
/// the group is centred on its parent (up to the reposition epsilon).
fn assert_bands(map: &MindMap) {
    let slack = 2.0 * map.settings().layout.reposition_epsilon + EPS;
    for (parent, node) in map.iter() {
        let children = node.children();
        if children.is_empty() {
            continue;
        }
        let spaces: Vec<f64> = children.iter().map(|&c| map.subtree_space(c)).collect();
        for (i, pair) in children.windows(2).enumerate() {
            let (a, b) = (pos(map, pair[0]).y, pos(map, pair[1]).y);
            let needed = (spaces[i] + spaces[i + 1]) / 2.0;
            assert!(
                b - a >= needed - slack,
                "siblings {} and {} under {parent} overlap: gap {} < {needed}",
                pair[0],
                pair[1],
                b - a
            );
        }
        let top = pos(map, children[0]).y - spaces[0] / 2.0;
        let last = children.len() - 1;
        let bottom = pos(map, children[last]).y + spaces[last] / 2.0;
        let centre = (top + bottom) / 2.0;
        assert!(
            (centre - pos(map, parent).y).abs() <= slack,
            "group under {parent} centred at {centre}, parent at {}",
            pos(map, parent).y
        );
    }
}

// ============================================================
// Placement
// ============================================================

#[rstest]
fn given_root_when_adding_children_then_sides_alternate_and_inherit() {
    testing::init_test_setup();
    let mut map = MindMap::new("R");
    let root = map.root();
    assert_eq!(pos(&map, root), Point::new(400.0, 300.0));

    let a = map.create_child(root, "Projects").unwrap();
    let b = map.create_child(root, "Ideas").unwrap();
    let c = map.create_child(a, "C").unwrap();

    assert_eq!(map.side(a), Some(Side::Right));
    assert_eq!(map.side(b), Some(Side::Left));
    assert_eq!(map.side(c), Some(Side::Right));
    assert_eq!(map.side(root), None);
    assert_eq!(pos(&map, a), Point::new(550.0, 275.0));
    assert_eq!(pos(&map, b), Point::new(250.0, 325.0));
    assert_eq!(pos(&map, c), Point::new(700.0, 275.0));
}

#[rstest]
fn given_explicit_left_when_next_child_added_then_alternation_continues_right() {
    let mut map = MindMap::new("R");
    let root = map.root();

    let left = map.create_child_on_side(root, "left", Side::Left).unwrap();
    let next = map.create_child(root, "next").unwrap();

    assert_eq!(map.side(left), Some(Side::Left));
    assert_eq!(map.side(next), Some(Side::Right));
}

#[rstest]
fn given_non_root_parent_when_side_requested_then_parent_side_wins(mut demo: MindMap) {
    let projects = id(&demo, "Projects");
    assert_eq!(demo.side(projects), Some(Side::Left));

    let child = demo.create_child_on_side(projects, "stray", Side::Right).unwrap();

    assert_eq!(demo.side(child), Some(Side::Left));
}

#[rstest]
fn given_custom_settings_when_creating_child_then_offsets_follow() {
    let settings = Settings {
        layout: LayoutSettings {
            horizontal_offset: 200.0,
            root_x: 0.0,
            root_y: 0.0,
            ..LayoutSettings::default()
        },
        ..Settings::default()
    };
    let mut map = MindMap::with_settings(settings, "origin");
    let root = map.root();

    let first = map.create_child(root, "first").unwrap();

    assert_eq!(pos(&map, root), Point::ZERO);
    assert_eq!(pos(&map, first), Point::new(200.0, 0.0));
}

// ============================================================
// Space allocation
// ============================================================

#[rstest]
fn given_leaf_when_measuring_then_claims_leaf_space(demo: MindMap) {
    let leaf = id(&demo, "Dark Mode");
    assert_eq!(demo.subtree_space(leaf), 50.0);
}

#[rstest]
#[case("Mobile App", 150.0)]
#[case("Projects", 200.0)]
#[case("New Features", 150.0)]
#[case("Research", 100.0)]
#[case("Ideas", 250.0)]
#[case("Mind Map Demo", 450.0)]
fn given_branch_when_measuring_then_sums_children(demo: MindMap, #[case] label: &str, #[case] expected: f64) {
    let node = id(&demo, label);
    let space = demo.subtree_space(node);
    let sum: f64 = demo.get_children(node).iter().map(|&c| demo.subtree_space(c)).sum();

    assert_eq!(space, expected);
    assert!(space >= sum);
}

// ============================================================
// Sibling bands
// ============================================================

#[rstest]
fn given_demo_map_when_built_then_bands_do_not_overlap(demo: MindMap) {
    assert_bands(&demo);
}

#[rstest]
fn given_deep_growth_when_children_added_then_ancestor_bands_widen(mut demo: MindMap) {
    let web = id(&demo, "Website Redesign");
    for label in ["Landing", "Pricing", "Blog", "Docs"] {
        demo.create_child(web, label).unwrap();
    }

    assert_eq!(demo.subtree_space(web), 200.0);
    assert_bands(&demo);
}

#[rstest]
fn given_mutations_when_applied_then_bands_stay_valid(mut demo: MindMap) {
    let mobile = id(&demo, "Mobile App");
    let research = id(&demo, "Research");
    let testing_node = id(&demo, "Testing");

    demo.reorder_sibling(mobile, VerticalStep::Up).unwrap();
    assert_bands(&demo);

    demo.delete_subtree(testing_node).unwrap();
    assert_bands(&demo);

    demo.reparent(mobile, research).unwrap();
    assert_bands(&demo);
}

#[rstest]
fn given_relayout_when_nothing_changed_then_positions_stable(mut demo: MindMap) {
    let before = demo.get_visible_positions();
    let root = demo.root();

    demo.relayout(root).unwrap();

    assert_eq!(demo.get_visible_positions(), before);
}

// ============================================================
// Visibility
// ============================================================

#[rstest]
fn given_node_with_three_descendants_when_collapsed_then_they_hide_without_moving(mut demo: MindMap) {
    let mobile = id(&demo, "Mobile App");
    let kids = demo.get_children(mobile).to_vec();
    assert_eq!(kids.len(), 3);
    let before: Vec<Point> = demo.iter().map(|(_, n)| n.position()).collect();

    demo.toggle_collapse(mobile).unwrap();

    assert!(demo.is_visible(mobile));
    for &kid in &kids {
        assert!(!demo.is_visible(kid));
        assert!(!demo.is_edge_visible(kid));
    }
    let visible = demo.get_visible_positions();
    assert_eq!(visible.len(), demo.len() - 3);
    assert!(kids.iter().all(|k| !visible.contains_key(k)));
    assert_eq!(demo.visible_edges().len(), demo.len() - 4);

    demo.toggle_collapse(mobile).unwrap();

    for &kid in &kids {
        assert!(demo.is_visible(kid));
        assert!(demo.is_edge_visible(kid));
    }
    let after: Vec<Point> = demo.iter().map(|(_, n)| n.position()).collect();
    assert_eq!(before, after);
}

#[rstest]
fn given_collapsed_ancestor_when_inner_node_expanded_then_still_hidden(mut demo: MindMap) {
    let ideas = id(&demo, "Ideas");
    let features = id(&demo, "New Features");
    let dark = id(&demo, "Dark Mode");

    demo.toggle_collapse(ideas).unwrap();

    assert!(!demo.node(features).unwrap().collapsed());
    assert!(!demo.is_visible(features));
    assert!(!demo.is_visible(dark));
    assert!(demo.is_visible(ideas));
    assert!(demo.is_edge_visible(ideas));
}
