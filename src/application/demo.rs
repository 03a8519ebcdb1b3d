//! Sample map used by the CLI and as a realistic fixture in tests.

use crate::application::MindMap;
use crate::config::Settings;
use crate::domain::{DomainResult, Side};

pub const DEMO_ROOT: &str = "Mind Map Demo";

/// Two-sided demo map: "Projects" on the left, "Ideas" on the right.
pub fn create_demo_mindmap(settings: Settings) -> DomainResult<MindMap> {
    let mut map = MindMap::with_settings(settings, DEMO_ROOT);
    let root = map.root();

    let projects = map.create_child_on_side(root, "Projects", Side::Left)?;
    map.create_child(projects, "Website Redesign")?;
    let mobile_app = map.create_child(projects, "Mobile App")?;
    for label in ["UI Design", "Backend API", "Testing"] {
        map.create_child(mobile_app, label)?;
    }

    let ideas = map.create_child_on_side(root, "Ideas", Side::Right)?;
    let features = map.create_child(ideas, "New Features")?;
    for label in ["Dark Mode", "Export Options", "Templates"] {
        map.create_child(features, label)?;
    }
    let research = map.create_child(ideas, "Research")?;
    map.create_child(research, "User Feedback")?;
    map.create_child(research, "Competitors")?;
    Ok(map)
}
