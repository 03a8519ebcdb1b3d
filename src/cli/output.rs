//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;
use termtree::Tree;

use crate::application::MindMap;
use crate::domain::{Node, NodeId};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print plain output (no color)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

pub trait TreeConvert {
    /// Visible part of the map as a printable tree; collapsed nodes show a marker
    /// and the number of hidden descendants instead of their subtree.
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeConvert for MindMap {
    fn to_tree_string(&self) -> Tree<String> {
        build_tree(self, self.root())
    }
}

fn build_tree(map: &MindMap, id: NodeId) -> Tree<String> {
    let Some(node) = map.node(id) else {
        return Tree::new(format!("<missing {id}>"));
    };
    let mut tree = Tree::new(describe(map, id, node));
    if node.collapsed() {
        return tree;
    }
    for &child in node.children() {
        tree.push(build_tree(map, child));
    }
    tree
}

fn describe(map: &MindMap, id: NodeId, node: &Node) -> String {
    let p = node.position();
    let mut text = format!("{} ({:.0}, {:.0})", node.label(), p.x, p.y);
    if let Some(side) = map.side(id) {
        text.push_str(&format!(" [{side}]"));
    }
    if node.collapsed() {
        let hidden = map.arena().iter_subtree(id).count() - 1;
        text.push_str(&format!(" {}", format!("▶ +{hidden} hidden").yellow()));
    }
    text
}
