//! mindflow: the model and geometry core of a radial mind-map editor.
//!
//! - [`domain`]: tree store, layout engine, visibility, navigation, reparenting, events
//! - [`application`]: the [`MindMap`] editing session that ties them together
//! - [`config`]: layered settings for the layout and navigation tunables
//! - [`cli`]: a small demo surface around the core

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use application::{ApplicationError, ApplicationResult, DropResult, MindMap};
pub use config::Settings;
pub use domain::{Direction, DomainError, EventKind, MapEvent, NodeId, Outcome, Side, VerticalStep};
