//! Application layer: the editing session and its use cases
//!
//! This layer orchestrates domain logic; it holds no I/O of its own.

pub mod demo;
pub mod error;
pub mod mindmap;

pub use demo::create_demo_mindmap;
pub use error::{ApplicationError, ApplicationResult};
pub use mindmap::{DropResult, MindMap};
