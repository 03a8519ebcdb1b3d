//! Domain layer: the mind-map tree and its geometry engines
//!
//! This layer does no I/O and knows nothing of the CLI. The engines take their
//! tunables as `crate::config` settings structs passed in by the caller; loading
//! and layering those settings happens in `config` and the CLI.

pub mod arena;
pub mod entities;
pub mod error;
pub mod events;
pub mod layout;
pub mod navigation;
pub mod reparent;
pub mod visibility;

pub use arena::MapArena;
pub use entities::{Direction, Node, NodeId, Outcome, Side, VerticalStep};
pub use error::{DomainError, DomainResult};
pub use events::{EventBus, EventKind, MapEvent, SubscriptionId};
pub use layout::LayoutEngine;
pub use navigation::Navigator;
pub use reparent::ReparentOutcome;
