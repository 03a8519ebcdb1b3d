//! Publish/subscribe channel from the map to its hosting surface.
//!
//! Delivery is synchronous and in registration order. A panicking handler
//! propagates to the caller of the mutating operation.

use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use crate::domain::entities::NodeId;

/// Event names subscribers register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    NodeCreated,
    LabelChanged,
    CollapseToggled,
    NodeDeleted,
    NodeReparented,
    SiblingsReordered,
}

/// Structural change emitted after a mutation has completed.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    NodeCreated {
        node: NodeId,
        parent: NodeId,
    },
    LabelChanged {
        node: NodeId,
        text: String,
    },
    CollapseToggled {
        node: NodeId,
        collapsed: bool,
    },
    NodeDeleted {
        node: NodeId,
        parent: NodeId,
        /// Every removed id, descendants first
        removed: Vec<NodeId>,
    },
    NodeReparented {
        node: NodeId,
        old_parent: NodeId,
        new_parent: NodeId,
    },
    SiblingsReordered {
        parent: NodeId,
    },
}

impl MapEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            MapEvent::NodeCreated { .. } => EventKind::NodeCreated,
            MapEvent::LabelChanged { .. } => EventKind::LabelChanged,
            MapEvent::CollapseToggled { .. } => EventKind::CollapseToggled,
            MapEvent::NodeDeleted { .. } => EventKind::NodeDeleted,
            MapEvent::NodeReparented { .. } => EventKind::NodeReparented,
            MapEvent::SiblingsReordered { .. } => EventKind::SiblingsReordered,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&MapEvent)>;

/// Registry of subscribers, scoped to one map.
#[derive(Default)]
pub struct EventBus {
    subscribers: HashMap<EventKind, Vec<(SubscriptionId, Handler)>>,
    next_id: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<EventKind, usize> = self
            .subscribers
            .iter()
            .map(|(kind, handlers)| (*kind, handlers.len()))
            .collect();
        f.debug_struct("EventBus")
            .field("subscribers", &counts)
            .finish_non_exhaustive()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&MapEvent) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Returns whether a subscription was removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for handlers in self.subscribers.values_mut() {
            if let Some(pos) = handlers.iter().position(|(sid, _)| *sid == id) {
                handlers.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.get(&kind).map_or(0, Vec::len)
    }

    /// Deliver `event` to every subscriber of its kind; returns how many ran.
    pub fn publish(&mut self, event: &MapEvent) -> usize {
        let Some(handlers) = self.subscribers.get_mut(&event.kind()) else {
            return 0;
        };
        trace!("publish: {:?} to {} handlers", event.kind(), handlers.len());
        for (_, handler) in handlers.iter_mut() {
            handler(event);
        }
        handlers.len()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use generational_arena::Index;

    use super::*;

    fn id(n: usize) -> NodeId {
        NodeId(Index::from_raw_parts(n, 0))
    }

    #[test]
    fn test_publish_runs_handlers_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            bus.subscribe(EventKind::LabelChanged, move |_| seen.borrow_mut().push(tag));
        }

        let ran = bus.publish(&MapEvent::LabelChanged {
            node: id(1),
            text: "x".into(),
        });

        assert_eq!(ran, 2);
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_publish_only_reaches_matching_kind() {
        let hits = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let counter = Rc::clone(&hits);
        bus.subscribe(EventKind::NodeCreated, move |_| *counter.borrow_mut() += 1);

        bus.publish(&MapEvent::CollapseToggled {
            node: id(0),
            collapsed: true,
        });

        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn test_unsubscribe_removes_single_handler() {
        let mut bus = EventBus::new();
        let a = bus.subscribe(EventKind::NodeCreated, |_| {});
        bus.subscribe(EventKind::NodeCreated, |_| {});

        assert!(bus.unsubscribe(a));
        assert!(!bus.unsubscribe(a));
        assert_eq!(bus.subscriber_count(EventKind::NodeCreated), 1);
    }
}
