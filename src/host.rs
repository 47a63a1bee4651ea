//! Host events and listener bookkeeping.

use std::collections::HashMap;

use glam::Vec2;

use crate::surface::DisplayBox;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// Pointer position relative to the surface origin.
    PointerMove { x: f32, y: f32 },
    /// First active touch, if any, relative to the surface origin.
    TouchMove(Option<Vec2>),
    PointerLeave,
    Resize(DisplayBox),
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PointerMove { .. } => EventKind::PointerMove,
            Self::TouchMove(_) => EventKind::TouchMove,
            Self::PointerLeave => EventKind::PointerLeave,
            Self::Resize(_) => EventKind::Resize,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerMove,
    TouchMove,
    PointerLeave,
    Resize,
}

impl EventKind {
    pub const ALL: [Self; 4] = [
        Self::PointerMove,
        Self::TouchMove,
        Self::PointerLeave,
        Self::Resize,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Where listeners are registered. Removing an unknown id is not an error.
pub trait EventHost {
    fn add_listener(&mut self, kind: EventKind) -> ListenerId;

    /// Returns whether `id` was registered.
    fn remove_listener(&mut self, id: ListenerId) -> bool;
}

/// In-memory host used by headless runs and the windowed viewer.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: u64,
    listeners: HashMap<ListenerId, EventKind>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn is_listening(&self, kind: EventKind) -> bool {
        self.listeners.values().any(|k| *k == kind)
    }
}

impl EventHost for ListenerRegistry {
    fn add_listener(&mut self, kind: EventKind) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, kind);
        id
    }

    fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{EventHost, EventKind, HostEvent, ListenerRegistry};

    #[test]
    fn registry_tracks_and_removes_listeners() {
        let mut registry = ListenerRegistry::new();
        let ids: Vec<_> = EventKind::ALL
            .iter()
            .map(|kind| registry.add_listener(*kind))
            .collect();
        assert_eq!(registry.len(), 4);
        assert!(registry.is_listening(EventKind::Resize));

        assert!(registry.remove_listener(ids[0]));
        assert!(!registry.remove_listener(ids[0]));
        assert!(!registry.is_listening(EventKind::PointerMove));
    }

    #[test]
    fn events_report_their_kind() {
        assert_eq!(HostEvent::PointerLeave.kind(), EventKind::PointerLeave);
        assert_eq!(HostEvent::TouchMove(None).kind(), EventKind::TouchMove);
    }
}
