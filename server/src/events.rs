use std::vec::IntoIter;

use wirebound_shared::{ConnectionId, Tick, TransportError};

/// Events collected while receiving, drained by the application through
/// `Events.read::<SomeEvent>()`.
pub struct Events {
    connections: Vec<ConnectionId>,
    disconnections: Vec<ConnectionId>,
    errors: Vec<(Option<ConnectionId>, TransportError)>,
    ticks: Vec<Tick>,

    empty: bool,
}

impl Events {
    pub(crate) fn new() -> Self {
        Self {
            connections: Vec::new(),
            disconnections: Vec::new(),
            errors: Vec::new(),
            ticks: Vec::new(),

            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: Event>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: Event>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_connection(&mut self, id: ConnectionId) {
        self.connections.push(id);
        self.empty = false;
    }

    pub(crate) fn push_disconnection(&mut self, id: ConnectionId) {
        self.disconnections.push(id);
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, id: Option<ConnectionId>, error: TransportError) {
        self.errors.push((id, error));
        self.empty = false;
    }

    pub(crate) fn push_tick(&mut self, tick: Tick) {
        self.ticks.push(tick);
        self.empty = false;
    }
}

// Event Trait
pub trait Event {
    type Iter;

    fn iter(events: &mut Events) -> Self::Iter;

    fn has(events: &Events) -> bool;
}

// ConnectEvent
pub struct ConnectEvent;
impl Event for ConnectEvent {
    type Iter = IntoIter<ConnectionId>;

    fn iter(events: &mut Events) -> Self::Iter {
        let list = std::mem::take(&mut events.connections);
        IntoIterator::into_iter(list)
    }

    fn has(events: &Events) -> bool {
        !events.connections.is_empty()
    }
}

// DisconnectEvent
pub struct DisconnectEvent;
impl Event for DisconnectEvent {
    type Iter = IntoIter<ConnectionId>;

    fn iter(events: &mut Events) -> Self::Iter {
        let list = std::mem::take(&mut events.disconnections);
        IntoIterator::into_iter(list)
    }

    fn has(events: &Events) -> bool {
        !events.disconnections.is_empty()
    }
}

// ErrorEvent
pub struct ErrorEvent;
impl Event for ErrorEvent {
    type Iter = IntoIter<(Option<ConnectionId>, TransportError)>;

    fn iter(events: &mut Events) -> Self::Iter {
        let list = std::mem::take(&mut events.errors);
        IntoIterator::into_iter(list)
    }

    fn has(events: &Events) -> bool {
        !events.errors.is_empty()
    }
}

// TickEvent
pub struct TickEvent;
impl Event for TickEvent {
    type Iter = IntoIter<Tick>;

    fn iter(events: &mut Events) -> Self::Iter {
        let list = std::mem::take(&mut events.ticks);
        IntoIterator::into_iter(list)
    }

    fn has(events: &Events) -> bool {
        !events.ticks.is_empty()
    }
}
