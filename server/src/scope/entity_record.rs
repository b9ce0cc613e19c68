use std::collections::HashSet;

use wirebound_shared::{ConnectionId, NetworkId};

/// A networked entity as the scope layer sees it: who owns it, what kind of
/// interest notification it produces, and which connections currently
/// observe it.
pub struct EntityRecord {
    network_id: NetworkId,
    owner: Option<ConnectionId>,
    interest_type: u8,
    spawn_payload: Vec<u8>,
    observers: HashSet<ConnectionId>,
}

impl EntityRecord {
    pub fn new(
        network_id: NetworkId,
        owner: Option<ConnectionId>,
        interest_type: u8,
        spawn_payload: Vec<u8>,
    ) -> Self {
        Self {
            network_id,
            owner,
            interest_type,
            spawn_payload,
            observers: HashSet::new(),
        }
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    pub fn owner(&self) -> Option<ConnectionId> {
        self.owner
    }

    pub fn interest_type(&self) -> u8 {
        self.interest_type
    }

    pub fn spawn_payload(&self) -> &[u8] {
        &self.spawn_payload
    }

    pub fn observers(&self) -> &HashSet<ConnectionId> {
        &self.observers
    }

    /// While observed, the entity is pinned in the replication set
    pub fn is_observed(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn add_observer(&mut self, connection: ConnectionId) -> bool {
        self.observers.insert(connection)
    }

    pub(crate) fn remove_observer(&mut self, connection: &ConnectionId) -> bool {
        self.observers.remove(connection)
    }
}
