use std::collections::{HashMap, HashSet};

use log::warn;

use wirebound_shared::{ConnectionId, NetworkId};

use crate::scope::entity_record::EntityRecord;

/// A visibility change that must be delivered to exactly one connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterestDelta {
    Gained {
        connection: ConnectionId,
        network_id: NetworkId,
        interest_type: u8,
        payload: Vec<u8>,
    },
    Lost {
        connection: ConnectionId,
        network_id: NetworkId,
        interest_type: u8,
    },
}

/// Tracks which connections observe which networked entities, and produces
/// per-tick interest deltas instead of full-state snapshots.
///
/// The observer/observing relation is reciprocal and both sides are updated
/// in the same call. Removals are buffered in a just-removed set so a loss
/// notification survives the removal of the live edge; that buffer lives for
/// exactly one `take_deltas` call and is then cleared whether or not
/// anything consumed it.
pub struct ScopeManager {
    entities: HashMap<NetworkId, EntityRecord>,
    observing: HashMap<ConnectionId, HashSet<NetworkId>>,
    next_network_id: NetworkId,
    gained: Vec<(ConnectionId, NetworkId)>,
    // Loss entries carry the interest type because the entity record may be
    // gone by the time the delta is drained.
    just_removed: Vec<(ConnectionId, NetworkId, u8)>,
}

impl ScopeManager {
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            observing: HashMap::new(),
            // 0 is reserved for "no entity"
            next_network_id: 1,
            gained: Vec::new(),
            just_removed: Vec::new(),
        }
    }

    // Entities

    /// Registers a networked entity. Network ids are monotonic and never
    /// recycled, so a stale id in flight can never alias a new entity
    pub fn spawn_entity(
        &mut self,
        owner: Option<ConnectionId>,
        interest_type: u8,
        spawn_payload: Vec<u8>,
    ) -> NetworkId {
        let network_id = self.next_network_id;
        self.next_network_id = self.next_network_id.wrapping_add(1);
        self.entities.insert(
            network_id,
            EntityRecord::new(network_id, owner, interest_type, spawn_payload),
        );
        network_id
    }

    /// Removes an entity, queueing a loss notification for every current
    /// observer
    pub fn despawn_entity(&mut self, network_id: NetworkId) -> bool {
        let Some(record) = self.entities.remove(&network_id) else {
            return false;
        };
        for observer in record.observers() {
            if let Some(observed) = self.observing.get_mut(observer) {
                observed.remove(&network_id);
            }
            self.just_removed
                .push((*observer, network_id, record.interest_type()));
        }
        true
    }

    pub fn entity(&self, network_id: &NetworkId) -> Option<&EntityRecord> {
        self.entities.get(network_id)
    }

    pub fn has_entity(&self, network_id: &NetworkId) -> bool {
        self.entities.contains_key(network_id)
    }

    // Observation edges

    /// Adds the reciprocal edge: the connection observes the entity, and the
    /// entity records the connection as an observer. Re-observing an entity
    /// that was just removed this tick cancels the pending loss
    pub fn add_to_observing(&mut self, connection: ConnectionId, network_id: NetworkId) {
        let Some(record) = self.entities.get_mut(&network_id) else {
            warn!("add_to_observing: entity {network_id} does not exist");
            return;
        };
        let newly_added = record.add_observer(connection);
        self.observing
            .entry(connection)
            .or_default()
            .insert(network_id);
        if newly_added {
            self.gained.push((connection, network_id));
        }
        self.just_removed
            .retain(|(conn, id, _)| !(*conn == connection && *id == network_id));
    }

    /// Removes the reciprocal edge and queues the loss notification
    pub fn remove_from_observing(&mut self, connection: ConnectionId, network_id: NetworkId) {
        let Some(record) = self.entities.get_mut(&network_id) else {
            return;
        };
        if !record.remove_observer(&connection) {
            return;
        }
        let interest_type = record.interest_type();
        if let Some(observed) = self.observing.get_mut(&connection) {
            observed.remove(&network_id);
        }
        self.just_removed
            .push((connection, network_id, interest_type));
    }

    pub fn is_observing(&self, connection: &ConnectionId, network_id: &NetworkId) -> bool {
        self.observing
            .get(connection)
            .is_some_and(|observed| observed.contains(network_id))
    }

    pub fn observers_of(&self, network_id: &NetworkId) -> Vec<ConnectionId> {
        self.entities
            .get(network_id)
            .map(|record| record.observers().iter().copied().collect())
            .unwrap_or_default()
    }

    /// Tears down everything tied to a disconnecting connection: its
    /// observing set, its observer edges, and the entities it owns
    pub fn remove_connection(&mut self, connection: ConnectionId) {
        if let Some(observed) = self.observing.remove(&connection) {
            for network_id in observed {
                if let Some(record) = self.entities.get_mut(&network_id) {
                    record.remove_observer(&connection);
                }
            }
        }
        let owned: Vec<NetworkId> = self
            .entities
            .values()
            .filter(|record| record.owner() == Some(connection))
            .map(|record| record.network_id())
            .collect();
        for network_id in owned {
            self.despawn_entity(network_id);
        }
        // A connection that is going away receives no further notifications.
        self.gained.retain(|(conn, _)| *conn != connection);
        self.just_removed.retain(|(conn, _, _)| *conn != connection);
    }

    // Deltas

    /// Drains this tick's visibility changes. Gains come first; a loss is
    /// dropped if the same edge was re-established before the drain. The
    /// just-removed buffer is cleared unconditionally, consumed or not
    pub fn take_deltas(&mut self) -> Vec<InterestDelta> {
        let mut deltas = Vec::new();

        for (connection, network_id) in std::mem::take(&mut self.gained) {
            // The entity may have been despawned after the gain was queued.
            let Some(record) = self.entities.get(&network_id) else {
                continue;
            };
            if !record.observers().contains(&connection) {
                continue;
            }
            deltas.push(InterestDelta::Gained {
                connection,
                network_id,
                interest_type: record.interest_type(),
                payload: record.spawn_payload().to_vec(),
            });
        }

        for (connection, network_id, interest_type) in std::mem::take(&mut self.just_removed) {
            if self.is_observing(&connection, &network_id) {
                continue;
            }
            deltas.push(InterestDelta::Lost {
                connection,
                network_id,
                interest_type,
            });
        }

        deltas
    }
}

impl Default for ScopeManager {
    fn default() -> Self {
        Self::new()
    }
}
