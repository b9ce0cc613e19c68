use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use log::{info, warn};

use wirebound_shared::{
    Channel, ConnectionId, GameInstant, InterestMessage, ListenConfig, LostInterestMessage,
    Message, MessageContainer, MessageKind, Named, NetworkId, Ping, Pong, Protocol, ResponseId,
    ResponseTracker, Tick, Transport, TransportEvent,
};

use crate::{
    connection::connection::Connection,
    error::ServerError,
    events::Events,
    scope::scope_manager::{InterestDelta, ScopeManager},
    server::{server_config::ServerConfig, time_manager::TimeManager},
};

type MessageHandler = Box<dyn FnMut(&mut Server, ConnectionId, MessageContainer, GameInstant)>;

/// A server that uses a pluggable transport to send/receive batched messages
/// to/from connected clients, and scopes networked entities to the clients
/// observing them.
///
/// Call `receive()` at the start of every frame and `send_all_updates()` at
/// the end; outgoing flushes are gated by the protocol's tick interval, so
/// calling every frame is correct regardless of frame rate.
pub struct Server {
    server_config: ServerConfig,
    protocol: Protocol,
    transport: Option<Box<dyn Transport>>,
    connections: HashMap<ConnectionId, Connection>,
    handlers: HashMap<MessageKind, MessageHandler>,
    response_tracker: ResponseTracker,
    scope: ScopeManager,
    time_manager: TimeManager,
    incoming_events: Events,
    transport_events: VecDeque<TransportEvent>,
    tick_event_pending: bool,
}

impl Server {
    pub fn new(server_config: ServerConfig, protocol: Protocol) -> Self {
        let tick_interval = protocol.tick_interval;
        Self {
            server_config,
            protocol,
            transport: None,
            connections: HashMap::new(),
            handlers: HashMap::new(),
            response_tracker: ResponseTracker::new(),
            scope: ScopeManager::new(),
            time_manager: TimeManager::new(tick_interval),
            incoming_events: Events::new(),
            transport_events: VecDeque::new(),
            tick_event_pending: true,
        }
    }

    /// Starts the server listening on the given transport
    pub fn listen(
        &mut self,
        mut transport: Box<dyn Transport>,
        config: &ListenConfig,
    ) -> Result<(), ServerError> {
        transport.listen(config)?;
        info!("Server is listening on {}", config.address);
        self.transport = Some(transport);
        Ok(())
    }

    pub fn is_listening(&self) -> bool {
        self.transport.is_some()
    }

    /// Must be called regularly, maintains the connections to remote clients
    /// and returns the events that happened since the last call
    pub fn receive(&mut self) -> Events {
        let now = GameInstant::now();

        self.poll_transport();
        self.process_incoming_envelopes(now);
        self.check_timeouts();
        self.response_tracker.expire(now);

        if self.tick_event_pending && self.time_manager.should_flush() {
            self.incoming_events.push_tick(self.time_manager.current_tick());
            self.tick_event_pending = false;
        }

        std::mem::replace(&mut self.incoming_events, Events::new())
    }

    /// Flushes all queued outgoing batches, at most once per tick interval
    pub fn send_all_updates(&mut self) {
        if self.transport.is_none() {
            return;
        }
        if !self.time_manager.should_flush() {
            return;
        }
        let now = GameInstant::now();

        self.flush_interest_deltas(now);
        self.flush_connections(now);

        self.time_manager.record_flush();
        self.tick_event_pending = true;
    }

    // Handlers

    /// Registers the handler invoked for every inbound message of type `M`.
    /// Registering a second handler for the same type replaces the first;
    /// a replacement made while dispatch is in progress takes effect on the
    /// next envelope
    pub fn on_message<M, F>(&mut self, mut handler: F)
    where
        M: Message + Named,
        F: FnMut(&mut Self, ConnectionId, M, GameInstant) + 'static,
    {
        let kind = MessageKind::of::<M>();
        self.handlers.insert(
            kind,
            Box::new(move |server, connection_id, container, now| {
                if let Some(message) = container.downcast::<M>() {
                    handler(server, connection_id, message, now);
                }
            }),
        );
    }

    // Connections

    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.connections.keys().copied().collect()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn has_connection(&self, connection_id: &ConnectionId) -> bool {
        self.connections.contains_key(connection_id)
    }

    /// Marks a connection as authenticated, unlocking auth-gated message
    /// kinds for it
    pub fn accept_connection(&mut self, connection_id: &ConnectionId) -> Result<(), ServerError> {
        let connection = self
            .connections
            .get_mut(connection_id)
            .ok_or(ServerError::UnknownConnection(*connection_id))?;
        connection.authenticate();
        Ok(())
    }

    /// Refuses a connection, tearing it down
    pub fn reject_connection(&mut self, connection_id: &ConnectionId) {
        self.close_connection(*connection_id, "rejected by application");
    }

    pub fn disconnect(&mut self, connection_id: &ConnectionId) {
        self.close_connection(*connection_id, "disconnected by application");
    }

    /// Counts one application-flagged violation against the connection.
    /// Returns true if this violation exceeded the spam threshold and the
    /// connection is being dropped
    pub fn flag_violation(&mut self, connection_id: &ConnectionId) -> bool {
        let Some(connection) = self.connections.get_mut(connection_id) else {
            return false;
        };
        if connection.base.flag_violation() {
            self.close_connection(*connection_id, "spam violation threshold exceeded");
            return true;
        }
        false
    }

    // Messages

    /// Queues a message to one connection. Delivery happens on the next
    /// flush
    pub fn send_message<M: Message>(
        &mut self,
        connection_id: &ConnectionId,
        message: &M,
        channel: Channel,
    ) -> Result<(), ServerError> {
        if self.transport.is_none() {
            return Err(ServerError::NotListening);
        }
        let envelope = self
            .protocol
            .message_kinds
            .pack(message, &self.protocol.codec_limits)?;
        let now = GameInstant::now();
        let connection = self
            .connections
            .get_mut(connection_id)
            .ok_or(ServerError::UnknownConnection(*connection_id))?;
        if connection.is_disconnecting() {
            return Err(ServerError::UnknownConnection(*connection_id));
        }
        connection.base.queue_envelope(channel, &envelope, now)?;
        Ok(())
    }

    /// Queues a message to every live connection
    pub fn broadcast_message<M: Message>(
        &mut self,
        message: &M,
        channel: Channel,
    ) -> Result<(), ServerError> {
        if self.transport.is_none() {
            return Err(ServerError::NotListening);
        }
        let envelope = self
            .protocol
            .message_kinds
            .pack(message, &self.protocol.codec_limits)?;
        let now = GameInstant::now();
        for connection in self.connections.values_mut() {
            if connection.is_disconnecting() {
                continue;
            }
            if let Err(error) = connection.base.queue_envelope(channel, &envelope, now) {
                warn!(
                    "Dropping broadcast to connection {}: {error}",
                    connection.id()
                );
            }
        }
        Ok(())
    }

    /// Queues a message to exactly the connections observing the given
    /// entity
    pub fn broadcast_to_observers<M: Message>(
        &mut self,
        network_id: &NetworkId,
        message: &M,
        channel: Channel,
    ) -> Result<(), ServerError> {
        if self.transport.is_none() {
            return Err(ServerError::NotListening);
        }
        let envelope = self
            .protocol
            .message_kinds
            .pack(message, &self.protocol.codec_limits)?;
        let now = GameInstant::now();
        for connection_id in self.scope.observers_of(network_id) {
            let Some(connection) = self.connections.get_mut(&connection_id) else {
                continue;
            };
            if connection.is_disconnecting() {
                continue;
            }
            if let Err(error) = connection.base.queue_envelope(channel, &envelope, now) {
                warn!("Dropping observer message to connection {connection_id}: {error}");
            }
        }
        Ok(())
    }

    // Requests & responses

    /// Registers a one-shot response callback with a timeout. The returned
    /// id travels inside the application's own request payload; feed the
    /// peer's reply back in through `resolve_response`. If no reply arrives
    /// before the timeout, the callback fires once with `None`. Returns
    /// `None` when every response id is already outstanding
    pub fn register_response<F>(&mut self, timeout: Duration, callback: F) -> Option<ResponseId>
    where
        F: FnOnce(Option<MessageContainer>) + 'static,
    {
        self.response_tracker
            .register(timeout, GameInstant::now(), Box::new(callback))
    }

    /// Delivers a reply to a registered response id. Returns false if the id
    /// was unknown or already timed out
    pub fn resolve_response(&mut self, id: &ResponseId, response: MessageContainer) -> bool {
        self.response_tracker.resolve(id, response)
    }

    // Scope

    pub fn spawn_entity(
        &mut self,
        owner: Option<ConnectionId>,
        interest_type: u8,
        spawn_payload: Vec<u8>,
    ) -> NetworkId {
        self.scope.spawn_entity(owner, interest_type, spawn_payload)
    }

    pub fn despawn_entity(&mut self, network_id: NetworkId) -> bool {
        self.scope.despawn_entity(network_id)
    }

    pub fn add_to_observing(&mut self, connection_id: ConnectionId, network_id: NetworkId) {
        self.scope.add_to_observing(connection_id, network_id);
    }

    pub fn remove_from_observing(&mut self, connection_id: ConnectionId, network_id: NetworkId) {
        self.scope.remove_from_observing(connection_id, network_id);
    }

    pub fn is_observing(&self, connection_id: &ConnectionId, network_id: &NetworkId) -> bool {
        self.scope.is_observing(connection_id, network_id)
    }

    // Ticks & diagnostics

    /// Gets the current tick of the Server
    pub fn current_tick(&self) -> Tick {
        self.time_manager.current_tick()
    }

    /// Gets the current average tick duration of the Server
    pub fn average_tick_duration(&self) -> Duration {
        self.time_manager.average_tick_duration()
    }

    pub fn outgoing_bandwidth(&mut self, connection_id: &ConnectionId) -> Option<f32> {
        let now = GameInstant::now();
        self.connections
            .get_mut(connection_id)?
            .base
            .bandwidth_monitor()
            .map(|monitor| monitor.outgoing_bandwidth(now))
    }

    pub fn incoming_bandwidth(&mut self, connection_id: &ConnectionId) -> Option<f32> {
        let now = GameInstant::now();
        self.connections
            .get_mut(connection_id)?
            .base
            .bandwidth_monitor()
            .map(|monitor| monitor.incoming_bandwidth(now))
    }

    // Early phase

    fn poll_transport(&mut self) {
        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        transport.poll_events(&mut self.transport_events);
        let now = GameInstant::now();

        while let Some(event) = self.transport_events.pop_front() {
            match event {
                TransportEvent::Connected(connection_id) => {
                    self.handle_connected(connection_id);
                }
                TransportEvent::Data(connection_id, _channel, payload) => {
                    self.handle_data(connection_id, &payload, now);
                }
                TransportEvent::Error(connection_id, error) => {
                    let source = (connection_id != 0).then_some(connection_id);
                    self.incoming_events.push_error(source, error);
                }
                TransportEvent::Disconnected(connection_id) => {
                    self.handle_disconnected(connection_id);
                }
            }
        }
    }

    fn handle_connected(&mut self, connection_id: ConnectionId) {
        // 0 is reserved for the local host; a colliding id means the
        // transport broke its contract.
        if connection_id == 0 || self.connections.contains_key(&connection_id) {
            warn!("Refusing connection with invalid id {connection_id}");
            if let Some(transport) = self.transport.as_mut() {
                transport.disconnect(connection_id);
            }
            return;
        }
        if self.connections.len() >= self.server_config.max_connections {
            warn!(
                "Refusing connection {connection_id}: server is full ({} connections)",
                self.server_config.max_connections
            );
            if let Some(transport) = self.transport.as_mut() {
                transport.disconnect(connection_id);
            }
            return;
        }
        let reliable_max = self
            .transport
            .as_ref()
            .map(|transport| transport.max_packet_size(Channel::Reliable))
            .unwrap_or(0);
        let unreliable_max = self
            .transport
            .as_ref()
            .map(|transport| transport.max_packet_size(Channel::Unreliable))
            .unwrap_or(0);
        info!("Client connected: {connection_id}");
        self.connections.insert(
            connection_id,
            Connection::new(
                connection_id,
                &self.server_config.connection,
                reliable_max,
                unreliable_max,
            ),
        );
        self.incoming_events.push_connection(connection_id);
    }

    fn handle_data(&mut self, connection_id: ConnectionId, payload: &[u8], now: GameInstant) {
        let Some(connection) = self.connections.get_mut(&connection_id) else {
            warn!("Dropping data from unknown connection {connection_id}");
            return;
        };
        if connection.is_disconnecting() {
            return;
        }
        if let Err(error) = connection.base.receive_batch(payload, now) {
            warn!("Malformed batch from connection {connection_id}: {error}");
            self.close_connection(connection_id, "malformed batch");
        }
    }

    fn handle_disconnected(&mut self, connection_id: ConnectionId) {
        let Some(mut connection) = self.connections.remove(&connection_id) else {
            return;
        };
        info!("Client disconnected: {connection_id}");
        connection.finalize_disconnect();
        self.scope.remove_connection(connection_id);
        self.incoming_events.push_disconnection(connection_id);
    }

    fn process_incoming_envelopes(&mut self, now: GameInstant) {
        let connection_ids: Vec<ConnectionId> = self.connections.keys().copied().collect();
        for connection_id in connection_ids {
            loop {
                let envelope = {
                    let Some(connection) = self.connections.get_mut(&connection_id) else {
                        break;
                    };
                    if connection.is_disconnecting() {
                        break;
                    }
                    match connection.base.pop_envelope() {
                        Some((_, envelope)) => envelope,
                        None => break,
                    }
                };
                self.handle_envelope(connection_id, &envelope, now);
            }
        }
    }

    fn handle_envelope(&mut self, connection_id: ConnectionId, envelope: &[u8], now: GameInstant) {
        let container = match self
            .protocol
            .message_kinds
            .unpack(envelope, &self.protocol.codec_limits)
        {
            Ok(container) => container,
            Err(error) => {
                // Malformed or unknown input is assumed adversarial; one bad
                // envelope would desynchronize the rest of the batch anyway.
                warn!("Bad envelope from connection {connection_id}: {error}");
                self.close_connection(connection_id, "bad envelope");
                return;
            }
        };

        let kind = container.kind();
        if let Some(registration) = self.protocol.message_kinds.registration(&kind) {
            if registration.require_auth() {
                let authenticated = self
                    .connections
                    .get(&connection_id)
                    .is_some_and(|connection| connection.is_authenticated());
                if !authenticated {
                    warn!(
                        "Connection {connection_id} sent auth-gated message '{}' before authenticating",
                        container.name()
                    );
                    self.close_connection(connection_id, "unauthenticated message");
                    return;
                }
            }
        }

        // Pings are answered here, before application dispatch: the echo
        // must carry the client's clock value back unmodified.
        if kind == MessageKind::of::<Ping>() {
            if let Some(ping) = container.downcast::<Ping>() {
                let pong = Pong {
                    client_time: ping.client_time,
                };
                self.queue_system_message(connection_id, &pong, Channel::Unreliable, now);
            }
            return;
        }

        let mut handlers = std::mem::take(&mut self.handlers);
        let handled = if let Some(handler) = handlers.get_mut(&kind) {
            handler(self, connection_id, container, now);
            true
        } else {
            false
        };
        // Registrations made during dispatch land in self.handlers and win
        // over the drained table.
        for (handler_kind, handler) in handlers {
            self.handlers.entry(handler_kind).or_insert(handler);
        }

        if !handled {
            warn!(
                "No handler registered for opcode {:#06x} from connection {connection_id}",
                kind.to_u16()
            );
            self.close_connection(connection_id, "unhandled message kind");
        }
    }

    fn check_timeouts(&mut self) {
        let timed_out: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|connection| {
                !connection.is_disconnecting() && connection.base.should_timeout()
            })
            .map(|connection| connection.id())
            .collect();
        for connection_id in timed_out {
            self.close_connection(connection_id, "timed out");
        }
    }

    // Late phase

    fn flush_interest_deltas(&mut self, now: GameInstant) {
        for delta in self.scope.take_deltas() {
            match delta {
                InterestDelta::Gained {
                    connection,
                    network_id,
                    interest_type,
                    payload,
                } => {
                    let message = InterestMessage {
                        interest_type,
                        network_id,
                        payload,
                    };
                    self.queue_system_message(connection, &message, Channel::Reliable, now);
                }
                InterestDelta::Lost {
                    connection,
                    network_id,
                    interest_type,
                } => {
                    let message = LostInterestMessage {
                        interest_type,
                        network_id,
                    };
                    self.queue_system_message(connection, &message, Channel::Reliable, now);
                }
            }
        }
    }

    fn flush_connections(&mut self, now: GameInstant) {
        let Some(transport) = self.transport.as_mut() else {
            return;
        };

        let mut connection_ids: Vec<ConnectionId> = self.connections.keys().copied().collect();
        // Shuffle order of connections in order to avoid priority among
        // clients.
        fastrand::shuffle(&mut connection_ids);

        let mut reliable_failures: Vec<ConnectionId> = Vec::new();
        for connection_id in connection_ids {
            let Some(connection) = self.connections.get_mut(&connection_id) else {
                continue;
            };
            if connection.is_disconnecting() {
                continue;
            }
            if connection.base.should_send_heartbeat()
                && !connection.base.has_outgoing(Channel::Reliable)
                && !connection.base.has_outgoing(Channel::Unreliable)
            {
                connection.base.queue_heartbeat(now);
            }
            let mut sent_any = false;
            for channel in [Channel::Reliable, Channel::Unreliable] {
                while let Some(batch) = connection.base.pop_batch(channel) {
                    if let Err(error) = transport.send(connection_id, &batch, channel) {
                        warn!("Send to connection {connection_id} failed: {error}");
                        // A dropped reliable batch breaks the ordered stream;
                        // the connection cannot continue.
                        if channel == Channel::Reliable {
                            reliable_failures.push(connection_id);
                        }
                        break;
                    }
                    connection.base.record_sent_bytes(now, batch.len());
                    sent_any = true;
                }
            }
            if sent_any {
                connection.base.mark_sent();
            }
        }
        for connection_id in reliable_failures {
            self.close_connection(connection_id, "reliable send failed");
        }
    }

    fn queue_system_message<M: Message>(
        &mut self,
        connection_id: ConnectionId,
        message: &M,
        channel: Channel,
        now: GameInstant,
    ) {
        let envelope = match self
            .protocol
            .message_kinds
            .pack(message, &self.protocol.codec_limits)
        {
            Ok(envelope) => envelope,
            Err(error) => {
                warn!("Failed to pack system message: {error}");
                return;
            }
        };
        let Some(connection) = self.connections.get_mut(&connection_id) else {
            return;
        };
        if connection.is_disconnecting() {
            return;
        }
        if let Err(error) = connection.base.queue_envelope(channel, &envelope, now) {
            warn!("Dropping system message to connection {connection_id}: {error}");
        }
    }

    fn close_connection(&mut self, connection_id: ConnectionId, reason: &str) {
        let Some(connection) = self.connections.get_mut(&connection_id) else {
            return;
        };
        if connection.is_disconnecting() {
            return;
        }
        info!("Closing connection {connection_id}: {reason}");
        connection.begin_disconnect();
        if let Some(transport) = self.transport.as_mut() {
            transport.disconnect(connection_id);
        }
    }
}
