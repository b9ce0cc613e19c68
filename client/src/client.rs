use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use log::{info, warn};

use wirebound_shared::{
    Channel, ConnectionId, ConnectionState, GameInstant, Message, MessageContainer, MessageKind,
    Named, Ping, Pong, Protocol, ResponseId, ResponseTracker, Timer, Transport, TransportEvent,
};

use crate::{
    client_config::ClientConfig,
    connection::connection::ServerConnection,
    error::ClientError,
    events::Events,
};

type MessageHandler = Box<dyn FnMut(&mut Client, MessageContainer, GameInstant)>;

/// A client that connects to a server over a pluggable transport, exchanges
/// batched messages over reliable/unreliable channels, and keeps a smoothed
/// estimate of the link's round trip time.
///
/// Call `receive()` at the start of every frame and `send_all_updates()` at
/// the end, mirroring the server's tick loop.
pub struct Client {
    client_config: ClientConfig,
    protocol: Protocol,
    transport: Option<Box<dyn Transport>>,
    server_address: Option<String>,
    connection: Option<ServerConnection>,
    handlers: HashMap<MessageKind, MessageHandler>,
    response_tracker: ResponseTracker,
    incoming_events: Events,
    transport_events: VecDeque<TransportEvent>,
    send_timer: Timer,
    manual_disconnect: bool,
}

impl Client {
    pub fn new(client_config: ClientConfig, protocol: Protocol) -> Self {
        let send_timer = Timer::new(protocol.tick_interval);
        Self {
            client_config,
            protocol,
            transport: None,
            server_address: None,
            connection: None,
            handlers: HashMap::new(),
            response_tracker: ResponseTracker::new(),
            incoming_events: Events::new(),
            transport_events: VecDeque::new(),
            send_timer,
            manual_disconnect: false,
        }
    }

    /// Begins connecting to the given address over the given transport
    pub fn connect(
        &mut self,
        mut transport: Box<dyn Transport>,
        address: &str,
    ) -> Result<(), ClientError> {
        transport.connect(address)?;
        info!("Client is connecting to {address}");
        self.transport = Some(transport);
        self.server_address = Some(address.to_string());
        self.manual_disconnect = false;
        Ok(())
    }

    pub fn is_connecting(&self) -> bool {
        self.transport.is_some() && self.connection.is_none()
    }

    pub fn is_connected(&self) -> bool {
        self.connection
            .as_ref()
            .is_some_and(|connection| connection.state().is_connected())
    }

    pub fn connection_state(&self) -> ConnectionState {
        match &self.connection {
            Some(connection) => connection.state(),
            None if self.transport.is_some() => ConnectionState::Connecting,
            None => ConnectionState::Disconnected,
        }
    }

    pub fn server_connection_id(&self) -> Option<ConnectionId> {
        self.connection.as_ref().map(|connection| connection.id())
    }

    /// Records that the server accepted this client's authentication
    pub fn mark_authenticated(&mut self) {
        if let Some(connection) = self.connection.as_mut() {
            connection.authenticate();
        }
    }

    /// Tears the connection down deliberately; auto-connect does not rearm
    pub fn disconnect(&mut self) {
        self.manual_disconnect = true;
        let Some(connection) = self.connection.as_mut() else {
            return;
        };
        if connection.is_disconnecting() {
            return;
        }
        let id = connection.id();
        connection.begin_disconnect();
        if let Some(transport) = self.transport.as_mut() {
            transport.disconnect(id);
        }
    }

    /// Must be called regularly, maintains the connection to the server and
    /// returns the events that happened since the last call
    pub fn receive(&mut self) -> Events {
        let now = GameInstant::now();

        self.poll_transport(now);
        self.process_incoming_envelopes(now);
        self.check_timeout();
        self.response_tracker.expire(now);

        std::mem::replace(&mut self.incoming_events, Events::new())
    }

    /// Flushes all queued outgoing batches, at most once per tick interval
    pub fn send_all_updates(&mut self) {
        if !self.send_timer.ringing() {
            return;
        }
        let now = GameInstant::now();

        self.send_ping_if_due(now);

        let (Some(transport), Some(connection)) =
            (self.transport.as_mut(), self.connection.as_mut())
        else {
            return;
        };
        if connection.is_disconnecting() {
            return;
        }
        if connection.base.should_send_heartbeat()
            && !connection.base.has_outgoing(Channel::Reliable)
            && !connection.base.has_outgoing(Channel::Unreliable)
        {
            connection.base.queue_heartbeat(now);
        }
        let connection_id = connection.id();
        let mut sent_any = false;
        let mut reliable_failed = false;
        for channel in [Channel::Reliable, Channel::Unreliable] {
            while let Some(batch) = connection.base.pop_batch(channel) {
                if let Err(error) = transport.send(connection_id, &batch, channel) {
                    warn!("Send to server failed: {error}");
                    // A dropped reliable batch breaks the ordered stream;
                    // the connection cannot continue.
                    if channel == Channel::Reliable {
                        reliable_failed = true;
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
        if reliable_failed {
            self.close_connection("reliable send failed");
        }

        self.send_timer.reset();
    }

    // Handlers

    /// Registers the handler invoked for every inbound message of type `M`
    pub fn on_message<M, F>(&mut self, mut handler: F)
    where
        M: Message + Named,
        F: FnMut(&mut Self, M, GameInstant) + 'static,
    {
        let kind = MessageKind::of::<M>();
        self.handlers.insert(
            kind,
            Box::new(move |client, container, now| {
                if let Some(message) = container.downcast::<M>() {
                    handler(client, message, now);
                }
            }),
        );
    }

    // Messages

    /// Queues a message to the server. Delivery happens on the next flush
    pub fn send_message<M: Message>(
        &mut self,
        message: &M,
        channel: Channel,
    ) -> Result<(), ClientError> {
        let envelope = self
            .protocol
            .message_kinds
            .pack(message, &self.protocol.codec_limits)?;
        let now = GameInstant::now();
        let connection = self.connection.as_mut().ok_or(ClientError::NotConnected)?;
        if connection.is_disconnecting() {
            return Err(ClientError::NotConnected);
        }
        connection.base.queue_envelope(channel, &envelope, now)?;
        Ok(())
    }

    // Requests & responses

    /// Registers a one-shot response callback with a timeout; fires once
    /// with `None` if no reply arrives in time. Returns `None` when every
    /// response id is already outstanding
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

    // Diagnostics

    /// Smoothed round trip time to the server, in milliseconds
    pub fn rtt(&self) -> Option<f32> {
        let connection = self.connection.as_ref()?;
        connection
            .time_manager
            .has_samples()
            .then(|| connection.time_manager.rtt())
    }

    /// Smoothed jitter of the round trip time, in milliseconds
    pub fn jitter(&self) -> Option<f32> {
        let connection = self.connection.as_ref()?;
        connection
            .time_manager
            .has_samples()
            .then(|| connection.time_manager.jitter())
    }

    /// How far behind real time received snapshots should be rendered:
    /// one-way latency plus jitter scaled by the configured multiplier, in
    /// milliseconds
    pub fn interpolation_delay(&self) -> Option<f32> {
        let connection = self.connection.as_ref()?;
        if !connection.time_manager.has_samples() {
            return None;
        }
        let one_way = connection.time_manager.one_way_latency();
        let jitter = connection.time_manager.jitter();
        Some(one_way + jitter * self.client_config.interpolation_buffer_multiplier)
    }

    pub fn outgoing_bandwidth(&mut self) -> Option<f32> {
        let now = GameInstant::now();
        self.connection
            .as_mut()?
            .base
            .bandwidth_monitor()
            .map(|monitor| monitor.outgoing_bandwidth(now))
    }

    pub fn incoming_bandwidth(&mut self) -> Option<f32> {
        let now = GameInstant::now();
        self.connection
            .as_mut()?
            .base
            .bandwidth_monitor()
            .map(|monitor| monitor.incoming_bandwidth(now))
    }

    // Early phase

    fn poll_transport(&mut self, now: GameInstant) {
        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        transport.poll_events(&mut self.transport_events);

        while let Some(event) = self.transport_events.pop_front() {
            match event {
                TransportEvent::Connected(connection_id) => {
                    self.handle_connected(connection_id);
                }
                TransportEvent::Data(connection_id, _channel, payload) => {
                    self.handle_data(connection_id, &payload, now);
                }
                TransportEvent::Error(_, error) => {
                    self.incoming_events.push_error(error);
                }
                TransportEvent::Disconnected(connection_id) => {
                    self.handle_disconnected(connection_id);
                }
            }
        }
    }

    fn handle_connected(&mut self, connection_id: ConnectionId) {
        if connection_id == 0 {
            warn!("Transport assigned reserved connection id 0, ignoring");
            return;
        }
        if self.connection.is_some() {
            warn!("Already connected, ignoring duplicate connect event");
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
        info!("Connected to server as {connection_id}");
        self.connection = Some(ServerConnection::new(
            connection_id,
            &self.client_config.connection,
            self.client_config.ping_interval,
            self.client_config.rtt_smoothing_window,
            reliable_max,
            unreliable_max,
        ));
        self.incoming_events.push_connection(connection_id);
    }

    fn handle_data(&mut self, connection_id: ConnectionId, payload: &[u8], now: GameInstant) {
        let Some(connection) = self.connection.as_mut() else {
            warn!("Dropping data received before the connect event");
            return;
        };
        if connection.id() != connection_id || connection.is_disconnecting() {
            return;
        }
        if let Err(error) = connection.base.receive_batch(payload, now) {
            warn!("Malformed batch from server: {error}");
            self.close_connection("malformed batch");
        }
    }

    fn handle_disconnected(&mut self, connection_id: ConnectionId) {
        let Some(mut connection) = self.connection.take() else {
            return;
        };
        if connection.id() != connection_id {
            self.connection = Some(connection);
            return;
        }
        info!("Disconnected from server");
        connection.finalize_disconnect();
        self.incoming_events.push_disconnection(connection_id);

        if self.client_config.auto_connect && !self.manual_disconnect {
            if let (Some(transport), Some(address)) =
                (self.transport.as_mut(), self.server_address.as_ref())
            {
                info!("Auto-connect enabled, reconnecting to {address}");
                if let Err(error) = transport.connect(address) {
                    self.incoming_events.push_error(error);
                }
            }
        }
    }

    fn process_incoming_envelopes(&mut self, now: GameInstant) {
        loop {
            let envelope = {
                let Some(connection) = self.connection.as_mut() else {
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
            self.handle_envelope(&envelope, now);
        }
    }

    fn handle_envelope(&mut self, envelope: &[u8], now: GameInstant) {
        let container = match self
            .protocol
            .message_kinds
            .unpack(envelope, &self.protocol.codec_limits)
        {
            Ok(container) => container,
            Err(error) => {
                warn!("Bad envelope from server: {error}");
                self.close_connection("bad envelope");
                return;
            }
        };

        // Pongs feed the link estimate and never reach application
        // handlers.
        let kind = container.kind();
        if kind == MessageKind::of::<Pong>() {
            if let Some(pong) = container.downcast::<Pong>() {
                if let Some(connection) = self.connection.as_mut() {
                    connection.time_manager.record_pong(now, pong.client_time);
                }
            }
            return;
        }

        let mut handlers = std::mem::take(&mut self.handlers);
        let handled = if let Some(handler) = handlers.get_mut(&kind) {
            handler(self, container, now);
            true
        } else {
            false
        };
        for (handler_kind, handler) in handlers {
            self.handlers.entry(handler_kind).or_insert(handler);
        }

        if !handled {
            warn!("No handler registered for opcode {:#06x}", kind.to_u16());
            self.close_connection("unhandled message kind");
        }
    }

    fn check_timeout(&mut self) {
        let timed_out = self
            .connection
            .as_ref()
            .is_some_and(|connection| {
                !connection.is_disconnecting() && connection.base.should_timeout()
            });
        if timed_out {
            self.close_connection("timed out");
        }
    }

    fn send_ping_if_due(&mut self, now: GameInstant) {
        let Some(connection) = self.connection.as_mut() else {
            return;
        };
        if connection.is_disconnecting() || !connection.time_manager.should_send_ping() {
            return;
        }
        let ping = Ping {
            client_time: now.as_millis(),
        };
        let envelope = match self
            .protocol
            .message_kinds
            .pack(&ping, &self.protocol.codec_limits)
        {
            Ok(envelope) => envelope,
            Err(error) => {
                warn!("Failed to pack ping: {error}");
                return;
            }
        };
        if let Err(error) = connection
            .base
            .queue_envelope(Channel::Unreliable, &envelope, now)
        {
            warn!("Dropping ping: {error}");
            return;
        }
        connection.time_manager.mark_ping_sent();
    }

    fn close_connection(&mut self, reason: &str) {
        let Some(connection) = self.connection.as_mut() else {
            return;
        };
        if connection.is_disconnecting() {
            return;
        }
        info!("Closing connection to server: {reason}");
        let id = connection.id();
        connection.begin_disconnect();
        if let Some(transport) = self.transport.as_mut() {
            transport.disconnect(id);
        }
    }
}
