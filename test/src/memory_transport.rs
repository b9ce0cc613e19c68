//! In-memory transport implementation for integration testing.
//! Routes batches between server and client without network I/O.

use std::collections::{HashMap, VecDeque};

use crossbeam_channel::{unbounded, Receiver, Sender};

use wirebound_shared::{
    Channel, ConnectionId, KeyGenerator, ListenConfig, Transport, TransportError, TransportEvent,
};

pub const RELIABLE_MAX: usize = 16 * 1024;
pub const UNRELIABLE_MAX: usize = 1200;

enum WireCommand {
    Connect {
        to_client: Sender<TransportEvent>,
    },
    Packet {
        from: ConnectionId,
        channel: Channel,
        payload: Vec<u8>,
    },
    Disconnect {
        from: ConnectionId,
    },
}

/// Server end of the in-memory wire. Assigns non-zero connection ids and
/// delivers Connected before any Data, matching the transport contract.
pub struct MemoryServerTransport {
    listening: bool,
    commands: Receiver<WireCommand>,
    commands_tx: Sender<WireCommand>,
    clients: HashMap<ConnectionId, Sender<TransportEvent>>,
    key_generator: KeyGenerator,
    pending: VecDeque<TransportEvent>,
}

impl MemoryServerTransport {
    pub fn new() -> Self {
        let (commands_tx, commands) = unbounded();
        Self {
            listening: false,
            commands,
            commands_tx,
            clients: HashMap::new(),
            key_generator: KeyGenerator::new(),
            pending: VecDeque::new(),
        }
    }

    /// Creates a client end wired to this server
    pub fn client(&self) -> MemoryClientTransport {
        MemoryClientTransport {
            to_server: self.commands_tx.clone(),
            from_server: None,
            my_id: None,
            pending: VecDeque::new(),
        }
    }
}

impl Default for MemoryServerTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MemoryServerTransport {
    fn connect(&mut self, _address: &str) -> Result<(), TransportError> {
        Err(TransportError::Unexpected {
            reason: "server transport cannot connect".to_string(),
        })
    }

    fn listen(&mut self, _config: &ListenConfig) -> Result<(), TransportError> {
        self.listening = true;
        Ok(())
    }

    fn send(
        &mut self,
        connection_id: ConnectionId,
        payload: &[u8],
        channel: Channel,
    ) -> Result<(), TransportError> {
        // Reliable sends past the threshold stand in for fragmentation.
        if channel == Channel::Unreliable && payload.len() > self.max_packet_size(channel) {
            return Err(TransportError::InvalidSend {
                reason: "payload exceeds max packet size",
            });
        }
        let sender = self
            .clients
            .get(&connection_id)
            .ok_or(TransportError::InvalidSend {
                reason: "unknown connection",
            })?;
        sender
            .send(TransportEvent::Data(
                connection_id,
                channel,
                payload.to_vec(),
            ))
            .map_err(|_| TransportError::ConnectionClosed { connection_id })
    }

    fn poll_events(&mut self, events: &mut VecDeque<TransportEvent>) {
        events.append(&mut self.pending);
        if !self.listening {
            return;
        }
        while let Ok(command) = self.commands.try_recv() {
            match command {
                WireCommand::Connect { to_client } => {
                    let id = self.key_generator.generate();
                    // Connected reaches the client before any data can.
                    let _ = to_client.send(TransportEvent::Connected(id));
                    self.clients.insert(id, to_client);
                    events.push_back(TransportEvent::Connected(id));
                }
                WireCommand::Packet {
                    from,
                    channel,
                    payload,
                } => {
                    if self.clients.contains_key(&from) {
                        events.push_back(TransportEvent::Data(from, channel, payload));
                    }
                }
                WireCommand::Disconnect { from } => {
                    if let Some(sender) = self.clients.remove(&from) {
                        let _ = sender.send(TransportEvent::Disconnected(from));
                        self.key_generator.recycle(from);
                        events.push_back(TransportEvent::Disconnected(from));
                    }
                }
            }
        }
    }

    fn disconnect(&mut self, connection_id: ConnectionId) {
        if let Some(sender) = self.clients.remove(&connection_id) {
            let _ = sender.send(TransportEvent::Disconnected(connection_id));
            self.key_generator.recycle(connection_id);
            self.pending
                .push_back(TransportEvent::Disconnected(connection_id));
        }
    }

    fn shutdown(&mut self) {
        let ids: Vec<ConnectionId> = self.clients.keys().copied().collect();
        for id in ids {
            self.disconnect(id);
        }
        self.listening = false;
    }

    fn max_packet_size(&self, channel: Channel) -> usize {
        match channel {
            Channel::Reliable => RELIABLE_MAX,
            Channel::Unreliable => UNRELIABLE_MAX,
        }
    }
}

/// Client end of the in-memory wire. Learns its connection id from the
/// server's Connected event; sending before that fails.
pub struct MemoryClientTransport {
    to_server: Sender<WireCommand>,
    from_server: Option<Receiver<TransportEvent>>,
    my_id: Option<ConnectionId>,
    pending: VecDeque<TransportEvent>,
}

impl Transport for MemoryClientTransport {
    fn connect(&mut self, _address: &str) -> Result<(), TransportError> {
        let (to_client, from_server) = unbounded();
        self.to_server
            .send(WireCommand::Connect { to_client })
            .map_err(|_| TransportError::Refused {
                address: "memory".to_string(),
            })?;
        self.from_server = Some(from_server);
        self.my_id = None;
        Ok(())
    }

    fn listen(&mut self, _config: &ListenConfig) -> Result<(), TransportError> {
        Err(TransportError::Unexpected {
            reason: "client transport cannot listen".to_string(),
        })
    }

    fn send(
        &mut self,
        _connection_id: ConnectionId,
        payload: &[u8],
        channel: Channel,
    ) -> Result<(), TransportError> {
        let my_id = self.my_id.ok_or(TransportError::InvalidSend {
            reason: "not yet connected",
        })?;
        if channel == Channel::Unreliable && payload.len() > self.max_packet_size(channel) {
            return Err(TransportError::InvalidSend {
                reason: "payload exceeds max packet size",
            });
        }
        self.to_server
            .send(WireCommand::Packet {
                from: my_id,
                channel,
                payload: payload.to_vec(),
            })
            .map_err(|_| TransportError::ConnectionClosed {
                connection_id: my_id,
            })
    }

    fn poll_events(&mut self, events: &mut VecDeque<TransportEvent>) {
        events.append(&mut self.pending);
        let Some(from_server) = self.from_server.as_ref() else {
            return;
        };
        while let Ok(event) = from_server.try_recv() {
            match &event {
                TransportEvent::Connected(id) => self.my_id = Some(*id),
                TransportEvent::Disconnected(_) => self.my_id = None,
                _ => {}
            }
            events.push_back(event);
        }
    }

    fn disconnect(&mut self, connection_id: ConnectionId) {
        if let Some(my_id) = self.my_id.take() {
            let _ = self.to_server.send(WireCommand::Disconnect { from: my_id });
            self.pending
                .push_back(TransportEvent::Disconnected(connection_id));
            self.from_server = None;
        }
    }

    fn shutdown(&mut self) {
        if let Some(my_id) = self.my_id {
            self.disconnect(my_id);
        }
        self.from_server = None;
    }

    fn max_packet_size(&self, channel: Channel) -> usize {
        match channel {
            Channel::Reliable => RELIABLE_MAX,
            Channel::Unreliable => UNRELIABLE_MAX,
        }
    }
}
