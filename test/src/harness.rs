//! Shared setup for the integration tests: a server and client joined by the
//! in-memory transport, plus a pump that drives both tick loops.

use wirebound_client::{Client, ClientConfig};
use wirebound_server::{Server, ServerConfig};
use wirebound_shared::ListenConfig;

use crate::{memory_transport::MemoryServerTransport, test_protocol::protocol};

pub fn listen_config() -> ListenConfig {
    ListenConfig {
        address: "memory:server".to_string(),
    }
}

/// A server listening on the in-memory transport, plus a client whose
/// connect request is already in flight. Pump once to establish the
/// connection
pub fn connected_pair(
    server_config: ServerConfig,
    client_config: ClientConfig,
) -> (Server, Client) {
    let server_transport = MemoryServerTransport::new();
    let client_transport = server_transport.client();

    let mut server = Server::new(server_config, protocol());
    server
        .listen(Box::new(server_transport), &listen_config())
        .expect("listen failed");

    let mut client = Client::new(client_config, protocol());
    client
        .connect(Box::new(client_transport), "memory:server")
        .expect("connect failed");

    (server, client)
}

/// Runs both tick loops for a number of rounds, discarding events
pub fn pump(server: &mut Server, client: &mut Client, rounds: usize) {
    for _ in 0..rounds {
        let _ = server.receive();
        server.send_all_updates();
        let _ = client.receive();
        client.send_all_updates();
    }
}
