/// A connection that sends malformed bytes is disconnected without
/// disturbing any other connection.
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use wirebound_client::{Client, ClientConfig};
use wirebound_server::{DisconnectEvent, Server, ServerConfig};
use wirebound_shared::{Channel, Transport, TransportEvent};

use wirebound_test::harness::listen_config;
use wirebound_test::memory_transport::MemoryServerTransport;
use wirebound_test::test_protocol::{protocol, AuthRequest};

/// A framing-valid batch whose single envelope is one byte, shorter than an
/// opcode
fn truncated_header_batch() -> Vec<u8> {
    let mut batch = Vec::new();
    batch.extend_from_slice(&0u64.to_le_bytes());
    batch.extend_from_slice(&1u16.to_le_bytes());
    batch.push(0xFF);
    batch
}

#[test]
fn truncated_header_disconnects_only_the_offender() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();

    let server_transport = MemoryServerTransport::new();
    let good_transport = server_transport.client();
    let mut attacker = server_transport.client();

    let mut server = Server::new(ServerConfig::default(), protocol());
    server
        .listen(Box::new(server_transport), &listen_config())
        .unwrap();

    let auth_seen = Rc::new(RefCell::new(Vec::new()));
    let auth_seen_clone = auth_seen.clone();
    server.on_message::<AuthRequest, _>(move |_server, id, _message, _now| {
        auth_seen_clone.borrow_mut().push(id);
    });

    let mut good_client = Client::new(ClientConfig::default(), protocol());
    good_client
        .connect(Box::new(good_transport), "memory:server")
        .unwrap();
    attacker.connect("memory:server").unwrap();

    // Both connect requests land in one poll.
    let _ = server.receive();
    assert_eq!(server.connection_count(), 2);
    let _ = good_client.receive();
    let good_id = good_client.server_connection_id().unwrap();

    // The attacker learns its id from the transport directly, then injects
    // raw bytes below the protocol layer.
    let mut attacker_events = VecDeque::new();
    attacker.poll_events(&mut attacker_events);
    let attacker_id = attacker_events
        .iter()
        .find_map(|event| match event {
            TransportEvent::Connected(id) => Some(*id),
            _ => None,
        })
        .expect("attacker never connected");
    attacker
        .send(attacker_id, &truncated_header_batch(), Channel::Reliable)
        .unwrap();

    let mut disconnected = Vec::new();
    for _ in 0..4 {
        let mut events = server.receive();
        disconnected.extend(events.read::<DisconnectEvent>());
        server.send_all_updates();
        let _ = good_client.receive();
        good_client.send_all_updates();
    }
    assert_eq!(disconnected, vec![attacker_id]);
    assert!(server.has_connection(&good_id));

    // The surviving connection still dispatches normally.
    good_client
        .send_message(&AuthRequest { token: None }, Channel::Reliable)
        .unwrap();
    for _ in 0..3 {
        let _ = server.receive();
        server.send_all_updates();
        let _ = good_client.receive();
        good_client.send_all_updates();
    }
    assert_eq!(*auth_seen.borrow(), vec![good_id]);
}

#[test]
fn truncated_batch_header_disconnects() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();

    let server_transport = MemoryServerTransport::new();
    let mut attacker = server_transport.client();

    let mut server = Server::new(ServerConfig::default(), protocol());
    server
        .listen(Box::new(server_transport), &listen_config())
        .unwrap();

    attacker.connect("memory:server").unwrap();
    let _ = server.receive();

    let mut attacker_events = VecDeque::new();
    attacker.poll_events(&mut attacker_events);
    let attacker_id = attacker_events
        .iter()
        .find_map(|event| match event {
            TransportEvent::Connected(id) => Some(*id),
            _ => None,
        })
        .expect("attacker never connected");

    // Shorter than the batch timestamp header.
    attacker
        .send(attacker_id, &[1, 2, 3], Channel::Reliable)
        .unwrap();

    let mut disconnected = Vec::new();
    for _ in 0..4 {
        let mut events = server.receive();
        disconnected.extend(events.read::<DisconnectEvent>());
        server.send_all_updates();
    }
    assert_eq!(disconnected, vec![attacker_id]);
    assert_eq!(server.connection_count(), 0);
}
