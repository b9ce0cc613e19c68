/// Batching behavior observed from the outside: many queued messages arrive
/// in order after one flush, and messages that cannot fit an unreliable
/// datagram are refused at queue time.
use std::cell::RefCell;
use std::rc::Rc;

use wirebound_client::{ClientConfig, ClientError};
use wirebound_server::ServerConfig;
use wirebound_shared::Channel;

use wirebound_test::harness::{connected_pair, pump};
use wirebound_test::test_protocol::{AuthRequest, ChatMessage};

fn authenticated_pair() -> (
    wirebound_server::Server,
    wirebound_client::Client,
    Rc<RefCell<Vec<String>>>,
) {
    let (mut server, mut client) = connected_pair(ServerConfig::default(), ClientConfig::default());

    let received = Rc::new(RefCell::new(Vec::new()));
    let received_clone = received.clone();
    server.on_message::<ChatMessage, _>(move |_server, _id, message, _now| {
        received_clone.borrow_mut().push(message.text);
    });
    server.on_message::<AuthRequest, _>(|server, id, _message, _now| {
        let _ = server.accept_connection(&id);
    });

    pump(&mut server, &mut client, 1);
    client
        .send_message(&AuthRequest { token: None }, Channel::Reliable)
        .unwrap();
    pump(&mut server, &mut client, 2);

    (server, client, received)
}

#[test]
fn queued_messages_arrive_in_order_after_one_flush() {
    let (mut server, mut client, received) = authenticated_pair();

    for i in 0..20 {
        client
            .send_message(
                &ChatMessage {
                    text: format!("message {i}"),
                },
                Channel::Reliable,
            )
            .unwrap();
    }
    pump(&mut server, &mut client, 2);

    let expected: Vec<String> = (0..20).map(|i| format!("message {i}")).collect();
    assert_eq!(*received.borrow(), expected);
}

#[test]
fn oversized_unreliable_message_is_refused_at_queue_time() {
    let (_server, mut client, _received) = authenticated_pair();

    // Larger than an unreliable datagram can carry.
    let message = ChatMessage {
        text: "x".repeat(4_000),
    };
    let result = client.send_message(&message, Channel::Unreliable);
    assert!(matches!(result, Err(ClientError::Batch(_))));

    // The same message fits the reliable channel fine.
    client.send_message(&message, Channel::Reliable).unwrap();
}

#[test]
fn oversized_reliable_message_is_delivered_intact() {
    let (mut server, mut client, received) = authenticated_pair();

    // A single envelope past the reliable batching threshold; the transport
    // fragments it instead of refusing it.
    let message = ChatMessage {
        text: "z".repeat(20_000),
    };
    client.send_message(&message, Channel::Reliable).unwrap();
    pump(&mut server, &mut client, 4);

    assert_eq!(*received.borrow(), vec![message.text]);
    assert!(client.is_connected());
}

#[test]
fn large_reliable_traffic_spans_multiple_batches() {
    let (mut server, mut client, received) = authenticated_pair();

    // Well past one reliable batch worth of envelopes.
    for i in 0..10 {
        client
            .send_message(
                &ChatMessage {
                    text: format!("{i}:{}", "y".repeat(3_000)),
                },
                Channel::Reliable,
            )
            .unwrap();
    }
    pump(&mut server, &mut client, 2);

    assert_eq!(received.borrow().len(), 10);
    for (i, text) in received.borrow().iter().enumerate() {
        assert!(text.starts_with(&format!("{i}:")));
    }
}
