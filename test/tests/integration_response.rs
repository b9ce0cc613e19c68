/// Request/response correlation: the response id travels inside the
/// application payload and resolves a one-shot callback, or times out with
/// `None` exactly once.
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use wirebound_client::ClientConfig;
use wirebound_server::ServerConfig;
use wirebound_shared::{Channel, MessageContainer, ResponseId};

use wirebound_test::harness::{connected_pair, pump};
use wirebound_test::test_protocol::{StatusQuery, StatusReply};

#[test]
fn reply_resolves_the_registered_callback() {
    let (mut server, mut client) = connected_pair(ServerConfig::default(), ClientConfig::default());

    server.on_message::<StatusQuery, _>(|server, id, query, _now| {
        let reply = StatusReply {
            response_id: query.response_id,
            status: "ok".to_string(),
        };
        let _ = server.send_message(&id, &reply, Channel::Reliable);
    });

    let outcome: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
    let outcome_clone = outcome.clone();
    client.on_message::<StatusReply, _>(move |client, reply, _now| {
        let id = ResponseId::from_u16(reply.response_id);
        let status = reply.status.clone();
        let resolved = client.resolve_response(&id, MessageContainer::from_message(reply));
        if resolved {
            *outcome_clone.borrow_mut() = Some(status);
        }
    });

    pump(&mut server, &mut client, 1);
    let response_id = client
        .register_response(Duration::from_secs(5), |_| {})
        .unwrap();
    client
        .send_message(
            &StatusQuery {
                response_id: response_id.to_u16(),
            },
            Channel::Reliable,
        )
        .unwrap();
    pump(&mut server, &mut client, 3);

    assert_eq!(*outcome.borrow(), Some("ok".to_string()));
}

#[test]
fn unanswered_request_times_out_with_none() {
    let (mut server, mut client) = connected_pair(ServerConfig::default(), ClientConfig::default());
    // The server swallows queries instead of replying.
    server.on_message::<StatusQuery, _>(|_, _, _, _| {});

    let timed_out = Rc::new(RefCell::new(0u32));
    let timed_out_clone = timed_out.clone();

    pump(&mut server, &mut client, 1);
    let response_id = client
        .register_response(Duration::ZERO, move |response| {
            assert!(response.is_none());
            *timed_out_clone.borrow_mut() += 1;
        })
        .unwrap();
    client
        .send_message(
            &StatusQuery {
                response_id: response_id.to_u16(),
            },
            Channel::Reliable,
        )
        .unwrap();
    pump(&mut server, &mut client, 3);

    // Fired exactly once, and a late resolution is refused.
    assert_eq!(*timed_out.borrow(), 1);
    let late = MessageContainer::from_message(StatusReply {
        response_id: response_id.to_u16(),
        status: "late".to_string(),
    });
    assert!(!client.resolve_response(&response_id, late));
}
