//! Client and server registries exchanging payloads through in-memory sinks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ewn_protocol::command::{
    ClientCommands, CommandRegistry, ConnectionId, Dispatcher, MemorySink, Outbox,
    ServerCommands, client_registry, server_registry,
};
use ewn_protocol::protocol::message::{
    ArenaState, EntityState, Login, LoginSuccess, NetworkStrings, TimeSyncRequest,
    TimeSyncResponse,
};
use ewn_protocol::protocol::{
    CodecLimits, DeliveryPolicy, Direction, Error, InternTable, InterningError,
    InterningProducer, MessageTag, Quaternion, Vec3, metrics,
};

#[derive(Default)]
struct Server {
    time_requests: Mutex<Vec<(ConnectionId, u32)>>,
    logins: Mutex<Vec<(ConnectionId, String)>>,
}

impl ServerCommands for Server {
    fn on_time_sync_request(&self, connection: ConnectionId, message: TimeSyncRequest) {
        self.time_requests
            .lock()
            .unwrap()
            .push((connection, message.request_id));
    }

    fn on_login(&self, connection: ConnectionId, message: Login) {
        self.logins.lock().unwrap().push((connection, message.login));
    }
}

#[derive(Default)]
struct Client {
    latest_state: Mutex<Option<u16>>,
    strings: Mutex<InternTable<String>>,
    time_responses: AtomicUsize,
}

impl ClientCommands for Client {
    fn on_arena_state(&self, _: ConnectionId, message: ArenaState) {
        let mut latest = self.latest_state.lock().unwrap();
        let fresh = latest.is_none_or(|last| message.is_newer_than(last));
        if fresh {
            *latest = Some(message.state_id);
        }
    }

    fn on_network_strings(&self, _: ConnectionId, message: NetworkStrings) {
        self.strings.lock().unwrap().apply_batch(message).unwrap();
    }

    fn on_time_sync_response(&self, _: ConnectionId, _: TimeSyncResponse) {
        self.time_responses.fetch_add(1, Ordering::SeqCst);
    }
}

fn server() -> (Arc<Server>, Arc<CommandRegistry>) {
    let app = Arc::new(Server::default());
    let registry = server_registry(Arc::clone(&app), CodecLimits::default()).unwrap();
    (app, Arc::new(registry))
}

fn client() -> (Arc<Client>, Arc<CommandRegistry>) {
    let app = Arc::new(Client::default());
    let registry = client_registry(Arc::clone(&app), CodecLimits::default()).unwrap();
    (app, Arc::new(registry))
}

#[test]
fn time_sync_request_reaches_server_handler() {
    let (server_app, server_registry) = server();
    let (_, client_registry) = client();

    let client_out = Outbox::new(client_registry, MemorySink::new());
    client_out
        .send(ConnectionId(7), &TimeSyncRequest { request_id: 7 })
        .unwrap();

    let sent = client_out.sink().take();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].policy, DeliveryPolicy::unreliable(0));

    let dispatcher = Dispatcher::new(server_registry);
    let tag = dispatcher
        .dispatch(sent[0].connection, &sent[0].payload)
        .unwrap();

    assert_eq!(tag, MessageTag::TimeSyncRequest);
    assert_eq!(
        *server_app.time_requests.lock().unwrap(),
        [(ConnectionId(7), 7)]
    );
}

#[test]
fn unknown_tag_has_no_side_effects() {
    let (server_app, registry) = server();
    let dispatcher = Dispatcher::new(registry);
    let before = metrics::snapshot().rejected_unknown_tag;

    let err = dispatcher.dispatch(ConnectionId(1), &[255, 0, 0]).unwrap_err();

    assert!(matches!(err, Error::UnknownTag { tag: 255 }));
    assert!(server_app.time_requests.lock().unwrap().is_empty());
    assert!(server_app.logins.lock().unwrap().is_empty());
    assert!(metrics::snapshot().rejected_unknown_tag > before);
}

#[test]
fn server_cannot_receive_its_own_outgoing_messages() {
    let (_, server_registry) = server();
    let server_out = Outbox::new(Arc::clone(&server_registry), MemorySink::new());
    server_out
        .send(ConnectionId(1), &LoginSuccess::default())
        .unwrap();

    let sent = server_out.sink().take();
    let err = Dispatcher::new(server_registry)
        .dispatch(ConnectionId(1), &sent[0].payload)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::NotRegistered { tag: MessageTag::LoginSuccess, direction: Direction::Incoming }
    ));

    // And the server has no outgoing binding for a client command
    let (_, server_registry) = server();
    assert!(matches!(
        server_registry.encode_for_send(&Login::default()),
        Err(Error::NotRegistered { direction: Direction::Outgoing, .. })
    ));
}

#[test]
fn arena_state_broadcast_keeps_newest_state() {
    let (_, server_registry) = server();
    let (client_app, client_registry) = client();
    let server_out = Outbox::new(server_registry, MemorySink::new());
    let dispatcher = Dispatcher::new(client_registry);

    let state = |state_id| ArenaState {
        state_id,
        server_time: u64::from(state_id) * 50,
        last_processed_input_time: 0,
        entities: vec![EntityState {
            id: 1.into(),
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quaternion::IDENTITY,
            angular_velocity: Vec3::ZERO,
            linear_velocity: Vec3::ZERO,
        }],
    };

    // Unreliable delivery may reorder; 65_535 -> 0 wraps forward
    for state_id in [65_534, 0, 65_535, 65_533] {
        server_out.broadcast([ConnectionId(1)], &state(state_id)).unwrap();
    }
    for packet in server_out.sink().take() {
        assert_eq!(packet.policy, DeliveryPolicy::unreliable(0));
        dispatcher.dispatch(packet.connection, &packet.payload).unwrap();
    }

    assert_eq!(*client_app.latest_state.lock().unwrap(), Some(0));
}

#[test]
fn interned_strings_travel_in_batches() {
    let (_, server_registry) = server();
    let (client_app, client_registry) = client();
    let server_out = Outbox::new(server_registry, MemorySink::new());
    let dispatcher = Dispatcher::new(client_registry);

    let mut producer = InterningProducer::new();
    let first: NetworkStrings = producer
        .batch(vec!["engine".to_owned(), "laser".to_owned()])
        .unwrap();
    let second: NetworkStrings = producer.batch(vec!["shield".to_owned()]).unwrap();

    server_out.send(ConnectionId(1), &first).unwrap();
    server_out.send(ConnectionId(1), &second).unwrap();
    for packet in server_out.sink().take() {
        dispatcher.dispatch(packet.connection, &packet.payload).unwrap();
    }

    let strings = client_app.strings.lock().unwrap();
    assert_eq!(strings.len(), 3);
    assert_eq!(strings.resolve(2).unwrap(), "shield");
    assert_eq!(
        strings.resolve(3).unwrap_err(),
        InterningError::UnknownResourceId { id: 3 }
    );
}

#[test]
fn time_sync_round_trip() {
    let (_, server_registry) = server();
    let (client_app, client_registry) = client();

    let (bytes, policy) = server_registry
        .encode_for_send(&TimeSyncResponse {
            request_id: 3,
            server_time: 42,
        })
        .unwrap();
    assert_eq!(policy, DeliveryPolicy::unreliable(0));

    Dispatcher::new(client_registry)
        .dispatch(ConnectionId(0), &bytes)
        .unwrap();
    assert_eq!(client_app.time_responses.load(Ordering::SeqCst), 1);
}
