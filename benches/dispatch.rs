use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ewn_protocol::command::{ConnectionId, Dispatcher, ServerCommands, server_registry};
use ewn_protocol::protocol::message::{ArenaState, PlayerMovement, TimeSyncRequest};
use ewn_protocol::protocol::{CodecLimits, Vec3, encode};

struct Server;

impl ServerCommands for Server {
    fn on_time_sync_request(&self, _: ConnectionId, message: TimeSyncRequest) {
        black_box(message);
    }

    fn on_player_movement(&self, _: ConnectionId, message: PlayerMovement) {
        black_box(message);
    }
}

fn bench_dispatch(c: &mut Criterion) {
    let registry = Arc::new(server_registry(Arc::new(Server), CodecLimits::default()).unwrap());
    let dispatcher = Dispatcher::new(Arc::clone(&registry));
    let mut group = c.benchmark_group("dispatch");

    let time_sync = encode(&TimeSyncRequest { request_id: 42 }).unwrap();
    group.bench_function("time_sync_request", |b| {
        b.iter(|| black_box(dispatcher.dispatch(ConnectionId(1), &time_sync).unwrap()));
    });

    let movement = encode(&PlayerMovement {
        input_time: 123_456,
        direction: Vec3::new(0.0, 0.0, 1.0),
        rotation: Vec3::new(0.1, 0.2, 0.0),
    })
    .unwrap();
    group.bench_function("player_movement", |b| {
        b.iter(|| black_box(dispatcher.dispatch(ConnectionId(1), &movement).unwrap()));
    });

    group.bench_function("unknown_tag", |b| {
        b.iter(|| black_box(dispatcher.dispatch(ConnectionId(1), &[255]).is_err()));
    });

    let state = ArenaState::default();
    group.bench_function("encode_for_send_arena_state", |b| {
        b.iter(|| black_box(registry.encode_for_send(&state).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
