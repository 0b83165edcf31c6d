//! Criterion benchmarks for the hot paths a room exercises every round:
//! resolving a full batch of actions, taking submissions, and the
//! structural health check transports poll between rounds.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use coven_engine::abilities::SLASH;
use coven_engine::{ActionRequest, Class, GameRoom, PlayerId, Race, RoomConfig, Target};

fn room_in_action(players: usize) -> (GameRoom, Vec<PlayerId>) {
    let mut room = GameRoom::new(RoomConfig::default(), 2024);
    let ids: Vec<PlayerId> = (0..players)
        .map(|i| {
            room.add_player(format!("hunter{i}"), Race::Human, Class::Warrior)
                .expect("lobby accepts the roster")
        })
        .collect();
    room.start().expect("room can start");
    for &id in &ids {
        room.submit_action(id, ActionRequest::ready()).expect("ready accepted");
    }
    (room, ids)
}

fn queued_room(players: usize) -> GameRoom {
    let (mut room, ids) = room_in_action(players);
    for &id in &ids {
        room.submit_action(id, ActionRequest::ability(SLASH, Some(Target::Monster)))
            .expect("slash accepted");
    }
    room
}

fn bench_resolve_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_round");
    for players in [4usize, 8, 16] {
        group.bench_function(format!("{players}_players"), |b| {
            b.iter_batched(
                || queued_room(players),
                |mut room| black_box(room.resolve_round().expect("round resolves")),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_submission(c: &mut Criterion) {
    c.bench_function("submit_8_actions", |b| {
        b.iter_batched(
            || room_in_action(8),
            |(mut room, ids)| {
                for &id in &ids {
                    black_box(
                        room.submit_action(id, ActionRequest::ability(SLASH, Some(Target::Monster)))
                            .expect("slash accepted"),
                    );
                }
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_health_check(c: &mut Criterion) {
    let (room, _ids) = room_in_action(8);
    c.bench_function("health_check", |b| b.iter(|| black_box(room.health_check())));
}

criterion_group!(benches, bench_resolve_round, bench_submission, bench_health_check);
criterion_main!(benches);
