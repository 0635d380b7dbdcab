//! Benchmarks for driving whole sessions.
//!
//! Run with: cargo bench --bench session

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ladder_session::{GameSession, SessionBuilder, Tick, TimingConfig, TurnState};
use std::hint::black_box;
use web_time::Duration;

const NAMES: [&str; 4] = ["Ada", "Grace", "Edsger", "Barbara"];

fn new_session(seed: u64, players: usize, timing: TimingConfig) -> GameSession {
    let mut builder = SessionBuilder::new().with_seed(seed).with_timing(timing);
    for name in NAMES.iter().take(players) {
        builder = match builder.add_player(name) {
            Ok(builder) => builder,
            Err(err) => panic!("cannot add {name}: {err}"),
        };
    }
    match builder.start_session() {
        Ok(session) => session,
        Err(err) => panic!("cannot start session: {err}"),
    }
}

/// Plays a game to the end, or until `max_turns`. Returns the number of ticks taken.
fn play_game(session: &mut GameSession, frame: Tick, max_turns: usize) -> usize {
    let mut ticks = 0;
    for _ in 0..max_turns {
        if session.state() == TurnState::GameOver {
            break;
        }
        if session.roll_dice().is_err() {
            break;
        }
        while session.state().is_busy() {
            session.tick(frame);
            ticks += 1;
        }
        session.events().for_each(drop);
    }
    ticks
}

fn bench_full_game(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_game");

    for players in [2_usize, 4] {
        group.bench_with_input(
            BenchmarkId::new("instant", players),
            &players,
            |b, &players| {
                let mut seed = 0_u64;
                b.iter(|| {
                    seed += 1;
                    let mut session = new_session(seed, players, TimingConfig::instant());
                    black_box(play_game(&mut session, Tick::Advance, 10_000))
                });
            },
        );
    }

    group.bench_function("classic_at_60fps", |b| {
        let frame = Tick::Elapsed(Duration::from_micros(16_667));
        let mut seed = 0_u64;
        b.iter(|| {
            seed += 1;
            let mut session = new_session(seed, 2, TimingConfig::classic());
            black_box(play_game(&mut session, frame, 10_000))
        });
    });

    group.finish();
}

fn bench_per_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("per_frame");

    group.bench_function("tick_while_rolling", |b| {
        let mut session = new_session(3, 2, TimingConfig::classic());
        let frame = Duration::from_nanos(1);
        if session.roll_dice().is_err() {
            panic!("first roll rejected");
        }
        b.iter(|| session.tick(black_box(frame)));
    });

    group.bench_function("snapshot", |b| {
        let session = new_session(3, 4, TimingConfig::classic());
        b.iter(|| black_box(session.snapshot()));
    });

    group.bench_function("snapshot_checksum", |b| {
        let snapshot = new_session(3, 4, TimingConfig::classic()).snapshot();
        b.iter(|| black_box(&snapshot).checksum());
    });

    group.finish();
}

criterion_group!(benches, bench_full_game, bench_per_frame);
criterion_main!(benches);
