//! Benchmarks for movement resolution and board lookups.
//!
//! Run with: cargo bench --bench movement

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ladder_session::{resolve, BoardTopology, Cell};
use std::hint::black_box;

fn bench_resolve(c: &mut Criterion) {
    let board = BoardTopology::standard();
    let mut group = c.benchmark_group("resolve");

    // plain move, ladder, snake, overshoot, win
    let cases = [(10, 3), (1, 3), (50, 6), (95, 6), (98, 2)];
    for (start, roll) in cases {
        group.bench_with_input(
            BenchmarkId::new(format!("from_{start}"), roll),
            &(start, roll),
            |b, &(start, roll)| {
                b.iter(|| resolve(black_box(Cell::new(start)), black_box(roll), &board));
            },
        );
    }

    group.bench_function("every_cell_every_roll", |b| {
        b.iter(|| {
            let mut resting = 0_u32;
            for start in 1..=100_u8 {
                for roll in 1..=6_u8 {
                    let path = resolve(Cell::new(start), roll, black_box(&board));
                    resting += u32::from(path.resting_cell().as_u8());
                }
            }
            resting
        });
    });

    group.finish();
}

fn bench_topology(c: &mut Criterion) {
    let mut group = c.benchmark_group("BoardTopology");

    group.bench_function("standard", |b| {
        b.iter(BoardTopology::standard);
    });

    group.bench_function("new_validated", |b| {
        b.iter(|| {
            BoardTopology::new(
                black_box(BoardTopology::STANDARD_SNAKES),
                black_box(BoardTopology::STANDARD_LADDERS),
            )
        });
    });

    let board = BoardTopology::standard();
    group.bench_function("lookup", |b| {
        b.iter(|| board.lookup(black_box(Cell::new(56))));
    });

    group.bench_function("grid_position", |b| {
        b.iter(|| BoardTopology::grid_position(black_box(Cell::new(57))));
    });

    group.finish();
}

criterion_group!(benches, bench_resolve, bench_topology);
criterion_main!(benches);
