use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ivory::board::Position;

fn perft_benchmarks(c: &mut Criterion) {
    ivory::init();

    c.bench_function("perft_start_d3", |b| {
        let mut pos = Position::startpos();
        b.iter(|| black_box(pos.perft(3)));
    });

    c.bench_function("perft_start_d4", |b| {
        let mut pos = Position::startpos();
        b.iter(|| black_box(pos.perft(4)));
    });

    c.bench_function("perft_kiwipete_d3", |b| {
        let mut pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -",
        )
        .unwrap();
        b.iter(|| black_box(pos.perft(3)));
    });

    c.bench_function("movegen_startpos", |b| {
        let pos = Position::startpos();
        b.iter(|| black_box(pos.legal_moves().len()));
    });
}

criterion_group!(benches, perft_benchmarks);
criterion_main!(benches);
