use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ivory::board::{evaluate, Position, Search, SearchConfig};
use ivory::tt::TranspositionTable;

fn search_benchmarks(c: &mut Criterion) {
    ivory::init();

    let middlegame =
        Position::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 2 3")
            .unwrap();

    c.bench_function("evaluate_middlegame", |b| {
        b.iter(|| black_box(evaluate(&middlegame)));
    });

    c.bench_function("search_middlegame_d5", |b| {
        b.iter(|| {
            let mut tt = TranspositionTable::new(32);
            let config = SearchConfig {
                search_time: Duration::from_secs(600),
                max_depth: 5,
                stop: None,
            };
            let mut search = Search::new(&middlegame, config, &mut tt);
            black_box(search.find_best_move())
        });
    });

    c.bench_function("search_kiwipete_d4", |b| {
        let pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -",
        )
        .unwrap();
        b.iter(|| {
            let mut tt = TranspositionTable::new(32);
            let config = SearchConfig {
                search_time: Duration::from_secs(600),
                max_depth: 4,
                stop: None,
            };
            let mut search = Search::new(&pos, config, &mut tt);
            black_box(search.find_best_move())
        });
    });
}

criterion_group!(benches, search_benchmarks);
criterion_main!(benches);
