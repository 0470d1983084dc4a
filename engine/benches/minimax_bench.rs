use criterion::{criterion_group, criterion_main, Criterion, SamplingMode};
use std::time::Duration;

use engine::{evaluate, select_move, Board, Difficulty, Mark, Outcome, SessionRng};

fn bench_select_empty_board() {
    let mut board = Board::new();
    let mut rng = SessionRng::new(42);
    let _ = select_move(&mut board, Mark::X, Mark::O, Difficulty::Perfect, &mut rng);
}

fn bench_select_mid_game() {
    let mut board = Board::new();
    for (index, mark) in [(4, Mark::X), (0, Mark::O), (8, Mark::X), (2, Mark::O)] {
        board.set(index, mark);
    }
    let mut rng = SessionRng::new(42);
    let _ = select_move(&mut board, Mark::X, Mark::O, Difficulty::Perfect, &mut rng);
}

fn bench_self_play_full_game() {
    let mut board = Board::new();
    let mut rng = SessionRng::new(42);
    let mut current = Mark::X;

    while evaluate(&board) == Outcome::None {
        let index = select_move(&mut board, current, current.opponent(), Difficulty::Perfect, &mut rng)
            .unwrap()
            .unwrap();
        board.set(index, current);
        current = current.opponent();
    }
}

fn minimax_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("minimax");

    group
        .sampling_mode(SamplingMode::Flat)
        .sample_size(50)
        .measurement_time(Duration::from_secs(20));

    group.bench_function("single_move_empty", |b| b.iter(bench_select_empty_board));

    group.bench_function("single_move_mid_game", |b| b.iter(bench_select_mid_game));

    group.bench_function("self_play_full_game", |b| b.iter(bench_self_play_full_game));

    group.finish();
}

criterion_group!(benches, minimax_bench);
criterion_main!(benches);
