use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tui_memory::adapter::build_observation;
use tui_memory::core::{GameSnapshot, GameState};
use tui_memory::term::{encode_diff_into, FrameBuffer, GameView, Viewport};
use tui_memory::types::{GameAction, MAX_PAIR_COUNT, RESOLVE_DELAY_MS};

fn bench_advance(c: &mut Criterion) {
    let mut state = GameState::new(12345, 8);
    state.start();

    c.bench_function("game_advance_16ms", |b| {
        b.iter(|| {
            state.advance(black_box(16));
        })
    });
}

fn bench_full_game(c: &mut Criterion) {
    c.bench_function("solve_16_pairs", |b| {
        b.iter(|| {
            let mut state = GameState::new(black_box(7), MAX_PAIR_COUNT);
            state.start();
            let pairs: Vec<(usize, usize)> = state
                .values()
                .iter()
                .filter_map(|&v| {
                    let mut at = state.deck().positions_of(v);
                    Some((at.next()?, at.next()?))
                })
                .collect();
            for (a, b) in pairs {
                state.apply_action(GameAction::Select(a));
                state.apply_action(GameAction::Select(b));
                state.advance(RESOLVE_DELAY_MS);
            }
            state.is_complete()
        })
    });
}

fn bench_restart(c: &mut Criterion) {
    let mut state = GameState::new(12345, MAX_PAIR_COUNT);
    state.start();

    c.bench_function("restart_reshuffle", |b| {
        b.iter(|| {
            state.restart();
        })
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let mut state = GameState::new(12345, 8);
    state.start();
    state.select(0);
    let mut snap = GameSnapshot::default();

    c.bench_function("snapshot_into_and_fingerprint", |b| {
        b.iter(|| {
            state.snapshot_into(&mut snap);
            black_box(snap.fingerprint())
        })
    });
}

fn bench_observation(c: &mut Criterion) {
    let mut state = GameState::new(12345, 8);
    state.start();
    state.select(3);
    let snap = state.snapshot();

    c.bench_function("build_and_encode_observation", |b| {
        b.iter(|| {
            let obs = build_observation(black_box(&snap), 1, None);
            serde_json::to_vec(&obs).map(|v| v.len()).unwrap_or(0)
        })
    });
}

fn bench_render(c: &mut Criterion) {
    let mut state = GameState::new(12345, 8);
    state.start();
    let view = GameView::default();
    let vp = Viewport::new(100, 30);
    let mut prev = FrameBuffer::new(vp.width, vp.height);
    let mut next = FrameBuffer::new(vp.width, vp.height);
    let mut out = Vec::with_capacity(16 * 1024);
    let snap = state.snapshot();
    view.render_into(&snap, Some(0), vp, &mut prev);

    c.bench_function("render_and_diff_cursor_move", |b| {
        b.iter(|| {
            view.render_into(&snap, Some(black_box(5)), vp, &mut next);
            out.clear();
            encode_diff_into(&prev, &next, &mut out).map(|_| out.len()).unwrap_or(0)
        })
    });
}

criterion_group!(
    benches,
    bench_advance,
    bench_full_game,
    bench_restart,
    bench_snapshot,
    bench_observation,
    bench_render
);
criterion_main!(benches);
