// Integration tests (native) for the `math-flood` engine.
// These tests avoid wasm-specific functionality and exercise pure Rust logic
// so they can run under `cargo test` on the host.

use math_flood::{
    BOARD_SIZE, Cell, ClickOutcome, GameState, INITIAL_SPAWN_INTERVAL_MS, MIN_SPAWN_INTERVAL_MS,
    Op,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn rng() -> SmallRng {
    SmallRng::seed_from_u64(0xF100D)
}

// Empty and occupied coordinates must partition the grid with no overlap.
fn assert_partition(state: &GameState) {
    let mut empty_count = 0usize;
    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            let in_set = state.empty_cells().contains(&(row, col));
            assert_eq!(
                state.cell(row, col).is_empty(),
                in_set,
                "cell ({row},{col}) disagrees with the empty-cell set"
            );
            if in_set {
                empty_count += 1;
            }
        }
    }
    assert_eq!(
        state.empty_cells().len(),
        empty_count,
        "empty-cell set holds duplicates or out-of-range coordinates"
    );
}

#[test]
fn spawning_fills_the_board_and_ends_the_game() {
    let mut rng = rng();
    let mut state = GameState::new(0.0, &mut rng);

    let mut now = 0.0;
    let mut last_empty = state.empty_cells().len();
    while !state.game_over() {
        assert!(now < 120_000.0, "board never filled up");
        now += 50.0;
        state.tick(now, &mut rng);
        let empty = state.empty_cells().len();
        // Spawns only ever consume empty cells, at most one per tick.
        assert!(empty == last_empty || empty + 1 == last_empty);
        last_empty = empty;
        assert_partition(&state);
    }

    assert!(state.empty_cells().is_empty());
    assert!(state.spawn_interval_ms() >= MIN_SPAWN_INTERVAL_MS);

    // Terminal until reset: nothing moves anymore.
    state.tick(now + 10_000.0, &mut rng);
    assert_eq!(state.handle_click(2, 2, now, &mut rng), ClickOutcome::Ignored);
    assert!(state.game_over());
}

#[test]
fn reset_after_game_over_starts_fresh() {
    let mut rng = rng();
    let mut state = GameState::new(0.0, &mut rng);
    let mut now = 0.0;
    while !state.game_over() {
        now += 50.0;
        state.tick(now, &mut rng);
    }

    state.reset(now, &mut rng);
    assert!(!state.game_over());
    assert_eq!(state.score(), 0);
    assert_eq!(state.empty_cells().len(), (BOARD_SIZE as usize).pow(2));
    assert_eq!(state.spawn_interval_ms(), INITIAL_SPAWN_INTERVAL_MS);
    assert!((10..50).contains(&state.target()));
    assert!(state.expression().is_empty());
    assert_partition(&state);
}

// Build a path that evaluates to the current target: 9*q when the target is a
// multiple of nine, 9*q+r otherwise. Targets sit in [10, 50), so q is 1..=5
// and r is 0..=8 -- always valid single digits.
#[test]
fn scripted_match_scores_ten_points_per_cell() {
    let mut rng = rng();
    let mut state = GameState::new(0.0, &mut rng);
    let target = state.target();
    let q = (target / 9) as u8;
    let r = (target % 9) as u8;

    state.place(0, 0, Cell::Digit(9));
    state.place(0, 1, Cell::Op(Op::Mul));
    state.place(0, 2, Cell::Digit(q));
    let path: Vec<(u8, u8)> = if r == 0 {
        vec![(0, 0), (0, 1), (0, 2)]
    } else {
        state.place(0, 3, Cell::Op(Op::Add));
        state.place(0, 4, Cell::Digit(r));
        vec![(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]
    };

    let mut now = 1.0;
    for (i, &(row, col)) in path.iter().enumerate() {
        let outcome = state.handle_click(row, col, now, &mut rng);
        now += 1.0;
        if i + 1 < path.len() {
            assert_eq!(outcome, ClickOutcome::Extended);
        } else {
            let points = path.len() as i64 * 10;
            assert_eq!(outcome, ClickOutcome::Matched { points });
            assert_eq!(state.score(), points);
        }
    }

    // Matched cells return to the empty set; selection resets; target rerolls.
    assert_eq!(state.empty_cells().len(), (BOARD_SIZE as usize).pow(2));
    assert!(state.selection().is_empty());
    assert!(state.expression().is_empty());
    assert!((10..50).contains(&state.target()));
    assert_partition(&state);
}

#[test]
fn selection_rules_hold_through_a_session() {
    let mut rng = rng();
    let mut state = GameState::new(0.0, &mut rng);
    state.place(1, 0, Cell::Digit(7));
    state.place(1, 1, Cell::Op(Op::Sub));
    state.place(1, 2, Cell::Digit(3));
    state.place(1, 3, Cell::Op(Op::Div));

    // Operator-first and empty-cell clicks leave the path untouched.
    assert_eq!(state.handle_click(1, 1, 1.0, &mut rng), ClickOutcome::Rejected);
    assert_eq!(state.handle_click(4, 4, 2.0, &mut rng), ClickOutcome::Ignored);
    assert!(state.selection().is_empty());

    assert_eq!(state.handle_click(1, 0, 3.0, &mut rng), ClickOutcome::Extended);
    assert_eq!(state.handle_click(1, 1, 4.0, &mut rng), ClickOutcome::Extended);
    assert_eq!(state.handle_click(1, 2, 5.0, &mut rng), ClickOutcome::Extended);
    assert_eq!(state.expression(), "7-3");

    // Two operators in a row shake; the board itself never changes.
    assert_eq!(state.handle_click(1, 3, 6.0, &mut rng), ClickOutcome::Rejected);
    assert!(state.is_shaking(1, 3));
    assert_eq!(state.expression(), "7-3");

    // Truncating at the operator drops it and everything after.
    assert_eq!(state.handle_click(1, 1, 7.0, &mut rng), ClickOutcome::Truncated);
    assert_eq!(state.expression(), "7");
    assert_eq!(state.selection(), &[(1, 0)]);
    assert_partition(&state);
}

#[test]
fn live_evaluation_tracks_the_selection() {
    let mut rng = rng();
    let mut state = GameState::new(0.0, &mut rng);
    state.place(0, 0, Cell::Digit(6));
    state.place(0, 1, Cell::Op(Op::Div));
    state.place(0, 2, Cell::Digit(4));

    state.handle_click(0, 0, 1.0, &mut rng);
    assert_eq!(state.live_value(), None); // single digit: not an operation yet
    state.handle_click(0, 1, 2.0, &mut rng);
    assert_eq!(state.live_value(), None); // trailing operator: incomplete
    state.handle_click(0, 2, 3.0, &mut rng);
    assert_eq!(state.live_value(), None); // 6/4 = 1.5: not an integer
    assert_eq!(state.proximity(), None);
}
