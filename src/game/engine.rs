//! Core game state and transitions.
//!
//! `GameState` owns everything the presentation layer draws: the 5x5 board,
//! the ordered selection path and its expression string, the target number,
//! score, the decaying spawn clock, transient shake markers, and the
//! game-over flag. Every transition is deterministic given the caller's
//! timestamp and RNG, so the whole engine runs natively under `cargo test`
//! with a seeded generator.
//!
//! Timing is plain data: `next_spawn_ms` is an absolute deadline checked by
//! `tick`, and shake markers carry their own start timestamps. Changing
//! conditions (match, reset, game over) rewrite that data directly, so no
//! scheduled callback can act on a state that no longer holds.

use rand::Rng;

use super::expr::{self, Proximity};
use super::symbols::{Cell, random_symbol};

/// Board edge length; the grid is always square.
pub const BOARD_SIZE: u8 = 5;

/// Spawn cadence: start slow, speed up 2% per spawn, never below the floor.
pub const INITIAL_SPAWN_INTERVAL_MS: f64 = 2000.0;
pub const SPAWN_SPEEDUP_RATE: f64 = 0.98;
pub const MIN_SPAWN_INTERVAL_MS: f64 = 500.0;

/// How long a rejected click keeps its cell shaking.
pub const SHAKE_DURATION_MS: f64 = 500.0;

const TARGET_MIN: i64 = 10;
const TARGET_MAX: i64 = 50; // exclusive

const POINTS_PER_CELL: i64 = 10;

/// Transient invalid-input marker on one cell; purely cosmetic.
struct ShakeEffect {
    row: u8,
    col: u8,
    start_ms: f64,
}

/// What a cell click did to the game state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Empty cell, or the game is over.
    Ignored,
    /// The cell was already selected; the path was cut back to just before it.
    Truncated,
    /// Appending would break digit/operator alternation; only a shake marker
    /// was added.
    Rejected,
    /// The path grew by one cell without completing a match.
    Extended,
    /// The expression hit the target: cells cleared, score awarded, new target.
    Matched { points: i64 },
}

pub struct GameState {
    board: Vec<Cell>, // row-major BOARD_SIZE * BOARD_SIZE
    empty_cells: Vec<(u8, u8)>,
    selection: Vec<(u8, u8)>,
    expression: String,
    target: i64,
    score: i64,
    spawn_interval_ms: f64,
    next_spawn_ms: f64,
    shakes: Vec<ShakeEffect>,
    game_over: bool,
}

impl GameState {
    /// Fresh game: empty board, every coordinate spawnable, new target,
    /// first spawn one full interval from `now`.
    pub fn new(now: f64, rng: &mut impl Rng) -> Self {
        let mut empty_cells = Vec::with_capacity((BOARD_SIZE as usize).pow(2));
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                empty_cells.push((row, col));
            }
        }
        Self {
            board: vec![Cell::Empty; (BOARD_SIZE as usize).pow(2)],
            empty_cells,
            selection: Vec::new(),
            expression: String::new(),
            target: random_target(rng),
            score: 0,
            spawn_interval_ms: INITIAL_SPAWN_INTERVAL_MS,
            next_spawn_ms: now + INITIAL_SPAWN_INTERVAL_MS,
            shakes: Vec::new(),
            game_over: false,
        }
    }

    /// Restart from any state, identical to `new`.
    pub fn reset(&mut self, now: f64, rng: &mut impl Rng) {
        *self = GameState::new(now, rng);
    }

    fn idx(row: u8, col: u8) -> usize {
        row as usize * BOARD_SIZE as usize + col as usize
    }

    pub fn cell(&self, row: u8, col: u8) -> Cell {
        self.board[Self::idx(row, col)]
    }

    /// Write a symbol into an empty cell, keeping the empty-cell set in sync.
    /// Returns false (and changes nothing) if the cell is occupied or the
    /// symbol is `Empty`. This is the deterministic half of a spawn; scripted
    /// boards and tests drive it directly.
    pub fn place(&mut self, row: u8, col: u8, cell: Cell) -> bool {
        if cell.is_empty() || !self.cell(row, col).is_empty() {
            return false;
        }
        let slot = self
            .empty_cells
            .iter()
            .position(|&c| c == (row, col))
            .expect("occupied/empty bookkeeping out of sync");
        self.empty_cells.swap_remove(slot);
        self.board[Self::idx(row, col)] = cell;
        if self.empty_cells.is_empty() {
            self.game_over = true;
        }
        true
    }

    /// Advance timers: expire stale shake markers and spawn once the clock
    /// comes due. At most one symbol spawns per call, and the clock rearms
    /// from `now`, so a long pause between frames cannot flood the board.
    pub fn tick(&mut self, now: f64, rng: &mut impl Rng) {
        self.shakes.retain(|s| now - s.start_ms < SHAKE_DURATION_MS);
        if self.game_over || now < self.next_spawn_ms || self.empty_cells.is_empty() {
            return;
        }
        let slot = rng.gen_range(0..self.empty_cells.len());
        let (row, col) = self.empty_cells[slot];
        let placed = self.place(row, col, random_symbol(rng));
        debug_assert!(placed);
        self.spawn_interval_ms =
            (self.spawn_interval_ms * SPAWN_SPEEDUP_RATE).max(MIN_SPAWN_INTERVAL_MS);
        self.next_spawn_ms = now + self.spawn_interval_ms;
    }

    /// Apply a click on `(row, col)` at time `now`.
    pub fn handle_click(
        &mut self,
        row: u8,
        col: u8,
        now: f64,
        rng: &mut impl Rng,
    ) -> ClickOutcome {
        if self.game_over {
            return ClickOutcome::Ignored;
        }
        let cell = self.cell(row, col);
        if cell.is_empty() {
            return ClickOutcome::Ignored;
        }

        // Re-clicking a selected cell deselects from that point on.
        if let Some(pos) = self.selection.iter().position(|&c| c == (row, col)) {
            self.selection.truncate(pos);
            // One ASCII char per cell, so char index == byte index.
            self.expression.truncate(pos);
            return ClickOutcome::Truncated;
        }

        // The path alternates digit, operator, digit, ... starting on a digit.
        let extends_alternation = match self.selection.last() {
            None => cell.is_digit(),
            Some(&(lr, lc)) => self.cell(lr, lc).is_op() != cell.is_op(),
        };
        if !extends_alternation {
            self.shakes.clear(); // a new rejection replaces any live shake
            self.shakes.push(ShakeEffect {
                row,
                col,
                start_ms: now,
            });
            return ClickOutcome::Rejected;
        }

        let points = self.selection.len() as i64 * POINTS_PER_CELL + POINTS_PER_CELL;
        self.selection.push((row, col));
        if let Some(symbol) = cell.symbol() {
            self.expression.push(symbol);
        }

        if expr::evaluate(&self.expression) == Some(self.target) {
            self.score += points;
            for &(r, c) in &self.selection {
                self.board[Self::idx(r, c)] = Cell::Empty;
                self.empty_cells.push((r, c));
            }
            self.selection.clear();
            self.expression.clear();
            self.target = random_target(rng);
            return ClickOutcome::Matched { points };
        }
        ClickOutcome::Extended
    }

    /// Drop the current selection without touching board, score, or clock.
    pub fn clear_expression(&mut self) {
        self.selection.clear();
        self.expression.clear();
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn selection(&self) -> &[(u8, u8)] {
        &self.selection
    }

    pub fn is_selected(&self, row: u8, col: u8) -> bool {
        self.selection.contains(&(row, col))
    }

    pub fn is_shaking(&self, row: u8, col: u8) -> bool {
        self.shakes.iter().any(|s| s.row == row && s.col == col)
    }

    pub fn empty_cells(&self) -> &[(u8, u8)] {
        &self.empty_cells
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn spawn_interval_ms(&self) -> f64 {
        self.spawn_interval_ms
    }

    /// Live evaluation of the current expression, if it already resolves to
    /// an integer.
    pub fn live_value(&self) -> Option<i64> {
        expr::evaluate(&self.expression)
    }

    /// Proximity bucket for the live evaluation; `None` while the expression
    /// is invalid or incomplete.
    pub fn proximity(&self) -> Option<Proximity> {
        self.live_value().map(|v| expr::proximity(v, self.target))
    }
}

fn random_target(rng: &mut impl Rng) -> i64 {
    rng.gen_range(TARGET_MIN..TARGET_MAX)
}

/// Render-ready view of the whole game state for an embedding page.
#[cfg(feature = "serde")]
#[derive(serde::Serialize)]
pub struct Snapshot {
    /// Rows of display symbols; empty string for an empty cell.
    pub board: Vec<Vec<String>>,
    pub selected: Vec<(u8, u8)>,
    pub shaking: Vec<(u8, u8)>,
    pub expression: String,
    pub value: Option<i64>,
    pub proximity: Option<Proximity>,
    pub target: i64,
    pub score: i64,
    pub game_over: bool,
}

#[cfg(feature = "serde")]
impl GameState {
    pub fn snapshot(&self) -> Snapshot {
        let board = (0..BOARD_SIZE)
            .map(|row| {
                (0..BOARD_SIZE)
                    .map(|col| {
                        self.cell(row, col)
                            .symbol()
                            .map(String::from)
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();
        Snapshot {
            board,
            selected: self.selection.clone(),
            shaking: self.shakes.iter().map(|s| (s.row, s.col)).collect(),
            expression: self.expression.clone(),
            value: self.live_value(),
            proximity: self.proximity(),
            target: self.target,
            score: self.score,
            game_over: self.game_over,
        }
    }
}
