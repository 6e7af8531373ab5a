//! Math Flood core crate.
//!
//! A 5x5 board fills over time with digits and arithmetic operators; the
//! player chains cells (digit, operator, digit, ...) into an expression and
//! clears them by matching a random target number. The rules engine in
//! [`game::engine`] is pure Rust and runs natively under `cargo test`; the
//! browser shell in [`game`] drives it through `wasm-bindgen`.

use wasm_bindgen::prelude::*;

mod game;

pub use game::engine::{
    BOARD_SIZE, ClickOutcome, GameState, INITIAL_SPAWN_INTERVAL_MS, MIN_SPAWN_INTERVAL_MS,
    SHAKE_DURATION_MS, SPAWN_SPEEDUP_RATE,
};
pub use game::expr::{Proximity, evaluate, proximity};
pub use game::symbols::{BIG_OPERATORS, Cell, Op, SMALL_OPERATORS, random_symbol};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Launch the game: set up canvas, HUD, and input, then start the frame loop.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    game::start_math_flood()
}

/// Current game state as JSON for the embedding page; "null" before
/// `start_game` has run.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn game_snapshot() -> String {
    game::snapshot_json()
}
