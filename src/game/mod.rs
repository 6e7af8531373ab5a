//! Math Flood gameplay: a 5x5 grid fills with digits and operators on a
//! decaying timer; the player chains cells into an arithmetic expression and
//! clears them by hitting the target value.
//!
//! This module is the browser shell. All rules live in [`engine`]; here we
//! own the canvas, the HUD overlays, the input listeners, and the
//! `requestAnimationFrame` loop that drives [`engine::GameState::tick`] with
//! `performance.now()` timestamps.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, window};

pub mod engine;
pub mod expr;
pub mod symbols;

use engine::{BOARD_SIZE, GameState};
use expr::Proximity;

const CANVAS_PX: u32 = 480;

/// Runtime state owned by the browser shell.
struct UiState {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    game: GameState,
    rng: SmallRng,
}

thread_local! {
    static GAME_STATE: std::cell::RefCell<Option<UiState>> = std::cell::RefCell::new(None);
}

fn now_ms() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

pub fn start_math_flood() -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    // Create / reuse the board canvas.
    let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id("mf-board-canvas") {
        el.dyn_into()?
    } else {
        let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
        c.set_id("mf-board-canvas");
        c.set_width(CANVAS_PX);
        c.set_height(CANVAS_PX);
        c.set_attribute("style", "position:fixed; left:50%; top:45%; transform:translate(-50%,-50%); box-shadow:0 0 32px 0 rgba(0,0,0,0.18); border-radius:18px; border:2px solid #222; background:#181818; z-index:20; cursor:pointer;").ok();
        doc.body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .append_child(&c)?;
        c
    };
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;
    ctx.set_font("40px 'Fira Code', monospace");
    ctx.set_text_align("center");

    let now = win.performance().map(|p| p.now()).unwrap_or(0.0);
    let mut rng = SmallRng::from_entropy();
    let game = GameState::new(now, &mut rng);
    GAME_STATE.with(|cell| {
        cell.replace(Some(UiState {
            canvas: canvas.clone(),
            ctx,
            game,
            rng,
        }))
    });

    // HUD overlays (target / score / expression), created once.
    if doc.get_element_by_id("mf-target").is_none() {
        if let Some(body) = doc.body() {
            let div = doc.create_element("div")?;
            div.set_id("mf-target");
            div.set_text_content(Some("Target: -"));
            div.set_attribute("style", "position:fixed; top:10px; left:50%; transform:translateX(-50%); font-family:'Fira Code', monospace; font-size:20px; padding:4px 12px; background:rgba(0,0,0,0.42); border:1px solid #333; border-radius:6px; color:#60a5fa; z-index:45; letter-spacing:0.5px;").ok();
            body.append_child(&div)?;
        }
    }
    if doc.get_element_by_id("mf-score").is_none() {
        if let Some(body) = doc.body() {
            let div = doc.create_element("div")?;
            div.set_id("mf-score");
            div.set_text_content(Some("Score: 0"));
            div.set_attribute("style", "position:fixed; top:10px; left:12px; font-family:'Fira Code', monospace; font-size:15px; padding:4px 8px; background:rgba(0,0,0,0.42); border:1px solid #333; border-radius:6px; color:#ffd166; z-index:45; letter-spacing:0.5px;").ok();
            body.append_child(&div)?;
        }
    }
    if doc.get_element_by_id("mf-expr").is_none() {
        if let Some(body) = doc.body() {
            let div = doc.create_element("div")?;
            div.set_id("mf-expr");
            div.set_text_content(Some(""));
            div.set_attribute("style", &expr_style("#9ca3af")).ok();
            body.append_child(&div)?;
        }
    }

    // Clear / reset buttons below the board.
    if doc.get_element_by_id("mf-clear").is_none() {
        if let Some(body) = doc.body() {
            let btn = doc.create_element("button")?;
            btn.set_id("mf-clear");
            btn.set_text_content(Some("Clear Expression"));
            btn.set_attribute("style", &button_style(-90, "#374151", "#4b5563")).ok();
            let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
                GAME_STATE.with(|cell| {
                    if let Some(st) = cell.borrow_mut().as_mut() {
                        st.game.clear_expression();
                    }
                });
            }) as Box<dyn FnMut(_)>);
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
            body.append_child(&btn)?;
        }
    }
    if doc.get_element_by_id("mf-reset").is_none() {
        if let Some(body) = doc.body() {
            let btn = doc.create_element("button")?;
            btn.set_id("mf-reset");
            btn.set_text_content(Some("Reset Game"));
            btn.set_attribute("style", &button_style(90, "#7f1d1d", "#991b1b")).ok();
            let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
                let now = now_ms();
                GAME_STATE.with(|cell| {
                    if let Some(st) = cell.borrow_mut().as_mut() {
                        let rng = &mut st.rng;
                        st.game.reset(now, rng);
                    }
                });
            }) as Box<dyn FnMut(_)>);
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
            body.append_child(&btn)?;
        }
    }

    // Board clicks: map canvas-local coordinates to a tile and feed the engine.
    {
        let canvas_click = canvas.clone();
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            let x = evt.offset_x() as f64;
            let y = evt.offset_y() as f64;
            let now = now_ms();
            GAME_STATE.with(|cell| {
                if let Some(st) = cell.borrow_mut().as_mut() {
                    let cw = canvas_click.width() as f64 / BOARD_SIZE as f64;
                    let ch = canvas_click.height() as f64 / BOARD_SIZE as f64;
                    if x >= 0.0
                        && y >= 0.0
                        && x < canvas_click.width() as f64
                        && y < canvas_click.height() as f64
                    {
                        let col = (x / cw).floor() as u8;
                        let row = (y / ch).floor() as u8;
                        let rng = &mut st.rng;
                        let _ = st.game.handle_click(row, col, now, rng);
                    }
                }
            });
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Escape drops the current selection, matching the clear button.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            if evt.key() == "Escape" {
                GAME_STATE.with(|cell| {
                    if let Some(st) = cell.borrow_mut().as_mut() {
                        st.game.clear_expression();
                    }
                });
            }
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    start_frame_loop();
    Ok(())
}

fn expr_style(color: &str) -> String {
    format!(
        "position:fixed; top:48px; left:50%; transform:translateX(-50%); font-family:'Fira Code', monospace; font-size:17px; padding:4px 12px; background:rgba(0,0,0,0.42); border:1px solid #333; border-radius:6px; color:{color}; z-index:45;"
    )
}

fn button_style(offset_px: i32, bg: &str, border: &str) -> String {
    format!(
        "position:fixed; bottom:40px; left:calc(50% + {offset_px}px); transform:translateX(-50%); font-family:'Fira Code', monospace; font-size:14px; padding:8px 14px; background:{bg}; color:#e5e7eb; border:1px solid {border}; border-radius:8px; cursor:pointer; z-index:45;"
    )
}

type FrameCallback = std::rc::Rc<std::cell::RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_frame_loop() {
    let f: FrameCallback = std::rc::Rc::new(std::cell::RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        GAME_STATE.with(|state_cell| {
            if let Some(state) = state_cell.borrow_mut().as_mut() {
                frame(state, ts);
            }
        });
        if let Some(w) = window() {
            let _ =
                w.request_animation_frame(f.borrow().as_ref().unwrap().as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(w) = window() {
        let _ = w.request_animation_frame(g.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}

fn frame(state: &mut UiState, now: f64) {
    let rng = &mut state.rng;
    state.game.tick(now, rng);
    render_board(&state.ctx, &state.canvas, &state.game);

    // Keep DOM overlays in sync each frame.
    if let Some(doc) = window().and_then(|w| w.document()) {
        if let Some(el) = doc.get_element_by_id("mf-target") {
            el.set_text_content(Some(&format!("Target: {}", state.game.target())));
        }
        if let Some(el) = doc.get_element_by_id("mf-score") {
            el.set_text_content(Some(&format!("Score: {}", state.game.score())));
        }
        if let Some(el) = doc.get_element_by_id("mf-expr") {
            let text = match state.game.live_value() {
                Some(v) => format!("{} = {}", state.game.expression(), v),
                None => state.game.expression().to_string(),
            };
            el.set_text_content(Some(&text));
            let color = match state.game.proximity() {
                Some(Proximity::Near) => "#22c55e",
                Some(Proximity::Close) => "#eab308",
                Some(Proximity::Far) => "#ef4444",
                None => "#9ca3af",
            };
            el.set_attribute("style", &expr_style(color)).ok();
        }
    }
}

fn render_board(ctx: &CanvasRenderingContext2d, canvas: &HtmlCanvasElement, game: &GameState) {
    let cell_w = canvas.width() as f64 / BOARD_SIZE as f64;
    let cell_h = canvas.height() as f64 / BOARD_SIZE as f64;

    ctx.set_fill_style_str("#181818");
    ctx.fill_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);

    // Cell backgrounds: selected tiles glow, shaking tiles flash red.
    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            let px = col as f64 * cell_w;
            let py = row as f64 * cell_h;
            if game.is_selected(row, col) {
                ctx.set_fill_style_str("#1d4ed8");
                ctx.fill_rect(px + 2.0, py + 2.0, cell_w - 4.0, cell_h - 4.0);
            } else if game.is_shaking(row, col) {
                ctx.set_fill_style_str("rgba(239,68,68,0.35)");
                ctx.fill_rect(px + 2.0, py + 2.0, cell_w - 4.0, cell_h - 4.0);
            }
        }
    }

    // Grid lines
    ctx.set_stroke_style_str("#222");
    ctx.set_line_width(2.0);
    for x in 0..=BOARD_SIZE {
        let fx = x as f64 * cell_w;
        line(ctx, fx, 0.0, fx, canvas.height() as f64);
    }
    for y in 0..=BOARD_SIZE {
        let fy = y as f64 * cell_h;
        line(ctx, 0.0, fy, canvas.width() as f64, fy);
    }

    // Symbols, layered stroke+fill so they stay readable on any tile color.
    ctx.set_shadow_color("rgba(0,0,0,0.55)");
    ctx.set_shadow_blur(10.0);
    ctx.set_shadow_offset_x(0.0);
    ctx.set_shadow_offset_y(3.0);
    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            let cell = game.cell(row, col);
            let Some(symbol) = cell.symbol() else { continue };
            let cx = col as f64 * cell_w + cell_w / 2.0;
            let cy = row as f64 * cell_h + cell_h / 2.0 + 14.0;
            let text = symbol.to_string();
            ctx.set_line_width(6.0);
            ctx.set_stroke_style_str("rgba(0,0,0,0.85)");
            ctx.stroke_text(&text, cx, cy).ok();
            ctx.set_shadow_blur(0.0);
            ctx.set_fill_style_str(if cell.is_op() { "#fb923c" } else { "#ffffff" });
            ctx.fill_text(&text, cx, cy).ok();
            ctx.set_shadow_blur(10.0);
        }
    }
    ctx.set_shadow_blur(0.0);
    ctx.set_shadow_offset_y(0.0);

    if game.game_over() {
        ctx.set_fill_style_str("rgba(0,0,0,0.55)");
        ctx.fill_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
        ctx.set_fill_style_str("#ffffff");
        ctx.set_font("52px 'Fira Code', monospace");
        ctx.set_line_width(6.0);
        ctx.set_stroke_style_str("#000000");
        let cx = canvas.width() as f64 / 2.0;
        let cy = canvas.height() as f64 / 2.0;
        ctx.stroke_text("GAME OVER", cx, cy).ok();
        ctx.fill_text("GAME OVER", cx, cy).ok();
        ctx.set_font("18px 'Fira Code', monospace");
        ctx.fill_text(&format!("Final Score: {}", game.score()), cx, cy + 40.0)
            .ok();
        ctx.fill_text("Reset Game to play again", cx, cy + 68.0).ok();
        ctx.set_font("40px 'Fira Code', monospace");
    }
}

fn line(ctx: &CanvasRenderingContext2d, x1: f64, y1: f64, x2: f64, y2: f64) {
    ctx.begin_path();
    ctx.move_to(x1, y1);
    ctx.line_to(x2, y2);
    ctx.stroke();
}

/// JSON view of the current game state for the embedding page.
#[cfg(feature = "serde_json")]
pub fn snapshot_json() -> String {
    GAME_STATE.with(|cell| {
        cell.borrow()
            .as_ref()
            .and_then(|st| serde_json::to_string(&st.game.snapshot()).ok())
            .unwrap_or_else(|| String::from("null"))
    })
}
