mod bakery;
mod input;
mod logging;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};

use bakery::{BakeryGame, KEY_BACKSPACE, KEY_ENTER, KEY_ESCAPE};
use input::{ClickState, InputEvent};
use time::{GameTime, TICKS_PER_SECOND};

#[cfg(target_arch = "wasm32")]
type Store = bakery::save::LocalStorage;
#[cfg(not(target_arch = "wasm32"))]
type Store = bakery::save::MemoryStore;

#[cfg(target_arch = "wasm32")]
fn open_store() -> Store {
    bakery::save::LocalStorage::open()
}

#[cfg(not(target_arch = "wasm32"))]
fn open_store() -> Store {
    bakery::save::MemoryStore::default()
}

/// Milliseconds from `performance.now()`, or the wall clock without it.
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or_else(js_sys::Date::now, |p| p.now())
}

/// Map a pointer position onto the grid container and hit-test it.
fn dom_hit_test(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<u16> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let click_x = mouse_x as f64 - rect.left();
    let click_y = mouse_y as f64 - rect.top();
    let hit = cs.hit_test_pixels(click_x, click_y, rect.width(), rect.height());

    log::debug!(
        "click: x={} y={} hit={:?} targets={}",
        mouse_x,
        mouse_y,
        hit,
        cs.targets.len()
    );
    hit
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    logging::init();

    let game = Rc::new(RefCell::new(BakeryGame::<Store>::new(open_store())));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let game_time = Rc::new(RefCell::new(GameTime::new(TICKS_PER_SECOND)));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Mouse/touch click handler
    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let action = {
                let cs = click_state.borrow();
                if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                    return;
                }
                dom_hit_test(mouse_event.x, mouse_event.y, &cs)
            };

            if let Some(action_id) = action {
                game.borrow_mut()
                    .handle_input(&InputEvent::Click(action_id));
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            let event = match key_event.code {
                KeyCode::Char(c) => InputEvent::Key(c),
                KeyCode::Enter => InputEvent::Key(KEY_ENTER),
                KeyCode::Esc => InputEvent::Key(KEY_ESCAPE),
                KeyCode::Backspace => InputEvent::Key(KEY_BACKSPACE),
                _ => return,
            };
            game.borrow_mut().handle_input(&event);
        }
    });

    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            let ticks = game_time.borrow_mut().update(now_ms());
            let mut game = game.borrow_mut();
            game.tick(ticks);

            let size = f.area();
            click_state.borrow_mut().begin_frame(size);
            game.render(f, size, &click_state);
        }
    });

    Ok(())
}
