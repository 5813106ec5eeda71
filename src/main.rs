mod config;
mod host;
mod input;
mod logging;
mod tapper;
mod time;

use std::cell::RefCell;
use std::io;
use std::rc::{Rc, Weak};

use log::{info, warn};
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsCast;

use config::TapperConfig;
use input::{ClickState, InputEvent};
use tapper::TapperGame;
use time::FrameClock;

/// Cosmetic animation rate. Economy ticks run on their own timer.
const ANIMATION_FPS: u32 = 10;

/// Hit-test a click in client pixels against the targets of the last draw.
fn dom_click_target(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<u16> {
    let document = web_sys::window()?.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    cs.hit_test_pixels(
        mouse_x as f64 - rect.left(),
        mouse_y as f64 - rect.top(),
        rect.width(),
        rect.height(),
    )
}

fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Run `action` on the value behind `target` if it is still alive and not
/// borrowed. Returns whether it ran.
fn with_live<T>(target: &Weak<RefCell<T>>, action: impl FnOnce(&mut T)) -> bool {
    let Some(cell) = target.upgrade() else {
        return false;
    };
    let Ok(mut value) = cell.try_borrow_mut() else {
        return false;
    };
    action(&mut *value);
    true
}

/// Run `action` on the game whenever the window fires `event`.
fn on_window_event(game: &Rc<RefCell<TapperGame>>, event: &str, action: fn(&mut TapperGame)) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let game = Rc::downgrade(game);
    let name = event.to_string();
    let callback = Closure::<dyn FnMut()>::wrap(Box::new(move || {
        if !with_live(&game, action) {
            warn!("{name} ignored: game busy or gone");
        }
    }));
    match window.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref()) {
        // Lives as long as the page.
        Ok(()) => callback.forget(),
        Err(err) => warn!("{event} listener not installed: {err:?}"),
    }
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let config = TapperConfig::default();
    logging::init(config.log_level);

    let theme = host::integrate();
    let mut session = tapper::session::open_browser(&config);
    session.start();
    let game = Rc::new(RefCell::new(TapperGame::new(session, theme.background)));

    // No timer outlives the page; a page restored from the back/forward
    // cache picks passive income up again.
    on_window_event(&game, "pagehide", |g| {
        g.session_mut().stop();
    });
    on_window_event(&game, "pageshow", |g| {
        if !g.session().is_running() {
            g.session_mut().start();
        }
    });

    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;
    info!("pelmeni tapper ready");

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

            let target = {
                let cs = click_state.borrow();
                if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                    return;
                }
                dom_click_target(mouse_event.x, mouse_event.y, &cs)
            };

            if let Some(action_id) = target {
                game.borrow_mut().handle_input(&InputEvent::Click(action_id));
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            let event = match key_event.code {
                KeyCode::Char(c) => InputEvent::Key(c.to_ascii_lowercase()),
                KeyCode::Esc => InputEvent::Cancel,
                _ => return,
            };
            game.borrow_mut().handle_input(&event);
        }
    });

    let mut clock = FrameClock::new(ANIMATION_FPS);
    terminal.draw_web(move |f| {
        let frames = clock.advance(performance_now());
        let mut game = game.borrow_mut();
        game.animate(frames);

        let area = f.area();
        click_state.borrow_mut().begin_frame(area.width, area.height);
        game.render(f, area, &click_state);
    });

    Ok(())
}
