//! Embedding-container integration.
//!
//! When the page runs inside a Telegram Mini App, tell the container we are
//! ready, ask it to expand, and borrow its background colour. Everything
//! here is cosmetic: the game plays the same without a container, and
//! every failure is logged and ignored.

use ratzilla::ratatui::style::Color;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HostTheme {
    pub background: Option<Color>,
}

/// `#rrggbb` or `#rgb`, case-insensitive. The leading `#` is optional.
#[cfg(any(target_arch = "wasm32", test))]
pub fn parse_hex_color(raw: &str) -> Option<Color> {
    let hex = raw.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some(Color::Rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        3 => {
            let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
            Some(Color::Rgb(short(0)?, short(1)?, short(2)?))
        }
        _ => None,
    }
}

#[cfg(target_arch = "wasm32")]
pub fn integrate() -> HostTheme {
    use log::{debug, info};

    let Some(app) = web_app::find() else {
        debug!("no embedding container");
        return HostTheme::default();
    };
    web_app::call(&app, "ready");
    web_app::call(&app, "expand");
    let background = web_app::background_color(&app)
        .as_deref()
        .and_then(parse_hex_color);
    info!("embedded in Telegram WebApp (background: {background:?})");
    HostTheme { background }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn integrate() -> HostTheme {
    HostTheme::default()
}

#[cfg(target_arch = "wasm32")]
mod web_app {
    use js_sys::{Function, Reflect};
    use log::warn;
    use wasm_bindgen::{JsCast, JsValue};

    fn property(target: &JsValue, name: &str) -> Option<JsValue> {
        let value = Reflect::get(target, &JsValue::from_str(name)).ok()?;
        (!value.is_undefined() && !value.is_null()).then_some(value)
    }

    /// `window.Telegram.WebApp`, if present.
    pub fn find() -> Option<JsValue> {
        let window = JsValue::from(web_sys::window()?);
        let telegram = property(&window, "Telegram")?;
        property(&telegram, "WebApp")
    }

    pub fn call(app: &JsValue, method: &str) {
        let Some(function) = property(app, method) else {
            return;
        };
        let Some(function) = function.dyn_ref::<Function>() else {
            return;
        };
        if let Err(err) = function.call0(app) {
            warn!("WebApp.{method}() failed: {err:?}");
        }
    }

    pub fn background_color(app: &JsValue) -> Option<String> {
        let params = property(app, "themeParams")?;
        property(&params, "bg_color")?.as_string()
    }
}
