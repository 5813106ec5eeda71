//! `log` facade backed by the browser console.
//!
//! Modules log through `log::{debug, info, warn}`; this module routes the
//! records to `console.log` / `console.warn` / `console.error`. Off wasm the
//! sink is a no-op so host-target tests never touch wasm-bindgen imports.

use log::{Level, LevelFilter, Log, Metadata, Record};

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        write_console(record.level(), &format_record(record));
    }

    fn flush(&self) {}
}

/// Install the console logger. A second call keeps the first logger and only
/// adjusts the level.
pub fn init(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

fn format_record(record: &Record) -> String {
    format!("[{}] {}: {}", record.level(), record.target(), record.args())
}

#[cfg(target_arch = "wasm32")]
fn write_console(level: Level, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::Error => web_sys::console::error_1(&value),
        Level::Warn => web_sys::console::warn_1(&value),
        _ => web_sys::console::log_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_console(_level: Level, _line: &str) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_line_carries_level_target_and_message() {
        let record = Record::builder()
            .args(format_args!("save failed: quota"))
            .level(Level::Warn)
            .target("pelmeni_tapper::tapper::save")
            .build();
        assert_eq!(
            format_record(&record),
            "[WARN] pelmeni_tapper::tapper::save: save failed: quota"
        );
    }

    #[test]
    fn init_twice_does_not_panic() {
        init(LevelFilter::Info);
        init(LevelFilter::Debug);
        assert_eq!(log::max_level(), LevelFilter::Debug);
    }
}
