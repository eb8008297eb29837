use wasm_bindgen::prelude::*;

/// Routes panics and `log` records to the browser console.
pub fn init(level: log::LevelFilter) {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));

    if log::set_boxed_logger(Box::new(WebBrowserLogger { level })).is_ok() {
        log::set_max_level(level);
    }
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

struct WebBrowserLogger {
    level: log::LevelFilter,
}

impl ::log::Log for WebBrowserLogger {
    fn enabled(&self, metadata: &::log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &::log::Record) {
        if self.enabled(record.metadata()) {
            let filename = record.file().unwrap_or("Unknown");

            log(&format!(
                "{}: {} ({}:{})",
                record.level(),
                record.args(),
                filename,
                record.line().unwrap_or(0)
            ));
        }
    }

    fn flush(&self) {}
}
