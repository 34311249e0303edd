//! `log` backend for the browser: records go to the devtools console.

use log::{LevelFilter, Log, Metadata, Record};

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

const MAX_LEVEL: LevelFilter = LevelFilter::Info;

fn format_record(record: &Record) -> String {
    format!("[{}] {}: {}", record.level(), record.target(), record.args())
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= MAX_LEVEL
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(record);
        #[cfg(target_arch = "wasm32")]
        {
            use log::Level;
            match record.level() {
                Level::Error => web_sys::console::error_1(&line.into()),
                Level::Warn => web_sys::console::warn_1(&line.into()),
                _ => web_sys::console::log_1(&line.into()),
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        eprintln!("{line}");
    }

    fn flush(&self) {}
}

/// Install the console logger. Later calls are no-ops.
pub fn init() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(MAX_LEVEL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn record_format_has_level_and_target() {
        let line = format_record(
            &Record::builder()
                .level(Level::Warn)
                .target("cookie_bakery::save")
                .args(format_args!("save failed"))
                .build(),
        );
        assert_eq!(line, "[WARN] cookie_bakery::save: save failed");
    }

    #[test]
    fn debug_is_filtered() {
        let meta = Metadata::builder().level(Level::Debug).build();
        assert!(!ConsoleLogger.enabled(&meta));
        let meta = Metadata::builder().level(Level::Warn).build();
        assert!(ConsoleLogger.enabled(&meta));
    }
}
