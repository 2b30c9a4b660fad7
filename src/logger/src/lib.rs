pub use log::*;

use once_cell::sync::OnceCell;

static LOGGER: OnceCell<Logger> = OnceCell::new();
static BASE_LEVEL: OnceCell<LevelFilter> = OnceCell::new();

/// Installs the stderr logger. Every record is prefixed with `program`.
pub fn init(program: &'static str, level: LevelFilter) -> Result<(), SetLoggerError> {
    let _ = BASE_LEVEL.set(level);
    let logger = LOGGER.get_or_init(|| Logger { program });
    set_logger(logger).map(|()| set_max_level(level))
}

/// Raises the maximum level to match `verbose` repetitions of the verbose
/// flag. The level never drops below the one passed to `init`.
pub fn set_verbosity(verbose: usize) {
    let base = BASE_LEVEL.get().copied().unwrap_or(LevelFilter::Warn);
    set_max_level(level_for_verbosity(base, verbose));
}

pub fn level_for_verbosity(base: LevelFilter, verbose: usize) -> LevelFilter {
    let requested = match verbose {
        0 => LevelFilter::Off,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    std::cmp::max(base, requested)
}

#[derive(Copy, Clone)]
struct Logger {
    program: &'static str,
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= max_level()
    }
    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let label = match record.level() {
            Level::Error => "error",
            Level::Warn => "warning",
            Level::Info => "info",
            Level::Debug => "debug",
            Level::Trace => "trace",
        };
        eprintln!("{}: {}: {}", self.program, label, record.args());
    }
    fn flush(&self) {}
}
