mod backend;
pub mod fake;
mod host;

pub use backend::SignalBackend;
pub use host::HostSignals;
