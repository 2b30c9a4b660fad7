use std::fmt;

use posix::Signal;
use utils::SysError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NosigError {
    /// A signal spec that does not name a signal.
    InvalidSigSpec { spec: String, reason: String },
    /// The kernel refused to change one signal. Never fatal.
    KernelRejected {
        operation: &'static str,
        name: String,
        signal: Signal,
        source: SysError,
    },
    UnsupportedRealtime { command: String },
    UsageError(String),
}

impl NosigError {
    pub fn invalid_spec<S: Into<String>>(spec: &str, reason: S) -> Self {
        Self::InvalidSigSpec {
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for NosigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSigSpec { spec, reason } => {
                write!(f, "invalid signal spec {:?}: {}", spec, reason)
            }
            Self::KernelRejected {
                operation,
                name,
                signal,
                source,
            } => write!(f, "{}({}[{}]) failed: {}", operation, name, signal, source),
            Self::UnsupportedRealtime { command } => write!(
                f,
                "{}: realtime signals are not supported on this platform",
                command
            ),
            Self::UsageError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for NosigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::KernelRejected { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type NosigResult<T> = std::result::Result<T, NosigError>;
