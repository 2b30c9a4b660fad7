use std::{borrow::Cow, str::FromStr};

use nix::sys::signal::Signal as HostSignal;
use once_cell::sync::Lazy;
use posix::{RealtimeRange, Signal};

pub const UNKNOWN_SIGNAL_NAME: &str = "SIG???";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub number: Signal,
}

enum Source {
    Native,
    AliasOf(&'static str),
}

// Sorted so numbers come out ascending on x86_64 Linux. An alias is listed
// after the name it stands for so reverse lookups prefer the latter.
// SIGRTMIN/SIGRTMAX are not here: they move at run time.
static CATALOG_NAMES: &[(&str, Source)] = &[
    ("SIGHUP", Source::Native),
    ("SIGINT", Source::Native),
    ("SIGQUIT", Source::Native),
    ("SIGILL", Source::Native),
    ("SIGTRAP", Source::Native),
    ("SIGABRT", Source::Native),
    ("SIGIOT", Source::AliasOf("SIGABRT")),
    ("SIGBUS", Source::Native),
    ("SIGFPE", Source::Native),
    ("SIGKILL", Source::Native),
    ("SIGUSR1", Source::Native),
    ("SIGSEGV", Source::Native),
    ("SIGUSR2", Source::Native),
    ("SIGPIPE", Source::Native),
    ("SIGALRM", Source::Native),
    ("SIGTERM", Source::Native),
    ("SIGSTKFLT", Source::Native),
    ("SIGCHLD", Source::Native),
    ("SIGCONT", Source::Native),
    ("SIGSTOP", Source::Native),
    ("SIGTSTP", Source::Native),
    ("SIGTTIN", Source::Native),
    ("SIGTTOU", Source::Native),
    ("SIGURG", Source::Native),
    ("SIGXCPU", Source::Native),
    ("SIGXFSZ", Source::Native),
    ("SIGVTALRM", Source::Native),
    ("SIGPROF", Source::Native),
    ("SIGWINCH", Source::Native),
    ("SIGIO", Source::Native),
    ("SIGPOLL", Source::AliasOf("SIGIO")),
    ("SIGPWR", Source::Native),
    ("SIGSYS", Source::Native),
    ("SIGEMT", Source::Native),
    ("SIGINFO", Source::Native),
];

// Names the host does not know are dropped here, once.
static STANDARD_SIGNALS: Lazy<Vec<CatalogEntry>> = Lazy::new(|| {
    CATALOG_NAMES
        .iter()
        .filter_map(|(name, source)| {
            let native = match source {
                Source::Native => *name,
                Source::AliasOf(target) => *target,
            };
            HostSignal::from_str(native).ok().map(|sig| CatalogEntry {
                name: *name,
                number: Signal(sig as i32),
            })
        })
        .collect()
});

/// Strips the optional leading "SIG" of a signal name.
pub fn strip_sig(name: &str) -> &str {
    name.strip_prefix("SIG").unwrap_or(name)
}

#[derive(Debug, Clone)]
pub struct SignalCatalog {
    entries: Vec<CatalogEntry>,
    realtime: Option<RealtimeRange>,
}

impl SignalCatalog {
    pub fn new(realtime: Option<RealtimeRange>) -> Self {
        Self::with_entries(STANDARD_SIGNALS.clone(), realtime)
    }

    pub fn with_entries(entries: Vec<CatalogEntry>, realtime: Option<RealtimeRange>) -> Self {
        Self { entries, realtime }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn realtime(&self) -> Option<RealtimeRange> {
        self.realtime
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<Signal> {
        let name = strip_sig(name);
        self.entries
            .iter()
            .find(|e| strip_sig(e.name) == name)
            .map(|e| e.number)
    }

    /// Returns the preferred name of `sig`.
    ///
    /// Realtime signals are named relative to the closer bound of the band;
    /// a signal exactly in the middle is named relative to SIGRTMIN.
    pub fn lookup_by_number(&self, sig: Signal) -> Cow<'static, str> {
        if let Some(e) = self.entries.iter().find(|e| e.number == sig) {
            return Cow::Borrowed(e.name);
        }
        match self.realtime {
            Some(rt) if rt.contains(sig) => {
                let from_min = sig.0 - rt.min.0;
                let from_max = rt.max.0 - sig.0;
                let name = match (from_min, from_max) {
                    (0, _) => "SIGRTMIN".to_string(),
                    (_, 0) => "SIGRTMAX".to_string(),
                    (k, m) if k <= m => format!("SIGRTMIN+{}", k),
                    (_, m) => format!("SIGRTMAX-{}", m),
                };
                Cow::Owned(name)
            }
            _ => Cow::Borrowed(UNKNOWN_SIGNAL_NAME),
        }
    }

    /// The largest signal number in use.
    pub fn sigmax(&self) -> Signal {
        match self.realtime {
            Some(rt) => rt.max,
            None => self
                .entries
                .iter()
                .map(|e| e.number)
                .max()
                .unwrap_or(Signal(1)),
        }
    }
}
