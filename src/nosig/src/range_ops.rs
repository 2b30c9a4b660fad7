use platform::SignalBackend;
use posix::{Disposition, MaskHow, Signal, SignalRange, SignalSet};
use utils::SysError;

use crate::{
    context::SignalContext,
    error::{NosigError, NosigResult},
};

/// A slice of the signal numbers that the `-all` shortcuts operate on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Partition {
    All,
    Standard,
    Realtime,
}

impl Partition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::All => "all",
            Partition::Standard => "std",
            Partition::Realtime => "rt",
        }
    }
}

impl<B: SignalBackend> SignalContext<B> {
    /// The signals in `partition`. Without realtime signals the standard
    /// partition is everything.
    pub fn partition_range(
        &self,
        partition: Partition,
        command: &str,
    ) -> NosigResult<SignalRange> {
        let all = SignalRange::new(Signal(1), self.sigmax());
        match (partition, self.catalog.realtime()) {
            (Partition::All, _) | (Partition::Standard, None) => Ok(all),
            (Partition::Standard, Some(rt)) => Ok(below(rt.min)),
            (Partition::Realtime, Some(rt)) => Ok(rt.as_range()),
            (Partition::Realtime, None) => Err(unsupported(command)),
        }
    }

    /// The signals a mask shortcut over `partition` leaves out of the full
    /// set.
    pub fn partition_exclusion(
        &self,
        partition: Partition,
        command: &str,
    ) -> NosigResult<SignalRange> {
        match (partition, self.catalog.realtime()) {
            (Partition::All, _) | (Partition::Standard, None) => Ok(SignalRange::empty()),
            (Partition::Standard, Some(rt)) => Ok(rt.as_range()),
            (Partition::Realtime, Some(rt)) => Ok(below(rt.min)),
            (Partition::Realtime, None) => Err(unsupported(command)),
        }
    }

    /// Sets the disposition of every signal in `range`. Signals the kernel
    /// refuses to change are reported and skipped. Returns how many were
    /// refused.
    pub fn set_disposition(&mut self, range: SignalRange, disposition: Disposition) -> usize {
        let mut rejected = 0;
        for sig in range.iter() {
            if let Err(e) = self.backend.set_disposition(sig, disposition) {
                self.report_rejection("sigaction", sig, e);
                rejected += 1;
            }
        }
        logger::trace!("{:?} over {:?}: {} rejected", disposition, range, rejected);
        rejected
    }

    /// Applies `how` with the platform's full set minus `excluded`.
    pub fn apply_mask_range(&mut self, how: MaskHow, excluded: SignalRange) {
        let set = self.backend.full_set().without_range(&excluded);
        self.apply_mask(how, &set);
    }

    pub fn apply_mask(&mut self, how: MaskHow, set: &SignalSet) {
        logger::debug!("sigprocmask({:?}, {:?})", how, set);
        if let Err(e) = self.backend.apply_mask(how, set) {
            logger::warn!("sigprocmask({:?}) failed: {}", how, e);
        }
    }

    /// Undoes what the Rust runtime does to signals before `main`: SIGPIPE
    /// is ignored unconditionally, and SIGSEGV/SIGBUS get stack overflow
    /// handlers when they were at their default.
    pub fn restore_runtime_signals(&mut self) {
        let pipe = Signal(libc::SIGPIPE);
        if let Err(e) = self.backend.set_disposition(pipe, Disposition::Default) {
            self.report_rejection("sigaction", pipe, e);
        }
        for sig in [Signal(libc::SIGSEGV), Signal(libc::SIGBUS)] {
            if let Ok(None) = self.backend.disposition(sig) {
                if let Err(e) = self.backend.set_disposition(sig, Disposition::Default) {
                    self.report_rejection("sigaction", sig, e);
                }
            }
        }
    }

    /// EINVAL comes back for protected and reserved signals. It is expected
    /// and only reported when verbose.
    pub(crate) fn should_report(&self, err: &SysError) -> bool {
        !err.is_invalid_argument() || self.verbose > 0
    }

    pub(crate) fn report_rejection(&self, operation: &'static str, sig: Signal, source: SysError) {
        if !self.should_report(&source) {
            return;
        }
        let err = NosigError::KernelRejected {
            operation,
            name: self.name_of(sig).into_owned(),
            signal: sig,
            source,
        };
        logger::warn!("{}", err);
    }
}

fn below(sig: Signal) -> SignalRange {
    SignalRange::new(Signal(1), Signal(sig.0 - 1))
}

fn unsupported(command: &str) -> NosigError {
    NosigError::UnsupportedRealtime {
        command: command.to_string(),
    }
}
