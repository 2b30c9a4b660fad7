use posix::{Disposition, MaskHow, RealtimeRange, Signal, SignalSet};
use utils::SysResult;

/// Access to the process's signal dispositions and block mask.
pub trait SignalBackend {
    /// The realtime band, or None when the platform has no realtime signals.
    fn realtime_range(&self) -> Option<RealtimeRange>;

    /// The set produced by filling a platform signal set. Signals reserved
    /// by the C library are missing from it.
    fn full_set(&self) -> SignalSet;

    fn set_disposition(&mut self, sig: Signal, disposition: Disposition) -> SysResult<()>;

    /// Current disposition of `sig`; None when a handler is installed.
    fn disposition(&self, sig: Signal) -> SysResult<Option<Disposition>>;

    fn apply_mask(&mut self, how: MaskHow, set: &SignalSet) -> SysResult<()>;

    fn blocked(&self) -> SysResult<SignalSet>;

    fn describe(&self, sig: Signal) -> String {
        format!("Signal {}", sig.0)
    }
}
