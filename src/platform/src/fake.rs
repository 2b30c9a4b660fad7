//! An in-memory `SignalBackend` that behaves like a Linux process without
//! touching the real signal state.

use posix::{Disposition, MaskHow, RealtimeRange, Signal, SignalSet};
use utils::{bail_libc, SysError, SysResult};

use crate::SignalBackend;

#[derive(Debug, Clone)]
pub struct FakeSignals {
    max: Signal,
    realtime: Option<RealtimeRange>,
    reserved: SignalSet,
    // None stands for an installed handler.
    dispositions: Vec<Option<Disposition>>,
    blocked: SignalSet,
    disposition_calls: usize,
}

impl FakeSignals {
    /// `max` is the highest signal number, `reserved` the signals the C
    /// library keeps for itself.
    pub fn new(max: Signal, realtime: Option<RealtimeRange>, reserved: SignalSet) -> Self {
        Self {
            max,
            realtime,
            reserved,
            dispositions: vec![Some(Disposition::Default); max.0 as usize + 1],
            blocked: SignalSet::empty(),
            disposition_calls: 0,
        }
    }

    /// glibc on x86_64: 64 signals, 32 and 33 reserved, realtime `[34, 64]`.
    pub fn linux() -> Self {
        let reserved = [Signal(32), Signal(33)].iter().copied().collect();
        Self::new(
            Signal(64),
            Some(RealtimeRange {
                min: Signal(34),
                max: Signal(64),
            }),
            reserved,
        )
    }

    /// A platform with 31 standard signals and no realtime band.
    pub fn without_realtime() -> Self {
        Self::new(Signal(31), None, SignalSet::empty())
    }

    // KILL and STOP can be queried but not changed.
    fn check_query(&self, sig: Signal) -> SysResult<usize> {
        if sig.0 < 1 || sig > self.max || self.reserved.contains(sig) {
            bail_libc!(libc::EINVAL);
        }
        Ok(sig.0 as usize)
    }

    fn check(&self, sig: Signal) -> SysResult<usize> {
        if sig.is_protected() {
            bail_libc!(libc::EINVAL);
        }
        self.check_query(sig)
    }

    /// Installs a handler for `sig`, the way a language runtime would before
    /// `main`.
    pub fn catch(&mut self, sig: Signal) -> SysResult<()> {
        let i = self.check(sig)?;
        self.dispositions[i] = None;
        Ok(())
    }

    fn deliverable(&self, set: &SignalSet) -> SignalSet {
        set.iter()
            .filter(|sig| *sig <= self.max && !sig.is_protected() && !self.reserved.contains(*sig))
            .collect()
    }

    /// Every signal whose disposition is currently `disposition`.
    pub fn with_disposition(&self, disposition: Disposition) -> SignalSet {
        (1..=self.max.0)
            .map(Signal)
            .filter(|sig| self.check(*sig).is_ok())
            .filter(|sig| self.dispositions[sig.0 as usize] == Some(disposition))
            .collect()
    }

    /// Every signal whose disposition can be changed.
    pub fn changeable(&self) -> SignalSet {
        (1..=self.max.0)
            .map(Signal)
            .filter(|sig| self.check(*sig).is_ok())
            .collect()
    }

    /// Number of disposition writes attempted, rejected ones included.
    pub fn disposition_calls(&self) -> usize {
        self.disposition_calls
    }
}

impl SignalBackend for FakeSignals {
    fn realtime_range(&self) -> Option<RealtimeRange> {
        self.realtime
    }

    fn full_set(&self) -> SignalSet {
        (1..=self.max.0)
            .map(Signal)
            .filter(|sig| !self.reserved.contains(*sig))
            .collect()
    }

    fn set_disposition(&mut self, sig: Signal, disposition: Disposition) -> SysResult<()> {
        self.disposition_calls += 1;
        let i = self.check(sig)?;
        self.dispositions[i] = Some(disposition);
        Ok(())
    }

    fn disposition(&self, sig: Signal) -> SysResult<Option<Disposition>> {
        self.check_query(sig).map(|i| self.dispositions[i])
    }

    fn apply_mask(&mut self, how: MaskHow, set: &SignalSet) -> SysResult<()> {
        let set = self.deliverable(set);
        self.blocked = match how {
            MaskHow::Block => self.blocked.union(&set),
            MaskHow::Unblock => self.blocked.difference(&set),
            MaskHow::SetMask => set,
        };
        Ok(())
    }

    fn blocked(&self) -> SysResult<SignalSet> {
        Ok(self.blocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_signals_are_withheld() {
        let fake = FakeSignals::linux();
        let full = fake.full_set();
        assert_eq!(full.len(), 62);
        assert!(!full.contains(Signal(32)));
        assert!(full.contains(Signal::kill()));
    }

    #[test]
    fn protected_signals_reject_changes() {
        let mut fake = FakeSignals::linux();
        for sig in [Signal::kill(), Signal::stop(), Signal(32), Signal(0), Signal(65)] {
            let err = fake.set_disposition(sig, Disposition::Ignore).unwrap_err();
            assert!(err.is_invalid_argument());
        }
        assert_eq!(fake.disposition_calls(), 5);
        assert!(fake.with_disposition(Disposition::Ignore).is_empty());
    }

    #[test]
    fn protected_signals_can_be_queried() {
        let fake = FakeSignals::linux();
        for (sig, ok) in [
            (Signal::kill(), true),
            (Signal::stop(), true),
            (Signal(libc::SIGHUP), true),
            (Signal(32), false),
            (Signal(0), false),
            (Signal(65), false),
        ] {
            match fake.disposition(sig) {
                Ok(d) => {
                    assert!(ok, "{}", sig);
                    assert_eq!(d, Some(Disposition::Default));
                }
                Err(e) => {
                    assert!(!ok, "{}", sig);
                    assert!(e.is_invalid_argument());
                }
            }
        }
    }

    #[test]
    fn handlers() {
        let mut fake = FakeSignals::linux();
        fake.catch(Signal(libc::SIGSEGV)).unwrap();
        assert_eq!(fake.disposition(Signal(libc::SIGSEGV)).unwrap(), None);
        assert!(fake.catch(Signal::kill()).is_err());
        fake.set_disposition(Signal(libc::SIGSEGV), Disposition::Default).unwrap();
        assert_eq!(
            fake.disposition(Signal(libc::SIGSEGV)).unwrap(),
            Some(Disposition::Default)
        );
    }

    #[test]
    fn mask_drops_unblockable_signals() {
        let mut fake = FakeSignals::linux();
        let full = fake.full_set();
        fake.apply_mask(MaskHow::SetMask, &full).unwrap();
        let blocked = fake.blocked().unwrap();
        assert!(!blocked.contains(Signal::kill()));
        assert!(!blocked.contains(Signal::stop()));
        assert_eq!(blocked.len(), 60);
    }
}
