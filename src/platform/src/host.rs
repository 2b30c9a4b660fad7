use std::{ffi::CStr, mem::MaybeUninit};

use nix::errno::Errno;
use once_cell::sync::Lazy;
use posix::{Disposition, MaskHow, RealtimeRange, Signal, SignalSet, SIGNAL_SET_BITS};
use utils::{SysError, SysResult};

use crate::SignalBackend;

static REALTIME_RANGE: Lazy<Option<RealtimeRange>> = Lazy::new(query_realtime_range);
static FULL_SET: Lazy<SignalSet> = Lazy::new(|| RawSigSet::filled().to_set());

#[cfg(target_os = "linux")]
fn query_realtime_range() -> Option<RealtimeRange> {
    // The C library may reserve the low end of the band for itself, so these
    // are only known at run time.
    let (min, max) = unsafe { (libc::SIGRTMIN(), libc::SIGRTMAX()) };
    if min <= 0 || max < min {
        return None;
    }
    Some(RealtimeRange {
        min: Signal(min),
        max: Signal(max),
    })
}

#[cfg(not(target_os = "linux"))]
fn query_realtime_range() -> Option<RealtimeRange> {
    None
}

struct RawSigSet(libc::sigset_t);

impl RawSigSet {
    fn empty() -> Self {
        let mut raw = MaybeUninit::<libc::sigset_t>::uninit();
        unsafe {
            libc::sigemptyset(raw.as_mut_ptr());
            Self(raw.assume_init())
        }
    }

    fn filled() -> Self {
        let mut raw = MaybeUninit::<libc::sigset_t>::uninit();
        unsafe {
            libc::sigfillset(raw.as_mut_ptr());
            Self(raw.assume_init())
        }
    }

    fn from_set(set: &SignalSet) -> Self {
        let mut raw = Self::empty();
        for sig in set.iter() {
            if unsafe { libc::sigaddset(&mut raw.0, sig.0) } != 0 {
                logger::trace!("sigaddset({}) rejected", sig);
            }
        }
        raw
    }

    fn to_set(&self) -> SignalSet {
        (1..=SIGNAL_SET_BITS)
            .map(Signal)
            .filter(|sig| unsafe { libc::sigismember(&self.0, sig.0) } == 1)
            .collect()
    }
}

/// The calling process's real signal state.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostSignals;

impl SignalBackend for HostSignals {
    fn realtime_range(&self) -> Option<RealtimeRange> {
        *REALTIME_RANGE
    }

    fn full_set(&self) -> SignalSet {
        *FULL_SET
    }

    fn set_disposition(&mut self, sig: Signal, disposition: Disposition) -> SysResult<()> {
        let mut sa: libc::sigaction = unsafe { std::mem::zeroed() };
        unsafe { libc::sigfillset(&mut sa.sa_mask) };
        sa.sa_sigaction = disposition.as_raw();
        let ret = unsafe { libc::sigaction(sig.0, &sa, std::ptr::null_mut()) };
        Errno::result(ret)
            .map(drop)
            .map_err(SysError::from_nix_errno)
    }

    fn disposition(&self, sig: Signal) -> SysResult<Option<Disposition>> {
        let mut sa: libc::sigaction = unsafe { std::mem::zeroed() };
        let ret = unsafe { libc::sigaction(sig.0, std::ptr::null(), &mut sa) };
        Errno::result(ret).map_err(SysError::from_nix_errno)?;
        Ok(match sa.sa_sigaction {
            libc::SIG_IGN => Some(Disposition::Ignore),
            libc::SIG_DFL => Some(Disposition::Default),
            _ => None,
        })
    }

    fn apply_mask(&mut self, how: MaskHow, set: &SignalSet) -> SysResult<()> {
        let raw = RawSigSet::from_set(set);
        let ret = unsafe { libc::sigprocmask(how.as_raw(), &raw.0, std::ptr::null_mut()) };
        Errno::result(ret)
            .map(drop)
            .map_err(SysError::from_nix_errno)
    }

    fn blocked(&self) -> SysResult<SignalSet> {
        let mut old = RawSigSet::empty();
        let ret = unsafe { libc::sigprocmask(libc::SIG_BLOCK, std::ptr::null(), &mut old.0) };
        Errno::result(ret).map_err(SysError::from_nix_errno)?;
        Ok(old.to_set())
    }

    fn describe(&self, sig: Signal) -> String {
        let desc = unsafe { libc::strsignal(sig.0) };
        if desc.is_null() {
            return format!("Unknown signal {}", sig.0);
        }
        unsafe { CStr::from_ptr(desc) }
            .to_string_lossy()
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_os = "linux")]
    #[test]
    fn realtime_range_is_queried() {
        let rt = HostSignals.realtime_range().unwrap();
        assert!(rt.min <= rt.max);
        assert!(rt.min.0 > libc::SIGSYS);
        assert!(HostSignals.full_set().contains(rt.max));
    }

    #[test]
    fn full_set_holds_standard_signals() {
        let full = HostSignals.full_set();
        assert!(full.contains(Signal(libc::SIGINT)));
        assert!(full.contains(Signal(libc::SIGUSR1)));
        assert!(!full.contains(Signal(0)));
    }

    #[test]
    fn protected_disposition_is_rejected() {
        let err = HostSignals
            .set_disposition(Signal::kill(), Disposition::Ignore)
            .unwrap_err();
        assert!(err.is_invalid_argument());
        let err = HostSignals
            .set_disposition(Signal(0), Disposition::Default)
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn disposition_round_trip() {
        let mut host = HostSignals;
        let usr1 = Signal(libc::SIGUSR1);
        host.set_disposition(usr1, Disposition::Ignore).unwrap();
        assert_eq!(host.disposition(usr1).unwrap(), Some(Disposition::Ignore));
        host.set_disposition(usr1, Disposition::Default).unwrap();
        assert_eq!(host.disposition(usr1).unwrap(), Some(Disposition::Default));
    }

    #[test]
    fn mask_of_calling_thread() {
        let mut host = HostSignals;
        let usr2 = Signal(libc::SIGUSR2);
        let set = std::iter::once(usr2).collect::<SignalSet>();
        host.apply_mask(MaskHow::Block, &set).unwrap();
        assert!(host.blocked().unwrap().contains(usr2));
        host.apply_mask(MaskHow::Unblock, &set).unwrap();
        assert!(!host.blocked().unwrap().contains(usr2));
    }

    #[test]
    fn kill_is_never_blocked() {
        let mut host = HostSignals;
        let set = std::iter::once(Signal::kill()).collect::<SignalSet>();
        host.apply_mask(MaskHow::Block, &set).unwrap();
        assert!(!host.blocked().unwrap().contains(Signal::kill()));
    }
}
