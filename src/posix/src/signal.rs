use std::fmt;

use utils::bit;

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash)]
pub struct Signal(pub i32);

impl Signal {
    pub const fn kill() -> Self {
        Self(libc::SIGKILL)
    }

    pub const fn stop() -> Self {
        Self(libc::SIGSTOP)
    }

    // is_protected reports whether the kernel refuses to change the
    // disposition or block state of this signal.
    pub fn is_protected(&self) -> bool {
        *self == Self::kill() || *self == Self::stop()
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of signals a `SignalSet` can hold, i.e. signals `1..=SIGNAL_SET_BITS`.
pub const SIGNAL_SET_BITS: i32 = 128;

/// A set of signal numbers. Bit `n - 1` stands for signal `n`.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct SignalSet(u128);

impl SignalSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn is_representable(sig: Signal) -> bool {
        sig.0 > 0 && sig.0 <= SIGNAL_SET_BITS
    }

    fn bit_of(sig: Signal) -> Option<u128> {
        if Self::is_representable(sig) {
            Some(bit::mask_of::<u128>(sig.0 - 1))
        } else {
            None
        }
    }

    /// Inserts `sig`. Returns false when `sig` cannot be held by a set.
    pub fn add(&mut self, sig: Signal) -> bool {
        match Self::bit_of(sig) {
            Some(b) => {
                self.0 |= b;
                true
            }
            None => false,
        }
    }

    /// Removes `sig`. Returns false when `sig` cannot be held by a set.
    pub fn del(&mut self, sig: Signal) -> bool {
        match Self::bit_of(sig) {
            Some(b) => {
                self.0 &= !b;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, sig: Signal) -> bool {
        Self::bit_of(sig).map_or(false, |b| self.0 & b != 0)
    }

    pub fn union(&self, other: &Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn difference(&self, other: &Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn without_range(&self, range: &SignalRange) -> Self {
        let mut set = *self;
        for sig in range.iter() {
            set.del(sig);
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Signal> {
        bit::set_bits(self.0).map(|i| Signal(i + 1))
    }
}

impl fmt::Debug for SignalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|s| s.0)).finish()
    }
}

impl std::iter::FromIterator<Signal> for SignalSet {
    fn from_iter<I: IntoIterator<Item = Signal>>(iter: I) -> Self {
        let mut set = Self::empty();
        for sig in iter {
            set.add(sig);
        }
        set
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Disposition {
    Ignore,
    Default,
}

impl Disposition {
    pub fn as_raw(&self) -> libc::sighandler_t {
        match self {
            Disposition::Ignore => libc::SIG_IGN,
            Disposition::Default => libc::SIG_DFL,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MaskHow {
    Block,
    Unblock,
    SetMask,
}

impl MaskHow {
    pub fn as_raw(&self) -> i32 {
        match self {
            MaskHow::Block => libc::SIG_BLOCK,
            MaskHow::Unblock => libc::SIG_UNBLOCK,
            MaskHow::SetMask => libc::SIG_SETMASK,
        }
    }
}

/// The platform's realtime band `[min, max]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RealtimeRange {
    pub min: Signal,
    pub max: Signal,
}

impl RealtimeRange {
    #[inline]
    pub fn span(&self) -> i32 {
        self.max.0 - self.min.0
    }

    #[inline]
    pub fn contains(&self, sig: Signal) -> bool {
        self.min <= sig && sig <= self.max
    }

    pub fn as_range(&self) -> SignalRange {
        SignalRange::new(self.min, self.max)
    }
}

/// An inclusive range of signal numbers. Empty when `first > last`.
#[derive(PartialEq, Eq, Copy, Clone, Hash)]
pub struct SignalRange {
    pub first: Signal,
    pub last: Signal,
}

impl fmt::Debug for SignalRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.first, self.last)
    }
}

impl SignalRange {
    pub fn new(first: Signal, last: Signal) -> Self {
        Self { first, last }
    }

    pub fn single(sig: Signal) -> Self {
        Self::new(sig, sig)
    }

    pub fn empty() -> Self {
        Self::new(Signal(1), Signal(0))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.first > self.last
    }

    pub fn iter(&self) -> impl Iterator<Item = Signal> {
        (self.first.0..=self.last.0).map(Signal)
    }
}
