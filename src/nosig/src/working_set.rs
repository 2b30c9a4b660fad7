use platform::SignalBackend;
use posix::{MaskHow, Signal, SignalSet};

use crate::context::SignalContext;

/// The scratch set built up by add/del/empty/fill and read by
/// block/unblock/set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkingSet(SignalSet);

impl WorkingSet {
    pub fn add(&mut self, sig: Signal) {
        if !self.0.add(sig) {
            logger::debug!("add: signal {} cannot be held in a signal set", sig);
        }
    }

    pub fn del(&mut self, sig: Signal) {
        if !self.0.del(sig) {
            logger::debug!("del: signal {} cannot be held in a signal set", sig);
        }
    }

    pub fn empty(&mut self) {
        self.0 = SignalSet::empty();
    }

    pub fn fill(&mut self, full: SignalSet) {
        self.0 = full;
    }

    pub fn contains(&self, sig: Signal) -> bool {
        self.0.contains(sig)
    }

    pub fn members(&self) -> &SignalSet {
        &self.0
    }
}

impl<B: SignalBackend> SignalContext<B> {
    pub fn fill_working_set(&mut self) {
        let full = self.backend.full_set();
        self.working_set.fill(full);
    }

    pub fn block_working_set(&mut self) {
        let set = *self.working_set.members();
        self.apply_mask(MaskHow::Block, &set);
    }

    pub fn unblock_working_set(&mut self) {
        let set = *self.working_set.members();
        self.apply_mask(MaskHow::Unblock, &set);
    }

    pub fn set_mask_to_working_set(&mut self) {
        let set = *self.working_set.members();
        self.apply_mask(MaskHow::SetMask, &set);
    }
}
