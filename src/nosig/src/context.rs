use std::borrow::Cow;

use platform::SignalBackend;
use posix::Signal;

use crate::{catalog::SignalCatalog, error::NosigResult, sigspec, working_set::WorkingSet};

/// Everything a command stream operates on: the kernel-visible signal state
/// behind `backend`, the scratch working set and the verbosity counter.
pub struct SignalContext<B: SignalBackend> {
    pub(crate) backend: B,
    pub(crate) catalog: SignalCatalog,
    pub(crate) working_set: WorkingSet,
    pub(crate) verbose: usize,
}

impl<B: SignalBackend> SignalContext<B> {
    pub fn new(backend: B) -> Self {
        let catalog = SignalCatalog::new(backend.realtime_range());
        Self::with_catalog(backend, catalog)
    }

    pub fn with_catalog(backend: B, catalog: SignalCatalog) -> Self {
        Self {
            backend,
            catalog,
            working_set: WorkingSet::default(),
            verbose: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn catalog(&self) -> &SignalCatalog {
        &self.catalog
    }

    pub fn working_set(&self) -> &WorkingSet {
        &self.working_set
    }

    pub fn verbose(&self) -> usize {
        self.verbose
    }

    pub fn sigmax(&self) -> Signal {
        self.catalog.sigmax()
    }

    pub fn resolve(&self, spec: &str) -> NosigResult<Signal> {
        sigspec::resolve(&self.catalog, spec)
    }

    pub fn name_of(&self, sig: Signal) -> Cow<'static, str> {
        sigspec::name_of(&self.catalog, sig)
    }
}
