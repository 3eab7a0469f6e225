//! Shared-resource primitive: a resource plus the mutex that must be
//! held to use it. The Controller uses this to serialize
//! reconfiguration against the Analyzer's use of the DFT engine and the
//! Spectrum renderer (`dftLock`, `rendererLock`).

use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub struct Shared<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap()
    }
}
