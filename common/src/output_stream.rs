use std::sync::Arc;

use parking_lot::Mutex;

/// Thread-safe append-only record of values emitted by a running job.
///
/// Clones share the same storage, so a job can write while the owner reads.
#[derive(Debug)]
pub struct OutputStream<T = String>(Arc<Mutex<Vec<T>>>);

impl<T> Default for OutputStream<T> {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }
}

impl<T> Clone for OutputStream<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> OutputStream<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write<S: Into<T>>(&self, value: S) {
        self.0.lock().push(value.into());
    }

    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut self.0.lock())
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

impl<T: Clone> OutputStream<T> {
    pub fn snapshot(&self) -> Vec<T> {
        self.0.lock().clone()
    }
}
