//! Lifecycle error set.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{self, Error};

/// Accumulates errors from independent tasks.
///
/// Producers do not coordinate; appends are serialized by a mutex.
#[derive(Debug, Clone, Default)]
pub struct ErrorSet {
    errors: Arc<Mutex<Vec<Error>>>,
}

impl ErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, err: Error) {
        self.errors.lock().push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.lock().len()
    }

    /// Rendered messages of everything collected so far.
    pub fn messages(&self) -> Vec<String> {
        self.errors.lock().iter().map(ToString::to_string).collect()
    }

    /// Drain every collected error.
    pub fn take_all(&self) -> Vec<Error> {
        std::mem::take(&mut *self.errors.lock())
    }

    /// Drain into a single aggregate, `Ok` when nothing was collected.
    pub fn into_result(self) -> Result<(), Error> {
        match error::join(self.take_all()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
