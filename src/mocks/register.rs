use std::sync::Arc;

use parking_lot::Mutex;

use crate::hardware::OutputRegister;

/// A register operation, as observed by the mock.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RegisterCall {
    Activate,
    Deactivate,
}

/// Mock [`OutputRegister`] recording every call, so tests can assert which
/// operation was the most recent one. Clones share the same recording.
#[derive(Clone, Debug, Default)]
pub struct MockRegister {
    calls: Arc<Mutex<Vec<RegisterCall>>>,
}

impl MockRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent register operation, if any.
    pub fn last_call(&self) -> Option<RegisterCall> {
        self.calls.lock().last().copied()
    }

    /// Total number of register operations so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl OutputRegister for MockRegister {
    fn activate(&mut self) {
        self.calls.lock().push(RegisterCall::Activate);
    }

    fn deactivate(&mut self) {
        self.calls.lock().push(RegisterCall::Deactivate);
    }
}
