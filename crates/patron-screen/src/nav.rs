#![forbid(unsafe_code)]

//! Navigation capability.
//!
//! Project selection hands off to an external router, carrying the selected
//! record as transient state attached to the navigation event. The payload
//! is not persisted and is not part of any entity store.

use std::sync::Mutex;

use patron_core::Record;

/// Fire-and-forget navigation with transient state.
pub trait Navigator {
    fn navigate(&self, path: &str, state: Record);
}

/// Navigator double that records every navigation request.
#[derive(Default)]
pub struct RecordingNavigator {
    calls: Mutex<Vec<(String, Record)>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(path, state)` pair navigated to so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<(String, Record)> {
        self.calls.lock().expect("navigator lock poisoned").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str, state: Record) {
        tracing::debug!(path, "recorded navigation");
        self.calls
            .lock()
            .expect("navigator lock poisoned")
            .push((path.to_string(), state));
    }
}
