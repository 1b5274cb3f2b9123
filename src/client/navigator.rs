use std::sync::{Mutex, PoisonError};

/// Performs a full navigation that discards in-memory client state
pub trait Navigator: Send + Sync {
    fn hard_navigate(&self, location: &str);
}

/// For headless clients: there is no page to reload, so report it
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn hard_navigate(&self, location: &str) {
        tracing::warn!("Session expired, sign in again at {}", location);
    }
}

/// Remembers every navigation; used by tests
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn hard_navigate(&self, location: &str) {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(location.to_string());
    }
}
