//! Session state shared by the gate and the API client
//!
//! Both components read the credential and role through `SessionStore` and
//! clear the credential through it; neither touches cookies directly.

pub mod cookie;
pub mod file;

pub use cookie::CookieSession;
pub use file::FileSessionStore;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub trait SessionStore: Send + Sync {
    /// Raw credential, `None` when absent or empty
    fn credential(&self) -> Option<String>;

    /// Raw role value as stored (a JSON-encoded string)
    fn role(&self) -> Option<String>;

    fn clear_credential(&self);
}

impl<S: SessionStore + ?Sized> SessionStore for Arc<S> {
    fn credential(&self) -> Option<String> {
        (**self).credential()
    }

    fn role(&self) -> Option<String> {
        (**self).role()
    }

    fn clear_credential(&self) {
        (**self).clear_credential()
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    credential: Option<String>,
    role: Option<String>,
    clears: usize,
}

/// In-memory store for tests and embedding applications
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(credential: impl Into<String>, role: impl Into<String>) -> Self {
        let store = Self::new();
        store.set_credential(credential);
        store.set_role(role);
        store
    }

    pub fn set_credential(&self, credential: impl Into<String>) {
        self.lock().credential = Some(credential.into());
    }

    pub fn set_role(&self, role: impl Into<String>) {
        self.lock().role = Some(role.into());
    }

    /// How many times the credential has been cleared
    pub fn clear_count(&self) -> usize {
        self.lock().clears
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn credential(&self) -> Option<String> {
        self.lock().credential.clone().filter(|c| !c.is_empty())
    }

    fn role(&self) -> Option<String> {
        self.lock().role.clone().filter(|r| !r.is_empty())
    }

    fn clear_credential(&self) {
        let mut state = self.lock();
        state.credential = None;
        state.clears += 1;
    }
}
