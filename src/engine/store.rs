use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use ulid::Ulid;

use crate::model::Event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError(pub String);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for StoreError {}

/// Persistence collaborator. The engine hands every event to the store
/// before applying it, so a failed append leaves the schedule untouched.
///
/// Calls are made while the engine holds its booking locks and must not block.
pub trait AppointmentStore: Send + Sync {
    /// Identity for a new appointment.
    fn assign_id(&self) -> Ulid {
        Ulid::new()
    }

    fn append(&self, event: &Event) -> Result<(), StoreError>;
}

/// Event log kept in memory. Used by tests and by hosts that don't persist.
#[derive(Default)]
pub struct InMemoryStore {
    events: Mutex<Vec<Event>>,
    failing: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every append fails.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AppointmentStore for InMemoryStore {
    fn append(&self, event: &Event) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError("store unavailable".into()));
        }
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
        Ok(())
    }
}
