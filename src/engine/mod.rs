mod conflict;
mod error;
mod mutations;
mod queries;
mod store;

pub use conflict::{within_window, Booking, BookingList, ConflictIndex, SharedBookings};
pub use error::EngineError;
pub use store::{AppointmentStore, InMemoryStore, StoreError};

use std::sync::Arc;

use dashmap::DashMap;
use ulid::Ulid;

use crate::limits::MAX_CONFLICT_WINDOW_MS;
use crate::model::*;

/// Engine settings, resolved by the host and fixed for the engine's lifetime.
/// Only constructible through `default`, `new` or `from_minutes`, so the
/// window is always in `(0, MAX_CONFLICT_WINDOW_MS]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    conflict_window_ms: Ms,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            conflict_window_ms: 30 * MINUTE_MS,
        }
    }
}

impl EngineConfig {
    pub fn new(conflict_window_ms: Ms) -> Result<Self, EngineError> {
        if conflict_window_ms <= 0 {
            return Err(EngineError::InvalidRequest("conflict window must be positive"));
        }
        if conflict_window_ms > MAX_CONFLICT_WINDOW_MS {
            return Err(EngineError::InvalidRequest("conflict window too wide"));
        }
        Ok(Self { conflict_window_ms })
    }

    pub fn from_minutes(minutes: i64) -> Result<Self, EngineError> {
        let ms = minutes
            .checked_mul(MINUTE_MS)
            .ok_or(EngineError::InvalidRequest("conflict window too wide"))?;
        Self::new(ms)
    }

    /// Two bookings of the same practitioner or room conflict when their
    /// scheduled times are strictly less than this far apart.
    pub fn conflict_window_ms(&self) -> Ms {
        self.conflict_window_ms
    }
}

pub struct Engine {
    config: EngineConfig,
    store: Arc<dyn AppointmentStore>,
    /// Every appointment ever booked, keyed by id.
    pub(super) appointments: DashMap<Ulid, Appointment>,
    pub(super) by_patient: ConflictIndex,
    pub(super) by_practitioner: ConflictIndex,
    pub(super) by_room: ConflictIndex,
}

impl Engine {
    pub fn new(config: EngineConfig, store: Arc<dyn AppointmentStore>) -> Self {
        Self {
            config,
            store,
            appointments: DashMap::new(),
            by_patient: ConflictIndex::new(Role::Patient),
            by_practitioner: ConflictIndex::new(Role::Practitioner),
            by_room: ConflictIndex::new(Role::Room),
        }
    }

    /// Default config over a fresh [`InMemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(EngineConfig::default(), Arc::new(InMemoryStore::new()))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn index(&self, role: Role) -> &ConflictIndex {
        match role {
            Role::Patient => &self.by_patient,
            Role::Practitioner => &self.by_practitioner,
            Role::Room => &self.by_room,
        }
    }

    /// Hand the event to the store. Nothing in memory changes on failure.
    pub(super) fn persist(&self, event: &Event) -> Result<(), EngineError> {
        self.store.append(event).map_err(|e| {
            tracing::warn!(appointment = %event.appointment_id(), "store append failed: {e}");
            EngineError::Store(e.to_string())
        })
    }
}
