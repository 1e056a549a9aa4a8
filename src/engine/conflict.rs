use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;

use super::EngineError;

pub type SharedBookings = Arc<RwLock<BookingList>>;

/// What the index keeps per appointment: enough to answer conflict queries
/// without touching the appointment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Booking {
    pub appointment_id: Ulid,
    pub scheduled_at: Ms,
}

/// Bookings of a single entity, in insertion order.
#[derive(Debug, Default)]
pub struct BookingList {
    entries: Vec<Booking>,
}

impl BookingList {
    pub fn record(&mut self, booking: Booking) {
        self.entries.push(booking);
    }

    /// First booking whose scheduled time lies strictly within `window_ms` of `candidate`.
    pub fn conflicting(&self, candidate: Ms, window_ms: Ms) -> Option<&Booking> {
        self.entries
            .iter()
            .find(|b| within_window(b.scheduled_at, candidate, window_ms))
    }

    pub fn has_conflict(&self, candidate: Ms, window_ms: Ms) -> bool {
        self.conflicting(candidate, window_ms).is_some()
    }

    pub fn entries(&self) -> &[Booking] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `|a - b| < window`, on real elapsed milliseconds.
pub fn within_window(a: Ms, b: Ms, window_ms: Ms) -> bool {
    window_ms > 0 && a.abs_diff(b) < window_ms.unsigned_abs()
}

/// Entity id → its bookings, for one role.
///
/// Each entity's list sits behind its own lock so bookings for unrelated
/// practitioners and rooms never contend.
pub struct ConflictIndex {
    role: Role,
    lists: DashMap<Ulid, SharedBookings>,
}

impl ConflictIndex {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            lists: DashMap::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Number of entities with a list.
    pub fn entity_count(&self) -> usize {
        self.lists.len()
    }

    fn get(&self, entity_id: &Ulid) -> Option<SharedBookings> {
        self.lists.get(entity_id).map(|e| e.value().clone())
    }

    /// Write lock on the entity's list, creating an empty list if none exists.
    /// The DashMap shard guard is released before awaiting the lock.
    pub(super) async fn lock(&self, entity_id: Ulid) -> OwnedRwLockWriteGuard<BookingList> {
        let list = self.lists.entry(entity_id).or_default().value().clone();
        list.write_owned().await
    }

    /// Drop the entity's list if it holds no bookings and nothing else
    /// references it. Lockers clone the list under the map's shard lock, so a
    /// list with a single owner cannot be picked up concurrently.
    pub(super) fn evict_if_unused(&self, entity_id: &Ulid) {
        self.lists.remove_if(entity_id, |_, list| {
            Arc::strong_count(list) == 1 && list.try_read().is_ok_and(|l| l.is_empty())
        });
    }

    pub async fn record_booking(&self, entity_id: Ulid, booking: Booking) {
        self.lock(entity_id).await.record(booking);
    }

    /// Vacuously false for an entity with no bookings.
    pub async fn has_conflict(&self, entity_id: &Ulid, candidate: Ms, window_ms: Ms) -> bool {
        match self.get(entity_id) {
            Some(list) => list.read().await.has_conflict(candidate, window_ms),
            None => false,
        }
    }

    /// Snapshot of the entity's bookings; empty when none exist.
    pub async fn bookings_for(&self, entity_id: &Ulid) -> Vec<Booking> {
        match self.get(entity_id) {
            Some(list) => list.read().await.entries().to_vec(),
            None => Vec::new(),
        }
    }
}

pub(crate) fn now_ms() -> Ms {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as Ms)
        .unwrap_or(0)
}

pub(crate) fn validate_booking(
    scheduled_at: Ms,
    cost: Cost,
    notes: Option<&str>,
    now: Ms,
) -> Result<(), EngineError> {
    if scheduled_at < MIN_VALID_TIMESTAMP_MS || scheduled_at > MAX_VALID_TIMESTAMP_MS {
        return Err(EngineError::InvalidRequest("timestamp out of range"));
    }
    if scheduled_at < now {
        return Err(EngineError::InvalidRequest("appointment time is in the past"));
    }
    if !cost.is_positive() {
        return Err(EngineError::InvalidRequest("cost must be greater than zero"));
    }
    if let Some(n) = notes
        && n.len() > MAX_NOTES_LEN
    {
        return Err(EngineError::InvalidRequest("notes too long"));
    }
    Ok(())
}

pub(crate) fn check_specialty(practitioner: Specialty, department: Specialty) -> Result<(), EngineError> {
    if practitioner != department {
        return Err(EngineError::SpecialtyMismatch {
            practitioner,
            department,
        });
    }
    Ok(())
}

pub(crate) fn check_capacity(list: &BookingList) -> Result<(), EngineError> {
    if list.len() >= MAX_BOOKINGS_PER_ENTITY {
        return Err(EngineError::LimitExceeded("too many bookings for entity"));
    }
    Ok(())
}
