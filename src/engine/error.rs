use ulid::Ulid;

use crate::model::{AppointmentStatus, Specialty};

#[derive(Debug)]
pub enum EngineError {
    InvalidRequest(&'static str),
    LimitExceeded(&'static str),
    PractitionerUnavailable {
        practitioner: Ulid,
        conflicting: Ulid,
    },
    RoomUnavailable {
        room: Ulid,
        conflicting: Ulid,
    },
    SpecialtyMismatch {
        practitioner: Specialty,
        department: Specialty,
    },
    InvalidTransition {
        id: Ulid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
    NotFound(Ulid),
    Store(String),
}

impl EngineError {
    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidRequest(_) => "invalid_request",
            EngineError::LimitExceeded(_) => "limit_exceeded",
            EngineError::PractitionerUnavailable { .. } => "practitioner_unavailable",
            EngineError::RoomUnavailable { .. } => "room_unavailable",
            EngineError::SpecialtyMismatch { .. } => "specialty_mismatch",
            EngineError::InvalidTransition { .. } => "invalid_transition",
            EngineError::NotFound(_) => "not_found",
            EngineError::Store(_) => "store",
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::PractitionerUnavailable {
                practitioner,
                conflicting,
            } => write!(
                f,
                "practitioner {practitioner} unavailable: conflicts with appointment {conflicting}"
            ),
            EngineError::RoomUnavailable { room, conflicting } => {
                write!(f, "room {room} unavailable: conflicts with appointment {conflicting}")
            }
            EngineError::SpecialtyMismatch {
                practitioner,
                department,
            } => write!(
                f,
                "specialty mismatch: practitioner is {practitioner}, room department is {department}"
            ),
            EngineError::InvalidTransition { id, from, to } => {
                write!(f, "appointment {id}: cannot transition from {from} to {to}")
            }
            EngineError::NotFound(id) => write!(f, "not found: {id}"),
            EngineError::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}
