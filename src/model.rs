use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds, the only time type.
pub type Ms = i64;

pub const MINUTE_MS: Ms = 60_000;
pub const HOUR_MS: Ms = 60 * MINUTE_MS;

/// Medical specialty shared by practitioners and departments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Specialty {
    Cardiology,
    Pediatrics,
    Traumatology,
    Neurology,
    Dermatology,
    GeneralMedicine,
}

impl Specialty {
    pub fn description(&self) -> &'static str {
        match self {
            Specialty::Cardiology => "Cardiology",
            Specialty::Pediatrics => "Pediatrics",
            Specialty::Traumatology => "Traumatology",
            Specialty::Neurology => "Neurology",
            Specialty::Dermatology => "Dermatology",
            Specialty::GeneralMedicine => "General medicine",
        }
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Lifecycle of an appointment. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AppointmentStatus::Scheduled)
    }

    /// Only `Scheduled` may move, and only into a terminal state.
    pub fn can_transition_to(&self, target: AppointmentStatus) -> bool {
        *self == AppointmentStatus::Scheduled && target.is_terminal()
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed-point money amount with two fractional digits, stored in minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cost {
    minor: i64,
}

impl Cost {
    pub const ZERO: Cost = Cost { minor: 0 };

    pub fn from_minor(minor: i64) -> Self {
        Self { minor }
    }

    /// Whole currency units, e.g. `Cost::from_units(150_000)` is `150000.00`.
    /// `None` when the amount does not fit.
    pub fn from_units(units: i64) -> Option<Self> {
        units.checked_mul(100).map(Self::from_minor)
    }

    pub fn minor(&self) -> i64 {
        self.minor
    }

    pub fn is_positive(&self) -> bool {
        self.minor > 0
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minor < 0 { "-" } else { "" };
        let abs = self.minor.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseCostError(&'static str);

impl fmt::Display for ParseCostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid cost: {}", self.0)
    }
}

impl std::error::Error for ParseCostError {}

impl FromStr for Cost {
    type Err = ParseCostError;

    /// Accepts `[-]digits[.d[d]]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, frac) = match body.split_once('.') {
            Some((w, f)) => (w, f),
            None => (body, ""),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseCostError("expected digits before the decimal point"));
        }
        if frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseCostError("at most two fractional digits"));
        }
        if body.ends_with('.') {
            return Err(ParseCostError("missing fractional digits"));
        }

        let units: i64 = whole
            .parse()
            .map_err(|_| ParseCostError("amount out of range"))?;
        let cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| ParseCostError("bad fraction"))? * 10,
            _ => frac.parse().map_err(|_| ParseCostError("bad fraction"))?,
        };
        let minor = units
            .checked_mul(100)
            .and_then(|m| m.checked_add(cents))
            .ok_or(ParseCostError("amount out of range"))?;
        Ok(Cost::from_minor(if negative { -minor } else { minor }))
    }
}

/// Which participant an index (or a back-reference) is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Patient,
    Practitioner,
    Room,
}

/// A booked encounter. Participants are held by identity only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Ulid,
    pub patient_id: Ulid,
    pub practitioner_id: Ulid,
    pub room_id: Ulid,
    pub scheduled_at: Ms,
    pub cost: Cost,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

/// The event types. This is the record format handed to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    AppointmentScheduled {
        appointment: Appointment,
    },
    StatusChanged {
        id: Ulid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
}

impl Event {
    pub fn appointment_id(&self) -> Ulid {
        match self {
            Event::AppointmentScheduled { appointment } => appointment.id,
            Event::StatusChanged { id, .. } => *id,
        }
    }
}
