use std::sync::{Arc, Mutex};

use ulid::Ulid;

use crate::engine::EngineError;
use crate::limits::MAX_NAME_LEN;
use crate::model::{Appointment, Specialty};

/// What the engine needs from anything taking part in an appointment.
pub trait Participant: Send + Sync {
    fn id(&self) -> Ulid;

    /// Back-reference notification. Called once per committed booking,
    /// while the engine still holds its locks, so it must not call back
    /// into the engine.
    fn add_appointment(&self, appointment: &Appointment);
}

pub trait PatientEntity: Participant {}

pub trait PractitionerEntity: Participant {
    fn specialty(&self) -> Specialty;
}

pub trait RoomEntity: Participant {
    fn department_id(&self) -> Ulid;

    /// Specialty of the department owning the room.
    fn department_specialty(&self) -> Specialty;
}

fn validate_name(value: &str, empty_msg: &'static str) -> Result<String, EngineError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidRequest(empty_msg));
    }
    if trimmed.len() > MAX_NAME_LEN {
        return Err(EngineError::InvalidRequest("name too long"));
    }
    Ok(trimmed.to_string())
}

/// Appointment ids a participant has been notified about, in order.
#[derive(Debug, Default)]
struct AppointmentLog(Mutex<Vec<Ulid>>);

impl AppointmentLog {
    fn push(&self, id: Ulid) {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(id);
    }

    fn ids(&self) -> Vec<Ulid> {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// Practitioner registration number: `MP-` followed by 4 to 6 digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct License(String);

impl License {
    pub fn parse(value: &str) -> Result<Self, EngineError> {
        let digits = value
            .strip_prefix("MP-")
            .ok_or(EngineError::InvalidRequest("license must start with MP-"))?;
        if !(4..=6).contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EngineError::InvalidRequest("license must be MP- followed by 4 to 6 digits"));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug)]
pub struct Patient {
    id: Ulid,
    name: String,
    appointments: AppointmentLog,
}

impl Patient {
    pub fn new(name: &str) -> Result<Self, EngineError> {
        Ok(Self {
            id: Ulid::new(),
            name: validate_name(name, "patient name must not be empty")?,
            appointments: AppointmentLog::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn appointment_ids(&self) -> Vec<Ulid> {
        self.appointments.ids()
    }
}

impl Participant for Patient {
    fn id(&self) -> Ulid {
        self.id
    }

    fn add_appointment(&self, appointment: &Appointment) {
        self.appointments.push(appointment.id);
    }
}

impl PatientEntity for Patient {}

#[derive(Debug)]
pub struct Practitioner {
    id: Ulid,
    name: String,
    license: License,
    specialty: Specialty,
    appointments: AppointmentLog,
}

impl Practitioner {
    pub fn new(name: &str, license: &str, specialty: Specialty) -> Result<Self, EngineError> {
        Ok(Self {
            id: Ulid::new(),
            name: validate_name(name, "practitioner name must not be empty")?,
            license: License::parse(license)?,
            specialty,
            appointments: AppointmentLog::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn license(&self) -> &License {
        &self.license
    }

    pub fn appointment_ids(&self) -> Vec<Ulid> {
        self.appointments.ids()
    }
}

impl Participant for Practitioner {
    fn id(&self) -> Ulid {
        self.id
    }

    fn add_appointment(&self, appointment: &Appointment) {
        self.appointments.push(appointment.id);
    }
}

impl PractitionerEntity for Practitioner {
    fn specialty(&self) -> Specialty {
        self.specialty
    }
}

#[derive(Debug)]
pub struct Department {
    id: Ulid,
    name: String,
    specialty: Specialty,
    staff: Mutex<Vec<Ulid>>,
}

impl Department {
    pub fn new(name: &str, specialty: Specialty) -> Result<Self, EngineError> {
        Ok(Self {
            id: Ulid::new(),
            name: validate_name(name, "department name must not be empty")?,
            specialty,
            staff: Mutex::new(Vec::new()),
        })
    }

    pub fn id(&self) -> Ulid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn specialty(&self) -> Specialty {
        self.specialty
    }

    /// Add a practitioner to the department's staff. Specialties must match.
    pub fn admit(&self, practitioner: &Practitioner) -> Result<(), EngineError> {
        if practitioner.specialty() != self.specialty {
            return Err(EngineError::SpecialtyMismatch {
                practitioner: practitioner.specialty(),
                department: self.specialty,
            });
        }
        let mut staff = self.staff.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !staff.contains(&practitioner.id()) {
            staff.push(practitioner.id());
        }
        Ok(())
    }

    pub fn staff(&self) -> Vec<Ulid> {
        self.staff
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[derive(Debug)]
pub struct Room {
    id: Ulid,
    number: String,
    department: Arc<Department>,
    appointments: AppointmentLog,
}

impl Room {
    pub fn new(number: &str, department: Arc<Department>) -> Result<Self, EngineError> {
        Ok(Self {
            id: Ulid::new(),
            number: validate_name(number, "room number must not be empty")?,
            department,
            appointments: AppointmentLog::default(),
        })
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn department(&self) -> &Department {
        &self.department
    }

    pub fn appointment_ids(&self) -> Vec<Ulid> {
        self.appointments.ids()
    }
}

impl Participant for Room {
    fn id(&self) -> Ulid {
        self.id
    }

    fn add_appointment(&self, appointment: &Appointment) {
        self.appointments.push(appointment.id);
    }
}

impl RoomEntity for Room {
    fn department_id(&self) -> Ulid {
        self.department.id()
    }

    fn department_specialty(&self) -> Specialty {
        self.department.specialty()
    }
}
