use std::time::Instant;

use tracing::{debug, info};
use ulid::Ulid;

use crate::directory::{PatientEntity, PractitionerEntity, RoomEntity};
use crate::model::*;
use crate::observability::*;

use super::conflict::{check_capacity, check_specialty, now_ms, validate_booking, Booking};
use super::{Engine, EngineError};

impl Engine {
    /// Book `practitioner` and `room` for `patient` at `scheduled_at`.
    ///
    /// Checks run in order: specialty match, request validation, practitioner
    /// availability, room availability. All checks complete before anything
    /// is written, so an error leaves the schedule untouched.
    pub async fn schedule_appointment<P, D, R>(
        &self,
        patient: &P,
        practitioner: &D,
        room: &R,
        scheduled_at: Ms,
        cost: Cost,
        notes: Option<String>,
    ) -> Result<Appointment, EngineError>
    where
        P: PatientEntity + ?Sized,
        D: PractitionerEntity + ?Sized,
        R: RoomEntity + ?Sized,
    {
        let start = Instant::now();
        let result = self
            .try_schedule(patient, practitioner, room, scheduled_at, cost, notes)
            .await;
        metrics::histogram!(SCHEDULE_DURATION_SECONDS).record(start.elapsed().as_secs_f64());
        match &result {
            Ok(appt) => {
                metrics::counter!(APPOINTMENTS_SCHEDULED_TOTAL).increment(1);
                info!(
                    appointment = %appt.id,
                    practitioner = %appt.practitioner_id,
                    room = %appt.room_id,
                    at = appt.scheduled_at,
                    "appointment scheduled"
                );
            }
            Err(e) => {
                metrics::counter!(BOOKING_REJECTIONS_TOTAL, "reason" => e.kind()).increment(1);
                debug!(
                    practitioner = %practitioner.id(),
                    room = %room.id(),
                    at = scheduled_at,
                    "booking rejected: {e}"
                );
            }
        }
        result
    }

    async fn try_schedule<P, D, R>(
        &self,
        patient: &P,
        practitioner: &D,
        room: &R,
        scheduled_at: Ms,
        cost: Cost,
        notes: Option<String>,
    ) -> Result<Appointment, EngineError>
    where
        P: PatientEntity + ?Sized,
        D: PractitionerEntity + ?Sized,
        R: RoomEntity + ?Sized,
    {
        check_specialty(practitioner.specialty(), room.department_specialty())?;
        validate_booking(scheduled_at, cost, notes.as_deref(), now_ms())?;

        let result = self
            .book_locked(patient, practitioner, room, scheduled_at, cost, notes)
            .await;
        if result.is_err() {
            // Locking created lists for entities seen for the first time;
            // a rejected booking must not leave them behind.
            self.by_practitioner.evict_if_unused(&practitioner.id());
            self.by_room.evict_if_unused(&room.id());
            self.by_patient.evict_if_unused(&patient.id());
        }
        result
    }

    async fn book_locked<P, D, R>(
        &self,
        patient: &P,
        practitioner: &D,
        room: &R,
        scheduled_at: Ms,
        cost: Cost,
        notes: Option<String>,
    ) -> Result<Appointment, EngineError>
    where
        P: PatientEntity + ?Sized,
        D: PractitionerEntity + ?Sized,
        R: RoomEntity + ?Sized,
    {
        let patient_id = patient.id();
        let practitioner_id = practitioner.id();
        let room_id = room.id();

        // Lock order is fixed by role (practitioner, room, patient), so two
        // bookings can never wait on each other in a cycle.
        let mut practitioner_list = self.by_practitioner.lock(practitioner_id).await;
        let mut room_list = self.by_room.lock(room_id).await;
        let mut patient_list = self.by_patient.lock(patient_id).await;

        check_capacity(&practitioner_list)?;
        check_capacity(&room_list)?;
        check_capacity(&patient_list)?;

        let window = self.config.conflict_window_ms();
        if let Some(existing) = practitioner_list.conflicting(scheduled_at, window) {
            return Err(EngineError::PractitionerUnavailable {
                practitioner: practitioner_id,
                conflicting: existing.appointment_id,
            });
        }
        if let Some(existing) = room_list.conflicting(scheduled_at, window) {
            return Err(EngineError::RoomUnavailable {
                room: room_id,
                conflicting: existing.appointment_id,
            });
        }

        let appointment = Appointment {
            id: self.store.assign_id(),
            patient_id,
            practitioner_id,
            room_id,
            scheduled_at,
            cost,
            status: AppointmentStatus::Scheduled,
            notes,
        };
        self.persist(&Event::AppointmentScheduled {
            appointment: appointment.clone(),
        })?;

        // Record before indexing: a reader that finds the id in a list must
        // also find the appointment.
        self.appointments.insert(appointment.id, appointment.clone());
        let booking = Booking {
            appointment_id: appointment.id,
            scheduled_at,
        };
        practitioner_list.record(booking);
        room_list.record(booking);
        patient_list.record(booking);

        patient.add_appointment(&appointment);
        practitioner.add_appointment(&appointment);
        room.add_appointment(&appointment);

        Ok(appointment)
    }

    /// Move a scheduled appointment into `target`. Only `Scheduled` may
    /// transition, and only into `Completed` or `Cancelled`.
    pub fn transition_status(
        &self,
        id: Ulid,
        target: AppointmentStatus,
    ) -> Result<Appointment, EngineError> {
        let mut entry = self
            .appointments
            .get_mut(&id)
            .ok_or(EngineError::NotFound(id))?;
        let from = entry.status;
        if !from.can_transition_to(target) {
            metrics::counter!(BOOKING_REJECTIONS_TOTAL, "reason" => "invalid_transition").increment(1);
            return Err(EngineError::InvalidTransition {
                id,
                from,
                to: target,
            });
        }

        self.persist(&Event::StatusChanged {
            id,
            from,
            to: target,
        })?;
        entry.status = target;
        let updated = entry.clone();
        drop(entry);

        metrics::counter!(STATUS_TRANSITIONS_TOTAL, "status" => target.label()).increment(1);
        info!(appointment = %id, %from, to = %target, "appointment status changed");
        Ok(updated)
    }

    pub fn complete_appointment(&self, id: Ulid) -> Result<Appointment, EngineError> {
        self.transition_status(id, AppointmentStatus::Completed)
    }

    pub fn cancel_appointment(&self, id: Ulid) -> Result<Appointment, EngineError> {
        self.transition_status(id, AppointmentStatus::Cancelled)
    }
}
