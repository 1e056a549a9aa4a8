use ulid::Ulid;

use crate::model::*;

use super::conflict::Booking;
use super::Engine;

impl Engine {
    fn resolve(&self, bookings: Vec<Booking>) -> Vec<Appointment> {
        bookings
            .iter()
            .filter_map(|b| self.appointments.get(&b.appointment_id).map(|e| e.value().clone()))
            .collect()
    }

    /// Bookings of one participant in the order they were made. Unknown ids
    /// have no bookings.
    pub async fn bookings_for(&self, role: Role, entity_id: &Ulid) -> Vec<Appointment> {
        let bookings = self.index(role).bookings_for(entity_id).await;
        self.resolve(bookings)
    }

    pub async fn bookings_for_patient(&self, patient_id: &Ulid) -> Vec<Appointment> {
        self.bookings_for(Role::Patient, patient_id).await
    }

    pub async fn bookings_for_practitioner(&self, practitioner_id: &Ulid) -> Vec<Appointment> {
        self.bookings_for(Role::Practitioner, practitioner_id).await
    }

    pub async fn bookings_for_room(&self, room_id: &Ulid) -> Vec<Appointment> {
        self.bookings_for(Role::Room, room_id).await
    }

    /// Whether `entity_id` could take a booking at `at` under the configured window.
    pub async fn is_available(&self, role: Role, entity_id: &Ulid, at: Ms) -> bool {
        !self
            .index(role)
            .has_conflict(entity_id, at, self.config.conflict_window_ms())
            .await
    }

    pub fn get_appointment(&self, id: &Ulid) -> Option<Appointment> {
        self.appointments.get(id).map(|e| e.value().clone())
    }

    /// All appointments ordered by scheduled time, ties by id.
    pub fn list_appointments(&self) -> Vec<Appointment> {
        let mut all: Vec<Appointment> = self
            .appointments
            .iter()
            .map(|e| e.value().clone())
            .collect();
        all.sort_by_key(|a| (a.scheduled_at, a.id));
        all
    }

    pub fn appointment_count(&self) -> usize {
        self.appointments.len()
    }
}
