// Metric names. Installing a recorder/exporter is up to the host; without one
// the `metrics` macros are no-ops.

/// Counter: appointments committed.
pub const APPOINTMENTS_SCHEDULED_TOTAL: &str = "hospital_appointments_scheduled_total";

/// Counter: booking requests refused. Labels: reason.
pub const BOOKING_REJECTIONS_TOTAL: &str = "hospital_booking_rejections_total";

/// Counter: status transitions applied. Labels: status.
pub const STATUS_TRANSITIONS_TOTAL: &str = "hospital_status_transitions_total";

/// Histogram: schedule_appointment latency in seconds, lock wait included.
pub const SCHEDULE_DURATION_SECONDS: &str = "hospital_schedule_duration_seconds";
