use crate::model::Ms;

/// 2000-01-01T00:00:00Z
pub const MIN_VALID_TIMESTAMP_MS: Ms = 946_684_800_000;
/// 2200-01-01T00:00:00Z
pub const MAX_VALID_TIMESTAMP_MS: Ms = 7_258_118_400_000;

/// Upper bound for a configured conflict window (one day).
pub const MAX_CONFLICT_WINDOW_MS: Ms = 86_400_000;

pub const MAX_NOTES_LEN: usize = 4096;
pub const MAX_NAME_LEN: usize = 256;

pub const MAX_BOOKINGS_PER_ENTITY: usize = 100_000;
