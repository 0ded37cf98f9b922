/// Maximum number of time proposals (open inputs) in one draft.
pub const MAX_PROPOSED_TIMES: usize = 5;

/// Maximum number of candidate locations one draft may hold.
pub const MAX_LOCATIONS: usize = 5;

/// Votes a single voter may cast across one meeting's candidate times.
pub const MAX_VOTES: usize = 3;

pub const MAX_DURATION_HOURS: u32 = 23;
pub const MAX_DURATION_MINS: u32 = 59;
