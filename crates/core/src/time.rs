//! Wall-clock helpers shared by the file catalogue, timed events and the
//! property engine's modtime bookkeeping.

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the UNIX epoch, saturating to 0 on clock errors.
///
/// This is the server's notion of "now" for anything persisted or compared
/// across a restart (level modtimes, account save timestamps); in-process
/// timing (idle/rate-limit windows) uses `std::time::Instant` instead.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
