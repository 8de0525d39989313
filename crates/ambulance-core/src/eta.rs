//! Travel-time estimates shared by dispatch and status reporting.

use ambulance_types::Location;

use crate::geo;

/// Assumed ambulance speed when none is configured.
pub const DEFAULT_SPEED_KMH: f64 = 50.0;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Whole seconds to cover the great-circle distance from `from` to `to` at
/// `speed_kmh`.
///
/// Zero only for identical coordinates; any non-zero distance yields at
/// least one second.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn eta_seconds(from: Location, to: Location, speed_kmh: f64) -> u64 {
    let distance = geo::distance_km(from, to);
    if distance <= 0.0 {
        return 0;
    }
    // Float-to-int `as` saturates, so an absurdly slow speed cannot wrap.
    let seconds = (distance / speed_kmh * SECONDS_PER_HOUR).floor() as u64;
    seconds.max(1)
}
