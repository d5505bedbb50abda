//! Publication-window cache expiry.
//!
//! Reports are published on a 30-minute cycle aligned to the clock hour,
//! so a resolution stays valid until the next :00 or :30.

use chrono::{DateTime, TimeDelta, TimeZone, Timelike};

/// The next :00 or :30 boundary strictly after `now`.
///
/// Resolved at `HH:MM` with `MM < 30` this is `HH:30:00`; with `MM >= 30`
/// it is the top of the next hour.
pub fn next_refresh<Tz: TimeZone>(now: DateTime<Tz>) -> DateTime<Tz> {
    let into_window = TimeDelta::minutes(i64::from(now.minute() % 30))
        + TimeDelta::seconds(i64::from(now.second()))
        + TimeDelta::nanoseconds(i64::from(now.nanosecond() % 1_000_000_000));
    now - into_window + TimeDelta::minutes(30)
}
