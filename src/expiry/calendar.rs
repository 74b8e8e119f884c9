//! Day counts in the exchange's time zone.
//!
//! Both "now" and the expiry are taken in US Eastern time so a chain fetched
//! from any machine yields the same day count.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::America::New_York;
use chrono_tz::Tz;

/// Time zone the listed options trade in.
pub const MARKET_TZ: Tz = New_York;

const SECONDS_PER_DAY: i64 = 86_400;

/// Today's date on the exchange calendar.
pub fn market_today(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&MARKET_TZ).date_naive()
}

/// Ceiling of days from `now` until 00:00 Eastern on `expiry`. May be zero or
/// negative.
pub fn raw_days_until(expiry: NaiveDate, now: DateTime<Utc>) -> i64 {
    let now_et = now.with_timezone(&MARKET_TZ);
    let midnight = expiry.and_time(NaiveTime::MIN);
    let expiry_et = MARKET_TZ
        .from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| MARKET_TZ.from_utc_datetime(&midnight));

    let seconds = (expiry_et - now_et).num_seconds();
    let days = seconds / SECONDS_PER_DAY;
    if seconds % SECONDS_PER_DAY > 0 {
        days + 1
    } else {
        days
    }
}

/// Days until expiry, clamped to at least 1 so same-day and stale expiries
/// stay computable.
pub fn days_until(expiry: NaiveDate, now: DateTime<Utc>) -> i64 {
    raw_days_until(expiry, now).max(1)
}
