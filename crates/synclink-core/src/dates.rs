//! Calendar picker date correction
//!
//! Dates are stored as UTC instants, but calendar pickers render and return
//! values in the viewer's local offset. Without correction a date stored as
//! UTC midnight shows up as the previous day west of Greenwich. These helpers
//! shift wall-clock values across the boundary so the calendar date the
//! user sees is the calendar date that gets stored.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

/// Value to hand to a picker rendering at `offset`
///
/// The result's local wall clock equals the UTC wall clock of `stored`.
pub fn utc_to_picker(stored: DateTime<Utc>, offset: FixedOffset) -> DateTime<FixedOffset> {
    offset.from_utc_datetime(&stored.naive_utc()) - offset_duration(offset)
}

/// UTC instant for a value returned by a picker
///
/// The picker's local wall clock is reinterpreted as UTC.
pub fn picker_to_utc(picked: DateTime<FixedOffset>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&picked.naive_local())
}

/// UTC midnight at the start of `date`
pub fn date_to_utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}

/// Calendar date a stored instant represents
pub fn stored_calendar_date(stored: DateTime<Utc>) -> NaiveDate {
    stored.date_naive()
}

fn offset_duration(offset: FixedOffset) -> chrono::Duration {
    chrono::Duration::seconds(i64::from(offset.local_minus_utc()))
}
