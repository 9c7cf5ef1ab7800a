mod cast;
mod dtype;
mod scalar;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

pub(crate) use cast::{cast_array, parse_date, parse_datetime};
/// Logical column types.
pub use dtype::{DType, TimeUnit};
/// Single typed value.
pub use scalar::Scalar;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub(crate) fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

pub(crate) fn days_to_date(days: i32) -> Option<NaiveDate> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}

pub(crate) fn datetime_to_ticks(value: NaiveDateTime, unit: TimeUnit) -> i64 {
    let utc = value.and_utc();
    let per_second = unit.ticks_per_second();
    let sub = i64::from(utc.timestamp_subsec_nanos()) / (1_000_000_000 / per_second);
    utc.timestamp() * per_second + sub
}

pub(crate) fn ticks_to_datetime(ticks: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let per_second = unit.ticks_per_second();
    let secs = ticks.div_euclid(per_second);
    let nanos = ticks.rem_euclid(per_second) * (1_000_000_000 / per_second);
    let nanos = u32::try_from(nanos).ok()?;
    DateTime::from_timestamp(secs, nanos).map(|dt| dt.naive_utc())
}

pub(crate) fn format_date(days: i32) -> Option<String> {
    days_to_date(days).map(|d| d.format("%Y-%m-%d").to_string())
}

pub(crate) fn format_datetime(ticks: i64, unit: TimeUnit) -> Option<String> {
    ticks_to_datetime(ticks, unit).map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
}
