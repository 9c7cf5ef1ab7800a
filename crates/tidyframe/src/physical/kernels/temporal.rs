use std::sync::Arc;

use arrow::array::{new_null_array, ArrayRef, Date32Array, Int64Array};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use super::{as_date32, as_int64, as_utf8, broadcast, common_len, datetime_array, dtype_of, ticks};
use crate::expr::{RoundUnit, TemporalFunc};
use crate::types::{
    cast_array, date_to_days, datetime_to_ticks, days_to_date, parse_date, parse_datetime,
    ticks_to_datetime, DType, TimeUnit,
};
use crate::{DataFrameError, Result};

fn component(func: &TemporalFunc, dt: NaiveDateTime) -> Option<i64> {
    let date = dt.date();
    let v = match func {
        TemporalFunc::Year => date.year() as i64,
        TemporalFunc::Month => date.month() as i64,
        TemporalFunc::Day => date.day() as i64,
        TemporalFunc::Weekday => date.weekday().number_from_sunday() as i64,
        TemporalFunc::YearDay => date.ordinal() as i64,
        TemporalFunc::Week => date.iso_week().week() as i64,
        TemporalFunc::Quarter => (date.month0() / 3 + 1) as i64,
        TemporalFunc::Hour => dt.hour() as i64,
        TemporalFunc::Minute => dt.minute() as i64,
        TemporalFunc::Second => dt.second() as i64,
        TemporalFunc::AsDate(_) | TemporalFunc::AsDatetime(_) | TemporalFunc::Round { .. } => {
            return None
        }
    };
    Some(v)
}

/// Datetime view of a `Date` or `Datetime` column.
fn datetimes(array: &ArrayRef) -> Result<Vec<Option<NaiveDateTime>>> {
    match dtype_of(array.as_ref())? {
        DType::Date => Ok(as_date32(array.as_ref())?
            .iter()
            .map(|v| v.and_then(days_to_date).and_then(|d| d.and_hms_opt(0, 0, 0)))
            .collect()),
        DType::Datetime(_) => {
            let (values, unit) = ticks(array.as_ref())?;
            Ok(values
                .into_iter()
                .map(|v| v.and_then(|t| ticks_to_datetime(t, unit)))
                .collect())
        }
        other => Err(DataFrameError::type_mismatch(
            None::<String>,
            "Date or Datetime",
            other.to_string(),
        )),
    }
}

/// Component extraction and text-to-temporal conversion.
pub(crate) fn temporal(func: &TemporalFunc, array: &ArrayRef) -> Result<ArrayRef> {
    let dtype = dtype_of(array.as_ref())?;
    match func {
        TemporalFunc::AsDate(format) => as_date(array, dtype, format.as_deref()),
        TemporalFunc::AsDatetime(format) => as_datetime(array, dtype, format.as_deref()),
        TemporalFunc::Round { unit, n } => round(array, dtype, *unit, *n),
        _ if dtype == DType::Null => Ok(new_null_array(&DType::Int64.to_arrow(), array.len())),
        _ => {
            let out: Int64Array = datetimes(array)?
                .into_iter()
                .map(|v| v.and_then(|dt| component(func, dt)))
                .collect();
            Ok(Arc::new(out))
        }
    }
}

fn as_date(array: &ArrayRef, dtype: DType, format: Option<&str>) -> Result<ArrayRef> {
    match (dtype, format) {
        (DType::Utf8, Some(fmt)) => {
            let values = as_utf8(array.as_ref())?;
            let out: Date32Array = values
                .iter()
                .map(|v| v.and_then(|s| parse_date(s, Some(fmt))).map(date_to_days))
                .collect();
            Ok(Arc::new(out))
        }
        _ => cast_array(array, DType::Date),
    }
}

fn as_datetime(array: &ArrayRef, dtype: DType, format: Option<&str>) -> Result<ArrayRef> {
    let unit = match dtype {
        DType::Datetime(unit) => unit,
        _ => TimeUnit::Microsecond,
    };
    match (dtype, format) {
        (DType::Utf8, Some(fmt)) => {
            let values = as_utf8(array.as_ref())?;
            let out = values.iter().map(|v| {
                v.and_then(|s| parse_datetime(s, Some(fmt)))
                    .map(|dt| datetime_to_ticks(dt, unit))
            });
            Ok(datetime_array(out, unit))
        }
        _ => cast_array(array, DType::Datetime(unit)),
    }
}

/// Weekday offset of 1970-01-01 (a Thursday) from the preceding Monday.
const EPOCH_WEEKDAY_FROM_MONDAY: i64 = 3;

/// Bucket width in seconds, or `None` for months.
fn bucket_seconds(unit: RoundUnit, n: i64) -> Result<Option<i64>> {
    if n <= 0 {
        return Err(DataFrameError::invalid_argument(format!(
            "rounding needs a positive number of units, got {n}"
        )));
    }
    let per_unit = match unit {
        RoundUnit::Month => return Ok(None),
        RoundUnit::Week => 7 * 86_400,
        RoundUnit::Day => 86_400,
        RoundUnit::Hour => 3_600,
        RoundUnit::Minute => 60,
        RoundUnit::Second => 1,
    };
    n.checked_mul(per_unit)
        .map(Some)
        .ok_or_else(|| DataFrameError::invalid_argument(format!("rounding width {n} is too large")))
}

fn floor_datetime(
    dt: NaiveDateTime,
    unit: RoundUnit,
    n: i64,
    step: Option<i64>,
) -> Option<NaiveDateTime> {
    let Some(step) = step else {
        let months = i64::from(dt.year()) * 12 + i64::from(dt.month0()) - 1970 * 12;
        let floored = months.div_euclid(n).checked_mul(n)? + 1970 * 12;
        let year = i32::try_from(floored.div_euclid(12)).ok()?;
        let month = u32::try_from(floored.rem_euclid(12)).ok()? + 1;
        return NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0);
    };
    let shift = if unit == RoundUnit::Week {
        EPOCH_WEEKDAY_FROM_MONDAY * 86_400
    } else {
        0
    };
    let secs = dt.and_utc().timestamp().checked_add(shift)?;
    let floored = secs.div_euclid(step).checked_mul(step)?.checked_sub(shift)?;
    chrono::DateTime::from_timestamp(floored, 0).map(|t| t.naive_utc())
}

fn round(array: &ArrayRef, dtype: DType, unit: RoundUnit, n: i64) -> Result<ArrayRef> {
    let step = bucket_seconds(unit, n)?;
    if dtype == DType::Null {
        return Ok(array.clone());
    }
    let floored = datetimes(array)?
        .into_iter()
        .map(|v| v.and_then(|dt| floor_datetime(dt, unit, n, step)));
    match dtype {
        DType::Datetime(tu) => Ok(datetime_array(
            floored.map(|v| v.map(|dt| datetime_to_ticks(dt, tu))),
            tu,
        )),
        _ => Ok(Arc::new(
            floored
                .map(|v| v.map(|dt| date_to_days(dt.date())))
                .collect::<Date32Array>(),
        )),
    }
}

/// Build dates from year, month and day columns; invalid combinations are null.
pub(crate) fn make_date(year: &ArrayRef, month: &ArrayRef, day: &ArrayRef) -> Result<ArrayRef> {
    let len = common_len(&[year.len(), month.len(), day.len()])?;
    let parts = [year, month, day]
        .into_iter()
        .map(|a| cast_array(&broadcast(a, len)?, DType::Int64))
        .collect::<Result<Vec<_>>>()?;
    let y = as_int64(parts[0].as_ref())?;
    let m = as_int64(parts[1].as_ref())?;
    let d = as_int64(parts[2].as_ref())?;
    let out: Date32Array = y
        .iter()
        .zip(m.iter())
        .zip(d.iter())
        .map(|((y, m), d)| {
            let date = NaiveDate::from_ymd_opt(
                i32::try_from(y?).ok()?,
                u32::try_from(m?).ok()?,
                u32::try_from(d?).ok()?,
            )?;
            Some(date_to_days(date))
        })
        .collect();
    Ok(Arc::new(out))
}
