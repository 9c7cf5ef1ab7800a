use std::sync::Arc;

use arrow::array::{
    new_null_array, Array, ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array,
    StringArray,
};
use arrow::compute::CastOptions;
use chrono::{NaiveDate, NaiveDateTime};

use super::{
    date_to_days, datetime_to_ticks, format_date, format_datetime, DType, Scalar, TimeUnit,
};
use crate::physical::kernels::{
    as_boolean, as_date32, as_float64, as_int64, as_utf8, datetime_array, f64_values, ticks,
};
use crate::{DataFrameError, Result};

const SECONDS_PER_DAY: i64 = 86_400;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Cast `array` to `target`.
///
/// Per-row failures (unparseable text, out-of-range numbers) become nulls; only
/// dtype pairs with no defined conversion are errors.
pub(crate) fn cast_array(array: &ArrayRef, target: DType) -> Result<ArrayRef> {
    let source = DType::from_arrow(array.data_type())?;
    if source == target {
        return Ok(array.clone());
    }

    use DType::*;
    match (source, target) {
        (Null, t) | (_, t @ Null) => Ok(new_null_array(&t.to_arrow(), array.len())),
        (Int64 | Float64, Int64 | Float64) | (Boolean, Int64 | Float64) | (Int64, Utf8) => {
            arrow_cast(array, target)
        }
        (Float64, Utf8) => {
            let values = as_float64(array)?;
            let out: StringArray = values
                .iter()
                .map(|v| v.map(|v| Scalar::Float64(v).to_string()))
                .collect();
            Ok(Arc::new(out))
        }
        (Boolean, Utf8) => {
            let values = as_boolean(array)?;
            let out: StringArray = values.iter().map(|v| v.map(|b| b.to_string())).collect();
            Ok(Arc::new(out))
        }
        (Date, Utf8) => {
            let values = as_date32(array)?;
            let out: StringArray = values.iter().map(|v| v.and_then(format_date)).collect();
            Ok(Arc::new(out))
        }
        (Datetime(unit), Utf8) => {
            let (values, _) = ticks(array)?;
            let out: StringArray = values
                .into_iter()
                .map(|v| v.and_then(|v| format_datetime(v, unit)))
                .collect();
            Ok(Arc::new(out))
        }
        (Int64 | Float64, Boolean) => {
            let values = f64_values(array)?;
            let out: BooleanArray = values.into_iter().map(|v| v.map(|v| v != 0.0)).collect();
            Ok(Arc::new(out))
        }
        (Utf8, Boolean) => {
            let values = as_utf8(array)?;
            let out: BooleanArray = values
                .iter()
                .map(|v| {
                    v.and_then(|s| match s.trim().to_ascii_lowercase().as_str() {
                        "true" => Some(true),
                        "false" => Some(false),
                        _ => None,
                    })
                })
                .collect();
            Ok(Arc::new(out))
        }
        (Utf8, Int64) => {
            let values = as_utf8(array)?;
            let out: Int64Array = values
                .iter()
                .map(|v| v.and_then(|s| s.trim().parse::<i64>().ok()))
                .collect();
            Ok(Arc::new(out))
        }
        (Utf8, Float64) => {
            let values = as_utf8(array)?;
            let out: Float64Array = values
                .iter()
                .map(|v| v.and_then(|s| s.trim().parse::<f64>().ok()))
                .collect();
            Ok(Arc::new(out))
        }
        (Utf8, Date) => {
            let values = as_utf8(array)?;
            let out: Date32Array = values
                .iter()
                .map(|v| v.and_then(|s| parse_date(s, None)).map(date_to_days))
                .collect();
            Ok(Arc::new(out))
        }
        (Utf8, Datetime(unit)) => {
            let values = as_utf8(array)?;
            let out = values.iter().map(|v| {
                v.and_then(|s| parse_datetime(s, None))
                    .map(|dt| datetime_to_ticks(dt, unit))
            });
            Ok(datetime_array(out, unit))
        }
        (Date, Datetime(unit)) => {
            let per_day = SECONDS_PER_DAY * unit.ticks_per_second();
            let values = as_date32(array)?;
            let out = values
                .iter()
                .map(|v| v.and_then(|d| i64::from(d).checked_mul(per_day)));
            Ok(datetime_array(out, unit))
        }
        (Datetime(unit), Date) => {
            let per_day = SECONDS_PER_DAY * unit.ticks_per_second();
            let (values, _) = ticks(array)?;
            let out: Date32Array = values
                .into_iter()
                .map(|v| v.and_then(|t| i32::try_from(t.div_euclid(per_day)).ok()))
                .collect();
            Ok(Arc::new(out))
        }
        (Datetime(from), Datetime(to)) => {
            let (values, _) = ticks(array)?;
            let out = values.into_iter().map(|v| v.and_then(|t| rescale(t, from, to)));
            Ok(datetime_array(out, to))
        }
        (Date, Int64) => {
            let values = as_date32(array)?;
            let out: Int64Array = values.iter().map(|v| v.map(i64::from)).collect();
            Ok(Arc::new(out))
        }
        (Datetime(_), Int64) => {
            let (values, _) = ticks(array)?;
            Ok(Arc::new(Int64Array::from(values)))
        }
        (Int64, Date) => {
            let values = as_int64(array)?;
            let out: Date32Array = values
                .iter()
                .map(|v| v.and_then(|v| i32::try_from(v).ok()))
                .collect();
            Ok(Arc::new(out))
        }
        (Int64, Datetime(unit)) => {
            let values = as_int64(array)?;
            Ok(datetime_array(values.iter(), unit))
        }
        (from, to) => Err(DataFrameError::type_mismatch(
            None::<String>,
            format!("type castable to {to}"),
            from.to_string(),
        )),
    }
}

fn arrow_cast(array: &ArrayRef, target: DType) -> Result<ArrayRef> {
    let options = CastOptions {
        safe: true,
        ..Default::default()
    };
    arrow::compute::cast_with_options(array, &target.to_arrow(), &options)
        .map_err(|source| DataFrameError::Arrow { source })
}

fn rescale(value: i64, from: TimeUnit, to: TimeUnit) -> Option<i64> {
    match (from, to) {
        (TimeUnit::Millisecond, TimeUnit::Microsecond) => value.checked_mul(1_000),
        (TimeUnit::Microsecond, TimeUnit::Millisecond) => Some(value.div_euclid(1_000)),
        _ => Some(value),
    }
}

/// Parse a date, using `format` when given and the ISO forms otherwise.
///
/// Text that only parses as a datetime is truncated to its date.
pub(crate) fn parse_date(text: &str, format: Option<&str>) -> Option<NaiveDate> {
    let text = text.trim();
    match format {
        Some(fmt) => NaiveDate::parse_from_str(text, fmt)
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(text, fmt).ok().map(|dt| dt.date())),
        None => DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
            .or_else(|| parse_datetime(text, None).map(|dt| dt.date())),
    }
}

/// Parse a datetime, using `format` when given and the ISO forms otherwise.
///
/// A bare date parses as midnight.
pub(crate) fn parse_datetime(text: &str, format: Option<&str>) -> Option<NaiveDateTime> {
    let text = text.trim();
    let parsed = match format {
        Some(fmt) => NaiveDateTime::parse_from_str(text, fmt).ok().or_else(|| {
            NaiveDate::parse_from_str(text, fmt)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        }),
        None => DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok()),
    };
    parsed.or_else(|| {
        if format.is_some() {
            return None;
        }
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}
