use std::fmt;
use std::sync::Arc;

use arrow::array::{
    new_null_array, ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray,
    TimestampMicrosecondArray, TimestampMillisecondArray,
};
use chrono::{NaiveDate, NaiveDateTime};

use super::{date_to_days, datetime_to_ticks, format_date, format_datetime, DType, TimeUnit};

/// Scalar literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Null literal.
    Null,
    /// Boolean literal.
    Boolean(bool),
    /// 64-bit signed integer literal.
    Int64(i64),
    /// 64-bit float literal.
    Float64(f64),
    /// UTF-8 string literal.
    Utf8(String),
    /// Days since the Unix epoch.
    Date(i32),
    /// Ticks since the Unix epoch.
    Datetime(i64, TimeUnit),
}

impl Scalar {
    /// The dtype a column built from this value would have.
    pub fn dtype(&self) -> DType {
        match self {
            Scalar::Null => DType::Null,
            Scalar::Boolean(_) => DType::Boolean,
            Scalar::Int64(_) => DType::Int64,
            Scalar::Float64(_) => DType::Float64,
            Scalar::Utf8(_) => DType::Utf8,
            Scalar::Date(_) => DType::Date,
            Scalar::Datetime(_, unit) => DType::Datetime(*unit),
        }
    }

    /// Returns `true` for [`Scalar::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Numeric view of the value (`Int64`, `Float64` and `Boolean` only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int64(v) => Some(*v as f64),
            Scalar::Float64(v) => Some(*v),
            Scalar::Boolean(v) => Some(if *v { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Utf8(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Repeat this value `len` times as an Arrow array.
    pub fn to_array(&self, len: usize) -> ArrayRef {
        match self {
            Scalar::Null => new_null_array(&DType::Null.to_arrow(), len),
            Scalar::Boolean(v) => Arc::new(BooleanArray::from(vec![*v; len])),
            Scalar::Int64(v) => Arc::new(Int64Array::from(vec![*v; len])),
            Scalar::Float64(v) => Arc::new(Float64Array::from(vec![*v; len])),
            Scalar::Utf8(v) => Arc::new(StringArray::from(vec![v.as_str(); len])),
            Scalar::Date(v) => Arc::new(Date32Array::from(vec![*v; len])),
            Scalar::Datetime(v, TimeUnit::Millisecond) => {
                Arc::new(TimestampMillisecondArray::from(vec![*v; len]))
            }
            Scalar::Datetime(v, TimeUnit::Microsecond) => {
                Arc::new(TimestampMicrosecondArray::from(vec![*v; len]))
            }
        }
    }
}

impl fmt::Display for Scalar {
    /// Canonical text rendering, matching a cast to `Utf8`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Boolean(v) => write!(f, "{v}"),
            Scalar::Int64(v) => write!(f, "{v}"),
            Scalar::Float64(v) => write!(f, "{v}"),
            Scalar::Utf8(v) => f.write_str(v),
            Scalar::Date(v) => match format_date(*v) {
                Some(s) => f.write_str(&s),
                None => write!(f, "{v}"),
            },
            Scalar::Datetime(v, unit) => match format_datetime(*v, *unit) {
                Some(s) => f.write_str(&s),
                None => write!(f, "{v}"),
            },
        }
    }
}

impl From<()> for Scalar {
    fn from(_: ()) -> Self {
        Scalar::Null
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Boolean(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int64(i64::from(v))
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int64(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float64(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Utf8(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Utf8(v)
    }
}

impl From<NaiveDate> for Scalar {
    fn from(v: NaiveDate) -> Self {
        Scalar::Date(date_to_days(v))
    }
}

impl From<NaiveDateTime> for Scalar {
    fn from(v: NaiveDateTime) -> Self {
        Scalar::Datetime(
            datetime_to_ticks(v, TimeUnit::Microsecond),
            TimeUnit::Microsecond,
        )
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Scalar::Null)
    }
}
