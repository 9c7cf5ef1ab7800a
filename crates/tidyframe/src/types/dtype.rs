use std::fmt;

use arrow::datatypes::{DataType, TimeUnit as ArrowTimeUnit};

use crate::{DataFrameError, Result};

/// Resolution of a `Datetime` column.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeUnit {
    /// Milliseconds since the Unix epoch.
    Millisecond,
    /// Microseconds since the Unix epoch.
    Microsecond,
}

impl TimeUnit {
    /// Ticks per second for this unit.
    pub fn ticks_per_second(self) -> i64 {
        match self {
            TimeUnit::Millisecond => 1_000,
            TimeUnit::Microsecond => 1_000_000,
        }
    }

    pub(crate) fn to_arrow(self) -> ArrowTimeUnit {
        match self {
            TimeUnit::Millisecond => ArrowTimeUnit::Millisecond,
            TimeUnit::Microsecond => ArrowTimeUnit::Microsecond,
        }
    }
}

/// Logical column types supported by the engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DType {
    /// Column with no typed values (every slot is null).
    Null,
    /// Boolean.
    Boolean,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit float.
    Float64,
    /// UTF-8 string.
    Utf8,
    /// Days since the Unix epoch.
    Date,
    /// Ticks since the Unix epoch at the given resolution.
    Datetime(TimeUnit),
}

impl DType {
    /// The Arrow type used to store columns of this dtype.
    pub fn to_arrow(&self) -> DataType {
        match self {
            DType::Null => DataType::Null,
            DType::Boolean => DataType::Boolean,
            DType::Int64 => DataType::Int64,
            DType::Float64 => DataType::Float64,
            DType::Utf8 => DataType::Utf8,
            DType::Date => DataType::Date32,
            DType::Datetime(unit) => DataType::Timestamp(unit.to_arrow(), None),
        }
    }

    /// Map an Arrow type to the dtype it is normalized to on ingestion.
    pub fn from_arrow(data_type: &DataType) -> Result<DType> {
        use arrow::datatypes::DataType::*;
        match data_type {
            Null => Ok(DType::Null),
            Boolean => Ok(DType::Boolean),
            Int8 | Int16 | Int32 | Int64 | UInt8 | UInt16 | UInt32 | UInt64 => Ok(DType::Int64),
            Float16 | Float32 | Float64 => Ok(DType::Float64),
            Utf8 | LargeUtf8 | Utf8View => Ok(DType::Utf8),
            Date32 | Date64 => Ok(DType::Date),
            Timestamp(ArrowTimeUnit::Second | ArrowTimeUnit::Millisecond, _) => {
                Ok(DType::Datetime(TimeUnit::Millisecond))
            }
            Timestamp(ArrowTimeUnit::Microsecond | ArrowTimeUnit::Nanosecond, _) => {
                Ok(DType::Datetime(TimeUnit::Microsecond))
            }
            other => Err(DataFrameError::type_mismatch(
                None::<String>,
                "supported column type",
                other.to_string(),
            )),
        }
    }

    /// Returns `true` for `Int64` and `Float64`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DType::Int64 | DType::Float64)
    }

    /// Returns `true` for `Date` and `Datetime`.
    pub fn is_temporal(&self) -> bool {
        matches!(self, DType::Date | DType::Datetime(_))
    }

    /// Smallest dtype both `self` and `other` convert to without losing meaning.
    ///
    /// Only `Null -> T`, `Int64 -> Float64` and millisecond to microsecond
    /// datetimes promote; every other mixed pair has no supertype.
    pub fn supertype(&self, other: &DType) -> Option<DType> {
        match (self, other) {
            (a, b) if a == b => Some(*a),
            (DType::Null, b) => Some(*b),
            (a, DType::Null) => Some(*a),
            (DType::Int64, DType::Float64) | (DType::Float64, DType::Int64) => {
                Some(DType::Float64)
            }
            (DType::Datetime(_), DType::Datetime(_)) => Some(DType::Datetime(TimeUnit::Microsecond)),
            _ => None,
        }
    }

    /// Like [`DType::supertype`] but reports a `TypeMismatch` when none exists.
    pub fn try_supertype(&self, other: &DType) -> Result<DType> {
        self.supertype(other).ok_or_else(|| {
            DataFrameError::type_mismatch(None::<String>, self.to_string(), other.to_string())
        })
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::Null => f.write_str("Null"),
            DType::Boolean => f.write_str("Boolean"),
            DType::Int64 => f.write_str("Int64"),
            DType::Float64 => f.write_str("Float64"),
            DType::Utf8 => f.write_str("Utf8"),
            DType::Date => f.write_str("Date"),
            DType::Datetime(TimeUnit::Millisecond) => f.write_str("Datetime(ms)"),
            DType::Datetime(TimeUnit::Microsecond) => f.write_str("Datetime(us)"),
        }
    }
}
