//! Typed compute kernels over normalized Arrow arrays.
//!
//! Every array reaching a kernel has one of the Arrow types produced by
//! [`DType::to_arrow`]; the downcast helpers below report anything else as a
//! `TypeMismatch`.

pub(crate) mod aggregate;
pub(crate) mod arithmetic;
pub(crate) mod boolean;
pub(crate) mod compare;
pub(crate) mod string;
pub(crate) mod temporal;
pub(crate) mod window;

use std::sync::Arc;

use arrow::array::{
    new_null_array, Array, ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array,
    StringArray, TimestampMicrosecondArray, TimestampMillisecondArray, UInt64Array,
};
use arrow::datatypes::{DataType, TimeUnit as ArrowTimeUnit};

use crate::types::{cast_array, DType, TimeUnit};
use crate::{DataFrameError, Result};

fn downcast_error(expected: &str, array: &dyn Array) -> DataFrameError {
    DataFrameError::type_mismatch(None::<String>, expected, array.data_type().to_string())
}

pub(crate) fn dtype_of(array: &dyn Array) -> Result<DType> {
    DType::from_arrow(array.data_type())
}

pub(crate) fn as_boolean(array: &dyn Array) -> Result<&BooleanArray> {
    array
        .as_any()
        .downcast_ref::<BooleanArray>()
        .ok_or_else(|| downcast_error("Boolean", array))
}

pub(crate) fn as_int64(array: &dyn Array) -> Result<&Int64Array> {
    array
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| downcast_error("Int64", array))
}

pub(crate) fn as_float64(array: &dyn Array) -> Result<&Float64Array> {
    array
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| downcast_error("Float64", array))
}

pub(crate) fn as_utf8(array: &dyn Array) -> Result<&StringArray> {
    array
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| downcast_error("Utf8", array))
}

pub(crate) fn as_date32(array: &dyn Array) -> Result<&Date32Array> {
    array
        .as_any()
        .downcast_ref::<Date32Array>()
        .ok_or_else(|| downcast_error("Date", array))
}

/// Raw ticks of a `Datetime` array and its unit.
pub(crate) fn ticks(array: &dyn Array) -> Result<(Vec<Option<i64>>, TimeUnit)> {
    match array.data_type() {
        DataType::Timestamp(ArrowTimeUnit::Millisecond, _) => {
            let values = array
                .as_any()
                .downcast_ref::<TimestampMillisecondArray>()
                .ok_or_else(|| downcast_error("Datetime(ms)", array))?;
            Ok((values.iter().collect(), TimeUnit::Millisecond))
        }
        DataType::Timestamp(ArrowTimeUnit::Microsecond, _) => {
            let values = array
                .as_any()
                .downcast_ref::<TimestampMicrosecondArray>()
                .ok_or_else(|| downcast_error("Datetime(us)", array))?;
            Ok((values.iter().collect(), TimeUnit::Microsecond))
        }
        _ => Err(downcast_error("Datetime", array)),
    }
}

pub(crate) fn datetime_array(
    values: impl IntoIterator<Item = Option<i64>>,
    unit: TimeUnit,
) -> ArrayRef {
    match unit {
        TimeUnit::Millisecond => Arc::new(values.into_iter().collect::<TimestampMillisecondArray>()),
        TimeUnit::Microsecond => Arc::new(values.into_iter().collect::<TimestampMicrosecondArray>()),
    }
}

/// Numeric view of an `Int64`, `Float64`, `Boolean` or `Null` array.
pub(crate) fn f64_values(array: &dyn Array) -> Result<Vec<Option<f64>>> {
    match dtype_of(array)? {
        DType::Null => Ok(vec![None; array.len()]),
        DType::Int64 => Ok(as_int64(array)?.iter().map(|v| v.map(|v| v as f64)).collect()),
        DType::Float64 => Ok(as_float64(array)?.iter().collect()),
        DType::Boolean => Ok(as_boolean(array)?
            .iter()
            .map(|v| v.map(|b| if b { 1.0 } else { 0.0 }))
            .collect()),
        other => Err(DataFrameError::type_mismatch(
            None::<String>,
            "numeric",
            other.to_string(),
        )),
    }
}

/// Per-row null flags, treating every slot of a `Null` array as null.
pub(crate) fn null_mask(array: &dyn Array) -> Vec<bool> {
    match array.logical_nulls() {
        Some(nulls) => (0..array.len()).map(|i| nulls.is_null(i)).collect(),
        None => vec![false; array.len()],
    }
}

/// Length shared by `lens` after broadcasting length-1 operands.
pub(crate) fn common_len(lens: &[usize]) -> Result<usize> {
    let mut out: Option<usize> = None;
    for &len in lens {
        if len == 1 {
            continue;
        }
        match out {
            None => out = Some(len),
            Some(existing) if existing == len => {}
            Some(existing) => {
                return Err(DataFrameError::shape_mismatch(format!(
                    "operands have lengths {existing} and {len}"
                )))
            }
        }
    }
    Ok(out.unwrap_or(if lens.is_empty() { 0 } else { 1 }))
}

/// Repeat a length-1 array to `len` rows; arrays already of `len` pass through.
pub(crate) fn broadcast(array: &ArrayRef, len: usize) -> Result<ArrayRef> {
    if array.len() == len {
        return Ok(array.clone());
    }
    if array.len() != 1 {
        return Err(DataFrameError::shape_mismatch(format!(
            "expected {len} values, got {}",
            array.len()
        )));
    }
    let indices = UInt64Array::from(vec![0_u64; len]);
    arrow::compute::take(array.as_ref(), &indices, None)
        .map_err(|source| DataFrameError::Arrow { source })
}

/// Broadcast both operands to their common length.
pub(crate) fn align(lhs: &ArrayRef, rhs: &ArrayRef) -> Result<(ArrayRef, ArrayRef)> {
    let len = common_len(&[lhs.len(), rhs.len()])?;
    Ok((broadcast(lhs, len)?, broadcast(rhs, len)?))
}

pub(crate) fn take(array: &ArrayRef, indices: &[usize]) -> Result<ArrayRef> {
    let indices = UInt64Array::from_iter_values(indices.iter().map(|&i| i as u64));
    arrow::compute::take(array.as_ref(), &indices, None)
        .map_err(|source| DataFrameError::Arrow { source })
}

/// Gather rows where `None` positions produce nulls.
pub(crate) fn take_optional(array: &ArrayRef, indices: &[Option<usize>]) -> Result<ArrayRef> {
    if array.data_type() == &DataType::Null {
        return Ok(new_null_array(&DataType::Null, indices.len()));
    }
    let indices: UInt64Array = indices.iter().map(|i| i.map(|i| i as u64)).collect();
    arrow::compute::take(array.as_ref(), &indices, None)
        .map_err(|source| DataFrameError::Arrow { source })
}

/// Supertype of every array's dtype, or `TypeMismatch` when there is none.
pub(crate) fn supertype_of(arrays: &[ArrayRef]) -> Result<DType> {
    let mut out = DType::Null;
    for array in arrays {
        out = out.try_supertype(&dtype_of(array.as_ref())?)?;
    }
    Ok(out)
}

/// Cast every array to the supertype of all of them.
pub(crate) fn unify(arrays: &[ArrayRef]) -> Result<(DType, Vec<ArrayRef>)> {
    let target = supertype_of(arrays)?;
    let cast = arrays
        .iter()
        .map(|a| cast_array(a, target))
        .collect::<Result<Vec<_>>>()?;
    Ok((target, cast))
}

/// Concatenate arrays after promoting them to a common dtype.
pub(crate) fn concat_unified(arrays: &[ArrayRef]) -> Result<ArrayRef> {
    let (target, arrays) = unify(arrays)?;
    if arrays.is_empty() {
        return Ok(new_null_array(&target.to_arrow(), 0));
    }
    if arrays.len() == 1 {
        return Ok(arrays[0].clone());
    }
    let refs: Vec<&dyn Array> = arrays.iter().map(|a| a.as_ref()).collect();
    arrow::compute::concat(&refs).map_err(|source| DataFrameError::Arrow { source })
}

/// Pick row `row` of `arrays[which]` for each `(which, row)` pair.
pub(crate) fn interleave(arrays: &[ArrayRef], indices: &[(usize, usize)]) -> Result<ArrayRef> {
    let (target, arrays) = unify(arrays)?;
    if target == DType::Null {
        return Ok(new_null_array(&DataType::Null, indices.len()));
    }
    let refs: Vec<&dyn Array> = arrays.iter().map(|a| a.as_ref()).collect();
    arrow::compute::interleave(&refs, indices).map_err(|source| DataFrameError::Arrow { source })
}
