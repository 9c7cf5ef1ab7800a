use std::sync::Arc;

use arrow::array::{new_null_array, ArrayRef, Int64Array};

use super::{dtype_of, interleave, null_mask, take_optional};
use crate::expr::FillStrategy;
use crate::types::{DType, Scalar};
use crate::Result;

/// Shift values by `offset` rows (positive lags, negative leads).
///
/// Vacated positions take `default` when given, otherwise null. Nulls already
/// present in the input are shifted as-is.
pub(crate) fn shift(array: &ArrayRef, offset: i64, default: Option<&Scalar>) -> Result<ArrayRef> {
    let len = array.len();
    let fill = match default {
        Some(v) => v.to_array(1),
        None => new_null_array(array.data_type(), 1),
    };
    if dtype_of(array.as_ref())? == DType::Null && fill.data_type() == array.data_type() {
        return Ok(new_null_array(array.data_type(), len));
    }
    let indices: Vec<(usize, usize)> = (0..len)
        .map(|row| {
            match (row as i64).checked_sub(offset) {
                Some(src) if src >= 0 && (src as usize) < len => (0, src as usize),
                _ => (1, 0),
            }
        })
        .collect();
    interleave(&[array.clone(), fill], &indices)
}

/// 1-based position of each row.
pub(crate) fn row_number(len: usize) -> ArrayRef {
    Arc::new(Int64Array::from_iter_values(1..=len as i64))
}

/// Replace nulls with the nearest non-null value in the given direction.
pub(crate) fn fill_null(array: &ArrayRef, strategy: FillStrategy) -> Result<ArrayRef> {
    let nulls = null_mask(array.as_ref());
    let len = nulls.len();
    let mut indices: Vec<Option<usize>> = vec![None; len];
    match strategy {
        FillStrategy::Forward => {
            let mut last = None;
            for row in 0..len {
                if !nulls[row] {
                    last = Some(row);
                }
                indices[row] = last;
            }
        }
        FillStrategy::Backward => {
            let mut next = None;
            for row in (0..len).rev() {
                if !nulls[row] {
                    next = Some(row);
                }
                indices[row] = next;
            }
        }
    }
    take_optional(array, &indices)
}
