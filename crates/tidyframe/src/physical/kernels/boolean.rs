use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray};

use super::{align, as_boolean, dtype_of, null_mask};
use crate::expr::Operator;
use crate::types::{cast_array, DType};
use crate::{DataFrameError, Result};

fn to_boolean(array: &ArrayRef) -> Result<ArrayRef> {
    match dtype_of(array.as_ref())? {
        DType::Boolean => Ok(array.clone()),
        DType::Null => cast_array(array, DType::Boolean),
        other => Err(DataFrameError::type_mismatch(
            None::<String>,
            DType::Boolean.to_string(),
            other.to_string(),
        )),
    }
}

/// Kleene `AND` / `OR`: `false & null = false`, `true | null = true`.
pub(crate) fn logical(op: Operator, lhs: &ArrayRef, rhs: &ArrayRef) -> Result<ArrayRef> {
    let (lhs, rhs) = align(lhs, rhs)?;
    let lhs = to_boolean(&lhs)?;
    let rhs = to_boolean(&rhs)?;
    let l = as_boolean(lhs.as_ref())?;
    let r = as_boolean(rhs.as_ref())?;
    let out = match op {
        Operator::And => arrow::compute::kernels::boolean::and_kleene(l, r),
        Operator::Or => arrow::compute::kernels::boolean::or_kleene(l, r),
        other => {
            return Err(DataFrameError::invalid_argument(format!(
                "{other:?} is not a logical operator"
            )))
        }
    }
    .map_err(|source| DataFrameError::Arrow { source })?;
    Ok(Arc::new(out))
}

pub(crate) fn not(array: &ArrayRef) -> Result<ArrayRef> {
    let array = to_boolean(array)?;
    let b = as_boolean(array.as_ref())?;
    Ok(Arc::new(
        arrow::compute::not(b).map_err(|source| DataFrameError::Arrow { source })?,
    ))
}

pub(crate) fn is_null(array: &ArrayRef) -> ArrayRef {
    let out: BooleanArray = null_mask(array.as_ref()).into_iter().map(Some).collect();
    Arc::new(out)
}

pub(crate) fn is_not_null(array: &ArrayRef) -> ArrayRef {
    let out: BooleanArray = null_mask(array.as_ref())
        .into_iter()
        .map(|null| Some(!null))
        .collect();
    Arc::new(out)
}

/// Rows where the predicate is exactly `true`; null counts as not true.
pub(crate) fn true_mask(predicate: &ArrayRef) -> Result<BooleanArray> {
    let predicate = to_boolean(predicate)?;
    let b = as_boolean(predicate.as_ref())?;
    Ok(b.iter().map(|v| Some(v == Some(true))).collect())
}
