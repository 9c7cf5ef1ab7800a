use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::{new_null_array, Array, ArrayRef, BooleanArray};
use arrow::datatypes::DataType;

use super::{align, dtype_of};
use crate::dataframe::key::key_values;
use crate::expr::Operator;
use crate::types::{cast_array, DType, Scalar};
use crate::{DataFrameError, Result};

/// Elementwise comparison; operands are promoted to their supertype first.
pub(crate) fn compare(op: Operator, lhs: &ArrayRef, rhs: &ArrayRef) -> Result<ArrayRef> {
    let (lhs, rhs) = align(lhs, rhs)?;
    let target = dtype_of(lhs.as_ref())?.try_supertype(&dtype_of(rhs.as_ref())?)?;
    if target == DType::Null
        || lhs.data_type() == &DataType::Null
        || rhs.data_type() == &DataType::Null
    {
        return Ok(new_null_array(&DataType::Boolean, lhs.len()));
    }
    let lhs = cast_array(&lhs, target)?;
    let rhs = cast_array(&rhs, target)?;
    let l = lhs.as_ref();
    let r = rhs.as_ref();

    use arrow::compute::kernels::cmp;
    let out = match op {
        Operator::Eq => cmp::eq(&l, &r),
        Operator::Neq => cmp::neq(&l, &r),
        Operator::Gt => cmp::gt(&l, &r),
        Operator::Lt => cmp::lt(&l, &r),
        Operator::Ge => cmp::gt_eq(&l, &r),
        Operator::Le => cmp::lt_eq(&l, &r),
        other => {
            return Err(DataFrameError::invalid_argument(format!(
                "{other:?} is not a comparison operator"
            )))
        }
    }
    .map_err(|source| DataFrameError::Arrow { source })?;
    Ok(Arc::new(out))
}

/// Membership test against a literal set.
///
/// Never null: a null row is `true` only when the set itself contains null.
pub(crate) fn is_in(array: &ArrayRef, values: &[Scalar]) -> Result<ArrayRef> {
    let dtype = dtype_of(array.as_ref())?;
    let mut target_dtype = dtype;
    for v in values {
        target_dtype = target_dtype.try_supertype(&v.dtype())?;
    }
    let column = cast_array(array, target_dtype)?;
    let set_values = values
        .iter()
        .map(|v| cast_array(&v.to_array(1), target_dtype))
        .collect::<Result<Vec<_>>>()?;

    let mut set = HashSet::with_capacity(set_values.len());
    for v in &set_values {
        set.extend(key_values(v)?);
    }
    let out: BooleanArray = key_values(&column)?
        .into_iter()
        .map(|k| Some(set.contains(&k)))
        .collect();
    Ok(Arc::new(out))
}
