use std::sync::Arc;

use arrow::array::{new_null_array, ArrayRef, Float64Array, Int64Array};

use super::{align, as_float64, as_int64, dtype_of, f64_values};
use crate::expr::{MathFunc, Operator};
use crate::types::{cast_array, DType};
use crate::{DataFrameError, Result};

/// Elementwise arithmetic with null propagation.
///
/// `Int64` operands use checked arithmetic (overflow yields null); `/` always
/// produces `Float64`; `%` takes the sign of the divisor.
pub(crate) fn arithmetic(op: Operator, lhs: &ArrayRef, rhs: &ArrayRef) -> Result<ArrayRef> {
    let (lhs, rhs) = align(lhs, rhs)?;
    let lt = dtype_of(lhs.as_ref())?;
    let rt = dtype_of(rhs.as_ref())?;
    let target = lt.try_supertype(&rt)?;
    let target = match (op, target) {
        (Operator::Div, DType::Int64 | DType::Null) => DType::Float64,
        (_, DType::Null) => DType::Null,
        (_, t @ (DType::Int64 | DType::Float64)) => t,
        (_, other) => {
            return Err(DataFrameError::type_mismatch(
                None::<String>,
                "numeric operands",
                other.to_string(),
            ))
        }
    };
    if lt == DType::Null || rt == DType::Null {
        return Ok(new_null_array(&target.to_arrow(), lhs.len()));
    }

    let lhs = cast_array(&lhs, target)?;
    let rhs = cast_array(&rhs, target)?;
    match target {
        DType::Int64 => {
            let l = as_int64(lhs.as_ref())?;
            let r = as_int64(rhs.as_ref())?;
            let f = int_op(op)?;
            let out: Int64Array = l
                .iter()
                .zip(r.iter())
                .map(|(a, b)| match (a, b) {
                    (Some(a), Some(b)) => f(a, b),
                    _ => None,
                })
                .collect();
            Ok(Arc::new(out))
        }
        _ => {
            let l = as_float64(lhs.as_ref())?;
            let r = as_float64(rhs.as_ref())?;
            let f = float_op(op)?;
            let out: Float64Array = l
                .iter()
                .zip(r.iter())
                .map(|(a, b)| match (a, b) {
                    (Some(a), Some(b)) => Some(f(a, b)),
                    _ => None,
                })
                .collect();
            Ok(Arc::new(out))
        }
    }
}

fn int_op(op: Operator) -> Result<fn(i64, i64) -> Option<i64>> {
    let f: fn(i64, i64) -> Option<i64> = match op {
        Operator::Add => |a: i64, b: i64| a.checked_add(b),
        Operator::Sub => |a: i64, b: i64| a.checked_sub(b),
        Operator::Mul => |a: i64, b: i64| a.checked_mul(b),
        Operator::Rem => |a: i64, b: i64| {
            a.checked_rem(b)
                .map(|r| if r != 0 && (r < 0) != (b < 0) { r + b } else { r })
        },
        Operator::Pow => |a: i64, b: i64| u32::try_from(b).ok().and_then(|b| a.checked_pow(b)),
        other => return Err(not_arithmetic(other)),
    };
    Ok(f)
}

fn float_op(op: Operator) -> Result<fn(f64, f64) -> f64> {
    let f: fn(f64, f64) -> f64 = match op {
        Operator::Add => |a: f64, b: f64| a + b,
        Operator::Sub => |a: f64, b: f64| a - b,
        Operator::Mul => |a: f64, b: f64| a * b,
        Operator::Div => |a: f64, b: f64| a / b,
        Operator::Rem => |a: f64, b: f64| {
            let r = a % b;
            if r != 0.0 && (r < 0.0) != (b < 0.0) {
                r + b
            } else {
                r
            }
        },
        Operator::Pow => |a: f64, b: f64| a.powf(b),
        other => return Err(not_arithmetic(other)),
    };
    Ok(f)
}

fn not_arithmetic(op: Operator) -> DataFrameError {
    DataFrameError::invalid_argument(format!("{op:?} is not an arithmetic operator"))
}

/// Unary minus.
pub(crate) fn negate(array: &ArrayRef) -> Result<ArrayRef> {
    match dtype_of(array.as_ref())? {
        DType::Null => Ok(array.clone()),
        DType::Int64 => {
            let values = as_int64(array.as_ref())?;
            let out: Int64Array = values.iter().map(|v| v.and_then(i64::checked_neg)).collect();
            Ok(Arc::new(out))
        }
        DType::Float64 => {
            let values = as_float64(array.as_ref())?;
            let out: Float64Array = values.iter().map(|v| v.map(|v| -v)).collect();
            Ok(Arc::new(out))
        }
        other => Err(DataFrameError::type_mismatch(
            None::<String>,
            "numeric",
            other.to_string(),
        )),
    }
}

/// Elementwise math functions.
///
/// `abs`, `floor`, `ceil` and `round` keep `Int64` columns integral; the rest
/// always produce `Float64`.
pub(crate) fn math(func: MathFunc, array: &ArrayRef) -> Result<ArrayRef> {
    let dtype = dtype_of(array.as_ref())?;
    if !matches!(dtype, DType::Null | DType::Int64 | DType::Float64) {
        return Err(DataFrameError::type_mismatch(
            None::<String>,
            "numeric",
            dtype.to_string(),
        ));
    }

    if dtype == DType::Int64 {
        let values = as_int64(array.as_ref())?;
        match func {
            MathFunc::Abs => {
                let out: Int64Array = values.iter().map(|v| v.and_then(i64::checked_abs)).collect();
                return Ok(Arc::new(out));
            }
            MathFunc::Floor | MathFunc::Ceil => return Ok(array.clone()),
            MathFunc::Round(digits) if digits >= 0 => return Ok(array.clone()),
            MathFunc::Round(digits) => {
                let scale = 10_f64.powi(-digits);
                let out: Int64Array = values
                    .iter()
                    .map(|v| v.map(|v| ((v as f64 / scale).round() * scale) as i64))
                    .collect();
                return Ok(Arc::new(out));
            }
            _ => {}
        }
    }

    let values = f64_values(array.as_ref())?;
    let f: Box<dyn Fn(f64) -> f64> = match func {
        MathFunc::Abs => Box::new(f64::abs),
        MathFunc::Floor => Box::new(f64::floor),
        MathFunc::Ceil => Box::new(f64::ceil),
        MathFunc::Sqrt => Box::new(f64::sqrt),
        MathFunc::Log => Box::new(f64::ln),
        MathFunc::Log10 => Box::new(f64::log10),
        MathFunc::Exp => Box::new(f64::exp),
        MathFunc::Round(digits) => {
            let scale = 10_f64.powi(digits);
            Box::new(move |v: f64| (v * scale).round() / scale)
        }
    };
    let out: Float64Array = values.into_iter().map(|v| v.map(&f)).collect();
    Ok(Arc::new(out))
}
