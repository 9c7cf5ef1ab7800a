use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::{new_null_array, Array, ArrayRef, Float64Array, Int64Array};

use super::{as_boolean, as_int64, as_utf8, dtype_of, f64_values, null_mask, take_optional};
use crate::dataframe::key::key_values;
use crate::expr::{AggFunc, PairFunc};
use crate::types::{cast_array, DType};
use crate::{DataFrameError, Result};

fn float(v: Option<f64>) -> ArrayRef {
    Arc::new(Float64Array::from(vec![v]))
}

fn int(v: Option<i64>) -> ArrayRef {
    Arc::new(Int64Array::from(vec![v]))
}

/// Reduce `array` to a single value.
///
/// Reductions over zero non-null values give null, except `sum`, `count`
/// and `n_distinct`, which give 0.
pub(crate) fn aggregate(func: AggFunc, array: &ArrayRef) -> Result<ArrayRef> {
    let dtype = dtype_of(array.as_ref())?;
    match func {
        AggFunc::Count => {
            let nulls = null_mask(array.as_ref()).into_iter().filter(|n| *n).count();
            Ok(int(Some((array.len() - nulls) as i64)))
        }
        AggFunc::NUnique => {
            let distinct: HashSet<_> = key_values(array)?.into_iter().collect();
            Ok(int(Some(distinct.len() as i64)))
        }
        AggFunc::First | AggFunc::Last => {
            let row = if array.is_empty() {
                None
            } else if func == AggFunc::First {
                Some(0)
            } else {
                Some(array.len() - 1)
            };
            take_optional(array, &[row])
        }
        AggFunc::Sum => sum(array, dtype),
        AggFunc::Min | AggFunc::Max => extreme(func, array, dtype),
        AggFunc::Mean => {
            let values = non_null_f64(array)?;
            Ok(float(mean(&values)))
        }
        AggFunc::Median => Ok(float(quantile(non_null_f64(array)?, 0.5))),
        AggFunc::Quantile(p) => {
            if !(0.0..=1.0).contains(&p) {
                return Err(DataFrameError::invalid_argument(format!(
                    "quantile must be within [0, 1], got {p}"
                )));
            }
            Ok(float(quantile(non_null_f64(array)?, p)))
        }
        AggFunc::Var => Ok(float(variance(&non_null_f64(array)?))),
        AggFunc::Std => Ok(float(variance(&non_null_f64(array)?).map(f64::sqrt))),
    }
}

fn non_null_f64(array: &ArrayRef) -> Result<Vec<f64>> {
    Ok(f64_values(array.as_ref())?.into_iter().flatten().collect())
}

fn sum(array: &ArrayRef, dtype: DType) -> Result<ArrayRef> {
    match dtype {
        DType::Null => Ok(int(Some(0))),
        DType::Boolean => {
            let values = as_boolean(array.as_ref())?;
            Ok(int(Some(values.true_count() as i64)))
        }
        DType::Int64 => {
            let values = as_int64(array.as_ref())?;
            let total = values
                .iter()
                .flatten()
                .try_fold(0_i64, |acc, v| acc.checked_add(v));
            Ok(int(total))
        }
        DType::Float64 => Ok(float(Some(non_null_f64(array)?.iter().sum()))),
        other => Err(DataFrameError::type_mismatch(
            None::<String>,
            "numeric",
            other.to_string(),
        )),
    }
}

fn extreme(func: AggFunc, array: &ArrayRef, dtype: DType) -> Result<ArrayRef> {
    let want = if func == AggFunc::Min {
        Ordering::Less
    } else {
        Ordering::Greater
    };
    let best = match dtype {
        DType::Null => return Ok(new_null_array(&DType::Null.to_arrow(), 1)),
        DType::Utf8 => {
            let values = as_utf8(array.as_ref())?;
            best_row(values.iter().enumerate(), want, |a, b| a.cmp(b))
        }
        DType::Float64 => {
            let values = f64_values(array.as_ref())?;
            best_row(values.into_iter().enumerate(), want, |a, b| a.total_cmp(b))
        }
        DType::Boolean => {
            let values = as_boolean(array.as_ref())?;
            best_row(values.iter().enumerate(), want, |a, b| a.cmp(b))
        }
        DType::Int64 | DType::Date | DType::Datetime(_) => {
            let as_int = cast_array(array, DType::Int64)?;
            let values = as_int64(as_int.as_ref())?;
            best_row(values.iter().enumerate(), want, |a, b| a.cmp(b))
        }
    };
    take_optional(array, &[best])
}

fn best_row<T>(
    values: impl Iterator<Item = (usize, Option<T>)>,
    want: Ordering,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Option<usize> {
    let mut best: Option<(usize, T)> = None;
    for (row, value) in values {
        let Some(value) = value else { continue };
        match &best {
            Some((_, current)) if cmp(&value, current) != want => {}
            _ => best = Some((row, value)),
        }
    }
    best.map(|(row, _)| row)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance (`n - 1` denominator).
fn variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(ss / (values.len() - 1) as f64)
}

/// Quantile with linear interpolation between order statistics.
fn quantile(mut values: Vec<f64>, p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let h = (values.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    Some(values[lo] + (h - lo as f64) * (values[hi] - values[lo]))
}

/// Covariance / correlation over pairwise-complete observations.
pub(crate) fn pairwise(func: PairFunc, x: &ArrayRef, y: &ArrayRef) -> Result<ArrayRef> {
    if x.len() != y.len() {
        return Err(DataFrameError::shape_mismatch(format!(
            "{func:?} needs equal lengths, got {} and {}",
            x.len(),
            y.len()
        )));
    }
    let pairs: Vec<(f64, f64)> = f64_values(x.as_ref())?
        .into_iter()
        .zip(f64_values(y.as_ref())?)
        .filter_map(|(a, b)| Some((a?, b?)))
        .collect();
    if pairs.len() < 2 {
        return Ok(new_null_array(&DType::Float64.to_arrow(), 1));
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let cov = pairs.iter().map(|(a, b)| (a - mx) * (b - my)).sum::<f64>() / (n - 1.0);
    let out = match func {
        PairFunc::Cov => Some(cov),
        PairFunc::Cor => {
            let sx = (pairs.iter().map(|p| (p.0 - mx).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();
            let sy = (pairs.iter().map(|p| (p.1 - my).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();
            if sx == 0.0 || sy == 0.0 {
                None
            } else {
                Some(cov / (sx * sy))
            }
        }
    };
    Ok(float(out))
}
