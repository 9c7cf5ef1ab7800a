use std::sync::Arc;

use arrow::array::{new_null_array, Array, ArrayRef, BooleanArray, Int64Array, StringArray};
use regex::Regex;

use super::{as_utf8, broadcast, common_len, dtype_of};
use crate::expr::StringFunc;
use crate::types::{cast_array, DType};
use crate::{DataFrameError, Result};

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|err| {
        DataFrameError::invalid_argument(format!("invalid pattern '{pattern}': {err}"))
    })
}

fn output_dtype(func: &StringFunc) -> DType {
    match func {
        StringFunc::Length => DType::Int64,
        StringFunc::StartsWith(_) | StringFunc::EndsWith(_) | StringFunc::Detect { .. } => {
            DType::Boolean
        }
        _ => DType::Utf8,
    }
}

fn map_str(values: &StringArray, f: impl Fn(&str) -> Option<String>) -> ArrayRef {
    let out: StringArray = values.iter().map(|v| v.and_then(&f)).collect();
    Arc::new(out)
}

fn map_bool(values: &StringArray, f: impl Fn(&str) -> bool) -> ArrayRef {
    let out: BooleanArray = values.iter().map(|v| v.map(&f)).collect();
    Arc::new(out)
}

/// Apply a string function to a `Utf8` column (a `Null` column yields nulls).
pub(crate) fn string(func: &StringFunc, array: &ArrayRef) -> Result<ArrayRef> {
    match dtype_of(array.as_ref())? {
        DType::Utf8 => {}
        DType::Null => return Ok(new_null_array(&output_dtype(func).to_arrow(), array.len())),
        other => {
            return Err(DataFrameError::type_mismatch(
                None::<String>,
                DType::Utf8.to_string(),
                other.to_string(),
            ))
        }
    }
    let values = as_utf8(array.as_ref())?;

    Ok(match func {
        StringFunc::ToUpper => map_str(values, |s| Some(s.to_uppercase())),
        StringFunc::ToLower => map_str(values, |s| Some(s.to_lowercase())),
        StringFunc::Trim => map_str(values, |s| Some(s.trim().to_string())),
        StringFunc::TrimStart => map_str(values, |s| Some(s.trim_start().to_string())),
        StringFunc::TrimEnd => map_str(values, |s| Some(s.trim_end().to_string())),
        StringFunc::Length => {
            let out: Int64Array = values
                .iter()
                .map(|v| v.map(|s| s.chars().count() as i64))
                .collect();
            Arc::new(out)
        }
        StringFunc::StartsWith(prefix) => map_bool(values, |s| s.starts_with(prefix.as_str())),
        StringFunc::EndsWith(suffix) => map_bool(values, |s| s.ends_with(suffix.as_str())),
        StringFunc::Detect { pattern, negate } => {
            let re = compile(pattern)?;
            map_bool(values, |s| re.is_match(s) != *negate)
        }
        StringFunc::Replace {
            pattern,
            replacement,
            all,
        } => {
            let re = compile(pattern)?;
            map_str(values, |s| {
                Some(if *all {
                    re.replace_all(s, replacement.as_str()).into_owned()
                } else {
                    re.replace(s, replacement.as_str()).into_owned()
                })
            })
        }
        StringFunc::Extract { pattern, group } => {
            let re = compile(pattern)?;
            map_str(values, |s| {
                re.captures(s)
                    .and_then(|caps| caps.get(*group))
                    .map(|m| m.as_str().to_string())
            })
        }
        StringFunc::Sub { start, end } => {
            map_str(values, |s| Some(substring(s, *start, *end)))
        }
    })
}

/// 1-based inclusive character slice; negative positions count from the end.
fn substring(s: &str, start: i64, end: Option<i64>) -> String {
    let n = s.chars().count() as i64;
    let resolve = |pos: i64| if pos < 0 { n + pos + 1 } else { pos };
    let from = resolve(start).max(1);
    let to = resolve(end.unwrap_or(-1)).min(n);
    if from > to {
        return String::new();
    }
    s.chars()
        .skip((from - 1) as usize)
        .take((to - from + 1) as usize)
        .collect()
}

/// Paste columns together row by row; a null in any input gives null.
pub(crate) fn concat(arrays: &[ArrayRef], sep: &str) -> Result<ArrayRef> {
    let lens: Vec<usize> = arrays.iter().map(|a| a.len()).collect();
    let len = common_len(&lens)?;
    let parts = arrays
        .iter()
        .map(|a| cast_array(&broadcast(a, len)?, DType::Utf8))
        .collect::<Result<Vec<_>>>()?;
    let parts = parts
        .iter()
        .map(|a| as_utf8(a.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    let out: StringArray = (0..len)
        .map(|row| {
            let pieces = parts
                .iter()
                .map(|p| p.is_valid(row).then(|| p.value(row)))
                .collect::<Option<Vec<_>>>()?;
            Some(pieces.join(sep))
        })
        .collect();
    Ok(Arc::new(out))
}

/// Split on a literal separator into exactly `parts` pieces.
///
/// The last piece keeps any remainder; missing pieces are null.
pub(crate) fn split_fixed(array: &ArrayRef, sep: &str, parts: usize) -> Result<Vec<ArrayRef>> {
    let array = cast_array(array, DType::Utf8)?;
    let values = as_utf8(array.as_ref())?;
    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(values.len()); parts];
    for value in values.iter() {
        let mut pieces = value.map(|s| s.splitn(parts, sep).map(str::to_string).collect::<Vec<_>>());
        for (idx, column) in columns.iter_mut().enumerate() {
            let piece = pieces.as_mut().and_then(|p| {
                if idx < p.len() {
                    Some(std::mem::take(&mut p[idx]))
                } else {
                    None
                }
            });
            column.push(piece);
        }
    }
    Ok(columns
        .into_iter()
        .map(|c| Arc::new(StringArray::from(c)) as ArrayRef)
        .collect())
}
