use std::collections::HashMap;

use arrow::array::{Array, ArrayRef};

use crate::physical::kernels::{as_boolean, as_date32, as_float64, as_int64, as_utf8, dtype_of, ticks};
use crate::types::DType;
use crate::Result;

/// Hashable form of one cell, used for grouping, joins and de-duplication.
///
/// Null is an ordinary key component equal only to other nulls; floats compare
/// by normalized bit pattern so `-0.0 == 0.0` and all NaNs are one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum KeyValue {
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(u64),
    Utf8(String),
    Date(i32),
    Datetime(i64),
}

impl KeyValue {
    pub(crate) fn is_null(&self) -> bool {
        matches!(self, KeyValue::Null)
    }
}

/// Composite key of one row across several key columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct GroupKey(pub(crate) Vec<KeyValue>);

impl GroupKey {
    pub(crate) fn has_null(&self) -> bool {
        self.0.iter().any(KeyValue::is_null)
    }
}

fn float_key(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0.0_f64.to_bits()
    } else {
        v.to_bits()
    }
}

fn collect<T>(
    values: impl Iterator<Item = Option<T>>,
    f: impl Fn(T) -> KeyValue,
) -> Vec<KeyValue> {
    values
        .map(|v| v.map(&f).unwrap_or(KeyValue::Null))
        .collect()
}

/// Key of every row of one column.
pub(crate) fn key_values(array: &ArrayRef) -> Result<Vec<KeyValue>> {
    let array: &dyn Array = array.as_ref();
    Ok(match dtype_of(array)? {
        DType::Null => vec![KeyValue::Null; array.len()],
        DType::Boolean => collect(as_boolean(array)?.iter(), KeyValue::Boolean),
        DType::Int64 => collect(as_int64(array)?.iter(), KeyValue::Int64),
        DType::Float64 => collect(as_float64(array)?.iter(), |v| KeyValue::Float64(float_key(v))),
        DType::Utf8 => collect(as_utf8(array)?.iter(), |v| KeyValue::Utf8(v.to_string())),
        DType::Date => collect(as_date32(array)?.iter(), KeyValue::Date),
        DType::Datetime(_) => collect(ticks(array)?.0.into_iter(), KeyValue::Datetime),
    })
}

/// Composite keys for `rows` rows over `columns`.
pub(crate) fn group_keys(columns: &[ArrayRef], rows: usize) -> Result<Vec<GroupKey>> {
    let per_column = columns
        .iter()
        .map(key_values)
        .collect::<Result<Vec<_>>>()?;
    let mut keys: Vec<GroupKey> = (0..rows)
        .map(|_| GroupKey(Vec::with_capacity(columns.len())))
        .collect();
    for column in per_column {
        for (key, value) in keys.iter_mut().zip(column) {
            key.0.push(value);
        }
    }
    Ok(keys)
}

/// Partition row indices by key, in first-seen key order.
pub(crate) fn partition(keys: &[GroupKey]) -> Vec<Vec<usize>> {
    let mut index: HashMap<&GroupKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (row, key) in keys.iter().enumerate() {
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(row);
    }
    groups
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};

    use super::*;

    #[test]
    fn partition_keeps_first_seen_order_and_null_groups() {
        let a: ArrayRef = Arc::new(StringArray::from(vec![
            Some("b"),
            None,
            Some("a"),
            Some("b"),
            None,
        ]));
        let keys = group_keys(&[a], 5).unwrap();
        assert_eq!(partition(&keys), vec![vec![0, 3], vec![1, 4], vec![2]]);
    }

    #[test]
    fn composite_keys_and_float_normalization() {
        let a: ArrayRef = Arc::new(Int64Array::from(vec![1, 1, 1]));
        let b: ArrayRef = Arc::new(Float64Array::from(vec![0.0, -0.0, 1.0]));
        let keys = group_keys(&[a, b], 3).unwrap();
        assert_eq!(keys[0], keys[1]);
        assert_ne!(keys[0], keys[2]);
        assert!(!keys[0].has_null());
    }
}
