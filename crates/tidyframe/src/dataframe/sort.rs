use std::cmp::Ordering;

use crate::expr::{output_name, SortKey};
use crate::physical::kernels::{as_boolean, as_int64, as_utf8, f64_values};
use crate::physical::ExprEval;
use crate::types::{cast_array, DType};
use crate::{DataFrame, Result};

/// Materialized sort key values.
enum KeyColumn {
    Null,
    Boolean(Vec<Option<bool>>),
    Int64(Vec<Option<i64>>),
    Float64(Vec<Option<f64>>),
    Utf8(Vec<Option<String>>),
}

fn nulls_last<T>(a: &Option<T>, b: &Option<T>, descending: bool, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ord = cmp(a, b);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
    }
}

impl KeyColumn {
    fn compare(&self, a: usize, b: usize, descending: bool) -> Ordering {
        match self {
            KeyColumn::Null => Ordering::Equal,
            KeyColumn::Boolean(v) => nulls_last(&v[a], &v[b], descending, Ord::cmp),
            KeyColumn::Int64(v) => nulls_last(&v[a], &v[b], descending, Ord::cmp),
            KeyColumn::Float64(v) => nulls_last(&v[a], &v[b], descending, f64::total_cmp),
            KeyColumn::Utf8(v) => nulls_last(&v[a], &v[b], descending, Ord::cmp),
        }
    }
}

fn key_column(key: &SortKey, frame: &DataFrame) -> Result<KeyColumn> {
    let series = ExprEval::evaluate_column(&key.expr, frame, &output_name(&key.expr))?;
    let array = series.array();
    Ok(match series.dtype() {
        DType::Null => KeyColumn::Null,
        DType::Boolean => KeyColumn::Boolean(as_boolean(array.as_ref())?.iter().collect()),
        DType::Int64 => KeyColumn::Int64(as_int64(array.as_ref())?.iter().collect()),
        DType::Float64 => KeyColumn::Float64(f64_values(array.as_ref())?),
        DType::Utf8 => KeyColumn::Utf8(
            as_utf8(array.as_ref())?
                .iter()
                .map(|v| v.map(str::to_string))
                .collect(),
        ),
        DType::Date | DType::Datetime(_) => {
            let ints = cast_array(array, DType::Int64)?;
            KeyColumn::Int64(as_int64(ints.as_ref())?.iter().collect())
        }
    })
}

/// Row order for `keys`: stable, nulls last in either direction.
pub(crate) fn sort_indices(frame: &DataFrame, keys: &[SortKey]) -> Result<Vec<usize>> {
    let columns = keys
        .iter()
        .map(|k| Ok((key_column(k, frame)?, k.descending)))
        .collect::<Result<Vec<_>>>()?;
    let mut order: Vec<usize> = (0..frame.height()).collect();
    order.sort_by(|&a, &b| {
        columns
            .iter()
            .map(|(column, descending)| column.compare(a, b, *descending))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::sort_indices;
    use crate::expr::{asc, col, desc};
    use crate::{DataFrame, Series};

    #[test]
    fn ties_keep_input_order() {
        let df = DataFrame::new(vec![
            Series::int64("x", [1_i64, 1, 2]),
            Series::int64("y", [0_i64, 1, 2]),
        ])
        .unwrap();
        assert_eq!(sort_indices(&df, &[asc("x")]).unwrap(), vec![0, 1, 2]);
        assert_eq!(sort_indices(&df, &[desc("x")]).unwrap(), vec![2, 0, 1]);
        assert_eq!(
            sort_indices(&df, &[asc("x"), desc("y")]).unwrap(),
            vec![1, 0, 2]
        );
    }

    #[test]
    fn expressions_and_strings_sort() {
        let df = DataFrame::new(vec![Series::utf8("s", [Some("b"), None, Some("a")])]).unwrap();
        assert_eq!(sort_indices(&df, &[asc("s")]).unwrap(), vec![2, 0, 1]);
        assert_eq!(sort_indices(&df, &[desc("s")]).unwrap(), vec![0, 2, 1]);
        let by_len = sort_indices(&df, &[desc(col("s").str_length())]).unwrap();
        assert_eq!(by_len, vec![0, 2, 1]);
    }
}
