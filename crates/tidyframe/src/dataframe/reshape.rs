use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{new_null_array, ArrayRef, StringArray};
use arrow::datatypes::DataType;

use crate::dataframe::dataframe::trace_verb;
use crate::dataframe::key::{group_keys, partition};
use crate::expr::{everything, resolve_columns, to_exprs, AggFunc, Expr, IntoExpr};
use crate::physical::kernels::{self, aggregate::aggregate, as_utf8};
use crate::physical::with_column;
use crate::types::{cast_array, DType, Scalar};
use crate::{DataFrame, DataFrameError, Result, Series};

/// Options for [`DataFrame::pivot_wider`].
#[derive(Debug, Clone)]
pub struct PivotWiderOptions {
    names_from: String,
    values_from: String,
    id_cols: Option<Vec<String>>,
    values_fn: String,
    values_fill: Option<Scalar>,
}

impl PivotWiderOptions {
    pub fn new(names_from: impl Into<String>, values_from: impl Into<String>) -> Self {
        Self {
            names_from: names_from.into(),
            values_from: values_from.into(),
            id_cols: None,
            values_fn: "first".to_string(),
            values_fill: None,
        }
    }

    /// Columns identifying an output row; defaults to every other column.
    pub fn id_cols<S: Into<String>>(mut self, cols: impl IntoIterator<Item = S>) -> Self {
        self.id_cols = Some(cols.into_iter().map(Into::into).collect());
        self
    }

    /// Aggregator for colliding cells: `first`, `last`, `sum`, `mean`,
    /// `median`, `min`, `max` or `count`.
    pub fn values_fn(mut self, name: impl Into<String>) -> Self {
        self.values_fn = name.into();
        self
    }

    /// Value for id/name combinations with no row.
    pub fn values_fill(mut self, value: impl Into<Scalar>) -> Self {
        self.values_fill = Some(value.into());
        self
    }
}

fn parse_values_fn(name: &str) -> Result<AggFunc> {
    Ok(match name {
        "first" => AggFunc::First,
        "last" => AggFunc::Last,
        "sum" => AggFunc::Sum,
        "mean" => AggFunc::Mean,
        "median" => AggFunc::Median,
        "min" => AggFunc::Min,
        "max" => AggFunc::Max,
        "count" => AggFunc::Count,
        other => {
            return Err(DataFrameError::invalid_argument(format!(
                "unsupported values_fn '{other}'"
            )))
        }
    })
}

/// Options for [`DataFrame::pivot_longer`].
#[derive(Debug, Clone)]
pub struct PivotLongerOptions {
    cols: Vec<Expr>,
    names_to: String,
    values_to: String,
}

impl Default for PivotLongerOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PivotLongerOptions {
    pub fn new() -> Self {
        Self {
            cols: vec![everything()],
            names_to: "name".to_string(),
            values_to: "value".to_string(),
        }
    }

    /// Columns to stack.
    pub fn cols<E: IntoExpr>(mut self, cols: impl IntoIterator<Item = E>) -> Self {
        self.cols = to_exprs(cols);
        self
    }

    pub fn names_to(mut self, name: impl Into<String>) -> Self {
        self.names_to = name.into();
        self
    }

    pub fn values_to(mut self, name: impl Into<String>) -> Self {
        self.values_to = name.into();
        self
    }
}

fn require(frame: &DataFrame, name: &str) -> Result<ArrayRef> {
    frame
        .column(name)
        .map(Series::to_arrow)
        .map_err(|_| DataFrameError::key_not_found(name))
}

impl DataFrame {
    /// Spread `names_from` values into new columns filled from `values_from`.
    pub fn pivot_wider(&self, options: &PivotWiderOptions) -> Result<DataFrame> {
        let func = parse_values_fn(&options.values_fn)?;
        let names = require(self, &options.names_from)?;
        let values = require(self, &options.values_from)?;
        let id_cols = match &options.id_cols {
            Some(cols) => {
                for c in cols {
                    require(self, c)?;
                }
                cols.clone()
            }
            None => self
                .names()
                .into_iter()
                .filter(|n| *n != options.names_from && *n != options.values_from)
                .collect(),
        };

        let id_arrays = id_cols
            .iter()
            .map(|c| require(self, c))
            .collect::<Result<Vec<_>>>()?;
        let groups = partition(&group_keys(&id_arrays, self.height())?);
        let mut row_group = vec![0; self.height()];
        for (g, rows) in groups.iter().enumerate() {
            for &row in rows {
                row_group[row] = g;
            }
        }

        let labels = cast_array(&names, DType::Utf8).map_err(|err| with_column(err, &options.names_from))?;
        let labels = as_utf8(labels.as_ref())?;
        let mut new_names: Vec<String> = Vec::new();
        let mut name_slot: HashMap<String, usize> = HashMap::new();
        let mut cells: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for (row, label) in labels.iter().enumerate() {
            let label = label.unwrap_or("null").to_string();
            let slot = *name_slot.entry(label.clone()).or_insert_with(|| {
                new_names.push(label);
                new_names.len() - 1
            });
            cells.entry((row_group[row], slot)).or_default().push(row);
        }

        let first_rows: Vec<usize> = groups.iter().map(|g| g[0]).collect();
        let mut columns = self.select_names(&id_cols)?.take(&first_rows)?.columns().to_vec();
        for (slot, name) in new_names.iter().enumerate() {
            let parts = (0..groups.len())
                .map(|g| match cells.get(&(g, slot)) {
                    Some(rows) => aggregate(func, &kernels::take(&values, rows)?),
                    None => Ok(new_null_array(&DataType::Null, 1)),
                })
                .collect::<Result<Vec<_>>>()?;
            let array = kernels::concat_unified(&parts).map_err(|err| with_column(err, name))?;
            let mut series = Series::from_kernel(name, array)?;
            if let Some(fill) = &options.values_fill {
                series = series.fill_null_with(fill)?;
            }
            columns.push(series);
        }
        tracing::trace!(ids = groups.len(), new_columns = new_names.len(), "pivot_wider layout");

        let out = DataFrame::with_height(columns, groups.len())?;
        trace_verb("pivot_wider", self, &out);
        Ok(out)
    }

    /// Stack the selected columns into a names column and a values column.
    pub fn pivot_longer(&self, options: &PivotLongerOptions) -> Result<DataFrame> {
        let stacked = resolve_columns(&options.cols, &self.names())?;
        if stacked.is_empty() {
            return Err(DataFrameError::invalid_argument(
                "pivot_longer needs at least one column to stack",
            ));
        }
        let height = self.height();
        let repeat: Vec<usize> = (0..stacked.len()).flat_map(|_| 0..height).collect();
        let ids: Vec<String> = self
            .names()
            .into_iter()
            .filter(|n| !stacked.contains(n))
            .collect();

        let mut columns = self.select_names(&ids)?.take(&repeat)?.columns().to_vec();
        let labels: StringArray = stacked
            .iter()
            .flat_map(|name| std::iter::repeat(Some(name.as_str())).take(height))
            .collect();
        columns.push(Series::from_kernel(&options.names_to, Arc::new(labels))?);
        let parts = stacked
            .iter()
            .map(|n| self.column(n).map(Series::to_arrow))
            .collect::<Result<Vec<_>>>()?;
        let values = kernels::concat_unified(&parts).map_err(|err| with_column(err, &options.values_to))?;
        columns.push(Series::from_kernel(&options.values_to, values)?);

        let out = DataFrame::with_height(columns, repeat.len())?;
        trace_verb("pivot_longer", self, &out);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::{PivotLongerOptions, PivotWiderOptions};
    use crate::expr::starts_with;
    use crate::types::{DType, Scalar};
    use crate::{DataFrame, DataFrameError, Series};

    fn long() -> DataFrame {
        DataFrame::new(vec![
            Series::utf8("id", ["a", "a", "b"]),
            Series::utf8("key", [Some("x"), Some("y"), None]),
            Series::int64("val", [1_i64, 2, 3]),
        ])
        .unwrap()
    }

    #[test]
    fn wider_spreads_in_first_seen_order() {
        let out = long().pivot_wider(&PivotWiderOptions::new("key", "val")).unwrap();
        assert_eq!(out.names(), vec!["id", "x", "y", "null"]);
        assert_eq!(out.column("x").unwrap().i64_values().unwrap(), vec![Some(1), None]);
        assert_eq!(out.column("null").unwrap().i64_values().unwrap(), vec![None, Some(3)]);

        let filled = long()
            .pivot_wider(&PivotWiderOptions::new("key", "val").values_fill(0_i64))
            .unwrap();
        assert_eq!(filled.column("y").unwrap().i64_values().unwrap(), vec![Some(2), Some(0)]);
        assert_eq!(filled.column("id").unwrap().null_count(), 0);
    }

    #[test]
    fn wider_aggregates_collisions() {
        let df = DataFrame::new(vec![
            Series::utf8("key", ["x", "x", "y"]),
            Series::int64("val", [1_i64, 4, 2]),
        ])
        .unwrap();
        let first = df.pivot_wider(&PivotWiderOptions::new("key", "val")).unwrap();
        assert_eq!(first.height(), 1);
        assert_eq!(first.get_row(0).unwrap(), vec![Scalar::Int64(1), Scalar::Int64(2)]);
        let mean = df
            .pivot_wider(&PivotWiderOptions::new("key", "val").values_fn("mean"))
            .unwrap();
        assert_eq!(mean.column("x").unwrap().f64_values().unwrap(), vec![Some(2.5)]);
        assert!(matches!(
            df.pivot_wider(&PivotWiderOptions::new("key", "val").values_fn("mode")),
            Err(DataFrameError::InvalidArgument { .. })
        ));
        assert!(matches!(
            df.pivot_wider(&PivotWiderOptions::new("nope", "val")),
            Err(DataFrameError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn longer_stacks_column_major() {
        let wide = DataFrame::new(vec![
            Series::utf8("id", ["a", "b"]),
            Series::int64("m1", [1_i64, 2]),
            Series::float64("m2", [0.5, 1.5]),
        ])
        .unwrap();
        let out = wide
            .pivot_longer(&PivotLongerOptions::new().cols([starts_with("m", false)]))
            .unwrap();
        assert_eq!(out.names(), vec!["id", "name", "value"]);
        assert_eq!(out.height(), 4);
        assert_eq!(out.column("value").unwrap().dtype(), DType::Float64);
        assert_eq!(
            out.column("name").unwrap().str_values().unwrap(),
            vec![
                Some("m1".to_string()),
                Some("m1".to_string()),
                Some("m2".to_string()),
                Some("m2".to_string())
            ]
        );
        assert_eq!(
            out.column("id").unwrap().str_values().unwrap()[2],
            Some("a".to_string())
        );
    }

    #[test]
    fn longer_rejects_incompatible_values() {
        let wide = DataFrame::new(vec![
            Series::int64("a", [1_i64]),
            Series::utf8("b", ["x"]),
        ])
        .unwrap();
        assert!(matches!(
            wide.pivot_longer(&PivotLongerOptions::new()),
            Err(DataFrameError::TypeMismatch { .. })
        ));
        assert!(matches!(
            wide.pivot_longer(&PivotLongerOptions::new().cols(Vec::<&str>::new())),
            Err(DataFrameError::InvalidArgument { .. })
        ));
    }
}
