use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray};
use arrow::datatypes::{Field, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::dataframe::key::group_keys;
use crate::dataframe::sort::sort_indices;
use crate::dataframe::GroupBy;
use crate::expr::{
    expand, resolve_columns, to_exprs, Expr, FillStrategy, IntoExpr, SortKey,
};
use crate::physical::kernels::{self, boolean, string};
use crate::physical::{with_column, ExprEval};
use crate::types::{DType, Scalar};
use crate::{DataFrameError, Result, Series};

/// Direction for [`DataFrame::fill`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FillDirection {
    /// Carry values downwards.
    Down,
    /// Carry values upwards.
    Up,
    /// Down first, then up for leading nulls.
    DownUp,
    /// Up first, then down for trailing nulls.
    UpDown,
}

/// An eager, immutable table of equal-length named columns.
///
/// Every verb returns a new `DataFrame`; unaffected columns share their Arrow
/// buffers with the input.
#[derive(Debug, Clone)]
pub struct DataFrame {
    columns: Vec<Series>,
    height: usize,
}

pub(crate) fn trace_verb(op: &'static str, input: &DataFrame, output: &DataFrame) {
    tracing::debug!(
        op,
        in_height = input.height,
        in_width = input.width(),
        out_height = output.height,
        out_width = output.width(),
        "verb"
    );
}

impl DataFrame {
    /// Construct a `DataFrame` from a list of `Series`.
    pub fn new(columns: Vec<Series>) -> Result<Self> {
        let height = columns.first().map_or(0, Series::len);
        Self::with_height(columns, height)
    }

    /// Construct with an explicit height, which matters for zero-column frames.
    pub(crate) fn with_height(columns: Vec<Series>, height: usize) -> Result<Self> {
        let mut seen_names = HashSet::with_capacity(columns.len());
        for c in &columns {
            if !seen_names.insert(c.name()) {
                return Err(DataFrameError::duplicate_column(c.name()));
            }
            if c.len() != height {
                return Err(DataFrameError::shape_mismatch(format!(
                    "column length mismatch: '{}' has length {}, expected {}",
                    c.name(),
                    c.len(),
                    height
                )));
            }
        }
        Ok(Self { columns, height })
    }

    /// Return an empty `DataFrame` (no columns, no rows).
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            height: 0,
        }
    }

    /// Construct a `DataFrame` from one Arrow record batch.
    pub fn from_arrow(batch: &RecordBatch) -> Result<Self> {
        let columns = batch
            .schema()
            .fields()
            .iter()
            .zip(batch.columns())
            .map(|(field, array)| Series::from_arrow(field.name(), array.clone()))
            .collect::<Result<Vec<_>>>()?;
        Self::with_height(columns, batch.num_rows())
    }

    /// Construct a `DataFrame` from Arrow record batches (all batches must share the same schema).
    pub fn from_batches(batches: Vec<RecordBatch>) -> Result<Self> {
        let Some(first) = batches.first() else {
            return Ok(Self::empty());
        };
        let schema = first.schema();
        for (i, b) in batches.iter().enumerate().skip(1) {
            if b.schema().fields() != schema.fields() {
                return Err(DataFrameError::shape_mismatch(format!(
                    "schema mismatch between batches: batch 0 != batch {i}"
                )));
            }
        }
        let height = batches.iter().map(RecordBatch::num_rows).sum();
        let columns = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let chunks = batches.iter().map(|b| b.column(idx).clone()).collect();
                Series::from_chunks(field.name(), chunks)
            })
            .collect::<Result<Vec<_>>>()?;
        Self::with_height(columns, height)
    }

    /// Return the number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Alias of [`DataFrame::height`].
    pub fn nrow(&self) -> usize {
        self.height
    }

    /// Return the number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Alias of [`DataFrame::width`].
    pub fn ncol(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    /// Column names in order.
    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    /// Ordered `(name, dtype)` pairs.
    pub fn schema(&self) -> Vec<(String, DType)> {
        self.columns
            .iter()
            .map(|c| (c.name().to_string(), c.dtype()))
            .collect()
    }

    /// Return the Arrow schema.
    pub fn arrow_schema(&self) -> SchemaRef {
        let fields: Vec<Field> = self
            .columns
            .iter()
            .map(|c| Field::new(c.name(), c.dtype().to_arrow(), true))
            .collect();
        Arc::new(Schema::new(fields))
    }

    /// Get a column by name (case-sensitive).
    pub fn column(&self, name: &str) -> Result<&Series> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| DataFrameError::unknown_column(name))
    }

    /// Return all columns in order.
    pub fn columns(&self) -> &[Series] {
        &self.columns
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Extract one column; the last column when `name` is `None`.
    pub fn pull(&self, name: Option<&str>) -> Result<Series> {
        match name {
            Some(name) => self.column(name).cloned(),
            None => self
                .columns
                .last()
                .cloned()
                .ok_or_else(|| DataFrameError::invalid_argument("cannot pull from a frame without columns")),
        }
    }

    /// Values of row `index`, in column order.
    pub fn get_row(&self, index: usize) -> Result<Vec<Scalar>> {
        self.columns.iter().map(|c| c.get(index)).collect()
    }

    /// Row-major iteration over all rows.
    pub fn rows(&self) -> impl Iterator<Item = Vec<Scalar>> + '_ {
        (0..self.height).map(move |i| {
            self.columns
                .iter()
                .map(|c| c.get(i).unwrap_or(Scalar::Null))
                .collect()
        })
    }

    /// Columnar view as one Arrow record batch.
    pub fn to_arrow(&self) -> Result<RecordBatch> {
        let arrays: Vec<ArrayRef> = self.columns.iter().map(Series::to_arrow).collect();
        let options = RecordBatchOptions::new().with_row_count(Some(self.height));
        RecordBatch::try_new_with_options(self.arrow_schema(), arrays, &options)
            .map_err(|source| DataFrameError::Arrow { source })
    }

    /// Frame equality with nulls equal to nulls; names, order and dtypes must match.
    pub fn equals(&self, other: &DataFrame) -> bool {
        self.height == other.height && self.columns == other.columns
    }

    /// Gather rows by position.
    pub fn take(&self, indices: &[usize]) -> Result<Self> {
        let columns = self
            .columns
            .iter()
            .map(|c| c.take(indices))
            .collect::<Result<Vec<_>>>()?;
        Self::with_height(columns, indices.len())
    }

    fn slice_rows(&self, offset: usize, len: usize) -> Self {
        let offset = offset.min(self.height);
        let len = len.min(self.height - offset);
        Self {
            columns: self.columns.iter().map(|c| c.slice(offset, len)).collect(),
            height: len,
        }
    }

    fn filter_mask(&self, mask: &BooleanArray) -> Result<Self> {
        let height = mask.iter().filter(|v| *v == Some(true)).count();
        let columns = self
            .columns
            .iter()
            .map(|c| c.filter(mask))
            .collect::<Result<Vec<_>>>()?;
        Self::with_height(columns, height)
    }

    pub(crate) fn select_names(&self, names: &[String]) -> Result<Self> {
        let columns = names
            .iter()
            .map(|n| self.column(n).cloned())
            .collect::<Result<Vec<_>>>()?;
        Self::with_height(columns, self.height)
    }

    /// Add `series`, replacing a same-named column in place.
    pub fn with_column(&self, series: Series) -> Result<Self> {
        let mut columns = self.columns.clone();
        let height = if columns.is_empty() {
            series.len()
        } else {
            self.height
        };
        match self.position(series.name()) {
            Some(idx) => columns[idx] = series,
            None => columns.push(series),
        }
        Self::with_height(columns, height)
    }

    /// Project to the given columns or expressions, in order.
    pub fn select<E: IntoExpr>(&self, exprs: impl IntoIterator<Item = E>) -> Result<Self> {
        let exprs = expand(&to_exprs(exprs), &self.names())?;
        let columns = exprs
            .iter()
            .map(|(name, expr)| ExprEval::evaluate_column(expr, self, name))
            .collect::<Result<Vec<_>>>()?;
        let out = Self::with_height(columns, self.height)?;
        trace_verb("select", self, &out);
        Ok(out)
    }

    /// Add or overwrite columns; each expression sees the columns produced before it.
    pub fn mutate<E: IntoExpr>(&self, exprs: impl IntoIterator<Item = E>) -> Result<Self> {
        let mut out = self.clone();
        for expr in to_exprs(exprs) {
            for (name, expr) in expand(std::slice::from_ref(&expr), &out.names())? {
                let series = ExprEval::evaluate_column(&expr, &out, &name)?;
                out = out.with_column(series)?;
            }
        }
        trace_verb("mutate", self, &out);
        Ok(out)
    }

    /// Rows where every predicate is true.
    pub(crate) fn predicate_mask(&self, predicates: &[Expr]) -> Result<Option<BooleanArray>> {
        let expanded = expand(predicates, &self.names())?;
        let Some(combined) = expanded.into_iter().map(|(_, e)| e).reduce(|a, b| a.and_(b)) else {
            return Ok(None);
        };
        let values = ExprEval::evaluate_column(&combined, self, "predicate")?;
        Ok(Some(boolean::true_mask(values.array())?))
    }

    /// Keep rows where all predicates are true; null counts as not true.
    pub fn filter<E: IntoExpr>(&self, predicates: impl IntoIterator<Item = E>) -> Result<Self> {
        let out = match self.predicate_mask(&to_exprs(predicates))? {
            Some(mask) => self.filter_mask(&mask)?,
            None => self.clone(),
        };
        trace_verb("filter", self, &out);
        Ok(out)
    }

    /// Stable sort; nulls last for every direction.
    pub fn arrange<K: Into<SortKey>>(&self, keys: impl IntoIterator<Item = K>) -> Result<Self> {
        let keys: Vec<SortKey> = keys.into_iter().map(Into::into).collect();
        let order = sort_indices(self, &keys)?;
        let out = self.take(&order)?;
        trace_verb("arrange", self, &out);
        Ok(out)
    }

    /// Distinct rows, keeping first occurrences.
    ///
    /// With a column selection only those columns are compared and returned.
    pub fn distinct<E: IntoExpr>(&self, cols: impl IntoIterator<Item = E>) -> Result<Self> {
        let selected = resolve_columns(&to_exprs(cols), &self.names())?;
        let frame = if selected.is_empty() {
            self.clone()
        } else {
            self.select_names(&selected)?
        };
        let arrays: Vec<ArrayRef> = frame.columns.iter().map(Series::to_arrow).collect();
        let keys = group_keys(&arrays, frame.height)?;
        let mut seen = HashSet::with_capacity(keys.len());
        let rows: Vec<usize> = keys
            .into_iter()
            .enumerate()
            .filter_map(|(row, key)| seen.insert(key).then_some(row))
            .collect();
        let out = frame.take(&rows)?;
        trace_verb("distinct", self, &out);
        Ok(out)
    }

    /// Row-wise concatenation over the union of column names.
    ///
    /// Columns missing from an input are null for that input's rows.
    pub fn bind_rows<'a>(frames: impl IntoIterator<Item = &'a DataFrame>) -> Result<DataFrame> {
        let frames: Vec<&DataFrame> = frames.into_iter().collect();
        let mut names: Vec<String> = Vec::new();
        for frame in &frames {
            for name in frame.names() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        let height = frames.iter().map(|f| f.height).sum();
        let columns = names
            .iter()
            .map(|name| {
                let parts: Vec<ArrayRef> = frames
                    .iter()
                    .map(|f| match f.column(name) {
                        Ok(c) => c.to_arrow(),
                        Err(_) => Series::nulls(name, f.height).to_arrow(),
                    })
                    .collect();
                let array =
                    kernels::concat_unified(&parts).map_err(|err| with_column(err, name))?;
                Series::from_kernel(name, array)
            })
            .collect::<Result<Vec<_>>>()?;
        let out = Self::with_height(columns, height)?;
        tracing::debug!(op = "bind_rows", inputs = frames.len(), out_height = out.height, "verb");
        Ok(out)
    }

    /// Column-wise concatenation; heights must match and names must be unique.
    pub fn bind_cols<'a>(frames: impl IntoIterator<Item = &'a DataFrame>) -> Result<DataFrame> {
        let frames: Vec<&DataFrame> = frames.into_iter().collect();
        let Some(first) = frames.first() else {
            return Ok(Self::empty());
        };
        let height = first.height;
        for frame in &frames[1..] {
            if frame.height != height {
                return Err(DataFrameError::shape_mismatch(format!(
                    "bind_cols needs equal heights, got {height} and {}",
                    frame.height
                )));
            }
        }
        let columns = frames.iter().flat_map(|f| f.columns.iter().cloned()).collect();
        let out = Self::with_height(columns, height)?;
        tracing::debug!(op = "bind_cols", inputs = frames.len(), out_width = out.width(), "verb");
        Ok(out)
    }

    /// Drop rows with a null in any of `cols` (every column when empty).
    pub fn drop_null<E: IntoExpr>(&self, cols: impl IntoIterator<Item = E>) -> Result<Self> {
        let mut selected = resolve_columns(&to_exprs(cols), &self.names())?;
        if selected.is_empty() {
            selected = self.names();
        }
        let mut keep = vec![true; self.height];
        for name in &selected {
            for (row, null) in kernels::null_mask(self.column(name)?.array().as_ref())
                .into_iter()
                .enumerate()
            {
                if null {
                    keep[row] = false;
                }
            }
        }
        let out = self.filter_mask(&BooleanArray::from(keep))?;
        trace_verb("drop_null", self, &out);
        Ok(out)
    }

    /// Remove the selected columns.
    pub fn drop<E: IntoExpr>(&self, cols: impl IntoIterator<Item = E>) -> Result<Self> {
        let dropped = resolve_columns(&to_exprs(cols), &self.names())?;
        let columns = self
            .columns
            .iter()
            .filter(|c| !dropped.iter().any(|d| d == c.name()))
            .cloned()
            .collect();
        Self::with_height(columns, self.height)
    }

    /// Rename columns by `(old, new)` pairs.
    pub fn rename<'a>(&self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let mut columns = self.columns.clone();
        for (old, new) in pairs {
            let idx = columns
                .iter()
                .position(|c| c.name() == old)
                .ok_or_else(|| DataFrameError::unknown_column(old))?;
            columns[idx] = columns[idx].with_name(new);
        }
        Self::with_height(columns, self.height)
    }

    /// Replace every column name.
    pub fn set_names<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        if names.len() != self.width() {
            return Err(DataFrameError::shape_mismatch(format!(
                "expected {} names, got {}",
                self.width(),
                names.len()
            )));
        }
        let columns = self
            .columns
            .iter()
            .zip(names)
            .map(|(c, n)| c.with_name(n.as_ref()))
            .collect();
        Self::with_height(columns, self.height)
    }

    /// Move columns before or after an anchor column, or to the front.
    pub fn relocate<E: IntoExpr>(
        &self,
        cols: impl IntoIterator<Item = E>,
        before: Option<&str>,
        after: Option<&str>,
    ) -> Result<Self> {
        let moved = resolve_columns(&to_exprs(cols), &self.names())?;
        let anchor = match (before, after) {
            (Some(_), Some(_)) => {
                return Err(DataFrameError::invalid_argument(
                    "relocate accepts only one of `before` and `after`",
                ))
            }
            (Some(name), None) => Some((name, false)),
            (None, Some(name)) => Some((name, true)),
            (None, None) => None,
        };
        let rest: Vec<String> = self
            .names()
            .into_iter()
            .filter(|n| !moved.contains(n))
            .collect();
        let insert_at = match anchor {
            None => 0,
            Some((name, after)) => {
                self.column(name)?;
                let idx = rest.iter().position(|n| n == name).ok_or_else(|| {
                    DataFrameError::invalid_argument(format!(
                        "cannot relocate relative to moved column '{name}'"
                    ))
                })?;
                if after {
                    idx + 1
                } else {
                    idx
                }
            }
        };
        let mut order = rest;
        for (offset, name) in moved.into_iter().enumerate() {
            order.insert(insert_at + offset, name);
        }
        self.select_names(&order)
    }

    /// Rows at the given 0-based positions; negative positions count from the end.
    pub fn slice(&self, positions: &[i64]) -> Result<Self> {
        let rows = positions
            .iter()
            .map(|&p| {
                resolve_position(p, self.height).ok_or_else(|| {
                    DataFrameError::invalid_argument(format!(
                        "row position {p} out of range for {} rows",
                        self.height
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let out = self.take(&rows)?;
        trace_verb("slice", self, &out);
        Ok(out)
    }

    /// First `n` rows.
    pub fn slice_head(&self, n: usize) -> Self {
        self.slice_rows(0, n)
    }

    /// Last `n` rows.
    pub fn slice_tail(&self, n: usize) -> Self {
        let n = n.min(self.height);
        self.slice_rows(self.height - n, n)
    }

    /// Alias of [`DataFrame::slice_head`].
    pub fn head(&self, n: usize) -> Self {
        self.slice_head(n)
    }

    /// Alias of [`DataFrame::slice_tail`].
    pub fn tail(&self, n: usize) -> Self {
        self.slice_tail(n)
    }

    /// Summarize the whole table as one group.
    pub fn summarize<E: IntoExpr>(&self, exprs: impl IntoIterator<Item = E>) -> Result<Self> {
        GroupBy::whole(self).summarize(exprs)
    }

    /// Partition rows by key columns or expressions.
    pub fn group_by<E: IntoExpr>(&self, keys: impl IntoIterator<Item = E>) -> Result<GroupBy> {
        GroupBy::new(self, to_exprs(keys))
    }

    /// Row counts, per group of `by` when given.
    ///
    /// The count column is named `name` (default `"n"`); `sort` orders by
    /// descending count.
    pub fn count<E: IntoExpr>(
        &self,
        by: impl IntoIterator<Item = E>,
        sort: bool,
        name: Option<&str>,
    ) -> Result<Self> {
        self.group_by(by)?.count(sort, name)
    }

    /// Fill nulls in `cols` from neighbouring rows.
    pub fn fill<E: IntoExpr>(
        &self,
        cols: impl IntoIterator<Item = E>,
        direction: FillDirection,
    ) -> Result<Self> {
        let selected = resolve_columns(&to_exprs(cols), &self.names())?;
        let strategies: &[FillStrategy] = match direction {
            FillDirection::Down => &[FillStrategy::Forward],
            FillDirection::Up => &[FillStrategy::Backward],
            FillDirection::DownUp => &[FillStrategy::Forward, FillStrategy::Backward],
            FillDirection::UpDown => &[FillStrategy::Backward, FillStrategy::Forward],
        };
        let mut out = self.clone();
        for name in &selected {
            let mut series = self.column(name)?.clone();
            for strategy in strategies {
                series = series.fill_null(*strategy)?;
            }
            out = out.with_column(series)?;
        }
        trace_verb("fill", self, &out);
        Ok(out)
    }

    /// Replace nulls per column with a fixed value.
    pub fn replace_null<'a, V: Into<Scalar>>(
        &self,
        values: impl IntoIterator<Item = (&'a str, V)>,
    ) -> Result<Self> {
        let mut out = self.clone();
        for (name, value) in values {
            let series = self.column(name)?.fill_null_with(&value.into())?;
            out = out.with_column(series)?;
        }
        Ok(out)
    }

    fn insert_at(&self, index: usize, new: Vec<Series>, removed: &[String]) -> Result<Self> {
        let mut columns: Vec<Series> = Vec::with_capacity(self.width() + new.len());
        let mut new = Some(new);
        for (idx, column) in self.columns.iter().enumerate() {
            if idx == index {
                columns.extend(new.take().unwrap_or_default());
            }
            if !removed.iter().any(|r| r == column.name()) {
                columns.push(column.clone());
            }
        }
        columns.extend(new.take().unwrap_or_default());
        Self::with_height(columns, self.height)
    }

    /// Paste columns into one string column placed at the first united column.
    pub fn unite<E: IntoExpr>(
        &self,
        name: &str,
        cols: impl IntoIterator<Item = E>,
        sep: &str,
        remove: bool,
    ) -> Result<Self> {
        let united = resolve_columns(&to_exprs(cols), &self.names())?;
        let Some(first) = united.first().and_then(|n| self.position(n)) else {
            return Err(DataFrameError::invalid_argument("unite needs at least one column"));
        };
        let arrays = united
            .iter()
            .map(|n| self.column(n).map(Series::to_arrow))
            .collect::<Result<Vec<_>>>()?;
        let array = kernels::broadcast(&string::concat(&arrays, sep)?, self.height)?;
        let series = Series::from_kernel(name, array)?;
        let removed = if remove { united } else { Vec::new() };
        let out = self.insert_at(first, vec![series], &removed)?;
        trace_verb("unite", self, &out);
        Ok(out)
    }

    /// Split a string column on a literal separator into `into.len()` columns.
    ///
    /// The last part keeps any remainder; missing parts are null.
    pub fn separate<S: AsRef<str>>(
        &self,
        col: &str,
        into: &[S],
        sep: &str,
        remove: bool,
    ) -> Result<Self> {
        if into.is_empty() {
            return Err(DataFrameError::invalid_argument("separate needs at least one output column"));
        }
        let idx = self
            .position(col)
            .ok_or_else(|| DataFrameError::unknown_column(col))?;
        let source = self.column(col)?;
        let parts = string::split_fixed(source.array(), sep, into.len())
            .map_err(|err| with_column(err, col))?;
        let new = into
            .iter()
            .zip(parts)
            .map(|(name, array)| Series::from_kernel(name.as_ref(), array))
            .collect::<Result<Vec<_>>>()?;
        let removed = if remove { vec![col.to_string()] } else { Vec::new() };
        let out = self.insert_at(idx, new, &removed)?;
        trace_verb("separate", self, &out);
        Ok(out)
    }
}

impl PartialEq for DataFrame {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

/// Resolve a possibly negative position against `len` rows.
pub(crate) fn resolve_position(position: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let resolved = if position < 0 { len + position } else { position };
    (0..len).contains(&resolved).then_some(resolved as usize)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Int32Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;

    use super::{resolve_position, DataFrame, FillDirection};
    use crate::expr::{col, cols, desc, lit, starts_with};
    use crate::types::{DType, Scalar};
    use crate::{DataFrameError, Series};

    fn df() -> DataFrame {
        DataFrame::new(vec![
            Series::int64("x", [1_i64, 1, 2]),
            Series::int64("y", [0_i64, 1, 2]),
            Series::utf8("g", ["a", "b", "a"]),
        ])
        .unwrap()
    }

    #[test]
    fn dataframe_new_rejects_duplicate_column_names() {
        let err = DataFrame::new(vec![Series::int64("a", [1_i64]), Series::int64("a", [2_i64])])
            .unwrap_err();
        assert!(matches!(err, DataFrameError::DuplicateColumn { .. }));
    }

    #[test]
    fn dataframe_new_rejects_length_mismatch() {
        let err = DataFrame::new(vec![Series::int64("a", [1_i64, 2]), Series::int64("b", [1_i64])])
            .unwrap_err();
        assert!(matches!(err, DataFrameError::ShapeMismatch { .. }));
    }

    #[test]
    fn dataframe_column_is_case_sensitive() {
        assert!(matches!(
            df().column("X").unwrap_err(),
            DataFrameError::UnknownColumn { .. }
        ));
    }

    #[test]
    fn dataframe_from_batches_concatenates() {
        let schema = Arc::new(Schema::new(vec![Field::new("a", DataType::Int32, true)]));
        let a1: ArrayRef = Arc::new(Int32Array::from(vec![1, 2]));
        let a2: ArrayRef = Arc::new(Int32Array::from(vec![3]));
        let b1 = RecordBatch::try_new(schema.clone(), vec![a1]).unwrap();
        let b2 = RecordBatch::try_new(schema, vec![a2]).unwrap();
        let df = DataFrame::from_batches(vec![b1, b2]).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.schema(), vec![("a".to_string(), DType::Int64)]);

        let other = Arc::new(Schema::new(vec![Field::new("a", DataType::Utf8, true)]));
        let s: ArrayRef = Arc::new(StringArray::from(vec!["x"]));
        let b3 = RecordBatch::try_new(other, vec![s]).unwrap();
        let b4 = df.to_arrow().unwrap();
        assert!(DataFrame::from_batches(vec![b4, b3]).is_err());
    }

    #[test]
    fn select_expands_selectors_and_keeps_order() {
        let df = df();
        let out = df.select([col("g"), cols(["x", "y"]).suffix("_v")]).unwrap();
        assert_eq!(out.names(), vec!["g", "x_v", "y_v"]);
        assert!(matches!(
            df.select(["missing"]),
            Err(DataFrameError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn mutate_sees_earlier_columns_and_overwrites_in_place() {
        let out = df()
            .mutate([col("x").add(col("y")).alias("z"), col("z").mul(2).alias("x")])
            .unwrap();
        assert_eq!(out.names(), vec!["x", "y", "g", "z"]);
        assert_eq!(
            out.column("x").unwrap().i64_values().unwrap(),
            vec![Some(2), Some(4), Some(8)]
        );
    }

    #[test]
    fn filter_drops_null_predicates() {
        let df = DataFrame::new(vec![Series::int64("x", [Some(1_i64), None, Some(3)])]).unwrap();
        let out = df.filter([col("x").gt(0)]).unwrap();
        assert_eq!(out.height(), 2);
        let out = df.filter([col("x").gt(0), col("x").lt(3)]).unwrap();
        assert_eq!(out.height(), 1);
    }

    #[test]
    fn arrange_is_stable_with_nulls_last() {
        let df = DataFrame::new(vec![
            Series::int64("x", [Some(2_i64), None, Some(1), Some(2)]),
            Series::int64("i", [0_i64, 1, 2, 3]),
        ])
        .unwrap();
        let up = df.arrange(["x"]).unwrap();
        assert_eq!(
            up.column("i").unwrap().i64_values().unwrap(),
            vec![Some(2), Some(0), Some(3), Some(1)]
        );
        let down = df.arrange([desc("x")]).unwrap();
        assert_eq!(
            down.column("i").unwrap().i64_values().unwrap(),
            vec![Some(0), Some(3), Some(2), Some(1)]
        );
    }

    #[test]
    fn distinct_keeps_first_occurrence() {
        let out = df().distinct(["x"]).unwrap();
        assert_eq!(out.names(), vec!["x"]);
        assert_eq!(out.column("x").unwrap().i64_values().unwrap(), vec![Some(1), Some(2)]);
        assert_eq!(df().distinct(Vec::<&str>::new()).unwrap().height(), 3);
    }

    #[test]
    fn bind_rows_fills_missing_columns() {
        let a = DataFrame::new(vec![Series::int64("x", [1_i64])]).unwrap();
        let b = DataFrame::new(vec![
            Series::float64("x", [2.5]),
            Series::utf8("s", ["q"]),
        ])
        .unwrap();
        let out = DataFrame::bind_rows([&a, &b]).unwrap();
        assert_eq!(out.schema()[0].1, DType::Float64);
        assert_eq!(
            out.column("s").unwrap().str_values().unwrap(),
            vec![None, Some("q".to_string())]
        );
    }

    #[test]
    fn bind_cols_checks_shape_and_names() {
        let a = DataFrame::new(vec![Series::int64("x", [1_i64])]).unwrap();
        let b = DataFrame::new(vec![Series::int64("y", [1_i64, 2])]).unwrap();
        assert!(matches!(
            DataFrame::bind_cols([&a, &b]),
            Err(DataFrameError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            DataFrame::bind_cols([&a, &a]),
            Err(DataFrameError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn relocate_rules() {
        let df = df();
        assert_eq!(df.relocate(["g"], None, None).unwrap().names(), vec!["g", "x", "y"]);
        assert_eq!(
            df.relocate(["x"], None, Some("g")).unwrap().names(),
            vec!["y", "g", "x"]
        );
        assert_eq!(
            df.relocate([starts_with("g", false)], Some("y"), None).unwrap().names(),
            vec!["x", "g", "y"]
        );
        assert!(matches!(
            df.relocate(["x"], Some("y"), Some("g")),
            Err(DataFrameError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn slice_positions() {
        let df = df();
        let out = df.slice(&[0, -1]).unwrap();
        assert_eq!(out.column("y").unwrap().i64_values().unwrap(), vec![Some(0), Some(2)]);
        assert!(matches!(df.slice(&[3]), Err(DataFrameError::InvalidArgument { .. })));
        assert_eq!(df.slice_tail(2).column("y").unwrap().i64_values().unwrap(), vec![Some(1), Some(2)]);
        assert_eq!(df.head(10).height(), 3);
        assert_eq!(resolve_position(-4, 3), None);
    }

    #[test]
    fn fill_directions() {
        let df = DataFrame::new(vec![Series::int64("x", [None, Some(1_i64), None])]).unwrap();
        let down = df.fill(["x"], FillDirection::Down).unwrap();
        assert_eq!(down.column("x").unwrap().i64_values().unwrap(), vec![None, Some(1), Some(1)]);
        let both = df.fill(["x"], FillDirection::DownUp).unwrap();
        assert_eq!(both.column("x").unwrap().null_count(), 0);
    }

    #[test]
    fn replace_null_and_drop_null() {
        let df = DataFrame::new(vec![
            Series::int64("x", [None, Some(1_i64)]),
            Series::utf8("s", [Some("a"), None]),
        ])
        .unwrap();
        assert_eq!(df.drop_null(["x"]).unwrap().height(), 1);
        assert_eq!(df.drop_null(Vec::<&str>::new()).unwrap().height(), 0);
        let out = df.replace_null([("x", Scalar::Int64(0))]).unwrap();
        assert_eq!(out.column("x").unwrap().i64_values().unwrap(), vec![Some(0), Some(1)]);
    }

    #[test]
    fn unite_and_separate() {
        let df = DataFrame::new(vec![
            Series::int64("id", [1_i64, 2]),
            Series::utf8("a", ["x", "y"]),
            Series::int64("b", [1_i64, 2]),
        ])
        .unwrap();
        let united = df.unite("ab", ["a", "b"], "-", true).unwrap();
        assert_eq!(united.names(), vec!["id", "ab"]);
        let split = united.separate("ab", &["a", "b"], "-", true).unwrap();
        assert_eq!(split.names(), vec!["id", "a", "b"]);
        assert_eq!(
            split.column("b").unwrap().str_values().unwrap(),
            vec![Some("1".to_string()), Some("2".to_string())]
        );
    }

    #[test]
    fn rename_and_set_names() {
        let df = df();
        assert_eq!(df.rename([("x", "xx")]).unwrap().names(), vec!["xx", "y", "g"]);
        assert!(matches!(
            df.rename([("x", "y")]),
            Err(DataFrameError::DuplicateColumn { .. })
        ));
        assert!(df.set_names(&["a", "b"]).is_err());
        assert_eq!(df.pull(None).unwrap().name(), "g");
        assert_eq!(df.get_row(2).unwrap()[2], Scalar::from("a"));
    }

    #[test]
    fn literal_select_broadcasts() {
        let out = df().select([lit(1_i64).alias("one")]).unwrap();
        assert_eq!(out.height(), 3);
        assert_eq!(out.to_arrow().unwrap().num_rows(), 3);
    }
}
