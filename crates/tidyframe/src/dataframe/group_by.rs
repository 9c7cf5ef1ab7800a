use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Int64Array};

use crate::dataframe::dataframe::{resolve_position, trace_verb};
use crate::dataframe::key::{group_keys, partition};
use crate::expr::{expand, to_exprs, Expr, IntoExpr, SortKey};
use crate::physical::kernels;
use crate::physical::{parallel, ExprEval};
use crate::{DataFrame, DataFrameError, Result, Series};

/// A `DataFrame` partitioned by key columns.
///
/// Groups are ordered by the first occurrence of each key tuple; null is an
/// ordinary key value equal only to other nulls.
#[derive(Debug, Clone)]
pub struct GroupBy {
    frame: DataFrame,
    keys: Vec<String>,
    groups: Vec<Vec<usize>>,
}

impl GroupBy {
    /// Group `frame` by `keys`; expression keys are materialized as columns first.
    pub(crate) fn new(frame: &DataFrame, keys: Vec<Expr>) -> Result<Self> {
        let mut frame = frame.clone();
        let mut names: Vec<String> = Vec::new();
        for (name, expr) in expand(&keys, &frame.names())? {
            if !matches!(expr, Expr::Column(_)) {
                let series = ExprEval::evaluate_column(&expr, &frame, &name)?;
                frame = frame.with_column(series)?;
            } else {
                frame.column(&name)?;
            }
            if !names.contains(&name) {
                names.push(name);
            }
        }
        let groups = if names.is_empty() {
            vec![(0..frame.height()).collect()]
        } else {
            let arrays = names
                .iter()
                .map(|n| frame.column(n).map(Series::to_arrow))
                .collect::<Result<Vec<ArrayRef>>>()?;
            partition(&group_keys(&arrays, frame.height())?)
        };
        tracing::debug!(
            keys = ?names,
            rows = frame.height(),
            groups = groups.len(),
            "group_by"
        );
        Ok(Self {
            frame,
            keys: names,
            groups,
        })
    }

    /// The whole table as a single group.
    pub(crate) fn whole(frame: &DataFrame) -> Self {
        Self {
            frame: frame.clone(),
            keys: Vec::new(),
            groups: vec![(0..frame.height()).collect()],
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// Row indices of each group.
    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    /// Return the underlying `DataFrame`.
    pub fn ungroup(self) -> DataFrame {
        self.frame
    }

    fn sub_frames(&self) -> Result<Vec<DataFrame>> {
        self.groups.iter().map(|rows| self.frame.take(rows)).collect()
    }

    fn key_frame(&self) -> Result<DataFrame> {
        let first_rows: Vec<usize> = self.groups.iter().filter_map(|g| g.first().copied()).collect();
        self.frame.select_names(&self.keys)?.take(&first_rows)
    }

    /// One row per group: key columns followed by one column per summary.
    pub fn summarize<E: IntoExpr>(&self, exprs: impl IntoIterator<Item = E>) -> Result<DataFrame> {
        let exprs = expand(&to_exprs(exprs), &self.frame.names())?;
        let keys = self.key_frame()?;
        if self.groups.is_empty() {
            // No groups: keep the output schema with zero rows.
            let empty = self.frame.take(&[])?;
            let mut columns = keys.columns().to_vec();
            for (name, expr) in &exprs {
                let summary = ExprEval::evaluate_summary(expr, &empty, name)?;
                columns.push(Series::from_kernel(name, summary.to_arrow().slice(0, 0))?);
            }
            return DataFrame::with_height(columns, 0);
        }

        let frames = self.sub_frames()?;
        let results = parallel::map_collect(&frames, parallel::min_groups(), |group| {
            tracing::trace!(rows = group.height(), "summarize group");
            exprs
                .iter()
                .map(|(name, expr)| ExprEval::evaluate_summary(expr, group, name).map(|s| s.to_arrow()))
                .collect::<Result<Vec<_>>>()
        })
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

        let mut columns = keys.columns().to_vec();
        for (idx, (name, _)) in exprs.iter().enumerate() {
            let parts: Vec<ArrayRef> = results.iter().map(|r| r[idx].clone()).collect();
            let array = kernels::concat_unified(&parts)
                .map_err(|err| crate::physical::with_column(err, name))?;
            columns.push(Series::from_kernel(name, array)?);
        }
        let out = DataFrame::with_height(columns, self.groups.len())?;
        trace_verb("summarize", &self.frame, &out);
        Ok(out)
    }

    /// Alias of [`GroupBy::summarize`].
    pub fn agg<E: IntoExpr>(&self, exprs: impl IntoIterator<Item = E>) -> Result<DataFrame> {
        self.summarize(exprs)
    }

    /// Per-group `mutate`; rows come back in their original order.
    pub fn mutate<E: IntoExpr>(&self, exprs: impl IntoIterator<Item = E>) -> Result<DataFrame> {
        let exprs = to_exprs(exprs);
        if self.frame.height() == 0 {
            return self.frame.mutate(exprs);
        }
        let frames = self.sub_frames()?;
        let parts = parallel::map_collect(&frames, parallel::min_groups(), |group| {
            group.mutate(exprs.iter())
        })
        .into_iter()
        .collect::<Result<Vec<_>>>()?;
        let stacked = stack(&parts)?;

        // Row `r` of the output is the stacked row holding original row `r`.
        let mut inverse = vec![0; self.frame.height()];
        for (pos, row) in self.groups.iter().flatten().enumerate() {
            inverse[*row] = pos;
        }
        let out = stacked.take(&inverse)?;
        trace_verb("group_mutate", &self.frame, &out);
        Ok(out)
    }

    fn keep_rows(&self, op: &'static str, mut rows: Vec<usize>) -> Result<DataFrame> {
        rows.sort_unstable();
        let out = self.frame.take(&rows)?;
        trace_verb(op, &self.frame, &out);
        Ok(out)
    }

    /// Per-group `filter`; kept rows stay in their original order.
    pub fn filter<E: IntoExpr>(&self, predicates: impl IntoIterator<Item = E>) -> Result<DataFrame> {
        let predicates = to_exprs(predicates);
        let frames = self.sub_frames()?;
        let kept = parallel::map_collect(&frames, parallel::min_groups(), |group| {
            group.predicate_mask(&predicates)
        })
        .into_iter()
        .collect::<Result<Vec<_>>>()?;
        let mut rows = Vec::new();
        for (group, mask) in self.groups.iter().zip(kept) {
            match mask {
                Some(mask) => rows.extend(
                    group
                        .iter()
                        .zip(mask.iter())
                        .filter(|(_, keep)| *keep == Some(true))
                        .map(|(row, _)| *row),
                ),
                None => rows.extend(group.iter().copied()),
            }
        }
        self.keep_rows("group_filter", rows)
    }

    /// Rows at the given positions within each group.
    ///
    /// Positions outside a group are skipped for that group.
    pub fn slice(&self, positions: &[i64]) -> Result<DataFrame> {
        let rows = self
            .groups
            .iter()
            .flat_map(|group| {
                positions
                    .iter()
                    .filter_map(|&p| resolve_position(p, group.len()).map(|i| group[i]))
            })
            .collect();
        self.keep_rows("group_slice", rows)
    }

    /// First `n` rows of each group.
    pub fn slice_head(&self, n: usize) -> Result<DataFrame> {
        let rows = self
            .groups
            .iter()
            .flat_map(|group| group.iter().take(n).copied())
            .collect();
        self.keep_rows("group_slice_head", rows)
    }

    /// Last `n` rows of each group.
    pub fn slice_tail(&self, n: usize) -> Result<DataFrame> {
        let rows = self
            .groups
            .iter()
            .flat_map(|group| group[group.len().saturating_sub(n)..].iter().copied())
            .collect();
        self.keep_rows("group_slice_tail", rows)
    }

    /// Rows per group in a column named `name` (default `"n"`).
    pub fn count(&self, sort: bool, name: Option<&str>) -> Result<DataFrame> {
        let name = name.unwrap_or("n");
        if self.keys.iter().any(|k| k == name) {
            return Err(DataFrameError::duplicate_column(name));
        }
        let keys = self.key_frame()?;
        let sizes: Int64Array = self.groups.iter().map(|g| Some(g.len() as i64)).collect();
        let mut columns = keys.columns().to_vec();
        columns.push(Series::from_kernel(name, Arc::new(sizes))?);
        let out = DataFrame::with_height(columns, self.groups.len())?;
        if sort {
            return out.arrange([SortKey {
                expr: Expr::Column(name.to_string()),
                descending: true,
            }]);
        }
        Ok(out)
    }
}

/// Vertically stack frames that share column names.
fn stack(parts: &[DataFrame]) -> Result<DataFrame> {
    let Some(first) = parts.first() else {
        return Ok(DataFrame::empty());
    };
    let height = parts.iter().map(DataFrame::height).sum();
    let columns = first
        .names()
        .iter()
        .map(|name| {
            let arrays = parts
                .iter()
                .map(|p| p.column(name).map(Series::to_arrow))
                .collect::<Result<Vec<_>>>()?;
            let array = kernels::concat_unified(&arrays)
                .map_err(|err| crate::physical::with_column(err, name))?;
            Series::from_kernel(name, array)
        })
        .collect::<Result<Vec<_>>>()?;
    DataFrame::with_height(columns, height)
}

#[cfg(test)]
mod tests {
    use crate::expr::{col, lag, lead, mean, n, row_number};
    use crate::types::Scalar;
    use crate::{DataFrame, DataFrameError, Series};

    fn df() -> DataFrame {
        DataFrame::new(vec![
            Series::int64("x", [0_i64, 1, 2, 3]),
            Series::utf8("y", [Some("a"), Some("b"), Some("a"), None]),
        ])
        .unwrap()
    }

    #[test]
    fn summarize_per_group_in_first_seen_order() {
        let out = df().group_by(["y"]).unwrap().summarize([mean("x").alias("avg_x")]).unwrap();
        assert_eq!(
            out.column("y").unwrap().str_values().unwrap(),
            vec![Some("a".to_string()), Some("b".to_string()), None]
        );
        assert_eq!(
            out.column("avg_x").unwrap().f64_values().unwrap(),
            vec![Some(1.0), Some(1.0), Some(3.0)]
        );
    }

    #[test]
    fn ungrouped_summarize_is_one_group() {
        let out = df().summarize([n().alias("rows"), col("x").sum()]).unwrap();
        assert_eq!(out.height(), 1);
        assert_eq!(out.get_row(0).unwrap(), vec![Scalar::Int64(4), Scalar::Int64(6)]);
    }

    #[test]
    fn grouped_mutate_restores_row_order() {
        let out = df()
            .group_by(["y"])
            .unwrap()
            .mutate([row_number().alias("r"), col("x").sub(col("x").mean()).alias("d")])
            .unwrap();
        assert_eq!(
            out.column("x").unwrap().i64_values().unwrap(),
            vec![Some(0), Some(1), Some(2), Some(3)]
        );
        assert_eq!(
            out.column("r").unwrap().i64_values().unwrap(),
            vec![Some(1), Some(1), Some(2), Some(1)]
        );
        assert_eq!(
            out.column("d").unwrap().f64_values().unwrap(),
            vec![Some(-1.0), Some(0.0), Some(1.0), Some(0.0)]
        );
    }

    #[test]
    fn grouped_filter_and_slice_keep_order() {
        let grouped = df().group_by(["y"]).unwrap();
        let out = grouped.filter([col("x").eq(col("x").max())]).unwrap();
        assert_eq!(
            out.column("x").unwrap().i64_values().unwrap(),
            vec![Some(1), Some(2), Some(3)]
        );
        let tail = grouped.slice_tail(1).unwrap();
        assert_eq!(tail.height(), 3);
        let first = grouped.slice(&[0]).unwrap();
        assert_eq!(
            first.column("x").unwrap().i64_values().unwrap(),
            vec![Some(0), Some(1), Some(3)]
        );
    }

    #[test]
    fn zero_rows_keep_schema() {
        let empty = df().slice_head(0);
        let out = empty.group_by(["y"]).unwrap().summarize([mean("x")]).unwrap();
        assert_eq!(out.height(), 0);
        assert_eq!(out.names(), vec!["y", "x"]);
        let mutated = empty.group_by(["y"]).unwrap().mutate([col("x").add(1).alias("z")]).unwrap();
        assert_eq!(mutated.names(), vec!["x", "y", "z"]);
    }

    #[test]
    fn zero_groups_still_require_one_value_per_summary() {
        let empty = df().slice_head(0);
        let grouped = empty.group_by(["y"]).unwrap();
        assert!(matches!(
            grouped.summarize([col("x")]),
            Err(DataFrameError::ShapeMismatch { .. })
        ));
        let out = grouped.summarize([n().alias("rows"), col("x").max()]).unwrap();
        assert_eq!(out.names(), vec!["y", "rows", "x"]);
        assert_eq!(out.height(), 0);
    }

    #[test]
    fn windows_are_computed_per_group() {
        let df = DataFrame::new(vec![
            Series::utf8("g", ["a", "b", "a", "b"]),
            Series::int64("x", [1_i64, 2, 3, 4]),
        ])
        .unwrap();
        let out = df
            .group_by(["g"])
            .unwrap()
            .mutate([
                lag("x", 1, None).alias("prev"),
                lead("x", 1, None).alias("next"),
            ])
            .unwrap();
        assert_eq!(
            out.column("x").unwrap().i64_values().unwrap(),
            vec![Some(1), Some(2), Some(3), Some(4)]
        );
        assert_eq!(
            out.column("prev").unwrap().i64_values().unwrap(),
            vec![None, None, Some(1), Some(2)]
        );
        assert_eq!(
            out.column("next").unwrap().i64_values().unwrap(),
            vec![Some(3), Some(4), None, None]
        );
    }

    #[test]
    fn expression_keys_are_materialized() {
        let grouped = df().group_by([col("x").rem(2).alias("parity")]).unwrap();
        assert_eq!(grouped.keys(), ["parity".to_string()]);
        assert_eq!(grouped.n_groups(), 2);
        let counts = grouped.count(true, None).unwrap();
        assert_eq!(counts.names(), vec!["parity", "n"]);
    }
}
