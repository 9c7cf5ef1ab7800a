use std::collections::HashMap;

use arrow::array::ArrayRef;

use crate::config::EngineConfig;
use crate::dataframe::key::{group_keys, GroupKey};
use crate::physical::kernels::{self, supertype_of};
use crate::physical::{parallel, with_column};
use crate::types::cast_array;
use crate::{DataFrame, DataFrameError, Result, Series};

/// Key selection and naming options for the join verbs.
///
/// With neither `on` nor `left_on`/`right_on` set, the keys are the column
/// names the two frames share.
#[derive(Debug, Clone)]
pub struct JoinOptions {
    on: Vec<String>,
    left_on: Vec<String>,
    right_on: Vec<String>,
    suffix: Option<String>,
    nulls_equal: bool,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl JoinOptions {
    pub fn new() -> Self {
        Self {
            on: Vec::new(),
            left_on: Vec::new(),
            right_on: Vec::new(),
            suffix: None,
            nulls_equal: true,
        }
    }

    /// Key columns with the same name on both sides.
    pub fn on<S: Into<String>>(mut self, cols: impl IntoIterator<Item = S>) -> Self {
        self.on = cols.into_iter().map(Into::into).collect();
        self
    }

    /// Left key columns, paired positionally with [`JoinOptions::right_on`].
    pub fn left_on<S: Into<String>>(mut self, cols: impl IntoIterator<Item = S>) -> Self {
        self.left_on = cols.into_iter().map(Into::into).collect();
        self
    }

    pub fn right_on<S: Into<String>>(mut self, cols: impl IntoIterator<Item = S>) -> Self {
        self.right_on = cols.into_iter().map(Into::into).collect();
        self
    }

    /// Suffix for right-side columns whose name is already taken on the left.
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Whether null keys match each other (default `true`).
    pub fn nulls_equal(mut self, nulls_equal: bool) -> Self {
        self.nulls_equal = nulls_equal;
        self
    }

    fn resolve_keys(&self, left: &DataFrame, right: &DataFrame) -> Result<(Vec<String>, Vec<String>)> {
        if !self.on.is_empty() && !(self.left_on.is_empty() && self.right_on.is_empty()) {
            return Err(DataFrameError::invalid_argument(
                "join accepts either `on` or `left_on`/`right_on`, not both",
            ));
        }
        if self.left_on.len() != self.right_on.len() {
            return Err(DataFrameError::invalid_argument(format!(
                "left_on has {} columns but right_on has {}",
                self.left_on.len(),
                self.right_on.len()
            )));
        }
        let (left_keys, right_keys) = if !self.on.is_empty() {
            (self.on.clone(), self.on.clone())
        } else if !self.left_on.is_empty() {
            (self.left_on.clone(), self.right_on.clone())
        } else {
            let right_names = right.names();
            let shared: Vec<String> = left
                .names()
                .into_iter()
                .filter(|n| right_names.contains(n))
                .collect();
            if shared.is_empty() {
                return Err(DataFrameError::invalid_argument(
                    "no common columns to join on; pass explicit keys",
                ));
            }
            (shared.clone(), shared)
        };
        for name in &left_keys {
            if left.column(name).is_err() {
                return Err(DataFrameError::key_not_found(name.as_str()));
            }
        }
        for name in &right_keys {
            if right.column(name).is_err() {
                return Err(DataFrameError::key_not_found(name.as_str()));
            }
        }
        Ok((left_keys, right_keys))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinKind {
    Inner,
    Left,
    Full,
}

impl JoinKind {
    fn name(self) -> &'static str {
        match self {
            JoinKind::Inner => "inner_join",
            JoinKind::Left => "left_join",
            JoinKind::Full => "full_join",
        }
    }
}

/// Key columns of both sides cast to their pairwise supertype.
fn key_arrays(
    left: &DataFrame,
    right: &DataFrame,
    left_keys: &[String],
    right_keys: &[String],
) -> Result<(Vec<ArrayRef>, Vec<ArrayRef>)> {
    let mut lhs = Vec::with_capacity(left_keys.len());
    let mut rhs = Vec::with_capacity(right_keys.len());
    for (l, r) in left_keys.iter().zip(right_keys) {
        let pair = [left.column(l)?.to_arrow(), right.column(r)?.to_arrow()];
        let target = supertype_of(&pair).map_err(|err| with_column(err, l))?;
        lhs.push(cast_array(&pair[0], target).map_err(|err| with_column(err, l))?);
        rhs.push(cast_array(&pair[1], target).map_err(|err| with_column(err, r))?);
    }
    Ok((lhs, rhs))
}

/// Matched `(left, right)` row pairs in output order.
fn match_rows(
    left_keys: &[GroupKey],
    right_keys: &[GroupKey],
    kind: JoinKind,
    nulls_equal: bool,
) -> Vec<(Option<usize>, Option<usize>)> {
    let mut index: HashMap<&GroupKey, Vec<usize>> = HashMap::with_capacity(right_keys.len());
    for (row, key) in right_keys.iter().enumerate() {
        if nulls_equal || !key.has_null() {
            index.entry(key).or_default().push(row);
        }
    }
    tracing::trace!(distinct_keys = index.len(), "join build");

    let mut pairs = Vec::with_capacity(left_keys.len());
    let mut right_matched = vec![false; right_keys.len()];
    for (row, key) in left_keys.iter().enumerate() {
        let hits = if nulls_equal || !key.has_null() {
            index.get(key)
        } else {
            None
        };
        match hits {
            Some(rows) => {
                for &r in rows {
                    right_matched[r] = true;
                    pairs.push((Some(row), Some(r)));
                }
            }
            None if kind != JoinKind::Inner => pairs.push((Some(row), None)),
            None => {}
        }
    }
    if kind == JoinKind::Full {
        pairs.extend(
            right_matched
                .iter()
                .enumerate()
                .filter(|(_, matched)| !**matched)
                .map(|(r, _)| (None, Some(r))),
        );
    }
    pairs
}

fn hash_join(
    left: &DataFrame,
    right: &DataFrame,
    options: &JoinOptions,
    kind: JoinKind,
) -> Result<DataFrame> {
    let (left_names, right_names) = options.resolve_keys(left, right)?;
    let (left_arrays, right_arrays) = key_arrays(left, right, &left_names, &right_names)?;

    let fan_out = left.height().max(right.height()) >= parallel::min_rows();
    let (left_keys, right_keys) = parallel::join(
        fan_out,
        || group_keys(&left_arrays, left.height()),
        || group_keys(&right_arrays, right.height()),
    );
    let pairs = match_rows(&left_keys?, &right_keys?, kind, options.nulls_equal);
    let left_rows: Vec<Option<usize>> = pairs.iter().map(|(l, _)| *l).collect();
    let right_rows: Vec<Option<usize>> = pairs.iter().map(|(_, r)| *r).collect();

    let mut columns = Vec::with_capacity(left.width() + right.width());
    for column in left.columns() {
        let key = left_names.iter().position(|n| n == column.name());
        let array = match key {
            Some(k) if kind == JoinKind::Full => {
                let picks: Vec<(usize, usize)> = pairs
                    .iter()
                    .map(|pair| match pair {
                        (Some(l), _) => (0, *l),
                        (None, Some(r)) => (1, *r),
                        (None, None) => (0, 0),
                    })
                    .collect();
                kernels::interleave(&[left_arrays[k].clone(), right_arrays[k].clone()], &picks)?
            }
            _ => kernels::take_optional(column.array(), &left_rows)?,
        };
        columns.push(Series::from_kernel(column.name(), array)?);
    }

    let suffix = options
        .suffix
        .clone()
        .unwrap_or_else(|| EngineConfig::global().join_suffix.clone());
    let taken = left.names();
    for column in right.columns() {
        if right_names.iter().any(|n| n == column.name()) {
            continue;
        }
        let name = if taken.iter().any(|n| n == column.name()) {
            format!("{}{}", column.name(), suffix)
        } else {
            column.name().to_string()
        };
        let array = kernels::take_optional(column.array(), &right_rows)?;
        columns.push(Series::from_kernel(&name, array)?);
    }

    let out = DataFrame::with_height(columns, pairs.len())?;
    tracing::debug!(
        op = kind.name(),
        keys = ?left_names,
        left_height = left.height(),
        right_height = right.height(),
        out_height = out.height(),
        "verb"
    );
    Ok(out)
}

impl DataFrame {
    /// Rows whose keys match on both sides, one row per matching pair.
    pub fn inner_join(&self, right: &DataFrame, options: &JoinOptions) -> Result<DataFrame> {
        hash_join(self, right, options, JoinKind::Inner)
    }

    /// Every left row; right columns are null where nothing matched.
    pub fn left_join(&self, right: &DataFrame, options: &JoinOptions) -> Result<DataFrame> {
        hash_join(self, right, options, JoinKind::Left)
    }

    /// Every row of both sides with key columns coalesced.
    pub fn full_join(&self, right: &DataFrame, options: &JoinOptions) -> Result<DataFrame> {
        hash_join(self, right, options, JoinKind::Full)
    }
}
