//! `tidyframe` is an in-memory columnar query-expression engine with
//! dplyr-style verbs, built on Arrow.
//!
//! Tables are immutable [`DataFrame`]s of named [`Series`]. Verbs such as
//! `mutate`, `filter`, `arrange` and `summarize` take [`Expr`] trees built with
//! [`col`], [`lit`] and the helper functions re-exported here, and evaluate them
//! eagerly. [`GroupBy`] partitions rows by key for grouped verbs; joins and
//! pivots live on `DataFrame` as well.
//!
//! ```
//! use tidyframe::{col, mean, DataFrame, Series};
//!
//! let df = DataFrame::new(vec![
//!     Series::int64("x", [0_i64, 1, 2]),
//!     Series::utf8("y", ["a", "a", "b"]),
//! ])?;
//! let out = df.group_by(["y"])?.summarize([mean("x").alias("avg_x")])?;
//! assert_eq!(out.column("avg_x")?.f64_values()?, vec![Some(0.5), Some(2.0)]);
//! # Ok::<(), tidyframe::DataFrameError>(())
//! ```

mod error;

/// Engine configuration.
pub mod config;
/// Eager DataFrame, Series and grouped/joined/reshaped views.
pub mod dataframe;
/// Expression DSL.
pub mod expr;
/// Expression evaluation and compute kernels.
pub mod physical;
/// Value and type system.
pub mod types;

pub use crate::config::EngineConfig;
/// Re-export of the primary table types.
pub use crate::dataframe::{
    DataFrame, FillDirection, GroupBy, JoinOptions, PivotLongerOptions, PivotWiderOptions, Series,
    TableSink,
};
/// Re-export of the crate error type and result alias.
pub use crate::error::{DataFrameError, Result};
/// Re-export of the expression DSL entrypoints.
pub use crate::expr::{
    all, asc, case_when, coalesce, col, cols, contains, cor, count, cov, desc, ends_with,
    everything, first, if_else, lag, last, lead, lit, make_date, matches, max, mean, median, min,
    n, n_distinct, quantile, row_number, sd, starts_with, str_c, sum, var, Expr, IntoExpr,
    SortKey,
};
pub use crate::types::{DType, Scalar, TimeUnit};
