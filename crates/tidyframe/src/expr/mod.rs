#[allow(clippy::module_inception)]
mod expr;
mod functions;
mod into_expr;
mod selector;

/// Expression AST and supporting enums.
pub use expr::{
    AggFunc, Expr, FillStrategy, MathFunc, Operator, PairFunc, RoundUnit, StringFunc, TemporalFunc,
    UnaryOperator,
};
/// Expression builder helpers.
pub use functions::{
    all, asc, case_when, coalesce, col, cols, contains, cor, count, cov, desc, ends_with,
    everything, first, if_else, lag, last, lead, lit, make_date, matches, max, mean, median, min,
    n, n_distinct, quantile, row_number, sd, starts_with, str_c, sum, var, SortKey, Then, When,
};
/// Coercion of verb arguments into expressions.
pub use into_expr::IntoExpr;
pub use selector::Selector;

pub(crate) use into_expr::to_exprs;
pub(crate) use selector::{expand, output_name, resolve_columns};
