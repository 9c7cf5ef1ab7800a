use crate::expr::into_expr::to_exprs;
use crate::expr::selector::Selector;
use crate::expr::{AggFunc, Expr, IntoExpr, PairFunc, UnaryOperator};
use crate::types::Scalar;

/// Create an expression that refers to a column by name (case-sensitive).
pub fn col(name: &str) -> Expr {
    Expr::Column(name.to_string())
}

/// Refer to several columns at once; expands to one expression per column.
pub fn cols<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Expr {
    Expr::Columns(names.into_iter().map(|n| n.as_ref().to_string()).collect())
}

/// Create a literal expression from a scalar value.
pub fn lit<T>(value: T) -> Expr
where
    T: Into<Scalar>,
{
    Expr::Literal(value.into())
}

/// Create a wildcard expression that expands to all columns.
pub fn all() -> Expr {
    Expr::Wildcard
}

/// Alias of [`all`].
pub fn everything() -> Expr {
    Expr::Wildcard
}

/// Columns whose name starts with `prefix`.
pub fn starts_with(prefix: &str, ignore_case: bool) -> Expr {
    Expr::Selector(Selector::StartsWith {
        prefix: prefix.to_string(),
        ignore_case,
    })
}

/// Columns whose name ends with `suffix`.
pub fn ends_with(suffix: &str, ignore_case: bool) -> Expr {
    Expr::Selector(Selector::EndsWith {
        suffix: suffix.to_string(),
        ignore_case,
    })
}

/// Columns whose name contains `needle`.
pub fn contains(needle: &str, ignore_case: bool) -> Expr {
    Expr::Selector(Selector::Contains {
        needle: needle.to_string(),
        ignore_case,
    })
}

/// Columns whose name matches the regular expression `pattern`.
pub fn matches(pattern: &str, ignore_case: bool) -> Expr {
    Expr::Selector(Selector::Matches {
        pattern: pattern.to_string(),
        ignore_case,
    })
}

/// 1-based row position within the current table or group.
pub fn row_number() -> Expr {
    Expr::RowNumber
}

/// Number of rows in the current table or group.
pub fn n() -> Expr {
    Expr::Len
}

fn agg(func: AggFunc, expr: impl IntoExpr) -> Expr {
    Expr::Agg {
        func,
        expr: Box::new(expr.into_expr()),
    }
}

pub fn sum(expr: impl IntoExpr) -> Expr {
    agg(AggFunc::Sum, expr)
}

pub fn mean(expr: impl IntoExpr) -> Expr {
    agg(AggFunc::Mean, expr)
}

pub fn median(expr: impl IntoExpr) -> Expr {
    agg(AggFunc::Median, expr)
}

pub fn min(expr: impl IntoExpr) -> Expr {
    agg(AggFunc::Min, expr)
}

pub fn max(expr: impl IntoExpr) -> Expr {
    agg(AggFunc::Max, expr)
}

/// Sample standard deviation.
pub fn sd(expr: impl IntoExpr) -> Expr {
    agg(AggFunc::Std, expr)
}

/// Sample variance.
pub fn var(expr: impl IntoExpr) -> Expr {
    agg(AggFunc::Var, expr)
}

/// Count of non-null values.
pub fn count(expr: impl IntoExpr) -> Expr {
    agg(AggFunc::Count, expr)
}

pub fn n_distinct(expr: impl IntoExpr) -> Expr {
    agg(AggFunc::NUnique, expr)
}

pub fn quantile(expr: impl IntoExpr, p: f64) -> Expr {
    agg(AggFunc::Quantile(p), expr)
}

pub fn first(expr: impl IntoExpr) -> Expr {
    agg(AggFunc::First, expr)
}

pub fn last(expr: impl IntoExpr) -> Expr {
    agg(AggFunc::Last, expr)
}

/// Previous value `n` rows back.
pub fn lag(expr: impl IntoExpr, n: i64, default: Option<Scalar>) -> Expr {
    expr.into_expr().shift(n, default)
}

/// Next value `n` rows ahead.
pub fn lead(expr: impl IntoExpr, n: i64, default: Option<Scalar>) -> Expr {
    expr.into_expr().shift(n.checked_neg().unwrap_or(i64::MAX), default)
}

fn pair(func: PairFunc, x: impl IntoExpr, y: impl IntoExpr) -> Expr {
    Expr::Pair {
        func,
        left: Box::new(x.into_expr()),
        right: Box::new(y.into_expr()),
    }
}

/// Pearson correlation over pairwise-complete rows.
pub fn cor(x: impl IntoExpr, y: impl IntoExpr) -> Expr {
    pair(PairFunc::Cor, x, y)
}

/// Sample covariance over pairwise-complete rows.
pub fn cov(x: impl IntoExpr, y: impl IntoExpr) -> Expr {
    pair(PairFunc::Cov, x, y)
}

/// Paste columns together with `sep`; a null in any input gives null.
pub fn str_c<E: IntoExpr>(exprs: impl IntoIterator<Item = E>, sep: &str) -> Expr {
    Expr::Concat {
        exprs: to_exprs(exprs),
        sep: sep.to_string(),
    }
}

/// Build a date from year, month and day expressions.
pub fn make_date(year: impl IntoExpr, month: impl IntoExpr, day: impl IntoExpr) -> Expr {
    Expr::MakeDate {
        year: Box::new(year.into_expr()),
        month: Box::new(month.into_expr()),
        day: Box::new(day.into_expr()),
    }
}

/// Start a `case_when` chain with its first condition.
///
/// ```
/// use tidyframe::{case_when, col};
///
/// let expr = case_when(col("x").lt(2))
///     .then(0)
///     .when(col("x").lt(3))
///     .then(1)
///     .otherwise(0);
/// # let _ = expr;
/// ```
pub fn case_when(condition: impl Into<Expr>) -> When {
    When {
        branches: Vec::new(),
        condition: condition.into(),
    }
}

/// A `case_when` chain waiting for the value of its latest condition.
#[derive(Debug, Clone)]
pub struct When {
    branches: Vec<(Expr, Expr)>,
    condition: Expr,
}

impl When {
    pub fn then(self, value: impl Into<Expr>) -> Then {
        let mut branches = self.branches;
        branches.push((self.condition, value.into()));
        Then { branches }
    }
}

/// A complete `case_when` chain; rows matching no condition are null
/// unless [`Then::otherwise`] supplies a default.
#[derive(Debug, Clone)]
pub struct Then {
    branches: Vec<(Expr, Expr)>,
}

impl Then {
    pub fn when(self, condition: impl Into<Expr>) -> When {
        When {
            branches: self.branches,
            condition: condition.into(),
        }
    }

    pub fn otherwise(self, value: impl Into<Expr>) -> Expr {
        Expr::Conditional {
            branches: self.branches,
            otherwise: Box::new(value.into()),
        }
    }
}

impl From<Then> for Expr {
    fn from(value: Then) -> Self {
        value.otherwise(Scalar::Null)
    }
}

impl IntoExpr for Then {
    fn into_expr(self) -> Expr {
        self.into()
    }
}

/// Two-branch conditional.
pub fn if_else(condition: impl Into<Expr>, yes: impl Into<Expr>, no: impl Into<Expr>) -> Expr {
    case_when(condition).then(yes).otherwise(no)
}

/// First non-null value across `exprs`, left to right.
pub fn coalesce<E: IntoExpr>(exprs: impl IntoIterator<Item = E>) -> Expr {
    let mut exprs = to_exprs(exprs);
    let Some(last) = exprs.pop() else {
        return Expr::Literal(Scalar::Null);
    };
    let branches = exprs
        .into_iter()
        .map(|e| {
            let present = Expr::UnaryOp {
                op: UnaryOperator::IsNotNull,
                expr: Box::new(e.clone()),
            };
            (present, e)
        })
        .collect();
    Expr::Conditional {
        branches,
        otherwise: Box::new(last),
    }
}

/// Sort key for `arrange`.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub expr: Expr,
    pub descending: bool,
}

/// Ascending sort key.
pub fn asc(expr: impl IntoExpr) -> SortKey {
    SortKey {
        expr: expr.into_expr(),
        descending: false,
    }
}

/// Descending sort key.
pub fn desc(expr: impl IntoExpr) -> SortKey {
    SortKey {
        expr: expr.into_expr(),
        descending: true,
    }
}

impl From<&str> for SortKey {
    fn from(value: &str) -> Self {
        asc(value)
    }
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        asc(value)
    }
}

impl From<Expr> for SortKey {
    fn from(value: Expr) -> Self {
        asc(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_when_chain() {
        let expr = case_when(col("x").lt(2))
            .then(0)
            .when(col("x").lt(3))
            .then(1)
            .otherwise(0);
        let Expr::Conditional {
            branches,
            otherwise,
        } = expr
        else {
            panic!("expected a conditional");
        };
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[1].1, lit(1));
        assert_eq!(*otherwise, lit(0));
    }

    #[test]
    fn unfinished_case_when_defaults_to_null() {
        let expr: Expr = case_when(col("x").gt(0)).then("pos").into();
        assert!(matches!(
            expr,
            Expr::Conditional { otherwise, .. } if *otherwise == lit(Scalar::Null)
        ));
    }

    #[test]
    fn coalesce_is_a_conditional_chain() {
        let expr = coalesce(["a", "b"]);
        assert_eq!(
            expr,
            Expr::Conditional {
                branches: vec![(col("a").is_not_null(), col("a"))],
                otherwise: Box::new(col("b")),
            }
        );
        assert_eq!(coalesce(Vec::<Expr>::new()), lit(Scalar::Null));
    }

    #[test]
    fn sort_keys() {
        assert!(desc("x").descending);
        assert_eq!(SortKey::from("x"), asc(col("x")));
    }
}
