use crate::expr::selector::Selector;
use crate::types::{DType, Scalar};
use crate::{DataFrameError, Result};

/// Expression AST evaluated against a `DataFrame` or one group of it.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference.
    Column(String),
    /// Several column references, expanded into one expression per column.
    Columns(Vec<String>),
    /// Name-pattern selector, expanded into one expression per match.
    Selector(Selector),
    /// Every column, in frame order.
    Wildcard,
    /// Literal scalar value.
    Literal(Scalar),
    /// Binary operator expression.
    BinaryOp {
        left: Box<Expr>,
        op: Operator,
        right: Box<Expr>,
    },
    /// Unary operator expression.
    UnaryOp { op: UnaryOperator, expr: Box<Expr> },
    /// Elementwise math function.
    Math { func: MathFunc, expr: Box<Expr> },
    /// Reduction to a single value.
    Agg { func: AggFunc, expr: Box<Expr> },
    /// Two-column statistic (`cor`, `cov`).
    Pair {
        func: PairFunc,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `lag` / `lead`; positive offsets lag.
    Shift {
        expr: Box<Expr>,
        offset: i64,
        default: Option<Scalar>,
    },
    /// Fill nulls from neighbouring rows.
    FillNull {
        expr: Box<Expr>,
        strategy: FillStrategy,
    },
    /// 1-based row position within the evaluation context.
    RowNumber,
    /// Row count of the evaluation context (`n()`).
    Len,
    /// First matching branch wins; `otherwise` covers the rest.
    Conditional {
        branches: Vec<(Expr, Expr)>,
        otherwise: Box<Expr>,
    },
    /// Cast to another dtype.
    Cast { expr: Box<Expr>, dtype: DType },
    /// String function.
    Str { func: StringFunc, expr: Box<Expr> },
    /// Row-wise string concatenation.
    Concat { exprs: Vec<Expr>, sep: String },
    /// Date / datetime function.
    Temporal { func: TemporalFunc, expr: Box<Expr> },
    /// Date from year, month and day parts.
    MakeDate {
        year: Box<Expr>,
        month: Box<Expr>,
        day: Box<Expr>,
    },
    /// Membership in a literal set.
    IsIn { expr: Box<Expr>, values: Vec<Scalar> },
    /// Expression alias (renames the resulting column).
    Alias { expr: Box<Expr>, name: String },
    /// Prepend text to the output name.
    Prefix { expr: Box<Expr>, prefix: String },
    /// Append text to the output name.
    Suffix { expr: Box<Expr>, suffix: String },
}

/// Supported binary operators.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operator {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// True division (always `Float64`).
    Div,
    /// Modulo, with the sign of the divisor.
    Rem,
    /// Exponentiation.
    Pow,
    /// Equality.
    Eq,
    /// Inequality.
    Neq,
    /// Greater-than.
    Gt,
    /// Less-than.
    Lt,
    /// Greater-than-or-equal.
    Ge,
    /// Less-than-or-equal.
    Le,
    /// Boolean AND (Kleene).
    And,
    /// Boolean OR (Kleene).
    Or,
}

impl Operator {
    pub(crate) fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Operator::Add
                | Operator::Sub
                | Operator::Mul
                | Operator::Div
                | Operator::Rem
                | Operator::Pow
        )
    }

    pub(crate) fn is_logical(self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }
}

/// Supported unary operators.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Boolean NOT.
    Not,
    /// Numeric negation.
    Neg,
    /// `true` where the value is null.
    IsNull,
    /// `true` where the value is not null.
    IsNotNull,
}

/// Elementwise math functions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MathFunc {
    Abs,
    Floor,
    Ceil,
    Sqrt,
    /// Natural logarithm.
    Log,
    Log10,
    Exp,
    /// Round half away from zero to the given number of decimal digits.
    Round(i32),
}

/// Supported aggregation functions.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AggFunc {
    /// Sum of non-null values.
    Sum,
    /// Mean of non-null values.
    Mean,
    /// Median of non-null values.
    Median,
    /// Count of non-null values.
    Count,
    /// Distinct values, null counted once.
    NUnique,
    /// Minimum of non-null values.
    Min,
    /// Maximum of non-null values.
    Max,
    /// Sample standard deviation.
    Std,
    /// Sample variance.
    Var,
    /// Linearly interpolated quantile, `0.0..=1.0`.
    Quantile(f64),
    /// First value (null included).
    First,
    /// Last value (null included).
    Last,
}

/// Two-column statistics over pairwise-complete rows.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PairFunc {
    /// Pearson correlation.
    Cor,
    /// Sample covariance.
    Cov,
}

/// Direction for null filling.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FillStrategy {
    /// Carry the last non-null value forward (down).
    Forward,
    /// Carry the next non-null value backward (up).
    Backward,
}

/// String functions over `Utf8` columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringFunc {
    ToUpper,
    ToLower,
    Trim,
    TrimStart,
    TrimEnd,
    /// Length in characters.
    Length,
    StartsWith(String),
    EndsWith(String),
    /// Regex match, optionally negated.
    Detect { pattern: String, negate: bool },
    /// Regex replacement of the first or every match.
    Replace {
        pattern: String,
        replacement: String,
        all: bool,
    },
    /// Capture group of the first regex match (0 is the whole match).
    Extract { pattern: String, group: usize },
    /// 1-based inclusive character range; negative positions count from the end.
    Sub { start: i64, end: Option<i64> },
}

/// Date and datetime functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemporalFunc {
    Year,
    Month,
    /// Day of month.
    Day,
    /// Day of week, Sunday = 1.
    Weekday,
    /// Day of year, 1-based.
    YearDay,
    /// ISO 8601 week number.
    Week,
    Quarter,
    Hour,
    Minute,
    Second,
    /// Convert to `Date`, parsing text with an optional chrono format.
    AsDate(Option<String>),
    /// Convert to `Datetime`, parsing text with an optional chrono format.
    AsDatetime(Option<String>),
    /// Truncate to the start of the enclosing `n`-unit bucket; keeps the input type.
    Round { unit: RoundUnit, n: i64 },
}

/// Bucket width for [`TemporalFunc::Round`].
///
/// Buckets are counted from the Unix epoch; weeks start on Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundUnit {
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl std::str::FromStr for RoundUnit {
    type Err = DataFrameError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "month" => RoundUnit::Month,
            "week" => RoundUnit::Week,
            "day" => RoundUnit::Day,
            "hour" => RoundUnit::Hour,
            "minute" => RoundUnit::Minute,
            "second" => RoundUnit::Second,
            other => {
                return Err(DataFrameError::invalid_argument(format!(
                    "unknown rounding unit '{other}'"
                )))
            }
        })
    }
}

fn binary(left: Expr, op: Operator, right: Expr) -> Expr {
    Expr::BinaryOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

impl Expr {
    /// Alias this expression (used to name output columns).
    pub fn alias(self, name: impl Into<String>) -> Expr {
        Expr::Alias {
            expr: Box::new(self),
            name: name.into(),
        }
    }

    /// Prefix the output name; applies to each column of a multi-column expression.
    pub fn prefix(self, prefix: impl Into<String>) -> Expr {
        Expr::Prefix {
            expr: Box::new(self),
            prefix: prefix.into(),
        }
    }

    /// Suffix the output name; applies to each column of a multi-column expression.
    pub fn suffix(self, suffix: impl Into<String>) -> Expr {
        Expr::Suffix {
            expr: Box::new(self),
            suffix: suffix.into(),
        }
    }

    /// Build an addition expression.
    #[allow(clippy::should_implement_trait)]
    pub fn add(self, rhs: impl Into<Expr>) -> Expr {
        binary(self, Operator::Add, rhs.into())
    }

    /// Build a subtraction expression.
    #[allow(clippy::should_implement_trait)]
    pub fn sub(self, rhs: impl Into<Expr>) -> Expr {
        binary(self, Operator::Sub, rhs.into())
    }

    /// Build a multiplication expression.
    #[allow(clippy::should_implement_trait)]
    pub fn mul(self, rhs: impl Into<Expr>) -> Expr {
        binary(self, Operator::Mul, rhs.into())
    }

    /// Build a division expression.
    #[allow(clippy::should_implement_trait)]
    pub fn div(self, rhs: impl Into<Expr>) -> Expr {
        binary(self, Operator::Div, rhs.into())
    }

    /// Build a modulo expression.
    #[allow(clippy::should_implement_trait)]
    pub fn rem(self, rhs: impl Into<Expr>) -> Expr {
        binary(self, Operator::Rem, rhs.into())
    }

    /// Raise to a power.
    pub fn pow(self, rhs: impl Into<Expr>) -> Expr {
        binary(self, Operator::Pow, rhs.into())
    }

    /// Build an equality predicate.
    pub fn eq(self, rhs: impl Into<Expr>) -> Expr {
        binary(self, Operator::Eq, rhs.into())
    }

    /// Build an inequality predicate.
    pub fn neq(self, rhs: impl Into<Expr>) -> Expr {
        binary(self, Operator::Neq, rhs.into())
    }

    /// Build a greater-than predicate.
    pub fn gt(self, rhs: impl Into<Expr>) -> Expr {
        binary(self, Operator::Gt, rhs.into())
    }

    /// Build a less-than predicate.
    pub fn lt(self, rhs: impl Into<Expr>) -> Expr {
        binary(self, Operator::Lt, rhs.into())
    }

    /// Build a greater-than-or-equal predicate.
    pub fn ge(self, rhs: impl Into<Expr>) -> Expr {
        binary(self, Operator::Ge, rhs.into())
    }

    /// Build a less-than-or-equal predicate.
    pub fn le(self, rhs: impl Into<Expr>) -> Expr {
        binary(self, Operator::Le, rhs.into())
    }

    /// Inclusive range test, `low <= self <= high`.
    pub fn between(self, low: impl Into<Expr>, high: impl Into<Expr>) -> Expr {
        self.clone().ge(low).and_(self.le(high))
    }

    /// Build a boolean AND predicate.
    pub fn and_(self, rhs: impl Into<Expr>) -> Expr {
        binary(self, Operator::And, rhs.into())
    }

    /// Build a boolean OR predicate.
    pub fn or_(self, rhs: impl Into<Expr>) -> Expr {
        binary(self, Operator::Or, rhs.into())
    }

    /// Build a boolean NOT predicate.
    pub fn not_(self) -> Expr {
        self.unary(UnaryOperator::Not)
    }

    pub fn is_null(self) -> Expr {
        self.unary(UnaryOperator::IsNull)
    }

    pub fn is_not_null(self) -> Expr {
        self.unary(UnaryOperator::IsNotNull)
    }

    /// Membership in a literal set (`%in%`).
    pub fn is_in<V: Into<Scalar>>(self, values: impl IntoIterator<Item = V>) -> Expr {
        Expr::IsIn {
            expr: Box::new(self),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    fn unary(self, op: UnaryOperator) -> Expr {
        Expr::UnaryOp {
            op,
            expr: Box::new(self),
        }
    }

    fn agg(self, func: AggFunc) -> Expr {
        Expr::Agg {
            func,
            expr: Box::new(self),
        }
    }

    fn math(self, func: MathFunc) -> Expr {
        Expr::Math {
            func,
            expr: Box::new(self),
        }
    }

    fn str_fn(self, func: StringFunc) -> Expr {
        Expr::Str {
            func,
            expr: Box::new(self),
        }
    }

    fn temporal(self, func: TemporalFunc) -> Expr {
        Expr::Temporal {
            func,
            expr: Box::new(self),
        }
    }

    /// Build a `sum` aggregation.
    pub fn sum(self) -> Expr {
        self.agg(AggFunc::Sum)
    }

    /// Build a `mean` aggregation.
    pub fn mean(self) -> Expr {
        self.agg(AggFunc::Mean)
    }

    pub fn median(self) -> Expr {
        self.agg(AggFunc::Median)
    }

    /// Build a `count` aggregation (nulls excluded).
    pub fn count(self) -> Expr {
        self.agg(AggFunc::Count)
    }

    /// Number of distinct values, null counted once.
    pub fn n_distinct(self) -> Expr {
        self.agg(AggFunc::NUnique)
    }

    /// Build a `min` aggregation.
    pub fn min(self) -> Expr {
        self.agg(AggFunc::Min)
    }

    /// Build a `max` aggregation.
    pub fn max(self) -> Expr {
        self.agg(AggFunc::Max)
    }

    /// Sample standard deviation.
    pub fn sd(self) -> Expr {
        self.agg(AggFunc::Std)
    }

    /// Sample variance.
    pub fn var(self) -> Expr {
        self.agg(AggFunc::Var)
    }

    pub fn quantile(self, p: f64) -> Expr {
        self.agg(AggFunc::Quantile(p))
    }

    pub fn first(self) -> Expr {
        self.agg(AggFunc::First)
    }

    pub fn last(self) -> Expr {
        self.agg(AggFunc::Last)
    }

    pub fn abs(self) -> Expr {
        self.math(MathFunc::Abs)
    }

    pub fn floor(self) -> Expr {
        self.math(MathFunc::Floor)
    }

    pub fn ceil(self) -> Expr {
        self.math(MathFunc::Ceil)
    }

    pub fn sqrt(self) -> Expr {
        self.math(MathFunc::Sqrt)
    }

    /// Natural logarithm.
    pub fn log(self) -> Expr {
        self.math(MathFunc::Log)
    }

    pub fn log10(self) -> Expr {
        self.math(MathFunc::Log10)
    }

    pub fn exp(self) -> Expr {
        self.math(MathFunc::Exp)
    }

    pub fn round(self, digits: i32) -> Expr {
        self.math(MathFunc::Round(digits))
    }

    /// Shift by `offset` rows: positive lags, negative leads.
    pub fn shift(self, offset: i64, default: Option<Scalar>) -> Expr {
        Expr::Shift {
            expr: Box::new(self),
            offset,
            default,
        }
    }

    /// Previous value `n` rows back; vacated rows take `default` or null.
    pub fn lag(self, n: i64, default: Option<Scalar>) -> Expr {
        self.shift(n, default)
    }

    /// Next value `n` rows ahead; vacated rows take `default` or null.
    pub fn lead(self, n: i64, default: Option<Scalar>) -> Expr {
        self.shift(n.checked_neg().unwrap_or(i64::MAX), default)
    }

    pub fn fill_null(self, strategy: FillStrategy) -> Expr {
        Expr::FillNull {
            expr: Box::new(self),
            strategy,
        }
    }

    pub fn cast(self, dtype: DType) -> Expr {
        Expr::Cast {
            expr: Box::new(self),
            dtype,
        }
    }

    pub fn str_to_upper(self) -> Expr {
        self.str_fn(StringFunc::ToUpper)
    }

    pub fn str_to_lower(self) -> Expr {
        self.str_fn(StringFunc::ToLower)
    }

    /// Strip surrounding whitespace.
    pub fn str_trim(self) -> Expr {
        self.str_fn(StringFunc::Trim)
    }

    pub fn str_trim_start(self) -> Expr {
        self.str_fn(StringFunc::TrimStart)
    }

    pub fn str_trim_end(self) -> Expr {
        self.str_fn(StringFunc::TrimEnd)
    }

    pub fn str_length(self) -> Expr {
        self.str_fn(StringFunc::Length)
    }

    pub fn str_starts(self, prefix: impl Into<String>) -> Expr {
        self.str_fn(StringFunc::StartsWith(prefix.into()))
    }

    pub fn str_ends(self, suffix: impl Into<String>) -> Expr {
        self.str_fn(StringFunc::EndsWith(suffix.into()))
    }

    /// Regex match; `negate` flips the result for non-null rows.
    pub fn str_detect(self, pattern: impl Into<String>, negate: bool) -> Expr {
        self.str_fn(StringFunc::Detect {
            pattern: pattern.into(),
            negate,
        })
    }

    pub fn str_replace(self, pattern: impl Into<String>, replacement: impl Into<String>) -> Expr {
        self.str_fn(StringFunc::Replace {
            pattern: pattern.into(),
            replacement: replacement.into(),
            all: false,
        })
    }

    pub fn str_replace_all(
        self,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Expr {
        self.str_fn(StringFunc::Replace {
            pattern: pattern.into(),
            replacement: replacement.into(),
            all: true,
        })
    }

    pub fn str_remove(self, pattern: impl Into<String>) -> Expr {
        self.str_replace(pattern, "")
    }

    pub fn str_remove_all(self, pattern: impl Into<String>) -> Expr {
        self.str_replace_all(pattern, "")
    }

    /// First regex match (`group` 0) or one of its capture groups.
    pub fn str_extract(self, pattern: impl Into<String>, group: usize) -> Expr {
        self.str_fn(StringFunc::Extract {
            pattern: pattern.into(),
            group,
        })
    }

    /// Characters `start..=end` (1-based, negative from the end; open end when `None`).
    pub fn str_sub(self, start: i64, end: Option<i64>) -> Expr {
        self.str_fn(StringFunc::Sub { start, end })
    }

    pub fn year(self) -> Expr {
        self.temporal(TemporalFunc::Year)
    }

    pub fn month(self) -> Expr {
        self.temporal(TemporalFunc::Month)
    }

    /// Day of month.
    pub fn mday(self) -> Expr {
        self.temporal(TemporalFunc::Day)
    }

    /// Day of week, Sunday = 1.
    pub fn wday(self) -> Expr {
        self.temporal(TemporalFunc::Weekday)
    }

    pub fn yday(self) -> Expr {
        self.temporal(TemporalFunc::YearDay)
    }

    /// ISO week number.
    pub fn week(self) -> Expr {
        self.temporal(TemporalFunc::Week)
    }

    pub fn quarter(self) -> Expr {
        self.temporal(TemporalFunc::Quarter)
    }

    pub fn hour(self) -> Expr {
        self.temporal(TemporalFunc::Hour)
    }

    pub fn minute(self) -> Expr {
        self.temporal(TemporalFunc::Minute)
    }

    pub fn second(self) -> Expr {
        self.temporal(TemporalFunc::Second)
    }

    /// Convert to `Date`; text is parsed with `format` or ISO forms.
    pub fn as_date(self, format: Option<&str>) -> Expr {
        self.temporal(TemporalFunc::AsDate(format.map(str::to_string)))
    }

    /// Convert to `Datetime`; text is parsed with `format` or ISO forms.
    pub fn as_datetime(self, format: Option<&str>) -> Expr {
        self.temporal(TemporalFunc::AsDatetime(format.map(str::to_string)))
    }

    /// Floor dates and datetimes to multiples of `n` units.
    pub fn dt_round(self, unit: RoundUnit, n: i64) -> Expr {
        self.temporal(TemporalFunc::Round { unit, n })
    }

    /// Returns `true` for expressions that expand to several columns.
    pub(crate) fn is_multi_column(&self) -> bool {
        matches!(self, Expr::Columns(_) | Expr::Selector(_) | Expr::Wildcard)
    }

    /// Child expressions, in evaluation order.
    pub(crate) fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Column(_)
            | Expr::Columns(_)
            | Expr::Selector(_)
            | Expr::Wildcard
            | Expr::Literal(_)
            | Expr::RowNumber
            | Expr::Len => Vec::new(),
            Expr::BinaryOp { left, right, .. } | Expr::Pair { left, right, .. } => {
                vec![left.as_ref(), right.as_ref()]
            }
            Expr::UnaryOp { expr, .. }
            | Expr::Math { expr, .. }
            | Expr::Agg { expr, .. }
            | Expr::Shift { expr, .. }
            | Expr::FillNull { expr, .. }
            | Expr::Cast { expr, .. }
            | Expr::Str { expr, .. }
            | Expr::Temporal { expr, .. }
            | Expr::IsIn { expr, .. }
            | Expr::Alias { expr, .. }
            | Expr::Prefix { expr, .. }
            | Expr::Suffix { expr, .. } => vec![expr.as_ref()],
            Expr::Conditional {
                branches,
                otherwise,
            } => branches
                .iter()
                .flat_map(|(c, v)| [c, v])
                .chain(std::iter::once(otherwise.as_ref()))
                .collect(),
            Expr::Concat { exprs, .. } => exprs.iter().collect(),
            Expr::MakeDate { year, month, day } => vec![year.as_ref(), month.as_ref(), day.as_ref()],
        }
    }
}

macro_rules! binary_op_trait {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<T: Into<Expr>> std::ops::$trait<T> for Expr {
            type Output = Expr;

            fn $method(self, rhs: T) -> Expr {
                binary(self, $op, rhs.into())
            }
        }
    };
}

binary_op_trait!(Add, add, Operator::Add);
binary_op_trait!(Sub, sub, Operator::Sub);
binary_op_trait!(Mul, mul, Operator::Mul);
binary_op_trait!(Div, div, Operator::Div);
binary_op_trait!(Rem, rem, Operator::Rem);
binary_op_trait!(BitAnd, bitand, Operator::And);
binary_op_trait!(BitOr, bitor, Operator::Or);

impl std::ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        self.unary(UnaryOperator::Not)
    }
}

impl std::ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        self.unary(UnaryOperator::Neg)
    }
}

#[cfg(test)]
mod tests {
    use super::{AggFunc, Expr, Operator, RoundUnit, TemporalFunc, UnaryOperator};
    use crate::expr::{col, lit};
    use crate::types::Scalar;
    use crate::DataFrameError;

    #[test]
    fn builder_and_chaining_works() {
        let expr = col("a").add(lit(1_i64)).alias("b");
        assert_eq!(
            expr,
            Expr::Alias {
                expr: Box::new(Expr::BinaryOp {
                    left: Box::new(Expr::Column("a".to_string())),
                    op: Operator::Add,
                    right: Box::new(Expr::Literal(Scalar::Int64(1))),
                }),
                name: "b".to_string(),
            }
        );
    }

    #[test]
    fn logical_and_agg_works() {
        let expr = col("x")
            .gt(1)
            .and_(col("y").lt(10).not_())
            .alias("p");

        assert!(matches!(
            expr,
            Expr::Alias {
                expr: _,
                name
            } if name == "p"
        ));

        let agg = col("v").sum();
        assert_eq!(
            agg,
            Expr::Agg {
                func: AggFunc::Sum,
                expr: Box::new(Expr::Column("v".to_string()))
            }
        );

        let u = col("a").is_null();
        assert_eq!(
            u,
            Expr::UnaryOp {
                op: UnaryOperator::IsNull,
                expr: Box::new(Expr::Column("a".to_string()))
            }
        );
    }

    #[test]
    fn string_operands_are_literals() {
        let expr = col("y").eq("a");
        assert_eq!(
            expr,
            Expr::BinaryOp {
                left: Box::new(Expr::Column("y".to_string())),
                op: Operator::Eq,
                right: Box::new(Expr::Literal(Scalar::Utf8("a".to_string()))),
            }
        );
    }

    #[test]
    fn operator_traits_match_builders() {
        assert_eq!(col("a") + 1, col("a").add(1));
        assert_eq!(col("a") & col("b"), col("a").and_(col("b")));
        assert_eq!(!col("a"), col("a").not_());
        assert_eq!(
            -col("a"),
            Expr::UnaryOp {
                op: UnaryOperator::Neg,
                expr: Box::new(col("a"))
            }
        );
    }

    #[test]
    fn lead_is_negative_lag() {
        assert_eq!(col("x").lead(2, None), col("x").lag(-2, None));
        assert_eq!(col("x").children().len(), 0);
        assert_eq!(col("x").add(1).children().len(), 2);
    }

    #[test]
    fn lead_by_most_negative_offset_saturates() {
        assert_eq!(col("x").lead(i64::MIN, None), col("x").lag(i64::MAX, None));
    }

    #[test]
    fn rounding_units_parse_by_name() {
        assert_eq!("week".parse::<RoundUnit>().unwrap(), RoundUnit::Week);
        assert_eq!("minute".parse::<RoundUnit>().unwrap(), RoundUnit::Minute);
        assert!(matches!(
            "fortnight".parse::<RoundUnit>(),
            Err(DataFrameError::InvalidArgument { .. })
        ));
        assert_eq!(
            col("t").dt_round(RoundUnit::Day, 5),
            Expr::Temporal {
                func: TemporalFunc::Round {
                    unit: RoundUnit::Day,
                    n: 5
                },
                expr: Box::new(col("t"))
            }
        );
    }
}
