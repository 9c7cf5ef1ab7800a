use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array};

use crate::expr::{Expr as E, UnaryOperator};
use crate::physical::kernels::{
    aggregate, arithmetic, boolean, broadcast, common_len, compare, interleave, string, temporal,
    window,
};
use crate::types::cast_array;
use crate::{DataFrame, DataFrameError, Expr, Result, Series};

/// Evaluates `Expr` values against a `DataFrame` (a whole table or one group).
pub struct ExprEval;

impl ExprEval {
    /// Evaluate `expr`; the result has the frame's height or length 1.
    pub fn evaluate(expr: &Expr, frame: &DataFrame) -> Result<ArrayRef> {
        eval_expr(expr, frame)
    }

    /// Evaluate `expr` as a full-height column named `name`.
    pub fn evaluate_column(expr: &Expr, frame: &DataFrame, name: &str) -> Result<Series> {
        let array = eval_expr(expr, frame)
            .and_then(|a| broadcast(&a, frame.height()))
            .map_err(|err| with_column(err, name))?;
        Series::from_kernel(name, array)
    }

    /// Evaluate `expr` as a single summary value named `name`.
    pub fn evaluate_summary(expr: &Expr, frame: &DataFrame, name: &str) -> Result<Series> {
        let array = eval_expr(expr, frame).map_err(|err| with_column(err, name))?;
        if array.len() != 1 {
            return Err(DataFrameError::shape_mismatch(format!(
                "summary '{name}' produced {} values, expected 1",
                array.len()
            )));
        }
        Series::from_kernel(name, array)
    }
}

/// Attach the output column name to a context-free type error.
pub(crate) fn with_column(err: DataFrameError, name: &str) -> DataFrameError {
    match err {
        DataFrameError::TypeMismatch {
            column: None,
            expected,
            actual,
        } => DataFrameError::type_mismatch(Some(name.to_string()), expected, actual),
        other => other,
    }
}

fn full_height(expr: &Expr, frame: &DataFrame) -> Result<ArrayRef> {
    broadcast(&eval_expr(expr, frame)?, frame.height())
}

fn eval_expr(expr: &Expr, frame: &DataFrame) -> Result<ArrayRef> {
    match expr {
        E::Column(name) => Ok(frame.column(name)?.to_arrow()),
        E::Columns(_) | E::Selector(_) | E::Wildcard => Err(DataFrameError::invalid_argument(
            "multi-column expression cannot be evaluated as a single column",
        )),
        E::Literal(s) => Ok(s.to_array(1)),
        E::Alias { expr, .. } | E::Prefix { expr, .. } | E::Suffix { expr, .. } => {
            eval_expr(expr, frame)
        }
        E::BinaryOp { left, op, right } => {
            let l = eval_expr(left, frame)?;
            let r = eval_expr(right, frame)?;
            if op.is_arithmetic() {
                arithmetic::arithmetic(*op, &l, &r)
            } else if op.is_logical() {
                boolean::logical(*op, &l, &r)
            } else {
                compare::compare(*op, &l, &r)
            }
        }
        E::UnaryOp { op, expr } => {
            let v = eval_expr(expr, frame)?;
            match op {
                UnaryOperator::Not => boolean::not(&v),
                UnaryOperator::Neg => arithmetic::negate(&v),
                UnaryOperator::IsNull => Ok(boolean::is_null(&v)),
                UnaryOperator::IsNotNull => Ok(boolean::is_not_null(&v)),
            }
        }
        E::Math { func, expr } => arithmetic::math(*func, &eval_expr(expr, frame)?),
        E::Agg { func, expr } => aggregate::aggregate(*func, &full_height(expr, frame)?),
        E::Pair { func, left, right } => {
            let l = full_height(left, frame)?;
            let r = full_height(right, frame)?;
            aggregate::pairwise(*func, &l, &r)
        }
        E::Shift {
            expr,
            offset,
            default,
        } => window::shift(&full_height(expr, frame)?, *offset, default.as_ref()),
        E::FillNull { expr, strategy } => {
            window::fill_null(&full_height(expr, frame)?, *strategy)
        }
        E::RowNumber => Ok(window::row_number(frame.height())),
        E::Len => Ok(Arc::new(Int64Array::from(vec![frame.height() as i64]))),
        E::Conditional {
            branches,
            otherwise,
        } => eval_conditional(branches, otherwise, frame),
        E::Cast { expr, dtype } => cast_array(&eval_expr(expr, frame)?, *dtype),
        E::Str { func, expr } => string::string(func, &eval_expr(expr, frame)?),
        E::Concat { exprs, sep } => {
            let arrays = exprs
                .iter()
                .map(|e| eval_expr(e, frame))
                .collect::<Result<Vec<_>>>()?;
            string::concat(&arrays, sep)
        }
        E::Temporal { func, expr } => temporal::temporal(func, &eval_expr(expr, frame)?),
        E::MakeDate { year, month, day } => temporal::make_date(
            &eval_expr(year, frame)?,
            &eval_expr(month, frame)?,
            &eval_expr(day, frame)?,
        ),
        E::IsIn { expr, values } => compare::is_in(&eval_expr(expr, frame)?, values),
    }
}

/// Row-wise first-true-branch selection; unmatched rows take `otherwise`.
///
/// Branches after the point where every row has matched are not evaluated,
/// except literal values, which still take part in type promotion.
fn eval_conditional(branches: &[(Expr, Expr)], otherwise: &Expr, frame: &DataFrame) -> Result<ArrayRef> {
    let mut conditions = Vec::with_capacity(branches.len());
    let mut values = Vec::with_capacity(branches.len() + 1);
    let mut matched: Option<Vec<bool>> = None;
    let mut decided = false;
    for (condition, value) in branches {
        let condition = eval_expr(condition, frame)?;
        let hits = match matched.take() {
            None => vec![false; condition.len()],
            Some(hits) => {
                let len = common_len(&[hits.len(), condition.len()])?;
                if hits.len() == len {
                    hits
                } else {
                    vec![hits[0]; len]
                }
            }
        };
        let mask = boolean::true_mask(&broadcast(&condition, hits.len())?)?;
        let hits: Vec<bool> = hits
            .into_iter()
            .enumerate()
            .map(|(row, hit)| hit || mask.value(row))
            .collect();
        decided = !hits.is_empty() && hits.iter().all(|hit| *hit);
        matched = Some(hits);
        conditions.push(condition);
        values.push(eval_expr(value, frame)?);
        if decided {
            break;
        }
    }
    let reached = conditions.len();
    if !decided {
        values.push(eval_expr(otherwise, frame)?);
    }
    let lens: Vec<usize> = conditions.iter().chain(&values).map(|a| a.len()).collect();
    let len = common_len(&lens)?;
    if decided {
        let skipped = branches[reached..].iter().map(|(_, value)| value);
        for value in skipped.chain(std::iter::once(otherwise)) {
            if let E::Literal(s) = value {
                values.push(s.to_array(1));
            }
        }
    }

    let masks = conditions
        .iter()
        .map(|c| boolean::true_mask(&broadcast(c, len)?))
        .collect::<Result<Vec<_>>>()?;
    let values = values
        .iter()
        .map(|v| broadcast(v, len))
        .collect::<Result<Vec<_>>>()?;

    let indices: Vec<(usize, usize)> = (0..len)
        .map(|row| {
            let which = masks.iter().position(|m| m.value(row)).unwrap_or(reached);
            (which, row)
        })
        .collect();
    interleave(&values, &indices)
}
