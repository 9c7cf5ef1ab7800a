use regex::RegexBuilder;

use crate::expr::Expr;
use crate::{DataFrameError, Result};

/// Column-name pattern used by multi-column expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Names starting with a literal prefix.
    StartsWith { prefix: String, ignore_case: bool },
    /// Names ending with a literal suffix.
    EndsWith { suffix: String, ignore_case: bool },
    /// Names containing a literal substring.
    Contains { needle: String, ignore_case: bool },
    /// Names matching a regular expression.
    Matches { pattern: String, ignore_case: bool },
}

impl Selector {
    /// Names from `names` accepted by this selector, in frame order.
    pub fn select<'a>(&self, names: &'a [String]) -> Result<Vec<&'a str>> {
        let fold = |s: &str, ignore_case: bool| {
            if ignore_case {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };
        let keep: Box<dyn Fn(&str) -> bool> = match self {
            Selector::StartsWith {
                prefix,
                ignore_case,
            } => {
                let prefix = fold(prefix, *ignore_case);
                let ic = *ignore_case;
                Box::new(move |name| fold(name, ic).starts_with(&prefix))
            }
            Selector::EndsWith {
                suffix,
                ignore_case,
            } => {
                let suffix = fold(suffix, *ignore_case);
                let ic = *ignore_case;
                Box::new(move |name| fold(name, ic).ends_with(&suffix))
            }
            Selector::Contains {
                needle,
                ignore_case,
            } => {
                let needle = fold(needle, *ignore_case);
                let ic = *ignore_case;
                Box::new(move |name| fold(name, ic).contains(&needle))
            }
            Selector::Matches {
                pattern,
                ignore_case,
            } => {
                let re = RegexBuilder::new(pattern)
                    .case_insensitive(*ignore_case)
                    .build()
                    .map_err(|err| {
                        DataFrameError::invalid_argument(format!(
                            "invalid pattern '{pattern}': {err}"
                        ))
                    })?;
                Box::new(move |name| re.is_match(name))
            }
        };
        Ok(names
            .iter()
            .map(String::as_str)
            .filter(|name| keep(name))
            .collect())
    }
}

/// Output column name of a single-column expression.
pub(crate) fn output_name(expr: &Expr) -> String {
    match expr {
        Expr::Alias { name, .. } => name.clone(),
        Expr::Prefix { expr, prefix } => format!("{prefix}{}", output_name(expr)),
        Expr::Suffix { expr, suffix } => format!("{}{suffix}", output_name(expr)),
        _ => first_column(expr).unwrap_or_else(|| "literal".to_string()),
    }
}

fn first_column(expr: &Expr) -> Option<String> {
    if let Expr::Column(name) = expr {
        return Some(name.clone());
    }
    expr.children().into_iter().find_map(first_column)
}

/// Column names a multi-column node stands for.
fn matched_names(expr: &Expr, names: &[String]) -> Result<Vec<String>> {
    match expr {
        Expr::Columns(list) => {
            for name in list {
                if !names.contains(name) {
                    return Err(DataFrameError::unknown_column(name));
                }
            }
            Ok(list.clone())
        }
        Expr::Selector(selector) => Ok(selector
            .select(names)?
            .into_iter()
            .map(str::to_string)
            .collect()),
        Expr::Wildcard => Ok(names.to_vec()),
        _ => Ok(Vec::new()),
    }
}

fn find_multi(expr: &Expr) -> Option<&Expr> {
    if expr.is_multi_column() {
        return Some(expr);
    }
    expr.children().into_iter().find_map(find_multi)
}

/// Replace every multi-column node with a reference to `column`.
fn substitute(expr: &Expr, column: &str) -> Expr {
    if expr.is_multi_column() {
        return Expr::Column(column.to_string());
    }
    let sub = |e: &Expr| Box::new(substitute(e, column));
    match expr {
        Expr::BinaryOp { left, op, right } => Expr::BinaryOp {
            left: sub(left),
            op: *op,
            right: sub(right),
        },
        Expr::Pair { func, left, right } => Expr::Pair {
            func: *func,
            left: sub(left),
            right: sub(right),
        },
        Expr::UnaryOp { op, expr } => Expr::UnaryOp {
            op: *op,
            expr: sub(expr),
        },
        Expr::Math { func, expr } => Expr::Math {
            func: *func,
            expr: sub(expr),
        },
        Expr::Agg { func, expr } => Expr::Agg {
            func: *func,
            expr: sub(expr),
        },
        Expr::Shift {
            expr,
            offset,
            default,
        } => Expr::Shift {
            expr: sub(expr),
            offset: *offset,
            default: default.clone(),
        },
        Expr::FillNull { expr, strategy } => Expr::FillNull {
            expr: sub(expr),
            strategy: *strategy,
        },
        Expr::Conditional {
            branches,
            otherwise,
        } => Expr::Conditional {
            branches: branches
                .iter()
                .map(|(c, v)| (substitute(c, column), substitute(v, column)))
                .collect(),
            otherwise: sub(otherwise),
        },
        Expr::Cast { expr, dtype } => Expr::Cast {
            expr: sub(expr),
            dtype: *dtype,
        },
        Expr::Str { func, expr } => Expr::Str {
            func: func.clone(),
            expr: sub(expr),
        },
        Expr::Concat { exprs, sep } => Expr::Concat {
            exprs: exprs.iter().map(|e| substitute(e, column)).collect(),
            sep: sep.clone(),
        },
        Expr::Temporal { func, expr } => Expr::Temporal {
            func: func.clone(),
            expr: sub(expr),
        },
        Expr::MakeDate { year, month, day } => Expr::MakeDate {
            year: sub(year),
            month: sub(month),
            day: sub(day),
        },
        Expr::IsIn { expr, values } => Expr::IsIn {
            expr: sub(expr),
            values: values.clone(),
        },
        Expr::Alias { expr, name } => Expr::Alias {
            expr: sub(expr),
            name: name.clone(),
        },
        Expr::Prefix { expr, prefix } => Expr::Prefix {
            expr: sub(expr),
            prefix: prefix.clone(),
        },
        Expr::Suffix { expr, suffix } => Expr::Suffix {
            expr: sub(expr),
            suffix: suffix.clone(),
        },
        other => other.clone(),
    }
}

fn has_alias(expr: &Expr) -> bool {
    matches!(expr, Expr::Alias { .. })
        || match expr {
            Expr::Prefix { expr, .. } | Expr::Suffix { expr, .. } => has_alias(expr),
            _ => false,
        }
}

/// Expand multi-column expressions into `(output name, expression)` pairs.
///
/// `names` are the columns of the frame the expressions will run against.
pub(crate) fn expand(exprs: &[Expr], names: &[String]) -> Result<Vec<(String, Expr)>> {
    let mut out = Vec::with_capacity(exprs.len());
    for expr in exprs {
        let Some(multi) = find_multi(expr) else {
            out.push((output_name(expr), expr.clone()));
            continue;
        };
        let matched = matched_names(multi, names)?;
        if matched.len() > 1 && has_alias(expr) {
            return Err(DataFrameError::invalid_argument(format!(
                "cannot alias an expression over {} columns",
                matched.len()
            )));
        }
        for column in matched {
            let single = substitute(expr, &column);
            out.push((output_name(&single), single));
        }
    }
    Ok(out)
}

/// Resolve a column selection (names, `cols`, selectors, `all`) to names.
///
/// Duplicates keep their first position; anything other than a column
/// reference is `InvalidArgument`.
pub(crate) fn resolve_columns(exprs: &[Expr], names: &[String]) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    for expr in exprs {
        let found = match expr {
            Expr::Column(name) => {
                if !names.contains(name) {
                    return Err(DataFrameError::unknown_column(name));
                }
                vec![name.clone()]
            }
            multi if multi.is_multi_column() => matched_names(multi, names)?,
            other => {
                return Err(DataFrameError::invalid_argument(format!(
                    "expected a column selection, got {other:?}"
                )))
            }
        };
        for name in found {
            if !out.contains(&name) {
                out.push(name);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{all, col, cols, contains, lit, matches, starts_with};

    fn names() -> Vec<String> {
        ["id", "Score_a", "score_b", "label"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn selectors_respect_case_flag() {
        let n = names();
        let sel = Selector::StartsWith {
            prefix: "score".into(),
            ignore_case: true,
        };
        assert_eq!(sel.select(&n).unwrap(), vec!["Score_a", "score_b"]);
        let sel = Selector::StartsWith {
            prefix: "score".into(),
            ignore_case: false,
        };
        assert_eq!(sel.select(&n).unwrap(), vec!["score_b"]);
    }

    #[test]
    fn output_names() {
        assert_eq!(output_name(&col("a").add(col("b"))), "a");
        assert_eq!(output_name(&lit(1).add(col("b"))), "b");
        assert_eq!(output_name(&lit(1)), "literal");
        assert_eq!(output_name(&col("a").sum().alias("total")), "total");
        assert_eq!(output_name(&col("a").prefix("p_").suffix("_s")), "p_a_s");
    }

    #[test]
    fn expand_across_columns() {
        let n = names();
        let exprs = vec![starts_with("score", true).mean().suffix("_mean")];
        let out = expand(&exprs, &n).unwrap();
        let got: Vec<&str> = out.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(got, vec!["Score_a_mean", "score_b_mean"]);
        assert_eq!(out[1].1, col("score_b").mean().suffix("_mean"));
    }

    #[test]
    fn alias_over_many_columns_is_rejected() {
        let n = names();
        let err = expand(&[contains("_", false).alias("x")], &n).unwrap_err();
        assert!(matches!(err, DataFrameError::InvalidArgument { .. }));
        // A selector with one match may be aliased.
        let ok = expand(&[matches("^id$", false).alias("key")], &n).unwrap();
        assert_eq!(ok[0].0, "key");
    }

    #[test]
    fn resolve_selection() {
        let n = names();
        let got = resolve_columns(&[col("label"), all()], &n).unwrap();
        assert_eq!(got, vec!["label", "id", "Score_a", "score_b"]);
        assert!(matches!(
            resolve_columns(&[cols(["nope"])], &n),
            Err(DataFrameError::UnknownColumn { .. })
        ));
        assert!(resolve_columns(&[col("id").add(1)], &n).is_err());
    }
}
