use chrono::{NaiveDate, NaiveDateTime};

use crate::expr::Expr;
use crate::types::Scalar;

/// Coercion applied to every verb argument that names or computes a column.
///
/// Strings are column references here; in operator position (`col("a").eq("x")`)
/// strings convert through `From` and become literals instead.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for &Expr {
    fn into_expr(self) -> Expr {
        self.clone()
    }
}

impl IntoExpr for &str {
    fn into_expr(self) -> Expr {
        Expr::Column(self.to_string())
    }
}

impl IntoExpr for String {
    fn into_expr(self) -> Expr {
        Expr::Column(self)
    }
}

impl IntoExpr for &String {
    fn into_expr(self) -> Expr {
        Expr::Column(self.clone())
    }
}

macro_rules! literal_into_expr {
    ($($ty:ty),*) => {
        $(
            impl IntoExpr for $ty {
                fn into_expr(self) -> Expr {
                    Expr::Literal(Scalar::from(self))
                }
            }

            impl From<$ty> for Expr {
                fn from(value: $ty) -> Self {
                    Expr::Literal(Scalar::from(value))
                }
            }
        )*
    };
}

literal_into_expr!(bool, i32, i64, f64, NaiveDate, NaiveDateTime);

impl From<Scalar> for Expr {
    fn from(value: Scalar) -> Self {
        Expr::Literal(value)
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::Literal(Scalar::from(value))
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Expr::Literal(Scalar::from(value))
    }
}

impl From<()> for Expr {
    fn from(_: ()) -> Self {
        Expr::Literal(Scalar::Null)
    }
}

impl From<&Expr> for Expr {
    fn from(value: &Expr) -> Self {
        value.clone()
    }
}

/// Collect verb arguments through [`IntoExpr`].
pub(crate) fn to_exprs<E: IntoExpr>(items: impl IntoIterator<Item = E>) -> Vec<Expr> {
    items.into_iter().map(IntoExpr::into_expr).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_columns_at_verb_boundaries() {
        assert_eq!("x".into_expr(), Expr::Column("x".into()));
        assert_eq!(String::from("y").into_expr(), Expr::Column("y".into()));
        assert_eq!(3_i64.into_expr(), Expr::Literal(Scalar::Int64(3)));
    }

    #[test]
    fn strings_are_literals_in_operator_position() {
        let e: Expr = "x".into();
        assert_eq!(e, Expr::Literal(Scalar::Utf8("x".into())));
        let n: Expr = ().into();
        assert_eq!(n, Expr::Literal(Scalar::Null));
    }
}
