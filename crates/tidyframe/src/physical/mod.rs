mod expr_eval;
pub(crate) mod kernels;
pub(crate) mod parallel;

/// Eager expression evaluator.
pub use expr_eval::ExprEval;

pub(crate) use expr_eval::with_column;
