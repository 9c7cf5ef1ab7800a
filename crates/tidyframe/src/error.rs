/// Errors returned by `tidyframe` operations.
///
/// Only structural problems are reported here. Data issues (nulls, failed
/// per-row parses, unmatched join rows) surface as null values instead.
#[derive(Debug, thiserror::Error)]
pub enum DataFrameError {
    /// Referenced column does not exist at evaluation time.
    #[error("unknown column: {name}")]
    UnknownColumn { name: String },

    /// Operation applied to dtypes with no defined promotion.
    #[error(
        "type mismatch{column}: expected {expected}, got {actual}",
        column = column_display(.column)
    )]
    TypeMismatch {
        column: Option<String>,
        expected: String,
        actual: String,
    },

    /// Length invariant violated (e.g. `bind_cols` with unequal heights).
    #[error("shape mismatch: {message}")]
    ShapeMismatch { message: String },

    /// Caller-supplied argument is invalid for the operation.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Join or pivot key column is absent from an input.
    #[error("key not found: {name}")]
    KeyNotFound { name: String },

    /// Column name appears more than once in a table.
    #[error("duplicate column name '{name}'")]
    DuplicateColumn { name: String },

    /// Invalid configuration option was provided.
    #[error("invalid configuration option '{option}': {message}")]
    Configuration { option: String, message: String },

    /// Error originating from Arrow compute / record batch APIs.
    #[error("arrow error: {source}")]
    Arrow { source: arrow::error::ArrowError },
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, DataFrameError>;

impl DataFrameError {
    /// Create a missing column error.
    pub fn unknown_column(name: impl Into<String>) -> Self {
        Self::UnknownColumn { name: name.into() }
    }

    /// Create a type mismatch error with optional column context.
    pub fn type_mismatch(
        column: impl Into<Option<String>>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            column: column.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a shape mismatch error with a message.
    pub fn shape_mismatch(message: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            message: message.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a missing join/pivot key error.
    pub fn key_not_found(name: impl Into<String>) -> Self {
        Self::KeyNotFound { name: name.into() }
    }

    /// Create a duplicate column name error.
    pub fn duplicate_column(name: impl Into<String>) -> Self {
        Self::DuplicateColumn { name: name.into() }
    }

    /// Create an invalid configuration error.
    pub fn configuration(option: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            option: option.into(),
            message: message.into(),
        }
    }
}

impl From<arrow::error::ArrowError> for DataFrameError {
    fn from(source: arrow::error::ArrowError) -> Self {
        Self::Arrow { source }
    }
}

fn column_display(column: &Option<String>) -> String {
    column
        .as_ref()
        .map(|c| format!(" for column '{c}'"))
        .unwrap_or_default()
}
