#[allow(clippy::module_inception)]
mod dataframe;
mod group_by;
mod join;
pub(crate) mod key;
mod reshape;
mod series;
mod sink;
mod sort;

/// Eager `DataFrame` and its verb options.
pub use dataframe::{DataFrame, FillDirection};
pub use group_by::GroupBy;
pub use join::JoinOptions;
pub use reshape::{PivotLongerOptions, PivotWiderOptions};
/// A named column backed by one Arrow array.
pub use series::Series;
/// Serialization hook for writers.
pub use sink::TableSink;
