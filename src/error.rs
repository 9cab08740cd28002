use thiserror::Error;

/// Errors surfaced by the fluent builder. The optimizer itself never fails:
/// these all originate at the point a leaf is constructed, before the tree
/// ever reaches `optimize`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("{0:?} is not a valid regular expression")]
    InvalidPattern(String),
    #[error("{value:?} does not match the date format {format:?}")]
    InvalidDateFormat { format: String, value: String },
    #[error("in_list requires at least one value")]
    EmptyInList,
}
