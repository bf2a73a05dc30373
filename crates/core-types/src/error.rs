use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Dates must be strictly increasing: {previous} is followed by {next}")]
    NonIncreasingDates { previous: NaiveDate, next: NaiveDate },

    #[error("Price on {date} must be positive and finite, got {value}")]
    InvalidPrice { date: NaiveDate, value: f64 },

    #[error("Series has a missing value inside its range on {0}")]
    InteriorGap(NaiveDate),

    #[error("Asset '{0}' appears more than once")]
    DuplicateAsset(String),

    #[error("Aligned price matrix has no common dates")]
    EmptyAlignment,
}
