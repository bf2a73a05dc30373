use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Input series '{0}' is empty")]
    EmptySeries(String),

    #[error("Input series '{name}' must have at least 2 data points, got {len}")]
    TooShort { name: String, len: usize },

    #[error("Rolling window must be at least 1, got {0}")]
    InvalidWindow(usize),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("At least 2 assets are required, got {0}")]
    TooFewAssets(usize),

    #[error("Error in calculation: {0}")]
    Calculation(String),

    #[error("Invalid input data: {0}")]
    Core(#[from] CoreError),
}
