use analytics::AnalyticsError;
use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizerError {
    #[error("Portfolio optimization needs at least 2 assets, got {0}")]
    TooFewAssets(usize),

    #[error("Not enough history to estimate returns: {0} return observation(s), at least 2 required")]
    InsufficientData(usize),

    #[error("Solver failed: {0}")]
    Solver(String),

    #[error("Solver did not converge within {iterations} iterations")]
    NotConverged { iterations: u64 },

    #[error("Solver produced a non-finite optimum")]
    NonFinite,

    #[error("Optimal weights violate the constraints: {0}")]
    Infeasible(String),

    #[error("Problem is degenerate: {0}")]
    Degenerate(String),

    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("Invalid input data: {0}")]
    Core(#[from] CoreError),
}
