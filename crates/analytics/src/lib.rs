//! # Flux Analytics
//!
//! Quantitative analytics over daily price series: return transforms, scalar
//! risk/return metrics, rolling statistics, market regime detection, calendar
//! resampling, cross-asset correlation and technical indicators.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** This crate performs no I/O. It depends only on `core-types` for
//!   its value types and on `configuration` for the defaults the engine injects.
//! - **Explicit Parameters:** Every metric takes its risk-free rate as an argument.
//!   `AnalyticsEngine` supplies the configured rate when the caller has none.
//! - **Undefined is NaN:** Incomplete rolling windows and zero-variance statistics
//!   are `NaN` rather than errors, so frames stay aligned with their inputs.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: Builds `MetricReport`s and rolling/regime frames.
//! - `MetricReport`, `MetricKind`, `format_metrics`: The aggregated metric set and its display rules.
//! - Free functions in `returns`, `metrics`, `rolling`, `calendar`, `regime`,
//!   `correlation` and `indicators` for individual computations.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod align;
pub mod calendar;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod metrics;
pub mod regime;
pub mod report;
pub mod returns;
pub mod rolling;
pub mod stats;
pub mod validate;

/// Trading days used to annualize daily statistics.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Calendar days per year used by CAGR.
pub const DAYS_PER_YEAR: f64 = 365.25;

// Re-export the key components to create a clean, public-facing API.
pub use calendar::{monthly_returns, yearly_returns, MonthlyReturns};
pub use correlation::{correlation_matrix, CorrelationMatrix};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use regime::{detect_regime, RegimeFrame, RegimeRow};
pub use report::{format_metrics, FormatRule, MetricKind, MetricReport};
pub use returns::{cumulative_returns, daily_returns, log_returns, total_return};
pub use rolling::{
    compute_rolling_metrics, rolling_beta, rolling_sharpe, rolling_volatility, z_score,
    RollingMetrics, RollingMetricsRow, RollingWindows,
};
pub use validate::validate_prices;
