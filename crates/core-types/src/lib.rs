//! # Flux Core Types
//!
//! Value types shared by every crate in the workspace: price and return series,
//! OHLCV bars, the aligned multi-asset price matrix, and the small enums used to
//! describe optimizer objectives and market regimes.
//!
//! Everything here is an immutable value object. Constructors validate the
//! invariants (strictly increasing dates, positive prices, no interior gaps) so
//! downstream crates can rely on them.

pub mod bar;
pub mod enums;
pub mod error;
pub mod matrix;
pub mod series;

// Re-export the core types to provide a clean public API.
pub use bar::Bar;
pub use enums::{Objective, Trend, VolatilityRegime};
pub use error::CoreError;
pub use matrix::PriceMatrix;
pub use series::{PriceSeries, ReturnSeries, RollingSeries, TimeSeries};
