use crate::error::AnalyticsError;
use core_types::PriceSeries;

/// Guards every return-based entry point: the series must hold at least two prices.
pub fn validate_prices(prices: &PriceSeries, name: &str) -> Result<(), AnalyticsError> {
    if prices.is_empty() {
        tracing::error!("Cannot compute metrics on empty series: {name}");
        return Err(AnalyticsError::EmptySeries(name.to_string()));
    }
    if prices.len() < 2 {
        tracing::error!("Not enough data points in {name} to compute returns.");
        return Err(AnalyticsError::TooShort {
            name: name.to_string(),
            len: prices.len(),
        });
    }
    Ok(())
}

pub(crate) fn validate_window(window: usize) -> Result<(), AnalyticsError> {
    if window == 0 {
        return Err(AnalyticsError::InvalidWindow(window));
    }
    Ok(())
}

pub(crate) fn require_non_empty(prices: &PriceSeries, name: &str) -> Result<(), AnalyticsError> {
    if prices.is_empty() {
        return Err(AnalyticsError::EmptySeries(name.to_string()));
    }
    Ok(())
}
