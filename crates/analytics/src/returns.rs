use crate::error::AnalyticsError;
use crate::validate::{require_non_empty, validate_prices};
use core_types::{PriceSeries, ReturnSeries, TimeSeries};

/// Simple period-over-period returns of a plain slice.
pub fn simple_returns(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Simple returns indexed by the later date of each pair.
pub fn daily_returns(prices: &PriceSeries) -> Result<ReturnSeries, AnalyticsError> {
    validate_prices(prices, "prices")?;
    Ok(TimeSeries::from_index(
        prices.dates()[1..].to_vec(),
        simple_returns(prices.values()),
    ))
}

/// Running compounded return, `prod(1 + r) - 1`, one entry per daily return.
pub fn cumulative_returns(prices: &PriceSeries) -> Result<ReturnSeries, AnalyticsError> {
    let returns = daily_returns(prices)?;
    let compounded = returns
        .values()
        .iter()
        .scan(1.0, |growth, r| {
            *growth *= 1.0 + r;
            Some(*growth - 1.0)
        })
        .collect();
    Ok(TimeSeries::from_index(returns.dates().to_vec(), compounded))
}

/// `last / first - 1`. A single observation has a total return of zero.
pub fn total_return(prices: &PriceSeries) -> Result<f64, AnalyticsError> {
    require_non_empty(prices, "prices")?;
    match (prices.first(), prices.last()) {
        (Some((_, first)), Some((_, last))) => Ok(last / first - 1.0),
        _ => Err(AnalyticsError::EmptySeries("prices".to_string())),
    }
}

/// Natural-log returns, `ln(p[i] / p[i - 1])`.
pub fn log_returns(prices: &PriceSeries) -> Result<ReturnSeries, AnalyticsError> {
    validate_prices(prices, "prices")?;
    let values = prices.values().windows(2).map(|w| (w[1] / w[0]).ln()).collect();
    Ok(TimeSeries::from_index(prices.dates()[1..].to_vec(), values))
}
