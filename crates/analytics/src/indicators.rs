//! Technical indicators over prices and OHLCV bars.

use crate::error::AnalyticsError;
use crate::rolling::{rolling_mean, rolling_std};
use crate::validate::{require_non_empty, validate_window};
use core_types::{Bar, PriceSeries, TimeSeries};
use serde::Serialize;
use ta::Next as _;
use ta::indicators::ExponentialMovingAverage as Ema;

/// Relative Strength Index from rolling mean gains and losses, in `[0, 100]`.
pub fn rsi(prices: &PriceSeries, window: usize) -> Result<TimeSeries, AnalyticsError> {
    require_non_empty(prices, "prices (rsi)")?;
    validate_window(window)?;

    let values = prices.values();
    let deltas: Vec<f64> = std::iter::once(0.0)
        .chain(values.windows(2).map(|w| w[1] - w[0]))
        .collect();
    let gains: Vec<f64> = deltas.iter().map(|d| d.max(0.0)).collect();
    let losses: Vec<f64> = deltas.iter().map(|d| (-d).max(0.0)).collect();

    let rsi = rolling_mean(&gains, window)
        .into_iter()
        .zip(rolling_mean(&losses, window))
        .map(|(gain, loss)| 100.0 - 100.0 / (1.0 + gain / loss))
        .collect();
    Ok(TimeSeries::from_index(prices.dates().to_vec(), rsi))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Macd {
    pub macd: TimeSeries,
    pub signal: TimeSeries,
    pub histogram: TimeSeries,
}

fn ema(values: &[f64], span: usize) -> Result<Vec<f64>, AnalyticsError> {
    validate_window(span)?;
    let mut ema = Ema::new(span)
        .map_err(|e| AnalyticsError::InvalidParameter(format!("Failed to initialize EMA({span}): {e:?}")))?;
    Ok(values.iter().map(|v| ema.next(*v)).collect())
}

/// Moving Average Convergence Divergence with EMAs seeded by the first value.
pub fn macd(
    prices: &PriceSeries,
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<Macd, AnalyticsError> {
    require_non_empty(prices, "prices (macd)")?;
    let values = prices.values();
    let fast_ema = ema(values, fast)?;
    let slow_ema = ema(values, slow)?;

    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = ema(&line, signal)?;
    let histogram = line.iter().zip(&signal_line).map(|(m, s)| m - s).collect();

    let dates = prices.dates().to_vec();
    Ok(Macd {
        macd: TimeSeries::from_index(dates.clone(), line),
        signal: TimeSeries::from_index(dates.clone(), signal_line),
        histogram: TimeSeries::from_index(dates, histogram),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BollingerBands {
    pub middle: TimeSeries,
    pub upper: TimeSeries,
    pub lower: TimeSeries,
}

pub fn bollinger_bands(
    prices: &PriceSeries,
    window: usize,
    num_std: f64,
) -> Result<BollingerBands, AnalyticsError> {
    require_non_empty(prices, "prices (bollinger)")?;
    validate_window(window)?;
    if !num_std.is_finite() {
        return Err(AnalyticsError::InvalidParameter(format!(
            "band width must be finite, got {num_std}"
        )));
    }

    let middle = rolling_mean(prices.values(), window);
    let std = rolling_std(prices.values(), window);
    let upper = middle.iter().zip(&std).map(|(m, s)| m + s * num_std).collect();
    let lower = middle.iter().zip(&std).map(|(m, s)| m - s * num_std).collect();

    let dates = prices.dates().to_vec();
    Ok(BollingerBands {
        middle: TimeSeries::from_index(dates.clone(), middle),
        upper: TimeSeries::from_index(dates.clone(), upper),
        lower: TimeSeries::from_index(dates, lower),
    })
}

fn bar_dates(bars: &[Bar], name: &str) -> Result<Vec<chrono::NaiveDate>, AnalyticsError> {
    if bars.is_empty() {
        return Err(AnalyticsError::EmptySeries(name.to_string()));
    }
    let dates: Vec<_> = bars.iter().map(|b| b.date).collect();
    // Reuse the index checks of `TimeSeries`.
    TimeSeries::new(dates.clone(), vec![0.0; dates.len()])?;
    Ok(dates)
}

/// Average True Range: the rolling mean of the true range.
///
/// The first bar has no previous close, so its true range is `high - low`.
pub fn atr(bars: &[Bar], window: usize) -> Result<TimeSeries, AnalyticsError> {
    let dates = bar_dates(bars, "bars (atr)")?;
    validate_window(window)?;

    let true_range: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let range = bar.high - bar.low;
            match i.checked_sub(1).map(|j| bars[j].close) {
                Some(prev_close) => range
                    .max((bar.high - prev_close).abs())
                    .max((bar.low - prev_close).abs()),
                None => range,
            }
        })
        .collect();
    Ok(TimeSeries::from_index(dates, rolling_mean(&true_range, window)))
}

/// On-Balance Volume: running sum of volume signed by the close-to-close move.
pub fn obv(bars: &[Bar]) -> Result<TimeSeries, AnalyticsError> {
    let dates = bar_dates(bars, "bars (obv)")?;
    let obv = bars
        .iter()
        .enumerate()
        .scan(0.0, |total, (i, bar)| {
            if i > 0 {
                let delta = bar.close - bars[i - 1].close;
                if delta > 0.0 {
                    *total += bar.volume;
                } else if delta < 0.0 {
                    *total -= bar.volume;
                }
            }
            Some(*total)
        })
        .collect();
    Ok(TimeSeries::from_index(dates, obv))
}
