//! Windowed statistics over prices and returns.
//!
//! Each output is aligned with its input index. Entries whose window is not yet
//! complete, or where the statistic is undefined, hold `NaN`.

use crate::align::inner_join;
use crate::error::AnalyticsError;
use crate::metrics::drawdown_series;
use crate::returns::daily_returns;
use crate::stats;
use crate::validate::{validate_prices, validate_window};
use crate::TRADING_DAYS_PER_YEAR;
use chrono::NaiveDate;
use core_types::{PriceSeries, RollingSeries, TimeSeries};
use serde::Serialize;

/// Applies `f` to each trailing window `values[i + 1 - window ..= i]`.
pub(crate) fn rolling_apply<F>(values: &[f64], window: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                f64::NAN
            } else {
                f(&values[i + 1 - window..=i])
            }
        })
        .collect()
}

pub(crate) fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, stats::mean)
}

pub(crate) fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, stats::sample_std)
}

pub fn rolling_volatility(
    prices: &PriceSeries,
    window: usize,
    annualize: bool,
) -> Result<RollingSeries, AnalyticsError> {
    validate_window(window)?;
    let returns = daily_returns(prices)?;
    let scale = if annualize { TRADING_DAYS_PER_YEAR.sqrt() } else { 1.0 };
    let vol = rolling_std(returns.values(), window)
        .into_iter()
        .map(|v| v * scale)
        .collect();
    Ok(TimeSeries::from_index(returns.dates().to_vec(), vol))
}

/// Rolling annualized Sharpe ratio. A window with zero dispersion is undefined.
pub fn rolling_sharpe(
    prices: &PriceSeries,
    window: usize,
    risk_free_rate: f64,
) -> Result<RollingSeries, AnalyticsError> {
    validate_window(window)?;
    let returns = daily_returns(prices)?;
    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;

    let sharpe = rolling_apply(returns.values(), window, |w| {
        let std = stats::sample_std(w);
        if std == 0.0 {
            return f64::NAN;
        }
        (stats::mean(w) - daily_rf) / std * TRADING_DAYS_PER_YEAR.sqrt()
    });
    Ok(TimeSeries::from_index(returns.dates().to_vec(), sharpe))
}

/// Rolling beta over the shared return dates.
///
/// Entry `i` is the beta of the `window` observations strictly before `i`, so
/// the first `window` entries are undefined.
pub fn rolling_beta(
    prices: &PriceSeries,
    benchmark: &PriceSeries,
    window: usize,
) -> Result<RollingSeries, AnalyticsError> {
    validate_window(window)?;
    let returns = daily_returns(prices)?;
    let bench_returns = daily_returns(benchmark)?;
    let aligned = inner_join(&returns, &bench_returns);

    let betas = (0..aligned.len())
        .map(|i| {
            if i < window {
                return f64::NAN;
            }
            let asset = &aligned.left[i - window..i];
            let bench = &aligned.right[i - window..i];
            let variance = stats::sample_variance(bench);
            if variance == 0.0 {
                f64::NAN
            } else {
                stats::covariance(asset, bench) / variance
            }
        })
        .collect();
    Ok(TimeSeries::from_index(aligned.dates, betas))
}

/// How many rolling standard deviations each price sits from its rolling mean.
pub fn z_score(prices: &PriceSeries, window: usize) -> Result<RollingSeries, AnalyticsError> {
    validate_prices(prices, "prices (z-score)")?;
    validate_window(window)?;
    let values = prices.values();
    let means = rolling_mean(values, window);
    let stds = rolling_std(values, window);

    let scores = values
        .iter()
        .zip(means.iter().zip(&stds))
        .map(|(p, (m, s))| if *s == 0.0 { f64::NAN } else { (p - m) / s })
        .collect();
    Ok(TimeSeries::from_index(prices.dates().to_vec(), scores))
}

/// Window lengths for `compute_rolling_metrics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingWindows {
    pub volatility: usize,
    pub sharpe: usize,
}

impl Default for RollingWindows {
    fn default() -> Self {
        Self {
            volatility: 21,
            sharpe: 63,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingMetricsRow {
    pub date: NaiveDate,
    pub price: f64,
    pub rolling_vol: f64,
    pub rolling_sharpe: f64,
    pub drawdown: f64,
}

/// Per-date rolling statistics keyed by the price index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RollingMetrics {
    rows: Vec<RollingMetricsRow>,
}

impl RollingMetrics {
    pub fn rows(&self) -> &[RollingMetricsRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Price, rolling volatility, rolling Sharpe and drawdown on every price date.
///
/// The return-based columns are undefined on the first date, which has no return.
pub fn compute_rolling_metrics(
    prices: &PriceSeries,
    windows: RollingWindows,
    risk_free_rate: f64,
) -> Result<RollingMetrics, AnalyticsError> {
    let vol = rolling_volatility(prices, windows.volatility, true)?;
    let sharpe = rolling_sharpe(prices, windows.sharpe, risk_free_rate)?;
    let drawdown = drawdown_series(prices)?;

    let rows = prices
        .iter()
        .zip(drawdown.values())
        .enumerate()
        .map(|(i, ((date, price), dd))| {
            // Return series start one date later than prices.
            let shifted = |s: &TimeSeries| i.checked_sub(1).map_or(f64::NAN, |j| s.values()[j]);
            RollingMetricsRow {
                date,
                price,
                rolling_vol: shifted(&vol),
                rolling_sharpe: shifted(&sharpe),
                drawdown: *dd,
            }
        })
        .collect();

    Ok(RollingMetrics { rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::Days;

    fn prices(values: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..values.len()).map(|i| start + Days::new(i as u64)).collect();
        PriceSeries::new(dates, values.to_vec()).unwrap()
    }

    #[test]
    fn zero_window_is_rejected() {
        let p = prices(&[1.0, 2.0, 3.0]);
        assert_eq!(
            rolling_volatility(&p, 0, true),
            Err(AnalyticsError::InvalidWindow(0))
        );
        assert_eq!(z_score(&p, 0), Err(AnalyticsError::InvalidWindow(0)));
    }

    #[test]
    fn warm_up_entries_are_undefined() {
        let p = prices(&[100.0, 101.0, 99.0, 102.0, 104.0, 103.0]);
        let vol = rolling_volatility(&p, 3, false).unwrap();
        assert_eq!(vol.len(), 5);
        assert!(vol.values()[..2].iter().all(|v| v.is_nan()));
        assert!(vol.values()[2..].iter().all(|v| v.is_finite()));
    }

    #[test]
    fn window_larger_than_series_is_all_undefined() {
        let p = prices(&[100.0, 101.0, 99.0]);
        let vol = rolling_volatility(&p, 10, true).unwrap();
        assert!(vol.values().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rolling_sharpe_is_undefined_for_flat_window() {
        let values: Vec<f64> = (0..10).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let sharpe = rolling_sharpe(&prices(&values), 3, 0.0).unwrap();
        assert!(sharpe.values().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rolling_beta_of_series_against_itself_is_one() {
        let p = prices(&[100.0, 102.0, 101.0, 104.0, 103.0, 107.0, 106.0]);
        let betas = rolling_beta(&p, &p, 3).unwrap();
        assert!(betas.values()[..3].iter().all(|v| v.is_nan()));
        for b in &betas.values()[3..] {
            assert_abs_diff_eq!(*b, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn z_score_of_linear_prices() {
        let p = prices(&[1.0, 2.0, 3.0, 4.0]);
        let z = z_score(&p, 3).unwrap();
        assert!(z.values()[1].is_nan());
        assert_abs_diff_eq!(z.values()[2], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(z.values()[3], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn rolling_frame_covers_every_price_date() {
        let p = prices(&[100.0, 101.0, 99.0, 102.0, 104.0]);
        let frame = compute_rolling_metrics(
            &p,
            RollingWindows { volatility: 2, sharpe: 2 },
            0.0,
        )
        .unwrap();
        assert_eq!(frame.len(), p.len());
        assert!(frame.rows()[0].rolling_vol.is_nan());
        assert!(frame.rows()[1].rolling_vol.is_nan());
        assert!(frame.rows()[2].rolling_vol.is_finite());
        assert_abs_diff_eq!(frame.rows()[2].drawdown, -0.0198019801980198, epsilon = 1e-12);
    }
}
