//! Scalar risk and return metrics computed from a price series.
//!
//! Every function takes the risk-free rate (where it needs one) as an explicit
//! argument; defaults come from the injected settings via `AnalyticsEngine`.

use crate::align::inner_join;
use crate::error::AnalyticsError;
use crate::returns::{daily_returns, log_returns, total_return};
use crate::stats;
use crate::validate::require_non_empty;
use crate::{DAYS_PER_YEAR, TRADING_DAYS_PER_YEAR};
use core_types::{PriceSeries, TimeSeries};

/// Compound annual growth rate over the calendar span of the series.
pub fn cagr(prices: &PriceSeries) -> Result<f64, AnalyticsError> {
    let total = total_return(prices)?;
    let (Some((start, _)), Some((end, _))) = (prices.first(), prices.last()) else {
        return Err(AnalyticsError::EmptySeries("prices".to_string()));
    };

    let days = (end - start).num_days();
    if days <= 0 {
        return Ok(0.0);
    }
    let years = days as f64 / DAYS_PER_YEAR;
    let growth = (1.0 + total).powf(1.0 / years) - 1.0;
    if !growth.is_finite() {
        return Err(AnalyticsError::Calculation(format!(
            "CAGR is not finite (total return {total}, {years:.3} years)"
        )));
    }
    Ok(growth)
}

/// Sample standard deviation of daily returns, scaled by `sqrt(252)` when annualized.
pub fn volatility(prices: &PriceSeries, annualize: bool) -> Result<f64, AnalyticsError> {
    let returns = daily_returns(prices)?;
    let vol = stats::sample_std(returns.values());
    Ok(if annualize { vol * TRADING_DAYS_PER_YEAR.sqrt() } else { vol })
}

/// Percentage distance below the running peak, `(p - peak) / peak`, per date.
pub fn drawdown_series(prices: &PriceSeries) -> Result<TimeSeries, AnalyticsError> {
    require_non_empty(prices, "prices")?;
    let drawdowns = prices
        .values()
        .iter()
        .scan(f64::MIN, |peak, &p| {
            *peak = peak.max(p);
            Some((p - *peak) / *peak)
        })
        .collect();
    Ok(TimeSeries::from_index(prices.dates().to_vec(), drawdowns))
}

/// The deepest drawdown, always `<= 0`.
pub fn max_drawdown(prices: &PriceSeries) -> Result<f64, AnalyticsError> {
    let drawdowns = drawdown_series(prices)?;
    Ok(drawdowns.values().iter().copied().fold(0.0, f64::min))
}

pub fn sharpe_ratio(prices: &PriceSeries, risk_free_rate: f64) -> Result<f64, AnalyticsError> {
    let returns = daily_returns(prices)?;
    let values = returns.values();
    let std = stats::sample_std(values);
    if std == 0.0 {
        return Ok(0.0);
    }
    let excess = stats::mean(values) - risk_free_rate / TRADING_DAYS_PER_YEAR;
    Ok(excess / std * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Like Sharpe, but only penalizes downside dispersion.
pub fn sortino_ratio(prices: &PriceSeries, risk_free_rate: f64) -> Result<f64, AnalyticsError> {
    let returns = daily_returns(prices)?;
    let values = returns.values();
    let downside: Vec<f64> = values.iter().copied().filter(|r| *r < 0.0).collect();
    if downside.is_empty() {
        return Ok(0.0);
    }
    let downside_std = stats::sample_std(&downside);
    if downside_std == 0.0 {
        return Ok(0.0);
    }
    let excess = stats::mean(values) - risk_free_rate / TRADING_DAYS_PER_YEAR;
    Ok(excess / downside_std * TRADING_DAYS_PER_YEAR.sqrt())
}

pub fn calmar_ratio(prices: &PriceSeries) -> Result<f64, AnalyticsError> {
    let mdd = max_drawdown(prices)?;
    if mdd == 0.0 {
        return Ok(0.0);
    }
    Ok(cagr(prices)? / mdd.abs())
}

/// Sensitivity of the asset's returns to the benchmark's, over their shared dates.
pub fn beta(prices: &PriceSeries, benchmark: &PriceSeries) -> Result<f64, AnalyticsError> {
    let returns = daily_returns(prices)?;
    let bench_returns = daily_returns(benchmark)?;
    let aligned = inner_join(&returns, &bench_returns);

    let variance = stats::sample_variance(&aligned.right);
    if variance == 0.0 {
        return Ok(0.0);
    }
    Ok(stats::covariance(&aligned.left, &aligned.right) / variance)
}

/// Jensen's alpha on annualized growth rates.
pub fn alpha(
    prices: &PriceSeries,
    benchmark: &PriceSeries,
    risk_free_rate: f64,
) -> Result<f64, AnalyticsError> {
    let asset_growth = cagr(prices)?;
    let bench_growth = cagr(benchmark)?;
    let b = beta(prices, benchmark)?;
    Ok(asset_growth - (risk_free_rate + b * (bench_growth - risk_free_rate)))
}

/// Standard deviation of active (asset minus benchmark) returns.
pub fn tracking_error(
    prices: &PriceSeries,
    benchmark: &PriceSeries,
    annualize: bool,
) -> Result<f64, AnalyticsError> {
    let returns = daily_returns(prices)?;
    let bench_returns = daily_returns(benchmark)?;
    let active = inner_join(&returns, &bench_returns).differences();

    let te = stats::sample_std(&active);
    Ok(if annualize { te * TRADING_DAYS_PER_YEAR.sqrt() } else { te })
}

pub fn information_ratio(prices: &PriceSeries, benchmark: &PriceSeries) -> Result<f64, AnalyticsError> {
    let active_growth = cagr(prices)? - cagr(benchmark)?;
    let te = tracking_error(prices, benchmark, true)?;
    if te == 0.0 {
        return Ok(0.0);
    }
    Ok(active_growth / te)
}

fn check_confidence(confidence: f64) -> Result<(), AnalyticsError> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(AnalyticsError::InvalidParameter(format!(
            "confidence must lie strictly between 0 and 1, got {confidence}"
        )));
    }
    Ok(())
}

/// Historical value at risk: the `(1 - confidence)` quantile of daily returns.
pub fn value_at_risk(prices: &PriceSeries, confidence: f64) -> Result<f64, AnalyticsError> {
    check_confidence(confidence)?;
    let returns = daily_returns(prices)?;
    Ok(stats::quantile_linear(returns.values(), 1.0 - confidence))
}

/// Expected shortfall: the mean of the returns at or below the VaR cut-off.
pub fn conditional_value_at_risk(prices: &PriceSeries, confidence: f64) -> Result<f64, AnalyticsError> {
    let var = value_at_risk(prices, confidence)?;
    let returns = daily_returns(prices)?;
    let tail: Vec<f64> = returns.values().iter().copied().filter(|r| *r <= var).collect();
    Ok(stats::mean(&tail))
}

/// Probability-weighted gains over losses relative to a per-period `threshold`.
pub fn omega_ratio(prices: &PriceSeries, threshold: f64) -> Result<f64, AnalyticsError> {
    let returns = daily_returns(prices)?;
    let (upside, downside) = returns
        .values()
        .iter()
        .map(|r| r - threshold)
        .fold((0.0, 0.0), |(up, down), excess| {
            if excess > 0.0 {
                (up + excess, down)
            } else if excess < 0.0 {
                (up, down - excess)
            } else {
                (up, down)
            }
        });
    if downside == 0.0 {
        return Ok(0.0);
    }
    Ok(upside / downside)
}

/// Fraction of days with a strictly positive return.
pub fn win_rate(prices: &PriceSeries) -> Result<f64, AnalyticsError> {
    let returns = daily_returns(prices)?;
    if returns.is_empty() {
        return Ok(0.0);
    }
    let wins = returns.values().iter().filter(|r| **r > 0.0).count();
    Ok(wins as f64 / returns.len() as f64)
}

/// Hurst exponent estimate: below 0.5 mean-reverting, above 0.5 trending.
///
/// Falls back to 0.5 (a random walk) whenever there is not enough data or the
/// log-log fit cannot be made, so this never fails.
pub fn hurst_exponent(prices: &PriceSeries, max_lag: usize) -> f64 {
    const RANDOM_WALK: f64 = 0.5;

    if prices.len() < max_lag.saturating_mul(2) {
        return RANDOM_WALK;
    }
    let Ok(returns) = log_returns(prices) else {
        return RANDOM_WALK;
    };
    let lr = returns.values();

    let mut log_lags = Vec::new();
    let mut log_tau = Vec::new();
    for lag in 2..max_lag {
        if lag >= lr.len() {
            break;
        }
        let diffs: Vec<f64> = lr[lag..].iter().zip(lr).map(|(a, b)| a - b).collect();
        let tau = stats::population_std(&diffs);
        log_lags.push((lag as f64).ln());
        log_tau.push(tau.ln());
    }

    if log_tau.iter().any(|t| !t.is_finite()) {
        tracing::debug!(max_lag, "Hurst fit has a degenerate lag, using random-walk fallback");
        return RANDOM_WALK;
    }
    match stats::ols_slope(&log_lags, &log_tau) {
        Some(slope) => slope * 2.0,
        None => RANDOM_WALK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{Days, NaiveDate};

    fn prices(values: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let dates = (0..values.len()).map(|i| start + Days::new(i as u64)).collect();
        PriceSeries::new(dates, values.to_vec()).unwrap()
    }

    #[test]
    fn drawdown_tracks_running_peak() {
        let p = prices(&[100.0, 120.0, 90.0, 130.0, 117.0]);
        let dd = drawdown_series(&p).unwrap();
        assert_eq!(dd.values()[0], 0.0);
        assert_abs_diff_eq!(dd.values()[2], -0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(dd.values()[4], -0.10, epsilon = 1e-12);
        assert_abs_diff_eq!(max_drawdown(&p).unwrap(), -0.25, epsilon = 1e-12);
    }

    #[test]
    fn cagr_of_single_day_span_is_zero() {
        assert_eq!(cagr(&prices(&[10.0])).unwrap(), 0.0);
    }

    #[test]
    fn cagr_over_one_calendar_year() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = start + Days::new(365);
        let p = PriceSeries::new(vec![start, end], vec![100.0, 110.0]).unwrap();
        let expected = 1.1_f64.powf(365.25 / 365.0) - 1.0;
        assert_abs_diff_eq!(cagr(&p).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn sortino_without_losses_is_zero() {
        let p = prices(&[100.0, 101.0, 103.0, 104.0]);
        assert_eq!(sortino_ratio(&p, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn var_rejects_confidence_outside_unit_interval() {
        let p = prices(&[100.0, 101.0, 99.0]);
        for confidence in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                value_at_risk(&p, confidence),
                Err(AnalyticsError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn cvar_is_never_above_var() {
        let p = prices(&[100.0, 97.0, 99.0, 104.0, 101.0, 95.0, 98.0, 102.0]);
        let var = value_at_risk(&p, 0.95).unwrap();
        let cvar = conditional_value_at_risk(&p, 0.95).unwrap();
        assert!(cvar <= var);
    }

    #[test]
    fn omega_and_win_rate_count_signs() {
        let p = prices(&[100.0, 110.0, 99.0, 99.0, 108.9]);
        // returns: +0.10, -0.10, 0.0, +0.10
        assert_abs_diff_eq!(win_rate(&p).unwrap(), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(omega_ratio(&p, 0.0).unwrap(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn hurst_falls_back_on_short_series() {
        let p = prices(&[100.0, 101.0, 102.0]);
        assert_eq!(hurst_exponent(&p, 20), 0.5);
    }

    #[test]
    fn hurst_falls_back_on_constant_growth() {
        let values: Vec<f64> = (0..60).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        assert_eq!(hurst_exponent(&prices(&values), 20), 0.5);
    }

    /// Alternating +/-1% moves with a small deterministic wobble.
    fn alternating(n: usize) -> Vec<f64> {
        let mut state: u64 = 7;
        let mut price = 100.0;
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let noise = ((state >> 33) as f64 / (1u64 << 31) as f64 - 0.5) * 0.002;
            let step = if i % 2 == 0 { 0.01 } else { -0.01 };
            price *= 1.0 + step + noise;
            out.push(price);
        }
        out
    }

    #[test]
    fn hurst_matches_log_log_fit_of_lagged_differences() {
        let values = alternating(2000);
        let max_lag = 20;

        let lr: Vec<f64> = values.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for lag in 2..max_lag {
            let diffs: Vec<f64> = (0..lr.len() - lag).map(|k| lr[k + lag] - lr[k]).collect();
            let m = diffs.iter().sum::<f64>() / diffs.len() as f64;
            let var = diffs.iter().map(|d| (d - m).powi(2)).sum::<f64>() / diffs.len() as f64;
            xs.push((lag as f64).ln());
            ys.push(var.sqrt().ln());
        }
        let mx = xs.iter().sum::<f64>() / xs.len() as f64;
        let my = ys.iter().sum::<f64>() / ys.len() as f64;
        let sxy: f64 = xs.iter().zip(&ys).map(|(x, y)| (x - mx) * (y - my)).sum();
        let sxx: f64 = xs.iter().map(|x| (x - mx).powi(2)).sum();
        let expected = 2.0 * sxy / sxx;

        let h = hurst_exponent(&prices(&values), max_lag);
        assert_abs_diff_eq!(h, expected, epsilon = 1e-9);
        assert!((h - 0.5).abs() > 1e-6);
    }

    #[test]
    fn hurst_falls_back_with_a_single_lag() {
        assert_eq!(hurst_exponent(&prices(&alternating(200)), 3), 0.5);
    }

    #[test]
    fn hurst_falls_back_on_huge_max_lag() {
        assert_eq!(hurst_exponent(&prices(&alternating(200)), usize::MAX), 0.5);
    }
}
