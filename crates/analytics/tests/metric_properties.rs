use analytics::{
    cumulative_returns, format_metrics, metrics, rolling_volatility, total_return, AnalyticsEngine,
    AnalyticsError, MetricKind,
};
use approx::assert_abs_diff_eq;
use chrono::{Days, NaiveDate};
use configuration::AnalyticsSettings;
use core_types::PriceSeries;

fn series(values: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let dates = (0..values.len()).map(|i| start + Days::new(i as u64)).collect();
    PriceSeries::new(dates, values.to_vec()).unwrap()
}

/// Five consecutive +1% days starting at 100.
fn compounding() -> PriceSeries {
    series(&[100.0, 101.0, 102.01, 103.0301, 104.060401, 105.10100501])
}

/// A deterministic, noisy walk.
fn walk(n: usize, seed: u64) -> PriceSeries {
    let mut state = seed;
    let mut price = 100.0;
    let values: Vec<f64> = (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let shock = ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5;
            price *= 1.0 + 0.02 * shock;
            price
        })
        .collect();
    series(&values)
}

#[test]
fn constant_return_series_has_zero_dispersion() {
    let prices = compounding();
    assert_eq!(metrics::volatility(&prices, true).unwrap(), 0.0);
    assert_eq!(metrics::sharpe_ratio(&prices, 0.0).unwrap(), 0.0);
    assert_eq!(metrics::win_rate(&prices).unwrap(), 1.0);
    assert_abs_diff_eq!(metrics::value_at_risk(&prices, 0.95).unwrap(), 0.01, epsilon = 1e-12);
    assert!(metrics::cagr(&prices).unwrap() > 1.0);
}

#[test]
fn cumulative_return_ends_at_total_return() {
    let prices = walk(120, 7);
    let cumulative = cumulative_returns(&prices).unwrap();
    let (_, last) = cumulative.last().unwrap();
    assert_abs_diff_eq!(last, total_return(&prices).unwrap(), epsilon = 1e-9);
}

#[test]
fn max_drawdown_is_zero_only_for_non_decreasing_prices() {
    assert_eq!(metrics::max_drawdown(&compounding()).unwrap(), 0.0);
    assert!(metrics::max_drawdown(&walk(120, 11)).unwrap() < 0.0);
}

#[test]
fn halving_then_recovery_to_a_net_gain() {
    // 100, halved the next day, flat, then 110 on day 402.
    let mut values = vec![100.0];
    values.extend(std::iter::repeat_n(50.0, 401));
    values.push(110.0);
    let prices = series(&values);

    let mdd = metrics::max_drawdown(&prices).unwrap();
    assert_abs_diff_eq!(mdd, -0.5, epsilon = 1e-12);

    let cagr = metrics::cagr(&prices).unwrap();
    assert_abs_diff_eq!(cagr, 1.1_f64.powf(365.25 / 402.0) - 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(cagr, 0.0904572, epsilon = 1e-7);

    let calmar = metrics::calmar_ratio(&prices).unwrap();
    assert_abs_diff_eq!(calmar, cagr / 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(calmar, 0.1809145, epsilon = 1e-7);
}

#[test]
fn asset_against_itself() {
    let prices = walk(90, 3);
    assert_abs_diff_eq!(metrics::beta(&prices, &prices).unwrap(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(metrics::alpha(&prices, &prices, 0.04).unwrap(), 0.0, epsilon = 1e-12);
    assert_eq!(metrics::tracking_error(&prices, &prices, true).unwrap(), 0.0);
    assert_eq!(metrics::information_ratio(&prices, &prices).unwrap(), 0.0);
}

#[test]
fn beta_uses_only_shared_dates() {
    let asset = walk(60, 5);
    let bench_dates: Vec<NaiveDate> = asset.dates().iter().step_by(2).copied().collect();
    let bench_values: Vec<f64> = asset.values().iter().step_by(2).copied().collect();
    let benchmark = PriceSeries::new(bench_dates, bench_values).unwrap();
    assert!(metrics::beta(&asset, &benchmark).unwrap().is_finite());
}

#[test]
fn rolling_entries_depend_only_on_trailing_window() {
    let prices = walk(80, 13);
    let window = 10;
    let full = rolling_volatility(&prices, window, true).unwrap();
    assert_eq!(full.len(), prices.len() - 1);
    assert!(full.values()[..window - 1].iter().all(|v| v.is_nan()));

    let cut = 40;
    let head = PriceSeries::new(
        prices.dates()[..cut].to_vec(),
        prices.values()[..cut].to_vec(),
    )
    .unwrap();
    let partial = rolling_volatility(&head, window, true).unwrap();
    for (a, b) in partial.values().iter().zip(full.values()).skip(window - 1) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-15);
    }
}

#[test]
fn engine_reports_benchmark_metrics_only_with_a_benchmark() {
    let engine = AnalyticsEngine::new(AnalyticsSettings::default());
    let prices = walk(260, 17);
    let benchmark = walk(260, 19);

    let base = engine.compute_metrics(&prices, None, None).unwrap();
    assert_eq!(base.len(), MetricKind::BASE.len());
    assert!(MetricKind::BENCHMARK.iter().all(|k| !base.contains(*k)));

    let relative = engine.compute_metrics(&prices, Some(&benchmark), Some(0.0)).unwrap();
    assert_eq!(relative.len(), MetricKind::BASE.len() + MetricKind::BENCHMARK.len());

    let formatted = format_metrics(&relative);
    assert!(formatted[&MetricKind::Volatility].ends_with('%'));
    assert!(!formatted[&MetricKind::Beta].ends_with('%'));
}

#[test]
fn engine_uses_configured_risk_free_rate() {
    let prices = walk(120, 23);
    let settings = AnalyticsSettings {
        risk_free_rate: 0.10,
        ..AnalyticsSettings::default()
    };
    let engine = AnalyticsEngine::new(settings);
    let report = engine.compute_metrics(&prices, None, None).unwrap();
    assert_abs_diff_eq!(
        report.get(MetricKind::SharpeRatio).unwrap(),
        metrics::sharpe_ratio(&prices, 0.10).unwrap(),
        epsilon = 1e-12
    );
}

#[test]
fn engine_rejects_short_input() {
    let engine = AnalyticsEngine::default();
    let err = engine.compute_metrics(&series(&[100.0]), None, None).unwrap_err();
    assert!(matches!(err, AnalyticsError::TooShort { len: 1, .. }));
}

#[test]
fn engine_frames_follow_settings() {
    let engine = AnalyticsEngine::default();
    let prices = walk(100, 29);
    let rolling = engine.compute_rolling_metrics(&prices).unwrap();
    assert_eq!(rolling.len(), prices.len());
    // vol window 21 on returns -> first defined on price row 21
    assert!(rolling.rows()[20].rolling_vol.is_nan());
    assert!(rolling.rows()[21].rolling_vol.is_finite());

    let regime = engine.detect_regime(&prices).unwrap();
    assert_eq!(regime.len(), prices.len());
    assert!(regime.rows()[48].trend.is_none());
    assert!(regime.rows()[49].trend.is_some());
}
