use crate::error::AnalyticsError;
use crate::metrics;
use crate::regime::{detect_regime, RegimeFrame};
use crate::report::{MetricKind, MetricReport};
use crate::returns::total_return;
use crate::rolling::{self, RollingMetrics, RollingWindows};
use crate::validate::validate_prices;
use configuration::AnalyticsSettings;
use core_types::{PriceSeries, RollingSeries};
use std::collections::BTreeMap;

/// Confidence level used for the VaR/CVaR entries of a `MetricReport`.
pub const REPORT_CONFIDENCE: f64 = 0.95;

/// Per-period return threshold for the Omega entry of a `MetricReport`.
pub const REPORT_OMEGA_THRESHOLD: f64 = 0.0;

/// Computes metric reports and rolling frames with defaults taken from settings.
///
/// The engine holds no mutable state, so one instance can be shared by reference
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    settings: AnalyticsSettings,
}

impl AnalyticsEngine {
    pub fn new(settings: AnalyticsSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AnalyticsSettings {
        &self.settings
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.settings.risk_free_rate
    }

    /// The main entry point for summarizing a price series.
    ///
    /// # Arguments
    ///
    /// * `prices` - The asset's price history.
    /// * `benchmark` - Optional benchmark prices. Beta, alpha, tracking error and the
    ///   information ratio are only reported when this is given.
    /// * `risk_free_rate` - Annual rate; falls back to the configured rate.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `MetricReport` or the first `AnalyticsError` hit.
    #[tracing::instrument(skip_all, fields(points = prices.len(), benchmark = benchmark.is_some()))]
    pub fn compute_metrics(
        &self,
        prices: &PriceSeries,
        benchmark: Option<&PriceSeries>,
        risk_free_rate: Option<f64>,
    ) -> Result<MetricReport, AnalyticsError> {
        let rf = risk_free_rate.unwrap_or(self.settings.risk_free_rate);
        validate_prices(prices, "prices")?;

        let mut values = BTreeMap::new();
        self.calculate_returns(prices, &mut values)?;
        self.calculate_ratios(prices, rf, &mut values)?;
        self.calculate_tail_risk(prices, &mut values)?;
        if let Some(benchmark) = benchmark {
            validate_prices(benchmark, "benchmark")?;
            self.calculate_relative(prices, benchmark, rf, &mut values)?;
        }

        tracing::debug!(metrics = values.len(), "Computed metric report");
        Ok(values.into_iter().collect())
    }

    /// Return, growth and drawdown figures.
    fn calculate_returns(
        &self,
        prices: &PriceSeries,
        values: &mut BTreeMap<MetricKind, f64>,
    ) -> Result<(), AnalyticsError> {
        values.insert(MetricKind::TotalReturn, total_return(prices)?);
        values.insert(MetricKind::Cagr, metrics::cagr(prices)?);
        values.insert(MetricKind::Volatility, metrics::volatility(prices, true)?);
        values.insert(MetricKind::MaxDrawdown, metrics::max_drawdown(prices)?);
        values.insert(MetricKind::WinRate, metrics::win_rate(prices)?);
        Ok(())
    }

    /// Risk-adjusted ratios.
    fn calculate_ratios(
        &self,
        prices: &PriceSeries,
        risk_free_rate: f64,
        values: &mut BTreeMap<MetricKind, f64>,
    ) -> Result<(), AnalyticsError> {
        values.insert(MetricKind::SharpeRatio, metrics::sharpe_ratio(prices, risk_free_rate)?);
        values.insert(MetricKind::SortinoRatio, metrics::sortino_ratio(prices, risk_free_rate)?);
        values.insert(MetricKind::CalmarRatio, metrics::calmar_ratio(prices)?);
        Ok(())
    }

    /// Historical VaR, CVaR and Omega.
    fn calculate_tail_risk(
        &self,
        prices: &PriceSeries,
        values: &mut BTreeMap<MetricKind, f64>,
    ) -> Result<(), AnalyticsError> {
        values.insert(MetricKind::Var95, metrics::value_at_risk(prices, REPORT_CONFIDENCE)?);
        values.insert(
            MetricKind::Cvar95,
            metrics::conditional_value_at_risk(prices, REPORT_CONFIDENCE)?,
        );
        values.insert(MetricKind::Omega, metrics::omega_ratio(prices, REPORT_OMEGA_THRESHOLD)?);
        Ok(())
    }

    /// Benchmark-relative figures.
    fn calculate_relative(
        &self,
        prices: &PriceSeries,
        benchmark: &PriceSeries,
        risk_free_rate: f64,
        values: &mut BTreeMap<MetricKind, f64>,
    ) -> Result<(), AnalyticsError> {
        values.insert(MetricKind::Beta, metrics::beta(prices, benchmark)?);
        values.insert(MetricKind::Alpha, metrics::alpha(prices, benchmark, risk_free_rate)?);
        values.insert(
            MetricKind::TrackingError,
            metrics::tracking_error(prices, benchmark, true)?,
        );
        values.insert(MetricKind::InfoRatio, metrics::information_ratio(prices, benchmark)?);
        Ok(())
    }

    /// Rolling frame using the configured volatility and Sharpe windows.
    pub fn compute_rolling_metrics(&self, prices: &PriceSeries) -> Result<RollingMetrics, AnalyticsError> {
        self.compute_rolling_metrics_with(prices, self.default_windows())
    }

    pub fn compute_rolling_metrics_with(
        &self,
        prices: &PriceSeries,
        windows: RollingWindows,
    ) -> Result<RollingMetrics, AnalyticsError> {
        rolling::compute_rolling_metrics(prices, windows, self.settings.risk_free_rate)
    }

    pub fn default_windows(&self) -> RollingWindows {
        RollingWindows {
            volatility: self.settings.rolling_volatility_window,
            sharpe: self.settings.rolling_sharpe_window,
        }
    }

    pub fn rolling_beta(
        &self,
        prices: &PriceSeries,
        benchmark: &PriceSeries,
    ) -> Result<RollingSeries, AnalyticsError> {
        rolling::rolling_beta(prices, benchmark, self.settings.rolling_beta_window)
    }

    pub fn z_score(&self, prices: &PriceSeries) -> Result<RollingSeries, AnalyticsError> {
        rolling::z_score(prices, self.settings.z_score_window)
    }

    pub fn hurst_exponent(&self, prices: &PriceSeries) -> f64 {
        metrics::hurst_exponent(prices, self.settings.hurst_max_lag)
    }

    /// Regime frame using the configured windows and volatility threshold.
    pub fn detect_regime(&self, prices: &PriceSeries) -> Result<RegimeFrame, AnalyticsError> {
        let regime = &self.settings.regime;
        detect_regime(
            prices,
            regime.short_window,
            regime.long_window,
            regime.vol_window,
            regime.vol_threshold,
        )
    }
}
