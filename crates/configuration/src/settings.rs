use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an empty (or missing) `flux.toml` yields a
/// fully usable configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub analytics: AnalyticsSettings,
    pub optimizer: OptimizerSettings,
    pub data: DataSettings,
    pub logging: LoggingSettings,
}

/// Defaults consumed by the analytics engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// Annualized risk-free rate used whenever a call does not supply its own.
    /// 0.04 corresponds to 4%.
    pub risk_free_rate: f64,
    pub rolling_volatility_window: usize,
    pub rolling_sharpe_window: usize,
    pub rolling_beta_window: usize,
    pub z_score_window: usize,
    /// Largest lag (exclusive) used by the Hurst exponent fit.
    pub hurst_max_lag: usize,
    pub regime: RegimeSettings,
}

/// Windows and threshold for trend / volatility regime classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeSettings {
    pub short_window: usize,
    pub long_window: usize,
    pub vol_window: usize,
    /// Annualized volatility above which a day is classified `high_vol`.
    pub vol_threshold: f64,
}

/// Stopping rules for the constrained portfolio solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    pub max_iters: u64,
    /// Standard deviation of simplex costs below which the solver stops.
    pub tolerance: f64,
    /// Allowed deviation of the weight sum from 1.
    pub weight_tolerance: f64,
}

/// Settings of the surrounding data layer. None of these affect analytics results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub default_period: String,
    pub default_theme: String,
    pub cache_dir: Option<PathBuf>,
    /// Request timeout in seconds.
    pub timeout: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is not set (e.g. "info", "analytics=debug").
    pub level: String,
    /// When set, logs go to a daily rolling file in this directory instead of stderr.
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.04,
            rolling_volatility_window: 21,
            rolling_sharpe_window: 63,
            rolling_beta_window: 63,
            z_score_window: 20,
            hurst_max_lag: 20,
            regime: RegimeSettings::default(),
        }
    }
}

impl Default for RegimeSettings {
    fn default() -> Self {
        Self {
            short_window: 20,
            long_window: 50,
            vol_window: 21,
            vol_threshold: 0.25,
        }
    }
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            max_iters: 10_000,
            tolerance: 1e-10,
            weight_tolerance: 1e-6,
        }
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            default_period: "5y".to_string(),
            default_theme: "flux".to_string(),
            cache_dir: None,
            timeout: 30,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl Settings {
    pub fn risk_free_rate(&self) -> f64 {
        self.analytics.risk_free_rate
    }

    pub fn set_risk_free_rate(&mut self, rate: f64) -> Result<(), ConfigError> {
        if !rate.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "risk_free_rate must be finite, got {rate}"
            )));
        }
        self.analytics.risk_free_rate = rate;
        Ok(())
    }

    /// Sets one of the top-level settings from its textual value.
    ///
    /// Only the keys of the public configuration surface are accepted; anything
    /// else is an `UnknownKey` error rather than being silently ignored.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "risk_free_rate" => self.set_risk_free_rate(parse(key, value)?)?,
            "default_period" => self.data.default_period = value.to_string(),
            "default_theme" => self.data.default_theme = value.to_string(),
            "cache_dir" => self.data.cache_dir = Some(PathBuf::from(value)),
            "timeout" => self.data.timeout = parse(key, value)?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        tracing::debug!(key, value, "Configuration value updated.");
        Ok(())
    }

    /// Checks that the loaded values are usable by the analytics and optimizer crates.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.analytics;
        if !a.risk_free_rate.is_finite() {
            return Err(ConfigError::ValidationError(
                "analytics.risk_free_rate must be finite".to_string(),
            ));
        }
        let windows = [
            ("analytics.rolling_volatility_window", a.rolling_volatility_window),
            ("analytics.rolling_sharpe_window", a.rolling_sharpe_window),
            ("analytics.rolling_beta_window", a.rolling_beta_window),
            ("analytics.z_score_window", a.z_score_window),
            ("analytics.regime.short_window", a.regime.short_window),
            ("analytics.regime.long_window", a.regime.long_window),
            ("analytics.regime.vol_window", a.regime.vol_window),
        ];
        for (name, window) in windows {
            if window == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be at least 1"
                )));
            }
        }
        if !(a.regime.vol_threshold.is_finite() && a.regime.vol_threshold >= 0.0) {
            return Err(ConfigError::ValidationError(
                "analytics.regime.vol_threshold must be a non-negative number".to_string(),
            ));
        }
        let o = &self.optimizer;
        if o.max_iters == 0 {
            return Err(ConfigError::ValidationError(
                "optimizer.max_iters must be at least 1".to_string(),
            ));
        }
        if !(o.tolerance > 0.0 && o.weight_tolerance > 0.0) {
            return Err(ConfigError::ValidationError(
                "optimizer tolerances must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| {
        ConfigError::ValidationError(format!("'{value}' is not a valid value for {key}"))
    })
}
