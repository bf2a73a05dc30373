use crate::error::AnalyticsError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Every metric the aggregator can report, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    TotalReturn,
    Cagr,
    Volatility,
    MaxDrawdown,
    SharpeRatio,
    SortinoRatio,
    CalmarRatio,
    WinRate,
    #[serde(rename = "var_95")]
    Var95,
    #[serde(rename = "cvar_95")]
    Cvar95,
    Omega,
    Beta,
    Alpha,
    TrackingError,
    InfoRatio,
}

impl MetricKind {
    /// Metrics computed for every series.
    pub const BASE: [MetricKind; 11] = [
        MetricKind::TotalReturn,
        MetricKind::Cagr,
        MetricKind::Volatility,
        MetricKind::MaxDrawdown,
        MetricKind::SharpeRatio,
        MetricKind::SortinoRatio,
        MetricKind::CalmarRatio,
        MetricKind::WinRate,
        MetricKind::Var95,
        MetricKind::Cvar95,
        MetricKind::Omega,
    ];

    /// Metrics that only exist relative to a benchmark.
    pub const BENCHMARK: [MetricKind; 4] = [
        MetricKind::Beta,
        MetricKind::Alpha,
        MetricKind::TrackingError,
        MetricKind::InfoRatio,
    ];

    pub fn all() -> impl Iterator<Item = MetricKind> {
        Self::BASE.into_iter().chain(Self::BENCHMARK)
    }

    /// The stable machine name, also used by serde.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::TotalReturn => "total_return",
            MetricKind::Cagr => "cagr",
            MetricKind::Volatility => "volatility",
            MetricKind::MaxDrawdown => "max_drawdown",
            MetricKind::SharpeRatio => "sharpe_ratio",
            MetricKind::SortinoRatio => "sortino_ratio",
            MetricKind::CalmarRatio => "calmar_ratio",
            MetricKind::WinRate => "win_rate",
            MetricKind::Var95 => "var_95",
            MetricKind::Cvar95 => "cvar_95",
            MetricKind::Omega => "omega",
            MetricKind::Beta => "beta",
            MetricKind::Alpha => "alpha",
            MetricKind::TrackingError => "tracking_error",
            MetricKind::InfoRatio => "info_ratio",
        }
    }

    /// Human-readable label for tables.
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::TotalReturn => "Total Return",
            MetricKind::Cagr => "CAGR",
            MetricKind::Volatility => "Volatility",
            MetricKind::MaxDrawdown => "Max Drawdown",
            MetricKind::SharpeRatio => "Sharpe Ratio",
            MetricKind::SortinoRatio => "Sortino Ratio",
            MetricKind::CalmarRatio => "Calmar Ratio",
            MetricKind::WinRate => "Win Rate",
            MetricKind::Var95 => "VaR (95%)",
            MetricKind::Cvar95 => "CVaR (95%)",
            MetricKind::Omega => "Omega",
            MetricKind::Beta => "Beta",
            MetricKind::Alpha => "Alpha",
            MetricKind::TrackingError => "Tracking Error",
            MetricKind::InfoRatio => "Info Ratio",
        }
    }

    pub fn format_rule(&self) -> FormatRule {
        match self {
            MetricKind::TotalReturn
            | MetricKind::Cagr
            | MetricKind::Volatility
            | MetricKind::MaxDrawdown
            | MetricKind::Alpha
            | MetricKind::TrackingError => FormatRule::Percent,
            MetricKind::SharpeRatio
            | MetricKind::SortinoRatio
            | MetricKind::CalmarRatio
            | MetricKind::WinRate
            | MetricKind::Var95
            | MetricKind::Cvar95
            | MetricKind::Omega
            | MetricKind::Beta
            | MetricKind::InfoRatio => FormatRule::Fixed,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::all()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| AnalyticsError::InvalidParameter(format!("unknown metric '{s}'")))
    }
}

/// How a metric value is rendered for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatRule {
    /// Fraction shown as a percentage with two decimals, e.g. `0.1234` -> `12.34%`.
    Percent,
    /// Plain number with two decimals.
    Fixed,
}

impl FormatRule {
    pub fn apply(&self, value: f64) -> String {
        match self {
            FormatRule::Percent => format!("{:.2}%", value * 100.0),
            FormatRule::Fixed => format!("{value:.2}"),
        }
    }
}

/// The metrics computed for one series. Only metrics that were computed are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricReport {
    values: BTreeMap<MetricKind, f64>,
}

impl MetricReport {
    pub fn get(&self, kind: MetricKind) -> Option<f64> {
        self.values.get(&kind).copied()
    }

    pub fn contains(&self, kind: MetricKind) -> bool {
        self.values.contains_key(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricKind, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(MetricKind, f64)> for MetricReport {
    fn from_iter<I: IntoIterator<Item = (MetricKind, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Renders every metric of `report` according to its `FormatRule`.
pub fn format_metrics(report: &MetricReport) -> BTreeMap<MetricKind, String> {
    report
        .iter()
        .map(|(kind, value)| (kind, kind.format_rule().apply(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_and_fixed_rules() {
        let report: MetricReport = [
            (MetricKind::Cagr, 0.1234),
            (MetricKind::SharpeRatio, 1.5),
            (MetricKind::MaxDrawdown, -0.2),
            (MetricKind::WinRate, 0.55),
        ]
        .into_iter()
        .collect();

        let formatted = format_metrics(&report);
        assert_eq!(formatted[&MetricKind::Cagr], "12.34%");
        assert_eq!(formatted[&MetricKind::SharpeRatio], "1.50");
        assert_eq!(formatted[&MetricKind::MaxDrawdown], "-20.00%");
        assert_eq!(formatted[&MetricKind::WinRate], "0.55");
    }

    #[test]
    fn serializes_with_stable_names_in_display_order() {
        let report: MetricReport = [(MetricKind::Cvar95, -0.03), (MetricKind::TotalReturn, 0.5)]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"total_return":0.5,"cvar_95":-0.03}"#);
    }

    #[test]
    fn parses_metric_names() {
        assert_eq!("sharpe_ratio".parse::<MetricKind>().unwrap(), MetricKind::SharpeRatio);
        assert_eq!("VAR-95".parse::<MetricKind>().unwrap(), MetricKind::Var95);
        assert!("sharpe".parse::<MetricKind>().is_err());
        for kind in MetricKind::all() {
            assert_eq!(kind.as_str().parse::<MetricKind>().unwrap(), kind);
        }
    }
}
