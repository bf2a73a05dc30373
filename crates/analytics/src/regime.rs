use crate::error::AnalyticsError;
use crate::rolling::{rolling_mean, rolling_volatility};
use crate::validate::validate_window;
use chrono::NaiveDate;
use core_types::{PriceSeries, Trend, VolatilityRegime};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeRow {
    pub date: NaiveDate,
    pub short_ma: f64,
    pub long_ma: f64,
    pub rolling_vol: f64,
    /// `None` until both moving averages are defined.
    pub trend: Option<Trend>,
    /// `None` until the rolling volatility is defined.
    pub volatility_regime: Option<VolatilityRegime>,
}

/// Per-date trend and volatility classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RegimeFrame {
    rows: Vec<RegimeRow>,
}

impl RegimeFrame {
    pub fn rows(&self) -> &[RegimeRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The most recent row.
    pub fn latest(&self) -> Option<&RegimeRow> {
        self.rows.last()
    }
}

/// Classifies each date by moving-average crossover and annualized volatility.
///
/// A tie between the averages counts as a downtrend; volatility equal to the
/// threshold counts as low.
#[tracing::instrument(skip(prices), fields(points = prices.len()))]
pub fn detect_regime(
    prices: &PriceSeries,
    short_window: usize,
    long_window: usize,
    vol_window: usize,
    vol_threshold: f64,
) -> Result<RegimeFrame, AnalyticsError> {
    validate_window(short_window)?;
    validate_window(long_window)?;
    if !vol_threshold.is_finite() {
        return Err(AnalyticsError::InvalidParameter(format!(
            "volatility threshold must be finite, got {vol_threshold}"
        )));
    }

    let values = prices.values();
    let short_ma = rolling_mean(values, short_window);
    let long_ma = rolling_mean(values, long_window);
    let vol = rolling_volatility(prices, vol_window, true)?;

    let rows: Vec<RegimeRow> = prices
        .dates()
        .iter()
        .enumerate()
        .map(|(i, &date)| {
            // No return exists on the first price date.
            let rolling_vol = i.checked_sub(1).map_or(f64::NAN, |j| vol.values()[j]);
            let trend = if short_ma[i].is_nan() || long_ma[i].is_nan() {
                None
            } else if short_ma[i] > long_ma[i] {
                Some(Trend::Uptrend)
            } else {
                Some(Trend::Downtrend)
            };
            let volatility_regime = if rolling_vol.is_nan() {
                None
            } else if rolling_vol > vol_threshold {
                Some(VolatilityRegime::HighVol)
            } else {
                Some(VolatilityRegime::LowVol)
            };
            RegimeRow {
                date,
                short_ma: short_ma[i],
                long_ma: long_ma[i],
                rolling_vol,
                trend,
                volatility_regime,
            }
        })
        .collect();

    if let Some(latest) = rows.last() {
        tracing::debug!(trend = ?latest.trend, vol_regime = ?latest.volatility_regime, "Latest regime");
    }
    Ok(RegimeFrame { rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn prices(values: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..values.len()).map(|i| start + Days::new(i as u64)).collect();
        PriceSeries::new(dates, values.to_vec()).unwrap()
    }

    #[test]
    fn rising_prices_are_an_uptrend_once_averages_exist() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let frame = detect_regime(&prices(&values), 2, 4, 3, 10.0).unwrap();
        assert_eq!(frame.len(), 10);
        assert_eq!(frame.rows()[2].trend, None);
        assert_eq!(frame.rows()[3].trend, Some(Trend::Uptrend));
        assert_eq!(frame.latest().unwrap().trend, Some(Trend::Uptrend));
        assert_eq!(frame.rows()[0].volatility_regime, None);
        assert_eq!(frame.rows()[2].volatility_regime, None);
        assert_eq!(frame.rows()[3].volatility_regime, Some(VolatilityRegime::LowVol));
    }

    #[test]
    fn equal_averages_are_a_downtrend() {
        let frame = detect_regime(&prices(&[5.0; 6]), 2, 3, 2, 0.25).unwrap();
        assert_eq!(frame.latest().unwrap().trend, Some(Trend::Downtrend));
    }

    #[test]
    fn volatile_prices_exceed_threshold() {
        let frame = detect_regime(&prices(&[100.0, 120.0, 90.0, 130.0, 95.0]), 2, 3, 2, 0.25).unwrap();
        assert_eq!(
            frame.latest().unwrap().volatility_regime,
            Some(VolatilityRegime::HighVol)
        );
    }
}
