use crate::bar::Bar;
use crate::error::CoreError;
use chrono::NaiveDate;
use serde::Serialize;

/// A date-indexed sequence of floats.
///
/// This is the shape shared by every derived series in the system: daily returns,
/// cumulative returns, drawdowns and all rolling statistics. Values may be `NaN`
/// where a statistic is undefined (e.g. the warm-up of a rolling window), which
/// serializes as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

/// Simple returns derived from a `PriceSeries`, one entry per price after the first.
pub type ReturnSeries = TimeSeries;

/// A rolling statistic aligned to the return (or price) index it was computed from.
pub type RollingSeries = TimeSeries;

impl TimeSeries {
    /// Builds a series after checking that the index is strictly increasing and
    /// that every date has exactly one value.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self, CoreError> {
        if dates.len() != values.len() {
            return Err(CoreError::InvalidInput(
                "series".to_string(),
                format!("{} dates but {} values", dates.len(), values.len()),
            ));
        }
        check_increasing(&dates)?;
        Ok(Self { dates, values })
    }

    /// Builds a series from an index that is already known to be valid, such as the
    /// dates of an existing `PriceSeries` or a suffix of them.
    pub fn from_index(dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        Self { dates, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<(NaiveDate, f64)> {
        Some((*self.dates.get(index)?, *self.values.get(index)?))
    }

    pub fn first(&self) -> Option<(NaiveDate, f64)> {
        self.get(0)
    }

    pub fn last(&self) -> Option<(NaiveDate, f64)> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }
}

/// An ordered series of strictly positive prices on a strictly increasing,
/// gap-free date index.
///
/// The series itself may be empty or hold a single point; return-based
/// computations reject those through the analytics validator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    inner: TimeSeries,
}

impl PriceSeries {
    pub fn new(dates: Vec<NaiveDate>, prices: Vec<f64>) -> Result<Self, CoreError> {
        let inner = TimeSeries::new(dates, prices)?;
        for (date, value) in inner.iter() {
            if !(value.is_finite() && value > 0.0) {
                return Err(CoreError::InvalidPrice { date, value });
            }
        }
        Ok(Self { inner })
    }

    pub fn from_points<I>(points: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let (dates, prices) = points.into_iter().unzip();
        Self::new(dates, prices)
    }

    /// Builds a series from a column that may contain missing values.
    ///
    /// Leading and trailing missing values are trimmed. A missing value between two
    /// observed prices is a gap and is rejected.
    pub fn from_optional<I>(points: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
    {
        let points: Vec<(NaiveDate, Option<f64>)> = points.into_iter().collect();
        let Some(start) = points.iter().position(|(_, v)| v.is_some()) else {
            return Ok(Self::default());
        };
        let end = points
            .iter()
            .rposition(|(_, v)| v.is_some())
            .unwrap_or(start);

        let mut observed = Vec::with_capacity(end - start + 1);
        for &(date, value) in &points[start..=end] {
            match value {
                Some(price) => observed.push((date, price)),
                None => return Err(CoreError::InteriorGap(date)),
            }
        }
        Self::from_points(observed)
    }

    /// Uses the closing price of each bar.
    pub fn from_bars(bars: &[Bar]) -> Result<Self, CoreError> {
        Self::from_points(bars.iter().map(|bar| (bar.date, bar.close)))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        self.inner.dates()
    }

    pub fn values(&self) -> &[f64] {
        self.inner.values()
    }

    pub fn first(&self) -> Option<(NaiveDate, f64)> {
        self.inner.first()
    }

    pub fn last(&self) -> Option<(NaiveDate, f64)> {
        self.inner.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.inner.iter()
    }

    pub fn as_series(&self) -> &TimeSeries {
        &self.inner
    }
}

fn check_increasing(dates: &[NaiveDate]) -> Result<(), CoreError> {
    for pair in dates.windows(2) {
        if pair[1] <= pair[0] {
            return Err(CoreError::NonIncreasingDates {
                previous: pair[0],
                next: pair[1],
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn rejects_duplicate_and_decreasing_dates() {
        let err = PriceSeries::new(vec![day(2), day(2)], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, CoreError::NonIncreasingDates { .. }));

        let err = PriceSeries::new(vec![day(3), day(2)], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, CoreError::NonIncreasingDates { .. }));
    }

    #[test]
    fn rejects_non_positive_prices() {
        let err = PriceSeries::new(vec![day(2), day(3)], vec![1.0, 0.0]).unwrap_err();
        assert_eq!(err, CoreError::InvalidPrice { date: day(3), value: 0.0 });

        assert!(PriceSeries::new(vec![day(2)], vec![f64::NAN]).is_err());
    }

    #[test]
    fn trims_leading_and_trailing_gaps() {
        let series = PriceSeries::from_optional(vec![
            (day(1), None),
            (day(2), Some(10.0)),
            (day(3), Some(11.0)),
            (day(4), None),
        ])
        .unwrap();

        assert_eq!(series.dates(), &[day(2), day(3)]);
        assert_eq!(series.values(), &[10.0, 11.0]);
    }

    #[test]
    fn rejects_interior_gap() {
        let err = PriceSeries::from_optional(vec![
            (day(2), Some(10.0)),
            (day(3), None),
            (day(4), Some(11.0)),
        ])
        .unwrap_err();

        assert_eq!(err, CoreError::InteriorGap(day(3)));
    }

    #[test]
    fn all_missing_column_is_empty() {
        let series = PriceSeries::from_optional(vec![(day(2), None), (day(3), None)]).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn nan_values_serialize_as_null() {
        let series = TimeSeries::from_index(vec![day(2), day(3)], vec![f64::NAN, 0.5]);
        let json = serde_json::to_value(&series).unwrap();
        assert!(json["values"][0].is_null());
        assert_eq!(json["values"][1], 0.5);
        assert_eq!(json["dates"][0], "2024-01-02");
    }

    #[test]
    fn last_point_of_series() {
        let series = TimeSeries::new(vec![day(2), day(5)], vec![1.0, 2.0]).unwrap();
        assert_eq!(series.last(), Some((day(5), 2.0)));
    }
}
