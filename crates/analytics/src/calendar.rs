use crate::error::AnalyticsError;
use crate::returns::simple_returns;
use crate::validate::validate_prices;
use chrono::{Datelike, NaiveDate};
use core_types::PriceSeries;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Month-over-month returns pivoted into one row of twelve cells per year.
///
/// A cell is `None` when the month has no return (before the first observed month,
/// after the last, or the first observed month itself). Serializes as
/// `{ year: { "Jan": .., .., "Dec": .. } }`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyReturns {
    rows: BTreeMap<i32, [Option<f64>; 12]>,
}

impl MonthlyReturns {
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.rows.keys().copied()
    }

    /// Return for `month` (1 = January) of `year`.
    pub fn get(&self, year: i32, month: u32) -> Option<f64> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        self.rows.get(&year)?.get(index).copied().flatten()
    }

    pub fn rows(&self) -> impl Iterator<Item = (i32, &[Option<f64>; 12])> + '_ {
        self.rows.iter().map(|(year, row)| (*year, row))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Serialize for MonthlyReturns {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rows.len()))?;
        for (year, row) in &self.rows {
            map.serialize_entry(year, &MonthRow(row))?;
        }
        map.end()
    }
}

struct MonthRow<'a>(&'a [Option<f64>; 12]);

impl Serialize for MonthRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(MONTH_NAMES.len()))?;
        for (name, cell) in MONTH_NAMES.iter().zip(self.0) {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}

/// The last observation of each calendar period, in date order.
fn period_closes<K, F>(prices: &PriceSeries, key: F) -> Vec<(K, f64)>
where
    K: PartialEq + Copy,
    F: Fn(NaiveDate) -> K,
{
    let mut closes: Vec<(K, f64)> = Vec::new();
    for (date, price) in prices.iter() {
        let k = key(date);
        match closes.last_mut() {
            Some((last, value)) if *last == k => *value = price,
            _ => closes.push((k, price)),
        }
    }
    closes
}

pub fn monthly_returns(prices: &PriceSeries) -> Result<MonthlyReturns, AnalyticsError> {
    validate_prices(prices, "prices")?;
    let closes = period_closes(prices, |d| (d.year(), d.month()));
    let values: Vec<f64> = closes.iter().map(|(_, v)| *v).collect();

    let mut rows: BTreeMap<i32, [Option<f64>; 12]> = BTreeMap::new();
    for (((year, month), _), ret) in closes.iter().skip(1).zip(simple_returns(&values)) {
        rows.entry(*year).or_insert([None; 12])[*month as usize - 1] = Some(ret);
    }
    tracing::debug!(months = closes.len(), years = rows.len(), "Computed monthly returns");
    Ok(MonthlyReturns { rows })
}

/// Year-over-year returns from the last observation of each calendar year.
pub fn yearly_returns(prices: &PriceSeries) -> Result<BTreeMap<i32, f64>, AnalyticsError> {
    validate_prices(prices, "prices")?;
    let closes = period_closes(prices, |d| d.year());
    let values: Vec<f64> = closes.iter().map(|(_, v)| *v).collect();

    Ok(closes
        .iter()
        .skip(1)
        .zip(simple_returns(&values))
        .map(|((year, _), ret)| (*year, ret))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn pivot_uses_month_end_prices_and_drops_first_month() {
        let prices = PriceSeries::from_points([
            (d(2023, 11, 10), 90.0),
            (d(2023, 11, 30), 100.0),
            (d(2023, 12, 29), 110.0),
            (d(2024, 1, 15), 99.0),
            (d(2024, 2, 1), 120.0),
            (d(2024, 2, 28), 108.9),
        ])
        .unwrap();

        let monthly = monthly_returns(&prices).unwrap();
        assert_eq!(monthly.years().collect::<Vec<_>>(), vec![2023, 2024]);
        assert_eq!(monthly.get(2023, 11), None);
        assert_abs_diff_eq!(monthly.get(2023, 12).unwrap(), 0.10, epsilon = 1e-12);
        assert_abs_diff_eq!(monthly.get(2024, 1).unwrap(), -0.10, epsilon = 1e-12);
        assert_abs_diff_eq!(monthly.get(2024, 2).unwrap(), 0.10, epsilon = 1e-12);
        assert_eq!(monthly.get(2024, 3), None);
        assert_eq!(monthly.get(2024, 13), None);
    }

    #[test]
    fn pivot_serializes_with_month_name_columns() {
        let prices = PriceSeries::from_points([
            (d(2023, 11, 30), 100.0),
            (d(2023, 12, 29), 110.0),
        ])
        .unwrap();
        let json = serde_json::to_value(monthly_returns(&prices).unwrap()).unwrap();

        let row = json["2023"].as_object().unwrap();
        assert_eq!(row.len(), 12);
        assert!(row["Jan"].is_null());
        assert!(row["Nov"].is_null());
        assert_abs_diff_eq!(row["Dec"].as_f64().unwrap(), 0.10, epsilon = 1e-12);
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        for name in MONTH_NAMES {
            assert!(keys.contains(&name));
        }
    }

    #[test]
    fn yearly_returns_are_keyed_by_year() {
        let prices = PriceSeries::from_points([
            (d(2022, 6, 1), 50.0),
            (d(2022, 12, 30), 100.0),
            (d(2023, 12, 29), 125.0),
            (d(2024, 3, 1), 100.0),
        ])
        .unwrap();
        let yearly = yearly_returns(&prices).unwrap();
        assert_eq!(yearly.len(), 2);
        assert_abs_diff_eq!(yearly[&2023], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(yearly[&2024], -0.20, epsilon = 1e-12);
    }
}
