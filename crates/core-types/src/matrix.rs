use crate::error::CoreError;
use crate::series::PriceSeries;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Several price series aligned on one common date index.
///
/// Alignment is an inner join: a date is kept only if every asset has a price on
/// it. Columns keep the order in which the assets were supplied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceMatrix {
    assets: Vec<String>,
    dates: Vec<NaiveDate>,
    columns: Vec<Vec<f64>>,
}

impl PriceMatrix {
    pub fn align<I, S>(series: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (S, PriceSeries)>,
        S: Into<String>,
    {
        let series: Vec<(String, PriceSeries)> =
            series.into_iter().map(|(name, s)| (name.into(), s)).collect();

        if series.is_empty() {
            return Err(CoreError::InvalidInput(
                "price matrix".to_string(),
                "at least one asset is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (name, _) in &series {
            if !seen.insert(name.as_str()) {
                return Err(CoreError::DuplicateAsset(name.clone()));
            }
        }

        let mut common: BTreeSet<NaiveDate> = series[0].1.dates().iter().copied().collect();
        for (_, s) in &series[1..] {
            let dates: HashSet<NaiveDate> = s.dates().iter().copied().collect();
            common.retain(|d| dates.contains(d));
        }
        if common.is_empty() {
            return Err(CoreError::EmptyAlignment);
        }

        let dates: Vec<NaiveDate> = common.into_iter().collect();
        let mut assets = Vec::with_capacity(series.len());
        let mut columns = Vec::with_capacity(series.len());
        for (name, s) in series {
            let by_date: HashMap<NaiveDate, f64> = s.iter().collect();
            let dropped = s.len() - dates.len();
            if dropped > 0 {
                tracing::debug!(asset = %name, dropped, "Dropped rows not shared by every asset.");
            }
            columns.push(dates.iter().map(|d| by_date[d]).collect());
            assets.push(name);
        }

        Ok(Self { assets, dates, columns })
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn n_assets(&self) -> usize {
        self.assets.len()
    }

    pub fn n_dates(&self) -> usize {
        self.dates.len()
    }

    pub fn column(&self, index: usize) -> Option<&[f64]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> + '_ {
        self.assets
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    /// The aligned column of one asset as a standalone price series.
    pub fn series(&self, asset: &str) -> Option<PriceSeries> {
        let index = self.assets.iter().position(|a| a == asset)?;
        // Every column was drawn from a validated series on a subset of its dates.
        PriceSeries::new(self.dates.clone(), self.columns[index].clone()).ok()
    }
}
