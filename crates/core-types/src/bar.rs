use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLCV observation as handed over by the data layer.
///
/// Field names accept both the lower-case form and the capitalised column names
/// used by common market-data exports (`Open`, `High`, `Low`, `Close`, `Volume`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    #[serde(alias = "Date")]
    pub date: NaiveDate,
    #[serde(alias = "Open")]
    pub open: f64,
    #[serde(alias = "High")]
    pub high: f64,
    #[serde(alias = "Low")]
    pub low: f64,
    #[serde(alias = "Close")]
    pub close: f64,
    #[serde(alias = "Volume", default)]
    pub volume: f64,
}
