//! # Flux Screener
//!
//! Computes a `MetricReport` for every ticker of a universe in parallel and ranks
//! the results by a chosen metric. Tickers whose metrics fail are logged and
//! skipped; the run only fails when nothing could be computed.

use crate::error::ScreenerError;
use analytics::{AnalyticsEngine, MetricKind, MetricReport};
use core_types::PriceSeries;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;

pub mod error;

/// One ticker's metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenedTicker {
    pub ticker: String,
    pub report: MetricReport,
}

/// The parallel screening engine.
pub struct Screener {
    engine: AnalyticsEngine,
}

impl Screener {
    pub fn new(engine: AnalyticsEngine) -> Self {
        Self { engine }
    }

    /// Computes, then ranks, the metrics of every ticker in `universe`.
    pub fn screen(
        &self,
        universe: &[(String, PriceSeries)],
        benchmark: Option<&PriceSeries>,
        sort_by: MetricKind,
        ascending: bool,
    ) -> Result<Vec<ScreenedTicker>, ScreenerError> {
        let mut results = self.run(universe, benchmark)?;
        rank(&mut results, sort_by, ascending);
        Ok(results)
    }

    /// Computes every ticker's metrics on the rayon pool. Results keep the universe order.
    pub fn run(
        &self,
        universe: &[(String, PriceSeries)],
        benchmark: Option<&PriceSeries>,
    ) -> Result<Vec<ScreenedTicker>, ScreenerError> {
        if universe.is_empty() {
            return Err(ScreenerError::NoTickers);
        }
        tracing::info!(
            tickers = universe.len(),
            threads = rayon::current_num_threads(),
            "Screening universe"
        );

        let results: Vec<ScreenedTicker> = universe
            .par_iter()
            .filter_map(|(ticker, prices)| {
                match self.engine.compute_metrics(prices, benchmark, None) {
                    Ok(report) => Some(ScreenedTicker {
                        ticker: ticker.clone(),
                        report,
                    }),
                    Err(e) => {
                        tracing::warn!(ticker = %ticker, error = %e, "Skipping ticker");
                        None
                    }
                }
            })
            .collect();

        if results.is_empty() {
            return Err(ScreenerError::NoResults(universe.len()));
        }
        Ok(results)
    }
}

/// Sorts by `metric`, descending unless `ascending`. Missing or undefined values go last.
pub fn rank(results: &mut [ScreenedTicker], metric: MetricKind, ascending: bool) {
    results.sort_by(|a, b| {
        let va = a.report.get(metric).filter(|v| !v.is_nan());
        let vb = b.report.get(metric).filter(|v| !v.is_nan());
        match (va, vb) {
            (Some(x), Some(y)) => {
                let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
                if ascending { ord } else { ord.reverse() }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}
