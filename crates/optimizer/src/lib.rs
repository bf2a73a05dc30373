//! # Flux Portfolio Optimizer
//!
//! Long-only, fully invested mean-variance allocation over a `PriceMatrix`.
//!
//! Expected returns and covariance are annualized from daily returns. The weight
//! constraints are enforced by projecting every candidate onto the probability
//! simplex inside the cost function, which lets a derivative-free Nelder-Mead
//! search (from `argmin`) run unconstrained. Solver trouble is reported as an
//! error rather than a silently degraded allocation.

use crate::error::OptimizerError;
use crate::estimates::Estimates;
use crate::solver::{check_feasible, minimize, PortfolioCost};
use configuration::{OptimizerSettings, Settings};
use core_types::{Objective, PriceMatrix};
use serde::Serialize;
use std::collections::BTreeMap;

pub mod error;
pub mod estimates;
pub mod projection;
mod solver;

pub use projection::project_to_simplex;

/// An allocation together with its annualized statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioResult {
    pub expected_return: f64,
    pub expected_volatility: f64,
    /// `(return - rf) / volatility`, or 0.0 for a riskless portfolio.
    pub sharpe_ratio: f64,
    pub weights: BTreeMap<String, f64>,
}

impl PortfolioResult {
    fn evaluate(estimates: &Estimates, weights: &[f64], risk_free_rate: f64) -> Self {
        let expected_return = estimates.portfolio_return(weights);
        let expected_volatility = estimates.portfolio_volatility(weights);
        let sharpe_ratio = if expected_volatility == 0.0 {
            0.0
        } else {
            (expected_return - risk_free_rate) / expected_volatility
        };
        Self {
            expected_return,
            expected_volatility,
            sharpe_ratio,
            weights: estimates.assets.iter().cloned().zip(weights.iter().copied()).collect(),
        }
    }

    pub fn weight(&self, asset: &str) -> Option<f64> {
        self.weights.get(asset).copied()
    }
}

/// Fixed `1/N` weights evaluated with the same estimates the optimizer uses.
pub fn equal_weight_portfolio(
    prices: &PriceMatrix,
    risk_free_rate: f64,
) -> Result<PortfolioResult, OptimizerError> {
    let estimates = Estimates::from_prices(prices)?;
    let n = estimates.n_assets();
    let weights = vec![1.0 / n as f64; n];
    Ok(PortfolioResult::evaluate(&estimates, &weights, risk_free_rate))
}

/// Runs constrained mean-variance optimizations with defaults from settings.
#[derive(Debug, Clone)]
pub struct PortfolioOptimizer {
    settings: OptimizerSettings,
    risk_free_rate: f64,
}

impl Default for PortfolioOptimizer {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl PortfolioOptimizer {
    pub fn new(settings: OptimizerSettings, risk_free_rate: f64) -> Self {
        Self {
            settings,
            risk_free_rate,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.optimizer.clone(), settings.analytics.risk_free_rate)
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// Finds the weights that optimize `objective` subject to `0 <= w <= 1`, `sum(w) = 1`.
    ///
    /// # Arguments
    ///
    /// * `prices` - Aligned prices of at least two assets.
    /// * `objective` - What to maximize or minimize.
    /// * `risk_free_rate` - Annual rate for the Sharpe objective and the reported
    ///   Sharpe ratio; falls back to the configured rate.
    #[tracing::instrument(skip(self, prices), fields(assets = prices.n_assets()))]
    pub fn optimize(
        &self,
        prices: &PriceMatrix,
        objective: Objective,
        risk_free_rate: Option<f64>,
    ) -> Result<PortfolioResult, OptimizerError> {
        let rf = risk_free_rate.unwrap_or(self.risk_free_rate);
        let estimates = Estimates::from_prices(prices)?;

        if objective == Objective::MaxSharpe && estimates.is_riskless() {
            tracing::warn!("Every asset has zero variance; the Sharpe ratio is undefined");
            return Err(OptimizerError::Degenerate(
                "every asset has zero variance, Sharpe ratio is undefined".to_string(),
            ));
        }

        let cost = PortfolioCost::new(estimates.clone(), objective, rf);
        let weights = minimize(cost, &self.settings)?;
        check_feasible(&weights, self.settings.weight_tolerance)?;

        let result = PortfolioResult::evaluate(&estimates, &weights, rf);
        tracing::info!(
            %objective,
            expected_return = result.expected_return,
            volatility = result.expected_volatility,
            sharpe = result.sharpe_ratio,
            "Portfolio optimized"
        );
        Ok(result)
    }

    /// The `1/N` baseline for the same inputs.
    pub fn equal_weight(
        &self,
        prices: &PriceMatrix,
        risk_free_rate: Option<f64>,
    ) -> Result<PortfolioResult, OptimizerError> {
        equal_weight_portfolio(prices, risk_free_rate.unwrap_or(self.risk_free_rate))
    }
}
