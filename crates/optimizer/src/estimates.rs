use crate::error::OptimizerError;
use analytics::returns::simple_returns;
use analytics::{stats, TRADING_DAYS_PER_YEAR};
use core_types::PriceMatrix;

/// Annualized expected returns and covariance of a set of assets.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimates {
    pub assets: Vec<String>,
    /// Mean daily return per asset times 252.
    pub mean_returns: Vec<f64>,
    /// Sample covariance of daily returns times 252.
    pub covariance: Vec<Vec<f64>>,
}

impl Estimates {
    pub fn from_prices(prices: &PriceMatrix) -> Result<Self, OptimizerError> {
        let n = prices.n_assets();
        if n < 2 {
            return Err(OptimizerError::TooFewAssets(n));
        }
        let observations = prices.n_dates().saturating_sub(1);
        if observations < 2 {
            return Err(OptimizerError::InsufficientData(observations));
        }

        let returns: Vec<Vec<f64>> = prices.columns().map(|(_, col)| simple_returns(col)).collect();
        let mean_returns = returns
            .iter()
            .map(|r| stats::mean(r) * TRADING_DAYS_PER_YEAR)
            .collect();
        let variances: Vec<f64> = returns.iter().map(|r| stats::sample_variance(r)).collect();

        let mut covariance = vec![vec![0.0; n]; n];
        for i in 0..n {
            covariance[i][i] = variances[i] * TRADING_DAYS_PER_YEAR;
            for j in (i + 1)..n {
                // A constant asset co-varies with nothing; keep float noise out.
                let cov = if variances[i] == 0.0 || variances[j] == 0.0 {
                    0.0
                } else {
                    stats::covariance(&returns[i], &returns[j]) * TRADING_DAYS_PER_YEAR
                };
                covariance[i][j] = cov;
                covariance[j][i] = cov;
            }
        }

        tracing::debug!(assets = n, observations, "Estimated annualized returns and covariance");
        Ok(Self {
            assets: prices.assets().to_vec(),
            mean_returns,
            covariance,
        })
    }

    pub fn n_assets(&self) -> usize {
        self.assets.len()
    }

    pub fn portfolio_return(&self, weights: &[f64]) -> f64 {
        weights.iter().zip(&self.mean_returns).map(|(w, mu)| w * mu).sum()
    }

    pub fn portfolio_volatility(&self, weights: &[f64]) -> f64 {
        let variance: f64 = self
            .covariance
            .iter()
            .zip(weights)
            .map(|(row, wi)| wi * row.iter().zip(weights).map(|(c, wj)| c * wj).sum::<f64>())
            .sum();
        variance.max(0.0).sqrt()
    }

    /// True when every asset has zero variance.
    pub fn is_riskless(&self) -> bool {
        (0..self.n_assets()).all(|i| self.covariance[i][i] == 0.0)
    }
}
