use crate::error::AnalyticsError;
use crate::returns::simple_returns;
use crate::stats;
use core_types::PriceMatrix;
use itertools::Itertools;
use serde::Serialize;

/// Symmetric matrix of pairwise return correlations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    assets: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// Correlation between two named assets.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.assets.iter().position(|x| x == a)?;
        let j = self.assets.iter().position(|x| x == b)?;
        Some(self.values[i][j])
    }
}

/// Pearson correlation of the daily returns of every pair of columns.
///
/// Pairs involving a zero-variance column are undefined (`NaN`).
pub fn correlation_matrix(matrix: &PriceMatrix) -> Result<CorrelationMatrix, AnalyticsError> {
    let n = matrix.n_assets();
    if n < 2 {
        return Err(AnalyticsError::TooFewAssets(n));
    }
    if matrix.n_dates() < 2 {
        return Err(AnalyticsError::TooShort {
            name: "price matrix".to_string(),
            len: matrix.n_dates(),
        });
    }

    let returns: Vec<Vec<f64>> = matrix.columns().map(|(_, col)| simple_returns(col)).collect();
    let mut values = vec![vec![f64::NAN; n]; n];
    for (i, row) in values.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    for (i, j) in (0..n).tuple_combinations() {
        let rho = stats::pearson(&returns[i], &returns[j]);
        values[i][j] = rho;
        values[j][i] = rho;
    }

    Ok(CorrelationMatrix {
        assets: matrix.assets().to_vec(),
        values,
    })
}
