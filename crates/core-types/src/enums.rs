use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The quantity a portfolio optimization run maximizes or minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    MaxSharpe,
    MinVolatility,
    MaxReturn,
}

impl FromStr for Objective {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "sharpe" | "max_sharpe" => Ok(Objective::MaxSharpe),
            "min_vol" | "min_volatility" => Ok(Objective::MinVolatility),
            "max_return" => Ok(Objective::MaxReturn),
            other => Err(CoreError::InvalidInput(
                "objective".to_string(),
                format!("unknown objective '{other}'"),
            )),
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::MaxSharpe => write!(f, "max-sharpe"),
            Objective::MinVolatility => write!(f, "min-volatility"),
            Objective::MaxReturn => write!(f, "max-return"),
        }
    }
}

/// Direction of the short moving average relative to the long one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Uptrend,
    Downtrend,
}

/// Whether annualized rolling volatility is above the configured threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityRegime {
    HighVol,
    LowVol,
}
