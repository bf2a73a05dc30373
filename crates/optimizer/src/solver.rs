use crate::error::OptimizerError;
use crate::estimates::Estimates;
use crate::projection::{project_to_simplex, squared_distance};
use argmin::core::{CostFunction, Executor, State, TerminationReason};
use argmin::solver::neldermead::NelderMead;
use configuration::OptimizerSettings;
use core_types::Objective;

/// Weight on the distance between the search point and its projection.
///
/// Any value > 0 keeps the search near the simplex without moving the optimum,
/// since the cost at a projected point is never higher than at its preimage.
const DISTANCE_PENALTY: f64 = 10.0;

/// Cost assigned to a zero-volatility portfolio under the Sharpe objective.
const ZERO_VOL_PENALTY: f64 = 1e6;

/// Volatility at or below which a portfolio counts as riskless.
const VOL_FLOOR: f64 = 1e-12;

/// Offset of each initial simplex vertex from the equal-weight point.
const INITIAL_STEP: f64 = 0.05;

/// Objective evaluated at the projection of the search point onto the simplex.
pub(crate) struct PortfolioCost {
    estimates: Estimates,
    objective: Objective,
    risk_free_rate: f64,
}

impl PortfolioCost {
    pub(crate) fn new(estimates: Estimates, objective: Objective, risk_free_rate: f64) -> Self {
        Self {
            estimates,
            objective,
            risk_free_rate,
        }
    }

    fn objective_value(&self, weights: &[f64]) -> f64 {
        match self.objective {
            Objective::MaxSharpe => {
                let vol = self.estimates.portfolio_volatility(weights);
                if vol <= VOL_FLOOR {
                    return ZERO_VOL_PENALTY;
                }
                -(self.estimates.portfolio_return(weights) - self.risk_free_rate) / vol
            }
            Objective::MinVolatility => self.estimates.portfolio_volatility(weights),
            Objective::MaxReturn => -self.estimates.portfolio_return(weights),
        }
    }
}

impl CostFunction for PortfolioCost {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let weights = project_to_simplex(x);
        Ok(self.objective_value(&weights) + DISTANCE_PENALTY * squared_distance(x, &weights))
    }
}

/// Runs Nelder-Mead from the equal-weight point and returns feasible weights.
pub(crate) fn minimize(
    cost: PortfolioCost,
    settings: &OptimizerSettings,
) -> Result<Vec<f64>, OptimizerError> {
    let n = cost.estimates.n_assets();
    let x0 = vec![1.0 / n as f64; n];
    let mut simplex = Vec::with_capacity(n + 1);
    simplex.push(x0.clone());
    for i in 0..n {
        let mut point = x0.clone();
        point[i] += INITIAL_STEP;
        simplex.push(point);
    }

    let solver = NelderMead::new(simplex)
        .with_sd_tolerance(settings.tolerance)
        .map_err(|e| OptimizerError::Solver(e.to_string()))?;
    let res = Executor::new(cost, solver)
        .configure(|state| state.max_iters(settings.max_iters))
        .run()
        .map_err(|e| OptimizerError::Solver(e.to_string()))?;

    let iterations = res.state.get_iter();
    if let Some(TerminationReason::MaxItersReached) = res.state.get_termination_reason() {
        tracing::warn!(iterations, "Portfolio solver hit its iteration budget");
        return Err(OptimizerError::NotConverged { iterations });
    }
    if !res.state.best_cost.is_finite() {
        return Err(OptimizerError::NonFinite);
    }
    let best = res.state.best_param.ok_or(OptimizerError::NonFinite)?;
    if best.iter().any(|x| !x.is_finite()) {
        return Err(OptimizerError::NonFinite);
    }

    tracing::debug!(iterations, best_cost = res.state.best_cost, "Portfolio solver converged");
    Ok(project_to_simplex(&best))
}

/// Rejects weights outside `[0, 1]` or whose sum strays from 1 by more than `tolerance`.
pub(crate) fn check_feasible(weights: &[f64], tolerance: f64) -> Result<(), OptimizerError> {
    if let Some(w) = weights.iter().find(|w| !(-tolerance..=1.0 + tolerance).contains(*w)) {
        return Err(OptimizerError::Infeasible(format!("weight {w} outside [0, 1]")));
    }
    let total: f64 = weights.iter().sum();
    if (total - 1.0).abs() > tolerance {
        return Err(OptimizerError::Infeasible(format!("weights sum to {total}")));
    }
    Ok(())
}
