//! Maximum-likelihood logistic regression via Newton-Raphson (IRLS).
//!
//! Given the encoded design matrix, we iterate:
//!
//! - `mu = sigmoid(X beta)`
//! - gradient `g = X^T (y - mu)`
//! - Hessian `H = X^T W X` with `W = diag(mu (1 - mu))`
//! - Newton step `beta += H^{-1} g`
//!
//! until the log-likelihood change falls below the tolerance. The Hessian is
//! solved through SVD (see `math`) so a degenerate subset surfaces as a
//! `SingularDesignMatrix` error; an exhausted iteration budget surfaces as
//! `NonConvergence`. Neither is swallowed: the caller decides whether the
//! failure is fatal to the run or only to the regression stage.

use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::domain::{Coefficient, LogitSummary};
use crate::error::AppError;
use crate::math::solve_linear;
use crate::model::design::DesignMatrix;

/// Solver knobs. The defaults follow common statistical-package settings.
#[derive(Debug, Clone, Copy)]
pub struct LogitOptions {
    pub max_iterations: usize,
    /// Convergence threshold on the absolute log-likelihood change.
    pub tolerance: f64,
}

impl Default for LogitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 35,
            tolerance: 1e-8,
        }
    }
}

// Clamp fitted probabilities away from 0/1 so the log-likelihood and the
// IRLS weights stay finite even under quasi-separation.
const MU_EPS: f64 = 1e-10;

/// Fit with default options.
pub fn fit_logit(design: &DesignMatrix) -> Result<LogitSummary, AppError> {
    fit_logit_with(design, LogitOptions::default())
}

/// Fit the logistic model, reporting coefficients, standard errors, Wald
/// z statistics, p-values, and fit statistics.
pub fn fit_logit_with(design: &DesignMatrix, opts: LogitOptions) -> Result<LogitSummary, AppError> {
    let x = &design.x;
    let y = &design.y;
    let n = x.nrows();
    let p = x.ncols();

    if n == 0 || p == 0 {
        return Err(AppError::singular_design_matrix(
            "Cannot fit a logistic model on an empty design matrix.",
        ));
    }

    let mut beta = DVector::zeros(p);
    let mut log_likelihood = log_likelihood_at(x, y, &beta);
    let mut converged_after = None;

    for iteration in 1..=opts.max_iterations {
        let mu = fitted_probabilities(x, &beta);

        // H = X^T W X, assembled by scaling rows of X with the IRLS weights.
        let mut xw = x.clone();
        for i in 0..n {
            let w = mu[i] * (1.0 - mu[i]);
            for j in 0..p {
                xw[(i, j)] *= w;
            }
        }
        let hessian = x.transpose() * &xw;
        let gradient = x.transpose() * (y - &mu);

        let step = solve_linear(&hessian, &gradient).ok_or_else(|| {
            AppError::singular_design_matrix(
                "Singular Hessian during Newton iteration; the design matrix is degenerate on this subset.",
            )
        })?;
        beta += step;

        let updated = log_likelihood_at(x, y, &beta);
        let delta = (updated - log_likelihood).abs();
        log_likelihood = updated;

        if delta < opts.tolerance {
            converged_after = Some(iteration);
            break;
        }
    }

    let Some(iterations) = converged_after else {
        return Err(AppError::non_convergence(format!(
            "Logistic solver did not converge within {} iterations (tolerance {:e}).",
            opts.max_iterations, opts.tolerance
        )));
    };

    // Standard errors from the inverse Fisher information at the optimum.
    let mu = fitted_probabilities(x, &beta);
    let mut xw = x.clone();
    for i in 0..n {
        let w = mu[i] * (1.0 - mu[i]);
        for j in 0..p {
            xw[(i, j)] *= w;
        }
    }
    let hessian = x.transpose() * &xw;
    let covariance = hessian.try_inverse().ok_or_else(|| {
        AppError::singular_design_matrix(
            "Fisher information is singular at the optimum; standard errors are undefined.",
        )
    })?;

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::non_convergence(format!("Normal distribution error: {e}")))?;

    let coefficients = design
        .columns
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let estimate = beta[j];
            let variance = covariance[(j, j)].max(0.0);
            let std_error = variance.sqrt();
            let z_value = if std_error > 0.0 { estimate / std_error } else { f64::NAN };
            let p_value = if z_value.is_finite() {
                2.0 * (1.0 - normal.cdf(z_value.abs()))
            } else {
                f64::NAN
            };
            Coefficient {
                name: name.clone(),
                estimate,
                std_error,
                z_value,
                p_value,
            }
        })
        .collect();

    let null_log_likelihood = null_log_likelihood(y);
    let pseudo_r_squared = if null_log_likelihood != 0.0 {
        1.0 - log_likelihood / null_log_likelihood
    } else {
        0.0
    };

    Ok(LogitSummary {
        coefficients,
        log_likelihood,
        null_log_likelihood,
        pseudo_r_squared,
        n_obs: n,
        iterations,
    })
}

fn fitted_probabilities(x: &DMatrix<f64>, beta: &DVector<f64>) -> DVector<f64> {
    let eta = x * beta;
    eta.map(|v| {
        let mu = 1.0 / (1.0 + (-v).exp());
        mu.clamp(MU_EPS, 1.0 - MU_EPS)
    })
}

fn log_likelihood_at(x: &DMatrix<f64>, y: &DVector<f64>, beta: &DVector<f64>) -> f64 {
    let mu = fitted_probabilities(x, beta);
    let mut ll = 0.0;
    for i in 0..y.len() {
        ll += y[i] * mu[i].ln() + (1.0 - y[i]) * (1.0 - mu[i]).ln();
    }
    ll
}

/// Log-likelihood of the intercept-only (null) model.
fn null_log_likelihood(y: &DVector<f64>) -> f64 {
    let n = y.len() as f64;
    let p_bar = y.sum() / n;
    if p_bar <= 0.0 || p_bar >= 1.0 {
        // Constant outcome: the null model fits perfectly.
        return 0.0;
    }
    n * (p_bar * p_bar.ln() + (1.0 - p_bar) * (1.0 - p_bar).ln())
}
