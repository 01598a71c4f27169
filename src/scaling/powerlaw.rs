//! Power-law scalings of confinement, pedestal parameters, etc.
//!
//! The model `y = C * x_1^a_1 * x_2^a_2 * ...` is fitted in log-log form
//!
//! ```text
//! log10(y) = log10(C) + a_1 log10(x_1) + a_2 log10(x_2) + ...
//! ```
//!
//! for any number of regressors. Parameters are ordered `[C, a_1, a_2, ...]` and the regressors
//! are passed as a slice of equally long sample slices, one per exponent.
//!
//! Example: fit `tau = C Ip^a1 P^a2`
//! ```
//! use RustedScaling::scaling::powerlaw::{fit_model, linmodel};
//! let Ip = vec![0.5, 0.8, 1.0, 1.2, 1.5, 2.0];
//! let P = vec![2.0, 1.0, 4.0, 3.0, 8.0, 5.0];
//! let tau = linmodel(&[0.05, 0.9, -0.6], &[&Ip, &P]).unwrap();
//! let result = fit_model(tau.as_slice(), &[0.1, 1.0, -0.5], &[&Ip, &P]).unwrap();
//! assert!((result.params[1] - 0.9).abs() < 1e-6);
//! assert!(result.r_squared > 0.999999);
//! ```
use crate::scaling::fit_errors::{FitError, check_arity, check_positive};
use crate::scaling::fit_result::FitResult;
use crate::scaling::lm_fit::{ScalingProblem, check_problem_size, fit_problem};
use crate::scaling::solver_settings::SolverSettings;
use levenberg_marquardt::LeastSquaresProblem;
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, DVector, Dyn};
use std::f64::consts::LN_10;

/// every regressor must have `n` samples
fn check_regressors(n: usize, xs: &[&[f64]]) -> Result<(), FitError> {
    for (i, x) in xs.iter().enumerate() {
        if x.len() != n {
            return Err(FitError::LengthMismatch {
                variable: format!("x{}", i),
                expected: n,
                found: x.len(),
            });
        }
    }
    Ok(())
}

/// number of samples of the regressors, 1 for a constant model without regressors
fn sample_count(xs: &[&[f64]]) -> Result<usize, FitError> {
    let n = xs.first().map_or(1, |x| x.len());
    check_regressors(n, xs)?;
    Ok(n)
}

/// log-model value at sample `j`, arity and lengths must be checked already
fn log_value(params: &[f64], xs: &[&[f64]], j: usize) -> f64 {
    params[0].log10()
        + xs
            .iter()
            .zip(params[1..].iter())
            .map(|(x, a)| a * x[j].log10())
            .sum::<f64>()
}

/// Log-linear model with variable-length inputs:
/// `log10(params[0]) + Σ params[i+1] * log10(xs[i])` for every sample.
/// `xs.len()` must be `params.len() - 1`.
pub fn logmodel(params: &[f64], xs: &[&[f64]]) -> Result<DVector<f64>, FitError> {
    check_arity(params.len(), xs.len())?;
    let n = sample_count(xs)?;
    Ok(DVector::from_iterator(
        n,
        (0..n).map(|j| log_value(params, xs, j)),
    ))
}

/// [`logmodel`] at a single point, one value per regressor.
pub fn logmodel_at(params: &[f64], x: &[f64]) -> Result<f64, FitError> {
    check_arity(params.len(), x.len())?;
    let mut fitfunc = params[0].log10();
    for (xi, a) in x.iter().zip(params[1..].iter()) {
        fitfunc += a * xi.log10();
    }
    Ok(fitfunc)
}

/// Linear-space form of [`logmodel`]: `params[0] * Π xs[i]^params[i+1]` for every sample.
pub fn linmodel(params: &[f64], xs: &[&[f64]]) -> Result<DVector<f64>, FitError> {
    check_arity(params.len(), xs.len())?;
    let n = sample_count(xs)?;
    Ok(DVector::from_iterator(
        n,
        (0..n).map(|j| {
            xs.iter()
                .zip(params[1..].iter())
                .fold(params[0], |acc, (x, a)| acc * x[j].powf(*a))
        }),
    ))
}

/// [`linmodel`] at a single point, one value per regressor.
pub fn linmodel_at(params: &[f64], x: &[f64]) -> Result<f64, FitError> {
    check_arity(params.len(), x.len())?;
    Ok(x.iter()
        .zip(params[1..].iter())
        .fold(params[0], |acc, (xi, a)| acc * xi.powf(*a)))
}

/// Residuals minimized by the fit: `log10(ydata) - logmodel(params, regressors)`.
/// `args` holds the regressors followed by the observed data, so `args.len()` must equal
/// `params.len()`.
pub fn errfunct(params: &[f64], args: &[&[f64]]) -> Result<DVector<f64>, FitError> {
    if args.len() != params.len() {
        return Err(FitError::ArityMismatch {
            expected: params.len(),
            found: args.len(),
        });
    }
    let (ydata, xs) = args.split_last().ok_or(FitError::ArityMismatch {
        expected: params.len(),
        found: 0,
    })?;
    check_regressors(ydata.len(), xs)?;
    Ok(DVector::from_iterator(
        ydata.len(),
        ydata
            .iter()
            .enumerate()
            .map(|(j, y)| y.log10() - log_value(params, xs, j)),
    ))
}

/// Log-space power-law problem for the Levenberg-Marquardt solver.
struct PowerLawProblem<'a> {
    params: DVector<f64>,
    xs: &'a [&'a [f64]],
    values: &'a [f64],
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for PowerLawProblem<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, x: &DVector<f64>) {
        self.params.copy_from(x);
    }

    fn params(&self) -> DVector<f64> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        let params = self.params.as_slice();
        Some(DVector::from_iterator(
            self.values.len(),
            self.values
                .iter()
                .enumerate()
                .map(|(j, y)| y.log10() - log_value(params, self.xs, j)),
        ))
    }

    /// dr/dC = -1/(C ln10), dr/da_i = -log10(x_i)
    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let n = self.values.len();
        let p = self.params.len();
        let dC = -1.0 / (self.params[0] * LN_10);
        let mut jac = DMatrix::zeros(n, p);
        for j in 0..n {
            jac[(j, 0)] = dC;
            for (i, x) in self.xs.iter().enumerate() {
                jac[(j, i + 1)] = -x[j].log10();
            }
        }
        Some(jac)
    }
}

impl ScalingProblem for PowerLawProblem<'_> {
    fn name(&self) -> &str {
        "power-law"
    }

    fn observed(&self) -> &[f64] {
        self.values
    }
}

/// Least-squares power-law fit of `values` against the regressors `xs`, starting from `guesses`.
/// `xs.len()` must be `guesses.len() - 1`; all samples must be positive.
///
/// Returns fitted parameters, their 1-sigma errors, R squared (log space) and the covariance.
pub fn fit_model(values: &[f64], guesses: &[f64], xs: &[&[f64]]) -> Result<FitResult, FitError> {
    fit_model_with(values, guesses, xs, &SolverSettings::default())
}

/// [`fit_model`] with explicit solver settings.
pub fn fit_model_with(
    values: &[f64],
    guesses: &[f64],
    xs: &[&[f64]],
    settings: &SolverSettings,
) -> Result<FitResult, FitError> {
    check_arity(guesses.len(), xs.len())?;
    check_problem_size(settings, values.len(), guesses.len())?;
    check_regressors(values.len(), xs)?;
    for (i, x) in xs.iter().enumerate() {
        check_positive(&[(format!("x{}", i).as_str(), *x)])?;
    }
    check_positive(&[("values", values)])?;

    let problem = PowerLawProblem {
        params: DVector::from_column_slice(guesses),
        xs,
        values,
    };
    Ok(fit_problem(problem, settings))
}
