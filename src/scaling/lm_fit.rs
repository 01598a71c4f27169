//! Levenberg-Marquardt driver shared by the power-law and NPL fitters.
//!
//! A fitter describes its problem by implementing [`LeastSquaresProblem`] (residuals and
//! analytic Jacobian over owned `DVector`/`DMatrix` storage) plus [`ScalingProblem`], which
//! exposes the observed values needed for the log-space total sum of squares.
//! [`fit_problem`] then minimizes, and computes R squared, covariance and 1-sigma errors.
use crate::Utils::logger::init_logger;
use crate::scaling::fit_errors::FitError;
use crate::scaling::fit_result::FitResult;
use crate::scaling::fit_statistics::{
    covariance_or_zeros, log_total_sum_of_squares, parameter_errors, r_squared,
    residual_variance, sum_of_squares,
};
use crate::scaling::solver_settings::SolverSettings;
use levenberg_marquardt::LeastSquaresProblem;
use log::{debug, info, warn};
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, DVector, Dyn};

/// A least-squares scaling problem with dynamically sized residuals and parameters.
pub trait ScalingProblem:
    LeastSquaresProblem<
        f64,
        Dyn,
        Dyn,
        ResidualStorage = Owned<f64, Dyn>,
        JacobianStorage = Owned<f64, Dyn, Dyn>,
        ParameterStorage = Owned<f64, Dyn>,
    >
{
    /// name used in log messages
    fn name(&self) -> &str;
    /// observed dependent variable
    fn observed(&self) -> &[f64];
}

/// Checks shared by both fitters: settings, non-empty data, at least as many observations
/// as parameters.
pub(crate) fn check_problem_size(
    settings: &SolverSettings,
    n_observations: usize,
    n_params: usize,
) -> Result<(), FitError> {
    settings.validate()?;
    if n_observations == 0 {
        return Err(FitError::EmptyData);
    }
    if n_observations < n_params {
        return Err(FitError::Underdetermined {
            observations: n_observations,
            parameters: n_params,
        });
    }
    Ok(())
}

/// Minimize `problem` starting from its current parameters and assemble the fit statistics.
/// Input validation is done by the caller.
pub fn fit_problem<P: ScalingProblem>(problem: P, settings: &SolverSettings) -> FitResult {
    if let Some(level) = settings.loglevel.as_deref() {
        init_logger(Some(level));
    }
    let n_params = problem.params().len();
    let n_observations = problem.observed().len();
    info!(
        "{} fit: {} observations, {} parameters, initial guess {:?}",
        problem.name(),
        n_observations,
        n_params,
        problem.params().as_slice()
    );

    let LM = settings.build_solver();
    let (problem, report) = LM.minimize(problem);
    let converged = report.termination.was_successful();
    debug!(
        "termination: {:?}, evaluations: {}, final objective: {}",
        report.termination, report.number_of_evaluations, report.objective_function
    );
    if !converged {
        warn!(
            "{} fit did not converge: {:?}",
            problem.name(),
            report.termination
        );
    }

    let params = problem.params();
    let residuals = problem
        .residuals()
        .unwrap_or_else(|| DVector::from_element(n_observations, f64::NAN));
    let jacobian = problem
        .jacobian()
        .unwrap_or_else(|| DMatrix::from_element(n_observations, n_params, f64::NAN));

    let ss_err = sum_of_squares(&residuals);
    let ss_tot = log_total_sum_of_squares(problem.observed());
    let r2 = r_squared(ss_err, ss_tot);
    let covariance = covariance_or_zeros(&jacobian, n_params);
    let variance = residual_variance(ss_err, n_observations, n_params);
    if n_observations == n_params {
        warn!("no degrees of freedom left, parameter errors are set to zero");
    }
    let errors = parameter_errors(&covariance, variance);
    info!(
        "{} fit: params {:?}, errors {:?}, R^2 = {}",
        problem.name(),
        params.as_slice(),
        errors.as_slice(),
        r2
    );

    FitResult {
        params,
        errors,
        r_squared: r2,
        covariance,
        residuals,
        ss_err,
        ss_tot,
        residual_variance: variance,
        converged,
        termination: format!("{:?}", report.termination),
        number_of_evaluations: report.number_of_evaluations,
    }
}
