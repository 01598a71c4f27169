//! Goodness-of-fit and error propagation for the scaling fits.
//!
//! - `ss_err = Σ r_i^2` over the final residuals
//! - `ss_tot = Σ (log10(v_i) - log10(mean(v)))^2`, always in log space
//! - `R^2 = 1 - ss_err / ss_tot`
//! - `cov = (J^T J)^-1` at the solution, `var_k = cov_kk * ss_err / (N - p)`, `err_k = sqrt(var_k)`
use log::warn;
use nalgebra::{DMatrix, DVector};

/// sum of squared residuals
pub fn sum_of_squares(residuals: &DVector<f64>) -> f64 {
    residuals.iter().map(|r| r * r).sum::<f64>()
}

/// Total sum of squares of the observed values in log space, taken around log10 of their mean.
pub fn log_total_sum_of_squares(values: &[f64]) -> f64 {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let log_mean = mean.log10();
    values
        .iter()
        .map(|v| (v.log10() - log_mean).powi(2))
        .sum::<f64>()
}

pub fn r_squared(ss_err: f64, ss_tot: f64) -> f64 {
    1.0 - ss_err / ss_tot
}

/// `ss_err / (N - p)`. With no degrees of freedom this is `inf` (or `NaN` for a perfect fit),
/// which [`parameter_errors`] turns into zero errors.
pub fn residual_variance(ss_err: f64, n_observations: usize, n_params: usize) -> f64 {
    let dof = n_observations as f64 - n_params as f64;
    ss_err / dof
}

/// Unscaled parameter covariance `(J^T J)^-1` from the SVD of the Jacobian: `V S^-2 V^T`.
/// Returns `None` when J is rank deficient (relative singular value cut-off `eps * max(m, n)`).
pub fn covariance_from_jacobian(jacobian: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let (m, n) = jacobian.shape();
    if m < n || n == 0 {
        return None;
    }
    if !jacobian.iter().all(|v| v.is_finite()) {
        return None;
    }
    let svd = jacobian.clone().svd(false, true);
    let v_t = svd.v_t?;
    let sigma = &svd.singular_values;
    let sigma_max = sigma.iter().cloned().fold(0.0, f64::max);
    let cutoff = f64::EPSILON * (m.max(n) as f64) * sigma_max;
    if sigma_max == 0.0 || sigma.iter().any(|s| *s <= cutoff) {
        return None;
    }
    let inv_sigma2 = DMatrix::from_diagonal(&sigma.map(|s| 1.0 / (s * s)));
    let cov = v_t.transpose() * inv_sigma2 * v_t;
    if cov.iter().all(|v| v.is_finite()) {
        Some(cov)
    } else {
        None
    }
}

/// Covariance of the solver stage, or the `p x p` zero matrix when it cannot be estimated.
pub fn covariance_or_zeros(jacobian: &DMatrix<f64>, n_params: usize) -> DMatrix<f64> {
    match covariance_from_jacobian(jacobian) {
        Some(cov) => cov,
        None => {
            warn!(
                "covariance could not be estimated (singular jacobian {:?}), using zero matrix",
                jacobian.shape()
            );
            DMatrix::zeros(n_params, n_params)
        }
    }
}

/// 1-sigma error from a parameter variance. Variances that are not finite or not positive
/// (zero degrees of freedom, zero covariance fallback) give a zero error.
pub fn standard_error(variance: f64) -> f64 {
    if variance.is_finite() && variance > 0.0 {
        variance.sqrt()
    } else {
        0.0
    }
}

/// 1-sigma errors from the diagonal of the covariance weighted by the residual variance.
pub fn parameter_errors(covariance: &DMatrix<f64>, residual_variance: f64) -> DVector<f64> {
    let n = covariance.nrows().min(covariance.ncols());
    DVector::from_iterator(
        n,
        (0..n).map(|i| standard_error(covariance[(i, i)] * residual_variance)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn log_total_sum_of_squares_uses_log_of_mean() {
        let values = [1.0, 10.0, 100.0];
        let log_mean = (111.0_f64 / 3.0).log10();
        let expected = (0.0 - log_mean).powi(2) + (1.0 - log_mean).powi(2) + (2.0 - log_mean).powi(2);
        assert_relative_eq!(log_total_sum_of_squares(&values), expected, epsilon = 1e-12);
        assert_eq!(log_total_sum_of_squares(&[3.0, 3.0]), 0.0);
    }

    #[test]
    fn r_squared_and_variance() {
        assert_relative_eq!(r_squared(0.5, 2.0), 0.75);
        assert_relative_eq!(residual_variance(0.5, 7, 2), 0.1);
        assert!(residual_variance(0.5, 2, 2).is_infinite());
        assert!(residual_variance(0.0, 2, 2).is_nan());
    }

    #[test]
    fn covariance_of_linear_jacobian() {
        // y = a + b x on x = [0, 1, 2]: J^T J = [[3, 3], [3, 5]], inverse = [[5, -3], [-3, 3]] / 6
        let jac = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let cov = covariance_from_jacobian(&jac).unwrap();
        assert_relative_eq!(cov[(0, 0)], 5.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(cov[(0, 1)], -0.5, epsilon = 1e-12);
        assert_relative_eq!(cov[(1, 0)], -0.5, epsilon = 1e-12);
        assert_relative_eq!(cov[(1, 1)], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn singular_jacobian_gives_zero_covariance() {
        let jac = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 2.0, 4.0, 3.0, 6.0]);
        assert!(covariance_from_jacobian(&jac).is_none());
        let cov = covariance_or_zeros(&jac, 2);
        assert_eq!(cov, DMatrix::zeros(2, 2));
        let errors = parameter_errors(&cov, 0.3);
        assert_eq!(errors, DVector::zeros(2));
    }

    #[test]
    fn errors_fall_back_to_zero() {
        assert_eq!(standard_error(f64::INFINITY), 0.0);
        assert_eq!(standard_error(f64::NAN), 0.0);
        assert_eq!(standard_error(-1e-20), 0.0);
        assert_relative_eq!(standard_error(0.04), 0.2);
        let cov = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 9.0]);
        let errors = parameter_errors(&cov, 0.25);
        assert_relative_eq!(errors[0], 1.0);
        assert_relative_eq!(errors[1], 1.5);
        let errors = parameter_errors(&cov, f64::INFINITY);
        assert_eq!(errors, DVector::zeros(2));
    }
}
