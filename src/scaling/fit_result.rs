use nalgebra::{DMatrix, DVector};

/// Result of a least-squares scaling fit. Computed once per call, owned by the caller.
#[derive(Debug, Clone)]
pub struct FitResult {
    /// least-squares optimized model parameters
    pub params: DVector<f64>,
    /// 1-sigma errorbars for parameters
    pub errors: DVector<f64>,
    /// R squared coefficient of determination, total sum of squares taken in log space
    pub r_squared: f64,
    /// unscaled covariance (J^T J)^-1 at the solution, zero matrix if J is rank deficient
    pub covariance: DMatrix<f64>,
    /// residuals at the solution
    pub residuals: DVector<f64>,
    pub ss_err: f64,
    pub ss_tot: f64,
    /// ss_err / (N - p), not finite when there are no degrees of freedom
    pub residual_variance: f64,
    /// solver termination reached a minimizer (residuals zero, gtol or ftol/xtol criterion)
    pub converged: bool,
    /// solver termination reason as reported by Levenberg-Marquardt
    pub termination: String,
    pub number_of_evaluations: usize,
}

impl FitResult {
    /// Covariance weighted by the residual variance, the one the 1-sigma errors come from.
    pub fn scaled_covariance(&self) -> DMatrix<f64> {
        &self.covariance * self.residual_variance
    }

    pub fn degrees_of_freedom(&self) -> usize {
        self.residuals.len().saturating_sub(self.params.len())
    }

    /// (params, errors, r2, covariance)
    pub fn into_parts(self) -> (DVector<f64>, DVector<f64>, f64, DMatrix<f64>) {
        (self.params, self.errors, self.r_squared, self.covariance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> FitResult {
        FitResult {
            params: DVector::from_vec(vec![1.0, 2.0]),
            errors: DVector::from_vec(vec![0.1, 0.2]),
            r_squared: 0.9,
            covariance: DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.5, 4.0]),
            residuals: DVector::from_vec(vec![0.1, -0.1, 0.1, -0.1]),
            ss_err: 0.04,
            ss_tot: 0.4,
            residual_variance: 0.02,
            converged: true,
            termination: "ResidualsZero".to_string(),
            number_of_evaluations: 3,
        }
    }

    #[test]
    fn scaled_covariance_and_parts() {
        let result = sample();
        assert!(result.converged);
        assert_eq!(result.degrees_of_freedom(), 2);
        let scaled = result.scaled_covariance();
        assert_relative_eq!(scaled[(1, 1)], 0.08, epsilon = 1e-15);
        assert_relative_eq!(scaled[(0, 1)], 0.01, epsilon = 1e-15);
        let (params, errors, r2, cov) = result.into_parts();
        assert_eq!(params.len(), 2);
        assert_eq!(errors[1], 0.2);
        assert_eq!(r2, 0.9);
        assert_eq!(cov.shape(), (2, 2));
    }
}
