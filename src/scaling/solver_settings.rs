use crate::scaling::fit_errors::FitError;
use levenberg_marquardt::LevenbergMarquardt;

/// Optional overrides of the Levenberg-Marquardt solver used by both fitters.
/// Every field left as `None` keeps the solver default
/// (ftol = xtol = 1.49012e-8, gtol = 0, patience = 100).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverSettings {
    pub max_iterations: Option<usize>, // patience: limit of residual evaluations is patience*(p+1)
    pub tolerance: Option<f64>,        // xtol
    pub f_tolerance: Option<f64>,
    pub g_tolerance: Option<f64>, // gradient tolerance
    pub scale_diag: Option<bool>,
    pub stepbound: Option<f64>,
    /// "debug", "info", "warn", "error", "off" or "none"; `None` leaves the logger alone
    pub loglevel: Option<String>,
}

impl SolverSettings {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_max_iterations(self, max_iterations: usize) -> Self {
        Self {
            max_iterations: Some(max_iterations),
            ..self
        }
    }
    pub fn with_tolerance(self, tolerance: f64) -> Self {
        Self {
            tolerance: Some(tolerance),
            ..self
        }
    }
    pub fn with_f_tolerance(self, f_tolerance: f64) -> Self {
        Self {
            f_tolerance: Some(f_tolerance),
            ..self
        }
    }
    pub fn with_g_tolerance(self, g_tolerance: f64) -> Self {
        Self {
            g_tolerance: Some(g_tolerance),
            ..self
        }
    }
    pub fn with_scale_diag(self, scale_diag: bool) -> Self {
        Self {
            scale_diag: Some(scale_diag),
            ..self
        }
    }
    pub fn with_stepbound(self, stepbound: f64) -> Self {
        Self {
            stepbound: Some(stepbound),
            ..self
        }
    }
    pub fn with_loglevel(self, loglevel: &str) -> Self {
        Self {
            loglevel: Some(loglevel.to_string()),
            ..self
        }
    }

    /// The solver builder asserts on bad values, so everything is checked here first.
    pub fn validate(&self) -> Result<(), FitError> {
        if let Some(max_iterations) = self.max_iterations {
            if max_iterations == 0 {
                return Err(FitError::InvalidSettings(
                    "Max iterations should be a positive number.".to_string(),
                ));
            }
        }
        for (name, tol) in [
            ("Tolerance", self.tolerance),
            ("Function tolerance", self.f_tolerance),
            ("Gradient tolerance", self.g_tolerance),
        ] {
            if let Some(tol) = tol {
                if !(tol >= 0.0) {
                    return Err(FitError::InvalidSettings(format!(
                        "{} should be a non-negative number, got {}.",
                        name, tol
                    )));
                }
            }
        }
        if let Some(stepbound) = self.stepbound {
            if !(stepbound > 0.0) {
                return Err(FitError::InvalidSettings(format!(
                    "Stepbound should be a positive number, got {}.",
                    stepbound
                )));
            }
        }
        if let Some(level) = &self.loglevel {
            if !matches!(
                level.as_str(),
                "debug" | "info" | "warn" | "error" | "off" | "none"
            ) {
                return Err(FitError::InvalidSettings(format!(
                    "loglevel must be debug, info, warn, error, off or none, got {}",
                    level
                )));
            }
        }
        Ok(())
    }

    /// Configured solver instance; call [`SolverSettings::validate`] first.
    pub fn build_solver(&self) -> LevenbergMarquardt<f64> {
        let LM = LevenbergMarquardt::new();
        let LM = if let Some(max_iterations) = self.max_iterations {
            LM.with_patience(max_iterations)
        } else {
            LM
        };
        let LM = if let Some(tolerance) = self.tolerance {
            LM.with_xtol(tolerance)
        } else {
            LM
        };
        let LM = if let Some(f_tolerance) = self.f_tolerance {
            LM.with_ftol(f_tolerance)
        } else {
            LM
        };
        let LM = if let Some(g_tolerance) = self.g_tolerance {
            LM.with_gtol(g_tolerance)
        } else {
            LM
        };
        let LM = if let Some(scale_diag) = self.scale_diag {
            LM.with_scale_diag(scale_diag)
        } else {
            LM
        };
        if let Some(stepbound) = self.stepbound {
            LM.with_stepbound(stepbound)
        } else {
            LM
        }
    }
}
