//! Scaling-law regression: power-law and non-power-law (NPL) fits of confinement data.
/// error type for argument and data validation
pub mod fit_errors;
/// fit result container: parameters, errors, R squared, covariance
pub mod fit_result;
/// sums of squares, R squared, covariance and 1-sigma errors of fitted parameters
pub mod fit_statistics;
/// Levenberg-Marquardt driver shared by both fitters
pub mod lm_fit;
/// non-powerlaw scaling of Murari et al. with saturation term in density and field
pub mod npl;
/// power-law scalings with arbitrary number of regressors, fitted in log space
pub mod powerlaw;
/// optional tolerances, iteration limits and log level for the solver
pub mod solver_settings;


pub use fit_errors::FitError;
pub use fit_result::FitResult;
pub use npl::{
    NPL, NPL_samples, PlasmaSamples, errfunct as npl_errfunct, fit_model as npl_fit_model,
    fit_model_with as npl_fit_model_with, hfactor, hfactor_samples,
};
pub use powerlaw::{
    errfunct as powerlaw_errfunct, fit_model as powerlaw_fit_model,
    fit_model_with as powerlaw_fit_model_with, linmodel, linmodel_at, logmodel, logmodel_at,
};
pub use solver_settings::SolverSettings;
