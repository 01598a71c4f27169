// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
//! Fitting of plasma confinement scaling laws.
//!
//! Two fitters are provided:
//! - [`scaling::powerlaw`]: log-linear power-law regression with any number of regressors,
//!   `log10(y) = log10(C) + a_1 log10(x_1) + a_2 log10(x_2) + ...`
//! - [`scaling::npl`]: non-power-law scaling of Murari et al. with a saturation term in
//!   density and field, `tau = C Ip^a1 R^a2 kappa^a3 P^a4 h(n, B)`
//!
//! Both run Levenberg-Marquardt least squares and return fitted parameters, 1-sigma errors,
//! R squared and the covariance matrix.
pub mod Examples;
pub mod Utils;
pub mod scaling;

/// version of the scaling toolkit
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
