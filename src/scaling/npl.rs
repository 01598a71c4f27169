//! Non-powerlaw (NPL) scaling of the energy confinement time derived by Murari et al.
//!
//! ```text
//! NPL = C * Ip^a1 * R^a2 * kappa^a3 * P^a4 * h(n, B)
//! h(n, B) = n^a5 * (1 + exp(a6 * (n/B)^a7))^-1
//! ```
//!
//! where h(n, B) is a saturation term introduced to break the powerlaw symmetry.
//! Parameters are ordered `[C, a1, a2, a3, a4, a5, a6, a7]`; units are
//! Ip [MA], R [m], kappa [-], P [MW], n [10^19 m^-3], B [T], tau [s].
//!
//! Unlike the power-law fit, residuals `tau - NPL` are minimized in linear space.
use crate::scaling::fit_errors::{FitError, check_lengths, check_positive};
use crate::scaling::fit_result::FitResult;
use crate::scaling::lm_fit::{ScalingProblem, check_problem_size, fit_problem};
use crate::scaling::solver_settings::SolverSettings;
use levenberg_marquardt::LeastSquaresProblem;
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, DVector, Dyn};

/// `[C, a1, a2, a3, a4, a5, a6, a7]`
pub const NPL_PARAM_COUNT: usize = 8;

/// Engineering parameters of a set of discharges, all slices of the same length.
#[derive(Debug, Clone, Copy)]
pub struct PlasmaSamples<'a> {
    /// plasma current [MA]
    pub Ip: &'a [f64],
    /// plasma major radius [m]
    pub R: &'a [f64],
    /// plasma elongation (dimensionless)
    pub kappa: &'a [f64],
    /// heating power [MW]
    pub P: &'a [f64],
    /// plasma average density [10^19 m^-3]
    pub n: &'a [f64],
    /// axial toroidal field [T]
    pub B: &'a [f64],
}

impl<'a> PlasmaSamples<'a> {
    pub fn new(
        Ip: &'a [f64],
        R: &'a [f64],
        kappa: &'a [f64],
        P: &'a [f64],
        n: &'a [f64],
        B: &'a [f64],
    ) -> Self {
        PlasmaSamples {
            Ip,
            R,
            kappa,
            P,
            n,
            B,
        }
    }

    fn columns(&self) -> [(&'static str, &'a [f64]); 6] {
        [
            ("Ip", self.Ip),
            ("R", self.R),
            ("kappa", self.kappa),
            ("P", self.P),
            ("n", self.n),
            ("B", self.B),
        ]
    }

    /// Number of discharges; every variable must have the same length as `Ip`.
    pub fn len(&self) -> Result<usize, FitError> {
        let n = self.Ip.len();
        check_lengths(n, &self.columns())?;
        Ok(n)
    }

    pub fn is_empty(&self) -> bool {
        self.Ip.is_empty()
    }

    /// all samples positive and finite
    pub fn check_positive(&self) -> Result<(), FitError> {
        check_positive(&self.columns())
    }

    /// `(Ip, R, kappa, P, n, B)` of discharge `j`
    fn at(&self, j: usize) -> (f64, f64, f64, f64, f64, f64) {
        (
            self.Ip[j],
            self.R[j],
            self.kappa[j],
            self.P[j],
            self.n[j],
            self.B[j],
        )
    }
}

/// Suppression term used in NPL: `n^h0 * (1 + exp(h1 * (n/B)^h2))^-1`.
pub fn hfactor(hparams: &[f64; 3], n: f64, B: f64) -> f64 {
    n.powf(hparams[0]) / (1.0 + (hparams[1] * (n / B).powf(hparams[2])).exp())
}

/// [`hfactor`] applied elementwise; `n` and `B` must have the same length.
pub fn hfactor_samples(hparams: &[f64; 3], n: &[f64], B: &[f64]) -> Result<DVector<f64>, FitError> {
    check_lengths(n.len(), &[("B", B)])?;
    Ok(DVector::from_iterator(
        n.len(),
        n.iter().zip(B.iter()).map(|(n, B)| hfactor(hparams, *n, *B)),
    ))
}

fn hparams_of(params: &[f64; 8]) -> [f64; 3] {
    [params[5], params[6], params[7]]
}

/// Energy confinement time of the non-powerlaw scaling for one discharge.
pub fn NPL(params: &[f64; 8], Ip: f64, R: f64, kappa: f64, P: f64, n: f64, B: f64) -> f64 {
    let h = hfactor(&hparams_of(params), n, B);
    params[0]
        * Ip.powf(params[1])
        * R.powf(params[2])
        * kappa.powf(params[3])
        * P.powf(params[4])
        * h
}

/// [`NPL`] for every discharge of `data`.
pub fn NPL_samples(params: &[f64; 8], data: &PlasmaSamples) -> Result<DVector<f64>, FitError> {
    let len = data.len()?;
    Ok(DVector::from_iterator(
        len,
        (0..len).map(|j| {
            let (Ip, R, kappa, P, n, B) = data.at(j);
            NPL(params, Ip, R, kappa, P, n, B)
        }),
    ))
}

/// Residuals of the measured confinement time versus the model, `tau - NPL` (linear space).
pub fn errfunct(params: &[f64; 8], data: &PlasmaSamples, tau: &[f64]) -> Result<DVector<f64>, FitError> {
    let model = NPL_samples(params, data)?;
    check_lengths(model.len(), &[("tau", tau)])?;
    Ok(DVector::from_iterator(
        tau.len(),
        tau.iter().zip(model.iter()).map(|(t, m)| t - m),
    ))
}

struct NPLProblem<'a> {
    params: DVector<f64>,
    data: PlasmaSamples<'a>,
    values: &'a [f64],
}

impl NPLProblem<'_> {
    fn current(&self) -> [f64; 8] {
        let mut p = [0.0; 8];
        p.copy_from_slice(self.params.as_slice());
        p
    }
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for NPLProblem<'_> {
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
        let params = self.current();
        Some(DVector::from_iterator(
            self.values.len(),
            self.values.iter().enumerate().map(|(j, tau)| {
                let (Ip, R, kappa, P, n, B) = self.data.at(j);
                tau - NPL(&params, Ip, R, kappa, P, n, B)
            }),
        ))
    }

    // with s = (1 + exp(u))^-1, u = a6 q^a7, q = n/B:
    // d/dC = NPL/C, d/da_k = NPL ln(x_k), d/da6 = -NPL (1-s) q^a7, d/da7 = -NPL (1-s) u ln(q)
    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let p = self.current();
        let m = self.values.len();
        let mut jac = DMatrix::zeros(m, NPL_PARAM_COUNT);
        for j in 0..m {
            let (Ip, R, kappa, P, n, B) = self.data.at(j);
            let model = NPL(&p, Ip, R, kappa, P, n, B);
            let q = n / B;
            let q_a7 = q.powf(p[7]);
            let u = p[6] * q_a7;
            let s = 1.0 / (1.0 + u.exp());
            let model_over_c = Ip.powf(p[1])
                * R.powf(p[2])
                * kappa.powf(p[3])
                * P.powf(p[4])
                * hfactor(&hparams_of(&p), n, B);
            let dmodel = [
                model_over_c,
                model * Ip.ln(),
                model * R.ln(),
                model * kappa.ln(),
                model * P.ln(),
                model * n.ln(),
                -model * (1.0 - s) * q_a7,
                -model * (1.0 - s) * u * q.ln(),
            ];
            // residual is tau - NPL
            for (k, d) in dmodel.iter().enumerate() {
                jac[(j, k)] = -d;
            }
        }
        Some(jac)
    }
}

impl ScalingProblem for NPLProblem<'_> {
    fn name(&self) -> &str {
        "NPL"
    }

    fn observed(&self) -> &[f64] {
        self.values
    }
}

/// Least-squares fit of the measured confinement times `values` with the NPL model,
/// starting from `guesses`.
///
/// Returns fitted parameters, their 1-sigma errors, R squared and the covariance.
/// The total sum of squares for R squared is taken in log space while the residuals are linear.
pub fn fit_model(
    guesses: &[f64; 8],
    data: &PlasmaSamples,
    values: &[f64],
) -> Result<FitResult, FitError> {
    fit_model_with(guesses, data, values, &SolverSettings::default())
}

/// [`fit_model`] with explicit solver settings.
pub fn fit_model_with(
    guesses: &[f64; 8],
    data: &PlasmaSamples,
    values: &[f64],
    settings: &SolverSettings,
) -> Result<FitResult, FitError> {
    let len = data.len()?;
    check_lengths(len, &[("values", values)])?;
    check_problem_size(settings, len, NPL_PARAM_COUNT)?;
    data.check_positive()?;
    check_positive(&[("values", values)])?;

    let problem = NPLProblem {
        params: DVector::from_column_slice(guesses),
        data: *data,
        values,
    };
    Ok(fit_problem(problem, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TRUE_PARAMS: [f64; 8] = [0.06, 0.9, 1.8, 0.7, -0.6, 0.4, 0.5, 1.1];

    #[test]
    fn hfactor_formula() {
        let h = hfactor(&[0.5, 1.0, 2.0], 4.0, 2.0);
        assert_relative_eq!(h, 2.0 / (1.0 + 4.0f64.exp()), epsilon = 1e-15);
        // no saturation when a6 = 0: h = n^a5 / 2
        assert_relative_eq!(hfactor(&[1.0, 0.0, 3.0], 6.0, 1.0), 3.0, epsilon = 1e-15);
    }

    #[test]
    fn hfactor_decreases_with_a6() {
        let (n, B) = (5.0, 2.5);
        let mut previous = f64::INFINITY;
        for k in 0..20 {
            let a6 = -2.0 + 0.25 * k as f64;
            let h = hfactor(&[0.4, a6, 1.3], n, B);
            assert!(h < previous, "h({}) = {} not below {}", a6, h, previous);
            previous = h;
        }
    }

    #[test]
    fn hfactor_samples_elementwise() {
        let n = [1.0, 2.0, 3.0];
        let B = [2.0, 2.0, 1.0];
        let hp = [0.3, 0.7, 1.2];
        let h = hfactor_samples(&hp, &n, &B).unwrap();
        for j in 0..3 {
            assert_relative_eq!(h[j], hfactor(&hp, n[j], B[j]));
        }
        assert!(matches!(
            hfactor_samples(&hp, &n, &B[..2]),
            Err(FitError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn npl_is_power_law_times_hfactor() {
        let p = TRUE_PARAMS;
        let value = NPL(&p, 1.2, 1.7, 1.6, 3.0, 5.0, 2.2);
        let expected = 0.06
            * 1.2f64.powf(0.9)
            * 1.7f64.powf(1.8)
            * 1.6f64.powf(0.7)
            * 3.0f64.powf(-0.6)
            * hfactor(&[0.4, 0.5, 1.1], 5.0, 2.2);
        assert_relative_eq!(value, expected, max_relative = 1e-14);
    }

    #[test]
    fn errfunct_of_exact_data_is_zero() {
        let Ip = [1.0, 1.5];
        let R = [1.6, 3.0];
        let kappa = [1.7, 1.8];
        let P = [2.0, 10.0];
        let n = [3.0, 8.0];
        let B = [2.0, 5.3];
        let data = PlasmaSamples::new(&Ip, &R, &kappa, &P, &n, &B);
        let tau = NPL_samples(&TRUE_PARAMS, &data).unwrap();
        let resid = errfunct(&TRUE_PARAMS, &data, tau.as_slice()).unwrap();
        assert!(resid.iter().all(|r| r.abs() < 1e-15));
        assert!(matches!(
            errfunct(&TRUE_PARAMS, &data, &[1.0]),
            Err(FitError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn mismatched_samples_are_rejected() {
        let a = [1.0, 2.0];
        let b = [1.0, 2.0, 3.0];
        let data = PlasmaSamples::new(&a, &a, &a, &a, &b, &a);
        match data.len() {
            Err(FitError::LengthMismatch { variable, .. }) => assert_eq!(variable, "n"),
            other => panic!("expected LengthMismatch, got {:?}", other),
        }
        assert!(fit_model(&TRUE_PARAMS, &data, &a).is_err());
    }

    #[test]
    fn fit_rejects_bad_input_before_solving() {
        let x: Vec<f64> = (1..=5).map(|i| i as f64).collect();
        let data = PlasmaSamples::new(&x, &x, &x, &x, &x, &x);
        // 5 discharges for 8 parameters
        assert_eq!(
            fit_model(&TRUE_PARAMS, &data, &x).unwrap_err(),
            FitError::Underdetermined {
                observations: 5,
                parameters: 8
            }
        );
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let data = PlasmaSamples::new(&x, &x, &x, &x, &x, &x);
        let values = vec![1.0; 10];
        assert!(matches!(
            fit_model(&TRUE_PARAMS, &data, &values),
            Err(FitError::NonPositiveData { index: 0, .. })
        ));
    }

    #[test]
    fn jacobian_matches_finite_differences() {
        let Ip = [0.8, 1.1, 1.9];
        let R = [1.7, 2.4, 6.2];
        let kappa = [1.5, 1.7, 1.85];
        let P = [1.0, 4.0, 30.0];
        let n = [2.0, 6.0, 9.5];
        let B = [5.4, 2.0, 5.3];
        let values = [0.05, 0.1, 2.0];
        let mut problem = NPLProblem {
            params: DVector::from_column_slice(&TRUE_PARAMS),
            data: PlasmaSamples::new(&Ip, &R, &kappa, &P, &n, &B),
            values: &values,
        };
        let analytic = problem.jacobian().unwrap();
        let base = problem.params();
        let h = 1e-7;
        for k in 0..NPL_PARAM_COUNT {
            let mut shifted = base.clone();
            shifted[k] += h;
            problem.set_params(&shifted);
            let up = problem.residuals().unwrap();
            shifted[k] -= 2.0 * h;
            problem.set_params(&shifted);
            let down = problem.residuals().unwrap();
            for j in 0..values.len() {
                let numeric = (up[j] - down[j]) / (2.0 * h);
                assert_relative_eq!(analytic[(j, k)], numeric, epsilon = 1e-6, max_relative = 1e-5);
            }
        }
    }
}
