use crate::scaling::fit_errors::FitError;
use crate::scaling::fit_result::FitResult;
use crate::scaling::npl::{NPL_samples, PlasmaSamples};
use crate::scaling::powerlaw::linmodel;
use crate::scaling::solver_settings::SolverSettings;
use crate::scaling::{npl_fit_model_with, powerlaw_fit_model_with};

/// Deterministic spread of `n` samples over [lo, hi] on a log scale (golden-ratio sequence
/// with a different offset for every variable, so that regressors are not collinear).
pub fn synthetic_samples(lo: f64, hi: f64, n: usize, offset: f64) -> Vec<f64> {
    const GOLDEN: f64 = 0.618_033_988_749_894_9;
    (0..n)
        .map(|i| {
            let u = (offset + GOLDEN * (i as f64) * (1.0 + offset)).fract();
            lo * (hi / lo).powf(u)
        })
        .collect()
}

/// Ip, R, kappa, P, n, B of a synthetic multi-machine database
pub fn synthetic_database(n: usize) -> [Vec<f64>; 6] {
    [
        synthetic_samples(0.4, 2.5, n, 0.11),
        synthetic_samples(0.6, 6.2, n, 0.37),
        synthetic_samples(1.0, 1.9, n, 0.59),
        synthetic_samples(0.5, 40.0, n, 0.73),
        synthetic_samples(1.5, 12.0, n, 0.29),
        synthetic_samples(1.0, 5.5, n, 0.87),
    ]
}

fn print_fit(names: &[&str], result: &FitResult) {
    for (i, name) in names.iter().enumerate() {
        println!(
            "{:>6} = {:>10.5} +/- {:.2e}",
            name, result.params[i], result.errors[i]
        );
    }
    println!(
        "R^2 = {}, converged: {} ({}), evaluations: {}",
        result.r_squared, result.converged, result.termination, result.number_of_evaluations
    );
}

pub fn scaling_examples(example: usize) -> Result<FitResult, FitError> {
    let settings = SolverSettings::new().with_loglevel("warn");
    match example {
        0 => {
            // IPB98(y,2)-like power law tau = C Ip^a1 B^a2 n^a3 P^a4 R^a5 kappa^a6
            let [Ip, R, kappa, P, n, B] = synthetic_database(100);
            let truth = [0.0562, 0.93, 0.15, 0.41, -0.69, 1.97, 0.78];
            let xs: [&[f64]; 6] = [&Ip, &B, &n, &P, &R, &kappa];
            let tau = linmodel(&truth, &xs)?;
            let guesses = [0.1, 1.0, 0.0, 0.5, -0.5, 2.0, 1.0];
            let result = powerlaw_fit_model_with(tau.as_slice(), &guesses, &xs, &settings)?;
            print_fit(&["C", "Ip", "B", "n", "P", "R", "kappa"], &result);
            Ok(result)
        }
        1 => {
            // non-powerlaw scaling with saturation in n/B
            let [Ip, R, kappa, P, n, B] = synthetic_database(100);
            let data = PlasmaSamples::new(&Ip, &R, &kappa, &P, &n, &B);
            let truth = [0.06, 0.9, 1.8, 0.7, -0.6, 0.4, 0.5, 1.1];
            let tau = NPL_samples(&truth, &data)?;
            let guesses = [0.065, 0.85, 1.7, 0.75, -0.55, 0.45, 0.55, 1.0];
            let settings = settings.with_max_iterations(1000);
            let result = npl_fit_model_with(&guesses, &data, tau.as_slice(), &settings)?;
            print_fit(&["C", "a1", "a2", "a3", "a4", "a5", "a6", "a7"], &result);
            Ok(result)
        }
        _ => Err(FitError::InvalidSettings(format!(
            "no scaling example number {}",
            example
        ))),
    }
}
