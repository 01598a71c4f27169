use std::fmt;

/// Error types for scaling-law fitting. All of them are raised before any numeric work starts.
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    /// number of independent variables does not match the parameter count
    ArityMismatch { expected: usize, found: usize },
    /// one of the sequences has a different length than the others
    LengthMismatch {
        variable: String,
        expected: usize,
        found: usize,
    },
    /// log-space fitting needs strictly positive finite samples
    NonPositiveData {
        variable: String,
        index: usize,
        value: f64,
    },
    EmptyData,
    /// fewer observations than parameters
    Underdetermined {
        observations: usize,
        parameters: usize,
    },
    InvalidSettings(String),
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FitError::ArityMismatch { expected, found } => write!(
                f,
                "number of input arguments does not match parameter count: expected {}, found {}",
                expected, found
            ),
            FitError::LengthMismatch {
                variable,
                expected,
                found,
            } => write!(
                f,
                "length of {} is {}, expected {} as for the other inputs",
                variable, found, expected
            ),
            FitError::NonPositiveData {
                variable,
                index,
                value,
            } => write!(
                f,
                "{}[{}] = {} but all samples must be positive and finite",
                variable, index, value
            ),
            FitError::EmptyData => write!(f, "no observations to fit"),
            FitError::Underdetermined {
                observations,
                parameters,
            } => write!(
                f,
                "{} observations cannot determine {} parameters",
                observations, parameters
            ),
            FitError::InvalidSettings(msg) => write!(f, "Invalid solver settings: {}", msg),
        }
    }
}

impl std::error::Error for FitError {}

/// Check that `found` independent variables fit a parameter vector of length `n_params`
/// (scale constant plus one exponent per variable).
pub(crate) fn check_arity(n_params: usize, found: usize) -> Result<(), FitError> {
    let expected = n_params.saturating_sub(1);
    if n_params == 0 || found != expected {
        return Err(FitError::ArityMismatch { expected, found });
    }
    Ok(())
}

/// Check that every named sequence has length `expected`.
pub(crate) fn check_lengths(
    expected: usize,
    columns: &[(&str, &[f64])],
) -> Result<(), FitError> {
    for (name, column) in columns {
        if column.len() != expected {
            return Err(FitError::LengthMismatch {
                variable: name.to_string(),
                expected,
                found: column.len(),
            });
        }
    }
    Ok(())
}

/// Check that every sample of every named sequence is a positive finite number.
pub(crate) fn check_positive(columns: &[(&str, &[f64])]) -> Result<(), FitError> {
    for (name, column) in columns {
        if let Some((index, &value)) = column
            .iter()
            .enumerate()
            .find(|(_, v)| !(v.is_finite() && **v > 0.0))
        {
            return Err(FitError::NonPositiveData {
                variable: name.to_string(),
                index,
                value,
            });
        }
    }
    Ok(())
}
