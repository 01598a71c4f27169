//! examples of usage of RustedScaling
/// power-law and NPL fits of synthetic confinement databases
pub mod scaling_examples;
