// fmgc-vnav/src/vnav/errors.rs

use crate::parameters::ParametersError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ProfileComputationError {
    #[error("No legs in flight plan")]
    NoLegs,
    #[error(transparent)]
    Parameters(#[from] ParametersError),
}
