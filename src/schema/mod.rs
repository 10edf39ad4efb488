use thiserror::Error;

pub mod prediction_response;
pub mod user_input;

/// Checks that run after a payload has been deserialized, for constraints serde cannot express.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be a positive, finite number")]
    NotPositive { field: &'static str },
}
