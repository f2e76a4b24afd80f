use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient history: {available} of {required} required observations available")]
    InsufficientHistory { required: usize, available: usize },

    #[error("No usable observation for {0}")]
    NoObservation(NaiveDate),

    #[error("Return base at {0} was zero or not finite")]
    NonPositiveBase(NaiveDate),
}
