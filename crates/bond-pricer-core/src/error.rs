use thiserror::Error;

#[derive(Debug, Error)]
pub enum PricerError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Date format error: {field} = '{value}' is not a valid YYYY-MM-DD date")]
    DateFormat { field: String, value: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Report write failed for {target}: {reason}")]
    ReportWrite { target: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PricerError {
    fn from(e: serde_json::Error) -> Self {
        PricerError::SerializationError(e.to_string())
    }
}
