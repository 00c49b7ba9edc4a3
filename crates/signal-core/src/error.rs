use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Provider error: {0}")]
    Provider(String),
}
