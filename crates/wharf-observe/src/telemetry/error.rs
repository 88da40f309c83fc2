use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid traces sample rate: {0} (expected a number in [0, 1])")]
    InvalidSampleRate(String),

    #[error("failed to load monitoring client: {0}")]
    Load(String),

    #[error("monitoring client init failed: {0}")]
    Init(String),
}

pub type TelemetryResult<T> = Result<T, TelemetryError>;
