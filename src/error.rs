use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Filter needs at least one tap")]
    ZeroTaps,

    #[error("Biquad cascade needs at least one stage")]
    ZeroStages,

    #[error("Block size must be at least 1")]
    ZeroBlockSize,

    #[error("Coefficient vector has wrong length: need {expected}, have {actual}")]
    CoefficientLength { expected: usize, actual: usize },

    #[error("Buffer length mismatch: expected {expected} samples, got {actual}")]
    BufferLength { expected: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FilterError>;
