use thiserror::Error;

#[derive(Error, Debug)]
pub enum NnError {
    #[error("Expected {expected} values, got {actual}")]
    Shape { expected: usize, actual: usize },

    #[error("Inputs and targets differ in length: {inputs} vs {targets}")]
    LengthMismatch { inputs: usize, targets: usize },

    #[error("Failed to write table: {0}")]
    Write(#[from] ndarray_npy::WriteNpyError),

    #[error("Failed to read table: {0}")]
    Read(#[from] ndarray_npy::ReadNpyError),

    #[error("Training is not supported by {0}")]
    Unsupported(&'static str),

    #[cfg(feature = "torch")]
    #[error("Torch error: {0}")]
    Torch(#[from] tch::TchError),
}

pub type Result<T> = std::result::Result<T, NnError>;
