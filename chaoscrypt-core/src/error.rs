use thiserror::Error;

#[derive(Error, Debug)]
pub enum CipherError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Algorithm '{0}' requires a nonce for decryption")]
    MissingNonce(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Invalid pipeline state: {0}")]
    InvalidState(String),

    #[error("Chaotic trajectory diverged for {algorithm} at step {step}")]
    Divergence { algorithm: String, step: usize },

    #[error("Entropy source error: {0}")]
    Entropy(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[cfg(feature = "codec")]
    #[error("Image codec error: {0}")]
    Codec(#[from] image::ImageError),
}

impl CipherError {
    /// Shorthand for a [`CipherError::DimensionMismatch`] from two displayable shapes.
    pub fn dimension_mismatch(expected: impl ToString, actual: impl ToString) -> Self {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CipherError>;
