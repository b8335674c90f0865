//! Exit codes following sysexits.h conventions.
//!
//! These codes provide semantic meaning for different failure modes,
//! enabling scripts and CI systems to handle errors appropriately.

use chaoscrypt_core::CipherError;

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line usage error (bad key, missing nonce, unknown algorithm).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Data format error (undecodable image, wrong dimensions).
/// Maps to EX_DATAERR from sysexits.h.
pub const DATA_ERROR: i32 = 65;

/// Cannot open input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// I/O error (cannot write output file).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Operation cancelled, safe to retry.
/// Maps to EX_TEMPFAIL from sysexits.h.
pub const CANCELLED: i32 = 75;

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    fn for_cipher_error(err: &CipherError) -> i32 {
        match err {
            CipherError::InvalidKey(_)
            | CipherError::MissingNonce(_)
            | CipherError::UnsupportedAlgorithm(_) => USAGE_ERROR,
            CipherError::DimensionMismatch { .. }
            | CipherError::InvalidImage(_)
            | CipherError::Codec(_) => DATA_ERROR,
            CipherError::Cancelled => CANCELLED,
            CipherError::Divergence { .. }
            | CipherError::InvalidState(_)
            | CipherError::Entropy(_)
            | CipherError::Serialization(_) => GENERAL_ERROR,
        }
    }

    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        // A library error anywhere in the chain decides; otherwise classify by context
        let code = if let Some(cipher) = err.chain().find_map(|e| e.downcast_ref::<CipherError>()) {
            Self::for_cipher_error(cipher)
        } else if message.contains("Failed to read file") {
            INPUT_ERROR
        } else if message.contains("Failed to write") {
            IO_ERROR
        } else if message.contains("No algorithm given") {
            USAGE_ERROR
        } else {
            GENERAL_ERROR
        };

        Self {
            code,
            message: Some(message),
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(exit: ExitCode) -> Self {
        std::process::ExitCode::from(exit.code as u8)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn test_cipher_errors_found_through_context() {
        let err = Err::<(), _>(CipherError::MissingNonce("fodhnn".into()))
            .context("Decryption failed")
            .unwrap_err();
        let exit = ExitCode::from_anyhow(&err);
        assert_eq!(exit.code, USAGE_ERROR);
        assert!(exit.message.unwrap().contains("requires a nonce"));
    }

    #[test]
    fn test_classification() {
        let cases = [
            (anyhow::Error::new(CipherError::Cancelled), CANCELLED),
            (
                anyhow::Error::new(CipherError::dimension_mismatch("4x4x1", "4x4x3")),
                DATA_ERROR,
            ),
            (
                anyhow::Error::new(CipherError::InvalidState("pipeline already ran".into())),
                GENERAL_ERROR,
            ),
            (anyhow::anyhow!("Failed to read file: x.png"), INPUT_ERROR),
            (anyhow::anyhow!("Failed to write file: y.png"), IO_ERROR),
            (anyhow::anyhow!("something else"), GENERAL_ERROR),
        ];
        for (err, code) in cases {
            assert_eq!(ExitCode::from_anyhow(&err).code, code, "{err}");
        }
    }
}
