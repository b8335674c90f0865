//! Nonce sources.
//!
//! Algorithms that require a nonce get a fresh one from a [`NonceSource`]
//! when the caller does not supply it. Nonces are hex strings so they can be
//! stored next to the ciphertext and typed back in by hand.
//!
//! - [`OsNonce`] - operating system randomness (the default)
//! - [`MockNonce`] - deterministic, for tests

mod mock;
mod os;

pub use mock::MockNonce;
pub use os::OsNonce;

use crate::error::Result;

/// Produces nonces for encryption requests.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait NonceSource: Send + Sync {
    /// Return `len` random bytes, hex encoded.
    fn generate(&self, len: usize) -> Result<String>;

    fn source_id(&self) -> NonceOrigin;
}

/// Where a generated nonce came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum NonceOrigin {
    /// Operating system CSPRNG
    Os,
    /// Deterministic source for testing only
    Mock,
}

impl std::fmt::Display for NonceOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Os => write!(f, "OS CSPRNG"),
            Self::Mock => write!(f, "Mock (NOT RANDOM)"),
        }
    }
}
