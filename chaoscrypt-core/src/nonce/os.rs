use super::{NonceOrigin, NonceSource};
use crate::error::{CipherError, Result};

/// Nonces from the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsNonce;

impl NonceSource for OsNonce {
    fn generate(&self, len: usize) -> Result<String> {
        let mut buf = vec![0u8; len];
        getrandom::fill(&mut buf).map_err(|e| CipherError::Entropy(e.to_string()))?;
        Ok(hex::encode(buf))
    }

    fn source_id(&self) -> NonceOrigin {
        NonceOrigin::Os
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_nonce_length_and_freshness() {
        let a = OsNonce.generate(16).unwrap();
        let b = OsNonce.generate(16).unwrap();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
