//! Mock nonce source for testing.

use std::sync::atomic::{AtomicU64, Ordering};

use sha3::{Digest, Sha3_256};

use super::{NonceOrigin, NonceSource};
use crate::error::Result;

/// Deterministic nonce source.
/// WARNING: Do not use in production - every run repeats the same nonces!
pub struct MockNonce {
    seed: u64,
    counter: AtomicU64,
}

impl MockNonce {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            counter: AtomicU64::new(0),
        }
    }

    /// Create a mock with default seed for simple tests.
    pub fn default_test() -> Self {
        Self::new(0xDEADBEEF_CAFEBABE)
    }
}

impl Default for MockNonce {
    fn default() -> Self {
        Self::default_test()
    }
}

impl NonceSource for MockNonce {
    /// SHA3 of seed, call counter and block index, truncated to `len`.
    fn generate(&self, len: usize) -> Result<String> {
        let call = self.counter.fetch_add(1, Ordering::Relaxed);
        let mut out = Vec::with_capacity(len);
        let mut block = 0u32;
        while out.len() < len {
            let mut hasher = Sha3_256::new();
            hasher.update(self.seed.to_le_bytes());
            hasher.update(call.to_le_bytes());
            hasher.update(block.to_le_bytes());
            hasher.update(b"chaoscrypt-mock-nonce");
            let digest = hasher.finalize();
            let take = (len - out.len()).min(digest.len());
            out.extend_from_slice(&digest[..take]);
            block += 1;
        }
        Ok(hex::encode(out))
    }

    fn source_id(&self) -> NonceOrigin {
        NonceOrigin::Mock
    }
}
