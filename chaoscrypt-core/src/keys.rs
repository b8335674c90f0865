//! Key scheduling: passphrase (+ nonce) to per-family chaotic parameters.
//!
//! The scheme is fixed and versioned:
//!
//! 1. `seed = SHA3-256("chaoscrypt/kdf/v1" || len(id) || id || len(key) || key || nonce-field)`
//!    where `nonce-field` is `0x00`, or `0x01 || len(nonce) || nonce`.
//! 2. `block[i] = SHA3-256(seed || le32(i))`; each block is read as eight
//!    big-endian `u32` words. The word stream runs through as many blocks as
//!    a family reads.
//! 3. Each word is mapped affinely into its parameter range through
//!    `(u + 0.5) / 2^32`, which never reaches either endpoint. Values that land
//!    within `1e-6` of a degenerate point of the map are nudged by `1e-3`.
//!
//! Derivation is pure: no I/O and no randomness. Nonce generation lives in
//! [`crate::nonce`].

use sha3::{Digest, Sha3_256};
use tracing::debug;
use zeroize::Zeroizing;

use crate::algorithm::{AlgorithmId, NonceRequirement};
use crate::chaos::{
    BulbanParams, ChenParams, FodhnnParams, LasmParams, LogisticParams, SclParams,
    TwoDLasmParams,
};
use crate::confusion::ArnoldParams;
use crate::error::{CipherError, Result};

const KDF_DOMAIN: &[u8] = b"chaoscrypt/kdf/v1";
const WORDS_PER_BLOCK: usize = 8;
const FIXED_POINT_TOLERANCE: f64 = 1e-6;
const FIXED_POINT_NUDGE: f64 = 1e-3;

/// Parameters of the composite Arnold / 2D-SCL / Chen cipher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridParams {
    pub arnold: ArnoldParams,
    pub scl: SclParams,
    pub chen: ChenParams,
}

/// Algorithm-specific numeric state derived from a key and nonce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DerivedParameters {
    Logistic(LogisticParams),
    Fodhnn(FodhnnParams),
    TwoDLasm(TwoDLasmParams),
    Bulban(BulbanParams),
    Acm2dScl(HybridParams),
}

impl DerivedParameters {
    pub fn algorithm(&self) -> AlgorithmId {
        match self {
            DerivedParameters::Logistic(_) => AlgorithmId::Logistic,
            DerivedParameters::Fodhnn(_) => AlgorithmId::Fodhnn,
            DerivedParameters::TwoDLasm(_) => AlgorithmId::TwoDLasm,
            DerivedParameters::Bulban(_) => AlgorithmId::Bulban,
            DerivedParameters::Acm2dScl(_) => AlgorithmId::Acm2dScl,
        }
    }
}

/// Word stream expanded from the key seed.
///
/// Word `i` is big-endian chunk `i % 8` of `SHA3-256(seed || le32(i / 8))`.
/// Blocks are hashed when a word in them is read, so the stream has no fixed
/// length. The seed and every block are wiped on drop.
struct KeyWords {
    seed: Zeroizing<[u8; 32]>,
}

impl KeyWords {
    fn new(seed: Zeroizing<[u8; 32]>) -> Self {
        Self { seed }
    }

    fn block(&self, index: u32) -> Zeroizing<[u8; 32]> {
        let mut hasher = Sha3_256::new();
        hasher.update(self.seed.as_slice());
        hasher.update(index.to_le_bytes());
        let mut digest = Zeroizing::new([0u8; 32]);
        digest.copy_from_slice(&hasher.finalize());
        digest
    }

    fn word(&self, i: usize) -> u32 {
        let block = self.block((i / WORDS_PER_BLOCK) as u32);
        let at = (i % WORDS_PER_BLOCK) * 4;
        u32::from_be_bytes([block[at], block[at + 1], block[at + 2], block[at + 3]])
    }

    fn unit(&self, i: usize) -> f64 {
        unit(self.word(i))
    }

    fn interval(&self, i: usize, lo: f64, hi: f64) -> f64 {
        lo + self.unit(i) * (hi - lo)
    }
}

/// Map a word into the open interval (0, 1).
pub fn unit(word: u32) -> f64 {
    (word as f64 + 0.5) / 4_294_967_296.0
}

/// Move `x` off any of `points` it sits on.
fn avoid(mut x: f64, points: &[f64]) -> f64 {
    for _ in 0..points.len() {
        match points
            .iter()
            .find(|&&p| (x - p).abs() < FIXED_POINT_TOLERANCE)
        {
            Some(_) => x += FIXED_POINT_NUDGE,
            None => break,
        }
    }
    x
}

fn seed(key: &str, nonce: Option<&str>, algorithm: AlgorithmId) -> Zeroizing<[u8; 32]> {
    let id = algorithm.as_str().as_bytes();
    let mut hasher = Sha3_256::new();
    hasher.update(KDF_DOMAIN);
    hasher.update([id.len() as u8]);
    hasher.update(id);
    hasher.update((key.len() as u64).to_le_bytes());
    hasher.update(key.as_bytes());
    match nonce {
        None => hasher.update([0u8]),
        Some(n) => {
            hasher.update([1u8]);
            hasher.update((n.len() as u64).to_le_bytes());
            hasher.update(n.as_bytes());
        }
    }
    let mut out = Zeroizing::new([0u8; 32]);
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Derives [`DerivedParameters`] from a passphrase.
pub struct KeyScheduler;

impl KeyScheduler {
    /// Derive the parameters for `algorithm`.
    ///
    /// An empty nonce counts as absent. A nonce is ignored by algorithms
    /// that never use one (Bulban) and mixed in otherwise.
    ///
    /// # Errors
    ///
    /// - [`CipherError::InvalidKey`] if the key is empty or whitespace.
    /// - [`CipherError::MissingNonce`] if the algorithm requires a nonce and
    ///   none was given.
    pub fn derive(
        key: &str,
        nonce: Option<&str>,
        algorithm: AlgorithmId,
    ) -> Result<DerivedParameters> {
        if key.trim().is_empty() {
            return Err(CipherError::InvalidKey("key must not be empty".into()));
        }
        let nonce = nonce.filter(|n| !n.is_empty());
        let nonce = match (algorithm.nonce_requirement(), nonce) {
            (NonceRequirement::Required, None) => {
                return Err(CipherError::MissingNonce(algorithm.to_string()))
            }
            (NonceRequirement::None, _) => None,
            (_, n) => n,
        };

        let words = KeyWords::new(seed(key, nonce, algorithm));
        let params = match algorithm {
            AlgorithmId::Logistic => DerivedParameters::Logistic(logistic(&words)),
            AlgorithmId::Fodhnn => DerivedParameters::Fodhnn(fodhnn(&words)),
            AlgorithmId::TwoDLasm => DerivedParameters::TwoDLasm(two_d_lasm(&words)),
            AlgorithmId::Bulban => DerivedParameters::Bulban(bulban(&words)),
            AlgorithmId::Acm2dScl => DerivedParameters::Acm2dScl(hybrid(&words)),
        };
        debug!(algorithm = %algorithm, nonce = nonce.is_some(), "Derived key schedule parameters");
        Ok(params)
    }
}

fn logistic(w: &KeyWords) -> LogisticParams {
    let r = w.interval(0, 3.99, 4.0);
    let x0 = w.interval(1, 0.01, 0.99);
    LogisticParams {
        r,
        x0: avoid(x0, &[0.25, 0.5, 0.75, 1.0 - 1.0 / r]),
    }
}

fn fodhnn(w: &KeyWords) -> FodhnnParams {
    FodhnnParams {
        nu: w.interval(0, 0.70, 0.95),
        p: w.interval(1, 0.05, 0.25),
        x0: w.interval(2, 0.01, 0.99),
        y0: w.interval(3, 0.01, 0.99),
        z0: w.interval(4, 0.01, 0.99),
    }
}

fn two_d_lasm(w: &KeyWords) -> TwoDLasmParams {
    let lasm = |base: usize| LasmParams {
        mu: w.interval(base, 0.80, 0.92),
        x0: w.interval(base + 1, 0.01, 0.99),
        y0: w.interval(base + 2, 0.01, 0.99),
    };
    TwoDLasmParams {
        permutation: lasm(0),
        keystream: lasm(3),
        salt: ((w.word(6) as u64) << 32) | w.word(7) as u64,
    }
}

fn bulban(w: &KeyWords) -> BulbanParams {
    BulbanParams {
        x0: avoid(w.interval(0, 2.05, 6.0), &[2.5, 4.0]),
    }
}

fn hybrid(w: &KeyWords) -> HybridParams {
    HybridParams {
        arnold: ArnoldParams {
            p: 1 + w.word(0) % 2,
            q: 1 + w.word(1) % 2,
            iterations: 4 + w.word(2) % 5,
        },
        scl: SclParams {
            lambda: w.interval(3, 0.1, 0.9),
            x0: w.interval(4, 0.05, 0.95),
            y0: w.interval(5, 0.05, 0.95),
        },
        chen: ChenParams {
            x0: -10.058 + 0.1 * w.unit(6),
            y0: 0.368 + 0.1 * w.unit(7),
            z0: 37.368 + 0.1 * w.unit(8),
        },
    }
}
