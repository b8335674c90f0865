//! Chaotic sequence generators.
//!
//! One iterator per map family. Every generator is constructed from its
//! parameter struct, discards a fixed burn-in, and then yields states lazily.
//! Rebuilding a generator from the same parameters restarts the identical
//! stream; nothing is cached between requests.
//!
//! All arithmetic is `f64` in a fixed evaluation order, and transcendental
//! functions come from [`crate::det_math`], so a stream is bit-identical on
//! every platform.

pub mod bulban;
pub mod chen;
pub mod fodhnn;
pub mod lasm;
pub mod logistic;
pub mod scl;

pub use bulban::{BulbanMap, BulbanParams};
pub use chen::{ChenParams, ChenSystem};
pub use fodhnn::{FodhnnMap, FodhnnParams};
pub use lasm::{LasmMap, LasmParams, TwoDLasmParams};
pub use logistic::{LogisticMap, LogisticParams};
pub use scl::{SclParams, SineCosineMap};

use crate::error::Result;
use crate::keys::DerivedParameters;

/// The primary stream of a map family.
#[derive(Debug, Clone, PartialEq)]
pub enum ChaosSequence {
    Scalar(Vec<f64>),
    Pair(Vec<(f64, f64)>),
    Triple(Vec<[f64; 3]>),
}

impl ChaosSequence {
    pub fn len(&self) -> usize {
        match self {
            ChaosSequence::Scalar(v) => v.len(),
            ChaosSequence::Pair(v) => v.len(),
            ChaosSequence::Triple(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Generate `length` states of the family selected by `params`.
///
/// Paired for the 2-D maps, a state triple for FODHNN, scalar otherwise.
/// For `acm_2dscl` this is the sine-cosine-logistic layer; the Chen stream
/// is available through [`ChenSystem`].
pub fn generate(params: &DerivedParameters, length: usize) -> Result<ChaosSequence> {
    Ok(match params {
        DerivedParameters::Logistic(p) => {
            ChaosSequence::Scalar(LogisticMap::new(p).take(length).collect())
        }
        DerivedParameters::Fodhnn(p) => {
            ChaosSequence::Triple(FodhnnMap::new(p)?.take(length).collect::<Result<_>>()?)
        }
        DerivedParameters::TwoDLasm(p) => {
            ChaosSequence::Pair(LasmMap::new(&p.permutation).take(length).collect())
        }
        DerivedParameters::Bulban(p) => {
            ChaosSequence::Scalar(BulbanMap::new(p).take(length).collect())
        }
        DerivedParameters::Acm2dScl(p) => {
            ChaosSequence::Pair(SineCosineMap::new(&p.scl).take(length).collect())
        }
    })
}

/// Bits 16..24 of the fractional part: `floor(frac(|v|) * 2^24) mod 256`.
#[inline]
pub(crate) fn quantize(v: f64) -> u8 {
    ((v.abs().fract() * 16_777_216.0) as u32 & 0xFF) as u8
}

/// splitmix64 finalizer.
#[inline]
pub(crate) fn mix64(mut u: u64) -> u64 {
    u ^= u >> 30;
    u = u.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    u ^= u >> 27;
    u = u.wrapping_mul(0x94D0_49BB_1331_11EB);
    u ^ (u >> 31)
}
