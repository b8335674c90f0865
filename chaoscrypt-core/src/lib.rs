//! ChaosCrypt Core - Deterministic chaotic image cipher engine
//!
//! This crate encrypts and decrypts 8-bit raster images with one of five
//! chaotic-map families. Every family follows the same two-stage shape:
//! a keyed pixel permutation (confusion) followed by keyed diffusion layers,
//! and decryption applies the exact inverse of each stage in reverse order.
//!
//! # Algorithms
//!
//! - `logistic` - logistic map, nonce optional
//! - `fodhnn` - fractional-order discrete Hopfield network, nonce required
//! - `2dlasm` - 2-D logistic-adjusted sine map, nonce required
//! - `bulban` - Bulban map, grayscale only, no nonce
//! - `acm_2dscl` - Arnold cat map with sine-cosine-logistic and Chen streams,
//!   nonce required
//!
//! All sequence arithmetic is bit-reproducible across platforms: the key
//! schedule is SHA3-256 and transcendental functions come from
//! [`det_math`], never the platform libm.
//!
//! # Example
//!
//! ```
//! use chaoscrypt_core::{AlgorithmId, Engine, EncryptRequest, Image};
//!
//! # fn example() -> chaoscrypt_core::Result<()> {
//! let image = Image::filled(32, 32, 3, 128)?;
//! let engine = Engine::default();
//!
//! let encrypted = engine.encrypt(&EncryptRequest::new(image.clone(), "passphrase", AlgorithmId::TwoDLasm))?;
//! // A nonce was generated and must travel with the ciphertext
//! assert!(encrypted.nonce.is_some());
//!
//! let decrypted = engine.decrypt(&encrypted.cipher_image().into_request("passphrase"))?;
//! assert_eq!(decrypted.decrypted_image, image);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod algorithm;
pub mod cancel;
pub mod chaos;
pub mod confusion;
pub mod det_math;
pub mod diffusion;
pub mod engine;
pub mod error;
pub mod keys;
pub mod metrics;
pub mod nonce;
pub mod pipeline;
pub mod raster;
pub mod schedule;

// Re-export main types for convenience
pub use algorithm::{AlgorithmId, NonceRequirement};
pub use cancel::CancelToken;
pub use chaos::{generate, ChaosSequence};
pub use confusion::{ArnoldParams, Permutation};
pub use diffusion::{DiffusionLayer, LatticeKeys};
pub use engine::{
    CipherImage, DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, Engine,
    EngineConfig,
};
pub use error::{CipherError, Result};
pub use keys::{DerivedParameters, HybridParams, KeyScheduler};
pub use metrics::Metrics;
pub use nonce::{MockNonce, NonceOrigin, NonceSource, OsNonce};
pub use pipeline::{Pipeline, PipelineState};
pub use raster::{Geometry, Image};
pub use schedule::{ChaoticCipher, KeySchedule};
