//! Request/response facade over the pipeline.
//!
//! [`Engine`] owns only configuration and a nonce source. Every request
//! builds its parameters, sequences and keystreams from scratch and drops
//! them when it returns, so one engine can serve any number of threads.

use std::time::Instant;

use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::algorithm::{AlgorithmId, NonceRequirement};
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::metrics::{self, Metrics};
use crate::nonce::{NonceSource, OsNonce};
use crate::pipeline::Pipeline;
use crate::raster::Image;

/// Default generated nonce length in bytes.
pub const DEFAULT_NONCE_BYTES: usize = 16;

/// Default number of work units between cancellation polls.
pub const DEFAULT_CANCEL_BLOCK: usize = 65_536;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Length of generated nonces in bytes (hex doubles it).
    pub nonce_bytes: usize,
    pub cancel_block: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            nonce_bytes: DEFAULT_NONCE_BYTES,
            cancel_block: DEFAULT_CANCEL_BLOCK,
        }
    }
}

impl EngineConfig {
    /// Read `CHAOSCRYPT_NONCE_BYTES` and `CHAOSCRYPT_CANCEL_BLOCK`, falling
    /// back to the defaults for unset or unparsable values.
    pub fn from_env() -> Self {
        let nonce_bytes = std::env::var("CHAOSCRYPT_NONCE_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_NONCE_BYTES)
            .clamp(8, 64);
        let cancel_block = std::env::var("CHAOSCRYPT_CANCEL_BLOCK")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CANCEL_BLOCK)
            .max(1);
        Self {
            nonce_bytes,
            cancel_block,
        }
    }
}

pub struct EncryptRequest {
    pub image: Image,
    pub key: Zeroizing<String>,
    pub algorithm: AlgorithmId,
    pub nonce: Option<String>,
}

impl EncryptRequest {
    pub fn new(image: Image, key: impl Into<String>, algorithm: AlgorithmId) -> Self {
        Self {
            image,
            key: Zeroizing::new(key.into()),
            algorithm,
            nonce: None,
        }
    }

    /// Build a request from an untyped algorithm id.
    ///
    /// # Errors
    ///
    /// [`crate::CipherError::UnsupportedAlgorithm`] for an unknown id.
    pub fn parse(image: Image, key: impl Into<String>, algorithm: &str) -> Result<Self> {
        Ok(Self::new(image, key, algorithm.parse()?))
    }

    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }
}

pub struct DecryptRequest {
    pub image: Image,
    pub key: Zeroizing<String>,
    pub algorithm: AlgorithmId,
    pub nonce: Option<String>,
}

impl DecryptRequest {
    pub fn new(image: Image, key: impl Into<String>, algorithm: AlgorithmId) -> Self {
        Self {
            image,
            key: Zeroizing::new(key.into()),
            algorithm,
            nonce: None,
        }
    }

    /// Build a request from an untyped algorithm id.
    pub fn parse(image: Image, key: impl Into<String>, algorithm: &str) -> Result<Self> {
        Ok(Self::new(image, key, algorithm.parse()?))
    }

    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct EncryptResponse {
    pub encrypted_image: Image,
    pub algorithm: AlgorithmId,
    /// Present iff the algorithm requires a nonce (generated or supplied).
    pub nonce: Option<String>,
    pub metrics: Metrics,
}

impl EncryptResponse {
    /// Everything a holder of the key needs to decrypt.
    pub fn cipher_image(&self) -> CipherImage {
        CipherImage {
            image: self.encrypted_image.clone(),
            algorithm: self.algorithm,
            nonce: self.nonce.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecryptResponse {
    pub decrypted_image: Image,
}

/// A ciphertext together with its public decryption context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherImage {
    pub image: Image,
    pub algorithm: AlgorithmId,
    pub nonce: Option<String>,
}

impl CipherImage {
    /// Turn this ciphertext back into a decryption request.
    pub fn into_request(self, key: impl Into<String>) -> DecryptRequest {
        DecryptRequest {
            image: self.image,
            key: Zeroizing::new(key.into()),
            algorithm: self.algorithm,
            nonce: self.nonce,
        }
    }
}

pub struct Engine<N: NonceSource = OsNonce> {
    config: EngineConfig,
    nonce_source: N,
}

impl Engine<OsNonce> {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_nonce_source(config, OsNonce)
    }
}

impl Default for Engine<OsNonce> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<N: NonceSource> Engine<N> {
    pub fn with_nonce_source(config: EngineConfig, nonce_source: N) -> Self {
        Self {
            config,
            nonce_source,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn encrypt(&self, request: &EncryptRequest) -> Result<EncryptResponse> {
        self.encrypt_with_cancel(request, &CancelToken::new())
    }

    pub fn decrypt(&self, request: &DecryptRequest) -> Result<DecryptResponse> {
        self.decrypt_with_cancel(request, &CancelToken::new())
    }

    /// Resolve the nonce actually fed to the key schedule and the one echoed
    /// back to the caller.
    fn resolve_nonce(&self, request: &EncryptRequest) -> Result<(Option<String>, Option<String>)> {
        let supplied = request.nonce.as_deref().filter(|n| !n.is_empty());
        Ok(match (request.algorithm.nonce_requirement(), supplied) {
            (NonceRequirement::Required, Some(n)) => (Some(n.to_string()), Some(n.to_string())),
            (NonceRequirement::Required, None) => {
                let n = self.nonce_source.generate(self.config.nonce_bytes)?;
                info!(
                    algorithm = %request.algorithm,
                    source = %self.nonce_source.source_id(),
                    "Generated nonce"
                );
                (Some(n.clone()), Some(n))
            }
            (NonceRequirement::Optional, n) => (n.map(str::to_string), None),
            (NonceRequirement::None, n) => {
                if n.is_some() {
                    warn!(algorithm = %request.algorithm, "Ignoring nonce, algorithm does not use one");
                }
                (None, None)
            }
        })
    }

    pub fn encrypt_with_cancel(
        &self,
        request: &EncryptRequest,
        cancel: &CancelToken,
    ) -> Result<EncryptResponse> {
        let start = Instant::now();
        let (nonce, echoed) = self.resolve_nonce(request)?;

        let mut pipeline = Pipeline::new(request.algorithm, cancel, self.config.cancel_block);
        let (input, encrypted_image) =
            pipeline.encrypt_projected(&request.image, &request.key, nonce.as_deref())?;
        let metrics = metrics::evaluate(&input, &encrypted_image)?;

        info!(
            algorithm = %request.algorithm,
            geometry = %encrypted_image.geometry(),
            entropy = metrics.entropy_encrypted,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Encrypted image"
        );
        Ok(EncryptResponse {
            encrypted_image,
            algorithm: request.algorithm,
            nonce: echoed,
            metrics,
        })
    }

    pub fn decrypt_with_cancel(
        &self,
        request: &DecryptRequest,
        cancel: &CancelToken,
    ) -> Result<DecryptResponse> {
        let start = Instant::now();
        let mut pipeline = Pipeline::new(request.algorithm, cancel, self.config.cancel_block);
        let decrypted_image =
            pipeline.decrypt(&request.image, &request.key, request.nonce.as_deref())?;

        info!(
            algorithm = %request.algorithm,
            geometry = %decrypted_image.geometry(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Decrypted image"
        );
        Ok(DecryptResponse { decrypted_image })
    }
}
