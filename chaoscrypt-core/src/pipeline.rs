//! The confusion/diffusion state machine.
//!
//! ```text
//! encrypt: Idle -> KeyDerived -> Confused -> Diffused -> Done
//! decrypt: Idle -> KeyDerived -> Undiffused -> Unpermuted -> Done
//! ```
//!
//! A [`Pipeline`] runs exactly one request. Every transition is logged at
//! debug level and recorded in [`Pipeline::trace`]; on error the pipeline
//! stays in the last state it reached.

use std::borrow::Cow;

use tracing::debug;

use crate::algorithm::AlgorithmId;
use crate::cancel::CancelToken;
use crate::error::{CipherError, Result};
use crate::keys::KeyScheduler;
use crate::raster::Image;
use crate::schedule::ChaoticCipher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    KeyDerived,
    Confused,
    Diffused,
    Undiffused,
    Unpermuted,
    Done,
}

/// Reduce an image to the channel layout the algorithm works on.
///
/// Grayscale-only families take the luma projection of colour input; every
/// other combination is passed through untouched.
pub fn prepare_channels(algorithm: AlgorithmId, image: &Image) -> Cow<'_, Image> {
    if algorithm.grayscale_only() && !image.is_grayscale() {
        debug!(algorithm = %algorithm, "Projecting colour input to grayscale");
        Cow::Owned(image.to_grayscale())
    } else {
        Cow::Borrowed(image)
    }
}

pub struct Pipeline<'a> {
    algorithm: AlgorithmId,
    cancel: &'a CancelToken,
    block: usize,
    state: PipelineState,
    trace: Vec<PipelineState>,
}

impl<'a> Pipeline<'a> {
    /// `block` is the number of units of work between cancellation polls.
    pub fn new(algorithm: AlgorithmId, cancel: &'a CancelToken, block: usize) -> Self {
        Self {
            algorithm,
            cancel,
            block,
            state: PipelineState::Idle,
            trace: vec![PipelineState::Idle],
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state visited so far, starting with `Idle`.
    pub fn trace(&self) -> &[PipelineState] {
        &self.trace
    }

    fn advance(&mut self, next: PipelineState) -> Result<()> {
        self.cancel.check()?;
        debug!(
            algorithm = %self.algorithm,
            from = ?self.state,
            to = ?next,
            "Pipeline transition"
        );
        self.state = next;
        self.trace.push(next);
        Ok(())
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.state != PipelineState::Idle {
            return Err(CipherError::InvalidState(format!(
                "pipeline already ran (state {:?})",
                self.state
            )));
        }
        Ok(())
    }

    /// Permute then diffuse.
    pub fn encrypt(&mut self, image: &Image, key: &str, nonce: Option<&str>) -> Result<Image> {
        let (_, encrypted) = self.encrypt_projected(image, key, nonce)?;
        Ok(encrypted)
    }

    /// [`Pipeline::encrypt`], also returning the channel layout the cipher
    /// actually ran on (the luma projection for grayscale-only families).
    pub fn encrypt_projected<'i>(
        &mut self,
        image: &'i Image,
        key: &str,
        nonce: Option<&str>,
    ) -> Result<(Cow<'i, Image>, Image)> {
        self.ensure_idle()?;
        let input = prepare_channels(self.algorithm, image);
        let geometry = input.geometry();

        let params = KeyScheduler::derive(key, nonce, self.algorithm)?;
        let schedule = params.schedule(geometry, self.cancel, self.block)?;
        self.advance(PipelineState::KeyDerived)?;

        let mut current = schedule.permutation.permute(&input)?;
        self.advance(PipelineState::Confused)?;

        for layer in &schedule.layers {
            current = layer.diffuse(&current, self.cancel, self.block)?;
            debug!(layer = layer.name(), "Applied diffusion layer");
        }
        self.advance(PipelineState::Diffused)?;

        self.advance(PipelineState::Done)?;
        Ok((input, current))
    }

    /// Undo the diffusion layers in reverse, then restore pixel order.
    pub fn decrypt(&mut self, image: &Image, key: &str, nonce: Option<&str>) -> Result<Image> {
        self.ensure_idle()?;
        let geometry = image.geometry();
        if self.algorithm.grayscale_only() && !image.is_grayscale() {
            return Err(CipherError::dimension_mismatch(
                format!("1 channel for {}", self.algorithm),
                format!("{} channels", geometry.channels),
            ));
        }

        let params = KeyScheduler::derive(key, nonce, self.algorithm)?;
        let schedule = params.schedule(geometry, self.cancel, self.block)?;
        self.advance(PipelineState::KeyDerived)?;

        let mut current = image.clone();
        for layer in schedule.layers.iter().rev() {
            current = layer.undiffuse(&current, self.cancel, self.block)?;
            debug!(layer = layer.name(), "Removed diffusion layer");
        }
        self.advance(PipelineState::Undiffused)?;

        let restored = schedule.permutation.unpermute(&current)?;
        self.advance(PipelineState::Unpermuted)?;

        self.advance(PipelineState::Done)?;
        Ok(restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(width: u32, height: u32, channels: u8) -> Image {
        let n = width as usize * height as usize * channels as usize;
        Image::new(width, height, channels, (0..n).map(|i| (i * 13 % 256) as u8).collect()).unwrap()
    }

    #[test]
    fn test_encrypt_trace() {
        let cancel = CancelToken::new();
        let mut p = Pipeline::new(AlgorithmId::Logistic, &cancel, 64);
        p.encrypt(&sample(8, 8, 3), "k", None).unwrap();
        assert_eq!(
            p.trace(),
            &[
                PipelineState::Idle,
                PipelineState::KeyDerived,
                PipelineState::Confused,
                PipelineState::Diffused,
                PipelineState::Done,
            ]
        );
    }

    #[test]
    fn test_decrypt_trace_and_round_trip() {
        let cancel = CancelToken::new();
        let img = sample(8, 6, 3);
        let enc = Pipeline::new(AlgorithmId::TwoDLasm, &cancel, 64)
            .encrypt(&img, "k", Some("n"))
            .unwrap();
        let mut p = Pipeline::new(AlgorithmId::TwoDLasm, &cancel, 64);
        assert_eq!(p.decrypt(&enc, "k", Some("n")).unwrap(), img);
        assert_eq!(
            p.trace(),
            &[
                PipelineState::Idle,
                PipelineState::KeyDerived,
                PipelineState::Undiffused,
                PipelineState::Unpermuted,
                PipelineState::Done,
            ]
        );
    }

    #[test]
    fn test_pipeline_runs_once() {
        let cancel = CancelToken::new();
        let mut p = Pipeline::new(AlgorithmId::Logistic, &cancel, 64);
        p.encrypt(&sample(4, 4, 1), "k", None).unwrap();
        let err = p.encrypt(&sample(4, 4, 1), "k", None).unwrap_err();
        assert!(matches!(err, CipherError::InvalidState(_)), "{err}");
        let err = p.decrypt(&sample(4, 4, 1), "k", None).unwrap_err();
        assert!(matches!(err, CipherError::InvalidState(_)), "{err}");
        assert_eq!(p.state(), PipelineState::Done);
    }

    #[test]
    fn test_encrypt_projected_returns_the_input_it_ran_on() {
        let cancel = CancelToken::new();
        let colour = sample(6, 4, 3);

        let (input, enc) = Pipeline::new(AlgorithmId::Bulban, &cancel, 64)
            .encrypt_projected(&colour, "k", None)
            .unwrap();
        assert!(matches!(input, Cow::Owned(_)));
        assert_eq!(*input, colour.to_grayscale());
        assert_eq!(input.geometry(), enc.geometry());
        let plain = Pipeline::new(AlgorithmId::Bulban, &cancel, 64)
            .encrypt(&colour, "k", None)
            .unwrap();
        assert_eq!(enc, plain);

        let (input, _) = Pipeline::new(AlgorithmId::Logistic, &cancel, 64)
            .encrypt_projected(&colour, "k", None)
            .unwrap();
        assert!(matches!(input, Cow::Borrowed(_)));
    }

    #[test]
    fn test_failure_leaves_state_at_idle() {
        let cancel = CancelToken::new();
        let mut p = Pipeline::new(AlgorithmId::Fodhnn, &cancel, 64);
        let err = p.encrypt(&sample(4, 4, 1), "k", None).unwrap_err();
        assert!(matches!(err, CipherError::MissingNonce(_)));
        assert_eq!(p.state(), PipelineState::Idle);
    }

    #[test]
    fn test_bulban_projects_on_encrypt_and_rejects_colour_on_decrypt() {
        let cancel = CancelToken::new();
        let enc = Pipeline::new(AlgorithmId::Bulban, &cancel, 64)
            .encrypt(&sample(6, 4, 3), "k", None)
            .unwrap();
        assert_eq!(enc.channels(), 1);

        let err = Pipeline::new(AlgorithmId::Bulban, &cancel, 64)
            .decrypt(&sample(6, 4, 3), "k", None)
            .unwrap_err();
        assert!(matches!(err, CipherError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_prepare_channels_borrows_when_nothing_to_do() {
        let img = sample(3, 3, 3);
        assert!(matches!(prepare_channels(AlgorithmId::Logistic, &img), Cow::Borrowed(_)));
        assert!(matches!(prepare_channels(AlgorithmId::Bulban, &img), Cow::Owned(_)));
    }
}
