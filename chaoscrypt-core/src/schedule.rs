//! Per-family key schedules.
//!
//! [`ChaoticCipher`] is the seam between derived parameters and the generic
//! pipeline: each family turns its parameters and the image geometry into a
//! permutation plus an ordered list of diffusion layers.

use tracing::debug;

use crate::algorithm::AlgorithmId;
use crate::cancel::{CancelToken, Checkpoint};
use crate::chaos::{
    chen, lasm, quantize, scl, BulbanMap, BulbanParams, ChenSystem, FodhnnMap,
    FodhnnParams, LasmMap, LogisticMap, LogisticParams, SineCosineMap, TwoDLasmParams,
};
use crate::confusion::Permutation;
use crate::diffusion::{DiffusionLayer, LatticeKeys};
use crate::error::Result;
use crate::keys::{DerivedParameters, HybridParams};
use crate::raster::Geometry;

/// Everything needed to run one image through the cipher.
#[derive(Debug, Clone)]
pub struct KeySchedule {
    pub permutation: Permutation,
    /// Applied in order on encryption, in reverse on decryption.
    pub layers: Vec<DiffusionLayer>,
}

pub trait ChaoticCipher {
    fn algorithm(&self) -> AlgorithmId;

    fn schedule(&self, geometry: Geometry, cancel: &CancelToken, block: usize)
        -> Result<KeySchedule>;
}

/// Pull `n` items from a generator, polling for cancellation.
fn take<I: Iterator>(iter: &mut I, n: usize, cp: &mut Checkpoint<'_>) -> Result<Vec<I::Item>> {
    let mut out = Vec::with_capacity(n);
    for item in iter.take(n) {
        out.push(item);
        cp.tick()?;
    }
    Ok(out)
}

impl ChaoticCipher for DerivedParameters {
    fn algorithm(&self) -> AlgorithmId {
        DerivedParameters::algorithm(self)
    }

    fn schedule(&self, geometry: Geometry, cancel: &CancelToken, block: usize) -> Result<KeySchedule> {
        let schedule = match self {
            DerivedParameters::Logistic(p) => p.schedule(geometry, cancel, block),
            DerivedParameters::Fodhnn(p) => p.schedule(geometry, cancel, block),
            DerivedParameters::TwoDLasm(p) => p.schedule(geometry, cancel, block),
            DerivedParameters::Bulban(p) => p.schedule(geometry, cancel, block),
            DerivedParameters::Acm2dScl(p) => p.schedule(geometry, cancel, block),
        }?;
        debug!(
            algorithm = %self.algorithm(),
            geometry = %geometry,
            layers = schedule.layers.len(),
            "Built key schedule"
        );
        Ok(schedule)
    }
}

impl ChaoticCipher for LogisticParams {
    fn algorithm(&self) -> AlgorithmId {
        AlgorithmId::Logistic
    }

    fn schedule(&self, geometry: Geometry, cancel: &CancelToken, block: usize) -> Result<KeySchedule> {
        let mut cp = Checkpoint::new(cancel, block);
        let mut map = LogisticMap::new(self);
        let ranks = take(&mut map, geometry.pixels(), &mut cp)?;
        let keystream = take(&mut map, geometry.samples(), &mut cp)?
            .into_iter()
            .map(quantize)
            .collect();
        Ok(KeySchedule {
            permutation: Permutation::from_keys(&ranks),
            layers: vec![DiffusionLayer::Chain(keystream)],
        })
    }
}

impl ChaoticCipher for FodhnnParams {
    fn algorithm(&self) -> AlgorithmId {
        AlgorithmId::Fodhnn
    }

    fn schedule(&self, geometry: Geometry, cancel: &CancelToken, block: usize) -> Result<KeySchedule> {
        let mut cp = Checkpoint::new(cancel, block);
        let mut map = FodhnnMap::new(self)?;
        let states = take(&mut map, geometry.samples(), &mut cp)?
            .into_iter()
            .collect::<Result<Vec<[f64; 3]>>>()?;
        let ranks: Vec<f64> = states[..geometry.pixels()].iter().map(|s| s[0]).collect();
        let keystream = states.iter().map(|s| quantize(s[2])).collect();
        Ok(KeySchedule {
            permutation: Permutation::from_keys(&ranks),
            layers: vec![DiffusionLayer::Chain(keystream)],
        })
    }
}

impl ChaoticCipher for TwoDLasmParams {
    fn algorithm(&self) -> AlgorithmId {
        AlgorithmId::TwoDLasm
    }

    fn schedule(&self, geometry: Geometry, cancel: &CancelToken, block: usize) -> Result<KeySchedule> {
        let mut cp = Checkpoint::new(cancel, block);
        let ranks: Vec<f64> = take(&mut LasmMap::new(&self.permutation), geometry.pixels(), &mut cp)?
            .into_iter()
            .map(|(x, _)| x)
            .collect();
        let keystream = take(&mut LasmMap::new(&self.keystream), geometry.samples(), &mut cp)?
            .into_iter()
            .enumerate()
            .map(|(i, state)| lasm::mask_byte(state, self.salt, i))
            .collect();
        Ok(KeySchedule {
            permutation: Permutation::from_keys(&ranks),
            layers: vec![DiffusionLayer::Chain(keystream)],
        })
    }
}

/// Shift amount in `0..modulus` from a Bulban state.
fn bulban_shift(v: f64, modulus: u32) -> u32 {
    let u = (v.abs().fract() * 4_294_967_296.0) as u64;
    (u % modulus as u64) as u32
}

fn bulban_shifts(
    map: &mut BulbanMap,
    n: usize,
    modulus: u32,
    cp: &mut Checkpoint<'_>,
) -> Result<Vec<u32>> {
    Ok(take(map, n, cp)?
        .into_iter()
        .map(|v| bulban_shift(v, modulus))
        .collect())
}

impl ChaoticCipher for BulbanParams {
    fn algorithm(&self) -> AlgorithmId {
        AlgorithmId::Bulban
    }

    fn schedule(&self, geometry: Geometry, cancel: &CancelToken, block: usize) -> Result<KeySchedule> {
        let mut cp = Checkpoint::new(cancel, block);
        let (w, h) = (geometry.width as usize, geometry.height as usize);
        let mut map = BulbanMap::new(self);
        let row_shifts = bulban_shifts(&mut map, h, geometry.width, &mut cp)?;
        let col_shifts = bulban_shifts(&mut map, w, geometry.height, &mut cp)?;

        let mut bytes = |n: usize| -> Result<Vec<u8>> {
            Ok(take(&mut map, n, &mut cp)?.into_iter().map(quantize).collect())
        };
        let keys = LatticeKeys {
            row_forward: bytes(w)?,
            row_backward: bytes(w)?,
            col_forward: bytes(h)?,
            col_backward: bytes(h)?,
            row_seed_forward: bytes(w)?,
            row_seed_backward: bytes(w)?,
            col_seed_forward: bytes(h)?,
            col_seed_backward: bytes(h)?,
        };
        Ok(KeySchedule {
            permutation: Permutation::cyclic_shifts(
                geometry.width,
                geometry.height,
                &row_shifts,
                &col_shifts,
            ),
            layers: vec![DiffusionLayer::Lattice(keys)],
        })
    }
}

impl ChaoticCipher for HybridParams {
    fn algorithm(&self) -> AlgorithmId {
        AlgorithmId::Acm2dScl
    }

    fn schedule(&self, geometry: Geometry, cancel: &CancelToken, block: usize) -> Result<KeySchedule> {
        let mut cp = Checkpoint::new(cancel, block);
        let mut sine_cosine = SineCosineMap::new(&self.scl);

        let permutation = if geometry.is_square() {
            Permutation::arnold_cat(geometry.width, &self.arnold)
        } else {
            debug!(geometry = %geometry, "Non-square image, ranking pixels by the SCL trajectory");
            let ranks: Vec<f64> = take(&mut sine_cosine, geometry.pixels(), &mut cp)?
                .into_iter()
                .map(|(x, _)| x)
                .collect();
            Permutation::from_keys(&ranks)
        };

        let lambda = self.scl.lambda;
        let mask = take(&mut sine_cosine, geometry.samples(), &mut cp)?
            .into_iter()
            .map(|state| scl::mask_byte(state, lambda))
            .collect();
        let keystream = take(&mut ChenSystem::new(&self.chen), geometry.samples(), &mut cp)?
            .into_iter()
            .map(chen::keystream_byte)
            .collect();

        Ok(KeySchedule {
            permutation,
            layers: vec![DiffusionLayer::Mask(mask), DiffusionLayer::Chain(keystream)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyScheduler;

    fn geometry(width: u32, height: u32, channels: u8) -> Geometry {
        Geometry {
            width,
            height,
            channels,
        }
    }

    #[test]
    fn test_schedules_are_sized_for_the_image() {
        let g = geometry(12, 8, 3);
        let cancel = CancelToken::new();
        for id in AlgorithmId::ALL {
            let g = if id.grayscale_only() { geometry(12, 8, 1) } else { g };
            let params = KeyScheduler::derive("sizes", Some("n"), id).unwrap();
            let s = params.schedule(g, &cancel, 1024).unwrap();
            assert_eq!(s.permutation.len(), g.pixels(), "{id}");
            for layer in &s.layers {
                match layer {
                    DiffusionLayer::Mask(k) | DiffusionLayer::Chain(k) => {
                        assert_eq!(k.len(), g.samples(), "{id}")
                    }
                    DiffusionLayer::Lattice(k) => {
                        assert_eq!(k.row_forward.len(), 12);
                        assert_eq!(k.col_backward.len(), 8);
                    }
                }
            }
        }
    }

    #[test]
    fn test_hybrid_uses_arnold_on_square_images() {
        let DerivedParameters::Acm2dScl(p) =
            KeyScheduler::derive("sq", Some("n"), AlgorithmId::Acm2dScl).unwrap()
        else {
            unreachable!()
        };
        let s = p.schedule(geometry(16, 16, 1), &CancelToken::new(), 1024).unwrap();
        assert_eq!(s.permutation, Permutation::arnold_cat(16, &p.arnold));
        assert_eq!(s.layers.len(), 2);
    }

    #[test]
    fn test_bulban_shift_range() {
        for v in [2.0001, 3.75, 1234.5678, 2.5] {
            assert!(bulban_shift(v, 7) < 7);
        }
        assert_eq!(bulban_shift(3.5, 4), 0, "0.5 * 2^32 is a multiple of 4");
    }

    #[test]
    fn test_schedule_honours_cancellation() {
        let params = KeyScheduler::derive("k", Some("n"), AlgorithmId::Fodhnn).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = params.schedule(geometry(16, 16, 1), &cancel, 8).unwrap_err();
        assert!(matches!(err, crate::error::CipherError::Cancelled));
    }
}
