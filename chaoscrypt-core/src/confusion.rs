//! Confusion: pixel-position permutations.
//!
//! A [`Permutation`] is stored in gather form: output pixel `i` takes input
//! pixel `order[i]`. All channels of a pixel move together.

use tracing::trace;

use crate::error::{CipherError, Result};
use crate::raster::Image;

/// Arnold cat map `(x, y) -> (x + p y, q x + (p q + 1) y) mod N`, iterated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArnoldParams {
    pub p: u32,
    pub q: u32,
    pub iterations: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    order: Vec<u32>,
}

impl Permutation {
    pub fn identity(len: usize) -> Self {
        Self {
            order: (0..len as u32).collect(),
        }
    }

    /// Wrap an explicit gather order, checking it is a bijection.
    pub fn from_order(order: Vec<u32>) -> Result<Self> {
        let mut seen = vec![false; order.len()];
        for &o in &order {
            match seen.get_mut(o as usize) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(CipherError::InvalidImage(format!(
                        "permutation entry {o} is out of range or repeated"
                    )))
                }
            }
        }
        Ok(Self { order })
    }

    /// Rank pixels by their chaotic key: output `i` is the pixel with the
    /// `i`-th smallest key. Equal keys keep index order.
    pub fn from_keys(keys: &[f64]) -> Self {
        let mut order: Vec<u32> = (0..keys.len() as u32).collect();
        order.sort_by(|&a, &b| {
            keys[a as usize]
                .total_cmp(&keys[b as usize])
                .then(a.cmp(&b))
        });
        Self { order }
    }

    /// Arnold cat map on a `side x side` image.
    pub fn arnold_cat(side: u32, params: &ArnoldParams) -> Self {
        let n = side as u64;
        let (p, q) = (params.p as u64 % n, params.q as u64 % n);
        let pq1 = (p * q + 1) % n;
        let mut order = vec![0u32; (n * n) as usize];
        for x in 0..n {
            for y in 0..n {
                let (mut u, mut v) = (x, y);
                for _ in 0..params.iterations {
                    let nu = (u + p * v) % n;
                    let nv = (q * u + pq1 * v) % n;
                    u = nu;
                    v = nv;
                }
                order[(u * n + v) as usize] = (x * n + y) as u32;
            }
        }
        Self { order }
    }

    /// Rotate row `i` right by `row_shifts[i]`, then column `j` down by
    /// `col_shifts[j]`.
    pub fn cyclic_shifts(width: u32, height: u32, row_shifts: &[u32], col_shifts: &[u32]) -> Self {
        let (w, h) = (width as usize, height as usize);
        debug_assert_eq!(row_shifts.len(), h);
        debug_assert_eq!(col_shifts.len(), w);

        let mut rows = vec![0u32; w * h];
        for i in 0..h {
            let shift = row_shifts[i] as usize % w;
            for j in 0..w {
                rows[i * w + (j + shift) % w] = (i * w + j) as u32;
            }
        }
        let mut order = vec![0u32; w * h];
        for j in 0..w {
            let shift = col_shifts[j] as usize % h;
            for i in 0..h {
                order[((i + shift) % h) * w + j] = rows[i * w + j];
            }
        }
        Self { order }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.order
    }

    pub fn inverse(&self) -> Self {
        let mut inv = vec![0u32; self.order.len()];
        for (i, &o) in self.order.iter().enumerate() {
            inv[o as usize] = i as u32;
        }
        Self { order: inv }
    }

    fn check(&self, image: &Image) -> Result<()> {
        let pixels = image.geometry().pixels();
        if pixels != self.order.len() {
            return Err(CipherError::dimension_mismatch(
                format!("{} pixels", self.order.len()),
                format!("{pixels} pixels ({})", image.geometry()),
            ));
        }
        Ok(())
    }

    /// Scatter pixels into their permuted positions.
    pub fn permute(&self, image: &Image) -> Result<Image> {
        self.check(image)?;
        let c = image.channels() as usize;
        let src = image.data();
        let mut out = vec![0u8; src.len()];
        for (dst, &o) in out.chunks_exact_mut(c).zip(&self.order) {
            let o = o as usize * c;
            dst.copy_from_slice(&src[o..o + c]);
        }
        trace!(pixels = self.order.len(), "Permuted pixels");
        image.with_data(out)
    }

    /// Exact inverse of [`Permutation::permute`].
    pub fn unpermute(&self, image: &Image) -> Result<Image> {
        self.check(image)?;
        let c = image.channels() as usize;
        let src = image.data();
        let mut out = vec![0u8; src.len()];
        for (px, &o) in src.chunks_exact(c).zip(&self.order) {
            let o = o as usize * c;
            out[o..o + c].copy_from_slice(px);
        }
        trace!(pixels = self.order.len(), "Restored pixel order");
        image.with_data(out)
    }
}
