//! Diffusion: keyed substitution of sample values.
//!
//! Layers operate on the interleaved sample buffer after confusion. A
//! schedule applies its layers in order on encryption and undoes them in
//! reverse order on decryption. All arithmetic is modulo 256.
//!
//! Every chain here is strictly sequential over the whole image, so a change
//! in one plaintext sample reaches every ciphertext sample. The chaining
//! value passes through the AES S-box before it is added; a purely additive
//! chain only carries low-bit differences and lets them cancel.

use crate::cancel::{CancelToken, Checkpoint};
use crate::error::{CipherError, Result};
use crate::raster::Image;

/// Full passes of the Bulban lattice. One pass leaves whole rows untouched
/// by a single-pixel change about once in 256.
pub const LATTICE_ROUNDS: usize = 2;

/// AES S-box, a fixed nonlinear byte bijection.
const SBOX: [u8; 256] = build_sbox();

const fn build_sbox() -> [u8; 256] {
    let mut sbox = [0u8; 256];
    let (mut p, mut q) = (1u8, 1u8);
    loop {
        // p *= 3 in GF(2^8)
        p = p ^ (p << 1) ^ if p & 0x80 != 0 { 0x1B } else { 0 };
        // q /= 3
        q ^= q << 1;
        q ^= q << 2;
        q ^= q << 4;
        if q & 0x80 != 0 {
            q ^= 0x09;
        }
        let x = q ^ q.rotate_left(1) ^ q.rotate_left(2) ^ q.rotate_left(3) ^ q.rotate_left(4);
        sbox[p as usize] = x ^ 0x63;
        if p == 1 {
            break;
        }
    }
    sbox[0] = 0x63;
    sbox
}

/// Keys for Bulban's bidirectional row/column chains.
///
/// `row_*` vectors have one entry per column and `col_*` vectors one entry
/// per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatticeKeys {
    pub row_forward: Vec<u8>,
    pub row_backward: Vec<u8>,
    pub col_forward: Vec<u8>,
    pub col_backward: Vec<u8>,
    pub row_seed_forward: Vec<u8>,
    pub row_seed_backward: Vec<u8>,
    pub col_seed_forward: Vec<u8>,
    pub col_seed_backward: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffusionLayer {
    /// `c = p ^ k`. Self-inverse.
    Mask(Vec<u8>),
    /// Two-pass chain: forward `c[i] = p[i] + S(c[i-1] ^ k[i])`, then backward
    /// `d[i] = c[i] + S(d[i+1] ^ k[S-1-i])`.
    Chain(Vec<u8>),
    /// Row chains down and up, then column chains right and left, repeated
    /// [`LATTICE_ROUNDS`] times.
    Lattice(LatticeKeys),
}

impl DiffusionLayer {
    pub fn name(&self) -> &'static str {
        match self {
            DiffusionLayer::Mask(_) => "mask",
            DiffusionLayer::Chain(_) => "chain",
            DiffusionLayer::Lattice(_) => "lattice",
        }
    }

    fn check(&self, image: &Image) -> Result<()> {
        let g = image.geometry();
        let ok = match self {
            DiffusionLayer::Mask(k) | DiffusionLayer::Chain(k) => k.len() == g.samples(),
            DiffusionLayer::Lattice(keys) => {
                let (w, h) = (g.width as usize, g.height as usize);
                [
                    &keys.row_forward,
                    &keys.row_backward,
                    &keys.row_seed_forward,
                    &keys.row_seed_backward,
                ]
                .iter()
                .all(|v| v.len() == w)
                    && [
                        &keys.col_forward,
                        &keys.col_backward,
                        &keys.col_seed_forward,
                        &keys.col_seed_backward,
                    ]
                    .iter()
                    .all(|v| v.len() == h)
            }
        };
        if ok {
            Ok(())
        } else {
            Err(CipherError::dimension_mismatch(
                format!("{} keys sized for the image", self.name()),
                g,
            ))
        }
    }

    pub fn diffuse(&self, image: &Image, cancel: &CancelToken, block: usize) -> Result<Image> {
        self.check(image)?;
        let mut data = image.data().to_vec();
        let mut cp = Checkpoint::new(cancel, block);
        match self {
            DiffusionLayer::Mask(k) => xor_mask(&mut data, k, &mut cp)?,
            DiffusionLayer::Chain(k) => {
                chain_forward(&mut data, k, &mut cp)?;
                chain_backward(&mut data, k, &mut cp)?;
            }
            DiffusionLayer::Lattice(keys) => {
                Lattice::new(image, keys).diffuse(&mut data, &mut cp)?;
            }
        }
        image.with_data(data)
    }

    pub fn undiffuse(&self, image: &Image, cancel: &CancelToken, block: usize) -> Result<Image> {
        self.check(image)?;
        let mut data = image.data().to_vec();
        let mut cp = Checkpoint::new(cancel, block);
        match self {
            DiffusionLayer::Mask(k) => xor_mask(&mut data, k, &mut cp)?,
            DiffusionLayer::Chain(k) => {
                unchain_backward(&mut data, k, &mut cp)?;
                unchain_forward(&mut data, k, &mut cp)?;
            }
            DiffusionLayer::Lattice(keys) => {
                Lattice::new(image, keys).undiffuse(&mut data, &mut cp)?;
            }
        }
        image.with_data(data)
    }
}

fn xor_mask(data: &mut [u8], k: &[u8], cp: &mut Checkpoint<'_>) -> Result<()> {
    for (v, &m) in data.iter_mut().zip(k) {
        *v ^= m;
        cp.tick()?;
    }
    Ok(())
}

fn chain_forward(data: &mut [u8], k: &[u8], cp: &mut Checkpoint<'_>) -> Result<()> {
    let Some(&last) = k.last() else {
        return Ok(());
    };
    let mut prev = last;
    for (v, &key) in data.iter_mut().zip(k) {
        *v = v.wrapping_add(SBOX[(prev ^ key) as usize]);
        prev = *v;
        cp.tick()?;
    }
    Ok(())
}

fn unchain_forward(data: &mut [u8], k: &[u8], cp: &mut Checkpoint<'_>) -> Result<()> {
    let Some(&last) = k.last() else {
        return Ok(());
    };
    for i in (0..data.len()).rev() {
        let prev = if i == 0 { last } else { data[i - 1] };
        data[i] = data[i].wrapping_sub(SBOX[(prev ^ k[i]) as usize]);
        cp.tick()?;
    }
    Ok(())
}

fn chain_backward(data: &mut [u8], k: &[u8], cp: &mut Checkpoint<'_>) -> Result<()> {
    let n = data.len();
    if n == 0 {
        return Ok(());
    }
    let mut next = k[0];
    for i in (0..n).rev() {
        data[i] = data[i].wrapping_add(SBOX[(next ^ k[n - 1 - i]) as usize]);
        next = data[i];
        cp.tick()?;
    }
    Ok(())
}

fn unchain_backward(data: &mut [u8], k: &[u8], cp: &mut Checkpoint<'_>) -> Result<()> {
    let n = data.len();
    for i in 0..n {
        let next = if i + 1 < n { data[i + 1] } else { k[0] };
        data[i] = data[i].wrapping_sub(SBOX[(next ^ k[n - 1 - i]) as usize]);
        cp.tick()?;
    }
    Ok(())
}

/// Index helper for the Bulban lattice over one channel plane at a time.
struct Lattice<'k> {
    width: usize,
    height: usize,
    channels: usize,
    keys: &'k LatticeKeys,
}

impl<'k> Lattice<'k> {
    fn new(image: &Image, keys: &'k LatticeKeys) -> Self {
        Self {
            width: image.width() as usize,
            height: image.height() as usize,
            channels: image.channels() as usize,
            keys,
        }
    }

    #[inline]
    fn at(&self, i: usize, j: usize, ch: usize) -> usize {
        (i * self.width + j) * self.channels + ch
    }

    fn diffuse(&self, d: &mut [u8], cp: &mut Checkpoint<'_>) -> Result<()> {
        for _ in 0..LATTICE_ROUNDS {
            self.round(d, cp)?;
        }
        Ok(())
    }

    fn undiffuse(&self, d: &mut [u8], cp: &mut Checkpoint<'_>) -> Result<()> {
        for _ in 0..LATTICE_ROUNDS {
            self.unround(d, cp)?;
        }
        Ok(())
    }

    fn round(&self, d: &mut [u8], cp: &mut Checkpoint<'_>) -> Result<()> {
        let (w, h, k) = (self.width, self.height, self.keys);
        for ch in 0..self.channels {
            for i in 0..h {
                for j in 0..w {
                    let prev = if i == 0 { k.row_seed_forward[j] } else { d[self.at(i - 1, j, ch)] };
                    let x = self.at(i, j, ch);
                    d[x] = d[x].wrapping_add(SBOX[(prev ^ k.row_forward[j]) as usize]);
                }
                cp.tick()?;
            }
            for i in (0..h).rev() {
                for j in 0..w {
                    let next = if i + 1 == h { k.row_seed_backward[j] } else { d[self.at(i + 1, j, ch)] };
                    let x = self.at(i, j, ch);
                    d[x] = d[x].wrapping_add(SBOX[(next ^ k.row_backward[j]) as usize]);
                }
                cp.tick()?;
            }
            for j in 0..w {
                for i in 0..h {
                    let prev = if j == 0 { k.col_seed_forward[i] } else { d[self.at(i, j - 1, ch)] };
                    let x = self.at(i, j, ch);
                    d[x] = d[x].wrapping_add(SBOX[(prev ^ k.col_forward[i]) as usize]);
                }
                cp.tick()?;
            }
            for j in (0..w).rev() {
                for i in 0..h {
                    let next = if j + 1 == w { k.col_seed_backward[i] } else { d[self.at(i, j + 1, ch)] };
                    let x = self.at(i, j, ch);
                    d[x] = d[x].wrapping_add(SBOX[(next ^ k.col_backward[i]) as usize]);
                }
                cp.tick()?;
            }
        }
        Ok(())
    }

    fn unround(&self, d: &mut [u8], cp: &mut Checkpoint<'_>) -> Result<()> {
        let (w, h, k) = (self.width, self.height, self.keys);
        for ch in 0..self.channels {
            for j in 0..w {
                for i in 0..h {
                    let next = if j + 1 == w { k.col_seed_backward[i] } else { d[self.at(i, j + 1, ch)] };
                    let x = self.at(i, j, ch);
                    d[x] = d[x].wrapping_sub(SBOX[(next ^ k.col_backward[i]) as usize]);
                }
                cp.tick()?;
            }
            for j in (0..w).rev() {
                for i in 0..h {
                    let prev = if j == 0 { k.col_seed_forward[i] } else { d[self.at(i, j - 1, ch)] };
                    let x = self.at(i, j, ch);
                    d[x] = d[x].wrapping_sub(SBOX[(prev ^ k.col_forward[i]) as usize]);
                }
                cp.tick()?;
            }
            for i in 0..h {
                for j in 0..w {
                    let next = if i + 1 == h { k.row_seed_backward[j] } else { d[self.at(i + 1, j, ch)] };
                    let x = self.at(i, j, ch);
                    d[x] = d[x].wrapping_sub(SBOX[(next ^ k.row_backward[j]) as usize]);
                }
                cp.tick()?;
            }
            for i in (0..h).rev() {
                for j in 0..w {
                    let prev = if i == 0 { k.row_seed_forward[j] } else { d[self.at(i - 1, j, ch)] };
                    let x = self.at(i, j, ch);
                    d[x] = d[x].wrapping_sub(SBOX[(prev ^ k.row_forward[j]) as usize]);
                }
                cp.tick()?;
            }
        }
        Ok(())
    }
}
