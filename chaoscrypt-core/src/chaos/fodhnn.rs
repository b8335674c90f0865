//! Fractional-order Hopfield neural network map.
//!
//! Three neurons with the activation matrix
//!
//! ```text
//! Fx = -x + 2.00 tanh x - 1.20 tanh y
//! Fy = -y + (p + 1.90) tanh x + 1.71 tanh y + 1.15 tanh z
//! Fz = -z - 4.75 tanh x + 1.10 tanh z
//! ```
//!
//! are integrated with a Grunwald-Letnikov style memory: every state is the
//! initial state plus a weighted sum over the last `MEMORY_WINDOW` right-hand
//! sides, with weights `w[0] = 1`, `w[m] = w[m-1] * (nu + m - 1) / m`.

use std::collections::VecDeque;

use crate::det_math::det_tanh;
use crate::error::{CipherError, Result};

pub const MEMORY_WINDOW: usize = 256;
pub const FODHNN_BURN_IN: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FodhnnParams {
    /// Fractional order, in [0.70, 0.95).
    pub nu: f64,
    /// Coupling perturbation on the second neuron, in [0.05, 0.25).
    pub p: f64,
    pub x0: f64,
    pub y0: f64,
    pub z0: f64,
}

/// Memory kernel of length [`MEMORY_WINDOW`].
pub fn kernel_weights(nu: f64) -> Vec<f64> {
    let mut w = Vec::with_capacity(MEMORY_WINDOW);
    w.push(1.0);
    for m in 1..MEMORY_WINDOW {
        let prev = w[m - 1];
        w.push(prev * (nu + m as f64 - 1.0) / m as f64);
    }
    w
}

fn rhs(s: [f64; 3], p: f64) -> [f64; 3] {
    let (tx, ty, tz) = (det_tanh(s[0]), det_tanh(s[1]), det_tanh(s[2]));
    [
        -s[0] + 2.0 * tx - 1.2 * ty,
        -s[1] + (p + 1.9) * tx + 1.71 * ty + 1.15 * tz,
        -s[2] - 4.75 * tx + 1.1 * tz,
    ]
}

/// State stream `[x, y, z]`. Yields an error if the trajectory stops being finite.
#[derive(Debug, Clone)]
pub struct FodhnnMap {
    p: f64,
    origin: [f64; 3],
    weights: Vec<f64>,
    /// Right-hand sides, most recent first.
    history: VecDeque<[f64; 3]>,
    step: usize,
    failed: bool,
}

impl FodhnnMap {
    pub fn new(params: &FodhnnParams) -> Result<Self> {
        let origin = [params.x0, params.y0, params.z0];
        let mut history = VecDeque::with_capacity(MEMORY_WINDOW + 1);
        history.push_front(rhs(origin, params.p));
        let mut map = Self {
            p: params.p,
            origin,
            weights: kernel_weights(params.nu),
            history,
            step: 0,
            failed: false,
        };
        for _ in 0..FODHNN_BURN_IN {
            map.advance()?;
        }
        Ok(map)
    }

    fn advance(&mut self) -> Result<[f64; 3]> {
        self.step += 1;
        let mut acc = [0.0f64; 3];
        for (w, f) in self.weights.iter().zip(self.history.iter()) {
            acc[0] += w * f[0];
            acc[1] += w * f[1];
            acc[2] += w * f[2];
        }
        let state = [
            self.origin[0] + acc[0],
            self.origin[1] + acc[1],
            self.origin[2] + acc[2],
        ];
        if !state.iter().all(|v| v.is_finite()) {
            return Err(CipherError::Divergence {
                algorithm: "fodhnn".into(),
                step: self.step,
            });
        }
        self.history.push_front(rhs(state, self.p));
        self.history.truncate(MEMORY_WINDOW);
        Ok(state)
    }
}

impl Iterator for FodhnnMap {
    type Item = Result<[f64; 3]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.advance();
        self.failed = item.is_err();
        Some(item)
    }
}
