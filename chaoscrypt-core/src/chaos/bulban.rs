//! Generalized Bulban map `x' = x * sqrt(a / (x - 4a))` with `a = 1/2`.
//!
//! Defined for `x > 4a`; the input is clamped just above the pole. The map
//! has a repelling fixed point at `5a = 2.5`, which the key scheduler keeps
//! seeds away from.

pub const BULBAN_A: f64 = 0.5;
pub const BULBAN_BURN_IN: usize = 256;
const POLE_MARGIN: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulbanParams {
    /// Seed in (2.05, 6.0).
    pub x0: f64,
}

#[derive(Debug, Clone)]
pub struct BulbanMap {
    x: f64,
}

impl BulbanMap {
    pub fn new(params: &BulbanParams) -> Self {
        let mut map = Self { x: params.x0 };
        for _ in 0..BULBAN_BURN_IN {
            map.step();
        }
        map
    }

    #[inline]
    fn step(&mut self) {
        let four_a = 4.0 * BULBAN_A;
        let x = self.x.max(four_a + POLE_MARGIN);
        self.x = x * (BULBAN_A / (x - four_a)).sqrt();
    }
}

impl Iterator for BulbanMap {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        self.step();
        Some(self.x)
    }
}
