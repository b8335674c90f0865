//! Logistic map `x[n+1] = r * x[n] * (1 - x[n])`.

/// Iterations discarded before the first output.
pub const LOGISTIC_BURN_IN: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticParams {
    /// Control parameter, inside the fully chaotic band just below 4.
    pub r: f64,
    /// Seed, strictly inside (0, 1) and away from fixed points.
    pub x0: f64,
}

/// Scalar logistic-map stream.
#[derive(Debug, Clone)]
pub struct LogisticMap {
    r: f64,
    x: f64,
}

impl LogisticMap {
    pub fn new(params: &LogisticParams) -> Self {
        let mut map = Self {
            r: params.r,
            x: params.x0,
        };
        for _ in 0..LOGISTIC_BURN_IN {
            map.step();
        }
        map
    }

    #[inline]
    fn step(&mut self) {
        self.x = self.r * self.x * (1.0 - self.x);
    }
}

impl Iterator for LogisticMap {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        self.step();
        Some(self.x)
    }
}
