//! Deterministic transcendental functions.
//!
//! Chaotic maps amplify a one-ULP difference into a completely different
//! trajectory within a few dozen iterations, so the platform `libm` (whose
//! results differ between targets and versions) cannot be used. Everything
//! here is built from IEEE 754 add, sub, mul, div, floor and sqrt, which are
//! correctly rounded everywhere, evaluated in a fixed order.
//!
//! Every function reduces its argument to a small interval and sums a
//! truncated Taylor series there. The series are carried a few terms past
//! the point where the remainder drops below half an ULP.

use std::f64::consts::{FRAC_PI_2, PI};

// pi/2 split into three parts. The first two carry 30 significant bits so
// n * part is exact for |n| < 2^23.
const PIO2_A: f64 = f64::from_bits(0x3FF9_21FB_5480_0000); // 1.5707963276654482
const PIO2_B: f64 = f64::from_bits(0xBE0D_E973_DC80_0000); // -8.705515692000731e-10
const PIO2_C: f64 = f64::from_bits(0xBC19_D9CC_EBA3_F91F); // -3.50343439808993e-19
const TWO_OVER_PI: f64 = f64::from_bits(0x3FE4_5F30_6DC9_C883);

// ln 2 with a 32-bit head.
const LN2_HEAD: f64 = f64::from_bits(0x3FE6_2E42_FF00_0000); // 0.6931471806019545
const LN2_TAIL: f64 = f64::from_bits(0xBDC7_1843_2A1B_0E26); // -4.2009150726810846e-11
const INV_LN2: f64 = f64::from_bits(0x3FF7_1547_652B_82FE);

const EXP_OVERFLOW: f64 = 709.782712893384;
const EXP_UNDERFLOW: f64 = -745.1332191019411;

/// Below 2^-28, tanh(x) rounds to x.
const TANH_TINY: f64 = 3.725_290_298_461_914e-9;
/// At and above 22, tanh(x) rounds to 1.
const TANH_SATURATE: f64 = 22.0;

/// (-1)^k / (2k+1)! for k = 1..=8.
const SIN_TERMS: [f64; 8] = [
    -1.0 / 6.0,
    1.0 / 120.0,
    -1.0 / 5_040.0,
    1.0 / 362_880.0,
    -1.0 / 39_916_800.0,
    1.0 / 6_227_020_800.0,
    -1.0 / 1_307_674_368_000.0,
    1.0 / 355_687_428_096_000.0,
];

/// (-1)^k / (2k)! for k = 2..=9.
const COS_TERMS: [f64; 8] = [
    1.0 / 24.0,
    -1.0 / 720.0,
    1.0 / 40_320.0,
    -1.0 / 3_628_800.0,
    1.0 / 479_001_600.0,
    -1.0 / 87_178_291_200.0,
    1.0 / 20_922_789_888_000.0,
    -1.0 / 6_402_373_705_728_000.0,
];

/// 1 / k! for k = 2..=13.
const EXP_TERMS: [f64; 12] = [
    1.0 / 2.0,
    1.0 / 6.0,
    1.0 / 24.0,
    1.0 / 120.0,
    1.0 / 720.0,
    1.0 / 5_040.0,
    1.0 / 40_320.0,
    1.0 / 362_880.0,
    1.0 / 3_628_800.0,
    1.0 / 39_916_800.0,
    1.0 / 479_001_600.0,
    1.0 / 6_227_020_800.0,
];

/// (-1)^k / (2k+1) for k = 1..=12.
const ATAN_TERMS: [f64; 12] = [
    -1.0 / 3.0,
    1.0 / 5.0,
    -1.0 / 7.0,
    1.0 / 9.0,
    -1.0 / 11.0,
    1.0 / 13.0,
    -1.0 / 15.0,
    1.0 / 17.0,
    -1.0 / 19.0,
    1.0 / 21.0,
    -1.0 / 23.0,
    1.0 / 25.0,
];

/// c[0] + z (c[1] + z (c[2] + ...)), innermost term first.
#[inline]
fn horner(terms: &[f64], z: f64) -> f64 {
    terms.iter().rev().fold(0.0, |acc, &c| c + z * acc)
}

/// x = n pi/2 + r with |r| <= pi/4 (plus rounding). Returns (r, n mod 4).
/// Accurate while |x| < 2^22; deterministic for every finite x.
#[inline]
fn quadrant(x: f64) -> (f64, i64) {
    let n = (x * TWO_OVER_PI + 0.5).floor();
    let r = ((x - n * PIO2_A) - n * PIO2_B) - n * PIO2_C;
    (r, (n as i64) & 3)
}

#[inline]
fn sin_series(r: f64) -> f64 {
    let z = r * r;
    r + r * (z * horner(&SIN_TERMS, z))
}

#[inline]
fn cos_series(r: f64) -> f64 {
    let z = r * r;
    1.0 - (0.5 * z - (z * z) * horner(&COS_TERMS, z))
}

/// Sine. NaN for non-finite input.
pub fn det_sin(x: f64) -> f64 {
    if !x.is_finite() {
        return f64::NAN;
    }
    match quadrant(x) {
        (r, 0) => sin_series(r),
        (r, 1) => cos_series(r),
        (r, 2) => -sin_series(r),
        (r, _) => -cos_series(r),
    }
}

/// Cosine. NaN for non-finite input.
pub fn det_cos(x: f64) -> f64 {
    if !x.is_finite() {
        return f64::NAN;
    }
    match quadrant(x) {
        (r, 0) => cos_series(r),
        (r, 1) => -sin_series(r),
        (r, 2) => -cos_series(r),
        (r, _) => sin_series(r),
    }
}

/// 2^e for e in [-1022, 1023].
#[inline]
fn pow2(e: i64) -> f64 {
    f64::from_bits(((e + 1023) as u64) << 52)
}

fn scale(y: f64, k: i64) -> f64 {
    if k > 1023 {
        (y * 2.0) * pow2(k - 1)
    } else if k < -1022 {
        (y * pow2(k + 1000)) * pow2(-1000)
    } else {
        y * pow2(k)
    }
}

/// e^x, saturating to infinity and zero outside the representable range.
pub fn det_exp(x: f64) -> f64 {
    if x.is_nan() {
        return x;
    }
    if x > EXP_OVERFLOW {
        return f64::INFINITY;
    }
    if x < EXP_UNDERFLOW {
        return 0.0;
    }
    // x = k ln2 + r, |r| <= ln2 / 2
    let k = (x * INV_LN2 + 0.5).floor();
    let r = (x - k * LN2_HEAD) - k * LN2_TAIL;
    let p = r * horner(&EXP_TERMS, r);
    scale(1.0 + (r + r * p), k as i64)
}

/// tanh(x) = (e^{2|x|} - 1) / (e^{2|x|} + 1) with the sign of x.
pub fn det_tanh(x: f64) -> f64 {
    if x.is_nan() {
        return x;
    }
    let a = x.abs();
    if a < TANH_TINY {
        return x;
    }
    if a >= TANH_SATURATE {
        return 1.0f64.copysign(x);
    }
    let t = det_exp(2.0 * a);
    ((t - 1.0) / (t + 1.0)).copysign(x)
}

/// atan on [0, 1]. Two half-angle steps bring t under tan(pi/16), where
/// the series converges fast.
fn atan_unit(t: f64) -> f64 {
    let mut t = t;
    for _ in 0..2 {
        t = t / (1.0 + (1.0 + t * t).sqrt());
    }
    let z = t * t;
    4.0 * (t + t * (z * horner(&ATAN_TERMS, z)))
}

/// atan for t >= 0, including +inf.
fn det_atan(t: f64) -> f64 {
    if t > 1.0 {
        FRAC_PI_2 - atan_unit(1.0 / t)
    } else {
        atan_unit(t)
    }
}

/// acos(x) = 2 atan(sqrt((1 - x) / (1 + x))). Input is clamped to [-1, 1].
pub fn det_acos(x: f64) -> f64 {
    if x.is_nan() {
        return x;
    }
    let x = x.clamp(-1.0, 1.0);
    if x <= -1.0 {
        return PI;
    }
    2.0 * det_atan(((1.0 - x) / (1.0 + x)).sqrt())
}
