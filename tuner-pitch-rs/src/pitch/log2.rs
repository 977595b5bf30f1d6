//! Base-2 logarithm implementations.

/// A base-2 logarithm over `f32`.
///
/// Implementations must be monotone non-decreasing for positive finite
/// input. Non-positive or non-finite input may return any non-finite
/// value; callers discard non-finite results.
pub trait Log2 {
    fn log2(&self, x: f32) -> f32;
}

/// Full-precision `log2f` from `libm`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactLog2;

impl Log2 for ExactLog2 {
    #[inline]
    fn log2(&self, x: f32) -> f32 {
        libm::log2f(x)
    }
}

/// Upper bound on `|ApproxLog2::log2(x) − log2(x)|` for positive normal
/// and subnormal `x`. At 1200 cents per octave this is about 0.012 cents.
pub const APPROX_LOG2_MAX_ERROR: f32 = 1.0e-5;

/// Cheap `log2` for targets without a fast `logf`.
///
/// `x = m · 2^e` is split off the IEEE-754 bits, `m` is folded into
/// `[√½, √2)` and `log2(m) = 2/ln2 · atanh(t)` with `t = (m−1)/(m+1)` is
/// evaluated with the first three terms of the atanh series. Since
/// `|t| ≤ 0.1716` the truncation error stays below
/// [`APPROX_LOG2_MAX_ERROR`]. One division and five multiplications,
/// no table.
///
/// The result is monotone: the series is increasing in `t`, and at the
/// fold point the truncation error makes the upper segment start slightly
/// above where the lower one ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxLog2;

const SQRT_2: f32 = core::f32::consts::SQRT_2;
const TWO_OVER_LN_2: f32 = 2.0 / core::f32::consts::LN_2;
const MANTISSA_MASK: u32 = 0x007F_FFFF;
const EXPONENT_ONE: u32 = 0x3F80_0000;

impl Log2 for ApproxLog2 {
    fn log2(&self, x: f32) -> f32 {
        if !(x > 0.0) {
            return f32::NAN;
        }
        if x.is_infinite() {
            return f32::INFINITY;
        }

        let mut bits = x.to_bits();
        let mut exponent = ((bits >> 23) & 0xFF) as i32 - 127;
        if exponent == -127 {
            // Subnormal: renormalise through an exact power-of-two scale.
            bits = (x * 8_388_608.0).to_bits(); // 2^23
            exponent = ((bits >> 23) & 0xFF) as i32 - 127 - 23;
        }

        let mut m = f32::from_bits((bits & MANTISSA_MASK) | EXPONENT_ONE);
        if m >= SQRT_2 {
            m *= 0.5;
            exponent += 1;
        }

        let t = (m - 1.0) / (m + 1.0);
        let t2 = t * t;
        let series = 1.0 + t2 * (1.0 / 3.0 + t2 * (1.0 / 5.0));
        exponent as f32 + TWO_OVER_LN_2 * t * series
    }
}
