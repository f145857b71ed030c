//! Re-export some internals for benchmarking purposes; available with feature = "bench".

use crate::fixed::{decode_f64, scale_round};
use crate::{FixedFormat, RoundingMode, quantize};

/// Exact decomposition of a finite `f64`, as `(neg, mant, exp)`.
pub fn bench_decode(x: f64) -> (bool, u64, i32) {
  let d = decode_f64(x);
  (d.neg, d.mant, d.exp)
}

/// Scale a finite `f64` by `2^frac_bits` and round it, as `(neg, mag, wide)`, without the
/// overflow step.
pub fn bench_scale_round(x: f64, frac_bits: i32, mode: RoundingMode) -> (bool, u128, bool) {
  let r = scale_round(decode_f64(x), frac_bits, mode);
  (r.neg, r.mag, r.wide)
}

// Export these for inspection with `cargo asm`.

#[unsafe(no_mangle)]
pub fn quantize_raw(x: f64, format: FixedFormat) -> i128 {
  quantize(x, format).map_or(0, |q| q.raw())
}

#[unsafe(no_mangle)]
pub fn scale_round_convergent(x: f64, frac_bits: i32) -> u128 {
  scale_round(decode_f64(x), frac_bits, RoundingMode::Convergent).mag
}

#[unsafe(no_mangle)]
pub fn scale_round_truncate(x: f64, frac_bits: i32) -> u128 {
  scale_round(decode_f64(x), frac_bits, RoundingMode::Truncate).mag
}
