use super::decode::Decoded;

use crate::RoundingMode;

/// The result of rounding a scaled input to an integer, in sign-magnitude form, *before*
/// overflow handling.
///
/// The magnitude may be far larger than any format can hold (an `f64` reaches `2^1024`, and the
/// scale `2^F` is unbounded). Overflow handling only ever needs to know (a) the low bits of the
/// magnitude, for wrapping, and (b) whether the magnitude exceeds some bound below `2^127`, for
/// saturating. So `mag` holds the magnitude modulo `2^128`, and `wide` is set if the true
/// magnitude is `2^127` or more.
#[derive(Clone, Copy, Debug)]
#[derive(Eq, PartialEq)]
pub(crate) struct Rounded {
  pub neg: bool,
  pub mag: u128,
  pub wide: bool,
}

impl Rounded {
  pub const ZERO: Self = Self { neg: false, mag: 0, wide: false };

  /// An infinitely large magnitude: no low bits, and wider than anything.
  pub const fn infinite(neg: bool) -> Self {
    Self { neg, mag: 0, wide: true }
  }
}

impl RoundingMode {
  /// Decide whether to round a magnitude *up* (away from zero), given:
  ///
  ///   - `neg`: the sign of the number,
  ///   - `odd`: the lsb of the truncated magnitude,
  ///   - `round`: the first bit shifted out (worth exactly one half),
  ///   - `sticky`: whether any of the bits shifted out after that one is set.
  ///
  /// This is the same `odd | round | sticky` scheme as for float rounding: the shifted-out part
  /// is 0 if `!round && !sticky`, below a half if `!round && sticky`, exactly a half (a *tie*) if
  /// `round && !sticky`, and above a half if `round && sticky`.
  ///
  /// Rounding the *magnitude* up moves negative numbers towards −∞, so the modes that are
  /// defined in terms of the signed number (floor, ties to ±∞) look at `neg`.
  #[inline]
  pub(crate) const fn round_up(self, neg: bool, odd: bool, round: bool, sticky: bool) -> bool {
    match self {
      Self::TruncateTowardZero => false,
      Self::Truncate => neg & (round | sticky),
      Self::RoundNearestAwayFromZero => round,
      Self::RoundHalfTowardZero => round & sticky,
      Self::RoundPlusInfinity => round & (sticky | !neg),
      Self::RoundMinusInfinity => round & (sticky | neg),
      Self::Convergent => round & (sticky | odd),
    }
  }
}

/// Scale `value` by `2^frac_bits` and round it to an integer according to `mode`.
///
/// Since `value` is `±mant × 2^exp`, the scaled value is `±mant × 2^shift` with
/// `shift = exp + frac_bits`: no multiplication takes place, and no precision is lost before
/// the rounding itself.
pub(crate) fn scale_round(value: Decoded, frac_bits: i32, mode: RoundingMode) -> Rounded {
  let Decoded { neg, mant, exp } = value;
  if mant == 0 {
    return Rounded { neg, ..Rounded::ZERO }
  }
  let shift = i64::from(exp) + i64::from(frac_bits);

  if shift >= 0 {
    // The scaled value is an integer already, possibly a very large one. `mag` keeps it modulo
    // 2^128; `wide` records whether any bit was shifted past bit 127.
    let width = i64::from(u64::BITS - mant.leading_zeros());
    let mag = if shift < 128 { u128::from(mant) << shift } else { 0 };
    return Rounded { neg, mag, wide: width + shift > 127 }
  }

  // The scaled value has `-shift` bits to the right of the radix point. Split the mantissa there
  // into the truncated integer, the `round` bit, and the `sticky` rest.
  //
  //   mant:  iiiiiii r ssssss
  //                 ^ radix point, `-shift` bits from the right
  //
  // The mantissa has at most 53 bits, so any split more than 64 places to the right leaves an
  // integer part of 0, no round bit, and every set bit in `sticky`.
  let split = shift.unsigned_abs();
  let (truncated, round, sticky) =
    if split > 64 {
      (0, false, true)
    } else {
      let split = split as u32;
      let truncated = mant.checked_shr(split).unwrap_or(0);
      let round = (mant >> (split - 1)) & 1 == 1;
      let sticky = mant & ((1 << (split - 1)) - 1) != 0;
      (truncated, round, sticky)
    };

  let odd = truncated & 1 == 1;
  let up = mode.round_up(neg, odd, round, sticky);
  Rounded { neg, mag: u128::from(truncated) + u128::from(up), wide: false }
}
