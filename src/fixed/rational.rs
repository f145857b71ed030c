use super::*;

use crate::RoundingMode;
use crate::OverflowMode;

use malachite::{Integer, rational::Rational};
use malachite::base::num::arithmetic::traits::{Ceiling, Floor, PowerOf2};

/// The exact value of a finite `f64` scaled by `2^frac_bits`.
pub fn scaled(x: f64, frac_bits: i32) -> Rational {
  let x = Rational::try_from(x).expect("Only finite inputs have a rational value");
  x * Rational::power_of_2(i64::from(frac_bits))
}

/// Round the rational `exact` to an integer according to `mode`.
///
/// This is a **super-explicit** rendition of every rounding rule in terms of the floor of the
/// number and the distance to it, since this is what the bit-twiddling in `round.rs` is checked
/// against!
pub fn round(exact: &Rational, mode: RoundingMode) -> Integer {
  let floor: Integer = exact.floor();
  let ceil: Integer = exact.ceiling();
  if Rational::from(floor.clone()) == *exact {
    return floor
  }

  let half = Rational::from_signeds(1, 2);
  let below = exact - Rational::from(floor.clone());
  let positive = *exact > Rational::from(0);
  let toward_zero = if positive {floor.clone()} else {ceil.clone()};
  let away_from_zero = if positive {ceil.clone()} else {floor.clone()};
  let floor_is_even = (&floor % Integer::from(2)) == Integer::from(0);

  // For the modes that round to nearest, only the ties differ.
  let nearest = |tie: Integer| {
    if below < half {floor.clone()} else if below > half {ceil.clone()} else {tie}
  };

  match mode {
    RoundingMode::Truncate => floor.clone(),
    RoundingMode::TruncateTowardZero => toward_zero.clone(),
    RoundingMode::RoundNearestAwayFromZero => nearest(away_from_zero),
    RoundingMode::RoundHalfTowardZero => nearest(toward_zero),
    RoundingMode::RoundPlusInfinity => nearest(ceil.clone()),
    RoundingMode::RoundMinusInfinity => nearest(floor.clone()),
    RoundingMode::Convergent => nearest(if floor_is_even {floor.clone()} else {ceil.clone()}),
  }
}

/// Bring the integer `n` into the range of `format`, according to its overflow mode.
pub fn overflow(n: Integer, format: FixedFormat) -> i128 {
  let min = Integer::from(format.min_raw());
  let max = Integer::from(format.max_raw());
  let n = match format.overflow() {
    OverflowMode::Saturate =>
      if n < min {min} else if n > max {max} else {n},
    OverflowMode::Wrap => {
      // Euclidean remainder modulo 2^W, then reinterpret the top bit as a sign if signed.
      let modulus = Integer::power_of_2(u64::from(format.total_bits()));
      let r = ((n % &modulus) + &modulus) % &modulus;
      if r > max {r - modulus} else {r}
    },
    other => unreachable!("{other:?} cannot be constructed"),
  };
  i128::try_from(&n).expect("In range by construction")
}

/// The raw integer that `x` should quantize to in `format`, computed with exact rationals.
pub fn quantize_exact(x: f64, format: FixedFormat) -> i128 {
  let exact = scaled(x, format.frac_bits());
  overflow(round(&exact, format.rounding()), format)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn r(num: i64, den: i64) -> Rational {
    Rational::from_signeds(num, den)
  }

  #[test]
  fn rounding_rules() {
    use RoundingMode::*;
    let cases = [
      (r(-5, 2), [-3, -3, -2, -2, -3, -2, -2]),
      (r(-3, 2), [-2, -2, -1, -1, -2, -1, -2]),
      (r( 3, 2), [ 2,  1,  1,  2,  1,  1,  2]),
      (r( 5, 2), [ 3,  2,  2,  3,  2,  2,  2]),
      (r( 7, 5), [ 1,  1,  1,  1,  1,  1,  1]),
      (r(-7, 5), [-1, -2, -1, -1, -1, -1, -1]),
    ];
    let modes = [
      RoundNearestAwayFromZero, Truncate, TruncateTowardZero, RoundPlusInfinity,
      RoundMinusInfinity, RoundHalfTowardZero, Convergent,
    ];
    for (exact, expected) in cases {
      for (mode, e) in modes.into_iter().zip(expected) {
        assert_eq!(round(&exact, mode), Integer::from(e), "{mode:?} {exact}");
      }
    }
  }

  #[test]
  fn overflow_rules() {
    let sat: FixedFormat = "ap_fixed<4,4,AP_TRN,AP_SAT>".parse().unwrap();
    let wrap: FixedFormat = "ap_fixed<4,4,AP_TRN,AP_WRAP>".parse().unwrap();
    let uwrap: FixedFormat = "ap_ufixed<4,4,AP_TRN,AP_WRAP>".parse().unwrap();
    assert_eq!(overflow(Integer::from(9), sat), 7);
    assert_eq!(overflow(Integer::from(-100), sat), -8);
    assert_eq!(overflow(Integer::from(9), wrap), -7);
    assert_eq!(overflow(Integer::from(-9), wrap), 7);
    assert_eq!(overflow(Integer::from(-1), uwrap), 15);
    assert_eq!(overflow(Integer::from(33), uwrap), 1);
  }

  #[test]
  fn exact_scaling() {
    assert_eq!(scaled(3.99, 3), Rational::try_from(3.99).unwrap() * Rational::from(8));
    assert_eq!(scaled(0.75, -2), r(3, 16));
  }
}
