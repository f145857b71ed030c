/// An `f64` split into exact integer parts: the number is `(-1)^neg × mant × 2^exp`.
///
/// The mantissa is kept odd (trailing zero bits are moved into the exponent), or 0 for a zero
/// input, so that two equal numbers always decode to the same `Decoded`.
#[derive(Clone, Copy, Debug)]
#[derive(Eq, PartialEq)]
pub(crate) struct Decoded {
  pub neg: bool,
  pub mant: u64,
  pub exp: i32,
}

/// Decompose a **finite** `f64` into a [`Decoded`]. Nothing is lost: every finite `f64` is an
/// integer of at most 53 bits times a power of two.
pub(crate) fn decode_f64(num: f64) -> Decoded {
  debug_assert!(num.is_finite());
  const MANTISSA_DIGITS_EXPLICIT: u32 = f64::MANTISSA_DIGITS - 1;
  const EXP_BIAS: i32 = f64::MAX_EXP - 1;
  const HIDDEN_BIT: u64 = 1 << MANTISSA_DIGITS_EXPLICIT;

  let bits = num.to_bits();
  let neg = num.is_sign_negative();
  let fraction = bits & (HIDDEN_BIT - 1);
  let biased = ((bits >> MANTISSA_DIGITS_EXPLICIT) & 0x7ff) as i32;

  // An exponent field of 0 marks a subnormal number (or zero). Normals have an implicit unit
  // (`1.xxx`); subnormals don't, and their exponent is the same as that of the smallest normal.
  let (mant, exp) =
    if biased == 0 {
      (fraction, 1 - EXP_BIAS - MANTISSA_DIGITS_EXPLICIT as i32)
    } else {
      (fraction | HIDDEN_BIT, biased - EXP_BIAS - MANTISSA_DIGITS_EXPLICIT as i32)
    };

  if mant == 0 {
    return Decoded { neg, mant: 0, exp: 0 }
  }
  let tz = mant.trailing_zeros();
  Decoded { neg, mant: mant >> tz, exp: exp + tz as i32 }
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  fn value(d: Decoded) -> f64 {
    let x = crate::format::ldexp(d.mant as f64, d.exp);
    if d.neg {-x} else {x}
  }

  #[test]
  fn simple() {
    assert_eq!(decode_f64(1.0), Decoded { neg: false, mant: 1, exp: 0 });
    assert_eq!(decode_f64(-6.0), Decoded { neg: true, mant: 3, exp: 1 });
    assert_eq!(decode_f64(0.375), Decoded { neg: false, mant: 3, exp: -3 });
    assert_eq!(decode_f64(0.0), Decoded { neg: false, mant: 0, exp: 0 });
    assert_eq!(decode_f64(-0.0), Decoded { neg: true, mant: 0, exp: 0 });
  }

  #[test]
  fn extremes() {
    assert_eq!(decode_f64(f64::from_bits(1)), Decoded { neg: false, mant: 1, exp: -1074 });
    assert_eq!(decode_f64(f64::MIN_POSITIVE), Decoded { neg: false, mant: 1, exp: -1022 });
    assert_eq!(
      decode_f64(f64::MAX),
      Decoded { neg: false, mant: (1 << 53) - 1, exp: 1023 - 52 },
    );
  }

  proptest!{
    #![proptest_config(ProptestConfig::with_cases(crate::PROPTEST_CASES))]
    #[test]
    fn exact(num in any::<f64>().prop_filter("finite", |x| x.is_finite())) {
      let d = decode_f64(num);
      prop_assert!(d.mant == 0 || d.mant & 1 == 1);
      prop_assert_eq!(value(d).to_bits(), num.to_bits());
    }
  }
}
