use super::round::Rounded;

use crate::{Error, FixedFormat, OverflowMode, Result};

impl Rounded {
  /// Clamp into `min_raw() ..= max_raw()`.
  pub(crate) fn saturate(self, format: FixedFormat) -> i128 {
    if self.neg {
      // `min_raw` is `-2^(W-1)` or 0; its magnitude fits in a `u128` either way.
      let limit = format.min_raw().unsigned_abs();
      if self.wide || self.mag > limit { format.min_raw() } else { (self.mag as i128).wrapping_neg() }
    } else {
      let limit = format.max_raw() as u128;
      if self.wide || self.mag > limit { format.max_raw() } else { self.mag as i128 }
    }
  }

  /// Reduce modulo `2^W` and read back as a `W`-bit integer, in two's complement if signed.
  ///
  /// Only the low `W` bits of the two's complement of the rounded value survive, and `mag` holds
  /// the magnitude modulo `2^128`, which is plenty: `-mag mod 2^W` is `(2^128 - mag) mod 2^W`
  /// as `W <= 128`.
  pub(crate) fn wrap(self, format: FixedFormat) -> i128 {
    let bits = (if self.neg { self.mag.wrapping_neg() } else { self.mag }) & format.mask();
    if format.signed() {
      // Sign-extend from bit W-1.
      let junk = 128 - format.total_bits();
      ((bits << junk) as i128) >> junk
    } else {
      bits as i128
    }
  }

  /// Apply the overflow mode of `format`.
  pub(crate) fn overflow(self, format: FixedFormat) -> Result<i128> {
    match format.overflow() {
      OverflowMode::Saturate => Ok(self.saturate(format)),
      OverflowMode::Wrap => Ok(self.wrap(format)),
      // Refused by `FixedFormat::new` already.
      mode @ (OverflowMode::SaturateZero | OverflowMode::SaturateSymmetric | OverflowMode::WrapSignMagnitude) =>
        Err(Error::NotImplemented(mode.hls_name())),
    }
  }
}
