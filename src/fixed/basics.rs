use super::*;

use crate::format::ldexp;
use crate::{Error, Result};

impl QuantizedValue {
  /// Construct a quantized value from its raw integer. Fails with [`Error::InvalidRaw`] if `raw`
  /// is outside the range of `format`.
  ///
  /// ```
  /// # use soft_fixed::*;
  /// let fmt = FixedFormat::ap_fixed(8, 5)?;
  /// assert_eq!(QuantizedValue::from_raw(-128, fmt)?.to_f64(), -16.0);
  /// assert!(QuantizedValue::from_raw(128, fmt).is_err());
  /// # Ok::<(), soft_fixed::Error>(())
  /// ```
  pub fn from_raw(raw: i128, format: FixedFormat) -> Result<Self> {
    if !format.contains_raw(raw) {
      return Err(Error::InvalidRaw { raw, format: format.to_string() })
    }
    Ok(Self { format, raw })
  }

  /// As [`Self::from_raw`], for callers that have already established that `raw` is in range.
  #[inline]
  pub(crate) fn from_raw_unchecked(raw: i128, format: FixedFormat) -> Self {
    debug_assert!(format.contains_raw(raw), "{raw} is out of range for {format}");
    Self { format, raw }
  }

  /// The stored integer, unscaled.
  #[inline]
  pub const fn raw(self) -> i128 {
    self.raw
  }

  #[inline]
  pub const fn format(self) -> FixedFormat {
    self.format
  }

  /// The stored bits: the low `W` bits of [`Self::raw`] in two's complement, all higher bits 0.
  #[inline]
  pub fn bits(self) -> u128 {
    self.raw as u128 & self.format.mask()
  }

  /// The represented real value, `raw × 2^-F`. Exact for formats of up to 53 bits (as long as
  /// the result is within the range of `f64`); wider raw integers are rounded to nearest first.
  pub fn to_f64(self) -> f64 {
    ldexp(self.raw as f64, -self.format.frac_bits())
  }
}
