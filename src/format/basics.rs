use super::*;

use crate::{Error, Result};

impl FixedFormat {
  /// The widest supported format. Raw values are held in an `i128`, and an unsigned format of
  /// `W` bits needs `W` bits of magnitude, so one bit is kept back for the sign.
  pub const MAX_BITS: u32 = 127;

  /// Build a format with `total_bits` bits in total, of which `int_bits` are integer bits (sign
  /// included, if `signed`), with the given rounding and overflow policies.
  ///
  /// Fails with [`Error::InvalidFormat`] if `total_bits` is 0 or above [`Self::MAX_BITS`], or if
  /// `int_bits` is so extreme that `frac_bits` does not fit in an `i32`; and with
  /// [`Error::NotImplemented`] if `overflow` is one of the recognised-but-unimplemented modes
  /// (see [`OverflowMode::is_implemented`]).
  ///
  /// ```
  /// # use soft_fixed::*;
  /// // 4 bits, all of them integer bits, unsigned: the range is 0 ..= 15.
  /// let fmt = FixedFormat::new(4, 4, false, RoundingMode::Truncate, OverflowMode::Wrap)?;
  /// assert_eq!((fmt.min_raw(), fmt.max_raw()), (0, 15));
  ///
  /// assert!(matches!(
  ///   FixedFormat::new(8, 4, true, RoundingMode::Truncate, OverflowMode::SaturateSymmetric),
  ///   Err(Error::NotImplemented(_)),
  /// ));
  /// # Ok::<(), soft_fixed::Error>(())
  /// ```
  pub fn new(
    total_bits: u32,
    int_bits: i32,
    signed: bool,
    rounding: RoundingMode,
    overflow: OverflowMode,
  ) -> Result<Self> {
    if total_bits == 0 {
      return Err(Error::InvalidFormat("a format needs at least 1 bit".into()))
    }
    if total_bits > Self::MAX_BITS {
      return Err(Error::InvalidFormat(format!(
        "{total_bits} bits requested, at most {} are supported", Self::MAX_BITS,
      )))
    }
    if (total_bits as i32).checked_sub(int_bits).is_none() {
      return Err(Error::InvalidFormat(format!("{int_bits} integer bits is out of range")))
    }
    if !overflow.is_implemented() {
      return Err(Error::NotImplemented(overflow.hls_name()))
    }
    Ok(Self { total_bits, int_bits, signed, rounding, overflow })
  }

  /// A signed fixed-point format, `ap_fixed<W, I>`, with the HLS default policies
  /// ([`RoundingMode::Truncate`], [`OverflowMode::Wrap`]).
  pub fn ap_fixed(total_bits: u32, int_bits: i32) -> Result<Self> {
    Self::new(total_bits, int_bits, true, RoundingMode::default(), OverflowMode::default())
  }

  /// An unsigned fixed-point format, `ap_ufixed<W, I>`, with the HLS default policies.
  pub fn ap_ufixed(total_bits: u32, int_bits: i32) -> Result<Self> {
    Self::new(total_bits, int_bits, false, RoundingMode::default(), OverflowMode::default())
  }

  /// A signed integer format, `ap_int<W>`: no fractional bits, wrapping on overflow.
  pub fn ap_int(total_bits: u32) -> Result<Self> {
    Self::new(total_bits, total_bits as i32, true, RoundingMode::default(), OverflowMode::Wrap)
  }

  /// An unsigned integer format, `ap_uint<W>`: no fractional bits, wrapping on overflow.
  pub fn ap_uint(total_bits: u32) -> Result<Self> {
    Self::new(total_bits, total_bits as i32, false, RoundingMode::default(), OverflowMode::Wrap)
  }

  /// The same format with different rounding and overflow policies. Fails like [`Self::new`].
  pub fn with_modes(self, rounding: RoundingMode, overflow: OverflowMode) -> Result<Self> {
    Self::new(self.total_bits, self.int_bits, self.signed, rounding, overflow)
  }

  /// Total width `W`, sign bit included.
  #[inline]
  pub const fn total_bits(self) -> u32 {
    self.total_bits
  }

  /// Integer bits `I`, sign bit included.
  #[inline]
  pub const fn int_bits(self) -> i32 {
    self.int_bits
  }

  /// Fractional bits `F = W - I`. May be negative, or larger than `W`.
  #[inline]
  pub const fn frac_bits(self) -> i32 {
    self.total_bits as i32 - self.int_bits
  }

  #[inline]
  pub const fn signed(self) -> bool {
    self.signed
  }

  #[inline]
  pub const fn rounding(self) -> RoundingMode {
    self.rounding
  }

  #[inline]
  pub const fn overflow(self) -> OverflowMode {
    self.overflow
  }

  /// The smallest representable raw integer: `-2^(W-1)` if signed, `0` otherwise.
  #[inline]
  pub const fn min_raw(self) -> i128 {
    if self.signed { i128::MIN >> (128 - self.total_bits) } else { 0 }
  }

  /// The largest representable raw integer: `2^(W-1) - 1` if signed, `2^W - 1` otherwise.
  #[inline]
  pub const fn max_raw(self) -> i128 {
    if self.signed { i128::MAX >> (128 - self.total_bits) } else { i128::MAX >> (127 - self.total_bits) }
  }

  /// Whether `raw` lies in `min_raw() ..= max_raw()`.
  #[inline]
  pub const fn contains_raw(self, raw: i128) -> bool {
    self.min_raw() <= raw && raw <= self.max_raw()
  }

  /// The weight of the least significant bit, `2^-F`, i.e. the distance between two consecutive
  /// representable values.
  pub fn lsb(self) -> f64 {
    pow2(-self.frac_bits())
  }

  /// The smallest representable value, as an `f64`.
  pub fn min_value(self) -> f64 {
    self.min_raw() as f64 * self.lsb()
  }

  /// The largest representable value, as an `f64` (rounded to nearest if `W > 53`).
  pub fn max_value(self) -> f64 {
    self.max_raw() as f64 * self.lsb()
  }

  /// The mask that keeps exactly the low `W` bits of a two's complement pattern.
  #[inline]
  pub(crate) const fn mask(self) -> u128 {
    u128::MAX >> (128 - self.total_bits)
  }
}

/// `2^exp` as an `f64`, exact whenever the result is representable.
pub(crate) fn pow2(exp: i32) -> f64 {
  ldexp(1.0, exp)
}

/// `x × 2^exp`, exact whenever the result is representable (bar rounding into the subnormals).
pub(crate) fn ldexp(x: f64, exp: i32) -> f64 {
  if x == 0.0 { return x }
  // Split the exponent so that neither factor overflows or underflows on its own: `2^-1074` is
  // representable, but `2^1074` (which `powi` computes and then inverts) is not.
  let half = exp / 2;
  x * f64::powi(2.0, half) * f64::powi(2.0, exp - half)
}
