use super::*;
use super::decode::decode_f64;
use super::round::{Rounded, scale_round};

use crate::{Batch, Error, Result};

/// Quantize `x` into `format`: scale by `2^F`, round with `format.rounding()`, then bring into
/// range with `format.overflow()`.
///
/// The computation is exact; the result is the one the hardware type would hold after being
/// assigned `x`. Infinities behave as numbers too large for any format: they saturate to the
/// extreme values, or wrap to 0. NaN has no fixed-point value and fails with
/// [`Error::NonFiniteInput`].
///
/// ```
/// # use soft_fixed::*;
/// let sat = FixedFormat::new(4, 4, true, RoundingMode::Truncate, OverflowMode::Saturate)?;
/// let wrap = FixedFormat::new(4, 4, true, RoundingMode::Truncate, OverflowMode::Wrap)?;
/// assert_eq!(quantize(9.0, sat)?.raw(), 7);
/// assert_eq!(quantize(9.0, wrap)?.raw(), -7);
///
/// let uwrap = FixedFormat::new(4, 4, false, RoundingMode::Truncate, OverflowMode::Wrap)?;
/// assert_eq!(quantize(17.0, uwrap)?.raw(), 1);
/// # Ok::<(), soft_fixed::Error>(())
/// ```
pub fn quantize(x: f64, format: FixedFormat) -> Result<QuantizedValue> {
  let rounded =
    if x.is_nan() {
      return Err(Error::NonFiniteInput(x))
    } else if x.is_infinite() {
      Rounded::infinite(x.is_sign_negative())
    } else {
      scale_round(decode_f64(x), format.frac_bits(), format.rounding())
    };
  let raw = rounded.overflow(format)?;
  Ok(QuantizedValue::from_raw_unchecked(raw, format))
}

/// Quantize every value of `batch` into `format`, keeping its shape: a scalar gives a scalar, a
/// sequence a sequence of the same length, and a keyed batch the same keys in the same order.
///
/// Either every value is quantized, or the first failure is returned.
///
/// ```
/// # use soft_fixed::*;
/// let fmt: FixedFormat = "ap_ufixed<8,4,AP_RND_CONV,AP_SAT>".parse()?;
/// let data = Batch::Keyed(Keyed::from_columns([
///   ("x", vec![0.03125, 0.09375]),
///   ("y", vec![100.0]),
/// ])?);
/// let q = quantize_batch(&data, fmt)?;
/// let raws = q.map(|q| q.raw());
/// assert_eq!(raws.get(&FieldId::named("x")), Some(&[0_i128, 2][..]));
/// assert_eq!(raws.get(&FieldId::named("y")), Some(&[255_i128][..]));
/// # Ok::<(), soft_fixed::Error>(())
/// ```
pub fn quantize_batch(batch: &Batch<f64>, format: FixedFormat) -> Result<Batch<QuantizedValue>> {
  let out = batch.try_map(|&x| quantize(x, format))?;
  tracing::trace!(values = out.len(), %format, "quantized batch");
  Ok(out)
}
